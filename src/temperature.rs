use std::fmt::Debug;

/// Scalar used to store a single reading and its running statistics.
///
/// `i64` keeps readings as tenths of a degree and sums them in an `i128`, so
/// accumulation is exact for any count of `i64` readings. `f64` keeps them as
/// degrees and accepts floating point drift.
pub trait Reading: Copy + PartialOrd + Send + Sync + 'static {
    /// Running sum, wide enough that adding readings cannot overflow.
    type Sum: Copy + PartialEq + Debug + Send + Sync + 'static;

    /// Builds a reading from the unsigned digit accumulator of a record.
    fn from_tenths(tenths: i64, negative: bool) -> Self;

    fn min(self, other: Self) -> Self;

    fn max(self, other: Self) -> Self;

    fn widen(self) -> Self::Sum;

    fn accumulate(sum: Self::Sum, other: Self::Sum) -> Self::Sum;

    /// Value in degrees.
    fn display(self) -> f64;

    /// Mean in degrees of `count` readings summing to `sum`.
    fn mean(sum: Self::Sum, count: u64) -> f64;
}

impl Reading for i64 {
    type Sum = i128;

    #[inline]
    fn from_tenths(tenths: i64, negative: bool) -> Self {
        if negative {
            tenths.wrapping_neg()
        } else {
            tenths
        }
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        Ord::min(self, other)
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        Ord::max(self, other)
    }

    #[inline]
    fn widen(self) -> i128 {
        self as i128
    }

    #[inline]
    fn accumulate(sum: i128, other: i128) -> i128 {
        sum + other
    }

    fn display(self) -> f64 {
        self as f64 / 10.0
    }

    fn mean(sum: i128, count: u64) -> f64 {
        (sum as f64 / 10.0) / count as f64
    }
}

impl Reading for f64 {
    type Sum = f64;

    #[inline]
    fn from_tenths(tenths: i64, negative: bool) -> Self {
        let value = tenths as f64 / 10.0;
        if negative {
            -value
        } else {
            value
        }
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        f64::min(self, other)
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        f64::max(self, other)
    }

    #[inline]
    fn widen(self) -> f64 {
        self
    }

    #[inline]
    fn accumulate(sum: f64, other: f64) -> f64 {
        sum + other
    }

    fn display(self) -> f64 {
        self
    }

    fn mean(sum: f64, count: u64) -> f64 {
        sum / count as f64
    }
}

/// Running statistics of one station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature<R: Reading> {
    pub min: R,
    pub max: R,
    pub sum: R::Sum,
    pub count: u64,
}

impl<R: Reading> Temperature<R> {
    #[inline]
    pub fn new(temperature: R) -> Self {
        Self {
            min: temperature,
            max: temperature,
            sum: temperature.widen(),
            count: 1,
        }
    }

    #[inline]
    pub fn update(&mut self, other: &Temperature<R>) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum = R::accumulate(self.sum, other.sum);
        self.count += other.count;
    }

    #[inline]
    pub fn update_single(&mut self, temperature: R) {
        self.min = self.min.min(temperature);
        self.max = self.max.max(temperature);
        self.sum = R::accumulate(self.sum, temperature.widen());
        self.count += 1;
    }

    pub fn min(&self) -> f64 {
        self.min.display()
    }

    pub fn mean(&self) -> f64 {
        R::mean(self.sum, self.count)
    }

    pub fn max(&self) -> f64 {
        self.max.display()
    }
}
