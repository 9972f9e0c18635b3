use crate::error::{Error, Result};
use crate::map::StationTable;
use crate::temperature::Reading;

/// Splits one record into its station name and reading.
///
/// Digits are not validated: `.` is skipped, `-` negates and every other byte
/// after the separator is taken as an ASCII digit.
#[inline]
pub fn parse_line<R: Reading>(line: &[u8]) -> Result<(&[u8], R)> {
    let split = match memchr::memchr(b';', line) {
        Some(split) => split,
        None => {
            return Err(Error::MalformedRecord {
                line: String::from_utf8_lossy(line).into_owned(),
            })
        }
    };
    if split == 0 {
        return Err(Error::EmptyStationName);
    }

    let mut tenths = 0i64;
    let mut negative = false;
    for &byte in &line[split + 1..] {
        match byte {
            b'.' => {}
            b'-' => negative = true,
            digit => {
                tenths = tenths
                    .wrapping_mul(10)
                    .wrapping_add(digit.wrapping_sub(b'0') as i64)
            }
        }
    }

    Ok((&line[..split], R::from_tenths(tenths, negative)))
}

/// Folds every line of a newline-aligned chunk into a fresh table.
pub fn parser<R: Reading>(chunk: &[u8]) -> Result<StationTable<R>> {
    let mut results = StationTable::new();

    let mut start = 0;
    for end in memchr::memchr_iter(b'\n', chunk).chain(std::iter::once(chunk.len())) {
        let line = &chunk[start..end];
        start = end + 1;
        if line.is_empty() {
            continue;
        }
        let (city, temperature) = parse_line::<R>(line)?;
        results.update(city, temperature);
    }

    Ok(results)
}
