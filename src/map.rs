use xxhash_rust::xxh3::xxh3_64;

use crate::temperature::{Reading, Temperature};

const INITIAL_CAPACITY: usize = 1024;

struct Entry<R: Reading> {
    hash: u64,
    key: Box<[u8]>,
    value: Temperature<R>,
}

/// Station name to running statistics, open addressing with linear probing.
///
/// The slot count is always a power of two and kept at most half full.
pub struct StationTable<R: Reading> {
    table: Vec<Option<Entry<R>>>,
    len: usize,
}

impl<R: Reading> StationTable<R> {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let slots = (capacity.max(1) * 2).next_power_of_two();
        Self {
            table: std::iter::repeat_with(|| None).take(slots).collect(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn find_slot(&self, hash: u64, key: &[u8]) -> usize {
        let mask = self.table.len() - 1;
        let mut slot = hash as usize & mask;
        loop {
            match &self.table[slot] {
                Some(entry) if entry.hash == hash && *entry.key == *key => return slot,
                Some(_) => slot = (slot + 1) & mask,
                None => return slot,
            }
        }
    }

    fn grow(&mut self) {
        let slots = self.table.len() * 2;
        let old = std::mem::replace(
            &mut self.table,
            std::iter::repeat_with(|| None).take(slots).collect(),
        );
        let mask = slots - 1;
        for entry in old.into_iter().flatten() {
            let mut slot = entry.hash as usize & mask;
            while self.table[slot].is_some() {
                slot = (slot + 1) & mask;
            }
            self.table[slot] = Some(entry);
        }
    }

    fn insert_entry(&mut self, entry: Entry<R>) {
        if (self.len + 1) * 2 > self.table.len() {
            self.grow();
        }
        let slot = self.find_slot(entry.hash, &entry.key);
        match &mut self.table[slot] {
            Some(existing) => existing.value.update(&entry.value),
            vacant => {
                *vacant = Some(entry);
                self.len += 1;
            }
        }
    }

    /// Folds one reading into the statistics of `name`.
    #[inline]
    pub fn update(&mut self, name: &[u8], temperature: R) {
        let hash = xxh3_64(name);
        let slot = self.find_slot(hash, name);
        if let Some(entry) = &mut self.table[slot] {
            entry.value.update_single(temperature);
            return;
        }
        self.insert_entry(Entry {
            hash,
            key: name.into(),
            value: Temperature::new(temperature),
        });
    }

    /// Moves every entry of `other` into `self`, combining stations present in both.
    pub fn merge(&mut self, other: StationTable<R>) {
        for entry in other.table.into_iter().flatten() {
            self.insert_entry(entry);
        }
    }

    pub fn get(&self, name: &[u8]) -> Option<&Temperature<R>> {
        let slot = self.find_slot(xxh3_64(name), name);
        self.table[slot].as_ref().map(|entry| &entry.value)
    }

    pub fn names(&self) -> Vec<&[u8]> {
        self.iter().map(|(name, _)| name).collect()
    }

    /// Statistics of a station known to be present.
    ///
    /// # Panics
    ///
    /// Panics if `name` was never recorded.
    pub fn values_of(&self, name: &[u8]) -> &Temperature<R> {
        match self.get(name) {
            Some(value) => value,
            None => panic!("unknown station {:?}", String::from_utf8_lossy(name)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &Temperature<R>)> {
        self.table
            .iter()
            .flatten()
            .map(|entry| (&*entry.key, &entry.value))
    }

    /// Consumes the table into `(name, statistics)` pairs ordered by name bytes.
    pub fn into_sorted(self) -> Vec<(Box<[u8]>, Temperature<R>)> {
        let mut results = self
            .table
            .into_iter()
            .flatten()
            .map(|entry| (entry.key, entry.value))
            .collect::<Vec<_>>();
        results.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
        results
    }
}

impl<R: Reading> Default for StationTable<R> {
    fn default() -> Self {
        Self::new()
    }
}
