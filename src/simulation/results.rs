// src/simulation/results.rs
use std::collections::BTreeMap;
use std::fmt;

/// Counts of measured bitstrings over a number of shots.
///
/// Keys are full-width bitstrings in the layout's key order; see
/// [`RegisterLayout::format_key`](crate::core::RegisterLayout::format_key).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasurementHistogram {
    counts: BTreeMap<String, u64>,
    shots: u64,
}

impl MeasurementHistogram {
    pub fn new(shots: u64) -> Self {
        Self { counts: BTreeMap::new(), shots }
    }

    /// Builds a histogram from raw counts; `shots` is their sum.
    pub fn from_counts<I, K>(counts: I) -> Self
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<String>,
    {
        let mut histogram = Self::new(0);
        for (key, count) in counts {
            histogram.record(key, count);
            histogram.shots += count;
        }
        histogram
    }

    /// Adds `count` observations of `key`. Does not change `shots`.
    pub fn record(&mut self, key: impl Into<String>, count: u64) {
        *self.counts.entry(key.into()).or_insert(0) += count;
    }

    pub fn counts(&self) -> &BTreeMap<String, u64> {
        &self.counts
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.counts.get(key).copied()
    }

    /// Shots the program was run for.
    pub fn shots(&self) -> u64 {
        self.shots
    }

    /// Sum of all recorded counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl fmt::Display for MeasurementHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Measurement Histogram ({} shots):", self.shots)?;
        if self.counts.is_empty() {
            writeln!(f, "  No outcomes recorded.")?;
        }
        for (key, count) in &self.counts {
            writeln!(f, "  {}: {}", key, count)?;
        }
        Ok(())
    }
}
