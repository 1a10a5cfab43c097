use chrono::NaiveDate;
use im_rc::OrdMap;
use serde_json::Value;
use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Error, Debug)]
pub enum RateTableError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Rate table is not a JSON object of date to rate: {0}")]
    Json(#[from] serde_json::Error),
}

/// First and last date covered by a [`RateTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min <= date && date <= self.max
    }
}

/// Daily USD/EUR reference rates, expressed as the USD value of one EUR.
///
/// Only trading days have entries, lookups never interpolate. Every rate held
/// is finite and strictly positive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rates: OrdMap<NaiveDate, f64>,
}

fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

impl RateTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads the rate resource once at startup. A missing or malformed file
    /// leaves the table empty, so every lookup reports the rate as unavailable.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let loaded = File::open(path)
            .map_err(RateTableError::from)
            .and_then(|file| Self::from_json_reader(BufReader::new(file)));

        match loaded {
            Ok(table) => {
                debug!(path = %path.display(), rates = table.len(), "loaded exchange rates");
                table
            }
            Err(err) => {
                error!(path = %path.display(), %err, "failed to load exchange rates");
                Self::empty()
            }
        }
    }

    pub fn from_json_reader<R: std::io::Read>(reader: R) -> Result<Self, RateTableError> {
        let raw: BTreeMap<String, Value> = serde_json::from_reader(reader)?;
        let mut rates = OrdMap::new();

        for (key, value) in raw {
            let date = match NaiveDate::parse_from_str(&key, "%Y-%m-%d") {
                Ok(date) => date,
                Err(_) => {
                    warn!(key = %key, "skipping rate with malformed date");
                    continue;
                }
            };
            match value.as_f64() {
                Some(rate) if is_valid_rate(rate) => {
                    rates.insert(date, rate);
                }
                _ => warn!(%date, %value, "skipping non-positive or non-numeric rate"),
            }
        }

        Ok(Self { rates })
    }

    /// Exact-date lookup.
    pub fn rate_at(&self, date: NaiveDate) -> Option<f64> {
        self.rates.get(&date).copied()
    }

    pub fn range(&self) -> Option<DateRange> {
        let (min, _) = self.rates.get_min()?;
        let (max, _) = self.rates.get_max()?;
        Some(DateRange {
            min: *min,
            max: *max,
        })
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl FromIterator<(NaiveDate, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        Self {
            rates: iter
                .into_iter()
                .filter(|(_, rate)| is_valid_rate(*rate))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn rate_at_is_exact_lookup() {
        let table = RateTable::from_iter([(date("2024-01-02"), 1.10), (date("2024-01-05"), 1.09)]);
        assert_eq!(table.rate_at(date("2024-01-02")), Some(1.10));
        // no interpolation over the gap
        assert_eq!(table.rate_at(date("2024-01-03")), None);
    }

    #[test]
    fn range_of_empty_table_is_absent() {
        assert_eq!(RateTable::empty().range(), None);
    }

    #[test]
    fn range_spans_first_and_last_date() {
        let table = RateTable::from_json_reader(
            r#"{"2024-03-01": 1.08, "2023-12-29": 1.105, "2024-01-02": 1.0956}"#.as_bytes(),
        )
        .unwrap();
        let range = table.range().unwrap();
        assert_eq!(range.min, date("2023-12-29"));
        assert_eq!(range.max, date("2024-03-01"));
        assert!(range.contains(date("2024-02-10")));
        assert!(!range.contains(date("2024-03-02")));
    }

    #[test]
    fn invalid_entries_are_skipped() {
        let table = RateTable::from_json_reader(
            r#"{"2024-01-02": 1.1, "2024-01-03": 0, "2024-01-04": -1.0, "garbage": 1.2, "2024-01-05": "x"}"#
                .as_bytes(),
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rate_at(date("2024-01-03")), None);
    }

    #[test]
    fn non_object_resource_is_an_error() {
        assert!(matches!(
            RateTable::from_json_reader("[1, 2]".as_bytes()),
            Err(RateTableError::Json(_))
        ));
    }

    #[test]
    fn failed_load_degrades_to_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RateTable::load(dir.path().join("missing.json")).is_empty());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{not json").unwrap();
        assert!(RateTable::load(&broken).is_empty());
    }

    #[test]
    fn load_reads_rate_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"2024-01-02": 1.0956}}"#).unwrap();
        let table = RateTable::load(file.path());
        assert_eq!(table.rate_at(date("2024-01-02")), Some(1.0956));
    }

    proptest! {
        #[test]
        fn lookup_returns_stored_rate(
            entries in proptest::collection::btree_map(0i32..2000, 0.5f64..2.0, 0..50),
            probe in 0i32..2000,
        ) {
            let base = date("2020-01-01");
            let table: RateTable = entries
                .iter()
                .map(|(offset, rate)| (base + chrono::Duration::days(i64::from(*offset)), *rate))
                .collect();
            let probe_date = base + chrono::Duration::days(i64::from(probe));
            prop_assert_eq!(table.rate_at(probe_date), entries.get(&probe).copied());
        }
    }
}
