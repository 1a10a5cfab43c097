use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseIntError, str::FromStr};

/// Opaque entry identifier, the creation time in unix milliseconds.
///
/// Persisted as a decimal string so stored ledgers keep the same shape
/// as the browser data they may have been exported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryId(u64);

impl EntryId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Issues an id for a new entry: the current time, bumped past `last` so
    /// ids stay strictly increasing even when two entries share a millisecond.
    /// Saturates at `u64::MAX`.
    pub fn issue(last: Option<EntryId>) -> Self {
        let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default();
        match last {
            Some(EntryId(last)) if last >= now => Self(last.saturating_add(1)),
            _ => Self(now),
        }
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl TryFrom<String> for EntryId {
    type Error = ParseIntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntryId> for String {
    fn from(id: EntryId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::EntryId;

    #[test]
    fn issued_ids_are_strictly_increasing() {
        let first = EntryId::issue(None);
        let second = EntryId::issue(Some(first));
        let third = EntryId::issue(Some(second));
        assert!(first < second);
        assert!(second < third);
    }

    #[test]
    fn future_last_id_is_bumped() {
        let far_future = EntryId::new(u64::MAX - 1);
        assert_eq!(EntryId::issue(Some(far_future)), EntryId::new(u64::MAX));
        let last = EntryId::new(u64::MAX);
        assert_eq!(EntryId::issue(Some(last)), last);
    }

    #[test]
    fn serializes_as_string() {
        let id = EntryId::new(1717000000000);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1717000000000\"");
        assert_eq!(
            serde_json::from_str::<EntryId>("\"1717000000000\"").unwrap(),
            id
        );
        assert!(serde_json::from_str::<EntryId>("\"abc\"").is_err());
    }
}
