use crate::{error::Error, id::EntryId, rates::RateTable};
use chrono::NaiveDate;
use im_rc::Vector;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A USD dividend payment with the EUR value fixed at the rate of its payment date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendEntry {
    pub id: EntryId,
    pub dollar_amount: f64,
    pub euro_amount: f64,
    pub payment_date: NaiveDate,
    pub exchange_rate: f64,
}

/// Dividend entries in insertion order.
///
/// Every mutation returns a new snapshot, the receiver is never modified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DividendLedger {
    entries: Vector<DividendEntry>,
}

impl DividendLedger {
    pub fn iter(&self) -> impl Iterator<Item = &DividendEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&DividendEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Records a payment, converting it at the rate published for `payment_date`.
    ///
    /// Fails with [`Error::RateUnavailable`] when the table has no rate for that
    /// exact date, in which case no entry is created.
    pub fn add(
        &self,
        dollar_amount: f64,
        payment_date: NaiveDate,
        rates: &RateTable,
    ) -> Result<(Self, DividendEntry), Error> {
        let exchange_rate = rates
            .rate_at(payment_date)
            .ok_or(Error::RateUnavailable(payment_date))?;

        let entry = DividendEntry {
            id: EntryId::issue(self.entries.iter().map(|e| e.id).max()),
            dollar_amount,
            euro_amount: dollar_amount / exchange_rate,
            payment_date,
            exchange_rate,
        };
        debug!(id = %entry.id, %payment_date, dollar_amount, "dividend added");

        let mut entries = self.entries.clone();
        entries.push_back(entry.clone());
        Ok((Self { entries }, entry))
    }

    /// Removing an unknown id returns an identical ledger.
    pub fn remove(&self, id: EntryId) -> Self {
        let mut entries = self.entries.clone();
        entries.retain(|entry| entry.id != id);
        if entries.len() != self.entries.len() {
            debug!(%id, "dividend removed");
        }
        Self { entries }
    }

    pub fn total_usd(&self) -> f64 {
        self.entries.iter().map(|e| e.dollar_amount).sum()
    }

    pub fn total_eur(&self) -> f64 {
        self.entries.iter().map(|e| e.euro_amount).sum()
    }
}

impl FromIterator<DividendEntry> for DividendLedger {
    fn from_iter<I: IntoIterator<Item = DividendEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
