use crate::{id::EntryId, rates::RateTable};
use chrono::NaiveDate;
use im_rc::{OrdMap, Vector};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

/// One purchase lot. The market price is not part of the lot, it lives in
/// the [`PriceMap`] shared by every lot of the same ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareEntry {
    pub id: EntryId,
    pub ticker: String,
    pub shares_held: f64,
    pub purchase_price: f64,
    pub purchase_date: NaiveDate,
}

impl ShareEntry {
    pub fn profit_per_share(&self, current_price: f64) -> f64 {
        current_price - self.purchase_price
    }

    pub fn total_profit(&self, current_price: f64) -> f64 {
        self.profit_per_share(current_price) * self.shares_held
    }

    /// Not finite when the purchase price is zero, displaying callers guard.
    pub fn percentage_gain(&self, current_price: f64) -> f64 {
        self.profit_per_share(current_price) / self.purchase_price * 100.0
    }

    /// Purchase price converted at the rate of the purchase date, `None` when
    /// the table has no rate for that day.
    pub fn purchase_price_eur(&self, rates: &RateTable) -> Option<f64> {
        rates
            .rate_at(self.purchase_date)
            .map(|rate| self.purchase_price / rate)
    }
}

/// Input for [`ShareLedger::add`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShare {
    pub ticker: String,
    pub shares_held: f64,
    pub purchase_price: f64,
    pub current_price: f64,
    pub purchase_date: NaiveDate,
}

/// Current USD quote per ticker. Tickers are normalized on the way in,
/// including when loaded from storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "OrdMap<String, f64>", into = "OrdMap<String, f64>")]
pub struct PriceMap {
    quotes: OrdMap<String, f64>,
}

impl PriceMap {
    /// Unknown tickers are valued at zero.
    pub fn current_price_of(&self, ticker: &str) -> f64 {
        self.quote(ticker).unwrap_or(0.0)
    }

    pub fn quote(&self, ticker: &str) -> Option<f64> {
        self.quotes.get(&normalize_ticker(ticker)).copied()
    }

    pub fn update_current_price(&self, ticker: &str, price: f64) -> Self {
        let ticker = normalize_ticker(ticker);
        debug!(%ticker, price, "current price updated");
        Self {
            quotes: self.quotes.update(ticker, price),
        }
    }

    /// Overwrites the quote for `ticker` with the price entered alongside a new
    /// lot. This reprices every existing lot of that ticker.
    pub fn record_quote(&self, ticker: &str, price: f64) -> Self {
        self.update_current_price(ticker, price)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.quotes.iter().map(|(ticker, price)| (ticker, price))
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl<T: AsRef<str>> FromIterator<(T, f64)> for PriceMap {
    fn from_iter<I: IntoIterator<Item = (T, f64)>>(iter: I) -> Self {
        Self {
            quotes: iter
                .into_iter()
                .map(|(ticker, price)| (normalize_ticker(ticker.as_ref()), price))
                .collect(),
        }
    }
}

impl From<OrdMap<String, f64>> for PriceMap {
    fn from(quotes: OrdMap<String, f64>) -> Self {
        quotes.into_iter().collect()
    }
}

impl From<PriceMap> for OrdMap<String, f64> {
    fn from(prices: PriceMap) -> Self {
        prices.quotes
    }
}

/// Share purchase lots in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareLedger {
    entries: Vector<ShareEntry>,
}

impl ShareLedger {
    pub fn iter(&self) -> impl Iterator<Item = &ShareEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&ShareEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Records a lot and unconditionally sets the ticker's current price to
    /// `share.current_price`.
    pub fn add(&self, prices: &PriceMap, share: NewShare) -> (Self, PriceMap, ShareEntry) {
        let ticker = normalize_ticker(&share.ticker);
        let entry = ShareEntry {
            id: EntryId::issue(self.entries.iter().map(|e| e.id).max()),
            ticker,
            shares_held: share.shares_held,
            purchase_price: share.purchase_price,
            purchase_date: share.purchase_date,
        };
        debug!(id = %entry.id, ticker = %entry.ticker, shares = entry.shares_held, "share lot added");

        let prices = prices.record_quote(&entry.ticker, share.current_price);
        let mut entries = self.entries.clone();
        entries.push_back(entry.clone());
        (Self { entries }, prices, entry)
    }

    pub fn remove(&self, id: EntryId) -> Self {
        let mut entries = self.entries.clone();
        entries.retain(|entry| entry.id != id);
        if entries.len() != self.entries.len() {
            debug!(%id, "share lot removed");
        }
        Self { entries }
    }
}

impl FromIterator<ShareEntry> for ShareLedger {
    fn from_iter<I: IntoIterator<Item = ShareEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn lot(ticker: &str, purchase_price: f64, current_price: f64) -> NewShare {
        NewShare {
            ticker: ticker.to_string(),
            shares_held: 10.0,
            purchase_price,
            current_price,
            purchase_date: date("2024-01-02"),
        }
    }

    #[test]
    fn per_lot_metrics() {
        let entry = ShareEntry {
            id: EntryId::new(1),
            ticker: "AAPL".to_string(),
            shares_held: 10.0,
            purchase_price: 150.0,
            purchase_date: date("2024-01-02"),
        };
        assert_eq!(entry.profit_per_share(175.0), 25.0);
        assert_eq!(entry.total_profit(175.0), 250.0);
        assert!((entry.percentage_gain(175.0) - 16.666_666).abs() < 1e-4);
    }

    #[test]
    fn percentage_gain_is_unguarded_for_zero_purchase_price() {
        let entry = ShareEntry {
            id: EntryId::new(1),
            ticker: "FREE".to_string(),
            shares_held: 1.0,
            purchase_price: 0.0,
            purchase_date: date("2024-01-02"),
        };
        assert!(!entry.percentage_gain(10.0).is_finite());
    }

    #[test]
    fn ticker_is_upper_cased() {
        let (ledger, prices, entry) =
            ShareLedger::default().add(&PriceMap::default(), lot(" aapl ", 150.0, 175.0));
        assert_eq!(entry.ticker, "AAPL");
        assert_eq!(ledger.get(entry.id).unwrap().ticker, "AAPL");
        assert_eq!(prices.current_price_of("aapl"), 175.0);
    }

    #[test]
    fn new_lot_overwrites_shared_current_price() {
        let prices = PriceMap::default();
        let (ledger, prices, first) = ShareLedger::default().add(&prices, lot("AAPL", 150.0, 175.0));
        assert_eq!(prices.current_price_of("AAPL"), 175.0);

        let (ledger, prices, second) = ledger.add(&prices, lot("AAPL", 160.0, 180.0));
        assert_eq!(ledger.len(), 2);
        assert_eq!(prices.current_price_of(&first.ticker), 180.0);
        assert_eq!(prices.current_price_of(&second.ticker), 180.0);
        assert_eq!(prices.len(), 1);
    }

    #[test]
    fn unknown_ticker_is_priced_at_zero() {
        let prices = PriceMap::default();
        assert_eq!(prices.current_price_of("MSFT"), 0.0);
        assert_eq!(prices.quote("MSFT"), None);
    }

    #[test]
    fn update_current_price_returns_new_snapshot() {
        let before = PriceMap::from_iter([("AAPL", 175.0)]);
        let after = before.update_current_price("aapl", 190.0);
        assert_eq!(before.current_price_of("AAPL"), 175.0);
        assert_eq!(after.current_price_of("AAPL"), 190.0);
    }

    #[test]
    fn remove_unknown_id_keeps_order() {
        let prices = PriceMap::default();
        let (ledger, prices, _) = ShareLedger::default().add(&prices, lot("AAPL", 150.0, 175.0));
        let (ledger, _, _) = ledger.add(&prices, lot("MSFT", 300.0, 320.0));
        assert_eq!(ledger.remove(EntryId::new(0)), ledger);
    }

    #[test]
    fn purchase_price_eur_needs_rate_for_purchase_date() {
        let rates = RateTable::from_iter([(date("2024-01-02"), 1.25)]);
        let (_, _, entry) = ShareLedger::default().add(&PriceMap::default(), lot("AAPL", 150.0, 175.0));
        assert_eq!(entry.purchase_price_eur(&rates), Some(120.0));

        let old = ShareEntry {
            purchase_date: date("1998-06-01"),
            ..entry
        };
        assert_eq!(old.purchase_price_eur(&rates), None);
    }

    #[test]
    fn json_round_trip() {
        let (ledger, prices, _) =
            ShareLedger::default().add(&PriceMap::default(), lot("AAPL", 150.0, 175.0));
        let restored: ShareLedger =
            serde_json::from_str(&serde_json::to_string(&ledger).unwrap()).unwrap();
        assert_eq!(restored, ledger);

        let json = serde_json::to_string(&prices).unwrap();
        assert_eq!(json, r#"{"AAPL":175.0}"#);
        assert_eq!(serde_json::from_str::<PriceMap>(&json).unwrap(), prices);
    }

    #[test]
    fn stored_tickers_are_normalized() {
        let prices: PriceMap = serde_json::from_str(r#"{" aapl ": 175.5}"#).unwrap();
        assert_eq!(prices.quote("AAPL"), Some(175.5));
        assert_eq!(serde_json::to_string(&prices).unwrap(), r#"{"AAPL":175.5}"#);
    }
}
