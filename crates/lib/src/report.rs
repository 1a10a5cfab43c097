use crate::share::{PriceMap, ShareEntry, ShareLedger};
use chrono::Datelike;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioProfit {
    pub total_profit: f64,
    pub total_profit_percentage: f64,
}

/// Lots bought in one calendar year, oldest purchase first.
#[derive(Debug, Clone, PartialEq)]
pub struct YearGroup {
    pub year: i32,
    pub entries: Vec<ShareEntry>,
}

pub fn total_investment(shares: &ShareLedger) -> f64 {
    shares
        .iter()
        .map(|s| s.purchase_price * s.shares_held)
        .sum()
}

pub fn current_value(shares: &ShareLedger, prices: &PriceMap) -> f64 {
    shares
        .iter()
        .map(|s| prices.current_price_of(&s.ticker) * s.shares_held)
        .sum()
}

/// The percentage is 0 when nothing has been invested.
pub fn portfolio_profit(shares: &ShareLedger, prices: &PriceMap) -> PortfolioProfit {
    let investment = total_investment(shares);
    let total_profit = current_value(shares, prices) - investment;
    let total_profit_percentage = if investment > 0.0 {
        total_profit / investment * 100.0
    } else {
        0.0
    };

    PortfolioProfit {
        total_profit,
        total_profit_percentage,
    }
}

pub fn group_by_year(shares: &ShareLedger) -> Vec<YearGroup> {
    let mut years: BTreeMap<i32, Vec<ShareEntry>> = BTreeMap::new();
    for share in shares.iter() {
        years
            .entry(share.purchase_date.year())
            .or_default()
            .push(share.clone());
    }

    years
        .into_iter()
        .map(|(year, mut entries)| {
            // stable, so same-day lots keep insertion order
            entries.sort_by_key(|s| s.purchase_date);
            YearGroup { year, entries }
        })
        .collect()
}
