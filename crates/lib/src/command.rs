use crate::{id::EntryId, share::NewShare};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    AddDividend(NewDividend),
    RemoveDividend { id: EntryId },
    AddShare(NewShare),
    RemoveShare { id: EntryId },
    UpdateCurrentPrice { ticker: String, price: f64 },
}

impl Command {
    pub fn new_add_dividend(dollar_amount: f64, payment_date: NaiveDate) -> Self {
        Self::AddDividend(NewDividend {
            dollar_amount,
            payment_date,
        })
    }
    pub fn new_remove_dividend(id: EntryId) -> Self {
        Self::RemoveDividend { id }
    }
    pub fn new_add_share(share: NewShare) -> Self {
        Self::AddShare(share)
    }
    pub fn new_remove_share(id: EntryId) -> Self {
        Self::RemoveShare { id }
    }
    pub fn new_update_current_price(ticker: impl Into<String>, price: f64) -> Self {
        Self::UpdateCurrentPrice {
            ticker: ticker.into(),
            price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDividend {
    pub dollar_amount: f64,
    pub payment_date: NaiveDate,
}
