use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No exchange rate available for {0}")]
    RateUnavailable(NaiveDate),
    #[error("Storage error")]
    Storage(#[from] crate::storage::StorageError),
    #[error("Invalid command list")]
    Json(#[from] serde_json::Error),
}
