use crate::{command::Command, share::normalize_ticker, share::NewShare};
use chrono::NaiveDate;
use strum_macros::Display;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Field {
    #[strum(serialize = "dollar amount")]
    DollarAmount,
    #[strum(serialize = "payment date")]
    PaymentDate,
    #[strum(serialize = "ticker")]
    Ticker,
    #[strum(serialize = "shares held")]
    SharesHeld,
    #[strum(serialize = "purchase price")]
    PurchasePrice,
    #[strum(serialize = "current price")]
    CurrentPrice,
    #[strum(serialize = "purchase date")]
    PurchaseDate,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParserError {
    #[error("Field `{0}` is required")]
    MissingField(Field),
    #[error("Field `{field}` is not a number: `{value}`")]
    InvalidNumericInput { field: Field, value: String },
    #[error("Field `{field}` is not a YYYY-MM-DD date: `{value}`")]
    InvalidDate { field: Field, value: String },
    #[error("Field `{0}` must be greater than zero")]
    NonPositivePrice(Field),
}

/// Raw dividend form input.
#[derive(Debug, Clone, Default)]
pub struct DividendForm {
    pub dollar_amount: String,
    pub payment_date: String,
}

/// Raw share purchase form input.
#[derive(Debug, Clone, Default)]
pub struct ShareForm {
    pub ticker: String,
    pub shares_held: String,
    pub purchase_price: String,
    pub current_price: String,
    pub purchase_date: String,
}

fn required(field: Field, value: &str) -> Result<&str, ParserError> {
    match value.trim() {
        "" => Err(ParserError::MissingField(field)),
        value => Ok(value),
    }
}

pub fn parse_amount(field: Field, value: &str) -> Result<f64, ParserError> {
    let raw = required(field, value)?;
    match raw.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(ParserError::InvalidNumericInput {
            field,
            value: raw.to_string(),
        }),
    }
}

pub fn parse_price(field: Field, value: &str) -> Result<f64, ParserError> {
    let price = parse_amount(field, value)?;
    if price <= 0.0 {
        return Err(ParserError::NonPositivePrice(field));
    }
    Ok(price)
}

pub fn parse_date(field: Field, value: &str) -> Result<NaiveDate, ParserError> {
    let raw = required(field, value)?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ParserError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}

pub fn parse_ticker(value: &str) -> Result<String, ParserError> {
    required(Field::Ticker, value).map(normalize_ticker)
}

pub fn parse_dividend(form: &DividendForm) -> Result<Command, ParserError> {
    Ok(Command::new_add_dividend(
        parse_amount(Field::DollarAmount, &form.dollar_amount)?,
        parse_date(Field::PaymentDate, &form.payment_date)?,
    ))
}

pub fn parse_share(form: &ShareForm) -> Result<Command, ParserError> {
    Ok(Command::AddShare(NewShare {
        ticker: parse_ticker(&form.ticker)?,
        shares_held: parse_amount(Field::SharesHeld, &form.shares_held)?,
        purchase_price: parse_price(Field::PurchasePrice, &form.purchase_price)?,
        current_price: parse_amount(Field::CurrentPrice, &form.current_price)?,
        purchase_date: parse_date(Field::PurchaseDate, &form.purchase_date)?,
    }))
}
