use crate::{
    report::{current_value, portfolio_profit, total_investment},
    DividendLedger, PriceMap, RateTable, ShareLedger,
};
use csv::WriterBuilder;
use std::io::Write;

const DIVIDEND_HEADERS: [&str; 4] = ["Payment Date", "USD Amount", "Exchange Rate", "EUR Amount"];
const SHARE_HEADERS: [&str; 9] = [
    "Ticker",
    "Shares Held",
    "Purchase Price (USD)",
    "Purchase Price (EUR)",
    "Current Price",
    "Purchase Date",
    "Profit per Share",
    "Total Profit",
    "Gain %",
];
const NOT_AVAILABLE: &str = "N/A";

/// Fixed-point formatting where exact binary ties round away from zero.
/// `format!` alone rounds them to even, so 10.125 would come out as 10.12.
fn fixed(value: f64, digits: i32) -> String {
    let scale = 10f64.powi(digits);
    let scaled = value * scale;
    let exact_tie = scaled.fract().abs() == 0.5 && value.mul_add(scale, -scaled) == 0.0;
    let value = if exact_tie {
        scaled.round() / scale
    } else {
        value
    };
    // adding 0.0 turns -0.0 into 0.0
    format!("{:.*}", digits as usize, value + 0.0)
}

fn cents(value: f64) -> String {
    fixed(value, 2)
}

fn rate(value: f64) -> String {
    fixed(value, 4)
}

fn cents_or_na(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() => cents(value),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn write_dividends_csv<W: Write>(ledger: &DividendLedger, writer: W) -> std::io::Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(DIVIDEND_HEADERS)?;

    for dividend in ledger.iter() {
        writer.write_record([
            dividend.payment_date.to_string(),
            cents(dividend.dollar_amount),
            rate(dividend.exchange_rate),
            cents(dividend.euro_amount),
        ])?;
    }

    let mut out = writer.into_inner().map_err(|e| e.into_error())?;
    writeln!(out)?;
    writeln!(
        out,
        "Total,{},,{}",
        cents(ledger.total_usd()),
        cents(ledger.total_eur())
    )?;
    out.flush()
}

pub fn write_shares_csv<W: Write>(
    shares: &ShareLedger,
    prices: &PriceMap,
    rates: &RateTable,
    writer: W,
) -> std::io::Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(SHARE_HEADERS)?;

    for share in shares.iter() {
        let current_price = prices.current_price_of(&share.ticker);
        writer.write_record([
            share.ticker.clone(),
            share.shares_held.to_string(),
            cents(share.purchase_price),
            cents_or_na(share.purchase_price_eur(rates)),
            cents(current_price),
            share.purchase_date.to_string(),
            cents(share.profit_per_share(current_price)),
            cents(share.total_profit(current_price)),
            cents_or_na(Some(share.percentage_gain(current_price))),
        ])?;
    }

    let profit = portfolio_profit(shares, prices);
    let mut out = writer.into_inner().map_err(|e| e.into_error())?;
    writeln!(out)?;
    writeln!(out, "Total Investment,${}", cents(total_investment(shares)))?;
    writeln!(out, "Current Value,${}", cents(current_value(shares, prices)))?;
    writeln!(
        out,
        "Total Profit,${},{}%",
        cents(profit.total_profit),
        cents(profit.total_profit_percentage)
    )?;
    out.flush()
}
