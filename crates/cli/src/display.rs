use eurofolio_lib::{
    report::{current_value, group_by_year, portfolio_profit, total_investment},
    storage::{Form, FormState},
    DividendEntry, DividendLedger, PriceMap, RateTable, ShareEntry, ShareLedger,
};

fn gain(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}%")
    } else {
        "N/A".to_string()
    }
}

fn open_or_closed(open: bool) -> &'static str {
    if open {
        "open"
    } else {
        "closed"
    }
}

pub fn print_dividend_added(entry: &DividendEntry) {
    println!(
        "Added dividend {}: ${:.2} on {} at {:.4} = €{:.2}",
        entry.id, entry.dollar_amount, entry.payment_date, entry.exchange_rate, entry.euro_amount
    );
}

pub fn print_share_added(entry: &ShareEntry, prices: &PriceMap) {
    println!(
        "Added {} {} @ ${:.2} on {} (id {}), {} now at ${:.2}",
        entry.shares_held,
        entry.ticker,
        entry.purchase_price,
        entry.purchase_date,
        entry.id,
        entry.ticker,
        prices.current_price_of(&entry.ticker)
    );
}

pub fn print_dividends(ledger: &DividendLedger) {
    if ledger.is_empty() {
        println!("No dividends recorded");
        return;
    }

    println!(
        "{:<15} {:<12} {:>12} {:>8} {:>12}",
        "ID", "Date", "USD", "Rate", "EUR"
    );
    for d in ledger.iter() {
        println!(
            "{:<15} {:<12} {:>12.2} {:>8.4} {:>12.2}",
            d.id.to_string(),
            d.payment_date.to_string(),
            d.dollar_amount,
            d.exchange_rate,
            d.euro_amount
        );
    }
    println!(
        "{:<15} {:<12} {:>12.2} {:>8} {:>12.2}",
        "Total",
        "",
        ledger.total_usd(),
        "",
        ledger.total_eur()
    );
}

pub fn print_shares(shares: &ShareLedger, prices: &PriceMap, rates: &RateTable) {
    if shares.is_empty() {
        println!("No shares recorded");
        return;
    }

    for group in group_by_year(shares) {
        println!("== {} ==", group.year);
        println!(
            "{:<15} {:<8} {:>10} {:>10} {:>10} {:>10} {:<12} {:>10} {:>12} {:>9}",
            "ID", "Ticker", "Shares", "Buy USD", "Buy EUR", "Current", "Date", "P/Share", "Profit", "Gain"
        );
        for s in &group.entries {
            let current = prices.current_price_of(&s.ticker);
            let eur = s
                .purchase_price_eur(rates)
                .map(|eur| format!("{eur:.2}"))
                .unwrap_or_else(|| "N/A".to_string());
            println!(
                "{:<15} {:<8} {:>10} {:>10.2} {:>10} {:>10.2} {:<12} {:>10.2} {:>12.2} {:>9}",
                s.id.to_string(),
                s.ticker,
                s.shares_held,
                s.purchase_price,
                eur,
                current,
                s.purchase_date.to_string(),
                s.profit_per_share(current),
                s.total_profit(current),
                gain(s.percentage_gain(current))
            );
        }
        println!();
    }

    let profit = portfolio_profit(shares, prices);
    println!("Total investment: ${:.2}", total_investment(shares));
    println!("Current value:    ${:.2}", current_value(shares, prices));
    println!(
        "Total profit:     ${:.2} ({})",
        profit.total_profit,
        gain(profit.total_profit_percentage)
    );
}

pub fn print_form_state(state: &FormState) {
    println!("dividends form: {}", open_or_closed(state.is_open(Form::Dividends)));
    println!("shares form:    {}", open_or_closed(state.is_open(Form::Shares)));
}
