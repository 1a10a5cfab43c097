mod display;

use clap::{Parser, Subcommand, ValueEnum};
use eurofolio_lib::{
    parse_amount, parse_date, parse_dividend, parse_share, parse_ticker, record,
    storage::{Form, FormState, JsonFileRepository},
    write_dividends_csv, write_shares_csv, Command, DividendForm, EntryId, Error, Field,
    Portfolio, RateTable, ShareForm,
};
use eyre::{Result, WrapErr};
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eurofolio", version, about = "Track USD dividends and share lots in EUR")]
struct Cli {
    /// Directory holding the stored ledgers
    #[arg(long, env = "EUROFOLIO_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Exchange-rate file, defaults to `<data-dir>/exchange-rates.json`
    #[arg(long, env = "EUROFOLIO_RATES", global = true)]
    rates: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record and report dividend payments
    Dividend {
        #[command(subcommand)]
        action: DividendCommands,
    },
    /// Record and report share purchases
    Share {
        #[command(subcommand)]
        action: ShareCommands,
    },
    /// Inspect the loaded exchange rates
    Rates {
        #[command(subcommand)]
        action: RatesCommands,
    },
    /// Entry form visibility
    Form {
        #[command(subcommand)]
        action: FormCommands,
    },
}

#[derive(Subcommand)]
enum DividendCommands {
    Add {
        /// Amount in USD
        #[arg(long)]
        amount: String,
        /// Payment date, YYYY-MM-DD
        #[arg(long)]
        date: String,
    },
    Remove {
        id: String,
    },
    List,
    Export {
        /// Output file, `-` for stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ShareCommands {
    Add {
        #[arg(long)]
        ticker: String,
        /// Number of shares, fractions allowed
        #[arg(long)]
        shares: String,
        /// Purchase price per share in USD
        #[arg(long)]
        price: String,
        /// Purchase date, YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Current price per share, defaults to the stored quote
        #[arg(long)]
        current_price: Option<String>,
    },
    Remove {
        id: String,
    },
    /// Set the current price of every lot of a ticker
    Price {
        ticker: String,
        price: String,
    },
    List,
    Export {
        /// Output file, `-` for stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum RatesCommands {
    Range,
    Get { date: String },
}

#[derive(Subcommand)]
enum FormCommands {
    Show,
    Toggle { form: FormArg },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormArg {
    Dividends,
    Shares,
}

impl From<FormArg> for Form {
    fn from(form: FormArg) -> Self {
        match form {
            FormArg::Dividends => Form::Dividends,
            FormArg::Shares => Form::Shares,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn export_writer(output: Option<PathBuf>, prefix: &str) -> Result<Box<dyn Write>> {
    let path = output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "{prefix}-{}.csv",
            chrono::Utc::now().date_naive().format("%Y-%m-%d")
        ))
    });
    if path.as_os_str() == "-" {
        return Ok(Box::new(io::stdout().lock()));
    }
    let file =
        File::create(&path).wrap_err_with(|| format!("Failed to create {}", path.display()))?;
    eprintln!("Writing {}", path.display());
    Ok(Box::new(BufWriter::new(file)))
}

fn parse_id(raw: &str) -> Result<EntryId> {
    raw.parse()
        .wrap_err_with(|| format!("`{raw}` is not an entry id"))
}

fn rate_unavailable(rates: &RateTable, date: chrono::NaiveDate) -> eyre::Report {
    match rates.range() {
        Some(range) => eyre::eyre!(
            "No exchange rate for {date}, pick a trading day between {} and {}",
            range.min,
            range.max
        ),
        None => eyre::eyre!("No exchange rate for {date}, no exchange rates are loaded"),
    }
}

fn run_dividend(
    action: DividendCommands,
    repo: &mut JsonFileRepository,
    rates: &RateTable,
) -> Result<()> {
    match action {
        DividendCommands::Add { amount, date } => {
            let command = parse_dividend(&DividendForm {
                dollar_amount: amount,
                payment_date: date,
            })?;
            let portfolio = match record(repo, rates, command) {
                Ok(portfolio) => portfolio,
                Err(Error::RateUnavailable(date)) => return Err(rate_unavailable(rates, date)),
                Err(err) => return Err(err.into()),
            };
            if let Some(entry) = portfolio.dividends.iter().last() {
                display::print_dividend_added(entry);
            }
        }
        DividendCommands::Remove { id } => {
            let id = parse_id(&id)?;
            if Portfolio::load(&*repo).dividends.get(id).is_none() {
                println!("No dividend with id {id}");
                return Ok(());
            }
            record(repo, rates, Command::new_remove_dividend(id))?;
            println!("Removed dividend {id}");
        }
        DividendCommands::List => display::print_dividends(&Portfolio::load(&*repo).dividends),
        DividendCommands::Export { output } => {
            let portfolio = Portfolio::load(&*repo);
            write_dividends_csv(&portfolio.dividends, export_writer(output, "dividends")?)
                .wrap_err("Failed to export dividends")?;
        }
    }
    Ok(())
}

fn run_share(action: ShareCommands, repo: &mut JsonFileRepository, rates: &RateTable) -> Result<()> {
    match action {
        ShareCommands::Add {
            ticker,
            shares,
            price,
            date,
            current_price,
        } => {
            let current_price = match current_price {
                Some(price) => price,
                None => Portfolio::load(&*repo)
                    .prices
                    .quote(&ticker)
                    .map(|quote| quote.to_string())
                    .unwrap_or_default(),
            };
            let command = parse_share(&ShareForm {
                ticker,
                shares_held: shares,
                purchase_price: price,
                current_price,
                purchase_date: date,
            })?;
            let portfolio = record(repo, rates, command)?;
            if let Some(entry) = portfolio.shares.iter().last() {
                display::print_share_added(entry, &portfolio.prices);
            }
        }
        ShareCommands::Remove { id } => {
            let id = parse_id(&id)?;
            if Portfolio::load(&*repo).shares.get(id).is_none() {
                println!("No share lot with id {id}");
                return Ok(());
            }
            record(repo, rates, Command::new_remove_share(id))?;
            println!("Removed share lot {id}");
        }
        ShareCommands::Price { ticker, price } => {
            let ticker = parse_ticker(&ticker)?;
            let price = parse_amount(Field::CurrentPrice, &price)?;
            record(repo, rates, Command::new_update_current_price(&ticker, price))?;
            println!("{ticker} now at ${price:.2}");
        }
        ShareCommands::List => {
            let portfolio = Portfolio::load(&*repo);
            display::print_shares(&portfolio.shares, &portfolio.prices, rates);
        }
        ShareCommands::Export { output } => {
            let portfolio = Portfolio::load(&*repo);
            write_shares_csv(
                &portfolio.shares,
                &portfolio.prices,
                rates,
                export_writer(output, "shares")?,
            )
            .wrap_err("Failed to export shares")?;
        }
    }
    Ok(())
}

fn run_rates(action: RatesCommands, rates: &RateTable) -> Result<()> {
    match action {
        RatesCommands::Range => match rates.range() {
            Some(range) => println!("{} to {} ({} rates)", range.min, range.max, rates.len()),
            None => println!("No exchange rates loaded"),
        },
        RatesCommands::Get { date } => {
            let date = parse_date(Field::PaymentDate, &date)?;
            match rates.rate_at(date) {
                Some(rate) => println!("{date}: 1 EUR = {rate:.4} USD"),
                None => return Err(rate_unavailable(rates, date)),
            }
        }
    }
    Ok(())
}

fn run_form(action: FormCommands, repo: &mut JsonFileRepository) -> Result<()> {
    let state = FormState::load(&*repo);
    match action {
        FormCommands::Show => display::print_form_state(&state),
        FormCommands::Toggle { form } => {
            let state = state.toggle(repo, form.into())?;
            display::print_form_state(&state);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut repo = JsonFileRepository::new(&cli.data_dir);
    let rates_path = cli
        .rates
        .unwrap_or_else(|| cli.data_dir.join("exchange-rates.json"));
    debug!(data_dir = %cli.data_dir.display(), rates = %rates_path.display(), "starting");
    let rates = RateTable::load(rates_path);

    match cli.command {
        Commands::Dividend { action } => run_dividend(action, &mut repo, &rates),
        Commands::Share { action } => run_share(action, &mut repo, &rates),
        Commands::Rates { action } => run_rates(action, &rates),
        Commands::Form { action } => run_form(action, &mut repo),
    }
}
