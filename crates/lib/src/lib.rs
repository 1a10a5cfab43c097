mod command;
mod dividend;
mod error;
mod id;
mod parser;
mod portfolio;
mod rates;
pub mod report;
mod share;
pub mod storage;
mod writer;

pub use command::*;
pub use dividend::*;
pub use error::Error;
pub use id::EntryId;
pub use parser::*;
pub use portfolio::*;
pub use rates::*;
pub use share::*;
pub use writer::{write_dividends_csv, write_shares_csv};

use storage::Repository;

/// Replays a JSON array of commands against `rates`.
pub fn replay_json<R: std::io::Read>(rates: &RateTable, reader: R) -> Result<Portfolio, Error> {
    let commands: Vec<Command> = serde_json::from_reader(reader)?;
    Ok(replay(rates, commands))
}

/// Loads the stored portfolio, applies `command` and persists the values it
/// changed. Nothing is written when the command is rejected.
pub fn record<R: Repository>(
    repo: &mut R,
    rates: &RateTable,
    command: Command,
) -> Result<Portfolio, Error> {
    let keys = touched_keys(&command);
    let portfolio = Portfolio::load(repo).execute(command, rates)?;
    portfolio.save_keys(repo, keys)?;
    Ok(portfolio)
}
