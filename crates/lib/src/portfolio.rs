use crate::{
    command::Command,
    dividend::DividendLedger,
    error::Error,
    rates::RateTable,
    share::{PriceMap, ShareLedger},
    storage::{load_or_default, Repository, StorageError, StorageKey},
};
use tracing::warn;

/// Snapshot of everything the user has recorded.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub dividends: DividendLedger,
    pub shares: ShareLedger,
    pub prices: PriceMap,
}

impl Portfolio {
    pub fn load<R: Repository>(repo: &R) -> Self {
        Self {
            dividends: load_or_default(repo, StorageKey::Dividends, DividendLedger::default()),
            shares: load_or_default(repo, StorageKey::Shares, ShareLedger::default()),
            prices: load_or_default(repo, StorageKey::TickerPrices, PriceMap::default()),
        }
    }

    pub fn save<R: Repository>(&self, repo: &mut R) -> Result<(), StorageError> {
        self.save_keys(
            repo,
            &[StorageKey::Dividends, StorageKey::Shares, StorageKey::TickerPrices],
        )
    }

    /// Writes only `keys`. Other stored values are left untouched, even when
    /// they failed to load and `self` holds a default in their place.
    pub fn save_keys<R: Repository>(
        &self,
        repo: &mut R,
        keys: &[StorageKey],
    ) -> Result<(), StorageError> {
        for &key in keys {
            match key {
                StorageKey::Dividends => repo.save(key, &self.dividends)?,
                StorageKey::Shares => repo.save(key, &self.shares)?,
                StorageKey::TickerPrices => repo.save(key, &self.prices)?,
                StorageKey::DividendFormOpen | StorageKey::SharesFormOpen => {}
            }
        }
        Ok(())
    }

    /// Applies one command, producing the next snapshot. On error `self`
    /// remains the current state.
    pub fn execute(&self, command: Command, rates: &RateTable) -> Result<Self, Error> {
        let mut next = self.clone();
        match command {
            Command::AddDividend(d) => {
                let (dividends, _) = self.dividends.add(d.dollar_amount, d.payment_date, rates)?;
                next.dividends = dividends;
            }
            Command::RemoveDividend { id } => next.dividends = self.dividends.remove(id),
            Command::AddShare(share) => {
                let (shares, prices, _) = self.shares.add(&self.prices, share);
                next.shares = shares;
                next.prices = prices;
            }
            Command::RemoveShare { id } => next.shares = self.shares.remove(id),
            Command::UpdateCurrentPrice { ticker, price } => {
                next.prices = self.prices.update_current_price(&ticker, price)
            }
        }

        Ok(next)
    }
}

/// Storage keys whose values `command` can change.
pub fn touched_keys(command: &Command) -> &'static [StorageKey] {
    match command {
        Command::AddDividend(_) | Command::RemoveDividend { .. } => &[StorageKey::Dividends],
        Command::AddShare(_) => &[StorageKey::Shares, StorageKey::TickerPrices],
        Command::RemoveShare { .. } => &[StorageKey::Shares],
        Command::UpdateCurrentPrice { .. } => &[StorageKey::TickerPrices],
    }
}

/// Runs `commands` from an empty portfolio, skipping the ones that are rejected.
pub fn replay(rates: &RateTable, commands: impl IntoIterator<Item = Command>) -> Portfolio {
    commands
        .into_iter()
        .fold(Portfolio::default(), |portfolio, command| {
            match portfolio.execute(command, rates) {
                Ok(next) => next,
                Err(err) => {
                    warn!(%err, "command rejected");
                    portfolio
                }
            }
        })
}
