use chrono::{DateTime, Utc};
use sea_orm::{DatabaseTransaction, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    CurrencyMetadata, EngineError, ExchangeRate, RateProvider, ResultEngine, currency,
    derive_pairwise_rates, exchange_rates, normalize_code,
};

use super::{Engine, with_tx};

/// Rows per `INSERT` when rewriting the rate table.
const RATE_INSERT_CHUNK: usize = 200;

/// Outcome of one [`Engine::refresh_exchange_rates`] run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateRefreshReport {
    pub stored: usize,
    /// Supported currencies the provider had no usable quote for.
    pub missing: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

impl Engine {
    pub(super) async fn stored_rate(
        &self,
        db: &DatabaseTransaction,
        from: &str,
        to: &str,
    ) -> ResultEngine<Option<f64>> {
        let row = exchange_rates::Entity::find_by_id((from.to_string(), to.to_string()))
            .one(db)
            .await?;
        Ok(row.map(|r| r.rate))
    }

    /// All rows of the currency reference table, ordered by code.
    pub async fn currencies(&self) -> ResultEngine<Vec<CurrencyMetadata>> {
        with_tx!(self, |db_tx| {
            currency::Entity::find()
                .order_by_asc(currency::Column::Code)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(CurrencyMetadata::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    pub async fn currency(&self, code: &str) -> ResultEngine<CurrencyMetadata> {
        let code = normalize_code(code)?;
        with_tx!(self, |db_tx| { self.require_currency(&db_tx, &code).await })
    }

    /// Price of one unit of `from` in `to`. Same-currency lookups return `1.0`.
    pub async fn exchange_rate(&self, from: &str, to: &str) -> ResultEngine<f64> {
        let from = normalize_code(from)?;
        let to = normalize_code(to)?;
        if from == to {
            return Ok(1.0);
        }
        with_tx!(self, |db_tx| {
            self.stored_rate(&db_tx, &from, &to)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("exchange rate {from}/{to}")))
        })
    }

    /// Replaces the whole rate table in one DB transaction.
    ///
    /// Readers see either the previous table or the new one, never a mix.
    pub async fn replace_rate_table(&self, rates: &[ExchangeRate]) -> ResultEngine<()> {
        for rate in rates {
            if !rate.rate.is_finite() || rate.rate <= 0.0 {
                return Err(EngineError::InvalidAmount(format!(
                    "invalid exchange rate {}/{}: {}",
                    rate.from_currency, rate.to_currency, rate.rate
                )));
            }
            if rate.from_currency == rate.to_currency {
                return Err(EngineError::InvalidInput(format!(
                    "exchange rate from {} to itself",
                    rate.from_currency
                )));
            }
        }

        with_tx!(self, |db_tx| {
            exchange_rates::Entity::delete_many().exec(&db_tx).await?;
            for chunk in rates.chunks(RATE_INSERT_CHUNK) {
                exchange_rates::Entity::insert_many(
                    chunk.iter().map(exchange_rates::ActiveModel::from),
                )
                .exec_without_returning(&db_tx)
                .await?;
            }
            Ok(())
        })
    }

    /// Fetches pivot quotes from `provider`, derives every pair between the
    /// supported currencies and stores them.
    ///
    /// Currencies without a usable quote are reported and left out. If no
    /// pair at all can be derived the stored table is kept as is.
    pub async fn refresh_exchange_rates<P: RateProvider>(
        &self,
        provider: &P,
    ) -> ResultEngine<RateRefreshReport> {
        let base_rates = provider.fetch_base_rates().await?;
        let fetched_at = Utc::now();

        let supported: Vec<String> = self
            .currencies()
            .await?
            .into_iter()
            .map(|c| c.code)
            .collect();
        let derived = derive_pairwise_rates(&base_rates, &supported, fetched_at);

        if !derived.missing.is_empty() {
            tracing::warn!(missing = ?derived.missing, "no usable quote for some currencies");
        }
        if derived.rates.is_empty() && supported.len() > 1 {
            return Err(EngineError::UpstreamUnavailable(
                "no usable quotes for the supported currencies".to_string(),
            ));
        }

        self.replace_rate_table(&derived.rates).await?;
        tracing::info!(stored = derived.rates.len(), "exchange rates refreshed");

        Ok(RateRefreshReport {
            stored: derived.rates.len(),
            missing: derived.missing,
            fetched_at,
        })
    }
}
