pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{CurrencyCode, RateProvider};
use crate::providers::ExchangeRateApiProvider;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Convert {
        amount: String,
        from: Option<String>,
        to: Option<String>,
    },
    Rates {
        base: Option<String>,
    },
    Interactive,
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    api_key: Option<&str>,
) -> Result<()> {
    info!("fxconv starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    // CLI flag (or env) takes precedence over the config file.
    let api_key = api_key
        .map(str::to_string)
        .or_else(|| config.api_key.clone());
    let provider = ExchangeRateApiProvider::new(&config.provider.base_url, api_key);

    match command {
        AppCommand::Convert { amount, from, to } => {
            let base: CurrencyCode = from.as_deref().unwrap_or(&config.base_currency).parse()?;
            let target: CurrencyCode = to.as_deref().unwrap_or(&config.target_currency).parse()?;
            cli::convert::run(&provider, base, target, &amount).await
        }
        AppCommand::Rates { base } => {
            let base: CurrencyCode = base.as_deref().unwrap_or(&config.base_currency).parse()?;
            cli::rates::run(&provider, base).await
        }
        AppCommand::Interactive => {
            let base: CurrencyCode = config.base_currency.parse()?;
            let target: CurrencyCode = config.target_currency.parse()?;
            let provider: Arc<dyn RateProvider> = Arc::new(provider);
            cli::interactive::run(provider, base, target).await
        }
    }
}
