use super::ui;
use crate::core::{CurrencyCode, RateProvider};
use anyhow::Result;
use comfy_table::Cell;

/// Fetches and prints the full conversion-rate table for a base currency.
pub async fn run(provider: &dyn RateProvider, base: CurrencyCode) -> Result<()> {
    let pb = ui::new_spinner(&format!("Fetching rates for {base}..."));
    let result = provider.latest(&base).await;
    pb.finish_and_clear();
    let rates = result?;

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (1 {base})")),
    ]);
    for (code, rate) in rates.iter() {
        table.add_row(vec![Cell::new(code.as_str()), ui::rate_cell(rate)]);
    }
    println!("{table}");

    if let Some(fetched_at) = rates.fetched_at() {
        println!(
            "{}",
            ui::style_text(
                &format!("Rates as of {}", fetched_at.format("%Y-%m-%d %H:%M UTC")),
                ui::StyleType::Subtle
            )
        );
    }
    println!(
        "{}",
        ui::style_text(&format!("{} currencies", rates.len()), ui::StyleType::Subtle)
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RateError, RateTable};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FixedRates;

    #[async_trait]
    impl RateProvider for FixedRates {
        async fn latest(&self, base: &CurrencyCode) -> Result<RateTable, RateError> {
            let raw = HashMap::from([("EUR".to_string(), 0.92), ("IDR".to_string(), 15234.5)]);
            Ok(RateTable::from_raw(base.clone(), None, raw))
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl RateProvider for AlwaysFails {
        async fn latest(&self, _base: &CurrencyCode) -> Result<RateTable, RateError> {
            Err(RateError::Provider("invalid-key".to_string()))
        }
    }

    #[tokio::test]
    async fn test_run_prints_table() {
        let result = run(&FixedRates, "USD".parse().unwrap()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_run_surfaces_fetch_failure() {
        let result = run(&AlwaysFails, "USD".parse().unwrap()).await;
        let error_msg = result.unwrap_err().to_string();
        assert!(error_msg.contains("invalid-key"), "{error_msg}");
    }
}
