use super::ui;
use crate::core::{ConversionSession, CurrencyCode, RateProvider, SessionStatus};
use anyhow::{Result, bail};

/// Runs a one-shot conversion and prints the result.
pub async fn run(
    provider: &dyn RateProvider,
    base: CurrencyCode,
    target: CurrencyCode,
    amount: &str,
) -> Result<()> {
    let mut session = ConversionSession::new(base, target);
    session.set_amount(amount);

    let ticket = session.begin_fetch();
    let pb = ui::new_spinner(&format!("Fetching rates for {}...", ticket.base()));
    let outcome = provider.latest(ticket.base()).await;
    pb.finish_and_clear();
    session.apply_rates(&ticket, outcome);

    if session.status() == SessionStatus::Failed {
        bail!(
            "{}",
            session.error_message().unwrap_or("Rate fetch failed")
        );
    }

    match session.converted_amount() {
        Some(converted) => {
            println!(
                "{} {} = {} {}",
                session.amount(),
                session.base(),
                ui::style_text(&converted, ui::StyleType::Value),
                session.target()
            );
            if let Some(rate) = session.unit_rate() {
                println!(
                    "{}",
                    ui::style_text(
                        &format!("1 {} = {:.4} {}", session.base(), rate, session.target()),
                        ui::StyleType::Subtle
                    )
                );
            }
        }
        // Conversion is withheld rather than failed: say which input was
        // unusable and exit cleanly.
        None => {
            let hint = if session.unit_rate().is_none() {
                format!("No rate available for {}", session.target())
            } else {
                format!("Amount '{}' is not a number", session.amount())
            };
            println!("{}", ui::style_text(&hint, ui::StyleType::Subtle));
        }
    }

    Ok(())
}
