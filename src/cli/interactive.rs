use super::ui;
use crate::core::{
    ConversionSession, CurrencyCode, FetchTicket, RateError, RateProvider, RateTable,
    SessionStatus,
};
use anyhow::Result;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

type FetchOutcome = (FetchTicket, Result<RateTable, RateError>);

enum Command<'a> {
    Quit,
    Help,
    Swap,
    SetBase(&'a str),
    SetTarget(&'a str),
    ListRates,
    Amount(&'a str),
}

fn parse_command(input: &str) -> Command<'_> {
    let mut parts = input.split_whitespace();
    let first = parts.next().map(str::to_ascii_lowercase);
    match (first.as_deref(), parts.next()) {
        (Some("quit") | Some("exit") | Some("q"), None) => Command::Quit,
        (Some("help") | Some("?"), None) => Command::Help,
        (Some("swap"), None) => Command::Swap,
        (Some("from") | Some("base"), Some(code)) => Command::SetBase(code),
        (Some("to") | Some("target"), Some(code)) => Command::SetTarget(code),
        (Some("rates"), None) => Command::ListRates,
        _ => Command::Amount(input),
    }
}

/// Interactive conversion loop.
///
/// At most one fetch is in flight at a time; issuing a new one aborts the
/// previous task, and a response that outlives its ticket is discarded by
/// the session. Rate responses are delivered through a channel so the
/// prompt stays responsive while a fetch runs.
pub async fn run(
    provider: Arc<dyn RateProvider>,
    base: CurrencyCode,
    target: CurrencyCode,
) -> Result<()> {
    let mut session = ConversionSession::new(base, target);
    let (tx, mut rx) = mpsc::channel::<FetchOutcome>(4);
    let mut in_flight: Option<JoinHandle<()>> = None;

    let ticket = session.begin_fetch();
    spawn_fetch(&provider, &tx, ticket, &mut in_flight);

    print_help();
    render(&session);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                match parse_command(input) {
                    Command::Quit => break,
                    Command::Help => print_help(),
                    Command::Swap => {
                        let ticket = session.swap();
                        spawn_fetch(&provider, &tx, ticket, &mut in_flight);
                        render(&session);
                    }
                    Command::SetBase(text) => match text.parse::<CurrencyCode>() {
                        Ok(code) => {
                            if let Some(ticket) = session.set_base(code) {
                                spawn_fetch(&provider, &tx, ticket, &mut in_flight);
                            }
                            render(&session);
                        }
                        Err(e) => {
                            println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error));
                        }
                    },
                    Command::SetTarget(text) => match text.parse::<CurrencyCode>() {
                        Ok(code) => {
                            session.set_target(code);
                            render(&session);
                        }
                        Err(e) => {
                            println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error));
                        }
                    },
                    Command::ListRates => print_available(&session),
                    Command::Amount(text) => {
                        session.set_amount(text);
                        render(&session);
                    }
                }
            }
            Some((ticket, outcome)) = rx.recv() => {
                if session.apply_rates(&ticket, outcome) {
                    render(&session);
                }
            }
        }
    }

    if let Some(handle) = in_flight {
        handle.abort();
    }
    Ok(())
}

fn spawn_fetch(
    provider: &Arc<dyn RateProvider>,
    tx: &mpsc::Sender<FetchOutcome>,
    ticket: FetchTicket,
    in_flight: &mut Option<JoinHandle<()>>,
) {
    if let Some(handle) = in_flight.take() {
        debug!("Aborting superseded rate fetch");
        handle.abort();
    }
    let provider = Arc::clone(provider);
    let tx = tx.clone();
    *in_flight = Some(tokio::spawn(async move {
        let outcome = provider.latest(ticket.base()).await;
        // A send failure means the loop has exited; nothing to deliver to.
        let _ = tx.send((ticket, outcome)).await;
    }));
}

fn render(session: &ConversionSession) {
    match session.status() {
        SessionStatus::Loading => {
            println!(
                "{}",
                ui::style_text(
                    &format!("Fetching rates for {}...", session.base()),
                    ui::StyleType::Subtle
                )
            );
        }
        SessionStatus::Failed => {
            println!(
                "{}",
                ui::style_text(
                    session.error_message().unwrap_or("Rate fetch failed"),
                    ui::StyleType::Error
                )
            );
            println!(
                "{}",
                ui::style_text("Check the API key and try again", ui::StyleType::Subtle)
            );
        }
        SessionStatus::Ready => match session.converted_amount() {
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
            None => {
                let hint = if session.unit_rate().is_none() {
                    format!("No rate available for {}", session.target())
                } else {
                    format!("Amount '{}' is not a number", session.amount())
                };
                println!("{}", ui::style_text(&hint, ui::StyleType::Subtle));
            }
        },
        SessionStatus::Idle => {}
    }
}

fn print_available(session: &ConversionSession) {
    let codes = session.available_currencies();
    if codes.is_empty() {
        println!("{}", ui::style_text("No rates loaded", ui::StyleType::Subtle));
        return;
    }
    for chunk in codes.chunks(10) {
        let line = chunk
            .iter()
            .map(|code| code.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        println!("  {line}");
    }
}

fn print_help() {
    println!("{}", ui::style_text("Commands", ui::StyleType::Title));
    println!("  <amount>       convert a new amount");
    println!("  from <code>    change the base currency (refetches rates)");
    println!("  to <code>      change the target currency");
    println!("  swap           swap base and target");
    println!("  rates          list available target currencies");
    println!("  help           show this help");
    println!("  quit           exit");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_quit_aliases() {
        assert!(matches!(parse_command("quit"), Command::Quit));
        assert!(matches!(parse_command("exit"), Command::Quit));
        assert!(matches!(parse_command("q"), Command::Quit));
        assert!(matches!(parse_command("QUIT"), Command::Quit));
    }

    #[test]
    fn test_parse_command_base_and_target() {
        assert!(matches!(parse_command("from EUR"), Command::SetBase("EUR")));
        assert!(matches!(parse_command("base eur"), Command::SetBase("eur")));
        assert!(matches!(parse_command("to GBP"), Command::SetTarget("GBP")));
        assert!(matches!(
            parse_command("target idr"),
            Command::SetTarget("idr")
        ));
    }

    #[test]
    fn test_parse_command_falls_back_to_amount() {
        assert!(matches!(parse_command("12.5"), Command::Amount("12.5")));
        assert!(matches!(parse_command("swap it"), Command::Amount("swap it")));
        assert!(matches!(parse_command("from"), Command::Amount("from")));
    }

    #[test]
    fn test_parse_command_simple_commands() {
        assert!(matches!(parse_command("swap"), Command::Swap));
        assert!(matches!(parse_command("rates"), Command::ListRates));
        assert!(matches!(parse_command("help"), Command::Help));
        assert!(matches!(parse_command("?"), Command::Help));
    }
}
