//! The rate-conversion session state machine.
//!
//! The session owns the base/target pair, the entered amount, and the current
//! rate table, and derives the displayed conversion from them on demand. It
//! performs no IO itself: changing the base currency returns a [`FetchTicket`]
//! that the caller redeems against a [`RateProvider`](crate::core::rates::RateProvider)
//! and hands back through [`ConversionSession::apply_rates`]. Tickets carry a
//! generation counter, so a response that arrives after a newer fetch was
//! issued is recognized as stale and discarded.

use tracing::debug;

use crate::core::convert::convert;
use crate::core::rates::{CurrencyCode, RateError, RateTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Handle for one rate fetch, tied to the session generation that issued it.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    generation: u64,
    base: CurrencyCode,
}

impl FetchTicket {
    /// Base currency the fetch was issued for.
    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
pub struct ConversionSession {
    base: CurrencyCode,
    target: CurrencyCode,
    amount: String,
    table: Option<RateTable>,
    status: SessionStatus,
    error: Option<String>,
    generation: u64,
}

impl ConversionSession {
    pub fn new(base: CurrencyCode, target: CurrencyCode) -> Self {
        ConversionSession {
            base,
            target,
            amount: "1".to_string(),
            table: None,
            status: SessionStatus::Idle,
            error: None,
            generation: 0,
        }
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    pub fn target(&self) -> &CurrencyCode {
        &self.target
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Invalidates the current table and issues a ticket for the session's
    /// base currency. The previous table is gone before any request starts,
    /// so a foreign-base table is never displayed.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.table = None;
        self.error = None;
        self.status = SessionStatus::Loading;
        FetchTicket {
            generation: self.generation,
            base: self.base.clone(),
        }
    }

    /// Amount edits never trigger a fetch.
    pub fn set_amount(&mut self, text: &str) {
        self.amount = text.to_string();
    }

    /// Target edits never trigger a fetch; the table stays keyed by the base.
    pub fn set_target(&mut self, code: CurrencyCode) {
        self.target = code;
    }

    /// Selects a new base currency, invalidating the table and starting a
    /// fetch. Re-selecting the current base is a no-op and returns `None`.
    pub fn set_base(&mut self, code: CurrencyCode) -> Option<FetchTicket> {
        if code == self.base {
            return None;
        }
        self.base = code;
        Some(self.begin_fetch())
    }

    /// Swaps base and target. When a conversion is on display its value
    /// becomes the new amount, so the reversed pair starts from what the
    /// user just saw; otherwise the amount is kept as-is.
    pub fn swap(&mut self) -> FetchTicket {
        if let Some(converted) = self.converted_amount() {
            self.amount = converted;
        }
        std::mem::swap(&mut self.base, &mut self.target);
        self.begin_fetch()
    }

    /// Applies a fetch outcome. Returns `false` when the ticket is stale,
    /// meaning a newer fetch has been issued and the outcome was discarded.
    pub fn apply_rates(
        &mut self,
        ticket: &FetchTicket,
        outcome: Result<RateTable, RateError>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                ticket_base = %ticket.base,
                ticket_generation = ticket.generation,
                current_generation = self.generation,
                "Discarding stale rate response"
            );
            return false;
        }
        match outcome {
            Ok(table) => {
                self.table = Some(table);
                self.error = None;
                self.status = SessionStatus::Ready;
            }
            Err(e) => {
                self.table = None;
                self.error = Some(e.to_string());
                self.status = SessionStatus::Failed;
            }
        }
        true
    }

    /// The derived conversion: `amount * rate(target)` at two decimals.
    /// Absent while no table is loaded, when the amount is not numeric, or
    /// when the table has no entry for the target.
    pub fn converted_amount(&self) -> Option<String> {
        let rate = self.unit_rate()?;
        convert(&self.amount, rate)
    }

    /// Conversion factor for one unit of the base in the target currency.
    pub fn unit_rate(&self) -> Option<f64> {
        self.table.as_ref()?.rate_for(&self.target)
    }

    /// Codes offered by the current table, sorted. Empty until a table has
    /// been applied.
    pub fn available_currencies(&self) -> Vec<CurrencyCode> {
        self.table
            .as_ref()
            .map(|table| table.codes().cloned().collect())
            .unwrap_or_default()
    }
}
