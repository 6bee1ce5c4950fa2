//! Automatic archival of stale closed tickets.
//!
//! Runs at startup. Two rules feed the archive: closed tickets fall off
//! the board after a few days, and the closed column never holds more
//! than a handful of tickets at once.

use chrono::{Duration, Utc};
use kummerkasten_core::{TicketId, TicketStatus};

use crate::models::{SYSTEM_ACTOR, Ticket};
use crate::store::Store;

/// Days a closed ticket stays on the board before it ages out.
pub const MAX_CLOSED_AGE_DAYS: i64 = 3;

/// Closed tickets kept on the board; older ones overflow into the
/// archive.
pub const MAX_CLOSED_ON_BOARD: usize = 10;

/// What one sweep archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    /// Tickets archived for sitting closed past the age limit.
    pub aged_out: usize,
    /// Tickets archived to keep the closed column within bounds.
    pub overflowed: usize,
}

impl SweepReport {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.aged_out + self.overflowed
    }
}

/// Archive closed tickets that aged out or overflow the closed column.
///
/// A ticket's closing time is taken from its newest status-change log
/// entry; tickets closed before logging existed fall back to their
/// creation time.
pub fn run(store: &mut Store) -> SweepReport {
    let mut report = SweepReport::default();
    let cutoff = Utc::now() - Duration::days(MAX_CLOSED_AGE_DAYS);

    let closed: Vec<Ticket> = store
        .tickets()
        .into_iter()
        .filter(|ticket| ticket.status == TicketStatus::Closed && !ticket.archived)
        .collect();

    let mut remaining = Vec::new();
    for ticket in closed {
        if ticket.last_closed_at() <= cutoff {
            archive(store, ticket.id, &ticket.title);
            report.aged_out += 1;
        } else {
            remaining.push(ticket);
        }
    }

    // Overflow keeps the newest tickets by creation time.
    if remaining.len() > MAX_CLOSED_ON_BOARD {
        remaining.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let excess = remaining.len() - MAX_CLOSED_ON_BOARD;
        for ticket in remaining.into_iter().take(excess) {
            archive(store, ticket.id, &ticket.title);
            report.overflowed += 1;
        }
    }

    if report.total() > 0 {
        tracing::info!(
            aged_out = report.aged_out,
            overflowed = report.overflowed,
            "auto-archived closed tickets"
        );
    }
    report
}

fn archive(store: &mut Store, id: TicketId, title: &str) {
    let now = Utc::now();
    let archived = store.update_ticket(id, |ticket| {
        ticket.archived = true;
        ticket.archived_at = Some(now);
        ticket.push_log(SYSTEM_ACTOR, "Ticket automatisch archiviert", None);
    });
    if archived {
        store.log_global(
            SYSTEM_ACTOR,
            "Ticket automatisch archiviert",
            Some(title.to_owned()),
        );
    }
}
