//! Ticket lifecycle enums.
//!
//! Both enums serialize to the German labels the board displays, so
//! stored data and rendered text stay identical.

use serde::{Deserialize, Serialize};

/// Workflow state of a ticket. Each state is one kanban column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TicketStatus {
    /// Freshly submitted, nobody picked it up yet.
    #[default]
    #[serde(rename = "Neu")]
    New,
    /// Staff is working on it.
    #[serde(rename = "In Bearbeitung")]
    InProgress,
    /// Resolved. Only closed tickets may be archived.
    #[serde(rename = "Geschlossen")]
    Closed,
}

impl TicketStatus {
    /// All states in board column order.
    pub const ALL: [Self; 3] = [Self::New, Self::InProgress, Self::Closed];
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "Neu"),
            Self::InProgress => write!(f, "In Bearbeitung"),
            Self::Closed => write!(f, "Geschlossen"),
        }
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Neu" => Ok(Self::New),
            "In Bearbeitung" => Ok(Self::InProgress),
            "Geschlossen" => Ok(Self::Closed),
            _ => Err(format!("invalid ticket status: {s}")),
        }
    }
}

/// Urgency of a ticket.
///
/// Variant order doubles as the sort order: `Normal < High < Critical`,
/// so the board can sort by priority with plain `Ord`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum Priority {
    /// Everyday request.
    #[default]
    #[serde(rename = "Normal")]
    Normal,
    /// Should be handled soon.
    #[serde(rename = "Hoch")]
    High,
    /// Drop everything.
    #[serde(rename = "Kritisch")]
    Critical,
}

impl Priority {
    /// All priorities from lowest to highest.
    pub const ALL: [Self; 3] = [Self::Normal, Self::High, Self::Critical];
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::High => write!(f, "Hoch"),
            Self::Critical => write!(f, "Kritisch"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Normal" => Ok(Self::Normal),
            "Hoch" => Ok(Self::High),
            "Kritisch" => Ok(Self::Critical),
            _ => Err(format!("invalid priority: {s}")),
        }
    }
}
