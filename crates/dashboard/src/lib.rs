//! Kummerkasten Dashboard - the submitter's view.
//!
//! Everything a signed-in end user can do: file tickets, follow their
//! progress, and talk to staff in the ticket chat. Account requests
//! from the public login page live here too. Staff-side operations are
//! in `kummerkasten-admin`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod dashboard;
pub mod error;

pub use dashboard::{Dashboard, NewTicket, request_account};
pub use error::DashboardError;
