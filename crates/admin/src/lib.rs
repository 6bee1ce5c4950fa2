//! Kummerkasten Admin - the staff view.
//!
//! The kanban board with its ticket detail operations, the archive
//! view, account-request approval, the user manager with CSV
//! import/export, and the category manager. Each area is a controller
//! constructed per session from `&mut Store`; construction resolves the
//! signed-in account and gates on its role.
//!
//! Gating is advisory: `Store` primitives stay unguarded, so code
//! holding `&mut Store` can bypass every check. There is no server
//! boundary to defend here.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod board;
pub mod categories;
pub mod csv;
pub mod error;
pub mod requests;
pub mod users;

pub use board::{Board, KanbanBoard};
pub use categories::CategoryManager;
pub use csv::CsvImportReport;
pub use error::AdminError;
pub use requests::{NewAccount, RequestManager};
pub use users::{NewUser, TicketDisposition, UserManager, UserUpdate, UserView};
