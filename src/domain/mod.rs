//! Domain module
//!
//! Core domain records, status values and business errors.

pub mod audit;
pub mod category;
pub mod context;
pub mod error;
pub mod publication;
pub mod report;
pub mod time;
pub mod transaction;
pub mod user;

pub use audit::{AuditAction, AuditEntry, AuditEntryChanges, NewAuditEntry};
pub use category::{Category, CategoryChanges, NewCategory};
pub use context::OperationContext;
pub use error::{DomainError, DomainResult};
pub use publication::{NewPublication, Publication, PublicationChanges, PublicationSummary};
pub use report::{NewReport, Report, ReportChanges};
pub use transaction::{NewTransaction, Transaction, TransactionChanges};
pub use user::{NewUser, User, UserChanges, UserSummary};

/// Values of the `estado` column shared by every table.
pub mod status {
    /// Disabled, paused or soft-deleted.
    pub const INACTIVE: i32 = 0;
    /// Visible and usable.
    pub const ACTIVE: i32 = 1;
    /// Account status that grants administrator access.
    pub const ADMINISTRATOR: i32 = 2;
}
