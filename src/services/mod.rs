//! Domain services
//!
//! One service per table. Each enforces existence and uniqueness rules
//! before delegating to its repository.

pub mod audits;
pub mod categories;
pub mod commands;
pub mod publications;
pub mod reports;
pub mod transactions;
pub mod users;

pub use audits::AuditService;
pub use categories::CategoryService;
pub use commands::{RegisterUserCommand, UpdateUserCommand};
pub use publications::PublicationService;
pub use reports::ReportService;
pub use transactions::TransactionService;
pub use users::UserService;
