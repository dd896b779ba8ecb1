//! PostgreSQL adapters
//!
//! Plain runtime queries over a shared pool. The schema is pre-existing and
//! lives on the connection `search_path`.

mod audit;
mod category;
mod publication;
mod report;
mod transaction;
mod user;

pub use audit::PgAuditRepository;
pub use category::PgCategoryRepository;
pub use publication::PgPublicationRepository;
pub use report::PgReportRepository;
pub use transaction::PgTransactionRepository;
pub use user::PgUserRepository;
