//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or a transaction's connection) as the first argument.

pub mod audit_repo;
pub mod character_repo;
pub mod historical_repo;

pub use audit_repo::AuditRepo;
pub use character_repo::CharacterRepo;
pub use historical_repo::HistoricalRepo;
