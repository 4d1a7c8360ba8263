//! Roster event bus and audit trail.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`RosterEvent`]: the event envelope for audit entries and purge prompts.
//! - [`AuditPersistence`]: background service that durably writes audit
//!   events to the `audit_logs` table.

pub mod bus;
pub mod persistence;

pub use bus::{EventBus, RosterEvent};
pub use persistence::AuditPersistence;
