//! Domain logic for the guild roster: who may change which character, how
//! stat updates recompute derived fields, and how group purges are confirmed.
//!
//! This crate has no internal dependencies and performs no I/O.

pub mod audit;
pub mod confirmation;
pub mod error;
pub mod policy;
pub mod stats;
pub mod types;
