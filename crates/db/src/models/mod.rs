//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus the `Deserialize` DTO used to insert it.

pub mod audit;
pub mod character;
pub mod historical;
