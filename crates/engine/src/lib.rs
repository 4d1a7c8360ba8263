//! The roster engine: the single entry point front ends call.
//!
//! [`Engine::handle`] takes a normalized [`Intent`], resolves the target
//! character, applies the authorization policy, then hands off to the
//! update or deletion path. Purges wait for a confirmation reply delivered
//! through [`Engine::deliver_confirmation`].

pub mod config;
pub mod confirm;
pub mod deletion;
pub mod engine;
pub mod error;
pub mod intent;
pub mod resolver;
pub mod update;
pub mod upload;

pub use config::EngineConfig;
pub use confirm::Delivery;
pub use engine::Engine;
pub use error::{HandleError, UploadError};
pub use intent::{CharacterView, DeletionReceipt, Intent, Operation, Outcome};
pub use upload::{CloudinaryUploader, PassthroughUploader, PicUploader};
