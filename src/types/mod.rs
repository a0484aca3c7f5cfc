//! Tipos compartilhados do recokit.

pub mod config;
pub mod errors;
pub mod ratings;

pub use config::Config;
pub use errors::{RecoError, RecoResult};
pub use ratings::{ItemId, Rating, UserId};
