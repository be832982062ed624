//! Larder Core — domain models, repository traits, and shared error
//! types for the recipe catalog service.

pub mod authz;
pub mod email;
pub mod error;
pub mod media;
pub mod models;
pub mod repository;

pub use error::{LarderError, LarderResult};
