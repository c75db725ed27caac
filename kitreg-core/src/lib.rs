//! Starter Kit Registry library exports

pub mod error;
pub mod index;
pub mod registry;
pub mod schema;
pub mod validator;

pub use error::RegistryError;
