//! Core library components.
//!
//! The catalog model, the service contract with its backends, output
//! transforms, token injection, and the engine tying them together.

pub mod catalog;
pub mod constants;
pub mod dotenv;
pub mod home;
pub mod output;
pub mod path;
pub mod report;
pub mod service;
pub mod stash;
pub mod token;
pub mod types;
