pub mod account;
pub mod config;
pub mod error;
pub mod io;
pub mod onboarding;
pub mod paths;
pub mod resolver;
pub mod roster;
pub mod runbook;
pub mod task;
pub mod template;
pub mod types;
pub mod workspace;

pub use error::{OpsError, Result};
