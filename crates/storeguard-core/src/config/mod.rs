//! Configuration loading

mod loader;

pub use loader::{ConfigLoader, CONFIG_FILE_NAME, MAX_RETRIES_ENV};
