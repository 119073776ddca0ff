pub mod app;
pub mod config;
pub mod error;
pub mod inventory;
pub mod kinds;
pub mod pki;
pub mod session;
pub mod template;
pub mod types;
pub mod ui;
pub mod utils;
pub mod vault;

pub use error::{Error, Result};
