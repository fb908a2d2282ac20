//! Configuration module.
//!
//! Controls join defaults and alias naming.

mod settings;

pub use settings::{AliasSettings, JoinSettings, Settings, SettingsError};
