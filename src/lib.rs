pub mod config;
pub mod diagnostics;
pub mod language;
pub mod runtime;

pub use config::BridgeConfig;
pub use language::Engine;
pub use runtime::{enter, BridgeError, BridgeResult, Number};
