pub mod engine;

pub use engine::{Engine, JitRoutine, Signature};
