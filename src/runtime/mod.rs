pub mod abi;
pub mod entry;
pub mod error;
pub mod host;

pub use abi::{Number, NumericFn, RoutineFn};
pub use entry::{enter, ExternalRoutine};
pub use error::{BridgeError, BridgeResult};
pub use host::{capture_output, with_host, CaptureHost, HostIo, StdoutHost};
