use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Debug, Error, Diagnostic)]
pub enum BridgeError {
    #[error("{message}")]
    #[diagnostic(
        code(bridge::usage),
        help("usage: fizzbuzz-bridge [--emit-ir] [--routine <name>] [<module.ll|module.bc>]")
    )]
    Usage { message: String },
    #[error("Failed to access {}", path.display())]
    #[diagnostic(code(bridge::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Native target could not be initialized: {message}")]
    #[diagnostic(code(bridge::target))]
    TargetInit { message: String },
    #[error("Module `{name}` is not valid LLVM: {message}")]
    #[diagnostic(code(bridge::invalid_module))]
    InvalidModule { name: String, message: String },
    #[error("Routine `{name}` is not defined by the loaded module")]
    #[diagnostic(
        code(bridge::missing_routine),
        help("the external compiler must emit a definition for this routine")
    )]
    MissingRoutine { name: String },
    #[error("Symbol `{name}` has signature `{found}` but the bridge expects `{expected}`")]
    #[diagnostic(
        code(bridge::signature_mismatch),
        help("every value crossing the bridge must be a `double`")
    )]
    SignatureMismatch {
        name: String,
        expected: String,
        found: String,
    },
    #[error("JIT failure: {message}")]
    #[diagnostic(code(bridge::jit))]
    Jit { message: String },
}
