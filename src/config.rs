use crate::runtime::{abi::ROUTINE_SYMBOL, BridgeError, BridgeResult};
use std::{env, fmt::Display, path::PathBuf};

pub const TRACE_ENV: &str = "FIZZBUZZ_BRIDGE_TRACE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// External unit to load; the bundled `fizzbuzz` unit when absent.
    pub module: Option<PathBuf>,
    pub routine: String,
    pub emit_ir: bool,
    pub trace: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            module: None,
            routine: ROUTINE_SYMBOL.to_string(),
            emit_ir: false,
            trace: false,
        }
    }
}

impl BridgeConfig {
    /// Reads the process arguments and environment.
    pub fn from_env() -> BridgeResult<Self> {
        let trace = env::var(TRACE_ENV)
            .map(|value| !value.is_empty() && value != "0")
            .unwrap_or(false);
        let mut config = Self::from_args(env::args().skip(1))?;
        config.trace = trace;
        Ok(config)
    }

    pub fn from_args<I, S>(args: I) -> BridgeResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter().map(Into::into);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--emit-ir" => config.emit_ir = true,
                "--routine" => {
                    config.routine = args.next().ok_or_else(|| BridgeError::Usage {
                        message: "`--routine` requires a symbol name".into(),
                    })?;
                }
                flag if flag.starts_with("--") => {
                    return Err(BridgeError::Usage {
                        message: format!("unknown option `{flag}`"),
                    });
                }
                path => {
                    if config.module.is_some() {
                        return Err(BridgeError::Usage {
                            message: format!("unexpected extra argument `{path}`"),
                        });
                    }
                    if !(path.ends_with(".ll") || path.ends_with(".bc")) {
                        return Err(BridgeError::Usage {
                            message: format!(
                                "`{path}` is not an LLVM module. Only .ll and .bc files are accepted"
                            ),
                        });
                    }
                    config.module = Some(PathBuf::from(path));
                }
            }
        }
        Ok(config)
    }

    pub fn log(&self, message: impl Display) {
        if self.trace {
            eprintln!("[bridge] {message}");
        }
    }
}
