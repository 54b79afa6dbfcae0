use crate::runtime::{
    abi::{Arity, Number, NumericFn, RoutineFn, HOST_PRIMITIVES},
    entry::ExternalRoutine,
    error::{BridgeError, BridgeResult},
};
use inkwell::{
    context::Context,
    execution_engine::{ExecutionEngine, JitFunction},
    memory_buffer::MemoryBuffer,
    module::Module,
    targets::{InitializationConfig, Target},
    types::BasicTypeEnum,
    values::FunctionValue,
    OptimizationLevel,
};
use std::{fs, path::Path, sync::OnceLock};

/// IR for the external `fizzbuzz` unit bundled with the bridge.
pub const BUNDLED_FIZZBUZZ: &str = include_str!("../../demos/fizzbuzz.ll");

/// Numeric shapes a symbol may take at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// `void (double)`
    Routine,
    /// `double (double)`
    Unary,
    /// `double ()`
    Nullary,
}

impl Signature {
    pub fn describe(self) -> &'static str {
        match self {
            Signature::Routine => "void (double)",
            Signature::Unary => "double (double)",
            Signature::Nullary => "double ()",
        }
    }

    fn matches(self, context: &Context, function: FunctionValue<'_>) -> bool {
        let f64_type = context.f64_type();
        let double: BasicTypeEnum = f64_type.into();
        let fn_type = function.get_type();
        if fn_type.is_var_arg() {
            return false;
        }
        let params_ok = |expected: usize| {
            function.count_params() as usize == expected
                && function.get_param_iter().all(|param| {
                    param.is_float_value() && param.into_float_value().get_type() == f64_type
                })
        };
        match self {
            Signature::Routine => fn_type.get_return_type().is_none() && params_ok(1),
            Signature::Unary => fn_type.get_return_type() == Some(double) && params_ok(1),
            Signature::Nullary => fn_type.get_return_type() == Some(double) && params_ok(0),
        }
    }
}

fn found_signature(function: FunctionValue<'_>) -> String {
    function.get_type().print_to_string().to_string()
}

fn initialize_native_target() -> BridgeResult<()> {
    static INIT: OnceLock<Result<(), String>> = OnceLock::new();
    INIT.get_or_init(|| {
        ExecutionEngine::link_in_mc_jit();
        Target::initialize_native(&InitializationConfig::default())
    })
    .clone()
    .map_err(|message| BridgeError::TargetInit { message })
}

/// A loaded external unit, linked against the host primitives and ready to
/// run in-process.
pub struct Engine<'ctx> {
    context: &'ctx Context,
    module: Module<'ctx>,
    execution: ExecutionEngine<'ctx>,
}

impl<'ctx> Engine<'ctx> {
    /// Loads textual LLVM IR.
    pub fn from_ir(context: &'ctx Context, name: &str, ir: &str) -> BridgeResult<Self> {
        let buffer = MemoryBuffer::create_from_memory_range_copy(ir.as_bytes(), name);
        let module =
            context
                .create_module_from_ir(buffer)
                .map_err(|err| BridgeError::InvalidModule {
                    name: name.to_string(),
                    message: err.to_string(),
                })?;
        Self::from_module(context, name, module)
    }

    /// Loads a `.ll` or `.bc` file emitted by the external compiler.
    pub fn from_file<P: AsRef<Path>>(context: &'ctx Context, path: P) -> BridgeResult<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        fs::metadata(path).map_err(|source| BridgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let buffer =
            MemoryBuffer::create_from_file(path).map_err(|err| BridgeError::InvalidModule {
                name: name.clone(),
                message: err.to_string(),
            })?;
        let module = if path.extension().is_some_and(|ext| ext == "bc") {
            Module::parse_bitcode_from_buffer(&buffer, context)
        } else {
            context.create_module_from_ir(buffer)
        }
        .map_err(|err| BridgeError::InvalidModule {
            name: name.clone(),
            message: err.to_string(),
        })?;
        Self::from_module(context, &name, module)
    }

    /// The `fizzbuzz` unit shipped with the crate.
    pub fn bundled(context: &'ctx Context) -> BridgeResult<Self> {
        Self::from_ir(context, "fizzbuzz.ll", BUNDLED_FIZZBUZZ)
    }

    fn from_module(context: &'ctx Context, name: &str, module: Module<'ctx>) -> BridgeResult<Self> {
        module.verify().map_err(|err| BridgeError::InvalidModule {
            name: name.to_string(),
            message: err.to_string(),
        })?;
        initialize_native_target()?;
        let execution = module
            .create_jit_execution_engine(OptimizationLevel::None)
            .map_err(|err| BridgeError::Jit {
                message: err.to_string(),
            })?;
        let engine = Self {
            context,
            module,
            execution,
        };
        engine.link_host_primitives()?;
        Ok(engine)
    }

    /// Binds every primitive the module declares to the host shim matching
    /// its declared arity.
    fn link_host_primitives(&self) -> BridgeResult<()> {
        for primitive in &HOST_PRIMITIVES {
            let Some(function) = self.imported(primitive.symbol) else {
                continue;
            };
            let accepted: &[Signature] = match primitive.arity {
                Arity::Nullary => &[Signature::Nullary, Signature::Unary],
                Arity::Unary => &[Signature::Unary],
            };
            let declared = accepted
                .iter()
                .copied()
                .find(|signature| signature.matches(self.context, function));
            let address = declared.and_then(|_| primitive.address_for(function.count_params()));
            let Some(address) = address else {
                return Err(BridgeError::SignatureMismatch {
                    name: primitive.symbol.to_string(),
                    expected: accepted
                        .iter()
                        .map(|signature| signature.describe())
                        .collect::<Vec<_>>()
                        .join(" or "),
                    found: found_signature(function),
                });
            };
            self.execution.add_global_mapping(&function, address);
        }
        Ok(())
    }

    /// A declaration without a body, i.e. something the host must supply.
    fn imported(&self, symbol: &str) -> Option<FunctionValue<'ctx>> {
        self.module
            .get_function(symbol)
            .filter(|function| function.count_basic_blocks() == 0)
    }

    /// Names of the host primitives this module calls into.
    pub fn imported_primitives(&self) -> Vec<&'static str> {
        HOST_PRIMITIVES
            .iter()
            .filter(|primitive| self.imported(primitive.symbol).is_some())
            .map(|primitive| primitive.symbol)
            .collect()
    }

    fn defined_function(&self, name: &str, signature: Signature) -> BridgeResult<FunctionValue<'ctx>> {
        let function = self
            .module
            .get_function(name)
            .filter(|function| function.count_basic_blocks() > 0)
            .ok_or_else(|| BridgeError::MissingRoutine {
                name: name.to_string(),
            })?;
        if !signature.matches(self.context, function) {
            return Err(BridgeError::SignatureMismatch {
                name: name.to_string(),
                expected: signature.describe().to_string(),
                found: found_signature(function),
            });
        }
        Ok(function)
    }

    /// Resolves a routine such as `fizzbuzz`.
    ///
    /// Both `void (double)` and `double (double)` are accepted; a returned
    /// value is discarded when the routine runs.
    pub fn routine(&self, name: &str) -> BridgeResult<JitRoutine<'ctx>> {
        match self.defined_function(name, Signature::Routine) {
            Ok(_) => {
                let function = unsafe { self.execution.get_function::<RoutineFn>(name) }
                    .map_err(|err| BridgeError::Jit {
                        message: format!("{name}: {err}"),
                    })?;
                Ok(JitRoutine::Void(function))
            }
            Err(BridgeError::SignatureMismatch { found, .. }) => {
                let function = self.numeric_function(name).map_err(|err| match err {
                    BridgeError::SignatureMismatch { .. } => BridgeError::SignatureMismatch {
                        name: name.to_string(),
                        expected: format!(
                            "{} or {}",
                            Signature::Routine.describe(),
                            Signature::Unary.describe()
                        ),
                        found,
                    },
                    other => other,
                })?;
                Ok(JitRoutine::Valued(function))
            }
            Err(err) => Err(err),
        }
    }

    /// Resolves a `double (double)` function.
    pub fn numeric_function(&self, name: &str) -> BridgeResult<JitFunction<'ctx, NumericFn>> {
        self.defined_function(name, Signature::Unary)?;
        unsafe { self.execution.get_function::<NumericFn>(name) }.map_err(|err| {
            BridgeError::Jit {
                message: format!("{name}: {err}"),
            }
        })
    }

    /// Calls a `double (double)` function once.
    pub fn call_numeric(&self, name: &str, argument: Number) -> BridgeResult<Number> {
        let function = self.numeric_function(name)?;
        Ok(unsafe { function.call(argument) })
    }

    /// Textual IR of the loaded module.
    pub fn ir(&self) -> String {
        self.module.print_to_string().to_string()
    }
}

/// A routine resolved from JIT-compiled code.
pub enum JitRoutine<'ctx> {
    Void(JitFunction<'ctx, RoutineFn>),
    /// Declared with a `double` result that the entry point ignores.
    Valued(JitFunction<'ctx, NumericFn>),
}

impl ExternalRoutine for JitRoutine<'_> {
    fn invoke(&self, bound: Number) {
        match self {
            JitRoutine::Void(function) => unsafe { function.call(bound) },
            JitRoutine::Valued(function) => {
                unsafe { function.call(bound) };
            }
        }
    }
}
