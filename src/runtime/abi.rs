//! The numeric calling convention shared with the external routine.
//!
//! Every value that crosses the bridge is a [`Number`]. The four host
//! primitives are exported under the C names the external compiler emits
//! calls to, and are also listed in [`HOST_PRIMITIVES`] so a JIT can bind
//! them by address.

use super::host::{with_active_host, HostIo};

pub type Number = f64;

/// `void fizzbuzz(double)` as seen from the host.
pub type RoutineFn = unsafe extern "C" fn(Number);
/// `double f(double)`, the shape of ordinary numeric functions.
pub type NumericFn = unsafe extern "C" fn(Number) -> Number;

pub const ROUTINE_SYMBOL: &str = "fizzbuzz";
pub const FIZZBUZZ_BOUND: Number = 50.0;

pub const PRINT_NEW_LINE: &str = "printNewLine";
pub const PRINT_DOUBLE_AS_INT: &str = "printDoubleAsInt";
pub const PRINT_FIZZ: &str = "printFizz";
pub const PRINT_BUZZ: &str = "printBuzz";

/// Renders `x` truncated toward zero as a base-10 integer.
///
/// Out-of-range values saturate and NaN renders as `0`.
pub fn render_integer(x: Number) -> String {
    (x as i64).to_string()
}

pub fn print_new_line(io: &mut dyn HostIo) -> Number {
    io.emit("\n");
    0.0
}

pub fn print_double_as_int(io: &mut dyn HostIo, x: Number) -> Number {
    io.emit(&render_integer(x));
    x
}

pub fn print_fizz(io: &mut dyn HostIo) -> Number {
    io.emit("Fizz");
    0.0
}

pub fn print_buzz(io: &mut dyn HostIo) -> Number {
    io.emit("Buzz");
    0.0
}

#[unsafe(export_name = "printNewLine")]
pub extern "C" fn host_print_new_line() -> Number {
    with_active_host(print_new_line)
}

#[unsafe(export_name = "printDoubleAsInt")]
pub extern "C" fn host_print_double_as_int(x: Number) -> Number {
    with_active_host(|io| print_double_as_int(io, x))
}

#[unsafe(export_name = "printFizz")]
pub extern "C" fn host_print_fizz() -> Number {
    with_active_host(print_fizz)
}

#[unsafe(export_name = "printBuzz")]
pub extern "C" fn host_print_buzz() -> Number {
    with_active_host(print_buzz)
}

// Bound when the external unit declares a nullary primitive with one
// (ignored) argument.
extern "C" fn print_new_line_ignoring(_ignored: Number) -> Number {
    host_print_new_line()
}

extern "C" fn print_fizz_ignoring(_ignored: Number) -> Number {
    host_print_fizz()
}

extern "C" fn print_buzz_ignoring(_ignored: Number) -> Number {
    host_print_buzz()
}

/// How a primitive may be declared by the external unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// `double ()`, also accepted as `double (double)` with the argument ignored.
    Nullary,
    /// `double (double)`.
    Unary,
}

#[derive(Debug, Clone, Copy)]
pub struct HostPrimitive {
    pub symbol: &'static str,
    pub arity: Arity,
    nullary: Option<extern "C" fn() -> Number>,
    unary: extern "C" fn(Number) -> Number,
}

impl HostPrimitive {
    /// Address to bind for a declaration taking `params` arguments.
    pub fn address_for(&self, params: u32) -> Option<usize> {
        match (self.arity, params) {
            (Arity::Nullary, 0) => self.nullary.map(|f| f as usize),
            (_, 1) => Some(self.unary as usize),
            _ => None,
        }
    }

    /// Calls the primitive through its C entry point.
    #[cfg(test)]
    fn invoke(&self, argument: Number) -> Number {
        match self.nullary {
            Some(f) => f(),
            None => (self.unary)(argument),
        }
    }
}

pub const HOST_PRIMITIVES: [HostPrimitive; 4] = [
    HostPrimitive {
        symbol: PRINT_NEW_LINE,
        arity: Arity::Nullary,
        nullary: Some(host_print_new_line),
        unary: print_new_line_ignoring,
    },
    HostPrimitive {
        symbol: PRINT_DOUBLE_AS_INT,
        arity: Arity::Unary,
        nullary: None,
        unary: host_print_double_as_int,
    },
    HostPrimitive {
        symbol: PRINT_FIZZ,
        arity: Arity::Nullary,
        nullary: Some(host_print_fizz),
        unary: print_fizz_ignoring,
    },
    HostPrimitive {
        symbol: PRINT_BUZZ,
        arity: Arity::Nullary,
        nullary: Some(host_print_buzz),
        unary: print_buzz_ignoring,
    },
];

pub fn host_primitive(symbol: &str) -> Option<&'static HostPrimitive> {
    HOST_PRIMITIVES.iter().find(|primitive| primitive.symbol == symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::host::capture_output;

    #[test]
    fn renders_every_bound_value_as_plain_digits() {
        for n in 1..=50 {
            let text = capture_output(|| {
                host_print_double_as_int(n as Number);
            });
            assert_eq!(text, n.to_string());
            assert!(!text.starts_with('0'));
            assert!(!text.starts_with('+'));
        }
    }

    #[test]
    fn rendering_truncates_toward_zero() {
        assert_eq!(render_integer(49.9), "49");
        assert_eq!(render_integer(-3.0), "-3");
        assert_eq!(render_integer(-3.7), "-3");
        assert_eq!(render_integer(-0.5), "0");
        assert_eq!(render_integer(0.0), "0");
    }

    #[test]
    fn print_double_as_int_passes_value_through() {
        for x in [0.0, 1.0, 49.9, -3.0] {
            let mut returned = f64::NAN;
            capture_output(|| returned = host_print_double_as_int(x));
            assert_eq!(returned.to_bits(), x.to_bits());
        }
    }

    #[test]
    fn nullary_primitives_return_zero() {
        capture_output(|| {
            assert_eq!(host_print_new_line(), 0.0);
            assert_eq!(host_print_fizz(), 0.0);
            assert_eq!(host_print_buzz(), 0.0);
        });
    }

    #[test]
    fn writes_keep_invocation_order() {
        let text = capture_output(|| {
            host_print_fizz();
            host_print_new_line();
        });
        assert_eq!(text, "Fizz\n");

        let text = capture_output(|| {
            host_print_fizz();
            host_print_buzz();
            host_print_new_line();
            host_print_double_as_int(7.0);
            host_print_new_line();
        });
        assert_eq!(text, "FizzBuzz\n7\n");
    }

    #[test]
    fn newline_terminates_whatever_preceded_it() {
        for prefix in ["", "Fizz", "Buzz", "13"] {
            let text = capture_output(|| {
                if !prefix.is_empty() {
                    with_active_host(|io| io.emit(prefix));
                }
                host_print_new_line();
            });
            assert!(text.ends_with('\n'));
            assert_eq!(text.lines().count(), 1);
        }
    }

    #[test]
    fn ignored_argument_does_not_change_newline() {
        let plain = capture_output(|| {
            host_print_new_line();
        });
        let ignoring = capture_output(|| {
            print_new_line_ignoring(123.0);
            print_new_line_ignoring(Number::NAN);
        });
        assert_eq!(plain, "\n");
        assert_eq!(ignoring, "\n\n");

        let fizz = capture_output(|| assert_eq!(print_fizz_ignoring(5.0), 0.0));
        assert_eq!(fizz, "Fizz");
    }

    #[test]
    fn table_binds_declared_arity() {
        let newline = host_primitive(PRINT_NEW_LINE).unwrap();
        assert!(newline.address_for(0).is_some());
        assert!(newline.address_for(1).is_some());
        assert!(newline.address_for(2).is_none());

        let number = host_primitive(PRINT_DOUBLE_AS_INT).unwrap();
        assert!(number.address_for(0).is_none());
        assert!(number.address_for(1).is_some());

        assert!(host_primitive("printf").is_none());
    }

    #[test]
    fn table_invocation_reaches_host() {
        let text = capture_output(|| {
            for primitive in &HOST_PRIMITIVES {
                primitive.invoke(12.0);
            }
        });
        assert_eq!(text, "\n12FizzBuzz");
    }
}
