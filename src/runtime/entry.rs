use super::abi::{Number, RoutineFn, FIZZBUZZ_BOUND};

/// Something the entry point can hand control to.
///
/// Native function pointers and JIT-resolved routines both qualify, so tests
/// can substitute a host-side routine for the external one.
pub trait ExternalRoutine {
    fn invoke(&self, bound: Number);
}

impl ExternalRoutine for RoutineFn {
    fn invoke(&self, bound: Number) {
        // The external unit is trusted to honour `void (double)`.
        unsafe { (*self)(bound) }
    }
}

/// Calls `routine` once with the fixed bound and reports success.
///
/// The routine's behaviour is never inspected.
pub fn enter(routine: &dyn ExternalRoutine) -> i32 {
    routine.invoke(FIZZBUZZ_BOUND);
    0
}
