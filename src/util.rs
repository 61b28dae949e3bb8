/// Numeric conversion helpers.
///
/// This module provides safe functions for converting between the integer and
/// floating-point types used by the interpreter, and for resolving script
/// indices (which may be negative) against collection lengths. All fallible
/// helpers return a `Result` instead of silently wrapping or rounding.
pub mod num;
/// Stack growth for deep recursion.
///
/// The evaluator recurses once per nested expression and per script call.
/// Wrapping those entry points lets the call depth limit, rather than the
/// native thread stack, decide how deep a script may go.
pub mod stack;
