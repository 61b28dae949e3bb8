/// Core evaluation logic and context management.
///
/// Contains the runtime context, the namespaces and the token rewriting
/// engine every line goes through.
pub mod core;

/// Binary operator evaluation logic.
///
/// Handles arithmetic, comparisons and the logical operators on typed
/// values.
pub mod binary;

/// Variable assignment and alias definitions.
pub mod assign;

/// List and dict literals, subscripts and indexed assignment.
pub mod collection;

/// The line driver, blocks and `if` chains.
pub mod control;

/// `for` and `while` loops.
pub mod for_loop;

/// Function evaluation.
///
/// Handles user-defined and built-in function calls, argument checking, and
/// return value computation.
pub mod function;

/// The diagnostics dump selected by the debugging flags.
pub mod dump;
