/// Operator dispatch and unary negation.
pub mod core;

/// `+`, `-`, `*` and `/` for numbers, strings and lists.
pub mod arithmetic;

/// Ordering and equality comparisons.
pub mod comparison;

/// `^`, `%`, `&` and `|`.
pub mod logic;
