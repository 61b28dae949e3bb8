/// Always available builtins: `print`, `input`, `hash` and `len`.
pub mod builtin;
/// The builtin table, callable resolution and user function calls.
pub mod core;
/// The `tmp-dict-*` wrapper builtins.
pub mod dict;
/// The `tmp-list-*` wrapper builtins.
pub mod list;
