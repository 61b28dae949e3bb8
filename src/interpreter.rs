/// The evaluator module runs programs line by line.
///
/// The evaluator rewrites each line's token sequence in place until it
/// reduces to a single value, drives blocks, conditionals and loops through
/// the block table, and invokes user functions and builtins. It is the core
/// execution engine of the interpreter.
///
/// # Responsibilities
/// - Reduces calls, subscripts, literals, assignments and operators.
/// - Manages globals, call frames, aliases and the execution cursor.
/// - Reports runtime errors such as undefined names or invalid operations.
pub mod evaluator;
/// The lexer module tokenizes the code part of a logical line.
///
/// The lexer reads one line of code and produces the tokens the evaluator
/// rewrites: numbers, strings, identifiers, keywords, operators and brackets.
/// Identifiers naming a callable become function tokens.
///
/// # Responsibilities
/// - Converts line text into tokens.
/// - Decides whether a `-` is a sign or a subtraction.
/// - Reports unclosed strings and malformed numbers.
pub mod lexer;
/// Hoisting of function definitions and the block table.
///
/// Before anything runs, the program is scanned once: every `func` header is
/// recorded with its parameters and body range, and every `{`/`}` pair is
/// matched so control flow can jump between lines.
pub mod program;
/// Assembles physical lines into logical lines and strips comments.
pub mod source;
/// The token model shared by the lexer and the evaluator.
pub mod token;
/// The value module defines the runtime data types for evaluation.
///
/// Values are integers, floats, strings, booleans, `None`, and shared lists
/// and dicts. The module implements display in the language's own notation,
/// truthiness, structural equality and the conversions the evaluator needs.
///
/// # Responsibilities
/// - Defines the `Value` enum and the hashable `DictKey` subset.
/// - Renders values the way `print` shows them.
/// - Provides checked accessors that raise type errors with line numbers.
pub mod value;
