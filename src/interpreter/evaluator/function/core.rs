use std::fmt;

use tracing::debug;

use crate::{
    error::{RuntimeError, SyntaxError},
    interpreter::{
        evaluator::{
            core::{find_close, Context, EvalResult, Io, Scope, Signal, MAX_CALL_DEPTH},
            function::{builtin, dict, list},
        },
        program::FunctionDef,
        token::Token,
        value::core::Value,
    },
};

/// Type alias for builtin function handlers.
///
/// A builtin receives the script's streams, a slice of evaluated argument
/// values and the line number. It returns an optional value wrapped in
/// `EvalResult`; `None` means the call disappears from the expression.
type BuiltinFn = fn(&mut Io, &[Value], usize) -> EvalResult<Option<Value>>;

/// Specifies the allowed number of arguments for a builtin.
///
/// - `Exact(n)` means the builtin must receive exactly `n` arguments.
/// - `OneOf(slice)` means the builtin accepts any arity listed in `slice`.
/// - `Any` accepts every argument count.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Arity {
    Exact(usize),
    OneOf(&'static [usize]),
    Any,
}

/// Defines builtin functions by generating a lookup table and a name list.
///
/// Each entry provides:
/// - a string name,
/// - the flag that registers it, or `None` for builtins that always exist,
/// - an arity specification,
/// - a function pointer implementing the builtin.
///
/// The macro produces:
/// - `BuiltinDef` (internal metadata),
/// - `BUILTIN_TABLE` (static table for lookup),
/// - `BUILTIN_FUNCTIONS` (public list of builtin names).
macro_rules! builtin_functions {
    (
        $(
            $name:literal => {
                flag: $flag:expr,
                arity: $arity:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        pub(crate) struct BuiltinDef {
            pub(crate) name:  &'static str,
            flag:             Option<&'static str>,
            arity:            Arity,
            func:             BuiltinFn,
        }
        static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef { name: $name, flag: $flag, arity: $arity, func: $func },
            )*
        ];
        /// Every builtin name, registered or not.
        pub const BUILTIN_FUNCTIONS: &[&str] = &[
            $($name,)*
        ];
    };
}

builtin_functions! {
    "print"    => { flag: None, arity: Arity::Any, func: builtin::print },
    "input"    => { flag: None, arity: Arity::OneOf(&[0, 1]), func: builtin::input },
    "hash"     => { flag: None, arity: Arity::Exact(1), func: builtin::hash },
    "len"      => { flag: None, arity: Arity::Exact(1), func: builtin::len },
    "ljoin"    => { flag: Some("tmp-list-join"), arity: Arity::Exact(2), func: list::join },
    "lappend"  => { flag: Some("tmp-list-append"), arity: Arity::Exact(2), func: list::append },
    "lpop"     => { flag: Some("tmp-list-pop"), arity: Arity::OneOf(&[1, 2]), func: list::pop },
    "linsert"  => { flag: Some("tmp-list-insert"), arity: Arity::Exact(3), func: list::insert },
    "lcount"   => { flag: Some("tmp-list-count"), arity: Arity::Exact(2), func: list::count },
    "lextend"  => { flag: Some("tmp-list-extend"), arity: Arity::Exact(2), func: list::extend },
    "lindex"   => { flag: Some("tmp-list-index"), arity: Arity::Exact(2), func: list::index },
    "lcopy"    => { flag: Some("tmp-list-copy"), arity: Arity::Exact(1), func: list::copy },
    "lreverse" => { flag: Some("tmp-list-reverse"), arity: Arity::Exact(1), func: list::reverse },
    "dupdate"  => { flag: Some("tmp-dict-update"), arity: Arity::Exact(2), func: dict::update },
    "dpop"     => { flag: Some("tmp-dict-pop"), arity: Arity::Exact(2), func: dict::pop },
    "dcopy"    => { flag: Some("tmp-dict-copy"), arity: Arity::Exact(1), func: dict::copy },
    "dkeys"    => { flag: Some("tmp-dict-keys"), arity: Arity::Exact(1), func: dict::keys },
    "ditems"   => { flag: Some("tmp-dict-items"), arity: Arity::Exact(1), func: dict::items },
    "dvalues"  => { flag: Some("tmp-dict-values"), arity: Arity::Exact(1), func: dict::values },
}

impl Arity {
    /// Tests whether the given argument count satisfies this arity constraint.
    ///
    /// Returns `true` if the count is permitted, `false` otherwise.
    fn check(&self, n: usize) -> bool {
        match self {
            Self::Exact(m) => n == *m,
            Self::OneOf(arr) => arr.contains(&n),
            Self::Any => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::OneOf(counts) => {
                let counts: Vec<String> = counts.iter().map(ToString::to_string).collect();
                write!(f, "{}", counts.join(" or "))
            },
            Self::Any => write!(f, "any number of"),
        }
    }
}

/// What a callable name resolves to.
enum Callee {
    User(FunctionDef),
    Builtin(&'static BuiltinDef),
}

impl Context {
    /// Returns the builtin registered under `name`, if its flag is on.
    pub(crate) fn builtin(&self, name: &str) -> Option<&'static BuiltinDef> {
        BUILTIN_TABLE.iter()
                     .find(|b| b.name == name && b.flag.map_or(true, |flag| self.config.enabled(flag)))
    }

    /// Resolves a callable name: user functions first, then registered
    /// builtins, then aliases, following alias chains.
    ///
    /// # Errors
    /// - `UndefinedFunction` if the name, or the end of its alias chain, is
    ///   not callable.
    /// - `AliasCycle` if the alias chain loops.
    fn resolve_callable(&self, name: &str, line: usize) -> EvalResult<Callee> {
        let mut current = name;

        for _ in 0..=self.aliases.len() {
            if let Some(def) = self.program.functions.get(current) {
                return Ok(Callee::User(def.clone()));
            }
            if let Some(def) = self.builtin(current) {
                return Ok(Callee::Builtin(def));
            }
            match self.aliases.get(current) {
                Some(target) => current = target,
                None => {
                    return Err(RuntimeError::UndefinedFunction { name: current.to_string(),
                                                                 line })
                },
            }
        }

        Err(RuntimeError::AliasCycle { name: name.to_string(),
                                       line })
    }

    /// Calls a function by name with evaluated arguments.
    ///
    /// # Parameters
    /// - `name`: Function, builtin or alias name.
    /// - `args`: Evaluated argument values.
    /// - `line`: Line number for error reporting.
    ///
    /// # Returns
    /// The returned value, or `None` when the function returns nothing.
    ///
    /// # Example
    /// ```
    /// use std::io;
    ///
    /// use slowpp::{
    ///     config::Config,
    ///     interpreter::{
    ///         evaluator::core::{Context, Io},
    ///         program::Program,
    ///         source::break_lines,
    ///         value::core::Value,
    ///     },
    /// };
    ///
    /// let lines = break_lines("func twice(x) {\n\treturn x * 2\n}");
    /// let program = Program::build(lines, 0).unwrap();
    /// let mut context = Context::new(program, Config::default(), Io::new(io::sink(), io::empty()));
    ///
    /// let result = context.call_function("twice", vec![Value::Integer(21)], 4).unwrap();
    /// assert_eq!(result, Some(Value::Integer(42)));
    /// ```
    pub fn call_function(&mut self,
                         name: &str,
                         args: Vec<Value>,
                         line: usize)
                         -> EvalResult<Option<Value>> {
        match self.resolve_callable(name, line)? {
            Callee::Builtin(def) => {
                if !def.arity.check(args.len()) {
                    return Err(RuntimeError::ArgumentCountMismatch { name: name.to_string(),
                                                                     expected: def.arity.to_string(),
                                                                     found: args.len(),
                                                                     line });
                }
                (def.func)(&mut self.io, &args, line)
            },
            Callee::User(def) => self.call_user_function(name, &def, args, line),
        }
    }

    /// Executes a user-defined function.
    ///
    /// A fresh frame holding the parameters is pushed, the body lines run
    /// until a `return` or the closing line, and the frame is popped again.
    /// The caller's execution cursor is restored afterwards. When the body
    /// fails the frame and cursor are left in place, so the diagnostics dump
    /// shows where the run stopped.
    fn call_user_function(&mut self,
                          name: &str,
                          def: &FunctionDef,
                          args: Vec<Value>,
                          line: usize)
                          -> EvalResult<Option<Value>> {
        if args.len() != def.params.len() {
            return Err(RuntimeError::ArgumentCountMismatch { name: name.to_string(),
                                                             expected: def.params.len().to_string(),
                                                             found: args.len(),
                                                             line });
        }
        if self.frames.len() >= MAX_CALL_DEPTH {
            return Err(RuntimeError::RecursionLimit { line });
        }

        debug!(function = %def.name, depth = self.frames.len() + 1, line, "call");

        let frame: Scope = def.params.iter().cloned().zip(args).collect();
        self.frames.push(frame);
        let saved = self.cursor;

        let signal = self.run_block(def.header + 1, def.end)?;

        self.frames.pop();
        self.cursor = saved;

        match signal {
            Signal::Return(value) => Ok(value),
            Signal::Next(_) => Ok(None),
            Signal::Break(line) => Err(RuntimeError::LoopControlOutsideLoop { statement: "break".to_string(),
                                                                              line }),
            Signal::Continue(line) => {
                Err(RuntimeError::LoopControlOutsideLoop { statement: "continue".to_string(),
                                                           line })
            },
        }
    }

    /// Reduces the call whose name token is at `i`.
    ///
    /// The arguments between the parentheses are evaluated left to right,
    /// then the call span is replaced by the returned value, or removed if
    /// the function returned nothing.
    pub(crate) fn reduce_call(&mut self,
                              tokens: &mut Vec<Token>,
                              i: usize,
                              name: &str,
                              line: usize)
                              -> EvalResult<()> {
        let close = find_close(tokens, i + 1).ok_or(SyntaxError::UnmatchedParenthesis { line })?;
        let args = self.eval_arguments(&tokens[i + 2..close], line)?;
        let result = self.call_function(name, args, line)?;
        tokens.splice(i..=close, result.map(Token::Value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::{
        config::Config,
        interpreter::{program::Program, source::break_lines},
    };

    fn context(source: &str, config: Config) -> Context {
        let program = Program::build(break_lines(source), 0).unwrap();
        Context::new(program, config, Io::new(io::sink(), io::empty()))
    }

    #[test]
    fn arity_messages() {
        assert_eq!(Arity::Exact(2).to_string(), "2");
        assert_eq!(Arity::OneOf(&[1, 2]).to_string(), "1 or 2");
        assert!(Arity::Any.check(7));
        assert!(!Arity::OneOf(&[0, 1]).check(2));
    }

    #[test]
    fn builtins_follow_their_flags() {
        let mut config = Config::default();
        assert!(context("", config.clone()).builtin("lappend").is_some());

        config.set_family("TMP", false);
        let context = context("", config);
        assert!(context.builtin("lappend").is_none());
        assert!(context.builtin("print").is_some());
        assert!(!context.is_callable("dkeys"));
    }

    #[test]
    fn user_functions_shadow_builtins() {
        let mut context = context("func len(x) {\n\treturn 99\n}", Config::default());
        let result = context.call_function("len", vec![Value::from("ab")], 1).unwrap();
        assert_eq!(result, Some(Value::Integer(99)));
    }

    #[test]
    fn aliases_chain_and_detect_cycles() {
        let mut context = context("", Config::default());
        context.aliases.insert("size".into(), "count".into());
        context.aliases.insert("count".into(), "len".into());
        let result = context.call_function("size", vec![Value::from("abc")], 1).unwrap();
        assert_eq!(result, Some(Value::Integer(3)));

        context.aliases.insert("a".into(), "b".into());
        context.aliases.insert("b".into(), "a".into());
        assert_eq!(context.call_function("a", vec![], 2).unwrap_err(),
                   RuntimeError::AliasCycle { name: "a".into(),
                                              line: 2, });

        context.aliases.insert("ghost".into(), "nothing".into());
        assert_eq!(context.call_function("ghost", vec![], 3).unwrap_err(),
                   RuntimeError::UndefinedFunction { name: "nothing".into(),
                                                     line: 3, });
    }

    #[test]
    fn argument_counts_are_checked() {
        let mut context = context("func f(a, b) {\n}", Config::default());
        assert_eq!(context.call_function("f", vec![Value::None], 5).unwrap_err(),
                   RuntimeError::ArgumentCountMismatch { name:     "f".into(),
                                                         expected: "2".into(),
                                                         found:    1,
                                                         line:     5, });
        assert_eq!(context.call_function("f", vec![Value::None, Value::None], 5).unwrap(), None);
        assert!(context.frames.is_empty());
    }
}
