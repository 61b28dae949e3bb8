use std::io::{self, BufRead, Write};

use rustc_hash::FxHashMap;

use crate::{
    config::Config,
    error::{RuntimeError, SyntaxError},
    interpreter::{
        evaluator::binary::core::BinaryOp,
        lexer::tokenize,
        program::Program,
        token::{ArithmeticOp, Keyword, LogicalOp, Token},
        value::core::Value,
    },
    util::stack::ensure_sufficient_stack,
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// Maximum number of nested user function calls.
pub const MAX_CALL_DEPTH: usize = 256;

/// A variable namespace.
pub type Scope = FxHashMap<String, Value>;

/// The streams scripts read from and write to.
///
/// `print` writes to `output` and `input` reads lines from `input`. Embedders
/// and tests swap in buffers to capture a run.
pub struct Io {
    /// Destination of `print` and of `input` prompts.
    pub output: Box<dyn Write>,
    /// Source of `input` lines.
    pub input:  Box<dyn BufRead>,
}

impl Io {
    /// Creates an `Io` from any writer and buffered reader.
    pub fn new(output: impl Write + 'static, input: impl BufRead + 'static) -> Self {
        Self { output: Box::new(output),
               input:  Box::new(input), }
    }

    /// Uses the process's standard output and standard input.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stdin().lock())
    }
}

/// How execution continues after a line or block.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Continue with the line at this index.
    Next(usize),
    /// A `break` on the given source line.
    Break(usize),
    /// A `continue` on the given source line.
    Continue(usize),
    /// A `return`, with the returned value if any.
    Return(Option<Value>),
}

/// The result of evaluating a token sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The sequence reduced to a value, or to nothing.
    Value(Option<Value>),
    /// A `return` was evaluated.
    Return(Option<Value>),
}

/// Result of one rewrite pass over a token sequence.
enum Step {
    Rewrote,
    Return(Option<Value>),
    Done,
}

/// Stores the runtime evaluation context.
///
/// This struct holds the interpreter state: the loaded program, the flags,
/// the global namespace, one frame of locals per active user function call,
/// the alias table and the execution cursor.
///
/// ## Usage
///
/// A `Context` is created once per program run. The driver (`run`) walks the
/// program lines and every evaluation method reads and updates this state.
pub struct Context {
    /// The hoisted program.
    pub program: Program,
    /// Interpreter flags.
    pub config:  Config,
    /// Process-wide variables, seeded with `True`, `False` and `None`.
    pub globals: Scope,
    /// Local variables of the active calls, innermost last.
    pub frames:  Vec<Scope>,
    /// Maps alias names to the name they stand for.
    pub aliases: FxHashMap<String, String>,
    /// Index of the line being executed.
    pub cursor:  usize,
    /// Script input and output.
    pub io:      Io,
}

impl Context {
    /// Creates a context ready to run `program`.
    #[must_use]
    pub fn new(program: Program, config: Config, io: Io) -> Self {
        let mut globals = Scope::default();
        globals.insert("True".to_string(), Value::Bool(true));
        globals.insert("False".to_string(), Value::Bool(false));
        globals.insert("None".to_string(), Value::None);

        let cursor = program.header_len;
        Self { program,
               config,
               globals,
               frames: Vec::new(),
               aliases: FxHashMap::default(),
               cursor,
               io }
    }

    /// Returns `true` if `name` is a user function, an enabled builtin or an
    /// alias.
    #[must_use]
    pub fn is_callable(&self, name: &str) -> bool {
        self.program.functions.contains_key(name)
        || self.builtin(name).is_some()
        || self.aliases.contains_key(name)
    }

    /// Tokenizes the line at `index` against the current callable names.
    pub fn tokenize_line(&self, index: usize) -> EvalResult<Vec<Token>> {
        let text = self.program.lines.get(index).map_or("", |l| l.text.as_str());
        Ok(tokenize(text, self.program.number(index), |name| self.is_callable(name))?)
    }

    /// Looks up a variable.
    ///
    /// Inside a call the innermost frame is searched first, then the globals.
    /// At top level only the globals exist.
    pub fn lookup(&self, name: &str, line: usize) -> EvalResult<Value> {
        self.frames
            .last()
            .and_then(|frame| frame.get(name))
            .or_else(|| self.globals.get(name))
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedVariable { name: name.to_string(),
                                                             line })
    }

    /// Stores a variable. Names already bound in the innermost frame stay
    /// local; everything else is global.
    pub fn assign(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            if let Some(slot) = frame.get_mut(name) {
                *slot = value;
                return;
            }
        }
        self.globals.insert(name.to_string(), value);
    }

    /// Binds a loop variable: in the innermost frame inside a call, in the
    /// globals at top level.
    pub fn bind_local(&mut self, name: &str, value: Value) {
        match self.frames.last_mut() {
            Some(frame) => frame.insert(name.to_string(), value),
            None => self.globals.insert(name.to_string(), value),
        };
    }

    /// Resolves an operand token to its value.
    pub(crate) fn operand(&self, token: &Token, line: usize) -> EvalResult<Value> {
        match token {
            Token::Reference(name) => self.lookup(name, line),
            other => other.literal(line)?.ok_or(RuntimeError::MissingValue { line }),
        }
    }

    /// Evaluates a token sequence by repeated rewriting.
    ///
    /// Each pass scans the tokens left to right and applies the first rule
    /// that matches, then starts over. Groups and calls collapse to the value
    /// they produce, references resolve to their values, and operators
    /// combine their two neighbours once both are values. There is no
    /// operator precedence: operators apply in the order they become ready,
    /// and parentheses group. When no rule applies the first remaining token
    /// is the result.
    ///
    /// # Parameters
    /// - `tokens`: The tokens of one expression or statement.
    /// - `line`: Source line number for error reporting.
    ///
    /// # Returns
    /// `Outcome::Value` with the result (or `None` for statements such as
    /// calls that return nothing), or `Outcome::Return` when a `return` was
    /// evaluated.
    pub fn eval_tokens(&mut self, mut tokens: Vec<Token>, line: usize) -> EvalResult<Outcome> {
        tokens.retain(|token| !matches!(token, Token::Invalid(_)));

        ensure_sufficient_stack(|| loop {
            match self.rewrite_once(&mut tokens, line)? {
                Step::Rewrote => {},
                Step::Return(value) => return Ok(Outcome::Return(value)),
                Step::Done => return Ok(Outcome::Value(Self::finish(&tokens, line)?)),
            }
        })
    }

    /// Evaluates tokens that may produce a value but must not `return`.
    pub fn eval_optional(&mut self, tokens: Vec<Token>, line: usize) -> EvalResult<Option<Value>> {
        match self.eval_tokens(tokens, line)? {
            Outcome::Value(value) => Ok(value),
            Outcome::Return(_) => {
                let keyword = Keyword::Return.as_str().to_string();
                Err(RuntimeError::UnexpectedKeyword { keyword, line })
            },
        }
    }

    /// Evaluates tokens that must produce a value.
    pub fn eval_value(&mut self, tokens: Vec<Token>, line: usize) -> EvalResult<Value> {
        self.eval_optional(tokens, line)?.ok_or(RuntimeError::MissingValue { line })
    }

    fn rewrite_once(&mut self, tokens: &mut Vec<Token>, line: usize) -> EvalResult<Step> {
        for i in 0..tokens.len() {
            match &tokens[i] {
                Token::Arithmetic(ArithmeticOp::Div)
                    if matches!(tokens.get(i + 1), Some(Token::Arithmetic(ArithmeticOp::Div))) =>
                {
                    tokens.truncate(i);
                    return Ok(Step::Rewrote);
                },
                Token::LParen => {
                    let close = find_close(tokens, i).ok_or(SyntaxError::UnmatchedParenthesis { line })?;
                    let inner = tokens[i + 1..close].to_vec();
                    let value = self.eval_optional(inner, line)?;
                    tokens.splice(i..=close, value.map(Token::Value));
                    return Ok(Step::Rewrote);
                },
                Token::Function(name) if matches!(tokens.get(i + 1), Some(Token::LParen)) => {
                    let name = name.clone();
                    self.reduce_call(tokens, i, &name, line)?;
                    return Ok(Step::Rewrote);
                },
                Token::Keyword(keyword) => {
                    let keyword = *keyword;
                    return self.reduce_keyword(tokens, i, keyword, line);
                },
                Token::Assignment(op) => {
                    let op = *op;
                    self.reduce_assignment(tokens, i, op, line)?;
                    return Ok(Step::Rewrote);
                },
                Token::Reference(name)
                    if !matches!(tokens.get(i + 1),
                                 Some(Token::Assignment(_) | Token::Keyword(Keyword::Alias))) =>
                {
                    let value = self.lookup(name, line)?;
                    tokens[i] = Token::Value(value);
                    return Ok(Step::Rewrote);
                },
                Token::Arithmetic(ArithmeticOp::Sub)
                    if is_prefix_position(tokens, i) && operand_ready(tokens, i + 1) =>
                {
                    let value = self.operand(&tokens[i + 1], line)?;
                    let negated = Self::eval_negate(&value, line)?;
                    tokens.splice(i..=i + 1, [Token::Value(negated)]);
                    return Ok(Step::Rewrote);
                },
                Token::Logical(LogicalOp::Not) if operand_ready(tokens, i + 1) => {
                    let value = self.operand(&tokens[i + 1], line)?;
                    tokens.splice(i..=i + 1, [Token::Value(Value::Bool(!value.is_truthy()))]);
                    return Ok(Step::Rewrote);
                },
                token @ (Token::Arithmetic(_) | Token::Logical(_) | Token::Comparison(_))
                    if i > 0 && tokens[i - 1].is_operand() && operand_ready(tokens, i + 1) =>
                {
                    let Some(op) = BinaryOp::from_token(token) else {
                        continue;
                    };
                    let left = self.operand(&tokens[i - 1], line)?;
                    let right = self.operand(&tokens[i + 1], line)?;
                    let result = Self::eval_binary(op, &left, &right, line)?;
                    tokens.splice(i - 1..=i + 1, [Token::Value(result)]);
                    return Ok(Step::Rewrote);
                },
                Token::LBracket => {
                    self.reduce_bracket(tokens, i, line)?;
                    return Ok(Step::Rewrote);
                },
                Token::LBrace => {
                    self.reduce_dict(tokens, i, line)?;
                    return Ok(Step::Rewrote);
                },
                _ => {},
            }
        }

        Ok(Step::Done)
    }

    /// Handles a keyword found inside an expression.
    fn reduce_keyword(&mut self,
                      tokens: &mut Vec<Token>,
                      i: usize,
                      keyword: Keyword,
                      line: usize)
                      -> EvalResult<Step> {
        match keyword {
            Keyword::Alias => {
                self.define_alias(tokens, i, line)?;
                Ok(Step::Rewrote)
            },
            Keyword::Return => {
                let rest = tokens.split_off(i + 1);
                Ok(Step::Return(self.eval_optional(rest, line)?))
            },
            other => Err(RuntimeError::UnexpectedKeyword { keyword: other.as_str().to_string(),
                                                           line }),
        }
    }

    /// Checks the tokens left after rewriting and picks the result.
    fn finish(tokens: &[Token], line: usize) -> EvalResult<Option<Value>> {
        for token in tokens {
            match token {
                Token::RParen => return Err(SyntaxError::UnmatchedParenthesis { line }.into()),
                Token::RBracket => return Err(SyntaxError::UnopenedSquareBracket { line }.into()),
                Token::RBrace => return Err(SyntaxError::UnopenedCurlyBracket { line }.into()),
                Token::Arithmetic(_)
                | Token::Logical(_)
                | Token::Comparison(_)
                | Token::Assignment(_) => {
                    return Err(RuntimeError::MissingOperand { operator: token.to_string(),
                                                              line });
                },
                _ => {},
            }
        }

        match tokens.first() {
            Some(token) => token.literal(line),
            None => Ok(None),
        }
    }
}

/// Returns `true` if the token at `index` is a value that is not about to be
/// subscripted or assigned to.
fn operand_ready(tokens: &[Token], index: usize) -> bool {
    tokens.get(index).is_some_and(Token::is_operand)
    && !matches!(tokens.get(index + 1), Some(Token::LBracket | Token::Assignment(_)))
}

/// Returns `true` if an operator at `index` has no left operand.
fn is_prefix_position(tokens: &[Token], index: usize) -> bool {
    index == 0
    || !(tokens[index - 1].is_operand()
         || matches!(tokens[index - 1], Token::RParen | Token::RBracket | Token::RBrace))
}

/// Finds the token closing the bracket opened at `open`.
///
/// Only brackets of the same kind are counted, so `(` matches the `)` that
/// brings the parenthesis depth back to zero.
///
/// # Example
/// ```
/// use slowpp::interpreter::{evaluator::core::find_close, lexer::tokenize};
///
/// let tokens = tokenize("(a, (b)) + c", 1, |_| false).unwrap();
/// assert_eq!(find_close(&tokens, 0), Some(6));
/// assert_eq!(find_close(&tokens, 3), Some(5));
/// ```
#[must_use]
pub fn find_close(tokens: &[Token], open: usize) -> Option<usize> {
    let opener = tokens.get(open)?;
    let closer = match opener {
        Token::LParen => Token::RParen,
        Token::LBracket => Token::RBracket,
        Token::LBrace => Token::RBrace,
        _ => return None,
    };

    let mut depth = 0_usize;
    for (offset, token) in tokens[open..].iter().enumerate() {
        if token == opener {
            depth += 1;
        } else if *token == closer {
            depth -= 1;
            if depth == 0 {
                return Some(open + offset);
            }
        }
    }
    None
}

/// Splits tokens at the commas that are not nested inside any bracket.
///
/// An empty sequence yields no parts; otherwise there is always one more part
/// than there are top-level commas, so `a,` yields an empty second part.
#[must_use]
pub fn split_top_level(tokens: &[Token]) -> Vec<&[Token]> {
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut depth = 0_i32;
    let mut start = 0;

    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
            Token::RParen | Token::RBracket | Token::RBrace => depth -= 1,
            Token::Comma if depth == 0 => {
                parts.push(&tokens[start..index]);
                start = index + 1;
            },
            _ => {},
        }
    }
    parts.push(&tokens[start..]);

    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::source::break_lines;

    fn context() -> Context {
        let program = Program::build(break_lines(""), 0).unwrap();
        Context::new(program, Config::default(), Io::new(io::sink(), io::empty()))
    }

    fn eval(context: &mut Context, source: &str) -> EvalResult<Option<Value>> {
        let tokens = tokenize(source, 1, |name| context.is_callable(name))?;
        context.eval_optional(tokens, 1)
    }

    #[test]
    fn operators_apply_left_to_right() {
        let mut context = context();
        assert_eq!(eval(&mut context, "1 + 2 * 3").unwrap(), Some(Value::Integer(9)));
        assert_eq!(eval(&mut context, "1 + (2 * 3)").unwrap(), Some(Value::Integer(7)));
        assert_eq!(eval(&mut context, "10 - 4 - 3").unwrap(), Some(Value::Integer(3)));
    }

    #[test]
    fn subscripts_bind_before_operators() {
        let mut context = context();
        eval(&mut context, "x = [10, 20, 30]").unwrap();
        assert_eq!(eval(&mut context, "1 + x[1]").unwrap(), Some(Value::Integer(21)));
        assert_eq!(eval(&mut context, "x[-1] - x[0]").unwrap(), Some(Value::Integer(20)));
    }

    #[test]
    fn assignment_yields_the_stored_value() {
        let mut context = context();
        assert_eq!(eval(&mut context, "x = y = 4").unwrap(), Some(Value::Integer(4)));
        assert_eq!(context.lookup("y", 1).unwrap(), Value::Integer(4));
        eval(&mut context, "x *= 2 + 1").unwrap();
        assert_eq!(context.lookup("x", 1).unwrap(), Value::Integer(12));
    }

    #[test]
    fn references_resolve_late() {
        let mut context = context();
        eval(&mut context, "a = 1").unwrap();
        assert_eq!(eval(&mut context, "(a = 5) + a").unwrap(), Some(Value::Integer(10)));
    }

    #[test]
    fn prefix_operators() {
        let mut context = context();
        eval(&mut context, "x = 3").unwrap();
        assert_eq!(eval(&mut context, "-x").unwrap(), Some(Value::Integer(-3)));
        assert_eq!(eval(&mut context, "!x").unwrap(), Some(Value::Bool(false)));
        assert_eq!(eval(&mut context, "2 - -x").unwrap(), Some(Value::Integer(5)));
    }

    #[test]
    fn leftover_operators_are_errors() {
        let mut context = context();
        assert_eq!(eval(&mut context, "1 +").unwrap_err(),
                   RuntimeError::MissingOperand { operator: "+".into(),
                                                  line:     1, });
        assert_eq!(eval(&mut context, "(1").unwrap_err(),
                   RuntimeError::from(SyntaxError::UnmatchedParenthesis { line: 1 }));
        assert_eq!(eval(&mut context, "1)").unwrap_err(),
                   RuntimeError::from(SyntaxError::UnmatchedParenthesis { line: 1 }));
        assert_eq!(eval(&mut context, "5 = 1").unwrap_err(),
                   RuntimeError::InvalidAssignment { line: 1 });
    }

    #[test]
    fn comment_guard_truncates() {
        let mut context = context();
        assert_eq!(eval(&mut context, "7 / / 0").unwrap(), Some(Value::Integer(7)));
    }

    #[test]
    fn frames_shadow_globals() {
        let mut context = context();
        context.assign("x", Value::Integer(1));
        context.frames.push(Scope::default());
        context.bind_local("x", Value::Integer(2));
        assert_eq!(context.lookup("x", 1).unwrap(), Value::Integer(2));
        context.assign("y", Value::Integer(3));
        context.frames.pop();
        assert_eq!(context.lookup("x", 1).unwrap(), Value::Integer(1));
        assert_eq!(context.lookup("y", 1).unwrap(), Value::Integer(3));
    }

    #[test]
    fn top_level_split() {
        let tokens = tokenize("a, [b, c], f(d, e)", 1, |n| n == "f").unwrap();
        let parts = split_top_level(&tokens);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].len(), 5);
        assert!(split_top_level(&[]).is_empty());
    }
}
