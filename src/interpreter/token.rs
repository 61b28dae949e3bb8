use std::fmt;

use crate::{
    error::SyntaxError,
    interpreter::{evaluator::core::EvalResult, value::core::Value},
};

/// `+`, `-`, `*` and `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

/// `=` and the compound assignments `+=`, `-=`, `*=` and `/=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOp {
    /// `=`
    Assign,
    /// `+=`
    AddAssign,
    /// `-=`
    SubAssign,
    /// `*=`
    MulAssign,
    /// `/=`
    DivAssign,
}

impl AssignmentOp {
    /// Returns the arithmetic operator a compound assignment combines with, or
    /// `None` for plain `=`.
    #[must_use]
    pub const fn arithmetic(self) -> Option<ArithmeticOp> {
        match self {
            Self::Assign => None,
            Self::AddAssign => Some(ArithmeticOp::Add),
            Self::SubAssign => Some(ArithmeticOp::Sub),
            Self::MulAssign => Some(ArithmeticOp::Mul),
            Self::DivAssign => Some(ArithmeticOp::Div),
        }
    }
}

/// `!`, `^`, `%`, `&` and `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// `!`, unary negation.
    Not,
    /// `^`, exclusive or.
    Xor,
    /// `%`, modulo.
    Mod,
    /// `&`, logical and.
    And,
    /// `|`, logical or.
    Or,
}

/// `==`, `>=`, `<=`, `>` and `<`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    /// `==`
    Equal,
    /// `>=`
    GreaterEqual,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `<`
    Less,
}

/// Reserved statement words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// `if`
    If,
    /// `elif`
    Elif,
    /// `else`
    Else,
    /// `alias`
    Alias,
    /// `return`
    Return,
    /// `for`
    For,
    /// `while`
    While,
    /// `in`
    In,
}

impl Keyword {
    /// Classifies a word as a keyword.
    ///
    /// # Example
    /// ```
    /// use slowpp::interpreter::token::Keyword;
    ///
    /// assert_eq!(Keyword::from_word("elif"), Some(Keyword::Elif));
    /// assert_eq!(Keyword::from_word("print"), None);
    /// ```
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "if" => Some(Self::If),
            "elif" => Some(Self::Elif),
            "else" => Some(Self::Else),
            "alias" => Some(Self::Alias),
            "return" => Some(Self::Return),
            "for" => Some(Self::For),
            "while" => Some(Self::While),
            "in" => Some(Self::In),
            _ => None,
        }
    }

    /// Returns the source spelling of the keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Elif => "elif",
            Self::Else => "else",
            Self::Alias => "alias",
            Self::Return => "return",
            Self::For => "for",
            Self::While => "while",
            Self::In => "in",
        }
    }
}

/// `:` and `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// `:`, separates dict keys from values.
    Colon,
    /// `.`
    Dot,
}

/// A classified lexical unit of one logical line.
///
/// Tokens are produced by the lexer and then rewritten in place by the
/// evaluator until a single value remains. References stay unresolved until a
/// rule needs their value, so reassignment earlier on the same line is always
/// observed. Computed results, `True`/`False`/`None` and assembled lists and
/// dicts are carried as [`Token::Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A numeric literal exactly as written; whether it is an integer or a
    /// real is decided when it is resolved.
    Number(String),
    /// A string literal with its escapes already applied.
    Str(String),
    /// An arithmetic operator.
    Arithmetic(ArithmeticOp),
    /// An assignment operator.
    Assignment(AssignmentOp),
    /// A variable name.
    Reference(String),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// A logical operator.
    Logical(LogicalOp),
    /// A comparison operator.
    Comparison(ComparisonOp),
    /// The name of a builtin, user function or alias.
    Function(String),
    /// A character the language does not use. Ignored by the evaluator.
    Invalid(String),
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// A statement keyword.
    Keyword(Keyword),
    /// `:` or `.`.
    Symbol(Symbol),
    /// An already resolved value.
    Value(Value),
}

impl Token {
    /// Returns `true` if the token can be resolved to a value without further
    /// rewriting.
    #[must_use]
    pub const fn is_operand(&self) -> bool {
        matches!(self, Self::Number(_) | Self::Str(_) | Self::Reference(_) | Self::Value(_))
    }

    /// Resolves a literal token to its value.
    ///
    /// References are not literals and need the evaluator's namespaces; for
    /// them, and for every non-operand token, this returns `Ok(None)`.
    ///
    /// # Example
    /// ```
    /// use slowpp::interpreter::{token::Token, value::core::Value};
    ///
    /// let int = Token::Number("42".into()).literal(1).unwrap();
    /// assert_eq!(int, Some(Value::Integer(42)));
    ///
    /// let real = Token::Number("2.5".into()).literal(1).unwrap();
    /// assert_eq!(real, Some(Value::Real(2.5)));
    /// ```
    pub fn literal(&self, line: usize) -> EvalResult<Option<Value>> {
        match self {
            Self::Number(text) => Ok(Some(parse_number(text, line)?)),
            Self::Str(s) => Ok(Some(Value::Str(s.clone()))),
            Self::Value(v) => Ok(Some(v.clone())),
            _ => Ok(None),
        }
    }
}

/// Parses numeric literal text. Text containing a decimal point is a real,
/// anything else an integer.
fn parse_number(text: &str, line: usize) -> EvalResult<Value> {
    let invalid = || SyntaxError::InvalidNumber { literal: text.to_string(),
                                                  line };
    if text.contains('.') {
        text.parse::<f64>().map(Value::Real).map_err(|_| invalid().into())
    } else {
        text.parse::<i64>().map(Value::Integer).map_err(|_| invalid().into())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(text) | Self::Reference(text) | Self::Function(text) | Self::Invalid(text) => {
                write!(f, "{text}")
            },
            Self::Str(s) => write!(f, "{}", Value::Str(s.clone()).repr()),
            Self::Arithmetic(op) => write!(f,
                                           "{}",
                                           match op {
                                               ArithmeticOp::Add => "+",
                                               ArithmeticOp::Sub => "-",
                                               ArithmeticOp::Mul => "*",
                                               ArithmeticOp::Div => "/",
                                           }),
            Self::Assignment(op) => write!(f,
                                           "{}",
                                           match op {
                                               AssignmentOp::Assign => "=",
                                               AssignmentOp::AddAssign => "+=",
                                               AssignmentOp::SubAssign => "-=",
                                               AssignmentOp::MulAssign => "*=",
                                               AssignmentOp::DivAssign => "/=",
                                           }),
            Self::Logical(op) => write!(f,
                                        "{}",
                                        match op {
                                            LogicalOp::Not => "!",
                                            LogicalOp::Xor => "^",
                                            LogicalOp::Mod => "%",
                                            LogicalOp::And => "&",
                                            LogicalOp::Or => "|",
                                        }),
            Self::Comparison(op) => write!(f,
                                           "{}",
                                           match op {
                                               ComparisonOp::Equal => "==",
                                               ComparisonOp::GreaterEqual => ">=",
                                               ComparisonOp::LessEqual => "<=",
                                               ComparisonOp::Greater => ">",
                                               ComparisonOp::Less => "<",
                                           }),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::LBrace => write!(f, "{{"),
            Self::RBrace => write!(f, "}}"),
            Self::LBracket => write!(f, "["),
            Self::RBracket => write!(f, "]"),
            Self::Comma => write!(f, ","),
            Self::Keyword(k) => write!(f, "{}", k.as_str()),
            Self::Symbol(Symbol::Colon) => write!(f, ":"),
            Self::Symbol(Symbol::Dot) => write!(f, "."),
            Self::Value(v) => write!(f, "{}", v.repr()),
        }
    }
}
