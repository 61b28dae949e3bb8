use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        token::{ArithmeticOp, ComparisonOp, LogicalOp, Token},
        value::core::Value,
    },
};

/// An operator that combines two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`, `-`, `*` or `/`.
    Arithmetic(ArithmeticOp),
    /// `^`, `%`, `&` or `|`.
    Logical(LogicalOp),
    /// `==`, `>=`, `<=`, `>` or `<`.
    Comparison(ComparisonOp),
}

impl BinaryOp {
    /// Returns the binary operator a token stands for. `!` is unary only and
    /// yields `None`, as does every non-operator token.
    #[must_use]
    pub const fn from_token(token: &Token) -> Option<Self> {
        match token {
            Token::Arithmetic(op) => Some(Self::Arithmetic(*op)),
            Token::Logical(LogicalOp::Not) => None,
            Token::Logical(op) => Some(Self::Logical(*op)),
            Token::Comparison(op) => Some(Self::Comparison(*op)),
            _ => None,
        }
    }
}

impl Context {
    /// Evaluates a binary operation between two values.
    ///
    /// Arithmetic operators go to `eval_arithmetic`, `^ % & |` to
    /// `eval_logic` and the comparison operators to `eval_comparison`.
    ///
    /// # Parameters
    /// - `op`: The operator.
    /// - `left`: Left operand.
    /// - `right`: Right operand.
    /// - `line`: Line number for error reporting.
    ///
    /// # Returns
    /// An `EvalResult<Value>` containing the evaluated result.
    ///
    /// # Example
    /// ```
    /// use slowpp::interpreter::{
    ///     evaluator::{binary::core::BinaryOp, core::Context},
    ///     token::ArithmeticOp,
    ///     value::core::Value,
    /// };
    ///
    /// let op = BinaryOp::Arithmetic(ArithmeticOp::Add);
    /// let result = Context::eval_binary(op, &Value::Integer(3), &Value::Integer(4), 1);
    /// assert_eq!(result.unwrap(), Value::Integer(7));
    /// ```
    pub fn eval_binary(op: BinaryOp, left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
        match op {
            BinaryOp::Arithmetic(op) => Self::eval_arithmetic(op, left, right, line),
            BinaryOp::Logical(op) => Self::eval_logic(op, left, right, line),
            BinaryOp::Comparison(op) => Self::eval_comparison(op, left, right, line),
        }
    }

    /// Negates a number. Booleans negate as `0` and `1`.
    ///
    /// # Example
    /// ```
    /// use slowpp::interpreter::{evaluator::core::Context, value::core::Value};
    ///
    /// assert_eq!(Context::eval_negate(&Value::Real(1.5), 1).unwrap(), Value::Real(-1.5));
    /// assert!(Context::eval_negate(&Value::from("x"), 1).is_err());
    /// ```
    pub fn eval_negate(value: &Value, line: usize) -> EvalResult<Value> {
        match value {
            Value::Integer(i) => i.checked_neg()
                                  .map(Value::Integer)
                                  .ok_or(RuntimeError::Overflow { line }),
            Value::Real(r) => Ok(Value::Real(-r)),
            Value::Bool(b) => Ok(Value::Integer(-i64::from(*b))),
            _ => Err(RuntimeError::TypeError { details: format!("bad operand type for unary -: '{}'",
                                                                value.type_name()),
                                               line }),
        }
    }
}

/// Builds the error for an operator applied to operands it does not support.
pub(crate) fn unsupported(symbol: &str, left: &Value, right: &Value, line: usize) -> RuntimeError {
    RuntimeError::TypeError { details: format!("unsupported operand type(s) for {symbol}: '{}' and '{}'",
                                               left.type_name(),
                                               right.type_name()),
                              line }
}
