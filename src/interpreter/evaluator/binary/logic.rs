use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            binary::core::unsupported,
            core::{Context, EvalResult},
        },
        token::{LogicalOp, Token},
        value::core::{Number, Value},
    },
};

impl Context {
    /// Evaluates `^`, `%`, `&` or `|`.
    ///
    /// `^` is exclusive or: two booleans give a boolean, two integers give
    /// their bitwise xor. `%` is modulo with the sign of the divisor. `&` and
    /// `|` return one of their operands: the left one when it decides the
    /// result, else the right one.
    ///
    /// # Parameters
    /// - `op`: The logical operator. `Not` is unary and never reaches here.
    /// - `left`: Left operand.
    /// - `right`: Right operand.
    /// - `line`: Line number for error reporting.
    ///
    /// # Returns
    /// An `EvalResult<Value>` containing the result.
    ///
    /// # Example
    /// ```
    /// use slowpp::interpreter::{evaluator::core::Context, token::LogicalOp, value::core::Value};
    ///
    /// let xor = Context::eval_logic(LogicalOp::Xor, &true.into(), &false.into(), 1);
    /// assert_eq!(xor.unwrap(), Value::Bool(true));
    ///
    /// let rem = Context::eval_logic(LogicalOp::Mod, &Value::Integer(-7), &3.into(), 1);
    /// assert_eq!(rem.unwrap(), Value::Integer(2));
    /// ```
    pub fn eval_logic(op: LogicalOp, left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
        match op {
            LogicalOp::And => Ok(if left.is_truthy() { right.clone() } else { left.clone() }),
            LogicalOp::Or => Ok(if left.is_truthy() { left.clone() } else { right.clone() }),
            LogicalOp::Xor => match (left, right) {
                (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a ^ b)),
                _ => match (left.as_number(), right.as_number()) {
                    (Some(Number::Integer(a)), Some(Number::Integer(b))) => Ok(Value::Integer(a ^ b)),
                    _ => Err(unsupported("^", left, right, line)),
                },
            },
            LogicalOp::Mod => Self::eval_modulo(left, right, line),
            LogicalOp::Not => Err(RuntimeError::MissingOperand { operator: Token::Logical(op).to_string(),
                                                                 line }),
        }
    }

    /// Floored modulo: the result takes the sign of the divisor.
    fn eval_modulo(left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
        match (left.as_number(), right.as_number()) {
            (Some(Number::Integer(a)), Some(Number::Integer(b))) => {
                if b == 0 {
                    return Err(RuntimeError::DivisionByZero { line });
                }
                // Only `i64::MIN % -1` overflows, and any number modulo -1 is 0.
                let rem = a.checked_rem(b).unwrap_or(0);
                Ok(Value::Integer(if rem != 0 && (rem < 0) != (b < 0) { rem + b } else { rem }))
            },
            (Some(a), Some(b)) => {
                let (a, b) = (a.to_real(line)?, b.to_real(line)?);
                if b == 0.0 {
                    return Err(RuntimeError::DivisionByZero { line });
                }
                let rem = a % b;
                Ok(Value::Real(if rem != 0.0 && (rem < 0.0) != (b < 0.0) { rem + b } else { rem }))
            },
            _ => Err(unsupported("%", left, right, line)),
        }
    }
}
