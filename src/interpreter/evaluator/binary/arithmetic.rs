use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            binary::core::unsupported,
            core::{Context, EvalResult},
        },
        token::{ArithmeticOp, Token},
        value::core::{Number, Value},
    },
};

/// Repeats a sequence `count` times. Negative counts give an empty result.
fn repeat<T: Clone>(items: &[T], count: i64) -> Vec<T> {
    let times = usize::try_from(count).unwrap_or(0);
    let mut out = Vec::with_capacity(items.len().saturating_mul(times));
    for _ in 0..times {
        out.extend_from_slice(items);
    }
    out
}

impl Context {
    /// Evaluates `+`, `-`, `*` or `/`.
    ///
    /// Two integers give a checked integer result, except for `/` which is
    /// always a real division. A real on either side promotes both operands.
    /// Strings concatenate with `+` and repeat with `*`; lists do the same
    /// and always produce a new list.
    ///
    /// # Parameters
    /// - `op`: The arithmetic operator.
    /// - `left`: Left operand.
    /// - `right`: Right operand.
    /// - `line`: Line number for error reporting.
    ///
    /// # Returns
    /// The computed value, or `DivisionByZero`, `Overflow` or `TypeError`.
    ///
    /// # Example
    /// ```
    /// use slowpp::interpreter::{
    ///     evaluator::core::Context, token::ArithmeticOp, value::core::Value,
    /// };
    ///
    /// let half = Context::eval_arithmetic(ArithmeticOp::Div, &1.into(), &2.into(), 1);
    /// assert_eq!(half.unwrap(), Value::Real(0.5));
    ///
    /// let word = Context::eval_arithmetic(ArithmeticOp::Mul, &"ab".into(), &2.into(), 1);
    /// assert_eq!(word.unwrap(), Value::from("abab"));
    /// ```
    pub fn eval_arithmetic(op: ArithmeticOp,
                           left: &Value,
                           right: &Value,
                           line: usize)
                           -> EvalResult<Value> {
        use ArithmeticOp::{Add, Mul};

        match (op, left, right) {
            (Add, Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
            (Mul, Value::Str(s), Value::Integer(n)) | (Mul, Value::Integer(n), Value::Str(s)) => {
                let chars: Vec<char> = s.chars().collect();
                Ok(Value::Str(repeat(&chars, *n).into_iter().collect()))
            },
            (Add, Value::List(a), Value::List(b)) => {
                let mut items = a.borrow().clone();
                items.extend(b.borrow().iter().cloned());
                Ok(Value::from(items))
            },
            (Mul, Value::List(l), Value::Integer(n)) | (Mul, Value::Integer(n), Value::List(l)) => {
                Ok(Value::from(repeat(l.borrow().as_slice(), *n)))
            },
            _ => match (left.as_number(), right.as_number()) {
                (Some(Number::Integer(a)), Some(Number::Integer(b))) if op != ArithmeticOp::Div => {
                    Self::eval_integer_op(op, a, b, line)
                },
                (Some(a), Some(b)) => Self::eval_real_op(op, a.to_real(line)?, b.to_real(line)?, line),
                _ => Err(unsupported(&Token::Arithmetic(op).to_string(), left, right, line)),
            },
        }
    }

    /// Integer `+`, `-` and `*` with overflow checks.
    fn eval_integer_op(op: ArithmeticOp, a: i64, b: i64, line: usize) -> EvalResult<Value> {
        let result = match op {
            ArithmeticOp::Add => a.checked_add(b),
            ArithmeticOp::Sub => a.checked_sub(b),
            ArithmeticOp::Mul => a.checked_mul(b),
            ArithmeticOp::Div => {
                return Self::eval_real_op(op,
                                          Number::Integer(a).to_real(line)?,
                                          Number::Integer(b).to_real(line)?,
                                          line)
            },
        };
        result.map(Value::Integer).ok_or(RuntimeError::Overflow { line })
    }

    fn eval_real_op(op: ArithmeticOp, a: f64, b: f64, line: usize) -> EvalResult<Value> {
        Ok(Value::Real(match op {
                           ArithmeticOp::Add => a + b,
                           ArithmeticOp::Sub => a - b,
                           ArithmeticOp::Mul => a * b,
                           ArithmeticOp::Div => {
                               if b == 0.0 {
                                   return Err(RuntimeError::DivisionByZero { line });
                               }
                               a / b
                           },
                       }))
    }
}
