use std::{cmp::Ordering, rc::Rc};

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            binary::core::unsupported,
            core::{Context, EvalResult},
        },
        token::{ComparisonOp, Token},
        value::core::Value,
    },
};

/// Orders two values, or returns `None` when they have no order. Numbers
/// compare across kinds, strings lexicographically by character and lists
/// element by element.
///
/// `active` holds the pairs of lists being ordered further out. Meeting one
/// of them again means the order never resolves, which is a
/// `RecursionLimit` error.
fn order(symbol: &str,
         left: &Value,
         right: &Value,
         active: &mut Vec<(*const (), *const ())>,
         line: usize)
         -> EvalResult<Option<Ordering>> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::List(a), Value::List(b)) => {
            let pair = (Rc::as_ptr(a).cast::<()>(), Rc::as_ptr(b).cast::<()>());
            if active.contains(&pair) {
                return Err(RuntimeError::RecursionLimit { line });
            }

            let (a, b) = (a.borrow(), b.borrow());
            for (x, y) in a.iter().zip(b.iter()) {
                if x != y {
                    active.push(pair);
                    let ordering = order(symbol, x, y, active, line);
                    active.pop();
                    return ordering;
                }
            }
            Ok(Some(a.len().cmp(&b.len())))
        },
        _ => match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => Ok(a.to_real(line)?.partial_cmp(&b.to_real(line)?)),
            _ => Err(unsupported(symbol, left, right, line)),
        },
    }
}

impl Context {
    /// Evaluates a comparison of the form `Value <Operator> Value`.
    ///
    /// `==` is structural equality and never fails. The ordering operators
    /// accept numbers, strings and lists; a comparison involving NaN is
    /// false.
    ///
    /// # Parameters
    /// - `op`: The comparison operator.
    /// - `left`: The left-hand value.
    /// - `right`: The right-hand value.
    /// - `line`: Current line number used for error reporting.
    ///
    /// # Returns
    /// An `EvalResult<Value>` containing a boolean result.
    ///
    /// # Example
    /// ```
    /// use slowpp::interpreter::{
    ///     evaluator::core::Context, token::ComparisonOp, value::core::Value,
    /// };
    ///
    /// let result = Context::eval_comparison(ComparisonOp::Less, &3.into(), &5.5.into(), 1);
    /// assert_eq!(result.unwrap(), Value::Bool(true));
    /// ```
    pub fn eval_comparison(op: ComparisonOp,
                           left: &Value,
                           right: &Value,
                           line: usize)
                           -> EvalResult<Value> {
        if op == ComparisonOp::Equal {
            return Ok(Value::Bool(left == right));
        }

        let ordering = order(&Token::Comparison(op).to_string(), left, right, &mut Vec::new(), line)?;

        Ok(Value::Bool(ordering.is_some_and(|ordering| match op {
                                    ComparisonOp::Less => ordering.is_lt(),
                                    ComparisonOp::Greater => ordering.is_gt(),
                                    ComparisonOp::LessEqual => ordering.is_le(),
                                    ComparisonOp::GreaterEqual => ordering.is_ge(),
                                    ComparisonOp::Equal => ordering.is_eq(),
                                })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compare(op: ComparisonOp, left: Value, right: Value) -> EvalResult<Value> {
        Context::eval_comparison(op, &left, &right, 2)
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(compare(ComparisonOp::Equal, 1.into(), 1.0.into()).unwrap(), Value::Bool(true));
        assert_eq!(compare(ComparisonOp::Equal, "1".into(), 1.into()).unwrap(), Value::Bool(false));
        let a = Value::from(vec![1.into(), "x".into()]);
        let b = Value::from(vec![1.into(), "x".into()]);
        assert_eq!(compare(ComparisonOp::Equal, a, b).unwrap(), Value::Bool(true));
    }

    #[test]
    fn ordering() {
        assert_eq!(compare(ComparisonOp::Less, "abc".into(), "abd".into()).unwrap(),
                   Value::Bool(true));
        assert_eq!(compare(ComparisonOp::GreaterEqual, vec![1.into(), 2.into()].into(), vec![1.into()].into())
                   .unwrap(),
                   Value::Bool(true));
        assert_eq!(compare(ComparisonOp::Less, f64::NAN.into(), 1.into()).unwrap(),
                   Value::Bool(false));
    }

    #[test]
    fn self_containing_lists() {
        let a = Value::from(vec![1.into()]);
        a.as_list(1).unwrap().borrow_mut().insert(0, a.clone());
        let b = Value::from(vec![2.into()]);
        b.as_list(1).unwrap().borrow_mut().insert(0, b.clone());

        assert_eq!(compare(ComparisonOp::Equal, a.clone(), a.clone()).unwrap(), Value::Bool(true));
        assert_eq!(compare(ComparisonOp::LessEqual, a.clone(), a.clone()).unwrap(), Value::Bool(true));
        assert_eq!(compare(ComparisonOp::Equal, a.clone(), b.clone()).unwrap(), Value::Bool(false));
        assert_eq!(compare(ComparisonOp::Less, a, b).unwrap_err(),
                   RuntimeError::RecursionLimit { line: 2 });
    }

    #[test]
    fn mixed_kinds_have_no_order() {
        assert_eq!(compare(ComparisonOp::Greater, "a".into(), 1.into()).unwrap_err(),
                   RuntimeError::TypeError { details: "unsupported operand type(s) for >: 'str' and 'int'".into(),
                                             line:    2, });
    }
}
