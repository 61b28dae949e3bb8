//! List wrapper builtins, each registered by its `tmp-list-*` flag.
//!
//! Lists are shared, so the mutating builtins change the list seen through
//! every name bound to it.

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Io},
        value::core::Value,
    },
    util::num::{clamp_insert_index, resolve_index, usize_to_i64_checked},
};

/// `ljoin(list, sep)`: joins a list of strings with `sep`.
///
/// # Example
/// ```
/// use std::io;
///
/// use slowpp::interpreter::{
///     evaluator::{core::Io, function::list::join},
///     value::core::Value,
/// };
///
/// let mut io = Io::new(io::sink(), io::empty());
/// let words = Value::from(vec!["a".into(), "b".into()]);
/// let joined = join(&mut io, &[words, Value::from("-")], 1).unwrap();
/// assert_eq!(joined, Some(Value::from("a-b")));
/// ```
pub fn join(_io: &mut Io, args: &[Value], line: usize) -> EvalResult<Option<Value>> {
    let items = args[0].as_list(line)?.borrow();
    let Value::Str(separator) = &args[1] else {
        return Err(RuntimeError::TypeError { details: format!("join separator must be str, not {}",
                                                              args[1].type_name()),
                                             line });
    };

    let mut parts = Vec::with_capacity(items.len());
    for item in items.iter() {
        match item {
            Value::Str(s) => parts.push(s.as_str()),
            other => {
                return Err(RuntimeError::TypeError { details: format!("expected str instance, {} found",
                                                                      other.type_name()),
                                                     line })
            },
        }
    }

    Ok(Some(Value::from(parts.join(separator))))
}

/// `lappend(list, item)`
pub fn append(_io: &mut Io, args: &[Value], line: usize) -> EvalResult<Option<Value>> {
    args[0].as_list(line)?.borrow_mut().push(args[1].clone());
    Ok(None)
}

/// `lpop(list[, index])`: removes and returns an element, the last one by
/// default.
pub fn pop(_io: &mut Io, args: &[Value], line: usize) -> EvalResult<Option<Value>> {
    let mut items = args[0].as_list(line)?.borrow_mut();
    let index = match args.get(1) {
        Some(index) => index.as_integer(line)?,
        None => -1,
    };

    let position = resolve_index(index, items.len(), line)?;
    Ok(Some(items.remove(position)))
}

/// `linsert(list, index, item)`: inserts before `index`, clamping to the ends.
pub fn insert(_io: &mut Io, args: &[Value], line: usize) -> EvalResult<Option<Value>> {
    let index = args[1].as_integer(line)?;
    let mut items = args[0].as_list(line)?.borrow_mut();
    let position = clamp_insert_index(index, items.len());
    items.insert(position, args[2].clone());
    Ok(None)
}

/// `lcount(list, item)`: the number of elements equal to `item`.
pub fn count(_io: &mut Io, args: &[Value], line: usize) -> EvalResult<Option<Value>> {
    let count = args[0].as_list(line)?
                       .borrow()
                       .iter()
                       .filter(|item| **item == args[1])
                       .count();
    Ok(Some(Value::Integer(usize_to_i64_checked(count, line)?)))
}

/// `lextend(list, other)`: appends every element of `other`.
pub fn extend(_io: &mut Io, args: &[Value], line: usize) -> EvalResult<Option<Value>> {
    // Copy first so extending a list with itself does not double borrow.
    let extra = args[1].as_list(line)?.borrow().clone();
    args[0].as_list(line)?.borrow_mut().extend(extra);
    Ok(None)
}

/// `lindex(list, item)`: the position of the first element equal to `item`.
pub fn index(_io: &mut Io, args: &[Value], line: usize) -> EvalResult<Option<Value>> {
    let position = args[0].as_list(line)?
                          .borrow()
                          .iter()
                          .position(|item| *item == args[1])
                          .ok_or_else(|| RuntimeError::ValueNotFound { value: args[1].repr(),
                                                                       line })?;
    Ok(Some(Value::Integer(usize_to_i64_checked(position, line)?)))
}

/// `lcopy(list)`: a shallow copy with its own storage.
pub fn copy(_io: &mut Io, args: &[Value], line: usize) -> EvalResult<Option<Value>> {
    let items = args[0].as_list(line)?.borrow().clone();
    Ok(Some(Value::from(items)))
}

/// `lreverse(list)`: reverses in place.
pub fn reverse(_io: &mut Io, args: &[Value], line: usize) -> EvalResult<Option<Value>> {
    args[0].as_list(line)?.borrow_mut().reverse();
    Ok(None)
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    fn io() -> Io {
        Io::new(io::sink(), io::empty())
    }

    fn list(items: &[i64]) -> Value {
        Value::from(items.iter().map(|&i| Value::Integer(i)).collect::<Vec<_>>())
    }

    #[test]
    fn mutations_are_shared() {
        let xs = list(&[1, 2]);
        let alias = xs.clone();
        append(&mut io(), &[xs.clone(), 3.into()], 1).unwrap();
        insert(&mut io(), &[xs.clone(), (-1).into(), 9.into()], 1).unwrap();
        assert_eq!(alias.to_string(), "[1, 2, 9, 3]");

        reverse(&mut io(), &[xs.clone()], 1).unwrap();
        assert_eq!(alias.to_string(), "[3, 9, 2, 1]");

        extend(&mut io(), &[xs.clone(), xs.clone()], 1).unwrap();
        assert_eq!(alias.len(1).unwrap(), 8);
    }

    #[test]
    fn pop_defaults_to_the_last_element() {
        let xs = list(&[1, 2, 3]);
        assert_eq!(pop(&mut io(), &[xs.clone()], 1).unwrap(), Some(Value::Integer(3)));
        assert_eq!(pop(&mut io(), &[xs.clone(), 0.into()], 1).unwrap(), Some(Value::Integer(1)));
        assert_eq!(xs.to_string(), "[2]");
        assert!(matches!(pop(&mut io(), &[list(&[])], 2),
                         Err(RuntimeError::IndexOutOfBounds { index: -1, len: 0, line: 2 })));
    }

    #[test]
    fn searching() {
        let xs = list(&[4, 5, 4]);
        assert_eq!(count(&mut io(), &[xs.clone(), 4.into()], 1).unwrap(), Some(Value::Integer(2)));
        assert_eq!(index(&mut io(), &[xs.clone(), 5.into()], 1).unwrap(), Some(Value::Integer(1)));
        assert_eq!(index(&mut io(), &[xs, 7.into()], 3).unwrap_err(),
                   RuntimeError::ValueNotFound { value: "7".into(),
                                                 line:  3, });
    }

    #[test]
    fn copies_are_independent() {
        let xs = list(&[1]);
        let copied = copy(&mut io(), &[xs.clone()], 1).unwrap().unwrap();
        append(&mut io(), &[copied.clone(), 2.into()], 1).unwrap();
        assert_eq!(xs.to_string(), "[1]");
        assert_eq!(copied.to_string(), "[1, 2]");
    }

    #[test]
    fn join_needs_strings() {
        assert!(matches!(join(&mut io(), &[list(&[1]), "-".into()], 1),
                         Err(RuntimeError::TypeError { .. })));
    }
}
