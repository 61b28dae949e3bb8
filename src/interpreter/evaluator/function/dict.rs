//! Dict wrapper builtins, each registered by its `tmp-dict-*` flag.

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Io},
        value::{core::Value, dict_key::DictKey},
    },
};

/// `dupdate(dict, other)`: copies every entry of `other` into `dict`.
pub fn update(_io: &mut Io, args: &[Value], line: usize) -> EvalResult<Option<Value>> {
    let extra = args[1].as_dict(line)?.borrow().clone();
    args[0].as_dict(line)?.borrow_mut().extend(extra);
    Ok(None)
}

/// `dpop(dict, key)`: removes an entry and returns its value.
///
/// # Example
/// ```
/// use std::io;
///
/// use slowpp::interpreter::{
///     evaluator::{core::Io, function::dict::pop},
///     value::{core::Value, dict_key::DictKey},
/// };
///
/// let mut io = Io::new(io::sink(), io::empty());
/// let dict = Value::from(std::collections::BTreeMap::from([(DictKey::Integer(1), Value::from("one"))]));
///
/// assert_eq!(pop(&mut io, &[dict.clone(), 1.into()], 1).unwrap(), Some(Value::from("one")));
/// assert!(pop(&mut io, &[dict, 1.into()], 1).is_err());
/// ```
pub fn pop(_io: &mut Io, args: &[Value], line: usize) -> EvalResult<Option<Value>> {
    let key = DictKey::from_value(&args[1], line)?;
    args[0].as_dict(line)?
           .borrow_mut()
           .remove(&key)
           .map(Some)
           .ok_or_else(|| RuntimeError::KeyNotFound { key: key.to_string(),
                                                      line })
}

/// `dcopy(dict)`: a shallow copy with its own storage.
pub fn copy(_io: &mut Io, args: &[Value], line: usize) -> EvalResult<Option<Value>> {
    let entries = args[0].as_dict(line)?.borrow().clone();
    Ok(Some(Value::from(entries)))
}

/// `dkeys(dict)`: the keys as a list, in key order.
pub fn keys(_io: &mut Io, args: &[Value], line: usize) -> EvalResult<Option<Value>> {
    let keys: Vec<Value> = args[0].as_dict(line)?.borrow().keys().cloned().map(Value::from).collect();
    Ok(Some(Value::from(keys)))
}

/// `ditems(dict)`: a list of `[key, value]` pairs, in key order.
pub fn items(_io: &mut Io, args: &[Value], line: usize) -> EvalResult<Option<Value>> {
    let items: Vec<Value> = args[0].as_dict(line)?
                                   .borrow()
                                   .iter()
                                   .map(|(key, value)| Value::from(vec![Value::from(key.clone()), value.clone()]))
                                   .collect();
    Ok(Some(Value::from(items)))
}

/// `dvalues(dict)`: the values as a list, in key order.
pub fn values(_io: &mut Io, args: &[Value], line: usize) -> EvalResult<Option<Value>> {
    let values: Vec<Value> = args[0].as_dict(line)?.borrow().values().cloned().collect();
    Ok(Some(Value::from(values)))
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, io};

    use super::*;

    fn io() -> Io {
        Io::new(io::sink(), io::empty())
    }

    fn dict(entries: &[(&str, i64)]) -> Value {
        let map: BTreeMap<DictKey, Value> =
            entries.iter()
                   .map(|&(k, v)| (DictKey::Str(k.to_string()), Value::Integer(v)))
                   .collect();
        Value::from(map)
    }

    #[test]
    fn update_overwrites_and_adds() {
        let d = dict(&[("a", 1), ("b", 2)]);
        update(&mut io(), &[d.clone(), dict(&[("b", 5), ("c", 6)])], 1).unwrap();
        assert_eq!(d.to_string(), "{'a': 1, 'b': 5, 'c': 6}");
    }

    #[test]
    fn views_are_lists() {
        let d = dict(&[("b", 2), ("a", 1)]);
        assert_eq!(keys(&mut io(), &[d.clone()], 1).unwrap().unwrap().to_string(), "['a', 'b']");
        assert_eq!(values(&mut io(), &[d.clone()], 1).unwrap().unwrap().to_string(), "[1, 2]");
        assert_eq!(items(&mut io(), &[d], 1).unwrap().unwrap().to_string(),
                   "[['a', 1], ['b', 2]]");
    }

    #[test]
    fn copy_and_pop() {
        let d = dict(&[("a", 1)]);
        let copied = copy(&mut io(), &[d.clone()], 1).unwrap().unwrap();
        assert_eq!(pop(&mut io(), &[d.clone(), "a".into()], 1).unwrap(), Some(Value::Integer(1)));
        assert_eq!(d.to_string(), "{}");
        assert_eq!(copied.to_string(), "{'a': 1}");
        assert_eq!(pop(&mut io(), &[d, "a".into()], 9).unwrap_err(),
                   RuntimeError::KeyNotFound { key:  "'a'".into(),
                                               line: 9, });
    }

    #[test]
    fn non_dicts_are_rejected() {
        assert!(matches!(keys(&mut io(), &[Value::Integer(1)], 1),
                         Err(RuntimeError::TypeError { .. })));
    }
}
