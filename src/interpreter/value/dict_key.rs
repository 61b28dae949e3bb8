use std::{
    cmp::Ordering,
    fmt::Display,
    hash::{Hash, Hasher},
};

use ordered_float::OrderedFloat;

use crate::{
    error::RuntimeError,
    interpreter::{evaluator::core::EvalResult, value::core::Value},
    util::num::cmp_int_real,
};

/// Enum representing values allowed as dict keys.
///
/// Only immutable scalars can key a dict. Floats are wrapped in
/// [`OrderedFloat`] so keys are totally ordered, which keeps dicts sorted by
/// key and makes their rendering deterministic.
///
/// Keys compare the way their values do: `True`, `1` and `1.0` are the same
/// key. The variant is kept, so a dict shows the key it was first given.
#[derive(Clone, Debug)]
pub enum DictKey {
    /// The `None` literal.
    None,
    /// A boolean such as `True`.
    Bool(bool),
    /// An integer such as `-4` or `42`.
    Integer(i64),
    /// A real such as `3.5`.
    Real(OrderedFloat<f64>),
    /// A string such as `"name"`.
    Str(String),
}

impl DictKey {
    /// Converts a runtime value into a dict key.
    ///
    /// # Errors
    /// Lists and dicts are mutable and therefore unhashable; they produce a
    /// `TypeError`.
    ///
    /// # Example
    /// ```
    /// use slowpp::interpreter::value::{core::Value, dict_key::DictKey};
    ///
    /// let key = DictKey::from_value(&Value::from("a"), 1).unwrap();
    /// assert_eq!(key, DictKey::Str("a".to_string()));
    ///
    /// assert!(DictKey::from_value(&Value::from(vec![]), 1).is_err());
    /// ```
    pub fn from_value(value: &Value, line: usize) -> EvalResult<Self> {
        match value {
            Value::None => Ok(Self::None),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Integer(i) => Ok(Self::Integer(*i)),
            Value::Real(r) => Ok(Self::Real(OrderedFloat(*r))),
            Value::Str(s) => Ok(Self::Str(s.clone())),
            Value::List(_) | Value::Dict(_) => {
                Err(RuntimeError::TypeError { details: format!("unhashable type: '{}'",
                                                               value.type_name()),
                                              line })
            },
        }
    }
}

/// The numeric view of a key. Booleans count as `0` and `1`.
enum Numeric {
    Integer(i64),
    Real(OrderedFloat<f64>),
}

impl DictKey {
    /// Sort rank of the key's kind: `None`, then numbers, then strings.
    const fn rank(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Bool(_) | Self::Integer(_) | Self::Real(_) => 1,
            Self::Str(_) => 2,
        }
    }

    fn numeric(&self) -> Option<Numeric> {
        match self {
            Self::Bool(b) => Some(Numeric::Integer(i64::from(*b))),
            Self::Integer(i) => Some(Numeric::Integer(*i)),
            Self::Real(r) => Some(Numeric::Real(*r)),
            Self::None | Self::Str(_) => None,
        }
    }
}

impl Ord for DictKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            _ => match (self.numeric(), other.numeric()) {
                (Some(Numeric::Integer(a)), Some(Numeric::Integer(b))) => a.cmp(&b),
                (Some(Numeric::Real(a)), Some(Numeric::Real(b))) => a.cmp(&b),
                (Some(Numeric::Integer(a)), Some(Numeric::Real(b))) => cmp_int_real(a, b.into_inner()),
                (Some(Numeric::Real(a)), Some(Numeric::Integer(b))) => cmp_int_real(b, a.into_inner()).reverse(),
                _ => self.rank().cmp(&other.rank()),
            },
        }
    }
}

impl PartialOrd for DictKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DictKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DictKey {}

impl Hash for DictKey {
    /// Equal keys hash equally: integral reals and booleans hash as the
    /// integer they equal.
    #[allow(clippy::cast_possible_truncation)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self.numeric() {
            Some(Numeric::Integer(i)) => i.hash(state),
            Some(Numeric::Real(r)) => {
                let whole = r.into_inner().trunc() as i64;
                if cmp_int_real(whole, r.into_inner()) == Ordering::Equal {
                    whole.hash(state);
                } else {
                    r.hash(state);
                }
            },
            None => {
                if let Self::Str(s) = self {
                    s.hash(state);
                }
            },
        }
    }
}

impl From<DictKey> for Value {
    fn from(key: DictKey) -> Self {
        match key {
            DictKey::None => Self::None,
            DictKey::Bool(b) => Self::Bool(b),
            DictKey::Integer(i) => Self::Integer(i),
            DictKey::Real(r) => Self::Real(r.into_inner()),
            DictKey::Str(s) => Self::Str(s),
        }
    }
}

impl Display for DictKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value: Value = self.clone().into();
        write!(f, "{}", value.repr())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rustc_hash::FxHasher;

    use super::*;

    fn hash_of(key: &DictKey) -> u64 {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn numeric_keys_compare_by_value() {
        let one = DictKey::Integer(1);
        assert_eq!(one, DictKey::Real(OrderedFloat(1.0)));
        assert_eq!(one, DictKey::Bool(true));
        assert_ne!(one, DictKey::Real(OrderedFloat(1.5)));
        assert_ne!(one, DictKey::Str("1".into()));
        assert!(DictKey::Integer(2) > DictKey::Real(OrderedFloat(1.5)));
        assert!(DictKey::None < DictKey::Bool(false));
        assert!(DictKey::Integer(i64::MAX) < DictKey::Str(String::new()));
    }

    #[test]
    fn equal_keys_hash_equally() {
        assert_eq!(hash_of(&DictKey::Integer(1)), hash_of(&DictKey::Real(OrderedFloat(1.0))));
        assert_eq!(hash_of(&DictKey::Integer(0)), hash_of(&DictKey::Bool(false)));
        assert_eq!(hash_of(&DictKey::Integer(0)), hash_of(&DictKey::Real(OrderedFloat(-0.0))));
    }

    #[test]
    fn the_first_key_is_kept() {
        let mut map = BTreeMap::new();
        map.insert(DictKey::Integer(1), Value::from("a"));
        map.insert(DictKey::Bool(true), Value::from("b"));
        assert_eq!(map.len(), 1);
        assert_eq!(Value::from(map).to_string(), "{1: 'b'}");
    }
}
