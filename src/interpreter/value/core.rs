use std::{cell::RefCell, cmp::Ordering, collections::BTreeMap, rc::Rc};

use crate::{
    error::RuntimeError,
    interpreter::{evaluator::core::EvalResult, value::dict_key::DictKey},
    util::num::{cmp_int_real, i64_to_f64_checked, resolve_index},
};

/// Shared, mutable list storage.
///
/// Lists have reference semantics: every name bound to a list sees mutations
/// made through any other name.
pub type ListRef = Rc<RefCell<Vec<Value>>>;

/// Shared, mutable dict storage, ordered by key.
pub type DictRef = Rc<RefCell<BTreeMap<DictKey, Value>>>;

/// Represents a runtime value in the interpreter.
///
/// Tokens are resolved into values when an evaluation rule needs a concrete
/// operand. Arithmetic, comparisons and assignments all operate on this type
/// directly, so the kind of a computed result is never lost.
#[derive(Debug, Clone)]
pub enum Value {
    /// A integer value (64 bit integer).
    Integer(i64),
    /// A numeric value (double precision floating-point).
    Real(f64),
    /// A string.
    Str(String),
    /// `True` or `False`.
    Bool(bool),
    /// The `None` literal.
    None,
    /// An ordered list of values.
    List(ListRef),
    /// A key-ordered mapping from [`DictKey`] to values.
    Dict(DictRef),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::List(Rc::new(RefCell::new(v)))
    }
}

impl From<BTreeMap<DictKey, Self>> for Value {
    fn from(v: BTreeMap<DictKey, Self>) -> Self {
        Self::Dict(Rc::new(RefCell::new(v)))
    }
}

/// A numeric view of a value, used for mixed int/float arithmetic and
/// comparisons. Booleans count as the integers `0` and `1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// An integer operand.
    Integer(i64),
    /// A floating-point operand.
    Real(f64),
}

impl Number {
    /// Converts the number to `f64`.
    pub const fn to_real(self, line: usize) -> EvalResult<f64> {
        match self {
            Self::Integer(i) => i64_to_f64_checked(i, line),
            Self::Real(r) => Ok(r),
        }
    }
}

impl Value {
    /// Returns the name of the value's type as shown in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "int",
            Self::Real(_) => "float",
            Self::Str(_) => "str",
            Self::Bool(_) => "bool",
            Self::None => "NoneType",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
        }
    }

    /// Returns the truthiness of the value.
    ///
    /// `False`, `None`, zero, and empty strings, lists and dicts are false;
    /// everything else is true.
    ///
    /// # Example
    /// ```
    /// use slowpp::interpreter::value::core::Value;
    ///
    /// assert!(Value::Integer(3).is_truthy());
    /// assert!(!Value::from("").is_truthy());
    /// assert!(!Value::None.is_truthy());
    /// ```
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Integer(i) => *i != 0,
            Self::Real(r) => *r != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Bool(b) => *b,
            Self::None => false,
            Self::List(l) => !l.borrow().is_empty(),
            Self::Dict(d) => !d.borrow().is_empty(),
        }
    }

    /// Returns the numeric view of the value, if it has one.
    #[must_use]
    pub const fn as_number(&self) -> Option<Number> {
        match self {
            Self::Integer(i) => Some(Number::Integer(*i)),
            Self::Real(r) => Some(Number::Real(*r)),
            Self::Bool(b) => Some(Number::Integer(*b as i64)),
            _ => None,
        }
    }

    /// Converts the value to `i64`, or returns an error if it is not an
    /// integer.
    ///
    /// Booleans are accepted as `0` and `1`; reals are rejected even when
    /// they have no fractional part.
    pub fn as_integer(&self, line: usize) -> EvalResult<i64> {
        match self {
            Self::Integer(i) => Ok(*i),
            Self::Bool(b) => Ok(i64::from(*b)),
            _ => {
                Err(RuntimeError::TypeError { details: format!("expected an integer but found {}",
                                                               self.type_name()),
                                              line })
            },
        }
    }

    /// Returns the shared list storage, or an error if the value is not a
    /// list.
    pub fn as_list(&self, line: usize) -> EvalResult<&ListRef> {
        match self {
            Self::List(l) => Ok(l),
            _ => {
                Err(RuntimeError::TypeError { details: format!("expected a list but found {}",
                                                               self.type_name()),
                                              line })
            },
        }
    }

    /// Returns the shared dict storage, or an error if the value is not a
    /// dict.
    pub fn as_dict(&self, line: usize) -> EvalResult<&DictRef> {
        match self {
            Self::Dict(d) => Ok(d),
            _ => {
                Err(RuntimeError::TypeError { details: format!("expected a dict but found {}",
                                                               self.type_name()),
                                              line })
            },
        }
    }

    /// Returns the number of characters, elements or entries.
    ///
    /// # Errors
    /// `InvalidLength` for anything that is not a string, list or dict.
    ///
    /// # Example
    /// ```
    /// use slowpp::interpreter::value::core::Value;
    ///
    /// assert_eq!(Value::from("héllo").len(1).unwrap(), 5);
    /// assert!(Value::Integer(3).len(1).is_err());
    /// ```
    pub fn len(&self, line: usize) -> EvalResult<usize> {
        match self {
            Self::Str(s) => Ok(s.chars().count()),
            Self::List(l) => Ok(l.borrow().len()),
            Self::Dict(d) => Ok(d.borrow().len()),
            _ => Err(RuntimeError::InvalidLength { type_name: self.type_name(),
                                                   line }),
        }
    }

    /// Reads the element at `index`.
    ///
    /// Strings and lists take integer indices (negative indices count from the
    /// end); dicts take any hashable key. String indexing yields a one
    /// character string.
    ///
    /// # Parameters
    /// - `index`: The evaluated subscript.
    /// - `line`: Source code line number for error reporting.
    ///
    /// # Returns
    /// The element, or an `InvalidSubscript`, `IndexOutOfBounds` or
    /// `KeyNotFound` error.
    ///
    /// # Example
    /// ```
    /// use slowpp::interpreter::value::core::Value;
    ///
    /// let list = Value::from(vec![1.into(), 2.into(), 3.into()]);
    /// assert_eq!(list.get_index(&Value::Integer(-1), 1).unwrap(), Value::Integer(3));
    ///
    /// let s = Value::from("abc");
    /// assert_eq!(s.get_index(&Value::Integer(1), 1).unwrap(), Value::from("b"));
    /// ```
    pub fn get_index(&self, index: &Self, line: usize) -> EvalResult<Self> {
        match self {
            Self::Str(s) => {
                let len = s.chars().count();
                let position = resolve_index(index.as_integer(line)?, len, line)?;
                s.chars()
                 .nth(position)
                 .map(|c| Self::Str(c.to_string()))
                 .ok_or(RuntimeError::IndexOutOfBounds { index: index.as_integer(line)?,
                                                         len,
                                                         line })
            },
            Self::List(l) => {
                let items = l.borrow();
                let position = resolve_index(index.as_integer(line)?, items.len(), line)?;
                Ok(items[position].clone())
            },
            Self::Dict(d) => {
                let key = DictKey::from_value(index, line)?;
                d.borrow()
                 .get(&key)
                 .cloned()
                 .ok_or_else(|| RuntimeError::KeyNotFound { key: key.to_string(),
                                                            line })
            },
            _ => Err(RuntimeError::InvalidSubscript { type_name: self.type_name(),
                                                      line }),
        }
    }

    /// Renders the value the way it appears inside a collection: strings are
    /// quoted, everything else matches `Display`.
    #[must_use]
    pub fn repr(&self) -> String {
        match self {
            Self::Str(s) => {
                let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
                let mut out = String::with_capacity(s.len() + 2);
                out.push(quote);
                for c in s.chars() {
                    match c {
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        '\t' => out.push_str("\\t"),
                        c if c == quote => {
                            out.push('\\');
                            out.push(c);
                        },
                        c => out.push(c),
                    }
                }
                out.push(quote);
                out
            },
            _ => self.to_string(),
        }
    }
}

/// Formats a real so it always reads back as a real: integral values keep a
/// trailing `.0`.
fn format_real(r: f64) -> String {
    if r.is_nan() {
        "nan".to_string()
    } else if r.is_infinite() {
        if r > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else if r.fract() == 0.0 && r.abs() < 1e16 {
        format!("{r:.1}")
    } else {
        format!("{r}")
    }
}

impl Value {
    /// Writes the value, rendering a list or dict that is already being
    /// written further out as `[...]` or `{...}`. `nested` selects the quoted
    /// form of strings used inside collections.
    fn write_nested(&self,
                    f: &mut std::fmt::Formatter<'_>,
                    active: &mut Vec<*const ()>,
                    nested: bool)
                    -> std::fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Real(r) => write!(f, "{}", format_real(*r)),
            Self::Str(_) if nested => write!(f, "{}", self.repr()),
            Self::Str(s) => write!(f, "{s}"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::None => write!(f, "None"),
            Self::List(l) => {
                let ptr = Rc::as_ptr(l).cast::<()>();
                if active.contains(&ptr) {
                    return write!(f, "[...]");
                }
                active.push(ptr);

                write!(f, "[")?;
                for (index, value) in l.borrow().iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    value.write_nested(f, active, true)?;
                }
                write!(f, "]")?;

                active.pop();
                Ok(())
            },
            Self::Dict(d) => {
                let ptr = Rc::as_ptr(d).cast::<()>();
                if active.contains(&ptr) {
                    return write!(f, "{{...}}");
                }
                active.push(ptr);

                write!(f, "{{")?;
                for (index, (key, value)) in d.borrow().iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: ")?;
                    value.write_nested(f, active, true)?;
                }
                write!(f, "}}")?;

                active.pop();
                Ok(())
            },
        }
    }

    /// Structural equality. `active` holds the pairs of collections being
    /// compared further out; meeting one again counts as equal.
    fn eq_nested(&self, other: &Self, active: &mut Vec<(*const (), *const ())>) -> bool {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::None, Self::None) => true,
            (Self::List(a), Self::List(b)) => {
                let pair = (Rc::as_ptr(a).cast::<()>(), Rc::as_ptr(b).cast::<()>());
                if Rc::ptr_eq(a, b) || active.contains(&pair) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                if a.len() != b.len() {
                    return false;
                }

                active.push(pair);
                let equal = a.iter().zip(b.iter()).all(|(x, y)| x.eq_nested(y, active));
                active.pop();
                equal
            },
            (Self::Dict(a), Self::Dict(b)) => {
                let pair = (Rc::as_ptr(a).cast::<()>(), Rc::as_ptr(b).cast::<()>());
                if Rc::ptr_eq(a, b) || active.contains(&pair) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                if a.len() != b.len() {
                    return false;
                }

                active.push(pair);
                let equal = a.iter()
                             .zip(b.iter())
                             .all(|((ka, va), (kb, vb))| ka == kb && va.eq_nested(vb, active));
                active.pop();
                equal
            },
            _ => match (self.as_number(), other.as_number()) {
                (Some(Number::Integer(a)), Some(Number::Integer(b))) => a == b,
                (Some(Number::Integer(a)), Some(Number::Real(b)))
                | (Some(Number::Real(b)), Some(Number::Integer(a))) => cmp_int_real(a, b) == Ordering::Equal,
                (Some(Number::Real(a)), Some(Number::Real(b))) => a == b,
                _ => false,
            },
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_nested(f, &mut Vec::new(), false)
    }
}

impl PartialEq for Value {
    /// Structural equality. Numbers compare by value across kinds, so
    /// `1 == 1.0` and `True == 1`; lists and dicts compare element-wise.
    fn eq(&self, other: &Self) -> bool {
        self.eq_nested(other, &mut Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reals_always_render_a_fraction() {
        assert_eq!(Value::Real(2.0).to_string(), "2.0");
        assert_eq!(Value::Real(2.5).to_string(), "2.5");
        assert_eq!(Value::Real(0.1 + 0.2).to_string(), "0.30000000000000004");
    }

    #[test]
    fn collections_quote_their_strings() {
        let list = Value::from(vec![1.into(), "a".into(), Value::None]);
        assert_eq!(list.to_string(), "[1, 'a', None]");

        let mut map = BTreeMap::new();
        map.insert(DictKey::Str("k".into()), Value::Bool(true));
        assert_eq!(Value::from(map).to_string(), "{'k': True}");
    }

    #[test]
    fn numbers_compare_across_kinds() {
        assert_eq!(Value::Integer(1), Value::Real(1.0));
        assert_eq!(Value::Bool(true), Value::Integer(1));
        assert_ne!(Value::from("1"), Value::Integer(1));
    }

    #[test]
    fn self_containing_collections() {
        let list = Value::from(vec![1.into()]);
        list.as_list(1).unwrap().borrow_mut().push(list.clone());
        assert_eq!(list.to_string(), "[1, [...]]");

        let twin = Value::from(vec![1.into()]);
        twin.as_list(1).unwrap().borrow_mut().push(twin.clone());
        assert_eq!(list, twin);

        let dict = Value::from(BTreeMap::new());
        dict.as_dict(1).unwrap().borrow_mut().insert(DictKey::Str("me".into()), dict.clone());
        assert_eq!(dict.to_string(), "{'me': {...}}");
        assert_eq!(Value::from(vec![dict.clone(), dict]).to_string(), "[{'me': {...}}, {'me': {...}}]");
    }

    #[test]
    fn lists_share_storage() {
        let list = Value::from(vec![1.into()]);
        let alias = list.clone();
        alias.as_list(1).unwrap().borrow_mut().push(2.into());
        assert_eq!(list.len(1).unwrap(), 2);
    }

    #[test]
    fn subscripts_report_their_failures() {
        let list = Value::from(vec![1.into()]);
        assert!(matches!(list.get_index(&Value::Integer(4), 7),
                         Err(RuntimeError::IndexOutOfBounds { index: 4, len: 1, line: 7 })));
        assert!(matches!(Value::Integer(3).get_index(&Value::Integer(0), 2),
                         Err(RuntimeError::InvalidSubscript { type_name: "int", line: 2 })));
    }
}
