/// Dict key representation.
///
/// Defines the `DictKey` type used for the keys of a `Value::Dict`. Only
/// immutable scalars are hashable; lists and dicts are rejected when used as
/// keys.
pub mod dict_key;

pub mod core;
