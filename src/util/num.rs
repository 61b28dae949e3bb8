use std::cmp::Ordering;

use crate::{error::RuntimeError, interpreter::evaluator::core::EvalResult};

/// Largest integer magnitude exactly representable as an `f64` (`2^53 - 1`).
pub const MAX_SAFE_U64_INT: u64 = 9_007_199_254_740_991;

/// Converts an `i64` to `f64` for mixed int/float arithmetic.
///
/// ## Errors
/// Returns `Overflow` if the value exceeds `MAX_SAFE_U64_INT` in absolute
/// value, since the conversion would silently round.
///
/// ## Example
/// ```
/// use slowpp::util::num::{MAX_SAFE_U64_INT, i64_to_f64_checked};
///
/// assert_eq!(i64_to_f64_checked(42, 1).unwrap(), 42.0);
///
/// let big = MAX_SAFE_U64_INT as i64 + 1;
/// assert!(i64_to_f64_checked(big, 1).is_err());
/// ```
#[allow(clippy::cast_precision_loss)]
pub const fn i64_to_f64_checked(value: i64, line: usize) -> EvalResult<f64> {
    if value.unsigned_abs() > MAX_SAFE_U64_INT {
        return Err(RuntimeError::Overflow { line });
    }
    Ok(value as f64)
}

/// Compares an integer with a real exactly, without rounding either side.
///
/// NaN sorts above every integer, matching the order of `OrderedFloat`.
///
/// ## Example
/// ```
/// use std::cmp::Ordering;
///
/// use slowpp::util::num::cmp_int_real;
///
/// assert_eq!(cmp_int_real(1, 1.0), Ordering::Equal);
/// assert_eq!(cmp_int_real(1, 1.5), Ordering::Less);
/// assert_eq!(cmp_int_real(-1, -1.5), Ordering::Greater);
/// assert_eq!(cmp_int_real(i64::MAX, 9_223_372_036_854_775_808.0), Ordering::Less);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn cmp_int_real(int: i64, real: f64) -> Ordering {
    // 2^63, the first real past `i64::MAX`.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    if real.is_nan() || real >= LIMIT {
        return Ordering::Less;
    }
    if real < -LIMIT {
        return Ordering::Greater;
    }

    let whole = real.trunc();
    match int.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(real - whole)).unwrap_or(Ordering::Equal),
        other => other,
    }
}

/// Converts a collection length or position to an `i64` script integer.
///
/// ## Errors
/// Returns `Overflow` if the value does not fit into an `i64`.
pub fn usize_to_i64_checked(value: usize, line: usize) -> EvalResult<i64> {
    i64::try_from(value).map_err(|_| RuntimeError::Overflow { line })
}

/// Resolves a script index against a collection length.
///
/// Negative indices count from the end, so `-1` names the last element.
///
/// ## Errors
/// Returns `IndexOutOfBounds` if the index does not name an element.
///
/// ## Example
/// ```
/// use slowpp::util::num::resolve_index;
///
/// assert_eq!(resolve_index(0, 3, 1).unwrap(), 0);
/// assert_eq!(resolve_index(-1, 3, 1).unwrap(), 2);
/// assert!(resolve_index(3, 3, 1).is_err());
/// ```
pub fn resolve_index(index: i64, len: usize, line: usize) -> EvalResult<usize> {
    let signed_len = usize_to_i64_checked(len, line)?;
    let adjusted = if index < 0 { index + signed_len } else { index };

    if adjusted < 0 || adjusted >= signed_len {
        return Err(RuntimeError::IndexOutOfBounds { index, len, line });
    }

    usize::try_from(adjusted).map_err(|_| RuntimeError::IndexOutOfBounds { index, len, line })
}

/// Resolves an insertion position the way list insertion does: negative
/// positions count from the end and out-of-range positions clamp to the
/// nearest end.
///
/// ## Example
/// ```
/// use slowpp::util::num::clamp_insert_index;
///
/// assert_eq!(clamp_insert_index(10, 3), 3);
/// assert_eq!(clamp_insert_index(-1, 3), 2);
/// assert_eq!(clamp_insert_index(-10, 3), 0);
/// ```
#[must_use]
pub fn clamp_insert_index(index: i64, len: usize) -> usize {
    let signed_len = i64::try_from(len).unwrap_or(i64::MAX);
    let adjusted = if index < 0 { index + signed_len } else { index };

    usize::try_from(adjusted.clamp(0, signed_len)).unwrap_or(len)
}
