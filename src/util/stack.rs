/// Stack left before a frame asks for more.
const RED_ZONE: usize = 128 * 1024;

/// Size of each stack segment allocated on growth.
const GROWTH: usize = 1024 * 1024;

/// Runs `f`, first moving to a fresh stack segment when the current one is
/// nearly exhausted.
///
/// Script recursion nests several evaluator frames per call, so every
/// recursive entry point of the evaluator goes through this.
///
/// # Example
/// ```
/// use slowpp::util::stack::ensure_sufficient_stack;
///
/// fn depth(n: u32) -> u32 {
///     ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
/// }
///
/// assert_eq!(depth(100_000), 100_000);
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, GROWTH, f)
}

/// Runs `f` directly; wasm manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
