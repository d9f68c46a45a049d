//! Stack growth for recursive descent over deeply nested input.
//!
//! On native targets the stack is extended on demand with `stacker`, so
//! nesting depth is bounded by the parser's own limit rather than by the
//! thread's stack size.

/// Grow the stack when less than this remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const GROWTH: usize = 1024 * 1024;

/// Run `f`, first switching to a fresh stack segment if the current one is
/// nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, GROWTH, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth(n: u32) -> u32 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
    }

    #[test]
    fn test_deep_recursion_completes() {
        assert_eq!(depth(200_000), 200_000);
    }

    #[test]
    fn test_passes_result_through() {
        let result: Result<u8, &str> = ensure_sufficient_stack(|| Ok(7));
        assert_eq!(result, Ok(7));
    }
}
