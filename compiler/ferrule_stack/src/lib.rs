//! Stack safety utilities for deep recursion.
//!
//! Zero-value construction and payload equality both recurse through nested
//! aggregates (arrays of structs of arrays...). Wrapping the recursive step in
//! [`ensure_sufficient_stack`] grows the stack instead of overflowing it.
//!
//! - **Red zone**: 100KB - if less than this remains, the stack grows
//! - **Growth size**: 1MB per growth

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Ensure sufficient stack space is available before executing `f`.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly (WASM has its own stack management).
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth(n: u32) -> u32 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { 1 + depth(n - 1) })
    }

    #[test]
    fn test_returns_closure_result() {
        assert_eq!(ensure_sufficient_stack(|| 7), 7);
    }

    #[test]
    fn test_deep_recursion_does_not_overflow() {
        assert_eq!(depth(100_000), 100_000);
    }
}
