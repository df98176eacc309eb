use tracing::error;

pub trait ArrayMap<T, U> {
    type Output;
    fn array_map(self, f: impl FnMut(T) -> U) -> Self::Output;
}
impl<T, U> ArrayMap<T, U> for [T; 4] {
    type Output = [U; 4];
    #[inline]
    fn array_map(self, mut f: impl FnMut(T) -> U) -> Self::Output {
        let [
            e0,
            e1,
            e2,
            e3,
        ] = self;
        [
            f(e0),
            f(e1),
            f(e2),
            f(e3),
        ]
    }
}

/// Reports a broken tree invariant and never returns.
///
/// Continuing after this point could silently produce wrong query results, so the error is
/// logged and turned into a panic which, with `unwind_safety` enabled, terminates the process.
#[cold]
#[cfg_attr(debug_assertions, track_caller)]
pub fn corrupted(msg: &str) -> ! {
    error!(reason = msg, "bucket tree invariant violated");
    abort_on_panic(|| panic!("bucket tree invariant violated: {}", msg));
    unreachable!("abort_on_panic returned after a panic")
}

#[inline]
pub fn abort_on_panic<R>(f: impl FnOnce() -> R) -> R {
    #[cfg(feature = "unwind_safety")]
    {
        // Unwinders must not collect data from a corrupted tree
        std::panic::catch_unwind(
            std::panic::AssertUnwindSafe(f)
        ).unwrap_or_else(|_| std::process::exit(101))
    }
    #[cfg(not(feature = "unwind_safety"))]
    {
        f()
    }
}
