/// Compatibility layer for rayon/sequential execution.
///
/// When the `parallel` feature is enabled, this re-exports rayon's parallel
/// iterators and `join`. When disabled, it provides sequential fallbacks
/// with the same API surface used by the estimators and pipelines.
#[cfg(feature = "parallel")]
pub use rayon::join;
#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Sequential stand-in for `rayon::prelude::IntoParallelIterator`.
    ///
    /// Calls `into_iter()` instead of `into_par_iter()`, so the rest of the
    /// iterator chain resolves to the standard `Iterator` methods.
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }

    /// Sequential stand-in for `rayon::join`: runs both closures in order.
    pub fn join<A, B, RA, RB>(oper_a: A, oper_b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        (oper_a(), oper_b())
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
