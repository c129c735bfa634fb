//! Compatibility layer for rayon/sequential execution.
//!
//! With the `parallel` feature enabled this re-exports rayon's parallel
//! iterators; without it (e.g. WASM builds) the same API surface maps to
//! plain sequential iteration. Block results are identical either way:
//! blocks are independent and assembled in index order.

#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Sequential stand-in for `rayon::prelude::IntoParallelIterator`.
    ///
    /// `into_par_iter()` becomes `into_iter()`, so the rest of the chain
    /// (`.map()`, `.collect()`, etc.) resolves to the standard `Iterator`
    /// methods.
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
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
