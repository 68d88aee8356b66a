//! Capability contracts a user algorithm implements
//!
//! Each trait is one operation shape. An algorithm implements whichever
//! shapes it supports and the backends execute them unchanged.
//!
//! ```text
//! Map<T, A>          T  ──map──▶ Output        (new allocation)
//! MutatingMap<T, A>  T  ──map_in_place──▶ T    (in place)
//! Filter<T>          T  ──filter──▶ bool       (compaction)
//! Reduce<R>          R, R ──reduce──▶ R        (combine, any order)
//! ```
//!
//! Fused shapes have no trait of their own: map-reduce is `Map + Reduce`
//! (or `MutatingMap + Reduce`) and map-filter is `Map + Filter` (or
//! `MutatingMap + Filter`), with the reduce/filter applied to the mapped
//! element.
//!
//! Extra per-element arguments are carried as one value `A`; use a tuple
//! or a struct to pass several.

/// Pure per-element transform from `T` to `Self::Output`
///
/// Invocations run concurrently in no particular order and must not
/// observe each other.
pub trait Map<T, A = ()> {
    /// Element type produced by the transform
    type Output;

    /// Transform one element; `input` is never modified
    fn map(&self, input: &T, args: &A) -> Self::Output;
}

/// In-place per-element transform, used when input and output types coincide
pub trait MutatingMap<T, A = ()> {
    /// Transform one element in place
    fn map_in_place(&self, item: &mut T, args: &A);
}

/// Per-element predicate selecting which elements survive a filter
///
/// The relative order of selected elements in the result is unspecified.
pub trait Filter<T> {
    /// Return `true` to keep `item`
    fn filter(&self, item: &T) -> bool;
}

/// Combine operation for reductions
///
/// `reduce` MUST be commutative and associative: partial results from
/// concurrent workers are combined in unspecified order. For floating
/// point data this means results are only reproducible up to
/// reassociation error.
pub trait Reduce<R> {
    /// Identity element the accumulator starts from
    ///
    /// `reduce(&mut identity, x)` must leave `x`. Zero bytes are not assumed
    /// to be a valid identity.
    fn identity(&self) -> R;

    /// Fold `partial` into `acc`
    fn reduce(&self, acc: &mut R, partial: &R);
}
