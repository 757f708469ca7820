use std::borrow::Cow;

use crate::clause::Clause;

/// Follows indirection (pointers, references) to the current value.
///
/// Supplied by the reactive pointer subsystem. Implementations must follow
/// chains of indirection to the end and must be idempotent on clauses that are
/// already resolved.
pub trait Resolve<T: Clone>: Send + Sync {
    fn resolve<'c>(&self, clause: &'c Clause<T>) -> Cow<'c, Clause<T>>;
}

/// Resolver for clauses without indirection.
#[derive(Clone, Copy, Debug, Default)]
pub struct Direct;

impl<T: Clone> Resolve<T> for Direct {
    fn resolve<'c>(&self, clause: &'c Clause<T>) -> Cow<'c, Clause<T>> {
        Cow::Borrowed(clause)
    }
}
