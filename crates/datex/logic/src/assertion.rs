//! Assertion predicates embedded in clauses.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::AssertionFailure;

/// Result of an assertion predicate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    True,
    False,
    /// Failure with a reason.
    Reason(String),
    /// No result; treated as success.
    Void,
    /// A result of any other shape, described for diagnostics.
    Unexpected(String),
}

impl Verdict {
    /// Boolean reading: only `true` and "no result" pass.
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::True | Verdict::Void)
    }
}

impl From<bool> for Verdict {
    fn from(value: bool) -> Self {
        if value {
            Verdict::True
        } else {
            Verdict::False
        }
    }
}

impl From<()> for Verdict {
    fn from(_: ()) -> Self {
        Verdict::Void
    }
}

impl From<String> for Verdict {
    fn from(reason: String) -> Self {
        Verdict::Reason(reason)
    }
}

impl From<&str> for Verdict {
    fn from(reason: &str) -> Self {
        Verdict::Reason(reason.to_string())
    }
}

impl<V: Into<Verdict>> From<Option<V>> for Verdict {
    fn from(value: Option<V>) -> Self {
        value.map_or(Verdict::Void, Into::into)
    }
}

type NativeBody<T> = dyn Fn(&T) -> Verdict + Send + Sync;
type DeferredBody<T> = dyn Fn(T) -> BoxFuture<'static, Verdict> + Send + Sync;

enum Body<T> {
    Native(Arc<NativeBody<T>>),
    Deferred(Arc<DeferredBody<T>>),
}

impl<T> Clone for Body<T> {
    fn clone(&self) -> Self {
        match self {
            Body::Native(predicate) => Body::Native(Arc::clone(predicate)),
            Body::Deferred(computation) => Body::Deferred(Arc::clone(computation)),
        }
    }
}

/// Outcome of starting an assertion: ready now, or resolving later.
pub enum Evaluation {
    Ready(Verdict),
    Pending(BoxFuture<'static, Verdict>),
}

impl fmt::Debug for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Ready(verdict) => f.debug_tuple("Ready").field(verdict).finish(),
            Evaluation::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// A named predicate over a value.
///
/// The body is either a native function that answers synchronously, or a
/// deferred computation (an async native function or a remotely executed
/// scope) whose verdict is only available by awaiting it.
///
/// Two assertions are equal when they share the same body.
pub struct Assertion<T> {
    name: Arc<str>,
    body: Body<T>,
}

impl<T> Assertion<T> {
    /// Assertion answered synchronously by `predicate`.
    pub fn native<F, V>(name: impl Into<Arc<str>>, predicate: F) -> Self
    where
        T: 'static,
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<Verdict>,
    {
        Self {
            name: name.into(),
            body: Body::Native(Arc::new(move |value: &T| predicate(value).into())),
        }
    }

    /// Assertion answered later by `computation`.
    pub fn deferred<F>(name: impl Into<Arc<str>>, computation: F) -> Self
    where
        F: Fn(T) -> BoxFuture<'static, Verdict> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Body::Deferred(Arc::new(computation)),
        }
    }

    /// Name used in failure messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the verdict is only available by awaiting.
    pub fn is_deferred(&self) -> bool {
        matches!(self.body, Body::Deferred(_))
    }

    /// Map a verdict to success or an assertion failure.
    pub fn judge(&self, verdict: Verdict) -> Result<(), AssertionFailure> {
        match verdict {
            Verdict::True | Verdict::Void => Ok(()),
            Verdict::False => Err(AssertionFailure::False(self.name.to_string())),
            Verdict::Reason(reason) => Err(AssertionFailure::Reason(reason)),
            Verdict::Unexpected(shape) => Err(AssertionFailure::InvalidResult(shape)),
        }
    }

    fn body_addr(&self) -> *const () {
        match &self.body {
            Body::Native(f) => Arc::as_ptr(f) as *const (),
            Body::Deferred(f) => Arc::as_ptr(f) as *const (),
        }
    }
}

impl<T: Clone> Assertion<T> {
    /// Start evaluating the assertion for `value`.
    pub fn assert(&self, value: &T) -> Evaluation {
        match &self.body {
            Body::Native(predicate) => Evaluation::Ready(predicate(value)),
            Body::Deferred(computation) => Evaluation::Pending(computation(value.clone())),
        }
    }

    /// Evaluate the assertion to completion, awaiting deferred bodies.
    pub async fn check(&self, value: &T) -> Result<(), AssertionFailure> {
        let verdict = match self.assert(value) {
            Evaluation::Ready(verdict) => verdict,
            Evaluation::Pending(pending) => pending.await,
        };
        self.judge(verdict)
    }
}

impl<T> Clone for Assertion<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            body: self.body.clone(),
        }
    }
}

impl<T> PartialEq for Assertion<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.body_addr() == other.body_addr()
    }
}

impl<T> Eq for Assertion<T> {}

impl<T> Hash for Assertion<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.body_addr().hash(state);
    }
}

impl<T> fmt::Debug for Assertion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assertion")
            .field("name", &self.name)
            .field("deferred", &self.is_deferred())
            .finish()
    }
}

impl<T> fmt::Display for Assertion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "assert({})", self.name)
    }
}
