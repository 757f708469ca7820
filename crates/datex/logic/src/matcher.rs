//! Clause matcher: does one clause satisfy another?

use std::sync::Arc;

use tracing::warn;

use crate::assertion::Evaluation;
use crate::clause::Clause;
use crate::comparator::{Atomic, LogicalComparator};
use crate::config::MatchConfig;
use crate::error::{ClausePosition, LogicError};
use crate::resolve::{Direct, Resolve};

/// Evaluates clauses against clauses.
///
/// Both operands pass through the resolver before inspection. Matching is
/// otherwise pure.
pub struct Matcher<'r, T: Clone> {
    resolver: &'r dyn Resolve<T>,
    config: MatchConfig,
}

impl<T: Clone> Clone for Matcher<'_, T> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver,
            config: self.config.clone(),
        }
    }
}

/// A comparator that is either borrowed from the caller or inferred from an atom.
enum ComparatorRef<'c, T> {
    Borrowed(&'c dyn LogicalComparator<T>),
    Owned(Arc<dyn LogicalComparator<T>>),
}

impl<T> ComparatorRef<'_, T> {
    fn get(&self) -> &dyn LogicalComparator<T> {
        match self {
            ComparatorRef::Borrowed(comparator) => *comparator,
            ComparatorRef::Owned(comparator) => comparator.as_ref(),
        }
    }
}

impl<T: Atomic> Matcher<'static, T> {
    /// Matcher for clauses without indirection.
    pub fn direct() -> Self {
        Matcher::new(&Direct)
    }
}

impl<'r, T: Atomic> Matcher<'r, T> {
    /// Matcher resolving operands through `resolver`.
    pub fn new(resolver: &'r dyn Resolve<T>) -> Self {
        Self {
            resolver,
            config: MatchConfig::default(),
        }
    }

    /// Replace the match configuration.
    pub fn with_config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    /// The match configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub(crate) fn resolver(&self) -> &'r dyn Resolve<T> {
        self.resolver
    }

    /// Does `value` satisfy `against`?
    ///
    /// A missing `against` is never satisfied. Without an explicit comparator
    /// one is inferred from a sample atom of `value`, then of `against`.
    pub fn matches(
        &self,
        value: &Clause<T>,
        against: Option<&Clause<T>>,
        comparator: Option<&dyn LogicalComparator<T>>,
    ) -> Result<bool, LogicError> {
        self.matches_with(value, against, comparator, None)
    }

    /// Like [`Matcher::matches`], but assertions on the against side receive
    /// `assertion_value` instead of the atom under test.
    pub fn matches_with(
        &self,
        value: &Clause<T>,
        against: Option<&Clause<T>>,
        comparator: Option<&dyn LogicalComparator<T>>,
        assertion_value: Option<&T>,
    ) -> Result<bool, LogicError> {
        let Some(against) = against else {
            return Ok(false);
        };
        let value = self.resolver.resolve(value);
        let against = self.resolver.resolve(against);

        let comparator = match comparator {
            Some(comparator) => ComparatorRef::Borrowed(comparator),
            None => ComparatorRef::Owned(infer_comparator(&value, &against)?),
        };
        self.match_value(&value, &against, comparator.get(), assertion_value)
    }

    pub(crate) fn match_value(
        &self,
        value: &Clause<T>,
        against: &Clause<T>,
        comparator: &dyn LogicalComparator<T>,
        assertion_value: Option<&T>,
    ) -> Result<bool, LogicError> {
        let value = self.resolver.resolve(value);
        match &*value {
            // every member must match
            Clause::Or(members) => {
                for member in members {
                    if !self.match_value(member, against, comparator, assertion_value)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            // any member may match; an empty conjunction is vacuously true
            Clause::And(members) => {
                if members.is_empty() {
                    return Ok(true);
                }
                for member in members {
                    if self.match_value(member, against, comparator, assertion_value)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Clause::Not(inner) => Ok(!self.match_value(inner, against, comparator, assertion_value)?),
            Clause::Assertion(_) => Err(LogicError::UnsupportedAssertion(ClausePosition::Value)),
            Clause::Atom(atom) => {
                if !comparator.accepts(atom) {
                    return Err(LogicError::AtomTypeMismatch {
                        position: ClausePosition::Value,
                        expected: comparator.atomic_type().into_owned(),
                        found: atom.type_name().into_owned(),
                    });
                }
                self.match_atom(atom, against, comparator, assertion_value.unwrap_or(atom))
            }
        }
    }

    fn match_atom(
        &self,
        atom: &T,
        against: &Clause<T>,
        comparator: &dyn LogicalComparator<T>,
        assertion_value: &T,
    ) -> Result<bool, LogicError> {
        let against = self.resolver.resolve(against);
        match &*against {
            Clause::Or(members) => {
                if members.is_empty() {
                    return Ok(true);
                }
                for member in members {
                    if self.match_atom(atom, member, comparator, assertion_value)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Clause::And(members) => {
                for member in members {
                    if !self.match_atom(atom, member, comparator, assertion_value)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Clause::Not(inner) => Ok(!self.match_atom(atom, inner, comparator, assertion_value)?),
            Clause::Assertion(assertion) => match assertion.assert(assertion_value) {
                Evaluation::Pending(_) => Err(LogicError::PendingAssertion),
                Evaluation::Ready(verdict) if self.config.strict_assertions => {
                    assertion.judge(verdict)?;
                    Ok(true)
                }
                Evaluation::Ready(verdict) => Ok(verdict.passed()),
            },
            Clause::Atom(target) => {
                if !comparator.accepts(target) {
                    if self.config.strict_atom_types {
                        return Err(LogicError::AtomTypeMismatch {
                            position: ClausePosition::Against,
                            expected: comparator.atomic_type().into_owned(),
                            found: target.type_name().into_owned(),
                        });
                    }
                    warn!(
                        expected = %comparator.atomic_type(),
                        found = %target.type_name(),
                        "Invalid match check: atomic value has wrong type, treating as match"
                    );
                    return Ok(true);
                }
                Ok(comparator.logical_match(atom, target))
            }
        }
    }
}

fn infer_comparator<T: Atomic>(
    value: &Clause<T>,
    against: &Clause<T>,
) -> Result<Arc<dyn LogicalComparator<T>>, LogicError> {
    let sample = value
        .sample_atom()
        .or_else(|| against.sample_atom())
        .ok_or(LogicError::CannotInferComparator)?;
    sample
        .comparator()
        .ok_or_else(|| LogicError::MissingComparator(sample.type_name().into_owned()))
}
