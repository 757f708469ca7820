//! Collapse normalizer: reduce a clause to a flat disjunction of atoms.
//!
//! Conjunctions are checked for consistency member by member against what has
//! been collected so far. The check is order sensitive and incomplete: it is a
//! contradiction detector, not a satisfiability solver.

use crate::clause::{Clause, ClauseSet};
use crate::comparator::{Atomic, LogicalComparator};
use crate::error::{ClausePosition, LogicError};
use crate::matcher::Matcher;

/// Result of collapsing a clause.
///
/// An incomplete collapse always has an empty disjunction. Callers cannot
/// tell a provably empty clause from one the normalizer gave up on, except
/// through [`Collapse::is_complete`].
#[derive(Clone, Debug)]
pub struct Collapse<T> {
    disjunction: ClauseSet<T>,
    complete: bool,
}

impl<T: Atomic> PartialEq for Collapse<T> {
    fn eq(&self, other: &Self) -> bool {
        self.complete == other.complete && self.disjunction == other.disjunction
    }
}

impl<T: Atomic> Eq for Collapse<T> {}

impl<T: Atomic> Collapse<T> {
    /// Whether normalization ran to the end.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Collected atoms in insertion order.
    pub fn atoms(&self) -> impl Iterator<Item = &T> {
        self.disjunction.iter().filter_map(Clause::as_atom)
    }

    /// Number of collected atoms.
    pub fn len(&self) -> usize {
        self.disjunction.len()
    }

    /// Whether nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.disjunction.is_empty()
    }

    /// The result as a disjunction clause.
    pub fn into_clause(self) -> Clause<T> {
        Clause::Or(self.disjunction)
    }
}

impl<T: Atomic> Matcher<'_, T> {
    /// Collapse `value` into a flat disjunction of atoms.
    pub fn collapse(
        &self,
        value: &Clause<T>,
        comparator: &dyn LogicalComparator<T>,
    ) -> Result<Collapse<T>, LogicError> {
        let mut accumulator = Clause::Or(ClauseSet::new());
        let complete = self.collapse_into(value, comparator, &mut accumulator)?;
        let mut disjunction = match accumulator {
            Clause::Or(members) => members,
            _ => ClauseSet::new(),
        };
        if !complete {
            disjunction.clear();
        }
        Ok(Collapse {
            disjunction,
            complete,
        })
    }

    fn collapse_into(
        &self,
        value: &Clause<T>,
        comparator: &dyn LogicalComparator<T>,
        accumulator: &mut Clause<T>,
    ) -> Result<bool, LogicError> {
        let value = self.resolver().resolve(value);
        match &*value {
            Clause::Or(members) => {
                for member in members {
                    if !self.collapse_into(member, comparator, accumulator)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Clause::And(members) => {
                for member in members {
                    if matches!(&*self.resolver().resolve(member), Clause::Assertion(_)) {
                        return Err(LogicError::UnsupportedAssertion(ClausePosition::Collapse));
                    }
                    if !self.matches(member, Some(&*accumulator), Some(comparator))? {
                        if let Clause::Or(collected) = accumulator {
                            collected.clear();
                        }
                        return Ok(false);
                    }
                    if !self.collapse_into(member, comparator, accumulator)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Clause::Not(_) => Ok(false),
            Clause::Assertion(_) => Err(LogicError::UnsupportedAssertion(ClausePosition::Collapse)),
            Clause::Atom(atom) => {
                if !comparator.accepts(atom) {
                    return Err(LogicError::AtomTypeMismatch {
                        position: ClausePosition::Collapse,
                        expected: comparator.atomic_type().into_owned(),
                        found: atom.type_name().into_owned(),
                    });
                }
                if let Clause::Or(collected) = accumulator {
                    collected.insert(Clause::Atom(atom.clone()));
                }
                Ok(true)
            }
        }
    }
}
