//! Clause model: boolean formulas over atomic values.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexSet;

use crate::assertion::Assertion;

/// Insertion-ordered, duplicate-free members of a connective.
///
/// Equality and hashing ignore member order; iteration and display follow
/// insertion order.
#[derive(Clone, Debug)]
pub struct ClauseSet<T>(IndexSet<Clause<T>>);

impl<T: Hash + Eq> ClauseSet<T> {
    /// Empty set.
    pub fn new() -> Self {
        Self(IndexSet::new())
    }

    /// Add a member. Returns `false` if an equal member was already present.
    pub fn insert(&mut self, clause: Clause<T>) -> bool {
        self.0.insert(clause)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no members.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Clause<T>> {
        self.0.iter()
    }

    /// The first inserted member.
    pub fn first(&self) -> Option<&Clause<T>> {
        self.0.first()
    }

    /// Whether an equal member is present.
    pub fn contains(&self, clause: &Clause<T>) -> bool {
        self.0.contains(clause)
    }

    /// Remove every member.
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<T: Hash + Eq> Default for ClauseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash + Eq> PartialEq for ClauseSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|member| other.contains(member))
    }
}

impl<T: Hash + Eq> Eq for ClauseSet<T> {}

impl<T: Hash + Eq> Hash for ClauseSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let combined = self.iter().fold(0u64, |acc, member| {
            let mut hasher = DefaultHasher::new();
            member.hash(&mut hasher);
            acc.wrapping_add(hasher.finish())
        });
        self.len().hash(state);
        combined.hash(state);
    }
}

impl<T: Hash + Eq> FromIterator<Clause<T>> for ClauseSet<T> {
    fn from_iter<I: IntoIterator<Item = Clause<T>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T: Hash + Eq> Extend<Clause<T>> for ClauseSet<T> {
    fn extend<I: IntoIterator<Item = Clause<T>>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a, T: Hash + Eq> IntoIterator for &'a ClauseSet<T> {
    type Item = &'a Clause<T>;
    type IntoIter = indexmap::set::Iter<'a, Clause<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T: Hash + Eq> IntoIterator for ClauseSet<T> {
    type Item = Clause<T>;
    type IntoIter = indexmap::set::IntoIter<Clause<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A boolean formula over atoms of type `T`.
#[derive(Clone, Debug)]
pub enum Clause<T> {
    Atom(T),
    Not(Box<Clause<T>>),
    And(ClauseSet<T>),
    Or(ClauseSet<T>),
    Assertion(Assertion<T>),
}

impl<T: Hash + Eq> Clause<T> {
    /// A leaf clause.
    pub fn atom(value: T) -> Self {
        Clause::Atom(value)
    }

    /// Negate a clause. Negating a negation yields the inner clause.
    pub fn not(clause: Clause<T>) -> Self {
        match clause {
            Clause::Not(inner) => *inner,
            other => Clause::Not(Box::new(other)),
        }
    }

    /// Conjunction of `members`.
    pub fn and(members: impl IntoIterator<Item = Clause<T>>) -> Self {
        Clause::And(members.into_iter().collect())
    }

    /// Disjunction of `members`.
    pub fn or(members: impl IntoIterator<Item = Clause<T>>) -> Self {
        Clause::Or(members.into_iter().collect())
    }

    /// Conjunction of the present members; absent ones are skipped.
    pub fn all<I, C>(members: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Option<Clause<T>>>,
    {
        Clause::And(members.into_iter().filter_map(Into::into).collect())
    }

    /// Disjunction of the present members; absent ones are skipped.
    pub fn any<I, C>(members: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Option<Clause<T>>>,
    {
        Clause::Or(members.into_iter().filter_map(Into::into).collect())
    }

    /// Negation of `self`, collapsing double negation.
    pub fn negate(self) -> Self {
        Clause::not(self)
    }

    /// Add a member to a connective in place.
    ///
    /// Any other clause is first wrapped into a conjunction with itself as
    /// the only member.
    pub fn append(&mut self, member: Clause<T>) {
        match self {
            Clause::And(members) | Clause::Or(members) => {
                members.insert(member);
            }
            _ => {
                let previous = std::mem::replace(self, Clause::And(ClauseSet::new()));
                if let Clause::And(members) = self {
                    members.insert(previous);
                    members.insert(member);
                }
            }
        }
    }

    /// Strip every `~~x` down to `x`, recursively.
    pub fn collapse_negation(self) -> Self {
        match self {
            Clause::Not(inner) => match *inner {
                Clause::Not(twice) => twice.collapse_negation(),
                other => Clause::Not(Box::new(other.collapse_negation())),
            },
            Clause::And(members) => {
                Clause::And(members.into_iter().map(Clause::collapse_negation).collect())
            }
            Clause::Or(members) => {
                Clause::Or(members.into_iter().map(Clause::collapse_negation).collect())
            }
            other => other,
        }
    }

    /// First atom in depth-first order, used to infer a comparator.
    pub fn sample_atom(&self) -> Option<&T> {
        match self {
            Clause::Atom(value) => Some(value),
            Clause::Not(inner) => inner.sample_atom(),
            Clause::And(members) | Clause::Or(members) => {
                members.iter().find_map(Clause::sample_atom)
            }
            Clause::Assertion(_) => None,
        }
    }

    /// An empty conjunction or disjunction.
    pub fn is_vacuous(&self) -> bool {
        matches!(self, Clause::And(m) | Clause::Or(m) if m.is_empty())
    }

    /// Whether the clause is a leaf.
    pub fn is_atom(&self) -> bool {
        matches!(self, Clause::Atom(_))
    }

    /// The leaf value, if the clause is an atom.
    pub fn as_atom(&self) -> Option<&T> {
        match self {
            Clause::Atom(value) => Some(value),
            _ => None,
        }
    }
}

impl<T: Hash + Eq> From<Assertion<T>> for Clause<T> {
    fn from(assertion: Assertion<T>) -> Self {
        Clause::Assertion(assertion)
    }
}

impl<T: Hash + Eq> PartialEq for Clause<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Clause::Atom(a), Clause::Atom(b)) => a == b,
            (Clause::Not(a), Clause::Not(b)) => a == b,
            (Clause::And(a), Clause::And(b)) => a == b,
            (Clause::Or(a), Clause::Or(b)) => a == b,
            (Clause::Assertion(a), Clause::Assertion(b)) => a == b,
            _ => false,
        }
    }
}

impl<T: Hash + Eq> Eq for Clause<T> {}

impl<T: Hash + Eq> Hash for Clause<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Clause::Atom(value) => value.hash(state),
            Clause::Not(inner) => inner.hash(state),
            Clause::And(members) | Clause::Or(members) => members.hash(state),
            Clause::Assertion(assertion) => assertion.hash(state),
        }
    }
}

impl<T: Hash + Eq + fmt::Display> Clause<T> {
    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::And(members) | Clause::Or(members) if members.len() > 1 => {
                write!(f, "({self})")
            }
            _ => write!(f, "{self}"),
        }
    }

    fn fmt_members(f: &mut fmt::Formatter<'_>, members: &ClauseSet<T>, op: &str) -> fmt::Result {
        if members.is_empty() {
            return f.write_str("()");
        }
        for (i, member) in members.iter().enumerate() {
            if i > 0 {
                write!(f, " {op} ")?;
            }
            member.fmt_nested(f)?;
        }
        Ok(())
    }
}

/// DATEX notation: `a & b`, `a | b`, `~a`.
impl<T: Hash + Eq + fmt::Display> fmt::Display for Clause<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Atom(value) => write!(f, "{value}"),
            Clause::Not(inner) => {
                f.write_str("~")?;
                inner.fmt_nested(f)
            }
            Clause::And(members) => Self::fmt_members(f, members, "&"),
            Clause::Or(members) => Self::fmt_members(f, members, "|"),
            Clause::Assertion(assertion) => write!(f, "{assertion}"),
        }
    }
}
