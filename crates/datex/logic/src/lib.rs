//! # datex-logic
//!
//! Logical clause engine for the DATEX value/type abstraction layer.
//!
//! A [`Clause`] is a boolean formula over atomic values: atoms, negations,
//! conjunctions, disjunctions and assertion predicates. The [`Matcher`]
//! decides whether one clause satisfies another, bottoming out in a
//! [`LogicalComparator`] supplied by the atom's type. The collapse normalizer
//! reduces a clause to a flat disjunction of atoms.
//!
//! ## Matching semantics
//!
//! Matching is asymmetric. On the value side a disjunction matches only if
//! *every* member matches and a conjunction matches if *any* member matches;
//! on the against side both connectives keep their usual meaning. Empty
//! connectives match vacuously in both positions.

#![deny(unsafe_code)]

pub mod assertion;
pub mod clause;
pub mod collapse;
pub mod comparator;
pub mod config;
pub mod error;
pub mod matcher;
pub mod resolve;

pub use assertion::{Assertion, Evaluation, Verdict};
pub use clause::{Clause, ClauseSet};
pub use collapse::Collapse;
pub use comparator::{Atomic, Equality, LogicalComparator, TypeComparator};
pub use config::MatchConfig;
pub use error::{AssertionFailure, ClausePosition, LogicError};
pub use matcher::Matcher;
pub use resolve::{Direct, Resolve};
