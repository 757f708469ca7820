//! Type clauses resolved through the registry.

use std::borrow::Cow;

use datex_logic::{Clause, LogicError, LogicalComparator, Matcher};
use datex_types::{TypeRef, Value};

use crate::registry::Registry;

/// The type comparator, with parameterised matches decided by the
/// `type_params_match` hook of the base type's configuration.
#[derive(Clone, Copy)]
pub struct RegistryTypeComparator<'r> {
    registry: &'r Registry,
}

impl<'r> RegistryTypeComparator<'r> {
    /// Comparator resolving parameter matches through `registry`.
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Does the type of `value` satisfy the type clause `against`?
    ///
    /// A value whose type cannot be determined satisfies nothing.
    pub fn value_matches(&self, value: &Value, against: &Clause<TypeRef>) -> Result<bool, LogicError> {
        let Some(ty) = self.registry.type_of_value(value) else {
            return Ok(false);
        };
        Matcher::direct().matches(&Clause::atom(ty), Some(against), Some(self))
    }

    /// Does `ty` satisfy the type clause `against`?
    pub fn type_matches(&self, ty: &Clause<TypeRef>, against: &Clause<TypeRef>) -> Result<bool, LogicError> {
        Matcher::direct().matches(ty, Some(against), Some(self))
    }
}

impl LogicalComparator<TypeRef> for RegistryTypeComparator<'_> {
    fn atomic_type(&self) -> Cow<'_, str> {
        Cow::Borrowed("<Type>")
    }

    fn logical_match(&self, value: &TypeRef, against: &TypeRef) -> bool {
        value.matches_type(against, &|base, params, against_params| {
            self.registry
                .interface_for(base)
                .and_then(|interface| interface.params_match(params, against_params))
                .unwrap_or(false)
        })
    }
}
