//! Atomic comparators: where clause recursion bottoms out.

use std::borrow::Cow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use datex_types::TypeRef;

/// Compares two atoms of one atomic type for logical-match purposes.
pub trait LogicalComparator<T>: Send + Sync {
    /// Name of the atomic type, used in diagnostics.
    fn atomic_type(&self) -> Cow<'_, str>;

    /// Whether `atom` is an instance of this comparator's atomic type.
    fn accepts(&self, atom: &T) -> bool {
        let _ = atom;
        true
    }

    /// Does `value` satisfy `against`?
    fn logical_match(&self, value: &T, against: &T) -> bool;
}

/// A leaf type of a clause.
///
/// Each atom may name the comparator of its runtime type; the matcher uses it
/// to infer a comparator when the caller does not supply one.
pub trait Atomic: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// The comparator owned by this atom's type, if the type has one.
    fn comparator(&self) -> Option<Arc<dyn LogicalComparator<Self>>>;

    /// Runtime type name of this atom, used in diagnostics.
    fn type_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(std::any::type_name::<Self>())
    }
}

/// Comparator matching atoms by equality.
#[derive(Clone, Copy, Debug, Default)]
pub struct Equality;

impl<T: PartialEq> LogicalComparator<T> for Equality {
    fn atomic_type(&self) -> Cow<'_, str> {
        Cow::Borrowed(std::any::type_name::<T>())
    }

    fn logical_match(&self, value: &T, against: &T) -> bool {
        value == against
    }
}

macro_rules! equality_atomic {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Atomic for $ty {
                fn comparator(&self) -> Option<Arc<dyn LogicalComparator<Self>>> {
                    Some(Arc::new(Equality))
                }
            }
        )*
    };
}

equality_atomic!(bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, String, &'static str);

type ParamsMatch = dyn Fn(&TypeRef, &[String], &[String]) -> bool + Send + Sync;

/// The type system's comparator: a type matches the types it specialises.
///
/// Parameterised targets are decided by an optional parameter matcher; without
/// one, only identical parameter lists match.
#[derive(Clone, Default)]
pub struct TypeComparator {
    params_match: Option<Arc<ParamsMatch>>,
}

impl TypeComparator {
    /// Comparator matching only identical parameter lists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Comparator deciding parameterised targets with `params_match`.
    pub fn with_params_match<F>(params_match: F) -> Self
    where
        F: Fn(&TypeRef, &[String], &[String]) -> bool + Send + Sync + 'static,
    {
        Self {
            params_match: Some(Arc::new(params_match)),
        }
    }
}

impl fmt::Debug for TypeComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeComparator")
            .field("params_match", &self.params_match.is_some())
            .finish()
    }
}

impl LogicalComparator<TypeRef> for TypeComparator {
    fn atomic_type(&self) -> Cow<'_, str> {
        Cow::Borrowed("<Type>")
    }

    fn logical_match(&self, value: &TypeRef, against: &TypeRef) -> bool {
        value.matches_type(against, &|base, params, against_params| {
            self.params_match
                .as_ref()
                .is_some_and(|matcher| matcher(base, params, against_params))
        })
    }
}

impl Atomic for TypeRef {
    fn comparator(&self) -> Option<Arc<dyn LogicalComparator<Self>>> {
        Some(Arc::new(TypeComparator::new()))
    }

    fn type_name(&self) -> Cow<'_, str> {
        Cow::Borrowed("<Type>")
    }
}
