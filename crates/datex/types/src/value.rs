use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A dynamically typed native value.
///
/// Values are shared by reference: cloning a `Value` clones the handle, not
/// the underlying object. Identity comparisons use [`Value::ptr_eq`].
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    /// Wrap a native value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The void value (no result).
    pub fn void() -> Self {
        Self::new(())
    }

    /// Whether this is the void value.
    pub fn is_void(&self) -> bool {
        self.is::<()>()
    }

    /// Whether the value is backed by `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.inner.as_ref().type_id() == TypeId::of::<T>()
    }

    /// The backing `T`, if any.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.as_ref().downcast_ref::<T>()
    }

    /// Name of the native type backing this value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether both handles share the same underlying object.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value<{}>", self.type_name)
    }
}
