//! Native class and prototype handles.
//!
//! A native value has no intrinsic runtime type. Classes and prototypes are
//! explicit detectors that decide structurally whether a value belongs to
//! them; the interface registry evaluates them in a defined order.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Structural membership predicate over native values.
pub type Detector = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassId(pub String);

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrototypeId(pub String);

impl fmt::Display for PrototypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A native class: an identity plus an instance-of detector.
#[derive(Clone)]
pub struct NativeClass {
    id: ClassId,
    detector: Detector,
    parent: Option<Box<NativeClass>>,
}

impl NativeClass {
    /// Class whose instances are exactly the values backed by `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            id: ClassId(std::any::type_name::<T>().to_string()),
            detector: Arc::new(|value: &Value| value.is::<T>()),
            parent: None,
        }
    }

    /// Class `id` whose instances are the values accepted by `detector`.
    pub fn new<F>(id: impl Into<String>, detector: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            id: ClassId(id.into()),
            detector: Arc::new(detector),
            parent: None,
        }
    }

    /// Declare the class this one derives from.
    pub fn extends(mut self, parent: NativeClass) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Class identity.
    pub fn id(&self) -> &ClassId {
        &self.id
    }

    /// The class this one derives from.
    pub fn parent(&self) -> Option<&NativeClass> {
        self.parent.as_deref()
    }

    /// Whether `value` is an instance of this class.
    pub fn is_instance(&self, value: &Value) -> bool {
        (self.detector)(value)
    }
}

impl fmt::Debug for NativeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeClass")
            .field("id", &self.id)
            .field("parent", &self.parent.as_ref().map(|p| &p.id))
            .finish()
    }
}

/// A native prototype: values derived from it share its structure.
#[derive(Clone)]
pub struct NativePrototype {
    id: PrototypeId,
    detector: Detector,
}

impl NativePrototype {
    /// Prototype `id` of the values accepted by `detector`.
    pub fn new<F>(id: impl Into<String>, detector: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            id: PrototypeId(id.into()),
            detector: Arc::new(detector),
        }
    }

    /// Prototype identity.
    pub fn id(&self) -> &PrototypeId {
        &self.id
    }

    /// Whether `value` derives from this prototype.
    pub fn is_prototype_of(&self, value: &Value) -> bool {
        (self.detector)(value)
    }
}

impl fmt::Debug for NativePrototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativePrototype")
            .field("id", &self.id)
            .finish()
    }
}
