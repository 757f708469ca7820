//! Capabilities, call arguments, hooks and the dispatch sentinels.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use datex_types::{Endpoint, PointerRef, TypeRef, Value};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Binary (and unary `not`) operators a type may implement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Add,
    Subtract,
    Divide,
    Multiply,
    Power,
    Modulo,
    And,
    Or,
    Not,
}

impl Operator {
    /// Operator name, e.g. `add`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Add => "add",
            Operator::Subtract => "subtract",
            Operator::Divide => "divide",
            Operator::Multiply => "multiply",
            Operator::Power => "power",
            Operator::Modulo => "modulo",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
        }
    }
}

/// Compound-assignment actions applied to a reference in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Add,
    Subtract,
    Divide,
    Multiply,
    Power,
    Modulo,
    Increment,
    Decrement,
    And,
    Or,
}

impl Action {
    /// Action name, e.g. `increment`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Subtract => "subtract",
            Action::Divide => "divide",
            Action::Multiply => "multiply",
            Action::Power => "power",
            Action::Modulo => "modulo",
            Action::Increment => "increment",
            Action::Decrement => "decrement",
            Action::And => "and",
            Action::Or => "or",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dispatchable capability of a type configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Serialize,
    Cast,
    EmptyGenerator,
    OverrideSilently,
    CreateProxy,
    ApplyValue,
    SetProperty,
    GetProperty,
    HasProperty,
    DeleteProperty,
    Clear,
    SetPropertySilently,
    GetPropertySilently,
    DeletePropertySilently,
    ClearSilently,
    Keys,
    Values,
    Count,
    Operator(Operator),
    Action(Action),
    Compare,
}

impl Capability {
    /// Field name of the capability, e.g. `get_property` or `operator_add`.
    pub fn name(&self) -> String {
        match self {
            Capability::Operator(op) => format!("operator_{}", op.as_str()),
            Capability::Action(action) => format!("action_{}", action.as_str()),
            other => other.simple_name().to_string(),
        }
    }

    fn simple_name(&self) -> &'static str {
        match self {
            Capability::Serialize => "serialize",
            Capability::Cast => "cast",
            Capability::EmptyGenerator => "empty_generator",
            Capability::OverrideSilently => "override_silently",
            Capability::CreateProxy => "create_proxy",
            Capability::ApplyValue => "apply_value",
            Capability::SetProperty => "set_property",
            Capability::GetProperty => "get_property",
            Capability::HasProperty => "has_property",
            Capability::DeleteProperty => "delete_property",
            Capability::Clear => "clear",
            Capability::SetPropertySilently => "set_property_silently",
            Capability::GetPropertySilently => "get_property_silently",
            Capability::DeletePropertySilently => "delete_property_silently",
            Capability::ClearSilently => "clear_silently",
            Capability::Keys => "keys",
            Capability::Values => "values",
            Capability::Count => "count",
            Capability::Compare => "compare",
            Capability::Operator(_) | Capability::Action(_) => "",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Outcome of a dispatched capability.
///
/// `NotExisting` means no custom behavior applies and the caller should use
/// default semantics. `Invalid` means a custom interface exists but refuses
/// the operation. Neither is an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch<R = Value> {
    NotExisting,
    Invalid,
    Done(R),
}

impl<R> Dispatch<R> {
    /// Whether no custom behavior applies.
    pub fn is_not_existing(&self) -> bool {
        matches!(self, Dispatch::NotExisting)
    }

    /// Whether the configuration refused the operation.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Dispatch::Invalid)
    }

    /// The hook result, dropping both sentinels.
    pub fn done(self) -> Option<R> {
        match self {
            Dispatch::Done(result) => Some(result),
            _ => None,
        }
    }

    /// Map the hook result, keeping the sentinels.
    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> Dispatch<U> {
        match self {
            Dispatch::NotExisting => Dispatch::NotExisting,
            Dispatch::Invalid => Dispatch::Invalid,
            Dispatch::Done(result) => Dispatch::Done(f(result)),
        }
    }
}

/// Arguments of a capability call.
#[derive(Clone, Debug)]
pub struct Call {
    /// The value the capability is applied to (parent, reference, first operand).
    pub target: Value,
    pub key: Option<Value>,
    /// Assigned value, action operand or second operand.
    pub operand: Option<Value>,
    pub args: Vec<Value>,
    pub silently: bool,
    /// Party excluded from change notifications.
    pub exclude: Option<Endpoint>,
    pub pointer: Option<PointerRef>,
    /// Target type of casts and empty-value generation.
    pub ty: Option<TypeRef>,
}

impl Call {
    /// Call on `target` with no further arguments.
    pub fn new(target: Value) -> Self {
        Self {
            target,
            key: None,
            operand: None,
            args: Vec::new(),
            silently: false,
            exclude: None,
            pointer: None,
            ty: None,
        }
    }

    /// Set the property key.
    pub fn with_key(mut self, key: Value) -> Self {
        self.key = Some(key);
        self
    }

    /// Set the assigned value, action operand or second operand.
    pub fn with_operand(mut self, operand: Value) -> Self {
        self.operand = Some(operand);
        self
    }

    /// Set the positional arguments of an apply call.
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// Suppress change notifications.
    pub fn silently(mut self, silently: bool) -> Self {
        self.silently = silently;
        self
    }

    /// Set the party excluded from change notifications.
    pub fn excluding(mut self, exclude: Option<Endpoint>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Set the pointer the target belongs to.
    pub fn with_pointer(mut self, pointer: PointerRef) -> Self {
        self.pointer = Some(pointer);
        self
    }

    /// Set the target type of a cast or empty-value generation.
    pub fn with_type(mut self, ty: TypeRef) -> Self {
        self.ty = Some(ty);
        self
    }
}

type ReadyHook = dyn Fn(Call) -> Result<Dispatch> + Send + Sync;
type DeferredHook = dyn Fn(Call) -> BoxFuture<'static, Result<Dispatch>> + Send + Sync;

/// A capability implementation, answering now or later.
#[derive(Clone)]
pub enum Hook {
    Ready(Arc<ReadyHook>),
    Deferred(Arc<DeferredHook>),
}

impl Hook {
    /// A hook answering synchronously.
    pub fn ready<F>(f: F) -> Self
    where
        F: Fn(Call) -> Result<Dispatch> + Send + Sync + 'static,
    {
        Hook::Ready(Arc::new(f))
    }

    /// A hook that always completes with a value.
    pub fn returning<F>(f: F) -> Self
    where
        F: Fn(Call) -> Value + Send + Sync + 'static,
    {
        Hook::Ready(Arc::new(move |call: Call| -> Result<Dispatch> {
            Ok(Dispatch::Done(f(call)))
        }))
    }

    /// A hook answering asynchronously.
    pub fn deferred<F, Fut>(f: F) -> Self
    where
        F: Fn(Call) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Dispatch>> + Send + 'static,
    {
        Hook::Deferred(Arc::new(move |call: Call| f(call).boxed()))
    }

    /// Whether the hook answers asynchronously.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Hook::Deferred(_))
    }

    /// Run the hook, awaiting it if deferred.
    pub async fn call(&self, call: Call) -> Result<Dispatch> {
        match self {
            Hook::Ready(f) => f(call),
            Hook::Deferred(f) => f(call).await,
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Ready(_) => f.write_str("Hook::Ready"),
            Hook::Deferred(_) => f.write_str("Hook::Deferred"),
        }
    }
}
