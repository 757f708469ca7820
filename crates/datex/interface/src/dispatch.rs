//! Capability dispatch with the two-sentinel protocol.

use std::any::Any;
use std::cmp::Ordering;

use datex_types::{Endpoint, PointerRef, TypeRef, Value};
use tracing::debug;

use crate::capability::{Action, Call, Capability, Dispatch, Operator};
use crate::error::{InterfaceError, Result};
use crate::registry::Registry;

/// Routes capability calls to the hooks of registered configurations.
///
/// Every entry point answers [`Dispatch::NotExisting`] when no custom
/// behavior applies and [`Dispatch::Invalid`] when a configuration exists
/// but cannot perform the operation. Entry points taking an optional type
/// derive it from the target value when it is absent.
#[derive(Clone, Copy)]
pub struct Dispatcher<'r> {
    registry: &'r Registry,
}

impl Dispatcher<'static> {
    /// Dispatcher over the process-wide registry.
    pub fn global() -> Self {
        Dispatcher::new(Registry::global())
    }
}

impl<'r> Dispatcher<'r> {
    /// Dispatcher over `registry`.
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// The registry this dispatcher reads.
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Invoke `capability` of the configuration of `ty` on `call.target`.
    pub async fn invoke(&self, ty: &TypeRef, capability: Capability, call: Call) -> Result<Dispatch> {
        let Some(interface) = self.registry.interface_for(ty) else {
            return Ok(Dispatch::NotExisting);
        };
        if interface.is_normal_object() && !interface.declares(capability) {
            debug!(ty = %ty, capability = %capability, "Plain object without hook, using default semantics");
            return Ok(Dispatch::NotExisting);
        }
        if interface.detects(&call.target) == Some(false) {
            debug!(ty = %ty, capability = %capability, "Value excluded by class detection");
            return Ok(Dispatch::NotExisting);
        }
        match interface.hook(capability) {
            Some(hook) => hook.call(call).await,
            None => Ok(Dispatch::Invalid),
        }
    }

    /// Invoke `capability` on `call.target`, deriving its type from the value.
    pub async fn invoke_for_value(&self, capability: Capability, call: Call) -> Result<Dispatch> {
        match self.registry.type_of_value(&call.target) {
            Some(ty) => self.invoke(&ty, capability, call).await,
            None => Ok(Dispatch::NotExisting),
        }
    }

    async fn route(&self, ty: Option<&TypeRef>, capability: Capability, call: Call) -> Result<Dispatch> {
        match ty {
            Some(ty) => self.invoke(ty, capability, call).await,
            None => self.invoke_for_value(capability, call).await,
        }
    }

    /// Call a hook of the target type's configuration without class
    /// detection: the value is not of that type yet.
    async fn construct(&self, ty: &TypeRef, capability: Capability, call: Call) -> Result<Dispatch> {
        let Some(interface) = self.registry.interface_for(ty) else {
            return Ok(Dispatch::NotExisting);
        };
        match interface.hook(capability) {
            Some(hook) => hook.call(call.with_type(ty.clone())).await,
            None => Ok(Dispatch::Invalid),
        }
    }

    /// Set `key` of `parent` to `value`.
    pub async fn set_property(
        &self,
        parent: Value,
        key: Value,
        value: Value,
        exclude: Option<Endpoint>,
        ty: Option<&TypeRef>,
    ) -> Result<Dispatch> {
        let call = Call::new(parent).with_key(key).with_operand(value).excluding(exclude);
        self.route(ty, Capability::SetProperty, call).await
    }

    /// Read `key` of `parent`.
    pub async fn get_property(&self, parent: Value, key: Value, ty: Option<&TypeRef>) -> Result<Dispatch> {
        self.route(ty, Capability::GetProperty, Call::new(parent).with_key(key))
            .await
    }

    /// Whether `parent` has `key`.
    pub async fn has_property(
        &self,
        parent: Value,
        key: Value,
        ty: Option<&TypeRef>,
    ) -> Result<Dispatch<bool>> {
        let result = self
            .route(ty, Capability::HasProperty, Call::new(parent).with_key(key))
            .await?;
        decode(Capability::HasProperty, result)
    }

    /// Delete `key` of `parent`.
    pub async fn delete_property(
        &self,
        parent: Value,
        key: Value,
        exclude: Option<Endpoint>,
        ty: Option<&TypeRef>,
    ) -> Result<Dispatch> {
        let call = Call::new(parent).with_key(key).excluding(exclude);
        self.route(ty, Capability::DeleteProperty, call).await
    }

    /// Remove every property of `parent`.
    pub async fn clear(&self, parent: Value, exclude: Option<Endpoint>, ty: Option<&TypeRef>) -> Result<Dispatch> {
        self.route(ty, Capability::Clear, Call::new(parent).excluding(exclude))
            .await
    }

    /// Property keys of `parent`.
    pub async fn keys(&self, parent: Value, ty: Option<&TypeRef>) -> Result<Dispatch> {
        self.route(ty, Capability::Keys, Call::new(parent)).await
    }

    /// Property values of `parent`.
    pub async fn values(&self, parent: Value, ty: Option<&TypeRef>) -> Result<Dispatch> {
        self.route(ty, Capability::Values, Call::new(parent)).await
    }

    /// Number of properties of `parent`.
    pub async fn count(&self, parent: Value, ty: Option<&TypeRef>) -> Result<Dispatch<u64>> {
        let result = self.route(ty, Capability::Count, Call::new(parent)).await?;
        decode(Capability::Count, result)
    }

    /// Serialized form of `value`.
    pub async fn serialize(&self, value: Value, ty: Option<&TypeRef>) -> Result<Dispatch> {
        self.route(ty, Capability::Serialize, Call::new(value)).await
    }

    /// Proxy of `value` bound to `pointer`.
    pub async fn create_proxy(
        &self,
        value: Value,
        pointer: PointerRef,
        ty: Option<&TypeRef>,
    ) -> Result<Dispatch> {
        self.route(ty, Capability::CreateProxy, Call::new(value).with_pointer(pointer))
            .await
    }

    /// Set `key` of `parent` without notifying observers.
    pub async fn set_property_silently(
        &self,
        parent: Value,
        key: Value,
        value: Value,
        pointer: PointerRef,
        ty: Option<&TypeRef>,
    ) -> Result<Dispatch> {
        let call = Call::new(parent)
            .with_key(key)
            .with_operand(value)
            .with_pointer(pointer)
            .silently(true);
        self.route(ty, Capability::SetPropertySilently, call).await
    }

    /// Read `key` of `parent` without notifying observers.
    pub async fn get_property_silently(
        &self,
        parent: Value,
        key: Value,
        pointer: PointerRef,
        ty: Option<&TypeRef>,
    ) -> Result<Dispatch> {
        let call = Call::new(parent).with_key(key).with_pointer(pointer).silently(true);
        self.route(ty, Capability::GetPropertySilently, call).await
    }

    /// Delete `key` of `parent` without notifying observers.
    pub async fn delete_property_silently(
        &self,
        parent: Value,
        key: Value,
        pointer: PointerRef,
        ty: Option<&TypeRef>,
    ) -> Result<Dispatch> {
        let call = Call::new(parent).with_key(key).with_pointer(pointer).silently(true);
        self.route(ty, Capability::DeletePropertySilently, call).await
    }

    /// Clear `parent` without notifying observers.
    pub async fn clear_silently(
        &self,
        parent: Value,
        pointer: PointerRef,
        ty: Option<&TypeRef>,
    ) -> Result<Dispatch> {
        let call = Call::new(parent).with_pointer(pointer).silently(true);
        self.route(ty, Capability::ClearSilently, call).await
    }

    /// Apply `parent` to `args`.
    pub async fn apply_value(&self, parent: Value, args: Vec<Value>, ty: Option<&TypeRef>) -> Result<Dispatch> {
        self.route(ty, Capability::ApplyValue, Call::new(parent).with_args(args))
            .await
    }

    /// Replace the value behind `reference` without notifying observers.
    pub async fn override_silently(
        &self,
        reference: Value,
        value: Value,
        ty: Option<&TypeRef>,
    ) -> Result<Dispatch> {
        let call = Call::new(reference).with_operand(value).silently(true);
        self.route(ty, Capability::OverrideSilently, call).await
    }

    /// Apply `operator` to `first` and `second`.
    pub async fn operator(
        &self,
        operator: Operator,
        first: Value,
        second: Value,
        ty: Option<&TypeRef>,
    ) -> Result<Dispatch> {
        let call = Call::new(first).with_operand(second);
        self.route(ty, Capability::Operator(operator), call).await
    }

    /// Apply a compound-assignment `action` to `reference`.
    pub async fn action(
        &self,
        action: Action,
        reference: Value,
        operand: Value,
        silently: bool,
        exclude: Option<Endpoint>,
        ty: Option<&TypeRef>,
    ) -> Result<Dispatch> {
        let call = Call::new(reference)
            .with_operand(operand)
            .silently(silently)
            .excluding(exclude);
        self.route(ty, Capability::Action(action), call).await
    }

    /// Ordering of `first` relative to `second`.
    pub async fn compare(&self, first: Value, second: Value, ty: Option<&TypeRef>) -> Result<Dispatch<Ordering>> {
        let result = self
            .route(ty, Capability::Compare, Call::new(first).with_operand(second))
            .await?;
        decode(Capability::Compare, result)
    }

    /// Cast `value` to `ty` through the configuration of `ty`.
    pub async fn cast(&self, value: Value, ty: &TypeRef) -> Result<Dispatch> {
        self.construct(ty, Capability::Cast, Call::new(value)).await
    }

    /// Default empty value of `ty`.
    pub async fn empty_generator(&self, ty: &TypeRef) -> Result<Dispatch> {
        self.construct(ty, Capability::EmptyGenerator, Call::new(Value::void()))
            .await
    }

    /// Apply a compound-assignment action, failing when it is refused or
    /// not implemented.
    ///
    /// The configuration of `ty` itself answers first, then the root
    /// type's. Class detection does not apply.
    pub async fn perform_action(
        &self,
        ty: &TypeRef,
        action: Action,
        reference: Value,
        operand: Value,
        silently: bool,
        exclude: Option<Endpoint>,
    ) -> Result<()> {
        let hook = self
            .registry
            .interface_exact(ty)
            .or_else(|| self.registry.interface_for(ty))
            .and_then(|interface| interface.hook(Capability::Action(action)).cloned())
            .ok_or(InterfaceError::ActionNotImplemented(action))?;
        let call = Call::new(reference)
            .with_operand(operand)
            .silently(silently)
            .excluding(exclude);
        match hook.call(call).await? {
            Dispatch::Invalid => Err(InterfaceError::InvalidActionValue(action)),
            Dispatch::NotExisting | Dispatch::Done(_) => Ok(()),
        }
    }
}

fn decode<R: Any + Clone>(capability: Capability, result: Dispatch) -> Result<Dispatch<R>> {
    match result {
        Dispatch::NotExisting => Ok(Dispatch::NotExisting),
        Dispatch::Invalid => Ok(Dispatch::Invalid),
        Dispatch::Done(value) => value.downcast_ref::<R>().cloned().map(Dispatch::Done).ok_or_else(|| {
            InterfaceError::Hook(format!(
                "{capability} returned {}, expected {}",
                value.type_name(),
                std::any::type_name::<R>()
            ))
        }),
    }
}
