//! Capability configuration of a type.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use datex_types::{Detector, NativeClass, NativePrototype, TypeRef, Value};
use indexmap::IndexSet;

use crate::capability::{Capability, Hook};
use crate::error::{InterfaceError, Result};

/// Derives a specific type (variation, parameters) for a value.
pub type TypeDeriver = Arc<dyn Fn(&Value) -> TypeRef + Send + Sync>;

/// Decides whether the parameters of a type satisfy target parameters.
pub type ParamsMatcher = Arc<dyn Fn(&[String], &[String]) -> bool + Send + Sync>;

/// The bundle of optional hooks binding a type to a native class or prototype.
///
/// Every hook is independently present or absent. A capability may also be
/// declared but disabled: it then counts as set, yet cannot be called.
#[derive(Clone, Default)]
pub struct TypeInterface {
    ty: Option<TypeRef>,
    class: Option<NativeClass>,
    prototype: Option<NativePrototype>,
    detect_class: Option<Detector>,
    get_type: Option<TypeDeriver>,
    type_params_match: Option<ParamsMatcher>,
    is_normal_object: Option<bool>,
    proxify_children: Option<bool>,
    visible_children: Option<IndexSet<String>>,
    hooks: HashMap<Capability, Option<Hook>>,
}

/// One field of a [`TypeInterface`], for incremental updates.
#[derive(Clone)]
pub enum InterfaceField {
    Class(NativeClass),
    Prototype(NativePrototype),
    DetectClass(Detector),
    GetType(TypeDeriver),
    TypeParamsMatch(ParamsMatcher),
    NormalObject(bool),
    ProxifyChildren(bool),
    VisibleChildren(IndexSet<String>),
    Hook(Capability, Hook),
    Disabled(Capability),
}

impl TypeInterface {
    /// Empty configuration for `ty`.
    pub fn new(ty: TypeRef) -> Self {
        Self {
            ty: Some(ty),
            ..Self::default()
        }
    }

    /// Set the owning type.
    pub fn with_type(mut self, ty: TypeRef) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Bind the native class.
    pub fn with_class(self, class: NativeClass) -> Self {
        self.with(InterfaceField::Class(class))
    }

    /// Bind the native prototype.
    pub fn with_prototype(self, prototype: NativePrototype) -> Self {
        self.with(InterfaceField::Prototype(prototype))
    }

    /// Set the class-detection predicate.
    pub fn with_detect_class<F>(self, detect: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.with(InterfaceField::DetectClass(Arc::new(detect)))
    }

    /// Set the type-derivation hook.
    pub fn with_get_type<F>(self, derive: F) -> Self
    where
        F: Fn(&Value) -> TypeRef + Send + Sync + 'static,
    {
        self.with(InterfaceField::GetType(Arc::new(derive)))
    }

    /// Set the matcher for type parameters.
    pub fn with_type_params_match<F>(self, params_match: F) -> Self
    where
        F: Fn(&[String], &[String]) -> bool + Send + Sync + 'static,
    {
        self.with(InterfaceField::TypeParamsMatch(Arc::new(params_match)))
    }

    /// Mark the type as a plain object: capabilities it never set fall back
    /// to default semantics.
    pub fn normal_object(self, is_normal_object: bool) -> Self {
        self.with(InterfaceField::NormalObject(is_normal_object))
    }

    /// Wrap child values in proxies.
    pub fn proxify_children(self, proxify: bool) -> Self {
        self.with(InterfaceField::ProxifyChildren(proxify))
    }

    /// Restrict the exposed properties to `children`.
    pub fn with_visible_children<I, S>(self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(InterfaceField::VisibleChildren(
            children.into_iter().map(Into::into).collect(),
        ))
    }

    /// Set the hook for `capability`.
    pub fn with_hook(self, capability: Capability, hook: Hook) -> Self {
        self.with(InterfaceField::Hook(capability, hook))
    }

    /// Declare `capability` without an implementation.
    pub fn disable(self, capability: Capability) -> Self {
        self.with(InterfaceField::Disabled(capability))
    }

    fn with(mut self, field: InterfaceField) -> Self {
        self.set(field);
        self
    }

    /// Overwrite one field.
    pub fn set(&mut self, field: InterfaceField) {
        match field {
            InterfaceField::Class(class) => self.class = Some(class),
            InterfaceField::Prototype(prototype) => self.prototype = Some(prototype),
            InterfaceField::DetectClass(detect) => self.detect_class = Some(detect),
            InterfaceField::GetType(derive) => self.get_type = Some(derive),
            InterfaceField::TypeParamsMatch(params_match) => {
                self.type_params_match = Some(params_match)
            }
            InterfaceField::NormalObject(flag) => self.is_normal_object = Some(flag),
            InterfaceField::ProxifyChildren(flag) => self.proxify_children = Some(flag),
            InterfaceField::VisibleChildren(children) => self.visible_children = Some(children),
            InterfaceField::Hook(capability, hook) => {
                self.hooks.insert(capability, Some(hook));
            }
            InterfaceField::Disabled(capability) => {
                self.hooks.insert(capability, None);
            }
        }
    }

    /// Overlay every field set on `other`.
    pub fn merge(&mut self, other: TypeInterface) {
        let TypeInterface {
            ty,
            class,
            prototype,
            detect_class,
            get_type,
            type_params_match,
            is_normal_object,
            proxify_children,
            visible_children,
            hooks,
        } = other;
        self.ty = ty.or(self.ty.take());
        self.class = class.or(self.class.take());
        self.prototype = prototype.or(self.prototype.take());
        self.detect_class = detect_class.or(self.detect_class.take());
        self.get_type = get_type.or(self.get_type.take());
        self.type_params_match = type_params_match.or(self.type_params_match.take());
        self.is_normal_object = is_normal_object.or(self.is_normal_object);
        self.proxify_children = proxify_children.or(self.proxify_children);
        self.visible_children = visible_children.or(self.visible_children.take());
        self.hooks.extend(hooks);
    }

    /// Check the mandatory fields: a type and a class or prototype.
    pub fn validate(&self) -> Result<&TypeRef> {
        let ty = self.ty.as_ref().ok_or(InterfaceError::MissingType)?;
        if self.class.is_none() && self.prototype.is_none() {
            return Err(InterfaceError::MissingClassOrPrototype(ty.clone()));
        }
        Ok(ty)
    }

    /// The owning type.
    pub fn ty(&self) -> Option<&TypeRef> {
        self.ty.as_ref()
    }

    /// The bound native class.
    pub fn class(&self) -> Option<&NativeClass> {
        self.class.as_ref()
    }

    /// The bound native prototype.
    pub fn prototype(&self) -> Option<&NativePrototype> {
        self.prototype.as_ref()
    }

    /// Whether the type is a plain object. Unset means `false`.
    pub fn is_normal_object(&self) -> bool {
        self.is_normal_object.unwrap_or(false)
    }

    /// Whether child values are wrapped in proxies.
    pub fn proxifies_children(&self) -> bool {
        self.proxify_children.unwrap_or(false)
    }

    /// The exposed properties, if restricted.
    pub fn visible_children(&self) -> Option<&IndexSet<String>> {
        self.visible_children.as_ref()
    }

    /// Whether `property` may be exposed: every property is when no visible
    /// children are configured.
    pub fn is_property_allowed(&self, property: &str) -> bool {
        self.visible_children
            .as_ref()
            .map_or(true, |children| children.contains(property))
    }

    /// Whether `capability` was ever set, callable or not.
    pub fn declares(&self, capability: Capability) -> bool {
        self.hooks.contains_key(&capability)
    }

    /// The callable hook for `capability`, if any.
    pub fn hook(&self, capability: Capability) -> Option<&Hook> {
        self.hooks.get(&capability).and_then(Option::as_ref)
    }

    /// Verdict of the class-detection predicate, if one is configured.
    pub fn detects(&self, value: &Value) -> Option<bool> {
        self.detect_class.as_ref().map(|detect| detect(value))
    }

    /// Type of `value` under this configuration: the `get_type` hook if
    /// present, else the bound type.
    pub fn type_for(&self, value: &Value) -> Option<TypeRef> {
        match &self.get_type {
            Some(derive) => Some(derive(value)),
            None => self.ty.clone(),
        }
    }

    /// Verdict of the parameter matcher, if one is configured.
    pub fn params_match(&self, params: &[String], against: &[String]) -> Option<bool> {
        self.type_params_match
            .as_ref()
            .map(|params_match| params_match(params, against))
    }
}

impl fmt::Debug for TypeInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut declared: Vec<String> = self.hooks.keys().map(Capability::name).collect();
        declared.sort();
        f.debug_struct("TypeInterface")
            .field("ty", &self.ty)
            .field("class", &self.class.as_ref().map(NativeClass::id))
            .field("prototype", &self.prototype.as_ref().map(NativePrototype::id))
            .field("is_normal_object", &self.is_normal_object)
            .field("capabilities", &declared)
            .finish()
    }
}
