//! The type registry: configurations indexed by type, class and prototype.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use datex_types::{ClassId, NativeClass, NativePrototype, PrototypeId, TypeRef, Value};
use futures::future::{BoxFuture, FutureExt, Shared};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::config::{RegistryConfig, ScanOrder};
use crate::configuration::{InterfaceField, TypeInterface};
use crate::error::{InterfaceError, Result};
use crate::loader::{Loaded, TypeInterfaceLoader};

type PendingLoad = Shared<BoxFuture<'static, Result<Loaded>>>;

#[derive(Default)]
struct Indices {
    by_type: IndexMap<TypeRef, Arc<TypeInterface>>,
    by_class: IndexMap<ClassId, (NativeClass, TypeRef)>,
    by_prototype: IndexMap<PrototypeId, (NativePrototype, TypeRef)>,
}

/// Process-wide store of type configurations and namespace loaders.
///
/// Class and prototype bindings are scanned in registration order by
/// default; re-registering a binding updates it in place and keeps its
/// position. Entries are never removed.
///
/// Locks are never held while user code runs: detectors, hooks and loaders
/// see a consistent snapshot and may call back into the registry.
pub struct Registry {
    config: RegistryConfig,
    indices: RwLock<Indices>,
    loaders: RwLock<HashMap<String, Arc<dyn TypeInterfaceLoader>>>,
    pending: Mutex<HashMap<TypeRef, PendingLoad>>,
}

impl Registry {
    /// Empty registry with `config`.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            indices: RwLock::new(Indices::default()),
            loaders: RwLock::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// The shared process-wide registry.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::default)
    }

    /// The registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a configuration, merging it into any existing one for its type.
    ///
    /// The merged result must name a type and a class or prototype; on
    /// failure the registry is left unchanged.
    pub fn register(&self, interface: TypeInterface) -> Result<Arc<TypeInterface>> {
        let ty = interface.ty().cloned().ok_or(InterfaceError::MissingType)?;
        let mut indices = self.indices.write();

        let merged = match indices.by_type.get(&ty) {
            Some(existing) => {
                let mut merged = TypeInterface::clone(existing);
                merged.merge(interface);
                merged
            }
            None => interface,
        };
        merged.validate()?;
        let merged = Arc::new(merged);
        indices.by_type.insert(ty.clone(), merged.clone());

        if let Some(class) = merged.class() {
            if let Some((_, previous)) = indices.by_class.get(class.id()) {
                if *previous != ty && self.config.warn_on_rebind {
                    warn!(class = %class.id(), from = %previous, to = %ty, "Native class rebound");
                }
            }
            indices
                .by_class
                .insert(class.id().clone(), (class.clone(), ty.clone()));
        }
        if let Some(prototype) = merged.prototype() {
            if let Some((_, previous)) = indices.by_prototype.get(prototype.id()) {
                if *previous != ty && self.config.warn_on_rebind {
                    warn!(prototype = %prototype.id(), from = %previous, to = %ty, "Native prototype rebound");
                }
            }
            indices
                .by_prototype
                .insert(prototype.id().clone(), (prototype.clone(), ty.clone()));
        }

        info!(
            ty = %ty,
            class = ?merged.class().map(NativeClass::id),
            prototype = ?merged.prototype().map(NativePrototype::id),
            "Type configuration registered"
        );
        Ok(merged)
    }

    /// Register `interface` as the configuration of `ty`.
    pub fn register_for(&self, ty: TypeRef, interface: TypeInterface) -> Result<Arc<TypeInterface>> {
        self.register(interface.with_type(ty))
    }

    /// Set one field of the configuration of `ty`, creating it if needed.
    pub fn update(&self, ty: &TypeRef, field: InterfaceField) -> Result<Arc<TypeInterface>> {
        let mut interface = TypeInterface::new(ty.clone());
        interface.set(field);
        self.register(interface)
    }

    /// Install `loader` for every namespace in `namespaces`.
    pub fn add_loader<I, S, L>(&self, namespaces: I, loader: L)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        L: TypeInterfaceLoader + 'static,
    {
        let loader: Arc<dyn TypeInterfaceLoader> = Arc::new(loader);
        let mut loaders = self.loaders.write();
        for namespace in namespaces {
            let namespace = namespace.into();
            info!(namespace = %namespace, "Type configuration loader installed");
            loaders.insert(namespace, loader.clone());
        }
    }

    /// Make sure a configuration for `ty` is available.
    ///
    /// Returns `true` at once if one is indexed for the exact type. Otherwise
    /// the loader of the type's namespace decides: a configuration is
    /// installed, a boolean is returned as is. Without a loader the type is
    /// not loadable.
    ///
    /// Overlapping calls for the same type share one loader invocation.
    pub async fn load_type_configuration(&self, ty: &TypeRef) -> Result<bool> {
        if self.contains(ty) {
            return Ok(true);
        }
        let Some(load) = self.pending_load(ty) else {
            debug!(ty = %ty, "No type configuration loader for namespace");
            return Ok(false);
        };

        let loaded = load.await;
        self.pending.lock().remove(ty);
        match loaded? {
            Loaded::Resolved(resolved) => Ok(resolved),
            Loaded::Interface(_) if self.contains(ty) => Ok(true),
            Loaded::Interface(interface) => {
                self.register_for(ty.clone(), interface)?;
                Ok(true)
            }
        }
    }

    /// The in-flight load of `ty`, starting one if none is running.
    fn pending_load(&self, ty: &TypeRef) -> Option<PendingLoad> {
        let mut pending = self.pending.lock();
        if let Some(load) = pending.get(ty) {
            return Some(load.clone());
        }
        let loader = self.loader_for(ty.namespace())?;

        debug!(ty = %ty, namespace = ty.namespace(), "Invoking type configuration loader");
        let owned = ty.clone();
        let load = async move { loader.load(&owned).await }.boxed().shared();
        pending.insert(ty.clone(), load.clone());
        Some(load)
    }

    /// The native class bound to `ty`, loading its configuration first.
    pub async fn class_for_type(&self, ty: &TypeRef) -> Result<NativeClass> {
        if !self.load_type_configuration(ty).await? {
            return Err(InterfaceError::TypeNotLoaded(ty.clone()));
        }
        let interface = self
            .interface_exact(ty)
            .ok_or_else(|| InterfaceError::TypeNotLoaded(ty.clone()))?;
        interface
            .class()
            .cloned()
            .ok_or_else(|| InterfaceError::NoClassBound(ty.clone()))
    }

    /// Configuration for `ty`: the root type's first, then the exact type's.
    pub fn interface_for(&self, ty: &TypeRef) -> Option<Arc<TypeInterface>> {
        let indices = self.indices.read();
        indices
            .by_type
            .get(&ty.root())
            .or_else(|| indices.by_type.get(ty))
            .cloned()
    }

    /// Configuration registered for exactly `ty`.
    pub fn interface_exact(&self, ty: &TypeRef) -> Option<Arc<TypeInterface>> {
        self.indices.read().by_type.get(ty).cloned()
    }

    /// Whether a configuration is registered for exactly `ty`.
    pub fn contains(&self, ty: &TypeRef) -> bool {
        self.indices.read().by_type.contains_key(ty)
    }

    /// Registered types, in registration order.
    pub fn types(&self) -> Vec<TypeRef> {
        self.indices.read().by_type.keys().cloned().collect()
    }

    /// Type of a native value.
    ///
    /// Scans class bindings by instance check, then prototype bindings, then
    /// class bindings again by their detection predicate. `None` when the
    /// value's type cannot be determined.
    pub fn type_of_value(&self, value: &Value) -> Option<TypeRef> {
        let (classes, prototypes) = self.snapshot();
        classes
            .iter()
            .find(|(class, _)| class.is_instance(value))
            .map(|(_, interface)| interface)
            .or_else(|| {
                prototypes
                    .iter()
                    .find(|(prototype, _)| prototype.is_prototype_of(value))
                    .map(|(_, interface)| interface)
            })
            .or_else(|| {
                classes
                    .iter()
                    .find(|(_, interface)| interface.detects(value) == Some(true))
                    .map(|(_, interface)| interface)
            })
            .and_then(|interface| interface.type_for(value))
    }

    /// Whether a configuration claims `value`.
    ///
    /// The first structurally matching class or prototype decides; its
    /// detection predicate may still exclude the value.
    pub fn has_interface(&self, value: &Value) -> bool {
        let (classes, prototypes) = self.snapshot();
        if let Some((_, interface)) = classes.iter().find(|(class, _)| class.is_instance(value)) {
            return interface.detects(value) != Some(false);
        }
        if let Some((_, interface)) = prototypes
            .iter()
            .find(|(prototype, _)| prototype.is_prototype_of(value))
        {
            return interface.detects(value) != Some(false);
        }
        false
    }

    /// Type bound to a native class, falling back to its parent class.
    pub fn type_of_class(&self, class: &NativeClass) -> Option<TypeRef> {
        let indices = self.indices.read();
        indices
            .by_class
            .get(class.id())
            .or_else(|| {
                class
                    .parent()
                    .and_then(|parent| indices.by_class.get(parent.id()))
            })
            .map(|(_, ty)| ty.clone())
    }

    fn loader_for(&self, namespace: &str) -> Option<Arc<dyn TypeInterfaceLoader>> {
        self.loaders.read().get(namespace).cloned()
    }

    #[allow(clippy::type_complexity)]
    fn snapshot(
        &self,
    ) -> (
        Vec<(NativeClass, Arc<TypeInterface>)>,
        Vec<(NativePrototype, Arc<TypeInterface>)>,
    ) {
        let indices = self.indices.read();
        let mut classes: Vec<_> = indices
            .by_class
            .values()
            .filter_map(|(class, ty)| Some((class.clone(), indices.by_type.get(ty)?.clone())))
            .collect();
        let mut prototypes: Vec<_> = indices
            .by_prototype
            .values()
            .filter_map(|(prototype, ty)| {
                Some((prototype.clone(), indices.by_type.get(ty)?.clone()))
            })
            .collect();
        drop(indices);

        if self.config.scan_order == ScanOrder::MostRecentFirst {
            classes.reverse();
            prototypes.reverse();
        }
        (classes, prototypes)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Capability, Hook};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Point;
    struct Point3d;

    fn point() -> TypeRef {
        TypeRef::new("app", "Point")
    }

    fn point_interface() -> TypeInterface {
        TypeInterface::new(point()).with_class(NativeClass::of::<Point>())
    }

    #[test]
    fn registration_requires_class_or_prototype() {
        let registry = Registry::default();
        assert_eq!(
            registry.register(TypeInterface::new(point())).unwrap_err(),
            InterfaceError::MissingClassOrPrototype(point())
        );
        assert!(!registry.contains(&point()));
        assert_eq!(
            registry.register(TypeInterface::default()).unwrap_err(),
            InterfaceError::MissingType
        );
    }

    #[test]
    fn later_registrations_merge() {
        let registry = Registry::default();
        registry.register(point_interface()).unwrap();
        let merged = registry
            .update(&point(), InterfaceField::NormalObject(true))
            .unwrap();
        assert!(merged.is_normal_object());
        assert!(merged.class().is_some());

        let merged = registry
            .register_for(
                point(),
                TypeInterface::default().with_hook(Capability::Count, Hook::returning(|_| Value::new(2_u64))),
            )
            .unwrap();
        assert!(merged.is_normal_object());
        assert!(merged.declares(Capability::Count));
        assert_eq!(registry.types(), vec![point()]);
    }

    #[test]
    fn update_without_configuration_needs_a_binding() {
        let registry = Registry::default();
        assert!(registry
            .update(&point(), InterfaceField::NormalObject(true))
            .is_err());
        assert!(registry
            .update(&point(), InterfaceField::Class(NativeClass::of::<Point>()))
            .is_ok());
    }

    #[test]
    fn interface_lookup_prefers_the_root_type() {
        let registry = Registry::default();
        registry.register(point_interface()).unwrap();
        let variant = point().with_variation("3d");
        registry
            .register(TypeInterface::new(variant.clone()).with_class(NativeClass::of::<Point3d>()))
            .unwrap();

        let found = registry.interface_for(&variant).unwrap();
        assert_eq!(found.ty(), Some(&point()));
        assert_eq!(registry.interface_exact(&variant).unwrap().ty(), Some(&variant));
    }

    #[test]
    fn value_types_follow_registration_order() {
        let registry = Registry::default();
        let first = TypeRef::new("app", "First");
        let second = TypeRef::new("app", "Second");
        registry
            .register(TypeInterface::new(first.clone()).with_class(NativeClass::of::<Point>()))
            .unwrap();
        registry
            .register(
                TypeInterface::new(second.clone())
                    .with_class(NativeClass::new("any-point", |v: &Value| v.is::<Point>())),
            )
            .unwrap();
        assert_eq!(registry.type_of_value(&Value::new(Point)), Some(first));

        let reversed = Registry::new(RegistryConfig {
            scan_order: ScanOrder::MostRecentFirst,
            ..RegistryConfig::default()
        });
        for interface in registry.types().into_iter().filter_map(|ty| registry.interface_exact(&ty)) {
            reversed.register(TypeInterface::clone(&interface)).unwrap();
        }
        assert_eq!(reversed.type_of_value(&Value::new(Point)), Some(second));
    }

    #[test]
    fn value_types_fall_back_to_prototypes_then_detectors() {
        let registry = Registry::default();
        let proto_type = TypeRef::new("app", "Proto");
        let detected = TypeRef::new("app", "Detected");
        registry
            .register(
                TypeInterface::new(proto_type.clone())
                    .with_prototype(NativePrototype::new("proto", |v: &Value| v.is::<Point3d>())),
            )
            .unwrap();
        registry
            .register(
                TypeInterface::new(detected.clone())
                    .with_class(NativeClass::new("never", |_: &Value| false))
                    .with_detect_class(|v| v.is::<u8>()),
            )
            .unwrap();

        assert_eq!(registry.type_of_value(&Value::new(Point3d)), Some(proto_type));
        assert_eq!(registry.type_of_value(&Value::new(1_u8)), Some(detected));
        assert_eq!(registry.type_of_value(&Value::new("text")), None);
    }

    #[test]
    fn value_types_use_the_derivation_hook() {
        let registry = Registry::default();
        registry
            .register(point_interface().with_get_type(|_| point().with_parameters(["integer"])))
            .unwrap();
        assert_eq!(
            registry.type_of_value(&Value::new(Point)),
            Some(point().with_parameters(["integer"]))
        );
    }

    #[test]
    fn has_interface_honors_the_detector() {
        let registry = Registry::default();
        registry
            .register(point_interface().with_detect_class(|_| false))
            .unwrap();
        registry
            .register(
                TypeInterface::new(TypeRef::new("app", "Proto"))
                    .with_prototype(NativePrototype::new("proto", |v: &Value| v.is::<Point3d>())),
            )
            .unwrap();
        assert!(!registry.has_interface(&Value::new(Point)));
        assert!(registry.has_interface(&Value::new(Point3d)));
        assert!(!registry.has_interface(&Value::new(7_i32)));
    }

    #[test]
    fn class_types_fall_back_to_the_parent() {
        let registry = Registry::default();
        registry.register(point_interface()).unwrap();
        let child = NativeClass::new("point-child", |_: &Value| false).extends(NativeClass::of::<Point>());
        assert_eq!(registry.type_of_class(&NativeClass::of::<Point>()), Some(point()));
        assert_eq!(registry.type_of_class(&child), Some(point()));
        assert_eq!(registry.type_of_class(&NativeClass::of::<Point3d>()), None);
    }

    #[test]
    fn rebinding_a_class_moves_it_to_the_new_type() {
        let registry = Registry::default();
        let other = TypeRef::new("app", "Other");
        registry.register(point_interface()).unwrap();
        registry
            .register(TypeInterface::new(other.clone()).with_class(NativeClass::of::<Point>()))
            .unwrap();
        assert_eq!(registry.type_of_value(&Value::new(Point)), Some(other));
    }

    #[tokio::test]
    async fn loaders_run_once_per_installed_type() {
        let registry = Registry::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        registry.add_loader(["geo", "app"], move |ty: TypeRef| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, InterfaceError>(Loaded::from(
                    TypeInterface::default().with_class(NativeClass::new(ty.to_string(), |_: &Value| false)),
                ))
            }
        });

        let shape = TypeRef::new("geo", "Shape");
        assert!(registry.load_type_configuration(&shape).await.unwrap());
        assert!(registry.load_type_configuration(&shape).await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.contains(&shape));

        assert!(registry.load_type_configuration(&point()).await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn overlapping_loads_share_one_loader_call() {
        let registry = Registry::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        registry.add_loader(["geo"], move |ty: TypeRef| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                Ok::<_, InterfaceError>(Loaded::from(
                    TypeInterface::default().with_class(NativeClass::new(ty.to_string(), |_: &Value| false)),
                ))
            }
        });

        let shape = TypeRef::new("geo", "Shape");
        let (first, second) = tokio::join!(
            registry.load_type_configuration(&shape),
            registry.load_type_configuration(&shape)
        );
        assert!(first.unwrap());
        assert!(second.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.types(), vec![shape.clone()]);

        // other types get their own load
        let circle = TypeRef::new("geo", "Circle");
        assert!(registry.load_type_configuration(&circle).await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn loader_booleans_are_returned_as_is() {
        let registry = Registry::default();
        registry.add_loader(["yes"], |_: TypeRef| async { Ok::<_, InterfaceError>(Loaded::Resolved(true)) });
        registry.add_loader(["no"], |_: TypeRef| async { Ok::<_, InterfaceError>(Loaded::from(false)) });

        assert!(registry.load_type_configuration(&TypeRef::new("yes", "T")).await.unwrap());
        assert!(!registry.load_type_configuration(&TypeRef::new("no", "T")).await.unwrap());
        assert!(!registry.load_type_configuration(&TypeRef::new("none", "T")).await.unwrap());
    }

    #[tokio::test]
    async fn loader_failures_propagate() {
        let registry = Registry::default();
        registry.add_loader(["broken"], |_: TypeRef| async {
            Err::<Loaded, _>(InterfaceError::Loader("offline".into()))
        });
        assert_eq!(
            registry.load_type_configuration(&TypeRef::new("broken", "T")).await,
            Err(InterfaceError::Loader("offline".into()))
        );
    }

    #[tokio::test]
    async fn class_for_type_requires_a_loadable_class() {
        let registry = Registry::default();
        registry.register(point_interface()).unwrap();
        assert_eq!(
            registry.class_for_type(&point()).await.unwrap().id(),
            NativeClass::of::<Point>().id()
        );

        let unknown = TypeRef::new("app", "Unknown");
        assert_eq!(
            registry.class_for_type(&unknown).await.unwrap_err(),
            InterfaceError::TypeNotLoaded(unknown)
        );

        let proto_only = TypeRef::new("app", "Proto");
        registry
            .register(
                TypeInterface::new(proto_only.clone())
                    .with_prototype(NativePrototype::new("proto", |_: &Value| false)),
            )
            .unwrap();
        assert_eq!(
            registry.class_for_type(&proto_only).await.unwrap_err(),
            InterfaceError::NoClassBound(proto_only)
        );
    }
}
