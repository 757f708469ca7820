//! Lazy, per-namespace type configuration loaders.

use std::future::Future;

use async_trait::async_trait;
use datex_types::TypeRef;

use crate::configuration::TypeInterface;
use crate::error::Result;

/// What a namespace loader produced for a type.
#[derive(Clone, Debug)]
pub enum Loaded {
    /// A configuration to install for the type.
    Interface(TypeInterface),
    /// The type is (or is not) resolvable without installing anything.
    Resolved(bool),
}

impl From<TypeInterface> for Loaded {
    fn from(interface: TypeInterface) -> Self {
        Loaded::Interface(interface)
    }
}

impl From<bool> for Loaded {
    fn from(resolved: bool) -> Self {
        Loaded::Resolved(resolved)
    }
}

/// Materializes configurations for the types of one or more namespaces.
#[async_trait]
pub trait TypeInterfaceLoader: Send + Sync {
    async fn load(&self, ty: &TypeRef) -> Result<Loaded>;
}

#[async_trait]
impl<F, Fut> TypeInterfaceLoader for F
where
    F: Fn(TypeRef) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Loaded>> + Send + 'static,
{
    async fn load(&self, ty: &TypeRef) -> Result<Loaded> {
        self(ty.clone()).await
    }
}
