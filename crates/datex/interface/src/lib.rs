//! # datex-interface
//!
//! Binds DATEX types to native values through capability configurations.
//!
//! A [`TypeInterface`] bundles optional hooks (property access, operators,
//! compound-assignment actions, serialization, proxies) for one type and its
//! native class or prototype. The [`Registry`] indexes configurations by
//! type, class and prototype and loads missing ones lazily per namespace.
//! The [`Dispatcher`] routes capability calls and answers with the two
//! sentinels of [`Dispatch`] when no hook applies.

#![deny(unsafe_code)]

pub mod capability;
pub mod comparator;
pub mod config;
pub mod configuration;
pub mod dispatch;
pub mod error;
pub mod loader;
pub mod registry;

pub use capability::{Action, Call, Capability, Dispatch, Hook, Operator};
pub use comparator::RegistryTypeComparator;
pub use config::{RegistryConfig, ScanOrder};
pub use configuration::{InterfaceField, ParamsMatcher, TypeDeriver, TypeInterface};
pub use dispatch::Dispatcher;
pub use error::{InterfaceError, Result};
pub use loader::{Loaded, TypeInterfaceLoader};
pub use registry::Registry;
