//! Core handles shared by the DATEX value/type abstraction layer.
//!
//! This crate provides the narrow interfaces the logic and interface crates
//! consume from the surrounding runtime:
//!
//! - **TypeRef**: opaque type identity with a namespace and a root/base relation
//! - **Value**: a dynamically typed native value
//! - **NativeClass / NativePrototype**: structural detectors that bind native
//!   values to runtime types
//! - **Endpoint / PointerRef**: addressing handles passed through to hooks

#![deny(unsafe_code)]

pub mod error;
pub mod handles;
pub mod native;
pub mod type_ref;
pub mod value;

pub use error::TypeError;
pub use handles::{Endpoint, PointerRef};
pub use native::{ClassId, Detector, NativeClass, NativePrototype, PrototypeId};
pub use type_ref::{TypeRef, STD_NAMESPACE};
pub use value::Value;
