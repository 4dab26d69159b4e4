//! Dynamic object model for runtime dispatch.
//!
//! Types are described at runtime by [`TypeInfo`], objects are reached through
//! the [`Object`] trait, and calls carry [`Value`] arguments. The proxy engine
//! in `mimic-proxy` builds on these to stand in for arbitrary objects.

/// Call and type construction errors.
pub mod error;
/// Objects, instances and the shared object handle.
pub mod instance;
/// Field layouts and per-instance field storage.
pub mod layout;
/// Method signatures and modifiers.
pub mod signature;
/// Type descriptions and the type builder.
pub mod types;
/// Runtime values and their kinds.
pub mod value;

pub use error::{CallError, TypeError};
pub use instance::{Instance, Object, ObjectRef};
pub use layout::{FieldDef, Fields, Layout};
pub use signature::{MethodSignature, Modifiers};
pub use types::{Initializer, MethodBody, MethodDef, TypeBuilder, TypeId, TypeInfo};
pub use value::{Value, ValueKind};
