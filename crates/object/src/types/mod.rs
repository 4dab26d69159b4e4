//! Runtime type descriptions.
//!
//! # Role
//!
//! A [`TypeInfo`] is the unit of identity for dispatch: it owns a field
//! layout, the methods it declares and an optional zero-argument
//! initializer. Types are immutable once built and always handled through
//! `Arc<TypeInfo>`; identity is the `Arc` allocation, mirrored by [`TypeId`].
//!
//! # Invariants
//!
//! - A method name is declared at most once per type (no overloading).
//! - A final method is never overridden by a subtype.
//! - Sealed types have no subtypes.

mod builder;
#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;

pub use self::builder::TypeBuilder;
use crate::error::CallError;
use crate::instance::Instance;
use crate::layout::{Fields, Layout};
use crate::signature::MethodSignature;
use crate::value::Value;

/// Body of a method, run with the receiving instance and validated arguments.
pub type MethodBody = Arc<dyn Fn(&Instance, &[Value]) -> Result<Value, CallError> + Send + Sync>;

/// Zero-argument constructor body, run over the fields of a new object
/// before it is shared.
pub type Initializer = Arc<dyn Fn(&mut Fields) -> Result<(), CallError> + Send + Sync>;

static NEXT_TYPE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u64);

impl TypeId {
	fn next() -> Self {
		Self(NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed))
	}

	pub const fn as_u64(self) -> u64 {
		self.0
	}
}

/// A declared method: its signature and its body.
pub struct MethodDef {
	signature: MethodSignature,
	body: MethodBody,
}

impl MethodDef {
	pub fn signature(&self) -> &MethodSignature {
		&self.signature
	}

	pub fn name(&self) -> &str {
		self.signature.name()
	}

	/// Runs the body without argument validation.
	pub fn call(&self, receiver: &Instance, args: &[Value]) -> Result<Value, CallError> {
		(self.body)(receiver, args)
	}
}

impl fmt::Debug for MethodDef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MethodDef").field("signature", &self.signature).finish_non_exhaustive()
	}
}

/// How a type's own constructor can be invoked.
#[derive(Clone, Default)]
pub(crate) enum Construction {
	/// No constructor logic; the implicit zero-argument constructor.
	#[default]
	Implicit,
	/// Zero-argument constructor with a body.
	Initializer(Initializer),
	/// Only constructors taking arguments exist.
	Parameterized,
}

/// Runtime description of a type.
pub struct TypeInfo {
	id: TypeId,
	name: String,
	parent: Option<Arc<TypeInfo>>,
	sealed: bool,
	layout: Arc<Layout>,
	methods: Vec<Arc<MethodDef>>,
	by_name: FxHashMap<String, usize>,
	construction: Construction,
}

impl TypeInfo {
	/// Starts describing a new type called `name`.
	pub fn builder(name: impl Into<String>) -> TypeBuilder {
		TypeBuilder::new(name)
	}

	pub fn id(&self) -> TypeId {
		self.id
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn parent(&self) -> Option<&Arc<TypeInfo>> {
		self.parent.as_ref()
	}

	/// Sealed types cannot be subtyped, and so cannot be proxied.
	pub fn is_sealed(&self) -> bool {
		self.sealed
	}

	pub fn layout(&self) -> &Arc<Layout> {
		&self.layout
	}

	/// Methods declared directly on this type, in declaration order.
	pub fn own_methods(&self) -> &[Arc<MethodDef>] {
		&self.methods
	}

	/// Finds the most-derived method called `name`.
	pub fn resolve(&self, name: &str) -> Option<&Arc<MethodDef>> {
		match self.by_name.get(name) {
			Some(&idx) => Some(&self.methods[idx]),
			None => self.parent.as_ref()?.resolve(name),
		}
	}

	/// Every method visible on this type, parents first.
	///
	/// An override keeps the position of the method it replaces.
	pub fn methods(&self) -> Vec<Arc<MethodDef>> {
		let mut out: Vec<Arc<MethodDef>> = Vec::new();
		let mut pos: FxHashMap<&str, usize> = FxHashMap::default();
		for ty in self.lineage() {
			for m in &ty.methods {
				match pos.get(m.name()) {
					Some(&i) => out[i] = Arc::clone(m),
					None => {
						pos.insert(m.name(), out.len());
						out.push(Arc::clone(m));
					}
				}
			}
		}
		out
	}

	/// Returns true if `self` is `other` or derives from it.
	pub fn is_subtype_of(&self, other: &TypeInfo) -> bool {
		let mut cur = Some(self);
		while let Some(ty) = cur {
			if ty.id == other.id {
				return true;
			}
			cur = ty.parent.as_deref();
		}
		false
	}

	/// Initializers of the zero-argument constructor chain, root first.
	///
	/// `None` if any type in the chain only has constructors taking arguments.
	pub fn zero_arg_constructor(&self) -> Option<Vec<Initializer>> {
		let mut chain = Vec::new();
		for ty in self.lineage() {
			match &ty.construction {
				Construction::Implicit => {}
				Construction::Initializer(init) => chain.push(Arc::clone(init)),
				Construction::Parameterized => return None,
			}
		}
		Some(chain)
	}

	/// Creates an instance through the zero-argument constructor chain.
	pub fn instantiate(self: &Arc<Self>) -> Result<Arc<Instance>, CallError> {
		let chain = self.zero_arg_constructor().ok_or_else(|| {
			CallError::failed(format!("`{}` has no zero-argument constructor", self.name))
		})?;
		self.construct(|fields| chain.iter().try_for_each(|init| init(fields)))
	}

	/// Creates an instance whose fields are set by `init`, starting from zero.
	///
	/// This is the path for types whose constructors take arguments.
	pub fn construct(
		self: &Arc<Self>,
		init: impl FnOnce(&mut Fields) -> Result<(), CallError>,
	) -> Result<Arc<Instance>, CallError> {
		let mut fields = Fields::zeroed(Arc::clone(&self.layout));
		init(&mut fields)?;
		Ok(Arc::new(Instance::new(Arc::clone(self), fields)))
	}

	/// Allocates an instance with zeroed fields and no constructor logic.
	pub fn allocate_zeroed(self: &Arc<Self>) -> Arc<Instance> {
		Arc::new(Instance::new(Arc::clone(self), Fields::zeroed(Arc::clone(&self.layout))))
	}

	/// This type and its ancestors, root first.
	fn lineage(&self) -> Vec<&TypeInfo> {
		let mut chain = Vec::new();
		let mut cur = Some(self);
		while let Some(ty) = cur {
			chain.push(ty);
			cur = ty.parent.as_deref();
		}
		chain.reverse();
		chain
	}
}

impl fmt::Debug for TypeInfo {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeInfo")
			.field("id", &self.id)
			.field("name", &self.name)
			.field("parent", &self.parent.as_ref().map(|p| p.name()))
			.field("sealed", &self.sealed)
			.field("methods", &self.methods.iter().map(|m| m.name()).collect::<Vec<_>>())
			.finish()
	}
}
