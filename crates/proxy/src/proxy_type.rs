//! Synthesized proxy types.
//!
//! # Role
//!
//! A [`ProxyType`] is the loadable result of synthesis: the dispatch table
//! deciding, per method name, whether a call is intercepted or forwarded,
//! plus the inherited field layout and zero-argument constructor chain used
//! by allocation.
//!
//! # Invariants
//!
//! - A proxy type holds its target only weakly, so cache entries never keep a
//!   target type alive. Live proxy instances keep it alive through their
//!   original object.

use std::sync::{Arc, Weak};

use mimic_object::{Initializer, Layout, MethodSignature, TypeId, TypeInfo};
use rustc_hash::FxHashMap;

/// How a proxy routes one method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
	/// Overridden: the call goes to the interceptor.
	Intercept(Arc<MethodSignature>),
	/// Inherited: the call goes straight to the original object.
	Delegate(Arc<MethodSignature>),
}

impl Dispatch {
	pub fn signature(&self) -> &MethodSignature {
		match self {
			Self::Intercept(sig) | Self::Delegate(sig) => sig,
		}
	}

	pub fn is_intercepted(&self) -> bool {
		matches!(self, Self::Intercept(_))
	}
}

/// A synthesized proxy type for one target type and one filter.
pub struct ProxyType {
	name: String,
	target_name: String,
	target_id: TypeId,
	target: Weak<TypeInfo>,
	layout: Arc<Layout>,
	methods: Vec<Dispatch>,
	by_name: FxHashMap<String, usize>,
	constructor: Option<Vec<Initializer>>,
}

impl ProxyType {
	/// Starts a proxy type called `name` standing in for `target`.
	///
	/// The layout and zero-argument constructor chain are inherited from
	/// `target`; methods start out absent and are added by the synthesizer.
	pub fn builder(name: impl Into<String>, target: &Arc<TypeInfo>) -> ProxyTypeBuilder {
		ProxyTypeBuilder {
			ty: ProxyType {
				name: name.into(),
				target_name: target.name().to_owned(),
				target_id: target.id(),
				target: Arc::downgrade(target),
				layout: Arc::clone(target.layout()),
				methods: Vec::new(),
				by_name: FxHashMap::default(),
				constructor: target.zero_arg_constructor(),
			},
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn target_name(&self) -> &str {
		&self.target_name
	}

	/// The target type, if it is still alive.
	pub fn target(&self) -> Option<Arc<TypeInfo>> {
		self.target.upgrade()
	}

	/// Returns true if instances of this type can stand in for `ty`.
	pub fn is_proxy_of(&self, ty: &TypeInfo) -> bool {
		self.target_id == ty.id() || self.target().is_some_and(|t| t.is_subtype_of(ty))
	}

	pub fn layout(&self) -> &Arc<Layout> {
		&self.layout
	}

	pub fn dispatch(&self, method: &str) -> Option<&Dispatch> {
		self.by_name.get(method).map(|&i| &self.methods[i])
	}

	/// Every routed method, in the target's method order.
	pub fn methods(&self) -> &[Dispatch] {
		&self.methods
	}

	/// Signatures of the overridden methods.
	pub fn intercepted(&self) -> impl Iterator<Item = &MethodSignature> {
		self.methods.iter().filter(|d| d.is_intercepted()).map(Dispatch::signature)
	}

	pub fn is_intercepted(&self, method: &str) -> bool {
		self.dispatch(method).is_some_and(Dispatch::is_intercepted)
	}

	/// Initializers of the zero-argument constructor chain, root first.
	pub fn constructor(&self) -> Option<&[Initializer]> {
		self.constructor.as_deref()
	}
}

impl std::fmt::Debug for ProxyType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ProxyType")
			.field("name", &self.name)
			.field("target", &self.target_name)
			.field("intercepted", &self.intercepted().map(MethodSignature::name).collect::<Vec<_>>())
			.field("has_constructor", &self.constructor.is_some())
			.finish()
	}
}

/// Collects the dispatch table of a [`ProxyType`].
pub struct ProxyTypeBuilder {
	ty: ProxyType,
}

impl ProxyTypeBuilder {
	/// Overrides `signature` so calls reach the interceptor.
	pub fn intercept(self, signature: MethodSignature) -> Self {
		self.route(Dispatch::Intercept(Arc::new(signature)))
	}

	/// Leaves `signature` inherited so calls reach the original.
	pub fn delegate(self, signature: MethodSignature) -> Self {
		self.route(Dispatch::Delegate(Arc::new(signature)))
	}

	/// Drops the zero-argument constructor, leaving bypass allocation as the
	/// only way to instantiate the type.
	pub fn without_constructor(mut self) -> Self {
		self.ty.constructor = None;
		self
	}

	pub fn build(self) -> ProxyType {
		self.ty
	}

	fn route(mut self, dispatch: Dispatch) -> Self {
		let name = dispatch.signature().name().to_owned();
		match self.ty.by_name.get(&name) {
			Some(&i) => self.ty.methods[i] = dispatch,
			None => {
				self.ty.by_name.insert(name, self.ty.methods.len());
				self.ty.methods.push(dispatch);
			}
		}
		self
	}
}
