use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::{Construction, Initializer, MethodBody, MethodDef, TypeId, TypeInfo};
use crate::error::{CallError, TypeError};
use crate::instance::Instance;
use crate::layout::{FieldDef, Fields, Layout};
use crate::signature::{MethodSignature, Modifiers};
use crate::value::{Value, ValueKind};

/// Incrementally describes a [`TypeInfo`].
///
/// ```
/// use mimic_object::{MethodSignature, TypeInfo, Value, ValueKind};
///
/// let counter = TypeInfo::builder("Counter")
/// 	.field("count", ValueKind::Int)
/// 	.method(MethodSignature::new("bump", &[], ValueKind::Int), |this, _| {
/// 		let next = this.get("count")?.as_int().unwrap_or(0) + 1;
/// 		this.set("count", Value::Int(next))?;
/// 		Ok(Value::Int(next))
/// 	})
/// 	.build()
/// 	.unwrap();
/// assert_eq!(counter.name(), "Counter");
/// ```
pub struct TypeBuilder {
	name: String,
	parent: Option<Arc<TypeInfo>>,
	sealed: bool,
	fields: Vec<FieldDef>,
	methods: Vec<(MethodSignature, MethodBody)>,
	construction: Construction,
}

impl TypeBuilder {
	pub(super) fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			parent: None,
			sealed: false,
			fields: Vec::new(),
			methods: Vec::new(),
			construction: Construction::Implicit,
		}
	}

	/// Derives the type from `parent`, inheriting its fields and methods.
	pub fn extends(mut self, parent: &Arc<TypeInfo>) -> Self {
		self.parent = Some(Arc::clone(parent));
		self
	}

	pub fn sealed(mut self) -> Self {
		self.sealed = true;
		self
	}

	pub fn field(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
		self.fields.push(FieldDef::new(name, kind));
		self
	}

	/// Declares a method; the signature's modifiers are kept as given.
	pub fn method<F>(mut self, signature: MethodSignature, body: F) -> Self
	where
		F: Fn(&Instance, &[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
	{
		self.methods.push((signature, Arc::new(body)));
		self
	}

	pub fn final_method<F>(self, signature: MethodSignature, body: F) -> Self
	where
		F: Fn(&Instance, &[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
	{
		self.method(signature.with_modifiers(Modifiers::FINAL), body)
	}

	pub fn static_method<F>(self, signature: MethodSignature, body: F) -> Self
	where
		F: Fn(&Instance, &[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
	{
		self.method(signature.with_modifiers(Modifiers::STATIC), body)
	}

	pub fn private_method<F>(self, signature: MethodSignature, body: F) -> Self
	where
		F: Fn(&Instance, &[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
	{
		self.method(signature.with_modifiers(Modifiers::PRIVATE), body)
	}

	/// Gives the type a zero-argument constructor body.
	pub fn initializer<F>(mut self, init: F) -> Self
	where
		F: Fn(&mut Fields) -> Result<(), CallError> + Send + Sync + 'static,
	{
		let init: Initializer = Arc::new(init);
		self.construction = Construction::Initializer(init);
		self
	}

	/// Marks the type as only constructible with arguments, through
	/// [`TypeInfo::construct`].
	pub fn parameterized(mut self) -> Self {
		self.construction = Construction::Parameterized;
		self
	}

	pub fn build(self) -> Result<Arc<TypeInfo>, TypeError> {
		if self.name.is_empty() {
			return Err(TypeError::EmptyName);
		}
		if let Some(parent) = &self.parent
			&& parent.is_sealed()
		{
			return Err(TypeError::ExtendsSealed {
				type_name: self.name,
				parent: parent.name().to_owned(),
			});
		}

		let layout = Layout::extend(&self.name, self.parent.as_deref().map(|p| &**p.layout()), &self.fields)
			.map_err(|field| TypeError::DuplicateField {
				type_name: self.name.clone(),
				field,
			})?;

		let mut methods = Vec::with_capacity(self.methods.len());
		let mut by_name = FxHashMap::default();
		for (signature, body) in self.methods {
			if by_name.contains_key(signature.name()) {
				return Err(TypeError::DuplicateMethod {
					type_name: self.name,
					method: signature.name().to_owned(),
				});
			}
			if let Some(inherited) = self.parent.as_ref().and_then(|p| p.resolve(signature.name()))
				&& inherited.signature().is_final()
			{
				return Err(TypeError::OverridesFinal {
					type_name: self.name,
					method: signature.name().to_owned(),
					parent: inherited.signature().declaring_type().to_owned(),
				});
			}
			by_name.insert(signature.name().to_owned(), methods.len());
			methods.push(Arc::new(MethodDef {
				signature: signature.declared_by(&self.name),
				body,
			}));
		}

		Ok(Arc::new(TypeInfo {
			id: TypeId::next(),
			name: self.name,
			parent: self.parent,
			sealed: self.sealed,
			layout: Arc::new(layout),
			methods,
			by_name,
			construction: self.construction,
		}))
	}
}
