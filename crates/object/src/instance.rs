use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::CallError;
use crate::layout::Fields;
use crate::types::TypeInfo;
use crate::value::Value;

/// Anything that can receive method calls by name.
///
/// Plain [`Instance`]s and proxies both implement this, so callers can hold a
/// proxy wherever they held the original.
pub trait Object: Send + Sync {
	/// The type calls on this object dispatch against.
	fn class(&self) -> Arc<TypeInfo>;

	/// Calls `method` with `args`.
	fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, CallError>;

	/// Short label for debugging output.
	fn describe(&self) -> String {
		self.class().name().to_owned()
	}

	fn is_instance_of(&self, ty: &TypeInfo) -> bool {
		self.class().is_subtype_of(ty)
	}
}

/// Shared handle to any object.
pub type ObjectRef = Arc<dyn Object>;

/// An object of a [`TypeInfo`], with its own field storage.
pub struct Instance {
	class: Arc<TypeInfo>,
	fields: RwLock<Fields>,
}

impl Instance {
	pub(crate) fn new(class: Arc<TypeInfo>, fields: Fields) -> Self {
		Self {
			class,
			fields: RwLock::new(fields),
		}
	}

	pub fn class_ref(&self) -> &Arc<TypeInfo> {
		&self.class
	}

	/// Reads a field.
	pub fn get(&self, field: &str) -> Result<Value, CallError> {
		self.fields.read().get(field).cloned()
	}

	/// Writes a field.
	pub fn set(&self, field: &str, value: Value) -> Result<(), CallError> {
		self.fields.write().set(field, value)
	}

	/// Runs `f` with exclusive access to every field.
	///
	/// Use this for read-modify-write sequences that must not interleave with
	/// other callers. `f` must not call back into this instance.
	pub fn update<R>(&self, f: impl FnOnce(&mut Fields) -> Result<R, CallError>) -> Result<R, CallError> {
		f(&mut self.fields.write())
	}

	/// Copies the current field values.
	pub fn snapshot(&self) -> Fields {
		self.fields.read().clone()
	}
}

impl Object for Instance {
	fn class(&self) -> Arc<TypeInfo> {
		Arc::clone(&self.class)
	}

	fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, CallError> {
		let def = self
			.class
			.resolve(method)
			.filter(|def| !def.signature().is_private())
			.ok_or_else(|| CallError::NoSuchMethod {
				type_name: self.class.name().to_owned(),
				method: method.to_owned(),
			})?;
		def.signature().check_args(args)?;
		def.call(self, args)
	}
}

impl fmt::Debug for Instance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let fields = self.fields.read();
		let mut dbg = f.debug_struct(self.class.name());
		for (name, value) in fields.iter() {
			dbg.field(name, value);
		}
		dbg.finish()
	}
}
