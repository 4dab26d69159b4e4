use std::fmt;
use std::sync::Arc;

use mimic_object::{CallError, Fields, Object, ObjectRef, TypeInfo, Value};

use crate::intercept::{Call, Interceptor};
use crate::proxy_type::{Dispatch, ProxyType};

/// A bound proxy object.
///
/// Only [`crate::bind`] creates these, so both slots are always set.
pub struct ProxyInstance {
	ty: Arc<ProxyType>,
	/// Inherited fields. Allocation leaves them zeroed and nothing reads them
	/// for dispatch; state lives in the original object.
	shadow: Fields,
	original: ObjectRef,
	interceptor: Arc<dyn Interceptor>,
}

impl ProxyInstance {
	pub(crate) fn new(ty: Arc<ProxyType>, shadow: Fields, original: ObjectRef, interceptor: Arc<dyn Interceptor>) -> Self {
		Self {
			ty,
			shadow,
			original,
			interceptor,
		}
	}

	pub fn proxy_type(&self) -> &Arc<ProxyType> {
		&self.ty
	}

	pub fn original(&self) -> &ObjectRef {
		&self.original
	}

	pub fn interceptor(&self) -> &Arc<dyn Interceptor> {
		&self.interceptor
	}

	/// Reads an inherited field of the proxy itself, not of the original.
	pub fn shadow_field(&self, name: &str) -> Result<Value, CallError> {
		self.shadow.get(name).cloned()
	}
}

impl Object for ProxyInstance {
	/// Proxies dispatch as their target type.
	fn class(&self) -> Arc<TypeInfo> {
		self.original.class()
	}

	fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, CallError> {
		match self.ty.dispatch(method) {
			Some(Dispatch::Intercept(sig)) => {
				sig.check_args(args)?;
				tracing::trace!(proxy_type = self.ty.name(), method, "intercepting call");
				self.interceptor.intercept(&Call::new(self, sig, args))
			}
			_ => self.original.invoke(method, args),
		}
	}

	fn describe(&self) -> String {
		format!("{} for {}", self.ty.name(), self.original.describe())
	}
}

impl fmt::Debug for ProxyInstance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProxyInstance")
			.field("type", &self.ty.name())
			.field("original", &self.original.describe())
			.finish_non_exhaustive()
	}
}
