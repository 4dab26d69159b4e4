//! The interception contract.
//!
//! Every call to an overridden method becomes one [`Interceptor::intercept`]
//! call with a [`Call`] describing it. Whatever the interceptor returns, value
//! or error, is the result of the proxied call.

use mimic_object::{CallError, MethodSignature, ObjectRef, Value};

use crate::instance::ProxyInstance;

/// Caller-supplied handler for intercepted calls.
pub trait Interceptor: Send + Sync {
	fn intercept(&self, call: &Call<'_>) -> Result<Value, CallError>;
}

impl<F> Interceptor for F
where
	F: Fn(&Call<'_>) -> Result<Value, CallError> + Send + Sync,
{
	fn intercept(&self, call: &Call<'_>) -> Result<Value, CallError> {
		self(call)
	}
}

/// One intercepted call.
pub struct Call<'a> {
	proxy: &'a ProxyInstance,
	method: &'a MethodSignature,
	args: &'a [Value],
}

impl<'a> Call<'a> {
	pub(crate) fn new(proxy: &'a ProxyInstance, method: &'a MethodSignature, args: &'a [Value]) -> Self {
		Self { proxy, method, args }
	}

	pub fn method(&self) -> &'a MethodSignature {
		self.method
	}

	/// Arguments as passed by the caller, already checked against the signature.
	pub fn args(&self) -> &'a [Value] {
		self.args
	}

	/// The proxy the call was made on.
	pub fn proxy(&self) -> &'a ProxyInstance {
		self.proxy
	}

	/// The object the proxy stands in for.
	pub fn original(&self) -> &'a ObjectRef {
		self.proxy.original()
	}

	/// Runs the original method on the original object with the caller's
	/// arguments. May be called any number of times.
	pub fn invoke_original(&self) -> Result<Value, CallError> {
		self.invoke_original_with(self.args)
	}

	/// Runs the original method with replacement arguments.
	pub fn invoke_original_with(&self, args: &[Value]) -> Result<Value, CallError> {
		self.original().invoke(self.method.name(), args)
	}
}

impl std::fmt::Debug for Call<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Call")
			.field("proxy", &self.proxy.proxy_type().name())
			.field("method", &self.method.name())
			.field("args", &self.args)
			.finish()
	}
}
