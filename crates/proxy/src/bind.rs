use std::sync::Arc;

use mimic_object::ObjectRef;

use crate::allocator::RawProxy;
use crate::error::ProxyError;
use crate::instance::ProxyInstance;
use crate::intercept::Interceptor;

/// Attaches the original object and interceptor to a raw proxy.
///
/// Consumes the raw proxy, so no caller ever sees a half-bound instance.
/// `original` must be an instance of the proxy's target type.
pub fn bind(raw: RawProxy, original: ObjectRef, interceptor: Arc<dyn Interceptor>) -> Result<ProxyInstance, ProxyError> {
	let fits = raw.ty.target().is_some_and(|target| original.is_instance_of(&target));
	if !fits {
		return Err(ProxyError::InvalidArgument(format!(
			"`{}` cannot back a proxy of `{}`",
			original.describe(),
			raw.ty.target_name()
		)));
	}
	Ok(ProxyInstance::new(raw.ty, raw.fields, original, interceptor))
}
