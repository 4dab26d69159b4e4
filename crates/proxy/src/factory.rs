//! Proxy creation entry point.

use std::sync::Arc;

use mimic_object::{ObjectRef, TypeInfo, Value};
use parking_lot::Mutex;

use crate::allocator::InstanceAllocator;
use crate::bind::bind;
use crate::cache::ProxyTypeCache;
use crate::config::ProxyConfig;
use crate::error::{ProxyError, Result};
use crate::filter::{MethodFilter, accept_all};
use crate::instance::ProxyInstance;
use crate::intercept::Interceptor;
use crate::proxy_type::ProxyType;
use crate::synth::{DispatchSynthesizer, Synthesized, TypeSynthesizer};

/// Most recent synthesis output kept for debugging.
#[derive(Debug, Default)]
struct LastGenerated {
	source: Option<String>,
	type_name: Option<String>,
}

/// Creates proxies that route selected methods through an interceptor.
///
/// ```
/// use std::sync::Arc;
///
/// use mimic_object::{CallError, MethodSignature, Object, ObjectRef, TypeInfo, Value, ValueKind};
/// use mimic_proxy::{Call, ProxyFactory};
///
/// let greeter = TypeInfo::builder("Greeter")
/// 	.method(MethodSignature::new("greet", &[ValueKind::Str], ValueKind::Str), |_, args| {
/// 		Ok(format!("hello {}", args[0].as_str().unwrap_or_default()).into())
/// 	})
/// 	.build()
/// 	.unwrap();
/// let original: ObjectRef = greeter.instantiate().unwrap();
///
/// let shout = Arc::new(|call: &Call<'_>| -> Result<Value, CallError> {
/// 	let out = call.invoke_original()?;
/// 	Ok(Value::from(out.as_str().unwrap_or_default().to_uppercase()))
/// });
/// let proxy = ProxyFactory::new().create(original, shout).unwrap();
/// assert_eq!(proxy.invoke("greet", &["bob".into()]), Ok("HELLO BOB".into()));
/// ```
pub struct ProxyFactory {
	cache: Arc<ProxyTypeCache>,
	synthesizer: Arc<dyn TypeSynthesizer>,
	filter: Arc<dyn MethodFilter>,
	allocator: InstanceAllocator,
	record_source: bool,
	last: Mutex<LastGenerated>,
}

impl Default for ProxyFactory {
	fn default() -> Self {
		Self::new()
	}
}

impl ProxyFactory {
	/// A factory on the global cache with the default configuration and the
	/// shared accept-all filter.
	pub fn new() -> Self {
		Self::with_config(ProxyConfig::default())
	}

	pub fn with_config(config: ProxyConfig) -> Self {
		Self {
			cache: ProxyTypeCache::global(),
			synthesizer: Arc::new(DispatchSynthesizer::new(config.type_name_suffix)),
			filter: accept_all(),
			allocator: InstanceAllocator::new(config.allocation),
			record_source: config.record_source,
			last: Mutex::new(LastGenerated::default()),
		}
	}

	/// Uses `cache` instead of the global cache.
	pub fn with_cache(mut self, cache: Arc<ProxyTypeCache>) -> Self {
		self.cache = cache;
		self
	}

	/// Replaces the synthesis backend.
	///
	/// The cache key does not include the synthesizer: factories sharing a
	/// cache should share a synthesizer too.
	pub fn with_synthesizer(mut self, synthesizer: Arc<dyn TypeSynthesizer>) -> Self {
		self.synthesizer = synthesizer;
		self
	}

	pub fn with_filter(mut self, filter: Arc<dyn MethodFilter>) -> Self {
		self.filter = filter;
		self
	}

	/// Selects the methods later proxies intercept.
	pub fn set_filter(&mut self, filter: Arc<dyn MethodFilter>) {
		self.filter = filter;
	}

	pub fn filter(&self) -> &Arc<dyn MethodFilter> {
		&self.filter
	}

	pub fn cache(&self) -> &Arc<ProxyTypeCache> {
		&self.cache
	}

	pub fn allocator(&self) -> InstanceAllocator {
		self.allocator
	}

	/// Creates a proxy standing in for `original`.
	///
	/// Calls to methods accepted by the filter reach `interceptor`; all other
	/// calls go straight to `original`. May block while another thread
	/// synthesizes a proxy type for any key.
	pub fn create(&self, original: ObjectRef, interceptor: Arc<dyn Interceptor>) -> Result<Arc<ProxyInstance>> {
		let target = original.class();
		let ty = self.create_class(&target)?;
		let raw = self.allocator.allocate(&ty)?;
		let proxy = bind(raw, original, interceptor)?;
		tracing::trace!(proxy_type = ty.name(), "proxy created");
		Ok(Arc::new(proxy))
	}

	/// Like [`Self::create`], for inputs that may be absent.
	///
	/// Fails with [`ProxyError::InvalidArgument`] if `original` is not an
	/// object or `interceptor` is `None`.
	pub fn create_for_value(
		&self,
		original: &Value,
		interceptor: Option<Arc<dyn Interceptor>>,
	) -> Result<Arc<ProxyInstance>> {
		let Some(object) = original.as_object() else {
			return Err(ProxyError::InvalidArgument(format!(
				"original must be an object, got {}",
				original.kind()
			)));
		};
		let Some(interceptor) = interceptor else {
			return Err(ProxyError::InvalidArgument("interceptor is absent".to_owned()));
		};
		self.create(Arc::clone(object), interceptor)
	}

	/// Returns the proxy type for `target` under the current filter,
	/// synthesizing and caching it if needed. Use it to warm the cache.
	pub fn create_class(&self, target: &Arc<TypeInfo>) -> Result<Arc<ProxyType>> {
		self.cache.get_or_synthesize(target, &self.filter, || {
			let out = self.synthesizer.synthesize(target, &*self.filter)?;
			tracing::debug!(
				target_type = target.name(),
				proxy_type = %out.type_name,
				intercepted = out.proxy_type.intercepted().count(),
				"proxy type synthesized"
			);
			self.record(&out);
			Ok::<_, ProxyError>(out.proxy_type)
		})
	}

	/// Source listing of the type this factory synthesized last.
	///
	/// Best effort: cache hits do not update it, and concurrent use of the
	/// factory may interleave. Use a fresh factory per proxy type when the
	/// listing matters.
	pub fn last_generated_source(&self) -> Option<String> {
		self.last.lock().source.clone()
	}

	/// Name of the type this factory synthesized last. Same caveats as
	/// [`Self::last_generated_source`].
	pub fn last_generated_type_name(&self) -> Option<String> {
		self.last.lock().type_name.clone()
	}

	fn record(&self, out: &Synthesized) {
		let mut last = self.last.lock();
		last.type_name = Some(out.type_name.clone());
		last.source = self.record_source.then(|| out.source.clone());
	}
}

impl std::fmt::Debug for ProxyFactory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ProxyFactory")
			.field("cache", &self.cache)
			.field("allocator", &self.allocator)
			.field("record_source", &self.record_source)
			.finish_non_exhaustive()
	}
}
