//! Proxy type synthesis.
//!
//! # Role
//!
//! [`TypeSynthesizer`] is the boundary to whatever turns a target type and a
//! filter into a loadable proxy type. [`DispatchSynthesizer`] is the built-in
//! backend: it builds the dispatch table directly and renders a source
//! listing of the result for diagnostics.
//!
//! # Invariants
//!
//! - A failed synthesis has no side effects; callers may retry freely.
//! - Static and private methods are never overridden, whatever the filter says.

mod render;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use mimic_object::TypeInfo;

use crate::error::SynthesisError;
use crate::filter::MethodFilter;
use crate::proxy_type::ProxyType;

pub use self::render::render_source;

/// Output of one synthesis.
#[derive(Debug)]
pub struct Synthesized {
	pub proxy_type: Arc<ProxyType>,
	/// Source listing of the generated type.
	pub source: String,
	pub type_name: String,
}

/// Produces proxy types. Implementations must not call back into a
/// [`crate::ProxyFactory`]: synthesis runs under the cache-wide lock.
pub trait TypeSynthesizer: Send + Sync {
	fn synthesize(&self, target: &Arc<TypeInfo>, filter: &dyn MethodFilter) -> Result<Synthesized, SynthesisError>;
}

static NEXT_PROXY_SEQ: AtomicU64 = AtomicU64::new(0);

/// Default synthesizer: builds dispatch tables in process.
#[derive(Debug, Clone)]
pub struct DispatchSynthesizer {
	suffix: String,
}

impl Default for DispatchSynthesizer {
	fn default() -> Self {
		Self::new("$Proxy")
	}
}

impl DispatchSynthesizer {
	/// Names generated types `{target}{suffix}{n}`.
	pub fn new(suffix: impl Into<String>) -> Self {
		Self { suffix: suffix.into() }
	}

	fn next_name(&self, target: &str) -> String {
		let seq = NEXT_PROXY_SEQ.fetch_add(1, Ordering::Relaxed);
		format!("{target}{}{seq}", self.suffix)
	}
}

impl TypeSynthesizer for DispatchSynthesizer {
	fn synthesize(&self, target: &Arc<TypeInfo>, filter: &dyn MethodFilter) -> Result<Synthesized, SynthesisError> {
		if target.is_sealed() {
			return Err(SynthesisError::SealedType {
				type_name: target.name().to_owned(),
			});
		}

		let methods = target.methods();
		if !methods.iter().any(|m| m.signature().is_overridable()) {
			return Err(SynthesisError::NoOverridableMethods {
				type_name: target.name().to_owned(),
			});
		}

		let mut plan = Vec::with_capacity(methods.len());
		for m in &methods {
			let sig = m.signature();
			if sig.is_static() || sig.is_private() {
				continue;
			}
			let accepted = filter.accept(sig);
			if accepted && sig.is_final() {
				return Err(SynthesisError::FinalMethod {
					type_name: target.name().to_owned(),
					method: sig.name().to_owned(),
				});
			}
			plan.push((sig.clone(), accepted));
		}

		let type_name = self.next_name(target.name());
		let builder = plan.into_iter().fold(ProxyType::builder(&type_name, target), |b, (sig, accepted)| {
			if accepted { b.intercept(sig) } else { b.delegate(sig) }
		});
		let proxy_type = builder.build();
		let source = render_source(&proxy_type);
		Ok(Synthesized {
			proxy_type: Arc::new(proxy_type),
			source,
			type_name,
		})
	}
}
