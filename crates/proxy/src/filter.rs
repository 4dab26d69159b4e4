//! Method selection for interception.
//!
//! A filter is part of the cache key by identity: two filters that accept the
//! same methods still produce two proxy types. Filters must answer the same
//! way for the same signature every time.

use std::sync::{Arc, LazyLock};

use mimic_object::MethodSignature;
use rustc_hash::FxHashSet;

/// Decides which methods a proxy intercepts.
pub trait MethodFilter: Send + Sync {
	fn accept(&self, method: &MethodSignature) -> bool;
}

impl<F> MethodFilter for F
where
	F: Fn(&MethodSignature) -> bool + Send + Sync,
{
	fn accept(&self, method: &MethodSignature) -> bool {
		self(method)
	}
}

/// Intercepts every method.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl MethodFilter for AcceptAll {
	fn accept(&self, _: &MethodSignature) -> bool {
		true
	}
}

/// Intercepts nothing; the proxy forwards every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAll;

impl MethodFilter for RejectAll {
	fn accept(&self, _: &MethodSignature) -> bool {
		false
	}
}

/// Intercepts only the listed method names.
#[derive(Debug, Clone, Default)]
pub struct ByName(FxHashSet<String>);

impl ByName {
	pub fn new<I, S>(names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self(names.into_iter().map(Into::into).collect())
	}
}

impl MethodFilter for ByName {
	fn accept(&self, method: &MethodSignature) -> bool {
		self.0.contains(method.name())
	}
}

/// Intercepts everything except the listed method names.
#[derive(Debug, Clone, Default)]
pub struct ExceptNames(FxHashSet<String>);

impl ExceptNames {
	pub fn new<I, S>(names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self(names.into_iter().map(Into::into).collect())
	}
}

impl MethodFilter for ExceptNames {
	fn accept(&self, method: &MethodSignature) -> bool {
		!self.0.contains(method.name())
	}
}

static ACCEPT_ALL: LazyLock<Arc<dyn MethodFilter>> = LazyLock::new(|| Arc::new(AcceptAll));

/// The process-wide accept-all filter used by factories without an explicit
/// filter, so that they share cache entries.
pub fn accept_all() -> Arc<dyn MethodFilter> {
	Arc::clone(&ACCEPT_ALL)
}
