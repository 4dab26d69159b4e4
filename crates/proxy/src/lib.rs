//! Proxy objects with selective call interception.
//!
//! [`ProxyFactory::create`] wraps an existing object in a proxy whose
//! filter-selected methods go through an [`Interceptor`]. Proxy types are
//! synthesized once per `(target type, filter)` pair and cached process-wide
//! in [`ProxyTypeCache`].
//!
//! Creation runs in four steps: look the proxy type up (synthesizing it on a
//! miss), allocate a raw instance without running constructors, bind the
//! original object and interceptor, and hand the proxy out.

/// Raw instance allocation.
pub mod allocator;
mod bind;
/// Proxy type cache.
pub mod cache;
/// Factory configuration.
pub mod config;
/// Proxy creation errors.
pub mod error;
mod factory;
/// Method filters.
pub mod filter;
mod instance;
/// The interception contract.
pub mod intercept;
/// Synthesized proxy types.
pub mod proxy_type;
/// Proxy type synthesis.
pub mod synth;

#[cfg(test)]
pub(crate) mod testing;

pub use allocator::{InstanceAllocator, RawProxy};
pub use bind::bind;
pub use cache::ProxyTypeCache;
pub use config::{AllocationMode, ConfigError, ProxyConfig};
pub use error::{ProxyError, SynthesisError};
pub use factory::ProxyFactory;
pub use filter::{AcceptAll, ByName, ExceptNames, MethodFilter, RejectAll, accept_all};
pub use instance::ProxyInstance;
pub use intercept::{Call, Interceptor};
pub use proxy_type::{Dispatch, ProxyType, ProxyTypeBuilder};
pub use synth::{DispatchSynthesizer, Synthesized, TypeSynthesizer};
