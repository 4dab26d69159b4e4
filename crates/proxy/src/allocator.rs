//! Raw proxy allocation.
//!
//! Proxies never run the target's constructors in the default
//! [`AllocationMode::Bypass`] mode: the original object was already
//! constructed by its owner, and running its constructor again on the proxy
//! would duplicate side effects or need arguments that are not available.

use std::sync::Arc;

use mimic_object::Fields;

use crate::config::AllocationMode;
use crate::error::ProxyError;
use crate::proxy_type::ProxyType;

/// A proxy allocated but not yet bound. Not an object: it cannot receive calls.
#[derive(Debug)]
pub struct RawProxy {
	pub(crate) ty: Arc<ProxyType>,
	pub(crate) fields: Fields,
}

impl RawProxy {
	pub fn proxy_type(&self) -> &Arc<ProxyType> {
		&self.ty
	}

	pub fn fields(&self) -> &Fields {
		&self.fields
	}
}

/// Produces raw proxy instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceAllocator {
	mode: AllocationMode,
}

impl InstanceAllocator {
	pub fn new(mode: AllocationMode) -> Self {
		Self { mode }
	}

	pub fn mode(&self) -> AllocationMode {
		self.mode
	}

	/// Allocates an instance of `ty` with every field zeroed.
	///
	/// In [`AllocationMode::Constructor`] the proxy type's zero-argument
	/// constructor chain then runs over the fields; a type without one cannot
	/// be allocated.
	pub fn allocate(&self, ty: &Arc<ProxyType>) -> Result<RawProxy, ProxyError> {
		let mut fields = Fields::zeroed(Arc::clone(ty.layout()));
		if self.mode == AllocationMode::Constructor {
			let chain = ty.constructor().ok_or_else(|| ProxyError::AllocationUnsupported {
				type_name: ty.name().to_owned(),
			})?;
			for init in chain {
				init(&mut fields).map_err(|source| ProxyError::Construction {
					type_name: ty.name().to_owned(),
					source,
				})?;
			}
		}
		Ok(RawProxy {
			ty: Arc::clone(ty),
			fields,
		})
	}
}
