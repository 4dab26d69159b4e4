use mimic_object::CallError;

/// Reasons a proxy type cannot be synthesized for a target type.
///
/// Never cached: a later request for the same pair retries synthesis.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
	#[error("`{type_name}` is sealed and cannot be proxied")]
	SealedType { type_name: String },

	#[error("`{type_name}` has no overridable methods")]
	NoOverridableMethods { type_name: String },

	/// The filter selected a method the target type declares final.
	#[error("cannot intercept final method `{method}` of `{type_name}`")]
	FinalMethod { type_name: String, method: String },

	/// The synthesis backend refused the generated definition.
	#[error("synthesis of `{type_name}` rejected: {reason}")]
	Rejected { type_name: String, reason: String },
}

/// Failures of proxy creation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProxyError {
	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	#[error(transparent)]
	Synthesis(#[from] SynthesisError),

	/// Bypass allocation is unavailable and the proxy type has no
	/// zero-argument constructor.
	#[error("cannot allocate `{type_name}`: no bypass allocation and no zero-argument constructor")]
	AllocationUnsupported { type_name: String },

	/// The zero-argument constructor used in place of bypass allocation failed.
	#[error("constructor of `{type_name}` failed: {source}")]
	Construction { type_name: String, source: CallError },
}

/// Result type for proxy creation.
pub type Result<T> = std::result::Result<T, ProxyError>;
