use crate::value::{Value, ValueKind};

/// Failure of a single method call.
///
/// Interceptors and method bodies return these; the engine forwards them to
/// the caller unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallError {
	/// The method does not exist on the receiver or is not accessible.
	#[error("no method `{method}` on `{type_name}`")]
	NoSuchMethod { type_name: String, method: String },

	/// A method body referenced a field its type does not declare.
	#[error("no field `{field}` on `{type_name}`")]
	NoSuchField { type_name: String, field: String },

	#[error("`{method}` expects {expected} argument(s), got {got}")]
	Arity {
		method: String,
		expected: usize,
		got: usize,
	},

	#[error("`{method}` argument {index}: expected {expected}, got {got}")]
	ArgumentType {
		method: String,
		index: usize,
		expected: ValueKind,
		got: ValueKind,
	},

	/// A value raised by user code, the dynamic equivalent of a thrown exception.
	#[error("raised {0:?}")]
	Raised(Value),

	#[error("{0}")]
	Failed(String),
}

impl CallError {
	/// Raises `value` as the failure of the current call.
	pub fn raise(value: impl Into<Value>) -> Self {
		Self::Raised(value.into())
	}

	pub fn failed(msg: impl Into<String>) -> Self {
		Self::Failed(msg.into())
	}
}

/// Rejected type definitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
	#[error("type name must not be empty")]
	EmptyName,

	#[error("duplicate method `{method}` on `{type_name}`")]
	DuplicateMethod { type_name: String, method: String },

	#[error("duplicate field `{field}` on `{type_name}`")]
	DuplicateField { type_name: String, field: String },

	#[error("`{type_name}` cannot extend sealed type `{parent}`")]
	ExtendsSealed { type_name: String, parent: String },

	#[error("`{method}` on `{type_name}` overrides a final method of `{parent}`")]
	OverridesFinal {
		type_name: String,
		method: String,
		parent: String,
	},
}
