use std::fmt;
use std::sync::Arc;

use crate::instance::ObjectRef;

/// Static kind of a value slot: a parameter, return type or field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
	/// Accepts any value, including `Null`.
	Any,
	Unit,
	Bool,
	Int,
	Float,
	Str,
	List,
	/// Object reference; `Null` is a valid inhabitant.
	Object,
}

impl ValueKind {
	/// Returns the zero value a freshly allocated slot of this kind holds.
	pub fn zero(self) -> Value {
		match self {
			Self::Any | Self::Object => Value::Null,
			Self::Unit => Value::Unit,
			Self::Bool => Value::Bool(false),
			Self::Int => Value::Int(0),
			Self::Float => Value::Float(0.0),
			Self::Str => Value::Str(String::new()),
			Self::List => Value::List(Vec::new()),
		}
	}

	/// Returns true if `value` may be stored in a slot of this kind.
	pub fn admits(self, value: &Value) -> bool {
		match (self, value) {
			(Self::Any, _) => true,
			(Self::Object, Value::Null | Value::Object(_)) => true,
			(kind, value) => value.kind() == kind,
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Any => "any",
			Self::Unit => "unit",
			Self::Bool => "bool",
			Self::Int => "int",
			Self::Float => "float",
			Self::Str => "str",
			Self::List => "list",
			Self::Object => "object",
		}
	}
}

impl fmt::Display for ValueKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A runtime value passed to and returned from methods.
#[derive(Clone, Default)]
pub enum Value {
	/// Absent object reference.
	#[default]
	Null,
	Unit,
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(String),
	List(Vec<Value>),
	Object(ObjectRef),
}

impl Value {
	/// Returns the kind of this value. `Null` reports [`ValueKind::Object`].
	pub fn kind(&self) -> ValueKind {
		match self {
			Self::Null | Self::Object(_) => ValueKind::Object,
			Self::Unit => ValueKind::Unit,
			Self::Bool(_) => ValueKind::Bool,
			Self::Int(_) => ValueKind::Int,
			Self::Float(_) => ValueKind::Float,
			Self::Str(_) => ValueKind::Str,
			Self::List(_) => ValueKind::List,
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_object(&self) -> Option<&ObjectRef> {
		match self {
			Self::Object(obj) => Some(obj),
			_ => None,
		}
	}

	/// Wraps any object handle as a value.
	pub fn object(obj: ObjectRef) -> Self {
		Self::Object(obj)
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Null, Self::Null) | (Self::Unit, Self::Unit) => true,
			(Self::Bool(a), Self::Bool(b)) => a == b,
			(Self::Int(a), Self::Int(b)) => a == b,
			(Self::Float(a), Self::Float(b)) => a == b,
			(Self::Str(a), Self::Str(b)) => a == b,
			(Self::List(a), Self::List(b)) => a == b,
			// Object equality is identity.
			(Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => f.write_str("null"),
			Self::Unit => f.write_str("()"),
			Self::Bool(v) => write!(f, "{v}"),
			Self::Int(v) => write!(f, "{v}"),
			Self::Float(v) => write!(f, "{v:?}"),
			Self::Str(v) => write!(f, "{v:?}"),
			Self::List(items) => f.debug_list().entries(items).finish(),
			Self::Object(obj) => write!(f, "<{}>", obj.describe()),
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Self::Bool(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Self::Int(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Self::Float(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Self::Str(v.to_owned())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Self::Str(v)
	}
}

impl From<Vec<Value>> for Value {
	fn from(v: Vec<Value>) -> Self {
		Self::List(v)
	}
}
