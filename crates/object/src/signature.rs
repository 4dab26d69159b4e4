use std::fmt;

use bitflags::bitflags;

use crate::error::CallError;
use crate::value::{Value, ValueKind};

bitflags! {
	/// Declaration modifiers of a method.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct Modifiers: u8 {
		/// Cannot be overridden by subtypes.
		const FINAL = 1 << 0;
		/// Not dispatched through the receiver's type.
		const STATIC = 1 << 1;
		/// Not reachable from outside the declaring type.
		const PRIVATE = 1 << 2;
	}
}

/// Description of a method as seen by filters and interceptors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
	name: String,
	params: Vec<ValueKind>,
	returns: ValueKind,
	modifiers: Modifiers,
	declaring_type: String,
}

impl MethodSignature {
	pub fn new(name: impl Into<String>, params: &[ValueKind], returns: ValueKind) -> Self {
		Self {
			name: name.into(),
			params: params.to_vec(),
			returns,
			modifiers: Modifiers::empty(),
			declaring_type: String::new(),
		}
	}

	/// Returns the signature with `modifiers` added.
	pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
		self.modifiers |= modifiers;
		self
	}

	pub(crate) fn declared_by(mut self, type_name: &str) -> Self {
		self.declaring_type = type_name.to_owned();
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn params(&self) -> &[ValueKind] {
		&self.params
	}

	pub fn returns(&self) -> ValueKind {
		self.returns
	}

	pub fn modifiers(&self) -> Modifiers {
		self.modifiers
	}

	/// Name of the type that declared this method; empty until the type is built.
	pub fn declaring_type(&self) -> &str {
		&self.declaring_type
	}

	pub fn is_final(&self) -> bool {
		self.modifiers.contains(Modifiers::FINAL)
	}

	pub fn is_static(&self) -> bool {
		self.modifiers.contains(Modifiers::STATIC)
	}

	pub fn is_private(&self) -> bool {
		self.modifiers.contains(Modifiers::PRIVATE)
	}

	/// Returns true if a subtype may replace this method.
	pub fn is_overridable(&self) -> bool {
		!self.modifiers.intersects(Modifiers::FINAL | Modifiers::STATIC | Modifiers::PRIVATE)
	}

	/// Validates `args` against the declared parameter kinds.
	pub fn check_args(&self, args: &[Value]) -> Result<(), CallError> {
		if args.len() != self.params.len() {
			return Err(CallError::Arity {
				method: self.name.clone(),
				expected: self.params.len(),
				got: args.len(),
			});
		}
		for (index, (kind, arg)) in self.params.iter().zip(args).enumerate() {
			if !kind.admits(arg) {
				return Err(CallError::ArgumentType {
					method: self.name.clone(),
					index,
					expected: *kind,
					got: arg.kind(),
				});
			}
		}
		Ok(())
	}
}

impl fmt::Display for MethodSignature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}(", self.name)?;
		for (i, p) in self.params.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{p}")?;
		}
		write!(f, ") -> {}", self.returns)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn display_lists_params_and_return() {
		let sig = MethodSignature::new("transfer", &[ValueKind::Str, ValueKind::Int], ValueKind::Bool);
		assert_eq!(sig.to_string(), "transfer(str, int) -> bool");
	}

	#[test]
	fn final_static_and_private_are_not_overridable() {
		let base = MethodSignature::new("m", &[], ValueKind::Unit);
		assert!(base.is_overridable());
		for m in [Modifiers::FINAL, Modifiers::STATIC, Modifiers::PRIVATE] {
			assert!(!base.clone().with_modifiers(m).is_overridable(), "{m:?}");
		}
	}

	#[test]
	fn check_args_reports_arity_before_types() {
		let sig = MethodSignature::new("withdraw", &[ValueKind::Int], ValueKind::Int);
		assert_eq!(
			sig.check_args(&[]),
			Err(CallError::Arity {
				method: "withdraw".into(),
				expected: 1,
				got: 0,
			})
		);
		assert_eq!(
			sig.check_args(&["ten".into()]),
			Err(CallError::ArgumentType {
				method: "withdraw".into(),
				index: 0,
				expected: ValueKind::Int,
				got: ValueKind::Str,
			})
		);
		assert_eq!(sig.check_args(&[Value::Int(10)]), Ok(()));
	}
}
