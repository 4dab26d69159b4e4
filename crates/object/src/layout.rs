//! Field layouts and per-instance field storage.
//!
//! A [`Layout`] is shared between a type and everything derived from it (its
//! instances, subtypes and proxy types), so it must not reference the type
//! itself.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::CallError;
use crate::value::{Value, ValueKind};

/// One declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
	pub name: String,
	pub kind: ValueKind,
}

impl FieldDef {
	pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
		Self {
			name: name.into(),
			kind,
		}
	}
}

/// Ordered field layout of a type, parent fields first.
#[derive(Debug, Default)]
pub struct Layout {
	type_name: String,
	fields: Vec<FieldDef>,
	index: FxHashMap<String, usize>,
}

impl Layout {
	/// Extends `parent` (if any) with `own` fields.
	///
	/// Returns the name of the first duplicated field on collision.
	pub(crate) fn extend(type_name: &str, parent: Option<&Layout>, own: &[FieldDef]) -> Result<Self, String> {
		let mut fields = parent.map(|p| p.fields.clone()).unwrap_or_default();
		let mut index = parent.map(|p| p.index.clone()).unwrap_or_default();
		for def in own {
			if index.contains_key(&def.name) {
				return Err(def.name.clone());
			}
			index.insert(def.name.clone(), fields.len());
			fields.push(def.clone());
		}
		Ok(Self {
			type_name: type_name.to_owned(),
			fields,
			index,
		})
	}

	/// Name of the type this layout was built for.
	pub fn type_name(&self) -> &str {
		&self.type_name
	}

	pub fn fields(&self) -> &[FieldDef] {
		&self.fields
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	pub fn position(&self, name: &str) -> Option<usize> {
		self.index.get(name).copied()
	}
}

/// Field values of one object, laid out by a shared [`Layout`].
#[derive(Debug, Clone)]
pub struct Fields {
	layout: Arc<Layout>,
	values: Vec<Value>,
}

impl Fields {
	/// Every field at the zero value of its kind.
	pub fn zeroed(layout: Arc<Layout>) -> Self {
		let values = layout.fields.iter().map(|f| f.kind.zero()).collect();
		Self { layout, values }
	}

	pub fn layout(&self) -> &Arc<Layout> {
		&self.layout
	}

	pub fn get(&self, name: &str) -> Result<&Value, CallError> {
		let idx = self.slot(name)?;
		Ok(&self.values[idx])
	}

	/// Stores `value` in `name`, rejecting values the field's kind does not admit.
	pub fn set(&mut self, name: &str, value: Value) -> Result<(), CallError> {
		let idx = self.slot(name)?;
		let kind = self.layout.fields[idx].kind;
		if !kind.admits(&value) {
			return Err(CallError::failed(format!(
				"field `{name}` of `{}` holds {kind}, got {}",
				self.layout.type_name,
				value.kind()
			)));
		}
		self.values[idx] = value;
		Ok(())
	}

	/// Iterates `(name, value)` pairs in layout order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.layout.fields.iter().map(|f| f.name.as_str()).zip(&self.values)
	}

	fn slot(&self, name: &str) -> Result<usize, CallError> {
		self.layout.position(name).ok_or_else(|| CallError::NoSuchField {
			type_name: self.layout.type_name.clone(),
			field: name.to_owned(),
		})
	}
}
