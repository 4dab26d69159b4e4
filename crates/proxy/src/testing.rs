//! Shared fixtures for unit tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mimic_object::{CallError, Instance, MethodSignature, TypeInfo, Value, ValueKind};
use parking_lot::Mutex;

use crate::error::SynthesisError;
use crate::filter::MethodFilter;
use crate::intercept::{Call, Interceptor};
use crate::synth::{DispatchSynthesizer, Synthesized, TypeSynthesizer};

/// A bank account: one `balance` field, constructible only with arguments.
///
/// Overridable methods: `balance`, `withdraw`, `deposit`, `to_string`.
/// Also declares a static `currency` and a private `audit`.
pub(crate) fn account_type() -> Arc<TypeInfo> {
	TypeInfo::builder("Account")
		.parameterized()
		.field("balance", ValueKind::Int)
		.method(MethodSignature::new("balance", &[], ValueKind::Int), |this, _| this.get("balance"))
		.method(MethodSignature::new("withdraw", &[ValueKind::Int], ValueKind::Int), |this, args| {
			let amount = args[0].as_int().unwrap_or_default();
			this.update(|fields| {
				let balance = fields.get("balance")?.as_int().unwrap_or_default();
				if amount > balance {
					return Err(CallError::raise("insufficient funds"));
				}
				fields.set("balance", Value::Int(balance - amount))?;
				Ok(Value::Int(balance - amount))
			})
		})
		.method(MethodSignature::new("deposit", &[ValueKind::Int], ValueKind::Int), |this, args| {
			let amount = args[0].as_int().unwrap_or_default();
			this.update(|fields| {
				let balance = fields.get("balance")?.as_int().unwrap_or_default() + amount;
				fields.set("balance", Value::Int(balance))?;
				Ok(Value::Int(balance))
			})
		})
		.method(MethodSignature::new("to_string", &[], ValueKind::Str), |this, _| {
			let balance = this.get("balance")?.as_int().unwrap_or_default();
			Ok(format!("Account(balance={balance})").into())
		})
		.static_method(MethodSignature::new("currency", &[], ValueKind::Str), |_, _| Ok("EUR".into()))
		.private_method(MethodSignature::new("audit", &[], ValueKind::Unit), |_, _| Ok(Value::Unit))
		.build()
		.expect("account type")
}

pub(crate) fn account(ty: &Arc<TypeInfo>, balance: i64) -> Arc<Instance> {
	ty.construct(|fields| fields.set("balance", Value::Int(balance))).expect("account")
}

/// A type with only final, static and private methods.
pub(crate) fn frozen_type() -> Arc<TypeInfo> {
	TypeInfo::builder("Frozen")
		.final_method(MethodSignature::new("id", &[], ValueKind::Int), |_, _| Ok(Value::Int(7)))
		.static_method(MethodSignature::new("make", &[], ValueKind::Unit), |_, _| Ok(Value::Unit))
		.private_method(MethodSignature::new("secret", &[], ValueKind::Unit), |_, _| Ok(Value::Unit))
		.build()
		.expect("frozen type")
}

pub(crate) fn sealed_type() -> Arc<TypeInfo> {
	TypeInfo::builder("Token")
		.sealed()
		.method(MethodSignature::new("value", &[], ValueKind::Str), |_, _| Ok("t".into()))
		.build()
		.expect("sealed type")
}

/// A type with one overridable method and one final method.
pub(crate) fn guarded_type() -> Arc<TypeInfo> {
	TypeInfo::builder("Guarded")
		.method(MethodSignature::new("open", &[], ValueKind::Bool), |_, _| Ok(Value::Bool(true)))
		.final_method(MethodSignature::new("lock", &[], ValueKind::Unit), |_, _| Ok(Value::Unit))
		.build()
		.expect("guarded type")
}

pub(crate) fn filter(f: impl MethodFilter + 'static) -> Arc<dyn MethodFilter> {
	Arc::new(f)
}

/// Records every intercepted call, then forwards it to the original.
#[derive(Default)]
pub(crate) struct Recorder {
	calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl Recorder {
	pub(crate) fn calls(&self) -> Vec<(String, Vec<Value>)> {
		self.calls.lock().clone()
	}

	pub(crate) fn methods(&self) -> Vec<String> {
		self.calls.lock().iter().map(|(m, _)| m.clone()).collect()
	}
}

impl Interceptor for Recorder {
	fn intercept(&self, call: &Call<'_>) -> Result<Value, CallError> {
		self.calls.lock().push((call.method().name().to_owned(), call.args().to_vec()));
		call.invoke_original()
	}
}

/// Counts syntheses while delegating to the dispatch synthesizer.
#[derive(Default)]
pub(crate) struct CountingSynthesizer {
	inner: DispatchSynthesizer,
	runs: AtomicUsize,
}

impl CountingSynthesizer {
	pub(crate) fn runs(&self) -> usize {
		self.runs.load(Ordering::SeqCst)
	}
}

impl TypeSynthesizer for CountingSynthesizer {
	fn synthesize(&self, target: &Arc<TypeInfo>, filter: &dyn MethodFilter) -> Result<Synthesized, SynthesisError> {
		self.runs.fetch_add(1, Ordering::SeqCst);
		self.inner.synthesize(target, filter)
	}
}
