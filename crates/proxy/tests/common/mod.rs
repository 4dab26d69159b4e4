#![allow(dead_code)]

use std::sync::Arc;

use mimic_object::{CallError, Instance, MethodSignature, TypeInfo, Value, ValueKind};
use mimic_proxy::{Call, Interceptor, MethodFilter, ProxyFactory, ProxyTypeCache};
use parking_lot::Mutex;

pub fn account_type() -> Arc<TypeInfo> {
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
		.method(MethodSignature::new("to_string", &[], ValueKind::Str), |this, _| {
			let balance = this.get("balance")?.as_int().unwrap_or_default();
			Ok(format!("Account(balance={balance})").into())
		})
		.build()
		.unwrap()
}

pub fn account(ty: &Arc<TypeInfo>, balance: i64) -> Arc<Instance> {
	ty.construct(|fields| fields.set("balance", Value::Int(balance))).unwrap()
}

pub fn balance_of(obj: &Instance) -> i64 {
	obj.get("balance").unwrap().as_int().unwrap()
}

/// A factory on its own cache, isolated from other tests.
pub fn isolated_factory() -> ProxyFactory {
	ProxyFactory::new().with_cache(Arc::new(ProxyTypeCache::new()))
}

pub fn filter(f: impl MethodFilter + 'static) -> Arc<dyn MethodFilter> {
	Arc::new(f)
}

/// Records intercepted calls and forwards them to the original.
#[derive(Default)]
pub struct Recorder {
	calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl Recorder {
	pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
		self.calls.lock().clone()
	}
}

impl Interceptor for Recorder {
	fn intercept(&self, call: &Call<'_>) -> Result<Value, CallError> {
		self.calls.lock().push((call.method().name().to_owned(), call.args().to_vec()));
		call.invoke_original()
	}
}
