use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::error::TypeError;
use crate::instance::Object;
use crate::value::ValueKind;

fn sig(name: &str, params: &[ValueKind], returns: ValueKind) -> MethodSignature {
	MethodSignature::new(name, params, returns)
}

fn account() -> Arc<TypeInfo> {
	TypeInfo::builder("Account")
		.field("balance", ValueKind::Int)
		.parameterized()
		.method(sig("balance", &[], ValueKind::Int), |this, _| this.get("balance"))
		.method(sig("withdraw", &[ValueKind::Int], ValueKind::Int), |this, args| {
			let amount = args[0].as_int().unwrap_or(0);
			this.update(|f| {
				let next = f.get("balance")?.as_int().unwrap_or(0) - amount;
				f.set("balance", Value::Int(next))?;
				Ok(Value::Int(next))
			})
		})
		.build()
		.unwrap()
}

#[test]
fn test_invoke_runs_body_against_instance() {
	let ty = account();
	let acct = ty.construct(|f| f.set("balance", Value::Int(100))).unwrap();
	assert_eq!(acct.invoke("withdraw", &[Value::Int(30)]), Ok(Value::Int(70)));
	assert_eq!(acct.invoke("balance", &[]), Ok(Value::Int(70)));
}

#[test]
fn test_invoke_validates_arguments() {
	let acct = account().construct(|_| Ok(())).unwrap();
	assert!(matches!(acct.invoke("withdraw", &[]), Err(CallError::Arity { .. })));
	assert!(matches!(
		acct.invoke("withdraw", &["x".into()]),
		Err(CallError::ArgumentType { .. })
	));
	assert!(matches!(acct.invoke("deposit", &[]), Err(CallError::NoSuchMethod { .. })));
}

#[test]
fn test_private_methods_are_not_invocable() {
	let ty = TypeInfo::builder("Vault")
		.private_method(sig("secret", &[], ValueKind::Str), |_, _| Ok("shh".into()))
		.build()
		.unwrap();
	let vault = ty.instantiate().unwrap();
	assert_eq!(
		vault.invoke("secret", &[]),
		Err(CallError::NoSuchMethod {
			type_name: "Vault".into(),
			method: "secret".into(),
		})
	);
}

#[test]
fn test_override_keeps_parent_position() {
	let base = TypeInfo::builder("Base")
		.method(sig("a", &[], ValueKind::Int), |_, _| Ok(Value::Int(1)))
		.method(sig("b", &[], ValueKind::Int), |_, _| Ok(Value::Int(2)))
		.build()
		.unwrap();
	let derived = TypeInfo::builder("Derived")
		.extends(&base)
		.method(sig("c", &[], ValueKind::Int), |_, _| Ok(Value::Int(3)))
		.method(sig("a", &[], ValueKind::Int), |_, _| Ok(Value::Int(10)))
		.build()
		.unwrap();

	let names: Vec<_> = derived
		.methods()
		.iter()
		.map(|m| format!("{}::{}", m.signature().declaring_type(), m.name()))
		.collect();
	assert_eq!(names, vec!["Derived::a", "Base::b", "Derived::c"]);

	let obj = derived.instantiate().unwrap();
	assert_eq!(obj.invoke("a", &[]), Ok(Value::Int(10)));
	assert_eq!(obj.invoke("b", &[]), Ok(Value::Int(2)));
	assert!(derived.is_subtype_of(&base));
	assert!(!base.is_subtype_of(&derived));
}

#[test]
fn test_build_rejects_invalid_definitions() {
	let sealed = TypeInfo::builder("Sealed").sealed().build().unwrap();
	assert_eq!(
		TypeInfo::builder("Sub").extends(&sealed).build().unwrap_err(),
		TypeError::ExtendsSealed {
			type_name: "Sub".into(),
			parent: "Sealed".into(),
		}
	);

	let dup = TypeInfo::builder("Dup")
		.method(sig("m", &[], ValueKind::Unit), |_, _| Ok(Value::Unit))
		.method(sig("m", &[ValueKind::Int], ValueKind::Unit), |_, _| Ok(Value::Unit))
		.build();
	assert!(matches!(dup, Err(TypeError::DuplicateMethod { .. })));

	let base = TypeInfo::builder("Base")
		.final_method(sig("id", &[], ValueKind::Int), |_, _| Ok(Value::Int(0)))
		.build()
		.unwrap();
	let over = TypeInfo::builder("Over")
		.extends(&base)
		.method(sig("id", &[], ValueKind::Int), |_, _| Ok(Value::Int(1)))
		.build();
	assert_eq!(
		over.unwrap_err(),
		TypeError::OverridesFinal {
			type_name: "Over".into(),
			method: "id".into(),
			parent: "Base".into(),
		}
	);

	assert_eq!(TypeInfo::builder("").build().unwrap_err(), TypeError::EmptyName);
}

#[test]
fn test_instantiate_runs_initializers_root_first() {
	let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
	let o1 = Arc::clone(&order);
	let base = TypeInfo::builder("Base")
		.field("x", ValueKind::Int)
		.initializer(move |f| {
			o1.lock().push("base");
			f.set("x", Value::Int(1))
		})
		.build()
		.unwrap();
	let o2 = Arc::clone(&order);
	let derived = TypeInfo::builder("Derived")
		.extends(&base)
		.initializer(move |f| {
			o2.lock().push("derived");
			let x = f.get("x")?.as_int().unwrap_or(0);
			f.set("x", Value::Int(x * 10))
		})
		.build()
		.unwrap();

	let obj = derived.instantiate().unwrap();
	assert_eq!(*order.lock(), vec!["base", "derived"]);
	assert_eq!(obj.get("x"), Ok(Value::Int(10)));
}

#[test]
fn test_allocate_zeroed_skips_initializers() {
	let runs = Arc::new(AtomicUsize::new(0));
	let r = Arc::clone(&runs);
	let ty = TypeInfo::builder("Counted")
		.field("n", ValueKind::Int)
		.initializer(move |f| {
			r.fetch_add(1, Ordering::SeqCst);
			f.set("n", Value::Int(5))
		})
		.build()
		.unwrap();
	let obj = ty.allocate_zeroed();
	assert_eq!(runs.load(Ordering::SeqCst), 0);
	assert_eq!(obj.get("n"), Ok(Value::Int(0)));
}

#[test]
fn test_parameterized_chain_has_no_zero_arg_constructor() {
	let base = account();
	let derived = TypeInfo::builder("Savings").extends(&base).build().unwrap();
	assert!(derived.zero_arg_constructor().is_none());
	assert!(derived.instantiate().is_err());
}

#[test]
fn test_type_ids_are_unique() {
	let a = account();
	let b = account();
	assert_ne!(a.id(), b.id());
	assert!(!a.is_subtype_of(&b));
}

proptest! {
	#[test]
	fn methods_lists_each_name_once(names in proptest::collection::hash_set("[a-z]{1,6}", 1..8), split in 0usize..8) {
		let names: Vec<String> = names.into_iter().collect();
		let cut = split.min(names.len());
		let mut base = TypeInfo::builder("Base");
		for n in &names {
			base = base.method(sig(n, &[], ValueKind::Unit), |_, _| Ok(Value::Unit));
		}
		let base = base.build().unwrap();
		let mut derived = TypeInfo::builder("Derived").extends(&base);
		for n in &names[..cut] {
			derived = derived.method(sig(n, &[], ValueKind::Unit), |_, _| Ok(Value::Unit));
		}
		let derived = derived.build().unwrap();

		let listed: Vec<String> = derived.methods().iter().map(|m| m.name().to_owned()).collect();
		prop_assert_eq!(&listed, &names);
		for m in derived.methods() {
			let expected = if names[..cut].contains(&m.name().to_owned()) { "Derived" } else { "Base" };
			prop_assert_eq!(m.signature().declaring_type(), expected);
		}
	}
}
