use std::fmt::Write as _;

use mimic_object::MethodSignature;

use crate::proxy_type::{Dispatch, ProxyType};

/// Renders a readable listing of `ty`.
///
/// ```text
/// proxy Account$Proxy0 : Account {
/// 	slot original: Account
/// 	slot interceptor: Interceptor
/// 	field balance: int
///
/// 	intercept withdraw(a0: int) -> int
/// 	delegate to_string() -> str
///
/// 	init none
/// }
/// ```
pub fn render_source(ty: &ProxyType) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "proxy {} : {} {{", ty.name(), ty.target_name());
	let _ = writeln!(out, "\tslot original: {}", ty.target_name());
	let _ = writeln!(out, "\tslot interceptor: Interceptor");
	for field in ty.layout().fields() {
		let _ = writeln!(out, "\tfield {}: {}", field.name, field.kind);
	}

	if !ty.methods().is_empty() {
		out.push('\n');
	}
	for dispatch in ty.methods() {
		let verb = match dispatch {
			Dispatch::Intercept(_) => "intercept",
			Dispatch::Delegate(_) => "delegate",
		};
		let _ = writeln!(out, "\t{verb} {}", method_head(dispatch.signature()));
	}

	out.push('\n');
	match ty.constructor() {
		Some(chain) if chain.is_empty() => out.push_str("\tinit implicit\n"),
		Some(chain) => {
			let _ = writeln!(out, "\tinit chain({})", chain.len());
		}
		None => out.push_str("\tinit none\n"),
	}
	out.push('}');
	out.push('\n');
	out
}

fn method_head(sig: &MethodSignature) -> String {
	let params: Vec<String> = sig.params().iter().enumerate().map(|(i, k)| format!("a{i}: {k}")).collect();
	format!("{}({}) -> {}", sig.name(), params.join(", "), sig.returns())
}
