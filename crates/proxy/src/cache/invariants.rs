use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use super::ProxyTypeCache;
use crate::filter::{AcceptAll, MethodFilter};
use crate::proxy_type::ProxyType;
use crate::testing::{account_type, filter};

const THREADS: usize = 8;

/// Invariant: racing stores for one key converge on a single proxy type.
///
/// Every store MUST return the entry that ends up cached, whichever thread
/// published it.
pub(crate) fn inv_single_winner_on_racing_store() {
	let cache = ProxyTypeCache::new();
	let target = account_type();
	let accept = filter(AcceptAll);
	let barrier = Barrier::new(THREADS);

	let winners: Vec<Arc<ProxyType>> = thread::scope(|s| {
		let handles: Vec<_> = (0..THREADS)
			.map(|i| {
				let (cache, target, accept, barrier) = (&cache, &target, &accept, &barrier);
				s.spawn(move || {
					let candidate = Arc::new(ProxyType::builder(format!("Account$Race{i}"), target).build());
					barrier.wait();
					cache.store(target, accept, candidate)
				})
			})
			.collect();
		handles.into_iter().map(|h| h.join().unwrap()).collect()
	});

	let cached = cache.lookup(&target, &accept).unwrap();
	assert!(winners.iter().all(|w| Arc::ptr_eq(w, &cached)));
	assert_eq!(cache.len(), 1);
}

#[cfg_attr(test, test)]
pub(crate) fn test_single_winner_on_racing_store() {
	inv_single_winner_on_racing_store()
}

/// Invariant: cache entries never keep a target type alive.
///
/// Once the last strong reference to a target is gone, the target MUST be
/// freed even while its proxy type is cached, and purge MUST reclaim the
/// entry.
pub(crate) fn inv_entries_do_not_pin_target() {
	let cache = ProxyTypeCache::new();
	let target = account_type();
	let accept = filter(AcceptAll);
	let proxy = cache.store(&target, &accept, Arc::new(ProxyType::builder("Account$Pin", &target).build()));

	let weak = Arc::downgrade(&target);
	drop(target);
	assert!(weak.upgrade().is_none(), "cache entry kept the target alive");
	assert!(proxy.target().is_none());

	assert_eq!(cache.len(), 1);
	assert_eq!(cache.purge(), 1);
	assert!(cache.is_empty());
	assert_eq!(cache.purge(), 0);
}

#[cfg_attr(test, test)]
pub(crate) fn test_entries_do_not_pin_target() {
	inv_entries_do_not_pin_target()
}

/// Invariant: a failed synthesis leaves the cache unchanged.
///
/// The error MUST reach the caller, no entry may be stored, and a later
/// request for the same key MUST synthesize again.
pub(crate) fn inv_failed_synthesis_leaves_no_entry() {
	let cache = ProxyTypeCache::new();
	let target = account_type();
	let accept = filter(AcceptAll);

	let err = cache
		.get_or_synthesize(&target, &accept, || Err::<Arc<ProxyType>, _>("boom"))
		.unwrap_err();
	assert_eq!(err, "boom");
	assert!(cache.is_empty());
	assert!(cache.lookup(&target, &accept).is_none());
	assert_eq!(cache.synthesis_count(), 0);

	let ok = cache
		.get_or_synthesize(&target, &accept, || {
			Ok::<_, &str>(Arc::new(ProxyType::builder("Account$Retry", &target).build()))
		})
		.unwrap();
	assert_eq!(ok.name(), "Account$Retry");
	assert_eq!(cache.synthesis_count(), 1);
}

#[cfg_attr(test, test)]
pub(crate) fn test_failed_synthesis_leaves_no_entry() {
	inv_failed_synthesis_leaves_no_entry()
}

/// Invariant: concurrent misses on one key synthesize once.
///
/// All callers MUST observe the same proxy type, and the synthesis closure
/// MUST run exactly once.
pub(crate) fn inv_concurrent_misses_synthesize_once() {
	let cache = ProxyTypeCache::new();
	let target = account_type();
	let accept: Arc<dyn MethodFilter> = filter(AcceptAll);
	let runs = AtomicUsize::new(0);
	let barrier = Barrier::new(THREADS);

	let results: Vec<Arc<ProxyType>> = thread::scope(|s| {
		let handles: Vec<_> = (0..THREADS)
			.map(|_| {
				let (cache, target, accept, runs, barrier) = (&cache, &target, &accept, &runs, &barrier);
				s.spawn(move || {
					barrier.wait();
					cache
						.get_or_synthesize(target, accept, || {
							runs.fetch_add(1, Ordering::SeqCst);
							Ok::<_, ()>(Arc::new(ProxyType::builder("Account$Once", target).build()))
						})
						.unwrap()
				})
			})
			.collect();
		handles.into_iter().map(|h| h.join().unwrap()).collect()
	});

	assert_eq!(runs.load(Ordering::SeqCst), 1);
	assert_eq!(cache.synthesis_count(), 1);
	assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[cfg_attr(test, test)]
pub(crate) fn test_concurrent_misses_synthesize_once() {
	inv_concurrent_misses_synthesize_once()
}
