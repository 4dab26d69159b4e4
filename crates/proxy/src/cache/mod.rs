//! Cache of synthesized proxy types.
//!
//! # Role
//!
//! Maps `(target type, filter)` to the proxy type synthesized for that pair.
//! Reads load an immutable snapshot and never block; stores publish a new
//! snapshot with a CAS loop. The miss-synthesize-store sequence runs under
//! one cache-wide lock.
//!
//! # Invariants
//!
//! - At most one proxy type is reachable per live key pair (see
//!   `invariants::test_single_winner_on_racing_store`).
//! - Entries hold both key components weakly and never keep a target type
//!   alive (see `invariants::test_entries_do_not_pin_target`).
//! - A failed synthesis leaves the cache unchanged (see
//!   `invariants::test_failed_synthesis_leaves_no_entry`).
//! - Concurrent misses on one key synthesize once (see
//!   `invariants::test_concurrent_misses_synthesize_once`).
//!
//! # Contention
//!
//! The synthesis lock is not per key: a miss on any key waits for every
//! synthesis in progress. Synthesis is rare compared to lookups, which stay
//! lock-free.

#[cfg(test)]
mod invariants;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Weak};

use arc_swap::ArcSwap;
use mimic_object::TypeInfo;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::filter::MethodFilter;
use crate::proxy_type::ProxyType;

/// Allocation address of a key component.
///
/// Entries keep a `Weak` to each component, which keeps the allocation from
/// being reused, so an equal address always means the same component.
type KeyAddr = usize;

fn type_addr(target: &Arc<TypeInfo>) -> KeyAddr {
	Arc::as_ptr(target) as KeyAddr
}

fn filter_addr(filter: &Arc<dyn MethodFilter>) -> KeyAddr {
	Arc::as_ptr(filter) as *const () as KeyAddr
}

#[derive(Clone)]
struct FilterEntry {
	filter: Weak<dyn MethodFilter>,
	proxy: Arc<ProxyType>,
}

#[derive(Clone)]
struct TypeEntry {
	target: Weak<TypeInfo>,
	by_filter: FxHashMap<KeyAddr, FilterEntry>,
}

#[derive(Clone, Default)]
struct Snapshot {
	by_type: FxHashMap<KeyAddr, TypeEntry>,
}

impl Snapshot {
	fn find(&self, target: &Arc<TypeInfo>, filter: &Arc<dyn MethodFilter>) -> Option<&Arc<ProxyType>> {
		let entry = self.by_type.get(&type_addr(target))?;
		debug_assert!(entry.target.strong_count() > 0);
		entry.by_filter.get(&filter_addr(filter)).map(|e| &e.proxy)
	}

	fn len(&self) -> usize {
		self.by_type.values().map(|e| e.by_filter.len()).sum()
	}

	/// Drops entries whose target or filter has been reclaimed.
	fn retain_live(&mut self) -> usize {
		let before = self.len();
		self.by_type.retain(|_, entry| {
			if entry.target.strong_count() == 0 {
				return false;
			}
			entry.by_filter.retain(|_, e| e.filter.strong_count() > 0);
			!entry.by_filter.is_empty()
		});
		before - self.len()
	}

	fn has_dead(&self) -> bool {
		self.by_type.values().any(|entry| {
			entry.target.strong_count() == 0 || entry.by_filter.values().any(|e| e.filter.strong_count() == 0)
		})
	}
}

static GLOBAL: LazyLock<Arc<ProxyTypeCache>> = LazyLock::new(|| Arc::new(ProxyTypeCache::new()));

/// Two-level cache from target type and filter to proxy type.
pub struct ProxyTypeCache {
	snap: ArcSwap<Snapshot>,
	synthesis: Mutex<()>,
	syntheses: AtomicU64,
}

impl Default for ProxyTypeCache {
	fn default() -> Self {
		Self::new()
	}
}

impl ProxyTypeCache {
	pub fn new() -> Self {
		Self {
			snap: ArcSwap::from_pointee(Snapshot::default()),
			synthesis: Mutex::new(()),
			syntheses: AtomicU64::new(0),
		}
	}

	/// The process-wide cache shared by factories that do not bring their own.
	pub fn global() -> Arc<ProxyTypeCache> {
		Arc::clone(&GLOBAL)
	}

	/// Returns the cached proxy type for the pair. Never synthesizes.
	pub fn lookup(&self, target: &Arc<TypeInfo>, filter: &Arc<dyn MethodFilter>) -> Option<Arc<ProxyType>> {
		self.snap.load().find(target, filter).cloned()
	}

	/// Inserts `proxy` for the pair unless an entry exists, and returns the
	/// entry that ends up cached.
	///
	/// When another store won the race, its proxy type is returned and
	/// `proxy` is discarded.
	pub fn store(
		&self,
		target: &Arc<TypeInfo>,
		filter: &Arc<dyn MethodFilter>,
		proxy: Arc<ProxyType>,
	) -> Arc<ProxyType> {
		loop {
			let old = self.snap.load_full();

			if let Some(existing) = old.find(target, filter) {
				if !Arc::ptr_eq(existing, &proxy) {
					tracing::warn!(
						target_type = target.name(),
						kept = existing.name(),
						discarded = proxy.name(),
						"duplicate proxy type discarded"
					);
				}
				return Arc::clone(existing);
			}

			let mut next = Snapshot::clone(&old);
			let reclaimed = next.retain_live();
			next.by_type
				.entry(type_addr(target))
				.or_insert_with(|| TypeEntry {
					target: Arc::downgrade(target),
					by_filter: FxHashMap::default(),
				})
				.by_filter
				.insert(
					filter_addr(filter),
					FilterEntry {
						filter: Arc::downgrade(filter),
						proxy: Arc::clone(&proxy),
					},
				);

			let next = Arc::new(next);
			let prev = self.snap.compare_and_swap(&old, Arc::clone(&next));
			if Arc::ptr_eq(&prev, &old) {
				tracing::debug!(
					target_type = target.name(),
					proxy_type = proxy.name(),
					entries = next.len(),
					reclaimed,
					"proxy type cached"
				);
				return proxy;
			}
			// Lost the CAS; retry against the newer snapshot.
		}
	}

	/// Returns the cached proxy type, synthesizing and storing it on a miss.
	///
	/// The check-synthesize-store sequence runs under the cache-wide
	/// synthesis lock, so `synthesize` runs at most once per key while the
	/// key is live. Errors from `synthesize` are returned without touching
	/// the cache.
	pub fn get_or_synthesize<E>(
		&self,
		target: &Arc<TypeInfo>,
		filter: &Arc<dyn MethodFilter>,
		synthesize: impl FnOnce() -> Result<Arc<ProxyType>, E>,
	) -> Result<Arc<ProxyType>, E> {
		if let Some(hit) = self.lookup(target, filter) {
			tracing::trace!(target_type = target.name(), proxy_type = hit.name(), "proxy type cache hit");
			return Ok(hit);
		}

		let _guard = self.synthesis.lock();
		if let Some(hit) = self.lookup(target, filter) {
			return Ok(hit);
		}
		let proxy = synthesize()?;
		self.syntheses.fetch_add(1, Ordering::Relaxed);
		Ok(self.store(target, filter, proxy))
	}

	/// Number of cached entries, including entries whose keys died but have
	/// not been reclaimed yet.
	pub fn len(&self) -> usize {
		self.snap.load().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Successful syntheses performed through [`Self::get_or_synthesize`].
	pub fn synthesis_count(&self) -> u64 {
		self.syntheses.load(Ordering::Relaxed)
	}

	/// Drops entries whose target type or filter has been reclaimed.
	///
	/// Returns the number of entries removed. Stores also reclaim dead
	/// entries as a side effect.
	pub fn purge(&self) -> usize {
		loop {
			let old = self.snap.load_full();
			if !old.has_dead() {
				return 0;
			}
			let mut next = Snapshot::clone(&old);
			let removed = next.retain_live();
			let prev = self.snap.compare_and_swap(&old, Arc::new(next));
			if Arc::ptr_eq(&prev, &old) {
				tracing::debug!(removed, "proxy type cache purged");
				return removed;
			}
		}
	}

	/// Empties the cache. Later requests synthesize again.
	pub fn clear(&self) {
		self.snap.store(Arc::new(Snapshot::default()));
	}
}

impl std::fmt::Debug for ProxyTypeCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ProxyTypeCache")
			.field("entries", &self.len())
			.field("syntheses", &self.synthesis_count())
			.finish()
	}
}
