use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use wireform_primitives::{Method, Params};

use crate::error::Result;
use crate::request::{Request, RequestSpec};
use crate::state::RequestState;
use crate::track::track;

/// Request cache limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
	/// Maximum number of cached requests; the oldest is evicted first.
	pub size: usize,
	/// Age in milliseconds after which a resolved entry no longer satisfies lookups.
	pub expire_ms: u64,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self { size: 70, expire_ms: 15_000 }
	}
}

impl CacheConfig {
	pub fn from_toml_str(input: &str) -> std::result::Result<Self, toml::de::Error> {
		toml::from_str(input)
	}

	pub fn expire(&self) -> Duration {
		Duration::from_millis(self.expire_ms)
	}
}

/// Equivalence key: requests with equal keys produce interchangeable responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
	method: Method,
	url: String,
	params: Params,
	target: Option<String>,
}

impl CacheKey {
	/// Key for `spec`, or `None` when its method is not cacheable.
	pub fn of(spec: &RequestSpec) -> Option<Self> {
		spec.method.is_safe().then(|| Self {
			method: spec.method,
			url: spec.url.clone(),
			params: spec.params.clone(),
			target: spec.target.clone(),
		})
	}
}

#[derive(Debug)]
struct Entry {
	request: Request,
	cached_at: Instant,
}

/// De-duplicates equivalent requests.
///
/// In-flight entries let later equivalent requests track them instead of
/// going to the network. Resolved entries keep satisfying lookups until they
/// expire. Rejected and aborted entries are dropped the next time the cache
/// is touched.
#[derive(Debug, Default)]
pub struct RequestCache {
	config: CacheConfig,
	entries: Mutex<IndexMap<CacheKey, Entry>>,
}

impl RequestCache {
	pub fn new(config: CacheConfig) -> Self {
		Self {
			config,
			entries: Mutex::new(IndexMap::new()),
		}
	}

	pub fn config(&self) -> &CacheConfig {
		&self.config
	}

	/// Caches `request` under its key, replacing an equivalent entry.
	///
	/// Returns false when the request is not cacheable.
	pub fn put(&self, request: &Request) -> bool {
		let Some(key) = CacheKey::of(request.spec()) else {
			return false;
		};
		let mut entries = self.entries.lock();
		self.prune(&mut entries);
		entries.shift_remove(&key);
		entries.insert(
			key,
			Entry {
				request: request.clone(),
				cached_at: Instant::now(),
			},
		);
		while entries.len() > self.config.size {
			if let Some((_, evicted)) = entries.shift_remove_index(0) {
				tracing::debug!(request = %evicted.request.id(), "cache.evict_oldest");
			}
		}
		true
	}

	/// A usable cached request equivalent to `spec`.
	pub fn get(&self, spec: &RequestSpec) -> Option<Request> {
		let key = CacheKey::of(spec)?;
		let mut entries = self.entries.lock();
		self.prune(&mut entries);
		entries.get(&key).map(|entry| entry.request.clone())
	}

	/// Tracks `following` onto an equivalent cached request.
	///
	/// Returns the source it now mirrors. Without a usable match `following`
	/// itself is cached (when cacheable) and `None` is returned, so the caller
	/// sends it.
	pub fn lookup_or_track(&self, following: &Request) -> Result<Option<Request>> {
		match self.get(following.spec()) {
			Some(source) if !Request::ptr_eq(&source, following) => {
				tracing::debug!(request = %following.id(), source = %source.id(), "cache.hit");
				track(&source, following)?;
				Ok(Some(source))
			}
			Some(_) => Ok(None),
			None => {
				tracing::trace!(request = %following.id(), "cache.miss");
				self.put(following);
				Ok(None)
			}
		}
	}

	/// Removes entries whose request matches `predicate`. Returns how many.
	pub fn evict(&self, predicate: impl Fn(&Request) -> bool) -> usize {
		let mut entries = self.entries.lock();
		let before = entries.len();
		entries.retain(|_, entry| !predicate(&entry.request));
		before - entries.len()
	}

	pub fn clear(&self) {
		self.entries.lock().clear();
	}

	pub fn len(&self) -> usize {
		let mut entries = self.entries.lock();
		self.prune(&mut entries);
		entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn prune(&self, entries: &mut IndexMap<CacheKey, Entry>) {
		let expire = self.config.expire();
		entries.retain(|_, entry| {
			let state = entry.request.state();
			state.is_in_flight() || (state == RequestState::Resolved && entry.cached_at.elapsed() < expire)
		});
	}
}
