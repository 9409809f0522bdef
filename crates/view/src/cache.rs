//! Cache of fetched syntax trees, keyed by document identity.

use std::collections::HashMap;
use std::time::Instant;

use lsp_types::Uri;
use parking_lot::RwLock;
use tracing::trace;

/// A fetched syntax tree for one source document.
///
/// Built only from a successful analysis reply and replaced wholesale on
/// re-fetch, never mutated in place.
#[derive(Debug, Clone)]
pub struct CachedTree {
	/// Identity of the source document the tree was parsed from.
	pub uri: Uri,
	/// Rendered tree text.
	pub text: String,
	/// When the tree was fetched. Informational; reuse is decided purely
	/// by presence.
	pub fetched_at: Instant,
}

/// Keyed store of the most recently fetched tree per document.
///
/// Documents are identified by the canonical string form of their URI: two
/// identities are the same entry iff their strings are equal. There is no
/// eviction beyond explicit invalidation; an entry lives until the document
/// it belongs to changes, closes, or the provider is disposed.
///
/// Lookups never fail. Absence is an answer, not an error.
#[derive(Debug, Default)]
pub struct TreeCache {
	trees: RwLock<HashMap<String, CachedTree>>,
}

impl TreeCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the cached tree for a document, if any. Pure lookup.
	pub fn get(&self, uri: &Uri) -> Option<CachedTree> {
		self.trees.read().get(uri.as_str()).cloned()
	}

	/// Returns true if a tree is cached for the document.
	pub fn contains(&self, uri: &Uri) -> bool {
		self.trees.read().contains_key(uri.as_str())
	}

	/// Stores a freshly fetched tree, replacing any previous entry for the
	/// same document.
	pub fn put(&self, uri: &Uri, text: impl Into<String>) {
		let entry = CachedTree {
			uri: uri.clone(),
			text: text.into(),
			fetched_at: Instant::now(),
		};
		self.trees.write().insert(uri.as_str().to_owned(), entry);
	}

	/// Drops the entry for one document. No-op when nothing is cached, so
	/// callers invalidate unconditionally.
	pub fn invalidate(&self, uri: &Uri) {
		if self.trees.write().remove(uri.as_str()).is_some() {
			trace!(uri = uri.as_str(), "Invalidated cached tree");
		}
	}

	/// Drops every entry. Disposal path.
	pub fn clear(&self) {
		self.trees.write().clear();
	}

	/// Number of cached trees.
	pub fn len(&self) -> usize {
		self.trees.read().len()
	}

	/// Returns true when nothing is cached.
	pub fn is_empty(&self) -> bool {
		self.trees.read().is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn uri(s: &str) -> Uri {
		s.parse().expect("valid uri")
	}

	#[test]
	fn put_then_get_returns_the_entry() {
		let cache = TreeCache::new();
		let doc = uri("file:///a.rs");
		assert!(cache.get(&doc).is_none());

		cache.put(&doc, "SOURCE_FILE");
		let entry = cache.get(&doc).expect("entry cached");
		assert_eq!(entry.text, "SOURCE_FILE");
		assert_eq!(entry.uri.as_str(), doc.as_str());
		assert!(cache.contains(&doc));
	}

	#[test]
	fn put_replaces_the_previous_entry() {
		let cache = TreeCache::new();
		let doc = uri("file:///a.rs");
		cache.put(&doc, "OLD");
		cache.put(&doc, "NEW");

		assert_eq!(cache.len(), 1);
		assert_eq!(cache.get(&doc).expect("entry cached").text, "NEW");
	}

	#[test]
	fn invalidate_is_scoped_to_one_document() {
		let cache = TreeCache::new();
		let a = uri("file:///a.rs");
		let b = uri("file:///b.rs");
		cache.put(&a, "TREE_A");
		cache.put(&b, "TREE_B");

		cache.invalidate(&a);

		assert!(cache.get(&a).is_none());
		assert_eq!(cache.get(&b).expect("other entry untouched").text, "TREE_B");
	}

	#[test]
	fn invalidate_without_an_entry_is_a_noop() {
		let cache = TreeCache::new();
		cache.put(&uri("file:///a.rs"), "TREE_A");

		cache.invalidate(&uri("file:///missing.rs"));
		cache.invalidate(&uri("file:///missing.rs"));

		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn identity_is_the_canonical_uri_string() {
		let cache = TreeCache::new();
		cache.put(&uri("file:///a.rs"), "TREE_A");

		// Same string, independently parsed.
		assert!(cache.contains(&uri("file:///a.rs")));
		// Any textual difference is a different document.
		assert!(!cache.contains(&uri("file:///A.rs")));
	}

	#[test]
	fn clear_empties_the_cache() {
		let cache = TreeCache::new();
		cache.put(&uri("file:///a.rs"), "TREE_A");
		cache.put(&uri("file:///b.rs"), "TREE_B");

		cache.clear();

		assert!(cache.is_empty());
		assert!(cache.get(&uri("file:///a.rs")).is_none());
	}
}
