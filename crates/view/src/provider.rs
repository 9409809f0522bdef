//! Content provider for the tree view.

use std::sync::Arc;
use std::time::Instant;

use arbor_protocol::SyntaxTreeParams;
use lsp_types::{DocumentLink, Uri};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::Result;
use crate::cache::TreeCache;
use crate::context::EditorContext;
use crate::notifier::ViewNotifier;
use crate::service::AnalysisService;
use crate::sync::ViewSync;

/// Outcome of a content request.
///
/// Together with the `Err` arm of [`TreeViewProvider::provide_content`]
/// this covers every way a request can end, so call sites handle each one
/// explicitly instead of collapsing them into "no text".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewContent {
	/// The rendered tree for the active document.
	Tree(String),
	/// No relevant document is focused; the view has nothing to show. Not
	/// an error.
	Empty,
	/// The request's token fired before the fetch settled. Nothing was
	/// cached; whoever supplied the token decides about retrying.
	Cancelled,
}

/// Serves the tree view's content: cached when possible, fetched when not.
///
/// The provider is the only component that suspends, and only on a cache
/// miss: one [`AnalysisService`] round trip, guarded by the caller's
/// cancellation token. Lookups, writes, and notification are synchronous.
///
/// # Concurrency
///
/// A request for an already-cached document never fetches. Concurrent
/// requests for the same uncached document each run their own fetch; the
/// last write wins and the entries are identical in practice. The fetches
/// are not shared because the token model is per caller, and coupling one
/// caller's cancellation to another's is worse than an occasional duplicate
/// round trip.
pub struct TreeViewProvider {
	cache: Arc<TreeCache>,
	notifier: Arc<ViewNotifier>,
	service: Arc<dyn AnalysisService>,
	editor: Arc<dyn EditorContext>,
	view_uri: Uri,
}

impl TreeViewProvider {
	/// Builds a provider over pre-built parts.
	///
	/// Prefer [`create`](Self::create) unless the cache or notifier must
	/// be shared more widely than the provider/sync pair.
	pub fn new(
		cache: Arc<TreeCache>,
		notifier: Arc<ViewNotifier>,
		service: Arc<dyn AnalysisService>,
		editor: Arc<dyn EditorContext>,
	) -> Self {
		Self {
			cache,
			notifier,
			service,
			editor,
			view_uri: crate::view_uri(),
		}
	}

	/// Wires a provider and its lifecycle bridge around one shared cache
	/// and notifier.
	///
	/// This is the whole core: hand the [`ViewSync`] your editor events
	/// (through [`ViewSync::attach`] or direct calls) and pull content
	/// from the provider whenever the [`notifier`](Self::notifier) fires.
	pub fn create(
		service: Arc<dyn AnalysisService>,
		editor: Arc<dyn EditorContext>,
	) -> (Arc<Self>, ViewSync) {
		let cache = Arc::new(TreeCache::new());
		let notifier = Arc::new(ViewNotifier::new());
		let sync = ViewSync::new(cache.clone(), notifier.clone(), editor.clone());
		let provider = Arc::new(Self::new(cache, notifier, service, editor));
		(provider, sync)
	}

	/// Returns the current content of the view.
	///
	/// Serves from the cache when the active document already has a tree;
	/// otherwise runs one cancellable fetch and caches the reply. An
	/// `Err` means the fetch failed and is propagated verbatim, with no
	/// cache write. Cancellation is not a failure: it comes back as
	/// [`ViewContent::Cancelled`].
	pub async fn provide_content(
		&self,
		view: &Uri,
		cancel: &CancellationToken,
	) -> Result<ViewContent> {
		let Some(document) = self.editor.active_document() else {
			trace!(view = view.as_str(), "No active document, view is empty");
			return Ok(ViewContent::Empty);
		};
		if !self.editor.is_relevant(&document) {
			trace!(uri = document.uri.as_str(), "Active document not relevant, view is empty");
			return Ok(ViewContent::Empty);
		}

		if let Some(entry) = self.cache.get(&document.uri) {
			trace!(uri = document.uri.as_str(), "Serving cached tree");
			return Ok(ViewContent::Tree(entry.text));
		}

		// Single suspension point: one request, owned by this caller's token.
		let started = Instant::now();
		debug!(uri = document.uri.as_str(), "Fetching syntax tree");
		let params = SyntaxTreeParams::new(document.uri.clone());
		let outcome = tokio::select! {
			_ = cancel.cancelled() => {
				debug!(uri = document.uri.as_str(), "Fetch cancelled mid-flight");
				return Ok(ViewContent::Cancelled);
			}
			outcome = self.service.syntax_tree(params, cancel) => outcome,
		};
		if cancel.is_cancelled() {
			// Token fired while the reply settled. Same contract as a
			// mid-flight cancel: nothing is cached.
			debug!(uri = document.uri.as_str(), "Fetch cancelled while settling");
			return Ok(ViewContent::Cancelled);
		}
		let response = match outcome {
			Ok(response) => response,
			Err(err) => {
				debug!(uri = document.uri.as_str(), error = %err, "Fetch failed");
				return Err(err);
			}
		};

		self.cache.put(&document.uri, response.tree.clone());
		debug!(
			uri = document.uri.as_str(),
			elapsed_ms = started.elapsed().as_millis() as u64,
			"Cached syntax tree"
		);
		Ok(ViewContent::Tree(response.tree))
	}

	/// Link resolution for the view document.
	///
	/// The tree text carries no navigable links, so the answer set is
	/// always empty. What the query distinguishes is whether there is an
	/// answer at all: `Some` empty set while the active document's tree is
	/// cached, `None` when nothing is displayed or nothing is cached yet.
	pub fn document_links(&self) -> Option<Vec<DocumentLink>> {
		let document = self.editor.active_document()?;
		self.cache.contains(&document.uri).then(Vec::new)
	}

	/// Releases the cache.
	///
	/// Lifecycle subscriptions are not touched; the activation layer owns
	/// those through its [`EventPump`](crate::EventPump) and notifier
	/// guards.
	pub fn dispose(&self) {
		debug!(entries = self.cache.len(), "Disposing tree view provider");
		self.cache.clear();
	}

	/// The shared tree cache.
	pub fn cache(&self) -> &TreeCache {
		&self.cache
	}

	/// The shared change notifier; subscribe here for staleness signals.
	pub fn notifier(&self) -> &ViewNotifier {
		&self.notifier
	}

	/// URI of the view resource this provider serves.
	pub fn view_uri(&self) -> &Uri {
		&self.view_uri
	}
}

impl std::fmt::Debug for TreeViewProvider {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TreeViewProvider")
			.field("view_uri", &self.view_uri.as_str())
			.field("cached", &self.cache.len())
			.finish()
	}
}
