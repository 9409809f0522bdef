//! Cached syntax tree view.
//!
//! This crate is the engine behind a virtual, read-only editor document
//! that always shows the parse tree of the focused source document. The
//! tree itself is computed by an external analysis server reached through
//! [`AnalysisService`]; this crate decides when a cached tree can be
//! reused, when it must be re-fetched, and which editor lifecycle events
//! make it stale.
//!
//! The pieces:
//! - [`TreeCache`]: one entry per document identity, dropped only by
//!   explicit invalidation.
//! - [`ViewNotifier`]: tells subscribers the view is stale; content is
//!   always re-pulled, never pushed.
//! - [`ViewSync`]: maps document-changed, document-closed, and
//!   focus-changed events to invalidation and notification.
//! - [`TreeViewProvider`]: serves content from the cache or through a
//!   single cancellable service round trip.
//!
//! Hosts implement [`EditorContext`] and [`AnalysisService`], wire the
//! core with [`TreeViewProvider::create`], feed events through
//! [`ViewSync::attach`] or direct calls, and re-render the view whenever
//! the notifier fires.

#![warn(missing_docs)]

pub mod cache;
pub mod context;
pub mod notifier;
pub mod provider;
pub mod service;
pub mod sync;

pub use cache::{CachedTree, TreeCache};
pub use context::{EditorContext, SourceDocument};
/// Re-export of the [`lsp_types`] version this crate builds against.
pub use lsp_types;
pub use notifier::{Subscription, ViewNotifier};
pub use provider::{TreeViewProvider, ViewContent};
pub use service::AnalysisService;
pub use sync::{EditorEvent, EditorEventReceiver, EditorEventSender, EventPump, ViewSync};

use lsp_types::Uri;

/// URI scheme reserved for the virtual tree view document.
pub const VIEW_SCHEME: &str = "arbor";

/// The well-known URI of the tree view document.
///
/// There is exactly one view per session; it renders whichever relevant
/// document is focused. The URI is distinct from every source document
/// identity, so view and sources never collide in the cache or the host's
/// document table.
pub fn view_uri() -> Uri {
	format!("{VIEW_SCHEME}:/tree")
		.parse()
		.expect("static view URI is well-formed")
}

/// A convenient type alias for `Result` with `E` = [`enum@crate::Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures surfaced by the analysis service.
///
/// Cancellation is not an error; it is reported as
/// [`ViewContent::Cancelled`]. Absence of a relevant document is not an
/// error either ([`ViewContent::Empty`]). Everything here reaches the
/// caller of [`TreeViewProvider::provide_content`] unchanged: the core
/// never retries and never caches a failed fetch.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// The analysis service shut down before replying.
	#[error("analysis service stopped")]
	ServiceStopped,

	/// The analysis service rejected the request.
	#[error("analysis service error {code}: {message}")]
	Rejected {
		/// Error code as reported by the service.
		code: i32,
		/// Human-readable reason.
		message: String,
	},

	/// The service reply could not be decoded.
	#[error("deserialization failed: {0}")]
	Deserialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn view_uri_is_stable_and_scheme_distinct() {
		let view = view_uri();
		assert_eq!(view.as_str(), "arbor:/tree");
		assert!(view.as_str().starts_with(VIEW_SCHEME));

		let source: Uri = "file:///a.rs".parse().expect("valid uri");
		assert_ne!(view.as_str(), source.as_str());
	}
}
