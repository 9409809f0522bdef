//! Host seam: what the view needs to know about the editor.

use lsp_types::Uri;

/// A source document as the host editor sees it.
///
/// Carries exactly what the view consumes: the identity used as cache key
/// and the language used for relevance classification. Content, selection,
/// and everything else stay with the host.
#[derive(Debug, Clone)]
pub struct SourceDocument {
	/// Canonical document identity.
	pub uri: Uri,
	/// Host language identifier, e.g. `"rust"`.
	pub language_id: String,
}

impl SourceDocument {
	/// Builds a document descriptor.
	pub fn new(uri: Uri, language_id: impl Into<String>) -> Self {
		Self {
			uri,
			language_id: language_id.into(),
		}
	}
}

/// Read-only window into the host editor.
///
/// The core never stores what it reads here. The active document is looked
/// up fresh on every content request, so a focus change between requests is
/// always observed.
pub trait EditorContext: Send + Sync {
	/// The currently focused source document, if any editor has focus.
	fn active_document(&self) -> Option<SourceDocument>;

	/// Whether the view can render this document at all.
	///
	/// Documents ruled out here never reach the analysis service, and
	/// focus moving onto one does not mark the view stale.
	fn is_relevant(&self, document: &SourceDocument) -> bool;
}
