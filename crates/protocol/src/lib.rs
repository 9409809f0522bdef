//! Wire contract for the `arbor/syntaxTree` request.
//!
//! The tree view core talks to its analysis server through one custom
//! request in the LSP extension style: the client names a source document,
//! the server replies with the rendered parse tree for it. This crate pins
//! that contract down so hosts can implement the service seam over any
//! JSON-RPC connection without depending on the view core itself.

#![warn(missing_docs)]

use lsp_types::TextDocumentIdentifier;
use lsp_types::request::Request;
use serde::{Deserialize, Serialize};

/// Method name of the syntax tree request.
pub const SYNTAX_TREE_METHOD: &str = "arbor/syntaxTree";

/// Custom request: fetch the rendered syntax tree for one document.
///
/// Direction: client to analysis server. The reply carries the whole tree
/// as display-ready text; there is no incremental form.
#[derive(Debug)]
pub enum SyntaxTreeRequest {}

impl Request for SyntaxTreeRequest {
	type Params = SyntaxTreeParams;
	type Result = SyntaxTreeResponse;
	const METHOD: &'static str = SYNTAX_TREE_METHOD;
}

/// Parameters of [`SyntaxTreeRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxTreeParams {
	/// The document whose tree is requested.
	pub text_document: TextDocumentIdentifier,
}

impl SyntaxTreeParams {
	/// Builds params naming the given document.
	pub fn new(uri: lsp_types::Uri) -> Self {
		Self {
			text_document: TextDocumentIdentifier { uri },
		}
	}
}

/// Successful reply to [`SyntaxTreeRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxTreeResponse {
	/// Rendered tree, one node per line, ready for a read-only buffer.
	pub tree: String,
}
