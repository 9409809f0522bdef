//! Host seam: the analysis server that computes syntax trees.

use arbor_protocol::{SyntaxTreeParams, SyntaxTreeResponse};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::Result;

/// One round trip to the external analysis server.
///
/// Implementations typically forward [`arbor_protocol::SyntaxTreeRequest`]
/// over a language-server connection. The call must be abandonable: when
/// `cancel` fires mid-flight the caller stops waiting, so implementations
/// should give up promptly instead of keeping the connection busy.
///
/// The service computes, this crate only caches. A failed call surfaces as
/// an [`Error`](crate::Error); the provider propagates it verbatim and
/// caches nothing.
#[async_trait]
pub trait AnalysisService: Send + Sync {
	/// Fetches the rendered syntax tree for one document.
	async fn syntax_tree(
		&self,
		params: SyntaxTreeParams,
		cancel: &CancellationToken,
	) -> Result<SyntaxTreeResponse>;
}
