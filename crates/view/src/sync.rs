//! Keeps the tree view in step with editor lifecycle events.
//!
//! [`ViewSync`] is the bridge between the host's document events and the
//! view state: edits and closes drop the affected cache entry and mark the
//! view stale, focus changes only mark it stale. It owns no content; the
//! provider re-fetches on the next pull.
//!
//! Events arrive two ways. Hosts with their own event loop call
//! [`ViewSync::handle`] (or the per-event methods) directly. Hosts that
//! prefer a channel push [`EditorEvent`]s into the receiver handed to
//! [`ViewSync::attach`], which drains them on a spawned task. The returned
//! [`EventPump`] owns that task: shutting it down, or dropping it, detaches
//! the view from the editor in one step.

use std::sync::Arc;

use lsp_types::Uri;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::cache::TreeCache;
use crate::context::{EditorContext, SourceDocument};
use crate::notifier::ViewNotifier;

/// Editor lifecycle events the view reacts to.
#[derive(Debug, Clone)]
pub enum EditorEvent {
	/// A document's content changed.
	DocumentChanged {
		/// Identity of the edited document.
		uri: Uri,
	},
	/// A document was closed.
	DocumentClosed {
		/// The closed document. Hosts that already lost the reference send
		/// `None`; the event is then ignored.
		document: Option<SourceDocument>,
	},
	/// Focus moved to another editor, or left every editor.
	ActiveEditorChanged {
		/// The newly focused document, `None` when focus left every editor.
		document: Option<SourceDocument>,
	},
}

/// Sender half of the editor event intake.
pub type EditorEventSender = mpsc::UnboundedSender<EditorEvent>;
/// Receiver half of the editor event intake.
pub type EditorEventReceiver = mpsc::UnboundedReceiver<EditorEvent>;

/// Bridges editor lifecycle events to cache invalidation and view refresh.
///
/// Operates on the same cache and notifier instances as the provider,
/// handed over at construction (see [`TreeViewProvider::create`]); the sync
/// side is the only invalidation-path writer, the provider the only
/// fetch-path writer.
///
/// [`TreeViewProvider::create`]: crate::TreeViewProvider::create
#[derive(Clone)]
pub struct ViewSync {
	cache: Arc<TreeCache>,
	notifier: Arc<ViewNotifier>,
	editor: Arc<dyn EditorContext>,
	view_uri: Uri,
}

impl ViewSync {
	/// Builds a sync bridge over pre-built parts.
	///
	/// Prefer [`TreeViewProvider::create`], which wires the provider and
	/// the bridge around one shared cache and notifier.
	///
	/// [`TreeViewProvider::create`]: crate::TreeViewProvider::create
	pub fn new(
		cache: Arc<TreeCache>,
		notifier: Arc<ViewNotifier>,
		editor: Arc<dyn EditorContext>,
	) -> Self {
		Self {
			cache,
			notifier,
			editor,
			view_uri: crate::view_uri(),
		}
	}

	/// Dispatches one event to the matching handler.
	pub fn handle(&self, event: &EditorEvent) {
		match event {
			EditorEvent::DocumentChanged { uri } => self.document_changed(uri),
			EditorEvent::DocumentClosed { document } => self.document_closed(document.as_ref()),
			EditorEvent::ActiveEditorChanged { document } => {
				self.active_editor_changed(document.as_ref());
			}
		}
	}

	/// A document was edited: its cached tree is stale, and so is the view.
	pub fn document_changed(&self, uri: &Uri) {
		debug!(uri = uri.as_str(), "Document changed, dropping cached tree");
		self.cache.invalidate(uri);
		self.notifier.fire(&self.view_uri);
	}

	/// A document was closed: drop its entry so the cache does not outlive
	/// the document. `None` means the host had no reference left and there
	/// is nothing to drop.
	pub fn document_closed(&self, document: Option<&SourceDocument>) {
		let Some(document) = document else {
			return;
		};
		debug!(uri = document.uri.as_str(), "Document closed, dropping cached tree");
		self.cache.invalidate(&document.uri);
		self.notifier.fire(&self.view_uri);
	}

	/// Focus moved. A relevant document coming into focus re-renders the
	/// view; the previous document's entry stays cached so flipping back
	/// is free. Focus landing on nothing or on a non-relevant document is
	/// ignored.
	pub fn active_editor_changed(&self, document: Option<&SourceDocument>) {
		let Some(document) = document else {
			return;
		};
		if !self.editor.is_relevant(document) {
			trace!(uri = document.uri.as_str(), "Focused document not relevant, ignoring");
			return;
		}
		self.notifier.fire(&self.view_uri);
	}

	/// Spawns the intake task draining `events` into [`handle`](Self::handle).
	///
	/// The returned [`EventPump`] owns the task; shut it down (or drop it)
	/// to detach the view from the editor. Events still queued at shutdown
	/// are discarded.
	pub fn attach(&self, mut events: EditorEventReceiver) -> EventPump {
		let sync = self.clone();
		let cancel = CancellationToken::new();
		let token = cancel.clone();
		let task = tokio::spawn(async move {
			loop {
				tokio::select! {
					_ = token.cancelled() => break,
					event = events.recv() => match event {
						Some(event) => sync.handle(&event),
						None => break,
					},
				}
			}
			trace!("Editor event intake stopped");
		});
		EventPump {
			cancel,
			task: Some(task),
		}
	}
}

/// Scoped owner of the editor event intake task.
///
/// Every editor subscription funnels through this one task, so cancelling
/// it is the single teardown point for the view's external hooks.
#[derive(Debug)]
pub struct EventPump {
	cancel: CancellationToken,
	task: Option<JoinHandle<()>>,
}

impl EventPump {
	/// Stops the intake and waits for the drain task to finish.
	pub async fn shutdown(mut self) {
		self.cancel.cancel();
		if let Some(task) = self.task.take() {
			let _ = task.await;
		}
	}

	/// True once the intake task has exited, whether through shutdown or
	/// because the sender side closed.
	pub fn is_finished(&self) -> bool {
		self.task.as_ref().is_none_or(JoinHandle::is_finished)
	}
}

impl Drop for EventPump {
	fn drop(&mut self) {
		self.cancel.cancel();
	}
}
