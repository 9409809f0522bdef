//! Change notification for the tree view.
//!
//! The notifier is deliberately payload-free: it announces "the view is
//! stale", naming only the view resource, and every subscriber re-pulls
//! content through the provider. There is no push path for new content.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use lsp_types::Uri;
use parking_lot::Mutex;
use tracing::trace;

type Handler = Arc<dyn Fn(&Uri) + Send + Sync>;

#[derive(Default)]
struct HandlerList {
	entries: Vec<(u64, Handler)>,
}

/// Broadcast signal that the view content is stale and should be re-pulled.
///
/// Handlers run synchronously inside [`fire`](Self::fire), each exactly
/// once per fire, in subscription order. The handler list is snapshotted
/// before the first handler runs: handlers may subscribe or unsubscribe
/// reentrantly without deadlocking, and a subscriber added during a fire is
/// not invoked by that fire.
pub struct ViewNotifier {
	handlers: Arc<Mutex<HandlerList>>,
	next_id: AtomicU64,
}

impl ViewNotifier {
	/// Creates a notifier with no subscribers.
	pub fn new() -> Self {
		Self {
			handlers: Arc::new(Mutex::new(HandlerList::default())),
			next_id: AtomicU64::new(0),
		}
	}

	/// Registers a handler invoked on every fire until the returned guard
	/// is dropped.
	pub fn subscribe(&self, handler: impl Fn(&Uri) + Send + Sync + 'static) -> Subscription {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		self.handlers.lock().entries.push((id, Arc::new(handler)));
		Subscription {
			id,
			handlers: Arc::downgrade(&self.handlers),
		}
	}

	/// Announces that the view named by `uri` is stale.
	///
	/// Returns after every live handler has run. With no subscribers this
	/// is a no-op.
	pub fn fire(&self, uri: &Uri) {
		let snapshot: Vec<Handler> = {
			let handlers = self.handlers.lock();
			handlers.entries.iter().map(|(_, handler)| handler.clone()).collect()
		};
		trace!(view = uri.as_str(), subscribers = snapshot.len(), "View marked stale");
		for handler in snapshot {
			handler(uri);
		}
	}

	/// Number of live subscriptions.
	pub fn subscriber_count(&self) -> usize {
		self.handlers.lock().entries.len()
	}
}

impl Default for ViewNotifier {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for ViewNotifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ViewNotifier")
			.field("subscribers", &self.subscriber_count())
			.finish()
	}
}

/// Guard for one [`ViewNotifier`] subscription.
///
/// Dropping the guard removes the handler; fires that start afterwards no
/// longer reach it. A fire already in progress may still deliver once.
#[derive(Debug)]
pub struct Subscription {
	id: u64,
	handlers: Weak<Mutex<HandlerList>>,
}

impl Subscription {
	/// Removes the handler now instead of at drop time.
	pub fn dispose(self) {}

	fn unsubscribe(&self) {
		if let Some(handlers) = self.handlers.upgrade() {
			handlers.lock().entries.retain(|(id, _)| *id != self.id);
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.unsubscribe();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn view() -> Uri {
		crate::view_uri()
	}

	#[test]
	fn fire_without_subscribers_is_a_noop() {
		let notifier = ViewNotifier::new();
		notifier.fire(&view());
		assert_eq!(notifier.subscriber_count(), 0);
	}

	#[test]
	fn handlers_run_once_per_fire_in_subscription_order() {
		let notifier = ViewNotifier::new();
		let order = Arc::new(Mutex::new(Vec::new()));

		let first = order.clone();
		let _a = notifier.subscribe(move |_| first.lock().push(1));
		let second = order.clone();
		let _b = notifier.subscribe(move |_| second.lock().push(2));
		let third = order.clone();
		let _c = notifier.subscribe(move |_| third.lock().push(3));

		notifier.fire(&view());
		assert_eq!(*order.lock(), vec![1, 2, 3]);

		notifier.fire(&view());
		assert_eq!(*order.lock(), vec![1, 2, 3, 1, 2, 3]);
	}

	#[test]
	fn handlers_receive_the_view_uri() {
		let notifier = ViewNotifier::new();
		let seen = Arc::new(Mutex::new(None));

		let sink = seen.clone();
		let _sub = notifier.subscribe(move |uri| *sink.lock() = Some(uri.as_str().to_owned()));
		notifier.fire(&view());

		assert_eq!(seen.lock().as_deref(), Some("arbor:/tree"));
	}

	#[test]
	fn dropping_the_guard_stops_delivery() {
		let notifier = ViewNotifier::new();
		let hits = Arc::new(Mutex::new(0u32));

		let sink = hits.clone();
		let sub = notifier.subscribe(move |_| *sink.lock() += 1);
		notifier.fire(&view());
		assert_eq!(*hits.lock(), 1);

		drop(sub);
		assert_eq!(notifier.subscriber_count(), 0);
		notifier.fire(&view());
		assert_eq!(*hits.lock(), 1);
	}

	#[test]
	fn dispose_removes_the_handler() {
		let notifier = ViewNotifier::new();
		let hits = Arc::new(Mutex::new(0u32));

		let sink = hits.clone();
		notifier.subscribe(move |_| *sink.lock() += 1).dispose();

		notifier.fire(&view());
		assert_eq!(*hits.lock(), 0);
	}

	#[test]
	fn subscribers_added_during_a_fire_miss_that_fire() {
		let notifier = Arc::new(ViewNotifier::new());
		let hits = Arc::new(Mutex::new(0u32));
		let guards = Arc::new(Mutex::new(Vec::new()));

		let inner_notifier = notifier.clone();
		let inner_hits = hits.clone();
		let inner_guards = guards.clone();
		let _outer = notifier.subscribe(move |_| {
			let sink = inner_hits.clone();
			let sub = inner_notifier.subscribe(move |_| *sink.lock() += 1);
			inner_guards.lock().push(sub);
		});

		notifier.fire(&view());
		assert_eq!(*hits.lock(), 0);

		// The subscriber registered by the first fire sees the second.
		notifier.fire(&view());
		assert_eq!(*hits.lock(), 1);
	}

	#[test]
	fn guard_outliving_the_notifier_is_harmless() {
		let notifier = ViewNotifier::new();
		let sub = notifier.subscribe(|_| {});
		drop(notifier);
		drop(sub);
	}
}
