//! Notification lane
//!
//! [`EventHub`] replaces ad-hoc broadcast callbacks with a typed subscriber
//! list fed by a channel. All delivery happens on one dedicated thread:
//! emitters only enqueue and never run subscriber code, so a subscriber can
//! freely read the table without re-entering a lock held by its caller.
//!
//! # Ordering
//!
//! Events enqueued on the hub are delivered to every subscriber in
//! enqueue order (single channel, single delivery thread).

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use tabgrid_core::{Result, TableEvent};

type SubscriberFn = dyn Fn(&TableEvent) + Send + Sync + 'static;
type Registry = Vec<(u64, Arc<SubscriberFn>)>;

/// Handle returned by [`EventHub::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

enum HubMessage {
    Event(TableEvent),
    Shutdown,
}

struct HubShared {
    tx: mpsc::Sender<HubMessage>,
    registry: Arc<Mutex<Registry>>,
    next_id: AtomicU64,
    delivery: Mutex<Option<JoinHandle<()>>>,
}

/// The notification lane for one table instance.
///
/// Cheap to clone; all clones share the same subscriber list and delivery
/// thread. The delivery thread drains queued events and shuts down when the
/// last handle is dropped.
///
/// # Thread Safety
///
/// `emit` may be called from any thread and never blocks on subscriber
/// code. Subscribers run on the delivery thread only.
#[derive(Clone)]
pub struct EventHub {
    shared: Arc<HubShared>,
}

impl EventHub {
    /// Create a hub and spawn its delivery thread.
    pub fn new() -> Result<Self> {
        let (tx, rx) = mpsc::channel::<HubMessage>();
        let registry: Arc<Mutex<Registry>> = Arc::new(Mutex::new(Vec::new()));

        let thread_registry = Arc::clone(&registry);
        let delivery = std::thread::Builder::new()
            .name("tabgrid-notify".into())
            .spawn(move || {
                while let Ok(message) = rx.recv() {
                    match message {
                        HubMessage::Event(event) => {
                            // Snapshot the subscriber list so callbacks run
                            // without the registry lock held.
                            let subscribers: Vec<Arc<SubscriberFn>> = thread_registry
                                .lock()
                                .iter()
                                .map(|(_, callback)| Arc::clone(callback))
                                .collect();
                            for callback in subscribers {
                                callback(&event);
                            }
                        }
                        HubMessage::Shutdown => break,
                    }
                }
            })?;

        Ok(EventHub {
            shared: Arc::new(HubShared {
                tx,
                registry,
                next_id: AtomicU64::new(1),
                delivery: Mutex::new(Some(delivery)),
            }),
        })
    }

    /// Register a subscriber; it observes every event emitted from now on.
    pub fn subscribe(
        &self,
        callback: impl Fn(&TableEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst);
        self.shared.registry.lock().push((id, Arc::new(callback)));
        SubscriptionId(id)
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.shared.registry.lock();
        let before = registry.len();
        registry.retain(|(existing, _)| *existing != id.0);
        registry.len() != before
    }

    /// Enqueue an event for delivery on the notification thread.
    ///
    /// Never blocks: the channel is unbounded and subscriber code runs
    /// elsewhere. Events enqueued after shutdown are dropped.
    pub fn emit(&self, event: TableEvent) {
        if self.shared.tx.send(HubMessage::Event(event)).is_err() {
            tracing::debug!(?event, "notification lane closed; event dropped");
        }
    }
}

impl Drop for HubShared {
    fn drop(&mut self) {
        // Queued events drain before the sentinel is observed.
        let _ = self.tx.send(HubMessage::Shutdown);
        if let Some(handle) = self.delivery.get_mut().take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    fn recv_all(rx: &mpsc::Receiver<TableEvent>, n: usize) -> Vec<TableEvent> {
        (0..n)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect()
    }

    #[test]
    fn test_events_delivered_in_emission_order() {
        let hub = EventHub::new().unwrap();
        let (tx, rx) = mpsc::channel();
        hub.subscribe(move |event| tx.send(*event).unwrap());

        hub.emit(TableEvent::Updated);
        hub.emit(TableEvent::ExportProgress(0.5));
        hub.emit(TableEvent::Updated);

        assert_eq!(
            recv_all(&rx, 3),
            vec![
                TableEvent::Updated,
                TableEvent::ExportProgress(0.5),
                TableEvent::Updated,
            ]
        );
    }

    #[test]
    fn test_multiple_subscribers_all_observe() {
        let hub = EventHub::new().unwrap();
        let (tx_a, rx_a) = mpsc::channel();
        let (tx_b, rx_b) = mpsc::channel();
        hub.subscribe(move |event| tx_a.send(*event).unwrap());
        hub.subscribe(move |event| tx_b.send(*event).unwrap());

        hub.emit(TableEvent::Updated);

        assert_eq!(recv_all(&rx_a, 1), vec![TableEvent::Updated]);
        assert_eq!(recv_all(&rx_b, 1), vec![TableEvent::Updated]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let hub = EventHub::new().unwrap();
        let (tx, rx) = mpsc::channel();
        let id = hub.subscribe(move |event| {
            let _ = tx.send(*event);
        });

        assert!(hub.unsubscribe(id));
        assert!(!hub.unsubscribe(id));

        hub.emit(TableEvent::Updated);
        drop(hub); // join the delivery thread so nothing is still in flight
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_drop_drains_queued_events() {
        let hub = EventHub::new().unwrap();
        let (tx, rx) = mpsc::channel();
        hub.subscribe(move |event| tx.send(*event).unwrap());

        for _ in 0..100 {
            hub.emit(TableEvent::Updated);
        }
        drop(hub);

        assert_eq!(rx.iter().count(), 100);
    }
}
