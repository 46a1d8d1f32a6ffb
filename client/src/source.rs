use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use landgrid_shared::{LandEvent, LandRecord, apply_changes};

pub type LandSnapshot = Rc<[LandRecord]>;
type Listener = Rc<dyn Fn(&LandSnapshot)>;

/// Where the grid view gets its land collection from.
///
/// The wallet/contract layer owns fetching; the view only reads the current
/// snapshot and listens for wholesale replacements.
pub trait LandDataSource {
    fn snapshot(&self) -> LandSnapshot;
    fn subscribe(&self, listener: Box<dyn Fn(&LandSnapshot)>) -> Subscription;
}

/// Detaches its listener when dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    store: Weak<StoreInner>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.listeners.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

struct StoreInner {
    lands: RefCell<LandSnapshot>,
    last_seq: Cell<u64>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_id: Cell<u64>,
}

/// In-memory land source fed by whatever layer talks to the chain.
#[derive(Clone)]
pub struct LandStore {
    inner: Rc<StoreInner>,
}

impl Default for LandStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl LandStore {
    pub fn new(lands: Vec<LandRecord>) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                lands: RefCell::new(lands.into()),
                last_seq: Cell::new(0),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lands.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Swap in a new collection and notify every listener.
    pub fn replace(&self, lands: Vec<LandRecord>) {
        let snapshot: LandSnapshot = lands.into();
        *self.inner.lands.borrow_mut() = snapshot.clone();

        // Clone out so listeners may subscribe or unsubscribe while notified.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    /// Apply a feed event. Updates at or below the last seen sequence are
    /// stale and ignored; snapshots always win. Returns whether anything changed.
    pub fn apply(&self, event: &LandEvent) -> bool {
        match event {
            LandEvent::Snapshot { seq, lands, .. } => {
                self.inner.last_seq.set(*seq);
                self.replace(lands.clone());
                true
            }
            LandEvent::Update { seq, changes, .. } => {
                let last = self.inner.last_seq.get();
                if *seq != 0 && *seq <= last {
                    tracing::debug!(seq, last, "ignoring stale land update");
                    return false;
                }
                if *seq != 0 {
                    self.inner.last_seq.set(*seq);
                }
                let next = apply_changes(&self.snapshot(), changes);
                self.replace(next);
                true
            }
        }
    }
}

impl LandDataSource for LandStore {
    fn snapshot(&self) -> LandSnapshot {
        self.inner.lands.borrow().clone()
    }

    fn subscribe(&self, listener: Box<dyn Fn(&LandSnapshot)>) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::from(listener)));
        Subscription {
            store: Rc::downgrade(&self.inner),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(json: &str) -> LandEvent {
        serde_json::from_str(json).expect("event json")
    }

    #[test]
    fn replace_notifies_until_subscription_dropped() {
        let store = LandStore::default();
        let seen = Rc::new(Cell::new(0usize));

        let sub = {
            let seen = seen.clone();
            store.subscribe(Box::new(move |lands| seen.set(lands.len())))
        };
        store.replace(vec![LandRecord::unclaimed(0), LandRecord::unclaimed(1)]);
        assert_eq!(seen.get(), 2);
        assert_eq!(store.listener_count(), 1);

        drop(sub);
        assert_eq!(store.listener_count(), 0);
        store.replace(vec![LandRecord::unclaimed(0)]);
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn stale_updates_are_ignored() {
        let store = LandStore::default();
        assert!(store.apply(&event(
            r#"{"type":"Snapshot","seq":5,"lands":[{"id":0}],"timestamp":"2026-01-01T00:00:00Z"}"#
        )));
        assert!(!store.apply(&event(
            r#"{"type":"Update","seq":5,"changes":[{"id":1}],"timestamp":"2026-01-01T00:00:01Z"}"#
        )));
        assert_eq!(store.len(), 1);

        assert!(store.apply(&event(
            r#"{"type":"Update","seq":6,"changes":[{"id":0,"owner_address":"0xa"},{"id":1}],"timestamp":"2026-01-01T00:00:02Z"}"#
        )));
        let lands = store.snapshot();
        assert_eq!(lands.len(), 2);
        assert_eq!(lands[0].owner_address.as_deref(), Some("0xa"));
    }
}
