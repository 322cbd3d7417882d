//! Subscriber registry for store change notification

use super::types::StoreSnapshot;

/// Token returned by [`crate::store::ModalStore::subscribe`]; pass it back to
/// `unsubscribe` to stop receiving notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Listener = Box<dyn Fn(&StoreSnapshot)>;

/// Listeners in registration order.
///
/// Notification is synchronous; listeners receive the committed snapshot by
/// value reference, so they never need to re-borrow the store.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    listeners: Vec<(SubscriberId, Listener)>,
    next_id: u64,
}

impl SubscriberRegistry {
    pub(crate) fn subscribe(&mut self, listener: Listener) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener; returns false if the id was already gone
    pub(crate) fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub(crate) fn notify(&self, snapshot: &StoreSnapshot) {
        for (_, listener) in &self.listeners {
            listener(snapshot);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
