//! Explicit observer registration
//!
//! Components that announce changes (perspective, terrain reloads) own an
//! [`Observers`] list; consumers subscribe with a callback and keep the
//! returned [`Subscription`] to unsubscribe on teardown.

/// Handle returned by [`Observers::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subscription(u64);

/// Ordered list of callbacks notified with `&E`
pub struct Observers<E> {
    next_id: u64,
    callbacks: Vec<(Subscription, Box<dyn FnMut(&E)>)>,
}

impl<E> Observers<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            callbacks: Vec::new(),
        }
    }

    /// Register a callback. Callbacks run in subscription order.
    pub fn subscribe(&mut self, callback: impl FnMut(&E) + 'static) -> Subscription {
        let id = Subscription(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns false if the handle was already removed.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(id, _)| *id != subscription);
        self.callbacks.len() != before
    }

    /// Deliver an event to every subscriber
    pub fn notify(&mut self, event: &E) {
        for (_, callback) in self.callbacks.iter_mut() {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.callbacks.len())
            .finish()
    }
}
