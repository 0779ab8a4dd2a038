/// Handle returned by [`Observers::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Ordered registry of zero-argument change callbacks.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Box<dyn FnMut()>)>,
}

impl Observers {
    pub fn subscribe(&mut self, callback: impl FnMut() + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(existing, _)| *existing != id);
        self.callbacks.len() != before
    }

    /// Call every subscriber once, in registration order.
    pub fn notify(&mut self) {
        for (_, callback) in self.callbacks.iter_mut() {
            callback();
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}
