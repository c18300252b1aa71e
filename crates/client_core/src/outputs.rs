use tokio::sync::broadcast;

/// Fan-out for controller output signals. Subscribers only see emissions
/// made after they subscribe; outputs are one-shot notifications, never
/// replayed state.
pub struct OutputHub<T> {
    sender: broadcast::Sender<T>,
}

impl<T: Clone> OutputHub<T> {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.subscribe()
    }

    // Emitting with no live subscribers is fine; the value is dropped.
    pub fn emit(&self, output: T) {
        let _ = self.sender.send(output);
    }
}

impl<T> Clone for OutputHub<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn late_subscribers_miss_earlier_emissions() {
        let hub = OutputHub::new(8);
        hub.emit(1u32);

        let mut rx = hub.subscribe();
        hub.emit(2);

        assert_eq!(rx.try_recv().expect("one emission"), 2);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn emissions_fan_out_to_every_subscriber() {
        let hub = OutputHub::new(8);
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        hub.emit(7u32);

        assert_eq!(a.try_recv().expect("emission for a"), 7);
        assert_eq!(b.try_recv().expect("emission for b"), 7);
    }
}
