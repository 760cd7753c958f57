//! Per-frame beat delivery to registered listeners and channel subscribers.
//!
//! Delivery is not queued: each subscriber channel holds at most one event and
//! is drained at the start of every publish, so a consumer that does not poll
//! within the frame misses that frame's beats.

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, trace};

use crate::analyzer::BeatSet;

/// Bands that flagged a beat in one frame
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BeatEvent {
    pub frame: u64,
    pub bands: BeatSet,
}

/// Synchronous beat callback, invoked on the driving thread after the frame's batches join
pub trait BeatListener: Send {
    fn on_beats(&mut self, event: &BeatEvent);
}

impl<F> BeatListener for F
where
    F: FnMut(&BeatEvent) + Send,
{
    fn on_beats(&mut self, event: &BeatEvent) {
        self(event)
    }
}

struct Subscriber {
    sender: Sender<BeatEvent>,
    // Held so stale events can be discarded before the next frame's send
    drain: Receiver<BeatEvent>,
}

impl Subscriber {
    /// The bus holds one receiver itself; any more belong to consumers
    fn is_connected(&self) -> bool {
        self.sender.receiver_count() > 1
    }
}

/// Fan-out of beat events to listeners and channels
#[derive(Default)]
pub struct BeatBus {
    listeners: Vec<Box<dyn BeatListener>>,
    subscribers: Vec<Subscriber>,
}

impl BeatBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Box<dyn BeatListener>) {
        self.listeners.push(listener);
    }

    /// Open a channel that receives the latest frame's beats
    pub fn subscribe(&mut self) -> Receiver<BeatEvent> {
        let (sender, receiver) = bounded(1);
        self.subscribers.push(Subscriber {
            sender,
            drain: receiver.clone(),
        });
        receiver
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver one frame's beats, superseding anything undelivered from earlier frames
    ///
    /// Subscribers whose receiver has been dropped are removed first.
    pub fn publish(&mut self, frame: u64, bands: BeatSet) {
        let before = self.subscribers.len();
        self.subscribers.retain(Subscriber::is_connected);
        if self.subscribers.len() != before {
            debug!(
                "Dropped {} closed beat subscriber(s)",
                before - self.subscribers.len()
            );
        }

        for subscriber in &self.subscribers {
            while subscriber.drain.try_recv().is_ok() {}
        }

        if bands.is_empty() {
            return;
        }

        let event = BeatEvent { frame, bands };
        trace!("Beat frame={} bands={:#010x}", frame, bands.bits());

        for listener in &mut self.listeners {
            listener.on_beats(&event);
        }
        for subscriber in &self.subscribers {
            // Drained above and the bus is the only sender, so there is always room
            let _ = subscriber.sender.try_send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_listener_sees_nonempty_frames_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut bus = BeatBus::new();
        bus.add_listener(Box::new(move |event: &BeatEvent| {
            sink.lock().unwrap().push(*event);
        }));

        bus.publish(1, BeatSet::EMPTY);
        bus.publish(2, BeatSet::from_bits(0b101));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].frame, 2);
        assert_eq!(seen[0].bands.iter().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_unpolled_event_is_superseded() {
        let mut bus = BeatBus::new();
        let rx = bus.subscribe();

        bus.publish(1, BeatSet::from_bits(1));
        bus.publish(2, BeatSet::from_bits(2));

        let event = rx.try_recv().unwrap();
        assert_eq!(event.frame, 2);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_silent_frame_clears_stale_event() {
        let mut bus = BeatBus::new();
        let rx = bus.subscribe();

        bus.publish(1, BeatSet::from_bits(1));
        bus.publish(2, BeatSet::EMPTY);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receivers_are_pruned() {
        let mut bus = BeatBus::new();
        let kept = bus.subscribe();

        for frame in 0..1000 {
            let rx = bus.subscribe();
            drop(rx);
            bus.publish(frame, BeatSet::from_bits(1));
        }
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(1000, BeatSet::from_bits(4));
        assert_eq!(kept.try_recv().unwrap().frame, 1000);
    }

    #[test]
    fn test_cloned_receiver_keeps_subscription() {
        let mut bus = BeatBus::new();
        let rx = bus.subscribe();
        let clone = rx.clone();
        drop(rx);

        bus.publish(3, BeatSet::from_bits(2));
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(clone.try_recv().unwrap().frame, 3);
    }

    #[test]
    fn test_every_subscriber_receives() {
        let mut bus = BeatBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(5, BeatSet::from_bits(1 << 31));
        assert_eq!(a.try_recv().unwrap().frame, 5);
        assert_eq!(b.try_recv().unwrap().frame, 5);
    }
}
