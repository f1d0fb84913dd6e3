//! The shared byte ring between the serial producer thread and the core
//! ticker (§5). Single-producer/single-consumer, bounded, lock-free —
//! grounded on the `nolock::queues::spsc::bounded` queue used for the same
//! producer/ISR split in the pack's PS/2 keyboard driver.

use nolock::queues::spsc::bounded::{self, BoundedReceiver, BoundedSender};
use nolock::queues::DequeueError;

/// Producer-side handle: appends raw bytes as they arrive off the wire.
pub struct RingProducer {
    tx: BoundedSender<u8>,
    dropped: std::sync::Arc<std::sync::atomic::AtomicU64>,
}

/// Consumer-side handle: drained once per tick by the core ticker.
pub struct RingConsumer {
    rx: BoundedReceiver<u8>,
}

/// Create a bounded SPSC byte ring of `capacity` bytes. `capacity` must be a
/// power of two, per §3's "power-of-two capacity" rule and `nolock`'s own
/// requirement for its bounded queue.
pub fn byte_ring(capacity: usize) -> (RingProducer, RingConsumer) {
    let (rx, tx) = bounded::queue::<u8>(capacity);
    let dropped = std::sync::Arc::new(std::sync::atomic::AtomicU64::new(0));
    (RingProducer { tx, dropped: dropped.clone() }, RingConsumer { rx })
}

impl RingProducer {
    /// Append one byte. If the ring is full, drop the newest byte and bump
    /// the drop counter (§5 backpressure policy) — the parser resynchronizes
    /// on the next valid sync sequence, so silently losing bytes here is
    /// safe rather than blocking the producer.
    pub fn push(&mut self, byte: u8) {
        if self.tx.try_enqueue(byte).is_err() {
            self.dropped
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(std::sync::atomic::Ordering::Relaxed)
    }
}

impl RingConsumer {
    /// Drain every byte currently buffered into `out`, preserving arrival
    /// order. Never blocks — the core ticker must not block on I/O (§5).
    pub fn drain_into(&mut self, out: &mut Vec<u8>) {
        loop {
            match self.rx.try_dequeue() {
                Ok(byte) => out.push(byte),
                Err(DequeueError::Empty) => break,
                Err(DequeueError::Closed) => break,
            }
        }
    }
}
