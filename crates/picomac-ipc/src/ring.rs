//! Lock-free single-producer / single-consumer ring of key events.
//!
//! Design:
//! - Fixed arena of [`KEY_RING_SLOTS`] atomic `u16` slots; no allocation after construction.
//! - `head` is only ever written by the consumer, `tail` only by the producer. Both are stored
//!   already wrapped into `0..KEY_RING_SLOTS`.
//! - The producer writes the slot, then publishes `tail` with `Release`. The consumer reads the
//!   slot, then publishes `head` with `Release`. Each side observes the other's index with
//!   `Acquire`.
//! - Full is `(tail + 1) % slots == head`, so one slot stays unused and `head == tail` always
//!   means empty.
//! - On overflow the newest event is dropped; nothing blocks and nothing is overwritten.
//!
//! Exactly one producer context and one consumer context may use a ring at a time. The type is
//! `Sync` so both sides can share it through an `Arc` or a `static`, but two concurrent producers
//! (or consumers) would race on the same index.

#[cfg(all(feature = "loom", test))]
use loom::sync::atomic::{AtomicU16, AtomicU32};
#[cfg(not(all(feature = "loom", test)))]
use std::sync::atomic::{AtomicU16, AtomicU32};

use std::sync::atomic::Ordering;

use crate::layout::{KEY_RING_MASK, KEY_RING_SLOTS};
use crate::protocol::EncodedKeyEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushError {
    /// All usable slots are occupied; the event was dropped.
    Full,
}

pub struct KeyEventRing {
    head: AtomicU32,
    tail: AtomicU32,
    slots: [AtomicU16; KEY_RING_SLOTS],
}

impl KeyEventRing {
    pub fn new() -> Self {
        Self {
            head: AtomicU32::new(0),
            tail: AtomicU32::new(0),
            slots: std::array::from_fn(|_| AtomicU16::new(0)),
        }
    }

    pub fn capacity(&self) -> usize {
        KEY_RING_SLOTS - 1
    }

    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Number of queued events. Only a hint while the other side is running.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (tail.wrapping_sub(head) & KEY_RING_MASK) as usize
    }

    /// Producer side: enqueue one event, dropping it if the ring is full.
    pub fn try_push(&self, event: EncodedKeyEvent) -> Result<(), PushError> {
        let tail = self.tail.load(Ordering::Relaxed);
        let next = (tail + 1) & KEY_RING_MASK;
        if next == self.head.load(Ordering::Acquire) {
            return Err(PushError::Full);
        }

        self.slots[tail as usize].store(event.raw(), Ordering::Relaxed);
        self.tail.store(next, Ordering::Release);
        Ok(())
    }

    /// Consumer side: dequeue the oldest event.
    pub fn try_pop(&self) -> Option<EncodedKeyEvent> {
        let head = self.head.load(Ordering::Relaxed);
        if head == self.tail.load(Ordering::Acquire) {
            return None;
        }

        let raw = self.slots[head as usize].load(Ordering::Relaxed);
        self.head.store((head + 1) & KEY_RING_MASK, Ordering::Release);

        // Slots are only ever written with encoded events, so this cannot fail unless memory
        // was corrupted underneath us; treat that the same as an empty read.
        EncodedKeyEvent::from_raw(raw)
    }

    /// Consumer side: discard everything currently queued.
    pub fn clear(&self) {
        while self.try_pop().is_some() {}
    }
}

impl Default for KeyEventRing {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KeyEventRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyEventRing")
            .field("head", &self.head.load(Ordering::Relaxed))
            .field("tail", &self.tail.load(Ordering::Relaxed))
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;

    fn ev(code: u8, pressed: bool) -> EncodedKeyEvent {
        EncodedKeyEvent::from_keycode(code, pressed)
    }

    #[test]
    fn new_ring_is_empty() {
        let ring = KeyEventRing::new();
        assert!(ring.is_empty());
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.try_pop(), None);
        assert_eq!(ring.capacity(), 31);
    }

    #[test]
    fn thirty_second_push_is_rejected() {
        let ring = KeyEventRing::new();
        for i in 0..31u8 {
            assert_eq!(ring.try_push(ev(i, true)), Ok(()));
        }
        assert_eq!(ring.len(), 31);
        assert_eq!(ring.try_push(ev(0x7F, true)), Err(PushError::Full));

        // Freeing one slot makes room for exactly one more.
        assert_eq!(ring.try_pop(), Some(ev(0, true)));
        assert_eq!(ring.try_push(ev(0x7F, true)), Ok(()));
        assert_eq!(ring.try_push(ev(0x7E, true)), Err(PushError::Full));
    }

    #[test]
    fn indices_wrap_around_the_arena() {
        let ring = KeyEventRing::new();
        for round in 0..5u8 {
            for i in 0..20u8 {
                ring.try_push(ev(i, round % 2 == 0)).unwrap();
            }
            for i in 0..20u8 {
                assert_eq!(ring.try_pop(), Some(ev(i, round % 2 == 0)));
            }
            assert!(ring.is_empty());
        }
    }

    #[test]
    fn clear_empties_the_ring() {
        let ring = KeyEventRing::new();
        ring.try_push(ev(1, true)).unwrap();
        ring.try_push(ev(1, false)).unwrap();
        ring.clear();
        assert!(ring.is_empty());
    }
}
