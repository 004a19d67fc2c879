//! Keyboard bus capability.

use std::collections::VecDeque;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("keyboard bus transaction timed out")]
    Timeout,

    #[error("keyboard controller did not acknowledge")]
    Nack,

    #[error("keyboard bus error: {0}")]
    Transport(String),
}

/// Source of controller FIFO words (see [`crate::RawKeyEvent::from_fifo_word`]).
///
/// Implementations must return within a bounded time; an idle keyboard yields `Ok(0)`.
pub trait KeyboardBus {
    fn read_fifo(&mut self) -> Result<u16, BusError>;

    /// Discard pending events. Stops at the first empty word or error, and after `limit` reads.
    fn drain(&mut self, limit: usize) -> usize {
        let mut drained = 0;
        while drained < limit {
            match self.read_fifo() {
                Ok(0) | Err(_) => break,
                Ok(_) => drained += 1,
            }
        }
        drained
    }
}

impl<B: KeyboardBus + ?Sized> KeyboardBus for &mut B {
    fn read_fifo(&mut self) -> Result<u16, BusError> {
        (**self).read_fifo()
    }
}

/// In-memory keyboard that replays a fixed sequence of FIFO words (and errors).
#[derive(Debug, Default)]
pub struct ScriptedKeyboard {
    words: VecDeque<Result<u16, BusError>>,
}

impl ScriptedKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_word(&mut self, word: u16) {
        self.words.push_back(Ok(word));
    }

    pub fn push_event(&mut self, event: crate::RawKeyEvent) {
        self.push_word(event.to_fifo_word());
    }

    pub fn push_error(&mut self, err: BusError) {
        self.words.push_back(Err(err));
    }

    pub fn remaining(&self) -> usize {
        self.words.len()
    }
}

impl KeyboardBus for ScriptedKeyboard {
    fn read_fifo(&mut self) -> Result<u16, BusError> {
        self.words.pop_front().unwrap_or(Ok(0))
    }
}

impl Extend<crate::RawKeyEvent> for ScriptedKeyboard {
    fn extend<T: IntoIterator<Item = crate::RawKeyEvent>>(&mut self, iter: T) {
        for ev in iter {
            self.push_event(ev);
        }
    }
}
