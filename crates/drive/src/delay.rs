//! Computational delay between controller output and actuation.

use simcore::{Describe, Model, Summary};
use std::collections::VecDeque;

/// Fixed-length FIFO of commands.
///
/// The buffer is pre-filled with `T::default()`, so exactly `length`
/// commands are pending at all times and the start-up output is the
/// default (zero) command. A length of zero passes commands straight through.
#[derive(Debug, Clone)]
pub struct Delay<T> {
    length: usize,
    buffer: VecDeque<T>,
}

impl<T: Copy + Default> Delay<T> {
    pub fn new(length: usize) -> Self {
        let mut buffer = VecDeque::with_capacity(length);
        buffer.resize(length, T::default());
        Delay { length, buffer }
    }

    /// Configured delay in sample periods
    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of pending commands
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The command `push(command)` would return, without modifying the queue.
    pub fn peek(&self, command: T) -> T {
        self.buffer.front().copied().unwrap_or(command)
    }

    /// Returns the oldest pending command and enqueues `command`.
    pub fn push(&mut self, command: T) -> T {
        if self.length == 0 {
            return command;
        }
        self.buffer.push_back(command);
        self.buffer.pop_front().unwrap_or(command)
    }
}

impl<T: Copy + Default> Model for Delay<T> {
    fn reset(&mut self) {
        self.buffer.clear();
        self.buffer.resize(self.length, T::default());
    }
}

impl<T> Describe for Delay<T> {
    fn describe(&self) -> Summary {
        Summary::new("Computational delay").with("length", self.length as f64, "samples")
    }
}
