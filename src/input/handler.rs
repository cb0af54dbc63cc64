//! Terminal event source.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, Stdin};
use termion::event::Event;
use termion::input::{Events, TermRead};

/// Where events are read from. The iterator is kept across calls so input
/// that arrives in bursts (pastes) is not lost.
enum EventSource {
    Stdin(Events<Stdin>),
    /// `/dev/tty`, used when stdin carried the document.
    Tty(Events<File>),
}

/// Reads termion events for the event loop.
pub struct InputHandler {
    events: EventSource,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            events: EventSource::Stdin(io::stdin().events()),
        }
    }

    /// Reads from `/dev/tty`. Use this when stdin has been consumed for
    /// piped data.
    pub fn new_with_tty() -> Result<Self> {
        let tty_file = File::options()
            .read(true)
            .write(true)
            .open("/dev/tty")
            .context("Failed to open /dev/tty for keyboard input")?;
        Ok(Self {
            events: EventSource::Tty(tty_file.events()),
        })
    }

    /// Blocks until the next event. `None` when the input is closed.
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        let next = match &mut self.events {
            EventSource::Stdin(events) => events.next(),
            EventSource::Tty(events) => events.next(),
        };
        match next {
            Some(event) => Ok(Some(event.context("Failed to read terminal input")?)),
            None => Ok(None),
        }
    }
}
