use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Resize(#[allow(dead_code)] u16, #[allow(dead_code)] u16),
}

/// Polls the terminal on the calling thread. Input is handled strictly in
/// order: the next event is read only after the previous one was processed.
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        if !event::poll(self.tick_rate)? {
            return Ok(AppEvent::Tick);
        }
        Ok(match event::read()? {
            Event::Key(key) => AppEvent::Key(key),
            Event::Resize(w, h) => AppEvent::Resize(w, h),
            _ => AppEvent::Tick,
        })
    }
}
