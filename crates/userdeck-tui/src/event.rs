//! Terminal event reader running in a background tokio task.
//!
//! Key presses and resizes from crossterm, plus tick/render heartbeats,
//! delivered over one `mpsc` channel.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    /// Terminal was resized to (cols, rows).
    Resize(u16, u16),
    /// Slow heartbeat (4 Hz).
    Tick,
    /// Frame heartbeat (~30 FPS).
    Render,
}

pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    pub fn new(tick_rate: Duration, render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let mut terminal_events = EventStream::new();
            let mut ticks = tokio::time::interval(tick_rate);
            let mut frames = tokio::time::interval(render_rate);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                let event = tokio::select! {
                    () = task_cancel.cancelled() => break,
                    _ = ticks.tick() => Event::Tick,
                    _ = frames.tick() => Event::Render,
                    Some(Ok(raw)) = terminal_events.next() => match raw {
                        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
                        CrosstermEvent::Resize(w, h) => Event::Resize(w, h),
                        _ => continue,
                    },
                };

                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, cancel }
    }

    /// Next event, or `None` once the reader has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
