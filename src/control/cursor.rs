//! # Shared Cursor Delta
//!
//! The packet ingest worker writes the latest joystick displacement; the
//! cursor mover reads it on every tick, at its own rate. The value lives in a
//! `tokio::sync::watch` channel, so readers always observe the most recently
//! stored delta without ever blocking the writer.

use tokio::sync::watch;

/// Joystick displacement from center, after deadzone filtering.
///
/// Positive `dx` moves right, positive `dy` moves up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorDelta {
    pub dx: i32,
    pub dy: i32,
}

impl CursorDelta {
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// True when the joystick rests inside the deadzone on both axes.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Create the shared cell, starting at rest.
///
/// # Examples
///
/// ```
/// use nunchuk_receiver::control::cursor::{cursor_channel, CursorDelta};
///
/// let (writer, reader) = cursor_channel();
/// writer.store(CursorDelta::new(72, 0));
/// assert_eq!(reader.current(), CursorDelta::new(72, 0));
/// ```
#[must_use]
pub fn cursor_channel() -> (CursorWriter, CursorReader) {
    let (tx, rx) = watch::channel(CursorDelta::default());
    (CursorWriter { tx }, CursorReader { rx })
}

/// Single writer half, owned by the packet ingest worker.
#[derive(Debug)]
pub struct CursorWriter {
    tx: watch::Sender<CursorDelta>,
}

impl CursorWriter {
    /// Replace the shared delta. Succeeds even when no reader is left.
    pub fn store(&self, delta: CursorDelta) {
        self.tx.send_replace(delta);
    }

    /// Last stored delta, used as the carry-over for axes that report no change.
    #[must_use]
    pub fn latest(&self) -> CursorDelta {
        *self.tx.borrow()
    }
}

/// Reader half, cloned into every consumer.
#[derive(Debug, Clone)]
pub struct CursorReader {
    rx: watch::Receiver<CursorDelta>,
}

impl CursorReader {
    /// Snapshot of the most recently stored delta.
    #[must_use]
    pub fn current(&self) -> CursorDelta {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_rest() {
        let (writer, reader) = cursor_channel();
        assert!(reader.current().is_idle());
        assert!(writer.latest().is_idle());
    }

    #[test]
    fn test_reader_sees_latest_store() {
        let (writer, reader) = cursor_channel();
        writer.store(CursorDelta::new(10, -20));
        writer.store(CursorDelta::new(-30, 40));

        assert_eq!(reader.current(), CursorDelta::new(-30, 40));
        assert_eq!(writer.latest(), CursorDelta::new(-30, 40));
    }

    #[test]
    fn test_store_without_readers() {
        let (writer, reader) = cursor_channel();
        drop(reader);
        writer.store(CursorDelta::new(9, 9));
        assert_eq!(writer.latest(), CursorDelta::new(9, 9));
    }

    #[test]
    fn test_clones_share_value() {
        let (writer, reader) = cursor_channel();
        let cloned = reader.clone();
        writer.store(CursorDelta::new(1, 2));

        assert_eq!(reader.current(), CursorDelta::new(1, 2));
        assert_eq!(cloned.current(), CursorDelta::new(1, 2));
    }

    #[tokio::test]
    async fn test_concurrent_writer_and_reader() {
        let (writer, reader) = cursor_channel();

        let producer = tokio::spawn(async move {
            for i in 0..1000 {
                writer.store(CursorDelta::new(i, -i));
                tokio::task::yield_now().await;
            }
            writer
        });

        let consumer = tokio::spawn(async move {
            for _ in 0..1000 {
                // Every snapshot is a consistent pair from a single store
                let delta = reader.current();
                assert_eq!(delta.dx, -delta.dy);
                tokio::task::yield_now().await;
            }
        });

        let writer = producer.await.unwrap();
        consumer.await.unwrap();
        assert_eq!(writer.latest(), CursorDelta::new(999, -999));
    }
}
