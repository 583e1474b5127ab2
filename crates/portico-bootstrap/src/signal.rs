//! One-shot asynchronous cell filled at most once by an external callback.
//!
//! # Design
//! - Backed by `tokio::sync::watch` so any number of readers can wait with their own deadline.
//! - The first `send` or `fail` wins; later calls are reported back to the caller and ignored.
//! - Readers never error: a timeout or a dropped sender reads as `Signal::Pending`.

use std::time::Duration;

use tokio::sync::watch;

/// Observable state of the cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal<T> {
    /// Nothing has arrived yet.
    Pending,
    /// The callback delivered a value.
    Ready(T),
    /// The callback reported a failure.
    Failed(String),
}

/// Producer half, held by whatever owns the external callback.
#[derive(Debug)]
pub struct SignalSender<T> {
    tx: watch::Sender<Signal<T>>,
}

/// Consumer half; cheap to clone.
#[derive(Debug, Clone)]
pub struct SignalReceiver<T> {
    rx: watch::Receiver<Signal<T>>,
}

/// Create an empty cell.
#[must_use]
pub fn signal<T>() -> (SignalSender<T>, SignalReceiver<T>) {
    let (tx, rx) = watch::channel(Signal::Pending);
    (SignalSender { tx }, SignalReceiver { rx })
}

impl<T> SignalSender<T> {
    /// Fill the cell with `value`. Returns `false` when the cell was already settled.
    pub fn send(&self, value: T) -> bool {
        self.settle(Signal::Ready(value))
    }

    /// Record a failure. Returns `false` when the cell was already settled.
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.settle(Signal::Failed(reason.into()))
    }

    fn settle(&self, outcome: Signal<T>) -> bool {
        self.tx.send_if_modified(move |slot| {
            if matches!(slot, Signal::Pending) {
                *slot = outcome;
                true
            } else {
                false
            }
        })
    }
}

impl<T: Clone> SignalReceiver<T> {
    /// Wait until the cell settles or `timeout` elapses.
    pub async fn wait(&self, timeout: Duration) -> Signal<T> {
        let mut rx = self.rx.clone();
        match tokio::time::timeout(timeout, rx.wait_for(|slot| !matches!(slot, Signal::Pending)))
            .await
        {
            Ok(Ok(slot)) => (*slot).clone(),
            Ok(Err(_)) | Err(_) => Signal::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_value_wins() {
        let (tx, rx) = signal();
        assert!(tx.send(1_u8));
        assert!(!tx.send(2));
        assert!(!tx.fail("late"));
        assert_eq!(rx.wait(Duration::from_millis(10)).await, Signal::Ready(1));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_times_out_as_pending() {
        let (_tx, rx) = signal::<u8>();
        assert_eq!(rx.wait(Duration::from_secs(3)).await, Signal::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_observes_late_delivery() {
        let (tx, rx) = signal();
        let producer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            tx.send("ready".to_string());
            tx
        });
        assert_eq!(
            rx.wait(Duration::from_secs(3)).await,
            Signal::Ready("ready".to_string())
        );
        assert!(producer.await.is_ok());
    }

    #[tokio::test]
    async fn dropped_sender_reads_as_pending() {
        let (tx, rx) = signal::<u8>();
        drop(tx);
        assert_eq!(rx.wait(Duration::from_secs(1)).await, Signal::Pending);
    }
}
