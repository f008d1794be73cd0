//! Timer-based coalescing of rapid calls.
//!
//! A [`Debouncer`] forwards only the last value of a burst, once the burst has
//! been quiet for the configured window.

use std::time::Duration;
use tokio::{sync::mpsc, task::JoinHandle};

enum Command<T> {
    Call(T),
    Cancel,
}

#[derive(Debug)]
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<Command<T>>,
    worker: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawns the timer task on the current tokio runtime.
    pub fn new<F>(window: Duration, mut on_settle: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let worker = tokio::spawn(async move {
            let mut pending: Option<T> = None;

            loop {
                let command = match pending.take() {
                    None => match rx.recv().await {
                        Some(command) => command,
                        None => break,
                    },
                    Some(value) => {
                        tokio::select! {
                            command = rx.recv() => match command {
                                Some(command) => command,
                                None => break,
                            },
                            _ = tokio::time::sleep(window) => {
                                on_settle(value);
                                continue;
                            }
                        }
                    }
                };

                pending = match command {
                    Command::Call(value) => Some(value),
                    Command::Cancel => None,
                };
            }
        });

        Self { tx, worker }
    }

    /// Restart the quiet window with `value` as the latest argument.
    pub fn call(&self, value: T) {
        // The worker only stops once the debouncer is dropped.
        let _ = self.tx.send(Command::Call(value));
    }

    /// Drop any pending value without firing.
    pub fn cancel(&self) {
        let _ = self.tx.send(Command::Cancel);
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.worker.abort();
    }
}
