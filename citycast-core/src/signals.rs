use tokio::sync::broadcast;

/// System-level events the screen reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformSignal {
    /// The on-screen keyboard was dismissed.
    KeyboardHidden,
    /// The hardware back button was pressed.
    BackPressed,
}

const CAPACITY: usize = 16;

/// Broadcast source for [`PlatformSignal`]s.
///
/// The platform layer owns one of these and calls [`emit`](Self::emit);
/// screens hold a [`SignalListener`] only while mounted.
#[derive(Debug, Clone)]
pub struct PlatformSignals {
    tx: broadcast::Sender<PlatformSignal>,
}

impl Default for PlatformSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformSignals {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CAPACITY);
        Self { tx }
    }

    /// Returns how many listeners received the signal.
    pub fn emit(&self, signal: PlatformSignal) -> usize {
        self.tx.send(signal).unwrap_or(0)
    }

    pub fn listen(&self) -> SignalListener {
        SignalListener { rx: self.tx.subscribe() }
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A registered listener; dropping it deregisters.
#[derive(Debug)]
pub struct SignalListener {
    rx: broadcast::Receiver<PlatformSignal>,
}

impl SignalListener {
    /// Next signal, or `None` once the source is gone.
    pub async fn recv(&mut self) -> Option<PlatformSignal> {
        loop {
            match self.rx.recv().await {
                Ok(signal) => return Some(signal),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Platform signals lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
