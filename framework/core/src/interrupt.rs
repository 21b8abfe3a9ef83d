use std::sync::Arc;

use tokio::sync::broadcast::{Receiver, Sender};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct InterruptHandle {
    sender: Sender<()>,
}

impl Default for InterruptHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptHandle {
    pub fn new() -> Self {
        Self {
            sender: tokio::sync::broadcast::channel(1).0,
        }
    }

    /// Request that the sweep stops at the next job boundary. A job that is already running is
    /// never cancelled.
    pub fn interrupt(&self) {
        if let Err(e) = self.sender.send(()) {
            // Will fail if nobody is listening for an interrupt, in which case the log message
            // can be ignored.
            log::warn!("Failed to send interrupt signal: {e:?}");
        }
    }

    pub fn new_listener(&self) -> DelegatedInterruptListener {
        DelegatedInterruptListener::new(self.sender.subscribe())
    }
}

#[derive(Clone, Debug)]
pub struct DelegatedInterruptListener {
    receiver: Arc<Mutex<Receiver<()>>>,
}

impl DelegatedInterruptListener {
    pub(crate) fn new(receiver: Receiver<()>) -> Self {
        Self {
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Point in time check whether an interrupt has been received. The orchestration loop calls
    /// this between jobs, so an interrupt only takes effect before the next job starts.
    pub fn should_stop(&mut self) -> bool {
        match self.receiver.try_lock() {
            Ok(mut guard) => {
                match guard.try_recv() {
                    Ok(_) => true,
                    Err(tokio::sync::broadcast::error::TryRecvError::Closed) => true,
                    // If the receiver is empty or lagged then no interrupt has been requested.
                    Err(_) => false,
                }
            }
            Err(_) => false,
        }
    }
}

#[derive(derive_more::Error, derive_more::Display, Debug)]
pub struct SweepInterruptedError {
    msg: String,
}

impl Default for SweepInterruptedError {
    fn default() -> Self {
        Self {
            msg: "Sweep interrupted between jobs".to_string(),
        }
    }
}
