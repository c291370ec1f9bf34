use std::sync::{Arc, Mutex};

use tailship::collector::{Collector, ForwardMessage, Outbound};
use tokio::sync::{mpsc, Notify};

/// A collector that keeps every message in memory.
#[derive(Clone, Default)]
pub struct CapturingCollector {
    messages: Arc<Mutex<Vec<ForwardMessage>>>,
    arrived: Arc<Notify>,
}

impl CapturingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<ForwardMessage> {
        self.messages.lock().unwrap().clone()
    }

    /// Message texts only, in arrival order.
    pub fn texts(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.message.clone())
            .collect()
    }

    /// Wait until at least `n` messages have arrived.
    pub async fn wait_for(&self, n: usize) {
        loop {
            let notified = self.arrived.notified();
            if self.messages.lock().unwrap().len() >= n {
                return;
            }
            notified.await;
        }
    }
}

impl Collector for CapturingCollector {
    fn start(self, capacity: usize) -> Outbound {
        let (packets_tx, mut packets_rx) = mpsc::channel::<ForwardMessage>(capacity.max(1));
        let (errors_tx, errors_rx) = mpsc::channel(1);

        tokio::spawn(async move {
            // Keep the error stream open for as long as packets flow.
            let _errors_tx = errors_tx;
            while let Some(msg) = packets_rx.recv().await {
                self.messages.lock().unwrap().push(msg);
                self.arrived.notify_waiters();
            }
        });

        Outbound {
            packets: packets_tx,
            errors: errors_rx,
        }
    }
}
