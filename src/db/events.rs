//! Change notifications for playlist observers

use tokio::sync::broadcast;

/// Broadcasts the url of every playlist whose row or streams changed
#[derive(Clone)]
pub struct StoreEvents {
    tx: broadcast::Sender<String>,
}

impl Default for StoreEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self { tx }
    }

    pub fn notify(&self, url: &str) {
        // No receivers is fine
        let _ = self.tx.send(url.to_string());
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}
