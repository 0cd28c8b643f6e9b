//! Navigation seam used when a login succeeds.

use std::sync::Mutex;

/// Performs a full navigation to a URL.
///
/// The exchange response sets the session cookie, so implementations must
/// load the target fresh (a browser page load, an opened browser tab, a
/// printed link) rather than switch routes in place.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
}

/// Navigator that remembers every target it was asked to open.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits
            .lock()
            .map(|visits| visits.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        if let Ok(mut visits) = self.visits.lock() {
            visits.push(url.to_string());
        }
    }
}
