//! In-memory transport for tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use wgled_core::{CommandFrame, IndicatorId};
use wgled_transport::{Endpoint, Error, Result, Transport};

#[derive(Debug, Clone)]
pub(crate) struct SentFrame {
    pub endpoint: Endpoint,
    pub frame: CommandFrame,
    pub at: Instant,
}

/// Records every frame instead of sending it
#[derive(Debug, Default)]
pub(crate) struct RecordingTransport {
    sent: Mutex<Vec<SentFrame>>,
    fail: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following send fail (the frame is not recorded)
    pub fn fail_sends(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn frames(&self) -> Vec<SentFrame> {
        self.sent.lock().unwrap().clone()
    }

    pub fn indicators(&self) -> Vec<IndicatorId> {
        self.frames().iter().map(|s| s.frame.indicator()).collect()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, endpoint: &Endpoint, data: &[u8]) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::ErrorKind::HostUnreachable.into()));
        }

        let frame = CommandFrame::try_from(data).expect("transport received a malformed frame");

        self.sent.lock().unwrap().push(SentFrame {
            endpoint: endpoint.clone(),
            frame,
            at: Instant::now(),
        });
        Ok(())
    }

    fn describe(&self) -> String {
        "memory://recording".to_string()
    }
}
