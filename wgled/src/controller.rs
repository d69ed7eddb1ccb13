//! High-level board interface

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, trace};

use wgled_core::{Activate, BoardIdentity, CommandFrame, IndicatorId, LedOn, SequenceCounter};
use wgled_transport::{Endpoint, Transport};

use crate::error::Result;

/// How an indicator is switched off
///
/// The board protocol documents no "deactivate" command, so the behaviour is
/// an explicit deployment choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleasePolicy {
    /// Send nothing; the release is only logged
    #[default]
    Simulate,
    /// Send the same activate frame again
    Reactivate,
    /// Activate the same output in the opposite polarity bank (n ± 40)
    Counterpart,
}

impl fmt::Display for ReleasePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Simulate => "simulate",
            Self::Reactivate => "reactivate",
            Self::Counterpart => "counterpart",
        };
        f.write_str(name)
    }
}

/// Result of a command the workflow asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Frame handed to the transport
    Sent {
        indicator: IndicatorId,
        sequence: u32,
    },
    /// Policy says no frame
    Simulated,
    /// Encoding or transport failed
    Failed(String),
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent { indicator, sequence } => {
                write!(f, "sent to indicator {} (seq {})", indicator, sequence)
            }
            Self::Simulated => f.write_str("simulated, no frame sent"),
            Self::Failed(reason) => write!(f, "FAILED: {}", reason),
        }
    }
}

/// Controller board
///
/// Encodes commands for one board and hands them to the transport. Shared
/// between the workflow and the beacon task through an `Arc`.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use wgled::{Controller, IndicatorId};
/// use wgled_core::BoardIdentity;
/// use wgled_transport::UdpTransport;
///
/// #[tokio::main]
/// async fn main() -> wgled::Result<()> {
///     let mut transport = UdpTransport::new();
///     transport.bind().await?;
///
///     let board = BoardIdentity::new("192.168.0.10", 60000, 175111864);
///     let controller = Controller::new(board, 1, Arc::new(transport));
///
///     controller.activate(IndicatorId::new(1)).await?;
///     Ok(())
/// }
/// ```
pub struct Controller {
    board: BoardIdentity,
    endpoint: Endpoint,
    door: u8,
    transport: Arc<dyn Transport>,
    sequence: SequenceCounter,
    release_policy: ReleasePolicy,
}

impl Controller {
    /// Create a controller with a fresh sequence counter
    pub fn new(board: BoardIdentity, door: u8, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: Endpoint::from(&board),
            board,
            door,
            transport,
            sequence: SequenceCounter::new(),
            release_policy: ReleasePolicy::default(),
        }
    }

    /// Use a shared or pre-seeded sequence counter
    pub fn with_sequence(mut self, sequence: SequenceCounter) -> Self {
        self.sequence = sequence;
        self
    }

    /// Set release policy
    pub fn with_release_policy(mut self, policy: ReleasePolicy) -> Self {
        self.release_policy = policy;
        self
    }

    pub fn board(&self) -> &BoardIdentity {
        &self.board
    }

    pub fn door(&self) -> u8 {
        self.door
    }

    pub fn release_policy(&self) -> ReleasePolicy {
        self.release_policy
    }

    pub fn sequence(&self) -> &SequenceCounter {
        &self.sequence
    }

    /// Send one remote-activate frame for `indicator`
    ///
    /// Returns the sequence number used. Arguments are range-checked before a
    /// sequence number is taken, so rejected commands never consume one.
    pub async fn activate(&self, indicator: IndicatorId) -> Result<u32> {
        let command = Activate::new(self.door, indicator)?;
        let sequence = self.sequence.next_sequence()?;
        let frame = CommandFrame::encode(&self.board, &command, sequence);

        self.send_frame(&frame).await?;

        debug!(
            indicator = indicator.get(),
            sequence = sequence,
            "Activate sent to {}",
            self.endpoint
        );

        Ok(sequence)
    }

    /// Send one LED-on frame for `relay`
    ///
    /// Shares the sequence counter with [`Controller::activate`].
    pub async fn led_on(&self, relay: IndicatorId) -> Result<u32> {
        let command = LedOn::new(relay)?;
        let sequence = self.sequence.next_sequence()?;
        let frame = CommandFrame::encode_led_on(&self.board, &command, sequence);

        self.send_frame(&frame).await?;

        debug!(
            relay = relay.get(),
            sequence = sequence,
            "LED-on sent to {}",
            self.endpoint
        );

        Ok(sequence)
    }

    /// Switch `indicator` off according to the release policy
    pub async fn release(&self, indicator: IndicatorId) -> Result<Delivery> {
        match self.release_policy {
            ReleasePolicy::Simulate => {
                info!(indicator = indicator.get(), "[SIMULATED] Release, no frame sent");
                Ok(Delivery::Simulated)
            }
            ReleasePolicy::Reactivate => {
                let sequence = self.activate(indicator).await?;
                Ok(Delivery::Sent { indicator, sequence })
            }
            ReleasePolicy::Counterpart => {
                let target = indicator.counterpart()?;
                let sequence = self.activate(target).await?;
                Ok(Delivery::Sent {
                    indicator: target,
                    sequence,
                })
            }
        }
    }

    async fn send_frame(&self, frame: &CommandFrame) -> Result<()> {
        trace!("Sending: {:?}", frame);

        self.transport.send(&self.endpoint, frame.as_bytes()).await?;

        Ok(())
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("board", &self.board)
            .field("door", &self.door)
            .field("transport", &self.transport.describe())
            .field("next_sequence", &self.sequence.peek())
            .field("release_policy", &self.release_policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use pretty_assertions::assert_eq;

    fn controller(transport: Arc<RecordingTransport>) -> Controller {
        let board = BoardIdentity::new("10.0.0.5", 60000, 175111864);
        Controller::new(board, 1, transport).with_sequence(SequenceCounter::starting_at(10))
    }

    #[tokio::test]
    async fn test_activate_sends_frame() {
        let transport = Arc::new(RecordingTransport::new());
        let controller = controller(transport.clone());

        let seq = controller.activate(IndicatorId::new(3)).await.unwrap();
        assert_eq!(seq, 10);

        let sent = transport.frames();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].endpoint, Endpoint::new("10.0.0.5", 60000));
        assert_eq!(sent[0].frame.indicator(), IndicatorId::new(3));
        assert_eq!(sent[0].frame.door(), 1);
        assert_eq!(sent[0].frame.serial_number(), 175111864);
        assert_eq!(sent[0].frame.sequence(), 10);
    }

    #[tokio::test]
    async fn test_invalid_indicator_not_sent() {
        let transport = Arc::new(RecordingTransport::new());
        let controller = controller(transport.clone());

        let result = controller.activate(IndicatorId::new(0)).await;
        assert!(matches!(result, Err(crate::Error::Core(_))));
        assert!(transport.frames().is_empty());
        // No sequence number consumed
        assert_eq!(controller.sequence().peek(), 10);
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces() {
        let transport = Arc::new(RecordingTransport::new());
        transport.fail_sends(true);
        let controller = controller(transport.clone());

        let result = controller.activate(IndicatorId::new(1)).await;
        assert!(result.as_ref().is_err_and(|e| e.is_transport()));
    }

    #[tokio::test]
    async fn test_led_on_shares_sequence() {
        let transport = Arc::new(RecordingTransport::new());
        let controller = controller(transport.clone());

        assert_eq!(controller.activate(IndicatorId::new(1)).await.unwrap(), 10);
        assert_eq!(controller.led_on(IndicatorId::new(6)).await.unwrap(), 11);

        let sent = transport.frames();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].frame.function(), wgled_core::Function::LedOn);
        assert_eq!(sent[1].frame.indicator(), IndicatorId::new(6));
        assert_eq!(&sent[1].frame.as_bytes()[8..14], &[0x55, 0xAA, 0xAA, 0x55, 6, 0x01]);
        assert_eq!(sent[1].frame.sequence(), 11);
    }

    #[tokio::test]
    async fn test_led_on_invalid_relay_not_sent() {
        let transport = Arc::new(RecordingTransport::new());
        let controller = controller(transport.clone());

        assert!(controller.led_on(IndicatorId::new(81)).await.is_err());
        assert_eq!(transport.count(), 0);
        assert_eq!(controller.sequence().peek(), 10);
    }

    #[tokio::test]
    async fn test_release_simulate() {
        let transport = Arc::new(RecordingTransport::new());
        let controller = controller(transport.clone());

        let delivery = controller.release(IndicatorId::new(2)).await.unwrap();
        assert_eq!(delivery, Delivery::Simulated);
        assert!(transport.frames().is_empty());
    }

    #[tokio::test]
    async fn test_release_reactivate() {
        let transport = Arc::new(RecordingTransport::new());
        let controller = controller(transport.clone()).with_release_policy(ReleasePolicy::Reactivate);

        let delivery = controller.release(IndicatorId::new(2)).await.unwrap();
        assert_eq!(
            delivery,
            Delivery::Sent {
                indicator: IndicatorId::new(2),
                sequence: 10
            }
        );
        assert_eq!(transport.indicators(), vec![IndicatorId::new(2)]);
    }

    #[tokio::test]
    async fn test_release_counterpart() {
        let transport = Arc::new(RecordingTransport::new());
        let controller = controller(transport.clone()).with_release_policy(ReleasePolicy::Counterpart);

        let delivery = controller.release(IndicatorId::new(2)).await.unwrap();
        assert!(delivery.is_sent());
        assert_eq!(transport.indicators(), vec![IndicatorId::new(42)]);
    }
}
