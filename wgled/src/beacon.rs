//! Locate beacon
//!
//! Keeps one indicator lit while an export waits for confirmation by
//! re-sending its activate frame at a fixed interval.
//!
//! The beacon runs as a dedicated task that owns all ticking state. Callers
//! talk to it only through [`Beacon`], which forwards `Start`/`Stop` commands
//! over a channel:
//!
//! ```text
//!  Workflow ──start(ind)──►┐
//!           ──stop()──────►│ mpsc ──► beacon task ──every interval──► Controller::activate
//!           ◄──ack─────────┘ oneshot
//! ```
//!
//! At most one indicator beacons at a time. A stop is acknowledged by the task
//! after it has given up its ticker, so once [`Beacon::stop`] reports
//! [`StopOutcome::Stopped`] no further frames go out.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use wgled_core::constants::{DEFAULT_BEACON_INTERVAL_MS, DEFAULT_STOP_TIMEOUT_MS};
use wgled_core::IndicatorId;

use crate::controller::Controller;
use crate::error::{Error, Result};

/// Beacon timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeaconConfig {
    /// Re-send period (must be non-zero)
    pub interval: Duration,
    /// How long `stop()` waits for the task to acknowledge
    pub stop_timeout: Duration,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_BEACON_INTERVAL_MS),
            stop_timeout: Duration::from_millis(DEFAULT_STOP_TIMEOUT_MS),
        }
    }
}

/// How a stop request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Task acknowledged; no more frames will be sent
    Stopped,
    /// Task did not acknowledge within the bound; at most the frame in
    /// flight may still go out
    Abandoned,
}

enum BeaconCommand {
    Start(IndicatorId),
    Stop(oneshot::Sender<()>),
    Shutdown,
}

/// Handle to the beacon task
///
/// Dropping the handle ends the task.
pub struct Beacon {
    cmd_tx: mpsc::Sender<BeaconCommand>,
    active_rx: watch::Receiver<Option<IndicatorId>>,
    stop_timeout: Duration,
    task: JoinHandle<()>,
}

impl Beacon {
    /// Spawn the beacon task on the current Tokio runtime
    ///
    /// # Panics
    ///
    /// Panics if `config.interval` is zero.
    pub fn spawn(controller: Arc<Controller>, config: BeaconConfig) -> Self {
        assert!(!config.interval.is_zero(), "beacon interval must be non-zero");

        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (active_tx, active_rx) = watch::channel(None);

        let task = BeaconTask {
            controller,
            period: config.interval,
            cmd_rx,
            active_tx,
        };

        let task = tokio::spawn(task.run());

        Self {
            cmd_tx,
            active_rx,
            stop_timeout: config.stop_timeout,
            task,
        }
    }

    /// Start beaconing `indicator`
    ///
    /// Replaces a beacon running for another indicator. Starting the indicator
    /// that is already beaconing changes nothing.
    pub async fn start(&self, indicator: IndicatorId) -> Result<()> {
        self.cmd_tx
            .send(BeaconCommand::Start(indicator))
            .await
            .map_err(|_| Error::BeaconClosed)
    }

    /// Stop the running beacon, waiting at most the configured bound
    pub async fn stop(&self) -> Result<StopOutcome> {
        let (ack_tx, ack_rx) = oneshot::channel();

        self.cmd_tx
            .send(BeaconCommand::Stop(ack_tx))
            .await
            .map_err(|_| Error::BeaconClosed)?;

        match timeout(self.stop_timeout, ack_rx).await {
            Ok(Ok(())) => Ok(StopOutcome::Stopped),
            Ok(Err(_)) => Err(Error::BeaconClosed),
            Err(_) => {
                warn!(
                    "Beacon did not stop within {:?}, abandoning it",
                    self.stop_timeout
                );
                Ok(StopOutcome::Abandoned)
            }
        }
    }

    /// Indicator currently beaconing
    pub fn active(&self) -> Option<IndicatorId> {
        *self.active_rx.borrow()
    }

    /// End the task
    pub async fn shutdown(self) {
        if self.cmd_tx.send(BeaconCommand::Shutdown).await.is_err() {
            return;
        }

        let mut task = self.task;
        if timeout(self.stop_timeout, &mut task).await.is_err() {
            warn!("Beacon task did not exit in time, aborting");
            task.abort();
        }
    }
}

struct BeaconTask {
    controller: Arc<Controller>,
    period: Duration,
    cmd_rx: mpsc::Receiver<BeaconCommand>,
    active_tx: watch::Sender<Option<IndicatorId>>,
}

impl BeaconTask {
    async fn run(mut self) {
        debug!(period = ?self.period, "Beacon task started");

        let mut active: Option<(IndicatorId, Interval)> = None;

        loop {
            tokio::select! {
                biased;

                cmd = self.cmd_rx.recv() => match cmd {
                    Some(BeaconCommand::Start(indicator)) => self.start(&mut active, indicator),
                    Some(BeaconCommand::Stop(ack)) => {
                        self.stop(&mut active);
                        let _ = ack.send(());
                    }
                    Some(BeaconCommand::Shutdown) | None => {
                        self.stop(&mut active);
                        break;
                    }
                },
                indicator = next_tick(&mut active) => {
                    if let Err(e) = self.controller.activate(indicator).await {
                        warn!(indicator = indicator.get(), "Beacon send failed: {}", e);
                    }
                }
            }
        }

        debug!("Beacon task stopped");
    }

    fn start(&self, active: &mut Option<(IndicatorId, Interval)>, indicator: IndicatorId) {
        match active {
            Some((current, _)) if *current == indicator => {
                debug!(indicator = indicator.get(), "Beacon already running");
                return;
            }
            Some((current, _)) => {
                info!(
                    from = current.get(),
                    to = indicator.get(),
                    "Beacon switched to another indicator"
                );
            }
            None => {
                info!(indicator = indicator.get(), "Beacon started");
            }
        }

        // First tick completes immediately
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        *active = Some((indicator, ticker));
        self.active_tx.send_replace(Some(indicator));
    }

    fn stop(&self, active: &mut Option<(IndicatorId, Interval)>) {
        if let Some((indicator, _)) = active.take() {
            info!(indicator = indicator.get(), "Beacon stopped");
        }
        self.active_tx.send_replace(None);
    }
}

async fn next_tick(active: &mut Option<(IndicatorId, Interval)>) -> IndicatorId {
    match active {
        Some((indicator, ticker)) => {
            ticker.tick().await;
            *indicator
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tokio::time::{sleep, Instant};
    use wgled_core::BoardIdentity;
    use wgled_transport::{Endpoint, Transport};

    fn setup() -> (Arc<RecordingTransport>, Beacon) {
        let transport = Arc::new(RecordingTransport::new());
        let controller = Controller::new(
            BoardIdentity::new("10.0.0.5", 60000, 42),
            1,
            transport.clone(),
        );
        let beacon = Beacon::spawn(Arc::new(controller), BeaconConfig::default());
        (transport, beacon)
    }

    #[tokio::test(start_paused = true)]
    async fn test_beacon_cadence() {
        let (transport, beacon) = setup();

        beacon.start(IndicatorId::new(7)).await.unwrap();
        sleep(Duration::from_millis(1250)).await;
        assert_eq!(beacon.stop().await.unwrap(), StopOutcome::Stopped);

        let frames = transport.frames();
        assert_eq!(frames.len(), 3);
        assert!(frames.iter().all(|f| f.frame.indicator() == IndicatorId::new(7)));
        for pair in frames.windows(2) {
            assert_eq!(pair[1].at - pair[0].at, Duration::from_millis(500));
        }

        // Quiet after stop
        sleep(Duration::from_secs(2)).await;
        assert_eq!(transport.count(), 3);
        assert_eq!(beacon.active(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_beacon_sequence_increases() {
        let (transport, beacon) = setup();

        beacon.start(IndicatorId::new(1)).await.unwrap();
        sleep(Duration::from_millis(2100)).await;
        beacon.stop().await.unwrap();

        let seqs: Vec<u32> = transport.frames().iter().map(|f| f.frame.sequence()).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_beacon_supersede() {
        let (transport, beacon) = setup();

        beacon.start(IndicatorId::new(1)).await.unwrap();
        sleep(Duration::from_millis(600)).await;
        beacon.start(IndicatorId::new(2)).await.unwrap();
        sleep(Duration::from_millis(600)).await;

        assert_eq!(beacon.active(), Some(IndicatorId::new(2)));
        beacon.stop().await.unwrap();

        assert_eq!(
            transport.indicators(),
            vec![
                IndicatorId::new(1),
                IndicatorId::new(1),
                IndicatorId::new(2),
                IndicatorId::new(2),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_beacon_start_same_indicator_is_noop() {
        let (transport, beacon) = setup();

        beacon.start(IndicatorId::new(3)).await.unwrap();
        sleep(Duration::from_millis(100)).await;
        beacon.start(IndicatorId::new(3)).await.unwrap();
        sleep(Duration::from_millis(1000)).await;
        beacon.stop().await.unwrap();

        // Ticks at 0, 500, 1000; the second start did not restart the ticker
        assert_eq!(transport.count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_when_idle() {
        let (transport, beacon) = setup();

        assert_eq!(beacon.stop().await.unwrap(), StopOutcome::Stopped);
        assert_eq!(beacon.active(), None);
        assert_eq!(transport.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_failure_keeps_beacon_running() {
        let (transport, beacon) = setup();
        transport.fail_sends(true);

        beacon.start(IndicatorId::new(1)).await.unwrap();
        sleep(Duration::from_millis(1100)).await;
        assert_eq!(transport.count(), 0);
        assert_eq!(beacon.active(), Some(IndicatorId::new(1)));

        transport.fail_sends(false);
        sleep(Duration::from_millis(500)).await;
        assert_eq!(transport.count(), 1);

        beacon.stop().await.unwrap();
    }

    struct StalledTransport;

    #[async_trait]
    impl Transport for StalledTransport {
        async fn send(&self, _endpoint: &Endpoint, _data: &[u8]) -> wgled_transport::Result<()> {
            sleep(Duration::from_secs(5)).await;
            Ok(())
        }

        fn describe(&self) -> String {
            "stalled".to_string()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_bounded() {
        let controller = Controller::new(
            BoardIdentity::new("10.0.0.5", 60000, 42),
            1,
            Arc::new(StalledTransport),
        );
        let beacon = Beacon::spawn(Arc::new(controller), BeaconConfig::default());

        beacon.start(IndicatorId::new(1)).await.unwrap();
        sleep(Duration::from_millis(10)).await;

        let before = Instant::now();
        assert_eq!(beacon.stop().await.unwrap(), StopOutcome::Abandoned);
        let waited = before.elapsed();
        assert!(waited >= Duration::from_secs(1) && waited < Duration::from_millis(1100));

        // The task catches up once the stalled send returns
        sleep(Duration::from_secs(6)).await;
        assert_eq!(beacon.active(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_closes_handle() {
        let (transport, beacon) = setup();

        beacon.start(IndicatorId::new(4)).await.unwrap();
        sleep(Duration::from_millis(10)).await;
        beacon.shutdown().await;

        sleep(Duration::from_secs(2)).await;
        assert_eq!(transport.count(), 1);
    }
}
