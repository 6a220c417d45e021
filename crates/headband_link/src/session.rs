//! Streaming session lifecycle: handshake, ingest task, teardown.
//!
//! On start the session connects the link and runs the control handshake
//! (STOP, SET_PRESET, subscribe, START, with brief pauses) under a bounded
//! retry policy, then spawns the notification-ingest task: a select loop
//! over the cancellation token and the link's notification channel, feeding
//! every frame through the store's decode -> clock -> append path. Stopping
//! cancels the task, disconnects, clears the buffers and resets the session
//! clock.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use telemetry_core::TelemetryStore;
use telemetry_types::Notification;

use crate::control::ControlCommand;
use crate::link::{DeviceLink, LinkError};

/// Bounded-retry policy for the connect handshake.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Handshake attempts before giving up.
    pub attempts: u32,
    /// Pause after each control write, giving the device time to settle.
    pub command_pause: Duration,
    /// Fixed backoff between failed attempts.
    pub retry_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            command_pause: Duration::from_millis(500),
            retry_backoff: Duration::from_secs(1),
        }
    }
}

/// One connection's worth of streaming: owns the link, the shared store and
/// the ingest task.
pub struct StreamSession {
    link: Box<dyn DeviceLink>,
    store: Arc<TelemetryStore>,
    retry: RetryPolicy,
    ingest_task: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
}

impl StreamSession {
    pub fn new(link: Box<dyn DeviceLink>, store: Arc<TelemetryStore>) -> Self {
        Self::with_retry(link, store, RetryPolicy::default())
    }

    pub fn with_retry(
        link: Box<dyn DeviceLink>,
        store: Arc<TelemetryStore>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            link,
            store,
            retry,
            ingest_task: None,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Connect, run the handshake under the retry policy, and start the
    /// ingest task. Exhausting the retry budget is the one user-visible
    /// link failure; the connection is left closed in that case.
    pub async fn start(&mut self) -> Result<(), LinkError> {
        self.link.connect().await?;

        let rx = match self.handshake_with_retries().await {
            Ok(rx) => rx,
            Err(err) => {
                let _ = self.link.disconnect().await;
                return Err(err);
            }
        };

        // Replace any token a previous run may have cancelled.
        self.cancel_token = CancellationToken::new();
        let cancel = self.cancel_token.clone();
        let store = Arc::clone(&self.store);
        self.ingest_task = Some(tokio::spawn(ingest_loop(rx, store, cancel)));

        info!("streaming session started");
        Ok(())
    }

    async fn handshake_with_retries(&mut self) -> Result<mpsc::Receiver<Notification>, LinkError> {
        let mut last: Option<LinkError> = None;
        for attempt in 1..=self.retry.attempts {
            match self.handshake_once().await {
                Ok(rx) => return Ok(rx),
                Err(err) => {
                    warn!(attempt, %err, "handshake attempt failed");
                    last = Some(err);
                    if attempt < self.retry.attempts {
                        tokio::time::sleep(self.retry.retry_backoff).await;
                    }
                }
            }
        }
        Err(LinkError::HandshakeFailed {
            attempts: self.retry.attempts,
            last: Box::new(last.unwrap_or(LinkError::NotConnected)),
        })
    }

    /// One pass of the device's init sequence: stop any stale streams,
    /// select the all-streams preset, subscribe, then start streaming.
    async fn handshake_once(&mut self) -> Result<mpsc::Receiver<Notification>, LinkError> {
        let pause = self.retry.command_pause;

        self.link.write_control(ControlCommand::Stop).await?;
        tokio::time::sleep(pause).await;

        self.link.write_control(ControlCommand::SetPreset).await?;
        tokio::time::sleep(pause).await;

        let rx = self.link.subscribe().await?;

        self.link.write_control(ControlCommand::Start).await?;
        Ok(rx)
    }

    /// Stop streaming: best-effort STOP to the device, cancel the ingest
    /// task, disconnect, then clear buffers and reset the session clock so
    /// the next connection restarts relative time at zero.
    pub async fn stop(&mut self) -> Result<(), LinkError> {
        if self.link.is_connected() {
            if let Err(err) = self.link.write_control(ControlCommand::Stop).await {
                warn!(%err, "failed to send STOP during teardown");
            }
        }

        self.cancel_token.cancel();
        if let Some(task) = self.ingest_task.take() {
            if tokio::time::timeout(Duration::from_millis(500), task)
                .await
                .is_err()
            {
                warn!("ingest task did not stop in time");
            }
        }

        let disconnect_result = self.link.disconnect().await;
        self.store.clear();
        info!("streaming session stopped");
        disconnect_result
    }

    pub fn is_running(&self) -> bool {
        self.ingest_task
            .as_ref()
            .map(|t| !t.is_finished())
            .unwrap_or(false)
    }
}

async fn ingest_loop(
    mut rx: mpsc::Receiver<Notification>,
    store: Arc<TelemetryStore>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            note = rx.recv() => match note {
                Some(note) => {
                    // Undecodable frames are logged and dropped inside the
                    // store; anything else is an invariant violation.
                    if let Err(err) = store.ingest_lossy(&note) {
                        error!(modality = %note.modality, %err, "ingest failed");
                        break;
                    }
                }
                None => {
                    info!("notification channel closed");
                    break;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use telemetry_types::Modality;

    /// Scripted link: fails `fail_writes` control writes, then succeeds and
    /// replays its canned notifications on subscribe.
    #[derive(Debug)]
    struct ScriptedLink {
        fail_writes: u32,
        writes: Arc<std::sync::Mutex<Vec<ControlCommand>>>,
        notes: Vec<Notification>,
        connected: bool,
    }

    impl ScriptedLink {
        fn new(fail_writes: u32, notes: Vec<Notification>) -> Self {
            Self {
                fail_writes,
                writes: Arc::new(std::sync::Mutex::new(Vec::new())),
                notes,
                connected: false,
            }
        }

        fn write_log(&self) -> Arc<std::sync::Mutex<Vec<ControlCommand>>> {
            Arc::clone(&self.writes)
        }
    }

    #[async_trait]
    impl DeviceLink for ScriptedLink {
        async fn connect(&mut self) -> Result<(), LinkError> {
            self.connected = true;
            Ok(())
        }

        async fn write_control(&mut self, command: ControlCommand) -> Result<(), LinkError> {
            if self.fail_writes > 0 {
                self.fail_writes -= 1;
                return Err(LinkError::ControlRejected(command));
            }
            self.writes.lock().unwrap().push(command);
            Ok(())
        }

        async fn subscribe(&mut self) -> Result<mpsc::Receiver<Notification>, LinkError> {
            let (tx, rx) = mpsc::channel(16);
            for note in self.notes.drain(..) {
                tx.try_send(note).expect("test channel full");
            }
            Ok(rx)
        }

        async fn disconnect(&mut self) -> Result<(), LinkError> {
            self.connected = false;
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.connected
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            attempts: 3,
            command_pause: Duration::from_millis(1),
            retry_backoff: Duration::from_millis(1),
        }
    }

    fn ppg_note(raw: i16, receipt_time: f64) -> Notification {
        let mut payload = vec![0u8; 6];
        payload[0..2].copy_from_slice(&raw.to_le_bytes());
        Notification::new(Modality::Ppg, Bytes::from(payload), receipt_time)
    }

    #[tokio::test]
    async fn handshake_sends_stop_preset_start_in_order() {
        let store = Arc::new(TelemetryStore::new());
        let link = ScriptedLink::new(0, vec![]);
        let writes = link.write_log();
        let mut session = StreamSession::with_retry(Box::new(link), store, fast_retry());

        session.start().await.unwrap();
        assert_eq!(
            writes.lock().unwrap().as_slice(),
            &[
                ControlCommand::Stop,
                ControlCommand::SetPreset,
                ControlCommand::Start,
            ]
        );
        session.stop().await.unwrap();
    }

    #[tokio::test]
    async fn handshake_recovers_within_the_retry_budget() {
        let store = Arc::new(TelemetryStore::new());
        // First two attempts each lose their first control write.
        let link = ScriptedLink::new(2, vec![ppg_note(500, 1.0)]);
        let mut session = StreamSession::with_retry(Box::new(link), Arc::clone(&store), fast_retry());

        session.start().await.unwrap();
        // Give the ingest task a moment to drain the canned frame.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.latest(Modality::Ppg, "PPG1"), Some((0.0, 500.0)));
        session.stop().await.unwrap();
    }

    #[tokio::test]
    async fn handshake_fails_after_exhausting_retries() {
        let store = Arc::new(TelemetryStore::new());
        // Enough failures to poison all three attempts.
        let link = ScriptedLink::new(9, vec![]);
        let mut session = StreamSession::with_retry(Box::new(link), store, fast_retry());

        let err = session.start().await.unwrap_err();
        assert!(matches!(err, LinkError::HandshakeFailed { attempts: 3, .. }));
        assert!(!session.is_running());
    }

    #[tokio::test]
    async fn stop_clears_buffers_and_resets_the_clock() {
        let store = Arc::new(TelemetryStore::new());
        let link = ScriptedLink::new(0, vec![ppg_note(100, 5.0), ppg_note(200, 5.5)]);
        let mut session = StreamSession::with_retry(Box::new(link), Arc::clone(&store), fast_retry());

        session.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.len(Modality::Ppg), 2);

        session.stop().await.unwrap();
        assert!(store.is_empty(Modality::Ppg));
        assert_eq!(store.session_time(6.0), None);
    }
}
