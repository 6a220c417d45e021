//! End-to-end: mock link -> handshake -> ingest task -> store queries.

use std::sync::Arc;
use std::time::Duration;

use headband_link::{MockLink, RetryPolicy, StreamSession};
use telemetry_core::TelemetryStore;
use telemetry_types::Modality;

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        attempts: 3,
        command_pause: Duration::from_millis(1),
        retry_backoff: Duration::from_millis(1),
    }
}

#[tokio::test]
async fn mock_session_fills_every_modality() {
    let store = Arc::new(TelemetryStore::new());
    let mut session =
        StreamSession::with_retry(Box::new(MockLink::new()), Arc::clone(&store), fast_retry());

    session.start().await.expect("mock handshake");

    // Wait for a few frames of every modality to land.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let filled = Modality::ALL.iter().all(|&m| store.len(m) >= 3);
        if filled || tokio::time::Instant::now() >= deadline {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    for modality in Modality::ALL {
        assert!(store.len(modality) >= 3, "no data for {modality}");
        assert!(store.len(modality) <= 500);
    }

    // Live readout and windowed query both see the stream.
    assert!(store.latest(Modality::Eeg, "TP9").is_some());
    let now = store
        .session_time(headband_link::wall_clock_seconds())
        .expect("clock started");
    let win = store.window(Modality::Accelerometer, now, 5.0);
    assert!(!win.is_empty());
    assert_eq!(win.channels.len(), 3);
    for channel in &win.channels {
        assert_eq!(channel.len(), win.timestamps.len());
    }

    session.stop().await.expect("clean stop");
    assert!(store.is_empty(Modality::Eeg));
}

#[tokio::test]
async fn timestamps_are_session_relative_and_monotonic() {
    let store = Arc::new(TelemetryStore::new());
    let mut session =
        StreamSession::with_retry(Box::new(MockLink::new()), Arc::clone(&store), fast_retry());

    session.start().await.expect("mock handshake");
    tokio::time::sleep(Duration::from_millis(200)).await;

    let win = store.window(Modality::Eeg, 10.0, 10.0);
    assert!(win.len() >= 2, "expected several EEG frames");
    assert!(win.timestamps[0] >= 0.0);
    for pair in win.timestamps.windows(2) {
        assert!(pair[0] <= pair[1], "timestamps regressed: {pair:?}");
    }

    session.stop().await.expect("clean stop");
}
