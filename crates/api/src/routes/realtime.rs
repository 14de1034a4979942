//! WebSocket push channel for live metrics.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use domain::models::{RealtimeFrame, RealtimeMetrics};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use metrics::gauge;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::app::AppState;

/// `GET /api/analytics/realtime`
pub async fn realtime_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let receiver = state.realtime_tx.subscribe();
    ws.on_upgrade(move |socket| forward_metrics(socket, receiver))
}

fn encode_frame(metrics: &RealtimeMetrics) -> Result<String, serde_json::Error> {
    serde_json::to_string(&RealtimeFrame::metrics(metrics))
}

async fn forward_metrics(socket: WebSocket, updates: broadcast::Receiver<RealtimeMetrics>) {
    let (sender, receiver) = socket.split();
    gauge!("realtime_subscribers").increment(1.0);
    info!("Realtime subscriber connected");

    pump_frames(sender, receiver, updates).await;

    gauge!("realtime_subscribers").decrement(1.0);
    info!("Realtime subscriber disconnected");
}

/// Forwards broadcast updates to `sink` as text frames and answers pings from
/// `incoming` until the client goes away or the broadcast channel closes.
///
/// Pending updates are drained before client messages are looked at.
async fn pump_frames<S, R, E>(
    mut sink: S,
    mut incoming: R,
    mut updates: broadcast::Receiver<RealtimeMetrics>,
) where
    S: Sink<Message> + Unpin,
    R: Stream<Item = Result<Message, E>> + Unpin,
{
    loop {
        tokio::select! {
            biased;

            update = updates.recv() => match update {
                Ok(metrics) => {
                    let text = match encode_frame(&metrics) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(error = %e, "Failed to encode realtime frame");
                            continue;
                        }
                    };
                    if sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Realtime subscriber lagged; skipping frames");
                }
                Err(RecvError::Closed) => break,
            },
            message = incoming.next() => match message {
                Some(Ok(Message::Ping(payload))) => {
                    if sink.send(Message::Pong(payload)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use futures_util::stream;
    use std::convert::Infallible;
    use std::time::Duration;

    fn snapshot(queue_length: i64) -> RealtimeMetrics {
        RealtimeMetrics {
            active_jobs: 3,
            available_bays: 1,
            today_revenue: 410.0,
            today_jobs: 6,
            active_technicians: 4,
            queue_length,
            timestamp: Utc::now(),
        }
    }

    fn queue_lengths(sent: &[Message]) -> Vec<i64> {
        sent.iter()
            .map(|message| match message {
                Message::Text(text) => {
                    let value: serde_json::Value = serde_json::from_str(text).unwrap();
                    value["data"]["queueLength"].as_i64().unwrap()
                }
                other => panic!("unexpected frame {:?}", other),
            })
            .collect()
    }

    async fn run(
        sent: &mut Vec<Message>,
        incoming: impl Stream<Item = Result<Message, Infallible>> + Unpin,
        updates: broadcast::Receiver<RealtimeMetrics>,
    ) {
        tokio::time::timeout(Duration::from_secs(1), pump_frames(sent, incoming, updates))
            .await
            .expect("realtime loop did not stop");
    }

    #[test]
    fn test_encode_frame() {
        let metrics = snapshot(2);
        let value: serde_json::Value = serde_json::from_str(&encode_frame(&metrics).unwrap()).unwrap();
        assert_eq!(value["type"], "realtime_metrics");
        assert_eq!(value["data"]["availableBays"], 1);
    }

    #[tokio::test]
    async fn test_forwards_update_then_stops_when_client_leaves() {
        let (tx, rx) = broadcast::channel(4);
        tx.send(snapshot(5)).unwrap();

        let mut sent = Vec::new();
        run(&mut sent, stream::iter(Vec::new()), rx).await;

        assert_eq!(queue_lengths(&sent), vec![5]);
    }

    #[tokio::test]
    async fn test_lagged_subscriber_skips_to_latest() {
        let (tx, rx) = broadcast::channel(1);
        for queue_length in 1..=3 {
            tx.send(snapshot(queue_length)).unwrap();
        }
        drop(tx);

        let mut sent = Vec::new();
        run(&mut sent, stream::pending(), rx).await;

        assert_eq!(queue_lengths(&sent), vec![3]);
    }

    #[tokio::test]
    async fn test_ping_answered_with_pong() {
        let (_tx, rx) = broadcast::channel(4);
        let incoming = stream::iter(vec![
            Ok(Message::Ping(vec![7, 7])),
            Ok(Message::Text("ignored".to_string())),
        ]);

        let mut sent = Vec::new();
        run(&mut sent, incoming, rx).await;

        assert_eq!(sent, vec![Message::Pong(vec![7, 7])]);
    }

    #[tokio::test]
    async fn test_close_ends_loop() {
        let (_tx, rx) = broadcast::channel(4);
        let incoming = stream::iter(vec![Ok(Message::Close(None)), Ok(Message::Ping(vec![1]))]);

        let mut sent = Vec::new();
        run(&mut sent, incoming, rx).await;

        assert!(sent.is_empty());
    }

    #[tokio::test]
    async fn test_closed_broadcast_ends_loop() {
        let (tx, rx) = broadcast::channel::<RealtimeMetrics>(4);
        drop(tx);

        let mut sent = Vec::new();
        run(&mut sent, stream::pending(), rx).await;

        assert!(sent.is_empty());
    }
}
