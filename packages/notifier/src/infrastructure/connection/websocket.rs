//! WebSocket を使った Connection 実装
//!
//! ## 責務
//!
//! - 通知サービスへの接続と再接続（連続失敗が上限に達したら諦める）
//! - 受信フレームのデコードと `ConnectionEvent` のブロードキャスト
//! - 送信フレームのキューイング（未接続の間は溜めておき、次の接続で送る）
//! - join-room は接続ごとのフレームなので、キュー時と異なる接続では送らない
//!
//! ## 設計ノート
//!
//! 接続は `Arc<WebSocketConnection>` として共有され、`Arc<dyn Connection>` として
//! UseCase 層に注入されます。UseCase 層はこの型に依存しません。

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::{
    net::TcpStream,
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use crate::{
    domain::{Connection, ConnectionError, ConnectionEvent, InboundEvent, OutboundEvent},
    infrastructure::dto::{conversion::FrameError, websocket::Frame},
};

use super::config::ConnectionConfig;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// 送信キューに積まれたエンコード済みフレーム
#[derive(Debug, Clone, PartialEq, Eq)]
struct OutboundFrame {
    name: &'static str,
    text: String,
    /// キューに積んだ時点の接続世代
    generation: u64,
    /// キューに積んだ接続でのみ意味を持つ（join-room）
    connection_scoped: bool,
}

impl OutboundFrame {
    /// `generation` の接続で送るべきでない古いフレームか
    fn is_stale(&self, generation: u64) -> bool {
        self.connection_scoped && self.generation != generation
    }
}

/// WebSocket を使った Connection 実装
pub struct WebSocketConnection {
    open: Arc<AtomicBool>,
    /// 確立した接続の通し番号（未接続のまま一度も繋がっていなければ 0）
    generation: Arc<AtomicU64>,
    events: broadcast::Sender<ConnectionEvent>,
    /// エンコード済みの送信フレーム（接続タスクが受信側を持つ）
    outbound: mpsc::UnboundedSender<OutboundFrame>,
    task: JoinHandle<()>,
}

impl WebSocketConnection {
    /// 接続タスクを起動する
    ///
    /// 接続の完了を待たずに返ります。接続が開くと購読者に `ConnectionEvent::Opened` が届きます。
    pub fn spawn(config: ConnectionConfig) -> Arc<Self> {
        let open = Arc::new(AtomicBool::new(false));
        let generation = Arc::new(AtomicU64::new(0));
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (outbound, outbound_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run_connection(
            config,
            open.clone(),
            generation.clone(),
            events.clone(),
            outbound_rx,
        ));

        Arc::new(Self {
            open,
            generation,
            events,
            outbound,
            task,
        })
    }

    /// 接続タスクを停止する
    pub fn close(&self) {
        self.task.abort();
        self.open.store(false, Ordering::SeqCst);
    }

    /// 接続タスクが動いているか（再接続を諦めた場合も false）
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for WebSocketConnection {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[async_trait]
impl Connection for WebSocketConnection {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events.subscribe()
    }

    async fn emit(&self, event: OutboundEvent) -> Result<(), ConnectionError> {
        let name = event.name();
        let connection_scoped = matches!(event, OutboundEvent::JoinRoom { .. });
        let frame = Frame::try_from(event).map_err(|e| ConnectionError::Encode(e.to_string()))?;
        let text =
            serde_json::to_string(&frame).map_err(|e| ConnectionError::Encode(e.to_string()))?;

        let frame = OutboundFrame {
            name,
            text,
            generation: self.generation.load(Ordering::SeqCst),
            connection_scoped,
        };
        self.outbound
            .send(frame)
            .map_err(|_| ConnectionError::Closed)?;
        tracing::debug!("Queued '{}' frame", name);
        Ok(())
    }
}

enum PumpEnd {
    /// 送信側がすべて破棄された
    Shutdown,
    /// 接続が失われた
    Lost(String),
}

async fn run_connection(
    config: ConnectionConfig,
    open: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    events: broadcast::Sender<ConnectionEvent>,
    mut outbound_rx: mpsc::UnboundedReceiver<OutboundFrame>,
) {
    let mut failures: u32 = 0;

    loop {
        tracing::info!(
            "Connecting to {} (attempt {}/{})",
            config.url,
            failures + 1,
            config.max_reconnect_attempts
        );

        match connect_async(config.url.as_str()).await {
            Ok((stream, _response)) => {
                failures = 0;
                // 世代を進めてから open にする（この接続向けの join-room は新しい世代で積まれる）
                let current = generation.fetch_add(1, Ordering::SeqCst) + 1;
                open.store(true, Ordering::SeqCst);
                tracing::info!("Connected to notification service");
                // 購読者がいない場合の送信エラーは無視してよい
                let _ = events.send(ConnectionEvent::Opened);

                let end = pump(stream, current, &events, &mut outbound_rx).await;

                open.store(false, Ordering::SeqCst);
                let _ = events.send(ConnectionEvent::Closed);
                match end {
                    PumpEnd::Shutdown => {
                        tracing::info!("Connection shut down");
                        return;
                    }
                    PumpEnd::Lost(reason) => tracing::warn!("Connection lost: {}", reason),
                }
            }
            Err(e) => {
                failures += 1;
                tracing::warn!("Failed to connect: {}", e);
                if failures >= config.max_reconnect_attempts {
                    tracing::error!(
                        "Failed to connect after {} attempts. Giving up.",
                        config.max_reconnect_attempts
                    );
                    return;
                }
            }
        }

        tracing::info!("Reconnecting in {:?}...", config.reconnect_interval);
        tokio::time::sleep(config.reconnect_interval).await;
    }
}

async fn pump(
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    generation: u64,
    events: &broadcast::Sender<ConnectionEvent>,
    outbound_rx: &mut mpsc::UnboundedReceiver<OutboundFrame>,
) -> PumpEnd {
    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => match outbound {
                Some(frame) if frame.is_stale(generation) => {
                    tracing::debug!("Dropping '{}' frame queued for a previous connection", frame.name);
                }
                Some(frame) => {
                    if let Err(e) = write.send(Message::Text(frame.text.into())).await {
                        return PumpEnd::Lost(e.to_string());
                    }
                }
                None => {
                    let _ = write.close().await;
                    return PumpEnd::Shutdown;
                }
            },
            inbound = read.next() => match inbound {
                Some(Ok(Message::Text(text))) => publish_frame(text.as_str(), events),
                Some(Ok(Message::Close(_))) | None => {
                    return PumpEnd::Lost("closed by server".to_string());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return PumpEnd::Lost(e.to_string()),
            },
        }
    }
}

/// 受信したテキストフレームをデコードして購読者に配信する
///
/// 不正なフレームはログに残して捨てます（ハンドラを止めない）。
fn publish_frame(text: &str, events: &broadcast::Sender<ConnectionEvent>) {
    let frame: Frame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Ignoring malformed frame: {}", e);
            return;
        }
    };

    match InboundEvent::try_from(frame) {
        Ok(event) => {
            let _ = events.send(ConnectionEvent::Inbound(event));
        }
        Err(FrameError::UnknownEvent(name)) => {
            tracing::debug!("Ignoring unknown event '{}'", name);
        }
        Err(e) => tracing::warn!("Ignoring frame: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_publish_frame_broadcasts_inbound_event() {
        // テスト項目: 既知のイベントはデコードされて購読者に配信される
        // given (前提条件):
        let (events, mut rx) = broadcast::channel(8);

        // when (操作):
        publish_frame(r#"{"event":"marked-message","data":null}"#, &events);

        // then (期待する結果):
        assert_eq!(
            rx.try_recv().unwrap(),
            ConnectionEvent::Inbound(InboundEvent::MarkedMessage)
        );
    }

    #[test]
    fn test_publish_frame_ignores_malformed_and_unknown() {
        // テスト項目: 不正な JSON と未知のイベントは配信されない
        // given (前提条件):
        let (events, mut rx) = broadcast::channel(8);

        // when (操作):
        publish_frame("not json", &events);
        publish_frame(r#"{"event":"typing","data":{}}"#, &events);

        // then (期待する結果):
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_publish_frame_keeps_snapshot_with_malformed_item() {
        // テスト項目: 壊れた要素を含むスナップショットも、残りの要素で配信される
        // given (前提条件): B のグループが null（削除済みグループ）
        let (events, mut rx) = broadcast::channel(8);
        let text = r#"{"event":"previous-notification","data":{
            "message":[{"_id":"c1","message":[{"_id":"m1","senderId":{"name":"alice","sentAt":"2024-05-01T00:00:00Z"},"content":"hi"}]}],
            "notification":[
                {"_id":"A","groupId":{"_id":"g1","name":"Rice","members":[]},"sender":{"name":"bob","email":"b@x"}},
                {"_id":"B","groupId":null,"sender":{"name":"bob","email":"b@x"}}
            ]}}"#;

        // when (操作):
        publish_frame(text, &events);

        // then (期待する結果):
        match rx.try_recv().unwrap() {
            ConnectionEvent::Inbound(InboundEvent::PreviousNotification { chat, group_buy }) => {
                assert_eq!(chat.map(|groups| groups.len()), Some(1));
                let ids: Vec<String> = group_buy
                    .unwrap_or_default()
                    .iter()
                    .map(|n| n.id.to_string())
                    .collect();
                assert_eq!(ids, vec!["A"]);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_join_room_is_stale_on_a_later_connection() {
        // テスト項目: join-room は積んだ接続以外では送らないが、他のフレームは次の接続でも送る
        // given (前提条件): 世代 1 の接続中に積まれたフレーム
        let join_room = OutboundFrame {
            name: "join-room",
            text: r#"{"event":"join-room","data":"u1"}"#.to_string(),
            generation: 1,
            connection_scoped: true,
        };
        let mark_read = OutboundFrame {
            name: "mark-read-message",
            connection_scoped: false,
            ..join_room.clone()
        };

        // when (操作) / then (期待する結果):
        assert!(!join_room.is_stale(1));
        assert!(join_room.is_stale(2));
        assert!(!mark_read.is_stale(2));
    }

    #[tokio::test]
    async fn test_emit_queues_while_disconnected() {
        // テスト項目: 未接続の間も送信はキューされ、エラーにならない
        // given (前提条件): 接続できない URL
        let config = ConnectionConfig {
            url: "ws://127.0.0.1:9/notifications".to_string(),
            max_reconnect_attempts: 100,
            reconnect_interval: Duration::from_secs(60),
        };
        let connection = WebSocketConnection::spawn(config);

        // when (操作):
        let result = connection
            .emit(OutboundEvent::JoinRoom {
                user_id: crate::domain::UserId::new("u1").unwrap(),
            })
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(!connection.is_open());
        connection.close();
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        // テスト項目: 連続して接続に失敗すると上限回数で諦め、送信は Closed になる
        // given (前提条件):
        let config = ConnectionConfig {
            url: "ws://127.0.0.1:9/notifications".to_string(),
            max_reconnect_attempts: 1,
            reconnect_interval: Duration::from_millis(10),
        };
        let connection = WebSocketConnection::spawn(config);

        // when (操作):
        for _ in 0..100 {
            if !connection.is_running() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let result = connection
            .emit(OutboundEvent::JoinRoom {
                user_id: crate::domain::UserId::new("u1").unwrap(),
            })
            .await;

        // then (期待する結果):
        assert!(!connection.is_running());
        assert_eq!(result, Err(ConnectionError::Closed));
    }
}
