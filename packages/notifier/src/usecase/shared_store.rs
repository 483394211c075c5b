//! 共有ストア
//!
//! `NotificationStore` をロックで包み、変更のたびに未読数を `watch` チャンネルへ公開します。
//! ハンドラはロックを保持したまま I/O を待ってはいけません（送信はロック解放後に行う）。

use tokio::sync::{Mutex, watch};

use crate::domain::{NotificationStore, UnreadCounts};

pub struct SharedStore {
    store: Mutex<NotificationStore>,
    counts: watch::Sender<UnreadCounts>,
}

impl SharedStore {
    pub fn new() -> Self {
        let (counts, _) = watch::channel(UnreadCounts::default());
        Self {
            store: Mutex::new(NotificationStore::new()),
            counts,
        }
    }

    /// ストアを変更し、未読数が変わっていれば購読者に通知する
    pub async fn update<R>(&self, f: impl FnOnce(&mut NotificationStore) -> R) -> R {
        let mut store = self.store.lock().await;
        let result = f(&mut store);
        let latest = store.unread_counts();
        self.counts.send_if_modified(|current| {
            if *current == latest {
                return false;
            }
            *current = latest;
            true
        });
        result
    }

    pub async fn read<R>(&self, f: impl FnOnce(&NotificationStore) -> R) -> R {
        let store = self.store.lock().await;
        f(&store)
    }

    /// 未読数の変化を購読する
    pub fn subscribe_counts(&self) -> watch::Receiver<UnreadCounts> {
        self.counts.subscribe()
    }
}

impl Default for SharedStore {
    fn default() -> Self {
        Self::new()
    }
}
