//! 種類ごとのマージ方針を表す trait

/// 1 種類の通知コレクションと、その未読カウンタ
///
/// スナップショット（`replace`）とインクリメンタル（`merge`）の扱いは種類ごとに異なります。
/// 新しい通知ストリームを追加するときは、この trait を実装してストアに 1 フィールド足します。
pub trait NotificationStream {
    type Item;

    /// 表示順のコレクション
    fn items(&self) -> &[Self::Item];

    /// スナップショットでコレクションを丸ごと置き換え、未読数を再設定する
    fn replace(&mut self, items: Vec<Self::Item>);

    /// インクリメンタル配信をマージする
    fn merge(&mut self, items: Vec<Self::Item>);

    /// 未読数
    fn unread(&self) -> usize;

    /// ローカルでの既読化（楽観的に未読数を 0 にする）
    fn acknowledge(&mut self);

    /// サーバー側で既読が確定した
    fn confirm_read(&mut self);

    /// セッション終了時に空に戻す
    fn clear(&mut self);
}
