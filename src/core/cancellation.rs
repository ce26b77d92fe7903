// 協調キャンセルのシグナル

use super::error::OperationCancelled;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// 全チャンクの全作業単位に共有されるキャンセルシグナル
///
/// クローンは同じシグナルを共有する。一度キャンセルされると元には戻らない。
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<TokenState>,
}

#[derive(Debug, Default)]
struct TokenState {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// キャンセルを要求し、待機中の全タスクを起こす
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// キャンセルされるまで待機
    pub async fn cancelled(&self) {
        loop {
            // フラグ確認より先に登録しておかないと通知を取りこぼす
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// 作業単位内での中断チェック
    pub fn ensure_active(&self) -> anyhow::Result<()> {
        if self.is_cancelled() {
            Err(OperationCancelled.into())
        } else {
            Ok(())
        }
    }
}
