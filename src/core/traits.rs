// ループエンジンのトレイト定義
// 設定と進捗報告の抽象化インターフェース

use super::cancellation::CancellationToken;
use super::types::{RunSummary, SequenceTag, SourceKind};
use mockall::automock;

/// ワークロード設定を抽象化するトレイト
///
/// 実行開始前に一度構築され、以降は全作業単位から読み取り専用で共有される。
#[automock]
pub trait WorkloadConfig: Send + Sync {
    /// 1チャンクあたりの最大同時実行数
    fn partition_size(&self) -> usize;

    /// 同期エンジン用の専用ワーカースレッド数（None ならグローバルプール）
    fn worker_threads(&self) -> Option<usize>;

    /// 進捗報告を有効にするかどうか
    fn enable_progress_reporting(&self) -> bool;

    /// 全作業単位に渡すキャンセルシグナル
    fn cancellation_token(&self) -> CancellationToken;
}

// WorkloadConfig for Box<dyn WorkloadConfig>
impl WorkloadConfig for Box<dyn WorkloadConfig> {
    fn partition_size(&self) -> usize {
        self.as_ref().partition_size()
    }

    fn worker_threads(&self) -> Option<usize> {
        self.as_ref().worker_threads()
    }

    fn enable_progress_reporting(&self) -> bool {
        self.as_ref().enable_progress_reporting()
    }

    fn cancellation_token(&self) -> CancellationToken {
        self.as_ref().cancellation_token()
    }
}

/// 進捗報告の抽象化トレイト
///
/// 同期エンジンのワーカースレッドからも呼ばれるため同期メソッドのみ。
#[automock]
pub trait ProgressReporter: Send + Sync {
    /// 実行開始時の報告
    fn report_started(&self, source_kind: SourceKind, partition_size: usize);

    /// チャンクのディスパッチ時の報告
    fn report_chunk(&self, chunk_index: usize, chunk_len: usize);

    /// 作業単位の失敗時の報告
    fn report_item_failed(&self, tag: SequenceTag, error: &anyhow::Error);

    /// 実行完了時の報告
    fn report_completed(&self, summary: &RunSummary);
}

// ProgressReporter for Box<dyn ProgressReporter>
impl ProgressReporter for Box<dyn ProgressReporter> {
    fn report_started(&self, source_kind: SourceKind, partition_size: usize) {
        self.as_ref().report_started(source_kind, partition_size)
    }

    fn report_chunk(&self, chunk_index: usize, chunk_len: usize) {
        self.as_ref().report_chunk(chunk_index, chunk_len)
    }

    fn report_item_failed(&self, tag: SequenceTag, error: &anyhow::Error) {
        self.as_ref().report_item_failed(tag, error)
    }

    fn report_completed(&self, summary: &RunSummary) {
        self.as_ref().report_completed(summary)
    }
}
