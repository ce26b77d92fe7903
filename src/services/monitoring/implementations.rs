// 進捗監視の具象実装

use crate::core::{ProgressReporter, RunSummary, SequenceTag, SourceKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// コンソール出力による進捗報告実装
#[derive(Debug, Default)]
pub struct ConsoleProgressReporter {
    quiet: bool,
    dispatched: AtomicUsize,
}

impl ConsoleProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::default()
        }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_started(&self, source_kind: SourceKind, partition_size: usize) {
        self.dispatched.store(0, Ordering::Relaxed);
        if !self.quiet {
            println!("🚀 Starting {source_kind} loop (partition size: {partition_size})...");
        }
    }

    fn report_chunk(&self, chunk_index: usize, chunk_len: usize) {
        let dispatched = self.dispatched.fetch_add(chunk_len, Ordering::Relaxed) + chunk_len;
        if !self.quiet && (chunk_index % 100 == 0) {
            println!("📊 Chunk {chunk_index}: {chunk_len} items ({dispatched} dispatched)");
        }
    }

    fn report_item_failed(&self, tag: SequenceTag, error: &anyhow::Error) {
        if !self.quiet {
            eprintln!("❌ Item {tag} failed: {error}");
        }
    }

    fn report_completed(&self, summary: &RunSummary) {
        if self.quiet {
            return;
        }

        if summary.cancelled {
            println!(
                "⏹️  Cancelled! Succeeded: {}, Failed: {}",
                summary.items_succeeded, summary.items_failed
            );
        } else {
            println!(
                "✅ Completed! Succeeded: {}, Failed: {}, Chunks: {}",
                summary.items_succeeded, summary.items_failed, summary.chunks_dispatched
            );
        }
    }
}

/// 何もしない進捗報告実装（テスト・ベンチマーク用）
#[derive(Debug, Default, Clone)]
pub struct NoOpProgressReporter;

impl NoOpProgressReporter {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for NoOpProgressReporter {
    fn report_started(&self, _source_kind: SourceKind, _partition_size: usize) {
        // 何もしない
    }

    fn report_chunk(&self, _chunk_index: usize, _chunk_len: usize) {
        // 何もしない
    }

    fn report_item_failed(&self, _tag: SequenceTag, _error: &anyhow::Error) {
        // 何もしない
    }

    fn report_completed(&self, _summary: &RunSummary) {
        // 何もしない
    }
}

/// tracingイベントとして進捗を出力する実装
///
/// 出力先はサブスクライバーの設定に従う。
#[derive(Debug, Default, Clone)]
pub struct TracingProgressReporter;

impl TracingProgressReporter {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for TracingProgressReporter {
    fn report_started(&self, source_kind: SourceKind, partition_size: usize) {
        info!(%source_kind, partition_size, "ループを開始します");
    }

    fn report_chunk(&self, chunk_index: usize, chunk_len: usize) {
        debug!(chunk_index, chunk_len, "チャンクをディスパッチしました");
    }

    fn report_item_failed(&self, tag: SequenceTag, error: &anyhow::Error) {
        warn!(%tag, error = %error, "作業単位が失敗しました");
    }

    fn report_completed(&self, summary: &RunSummary) {
        info!(
            source_kind = %summary.source_kind,
            succeeded = summary.items_succeeded,
            failed = summary.items_failed,
            cancelled = summary.cancelled,
            elapsed_ms = summary.elapsed_ms,
            "ループが完了しました"
        );
    }
}
