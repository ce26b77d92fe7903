// ループ実行に関連するデータ型定義

use super::error::{AggregateError, LoopError, LoopResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 並び順復元のための相関キー
///
/// ディスパッチ時にソースの列挙順で採番され、1回の実行内で一意。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SequenceTag(u64);

impl SequenceTag {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SequenceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 反復ソースの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// 数値ステップによるインデックスループ
    Indexed,
    /// 有限シーケンスのパーティション分割
    Sequence,
    /// 前方読み出しのストリーミングソース
    Streaming,
}

impl SourceKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Indexed => "indexed",
            Self::Sequence => "sequence",
            Self::Streaming => "streaming",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 実行全体のサマリー
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub source_kind: SourceKind,
    pub chunks_dispatched: usize,
    pub items_dispatched: usize,
    pub items_succeeded: usize,
    pub items_failed: usize,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl RunSummary {
    /// 1作業単位あたりの平均処理時間（ミリ秒）
    pub fn average_time_per_item_ms(&self) -> f64 {
        if self.items_dispatched > 0 {
            self.elapsed_ms as f64 / self.items_dispatched as f64
        } else {
            0.0
        }
    }
}

/// 1回の実行結果
///
/// 完了済みの結果と失敗はキャンセル時も破棄されずにここへ残る。
#[derive(Debug)]
pub struct RunReport<O> {
    pub results: O,
    pub failures: Option<AggregateError>,
    pub summary: RunSummary,
}

impl<O> RunReport<O> {
    pub fn is_success(&self) -> bool {
        !self.summary.cancelled && self.failures.is_none()
    }

    /// 呼び出し側に見せる最終結果へ変換
    ///
    /// キャンセルは集約エラーより優先される。
    pub fn into_result(self) -> LoopResult<O> {
        if self.summary.cancelled {
            return Err(LoopError::Cancelled {
                completed_items: self.summary.items_succeeded,
                failed_items: self.summary.items_failed,
            });
        }

        match self.failures {
            Some(aggregate) => Err(LoopError::Aggregate(aggregate)),
            None => Ok(self.results),
        }
    }
}
