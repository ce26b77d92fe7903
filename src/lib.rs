// chunked_loop - チャンク分割による並列ループ実行エンジン
//
// 数値ステップ、有限シーケンス、前方読み出しストリームの3種類のソースを
// 上限付きの同時実行数で処理し、結果をソース順に並べ直して返す。

pub mod cli;
pub mod core;
pub mod engine;
pub mod ruleset;
pub mod services;
pub mod source;

// 公開API
pub use crate::core::{
    AggregateError, CancellationToken, ItemFailure, LoopError, LoopResult, ProgressReporter,
    RunReport, RunSummary, SequenceTag, SourceKind, WorkloadConfig,
};
pub use crate::engine::*;
pub use crate::ruleset::{Assignment, LoopRuleset, Relation};
pub use crate::services::{
    ConsoleProgressReporter, DiscardResults, IndexedCollator, NoOpProgressReporter, ResultCollator,
    ResultSink, TracingProgressReporter, WorkloadOptions,
};
pub use crate::source::{AsyncForwardIterator, ForwardIterator, Partitioner};
