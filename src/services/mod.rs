// サービス層 - 機能別の部品
// 各サービスは特定の責任を持ち、疎結合で設計されている

pub mod collation;
pub mod config;
pub mod monitoring;

// 公開API - 各サービスの主要機能を明示的にエクスポート
pub use collation::{
    DiscardResults, ExceptionAggregator, IndexedCollator, ResultCollator, ResultSink,
};
pub use config::WorkloadOptions;
pub use monitoring::{ConsoleProgressReporter, NoOpProgressReporter, TracingProgressReporter};
