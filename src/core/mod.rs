// コアレイヤー - 基盤となるトレイト、型、エラー定義
// 他のレイヤーから参照される基本的な抽象化を提供

pub mod cancellation;
pub mod error;
pub mod traits;
pub mod types;

// 公開API - 明示的にエクスポートして曖昧性を回避
pub use cancellation::CancellationToken;
pub use error::{
    AggregateError, ErrorContext, ErrorSeverity, FailureKind, ItemFailure, LoopError, LoopResult,
    OperationCancelled, ValidationError, ValidationResult,
};
pub use traits::{ProgressReporter, WorkloadConfig};
pub use types::{RunReport, RunSummary, SequenceTag, SourceKind};
