// ループエンジン用のカスタムエラー型定義

use super::types::SequenceTag;
use std::any::Any;
use std::fmt;
use thiserror::Error;

/// ループ実行固有のエラー型
#[derive(Error, Debug)]
pub enum LoopError {
    #[error("引数エラー: {argument} - {reason}")]
    ArgumentError { argument: String, reason: String },

    #[error("設定エラー: {message}")]
    ConfigurationError { message: String },

    #[error("設定ファイルエラー: {path} - {source}")]
    ConfigFileError {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error("キャンセルされました: 完了 {completed_items} 件, 失敗 {failed_items} 件")]
    Cancelled {
        completed_items: usize,
        failed_items: usize,
    },

    #[error("実行基盤エラー: {source}")]
    ExecutorError {
        #[source]
        source: rayon::ThreadPoolBuildError,
    },

    #[error("タスクエラー: {source}")]
    TaskError {
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("内部エラー: {source}")]
    InternalError {
        #[source]
        source: anyhow::Error,
    },
}

impl LoopError {
    /// 引数エラーの作成
    pub fn argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ArgumentError {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// 設定ファイルエラーの作成
    pub fn config_file(path: impl Into<String>, source: anyhow::Error) -> Self {
        Self::ConfigFileError {
            path: path.into(),
            source,
        }
    }

    /// 実行基盤エラーの作成
    pub fn executor(source: rayon::ThreadPoolBuildError) -> Self {
        Self::ExecutorError { source }
    }

    /// タスクエラーの作成
    pub fn task(source: tokio::task::JoinError) -> Self {
        Self::TaskError { source }
    }

    /// 内部エラーの作成
    pub fn internal(source: anyhow::Error) -> Self {
        Self::InternalError { source }
    }

    /// 集約された失敗を取得（集約エラーの場合のみ）
    pub fn as_aggregate(&self) -> Option<&AggregateError> {
        match self {
            Self::Aggregate(aggregate) => Some(aggregate),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ArgumentError { .. } | Self::ConfigurationError { .. } => ErrorSeverity::High,
            Self::ConfigFileError { .. } => ErrorSeverity::High,
            Self::Aggregate(_) => ErrorSeverity::Medium,
            Self::Cancelled { .. } => ErrorSeverity::Low,
            Self::ExecutorError { .. } | Self::TaskError { .. } => ErrorSeverity::High,
            Self::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// エラーが回復可能かどうかを判定
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::ArgumentError { .. } | Self::ConfigurationError { .. } => false,
            Self::ConfigFileError { .. } => false,
            Self::Aggregate(_) => true,
            Self::Cancelled { .. } => true,
            Self::ExecutorError { .. } => false,
            Self::TaskError { .. } => true,
            Self::InternalError { .. } => false,
        }
    }

    /// エラーコンテキストを取得
    pub fn context(&self) -> ErrorContext {
        match self {
            Self::ArgumentError { argument, .. } => ErrorContext::new("argument_validation")
                .with_resource(argument.clone())
                .with_suggestion("ディスパッチ前に引数を確認してください"),
            Self::ConfigurationError { message } => ErrorContext::new("configuration")
                .with_suggestion(format!("設定を確認してください: {message}")),
            Self::ConfigFileError { path, .. } => ErrorContext::new("config_file")
                .with_resource(path.clone())
                .with_suggestion("ファイルパスとJSON形式を確認してください"),
            Self::Aggregate(aggregate) => ErrorContext::new("unit_of_work")
                .with_resource(format!("{} 件の失敗", aggregate.len())),
            Self::Cancelled { .. } => ErrorContext::new("cancellation"),
            Self::ExecutorError { .. } => ErrorContext::new("executor")
                .with_suggestion("worker_threads の値を確認してください"),
            _ => ErrorContext::new("unknown"),
        }
    }
}

/// 作業単位の失敗種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 作業単位が Err を返した
    Error,
    /// 作業単位がパニックした
    Panic,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("エラー"),
            Self::Panic => f.write_str("パニック"),
        }
    }
}

/// 個々の作業単位で捕捉された失敗
#[derive(Error, Debug)]
#[error("作業単位の失敗 (タグ {tag}, {kind}): {source}")]
pub struct ItemFailure {
    tag: SequenceTag,
    kind: FailureKind,
    #[source]
    source: anyhow::Error,
}

impl ItemFailure {
    pub fn new(tag: SequenceTag, source: anyhow::Error) -> Self {
        Self {
            tag,
            kind: FailureKind::Error,
            source,
        }
    }

    /// パニックのペイロードから失敗を作成
    pub fn panicked(tag: SequenceTag, payload: &(dyn Any + Send)) -> Self {
        Self {
            tag,
            kind: FailureKind::Panic,
            source: anyhow::anyhow!(panic_message(payload)),
        }
    }

    /// tokioタスクの結合エラーから失敗を作成
    pub fn from_join_error(tag: SequenceTag, error: tokio::task::JoinError) -> Self {
        if error.is_panic() {
            let payload = error.into_panic();
            Self::panicked(tag, payload.as_ref())
        } else {
            Self::new(tag, anyhow::Error::new(error))
        }
    }

    pub fn tag(&self) -> SequenceTag {
        self.tag
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// 作業単位が返した元のエラー
    pub fn error(&self) -> &anyhow::Error {
        &self.source
    }

    pub fn into_error(self) -> anyhow::Error {
        self.source
    }

    /// 協調キャンセルによる中断かどうか
    pub fn is_cancellation(&self) -> bool {
        self.source.downcast_ref::<OperationCancelled>().is_some()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "不明なパニック".to_string()
    }
}

/// 1回の実行で捕捉された全ての失敗をまとめた複合エラー
///
/// 各失敗はタグ順に並び、個別に参照できる。
#[derive(Error, Debug)]
#[error("集約エラー: {} 件の作業単位が失敗しました", .failures.len())]
pub struct AggregateError {
    failures: Vec<ItemFailure>,
}

impl AggregateError {
    pub fn new(mut failures: Vec<ItemFailure>) -> Self {
        failures.sort_by_key(ItemFailure::tag);
        Self { failures }
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[ItemFailure] {
        &self.failures
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ItemFailure> {
        self.failures.iter()
    }

    pub fn tags(&self) -> Vec<SequenceTag> {
        self.failures.iter().map(ItemFailure::tag).collect()
    }

    pub fn into_failures(self) -> Vec<ItemFailure> {
        self.failures
    }
}

impl<'a> IntoIterator for &'a AggregateError {
    type Item = &'a ItemFailure;
    type IntoIter = std::slice::Iter<'a, ItemFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// 協調キャンセルで作業単位が中断したことを示すエラー
#[derive(Error, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[error("操作はキャンセルされました")]
pub struct OperationCancelled;

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 低重要度 - ログ出力程度
    Low,
    /// 中重要度 - 警告レベル
    Medium,
    /// 高重要度 - 要対応
    High,
    /// 致命的
    Critical,
}

impl ErrorSeverity {
    pub const fn as_level(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// エラーコンテキスト情報
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// 実行していた操作
    pub operation: String,
    /// 関連するリソース
    pub resource: Option<String>,
    /// エラー解決のための提案
    pub suggestion: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            resource: None,
            suggestion: None,
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// ループ実行の結果型
pub type LoopResult<T> = std::result::Result<T, LoopError>;

/// 検証結果 - バリデーション専用の結果型
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// バリデーション専用エラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("バリデーションエラー: {field} - {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<ValidationError> for LoopError {
    fn from(error: ValidationError) -> Self {
        LoopError::ArgumentError {
            argument: error.field,
            reason: error.reason,
        }
    }
}

impl From<anyhow::Error> for LoopError {
    fn from(error: anyhow::Error) -> Self {
        LoopError::InternalError { source: error }
    }
}

impl From<tokio::task::JoinError> for LoopError {
    fn from(error: tokio::task::JoinError) -> Self {
        LoopError::TaskError { source: error }
    }
}
