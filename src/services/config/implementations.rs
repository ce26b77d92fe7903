// 設定管理の具象実装

use crate::core::{
    CancellationToken, LoopError, LoopResult, ValidationError, ValidationResult, WorkloadConfig,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// ワークロードのオプション
///
/// 実行前に一度だけ構築し、以降は読み取り専用で全作業単位に共有する。
/// キャンセルトークンはシリアライズ対象外。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadOptions {
    partition_size: usize,
    worker_threads: Option<usize>,
    enable_progress_reporting: bool,
    #[serde(skip)]
    cancellation: CancellationToken,
}

impl WorkloadOptions {
    pub fn new(cpu_count: usize) -> Self {
        Self {
            partition_size: cpu_count.max(1) * 2,
            worker_threads: None,
            enable_progress_reporting: true,
            cancellation: CancellationToken::new(),
        }
    }

    /// 1件ずつ順番に実行するプリセット
    pub fn sequential() -> Self {
        Self::default().with_partition_size(1)
    }

    /// 大量の軽い作業単位向けのプリセット
    pub fn high_throughput() -> Self {
        Self::default().with_partition_size(num_cpus::get().max(1) * 8)
    }

    pub fn with_partition_size(mut self, partition_size: usize) -> Self {
        self.partition_size = partition_size;
        self
    }

    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = Some(worker_threads);
        self
    }

    pub fn with_progress_reporting(mut self, enable: bool) -> Self {
        self.enable_progress_reporting = enable;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// JSON文字列から読み込み（省略したキーはデフォルト値）
    pub fn from_json_str(json: &str) -> LoopResult<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| LoopError::configuration(format!("JSON解析エラー: {e}")))?;
        options.validate()?;
        Ok(options)
    }

    /// JSONファイルから読み込み
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> LoopResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|e| LoopError::config_file(display.clone(), e.into()))?;
        let options: Self = serde_json::from_str(&contents)
            .map_err(|e| LoopError::config_file(display, e.into()))?;

        options.validate()?;
        Ok(options)
    }

    /// 値の妥当性を検証
    pub fn validate(&self) -> ValidationResult<()> {
        if self.partition_size == 0 {
            return Err(ValidationError::new(
                "partition_size",
                "値は1以上である必要があります",
            ));
        }

        if self.worker_threads == Some(0) {
            return Err(ValidationError::new(
                "worker_threads",
                "値は1以上である必要があります",
            ));
        }

        Ok(())
    }
}

impl Default for WorkloadOptions {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

impl WorkloadConfig for WorkloadOptions {
    fn partition_size(&self) -> usize {
        self.partition_size
    }

    fn worker_threads(&self) -> Option<usize> {
        self.worker_threads
    }

    fn enable_progress_reporting(&self) -> bool {
        self.enable_progress_reporting
    }

    fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }
}
