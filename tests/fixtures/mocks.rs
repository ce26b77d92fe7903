// テスト用のモック実装
// mockallの自動生成されたモックを使用

// 公開APIとしてmockallが生成したモックを再エクスポート
pub use chunked_loop::core::traits::{MockProgressReporter, MockWorkloadConfig};

use chunked_loop::CancellationToken;

/// 全ての呼び出しに固定値を返す設定モック
pub fn mock_config(
    partition_size: usize,
    worker_threads: Option<usize>,
    token: CancellationToken,
) -> MockWorkloadConfig {
    let mut config = MockWorkloadConfig::new();
    config.expect_partition_size().return_const(partition_size);
    config.expect_worker_threads().return_const(worker_threads);
    config.expect_enable_progress_reporting().return_const(true);
    config
        .expect_cancellation_token()
        .returning(move || token.clone());
    config
}
