// 進捗監視機能
// 実行開始、チャンクのディスパッチ、作業単位の失敗、完了の通知

pub mod implementations;

// 公開API
pub use implementations::{ConsoleProgressReporter, NoOpProgressReporter, TracingProgressReporter};
