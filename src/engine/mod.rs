// エンジン層 - チャンク分割ディスパッチとオーケストレーション
// ソース、照合サービス、進捗報告を組み合わせて高レベルな処理を提供

pub mod api;
pub mod dispatch;

// 公開API - 主要エンジンと便利関数
pub use api::{
    for_each_indexed, for_each_indexed_async, for_each_sequence, for_each_sequence_async,
    for_each_streaming, for_each_streaming_async, run_indexed_loop, run_indexed_loop_async,
    run_sequence_loop, run_sequence_loop_async, run_streaming_loop, run_streaming_loop_async,
};
pub use dispatch::ChunkedDispatchEngine;
