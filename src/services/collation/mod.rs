// 結果と失敗の照合
// 完了順に届く結果の並べ直しと、失敗の集約

pub mod aggregator;
pub mod collator;

// 公開API
pub use aggregator::ExceptionAggregator;
pub use collator::{DiscardResults, IndexedCollator, ResultCollator, ResultSink};
