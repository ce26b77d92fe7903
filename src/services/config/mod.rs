// 設定管理
// ワークロードのオプションとJSONファイルからの読み込み

pub mod implementations;

// 公開API
pub use implementations::WorkloadOptions;
