// 例外アグリゲーター - 作業単位の失敗を集めて1つの複合エラーにまとめる

use crate::core::{AggregateError, ItemFailure};
use crossbeam::queue::SegQueue;

/// 並行に追加される失敗の追記専用キュー
///
/// 失敗を捨てることも、追加時に処理を打ち切ることもない。
#[derive(Debug, Default)]
pub struct ExceptionAggregator {
    failures: SegQueue<ItemFailure>,
}

impl ExceptionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, failure: ItemFailure) {
        self.failures.push(failure);
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// 蓄積された失敗を取り出して複合エラーにする
    ///
    /// 失敗がなければ None。
    pub fn to_composite_error(&self) -> Option<AggregateError> {
        let mut failures = Vec::with_capacity(self.failures.len());
        while let Some(failure) = self.failures.pop() {
            failures.push(failure);
        }

        if failures.is_empty() {
            None
        } else {
            Some(AggregateError::new(failures))
        }
    }
}
