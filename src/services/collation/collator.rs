// 結果コレーター - 完了順に届く結果をソース順へ並べ直す

use crate::core::SequenceTag;
use crate::ruleset::Steppable;
use dashmap::DashMap;
use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// 作業単位の結果の受け皿
///
/// `put` は作業単位の実行コンテキストから並行に呼ばれる。
/// 値を返す実行と返さない実行は実装の選択で切り替える。
pub trait ResultSink<R>: Send + Sync {
    /// 実行完了時に呼び出し側へ渡す出力
    type Output;

    fn put(&self, tag: SequenceTag, value: R);

    /// 受け取った結果の件数
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// タグ昇順で全結果を取り出す
    fn drain_ordered(&self) -> Self::Output;
}

/// タグをキーに結果を保持する並行アキュムレーター
///
/// 結果型に求めるのは `Send` のみ。各値は取り出しまで一度もロックされない
/// `Mutex` に包んで保持する。
#[derive(Debug)]
pub struct ResultCollator<R> {
    pending: DashMap<SequenceTag, Mutex<R>>,
}

impl<R> ResultCollator<R> {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: DashMap::with_capacity(capacity),
        }
    }
}

impl<R> Default for ResultCollator<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Send> ResultSink<R> for ResultCollator<R> {
    type Output = Vec<R>;

    fn put(&self, tag: SequenceTag, value: R) {
        // タグは1回の実行内で一意なので上書きは起きない
        self.pending.insert(tag, Mutex::new(value));
    }

    fn len(&self) -> usize {
        self.pending.len()
    }

    fn drain_ordered(&self) -> Vec<R> {
        let mut tags: Vec<SequenceTag> = self.pending.iter().map(|entry| *entry.key()).collect();
        tags.sort_unstable();

        tags.into_iter()
            .filter_map(|tag| self.pending.remove(&tag))
            .map(|(_, cell)| cell.into_inner().unwrap_or_else(PoisonError::into_inner))
            .collect()
    }
}

/// インデックスループ用のコレーター
///
/// 作業単位は `(ループ変数, 結果)` を返し、取り出し時にループ変数の数値順へ並べる。
/// 比較できない値（NaN など）同士は生成順を保つ。
#[derive(Debug)]
pub struct IndexedCollator<N, R> {
    inner: ResultCollator<(N, R)>,
}

impl<N, R> IndexedCollator<N, R> {
    pub fn new() -> Self {
        Self {
            inner: ResultCollator::new(),
        }
    }
}

impl<N, R> Default for IndexedCollator<N, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, R> ResultSink<(N, R)> for IndexedCollator<N, R>
where
    N: Steppable + Send,
    R: Send,
{
    type Output = Vec<R>;

    fn put(&self, tag: SequenceTag, value: (N, R)) {
        self.inner.put(tag, value);
    }

    fn len(&self) -> usize {
        ResultSink::<(N, R)>::len(&self.inner)
    }

    fn drain_ordered(&self) -> Vec<R> {
        let mut entries = self.inner.drain_ordered();
        entries.sort_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(CmpOrdering::Equal));
        entries.into_iter().map(|(_, value)| value).collect()
    }
}

/// 結果を捨てる受け皿（戻り値なしのループ用）
#[derive(Debug, Default)]
pub struct DiscardResults {
    received: AtomicUsize,
}

impl DiscardResults {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R> ResultSink<R> for DiscardResults {
    type Output = ();

    fn put(&self, _tag: SequenceTag, _value: R) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    fn len(&self) -> usize {
        self.received.load(Ordering::Relaxed)
    }

    fn drain_ordered(&self) {}
}
