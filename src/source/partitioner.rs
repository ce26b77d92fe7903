// パーティショナー - 有限シーケンスの分割

use std::iter::{Peekable, Take};

/// 有限シーケンスを最大 `partition_size` 件ずつのパーティションに分割する
///
/// 単一パスのカーソルを持つためスレッドセーフではない。1つのディスパッチループが所有する。
pub struct Partitioner<I: Iterator> {
    source: Peekable<I>,
    partition_size: usize,
    emitted: usize,
}

impl<I: Iterator> Partitioner<I> {
    /// パーティショナーを作成
    ///
    /// `partition_size` が0の場合は1として扱う。
    pub fn new<S>(source: S, partition_size: usize) -> Self
    where
        S: IntoIterator<IntoIter = I>,
    {
        Self {
            source: source.into_iter().peekable(),
            partition_size: partition_size.max(1),
            emitted: 0,
        }
    }

    pub fn partition_size(&self) -> usize {
        self.partition_size
    }

    /// 未読の要素が残っているか
    pub fn has_more(&mut self) -> bool {
        self.source.peek().is_some()
    }

    /// 次のパーティションを取得
    ///
    /// 要素は遅延的に読み出される。ソースが尽きていれば空のパーティションを返す。
    pub fn next_partition(&mut self) -> Partition<'_, I> {
        if self.has_more() {
            self.emitted += 1;
        }

        Partition {
            inner: self.source.by_ref().take(self.partition_size),
        }
    }

    /// これまでに払い出した空でないパーティション数
    pub fn partitions_emitted(&self) -> usize {
        self.emitted
    }
}

/// 最大 `partition_size` 件の遅延バッチ
pub struct Partition<'a, I: Iterator> {
    inner: Take<&'a mut Peekable<I>>,
}

impl<I: Iterator> Iterator for Partition<'_, I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
