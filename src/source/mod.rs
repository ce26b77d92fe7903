// 反復ソース - エンジンにチャンク単位で要素を供給する閉じた集合
//
// インデックスループ、有限シーケンス、ストリーミングの3種類のみ。

pub mod forward;
pub mod partitioner;

pub use forward::{AsyncForwardIterator, ForwardIterator};
pub use partitioner::{Partition, Partitioner};

use crate::core::SourceKind;
use crate::ruleset::{RulesetValues, Steppable};
use async_trait::async_trait;
use futures::future::BoxFuture;

mod sealed {
    pub trait Sealed {}
}

/// 同期エンジン向けのチャンク供給トレイト
///
/// 空のチャンクはソースの枯渇を意味する。
pub trait ChunkSource: sealed::Sealed {
    type Item;

    fn source_kind(&self) -> SourceKind;

    /// 最大 `max` 件の要素を読み出す
    fn next_chunk(&mut self, max: usize) -> Vec<Self::Item>;
}

/// 非同期エンジン向けのチャンク供給トレイト
#[async_trait]
pub trait AsyncChunkSource: Send + sealed::Sealed {
    type Item: Send;

    fn source_kind(&self) -> SourceKind;

    /// 最大 `max` 件の要素を読み出す
    async fn next_chunk(&mut self, max: usize) -> Vec<Self::Item>;
}

// インデックスループ

impl<T: Steppable> sealed::Sealed for RulesetValues<T> {}

impl<T: Steppable> ChunkSource for RulesetValues<T> {
    type Item = T;

    fn source_kind(&self) -> SourceKind {
        SourceKind::Indexed
    }

    fn next_chunk(&mut self, max: usize) -> Vec<T> {
        self.by_ref().take(max).collect()
    }
}

#[async_trait]
impl<T: Steppable + Send> AsyncChunkSource for RulesetValues<T> {
    type Item = T;

    fn source_kind(&self) -> SourceKind {
        SourceKind::Indexed
    }

    async fn next_chunk(&mut self, max: usize) -> Vec<T> {
        self.by_ref().take(max).collect()
    }
}

// 有限シーケンス

impl<I: Iterator> sealed::Sealed for Partitioner<I> {}

impl<I: Iterator> ChunkSource for Partitioner<I> {
    type Item = I::Item;

    fn source_kind(&self) -> SourceKind {
        SourceKind::Sequence
    }

    fn next_chunk(&mut self, max: usize) -> Vec<I::Item> {
        self.next_partition().take(max).collect()
    }
}

#[async_trait]
impl<I> AsyncChunkSource for Partitioner<I>
where
    I: Iterator + Send,
    I::Item: Send,
{
    type Item = I::Item;

    fn source_kind(&self) -> SourceKind {
        SourceKind::Sequence
    }

    async fn next_chunk(&mut self, max: usize) -> Vec<I::Item> {
        self.next_partition().take(max).collect()
    }
}

// ストリーミング

impl<Rd, C, P, T> sealed::Sealed for ForwardIterator<Rd, C, P, T> {}

impl<Rd, C, P, T> ChunkSource for ForwardIterator<Rd, C, P, T>
where
    C: FnMut(&mut Rd) -> bool,
    P: FnMut(&mut Rd) -> T,
{
    type Item = T;

    fn source_kind(&self) -> SourceKind {
        SourceKind::Streaming
    }

    fn next_chunk(&mut self, max: usize) -> Vec<T> {
        self.by_ref().take(max).collect()
    }
}

#[async_trait]
impl<Rd, C, P, T> AsyncChunkSource for ForwardIterator<Rd, C, P, T>
where
    Rd: Send,
    C: FnMut(&mut Rd) -> bool + Send,
    P: FnMut(&mut Rd) -> T + Send,
    T: Send,
{
    type Item = T;

    fn source_kind(&self) -> SourceKind {
        SourceKind::Streaming
    }

    async fn next_chunk(&mut self, max: usize) -> Vec<T> {
        self.by_ref().take(max).collect()
    }
}

impl<Rd, C, P, T> sealed::Sealed for AsyncForwardIterator<Rd, C, P, T> {}

#[async_trait]
impl<Rd, C, P, T> AsyncChunkSource for AsyncForwardIterator<Rd, C, P, T>
where
    Rd: Send,
    C: for<'a> FnMut(&'a mut Rd) -> BoxFuture<'a, bool> + Send,
    P: FnMut(&mut Rd) -> T + Send,
    T: Send,
{
    type Item = T;

    fn source_kind(&self) -> SourceKind {
        SourceKind::Streaming
    }

    async fn next_chunk(&mut self, max: usize) -> Vec<T> {
        let mut chunk = Vec::with_capacity(max);
        while chunk.len() < max && !self.is_exhausted() && self.read().await {
            if let Some(item) = self.take_current() {
                chunk.push(item);
            }
        }
        chunk
    }
}
