// 高レベル公開API
// ChunkedDispatchEngineを簡単に使用できるようにするための便利な関数
//
// 値を返す run_* と返さない for_each_* を、ソース3種類 × 同期/非同期で提供する。

use super::ChunkedDispatchEngine;
use crate::{
    core::{CancellationToken, LoopResult, WorkloadConfig},
    ruleset::{LoopRuleset, Steppable},
    services::{DiscardResults, IndexedCollator, ResultCollator, TracingProgressReporter},
    source::{AsyncForwardIterator, ForwardIterator, Partitioner},
};
use futures::future::BoxFuture;
use std::future::Future;

/// tracingへ進捗を流すエンジンを作成
fn tracing_engine<C: WorkloadConfig>(options: C) -> ChunkedDispatchEngine<C, TracingProgressReporter> {
    ChunkedDispatchEngine::new(options, TracingProgressReporter::new())
}

// ========================================
// インデックスループ
// ========================================

/// ルールセットが生成する各値で作業単位を実行し、結果をループ変数の昇順で返す
pub fn run_indexed_loop<N, R, C, F>(ruleset: LoopRuleset<N>, options: C, unit: F) -> LoopResult<Vec<R>>
where
    N: Steppable + Send,
    R: Send,
    C: WorkloadConfig,
    F: Fn(N, &CancellationToken) -> anyhow::Result<R> + Sync,
{
    tracing_engine(options)
        .execute(ruleset.values(), IndexedCollator::new(), |value, token| {
            unit(value, token).map(|result| (value, result))
        })?
        .into_result()
}

/// ルールセットが生成する各値で作業単位を実行する（戻り値なし）
pub fn for_each_indexed<N, C, F>(ruleset: LoopRuleset<N>, options: C, unit: F) -> LoopResult<()>
where
    N: Steppable + Send,
    C: WorkloadConfig,
    F: Fn(N, &CancellationToken) -> anyhow::Result<()> + Sync,
{
    tracing_engine(options)
        .execute(ruleset.values(), DiscardResults::new(), unit)?
        .into_result()
}

pub async fn run_indexed_loop_async<N, R, C, F, Fut>(
    ruleset: LoopRuleset<N>,
    options: C,
    unit: F,
) -> LoopResult<Vec<R>>
where
    N: Steppable + Send + 'static,
    R: Send + 'static,
    C: WorkloadConfig,
    F: Fn(N, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
{
    tracing_engine(options)
        .execute_async(ruleset.values(), IndexedCollator::new(), move |value, token| {
            let pending = unit(value, token);
            async move { pending.await.map(|result| (value, result)) }
        })
        .await?
        .into_result()
}

pub async fn for_each_indexed_async<N, C, F, Fut>(
    ruleset: LoopRuleset<N>,
    options: C,
    unit: F,
) -> LoopResult<()>
where
    N: Steppable + Send + 'static,
    C: WorkloadConfig,
    F: Fn(N, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    tracing_engine(options)
        .execute_async(ruleset.values(), DiscardResults::new(), unit)
        .await?
        .into_result()
}

// ========================================
// 有限シーケンス
// ========================================

/// シーケンスの各要素で作業単位を実行し、結果を元の順序で返す
pub fn run_sequence_loop<I, R, C, F>(source: I, options: C, unit: F) -> LoopResult<Vec<R>>
where
    I: IntoIterator,
    I::Item: Send,
    R: Send,
    C: WorkloadConfig,
    F: Fn(I::Item, &CancellationToken) -> anyhow::Result<R> + Sync,
{
    let partitioner = Partitioner::new(source, options.partition_size());
    tracing_engine(options)
        .execute(partitioner, ResultCollator::new(), unit)?
        .into_result()
}

pub fn for_each_sequence<I, C, F>(source: I, options: C, unit: F) -> LoopResult<()>
where
    I: IntoIterator,
    I::Item: Send,
    C: WorkloadConfig,
    F: Fn(I::Item, &CancellationToken) -> anyhow::Result<()> + Sync,
{
    let partitioner = Partitioner::new(source, options.partition_size());
    tracing_engine(options)
        .execute(partitioner, DiscardResults::new(), unit)?
        .into_result()
}

pub async fn run_sequence_loop_async<I, R, C, F, Fut>(
    source: I,
    options: C,
    unit: F,
) -> LoopResult<Vec<R>>
where
    I: IntoIterator,
    I::IntoIter: Send,
    I::Item: Send + 'static,
    R: Send + 'static,
    C: WorkloadConfig,
    F: Fn(I::Item, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
{
    let partitioner = Partitioner::new(source, options.partition_size());
    tracing_engine(options)
        .execute_async(partitioner, ResultCollator::new(), unit)
        .await?
        .into_result()
}

pub async fn for_each_sequence_async<I, C, F, Fut>(source: I, options: C, unit: F) -> LoopResult<()>
where
    I: IntoIterator,
    I::IntoIter: Send,
    I::Item: Send + 'static,
    C: WorkloadConfig,
    F: Fn(I::Item, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let partitioner = Partitioner::new(source, options.partition_size());
    tracing_engine(options)
        .execute_async(partitioner, DiscardResults::new(), unit)
        .await?
        .into_result()
}

// ========================================
// ストリーミング
// ========================================

/// `has_more` が真の間 `fetch_next` で1件ずつ読み出し、読み出し順に結果を返す
pub fn run_streaming_loop<Rd, T, R, C, H, P, F>(
    reader: Rd,
    has_more: H,
    fetch_next: P,
    options: C,
    unit: F,
) -> LoopResult<Vec<R>>
where
    H: FnMut(&mut Rd) -> bool,
    P: FnMut(&mut Rd) -> T,
    T: Send,
    R: Send,
    C: WorkloadConfig,
    F: Fn(T, &CancellationToken) -> anyhow::Result<R> + Sync,
{
    let iterator = ForwardIterator::new(reader, has_more, fetch_next);
    tracing_engine(options)
        .execute(iterator, ResultCollator::new(), unit)?
        .into_result()
}

pub fn for_each_streaming<Rd, T, C, H, P, F>(
    reader: Rd,
    has_more: H,
    fetch_next: P,
    options: C,
    unit: F,
) -> LoopResult<()>
where
    H: FnMut(&mut Rd) -> bool,
    P: FnMut(&mut Rd) -> T,
    T: Send,
    C: WorkloadConfig,
    F: Fn(T, &CancellationToken) -> anyhow::Result<()> + Sync,
{
    let iterator = ForwardIterator::new(reader, has_more, fetch_next);
    tracing_engine(options)
        .execute(iterator, DiscardResults::new(), unit)?
        .into_result()
}

/// 継続判定が非同期なストリーミングループ
pub async fn run_streaming_loop_async<Rd, T, R, C, H, P, F, Fut>(
    reader: Rd,
    has_more: H,
    fetch_next: P,
    options: C,
    unit: F,
) -> LoopResult<Vec<R>>
where
    Rd: Send,
    H: for<'a> FnMut(&'a mut Rd) -> BoxFuture<'a, bool> + Send,
    P: FnMut(&mut Rd) -> T + Send,
    T: Send + 'static,
    R: Send + 'static,
    C: WorkloadConfig,
    F: Fn(T, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
{
    let iterator = AsyncForwardIterator::new(reader, has_more, fetch_next);
    tracing_engine(options)
        .execute_async(iterator, ResultCollator::new(), unit)
        .await?
        .into_result()
}

pub async fn for_each_streaming_async<Rd, T, C, H, P, F, Fut>(
    reader: Rd,
    has_more: H,
    fetch_next: P,
    options: C,
    unit: F,
) -> LoopResult<()>
where
    Rd: Send,
    H: for<'a> FnMut(&'a mut Rd) -> BoxFuture<'a, bool> + Send,
    P: FnMut(&mut Rd) -> T + Send,
    T: Send + 'static,
    C: WorkloadConfig,
    F: Fn(T, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let iterator = AsyncForwardIterator::new(reader, has_more, fetch_next);
    tracing_engine(options)
        .execute_async(iterator, DiscardResults::new(), unit)
        .await?
        .into_result()
}
