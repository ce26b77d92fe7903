// ChunkedDispatchEngine - チャンク単位のBSP型並列ディスパッチ
// ソースから最大 partition_size 件を取り出し、全件の完了を待ってから次のチャンクへ進む

use crate::core::{
    CancellationToken, FailureKind, ItemFailure, LoopError, LoopResult, ProgressReporter,
    RunReport, RunSummary, SequenceTag, SourceKind, WorkloadConfig,
};
use crate::services::collation::{ExceptionAggregator, ResultSink};
use crate::source::{AsyncChunkSource, ChunkSource};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// チャンク分割ディスパッチエンジン
///
/// 同期実行はrayonのスコープ、非同期実行はtokioタスクに作業単位を投入する。
/// 作業単位の失敗とパニックは隔離され、兄弟の作業単位を止めない。
pub struct ChunkedDispatchEngine<C, R> {
    config: Arc<C>,
    reporter: Arc<R>,
}

impl<C, R> ChunkedDispatchEngine<C, R>
where
    C: WorkloadConfig,
    R: ProgressReporter + 'static,
{
    pub fn new(config: C, reporter: R) -> Self {
        Self {
            config: Arc::new(config),
            reporter: Arc::new(reporter),
        }
    }

    /// 設定への参照を取得（読み取り専用アクセス）
    pub fn config(&self) -> &C {
        &self.config
    }

    /// レポーターへの参照を取得
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// ソースを同期的に最後まで実行する
    ///
    /// キャンセル時も完了済みの結果と失敗は `RunReport` に残る。
    pub fn execute<Src, S, T, F>(
        &self,
        mut source: Src,
        sink: S,
        unit: F,
    ) -> LoopResult<RunReport<S::Output>>
    where
        Src: ChunkSource,
        Src::Item: Send,
        S: ResultSink<T>,
        F: Fn(Src::Item, &CancellationToken) -> anyhow::Result<T> + Sync,
    {
        let partition_size = self.validated_partition_size()?;
        let pool = self.build_pool()?;
        let token = self.config.cancellation_token();
        let failures = ExceptionAggregator::new();
        let mut tracker = RunTracker::start(source.source_kind());
        self.announce_start(&tracker, partition_size);

        loop {
            if token.is_cancelled() {
                tracker.mark_cancelled();
                break;
            }

            let chunk = source.next_chunk(partition_size);
            if chunk.is_empty() {
                break;
            }
            let tagged = tracker.tag_chunk(chunk);
            self.announce_chunk(&tracker, tagged.len());

            let unit = &unit;
            let sink = &sink;
            let failures = &failures;
            let token = &token;
            let reporter = self.reporter.as_ref();
            let report = self.reporting_enabled();

            let dispatch = move || {
                rayon::scope(move |scope| {
                    for (tag, item) in tagged {
                        scope.spawn(move |_| {
                            let outcome =
                                panic::catch_unwind(AssertUnwindSafe(|| unit(item, token)));
                            match outcome {
                                Ok(Ok(value)) => sink.put(tag, value),
                                Ok(Err(error)) => record_failure(
                                    failures,
                                    reporter,
                                    report,
                                    ItemFailure::new(tag, error),
                                ),
                                Err(payload) => record_failure(
                                    failures,
                                    reporter,
                                    report,
                                    ItemFailure::panicked(tag, payload.as_ref()),
                                ),
                            }
                        });
                    }
                })
            };

            // スコープを抜けた時点でチャンク内の全作業単位が完了している
            match &pool {
                Some(pool) => pool.install(dispatch),
                None => dispatch(),
            }
        }

        Ok(self.finish::<S, T>(tracker, &sink, &failures))
    }

    /// ソースを非同期に最後まで実行する
    ///
    /// 各作業単位は個別のtokioタスクとして起動し、チャンク単位で全件の完了を待つ。
    pub async fn execute_async<Src, S, T, F, Fut>(
        &self,
        mut source: Src,
        sink: S,
        unit: F,
    ) -> LoopResult<RunReport<S::Output>>
    where
        Src: AsyncChunkSource,
        Src::Item: 'static,
        S: ResultSink<T> + 'static,
        T: Send + 'static,
        F: Fn(Src::Item, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let partition_size = self.validated_partition_size()?;
        let token = self.config.cancellation_token();
        let sink = Arc::new(sink);
        let unit = Arc::new(unit);
        let failures = Arc::new(ExceptionAggregator::new());
        let report = self.reporting_enabled();
        let mut tracker = RunTracker::start(source.source_kind());
        self.announce_start(&tracker, partition_size);

        loop {
            if token.is_cancelled() {
                tracker.mark_cancelled();
                break;
            }

            let chunk = source.next_chunk(partition_size).await;
            if chunk.is_empty() {
                break;
            }
            let tagged = tracker.tag_chunk(chunk);
            self.announce_chunk(&tracker, tagged.len());

            let mut tags = Vec::with_capacity(tagged.len());
            let mut handles = Vec::with_capacity(tagged.len());
            for (tag, item) in tagged {
                let unit = Arc::clone(&unit);
                let sink = Arc::clone(&sink);
                let failures = Arc::clone(&failures);
                let reporter = Arc::clone(&self.reporter);
                let token = token.clone();

                tags.push(tag);
                handles.push(tokio::spawn(async move {
                    match (*unit)(item, token).await {
                        Ok(value) => sink.put(tag, value),
                        Err(error) => record_failure(
                            &failures,
                            reporter.as_ref(),
                            report,
                            ItemFailure::new(tag, error),
                        ),
                    }
                }));
            }

            // チャンク全体の完了を待機
            for (tag, joined) in tags.into_iter().zip(join_all(handles).await) {
                if let Err(join_error) = joined {
                    record_failure(
                        &failures,
                        self.reporter.as_ref(),
                        report,
                        ItemFailure::from_join_error(tag, join_error),
                    );
                }
            }
        }

        Ok(self.finish::<S, T>(tracker, sink.as_ref(), failures.as_ref()))
    }

    /// ディスパッチ前の設定検証
    fn validated_partition_size(&self) -> LoopResult<usize> {
        let partition_size = self.config.partition_size();
        if partition_size == 0 {
            return Err(LoopError::argument(
                "partition_size",
                "1以上である必要があります",
            ));
        }

        if self.config.worker_threads() == Some(0) {
            return Err(LoopError::argument(
                "worker_threads",
                "1以上である必要があります",
            ));
        }

        Ok(partition_size)
    }

    /// worker_threads が指定されていれば専用プールを構築
    fn build_pool(&self) -> LoopResult<Option<rayon::ThreadPool>> {
        self.config
            .worker_threads()
            .map(|threads| {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|index| format!("chunked-loop-{index}"))
                    .build()
                    .map_err(LoopError::executor)
            })
            .transpose()
    }

    fn reporting_enabled(&self) -> bool {
        self.config.enable_progress_reporting()
    }

    fn announce_start(&self, tracker: &RunTracker, partition_size: usize) {
        debug!(source_kind = %tracker.source_kind, partition_size, "ディスパッチを開始します");
        if self.reporting_enabled() {
            self.reporter
                .report_started(tracker.source_kind, partition_size);
        }
    }

    fn announce_chunk(&self, tracker: &RunTracker, chunk_len: usize) {
        let chunk_index = tracker.chunks - 1;
        debug!(chunk_index, chunk_len, "チャンクをディスパッチします");
        if self.reporting_enabled() {
            self.reporter.report_chunk(chunk_index, chunk_len);
        }
    }

    fn finish<S, T>(
        &self,
        tracker: RunTracker,
        sink: &S,
        failures: &ExceptionAggregator,
    ) -> RunReport<S::Output>
    where
        S: ResultSink<T>,
    {
        let summary = tracker.finish(sink.len(), failures.len());
        let failures = failures.to_composite_error();
        let results = sink.drain_ordered();

        if summary.cancelled {
            warn!(
                completed = summary.items_succeeded,
                failed = summary.items_failed,
                "キャンセルを検知したため残りのチャンクを破棄しました"
            );
        } else {
            debug!(
                chunks = summary.chunks_dispatched,
                items = summary.items_dispatched,
                failed = summary.items_failed,
                "ディスパッチが完了しました"
            );
        }

        if self.reporting_enabled() {
            self.reporter.report_completed(&summary);
        }

        RunReport {
            results,
            failures,
            summary,
        }
    }
}

fn record_failure<R: ProgressReporter + ?Sized>(
    failures: &ExceptionAggregator,
    reporter: &R,
    report: bool,
    failure: ItemFailure,
) {
    match failure.kind() {
        FailureKind::Panic => {
            warn!(tag = %failure.tag(), error = %failure.error(), "作業単位がパニックしました")
        }
        FailureKind::Error => {
            debug!(tag = %failure.tag(), error = %failure.error(), "作業単位が失敗しました")
        }
    }

    if report {
        reporter.report_item_failed(failure.tag(), failure.error());
    }
    failures.add(failure);
}

/// 実行中の採番と計測
///
/// 制御ループだけが所有し、作業単位からは触らない。
struct RunTracker {
    source_kind: SourceKind,
    next_tag: SequenceTag,
    chunks: usize,
    items: usize,
    cancelled: bool,
    started_at: DateTime<Utc>,
    clock: Instant,
}

impl RunTracker {
    fn start(source_kind: SourceKind) -> Self {
        Self {
            source_kind,
            next_tag: SequenceTag::new(0),
            chunks: 0,
            items: 0,
            cancelled: false,
            started_at: Utc::now(),
            clock: Instant::now(),
        }
    }

    /// ソースの列挙順にタグを振る
    fn tag_chunk<T>(&mut self, chunk: Vec<T>) -> Vec<(SequenceTag, T)> {
        self.chunks += 1;
        self.items += chunk.len();

        chunk
            .into_iter()
            .map(|item| {
                let tag = self.next_tag;
                self.next_tag = tag.next();
                (tag, item)
            })
            .collect()
    }

    fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    fn finish(self, succeeded: usize, failed: usize) -> RunSummary {
        RunSummary {
            source_kind: self.source_kind,
            chunks_dispatched: self.chunks,
            items_dispatched: self.items,
            items_succeeded: succeeded,
            items_failed: failed,
            cancelled: self.cancelled,
            started_at: self.started_at,
            finished_at: Utc::now(),
            elapsed_ms: self.clock.elapsed().as_millis() as u64,
        }
    }
}
