// ストリーミングループの統合テスト
use crate::fixtures::{quiet_options, temp_file_with};
use anyhow::Result;
use chunked_loop::{
    cli::{count_words, LineCursor, LineWordCount},
    for_each_streaming, run_streaming_loop, run_streaming_loop_async, ChunkedDispatchEngine,
    ForwardIterator, NoOpProgressReporter, ResultCollator, SourceKind,
};
use futures::FutureExt;
use std::collections::VecDeque;
use std::fs::File;
use std::io::BufReader;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// 長さを公開しないソースを模したプル型リーダー
struct PullCounter {
    remaining: usize,
    pulls: usize,
}

impl PullCounter {
    fn new(remaining: usize) -> Self {
        Self {
            remaining,
            pulls: 0,
        }
    }

    fn has_more(&mut self) -> bool {
        self.remaining > 0
    }

    fn pull(&mut self) -> usize {
        self.remaining -= 1;
        self.pulls += 1;
        self.pulls
    }
}

#[test]
fn test_n_pulls_yield_n_dispatches_in_pull_order() -> Result<()> {
    let dispatched = AtomicUsize::new(0);

    let results = run_streaming_loop(
        PullCounter::new(11),
        PullCounter::has_more,
        PullCounter::pull,
        quiet_options(4),
        |n, _| {
            dispatched.fetch_add(1, Ordering::SeqCst);
            Ok(n * 100)
        },
    )?;

    assert_eq!(dispatched.load(Ordering::SeqCst), 11);
    assert_eq!(results, (1..=11).map(|n| n * 100).collect::<Vec<usize>>());
    Ok(())
}

#[test]
fn test_streaming_summary_counts_pulls() -> Result<()> {
    let engine = ChunkedDispatchEngine::new(quiet_options(3), NoOpProgressReporter::new());
    let iterator = ForwardIterator::new(
        VecDeque::from(vec!['a', 'b', 'c', 'd']),
        |queue: &mut VecDeque<char>| !queue.is_empty(),
        |queue: &mut VecDeque<char>| queue.pop_front().unwrap_or('?'),
    );

    let report = engine.execute(iterator, ResultCollator::new(), |c: char, _| {
        Ok(c.to_ascii_uppercase())
    })?;

    assert_eq!(report.summary.source_kind, SourceKind::Streaming);
    assert_eq!(report.summary.items_dispatched, 4);
    assert_eq!(report.summary.chunks_dispatched, 2);
    assert_eq!(report.into_result()?, vec!['A', 'B', 'C', 'D']);
    Ok(())
}

#[test]
fn test_for_each_streaming_with_immediately_false_condition() -> Result<()> {
    let calls = AtomicUsize::new(0);

    for_each_streaming(
        (),
        |_: &mut ()| false,
        |_: &mut ()| 0u8,
        quiet_options(2),
        |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
    )?;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn test_file_lines_streamed_through_line_cursor() -> Result<()> {
    let file = temp_file_with("one\ntwo words\n\nfour little words here\n");
    let reader = BufReader::new(File::open(file.path())?);

    let counts = run_streaming_loop(
        LineCursor::new(reader),
        LineCursor::has_more,
        LineCursor::next_line,
        quiet_options(2),
        count_words,
    )?;

    assert_eq!(
        counts,
        vec![
            LineWordCount { line: 1, words: 1 },
            LineWordCount { line: 2, words: 2 },
            LineWordCount { line: 3, words: 0 },
            LineWordCount { line: 4, words: 4 },
        ]
    );
    Ok(())
}

/// チャネルの次の値を先読みする非同期リーダー
struct ChannelReader {
    receiver: mpsc::Receiver<String>,
    next: Option<String>,
}

#[tokio::test]
async fn test_async_condition_reads_from_channel() -> Result<()> {
    let (sender, receiver) = mpsc::channel(4);
    let producer = tokio::spawn(async move {
        for word in ["red", "green", "blue", "cyan", "magenta"] {
            if sender.send(word.to_string()).await.is_err() {
                break;
            }
        }
    });

    let reader = ChannelReader {
        receiver,
        next: None,
    };

    let results = run_streaming_loop_async(
        reader,
        |reader: &mut ChannelReader| {
            async move {
                reader.next = reader.receiver.recv().await;
                reader.next.is_some()
            }
            .boxed()
        },
        |reader: &mut ChannelReader| reader.next.take().unwrap_or_default(),
        quiet_options(2),
        |word: String, _| async move { Ok(word.len()) },
    )
    .await?;

    producer.await?;
    assert_eq!(results, vec![3, 5, 4, 4, 7]);
    Ok(())
}
