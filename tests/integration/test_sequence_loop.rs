// 有限シーケンスループの統合テスト
use crate::fixtures::{quiet_options, ConcurrencyGauge, RecordingReporter};
use anyhow::Result;
use chunked_loop::{
    for_each_sequence, for_each_sequence_async, run_sequence_loop, run_sequence_loop_async,
    ChunkedDispatchEngine, Partitioner, ResultCollator,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_squares_with_partition_size_two() -> Result<()> {
    let engine = ChunkedDispatchEngine::new(
        quiet_options(2).with_progress_reporting(true),
        RecordingReporter::new(),
    );

    let report = engine.execute(
        Partitioner::new(vec![1, 2, 3, 4, 5], 2),
        ResultCollator::new(),
        |x: i32, _| Ok(x * x),
    )?;

    assert_eq!(engine.reporter().chunk_sizes(), vec![2, 2, 1]);
    assert_eq!(report.summary.chunks_dispatched, 3);
    assert_eq!(report.into_result()?, vec![1, 4, 9, 16, 25]);
    Ok(())
}

#[test]
fn test_results_are_deterministic_across_partition_sizes() -> Result<()> {
    let source: Vec<u32> = (0..50).rev().collect();
    let expected: Vec<u32> = source.iter().map(|x| x * 7 + 1).collect();

    for partition_size in 1..=9 {
        let results = run_sequence_loop(source.clone(), quiet_options(partition_size), |x, _| {
            // 完了順をばらつかせる
            std::thread::sleep(Duration::from_micros(u64::from(x % 5) * 50));
            Ok(x * 7 + 1)
        })?;
        assert_eq!(results, expected, "partition_size = {partition_size}");
    }
    Ok(())
}

#[test]
fn test_in_flight_units_never_exceed_partition_size() -> Result<()> {
    let gauge = ConcurrencyGauge::new();

    for_each_sequence(0..24, quiet_options(3).with_worker_threads(8), |_: i32, _| {
        gauge.enter_blocking(Duration::from_millis(2));
        Ok(())
    })?;

    assert!(gauge.peak() <= 3, "peak = {}", gauge.peak());
    Ok(())
}

#[test]
fn test_empty_sequence() -> Result<()> {
    let calls = AtomicUsize::new(0);

    let results = run_sequence_loop(Vec::<String>::new(), quiet_options(4), |s, _| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(s.len())
    })?;

    assert!(results.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn test_borrowed_items() -> Result<()> {
    let words = ["chunk", "loop", "engine"];

    let lengths = run_sequence_loop(words.iter(), quiet_options(2), |word, _| Ok(word.len()))?;

    assert_eq!(lengths, vec![5, 4, 6]);
    Ok(())
}

#[tokio::test]
async fn test_async_sequence_preserves_order_with_uneven_latency() -> Result<()> {
    let source: Vec<u64> = (1..=12).collect();

    let results = run_sequence_loop_async(source, quiet_options(4), |x, _| async move {
        // 後の要素ほど早く終わる
        tokio::time::sleep(Duration::from_millis(13 - x)).await;
        Ok(x * 10)
    })
    .await?;

    assert_eq!(results, (1..=12).map(|x| x * 10).collect::<Vec<u64>>());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_async_in_flight_units_never_exceed_partition_size() -> Result<()> {
    let gauge = Arc::new(ConcurrencyGauge::new());

    let unit_gauge = Arc::clone(&gauge);
    for_each_sequence_async(0..20, quiet_options(5), move |_: i32, _| {
        let gauge = Arc::clone(&unit_gauge);
        async move {
            gauge.enter_async(Duration::from_millis(3)).await;
            Ok(())
        }
    })
    .await?;

    assert!(gauge.peak() <= 5, "peak = {}", gauge.peak());
    assert!(gauge.peak() >= 1);
    Ok(())
}
