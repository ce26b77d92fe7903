// 失敗の集約に関する統合テスト
use crate::fixtures::{quiet_options, RecordingReporter};
use anyhow::Result;
use chunked_loop::{
    core::{ErrorSeverity, FailureKind},
    run_sequence_loop, run_sequence_loop_async, ChunkedDispatchEngine, DiscardResults, LoopError,
    Partitioner, ResultCollator, SequenceTag,
};

#[test]
fn test_one_failure_of_five_keeps_four_results() -> Result<()> {
    let engine = ChunkedDispatchEngine::new(quiet_options(2), RecordingReporter::new());

    let report = engine.execute(
        Partitioner::new(1..=5, 2),
        ResultCollator::new(),
        |x: i32, _| {
            if x == 4 {
                anyhow::bail!("x");
            }
            Ok(x * x)
        },
    )?;

    // 兄弟の結果は失われない
    assert_eq!(report.results, vec![1, 4, 9, 25]);
    assert_eq!(report.summary.items_succeeded, 4);
    assert_eq!(report.summary.items_failed, 1);

    match report.into_result() {
        Err(LoopError::Aggregate(aggregate)) => {
            assert_eq!(aggregate.len(), 1);
            let failure = &aggregate.failures()[0];
            assert_eq!(failure.tag(), SequenceTag::new(3));
            assert_eq!(failure.kind(), FailureKind::Error);
            assert_eq!(failure.error().to_string(), "x");
        }
        other => panic!("集約エラーが期待されます: {other:?}"),
    }
    Ok(())
}

#[test]
fn test_aggregate_causes_are_exactly_the_failures() {
    let error = run_sequence_loop(0..20, quiet_options(3), |x: u32, _| {
        if x % 6 == 0 {
            anyhow::bail!("multiple of six: {x}");
        }
        Ok(x)
    })
    .unwrap_err();

    let aggregate = error.as_aggregate().expect("集約エラーが期待されます");
    let messages: Vec<String> = aggregate.iter().map(|f| f.error().to_string()).collect();

    assert_eq!(
        messages,
        vec![
            "multiple of six: 0",
            "multiple of six: 6",
            "multiple of six: 12",
            "multiple of six: 18",
        ]
    );
    assert_eq!(error.severity(), ErrorSeverity::Medium);
    assert!(error.is_recoverable());
}

#[test]
fn test_failures_are_reported_per_item() -> Result<()> {
    let engine = ChunkedDispatchEngine::new(
        quiet_options(4).with_progress_reporting(true),
        RecordingReporter::new(),
    );

    let report = engine.execute(
        Partitioner::new(vec!["1", "two", "3", "four"], 4),
        DiscardResults::new(),
        |s, _| {
            s.parse::<i32>()?;
            Ok(())
        },
    )?;

    assert_eq!(
        engine.reporter().failed_tags(),
        vec![SequenceTag::new(1), SequenceTag::new(3)]
    );
    let completed = engine.reporter().completed.lock().unwrap().clone();
    assert_eq!(completed.map(|summary| summary.items_failed), Some(2));
    assert_eq!(report.failures.map(|aggregate| aggregate.len()), Some(2));
    Ok(())
}

#[test]
fn test_panicking_unit_is_isolated() -> Result<()> {
    let engine = ChunkedDispatchEngine::new(quiet_options(3), RecordingReporter::new());

    let report = engine.execute(
        Partitioner::new(0..6, 3),
        ResultCollator::new(),
        |x: i32, _| {
            if x == 4 {
                panic!("unit {x} panicked");
            }
            Ok(x)
        },
    )?;

    assert_eq!(report.results, vec![0, 1, 2, 3, 5]);
    let aggregate = report.failures.expect("失敗が期待されます");
    assert_eq!(aggregate.failures()[0].kind(), FailureKind::Panic);
    assert_eq!(aggregate.failures()[0].error().to_string(), "unit 4 panicked");
    Ok(())
}

#[tokio::test]
async fn test_async_failures_are_aggregated() {
    let error = run_sequence_loop_async(
        vec![10, 0, 5, 0],
        quiet_options(2),
        |divisor: i32, _| async move {
            if divisor == 0 {
                anyhow::bail!("division by zero");
            }
            Ok(100 / divisor)
        },
    )
    .await
    .unwrap_err();

    let aggregate = error.as_aggregate().expect("集約エラーが期待されます");
    assert_eq!(aggregate.tags(), vec![SequenceTag::new(1), SequenceTag::new(3)]);
    assert!(aggregate
        .iter()
        .all(|failure| failure.error().to_string() == "division by zero"));
}
