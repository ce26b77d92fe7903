// 協調キャンセルの統合テスト
use crate::fixtures::quiet_options;
use anyhow::Result;
use chunked_loop::{
    core::OperationCancelled, for_each_sequence_async, run_sequence_loop, CancellationToken,
    ChunkedDispatchEngine, LoopError, NoOpProgressReporter, Partitioner, ResultCollator,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[test]
fn test_cancelled_before_start_dispatches_nothing() {
    let token = CancellationToken::new();
    token.cancel();
    let calls = AtomicUsize::new(0);

    let result = run_sequence_loop(0..10, quiet_options(2).with_cancellation(token), |x: i32, _| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(x)
    });

    assert!(matches!(
        result,
        Err(LoopError::Cancelled {
            completed_items: 0,
            failed_items: 0
        })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_cancel_mid_run_keeps_completed_chunks() -> Result<()> {
    let token = CancellationToken::new();
    let engine = ChunkedDispatchEngine::new(
        quiet_options(2).with_cancellation(token.clone()),
        NoOpProgressReporter::new(),
    );

    let report = engine.execute(
        Partitioner::new(0..10, 2),
        ResultCollator::new(),
        |x: i32, token| {
            if x == 3 {
                token.cancel();
            }
            Ok(x * 10)
        },
    )?;

    // 2番目のチャンクは最後まで走り、3番目以降は取り出されない
    assert_eq!(report.summary.chunks_dispatched, 2);
    assert_eq!(report.summary.items_dispatched, 4);
    assert!(report.summary.cancelled);
    assert_eq!(report.results, vec![0, 10, 20, 30]);

    match report.into_result() {
        Err(LoopError::Cancelled {
            completed_items,
            failed_items,
        }) => {
            assert_eq!(completed_items, 4);
            assert_eq!(failed_items, 0);
        }
        other => panic!("キャンセルが期待されます: {other:?}"),
    }
    Ok(())
}

#[test]
fn test_cancellation_takes_precedence_over_failures() {
    let token = CancellationToken::new();

    let result = run_sequence_loop(
        0..6,
        quiet_options(3).with_cancellation(token.clone()),
        |x: i32, token| {
            if x == 1 {
                anyhow::bail!("x");
            }
            if x == 2 {
                token.cancel();
            }
            Ok(x)
        },
    );

    assert!(matches!(
        result,
        Err(LoopError::Cancelled {
            completed_items: 2,
            failed_items: 1
        })
    ));
}

#[test]
fn test_cancel_from_another_thread() {
    let token = CancellationToken::new();
    let calls = AtomicUsize::new(0);

    let canceller = {
        let token = token.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            token.cancel();
        })
    };

    let result = run_sequence_loop(
        0..100_000,
        quiet_options(4).with_cancellation(token),
        |x: u32, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(1));
            Ok(x)
        },
    );
    canceller.join().unwrap();

    let error = result.unwrap_err();
    assert!(error.is_cancelled());
    assert!(calls.load(Ordering::SeqCst) < 100_000);
    // チャンクは途中で打ち切られない
    assert_eq!(calls.load(Ordering::SeqCst) % 4, 0);
}

#[tokio::test]
async fn test_async_units_observe_cancellation() -> Result<()> {
    let token = CancellationToken::new();
    let engine = ChunkedDispatchEngine::new(
        quiet_options(3).with_cancellation(token.clone()),
        NoOpProgressReporter::new(),
    );

    let report = engine
        .execute_async(
            Partitioner::new(0..9, 3),
            ResultCollator::new(),
            |x: i32, token: CancellationToken| async move {
                if x == 0 {
                    token.cancel();
                    return anyhow::Ok(x);
                }
                tokio::select! {
                    _ = token.cancelled() => Err(anyhow::Error::new(OperationCancelled)),
                    _ = tokio::time::sleep(Duration::from_secs(10)) => anyhow::Ok(x),
                }
            },
        )
        .await?;

    assert!(report.summary.cancelled);
    assert_eq!(report.summary.items_dispatched, 3);
    assert_eq!(report.results, vec![0]);

    let aggregate = report.failures.expect("中断された作業単位が期待されます");
    assert_eq!(aggregate.len(), 2);
    assert!(aggregate.iter().all(|failure| failure.is_cancellation()));
    Ok(())
}

#[tokio::test]
async fn test_async_cancel_from_another_task() {
    let token = CancellationToken::new();
    let calls = std::sync::Arc::new(AtomicUsize::new(0));

    let canceller = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        })
    };

    let unit_calls = std::sync::Arc::clone(&calls);
    let result = for_each_sequence_async(
        0..10_000,
        quiet_options(2).with_cancellation(token),
        move |_: u32, _| {
            let calls = std::sync::Arc::clone(&unit_calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                anyhow::Ok(())
            }
        },
    )
    .await;
    canceller.await.unwrap();

    assert!(matches!(result, Err(LoopError::Cancelled { .. })));
    let calls = calls.load(Ordering::SeqCst);
    assert!(calls > 0 && calls < 10_000, "calls = {calls}");
}
