use castkit_parallel::{
    for_each_async, for_each_async_with, for_each_async_with_result, for_each_ordered,
    CancellationFlag, ParallelRunner, RunError, RunnerConfig,
};
use castkit_test_utils::{init_tracing, int_list, paused_runtime, simulated_work, AdmissionTracker};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const SIZES: [usize; 5] = [0, 1, 5, 10, 100];

#[tokio::test]
async fn test_callback_once_per_item() {
    for n in SIZES {
        let mut calls = vec![0usize; n];
        for_each_async_with(
            int_list(n),
            |_| async { Ok::<_, String>(()) },
            |item| {
                calls[item] += 1;
                Ok(())
            },
            4,
        )
        .await
        .unwrap();

        assert!(calls.iter().all(|&c| c == 1), "n = {n}");
    }
}

#[tokio::test]
async fn test_callback_with_result_once_per_item() {
    for n in SIZES {
        let mut seen = Vec::new();
        for_each_async_with_result(
            int_list(n),
            |x| async move { Ok::<_, String>(x * 2) },
            |item, doubled| {
                seen.push((item, doubled));
                Ok(())
            },
            3,
        )
        .await
        .unwrap();

        seen.sort_unstable();
        let expected: Vec<_> = (0..n).map(|x| (x, x * 2)).collect();
        assert_eq!(seen, expected);
    }
}

#[tokio::test(start_paused = true)]
async fn test_ordered_reverse_latency() {
    let out = for_each_ordered(
        int_list(10),
        |x| async move {
            simulated_work(100 - 10 * x as u64).await;
            Ok::<_, String>(x.to_string())
        },
        10,
    )
    .await
    .unwrap();

    let expected: Vec<String> = (0..10).map(|x| x.to_string()).collect();
    assert_eq!(out, expected);
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_cap_respected() {
    for max_parallel in [1usize, 3, 10] {
        let tracker = AdmissionTracker::new();
        let violations = AtomicUsize::new(0);

        for_each_async(
            int_list(40),
            |x| {
                let tracker = Arc::clone(&tracker);
                let violations = &violations;
                async move {
                    let _admitted = tracker.enter();
                    if tracker.current() > max_parallel {
                        violations.fetch_add(1, Ordering::SeqCst);
                    }
                    simulated_work(1 + (x as u64 * 7) % 5).await;
                    Ok::<_, String>(())
                }
            },
            max_parallel,
        )
        .await
        .unwrap();

        assert_eq!(violations.load(Ordering::SeqCst), 0);
        assert_eq!(tracker.peak(), max_parallel);
        assert_eq!(tracker.total(), 40);
        assert_eq!(tracker.current(), 0);
    }
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_cap_covers_callbacks() {
    let max_parallel = 3;
    let tracker = AdmissionTracker::new();
    let mut violations = 0usize;

    for_each_async_with_result(
        int_list(20),
        |x| {
            let tracker = Arc::clone(&tracker);
            async move {
                let admitted = tracker.enter();
                simulated_work(1 + (x as u64 * 3) % 4).await;
                Ok::<_, String>(admitted)
            }
        },
        |_, admitted| {
            // The item is still admitted while its callback runs.
            if tracker.current() > max_parallel {
                violations += 1;
            }
            drop(admitted);
            Ok(())
        },
        max_parallel,
    )
    .await
    .unwrap();

    assert_eq!(violations, 0);
    assert_eq!(tracker.peak(), max_parallel);
    assert_eq!(tracker.total(), 20);
    assert_eq!(tracker.current(), 0);
}

#[tokio::test]
async fn test_zero_max_parallel_rejected_before_work() {
    let calls = AtomicUsize::new(0);
    let op = |_: usize| {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Ok::<_, String>(1) }
    };

    let err = for_each_ordered(int_list(5), op, 0).await.unwrap_err();
    assert!(matches!(err, RunError::InvalidArgument(_)));
    assert!(!err.attempted());

    let err = for_each_async(int_list(5), op, 0).await.unwrap_err();
    assert!(matches!(err, RunError::InvalidArgument(_)));

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failure_does_not_cancel_siblings() {
    init_tracing();
    let calls = AtomicUsize::new(0);

    let err = for_each_async(
        int_list(10),
        |x| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                simulated_work(5).await;
                if x == 3 {
                    Err(format!("item {x} failed"))
                } else {
                    Ok(())
                }
            }
        },
        2,
    )
    .await
    .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 10);
    assert!(err.is_partial());
    match err {
        RunError::Operation {
            index,
            error,
            completed,
            suppressed,
        } => {
            assert_eq!(index, 3);
            assert_eq!(error, "item 3 failed");
            assert_eq!(completed, 9);
            assert_eq!(suppressed, 0);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_callback_failure_does_not_cancel_siblings() {
    init_tracing();
    let started = AtomicUsize::new(0);
    let finished = AtomicUsize::new(0);
    let mut called = Vec::new();

    let err = for_each_async_with(
        int_list(10),
        |_| {
            started.fetch_add(1, Ordering::SeqCst);
            let finished = &finished;
            async move {
                simulated_work(5).await;
                finished.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        },
        |item| {
            called.push(item);
            if item == 0 {
                Err(format!("callback rejected item {item}"))
            } else {
                Ok(())
            }
        },
        4,
    )
    .await
    .unwrap_err();

    assert_eq!(started.load(Ordering::SeqCst), 10);
    assert_eq!(finished.load(Ordering::SeqCst), 10);
    called.sort_unstable();
    assert_eq!(called, int_list(10));
    match err {
        RunError::Operation {
            index,
            error,
            completed,
            suppressed,
        } => {
            assert_eq!(index, 0);
            assert_eq!(error, "callback rejected item 0");
            assert_eq!(completed, 9);
            assert_eq!(suppressed, 0);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_items_release_permits() {
    let calls = AtomicUsize::new(0);

    let err = for_each_async(
        int_list(5),
        |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>("always") }
        },
        1,
    )
    .await
    .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 5);
    match err {
        RunError::Operation {
            completed,
            suppressed,
            ..
        } => {
            assert_eq!(completed, 0);
            assert_eq!(suppressed, 4);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_ordered_failure_returns_no_results() {
    let err = for_each_ordered(
        int_list(4),
        |x| async move {
            if x == 2 {
                Err("two")
            } else {
                Ok(x)
            }
        },
        4,
    )
    .await
    .unwrap_err();

    assert_eq!(err.into_operation_error(), Some("two"));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_stops_admission() {
    let flag = CancellationFlag::new();
    let runner = ParallelRunner::new(
        RunnerConfig::new()
            .with_max_parallel(1)
            .with_cancellation(flag.clone()),
    );
    let calls = AtomicUsize::new(0);

    let err = runner
        .run_each(int_list(10), |x| {
            calls.fetch_add(1, Ordering::SeqCst);
            if x == 2 {
                flag.cancel();
            }
            async {
                simulated_work(1).await;
                Ok::<_, String>(())
            }
        })
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(err.completed(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_runner_from_toml_config() {
    let config = RunnerConfig::from_toml_str("max_parallel = 2").unwrap();
    let runner = ParallelRunner::new(config);
    assert!(!runner.cancel());

    let mut done = Vec::new();
    runner
        .run_each_with(
            vec!["x", "y"],
            |_| async { Ok::<_, String>(()) },
            |item| {
                done.push(item);
                Ok(())
            },
        )
        .await
        .unwrap();
    done.sort_unstable();
    assert_eq!(done, vec!["x", "y"]);

    let mut sums = Vec::new();
    runner
        .run_each_with_result(
            vec![1, 2],
            |x: i32| async move { Ok::<_, String>(x + 1) },
            |_, sum| {
                sums.push(sum);
                Ok(())
            },
        )
        .await
        .unwrap();
    sums.sort_unstable();
    assert_eq!(sums, vec![2, 3]);
}

#[test]
fn test_config_serializes_without_cancellation() {
    let config = RunnerConfig::new()
        .with_max_parallel(3)
        .with_cancellation(CancellationFlag::new());

    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json, serde_json::json!({ "max_parallel": 3 }));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_ordered_output_ignores_completion_order(
        n in prop::sample::select(SIZES.to_vec()),
        delays in proptest::collection::vec(0..50u64, 100),
        max_parallel in 1..12usize,
    ) {
        let rt = paused_runtime();
        let out = rt
            .block_on(for_each_ordered(
                int_list(n),
                |x| {
                    let delay = delays[x];
                    async move {
                        simulated_work(delay).await;
                        Ok::<_, String>(x.to_string())
                    }
                },
                max_parallel,
            ))
            .unwrap();

        let expected: Vec<String> = (0..n).map(|x| x.to_string()).collect();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn prop_admissions_never_exceed_limit(
        delays in proptest::collection::vec(0..20u64, 0..60),
        max_parallel in 1..8usize,
    ) {
        let rt = paused_runtime();
        let tracker = AdmissionTracker::new();
        let items = delays.len();

        rt.block_on(for_each_async(
            delays,
            |delay| {
                let tracker = Arc::clone(&tracker);
                async move {
                    let _admitted = tracker.enter();
                    simulated_work(delay).await;
                    Ok::<_, String>(())
                }
            },
            max_parallel,
        ))
        .unwrap();

        prop_assert!(tracker.peak() <= max_parallel);
        prop_assert_eq!(tracker.total(), items);
    }
}
