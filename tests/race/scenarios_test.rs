/*!
 * Retry Driver Scenarios
 * End-to-end runs against a scripted gateway
 */

use super::common::ScriptedGateway;
use aio_race::core::limits::KERNEL_ERROR_ESRCH;
use aio_race::{run_race, ConfigError, DeleteStatus, DriverOutcome, RaceConfig, WaitMode};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

fn config() -> RaceConfig {
    RaceConfig::default()
        .with_max_attempts(100)
        .with_request_count(3)
        .with_target_index(0)
}

#[tokio::test]
async fn test_equal_codes_succeed_on_first_attempt() {
    let gateway = Arc::new(ScriptedGateway::new(0, Box::new(|_| (0, 0))));

    let report = run_race(Arc::clone(&gateway), config()).await.unwrap();

    assert_eq!(report.outcome, DriverOutcome::DoubleFree { attempt: 1 });
    assert_eq!(report.attempts, 1);
    assert_eq!(report.status_line(), "Double free achieved on attempt 1");
    assert_eq!(report.exit_code(), 0);
    assert_eq!(gateway.inspect(|c| c.submits), 1);
    assert_eq!(gateway.inspect(|c| c.race_deletes), 2);
}

#[tokio::test]
async fn test_clean_release_exhausts_attempts() {
    let gateway = Arc::new(ScriptedGateway::new(
        0,
        Box::new(|_| (0, KERNEL_ERROR_ESRCH)),
    ));

    let report = run_race(Arc::clone(&gateway), config()).await.unwrap();

    assert_eq!(report.outcome, DriverOutcome::Exhausted { issued: 100 });
    assert_eq!(report.retried, 100);
    assert_eq!(report.aborted, 0);
    assert_eq!(report.exit_code(), 1);
    assert_eq!(
        report.status_line(),
        "Double free not achieved after 100 attempts"
    );
    assert_eq!(gateway.inspect(|c| c.submits), 100);

    let pair = report.last_pair.unwrap();
    let mut statuses = [pair.racer, pair.main];
    statuses.sort_by_key(|s| s.code());
    assert_eq!(
        statuses,
        [DeleteStatus::NoSuchIdentifier, DeleteStatus::Accepted]
    );
}

#[tokio::test]
async fn test_success_at_attempt_51_and_not_later() {
    let gateway = Arc::new(ScriptedGateway::new(
        0,
        Box::new(|attempt| {
            if attempt <= 50 {
                (0, KERNEL_ERROR_ESRCH)
            } else {
                (KERNEL_ERROR_ESRCH, KERNEL_ERROR_ESRCH)
            }
        }),
    ));

    let report = run_race(Arc::clone(&gateway), config()).await.unwrap();

    assert_eq!(report.outcome, DriverOutcome::DoubleFree { attempt: 51 });
    assert_eq!(report.retried, 50);
    assert_eq!(gateway.inspect(|c| c.submits), 51);
    assert_eq!(gateway.inspect(|c| c.race_deletes), 102);
}

#[tokio::test]
async fn test_each_attempt_uses_fresh_full_batch() {
    let gateway = Arc::new(ScriptedGateway::new(
        2,
        Box::new(|_| (0, KERNEL_ERROR_ESRCH)),
    ));
    let config = RaceConfig::default()
        .with_max_attempts(5)
        .with_request_count(4)
        .with_target_index(2);

    run_race(Arc::clone(&gateway), config).await.unwrap();

    gateway.inspect(|calls| {
        assert_eq!(calls.batch_sizes, vec![4; 5]);
        assert_eq!(calls.returned_ids, vec![4; 5]);
        assert_eq!(calls.waits.len(), 5);

        let mut seen = Vec::new();
        for (ids, mode) in &calls.waits {
            assert_eq!(*mode, WaitMode::And);
            assert_eq!(ids.len(), 4);
            // no identifier carried over from an earlier attempt
            assert!(ids.iter().all(|id| !seen.contains(id)));
            seen.extend_from_slice(ids);
        }

        // one cleanup per attempt for the three non-target identifiers
        assert_eq!(calls.cleanup_deletes, 5);
    });
}

#[tokio::test]
async fn test_attempt_bound_is_respected() {
    let gateway = Arc::new(ScriptedGateway::new(
        0,
        Box::new(|_| (0, KERNEL_ERROR_ESRCH)),
    ));

    let report = run_race(Arc::clone(&gateway), config().with_max_attempts(3))
        .await
        .unwrap();

    assert_eq!(report.outcome, DriverOutcome::Exhausted { issued: 3 });
    assert_eq!(gateway.inspect(|c| c.submits), 3);
}

#[tokio::test]
async fn test_randomized_script_stops_at_first_match() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let plan: Vec<bool> = (0..100).map(|_| rng.gen_bool(0.05)).collect();
    let expected = plan.iter().position(|equal| *equal).map(|i| i as u32 + 1);

    let script_plan = plan.clone();
    let gateway = Arc::new(ScriptedGateway::new(
        0,
        Box::new(move |attempt| {
            if script_plan[attempt as usize - 1] {
                (0, 0)
            } else {
                (0, KERNEL_ERROR_ESRCH)
            }
        }),
    ));

    let report = run_race(Arc::clone(&gateway), config()).await.unwrap();

    match expected {
        Some(attempt) => {
            assert_eq!(report.outcome, DriverOutcome::DoubleFree { attempt });
            assert_eq!(gateway.inspect(|c| c.submits), attempt);
        }
        None => assert_eq!(report.outcome, DriverOutcome::Exhausted { issued: 100 }),
    }
}

#[tokio::test]
async fn test_out_of_range_target_is_rejected_before_submit() {
    let gateway = Arc::new(ScriptedGateway::new(0, Box::new(|_| (0, 0))));

    let err = run_race(Arc::clone(&gateway), config().with_target_index(5))
        .await
        .unwrap_err();

    assert_eq!(err, ConfigError::TargetOutOfRange { index: 5, count: 3 });
    assert_eq!(gateway.inspect(|c| c.submits), 0);
}
