/*!
 * Coordinator Against a Mocked Gateway
 */

use aio_race::core::errors::GatewayResult;
use aio_race::core::limits::KERNEL_ERROR_ESRCH;
use aio_race::{
    AioRequest, AttemptError, CommandWord, ErrorSlot, GatewayError, Priority, RaceConfig,
    RaceCoordinator, RequestId, SyscallGateway, Verdict, WaitMode,
};
use mockall::mock;
use mockall::predicate::eq;
use std::sync::Arc;

mock! {
    pub Gateway {}

    impl SyscallGateway for Gateway {
        fn submit(
            &self,
            command: CommandWord,
            batch: &[AioRequest],
            priority: Priority,
        ) -> GatewayResult<Vec<RequestId>>;

        fn wait(
            &self,
            ids: &[RequestId],
            mode: WaitMode,
            timeout_usec: u32,
        ) -> GatewayResult<Vec<ErrorSlot>>;

        fn delete(&self, ids: &[RequestId], slots: &mut [ErrorSlot]);
    }
}

#[tokio::test]
async fn test_custom_priority_and_timeout_reach_gateway() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_submit()
        .withf(|_, batch, prio| batch.len() == 2 && *prio == Priority::Mid)
        .times(1)
        .returning(|_, _, _| Ok(vec![RequestId(5), RequestId(6)]));
    gateway
        .expect_wait()
        .with(
            eq(vec![RequestId(5), RequestId(6)]),
            eq(WaitMode::And),
            eq(2_000u32),
        )
        .times(1)
        .returning(|ids, _, _| Ok(vec![ErrorSlot::EMPTY; ids.len()]));
    gateway
        .expect_delete()
        .withf(|ids, _| ids == [RequestId(6)])
        .times(2)
        .returning(|_, slots| slots[0] = ErrorSlot(KERNEL_ERROR_ESRCH));
    gateway
        .expect_delete()
        .withf(|ids, _| ids == [RequestId(5)])
        .times(1)
        .returning(|_, slots| slots[0] = ErrorSlot::EMPTY);

    let config = RaceConfig::default()
        .with_request_count(2)
        .with_target_index(1)
        .with_priority(Priority::Mid)
        .with_wait_timeout(2_000);
    let coordinator = RaceCoordinator::new(Arc::new(gateway), config).unwrap();

    let record = coordinator.run_attempt(1).await.unwrap();
    assert_eq!(record.target, RequestId(6));
    assert_eq!(record.verdict, Verdict::Success);
    assert!(!record.pair.both_accepted());
}

#[tokio::test]
async fn test_wait_timeout_aborts_attempt() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_submit()
        .returning(|_, batch, _| Ok((0..batch.len() as i32).map(RequestId).collect()));
    gateway
        .expect_wait()
        .returning(|_, _, _| Err(GatewayError::Wait { code: -60 }));
    gateway
        .expect_delete()
        .times(1)
        .returning(|ids, slots| {
            assert_eq!(ids.len(), 3);
            slots.fill(ErrorSlot::EMPTY);
        });

    let coordinator = RaceCoordinator::new(Arc::new(gateway), RaceConfig::default()).unwrap();
    let err = coordinator.run_attempt(1).await.unwrap_err();
    assert_eq!(err, AttemptError::Gateway(GatewayError::Wait { code: -60 }));
    assert!(err.is_retryable());
}
