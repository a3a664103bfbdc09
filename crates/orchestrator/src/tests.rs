//! Unit tests for the batch swap orchestrator

#[cfg(test)]
mod unit_tests {
    use crate::{
        BalanceRefresher, BatchError, BatchPolicy, BatchSwapOrchestrator, BuilderError,
        RefreshError, SubmitError, SwapError, SwapOutcome, SwapSubmitter,
    };
    use async_trait::async_trait;
    use batch_swap_retry::RetryPolicy;
    use batch_swap_tracker::{LedgerError, StatusReader, TrackerConfig, TransactionTracker};
    use batch_swap_types::{
        FailureKind, SwapEvent, SwapNotifier, SwapRequest, SwapSubmission, Token, TransactionOutcome, TxHash,
        TxKey, TxStatus,
    };
    use rust_decimal::Decimal;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    const APT: &str = "0x1::aptos_coin::AptosCoin";

    // ==================== Mocks ====================

    /// Submits every swap except those whose input is listed in `rejected`
    #[derive(Default)]
    struct MockSubmitter {
        rejected: HashSet<String>,
        calls: Mutex<Vec<SwapSubmission>>,
    }

    impl MockSubmitter {
        fn rejecting(addresses: &[&str]) -> Self {
            Self {
                rejected: addresses.iter().map(|a| a.to_string()).collect(),
                ..Default::default()
            }
        }

        fn submitted(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|s| s.input.clone())
                .collect()
        }
    }

    #[async_trait]
    impl SwapSubmitter for MockSubmitter {
        async fn submit(&self, swap: &SwapSubmission) -> Result<TxHash, SubmitError> {
            self.calls.lock().unwrap().push(swap.clone());
            if self.rejected.contains(&swap.input) {
                return Err(SubmitError::UserRejected);
            }
            Ok(hash_for(&swap.input))
        }
    }

    /// Confirms every hash as successful unless told otherwise
    #[derive(Default)]
    struct MockLedger {
        reverted: HashSet<TxHash>,
        unindexed: HashSet<TxHash>,
        calls: AtomicU32,
    }

    #[async_trait]
    impl StatusReader for MockLedger {
        async fn get_status(&self, hash: &TxHash) -> Result<TransactionOutcome, LedgerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.unindexed.contains(hash) {
                Err(LedgerError::NotFound(hash.clone()))
            } else if self.reverted.contains(hash) {
                Ok(TransactionOutcome::failed().with_gas_used("15"))
            } else {
                Ok(TransactionOutcome::success().with_gas_used("120"))
            }
        }
    }

    #[derive(Default)]
    struct MockRefresher {
        calls: AtomicU32,
        should_fail: bool,
    }

    #[async_trait]
    impl BalanceRefresher for MockRefresher {
        async fn refresh(&self, _account: &str) -> Result<(), RefreshError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.should_fail {
                return Err(RefreshError::Failed("node unavailable".to_string()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<SwapEvent>>,
    }

    impl SwapNotifier for RecordingNotifier {
        fn notify(&self, event: &SwapEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    struct Harness {
        orchestrator: BatchSwapOrchestrator,
        tracker: Arc<TransactionTracker>,
        submitter: Arc<MockSubmitter>,
        ledger: Arc<MockLedger>,
        refresher: Arc<MockRefresher>,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness(submitter: MockSubmitter, ledger: MockLedger, refresher: MockRefresher) -> Harness {
        let ledger = Arc::new(ledger);
        let config = TrackerConfig {
            confirmation: RetryPolicy::new(2, Duration::from_millis(1))
                .with_attempt_timeout(Duration::from_millis(100)),
            ..Default::default()
        };
        let tracker = Arc::new(TransactionTracker::with_config(ledger.clone(), config));
        let submitter = Arc::new(submitter);
        let refresher = Arc::new(refresher);
        let notifier = Arc::new(RecordingNotifier::default());

        let orchestrator = BatchSwapOrchestrator::builder()
            .with_tracker(tracker.clone())
            .with_submitter(submitter.clone())
            .with_refresher(refresher.clone())
            .with_notifier(notifier.clone())
            .build()
            .unwrap();

        Harness {
            orchestrator,
            tracker,
            submitter,
            ledger,
            refresher,
            notifier,
        }
    }

    fn hash_for(address: &str) -> TxHash {
        TxHash::new(format!("0xhash_{address}"))
    }

    fn apt() -> Token {
        Token::new(APT, "APT", 8)
    }

    fn request(address: &str, symbol: &str) -> SwapRequest {
        SwapRequest::new(Token::new(address, symbol, 6), apt(), "10")
            .with_quote(Decimal::new(1974, 2), Decimal::ONE)
    }

    fn three_requests() -> Vec<SwapRequest> {
        vec![
            request("usdc", "USDC"),
            request("weth", "WETH"),
            request("dai", "DAI"),
        ]
    }

    fn no_delay() -> BatchPolicy {
        BatchPolicy::default().with_delay(Duration::ZERO)
    }

    // ==================== Policy Tests ====================

    #[test]
    fn test_policy_defaults() {
        let policy = BatchPolicy::default();
        assert!(!policy.stop_on_error);
        assert_eq!(policy.delay_between_swaps, Duration::from_secs(2));
        assert_eq!(policy.max_price_impact, Decimal::TEN);
        assert!(!policy.exceeds_price_impact(None));
        assert!(!policy.exceeds_price_impact(Some(Decimal::TEN)));
        assert!(policy.exceeds_price_impact(Some(Decimal::new(1001, 2))));
    }

    // ==================== Builder Tests ====================

    #[test]
    fn test_builder_requires_collaborators() {
        let result = BatchSwapOrchestrator::builder()
            .with_submitter(Arc::new(MockSubmitter::default()))
            .build();

        match result {
            Err(BuilderError::MissingField { field }) => assert_eq!(field, "tracker"),
            Ok(_) => panic!("builder accepted a missing tracker"),
        }
    }

    // ==================== Batch Flow Tests ====================

    #[tokio::test]
    async fn test_all_swaps_succeed() {
        let h = harness(
            MockSubmitter::default(),
            MockLedger::default(),
            MockRefresher::default(),
        );

        let summary = h
            .orchestrator
            .run_batch(&three_requests(), &apt(), &no_delay(), "0xaccount")
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed, 0);
        assert!(!summary.stopped_early);
        assert_eq!(h.refresher.calls.load(Ordering::SeqCst), 1);

        let records = h.tracker.transactions().await;
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.status == TxStatus::Success));
        assert!(records.iter().all(|r| !r.key.is_placeholder()));
        assert_eq!(records[0].gas_used.as_deref(), Some("120"));

        let submitted = h.submitter.calls.lock().unwrap().clone();
        assert!(submitted.iter().all(|s| s.output == APT));
    }

    #[tokio::test]
    async fn test_stop_on_error_halts_batch() {
        let h = harness(
            MockSubmitter::rejecting(&["weth"]),
            MockLedger::default(),
            MockRefresher::default(),
        );
        let policy = no_delay().with_stop_on_error(true);

        let summary = h
            .orchestrator
            .run_batch(&three_requests(), &apt(), &policy, "0xaccount")
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert!(summary.stopped_early);
        assert_eq!(h.submitter.submitted(), vec!["usdc", "weth"]);

        let records = h.tracker.transactions().await;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.input.address != "dai"));
    }

    #[tokio::test]
    async fn test_failure_without_stop_continues() {
        let h = harness(
            MockSubmitter::rejecting(&["weth"]),
            MockLedger::default(),
            MockRefresher::default(),
        );

        let summary = h
            .orchestrator
            .run_batch(&three_requests(), &apt(), &no_delay(), "0xaccount")
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(h.submitter.submitted(), vec!["usdc", "weth", "dai"]);

        match &summary.outcomes[1] {
            SwapOutcome::Errored {
                key,
                error: SwapError::SubmissionRejected { symbol, .. },
            } => {
                assert!(key.is_placeholder());
                assert_eq!(symbol, "WETH");
                let record = h.tracker.store().get(key).await.unwrap();
                assert_eq!(record.status, TxStatus::Failed);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_high_price_impact_is_skipped() {
        let h = harness(
            MockSubmitter::default(),
            MockLedger::default(),
            MockRefresher::default(),
        );
        let risky = SwapRequest::new(Token::new("meme", "MEME", 8), apt(), "10")
            .with_quote(Decimal::ONE, Decimal::from(15));

        let summary = h
            .orchestrator
            .run_batch(&[risky], &apt(), &no_delay(), "0xaccount")
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].symbol, "MEME");
        assert!(h.submitter.submitted().is_empty());
        assert_eq!(h.ledger.calls.load(Ordering::SeqCst), 0);
        assert!(h.tracker.transactions().await.is_empty());
        assert_eq!(h.refresher.calls.load(Ordering::SeqCst), 0);

        let events = h.notifier.events.lock().unwrap();
        assert!(matches!(&events[0], SwapEvent::Skipped { symbol, .. } if symbol == "MEME"));
    }

    #[tokio::test]
    async fn test_target_token_is_passed_over() {
        let h = harness(
            MockSubmitter::default(),
            MockLedger::default(),
            MockRefresher::default(),
        );
        let requests = vec![SwapRequest::new(apt(), apt(), "3"), request("usdc", "USDC")];

        let summary = h
            .orchestrator
            .run_batch(&requests, &apt(), &no_delay(), "0xaccount")
            .await
            .unwrap();

        assert_eq!(summary.attempted(), 1);
        assert!(summary.skipped.is_empty());
        assert_eq!(h.submitter.submitted(), vec!["usdc"]);
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let h = harness(
            MockSubmitter::default(),
            MockLedger::default(),
            MockRefresher::default(),
        );

        let summary = h
            .orchestrator
            .run_batch(&[], &apt(), &BatchPolicy::default(), "0xaccount")
            .await
            .unwrap();

        assert_eq!(summary.attempted(), 0);
        assert!(h.submitter.submitted().is_empty());
        assert_eq!(h.refresher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_amount_fails_fast() {
        let h = harness(
            MockSubmitter::default(),
            MockLedger::default(),
            MockRefresher::default(),
        );
        let mut requests = three_requests();
        requests[2].amount = "-4".to_string();

        let err = h
            .orchestrator
            .run_batch(&requests, &apt(), &no_delay(), "0xaccount")
            .await
            .unwrap_err();

        assert!(matches!(err, BatchError::InvalidRequest { ref symbol, .. } if symbol == "DAI"));
        assert!(h.submitter.submitted().is_empty());
        assert!(h.tracker.transactions().await.is_empty());
        assert!(h.notifier.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_target_request_amount_is_not_validated() {
        let h = harness(
            MockSubmitter::default(),
            MockLedger::default(),
            MockRefresher::default(),
        );
        let passed_over = SwapRequest::new(apt(), apt(), "not-a-number");

        let summary = h
            .orchestrator
            .run_batch(
                &[passed_over, request("usdc", "USDC")],
                &apt(),
                &no_delay(),
                "0xaccount",
            )
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.attempted(), 1);
        assert_eq!(h.submitter.submitted(), vec!["usdc"]);
    }

    // ==================== Confirmation Outcome Tests ====================

    #[tokio::test]
    async fn test_ledger_reported_failure() {
        let ledger = MockLedger {
            reverted: [hash_for("usdc")].into_iter().collect(),
            ..Default::default()
        };
        let h = harness(MockSubmitter::default(), ledger, MockRefresher::default());

        let summary = h
            .orchestrator
            .run_batch(&[request("usdc", "USDC")], &apt(), &no_delay(), "0xaccount")
            .await
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert!(matches!(summary.outcomes[0], SwapOutcome::Reverted { .. }));

        let record = h
            .tracker
            .store()
            .get(&TxKey::Hash(hash_for("usdc")))
            .await
            .unwrap();
        assert_eq!(record.status, TxStatus::Failed);
        assert_eq!(record.gas_used.as_deref(), Some("15"));

        let events = h.notifier.events.lock().unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            SwapEvent::Failed {
                kind: FailureKind::Reverted,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn test_confirmation_timeout_marks_hash_failed() {
        let ledger = MockLedger {
            unindexed: [hash_for("usdc")].into_iter().collect(),
            ..Default::default()
        };
        let h = harness(MockSubmitter::default(), ledger, MockRefresher::default());

        let summary = h
            .orchestrator
            .run_batch(&[request("usdc", "USDC")], &apt(), &no_delay(), "0xaccount")
            .await
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(h.ledger.calls.load(Ordering::SeqCst), 3);
        match &summary.outcomes[0] {
            SwapOutcome::Errored {
                key,
                error: SwapError::ConfirmationTimeout { hash, .. },
            } => {
                assert_eq!(key, &TxKey::Hash(hash_for("usdc")));
                assert_eq!(hash, &hash_for("usdc"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let records = h.tracker.transactions().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, TxStatus::Failed);
    }

    // ==================== Refresh and Notification Tests ====================

    #[tokio::test]
    async fn test_refresh_failure_does_not_change_summary() {
        let refresher = MockRefresher {
            should_fail: true,
            ..Default::default()
        };
        let h = harness(MockSubmitter::default(), MockLedger::default(), refresher);

        let summary = h
            .orchestrator
            .run_batch(&[request("usdc", "USDC")], &apt(), &no_delay(), "0xaccount")
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(h.refresher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_every_outcome_is_notified() {
        let h = harness(
            MockSubmitter::rejecting(&["weth"]),
            MockLedger::default(),
            MockRefresher::default(),
        );
        let mut requests = three_requests();
        requests[2] = requests[2].clone().with_quote(Decimal::ONE, Decimal::from(50));

        h.orchestrator
            .run_batch(&requests, &apt(), &no_delay(), "0xaccount")
            .await
            .unwrap();

        let events = h.notifier.events.lock().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, SwapEvent::Succeeded { symbol, .. } if symbol == "USDC")));
        assert!(events
            .iter()
            .any(|e| matches!(e, SwapEvent::Failed { symbol, kind: FailureKind::Rejected, .. }
                if symbol == "WETH")));
        assert!(events
            .iter()
            .any(|e| matches!(e, SwapEvent::Skipped { symbol, .. } if symbol == "DAI")));
        assert_eq!(
            events.last(),
            Some(&SwapEvent::BatchCompleted {
                succeeded: 1,
                failed: 1
            })
        );
    }

    // ==================== Pacing Tests ====================

    #[tokio::test]
    async fn test_delay_between_swaps() {
        let h = harness(
            MockSubmitter::default(),
            MockLedger::default(),
            MockRefresher::default(),
        );
        let policy = BatchPolicy::default().with_delay(Duration::from_millis(40));
        let requests = vec![request("usdc", "USDC"), request("weth", "WETH")];

        let started = Instant::now();
        h.orchestrator
            .run_batch(&requests, &apt(), &policy, "0xaccount")
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_no_delay_after_last_swap() {
        let h = harness(
            MockSubmitter::default(),
            MockLedger::default(),
            MockRefresher::default(),
        );
        let policy = BatchPolicy::default().with_delay(Duration::from_secs(5));

        let started = Instant::now();
        h.orchestrator
            .run_batch(&[request("usdc", "USDC")], &apt(), &policy, "0xaccount")
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
