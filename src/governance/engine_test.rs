#[cfg(test)]
mod tests {
    use crate::governance::*;
    use crate::models::*;
    use crate::service::crosschain_registry::CrosschainRegistry;
    use crate::service::dapp_registry::DAppRegistry;
    use crate::service::parameter_store::ParameterStore;
    use crate::service::role_manager::RoleManager;
    use chrono::{DateTime, Duration, Utc};
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    // ========================================================================
    // Test Helpers
    // ========================================================================

    fn account(c: char) -> Address {
        Address::new("G".to_string() + &c.to_string().repeat(55))
    }

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn delay() -> Duration {
        Duration::hours(24)
    }

    struct Fixture {
        engine: GovernanceEngine,
        roles: Arc<RoleManager>,
        dapps: Arc<DAppRegistry>,
        bridge: Arc<CrosschainRegistry>,
        params: Arc<ParameterStore>,
        clock: Arc<ManualClock>,
    }

    /// Signers A, B, C; proposer P
    fn fixture() -> Fixture {
        let roles = Arc::new(RoleManager::new());
        for c in ['A', 'B', 'C'] {
            roles.grant(Role::FoundationManager, account(c)).unwrap();
        }
        roles.grant(Role::Proposer, account('P')).unwrap();

        let dapps = Arc::new(DAppRegistry::new());
        let bridge = Arc::new(CrosschainRegistry::new());
        let params = Arc::new(ParameterStore::new());
        let dispatcher = ActionDispatcher::builder()
            .register(ActionKind::ManagePermission, roles.clone())
            .register(ActionKind::RegisterDApp, dapps.clone())
            .register(ActionKind::SetCrosschainToken, bridge.clone())
            .register(ActionKind::SetParameter, params.clone())
            .build();

        let clock = Arc::new(ManualClock::new(start()));
        let settings = EngineSettings {
            confirmation_delay: delay(),
            ..EngineSettings::default()
        };
        let engine = GovernanceEngine::new(roles.clone(), dispatcher, settings, clock.clone());

        Fixture {
            engine,
            roles,
            dapps,
            bridge,
            params,
            clock,
        }
    }

    fn set_parameter(key: &str, value: i64) -> ActionPayload {
        ActionPayload::SetParameter(SetParameter {
            key: key.to_string(),
            value: Decimal::from(value),
        })
    }

    fn register_dapp(id: &str) -> ActionPayload {
        ActionPayload::RegisterDApp(RegisterDApp {
            dapp_id: id.to_string(),
            payee: "G".to_string() + &"F".repeat(55),
            fee_bps: 300,
        })
    }

    fn crosschain_token(chain_id: u32) -> ActionPayload {
        ActionPayload::SetCrosschainToken(SetCrosschainToken {
            chain_id,
            local_token: "C".to_string() + &"T".repeat(55),
            remote_token: "0xbridgedusd".to_string(),
        })
    }

    struct CountingHandler {
        calls: AtomicUsize,
    }

    impl ActionHandler for CountingHandler {
        fn handle(&self, _action: &ActionPayload) -> Result<(), DispatchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    // ========================================================================
    // Propose
    // ========================================================================

    #[test]
    fn test_propose_requires_proposer_role() {
        let f = fixture();
        let err = f
            .engine
            .propose(set_parameter("loan.max_ltv", 70), &account('A'))
            .unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::Unauthorized {
                role: Role::Proposer,
                ..
            }
        ));
        assert!(f.engine.list_pending().is_empty());
    }

    #[test]
    fn test_propose_rejects_invalid_payload() {
        let f = fixture();
        let invalid = ActionPayload::RegisterDApp(RegisterDApp {
            dapp_id: "desk".to_string(),
            payee: "GSHORT".to_string(),
            fee_bps: 20_000,
        });
        let err = f.engine.propose(invalid, &account('P')).unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidPayload(_)));
        assert_eq!(f.engine.proposal_count(), 0);
    }

    #[test]
    fn test_propose_rejects_kind_without_handler() {
        let roles = Arc::new(RoleManager::new());
        roles.grant(Role::FoundationManager, account('A')).unwrap();
        roles.grant(Role::Proposer, account('P')).unwrap();

        let dispatcher = ActionDispatcher::builder()
            .register(ActionKind::SetParameter, Arc::new(ParameterStore::new()))
            .build();
        let engine = GovernanceEngine::new(
            roles,
            dispatcher,
            EngineSettings::default(),
            Arc::new(ManualClock::new(start())),
        );

        let err = engine.propose(register_dapp("desk"), &account('P')).unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidPayload(ref msg) if msg.contains("REGISTER_DAPP")));
        assert_eq!(engine.proposal_count(), 0);

        // Handled kinds still allocate id 1
        assert_eq!(engine.propose(set_parameter("k", 1), &account('P')).unwrap(), 1);
    }

    #[test]
    fn test_propose_creates_pending_proposal() {
        let f = fixture();
        let id = f.engine.propose(register_dapp("desk"), &account('P')).unwrap();

        let proposal = f.engine.proposal(id).unwrap();
        assert_eq!(proposal.proposer, account('P'));
        assert_eq!(proposal.created_at, start());
        assert_eq!(proposal.status, ProposalStatus::Pending);
        assert_eq!(
            f.engine.details(id).unwrap(),
            ProposalDetails {
                action_kind: ActionKind::RegisterDApp,
                execute_time: None,
            }
        );
        assert!(f.engine.list_pending().contains(id));
    }

    // ========================================================================
    // Sign
    // ========================================================================

    #[test]
    fn test_sign_unknown_proposal() {
        let f = fixture();
        assert!(matches!(
            f.engine.sign(99, &account('A')),
            Err(GovernanceError::NotFound(99))
        ));
    }

    #[test]
    fn test_idempotent_signing() {
        let f = fixture();
        let id = f.engine.propose(set_parameter("k", 1), &account('P')).unwrap();

        assert_eq!(f.engine.sign(id, &account('A')).unwrap(), 1);
        for _ in 0..3 {
            assert!(matches!(
                f.engine.sign(id, &account('A')),
                Err(GovernanceError::AlreadySigned { .. })
            ));
        }
        assert_eq!(f.engine.signature_count(id).unwrap(), 1);
        assert!(f.engine.has_already_signed(id, &account('A')).unwrap());
        assert!(!f.engine.has_already_signed(id, &account('B')).unwrap());
    }

    #[test]
    fn test_sign_requires_live_signer_role() {
        let f = fixture();
        let id = f.engine.propose(set_parameter("k", 1), &account('P')).unwrap();

        assert!(matches!(
            f.engine.sign(id, &account('D')),
            Err(GovernanceError::Unauthorized { .. })
        ));
        assert_eq!(f.engine.signature_count(id).unwrap(), 0);

        // Granted after the proposal was created
        f.roles.grant(Role::FoundationManager, account('D')).unwrap();
        assert_eq!(f.engine.sign(id, &account('D')).unwrap(), 1);
    }

    #[test]
    fn test_signature_count_is_monotonic() {
        let f = fixture();
        let id = f.engine.propose(set_parameter("k", 1), &account('P')).unwrap();

        let mut last = 0;
        for signer in ['A', 'A', 'Z', 'B', 'B', 'C'] {
            let _ = f.engine.sign(id, &account(signer));
            let count = f.engine.signature_count(id).unwrap();
            assert!(count >= last);
            last = count;
        }
        assert_eq!(last, 3);
        assert_eq!(
            f.engine.signers(id).unwrap(),
            vec![account('A'), account('B'), account('C')]
        );
    }

    // ========================================================================
    // Scenarios
    // ========================================================================

    #[test]
    fn test_scenario_a_threshold_then_timelock_then_execute() {
        let f = fixture();
        assert_eq!(f.engine.threshold(), 2);

        let id = f
            .engine
            .propose(set_parameter("stablecoin.mint_cap", 1_000_000), &account('P'))
            .unwrap();
        assert_eq!(id, 1);

        assert_eq!(f.engine.sign(id, &account('A')).unwrap(), 1);
        assert_eq!(f.engine.details(id).unwrap().execute_time, None);

        assert_eq!(f.engine.sign(id, &account('B')).unwrap(), 2);
        let armed = f.engine.details(id).unwrap().execute_time;
        assert_eq!(armed, Some(start() + delay()));

        assert!(matches!(
            f.engine.execute(id, start()),
            Err(GovernanceError::TimelockNotElapsed {
                execute_time: Some(_)
            })
        ));
        assert!(matches!(
            f.engine.execute(id, start() + delay() - Duration::seconds(1)),
            Err(GovernanceError::TimelockNotElapsed { .. })
        ));

        f.engine.execute(id, start() + delay()).unwrap();
        assert!(!f.engine.list_pending().contains(id));
        assert_eq!(f.params.get("stablecoin.mint_cap"), Some(Decimal::from(1_000_000)));

        let executed = f.engine.proposal(id).unwrap();
        assert_eq!(executed.status, ProposalStatus::Executed);
        assert_eq!(executed.executed_at, Some(start() + delay()));
    }

    #[test]
    fn test_scenario_b_sign_after_execution_fails() {
        let f = fixture();
        let id = f.engine.propose(set_parameter("k", 5), &account('P')).unwrap();
        f.engine.sign(id, &account('A')).unwrap();
        f.engine.sign(id, &account('B')).unwrap();
        f.engine.execute(id, start() + delay()).unwrap();

        assert!(matches!(
            f.engine.sign(id, &account('C')),
            Err(GovernanceError::NotFound(_))
        ));
        assert_eq!(f.engine.signature_count(id).unwrap(), 2);
        assert!(!f.engine.has_already_signed(id, &account('C')).unwrap());
    }

    #[test]
    fn test_scenario_c_grown_signer_set_blocks_armed_proposal() {
        let f = fixture();
        let id = f.engine.propose(set_parameter("k", 5), &account('P')).unwrap();
        f.engine.sign(id, &account('A')).unwrap();
        f.engine.sign(id, &account('B')).unwrap();
        let armed = f.engine.details(id).unwrap().execute_time;
        assert!(armed.is_some());

        f.roles.grant(Role::FoundationManager, account('D')).unwrap();
        f.roles.grant(Role::FoundationManager, account('E')).unwrap();
        assert_eq!(f.engine.threshold(), 3);

        assert!(matches!(
            f.engine.execute(id, start() + delay()),
            Err(GovernanceError::InsufficientSignatures { have: 2, need: 3 })
        ));
        assert!(f.engine.list_pending().contains(id));

        // A third signature satisfies the live threshold; the original
        // execute time is kept
        f.clock.advance(Duration::hours(2));
        f.engine.sign(id, &account('C')).unwrap();
        assert_eq!(f.engine.details(id).unwrap().execute_time, armed);
        f.engine.execute(id, start() + delay()).unwrap();
    }

    #[test]
    fn test_shrunk_signer_set_lowers_threshold_but_timelock_still_required() {
        let f = fixture();
        let id = f.engine.propose(set_parameter("k", 5), &account('P')).unwrap();
        f.engine.sign(id, &account('A')).unwrap();

        // Threshold drops to 1 but nothing armed the timelock
        f.roles.revoke(Role::FoundationManager, &account('B')).unwrap();
        f.roles.revoke(Role::FoundationManager, &account('C')).unwrap();
        assert_eq!(f.engine.threshold(), 1);
        assert!(matches!(
            f.engine.execute(id, start() + Duration::days(30)),
            Err(GovernanceError::TimelockNotElapsed { execute_time: None })
        ));
    }

    #[test]
    fn test_revoked_signer_signature_keeps_counting() {
        let f = fixture();
        f.roles.grant(Role::FoundationManager, account('D')).unwrap();
        let id = f.engine.propose(set_parameter("k", 5), &account('P')).unwrap();

        // n = 4, threshold 3
        for c in ['A', 'B', 'C'] {
            f.engine.sign(id, &account(c)).unwrap();
        }
        f.roles.revoke(Role::FoundationManager, &account('A')).unwrap();

        // n = 3, threshold 2; A's signature still counts
        assert_eq!(f.engine.signature_count(id).unwrap(), 3);
        f.engine.execute(id, start() + delay()).unwrap();
    }

    #[test]
    fn test_sign_with_overflowing_delay_records_nothing() {
        let roles = Arc::new(RoleManager::new());
        roles.grant(Role::FoundationManager, account('A')).unwrap();
        roles.grant(Role::Proposer, account('P')).unwrap();

        let params = Arc::new(ParameterStore::new());
        let dispatcher = ActionDispatcher::builder()
            .register(ActionKind::SetParameter, params)
            .build();
        let engine = GovernanceEngine::new(
            roles,
            dispatcher,
            EngineSettings {
                confirmation_delay: Duration::seconds(10_000_000_000_000),
                ..EngineSettings::default()
            },
            Arc::new(ManualClock::new(start())),
        );
        let mut events = engine.subscribe();

        let id = engine.propose(set_parameter("k", 1), &account('P')).unwrap();
        let err = engine.sign(id, &account('A')).unwrap_err();
        assert!(matches!(err, GovernanceError::ExecuteTimeOutOfRange { .. }));
        assert!(!err.is_retryable());

        assert_eq!(engine.signature_count(id).unwrap(), 0);
        assert!(!engine.has_already_signed(id, &account('A')).unwrap());
        assert_eq!(engine.details(id).unwrap().execute_time, None);

        // A retry hits the same error, not AlreadySigned
        assert!(matches!(
            engine.sign(id, &account('A')),
            Err(GovernanceError::ExecuteTimeOutOfRange { .. })
        ));

        let published: Vec<_> = std::iter::from_fn(|| events.try_recv().ok()).collect();
        assert!(published
            .iter()
            .all(|e| !matches!(e, GovernanceEvent::ProposalSigned { .. })));
    }

    // ========================================================================
    // Execute
    // ========================================================================

    #[test]
    fn test_execute_unknown_proposal() {
        let f = fixture();
        assert!(matches!(
            f.engine.execute(7, start()),
            Err(GovernanceError::NotFound(7))
        ));
    }

    #[test]
    fn test_execute_without_signatures() {
        let f = fixture();
        let id = f.engine.propose(set_parameter("k", 5), &account('P')).unwrap();
        assert!(matches!(
            f.engine.execute(id, start() + delay()),
            Err(GovernanceError::InsufficientSignatures { have: 0, need: 2 })
        ));
    }

    #[test]
    fn test_exactly_once_execution() {
        let f = fixture();
        let id = f.engine.propose(register_dapp("lending-desk"), &account('P')).unwrap();
        f.engine.sign(id, &account('A')).unwrap();
        f.engine.sign(id, &account('C')).unwrap();

        f.engine.execute(id, start() + delay()).unwrap();
        for offset in [0, 1, 48] {
            assert!(matches!(
                f.engine.execute(id, start() + delay() + Duration::hours(offset)),
                Err(GovernanceError::NotFound(_))
            ));
        }
        assert_eq!(f.dapps.len(), 1);
        assert!(f.dapps.get("lending-desk").is_some());
    }

    #[test]
    fn test_dispatch_failure_leaves_proposal_pending_for_retry() {
        let f = fixture();
        let id = f.engine.propose(crosschain_token(56), &account('P')).unwrap();
        f.engine.sign(id, &account('A')).unwrap();
        f.engine.sign(id, &account('B')).unwrap();

        let err = f.engine.execute(id, start() + delay()).unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(err, GovernanceError::ActionDispatchFailed(DispatchError::Crosschain(_))));
        assert!(f.engine.list_pending().contains(id));
        assert_eq!(f.engine.proposal(id).unwrap().status, ProposalStatus::Pending);

        // Resolve the underlying condition and retry
        f.bridge.enable_chain(56);
        f.engine
            .execute(id, start() + delay() + Duration::minutes(5))
            .unwrap();
        assert!(!f.engine.list_pending().contains(id));
        assert_eq!(
            f.bridge.mapping(56, &("C".to_string() + &"T".repeat(55))),
            Some("0xbridgedusd".to_string())
        );
    }

    #[test]
    fn test_governed_role_grant_changes_signer_set() {
        let f = fixture();
        let grant = ActionPayload::ManagePermission(ManagePermission {
            role: Role::FoundationManager,
            account: account('D').to_string(),
            operation: PermissionOperation::Grant,
        });
        let id = f.engine.propose(grant, &account('P')).unwrap();
        f.engine.sign(id, &account('A')).unwrap();
        f.engine.sign(id, &account('B')).unwrap();
        f.engine.execute(id, start() + delay()).unwrap();

        assert_eq!(f.engine.signer_set().len(), 4);
        assert_eq!(f.engine.threshold(), 3);
        assert!(f.roles.has_role(Role::FoundationManager, &account('D')));
    }

    #[test]
    fn test_pending_index_never_lists_executed() {
        let f = fixture();
        let ids: Vec<_> = (0..5)
            .map(|i| {
                f.engine
                    .propose(set_parameter(&format!("param.{}", i), i), &account('P'))
                    .unwrap()
            })
            .collect();
        for id in ids.iter().step_by(2) {
            f.engine.sign(*id, &account('A')).unwrap();
            f.engine.sign(*id, &account('B')).unwrap();
            f.engine.execute(*id, start() + delay()).unwrap();
        }

        let pending = f.engine.list_pending();
        assert_eq!(pending.clone().into_vec(), vec![2, 4]);
        for id in pending.iter() {
            assert_eq!(f.engine.proposal(id).unwrap().status, ProposalStatus::Pending);
        }
    }

    #[test]
    fn test_concurrent_execute_dispatches_once() {
        let roles = Arc::new(RoleManager::new());
        for c in ['A', 'B', 'C'] {
            roles.grant(Role::FoundationManager, account(c)).unwrap();
        }
        roles.grant(Role::Proposer, account('P')).unwrap();

        let counter = Arc::new(CountingHandler {
            calls: AtomicUsize::new(0),
        });
        let dispatcher = ActionDispatcher::builder()
            .register(ActionKind::SetParameter, counter.clone())
            .build();
        let engine = GovernanceEngine::new(
            roles,
            dispatcher,
            EngineSettings {
                confirmation_delay: delay(),
                ..EngineSettings::default()
            },
            Arc::new(ManualClock::new(start())),
        );

        let id = engine.propose(set_parameter("k", 1), &account('P')).unwrap();
        engine.sign(id, &account('A')).unwrap();
        engine.sign(id, &account('B')).unwrap();

        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|_| s.spawn(|| engine.execute(id, start() + delay())))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, GovernanceError::NotFound(_))));
        assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_signing_counts_each_signer_once() {
        let f = fixture();
        for c in ['D', 'E', 'F', 'H'] {
            f.roles.grant(Role::FoundationManager, account(c)).unwrap();
        }
        let id = f.engine.propose(set_parameter("k", 1), &account('P')).unwrap();

        let signers = ['A', 'B', 'C', 'D', 'E', 'F', 'H'];
        std::thread::scope(|s| {
            for c in signers {
                for _ in 0..3 {
                    let engine = &f.engine;
                    s.spawn(move || {
                        let _ = engine.sign(id, &account(c));
                    });
                }
            }
        });

        assert_eq!(f.engine.signature_count(id).unwrap(), signers.len());
        assert_eq!(f.engine.details(id).unwrap().execute_time, Some(start() + delay()));
    }

    // ========================================================================
    // Events
    // ========================================================================

    #[test]
    fn test_lifecycle_events() {
        let f = fixture();
        let mut rx = f.engine.subscribe();

        let id = f.engine.propose(set_parameter("k", 1), &account('P')).unwrap();
        f.engine.sign(id, &account('A')).unwrap();
        f.engine.sign(id, &account('B')).unwrap();
        f.engine.execute(id, start() + delay()).unwrap();

        let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert!(matches!(events[0], GovernanceEvent::ProposalCreated { proposal_id: 1, .. }));
        assert!(matches!(
            events[1],
            GovernanceEvent::ProposalSigned {
                signature_count: 1,
                threshold: 2,
                ..
            }
        ));
        assert!(matches!(events[2], GovernanceEvent::ProposalSigned { signature_count: 2, .. }));
        assert!(matches!(events[3], GovernanceEvent::TimelockArmed { .. }));
        assert!(matches!(
            events[4],
            GovernanceEvent::ProposalExecuted {
                kind: ActionKind::SetParameter,
                ..
            }
        ));
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn test_dispatch_failure_event() {
        let f = fixture();
        let mut rx = f.engine.subscribe();
        let id = f.engine.propose(crosschain_token(10), &account('P')).unwrap();
        f.engine.sign(id, &account('A')).unwrap();
        f.engine.sign(id, &account('B')).unwrap();
        let _ = f.engine.execute(id, start() + delay());

        let last = std::iter::from_fn(|| rx.try_recv().ok()).last().unwrap();
        assert!(matches!(last, GovernanceEvent::ExecutionFailed { proposal_id, .. } if proposal_id == id));
    }
}
