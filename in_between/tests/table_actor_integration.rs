/// Integration tests for the table actor
///
/// These drive a running actor through fake authority, signer and event
/// transport, and observe it only through its published view and notices.
mod common;

use std::{
    sync::{Arc, Mutex, atomic::Ordering},
    time::Duration,
};

use common::{
    Call, Harness, LIMIT, MockAuthority, MockSubscriber, event_channel, now_ms, sync, sync_expiring,
    test_config, wager,
};
use in_between::{
    game::BetKind,
    net::errors::ClientError,
    seat::Orchestrator,
    table::{Notice, SystemClock, TableCommand, open_table},
};
use tokio::sync::Notify;

#[tokio::test]
async fn test_snapshots_apply_in_order() {
    let harness = Harness::start(MockAuthority::spectator()).await;
    harness.push(sync(&[("a", 1, false)], None));
    harness.push(sync(&[("a", 1, false), ("b", 2, false)], None));
    harness.push(sync(&[("b", 7, false), ("c", 3, false)], Some("c")));

    let view = harness
        .wait_for(|view| view.seat_ids() == vec!["b", "c"])
        .await;
    assert_eq!(view.seat("b").unwrap().chips, 7);
    assert!(view.seat("c").unwrap().countdown.is_some());
    assert!(view.joinable);
    assert_eq!(view.deck.len(), 40);
}

#[tokio::test]
async fn test_bad_events_are_skipped() {
    let harness = Harness::start(MockAuthority::spectator()).await;
    harness.push(b"not json".to_vec());
    harness.push(br#"{"code": 42, "what": "future"}"#.to_vec());
    harness.push(br#"{"code": 0, "message": "oops"}"#.to_vec());
    harness.push(sync(&[("a", 1, false)], None));

    let view = harness.wait_for(|view| !view.seats.is_empty()).await;
    assert_eq!(view.seat_ids(), vec!["a"]);
    assert!(!harness.task.is_finished());
}

#[tokio::test]
async fn test_local_turn_offers_actions() {
    let harness = Harness::start(MockAuthority::seated(5 * LIMIT)).await;
    harness.push(sync(&[("me", 5 * LIMIT, true), ("a", LIMIT, false)], Some("me")));

    let view = harness.wait_for(|view| view.actions.is_some()).await;
    assert_eq!(view.hands, Some([2, 11]));
    let actions = view.actions.unwrap();
    assert!(actions.contains(BetKind::Limit(3)));
    assert!(actions.contains(BetKind::Fold));
    assert!(view.countdown.is_some());
    assert!(harness.authority.calls().contains(&Call::Hands("key-1".to_string())));
}

#[tokio::test]
async fn test_wager_over_balance_never_reaches_authority() {
    let mut harness = Harness::start(MockAuthority::seated(100)).await;
    harness.push(sync(&[("me", 100, true)], Some("me")));
    harness.wait_for(|view| view.balance == Some(100)).await;

    harness.handle.send(TableCommand::Bet { amount: 101 }).await.unwrap();
    assert_eq!(
        harness.next_notice().await,
        Notice::Rejected("Chips not enough".to_string())
    );
    assert!(
        !harness
            .authority
            .calls()
            .iter()
            .any(|call| matches!(call, Call::Bet { .. }))
    );
}

#[tokio::test]
async fn test_invalid_custom_amount_is_rejected() {
    let mut harness = Harness::start(MockAuthority::seated(5 * LIMIT)).await;
    harness
        .handle
        .send(TableCommand::Custom {
            input: "abc".to_string(),
        })
        .await
        .unwrap();
    assert!(matches!(harness.next_notice().await, Notice::Rejected(_)));
}

#[tokio::test]
async fn test_failed_bet_restores_actions() {
    let mut harness = Harness::start(MockAuthority::seated(5 * LIMIT)).await;
    harness.authority.fail_bet.store(true, Ordering::SeqCst);
    harness.push(sync(&[("me", 5 * LIMIT, true)], Some("me")));
    let offered = harness.wait_for(|view| view.actions.is_some()).await.actions;

    harness.handle.send(TableCommand::Act(BetKind::Limit(1))).await.unwrap();
    assert_eq!(harness.next_notice().await, Notice::Failed("Bet refused".to_string()));

    let view = harness.wait_for(|view| view.actions.is_some()).await;
    assert_eq!(view.actions, offered);
    assert!(harness.authority.calls().contains(&Call::Bet {
        seat_key: "key-1".to_string(),
        amount: LIMIT,
    }));
}

#[tokio::test]
async fn test_declined_signature_restores_actions() {
    let authority = MockAuthority::seated(5 * LIMIT);
    *authority.bet_tx.lock().unwrap() = Some("bet-tx".to_string());
    let mut harness = Harness::start(authority).await;
    harness.signer.reject.store(true, Ordering::SeqCst);
    harness.push(sync(&[("me", 5 * LIMIT, true)], Some("me")));
    harness.wait_for(|view| view.actions.is_some()).await;

    harness.handle.send(TableCommand::Act(BetKind::Limit(2))).await.unwrap();
    assert_eq!(harness.next_notice().await, Notice::Cancelled);
    harness.wait_for(|view| view.actions.is_some()).await;
    assert!(
        !harness
            .authority
            .calls()
            .iter()
            .any(|call| matches!(call, Call::Relay(_)))
    );
}

#[tokio::test]
async fn test_off_chain_bet_keeps_actions_hidden() {
    let mut harness = Harness::start(MockAuthority::seated(5 * LIMIT)).await;
    harness.push(sync(&[("me", 5 * LIMIT, true)], Some("me")));
    harness.wait_for(|view| view.actions.is_some()).await;

    harness.handle.send(TableCommand::Act(BetKind::Fold)).await.unwrap();
    assert_eq!(harness.next_notice().await, Notice::BetPlaced { amount: 0 });
    assert_eq!(harness.handle.view().actions, None);

    harness.push(wager("me", 0, [2, 11]));
    harness.push(sync(&[("me", 5 * LIMIT, true)], Some("me")));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(harness.handle.view().actions, None);
}

#[tokio::test]
async fn test_expired_turn_withdraws_actions() {
    let mut harness = Harness::start(MockAuthority::seated(5 * LIMIT)).await;
    harness.push(sync_expiring(&[("me", 5 * LIMIT, true)], Some("me"), now_ms() + 1_500));
    harness.wait_for(|view| view.actions.is_some()).await;

    let view = harness.wait_for(|view| view.actions.is_none()).await;
    assert_eq!(view.countdown, None);

    harness.handle.send(TableCommand::Act(BetKind::Limit(1))).await.unwrap();
    assert!(matches!(harness.next_notice().await, Notice::Rejected(_)));
    harness.handle.send(TableCommand::Bet { amount: LIMIT }).await.unwrap();
    assert_eq!(
        harness.next_notice().await,
        Notice::Rejected("Your turn has ended".to_string())
    );
    assert!(
        !harness
            .authority
            .calls()
            .iter()
            .any(|call| matches!(call, Call::Bet { .. }))
    );
}

#[tokio::test]
async fn test_next_turn_after_expiry_offers_actions() {
    let harness = Harness::start(MockAuthority::seated(5 * LIMIT)).await;
    harness.push(sync_expiring(
        &[("me", 5 * LIMIT, true), ("a", LIMIT, false)],
        Some("me"),
        now_ms() + 500,
    ));
    harness.wait_for(|view| view.actions.is_some()).await;
    harness.wait_for(|view| view.actions.is_none()).await;

    harness.push(sync(&[("me", 5 * LIMIT, true), ("a", LIMIT, false)], Some("a")));
    harness.push(sync(&[("me", 5 * LIMIT, true), ("a", LIMIT, false)], Some("me")));
    let view = harness.wait_for(|view| view.actions.is_some()).await;
    assert!(view.countdown.is_some());
}

#[tokio::test]
async fn test_unavailable_action_is_refused() {
    let mut harness = Harness::start(MockAuthority::seated(5 * LIMIT)).await;
    harness.handle.send(TableCommand::Act(BetKind::AllIn)).await.unwrap();
    assert!(matches!(harness.next_notice().await, Notice::Rejected(_)));
}

#[tokio::test]
async fn test_stake_claims_seat() {
    let mut harness = Harness::start(MockAuthority::spectator()).await;
    assert!(harness.handle.view().joinable);

    harness
        .handle
        .send(TableCommand::Stake { amount: 2 * LIMIT })
        .await
        .unwrap();
    assert_eq!(
        harness.next_notice().await,
        Notice::StakeRequested { amount: 2 * LIMIT }
    );
    assert_eq!(
        harness.next_notice().await,
        Notice::Sent {
            signature: "sig:signed:stake-tx".to_string()
        }
    );
    assert!(!harness.handle.view().joinable);

    harness.push(sync(&[("a", LIMIT, false), ("me-new", 2 * LIMIT, false)], None));
    let view = harness.wait_for(|view| view.seat("me-new").is_some()).await;
    assert!(view.seat("me-new").unwrap().is_local);
    assert_eq!(view.seat_ids(), vec!["me-new", "a"]);
    assert_eq!(view.balance, Some(2 * LIMIT));

    assert_eq!(
        harness.authority.requests()[1..],
        [
            Call::Stake {
                amount: 2 * LIMIT,
                seat_key: None
            },
            Call::Relay("signed:stake-tx".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_join_stays_offered_until_stake_is_accepted() {
    let gate = Arc::new(Notify::new());
    let mut authority = MockAuthority::spectator();
    authority.stake_gate = Some(gate.clone());
    let mut harness = Harness::start(authority).await;

    harness.handle.send(TableCommand::Stake { amount: LIMIT }).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(harness.handle.view().joinable);

    gate.notify_one();
    assert_eq!(harness.next_notice().await, Notice::StakeRequested { amount: LIMIT });
    harness.wait_for(|view| !view.joinable).await;
}

#[tokio::test]
async fn test_failed_stake_keeps_join_offered() {
    let authority = MockAuthority::spectator();
    authority.fail_stake.store(true, Ordering::SeqCst);
    let mut harness = Harness::start(authority).await;

    harness.handle.send(TableCommand::Stake { amount: LIMIT }).await.unwrap();
    assert_eq!(harness.next_notice().await, Notice::Failed("Stake refused".to_string()));
    assert!(harness.handle.view().joinable);
}

#[tokio::test]
async fn test_top_up_sends_held_credential() {
    let mut harness = Harness::start(MockAuthority::seated(LIMIT)).await;
    harness.handle.send(TableCommand::Stake { amount: LIMIT }).await.unwrap();
    harness.next_notice().await;

    assert!(harness.authority.calls().contains(&Call::Stake {
        amount: LIMIT,
        seat_key: Some("key-1".to_string()),
    }));
}

#[tokio::test]
async fn test_redeem_tears_down_local_seat() {
    let mut harness = Harness::start(MockAuthority::seated(5 * LIMIT)).await;
    harness.push(sync(&[("me", 5 * LIMIT, true), ("a", LIMIT, false)], Some("me")));
    harness.wait_for(|view| view.actions.is_some()).await;

    harness.handle.send(TableCommand::Redeem).await.unwrap();
    assert_eq!(harness.next_notice().await, Notice::Redeemed);

    let view = harness.wait_for(|view| view.joinable).await;
    assert!(view.seat("me").is_none());
    assert_eq!(view.actions, None);
    assert_eq!(view.countdown, None);
    assert_eq!(view.balance, None);
    assert!(harness.authority.calls().contains(&Call::Redeem("key-1".to_string())));
}

#[tokio::test]
async fn test_redeem_without_seat_is_refused() {
    let mut harness = Harness::start(MockAuthority::spectator()).await;
    harness.handle.send(TableCommand::Redeem).await.unwrap();
    assert!(matches!(harness.next_notice().await, Notice::Rejected(_)));
}

#[tokio::test]
async fn test_hands_arriving_after_seat_left_are_dropped() {
    let gate = Arc::new(Notify::new());
    let mut authority = MockAuthority::seated(5 * LIMIT);
    authority.hands_gate = Some(gate.clone());
    let harness = Harness::start(authority).await;

    harness.push(sync(&[("a", LIMIT, false)], None));
    harness.wait_for(|view| view.seat("me").is_none()).await;

    gate.notify_one();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let view = harness.handle.view();
    assert_eq!(view.hands, None);
    assert!(view.joinable);
}

#[tokio::test]
async fn test_stream_end_stops_actor() {
    let harness = Harness::start(MockAuthority::spectator()).await;
    drop(harness.events);
    let result = tokio::time::timeout(Duration::from_secs(5), harness.task)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(result, Err(ClientError::Subscription(_))));
}

#[tokio::test]
async fn test_dropping_handle_closes_actor() {
    let Harness { handle, task, events, .. } = Harness::start(MockAuthority::spectator()).await;
    drop(handle);
    let result = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
    drop(events);
}

#[tokio::test]
async fn test_session_is_kept_alive_while_open() {
    let Harness {
        handle,
        task,
        events,
        authority,
        ..
    } = Harness::start(MockAuthority::spectator()).await;
    tokio::time::sleep(Duration::from_millis(180)).await;
    assert!(authority.pings() >= 2);

    drop(handle);
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    let after_close = authority.pings();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(authority.pings(), after_close);
    drop(events);
}

#[tokio::test]
async fn test_open_table_subscribes_to_board_topic() {
    let authority = Arc::new(MockAuthority::spectator());
    let orchestrator = Arc::new(Orchestrator::new(
        "board-9",
        "wallet",
        authority.clone(),
        Arc::new(common::MockSigner::default()),
    ));
    let (events, stream) = event_channel();
    let subscriber = MockSubscriber {
        stream: Mutex::new(Some(stream)),
        topics: Mutex::new(Vec::new()),
    };

    let table = open_table(orchestrator, &subscriber, Arc::new(SystemClock), test_config())
        .await
        .unwrap();
    assert_eq!(
        subscriber.topics.lock().unwrap().as_slice(),
        [("state_board-9".to_string(), "session-1".to_string())]
    );
    assert_eq!(table.handle.view().board_id, "board-9");
    assert_eq!(authority.calls(), vec![Call::Enter]);
    drop(events);
}
