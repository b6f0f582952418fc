//! Tests for routing listener signals into the reconciler

use cloudprint_accounts_core::error::ReconcileError;
use cloudprint_accounts_core::signals::{self, ACCOUNTS_UPDATED, CHECK_FOR_ACCOUNT_UPDATE};
use cloudprint_accounts_core::{AccountSignal, ActiveUser, Error};
use cloudprint_test_utils::{ChannelMethod, ReconcilerBuilder, account1, account2};

#[tokio::test]
async fn test_dispatch_accounts_updated() {
    let (mut reconciler, channel) = ReconcilerBuilder::new()
        .initialized(&[], true)
        .build()
        .await
        .unwrap();
    let channel = channel.unwrap();

    let signal = AccountSignal::from_event(ACCOUNTS_UPDATED, &["foo@chromium.org"]).unwrap();
    signals::dispatch(&mut reconciler, signal).await.unwrap();

    assert_eq!(reconciler.active_user(), &ActiveUser::Account(account1()));
    assert_eq!(channel.call_count(ChannelMethod::Search), 1);
}

#[tokio::test]
async fn test_dispatch_check_for_account_update() {
    let (mut reconciler, channel) = ReconcilerBuilder::new()
        .initialized(&[], false)
        .build()
        .await
        .unwrap();
    let channel = channel.unwrap();
    channel.set_printer(account2());

    let signal = AccountSignal::from_event(CHECK_FOR_ACCOUNT_UPDATE, &[]).unwrap();
    signals::dispatch(&mut reconciler, signal).await.unwrap();

    assert_eq!(reconciler.active_user(), &ActiveUser::Account(account2()));
    assert_eq!(channel.call_count(ChannelMethod::QueryPrinter), 2);
}

#[tokio::test]
async fn test_run_applies_queued_signals_in_order() {
    let (mut reconciler, channel) = ReconcilerBuilder::new()
        .initialized(&[], true)
        .build()
        .await
        .unwrap();
    let channel = channel.unwrap();
    let (sender, dispatcher) = signals::channel(8).unwrap();

    let producer = tokio::spawn(async move {
        sender
            .send(AccountSignal::AccountsUpdated(vec![account1()]))
            .await
            .unwrap();
        sender
            .send(AccountSignal::AccountsUpdated(vec![account1(), account2()]))
            .await
            .unwrap();
        sender
            .send(AccountSignal::AccountsUpdated(vec![account2()]))
            .await
            .unwrap();
    });

    let applied = dispatcher.run(&mut reconciler).await.unwrap();
    producer.await.unwrap();

    assert_eq!(applied, 3);
    assert_eq!(reconciler.active_user(), &ActiveUser::Account(account2()));
    assert_eq!(reconciler.users().len(), 1);
    assert_eq!(
        channel.search_calls(),
        vec![Some(account1()), Some(account1()), Some(account2())]
    );
}

#[tokio::test]
async fn test_run_stops_at_first_rejected_signal() {
    let (mut reconciler, channel) = ReconcilerBuilder::new()
        .initialized(&[], true)
        .build()
        .await
        .unwrap();
    let channel = channel.unwrap();
    let (sender, dispatcher) = signals::channel(4).unwrap();

    sender
        .send(AccountSignal::AccountsUpdated(vec![account1()]))
        .await
        .unwrap();
    sender
        .send(AccountSignal::CheckForAccountUpdate)
        .await
        .unwrap();
    sender
        .send(AccountSignal::AccountsUpdated(vec![account2()]))
        .await
        .unwrap();
    drop(sender);

    let err = dispatcher.run(&mut reconciler).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Reconcile(ReconcileError::UnexpectedSignal { .. })
    ));
    assert_eq!(reconciler.active_user(), &ActiveUser::Account(account1()));
    assert_eq!(channel.call_count(ChannelMethod::Search), 1);
    assert_eq!(channel.call_count(ChannelMethod::QueryPrinter), 0);
}

#[tokio::test]
async fn test_send_after_dispatcher_dropped_fails() {
    let (sender, dispatcher) = signals::channel(1).unwrap();
    drop(dispatcher);

    let result = sender.send(AccountSignal::CheckForAccountUpdate).await;

    assert!(matches!(result, Err(Error::Channel(_))));
}
