use std::collections::HashMap;
use std::sync::Arc;

use account_service::{AccountRepository, InMemoryAccountRepository};
use common::decimal::{dec, Amount};
use common::error::Error;
use common::model::account::{Account, AccountKind, AccountStatus, NewAccount};
use common::model::transaction::{TransactionKind, TransactionRequest};
use transaction_service::{
    InMemoryTransactionRepository, StrategyRegistry, TransactionService,
};

struct Fixture {
    accounts: Arc<InMemoryAccountRepository>,
    service: TransactionService,
}

fn fixture() -> Fixture {
    let accounts = Arc::new(InMemoryAccountRepository::new());
    let service = TransactionService::new(
        Arc::new(InMemoryTransactionRepository::new()),
        accounts.clone(),
        Arc::new(StrategyRegistry::new()),
    );
    Fixture { accounts, service }
}

async fn open_account(repo: &InMemoryAccountRepository, balance: Amount) -> Account {
    let mut account = repo
        .create_account(
            1,
            NewAccount {
                kind: AccountKind::Savings,
                status: None,
                balance,
                gmf_exempt: false,
            },
            AccountStatus::Active,
        )
        .await
        .unwrap();
    account.account_number = Some(Account::derive_account_number(account.kind, account.id));
    repo.update_account(account).await.unwrap()
}

fn deposit(amount: Amount, destination: i64) -> TransactionRequest {
    TransactionRequest {
        kind: Some(TransactionKind::Deposit),
        amount,
        source_account_id: None,
        destination_account_id: Some(destination),
    }
}

fn withdrawal(amount: Amount, source: i64) -> TransactionRequest {
    TransactionRequest {
        kind: Some(TransactionKind::Withdrawal),
        amount,
        source_account_id: Some(source),
        destination_account_id: None,
    }
}

fn transfer(amount: Amount, source: i64, destination: i64) -> TransactionRequest {
    TransactionRequest {
        kind: Some(TransactionKind::Transfer),
        amount,
        source_account_id: Some(source),
        destination_account_id: Some(destination),
    }
}

#[tokio::test]
async fn missing_kind_is_rejected() {
    let fx = fixture();
    let account = open_account(&fx.accounts, dec!(100)).await;

    let result = fx
        .service
        .create_transaction(TransactionRequest {
            kind: None,
            amount: dec!(10),
            source_account_id: None,
            destination_account_id: Some(account.id),
        })
        .await;

    assert!(matches!(result, Err(Error::InvalidTransaction(_))));
    assert!(fx.service.all_transactions().await.unwrap().is_empty());
}

#[tokio::test]
async fn unregistered_kind_persists_nothing() {
    let accounts = Arc::new(InMemoryAccountRepository::new());
    let account = open_account(&accounts, dec!(100)).await;

    // A registry with no handlers exercises the unsupported-kind path
    let service = TransactionService::new(
        Arc::new(InMemoryTransactionRepository::new()),
        accounts.clone(),
        Arc::new(StrategyRegistry::with_strategies(HashMap::new())),
    );

    let result = service.create_transaction(deposit(dec!(10), account.id)).await;
    assert!(matches!(result, Err(Error::UnsupportedTransactionKind(_))));

    assert!(service.all_transactions().await.unwrap().is_empty());
    assert_eq!(
        accounts.get_account(account.id).await.unwrap().unwrap().balance,
        dec!(100)
    );
}

#[tokio::test]
async fn successful_deposit_returns_finalized_record() {
    let fx = fixture();
    let account = open_account(&fx.accounts, dec!(1000)).await;

    let record = fx
        .service
        .create_transaction(deposit(dec!(500), account.id))
        .await
        .unwrap();

    assert!(record.id > 0);
    assert_eq!(record.kind, TransactionKind::Deposit);
    assert_eq!(record.amount, dec!(500));
    assert_eq!(record.destination_account_id, Some(account.id));

    // Resolved snapshot attached
    let snapshot = record.destination_account.unwrap();
    assert_eq!(snapshot.id, account.id);
    assert_eq!(snapshot.balance, dec!(1500));

    // Queryable afterwards
    let fetched = fx.service.get_transaction(record.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, record.id);
    assert_eq!(fetched.amount, dec!(500));
}

#[tokio::test]
async fn handler_failure_persists_no_record() {
    let fx = fixture();
    let account = open_account(&fx.accounts, dec!(100)).await;

    let result = fx
        .service
        .create_transaction(withdrawal(dec!(-500), account.id))
        .await;
    assert!(matches!(result, Err(Error::InsufficientBalance(_))));

    assert!(fx.service.all_transactions().await.unwrap().is_empty());
    assert_eq!(
        fx.accounts.get_account(account.id).await.unwrap().unwrap().balance,
        dec!(100)
    );
}

#[tokio::test]
async fn source_and_destination_queries() {
    let fx = fixture();
    let a = open_account(&fx.accounts, dec!(1000)).await;
    let b = open_account(&fx.accounts, dec!(0)).await;

    fx.service.create_transaction(deposit(dec!(50), a.id)).await.unwrap();
    fx.service
        .create_transaction(withdrawal(dec!(-25), a.id))
        .await
        .unwrap();
    fx.service
        .create_transaction(transfer(dec!(100), a.id, b.id))
        .await
        .unwrap();

    let by_source = fx.service.transactions_by_source(a.id).await.unwrap();
    assert_eq!(by_source.len(), 2); // withdrawal + transfer

    let by_destination = fx.service.transactions_by_destination(a.id).await.unwrap();
    assert_eq!(by_destination.len(), 1); // deposit

    let into_b = fx.service.transactions_by_destination(b.id).await.unwrap();
    assert_eq!(into_b.len(), 1);
    assert_eq!(into_b[0].kind, TransactionKind::Transfer);

    assert_eq!(fx.service.all_transactions().await.unwrap().len(), 3);
}

#[tokio::test]
async fn worked_example_sequence() {
    let fx = fixture();
    let a = open_account(&fx.accounts, dec!(1000)).await;
    let b = open_account(&fx.accounts, dec!(0)).await;

    let deposit_record = fx
        .service
        .create_transaction(deposit(dec!(500), a.id))
        .await
        .unwrap();
    assert_eq!(deposit_record.destination_account.unwrap().balance, dec!(1500));

    let withdrawal_record = fx
        .service
        .create_transaction(withdrawal(dec!(-300), a.id))
        .await
        .unwrap();
    assert_eq!(withdrawal_record.source_account.unwrap().balance, dec!(1200));

    let transfer_record = fx
        .service
        .create_transaction(transfer(dec!(1200), a.id, b.id))
        .await
        .unwrap();
    assert_eq!(transfer_record.source_account.unwrap().balance, dec!(0));
    assert_eq!(transfer_record.destination_account.unwrap().balance, dec!(1200));

    // Source now empty: one more unit must fail and change nothing
    let result = fx.service.create_transaction(transfer(dec!(1), a.id, b.id)).await;
    assert!(matches!(result, Err(Error::InsufficientBalance(_))));
    assert_eq!(fx.accounts.get_account(a.id).await.unwrap().unwrap().balance, dec!(0));
    assert_eq!(fx.accounts.get_account(b.id).await.unwrap().unwrap().balance, dec!(1200));

    assert_eq!(fx.service.all_transactions().await.unwrap().len(), 3);
}
