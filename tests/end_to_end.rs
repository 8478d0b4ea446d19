// End-to-end flows across the client, account and transaction services,
// composed in-process over the in-memory repositories.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use account_service::{
    AccountService, ClientService, InMemoryAccountRepository, InMemoryClientRepository,
};
use common::error::Error;
use common::model::account::{AccountKind, AccountStatus, AccountUpdate, NewAccount};
use common::model::client::NewClient;
use common::model::transaction::{TransactionKind, TransactionRequest};
use transaction_service::{InMemoryTransactionRepository, StrategyRegistry, TransactionService};

struct Bank {
    clients: ClientService,
    accounts: AccountService,
    transactions: TransactionService,
}

fn bank() -> Bank {
    let client_repo = Arc::new(InMemoryClientRepository::new());
    let account_repo = Arc::new(InMemoryAccountRepository::new());
    let transaction_repo = Arc::new(InMemoryTransactionRepository::new());

    Bank {
        clients: ClientService::new(client_repo.clone(), account_repo.clone()),
        accounts: AccountService::new(account_repo.clone(), client_repo),
        transactions: TransactionService::new(
            transaction_repo,
            account_repo,
            Arc::new(StrategyRegistry::new()),
        ),
    }
}

fn new_client(identification_number: &str) -> NewClient {
    NewClient {
        identification_type: "CC".to_string(),
        identification_number: identification_number.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        birthdate: NaiveDate::from_ymd_opt(1990, 12, 10).unwrap(),
    }
}

#[tokio::test]
async fn client_to_transfer_lifecycle() {
    let bank = bank();

    let client = bank
        .clients
        .create_client(new_client("1001"))
        .await
        .unwrap();

    // Open a savings account with an opening balance, and a checking
    // account to transfer into.
    let savings = bank
        .accounts
        .create_account(
            client.id,
            NewAccount {
                kind: AccountKind::Savings,
                status: None,
                balance: dec!(1000),
                gmf_exempt: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(savings.status, AccountStatus::Active);
    assert_eq!(
        savings.account_number.as_deref(),
        Some(format!("53{:08}", savings.id).as_str())
    );

    let checking = bank
        .accounts
        .create_account(
            client.id,
            NewAccount {
                kind: AccountKind::Checking,
                status: Some(AccountStatus::Active),
                balance: dec!(0),
                gmf_exempt: false,
            },
        )
        .await
        .unwrap();
    assert!(checking.account_number.as_deref().unwrap().starts_with("33"));

    // Deposit 500, withdraw 300, then move everything to checking.
    bank.transactions
        .create_transaction(TransactionRequest {
            kind: Some(TransactionKind::Deposit),
            amount: dec!(500),
            source_account_id: None,
            destination_account_id: Some(savings.id),
        })
        .await
        .unwrap();

    bank.transactions
        .create_transaction(TransactionRequest {
            kind: Some(TransactionKind::Withdrawal),
            amount: dec!(-300),
            source_account_id: Some(savings.id),
            destination_account_id: None,
        })
        .await
        .unwrap();

    let transfer = bank
        .transactions
        .create_transaction(TransactionRequest {
            kind: Some(TransactionKind::Transfer),
            amount: dec!(1200),
            source_account_id: Some(savings.id),
            destination_account_id: Some(checking.id),
        })
        .await
        .unwrap();
    assert_eq!(
        transfer.source_account.as_ref().unwrap().balance,
        dec!(0)
    );
    assert_eq!(
        transfer.destination_account.as_ref().unwrap().balance,
        dec!(1200)
    );

    // The drained account cannot cover even the smallest transfer.
    let err = bank
        .transactions
        .create_transaction(TransactionRequest {
            kind: Some(TransactionKind::Transfer),
            amount: dec!(1),
            source_account_id: Some(savings.id),
            destination_account_id: Some(checking.id),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientBalance(_)));

    let savings_now = bank.accounts.get_account(savings.id).await.unwrap().unwrap();
    let checking_now = bank
        .accounts
        .get_account(checking.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(savings_now.balance, dec!(0));
    assert_eq!(checking_now.balance, dec!(1200));

    // Only the three successful movements were recorded.
    assert_eq!(bank.transactions.all_transactions().await.unwrap().len(), 3);
}

#[tokio::test]
async fn client_deletion_requires_empty_portfolio() {
    let bank = bank();

    let client = bank
        .clients
        .create_client(new_client("1002"))
        .await
        .unwrap();
    let account = bank
        .accounts
        .create_account(
            client.id,
            NewAccount {
                kind: AccountKind::Savings,
                status: None,
                balance: dec!(250),
                gmf_exempt: false,
            },
        )
        .await
        .unwrap();

    // Blocked while the client still owns an account.
    let err = bank.clients.delete_client(client.id).await.unwrap_err();
    assert!(matches!(err, Error::ValidationError(_)));

    // Draining and canceling the account clears the way.
    bank.transactions
        .create_transaction(TransactionRequest {
            kind: Some(TransactionKind::Withdrawal),
            amount: dec!(-250),
            source_account_id: Some(account.id),
            destination_account_id: None,
        })
        .await
        .unwrap();

    bank.accounts
        .update_account(
            account.id,
            AccountUpdate {
                status: AccountStatus::Canceled,
                balance: dec!(0),
                gmf_exempt: false,
            },
        )
        .await
        .unwrap();
    bank.accounts.delete_account(account.id).await.unwrap();
    bank.clients.delete_client(client.id).await.unwrap();

    assert!(bank.clients.get_client(client.id).await.unwrap().is_none());
}

#[tokio::test]
async fn statements_track_both_sides_of_a_transfer() {
    let bank = bank();

    let client = bank
        .clients
        .create_client(new_client("1003"))
        .await
        .unwrap();

    let open = |balance| {
        let accounts = &bank.accounts;
        let client_id = client.id;
        async move {
            accounts
                .create_account(
                    client_id,
                    NewAccount {
                        kind: AccountKind::Savings,
                        status: None,
                        balance,
                        gmf_exempt: false,
                    },
                )
                .await
                .unwrap()
        }
    };
    let a = open(dec!(500)).await;
    let b = open(dec!(0)).await;

    bank.transactions
        .create_transaction(TransactionRequest {
            kind: Some(TransactionKind::Transfer),
            amount: dec!(200),
            source_account_id: Some(a.id),
            destination_account_id: Some(b.id),
        })
        .await
        .unwrap();

    let outgoing = bank
        .transactions
        .transactions_by_source(a.id)
        .await
        .unwrap();
    let incoming = bank
        .transactions
        .transactions_by_destination(b.id)
        .await
        .unwrap();

    assert_eq!(outgoing.len(), 1);
    assert_eq!(incoming.len(), 1);
    assert_eq!(outgoing[0].id, incoming[0].id);
    assert_eq!(outgoing[0].kind, TransactionKind::Transfer);
}
