// Database persistence tests for the PostgreSQL repositories.

#[cfg(test)]
mod db_persistence_tests {
    use std::env;

    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use sqlx::{postgres::PgPoolOptions, PgPool};
    use tokio::runtime::Runtime;

    use account_service::{
        AccountRepository, ClientRepository, PostgresAccountRepository, PostgresClientRepository,
    };
    use common::model::account::{Account, AccountKind, AccountStatus, NewAccount};
    use common::model::client::NewClient;
    use transaction_service::{
        PostgresTransactionRepository, TransactionDraft, TransactionRepository,
    };
    use common::model::transaction::TransactionKind;

    // Helper function to run async tests against the test database
    fn run_db_test<F>(test: F)
    where
        F: FnOnce(PgPool) -> futures::future::BoxFuture<'static, ()> + Send + 'static,
    {
        // Skip test if TEST_DATABASE_URL is not set
        let db_url = match env::var("TEST_DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                println!("Skipping database test: TEST_DATABASE_URL not set");
                return;
            }
        };

        let rt = Runtime::new().unwrap();

        rt.block_on(async {
            let pool = match PgPoolOptions::new()
                .max_connections(5)
                .connect(&db_url)
                .await
            {
                Ok(pool) => pool,
                Err(err) => {
                    println!("Skipping database test: could not connect to database: {}", err);
                    return;
                }
            };

            common::db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");

            test(pool).await;
        });
    }

    async fn cleanup(pool: &PgPool) {
        // Delete test data in foreign-key order
        sqlx::query("DELETE FROM transactions")
            .execute(pool)
            .await
            .expect("Failed to clean up transactions table");
        sqlx::query("DELETE FROM accounts")
            .execute(pool)
            .await
            .expect("Failed to clean up accounts table");
        sqlx::query("DELETE FROM clients")
            .execute(pool)
            .await
            .expect("Failed to clean up clients table");
    }

    fn test_client(identification_number: &str) -> NewClient {
        NewClient {
            identification_type: "CC".to_string(),
            identification_number: identification_number.to_string(),
            first_name: "Rosa".to_string(),
            last_name: "Parks".to_string(),
            email: "rosa@example.com".to_string(),
            birthdate: NaiveDate::from_ymd_opt(1985, 3, 14).unwrap(),
        }
    }

    #[test]
    #[ignore = "Requires test database, run with RUST_TEST_THREADS=1 cargo test -- --ignored"]
    fn test_client_round_trip() {
        run_db_test(|pool| {
            Box::pin(async move {
                let repo = PostgresClientRepository::new(pool.clone());

                let created = repo
                    .create_client(test_client("db-100"))
                    .await
                    .expect("Failed to create client");
                assert!(created.id > 0);

                let fetched = repo
                    .get_client(created.id)
                    .await
                    .expect("Failed to fetch client")
                    .expect("Client missing after insert");
                assert_eq!(fetched.identification_number, "db-100");
                assert_eq!(fetched.birthdate, created.birthdate);

                cleanup(&pool).await;
            })
        });
    }

    #[test]
    #[ignore = "Requires test database, run with RUST_TEST_THREADS=1 cargo test -- --ignored"]
    fn test_account_number_survives_persistence() {
        run_db_test(|pool| {
            Box::pin(async move {
                let clients = PostgresClientRepository::new(pool.clone());
                let accounts = PostgresAccountRepository::new(pool.clone());

                let client = clients
                    .create_client(test_client("db-101"))
                    .await
                    .expect("Failed to create client");

                let mut account = accounts
                    .create_account(
                        client.id,
                        NewAccount {
                            kind: AccountKind::Savings,
                            status: None,
                            balance: dec!(750.50),
                            gmf_exempt: false,
                        },
                        AccountStatus::Active,
                    )
                    .await
                    .expect("Failed to create account");
                assert!(account.account_number.is_none());

                account.account_number =
                    Some(Account::derive_account_number(account.kind, account.id));
                let updated = accounts
                    .update_account(account)
                    .await
                    .expect("Failed to assign account number");

                let fetched = accounts
                    .get_account(updated.id)
                    .await
                    .expect("Failed to fetch account")
                    .expect("Account missing after insert");
                assert_eq!(fetched.account_number, updated.account_number);
                assert_eq!(fetched.balance, dec!(750.50));
                assert_eq!(fetched.status, AccountStatus::Active);

                cleanup(&pool).await;
            })
        });
    }

    #[test]
    #[ignore = "Requires test database, run with RUST_TEST_THREADS=1 cargo test -- --ignored"]
    fn test_transaction_record_round_trip() {
        run_db_test(|pool| {
            Box::pin(async move {
                let clients = PostgresClientRepository::new(pool.clone());
                let accounts = PostgresAccountRepository::new(pool.clone());
                let transactions = PostgresTransactionRepository::new(pool.clone());

                let client = clients
                    .create_client(test_client("db-102"))
                    .await
                    .expect("Failed to create client");
                let account = accounts
                    .create_account(
                        client.id,
                        NewAccount {
                            kind: AccountKind::Savings,
                            status: None,
                            balance: dec!(100),
                            gmf_exempt: false,
                        },
                        AccountStatus::Active,
                    )
                    .await
                    .expect("Failed to create account");

                let record = transactions
                    .save_transaction(TransactionDraft {
                        kind: TransactionKind::Deposit,
                        amount: dec!(25.75),
                        source_account_id: None,
                        destination_account_id: Some(account.id),
                    })
                    .await
                    .expect("Failed to persist transaction record");
                assert!(record.id > 0);

                let fetched = transactions
                    .get_transaction(record.id)
                    .await
                    .expect("Failed to fetch transaction")
                    .expect("Transaction missing after insert");
                assert_eq!(fetched.kind, TransactionKind::Deposit);
                assert_eq!(fetched.amount, dec!(25.75));
                assert_eq!(fetched.destination_account_id, Some(account.id));

                let credited = transactions
                    .transactions_by_destination(account.id)
                    .await
                    .expect("Failed to query by destination");
                assert_eq!(credited.len(), 1);

                cleanup(&pool).await;
            })
        });
    }
}
