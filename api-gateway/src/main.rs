//! API Gateway for the core banking system

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use clap::Parser;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter, FmtSubscriber};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use account_service::{
    AccountService, ClientService, InMemoryAccountRepository, InMemoryClientRepository,
    PostgresAccountRepository, PostgresClientRepository,
};
use transaction_service::{
    InMemoryTransactionRepository, PostgresTransactionRepository, StrategyRegistry,
    TransactionService, TransactionServiceConfig,
};

use api_gateway::api::{
    account::{
        create_account, delete_account, get_account, get_accounts, get_client_accounts,
        update_account,
    },
    client::{create_client, delete_client, get_client, get_clients, update_client},
    transaction::{
        create_transaction, get_transaction, get_transactions, get_transactions_by_destination,
        get_transactions_by_source,
    },
};
use api_gateway::api;
use api_gateway::config::AppConfig;
use api_gateway::AppState;

/// API documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Client routes
        api::client::create_client,
        api::client::get_client,
        api::client::get_clients,
        api::client::update_client,
        api::client::delete_client,
        // Account routes
        api::account::create_account,
        api::account::get_account,
        api::account::get_accounts,
        api::account::get_client_accounts,
        api::account::update_account,
        api::account::delete_account,
        // Transaction routes
        api::transaction::create_transaction,
        api::transaction::get_transaction,
        api::transaction::get_transactions,
        api::transaction::get_transactions_by_source,
        api::transaction::get_transactions_by_destination,
    ),
    components(
        schemas(
            // Client API
            common::model::client::Client,
            common::model::client::NewClient,
            common::model::client::ClientUpdate,

            // Account API
            common::model::account::Account,
            common::model::account::NewAccount,
            common::model::account::AccountUpdate,
            common::model::account::AccountKind,
            common::model::account::AccountStatus,

            // Transaction API
            common::model::transaction::Transaction,
            common::model::transaction::TransactionRequest,
            common::model::transaction::TransactionKind,

            // Response models
            api::response::ApiResponse<common::model::client::Client>,
            api::response::ApiResponse<common::model::account::Account>,
            api::response::ApiResponse<common::model::transaction::Transaction>,
            api::response::ApiListResponse<common::model::client::Client>,
            api::response::ApiListResponse<common::model::account::Account>,
            api::response::ApiListResponse<common::model::transaction::Transaction>,
            api::response::ResponseMetadata
        )
    ),
    tags(
        (name = "client", description = "Client onboarding and lifecycle endpoints"),
        (name = "account", description = "Account management endpoints"),
        (name = "transaction", description = "Deposit, withdrawal and transfer endpoints")
    ),
    info(
        title = "Core Banking API",
        version = "1.0.0",
        description = "API for the core banking system covering client onboarding, account management, and money movements"
    )
)]
struct ApiDoc;

/// Core banking API server
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Listening address
    #[clap(short, long, default_value = "127.0.0.1:8080")]
    addr: String,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging with debug level when DEBUG=1 env var is set
    let env = std::env::var("DEBUG").unwrap_or_else(|_| "0".to_string());
    let log_level = if env == "1" { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .parse("tower_http=debug,api_gateway=debug")
        .unwrap();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    debug!("Debug logging enabled");

    // Wire up repositories and services. A DATABASE_URL selects the Postgres
    // repositories; otherwise everything runs in memory.
    let config = AppConfig::new();
    let state = match config.database_url {
        Some(_) => {
            let pool = common::db::init_db_pool()
                .await
                .expect("Failed to connect to database");
            info!("Using Postgres repositories");

            let client_repo = Arc::new(PostgresClientRepository::new(pool.clone()));
            let account_repo = Arc::new(PostgresAccountRepository::new(pool.clone()));
            let transaction_repo = Arc::new(PostgresTransactionRepository::new(pool));
            build_state(client_repo, account_repo, transaction_repo)
        }
        None => {
            info!("DATABASE_URL not set, using in-memory repositories");

            let client_repo = Arc::new(InMemoryClientRepository::new());
            let account_repo = Arc::new(InMemoryAccountRepository::new());
            let transaction_repo = Arc::new(InMemoryTransactionRepository::new());
            build_state(client_repo, account_repo, transaction_repo)
        }
    };

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Set up API routes
    let api_routes = Router::new()
        // Client routes
        .route("/clients", post(create_client))
        .route("/clients", get(get_clients))
        .route("/clients/:id", get(get_client))
        .route("/clients/:id", put(update_client))
        .route("/clients/:id", delete(delete_client))
        // Account routes
        .route("/clients/:id/accounts", post(create_account))
        .route("/clients/:id/accounts", get(get_client_accounts))
        .route("/accounts", get(get_accounts))
        .route("/accounts/:id", get(get_account))
        .route("/accounts/:id", put(update_account))
        .route("/accounts/:id", delete(delete_account))
        // Transaction routes
        .route("/transactions", post(create_transaction))
        .route("/transactions", get(get_transactions))
        .route("/transactions/:id", get(get_transaction))
        .route("/transactions/source/:account_id", get(get_transactions_by_source))
        .route(
            "/transactions/destination/:account_id",
            get(get_transactions_by_destination),
        );

    // Set up Swagger UI
    let swagger_ui = SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi());

    // Combine all routes
    let app = Router::new()
        .nest("/api/v1", api_routes)
        .merge(swagger_ui)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(log_level))
                .on_request(DefaultOnRequest::new().level(log_level))
                .on_response(DefaultOnResponse::new().level(log_level)),
        )
        .with_state(state);

    // Start the server
    let addr: std::net::SocketAddr = args.addr.parse().expect("Invalid address");
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    // Run until interrupt signal
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Assemble the shared application state from a repository triple
fn build_state(
    client_repo: Arc<dyn account_service::ClientRepository>,
    account_repo: Arc<dyn account_service::AccountRepository>,
    transaction_repo: Arc<dyn transaction_service::TransactionRepository>,
) -> Arc<AppState> {
    let client_service = Arc::new(ClientService::new(
        client_repo.clone(),
        account_repo.clone(),
    ));
    let account_service = Arc::new(AccountService::new(account_repo.clone(), client_repo));
    let transaction_service = Arc::new(TransactionService::with_config(
        transaction_repo,
        account_repo,
        Arc::new(StrategyRegistry::new()),
        TransactionServiceConfig::from_env(),
    ));

    Arc::new(AppState {
        client_service,
        account_service,
        transaction_service,
    })
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
