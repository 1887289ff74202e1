use std::path::PathBuf;

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::{Extension, State},
    http::StatusCode,
    middleware as axum_middleware,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use clap::{Parser, Subcommand};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use ecogov_api::config;
use ecogov_api::database::{self, Database};
use ecogov_api::graphql::{self, AppSchema};
use ecogov_api::middleware::auth::{auth_context_middleware, AuthContext};

#[derive(Parser)]
#[command(name = "ecogov-api", about = "Environmental management platform API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the GraphQL server (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate {
        #[arg(long, default_value = "migrations")]
        dir: PathBuf,
    },
}

#[derive(Clone)]
struct AppState {
    schema: AppSchema,
    db: Database,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = config::config();
    tracing::info!("Starting ecogov API in {:?} mode", cfg.environment);

    let db = Database::connect(&cfg.database).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate { dir } => {
            database::migrate::run_migrations(&db, &dir).await?;
            db.close().await;
        }
        Command::Serve => serve(db).await?,
    }

    Ok(())
}

async fn serve(db: Database) -> anyhow::Result<()> {
    let schema = graphql::build_schema(db.clone());
    let app = app(schema, db.clone());

    // Allow tests or deployments to override port via env
    let port = std::env::var("ECOGOV_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or_else(|| config::config().server.port);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("GraphQL server listening on http://{}/graphql", bind_addr);

    axum::serve(listener, app).await?;

    db.close().await;
    Ok(())
}

fn app(schema: AppSchema, db: Database) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/graphql", get(graphql_playground).post(graphql_handler))
        .layer(axum_middleware::from_fn(auth_context_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { schema, db })
}

async fn graphql_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    if let Some(user) = auth.user {
        request = request.data(user);
    }
    state.schema.execute(request).await.into()
}

async fn graphql_playground() -> impl IntoResponse {
    if config::config().graphql.enable_playground {
        Html(
            async_graphql::http::GraphiQLSource::build()
                .endpoint("/graphql")
                .title("ecogov GraphQL")
                .finish(),
        )
        .into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn root() -> Json<serde_json::Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "ecogov API",
            "version": version,
            "description": "Environmental management platform API - emission testing, smoke-belching enforcement, urban greening",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "graphql": "/graphql (bearer token per operation)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
