//! Roundtable Server
//!
//! Axum server exposing the agent dispatch and topic log API.
//! Wired to the real Dispatcher and TopicLogStore from crates/core.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use roundtable_core::dispatch::Dispatcher;
use roundtable_core::error::DispatchError;
use roundtable_core::llm::{OllamaClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
use roundtable_core::models::{AgentId, LogEntry};
use roundtable_core::store::TopicLogStore;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Application state
struct AppState {
    dispatcher: Dispatcher,
}

type SharedState = Arc<AppState>;

// === CLI ===

#[derive(Parser)]
#[command(name = "roundtable", about = "Multi-agent topic log service")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    /// Path to the SQLite log database
    #[arg(long, default_value = ".roundtable/roundtable.db")]
    db: String,

    /// Base URL of the Ollama-compatible generation backend
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    ollama_url: String,

    /// Model served by the backend
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Per-request generation timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,
}

// === API Types ===

#[derive(Deserialize)]
struct RunAgentRequest {
    topic: String,
    /// Required by the Research agent only
    query: Option<String>,
}

#[derive(Serialize)]
struct RunAgentResponse {
    agent: AgentId,
    topic: String,
    output: String,
}

#[derive(Serialize)]
struct LogsResponse {
    topic: String,
    logs: Vec<LogEntry>,
}

#[derive(Serialize)]
struct AgentInfo {
    name: &'static str,
    description: &'static str,
    requires_query: bool,
}

#[derive(Serialize)]
struct AgentsResponse {
    agents: Vec<AgentInfo>,
}

#[derive(Serialize)]
struct ApiResponse {
    success: bool,
    message: String,
}

/// Error surfaced to HTTP. Each core failure class maps to its own status
/// so callers can tell bad input from backend trouble.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        let status = match &err {
            DispatchError::UnknownAgent(_) => StatusCode::NOT_FOUND,
            DispatchError::MissingParameter { .. } => StatusCode::BAD_REQUEST,
            DispatchError::Generation(_) => StatusCode::BAD_GATEWAY,
            DispatchError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiResponse {
                success: false,
                message: self.message,
            }),
        )
            .into_response()
    }
}

// === Handlers ===

/// Liveness check
async fn root() -> Json<ApiResponse> {
    Json(ApiResponse {
        success: true,
        message: "Roundtable API is running 🚀".to_string(),
    })
}

/// List the fixed agent set
async fn list_agents() -> Json<AgentsResponse> {
    Json(AgentsResponse {
        agents: AgentId::all()
            .into_iter()
            .map(|a| AgentInfo {
                name: a.name(),
                description: a.description(),
                requires_query: a.requires_query(),
            })
            .collect(),
    })
}

/// Run a specific agent on a topic
async fn run_agent(
    State(state): State<SharedState>,
    Path(agent_name): Path<String>,
    Json(req): Json<RunAgentRequest>,
) -> Result<Json<RunAgentResponse>, ApiError> {
    let agent: AgentId = agent_name.parse().map_err(ApiError::from)?;

    let outcome = state
        .dispatcher
        .dispatch(agent, &req.topic, req.query.as_deref())
        .await?;

    Ok(Json(RunAgentResponse {
        agent: outcome.agent,
        topic: outcome.topic,
        output: outcome.output,
    }))
}

/// Retrieve all logs for a given topic
async fn get_logs(
    State(state): State<SharedState>,
    Path(topic): Path<String>,
) -> Result<Json<LogsResponse>, ApiError> {
    let logs = state
        .dispatcher
        .store()
        .read_all(&topic)
        .map_err(DispatchError::from)?;

    if logs.is_empty() {
        return Err(ApiError::not_found("No logs found for this topic"));
    }

    Ok(Json(LogsResponse { topic, logs }))
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/agents", get(list_agents))
        .route("/run/:agent", post(run_agent))
        .route("/logs/:topic", get(get_logs))
        .with_state(state)
}

async fn run_server(args: Args) -> anyhow::Result<()> {
    let store = Arc::new(TopicLogStore::open_at(&args.db)?);
    let llm = Arc::new(OllamaClient::new(
        &args.ollama_url,
        &args.model,
        Duration::from_secs(args.timeout_secs),
    ));

    let state: SharedState = Arc::new(AppState {
        dispatcher: Dispatcher::new(store, llm),
    });

    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    println!("🚀 Roundtable Server running at http://{}", addr);
    println!("   Agents: POST /run/{{agent}} (Devil, Insight, Research, Summarizer)");
    println!("   Logs:   GET /logs/{{topic}}");
    println!("   Index:  GET /agents");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    run_server(Args::parse()).await
}
