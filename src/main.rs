use axum::{Router, extract::DefaultBodyLimit, routing::get};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use codeintel::config::{CommandLineArgs, Config, LoggingConfig};
use codeintel::services::{AnalysisRepository, AnalysisService, LLMClient};
use codeintel::{AppState, db, handlers, models, utils};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::analysis::analyze_snippet,
        handlers::analysis::list_snippets,
        handlers::system::root,
    ),
    components(
        schemas(
            models::AnalyzeSnippetRequest,
            models::AnalyzeSnippetResponse,
            models::SnippetListResponse,
            models::SnippetAnalysisRecord,
            models::CodeAnalysis,
            utils::ErrorResponse,
            handlers::system::StatusMessage,
        )
    ),
    tags(
        (name = "Snippets", description = "Code snippet analysis and history"),
        (name = "System", description = "Service status"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli_args = CommandLineArgs::parse();
    let config = Config::load(&cli_args)?;

    // Keep the guard alive for the whole process so buffered file logs are flushed
    let _log_guard = init_logging(&config.logging);
    tracing::info!("CodeIntel starting up");
    tracing::info!("Configuration loaded successfully");
    tracing::info!(
        "Server {}:{}, database {}, model {}",
        config.server.host,
        config.server.port,
        config.database.url,
        config.llm.model
    );
    for warning in config.startup_warnings() {
        tracing::warn!("{}", warning);
    }

    let llm_client = Arc::new(LLMClient::new(&config.llm)?);
    tracing::info!("LLM client initialized (model: {})", llm_client.model());

    if cli_args.check_provider {
        return check_provider(&llm_client).await;
    }

    let pool = db::create_pool(&config.database.url).await?;
    tracing::info!("Database pool created successfully");

    let analysis_service = Arc::new(AnalysisService::new(
        AnalysisRepository::new(pool),
        llm_client,
        config.limits.clone(),
    ));

    let app_state = Arc::new(AppState {
        static_config: config.static_config.clone(),
        analysis_service: Arc::clone(&analysis_service),
    });

    let api_routes = Router::new()
        .route(
            "/api/analyze/snippets",
            get(handlers::analysis::list_snippets).post(handlers::analysis::analyze_snippet),
        )
        .layer(DefaultBodyLimit::max(config.limits.max_body_bytes()))
        .with_state(Arc::clone(&app_state));

    let system_routes = Router::new()
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health_check))
        .route("/ready", get(handlers::system::ready_check))
        .with_state(Arc::clone(&app_state));

    let static_routes = if config.static_config.enabled {
        tracing::info!("Static file serving enabled, serving from embedded assets");
        Router::new().fallback(handlers::web::serve_static_files)
    } else {
        Router::new()
    };

    let app = Router::new()
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_routes)
        .merge(system_routes)
        .merge(static_routes) // Must be last to serve as fallback for SPA routes
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("API documentation available at http://{}/api-docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_filter = tracing_subscriber::EnvFilter::new(&logging.level);
    let registry = tracing_subscriber::registry().with(log_filter);

    let Some(log_file) = &logging.file else {
        registry.with(tracing_subscriber::fmt::layer()).init();
        return None;
    };

    let log_path = std::path::Path::new(log_file);
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_dir = log_path
        .parent()
        .and_then(|p| p.to_str())
        .filter(|p| !p.is_empty())
        .unwrap_or("logs");
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("codeintel.log");
    // The rolling appender adds its own date suffix
    let file_prefix = file_name.strip_suffix(".log").unwrap_or(file_name);

    let file_appender = tracing_appender::rolling::daily(log_dir, file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    registry
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(tracing_subscriber::fmt::layer())
        .init();

    Some(guard)
}

/// `--check-provider`: one minimal generation request, then exit
async fn check_provider(client: &LLMClient) -> Result<(), anyhow::Error> {
    tracing::info!("Checking LLM provider with model {}", client.model());
    match client.test_connection().await {
        Ok(reply) => {
            tracing::info!("Provider check successful. Response: {}", reply.trim());
            Ok(())
        },
        Err(e) => {
            tracing::error!("Provider check failed: {}", e);
            Err(e.into())
        },
    }
}
