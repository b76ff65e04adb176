use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use matchmaker::auth::TokenService;
use matchmaker::config::{Settings, StoreBackend};
use matchmaker::error::{handle_json_payload_error, handle_query_payload_error};
use matchmaker::routes::{self, AppState};
use matchmaker::services::{InMemoryStore, PostgresClient};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str, format: &str) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting matchmaker service...");

    let tokens = TokenService::new(&settings.auth.jwt_secret, settings.auth.token_ttl_mins);
    let bounds = settings.discovery.age_bounds();
    let iterations = settings.auth.password_iterations;

    let app_state = match settings.database.backend {
        StoreBackend::Postgres => {
            let db_max_conn = settings.database.max_connections.unwrap_or(10);

            let postgres = PostgresClient::from_settings(
                &settings.database.url,
                Some(db_max_conn),
                settings.database.min_connections,
                settings.database.acquire_timeout_secs,
                settings.database.idle_timeout_secs,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
            })?;

            info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

            AppState::new(Arc::new(postgres), tokens, bounds, iterations)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; data is lost on restart");
            AppState::new(Arc::new(InMemoryStore::new()), tokens, bounds, iterations)
        }
    };

    info!("Discovery age bounds: {:?}", bounds);

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
