use actix_web::{App, HttpServer, web};
use finance_tracker::infrastructure::config::ServerConfig;
use finance_tracker::infrastructure::logging::init_logging;
use finance_tracker::presentation::handlers::AppState;
use finance_tracker::presentation::middleware::RequestTrace;
use finance_tracker::presentation::routes::{configure, cors};
use tracing::{error, info};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_logging();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };
    info!(?config, "Configuration loaded");

    let state = web::Data::new(AppState::in_memory());
    let allowed_origin = config.allowed_origin.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors(&allowed_origin))
            .wrap(RequestTrace)
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?;

    info!(
        address = %config.bind_address(),
        routes = %"POST /auth/login, POST /auth/register, GET /financial-records/getAllByUserID/{userId}, POST /financial-records, PUT /financial-records/{id}, DELETE /financial-records/{id}, GET /health",
        "Starting HTTP server"
    );
    server.run().await
}
