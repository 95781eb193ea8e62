#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the "Mesa de Agua" water-point survey.
//!
//! Serves JSON for a separate map frontend: filter panel choices, map
//! markers, per-point fact sheets and dashboard distributions. Every
//! request reads the dataset through one shared [`DataFetcher`], so the
//! survey API is queried at most once per freshness window no matter
//! how many requests arrive.

mod handlers;
pub mod interactive;

use actix_cors::Cors;
use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, middleware, web};
use mesa_agua_server_models::ApiError;
use mesa_agua_source::fetcher::DataFetcher;
use mesa_agua_source::form_def::FormDefinition;

/// Shared application state.
pub struct AppState {
    /// Cached access to the canonical dataset.
    pub fetcher: DataFetcher,
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::QueryConfig::default().error_handler(query_error))
            .route("/health", web::get().to(handlers::health))
            .route("/categories", web::get().to(handlers::categories))
            .route("/categories/{category}", web::get().to(handlers::vocabulary))
            .route("/filters", web::get().to(handlers::filters))
            .route("/markers", web::get().to(handlers::markers))
            .route("/detail", web::get().to(handlers::detail))
            .route("/stats", web::get().to(handlers::stats)),
    );
}

/// Turns malformed query strings into JSON `400`s.
fn query_error(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejecting query for {}: {err}", req.path());
    let response = HttpResponse::BadRequest().json(ApiError::new(err.to_string()));
    InternalError::from_response(err, response).into()
}

/// Address the HTTP server listens on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind, `127.0.0.1` by default.
    pub bind_addr: String,
    /// TCP port, `8080` by default.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR` and `PORT`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("BIND_ADDR").ok(),
            std::env::var("PORT").ok(),
        )
    }

    /// Builds a config from raw values; missing or unparseable values
    /// keep their defaults.
    #[must_use]
    pub fn from_vars(bind_addr: Option<String>, port: Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: bind_addr
                .filter(|addr| !addr.trim().is_empty())
                .unwrap_or(defaults.bind_addr),
            port: port
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
        }
    }
}

/// Starts the survey API server on `config`.
///
/// Loads the embedded form definition, builds the shared fetcher and
/// starts the Actix-Web HTTP server. The API token is read on each
/// fetch, so a missing token only surfaces as a warning in responses.
/// This is a regular async function; the caller is responsible for
/// providing the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the form definition is invalid,
/// the HTTP client cannot be built, or the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let form = FormDefinition::mesa_agua().map_err(std::io::Error::other)?;
    log::info!("Serving form '{}' from {}", form.name, form.data_url());

    let fetcher = DataFetcher::for_form(&form).map_err(std::io::Error::other)?;
    let state = web::Data::new(AppState { fetcher });

    let ServerConfig { bind_addr, port } = config;
    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_when_unset() {
        assert_eq!(ServerConfig::from_vars(None, None), ServerConfig::default());
    }

    #[test]
    fn config_reads_values() {
        let config = ServerConfig::from_vars(Some("0.0.0.0".to_string()), Some(" 9000 ".to_string()));
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn config_ignores_bad_port_and_blank_address() {
        let config = ServerConfig::from_vars(Some("  ".to_string()), Some("http".to_string()));
        assert_eq!(config, ServerConfig::default());
    }
}
