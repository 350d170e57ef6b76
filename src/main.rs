//! # Comet - Entry Point
//! src/main.rs
//!
//! Servidor de demostración: registra unas pocas rutas, instala los handlers
//! de SIGINT/SIGTERM y corre el loop hasta recibir una señal.
//!
//! ```bash
//! curl http://localhost:8080/hello/ana
//! curl http://localhost:8080/files/docs/readme.md
//! curl -X POST --data 'hola' http://localhost:8080/echo
//! ```

use comet_http::config::Config;
use comet_http::cors::CorsConfig;
use comet_http::http::{Method, Request, Response, StatusCode};
use comet_http::router::UrlParams;
use comet_http::server::{RunningFlag, Server};
use comet_http::{logging, RouteId, SetupError};
use tracing::{debug, error, info, warn};

/// Estado de la aplicación de demostración
#[derive(Debug, Default)]
struct Stats {
    requests: u64,
}

fn main() {
    let config = Config::new();

    if let Err(e) = logging::init(config.verbose, !config.no_color) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!("comet v{} starting", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    match run(config) {
        Ok(stats) => info!(requests = stats.requests, "Server stopped"),
        Err(e) => {
            error!(error = %e, "Server setup failed");
            std::process::exit(1);
        }
    }
}

fn run(config: Config) -> Result<Stats, SetupError> {
    let cors = match &config.cors_policy {
        Some(path) => CorsConfig::from_json_file(path)
            .map_err(|e| SetupError::InvalidConfig(format!("{}: {}", path.display(), e)))?,
        None => CorsConfig::default(),
    };

    let mut server = Server::with_config(config, Stats::default())?;
    server
        .set_cors_policy(cors)
        .map_err(|e| SetupError::InvalidConfig(e.to_string()))?;

    register_routes(&mut server).map_err(|e| SetupError::InvalidConfig(e.to_string()))?;
    install_signal_handlers(server.running_flag());

    info!("Servidor listo en http://{}", server.local_addr());
    Ok(server.start())
}

fn register_routes(server: &mut Server<Stats>) -> Result<(), comet_http::RouteError> {
    let routes: [(&str, Method, comet_http::Handler<Stats>); 4] = [
        ("/", Method::GET, handle_root),
        ("/hello/{name}", Method::GET, handle_hello),
        ("/files/*", Method::GET, handle_files),
        ("/echo", Method::POST, handle_echo),
    ];

    for (pattern, method, handler) in routes {
        let id: RouteId = server.add_route(pattern, method, handler)?;
        server.add_middleware(id, count_request)?;
    }

    Ok(())
}

// === Middleware ===

fn count_request(stats: &mut Stats, request: Request, _: &UrlParams) -> Request {
    stats.requests += 1;
    debug!(
        n = stats.requests,
        method = %request.method(),
        path = request.path(),
        "Request #{}",
        stats.requests
    );
    request
}

// === Handlers ===

fn handle_root(_: &mut Stats, _: &Request, _: &UrlParams) -> Option<Response> {
    Some(Response::text(StatusCode::Ok, "Hello, World!"))
}

fn handle_hello(_: &mut Stats, _: &Request, params: &UrlParams) -> Option<Response> {
    let name = params.get("name")?;
    Some(Response::text(StatusCode::Ok, &format!("Hello, {}!", name)))
}

fn handle_files(_: &mut Stats, _: &Request, params: &UrlParams) -> Option<Response> {
    let path = params.wildcard()?;
    Some(Response::text(StatusCode::Ok, &format!("File: {}", path)))
}

fn handle_echo(_: &mut Stats, request: &Request, _: &UrlParams) -> Option<Response> {
    let content_type = request.header("Content-Type").unwrap_or("application/octet-stream");
    Some(
        Response::new(StatusCode::Ok)
            .with_header("Content-Type", content_type)
            .with_body_bytes(request.body().to_vec()),
    )
}

// === Señales ===

#[cfg(unix)]
fn install_signal_handlers(flag: RunningFlag) {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = match Signals::new([SIGINT, SIGTERM]) {
        Ok(signals) => signals,
        Err(e) => {
            warn!(error = %e, "Failed to install signal handlers");
            return;
        }
    };

    // El thread vive tanto como el proceso: cada señal vuelve a pedir el
    // apagado, aunque llegue antes de que el loop arranque
    std::thread::spawn(move || {
        for signal in signals.forever() {
            info!(signal, "Shutdown requested");
            flag.stop();
        }
    });
}

#[cfg(not(unix))]
fn install_signal_handlers(_flag: RunningFlag) {
    warn!("Signal handling is not available on this platform");
}
