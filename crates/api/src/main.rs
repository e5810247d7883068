use stockops_api::app;
use stockops_api::config::{AppConfig, AppMode};
use stockops_observability::LogFormat;

#[tokio::main]
async fn main() {
    let mode = AppMode::from_env();
    stockops_observability::init(if mode.is_development() {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    });
    stockops_observability::install_panic_hook();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            std::process::exit(1);
        }
    };

    if let Err(err) = std::fs::create_dir_all(&config.report_dir) {
        tracing::error!(
            dir = %config.report_dir.display(),
            error = %err,
            "report directory unavailable"
        );
        std::process::exit(1);
    }

    let port = config.port;
    let app = match app::build_app(config) {
        Ok(app) => app,
        Err(err) => {
            tracing::error!(error = %err, "route registry failed to mount");
            std::process::exit(1);
        }
    };

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("failed to bind listener");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
