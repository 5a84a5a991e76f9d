use std::process::ExitCode;

use backoffice::app::App;
use backoffice::config::{AppConfig, DEFAULT_LOG_FILTER};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            init_tracing(DEFAULT_LOG_FILTER);
            error!(error = %format!("{err:#}"), "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log_filter);

    let webview_data_dir = match config.webview_data_dir() {
        Ok(dir) => dir,
        Err(err) => {
            error!(error = %format!("{err:#}"), "failed to prepare webview data directory");
            return ExitCode::FAILURE;
        }
    };
    info!(db = %config.db_path.display(), page_size = config.page_size, "starting backoffice");

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(dioxus::desktop::WindowBuilder::new().with_title("Backoffice"))
                .with_data_directory(webview_data_dir),
        )
        .with_context(config)
        .launch(App);
    ExitCode::SUCCESS
}
