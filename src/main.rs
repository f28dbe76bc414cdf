// src/main.rs
mod advice;
mod api;
mod catalog;
mod config;
mod estimator;
mod model;

use config::AppConfig;

#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv() {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("⚠️ Could not load .env: {}", err);
        }
    }

    let app_config = AppConfig::from_env();
    let api_config = app_config.api.clone();
    let advice_config = app_config.advice.clone();
    let estimator_config = app_config.estimator;

    println!("🚢 Loading estimator starting...");
    if !advice_config.is_configured() {
        println!("ℹ️ No Gemini API key configured; /advice serves a static notice.");
    }
    api::start_api_server(api_config, estimator_config, advice_config).await;
}
