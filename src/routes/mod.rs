pub mod health;
pub mod history;
pub mod notifications;

use actix_web::web;

use crate::error::AppError;

/// Rejects malformed JSON bodies with the standard error envelope
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

/// Registers every route of the service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());
    health::configure(cfg);
    notifications::configure(cfg);
    history::configure(cfg);
}
