use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;

use clinic_notifier::config;
use clinic_notifier::context::AppContext;
use clinic_notifier::db;
use clinic_notifier::directory::PgDirectory;
use clinic_notifier::reminder::ReminderScheduler;
use clinic_notifier::routes;
use clinic_notifier::services::push::{FcmClient, ServiceAccountTokenSource};
use clinic_notifier::services::PgHistoryStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = config::Config::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!("Starting clinic notifier on {}:{}", config.host, config.port);

    let db_pool = db::create_pool(&config.database).await.map_err(|e| {
        log::error!("Database pool error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    db::run_migrations(&db_pool).await.map_err(|e| {
        log::error!("Migration error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    let tokens = ServiceAccountTokenSource::from_file(
        &config.fcm.service_account_path,
        config.fcm.timeout,
    )
    .map_err(|e| {
        log::error!(
            "Failed to load service account {}: {}",
            config.fcm.service_account_path.display(),
            e
        );
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let gateway = FcmClient::new(&config.fcm, Arc::new(tokens)).map_err(|e| {
        log::error!("Push gateway error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    let ctx = AppContext::new(
        Arc::new(PgDirectory::new(db_pool.clone())),
        Arc::new(gateway),
        Arc::new(PgHistoryStore::new(db_pool.clone())),
    );

    let reminder_task = if config.reminder.enabled {
        let job = Arc::new(ctx.reminder_job());
        let scheduler = ReminderScheduler::new(&config.reminder.cron, job).map_err(|e| {
            log::error!("Invalid reminder schedule: {}", e);
            std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
        })?;
        log::info!("Appointment reminders scheduled ({})", config.reminder.cron);
        Some(tokio::spawn(scheduler.run()))
    } else {
        log::info!("Appointment reminders disabled");
        None
    };

    let host = config.host.clone();
    let port = config.port;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(ctx.clone()))
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .shutdown_timeout(30)
    .run();

    let server_handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutdown signal received, stopping server...");
        server_handle.stop(true).await;
    });

    let result = server.await;

    if let Some(task) = reminder_task {
        task.abort();
        log::info!("Reminder scheduler stopped");
    }

    result
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                log::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
