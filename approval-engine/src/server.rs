use std::sync::Arc;

use colored::Colorize;
use tracing::{error, info};

use crate::api;
use crate::infrastructure::{
    config::build_config, deliver_notifications, telemetry::initialize_telemetry,
    ChannelNotificationSink, ServiceProvider,
};

pub fn run() {
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(x) => x,
        Err(e) => return eprintln!("{}: {}", "Cannot build runtime".red(), e),
    };
    runtime.block_on(async_run());
}

pub async fn async_run() {
    let config = match build_config() {
        Ok(x) => x,
        Err(e) => {
            return eprintln!("{}: {}", "Cannot build config".red(), e);
        }
    };
    if let Err(e) = initialize_telemetry(config.telemetry()) {
        return eprintln!("{}: {}", "Cannot build logger".red(), e);
    };

    let (sink, receiver) = ChannelNotificationSink::new();
    let service_provider = match ServiceProvider::build(config, Arc::new(sink)) {
        Ok(x) => Arc::new(x),
        Err(e) => {
            return eprintln!("{}: {}", "Cannot build Service Provider".red(), e);
        }
    };
    let delivery = tokio::spawn(deliver_notifications(receiver));

    tokio::select! {
        _ = initialize_web_host(service_provider) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Stopping Services (ctrl-c handling).");
        }
    }
    delivery.abort();
}

pub async fn initialize_web_host(sp: Arc<ServiceProvider>) {
    let host = sp.config().host().clone();
    let server = actix_web::HttpServer::new(move || {
        let cors = actix_cors::Cors::default()
            .allow_any_origin()
            .allow_any_header()
            .allow_any_method()
            .max_age(86400);

        actix_web::App::new()
            .wrap(cors)
            .app_data(actix_web::web::Data::from(sp.clone()))
            .wrap(tracing_actix_web::TracingLogger::default())
            .service(api::approval::workable)
            .service(api::approval::state)
            .service(api::approval::fetch_next_step)
            .service(api::approval::fetch_worked_steps)
            .service(api::approval::current_step)
            .service(api::approval::submit)
            .service(api::approval::approve)
            .service(api::approval::cancel)
            .service(api::approval::revoke)
            .service(api::approval::auto_approve)
            .service(api::approval::register_record)
    })
    .bind((host.bind_address().to_owned(), *host.bind_port()));
    let server = match server {
        Ok(x) => x,
        Err(e) => {
            return error!(
                "Cannot bind {}:{}: {}",
                host.bind_address(),
                host.bind_port(),
                e
            )
        }
    };
    match server.disable_signals().run().await {
        Ok(_) => info!("Web server stopped successfully."),
        Err(e) => error!("Web server into error: {}", e),
    }
}
