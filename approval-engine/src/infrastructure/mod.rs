pub mod config;
mod service;
mod service_provider;
pub mod telemetry;

#[rustfmt::skip]
pub use {
    service::notification::deliver_notifications,
    service::notification::ChannelNotificationSink,
    service_provider::ServiceProvider,
};
