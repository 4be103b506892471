pub mod flow_resolver;
pub mod notification;
pub mod privilege;
