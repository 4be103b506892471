use getset::Getters;
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Default, Deserialize, Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct ApprovalConfig {
    #[serde(default)]
    host: HostConfig,
    #[serde(default)]
    telemetry: TelemetryConfig,
    /// Users allowed to revoke approvals and cancel on behalf of submitters.
    #[serde(default)]
    admins: Vec<Uuid>,
    #[serde(default)]
    flows: Vec<FlowConfig>,
    /// Business records loaded into the store at startup.
    #[serde(default)]
    records: Vec<RecordSeed>,
}

#[derive(Deserialize, Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct HostConfig {
    #[serde(default = "HostConfig::default_address")]
    bind_address: String,
    #[serde(default = "HostConfig::default_port")]
    bind_port: u16,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            bind_address: Self::default_address(),
            bind_port: Self::default_port(),
        }
    }
}

impl HostConfig {
    fn default_address() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        80
    }
}

#[derive(Deserialize, Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct TelemetryConfig {
    #[serde(default = "default_enabled")]
    enable: bool,
    /// Default filter level, overridden by `RUST_LOG`.
    #[serde(default = "TelemetryConfig::default_level")]
    level: String,
    /// Print file, line, thread and target with every event.
    #[serde(default)]
    enable_debug_logging: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enable: default_enabled(),
            level: Self::default_level(),
            enable_debug_logging: false,
        }
    }
}

impl TelemetryConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

/// A linear approval flow.
#[derive(Deserialize, Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct FlowConfig {
    id: Uuid,
    name: String,
    /// Entity kind whose records may be submitted into this flow.
    entity: String,
    #[serde(default)]
    nodes: Vec<FlowNodeConfig>,
}

#[derive(Deserialize, Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct FlowNodeConfig {
    name: String,
    #[serde(default = "FlowNodeConfig::default_sign_mode")]
    sign_mode: String,
    #[serde(default)]
    approvers: Vec<Uuid>,
    #[serde(default)]
    cc_users: Vec<Uuid>,
    #[serde(default)]
    allow_self_selecting_approver: bool,
    #[serde(default)]
    allow_self_selecting_cc: bool,
    #[serde(default)]
    editable_fields: Vec<String>,
}

impl FlowNodeConfig {
    fn default_sign_mode() -> String {
        "AND".to_string()
    }
}

#[derive(Deserialize, Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct RecordSeed {
    id: Uuid,
    entity: String,
    #[serde(default = "default_enabled")]
    has_last_user: bool,
    #[serde(default)]
    fields: Map<String, Value>,
}

fn default_enabled() -> bool {
    true
}

pub fn build_config() -> anyhow::Result<ApprovalConfig> {
    let args: Vec<String> = std::env::args().collect();
    let mut config = config::Config::builder().add_source(
        config::File::with_name("config")
            .required(false)
            .format(config::FileFormat::Yaml),
    );
    for arg in args {
        if arg.ends_with("yaml") || arg.ends_with("yml") {
            config = config.add_source(
                config::File::from(std::path::Path::new(arg.as_str()))
                    .format(config::FileFormat::Yaml)
                    .required(false),
            );
        }
    }
    config = config.add_source(
        config::Environment::with_prefix("APPROVAL")
            .separator("__")
            .try_parsing(true)
            .list_separator(";")
            .with_list_parse_key("admins"),
    );
    Ok(config.build()?.try_deserialize()?)
}
