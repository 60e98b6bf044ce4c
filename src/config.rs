use serde::{Deserialize, Serialize};

/// Prefix carried by every parameter group the broker creates.
pub const DEFAULT_PARAMETER_GROUP_PREFIX: &str = "cg-aws-broker-";

/// Process-wide feature settings consulted during reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether instances may opt into `log_bin_trust_function_creators`.
    pub enable_functions_feature: bool,
    pub parameter_group_prefix: String,
    /// Upper bound on pages fetched by any single paginated scan.
    pub max_pages: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_functions_feature: false,
            parameter_group_prefix: DEFAULT_PARAMETER_GROUP_PREFIX.to_string(),
            max_pages: 100,
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional `broker` config file and
    /// `BROKER_*` environment variables, in increasing priority.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = config::Config::builder();

        config = config.add_source(config::Config::try_from(&Settings::default())?);

        config = config.add_source(config::File::with_name("broker").required(false));

        // Single underscore would split field names like `max_pages`.
        config = config.add_source(
            config::Environment::with_prefix("BROKER")
                .prefix_separator("_")
                .separator("__"),
        );

        let settings: Settings = config.build()?.try_deserialize()?;
        Ok(settings)
    }

    pub fn with_functions_feature(mut self, enabled: bool) -> Self {
        self.enable_functions_feature = enabled;
        self
    }
}
