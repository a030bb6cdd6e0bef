/// Environment variable consulted when a call does not name a region.
pub const REGION_ENV_VAR: &str = "AWS_REGION";

/// Environment variable that turns on the read-only gate.
pub const READ_ONLY_ENV_VAR: &str = "KINESIS-MCP-READONLY";

/// Region used when neither the call nor the environment names one.
pub const DEFAULT_REGION: &str = "us-west-2";

const TRUTHY_VALUES: [&str; 3] = ["true", "1", "yes"];

/// Process configuration captured once at startup and handed to the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Region taken from [`REGION_ENV_VAR`], if set and non-empty.
    pub env_region: Option<String>,
    /// When true, mutating operations are refused before any client is built.
    pub read_only: bool,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env_region = lookup(REGION_ENV_VAR).filter(|region| !region.is_empty());
        let read_only = lookup(READ_ONLY_ENV_VAR)
            .map(|value| is_truthy(&value))
            .unwrap_or(false);
        Self { env_region, read_only }
    }

    /// Explicit argument, then environment, then [`DEFAULT_REGION`].
    pub fn resolve_region(&self, explicit: Option<&str>) -> String {
        explicit
            .filter(|region| !region.is_empty())
            .or(self.env_region.as_deref())
            .unwrap_or(DEFAULT_REGION)
            .to_string()
    }
}

pub fn is_truthy(value: &str) -> bool {
    let value = value.to_lowercase();
    TRUTHY_VALUES.iter().any(|truthy| *truthy == value)
}
