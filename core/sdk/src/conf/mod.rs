use crate::consts::{DEFAULT_SERVICE_NAME, ENV_PREFIX, LOCAL_CHAIN_ID, SEPOLIA_CHAIN_ID};
use crate::error::{error_and_log, Result, SdkError};
use crate::util::rate_limiter::RateLimiterConfig;
use observability::{
    conf::{Settings, Tracing},
    telemetry::init_tracing,
};
use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

/// Configuration of an [`crate::client::FhevmSdk`] instance.
#[derive(Serialize, Deserialize, Validate, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct SdkConfig {
    #[validate(nested)]
    pub network: NetworkConfig,
    #[validate(nested)]
    pub rate_limiter: Option<RateLimiterConfig>,
    #[validate(nested)]
    pub telemetry: Option<Tracing>,
}

/// The chain the target contracts live on.
#[derive(Serialize, Deserialize, Validate, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 1))]
    pub chain_id: u64,
    // Gateway serving public keys and reencryption requests
    pub gateway_url: Option<Url>,
}

impl NetworkConfig {
    pub fn sepolia() -> Self {
        Self {
            name: "sepolia".to_string(),
            chain_id: SEPOLIA_CHAIN_ID,
            gateway_url: None,
        }
    }

    pub fn local() -> Self {
        Self {
            name: "localhost".to_string(),
            chain_id: LOCAL_CHAIN_ID,
            gateway_url: None,
        }
    }
}

impl SdkConfig {
    pub fn new(network: NetworkConfig) -> Self {
        Self {
            network,
            rate_limiter: None,
            telemetry: None,
        }
    }

    /// Load the configuration from the `config/` directory, an optional
    /// explicit file and `FHEVM_SDK__*` environment variables, then validate it.
    ///
    /// Later sources override earlier ones key by key, so a key absent from
    /// the explicit file keeps the value of `config/default`. The shipped
    /// default has no `[network]` section: a network is only ever taken from
    /// the explicit file or the environment.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let settings = match path {
            Some(p) => Settings::builder().path(p).env_prefix(ENV_PREFIX).build(),
            None => Settings::builder().env_prefix(ENV_PREFIX).build(),
        };
        let config: SdkConfig = settings
            .init_conf()
            .map_err(|e| error_and_log(SdkError::Config(e.to_string())))?;
        config.check()?;
        Ok(config)
    }

    /// Run the `validator` checks and map failures into [`SdkError::Config`].
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| error_and_log(SdkError::Config(e.to_string())))
    }

    /// Install the global tracing subscriber described by the `telemetry`
    /// section, or a default one.
    pub fn init_telemetry(&self) -> anyhow::Result<()> {
        let telemetry = self
            .telemetry
            .clone()
            .unwrap_or_else(|| Tracing::builder().service_name(DEFAULT_SERVICE_NAME).build());
        init_tracing(&telemetry)
    }
}
