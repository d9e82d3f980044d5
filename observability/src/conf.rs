use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumString};
use typed_builder::TypedBuilder;
use validator::Validate;

const DEFAULT_LOG_FILTER: &str = "info";

lazy_static::lazy_static! {
    pub(crate) static ref ENVIRONMENT: ExecutionEnvironment = mode();
}

/// Logging configuration shared by every binary or service embedding the SDK.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, TypedBuilder, Validate)]
#[serde(deny_unknown_fields)]
pub struct Tracing {
    /// The service name, attached to the first log line emitted after initialisation.
    ///
    /// Service Name should contain the following pattern:
    ///
    /// ```text
    /// <service_name> := <alpha>_<service_name> | <alpha>
    /// <alpha> := [a-z]*
    /// ```
    #[builder(setter(into))]
    #[validate(length(min = 1))]
    service_name: String,

    /// If this is set, the tracing system will use json logs.
    #[builder(default, setter(strip_option))]
    json_logs: Option<bool>,

    /// An `EnvFilter` directive such as `fhevm_sdk=debug,info`.
    /// When absent, `RUST_LOG` is used and then falls back to `info`.
    #[builder(default, setter(strip_option, into))]
    #[validate(length(min = 1))]
    filter: Option<String>,
}

impl Tracing {
    /// Returns the service name.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns whether the logs are formatted as json.
    pub fn json_logs(&self) -> bool {
        self.json_logs.unwrap_or(false)
    }

    /// Returns the explicit filter directive, if any.
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub(crate) fn default_filter() -> &'static str {
        DEFAULT_LOG_FILTER
    }
}

#[derive(
    Default, Display, Deserialize, Serialize, Clone, EnumString, AsRefStr, Eq, PartialEq, Debug,
)]
#[strum(serialize_all = "snake_case")]
pub enum ExecutionEnvironment {
    #[default]
    Local,
    #[strum(serialize = "dev")]
    Development,
    Stage,
    #[strum(serialize = "prod")]
    Production,
    Integration,
}

impl ExecutionEnvironment {
    /// Environments where spans are reported when they close.
    pub fn reports_span_close(&self) -> bool {
        matches!(
            self,
            ExecutionEnvironment::Production
                | ExecutionEnvironment::Development
                | ExecutionEnvironment::Stage
        )
    }
}

/// Returns the environment selected through `RUN_MODE` when the process started.
pub fn environment() -> &'static ExecutionEnvironment {
    &ENVIRONMENT
}

fn mode() -> ExecutionEnvironment {
    env::var("RUN_MODE")
        .map(|enum_str| ExecutionEnvironment::from_str(enum_str.as_str()).unwrap_or_default())
        .unwrap_or_else(|_| ExecutionEnvironment::Local)
}

#[derive(TypedBuilder, Debug)]
pub struct Settings<'a> {
    #[builder(setter(strip_option), default = None)]
    path: Option<&'a str>,
    env_prefix: &'a str,
}

impl Settings<'_> {
    /// Loads a configuration of type `T`.
    ///
    /// Sources are layered, later ones overriding earlier ones:
    /// `config/default`, `config/<prefix>`, `config/<prefix>-<environment>`,
    /// the explicit path (which must exist when given) and finally
    /// environment variables such as `<PREFIX>__NETWORK__CHAIN_ID`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be created or deserialized.
    pub fn init_conf<'de, T: Deserialize<'de> + std::fmt::Debug>(&self) -> Result<T, ConfigError> {
        let env_conf = config::Environment::default()
            .prefix(self.env_prefix)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true);

        let mut config_builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                File::with_name(&format!("config/{}", self.env_prefix.to_lowercase()))
                    .required(false),
            )
            .add_source(
                File::with_name(&format!(
                    "config/{}-{}",
                    self.env_prefix.to_lowercase(),
                    *ENVIRONMENT
                ))
                .required(false),
            );

        if let Some(path) = self.path {
            config_builder = config_builder.add_source(File::with_name(path).required(true))
        };

        let config = config_builder.add_source(env_conf).build()?;

        let settings: T = config.try_deserialize()?;

        tracing::debug!("Loaded settings: {:?}", settings);

        Ok(settings)
    }
}
