//! Client configuration resolved at build time.
//!
//! SYSTEM CONTEXT
//! ==============
//! A WASM bundle has no process environment at runtime, so settings are
//! captured from the build environment with `option_env!` and parsed by a
//! pure function that tests can drive directly.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
    #[error("{var} must be `true` or `false`, got `{value}`")]
    InvalidBool { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST API, without a trailing slash.
    pub api_base_url: String,
    /// Remove the stored token when the validation request gets no response.
    pub clear_token_on_transport_failure: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { api_base_url: DEFAULT_API_BASE_URL.to_owned(), clear_token_on_transport_failure: true }
    }
}

impl ClientConfig {
    /// Build typed config from variables captured at compile time.
    ///
    /// Optional:
    /// - `SECURECHAT_API_URL`: default `http://localhost:5000/api`
    /// - `SECURECHAT_CLEAR_TOKEN_ON_TRANSPORT_FAILURE`: `true` (default) or `false`
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::parse(
            option_env!("SECURECHAT_API_URL"),
            option_env!("SECURECHAT_CLEAR_TOKEN_ON_TRANSPORT_FAILURE"),
        )
    }

    /// Like [`ClientConfig::from_build_env`], falling back to defaults on bad input.
    pub fn from_build_env_or_default() -> Self {
        Self::from_build_env().unwrap_or_else(|err| {
            log::warn!("invalid build configuration, using defaults: {err}");
            Self::default()
        })
    }

    pub fn parse(api_url: Option<&str>, clear_on_transport_failure: Option<&str>) -> Result<Self, ConfigError> {
        let api_base_url = match api_url {
            None => DEFAULT_API_BASE_URL.to_owned(),
            Some(raw) => {
                let trimmed = raw.trim().trim_end_matches('/');
                if trimmed.is_empty() {
                    return Err(ConfigError::Empty { var: "SECURECHAT_API_URL" });
                }
                trimmed.to_owned()
            }
        };
        let clear_token_on_transport_failure =
            parse_bool("SECURECHAT_CLEAR_TOKEN_ON_TRANSPORT_FAILURE", clear_on_transport_failure, true)?;

        Ok(Self { api_base_url, clear_token_on_transport_failure })
    }
}

fn parse_bool(var: &'static str, raw: Option<&str>, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidBool { var, value: raw.to_owned() }),
    }
}
