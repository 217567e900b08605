use std::{fs, path::Path};

use anyhow::{anyhow, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::proc_initiateor::initiate_default_values;
use crate::config::proc_validator;
use crate::config::service::ServiceConfig;
use crate::error::ProxyError;

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = fs::read_to_string(path)?;

    let expanded = expand_env_vars(&content);
    parse_config(expanded).await
}

pub async fn parse_config(content: String) -> Result<ServiceConfig> {
    let service_config: ServiceConfig = serde_yaml::from_str(&content).inspect_err(|e| {
        error!("parse config error: {}", e);
    })?;

    let service_config = initiate_default_values(service_config);
    debug!("validation config ...");
    proc_validator::validate_service_config(&service_config).map_err(|errors| {
        let err = ProxyError::Config(errors.join("; "));
        error!("{}", err);
        anyhow!(err)
    })?;

    Ok(service_config)
}

/// Replaces `${VAR}` and `${VAR:default}` with environment values.
pub fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]*))?\}").expect("static env var pattern");
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const CONFIG: &str = r#"
settings:
  server:
    host: 127.0.0.1
    port: "5028"
upstream:
  base_url: "${BOXLEO_TEST_BASE_URL:https://app.boxleocourier.com}"
  email: "${BOXLEO_TEST_EMAIL}"
  password: secret
"#;

    #[test]
    #[serial]
    fn expands_env_vars_with_defaults() {
        std::env::set_var("BOXLEO_TEST_EMAIL", "ops@example.com");
        std::env::remove_var("BOXLEO_TEST_BASE_URL");

        let expanded = expand_env_vars(CONFIG);
        assert!(expanded.contains(r#"base_url: "https://app.boxleocourier.com""#));
        assert!(expanded.contains(r#"email: "ops@example.com""#));

        std::env::remove_var("BOXLEO_TEST_EMAIL");
    }

    #[tokio::test]
    #[serial]
    async fn loads_config_file_and_applies_defaults() -> Result<()> {
        std::env::set_var("BOXLEO_TEST_EMAIL", "ops@example.com");
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(CONFIG.as_bytes())?;

        let cfg = file_to_config(file.path()).await?;
        assert_eq!(cfg.service_name(), "boxleo");
        assert_eq!(cfg.login_url(), "https://app.boxleocourier.com/api/login");
        assert_eq!(cfg.reference_ttl_seconds(), 86_400);
        assert_eq!(cfg.settings.http_timeout_ms(), 30_000);
        assert_eq!(cfg.settings.logging.as_ref().map(|l| l.level.as_str()), Some("info"));

        std::env::remove_var("BOXLEO_TEST_EMAIL");
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn missing_credentials_are_a_config_error() {
        std::env::remove_var("BOXLEO_TEST_EMAIL");

        let err = parse_config(expand_env_vars(CONFIG)).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("configuration error"), "{msg}");
        assert!(msg.contains("upstream.email"), "{msg}");
    }
}
