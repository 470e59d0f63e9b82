//! Layered configuration loading.
//!
//! Precedence, lowest first: built-in defaults, the optional config file,
//! `ACCESSGATE_*` environment variables.

use accessgate_core::{BrokerConfig, ConfigError};
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use std::path::Path;

pub const ENV_PREFIX: &str = "ACCESSGATE";

/// Load and validate the broker configuration.
pub fn load(path: Option<&Path>) -> Result<BrokerConfig, ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path));
    }
    resolve(builder.add_source(Environment::with_prefix(ENV_PREFIX)))
}

fn resolve(builder: ConfigBuilder<DefaultState>) -> Result<BrokerConfig, ConfigError> {
    let config: BrokerConfig = builder
        .build()
        .and_then(|settings| settings.try_deserialize())
        .map_err(|e| ConfigError::Load(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    const FILE: &str = r#"
audience: api://accessgate
identity_store_id: d-1234567890
token_exchange_app_arn: arn:aws:sso::111111111111:application/ssoins-1/apl-1
transient_role_arn: arn:aws:iam::111111111111:role/Transient
jwks_url: https://idp.example.com/oauth2/v1/keys
account_id: "011111111111"
"#;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(vars))
    }

    #[test]
    fn test_file_then_environment() {
        let builder = config::Config::builder()
            .add_source(File::from_str(FILE, FileFormat::Yaml))
            .add_source(env(&[
                ("ACCESSGATE_USERNAME_ATTRIBUTE", "preferred_username"),
                ("ACCESSGATE_JWKS_CACHE_TTL_SECS", "600"),
            ]));

        let config = resolve(builder).unwrap();
        assert_eq!(config.username_attribute, "preferred_username");
        assert_eq!(config.jwks_cache_ttl_secs, 600);
        assert_eq!(config.account_id, "011111111111");
        assert_eq!(config.region, "us-east-1");
    }

    #[test]
    fn test_environment_only() {
        let builder = config::Config::builder().add_source(env(&[
            ("ACCESSGATE_AUDIENCE", "api://accessgate"),
            ("ACCESSGATE_IDENTITY_STORE_ID", "d-1234567890"),
            ("ACCESSGATE_TOKEN_EXCHANGE_APP_ARN", "arn:app"),
            ("ACCESSGATE_TRANSIENT_ROLE_ARN", "arn:role"),
            ("ACCESSGATE_JWKS_URL", "https://idp.example.com/keys"),
            ("ACCESSGATE_ACCOUNT_ID", "011111111111"),
        ]));

        let config = resolve(builder).unwrap();
        assert_eq!(config.account_id, "011111111111");
        assert_eq!(config.transient_session_name(), "transient-s3ag-d-1234567890");
    }

    #[test]
    fn test_missing_fields_fail_fast() {
        let builder = config::Config::builder()
            .add_source(env(&[("ACCESSGATE_AUDIENCE", "api://accessgate")]));

        match resolve(builder) {
            Err(ConfigError::Missing(fields)) => assert_eq!(
                fields,
                vec![
                    "identity_store_id",
                    "token_exchange_app_arn",
                    "transient_role_arn",
                    "jwks_url",
                    "account_id",
                ]
            ),
            other => panic!("expected missing fields, got {other:?}"),
        }
    }

    #[test]
    fn test_unparsable_value() {
        let builder = config::Config::builder()
            .add_source(File::from_str(FILE, FileFormat::Yaml))
            .add_source(env(&[("ACCESSGATE_MAX_GRANTS", "lots")]));
        assert!(matches!(resolve(builder), Err(ConfigError::Load(_))));
    }
}
