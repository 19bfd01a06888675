use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;
use std::{env, fs};

#[derive(Deserialize)]
pub struct SSLConfig {
    pub private_key_file: PathBuf,
    pub certificate_chain_file: PathBuf,
}

/// Account created at startup with staff and superuser rights.
#[derive(Deserialize, Clone)]
pub struct SuperuserConfig {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Deserialize)]
pub struct Config {
    pub database_url: String,
    /// Whether `/user/create/` is routed. On unless turned off.
    #[serde(default = "default_signups_enabled")]
    pub signups_enabled: bool,
    /// Directory uploaded images are written to.
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,
    pub honeycomb_api_key: Option<String>,
    pub ssl: Option<SSLConfig>,
    pub superuser: Option<SuperuserConfig>,
}

fn default_media_root() -> PathBuf {
    PathBuf::from("media")
}

fn default_signups_enabled() -> bool {
    true
}

impl Config {
    pub fn from_file(path: PathBuf) -> Result<Config, anyhow::Error> {
        let config = fs::read_to_string(path).context("Unable to read config file")?;
        Config::from_toml(&config)
    }

    fn from_toml(config: &str) -> Result<Config, anyhow::Error> {
        toml::from_str(config).context("Unable to parse config")
    }

    pub fn from_env() -> Result<Config, anyhow::Error> {
        Config::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Config, anyhow::Error> {
        let signups_enabled = match var("SIGNUPS_ENABLED") {
            Some(value) => value
                .parse()
                .context("Unable to parse SIGNUPS_ENABLED value")?,
            None => default_signups_enabled(),
        };
        let database_url = var("DATABASE_URL").context("Unable to read env var: DATABASE_URL")?;
        let media_root = var("MEDIA_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(default_media_root);
        let honeycomb_api_key = var("HONEYCOMB_API_KEY");

        let config = Config {
            database_url,
            signups_enabled,
            media_root,
            honeycomb_api_key,
            ssl: None,
            superuser: None,
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn from_vars(vars: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        Config::from_vars(|key| vars.get(key).map(|value| value.to_string()))
    }

    #[test]
    fn minimal_config() {
        let config = Config::from_toml(
            r#"
            database_url = "postgres://localhost/recipes"
            signups_enabled = true
            "#,
        )
        .unwrap();

        assert_eq!(config.database_url, "postgres://localhost/recipes");
        assert!(config.signups_enabled);
        assert_eq!(config.media_root, PathBuf::from("media"));
        assert!(config.honeycomb_api_key.is_none());
        assert!(config.ssl.is_none());
        assert!(config.superuser.is_none());
    }

    #[test]
    fn full_config() {
        let config = Config::from_toml(
            r#"
            database_url = "postgres://localhost/recipes"
            signups_enabled = false
            media_root = "/var/lib/recipes/media"
            honeycomb_api_key = "key"

            [ssl]
            private_key_file = "key.pem"
            certificate_chain_file = "cert.pem"

            [superuser]
            email = "admin@example.com"
            password = "secret"
            name = "Admin"
            "#,
        )
        .unwrap();

        assert!(!config.signups_enabled);
        assert_eq!(config.media_root, PathBuf::from("/var/lib/recipes/media"));
        assert_eq!(config.honeycomb_api_key.as_deref(), Some("key"));
        assert_eq!(
            config.ssl.map(|ssl| ssl.certificate_chain_file),
            Some(PathBuf::from("cert.pem"))
        );
        assert_eq!(
            config.superuser.map(|superuser| superuser.email),
            Some("admin@example.com".to_owned())
        );
    }

    #[test]
    fn missing_database_url() {
        assert!(Config::from_toml("signups_enabled = true").is_err());
        assert!(from_vars(&[("SIGNUPS_ENABLED", "true")]).is_err());
    }

    #[test]
    fn signups_enabled_by_default() {
        let config = Config::from_toml(r#"database_url = "postgres://localhost/recipes""#).unwrap();
        assert!(config.signups_enabled);

        let config = from_vars(&[("DATABASE_URL", "postgres://localhost/recipes")]).unwrap();
        assert!(config.signups_enabled);
        assert_eq!(config.media_root, PathBuf::from("media"));
        assert!(config.honeycomb_api_key.is_none());
    }

    #[test]
    fn config_from_vars() {
        let config = from_vars(&[
            ("DATABASE_URL", "postgres://localhost/recipes"),
            ("SIGNUPS_ENABLED", "false"),
            ("MEDIA_ROOT", "/srv/media"),
            ("HONEYCOMB_API_KEY", "key"),
        ])
        .unwrap();
        assert!(!config.signups_enabled);
        assert_eq!(config.media_root, PathBuf::from("/srv/media"));
        assert_eq!(config.honeycomb_api_key.as_deref(), Some("key"));

        assert!(from_vars(&[
            ("DATABASE_URL", "postgres://localhost/recipes"),
            ("SIGNUPS_ENABLED", "sometimes"),
        ])
        .is_err());
    }
}
