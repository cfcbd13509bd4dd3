/*
 * Responsibility
 * - 環境変数の読み込み (issuer / audience / pinned algorithm / trust material など)
 * - 設定値のバリデーション (不足・不正なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct JwksConfig {
    pub url: Url,
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
    pub fetch_retries: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub auth_issuer: String,
    pub auth_audience: Option<String>,
    pub auth_algorithm: Algorithm,
    pub access_token_leeway_seconds: u64,
    pub auth_resource: String,

    // Trust material: at least one of these is set.
    pub auth_public_key_pem: Option<String>,
    pub auth_key_id: Option<String>,
    pub jwks: Option<JwksConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Empty values count as unset.
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = parse_or(get("PORT"), 3000, "PORT")?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(get("APP_ENV"));

        let auth_issuer = get("AUTH_ISSUER").ok_or(ConfigError::Missing("AUTH_ISSUER"))?;
        let auth_audience = get("AUTH_AUDIENCE");

        let auth_algorithm = match get("AUTH_ALGORITHM") {
            Some(name) => Algorithm::from_str(name.trim())
                .map_err(|_| ConfigError::Invalid("AUTH_ALGORITHM"))?,
            None => Algorithm::RS256,
        };
        // Only asymmetric algorithms can be pinned.
        if matches!(
            auth_algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(ConfigError::Invalid("AUTH_ALGORITHM"));
        }

        let access_token_leeway_seconds =
            parse_or(get("ACCESS_TOKEN_LEEWAY_SECONDS"), 0, "ACCESS_TOKEN_LEEWAY_SECONDS")?;

        let auth_resource = get("AUTH_RESOURCE").unwrap_or_else(|| "*".to_string());

        let auth_public_key_pem = get("AUTH_PUBLIC_KEY_PEM").map(|pem| pem.replace("\\n", "\n"));
        let auth_key_id = get("AUTH_KEY_ID");

        let jwks = match get("AUTH_JWKS_URL") {
            Some(raw) => {
                let url =
                    Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(ConfigError::Invalid("AUTH_JWKS_URL"));
                }
                Some(JwksConfig {
                    url,
                    refresh_interval: Duration::from_secs(parse_or(
                        get("JWKS_REFRESH_SECONDS"),
                        600,
                        "JWKS_REFRESH_SECONDS",
                    )?),
                    fetch_timeout: Duration::from_secs(parse_or(
                        get("JWKS_FETCH_TIMEOUT_SECONDS"),
                        5,
                        "JWKS_FETCH_TIMEOUT_SECONDS",
                    )?),
                    fetch_retries: parse_or(get("JWKS_FETCH_RETRIES"), 2, "JWKS_FETCH_RETRIES")?,
                })
            }
            None => None,
        };

        if auth_public_key_pem.is_none() && jwks.is_none() {
            return Err(ConfigError::Missing("AUTH_PUBLIC_KEY_PEM or AUTH_JWKS_URL"));
        }
        if jwks.as_ref().is_some_and(|j| j.refresh_interval.is_zero()) {
            return Err(ConfigError::Invalid("JWKS_REFRESH_SECONDS"));
        }

        Ok(Self {
            addr,
            app_env,
            auth_issuer,
            auth_audience,
            auth_algorithm,
            access_token_leeway_seconds,
            auth_resource,
            auth_public_key_pem,
            auth_key_id,
            jwks,
        })
    }
}

fn parse_or<T: FromStr>(
    value: Option<String>,
    default: T,
    key: &'static str,
) -> Result<T, ConfigError> {
    match value {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_with_static_key() {
        let config = load(&[
            ("AUTH_ISSUER", "https://issuer.example.com/"),
            ("AUTH_PUBLIC_KEY_PEM", "-----BEGIN PUBLIC KEY-----\\nabc\\n-----END PUBLIC KEY-----"),
        ])
        .unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.auth_algorithm, Algorithm::RS256);
        assert_eq!(config.access_token_leeway_seconds, 0);
        assert_eq!(config.auth_resource, "*");
        assert_eq!(config.auth_audience, None);
        assert!(config.jwks.is_none());
        assert_eq!(
            config.auth_public_key_pem.as_deref(),
            Some("-----BEGIN PUBLIC KEY-----\nabc\n-----END PUBLIC KEY-----")
        );
    }

    #[test]
    fn jwks_settings() {
        let config = load(&[
            ("AUTH_ISSUER", "https://issuer.example.com/"),
            ("AUTH_AUDIENCE", "https://api.example.com"),
            ("AUTH_JWKS_URL", "https://issuer.example.com/.well-known/jwks.json"),
            ("JWKS_REFRESH_SECONDS", "60"),
            ("JWKS_FETCH_RETRIES", "4"),
            ("APP_ENV", "prod"),
        ])
        .unwrap();

        let jwks = config.jwks.unwrap();
        assert_eq!(jwks.refresh_interval, Duration::from_secs(60));
        assert_eq!(jwks.fetch_timeout, Duration::from_secs(5));
        assert_eq!(jwks.fetch_retries, 4);
        assert!(config.app_env.is_production());
        assert_eq!(config.auth_audience.as_deref(), Some("https://api.example.com"));
    }

    #[test]
    fn issuer_is_required() {
        assert_eq!(
            load(&[("AUTH_PUBLIC_KEY_PEM", "pem")]).unwrap_err(),
            ConfigError::Missing("AUTH_ISSUER")
        );
    }

    #[test]
    fn trust_material_is_required() {
        assert_eq!(
            load(&[("AUTH_ISSUER", "iss"), ("AUTH_PUBLIC_KEY_PEM", "  ")]).unwrap_err(),
            ConfigError::Missing("AUTH_PUBLIC_KEY_PEM or AUTH_JWKS_URL")
        );
    }

    #[test]
    fn symmetric_algorithms_are_refused() {
        for alg in ["HS256", "HS384", "HS512"] {
            assert_eq!(
                load(&[
                    ("AUTH_ISSUER", "iss"),
                    ("AUTH_PUBLIC_KEY_PEM", "pem"),
                    ("AUTH_ALGORITHM", alg),
                ])
                .unwrap_err(),
                ConfigError::Invalid("AUTH_ALGORITHM")
            );
        }
    }

    #[test]
    fn unknown_algorithm_and_bad_numbers() {
        let base = [("AUTH_ISSUER", "iss"), ("AUTH_PUBLIC_KEY_PEM", "pem")];

        let mut vars = base.to_vec();
        vars.push(("AUTH_ALGORITHM", "none"));
        assert_eq!(load(&vars).unwrap_err(), ConfigError::Invalid("AUTH_ALGORITHM"));

        let mut vars = base.to_vec();
        vars.push(("ACCESS_TOKEN_LEEWAY_SECONDS", "-1"));
        assert_eq!(
            load(&vars).unwrap_err(),
            ConfigError::Invalid("ACCESS_TOKEN_LEEWAY_SECONDS")
        );
    }

    #[test]
    fn jwks_url_must_be_http() {
        assert_eq!(
            load(&[
                ("AUTH_ISSUER", "iss"),
                ("AUTH_JWKS_URL", "file:///etc/jwks.json"),
            ])
            .unwrap_err(),
            ConfigError::Invalid("AUTH_JWKS_URL")
        );
        assert_eq!(
            load(&[
                ("AUTH_ISSUER", "iss"),
                ("AUTH_JWKS_URL", "https://issuer.example.com/jwks"),
                ("JWKS_REFRESH_SECONDS", "0"),
            ])
            .unwrap_err(),
            ConfigError::Invalid("JWKS_REFRESH_SECONDS")
        );
    }
}
