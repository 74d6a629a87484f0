use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so parsing can be exercised
    /// without mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = match lookup("APP_HOST") {
            Some(v) => v
                .parse::<IpAddr>()
                .with_context(|| format!("APP_HOST is not an IP address: {v}"))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let port = match lookup("APP_PORT") {
            Some(v) => v
                .parse::<u16>()
                .with_context(|| format!("APP_PORT is not a port number: {v}"))?,
            None => 8080,
        };

        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is not set")?;
        let max_connections = lookup("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let secret = lookup("JWT_SECRET").context("JWT_SECRET is not set")?;
        anyhow::ensure!(!secret.trim().is_empty(), "JWT_SECRET must not be empty");

        let jwt = JwtConfig {
            secret,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "recipebook".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "recipebook-users".into()),
            ttl_minutes: lookup("JWT_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(20),
        };
        Ok(Self {
            host,
            port,
            database_url,
            max_connections,
            jwt,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_keys_missing() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/recipes"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .expect("config should load");
        assert_eq!(cfg.max_connections, 10);
        assert_eq!(cfg.jwt.ttl_minutes, 20);
        assert_eq!(cfg.jwt.issuer, "recipebook");
        assert_eq!(cfg.jwt.audience, "recipebook-users");
        assert_eq!(cfg.bind_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn overrides_are_honoured() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/recipes"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_TTL_MINUTES", "5"),
            ("DB_MAX_CONNECTIONS", "3"),
            ("APP_HOST", "127.0.0.1"),
            ("APP_PORT", "9000"),
        ]))
        .expect("config should load");
        assert_eq!(cfg.jwt.ttl_minutes, 5);
        assert_eq!(cfg.max_connections, 3);
        assert_eq!(cfg.bind_addr().to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn bad_listen_address_is_an_error() {
        let base = [("DATABASE_URL", "postgres://db"), ("JWT_SECRET", "s3cret")];

        let err = AppConfig::from_lookup(lookup_from(&[base[0], base[1], ("APP_PORT", "http")]))
            .unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));

        let err = AppConfig::from_lookup(lookup_from(&[base[0], base[1], ("APP_HOST", "::zz")]))
            .unwrap_err();
        assert!(err.to_string().contains("APP_HOST"));
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db")]))
            .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn blank_secret_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("JWT_SECRET", "   "),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }
}
