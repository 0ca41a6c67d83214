//! Server settings loaded via OrthoConfig and the resolved server
//! configuration built from them.

use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use ecoswap::inbound::http::state::{DEFAULT_MAX_IMAGE_BYTES, UploadLimits};
use ecoswap::outbound::persistence::DbPool;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;
use zeroize::Zeroizing;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MEDIA_DIR: &str = "media";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";
const EPHEMERAL_SECRET_BYTES: usize = 32;

/// Settings read from `ECOSWAP_*` variables, config files and CLI flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ECOSWAP")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Falls back to `DATABASE_URL`; absent means in-memory
    /// stores.
    pub database_url: Option<String>,
    /// Directory holding uploaded images.
    pub media_dir: Option<PathBuf>,
    /// Base URL used when building media links.
    pub public_base_url: Option<String>,
    /// HS256 secret for bearer tokens.
    pub jwt_secret: Option<String>,
    /// Permit a random per-process token secret outside debug builds.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secret: bool,
    /// Upper bound on a single uploaded image, in bytes.
    pub max_image_bytes: Option<usize>,
}

impl AppSettings {
    /// Parse the bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address {raw}: {err}"),
            )
        })
    }

    /// Return the configured database URL, if any.
    pub fn database_url(&self) -> Option<String> {
        self.database_url
            .clone()
            .or_else(|| env::var("DATABASE_URL").ok())
            .filter(|url| !url.trim().is_empty())
    }

    pub fn media_dir(&self) -> &Path {
        self.media_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_MEDIA_DIR))
    }

    pub fn public_base_url(&self) -> &str {
        self.public_base_url
            .as_deref()
            .unwrap_or(DEFAULT_PUBLIC_BASE_URL)
    }

    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            max_image_bytes: self.max_image_bytes.unwrap_or(DEFAULT_MAX_IMAGE_BYTES),
            ..UploadLimits::default()
        }
    }

    /// Resolve the token signing secret.
    ///
    /// Debug builds, or `allow_ephemeral_secret`, fall back to a random
    /// secret; tokens then die with the process.
    ///
    /// # Errors
    /// Returns [`std::io::Error`] in release builds when no secret is set.
    pub fn jwt_secret(&self) -> std::io::Result<Zeroizing<Vec<u8>>> {
        match self.jwt_secret.as_deref().filter(|s| !s.is_empty()) {
            Some(secret) => Ok(Zeroizing::new(secret.as_bytes().to_vec())),
            None if cfg!(debug_assertions) || self.allow_ephemeral_secret => {
                warn!("using temporary token secret (dev only)");
                let bytes: [u8; EPHEMERAL_SECRET_BYTES] = rand::random();
                Ok(Zeroizing::new(bytes.to_vec()))
            }
            None => Err(std::io::Error::other(
                "ECOSWAP_JWT_SECRET must be set in release builds",
            )),
        }
    }
}

/// Resolved configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) media_dir: PathBuf,
    pub(crate) public_base_url: String,
    pub(crate) jwt_secret: Zeroizing<Vec<u8>>,
    pub(crate) limits: UploadLimits,
}

impl ServerConfig {
    /// Build a server configuration from loaded settings.
    ///
    /// # Errors
    /// Propagates bind address and secret resolution failures.
    pub fn from_settings(settings: &AppSettings) -> std::io::Result<Self> {
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            db_pool: None,
            media_dir: settings.media_dir().to_path_buf(),
            public_base_url: settings.public_base_url().to_owned(),
            jwt_secret: settings.jwt_secret()?,
            limits: settings.upload_limits(),
        })
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without a pool every store is served from memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}

#[cfg(test)]
mod tests {
    //! Settings parsing and defaults.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "ECOSWAP_BIND_ADDR",
        "ECOSWAP_DATABASE_URL",
        "ECOSWAP_MEDIA_DIR",
        "ECOSWAP_PUBLIC_BASE_URL",
        "ECOSWAP_JWT_SECRET",
        "ECOSWAP_ALLOW_EPHEMERAL_SECRET",
        "ECOSWAP_MAX_IMAGE_BYTES",
        "DATABASE_URL",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("ecoswap")]).expect("config should load")
    }

    fn cleared() -> Vec<(&'static str, Option<String>)> {
        VARS.iter().map(|name| (*name, None)).collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(cleared());

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert!(settings.database_url().is_none());
        assert_eq!(settings.media_dir(), Path::new("media"));
        assert_eq!(settings.public_base_url(), "http://localhost:8080");
        assert_eq!(settings.upload_limits(), UploadLimits::default());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let mut vars = cleared();
        vars.extend([
            ("ECOSWAP_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            ("ECOSWAP_MEDIA_DIR", Some("/srv/media".to_owned())),
            ("ECOSWAP_JWT_SECRET", Some("s3cret".to_owned())),
            ("ECOSWAP_MAX_IMAGE_BYTES", Some("1024".to_owned())),
        ]);
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("bind addr").port(),
            9000
        );
        assert_eq!(settings.media_dir(), Path::new("/srv/media"));
        assert_eq!(settings.jwt_secret().expect("secret").as_slice(), b"s3cret");
        assert_eq!(settings.upload_limits().max_image_bytes, 1024);
    }

    #[rstest]
    fn plain_database_url_is_a_fallback() {
        let mut vars = cleared();
        vars.push(("DATABASE_URL", Some("postgres://db/ecoswap".to_owned())));
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.database_url().as_deref(),
            Some("postgres://db/ecoswap")
        );
    }

    #[rstest]
    fn invalid_bind_address_is_rejected() {
        let mut vars = cleared();
        vars.push(("ECOSWAP_BIND_ADDR", Some("not-an-address".to_owned())));
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();
        assert!(settings.bind_addr().is_err());
    }

    #[cfg(debug_assertions)]
    #[rstest]
    fn missing_secret_is_ephemeral_in_debug_builds() {
        let _guard = lock_env(cleared());

        let settings = load_from_empty_args();
        let first = settings.jwt_secret().expect("secret");
        let second = settings.jwt_secret().expect("secret");
        assert_eq!(first.len(), 32);
        assert_ne!(first.as_slice(), second.as_slice());
    }
}
