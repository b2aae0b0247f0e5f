use coursehub_core::certificates::expiry::{
    DEFAULT_CERTIFICATE_VALIDITY_YEARS, MAX_CERTIFICATE_VALIDITY_YEARS,
};

/// Server configuration loaded from environment variables.
///
/// All fields except the certificate secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Certificate issuance and verification settings.
    pub certificates: CertificateConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    ///
    /// See [`CertificateConfig::from_env`] for the certificate settings.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let certificates = CertificateConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            certificates,
        }
    }
}

/// Certificate settings.
#[derive(Clone)]
pub struct CertificateConfig {
    /// Server secret mixed into every verification token.
    pub secret: String,
    /// Validity applied to courses without their own override.
    /// `None` makes such certificates non-expiring.
    pub default_validity_years: Option<u32>,
    /// Per-certificate download cap; `None` is unlimited.
    pub max_downloads: Option<i32>,
    /// Issue automatically when a progress update completes a course.
    pub auto_issue: bool,
    /// Public origin used to build absolute verification URLs.
    pub public_base_url: String,
}

impl CertificateConfig {
    /// Load certificate configuration from environment variables.
    ///
    /// | Env Var                              | Required | Default                 |
    /// |--------------------------------------|----------|-------------------------|
    /// | `CERTIFICATE_SECRET`                 | **yes**  | --                      |
    /// | `CERTIFICATE_DEFAULT_VALIDITY_YEARS` | no       | `2` (`0` = never)       |
    /// | `CERTIFICATE_MAX_DOWNLOADS`          | no       | unlimited               |
    /// | `CERTIFICATE_AUTO_ISSUE`             | no       | `true`                  |
    /// | `PUBLIC_BASE_URL`                    | no       | `http://localhost:3000` |
    ///
    /// # Panics
    ///
    /// Panics if `CERTIFICATE_SECRET` is missing or empty, or if any value
    /// fails to parse.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secret = lookup("CERTIFICATE_SECRET")
            .expect("CERTIFICATE_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "CERTIFICATE_SECRET must not be empty");

        let default_validity_years: u32 = lookup("CERTIFICATE_DEFAULT_VALIDITY_YEARS")
            .map(|v| {
                v.parse()
                    .expect("CERTIFICATE_DEFAULT_VALIDITY_YEARS must be a valid u32")
            })
            .unwrap_or(DEFAULT_CERTIFICATE_VALIDITY_YEARS);
        assert!(
            default_validity_years <= MAX_CERTIFICATE_VALIDITY_YEARS.unsigned_abs(),
            "CERTIFICATE_DEFAULT_VALIDITY_YEARS must be at most {MAX_CERTIFICATE_VALIDITY_YEARS}"
        );

        let max_downloads: Option<i32> = lookup("CERTIFICATE_MAX_DOWNLOADS")
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                v.trim()
                    .parse()
                    .expect("CERTIFICATE_MAX_DOWNLOADS must be a valid i32")
            });
        if let Some(max) = max_downloads {
            assert!(max >= 0, "CERTIFICATE_MAX_DOWNLOADS must not be negative");
        }

        let auto_issue: bool = lookup("CERTIFICATE_AUTO_ISSUE")
            .map(|v| v.parse().expect("CERTIFICATE_AUTO_ISSUE must be true or false"))
            .unwrap_or(true);

        let public_base_url =
            lookup("PUBLIC_BASE_URL").unwrap_or_else(|| "http://localhost:3000".into());

        Self {
            secret,
            default_validity_years: Some(default_validity_years).filter(|years| *years > 0),
            max_downloads,
            auto_issue,
            public_base_url,
        }
    }
}

impl std::fmt::Debug for CertificateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateConfig")
            .field("secret", &"<redacted>")
            .field("default_validity_years", &self.default_validity_years)
            .field("max_downloads", &self.max_downloads)
            .field("auto_issue", &self.auto_issue)
            .field("public_base_url", &self.public_base_url)
            .finish()
    }
}
