use std::sync::Arc;

use coursehub_core::certificates::{CertificateIssuer, CertificateVerifier, VerificationSigner};
use coursehub_db::{DbPool, PgStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Certificate issuance service (also owns the progress tracker).
    pub issuer: Arc<CertificateIssuer<PgStore>>,
    /// Certificate verification service.
    pub verifier: Arc<CertificateVerifier<PgStore>>,
}

impl AppState {
    /// Wire the certificate services over `pool` using the configured secret.
    pub fn new(pool: DbPool, config: Arc<ServerConfig>) -> Self {
        let store = PgStore::new(pool.clone());
        let signer = VerificationSigner::new(config.certificates.secret.clone());
        let issuer = CertificateIssuer::new(
            store.clone(),
            signer.clone(),
            config.certificates.default_validity_years,
        );
        let verifier = CertificateVerifier::new(store, signer);

        Self {
            pool,
            config,
            issuer: Arc::new(issuer),
            verifier: Arc::new(verifier),
        }
    }

    /// Absolute origin for verification URLs.
    pub fn public_base_url(&self) -> &str {
        &self.config.certificates.public_base_url
    }
}
