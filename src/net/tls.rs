//! TLS configuration and certificate loading.

use std::io;
use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;

/// Error type for TLS setup. Always fatal at startup.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("Certificate file not found: {}", .0.display())]
    CertNotFound(PathBuf),

    #[error("Private key file not found: {}", .0.display())]
    KeyNotFound(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No certificates found in {}", .0.display())]
    NoCertificates(PathBuf),

    #[error("No private key found in {}", .0.display())]
    NoPrivateKey(PathBuf),

    #[error("Invalid TLS configuration: {0}")]
    Config(#[source] io::Error),
}

/// Resolve a configured TLS path against the process root.
pub fn resolve_path(root: &Path, configured: &str) -> PathBuf {
    let path = Path::new(configured);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Make aws-lc-rs the process-wide rustls provider unless one is already set.
///
/// rustls refuses to pick a default when more than one provider is compiled in.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

/// Load TLS configuration from certificate and key files.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, TlsError> {
    install_crypto_provider();

    if !cert_path.exists() {
        return Err(TlsError::CertNotFound(cert_path.to_path_buf()));
    }
    if !key_path.exists() {
        return Err(TlsError::KeyNotFound(key_path.to_path_buf()));
    }

    let cert_pem = read(cert_path).await?;
    let key_pem = read(key_path).await?;

    let certs = rustls_pemfile::certs(&mut cert_pem.as_slice())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Read {
            path: cert_path.to_path_buf(),
            source,
        })?;
    if certs.is_empty() {
        return Err(TlsError::NoCertificates(cert_path.to_path_buf()));
    }

    let key = rustls_pemfile::private_key(&mut key_pem.as_slice()).map_err(|source| {
        TlsError::Read {
            path: key_path.to_path_buf(),
            source,
        }
    })?;
    if key.is_none() {
        return Err(TlsError::NoPrivateKey(key_path.to_path_buf()));
    }

    let config = RustlsConfig::from_pem(cert_pem, key_pem)
        .await
        .map_err(TlsError::Config)?;

    tracing::info!(
        cert = %cert_path.display(),
        key = %key_path.display(),
        certificates = certs.len(),
        "TLS certificate loaded"
    );
    Ok(config)
}

async fn read(path: &Path) -> Result<Vec<u8>, TlsError> {
    tokio::fs::read(path).await.map_err(|source| TlsError::Read {
        path: path.to_path_buf(),
        source,
    })
}
