use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsFiles;

/// Make aws-lc-rs the process-wide rustls provider.
///
/// Both the HTTPS listener and the wallet API client build rustls configs
/// from the process default, so this must run before either. Safe to call
/// more than once.
pub fn install_crypto_provider() {
    if rustls::crypto::CryptoProvider::get_default().is_some() {
        return;
    }
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        // Lost a race with another installer; whichever won is in place.
        tracing::debug!("rustls crypto provider was already installed");
    }
}

/// Load the listener's certificate chain and private key.
pub async fn load_server_config(files: &TlsFiles) -> std::io::Result<RustlsConfig> {
    install_crypto_provider();
    RustlsConfig::from_pem_file(&files.cert, &files.key).await
}
