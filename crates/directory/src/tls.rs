//! TLS trust setup for directory connections

use authgate_core::{Error, Result};
use native_tls::{Certificate, TlsConnector};
use std::path::Path;

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

/// Build the connector used for `ldaps://` and StartTLS.
///
/// With CA files configured, only the certificates they contain are
/// trusted; otherwise the platform roots are. `skip_verify` turns off all
/// peer verification and is meant for test directories only.
pub fn build_connector<P: AsRef<Path>>(root_ca_files: &[P], skip_verify: bool) -> Result<TlsConnector> {
    let mut builder = TlsConnector::builder();

    if !root_ca_files.is_empty() {
        for cert in read_bundle(root_ca_files)? {
            builder.add_root_certificate(cert);
        }
        builder.disable_built_in_roots(true);
    }

    if skip_verify {
        tracing::warn!("directory certificate verification is disabled");
        builder
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true);
    }

    builder
        .build()
        .map_err(|e| Error::tls(format!("cannot build TLS connector: {e}")))
}

/// Read every certificate from every file, in order
pub fn read_bundle<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Certificate>> {
    let mut certs = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::file_system(path, "read CA file", e))?;

        let blocks = split_pem(&text);
        if blocks.is_empty() {
            return Err(Error::tls(format!(
                "no certificates found in '{}'",
                path.display()
            )));
        }

        for block in blocks {
            let cert = Certificate::from_pem(block.as_bytes()).map_err(|e| {
                Error::tls(format!("invalid certificate in '{}': {e}", path.display()))
            })?;
            certs.push(cert);
        }
    }
    Ok(certs)
}

/// Split a PEM bundle into one string per certificate block
pub fn split_pem(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(PEM_BEGIN) {
        let Some(len) = rest[start..].find(PEM_END) else {
            break;
        };
        let end = start + len + PEM_END.len();
        blocks.push(&rest[start..end]);
        rest = &rest[end..];
    }

    blocks
}
