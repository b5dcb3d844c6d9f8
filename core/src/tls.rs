//! TLS material supplied with a request.
//!
//! Each of `cacert`, `cert` and `key` is either inline PEM text or a path
//! to a PEM file; inline text is recognised by its `-----BEGIN` armour.
//! Server verification is never disabled. A CA bundle replaces the default
//! trust roots, and client authentication needs both `cert` and `key`.

use std::borrow::Cow;
use std::fs;

use log::{debug, warn};
use serde::Deserialize;
use ureq::tls::{Certificate, ClientCert, PemItem, PrivateKey, RootCerts, TlsConfig};

use crate::error::TaskError;

const PEM_ARMOUR: &str = "-----BEGIN";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TlsOptions {
    #[serde(default)]
    pub cacert: Option<String>,
    #[serde(default)]
    pub cert: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

/// Where a piece of PEM material comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PemSource<'a> {
    Inline(&'a str),
    Path(&'a str),
}

impl<'a> PemSource<'a> {
    pub fn classify(value: &'a str) -> Self {
        if value.contains(PEM_ARMOUR) {
            PemSource::Inline(value)
        } else {
            PemSource::Path(value)
        }
    }

    fn read(&self, field: &'static str) -> Result<Cow<'a, [u8]>, TaskError> {
        match *self {
            PemSource::Inline(text) => Ok(Cow::Borrowed(text.as_bytes())),
            PemSource::Path(path) => fs::read(path)
                .map(Cow::Owned)
                .map_err(|e| TaskError::TlsConfig {
                    field,
                    reason: format!("cannot read {path}: {e}"),
                }),
        }
    }
}

impl TlsOptions {
    pub fn is_empty(&self) -> bool {
        self.cacert.is_none() && self.cert.is_none() && self.key.is_none()
    }

    /// Build the transport TLS configuration. Absent fields are skipped.
    pub fn to_ureq_config(&self) -> Result<TlsConfig, TaskError> {
        let mut builder = TlsConfig::builder().disable_verification(false);

        if let Some(cacert) = &self.cacert {
            let roots = load_certificates("cacert", cacert)?;
            debug!("using {} trust anchor(s) from cacert", roots.len());
            builder = builder.root_certs(RootCerts::new_with_certs(&roots));
        }

        match (&self.cert, &self.key) {
            (Some(cert), Some(key)) => {
                let chain = load_certificates("cert", cert)?;
                let key = load_private_key(key)?;
                builder = builder.client_cert(Some(ClientCert::new_with_certs(&chain, key)));
            }
            (Some(_), None) => warn!("cert given without key; skipping client authentication"),
            (None, Some(_)) => warn!("key given without cert; skipping client authentication"),
            (None, None) => {}
        }

        Ok(builder.build())
    }
}

fn load_certificates(
    field: &'static str,
    value: &str,
) -> Result<Vec<Certificate<'static>>, TaskError> {
    let pem = PemSource::classify(value).read(field)?;
    let mut certs = Vec::new();
    for item in ureq::tls::parse_pem(&pem) {
        let item = item.map_err(|e| TaskError::TlsConfig {
            field,
            reason: e.to_string(),
        })?;
        if let PemItem::Certificate(cert) = item {
            certs.push(cert.to_owned());
        }
    }
    if certs.is_empty() {
        return Err(TaskError::TlsConfig {
            field,
            reason: "no PEM certificate found".to_string(),
        });
    }
    Ok(certs)
}

fn load_private_key(value: &str) -> Result<PrivateKey<'static>, TaskError> {
    let pem = PemSource::classify(value).read("key")?;
    for item in ureq::tls::parse_pem(&pem) {
        let item = item.map_err(|e| TaskError::TlsConfig {
            field: "key",
            reason: e.to_string(),
        })?;
        if let PemItem::PrivateKey(key) = item {
            return Ok(key.to_owned());
        }
    }
    Err(TaskError::TlsConfig {
        field: "key",
        reason: "no PEM private key found".to_string(),
    })
}
