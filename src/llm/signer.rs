//! OCI API-key request signing (HTTP Signatures, `rsa-sha256`).

use super::GatewayError;
use crate::config::oci::OciProfile;
use base64::{ engine::general_purpose::STANDARD, Engine as _ };
use ring::rand::SystemRandom;
use ring::signature::{ RsaKeyPair, RSA_PKCS1_SHA256 };
use rustls_pemfile::private_key;
use rustls::pki_types::PrivateKeyDer;
use sha2::{ Digest, Sha256 };
use std::fs;
use url::Url;

pub const CONTENT_TYPE_JSON: &str = "application/json";
const SIGNED_HEADERS: &str = "date (request-target) host content-length content-type x-content-sha256";

pub struct RequestSigner {
    key_id: String,
    key_pair: RsaKeyPair,
    rng: SystemRandom,
}

/// Headers to attach to a signed request. `Host` and `Content-Length` are
/// signed but left for the HTTP client to emit.
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    pub date: String,
    pub content_sha256: String,
    pub authorization: String,
}

impl SignedHeaders {
    pub fn pairs(&self) -> [(&'static str, &str); 4] {
        [
            ("date", self.date.as_str()),
            ("x-content-sha256", self.content_sha256.as_str()),
            ("content-type", CONTENT_TYPE_JSON),
            ("authorization", self.authorization.as_str()),
        ]
    }
}

impl RequestSigner {
    pub fn from_profile(profile: &OciProfile) -> Result<Self, GatewayError> {
        if profile.pass_phrase.is_some() {
            return Err(
                GatewayError::Signing(
                    format!(
                        "encrypted key file '{}' is not supported; use an unencrypted API key",
                        profile.key_file.display()
                    )
                )
            );
        }
        let pem = fs
            ::read(&profile.key_file)
            .map_err(|e|
                GatewayError::Signing(
                    format!("failed to read key file '{}': {}", profile.key_file.display(), e)
                )
            )?;
        Self::from_pem(profile.key_id(), &pem)
    }

    pub fn from_pem(key_id: String, pem: &[u8]) -> Result<Self, GatewayError> {
        let key = private_key(&mut &pem[..])
            .map_err(|e| GatewayError::Signing(format!("failed to read PEM: {}", e)))?
            .ok_or_else(|| GatewayError::Signing("no unencrypted private key found in PEM".into()))?;

        let key_pair = (match &key {
            PrivateKeyDer::Pkcs8(der) => RsaKeyPair::from_pkcs8(der.secret_pkcs8_der()),
            PrivateKeyDer::Pkcs1(der) => RsaKeyPair::from_der(der.secret_pkcs1_der()),
            _ => {
                return Err(GatewayError::Signing("only RSA API keys are supported".into()));
            }
        }).map_err(|e| GatewayError::Signing(format!("rejected RSA key: {}", e)))?;

        Ok(Self {
            key_id,
            key_pair,
            rng: SystemRandom::new(),
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Signs a JSON `POST` of `body` to `url` at the given HTTP date.
    pub fn sign_post(&self, url: &Url, body: &[u8], date: &str) -> Result<SignedHeaders, GatewayError> {
        let content_sha256 = STANDARD.encode(Sha256::digest(body));
        let signing_string = format!(
            "date: {}\n(request-target): post {}\nhost: {}\ncontent-length: {}\ncontent-type: {}\nx-content-sha256: {}",
            date,
            request_target(url),
            host_header(url)?,
            body.len(),
            CONTENT_TYPE_JSON,
            content_sha256
        );

        let mut signature = vec![0u8; self.key_pair.public().modulus_len()];
        self.key_pair
            .sign(&RSA_PKCS1_SHA256, &self.rng, signing_string.as_bytes(), &mut signature)
            .map_err(|_| GatewayError::Signing("RSA signing failed".into()))?;

        let authorization = format!(
            "Signature version=\"1\",headers=\"{}\",keyId=\"{}\",algorithm=\"rsa-sha256\",signature=\"{}\"",
            SIGNED_HEADERS,
            self.key_id,
            STANDARD.encode(&signature)
        );

        Ok(SignedHeaders {
            date: date.to_string(),
            content_sha256,
            authorization,
        })
    }
}

/// RFC 7231 date as required by the `date` header.
pub fn http_date(now: chrono::DateTime<chrono::Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn request_target(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

fn host_header(url: &Url) -> Result<String, GatewayError> {
    let host = url
        .host_str()
        .ok_or_else(|| GatewayError::Signing(format!("endpoint '{}' has no host", url)))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
