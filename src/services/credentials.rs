//! Credentials for the Sheets API.
//!
//! Lookup order: a ready token in `GOOGLE_SHEETS_ACCESS_TOKEN`, a service
//! account in `GOOGLE_CLIENT_EMAIL` + `GOOGLE_PRIVATE_KEY`, then a JSON
//! credentials file. The file holds either a service-account key
//! (`client_email`, `private_key`, optional `token_uri`) or an `access_token`.
//! Parsed file contents are cached in the owning [`CredentialStore`] until the
//! file's modification time changes. Service accounts sign an RS256 assertion
//! and trade it for an access token, which is reused until shortly before it
//! expires.

use std::cell::RefCell;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_SHEETS_ACCESS_TOKEN";
pub const CLIENT_EMAIL_ENV: &str = "GOOGLE_CLIENT_EMAIL";
pub const PRIVATE_KEY_ENV: &str = "GOOGLE_PRIVATE_KEY";
pub const CREDENTIALS_PATH_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const DEFAULT_CREDENTIALS_PATH: &str = "keys.json";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Error, Debug)]
pub enum CredentialsError {
    #[error("credentials file not found: {0}")]
    Missing(PathBuf),
    #[error("failed to read credentials file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse credentials file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("credentials file {0} must contain client_email and private_key or an access_token")]
    Incomplete(PathBuf),
    #[error("failed to sign service account assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("failed to request access token: {0}")]
    TokenRequest(#[from] reqwest::Error),
    #[error("token endpoint rejected service account ({status}): {message}")]
    TokenRejected { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Keys pasted into env files often carry literal `\n` sequences.
    pub fn new(client_email: &str, private_key: &str, token_uri: Option<&str>) -> Self {
        Self {
            client_email: client_email.trim().to_string(),
            private_key: private_key.replace("\\n", "\n"),
            token_uri: token_uri.unwrap_or(DEFAULT_TOKEN_URI).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Credentials {
    AccessToken(String),
    ServiceAccount(ServiceAccountKey),
}

#[derive(Debug, Deserialize)]
struct CredentialsRecord {
    access_token: Option<String>,
    client_email: Option<String>,
    private_key: Option<String>,
    token_uri: Option<String>,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
    error_description: Option<String>,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedFile {
    modified: Option<SystemTime>,
    credentials: Credentials,
}

#[derive(Debug, Clone)]
struct MintedToken {
    key: ServiceAccountKey,
    token: String,
    expires_at: i64,
}

#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    env_credentials: Option<Credentials>,
    cached_file: RefCell<Option<CachedFile>>,
    minted: RefCell<Option<MintedToken>>,
}

impl CredentialStore {
    /// Store backed only by the credentials file at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            env_credentials: None,
            cached_file: RefCell::new(None),
            minted: RefCell::new(None),
        }
    }

    /// Store that honours the environment before falling back to the given
    /// path, then `GOOGLE_APPLICATION_CREDENTIALS`, then `keys.json`.
    pub fn from_env(configured_path: Option<&Path>) -> Self {
        let path = configured_path
            .map(Path::to_path_buf)
            .or_else(|| env::var(CREDENTIALS_PATH_ENV).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH));

        let mut store = Self::new(path);
        store.env_credentials = env::var(ACCESS_TOKEN_ENV)
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .map(Credentials::AccessToken)
            .or_else(|| {
                service_account_from_vars(env::var(CLIENT_EMAIL_ENV).ok(), env::var(PRIVATE_KEY_ENV).ok())
                    .map(Credentials::ServiceAccount)
            });
        store
    }

    /// Bearer token for the next request. Service accounts go through the
    /// token endpoint with `client` unless a minted token is still fresh.
    pub fn access_token(&self, client: &Client) -> Result<String, CredentialsError> {
        match self.credentials()? {
            Credentials::AccessToken(token) => Ok(token),
            Credentials::ServiceAccount(key) => self.service_account_token(client, &key),
        }
    }

    /// Drops the cached file contents and any minted token.
    pub fn invalidate(&self) {
        self.cached_file.borrow_mut().take();
        self.minted.borrow_mut().take();
    }

    fn credentials(&self) -> Result<Credentials, CredentialsError> {
        if let Some(credentials) = &self.env_credentials {
            return Ok(credentials.clone());
        }

        let modified = self.file_modified()?;
        if let Some(cached) = self.cached_file.borrow().as_ref() {
            if modified.is_some() && cached.modified == modified {
                return Ok(cached.credentials.clone());
            }
        }

        let credentials = load_credentials_from_file(&self.path)?;
        debug!(path = %self.path.display(), "loaded sheets credentials");
        *self.cached_file.borrow_mut() = Some(CachedFile {
            modified,
            credentials: credentials.clone(),
        });
        Ok(credentials)
    }

    fn service_account_token(&self, client: &Client, key: &ServiceAccountKey) -> Result<String, CredentialsError> {
        let now = Utc::now().timestamp();
        if let Some(minted) = self.minted.borrow().as_ref() {
            if &minted.key == key && minted.expires_at - EXPIRY_MARGIN_SECS > now {
                return Ok(minted.token.clone());
            }
        }

        let assertion = sign_assertion(key, now)?;
        let response = exchange_assertion(client, key, &assertion)?;
        info!(client_email = %key.client_email, "obtained service account access token");
        *self.minted.borrow_mut() = Some(MintedToken {
            key: key.clone(),
            token: response.access_token.clone(),
            expires_at: now + response.expires_in,
        });
        Ok(response.access_token)
    }

    fn file_modified(&self) -> Result<Option<SystemTime>, CredentialsError> {
        let metadata = fs::metadata(&self.path).map_err(|source| read_error(&self.path, source))?;
        Ok(metadata.modified().ok())
    }
}

/// Service account from the env var pair; both must be non-empty.
pub fn service_account_from_vars(client_email: Option<String>, private_key: Option<String>) -> Option<ServiceAccountKey> {
    let client_email = client_email.filter(|email| !email.trim().is_empty())?;
    let private_key = private_key.filter(|key| !key.trim().is_empty())?;
    Some(ServiceAccountKey::new(&client_email, &private_key, None))
}

/// Signed JWT asserting read-only Sheets access for `key`, valid for an hour
/// from `issued_at`.
pub fn sign_assertion(key: &ServiceAccountKey, issued_at: i64) -> Result<String, CredentialsError> {
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: SHEETS_READONLY_SCOPE,
        aud: &key.token_uri,
        iat: issued_at,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
    };
    Ok(jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)?)
}

fn exchange_assertion(
    client: &Client,
    key: &ServiceAccountKey,
    assertion: &str,
) -> Result<TokenResponse, CredentialsError> {
    debug!(token_uri = %key.token_uri, "exchanging service account assertion");
    let response = client
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion)])
        .send()?;

    let status = response.status();
    if !status.is_success() {
        let message = response
            .json::<TokenErrorBody>()
            .ok()
            .map(|body| match body.error_description {
                Some(description) => format!("{}: {description}", body.error),
                None => body.error,
            })
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(CredentialsError::TokenRejected {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json::<TokenResponse>()?)
}

fn load_credentials_from_file(path: &Path) -> Result<Credentials, CredentialsError> {
    let contents = fs::read_to_string(path).map_err(|source| read_error(path, source))?;
    let record: CredentialsRecord =
        serde_json::from_str(&contents).map_err(|source| CredentialsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let non_empty = |value: Option<String>| value.filter(|value| !value.trim().is_empty());
    if let (Some(email), Some(key)) = (non_empty(record.client_email), non_empty(record.private_key)) {
        let token_uri = non_empty(record.token_uri);
        return Ok(Credentials::ServiceAccount(ServiceAccountKey::new(
            &email,
            &key,
            token_uri.as_deref(),
        )));
    }

    non_empty(record.access_token)
        .map(|token| Credentials::AccessToken(token.trim().to_string()))
        .ok_or_else(|| CredentialsError::Incomplete(path.to_path_buf()))
}

fn read_error(path: &Path, source: io::Error) -> CredentialsError {
    if source.kind() == io::ErrorKind::NotFound {
        CredentialsError::Missing(path.to_path_buf())
    } else {
        CredentialsError::Read {
            path: path.to_path_buf(),
            source,
        }
    }
}
