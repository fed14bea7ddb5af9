use std::path::{Path, PathBuf};

use base64::Engine;
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ObjectifError, Result};

// ---------------------------------------------------------------------------
// Intuit endpoints
// ---------------------------------------------------------------------------

pub const AUTH_URL: &str = "https://appcenter.intuit.com/connect/oauth2";
pub const TOKEN_URL: &str = "https://oauth.platform.intuit.com/oauth2/v1/tokens/bearer";
pub const API_BASE: &str = "https://quickbooks.api.intuit.com";
pub const SANDBOX_API_BASE: &str = "https://sandbox-quickbooks.api.intuit.com";
pub const ACCOUNTING_SCOPE: &str = "com.intuit.quickbooks.accounting";

/// Redirect URI registered with the Intuit app. The flow is copy/paste:
/// the user authorizes in a browser, lands on this (dead) address and
/// pastes the full URL back into `objectif connect`.
pub const REDIRECT_URI: &str = "http://localhost:8501/";

pub fn api_base(environment: &str) -> &'static str {
    if environment == "production" {
        API_BASE
    } else {
        SANDBOX_API_BASE
    }
}

// ---------------------------------------------------------------------------
// Credentials file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub access_token: String,
    pub refresh_token: String,
    pub realm_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_expires_at: Option<String>,
}

pub fn credentials_path(data_dir: &Path) -> PathBuf {
    data_dir.join("credentials.json")
}

pub fn load_credentials(path: &Path) -> Result<Credentials> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ObjectifError::NotConnected(format!(
            "cannot read credentials file {} ({e}) — run `objectif connect` first",
            path.display()
        ))
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = std::fs::metadata(path) {
            let mode = meta.permissions().mode();
            if mode & 0o077 != 0 {
                eprintln!(
                    "warning: credentials file {} is accessible by others (mode {:o}), consider chmod 600",
                    path.display(),
                    mode & 0o777,
                );
            }
        }
    }

    serde_json::from_str(&content).map_err(|e| {
        ObjectifError::NotConnected(format!(
            "invalid credentials JSON in {} ({e}) — run `objectif connect` again",
            path.display()
        ))
    })
}

pub fn save_credentials(creds: &Credentials, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(creds)?;
    std::fs::write(path, format!("{json}\n"))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Authorization-code flow
// ---------------------------------------------------------------------------

/// Percent-encode a query-string value.
fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Browser URL that starts the consent flow.
pub fn authorization_url(client_id: &str, state: &str) -> String {
    format!(
        "{AUTH_URL}?client_id={}&response_type=code&scope={}&redirect_uri={}&state={}",
        urlencode(client_id),
        urlencode(ACCOUNTING_SCOPE),
        urlencode(REDIRECT_URI),
        urlencode(state),
    )
}

/// Pull the authorization code and realm ID out of the redirect URL the
/// user pasted back.
pub fn parse_redirect(url: &str) -> Result<(String, String)> {
    // Unwraps are safe: the patterns are literals.
    let code_re = Regex::new(r"[?&]code=([^&\s]+)").unwrap();
    let realm_re = Regex::new(r"[?&]realmId=([^&\s]+)").unwrap();

    let code = code_re
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ObjectifError::Auth("redirect URL has no code= parameter".to_string()))?;
    let realm_id = realm_re
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ObjectifError::Auth("redirect URL has no realmId= parameter".to_string()))?;

    Ok((code, realm_id))
}

/// Token fields returned by Intuit's bearer endpoint.
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_at: Option<String>,
    pub refresh_token_expires_at: Option<String>,
}

fn basic_auth(client_id: &str, client_secret: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD
        .encode(format!("{client_id}:{client_secret}"));
    format!("Basic {encoded}")
}

fn parse_token_response(body: serde_json::Value, fallback_refresh: Option<&str>) -> Result<TokenSet> {
    let access_token = body["access_token"]
        .as_str()
        .ok_or_else(|| ObjectifError::Auth("token response missing access_token".to_string()))?
        .to_string();

    let refresh_token = body["refresh_token"]
        .as_str()
        .or(fallback_refresh)
        .ok_or_else(|| ObjectifError::Auth("token response missing refresh_token".to_string()))?
        .to_string();

    let access_token_expires_at = body["expires_in"]
        .as_i64()
        .map(|secs| (Utc::now() + chrono::Duration::seconds(secs)).to_rfc3339());

    let refresh_token_expires_at = body["x_refresh_token_expires_in"].as_i64().map(|secs| {
        let expires = Utc::now() + chrono::Duration::seconds(secs);
        let days_left = (expires - Utc::now()).num_days();
        if days_left <= 30 {
            eprintln!(
                "warning: refresh token expires {}, re-authorize soon",
                expires.format("%Y-%m-%d"),
            );
        }
        expires.to_rfc3339()
    });

    Ok(TokenSet {
        access_token,
        refresh_token,
        access_token_expires_at,
        refresh_token_expires_at,
    })
}

fn token_error(body: &serde_json::Value, status: u16) -> String {
    body["error_description"]
        .as_str()
        .or_else(|| body["error"].as_str())
        .unwrap_or("unknown error")
        .to_string()
        + &format!(" (HTTP {status})")
}

/// Exchange an authorization code for the initial token set.
pub fn exchange_code(
    http: &reqwest::blocking::Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
) -> Result<TokenSet> {
    let resp = http
        .post(token_url)
        .header("Authorization", basic_auth(client_id, client_secret))
        .header("Accept", "application/json")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(format!(
            "grant_type=authorization_code&code={}&redirect_uri={}",
            urlencode(code),
            urlencode(REDIRECT_URI),
        ))
        .send()
        .map_err(|e| ObjectifError::Auth(format!("token exchange request failed: {e}")))?;

    let status = resp.status().as_u16();
    let body: serde_json::Value = resp.json().unwrap_or(serde_json::Value::Null);
    if status != 200 {
        return Err(ObjectifError::Auth(format!(
            "token exchange failed: {}",
            token_error(&body, status)
        )));
    }
    parse_token_response(body, None)
}

/// Trade the refresh token for a fresh access token. Returns updated
/// credentials; the caller decides where to persist them.
pub fn refresh_access_token(
    creds: &Credentials,
    http: &reqwest::blocking::Client,
    token_url: &str,
) -> Result<Credentials> {
    let resp = http
        .post(token_url)
        .header("Authorization", basic_auth(&creds.client_id, &creds.client_secret))
        .header("Accept", "application/json")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(format!(
            "grant_type=refresh_token&refresh_token={}",
            creds.refresh_token,
        ))
        .send()
        .map_err(|e| ObjectifError::Auth(format!("token refresh request failed: {e}")))?;

    let status = resp.status().as_u16();
    let body: serde_json::Value = resp.json().unwrap_or(serde_json::Value::Null);
    if status != 200 {
        return Err(ObjectifError::Auth(format!(
            "token refresh failed: {} — refresh token expired or revoked, run `objectif connect` to re-authorize",
            token_error(&body, status)
        )));
    }

    let tokens = parse_token_response(body, Some(&creds.refresh_token))?;
    Ok(Credentials {
        client_id: creds.client_id.clone(),
        client_secret: creds.client_secret.clone(),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        realm_id: creds.realm_id.clone(),
        access_token_expires_at: tokens.access_token_expires_at,
        refresh_token_expires_at: tokens
            .refresh_token_expires_at
            .or_else(|| creds.refresh_token_expires_at.clone()),
    })
}
