use std::path::PathBuf;

use crate::auth::{self, Credentials};
use crate::error::{ObjectifError, Result};

/// QBO caps query pages at 1000 rows.
pub const QUERY_LIMIT: u32 = 1000;

/// Pull the human-readable message out of a QBO `Fault` response.
fn extract_qbo_error(body: &serde_json::Value, status: u16) -> String {
    body["Fault"]["Error"][0]["Detail"]
        .as_str()
        .or_else(|| body["Fault"]["Error"][0]["Message"].as_str())
        .or_else(|| body["fault"]["error"][0]["detail"].as_str())
        .or_else(|| body["message"].as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("HTTP {status}"))
}

/// Synchronous QuickBooks query client. One token-refresh retry on 401;
/// no other retry or backoff policy.
pub struct QboClient {
    http: reqwest::blocking::Client,
    access_token: String,
    realm_id: String,
    base_url: String,
    token_url: String,
    creds: Option<Credentials>,
    creds_path: Option<PathBuf>,
}

impl QboClient {
    pub fn from_credentials(creds: Credentials, path: PathBuf, environment: &str) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            access_token: creds.access_token.clone(),
            realm_id: creds.realm_id.clone(),
            base_url: auth::api_base(environment).to_string(),
            token_url: auth::TOKEN_URL.to_string(),
            creds: Some(creds),
            creds_path: Some(path),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(access_token: String, realm_id: String, base_url: String) -> Self {
        let token_url = format!("{base_url}/oauth2/v1/tokens/bearer");
        Self {
            http: reqwest::blocking::Client::new(),
            access_token,
            realm_id,
            base_url,
            token_url,
            creds: None,
            creds_path: None,
        }
    }

    #[cfg(test)]
    pub fn from_credentials_with_base_url(
        creds: Credentials,
        path: PathBuf,
        base_url: String,
    ) -> Self {
        let token_url = format!("{base_url}/oauth2/v1/tokens/bearer");
        Self {
            http: reqwest::blocking::Client::new(),
            access_token: creds.access_token.clone(),
            realm_id: creds.realm_id.clone(),
            base_url,
            token_url,
            creds: Some(creds),
            creds_path: Some(path),
        }
    }

    fn query_url(&self) -> String {
        format!("{}/v3/company/{}/query", self.base_url, self.realm_id)
    }

    fn get_query(&self, query: &str) -> Result<serde_json::Value> {
        let resp = self
            .http
            .get(self.query_url())
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .query(&[("query", query)])
            .send()?;

        let status = resp.status().as_u16();
        let body: serde_json::Value = resp.json().unwrap_or(serde_json::Value::Null);
        match status {
            200 => Ok(body),
            401 | 403 => Err(ObjectifError::Auth(format!(
                "QuickBooks auth failed ({status}): {}",
                extract_qbo_error(&body, status)
            ))),
            _ => Err(ObjectifError::Api(extract_qbo_error(&body, status))),
        }
    }

    fn try_refresh(&mut self) -> Result<()> {
        let creds = self.creds.as_ref().ok_or_else(|| {
            ObjectifError::Auth("cannot refresh token without a credentials file".to_string())
        })?;
        let new_creds = auth::refresh_access_token(creds, &self.http, &self.token_url)?;
        if let Some(path) = &self.creds_path {
            auth::save_credentials(&new_creds, path)?;
        }
        self.access_token = new_creds.access_token.clone();
        self.creds = Some(new_creds);
        Ok(())
    }

    /// Run a paginated QBO query and return all matching entities.
    ///
    /// `order_by` must give a deterministic order so pages don't overlap
    /// (e.g. "TxnDate ASC, Id ASC" for transactions, "Id ASC" for master
    /// data). A 401 triggers one token refresh and a retry of the page.
    pub fn query_entities(
        &mut self,
        entity_type: &str,
        where_clause: &str,
        order_by: &str,
    ) -> Result<Vec<serde_json::Value>> {
        let mut all = Vec::new();
        let mut start_pos = 1u32;
        let mut refreshed = false;

        loop {
            let query = format!(
                "SELECT * FROM {entity_type} WHERE {where_clause} ORDERBY {order_by} \
                 STARTPOSITION {start_pos} MAXRESULTS {QUERY_LIMIT}"
            );

            let body = match self.get_query(&query) {
                Ok(body) => body,
                Err(ObjectifError::Auth(_)) if !refreshed && self.creds.is_some() => {
                    self.try_refresh()?;
                    refreshed = true;
                    self.get_query(&query)?
                }
                Err(e) => return Err(e),
            };

            let entities = body["QueryResponse"][entity_type]
                .as_array()
                .cloned()
                .unwrap_or_default();
            let count = entities.len() as u32;
            all.extend(entities);

            if count < QUERY_LIMIT {
                break;
            }
            start_pos += count;
        }

        Ok(all)
    }
}
