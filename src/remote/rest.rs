//! PostgREST-style HTTP client for the hosted record store.
//!
//! Speaks the conventions of a Supabase-like REST endpoint:
//! `/rest/v1/<table>` with `column=eq.value` filters, `apikey` and bearer
//! headers, and `Prefer: return=representation` to get written rows back.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::error::{RemoteError, RemoteResult};
use super::rows::RemoteRecord;
use super::RemoteStore;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the hosted backend.
///
/// Both `url` and `anon_key` are required for the backend to count as
/// configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Public (anon) API key sent as `apikey`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl RemoteSettings {
    /// True when both the URL and the API key are present and non-empty.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.url) && present(&self.anon_key)
    }
}

#[derive(Debug, Clone)]
struct Endpoint {
    base_url: String,
    api_key: String,
}

/// Error body returned by PostgREST.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    details: Option<String>,
}

/// HTTP-backed [`RemoteStore`].
///
/// Built from possibly incomplete settings; when unconfigured every call
/// fails with [`RemoteError::NotConfigured`].
#[derive(Debug, Clone)]
pub struct RestRemoteStore {
    client: reqwest::Client,
    endpoint: Option<Endpoint>,
    access_token: Option<String>,
}

impl RestRemoteStore {
    /// Create a client from settings.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Transport` if the HTTP client cannot be built.
    pub fn new(settings: &RemoteSettings) -> RemoteResult<Self> {
        let timeout = settings.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;

        let endpoint = if settings.is_configured() {
            match (&settings.url, &settings.anon_key) {
                (Some(url), Some(key)) => Some(Endpoint {
                    base_url: url.trim_end_matches('/').to_string(),
                    api_key: key.clone(),
                }),
                _ => None,
            }
        } else {
            None
        };

        Ok(Self {
            client,
            endpoint,
            access_token: None,
        })
    }

    /// Use a user access token for the `Authorization` header instead of
    /// the API key.
    #[must_use]
    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token.filter(|t| !t.is_empty());
        self
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    fn request<R: RemoteRecord>(&self, method: Method) -> RemoteResult<RequestBuilder> {
        let endpoint = self.endpoint.as_ref().ok_or(RemoteError::NotConfigured)?;
        let url = format!("{}/rest/v1/{}", endpoint.base_url, R::KIND.table());
        let bearer = self.access_token.as_deref().unwrap_or(&endpoint.api_key);

        debug!(%method, %url, "Remote request");
        Ok(self
            .client
            .request(method, url)
            .header("apikey", &endpoint.api_key)
            .header("Authorization", format!("Bearer {bearer}")))
    }

    async fn insert<R: RemoteRecord>(&self, record: &R, owner_id: &str) -> RemoteResult<R> {
        let row = record.to_row(owner_id)?;
        let response = self
            .request::<R>(Method::POST)?
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let rows: Vec<Value> = check(response).await?.json().await?;

        match rows.into_iter().next() {
            Some(row) => R::from_row(row),
            None => {
                let mut stored = record.clone();
                stored.set_owner_id(Some(owner_id.to_string()));
                Ok(stored)
            }
        }
    }
}

/// Turn a non-success response into a `RemoteError` carrying the
/// backend's message.
async fn check(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(ErrorBody {
            message: Some(message),
            details,
        }) => match details {
            Some(details) if !details.is_empty() => format!("{message} ({details})"),
            _ => message,
        },
        _ if text.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
        _ => text,
    };

    Err(RemoteError::from_status(status.as_u16(), message))
}

impl RemoteStore for RestRemoteStore {
    async fn fetch_all<R: RemoteRecord>(&self, owner_id: &str) -> RemoteResult<Vec<R>> {
        let owner_filter = format!("eq.{owner_id}");
        let response = self
            .request::<R>(Method::GET)?
            .query(&[
                ("select", "*"),
                ("user_id", owner_filter.as_str()),
                ("order", "date.desc"),
            ])
            .send()
            .await?;
        let rows: Vec<Value> = check(response).await?.json().await?;

        let mut records = rows
            .into_iter()
            .map(R::from_row)
            .collect::<RemoteResult<Vec<_>>>()?;
        records.sort_by(|a, b| b.date().cmp(&a.date()));

        debug!(kind = %R::KIND, count = records.len(), "Fetched remote records");
        Ok(records)
    }

    async fn upsert<R: RemoteRecord>(&self, record: &R, owner_id: &str) -> RemoteResult<R> {
        if record.id().is_empty() {
            return self.insert(record, owner_id).await;
        }

        let id_filter = format!("eq.{}", record.id());
        let owner_filter = format!("eq.{owner_id}");
        let row = record.to_row(owner_id)?;
        let response = self
            .request::<R>(Method::PATCH)?
            .query(&[("id", id_filter.as_str()), ("user_id", owner_filter.as_str())])
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let rows: Vec<Value> = check(response).await?.json().await?;

        match rows.into_iter().next() {
            Some(row) => R::from_row(row),
            // No row matched: the id is unknown remotely.
            None => self.insert(record, owner_id).await,
        }
    }

    async fn delete<R: RemoteRecord>(&self, id: &str, owner_id: &str) -> RemoteResult<()> {
        let id_filter = format!("eq.{id}");
        let owner_filter = format!("eq.{owner_id}");
        let response = self
            .request::<R>(Method::DELETE)?
            .query(&[("id", id_filter.as_str()), ("user_id", owner_filter.as_str())])
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn bulk_insert<R: RemoteRecord>(&self, records: &[R]) -> RemoteResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let rows = records
            .iter()
            .map(|r| {
                let owner = r.owner_id().ok_or_else(|| {
                    RemoteError::Decode(format!("{} {} has no owner", R::KIND, r.id()))
                })?;
                r.to_row(owner)
            })
            .collect::<RemoteResult<Vec<_>>>()?;

        let response = self
            .request::<R>(Method::POST)?
            .header("Prefer", "return=minimal")
            .json(&rows)
            .send()
            .await?;
        check(response).await?;

        debug!(kind = %R::KIND, count = records.len(), "Bulk inserted remote records");
        Ok(())
    }
}
