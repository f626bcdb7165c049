//! Supabase (`PostgREST`) snippet store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::SnippetStore;
use crate::auth::AuthUser;
use crate::config::ClientConfig;
use crate::error::{StoreError, StoreResult};
use crate::models::{Category, Language, OwnerId, Snippet, SnippetId, UnknownVariant};
use crate::util::{compact_text, normalize_text_option};
use crate::validation::{ValidatedPatch, ValidatedSnippet};

const SNIPPETS_TABLE: &str = "snippets";
const USERS_TABLE: &str = "users";

/// Snippet store backed by the project's `snippets` table
#[derive(Clone)]
pub struct SupabaseSnippetStore {
    rest_url: String,
    anon_key: String,
    access_token: Option<String>,
    client: Client,
}

impl std::fmt::Debug for SupabaseSnippetStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SupabaseSnippetStore")
            .field("rest_url", &self.rest_url)
            .field("anon_key", &"[REDACTED]")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish_non_exhaustive()
    }
}

impl SupabaseSnippetStore {
    /// Build a store for `config`; without an access token every call is
    /// answered with [`StoreError::Unauthorized`].
    pub fn new(config: &ClientConfig, access_token: Option<String>) -> StoreResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|error| StoreError::Unknown(format!("Failed to build HTTP client: {error}")))?;
        Ok(Self {
            rest_url: config.rest_url(),
            anon_key: config.supabase_anon_key.clone(),
            access_token: normalize_text_option(access_token),
            client,
        })
    }

    /// Insert the account row for `user` unless it already exists.
    pub async fn ensure_user_record(&self, user: &AuthUser) -> StoreResult<()> {
        let body = serde_json::json!({
            "id": user.id,
            "email": user.email.clone().unwrap_or_default(),
        });
        let request = self
            .authorized(self.client.post(self.table_url(USERS_TABLE)))?
            .header("Prefer", "resolution=ignore-duplicates,return=minimal")
            .json(&body);

        send(request).await?;
        tracing::debug!(user_id = %user.id, "User record ensured");
        Ok(())
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.rest_url)
    }

    fn authorized(&self, request: RequestBuilder) -> StoreResult<RequestBuilder> {
        let token = self.access_token.as_ref().ok_or(StoreError::Unauthorized)?;
        Ok(request
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .header("Accept", "application/json"))
    }

    fn targeted(
        &self,
        request: RequestBuilder,
        owner: &OwnerId,
        id: &SnippetId,
    ) -> StoreResult<RequestBuilder> {
        Ok(self
            .authorized(request)?
            .query(&[
                ("id", format!("eq.{id}")),
                ("user_id", format!("eq.{owner}")),
            ])
            .header("Prefer", "return=representation"))
    }
}

#[async_trait]
impl SnippetStore for SupabaseSnippetStore {
    async fn list_by_owner(&self, owner: &OwnerId) -> StoreResult<Vec<Snippet>> {
        tracing::debug!(owner = %owner, "Listing snippets");
        let request = self
            .authorized(self.client.get(self.table_url(SNIPPETS_TABLE)))?
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{owner}")),
                ("order", "created_at.desc".to_string()),
            ]);
        let rows = json_rows::<SnippetRow>(send(request).await?).await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                match Snippet::try_from(row) {
                    Ok(snippet) => Some(snippet),
                    Err(error) => {
                        tracing::warn!(snippet_id = %id, "Skipping stored snippet: {}", error);
                        None
                    }
                }
            })
            .collect())
    }

    async fn insert(&self, owner: &OwnerId, input: &ValidatedSnippet) -> StoreResult<Snippet> {
        let body = InsertBody {
            title: &input.title,
            description: input.description.as_deref(),
            code: &input.code,
            language: input.language,
            category: input.category,
            user_id: owner.as_str(),
        };
        let request = self
            .authorized(self.client.post(self.table_url(SNIPPETS_TABLE)))?
            .header("Prefer", "return=representation")
            .json(&[body]);

        let row = json_rows::<SnippetRow>(send(request).await?)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Unknown("Insert returned no row".to_string()))?;
        Snippet::try_from(row).map_err(|error| StoreError::Unknown(error.to_string()))
    }

    async fn update_by_id(&self, owner: &OwnerId, patch: &ValidatedPatch) -> StoreResult<()> {
        let url = self.table_url(SNIPPETS_TABLE);
        let request = if patch.is_empty() {
            // Nothing to write; only confirm the row is there.
            self.targeted(self.client.get(url), owner, &patch.id)?
                .query(&[("select", "id")])
        } else {
            self.targeted(self.client.patch(url), owner, &patch.id)?
                .json(&UpdateBody::from(patch))
        };
        expect_target(send(request).await?, &patch.id).await
    }

    async fn delete_by_id(&self, owner: &OwnerId, id: &SnippetId) -> StoreResult<()> {
        let request = self.targeted(self.client.delete(self.table_url(SNIPPETS_TABLE)), owner, id)?;
        expect_target(send(request).await?, id).await
    }
}

#[derive(Debug, Deserialize)]
struct SnippetRow {
    id: SnippetId,
    title: String,
    description: Option<String>,
    code: String,
    language: String,
    category: String,
    user_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SnippetRow> for Snippet {
    type Error = UnknownVariant;

    fn try_from(row: SnippetRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: row.title,
            description: normalize_text_option(row.description),
            code: row.code,
            language: row.language.parse::<Language>()?,
            category: row.category.parse::<Category>()?,
            owner_id: OwnerId::new(row.user_id),
            created_at: row.created_at,
            updated_at: row.updated_at.max(row.created_at),
        })
    }
}

#[derive(Debug, Serialize)]
struct InsertBody<'a> {
    title: &'a str,
    description: Option<&'a str>,
    code: &'a str,
    language: Language,
    category: Category,
    user_id: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<Option<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<Category>,
}

impl<'a> From<&'a ValidatedPatch> for UpdateBody<'a> {
    fn from(patch: &'a ValidatedPatch) -> Self {
        Self {
            title: patch.title.as_deref(),
            description: patch.description.as_ref().map(Option::as_deref),
            code: patch.code.as_deref(),
            language: patch.language,
            category: patch.category,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
    error: Option<String>,
}

async fn send(request: RequestBuilder) -> StoreResult<Response> {
    let response = request.send().await.map_err(transport_error)?;
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}

async fn json_rows<T: DeserializeOwned>(response: Response) -> StoreResult<Vec<T>> {
    response.json::<Vec<T>>().await.map_err(transport_error)
}

/// A targeted write must echo back at least one row, otherwise the id was
/// absent or belongs to someone else.
async fn expect_target(response: Response, id: &SnippetId) -> StoreResult<()> {
    let rows = json_rows::<serde_json::Value>(response).await?;
    if rows.is_empty() {
        Err(StoreError::NotFound(id.to_string()))
    } else {
        Ok(())
    }
}

fn transport_error(error: reqwest::Error) -> StoreError {
    if error.is_decode() {
        StoreError::Unknown(format!("Invalid store response: {error}"))
    } else {
        StoreError::Network(error.to_string())
    }
}

fn status_error(status: StatusCode, body: &str) -> StoreError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized,
        StatusCode::NOT_FOUND => StoreError::NotFound(parse_api_error(status, body)),
        _ => StoreError::Unknown(parse_api_error(status, body)),
    }
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<PostgrestErrorBody>(body) {
        if let Some(message) = payload
            .message
            .or(payload.error)
            .or(payload.details)
            .or(payload.hint)
        {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
