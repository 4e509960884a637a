use anyhow::{Result, anyhow};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

pub const STORAGE_BUCKET: &str = "uploads";

/// Thin client over the PostgREST and Storage APIs of the backing store.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            service_key: config.supabase_service_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(value) = HeaderValue::from_str(&self.service_key) {
            headers.insert("apikey", value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Store calls run with the service key unless a caller token is forwarded
        let bearer = auth_token.unwrap_or(&self.service_key);
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", bearer)) {
            headers.insert(AUTHORIZATION, value);
        }

        headers
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    pub async fn request_with_headers<T>(&self, method: Method, path: &str,
                                         auth_token: Option<&str>, body: Option<Value>,
                                         extra_headers: Option<HeaderMap>)
                                         -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers(auth_token);
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                409 => anyhow!("Conflict: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Insert a row and return the stored representation.
    pub async fn insert<T>(&self, table: &str, row: Value) -> Result<T>
    where T: DeserializeOwned {
        let rows: Vec<T> = self.request_with_headers(
            Method::POST,
            &format!("/rest/v1/{}", table),
            None,
            Some(row),
            Some(Self::representation_headers()),
        ).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow!("Insert into {} returned no rows", table))
    }

    /// Patch rows matching `filter` (PostgREST syntax) and return the first updated row.
    pub async fn update<T>(&self, table: &str, filter: &str, changes: Value) -> Result<Option<T>>
    where T: DeserializeOwned {
        let rows: Vec<T> = self.request_with_headers(
            Method::PATCH,
            &format!("/rest/v1/{}?{}", table, filter),
            None,
            Some(changes),
            Some(Self::representation_headers()),
        ).await?;

        Ok(rows.into_iter().next())
    }

    /// Fetch rows from `table` using a PostgREST query string.
    pub async fn select<T>(&self, table: &str, query: &str) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let path = if query.is_empty() {
            format!("/rest/v1/{}", table)
        } else {
            format!("/rest/v1/{}?{}", table, query)
        };

        self.request(Method::GET, &path, None, None).await
    }

    pub async fn select_one<T>(&self, table: &str, query: &str) -> Result<Option<T>>
    where T: DeserializeOwned {
        let rows: Vec<T> = self.select(table, query).await?;
        Ok(rows.into_iter().next())
    }

    /// Delete matching rows, returning how many were removed.
    pub async fn delete(&self, table: &str, filter: &str) -> Result<usize> {
        let path = format!("/rest/v1/{}?{}", table, filter);
        let deleted: Vec<Value> = self
            .request_with_headers(Method::DELETE, &path, None, None, Some(Self::representation_headers()))
            .await?;
        Ok(deleted.len())
    }

    /// Upload raw bytes to the storage bucket, returning the object path.
    pub async fn upload_object(&self, object_path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, STORAGE_BUCKET, object_path);
        debug!("Uploading {} bytes to {}", bytes.len(), url);

        let mut headers = self.get_headers(None);
        if let Ok(value) = HeaderValue::from_str(content_type) {
            headers.insert(CONTENT_TYPE, value);
        }

        let response = self.client.post(&url)
            .headers(headers)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Storage upload failed ({}): {}", status, error_text);
            return Err(anyhow!("Storage upload failed ({}): {}", status, error_text));
        }

        Ok(format!("{}/{}", STORAGE_BUCKET, object_path))
    }

    fn representation_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }

    // Public URL for a stored object path such as "uploads/profiles/abc.png"
    pub fn get_public_url(&self, storage_path: &str) -> String {
        format!("{}/storage/v1/object/public/{}", self.base_url, storage_path)
    }
}
