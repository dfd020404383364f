//! Schema registry client and subject lifecycle.
//!
//! Speaks the Confluent Schema Registry REST API: list subjects, soft and
//! permanent subject deletion, and schema registration.

use crate::error::{ProducerError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const CONTENT_TYPE: &str = "application/vnd.schemaregistry.v1+json";

/// Schema language of a registered subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    Avro,
    Protobuf,
}

impl SchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Avro => "AVRO",
            SchemaType::Protobuf => "PROTOBUF",
        }
    }
}

/// Registry operations needed to publish a fresh schema for a topic.
#[async_trait]
pub trait SchemaRegistry: Send + Sync {
    async fn subjects(&self) -> Result<Vec<String>>;

    /// Soft delete, or permanent delete of an already soft-deleted subject.
    async fn delete_subject(&self, subject: &str, permanent: bool) -> Result<()>;

    /// Register `schema` under `subject`, returning the schema id.
    async fn register(&self, subject: &str, schema: &str, schema_type: SchemaType) -> Result<u32>;
}

/// Subject under which a topic's record schema is registered.
pub fn record_subject(topic: &str) -> String {
    format!("{topic}_record")
}

/// Remove stale subjects for `topic`, then register `schema`.
///
/// Both the record subject and the registry's default `<topic>-value` subject
/// are deleted, soft first and then permanently.
pub async fn publish_schema(
    registry: &dyn SchemaRegistry,
    topic: &str,
    schema: &str,
    schema_type: SchemaType,
) -> Result<u32> {
    let subject = record_subject(topic);
    let stale = [subject.clone(), format!("{topic}-value")];

    for existing in registry.subjects().await? {
        if stale.iter().any(|s| s.eq_ignore_ascii_case(&existing)) {
            info!("Deleting schema subject '{}'", existing);
            registry.delete_subject(&existing, false).await?;
            registry.delete_subject(&existing, true).await?;
        }
    }

    debug!("Registering {} schema for '{}':\n{}", schema_type.as_str(), subject, schema);
    let id = registry.register(&subject, schema, schema_type).await?;
    info!("Registered schema subject '{}' with id {}", subject, id);
    Ok(id)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterSchemaRequest<'a> {
    schema: &'a str,
    schema_type: &'a str,
}

#[derive(Deserialize)]
struct RegisterSchemaResponse {
    id: u32,
}

/// [`SchemaRegistry`] over HTTP.
pub struct HttpSchemaRegistry {
    base_url: String,
    http_client: Client,
}

impl HttpSchemaRegistry {
    pub fn new(base_url: &str) -> Result<Self> {
        let http_client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    async fn execute_request(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
    ) -> Result<Response> {
        let mut request = self
            .http_client
            .request(method, url)
            .header("Content-Type", CONTENT_TYPE)
            .header("Accept", CONTENT_TYPE);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        Err(ProducerError::SchemaRegistry(format!(
            "{url} failed with status {status}: {error_text}"
        )))
    }
}

#[async_trait]
impl SchemaRegistry for HttpSchemaRegistry {
    async fn subjects(&self) -> Result<Vec<String>> {
        let url = format!("{}/subjects", self.base_url);
        let response = self.execute_request(Method::GET, &url, None).await?;
        Ok(response.json().await?)
    }

    async fn delete_subject(&self, subject: &str, permanent: bool) -> Result<()> {
        let mut url = format!("{}/subjects/{}", self.base_url, subject);
        if permanent {
            url.push_str("?permanent=true");
        }
        self.execute_request(Method::DELETE, &url, None).await?;
        Ok(())
    }

    async fn register(&self, subject: &str, schema: &str, schema_type: SchemaType) -> Result<u32> {
        let url = format!("{}/subjects/{}/versions", self.base_url, subject);
        let body = serde_json::to_string(&RegisterSchemaRequest {
            schema,
            schema_type: schema_type.as_str(),
        })?;
        let response = self.execute_request(Method::POST, &url, Some(body)).await?;
        let registered: RegisterSchemaResponse = response.json().await?;
        Ok(registered.id)
    }
}
