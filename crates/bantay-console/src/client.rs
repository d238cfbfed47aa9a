use crate::form::{ConfirmedAction, Draft};
use bantay_common::types::{CctvDevice, Contact, IotDevice, Location, PublicPost, Role, User};
use bantay_common::FieldErrors;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

/// Client-side API error. Validation rejections are not errors; they come
/// back as [`SubmitOutcome::Rejected`].
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} ({code}): {message}")]
    Server {
        status: u16,
        code: i32,
        message: String,
    },

    #[error("decode: {0}")]
    Decode(String),
}

/// How the server answered a create, replace or upload.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    Accepted(T),
    Rejected(FieldErrors),
}

/// A record type with its own collection under `/v1`.
pub trait Resource: DeserializeOwned {
    const PATH: &'static str;
}

impl Resource for Location {
    const PATH: &'static str = "/v1/locations";
}

impl Resource for CctvDevice {
    const PATH: &'static str = "/v1/cctv-devices";
}

impl Resource for Contact {
    const PATH: &'static str = "/v1/contacts";
}

impl Resource for IotDevice {
    const PATH: &'static str = "/v1/iot-devices";
}

impl Resource for PublicPost {
    const PATH: &'static str = "/v1/posts";
}

impl Resource for User {
    const PATH: &'static str = "/v1/users";
}

#[derive(Deserialize)]
struct Envelope {
    err_code: i32,
    err_msg: String,
    #[serde(default)]
    data: Value,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: usize,
    pub offset: usize,
}

/// Query string of a list request.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pairs: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(self, term: &str) -> Self {
        self.filter("search", term)
    }

    /// Adds `key=value`; blank values are left out.
    pub fn filter(mut self, key: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        if !value.trim().is_empty() {
            self.pairs.push((key.to_string(), value));
        }
        self
    }

    pub fn archived(self, archived: bool) -> Self {
        self.filter("archived", archived)
    }

    pub fn page(self, limit: usize, offset: usize) -> Self {
        self.filter("limit", limit).filter("offset", offset)
    }
}

/// HTTP client for the console API.
#[derive(Debug, Clone)]
pub struct ConsoleClient {
    http: reqwest::Client,
    base_url: String,
}

impl ConsoleClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn envelope(resp: reqwest::Response) -> Result<(StatusCode, Envelope), ConsoleError> {
        let status = resp.status();
        let bytes = resp.bytes().await?;
        let envelope = serde_json::from_slice::<Envelope>(&bytes)
            .map_err(|e| ConsoleError::Decode(format!("HTTP {status} body: {e}")))?;
        Ok((status, envelope))
    }

    fn decode<T: DeserializeOwned>(data: Value) -> Result<T, ConsoleError> {
        serde_json::from_value(data).map_err(|e| ConsoleError::Decode(format!("response data: {e}")))
    }

    fn server_error(status: StatusCode, envelope: Envelope) -> ConsoleError {
        ConsoleError::Server {
            status: status.as_u16(),
            code: envelope.err_code,
            message: envelope.err_msg,
        }
    }

    /// Unwraps `data`, mapping non-2xx envelopes to [`ConsoleError::Server`].
    async fn data<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ConsoleError> {
        let (status, envelope) = Self::envelope(resp).await?;
        if !status.is_success() {
            return Err(Self::server_error(status, envelope));
        }
        Self::decode(envelope.data)
    }

    /// Like [`Self::data`], but a 422 becomes [`SubmitOutcome::Rejected`].
    async fn outcome<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<SubmitOutcome<T>, ConsoleError> {
        let (status, envelope) = Self::envelope(resp).await?;
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let errors = envelope
                .data
                .get("errors")
                .cloned()
                .unwrap_or(Value::Null);
            return Ok(SubmitOutcome::Rejected(Self::decode(errors)?));
        }
        if !status.is_success() {
            return Err(Self::server_error(status, envelope));
        }
        Ok(SubmitOutcome::Accepted(Self::decode(envelope.data)?))
    }

    pub async fn list<R: Resource>(&self, query: &ListQuery) -> Result<Page<R>, ConsoleError> {
        tracing::debug!(path = R::PATH, "list");
        let resp = self
            .http
            .get(self.url(R::PATH))
            .query(&query.pairs)
            .send()
            .await?;
        Self::data(resp).await
    }

    pub async fn get<R: Resource>(&self, id: &str) -> Result<R, ConsoleError> {
        let resp = self
            .http
            .get(self.url(&format!("{}/{id}", R::PATH)))
            .send()
            .await?;
        Self::data(resp).await
    }

    pub async fn create<R: Resource>(
        &self,
        draft: &Draft,
    ) -> Result<SubmitOutcome<R>, ConsoleError> {
        tracing::debug!(path = R::PATH, "create");
        let resp = self.http.post(self.url(R::PATH)).json(draft).send().await?;
        Self::outcome(resp).await
    }

    /// Sends the whole draft as the new state of record `id`.
    pub async fn replace<R: Resource>(
        &self,
        id: &str,
        draft: &Draft,
    ) -> Result<SubmitOutcome<R>, ConsoleError> {
        tracing::debug!(path = R::PATH, id, "replace");
        let resp = self
            .http
            .put(self.url(&format!("{}/{id}", R::PATH)))
            .json(draft)
            .send()
            .await?;
        Self::outcome(resp).await
    }

    /// Archives or restores a record the user confirmed.
    pub async fn apply<R: Resource>(&self, confirmed: &ConfirmedAction) -> Result<R, ConsoleError> {
        let path = format!(
            "{}/{}/{}",
            R::PATH,
            confirmed.id(),
            confirmed.action().verb()
        );
        tracing::debug!(path = %path, "archive action");
        let resp = self
            .http
            .post(self.url(&path))
            .json(&json!({"confirm": true}))
            .send()
            .await?;
        Self::data(resp).await
    }

    pub async fn roles(&self) -> Result<Vec<Role>, ConsoleError> {
        let resp = self.http.get(self.url("/v1/roles")).send().await?;
        Self::data(resp).await
    }

    pub async fn upload_post_image(
        &self,
        post_id: &str,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<SubmitOutcome<PublicPost>, ConsoleError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = reqwest::multipart::Form::new().part("image", part);
        let resp = self
            .http
            .post(self.url(&format!("{}/{post_id}/image", PublicPost::PATH)))
            .multipart(form)
            .send()
            .await?;
        Self::outcome(resp).await
    }
}
