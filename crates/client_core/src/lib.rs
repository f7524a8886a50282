use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::{Study, StudyId},
    protocol::{EndpointResponse, RestMethod, ServiceErrorBody, VersionHolder},
};
use tracing::{info, warn};
use url::Url;

pub mod access;
pub mod codes;
pub mod config;
pub mod editing;
pub mod error;
pub mod session;
pub mod validation;

pub use config::ClientSettings;
pub use editing::StudyEditingSession;
pub use error::ClientError;
pub use session::SessionContext;

pub const SESSION_HEADER: &str = "Bridge-Session";
const STUDIES_PATH: [&str; 2] = ["v5", "studies"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndpointTarget {
    #[default]
    Study,
    Synapse,
}

/// Persistence collaborator for the study editor.
#[async_trait]
pub trait StudyService: Send + Sync {
    /// `Ok(None)` when the service has no study with that id.
    async fn get_study(
        &self,
        session: &SessionContext,
        id: &StudyId,
    ) -> Result<Option<Study>, ClientError>;

    /// Returns the study as stored, with its new version.
    async fn save_study(
        &self,
        session: &SessionContext,
        study: &Study,
    ) -> Result<Study, ClientError>;
}

#[derive(Clone)]
pub struct StudyClient {
    http: Client,
    settings: ClientSettings,
}

impl StudyClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_seconds))
            .build()?;
        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// JSON call against the study or Synapse service.
    ///
    /// For GET the top-level fields of `data` become the query string and no
    /// body is sent. 2xx and 412 count as success; `ok` is false for 412.
    pub async fn call_endpoint<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: RestMethod,
        data: &Value,
        token: Option<&str>,
        target: EndpointTarget,
    ) -> Result<EndpointResponse<T>, ClientError> {
        let url = Url::parse(&format!("{}{endpoint}", self.base(target)))?;
        self.send(url, method, data, token).await
    }

    fn base(&self, target: EndpointTarget) -> &str {
        match target {
            EndpointTarget::Study => &self.settings.endpoint,
            EndpointTarget::Synapse => &self.settings.synapse_endpoint,
        }
    }

    /// `{endpoint}/v5/studies/{id}` with the id as one escaped path segment.
    fn study_url(&self, id: &StudyId) -> Result<Url, ClientError> {
        let mut url = Url::parse(self.base(EndpointTarget::Study))?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(STUDIES_PATH)
            .push(id.as_str());
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        mut url: Url,
        method: RestMethod,
        data: &Value,
        token: Option<&str>,
    ) -> Result<EndpointResponse<T>, ClientError> {
        let path = url.path().to_string();
        let mut request = match method {
            RestMethod::Get => {
                append_query(&mut url, data);
                self.http.request(Method::GET, url)
            }
            RestMethod::Post => self.http.request(Method::POST, url),
            RestMethod::Delete => self.http.request(Method::DELETE, url),
        }
        .header(CONTENT_TYPE, "application/json");
        if method != RestMethod::Get {
            request = request.json(data);
        }
        if let Some(token) = token {
            request = request.header(SESSION_HEADER, token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() && status != StatusCode::PRECONDITION_FAILED {
            let error_body: ServiceErrorBody = serde_json::from_slice(&body).unwrap_or_default();
            let message = error_body.message.unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            warn!(
                method = method.as_str(),
                %path,
                status = status.as_u16(),
                %message,
                "service call failed"
            );
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(EndpointResponse {
            status: status.as_u16(),
            data: serde_json::from_slice(&body)?,
            ok: status.is_success(),
        })
    }
}

#[async_trait]
impl StudyService for StudyClient {
    async fn get_study(
        &self,
        session: &SessionContext,
        id: &StudyId,
    ) -> Result<Option<Study>, ClientError> {
        let token = session.require_token()?;
        let url = self.study_url(id)?;
        let result = self
            .send::<Study>(
                url,
                RestMethod::Get,
                &Value::Object(Default::default()),
                Some(token),
            )
            .await;

        match result {
            Ok(response) => {
                info!(study_id = %id, groups = response.data.groups.len(), "study loaded");
                Ok(Some(response.data))
            }
            Err(ClientError::Api { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn save_study(
        &self,
        session: &SessionContext,
        study: &Study,
    ) -> Result<Study, ClientError> {
        let token = session.require_token()?;
        let payload = serde_json::to_value(study)?;
        let url = self.study_url(&study.id)?;
        let response = self
            .send::<VersionHolder>(url, RestMethod::Post, &payload, Some(token))
            .await?;

        info!(study_id = %study.id, version = response.data.version, "study saved");
        let mut saved = study.clone();
        saved.version = Some(response.data.version);
        Ok(saved)
    }
}

fn append_query(url: &mut Url, data: &Value) {
    let Some(fields) = data.as_object() else {
        return;
    };
    if fields.is_empty() {
        return;
    }
    let mut pairs = url.query_pairs_mut();
    for (key, value) in fields {
        match value {
            Value::String(s) => pairs.append_pair(key, s),
            other => pairs.append_pair(key, &other.to_string()),
        };
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
