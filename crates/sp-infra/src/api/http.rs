//! HTTP-backed preferences client.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use sp_core::newsletter::{Newsletter, NewsletterKey};
use sp_core::ports::{
    PreferenceApiError, PreferenceApiPort, SubscribeRequest, SubscribeResponse,
    UpdatePreferencesRequest, UpdatePreferencesResponse, UserSubscriptions,
};
use sp_core::preference::LearningLevel;

use super::wire::{
    Envelope, ErrorBody, LearningLevelBody, LearningLevelResponseBody, NewsletterListBody,
    PreferencesBody, PreferencesResponseBody, SubscribeBody, SubscribeResponseBody,
    SubscriptionsBody,
};

type ApiResult<T> = Result<T, PreferenceApiError>;

#[derive(Debug, Clone)]
pub struct HttpPreferenceApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

pub struct HttpPreferenceApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPreferenceApi {
    pub fn new(config: HttpPreferenceApiConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, &str)]) -> ApiResult<T>
    where
        T: DeserializeOwned + Envelope,
    {
        let url = self.endpoint(path);
        debug!(%url, "preferences GET");
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(map_transport_error)?;
        read_envelope(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Envelope,
    {
        let url = self.endpoint(path);
        debug!(%url, "preferences POST");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        read_envelope(response).await
    }
}

#[async_trait]
impl PreferenceApiPort for HttpPreferenceApi {
    async fn list_newsletters(&self) -> ApiResult<Vec<Newsletter>> {
        let body: NewsletterListBody = self.get_json("newsletters", &[]).await?;
        Ok(body
            .newsletters
            .into_iter()
            .map(|dto| Newsletter::new(dto.stringid, dto.display_name, dto.icon))
            .collect())
    }

    async fn fetch_user_subscriptions(&self, email: &str) -> ApiResult<UserSubscriptions> {
        let body: SubscriptionsBody = self
            .get_json("subscriptions", &[("email", email)])
            .await?;
        Ok(UserSubscriptions {
            subscribed_keys: into_keys(body.subscribed_newsletters),
            wants_marketing_emails: body.wants_marketing_emails,
            learning_level: body.learning_level.and_then(|raw| {
                LearningLevel::new(raw)
                    .map_err(|err| warn!(error = %err, "ignoring learning level from server"))
                    .ok()
            }),
        })
    }

    async fn subscribe(&self, request: &SubscribeRequest) -> ApiResult<SubscribeResponse> {
        request.check()?;
        let body = SubscribeBody {
            first_name: &request.first_name,
            last_name: request.last_name.as_deref(),
            email: &request.email,
            newsletters: &request.newsletters,
        };
        let response: SubscribeResponseBody = self.post_json("subscribe", &body).await?;
        Ok(SubscribeResponse {
            subscribed_keys: into_keys(response.subscribed_newsletters),
        })
    }

    async fn update_preferences(
        &self,
        request: &UpdatePreferencesRequest,
    ) -> ApiResult<UpdatePreferencesResponse> {
        let body = PreferencesBody {
            email: &request.email,
            newsletters: &request.newsletters,
            marketing_opt_out: request.marketing_opt_out,
        };
        let response: PreferencesResponseBody = self.post_json("preferences", &body).await?;
        Ok(UpdatePreferencesResponse {
            subscribed_keys: into_keys(response.subscribed_newsletters),
            marketing_opt_out: response.marketing_opt_out,
        })
    }

    async fn update_learning_level(
        &self,
        email: &str,
        level: LearningLevel,
    ) -> ApiResult<LearningLevel> {
        let body = LearningLevelBody {
            email,
            learning_level: level.into(),
        };
        let response: LearningLevelResponseBody =
            self.post_json("learning-level", &body).await?;
        match response.learning_level {
            Some(raw) => LearningLevel::new(raw).map_err(|err| {
                PreferenceApiError::rejected(None, format!("invalid learning level in response: {err}"))
            }),
            None => Ok(level),
        }
    }
}

fn into_keys(raw: Vec<String>) -> Vec<NewsletterKey> {
    raw.into_iter().map(NewsletterKey::from).collect()
}

async fn read_envelope<T>(response: reqwest::Response) -> ApiResult<T>
where
    T: DeserializeOwned + Envelope,
{
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .unwrap_or_default()
            .message
            .unwrap_or_else(|| format!("request failed with status {status}"));
        return Err(map_status_code(status, message));
    }

    let body: T = response.json().await.map_err(map_transport_error)?;
    if !body.success() {
        return Err(PreferenceApiError::rejected(
            Some(status.as_u16()),
            body.message().unwrap_or_default(),
        ));
    }
    Ok(body)
}

fn map_transport_error(error: reqwest::Error) -> PreferenceApiError {
    if error.is_timeout() {
        PreferenceApiError::transport("The request timed out. Please try again.")
    } else if let Some(status) = error.status() {
        map_status_code(status, error.to_string())
    } else if error.is_decode() {
        PreferenceApiError::rejected(None, format!("unexpected response: {error}"))
    } else {
        PreferenceApiError::transport(format!("network error: {error}"))
    }
}

fn map_status_code(code: StatusCode, message: String) -> PreferenceApiError {
    match code {
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            PreferenceApiError::transport(message)
        }
        _ if code.is_server_error() => PreferenceApiError::transport(message),
        _ => PreferenceApiError::rejected(Some(code.as_u16()), message),
    }
}
