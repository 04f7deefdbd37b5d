//! HTTP client for the tournament platform API

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::event::{Event, Registration};
use crate::domain::DomainError;

/// Connection settings for the platform API
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Site root, e.g. `https://upai.usetopscore.com`
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Page size for list endpoints
    pub per_page: u32,
    /// Upper bound on registration pages per event
    pub max_pages: u32,
    pub timeout: Duration,
}

impl UpstreamConfig {
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            per_page: 100,
            max_pages: 50,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    result: Vec<T>,
}

/// OAuth2 client-credentials client for the platform API
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DomainError::upstream(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Exchange client credentials for a bearer token
    pub async fn access_token(&self) -> Result<String, DomainError> {
        let response = self
            .client
            .post(self.url("/api/oauth/server"))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DomainError::upstream(format!("Token request failed: {}", e)))?;

        let token: TokenResponse = read_json(response, "token").await?;
        Ok(token.access_token)
    }

    /// Latest events, newest first
    pub async fn events(&self, token: &str) -> Result<Vec<Event>, DomainError> {
        let per_page = self.config.per_page.to_string();

        self.get_list(
            token,
            "/api/events",
            &[("per_page", per_page.as_str()), ("order_by", "date_desc")],
        )
        .await
    }

    /// Every registration of an event, following pagination
    ///
    /// Stops early when a page repeats the previous one, which is what the
    /// platform does when it ignores `page`. Needing more than `max_pages`
    /// pages is an error.
    pub async fn registrations(
        &self,
        token: &str,
        event_id: i64,
    ) -> Result<Vec<Registration>, DomainError> {
        let event_id_str = event_id.to_string();
        let per_page = self.config.per_page.to_string();
        let mut registrations = Vec::new();
        let mut previous: Option<Vec<Registration>> = None;

        for page in 1..=self.config.max_pages {
            let page_str = page.to_string();
            let batch: Vec<Registration> = self
                .get_list(
                    token,
                    "/api/registrations",
                    &[
                        ("event_id", event_id_str.as_str()),
                        ("per_page", per_page.as_str()),
                        ("page", page_str.as_str()),
                    ],
                )
                .await?;

            if previous.as_ref() == Some(&batch) {
                warn!(event_id, page, "Registration page repeats the previous one, stopping");
                return Ok(registrations);
            }

            if batch.len() < self.config.per_page as usize {
                registrations.extend(batch);
                return Ok(registrations);
            }

            registrations.extend(batch.iter().cloned());
            previous = Some(batch);
        }

        Err(DomainError::upstream(format!(
            "Registrations for event {} exceed {} pages of {}",
            event_id, self.config.max_pages, self.config.per_page
        )))
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, DomainError> {
        debug!(path = %path, query = ?query, "Fetching upstream list");

        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| DomainError::upstream(format!("Request to {} failed: {}", path, e)))?;

        let list: ListResponse<T> = read_json(response, path).await?;
        Ok(list.result)
    }
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> Result<T, DomainError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DomainError::upstream(format!(
            "{} request returned HTTP {}: {}",
            what, status, body
        )));
    }

    response
        .json()
        .await
        .map_err(|e| DomainError::upstream(format!("Failed to parse {} response: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, per_page: u32) -> UpstreamClient {
        UpstreamClient::new(
            UpstreamConfig::new(format!("{}/", server.uri()), "id", "secret").with_per_page(per_page),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_access_token_uses_client_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/oauth/server"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_secret=secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok"})))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(client(&server, 100).access_token().await.unwrap(), "tok");
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/oauth/server"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
            .mount(&server)
            .await;

        let error = client(&server, 100).access_token().await.unwrap_err();
        assert!(matches!(error, DomainError::Upstream { .. }));
        assert!(error.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_events_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/events"))
            .and(header("authorization", "Bearer tok"))
            .and(query_param("order_by", "date_desc"))
            .and(query_param("per_page", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "result": [{"id": 1, "name": "Nationals", "start": "2019-09-20", "end": "2019-09-22"}]
            })))
            .mount(&server)
            .await;

        let events = client(&server, 100).events("tok").await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Nationals");
    }

    #[tokio::test]
    async fn test_registrations_follow_pages() {
        let server = MockServer::start().await;
        let registration = |id: i64| {
            json!({"Person": {"id": id, "full_name": format!("P{}", id)}, "Team": null, "role": "player"})
        };

        Mock::given(method("GET"))
            .and(path("/api/registrations"))
            .and(query_param("event_id", "7"))
            .and(query_param("page", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"result": [registration(1), registration(2)]})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/registrations"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"result": [registration(3)]})),
            )
            .mount(&server)
            .await;

        let registrations = client(&server, 2).registrations("tok", 7).await.unwrap();
        assert_eq!(registrations.len(), 3);
    }

    #[tokio::test]
    async fn test_registrations_stop_when_page_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/registrations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": [
                {"Person": {"id": 1, "full_name": "P1"}, "Team": null, "role": "player"},
                {"Person": {"id": 2, "full_name": "P2"}, "Team": null, "role": "player"}
            ]})))
            .expect(2)
            .mount(&server)
            .await;

        let registrations = client(&server, 2).registrations("tok", 7).await.unwrap();
        assert_eq!(registrations.len(), 2);
    }

    #[tokio::test]
    async fn test_registrations_give_up_after_max_pages() {
        let server = MockServer::start().await;
        for page in 1..=3 {
            Mock::given(method("GET"))
                .and(path("/api/registrations"))
                .and(query_param("page", page.to_string()))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": [
                    {"Person": {"id": page, "full_name": "P"}, "Team": null, "role": "player"}
                ]})))
                .mount(&server)
                .await;
        }

        let client = UpstreamClient::new(
            UpstreamConfig::new(server.uri(), "id", "secret")
                .with_per_page(1)
                .with_max_pages(2),
        )
        .unwrap();

        let error = client.registrations("tok", 7).await.unwrap_err();
        assert!(matches!(error, DomainError::Upstream { .. }));
    }
}
