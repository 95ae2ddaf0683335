use anyhow::{Context, Error};
use lazy_static::lazy_static;
use reqwest::Response;
use reqwest_tracing::TracingMiddleware;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error as ThisError;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use url::Url;

lazy_static! {
    static ref CLIENT: ClientWithMiddleware = {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        ClientBuilder::new(reqwest::Client::new())
            // Retry failed requests.
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .with(TracingMiddleware::default())
            .build()
    };
}

pub struct HttpClient;

#[derive(ThisError, Debug)]
pub enum HttpClientError {
    #[error(transparent)]
    ResponseError(#[from] Error),
    #[error("{url} responded with status {status}: {body}")]
    UnexpectedStatus { url: Url, status: u16, body: String },
}

#[derive(Debug, Clone, Copy)]
pub struct BasicAuth<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

impl HttpClient {
    async fn get(url: Url) -> anyhow::Result<Response> {
        CLIENT
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch request from {url}"))?
            .error_for_status()
            .with_context(|| format!("Unsuccessful response from {url}"))
    }

    pub async fn get_text(url: Url) -> anyhow::Result<String> {
        Self::get(url.clone())
            .await?
            .text()
            .await
            .context("Failed to get text response")
    }

    /// Posts `form` url-encoded and deserializes a successful JSON response.
    /// Any non-2xx response is returned as `UnexpectedStatus` with its body.
    pub async fn post_form<DTO: DeserializeOwned, Form: Serialize + ?Sized>(
        url: Url,
        auth: BasicAuth<'_>,
        form: &Form,
    ) -> Result<DTO, HttpClientError> {
        let response = CLIENT
            .post(url.clone())
            .basic_auth(auth.username, Some(auth.password))
            .form(form)
            .send()
            .await
            .with_context(|| format!("Failed to post form to {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HttpClientError::UnexpectedStatus {
                url,
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<DTO>()
            .await
            .context("Failed to deserialize response")
            .map_err(HttpClientError::ResponseError)
    }
}

#[cfg(test)]
mod tests {
    use super::{BasicAuth, HttpClient, HttpClientError};
    use httpmock::prelude::*;
    use serde::Deserialize;
    use serde_json::json;
    use url::Url;

    #[derive(Deserialize, Debug)]
    struct Created {
        sid: String,
    }

    const AUTH: BasicAuth<'static> = BasicAuth {
        username: "user",
        password: "secret",
    };

    #[tokio::test]
    async fn test_get_text_returns_the_page_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/schedule");
                then.status(200).body("<html>schedule</html>");
            })
            .await;

        let url = Url::parse(&server.url("/schedule")).unwrap();
        let text = HttpClient::get_text(url).await.unwrap();

        assert_eq!(text, "<html>schedule</html>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_text_fails_on_a_missing_page() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/schedule");
                then.status(404);
            })
            .await;

        let url = Url::parse(&server.url("/schedule")).unwrap();
        assert!(HttpClient::get_text(url).await.is_err());
    }

    #[tokio::test]
    async fn test_post_form_sends_credentials_and_fields() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/messages")
                    .header_exists("authorization")
                    .body_contains("Body=hello");
                then.status(201).json_body(json!({ "sid": "SM1" }));
            })
            .await;

        let url = Url::parse(&server.url("/messages")).unwrap();
        let created: Created = HttpClient::post_form(url, AUTH, &[("Body", "hello")])
            .await
            .unwrap();

        assert_eq!(created.sid, "SM1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_form_surfaces_the_rejection_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/messages");
                then.status(400)
                    .json_body(json!({ "code": 21211, "message": "Invalid 'To' Phone Number" }));
            })
            .await;

        let url = Url::parse(&server.url("/messages")).unwrap();
        let result = HttpClient::post_form::<Created, _>(url, AUTH, &[("To", "nope")]).await;

        match result {
            Err(HttpClientError::UnexpectedStatus { status, body, .. }) => {
                assert_eq!(status, 400);
                assert!(body.contains("21211"));
            }
            other => panic!("expected an unexpected status error, got {other:?}"),
        }
    }
}
