//! reqwest-based backend transport.

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap};
use reqwest::{Client, Response, StatusCode};

use crate::{
    AgentEngineResource, BackendReply, BackendTransport, ByteStream, Credential, OutboundRequest,
    ProviderError, ProviderFuture,
};

use super::serde_api::{extract_error_details, parse_reply};

const ACCEPT_VALUE: &str = "text/event-stream, application/json";

#[derive(Debug, Clone)]
pub struct HttpBackendTransport {
    client: Client,
    endpoint: String,
}

impl HttpBackendTransport {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Transport aimed at the streaming query URL of an agent engine.
    pub fn for_engine(
        client: Client,
        resource: &AgentEngineResource,
        api_base: Option<&str>,
    ) -> Result<Self, ProviderError> {
        resource.validate()?;
        Ok(Self::new(client, resource.stream_query_url(api_base)))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        error_for_status(status, &body)
    }
}

pub(crate) fn error_for_status(status: StatusCode, body: &str) -> ProviderError {
    let details = extract_error_details(body);
    let message = details
        .message
        .unwrap_or_else(|| format!("backend request failed with status {status}"));

    let error = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::authentication(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ProviderError::timeout(message)
        }
        StatusCode::BAD_REQUEST
        | StatusCode::PAYLOAD_TOO_LARGE
        | StatusCode::UNPROCESSABLE_ENTITY => ProviderError::invalid_request(message),
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            ProviderError::unavailable(message)
        }
        _ => ProviderError::transport(message),
    }
    .with_status(status.as_u16());

    match details.code {
        Some(code) => error.with_code(code),
        None => error,
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::timeout(err.to_string())
    } else if err.is_decode() {
        ProviderError::decode(err.to_string())
    } else {
        ProviderError::transport(err.to_string())
    }
}

pub(crate) fn is_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(';')
                .next()
                .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("text/event-stream"))
        })
        .unwrap_or(false)
}

impl BackendTransport for HttpBackendTransport {
    fn send<'a>(
        &'a self,
        request: OutboundRequest,
        credential: Credential,
    ) -> ProviderFuture<'a, Result<BackendReply<'a>, ProviderError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(credential.token.expose())
                .header(ACCEPT, ACCEPT_VALUE)
                .json(&request)
                .send()
                .await
                .map_err(map_reqwest_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            if is_event_stream(response.headers()) {
                let bytes: ByteStream<'a> =
                    Box::pin(response.bytes_stream().map(|chunk| chunk.map_err(map_reqwest_error)));
                return Ok(BackendReply::Stream(bytes));
            }

            let body = response.bytes().await.map_err(map_reqwest_error)?;
            Ok(BackendReply::Complete(parse_reply(&body)?))
        })
    }
}
