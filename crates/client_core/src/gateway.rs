//! HTTP implementation of the Answer Gateway seam.

use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{AskRequest, AskResponse, ErrorBody};
use tracing::debug;

use crate::{AnswerGateway, GatewayError};

pub struct HttpAnswerGateway {
    http: Client,
    base_url: String,
}

impl HttpAnswerGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Uses a caller-built client, e.g. one with a request timeout.
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }
}

#[async_trait]
impl AnswerGateway for HttpAnswerGateway {
    async fn ask(&self, question: &str) -> Result<AskResponse, GatewayError> {
        let response = self
            .http
            .post(format!("{}/ask", self.base_url))
            .json(&AskRequest {
                question: question.to_string(),
            })
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!("ask reply received status={status}");
            response
                .json::<AskResponse>()
                .await
                .map_err(|err| GatewayError::MalformedReply(err.to_string()))
        } else {
            debug!("ask rejected status={status}");
            // An undecodable error body still maps to a backend error,
            // just one without a message.
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error);
            Err(GatewayError::Backend { message })
        }
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
