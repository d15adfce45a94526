use std::sync::Arc;

use async_trait::async_trait;
use shared::protocol::{AskResponse, SourceRef};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

pub mod gateway;

pub use gateway::HttpAnswerGateway;

/// Shown when the gateway rejects a request without saying why, or when a
/// success reply cannot be decoded.
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong.";
/// Shown when no response could be obtained from the gateway at all.
pub const CONNECT_FAILURE_MESSAGE: &str = "Could not connect to backend.";

const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway reported an error: {}", .message.as_deref().unwrap_or("<no message>"))]
    Backend { message: Option<String> },
    #[error("gateway success reply could not be decoded: {0}")]
    MalformedReply(String),
    #[error("gateway unreachable: {0}")]
    Transport(String),
}

impl GatewayError {
    /// The message the Failed state carries for this error.
    pub fn display_message(&self) -> String {
        match self {
            GatewayError::Backend {
                message: Some(message),
            } => message.clone(),
            GatewayError::Backend { message: None } | GatewayError::MalformedReply(_) => {
                FALLBACK_ERROR_MESSAGE.to_string()
            }
            GatewayError::Transport(_) => CONNECT_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// The remote answering service: takes a question, returns an answer with
/// supporting sources or a structured error.
#[async_trait]
pub trait AnswerGateway: Send + Sync {
    async fn ask(&self, question: &str) -> Result<AskResponse, GatewayError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Request lifecycle with its payload gated by the variant, so an answer
/// and an error can never be populated at the same time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueryPhase {
    #[default]
    Idle,
    Pending,
    Succeeded {
        answer: String,
        sources: Vec<SourceRef>,
    },
    Failed {
        message: String,
    },
}

impl QueryPhase {
    pub fn status(&self) -> RequestStatus {
        match self {
            QueryPhase::Idle => RequestStatus::Idle,
            QueryPhase::Pending => RequestStatus::Pending,
            QueryPhase::Succeeded { .. } => RequestStatus::Succeeded,
            QueryPhase::Failed { .. } => RequestStatus::Failed,
        }
    }
}

/// Point-in-time copy of the controller state for rendering.
#[derive(Debug, Clone, Default)]
pub struct QuerySnapshot {
    pub question: String,
    pub phase: QueryPhase,
}

impl QuerySnapshot {
    pub fn status(&self) -> RequestStatus {
        self.phase.status()
    }

    pub fn answer(&self) -> Option<&str> {
        match &self.phase {
            QueryPhase::Succeeded { answer, .. } => Some(answer),
            _ => None,
        }
    }

    pub fn sources(&self) -> &[SourceRef] {
        match &self.phase {
            QueryPhase::Succeeded { sources, .. } => sources,
            _ => &[],
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            QueryPhase::Failed { message } => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum QueryEvent {
    SubmissionStarted,
    AnswerReady {
        answer: String,
        sources: Vec<SourceRef>,
    },
    QueryFailed {
        message: String,
    },
}

/// Owns the question text and the request lifecycle, and mediates between
/// the presentation layer and the Answer Gateway.
///
/// One request is in flight at a time by contract; the presentation layer
/// keeps the submit trigger disabled while Pending. If two requests were
/// nonetheless issued, the later-resolving one overwrites the state.
pub struct QueryController {
    gateway: Arc<dyn AnswerGateway>,
    inner: Mutex<QuerySnapshot>,
    events: broadcast::Sender<QueryEvent>,
}

impl QueryController {
    pub fn new(gateway: Arc<dyn AnswerGateway>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            gateway,
            inner: Mutex::new(QuerySnapshot::default()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<QueryEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> QuerySnapshot {
        self.inner.lock().await.clone()
    }

    /// Replaces the question text. No status change, no other effects.
    pub async fn update_question(&self, text: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.question = text.into();
    }

    /// Enters Pending and issues one request to the gateway with the
    /// current question. Returns `false` when the question is empty: no
    /// request is issued and the status is left untouched.
    ///
    /// The call returns as soon as the request is in flight; the outcome
    /// lands through [`on_gateway_success`](Self::on_gateway_success) or
    /// [`on_gateway_failure`](Self::on_gateway_failure) and is observable
    /// via [`subscribe_events`](Self::subscribe_events).
    pub async fn submit(self: &Arc<Self>) -> bool {
        let Some(question) = self.begin_submission().await else {
            return false;
        };

        let controller = Arc::clone(self);
        tokio::spawn(async move {
            match controller.gateway.ask(&question).await {
                Ok(reply) => {
                    controller
                        .on_gateway_success(reply.answer, reply.sources)
                        .await;
                }
                Err(err) => {
                    warn!("ask request failed: {err}");
                    controller.on_gateway_failure(err.display_message()).await;
                }
            }
        });

        true
    }

    async fn begin_submission(&self) -> Option<String> {
        let question = {
            let mut inner = self.inner.lock().await;
            if inner.question.is_empty() {
                return None;
            }
            // Entering Pending discards any previous answer or error.
            inner.phase = QueryPhase::Pending;
            inner.question.clone()
        };

        info!("submitting question len={}", question.len());
        let _ = self.events.send(QueryEvent::SubmissionStarted);
        Some(question)
    }

    /// Applies a success outcome: trims the answer, keeps the sources in
    /// the order the gateway returned them, enters Succeeded.
    pub async fn on_gateway_success(&self, answer: String, sources: Vec<SourceRef>) {
        let answer = answer.trim().to_string();
        {
            let mut inner = self.inner.lock().await;
            inner.phase = QueryPhase::Succeeded {
                answer: answer.clone(),
                sources: sources.clone(),
            };
        }
        let _ = self.events.send(QueryEvent::AnswerReady { answer, sources });
    }

    /// Applies a failure outcome: stores the message and enters Failed.
    pub async fn on_gateway_failure(&self, message: impl Into<String>) {
        let message = message.into();
        {
            let mut inner = self.inner.lock().await;
            inner.phase = QueryPhase::Failed {
                message: message.clone(),
            };
        }
        let _ = self.events.send(QueryEvent::QueryFailed { message });
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
