//! Decision requests, outcomes, and the enum-dispatch service.
//!
//! Uses enum dispatch instead of trait objects because async methods are
//! not dyn-compatible. The two variants are the production LLM service
//! (with optional importance-based escalation) and a scripted service for
//! tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::llm::LlmBackend;

/// A request to the external decision service.
#[derive(Debug, Clone)]
pub struct DecisionRequest {
    /// The full prompt text.
    pub prompt: String,
    /// Token budget for the response.
    pub max_tokens: u32,
    /// Whether the caller expects structured JSON output.
    pub structured_output: bool,
    /// Importance hint in [0,1]; high values may route to a stronger
    /// backend.
    pub importance: f64,
}

/// A successful response from the decision service.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionResponse {
    /// Free text.
    Text(String),
    /// Parsed structured data.
    Structured(serde_json::Value),
}

/// Why the service produced no decision.
///
/// Unavailability is ordinary control flow -- the caller takes its
/// fallback path. It is deliberately distinct from
/// [`DecisionError`](crate::error::DecisionError), which signals
/// misconfiguration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    /// The call exceeded its deadline.
    Timeout,
    /// The backend failed or was unreachable.
    Backend(String),
    /// The response arrived but could not be interpreted.
    Malformed(String),
    /// The scripted service had no answer queued.
    Exhausted,
}

/// The outcome of one decision call: an answer, or no decision.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionOutcome {
    /// The service answered.
    Answered(DecisionResponse),
    /// No decision; the caller falls back.
    Unavailable(UnavailableReason),
}

impl DecisionOutcome {
    /// The response, if the service answered.
    pub fn answered(self) -> Option<DecisionResponse> {
        match self {
            Self::Answered(r) => Some(r),
            Self::Unavailable(_) => None,
        }
    }

    /// The response text, if the service answered with free text.
    pub fn text(self) -> Option<String> {
        match self {
            Self::Answered(DecisionResponse::Text(t)) => Some(t),
            _ => None,
        }
    }

    /// The structured value, if the service answered with one.
    pub fn structured(self) -> Option<serde_json::Value> {
        match self {
            Self::Answered(DecisionResponse::Structured(v)) => Some(v),
            _ => None,
        }
    }
}

/// A decision service backed by LLM HTTP backends.
///
/// Requests whose importance reaches `escalation_threshold` are routed to
/// the escalation backend when one is configured; everything else uses
/// the primary. Every call is bounded by `deadline`.
pub struct LlmService {
    /// The default backend.
    pub primary: LlmBackend,
    /// Optional stronger backend for important decisions.
    pub escalation: Option<LlmBackend>,
    /// Per-call deadline.
    pub deadline: Duration,
    /// Importance at or above which the escalation backend is preferred.
    pub escalation_threshold: f64,
}

impl LlmService {
    /// Create a service with a single backend and deadline.
    pub const fn new(primary: LlmBackend, deadline: Duration) -> Self {
        Self {
            primary,
            escalation: None,
            deadline,
            escalation_threshold: 0.8,
        }
    }

    /// Attach an escalation backend with a routing threshold.
    #[must_use]
    pub fn with_escalation(mut self, backend: LlmBackend, threshold: f64) -> Self {
        self.escalation = Some(backend);
        self.escalation_threshold = threshold;
        self
    }

    /// Pick the backend for a request based on its importance hint.
    fn route(&self, request: &DecisionRequest) -> &LlmBackend {
        match &self.escalation {
            Some(esc) if request.importance >= self.escalation_threshold => esc,
            _ => &self.primary,
        }
    }

    async fn decide(&self, request: &DecisionRequest) -> DecisionOutcome {
        let backend = self.route(request);
        debug!(
            backend = backend.name(),
            importance = request.importance,
            structured = request.structured_output,
            "decision call"
        );

        let call = backend.complete(request);
        match timeout(self.deadline, call).await {
            Ok(Ok(text)) => interpret(text, request.structured_output),
            Ok(Err(e)) => {
                warn!(backend = backend.name(), error = %e, "decision backend failed");
                DecisionOutcome::Unavailable(UnavailableReason::Backend(e.to_string()))
            }
            Err(_) => {
                warn!(
                    backend = backend.name(),
                    deadline_ms = self.deadline.as_millis() as u64,
                    "decision call timed out"
                );
                DecisionOutcome::Unavailable(UnavailableReason::Timeout)
            }
        }
    }
}

/// Interpret raw backend text according to the request's output mode.
fn interpret(text: String, structured: bool) -> DecisionOutcome {
    if !structured {
        return DecisionOutcome::Answered(DecisionResponse::Text(text));
    }
    match crate::parse::extract_json(&text) {
        Some(value) => DecisionOutcome::Answered(DecisionResponse::Structured(value)),
        None => DecisionOutcome::Unavailable(UnavailableReason::Malformed(String::from(
            "expected JSON in response",
        ))),
    }
}

/// A scripted decision service for tests and offline runs.
///
/// Pops queued outcomes in order; when the queue is empty it returns the
/// configured default (an `Unavailable(Exhausted)` unless overridden).
#[derive(Debug, Default)]
pub struct ScriptedDecisionService {
    queue: Mutex<VecDeque<DecisionOutcome>>,
    default: Option<DecisionOutcome>,
}

impl ScriptedDecisionService {
    /// A service with nothing queued; every call is `Unavailable`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A service that always answers with the same text.
    pub fn always_text(text: impl Into<String>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            default: Some(DecisionOutcome::Answered(DecisionResponse::Text(
                text.into(),
            ))),
        }
    }

    /// A service that is always unavailable.
    pub fn always_unavailable() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            default: Some(DecisionOutcome::Unavailable(UnavailableReason::Backend(
                String::from("scripted outage"),
            ))),
        }
    }

    /// Queue one outcome to be returned before the default applies.
    pub fn push(&self, outcome: DecisionOutcome) {
        if let Ok(mut q) = self.queue.lock() {
            q.push_back(outcome);
        }
    }

    fn decide(&self, _request: &DecisionRequest) -> DecisionOutcome {
        if let Ok(mut q) = self.queue.lock()
            && let Some(outcome) = q.pop_front()
        {
            return outcome;
        }
        self.default
            .clone()
            .unwrap_or(DecisionOutcome::Unavailable(UnavailableReason::Exhausted))
    }
}

/// The decision service: enum dispatch over the production LLM client and
/// the scripted stub.
pub enum DecisionService {
    /// HTTP LLM backends.
    Llm(LlmService),
    /// Canned outcomes for tests and offline runs.
    Scripted(ScriptedDecisionService),
}

impl DecisionService {
    /// Execute one decision call. Never errors: failure is an
    /// [`Unavailable`](DecisionOutcome::Unavailable) outcome.
    pub async fn decide(&self, request: &DecisionRequest) -> DecisionOutcome {
        match self {
            Self::Llm(svc) => svc.decide(request).await,
            Self::Scripted(svc) => svc.decide(request),
        }
    }
}
