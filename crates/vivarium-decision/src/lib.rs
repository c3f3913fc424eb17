//! External decision service client for the Vivarium simulation.
//!
//! The decision service is an opaque collaborator: a request goes in
//! (prompt, token budget, structured-output flag, importance hint) and a
//! response comes out -- structured data or free text -- or it fails.
//! Callers must treat failure as "no decision", never as fatal, so the
//! service answers with a [`DecisionOutcome`] value: `Answered` or
//! `Unavailable`. [`DecisionError`] is reserved for misconfiguration.
//!
//! # Modules
//!
//! - [`service`] -- request/outcome types and the enum-dispatch service.
//! - [`llm`] -- OpenAI-compatible and Anthropic Messages backends.
//! - [`prompt`] -- `minijinja` prompt templates.
//! - [`parse`] -- JSON recovery parsing for model output.
//! - [`profile`] -- personality derivation from natural language.

pub mod error;
pub mod llm;
pub mod parse;
pub mod profile;
pub mod prompt;
pub mod service;

pub use error::DecisionError;
pub use llm::{
    AnthropicBackend, BackendError, BackendKind, LlmBackend, LlmBackendConfig, OpenAiBackend,
};
pub use service::{
    DecisionOutcome, DecisionRequest, DecisionResponse, DecisionService, LlmService,
    ScriptedDecisionService, UnavailableReason,
};
