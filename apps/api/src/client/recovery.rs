//! Credential Recovery Flow: the retry loop behind the "invalid API key" modal.
//!
//! `CredentialRecovery` is a plain state machine: feed it events, it tells you
//! whether to (re)invoke the analysis. `analyze_with_recovery` drives it against
//! an [`AnalysisInvoker`] and a [`CredentialPrompt`]. Every retry is started by
//! the user submitting a key; nothing retries on its own.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::llm_client::AnalysisErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalVariant {
    /// Offers a credential input field.
    InvalidKey,
    /// Acknowledgement only; nothing can be submitted.
    ServiceUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "variant", rename_all = "snake_case")]
pub enum FlowState {
    Idle,
    Analyzing,
    AwaitingCredential(ModalVariant),
    Retrying,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    /// User asked for an analysis.
    Start,
    Succeeded,
    Failed(AnalysisErrorKind),
    SubmitCredential(String),
    /// Modal closed (or the user navigated away).
    Dismiss,
}

/// What the caller should do after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowCommand {
    Invoke { credential: Option<String> },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("API key must not be empty")]
    EmptyCredential,

    #[error("the service-unavailable notice does not accept a credential")]
    SubmitNotAllowed,

    #[error("event {event:?} is not valid in state {state:?}")]
    Invalid { state: FlowState, event: FlowEvent },
}

#[derive(Debug, Clone)]
pub struct CredentialRecovery {
    state: FlowState,
    credential: Option<String>,
}

impl CredentialRecovery {
    pub fn new(credential: Option<String>) -> Self {
        Self {
            state: FlowState::Idle,
            credential,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Credential the next invocation will use.
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn handle(&mut self, event: FlowEvent) -> Result<Option<FlowCommand>, TransitionError> {
        use FlowState::*;

        let next = match (self.state, &event) {
            (Idle, FlowEvent::Start) => {
                self.state = Analyzing;
                return Ok(Some(self.invoke()));
            }

            (Analyzing | Retrying, FlowEvent::Succeeded) => Idle,
            (Analyzing | Retrying, FlowEvent::Failed(kind)) => match kind {
                AnalysisErrorKind::Auth => AwaitingCredential(ModalVariant::InvalidKey),
                AnalysisErrorKind::ServiceUnavailable => {
                    AwaitingCredential(ModalVariant::ServiceUnavailable)
                }
                AnalysisErrorKind::Input => Idle,
            },

            (AwaitingCredential(ModalVariant::InvalidKey), FlowEvent::SubmitCredential(key)) => {
                let key = key.trim();
                if key.is_empty() {
                    return Err(TransitionError::EmptyCredential);
                }
                self.credential = Some(key.to_string());
                self.state = Retrying;
                return Ok(Some(self.invoke()));
            }
            (
                AwaitingCredential(ModalVariant::ServiceUnavailable),
                FlowEvent::SubmitCredential(_),
            ) => return Err(TransitionError::SubmitNotAllowed),

            // Closing the modal at any point abandons the request.
            (_, FlowEvent::Dismiss) => Idle,

            // A completion that lands after dismissal is dropped.
            (Idle, FlowEvent::Succeeded | FlowEvent::Failed(_)) => {
                debug!("Discarding stale analysis completion: {:?}", event);
                return Ok(None);
            }

            (state, _) => {
                return Err(TransitionError::Invalid {
                    state,
                    event: event.clone(),
                })
            }
        };

        self.state = next;
        Ok(None)
    }

    fn invoke(&self) -> FlowCommand {
        FlowCommand::Invoke {
            credential: self.credential.clone(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Driver
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisFailure {
    pub kind: AnalysisErrorKind,
    pub message: String,
}

/// The operation the flow retries.
#[async_trait]
pub trait AnalysisInvoker: Send + Sync {
    type Output: Send;

    async fn invoke(&self, credential: Option<&str>) -> Result<Self::Output, AnalysisFailure>;
}

/// The modal. Implementations block on the user.
pub trait CredentialPrompt {
    /// Asks for a replacement key. `None` means the user dismissed the modal.
    fn request_credential(&mut self, reason: &str) -> Option<String>;

    /// Shows the service-unavailable notice until the user acknowledges it.
    fn acknowledge_unavailable(&mut self, reason: &str);
}

#[derive(Debug, PartialEq, Eq)]
pub enum RecoveryOutcome<T> {
    Completed(T),
    /// The user closed the credential modal; nothing was retried.
    Abandoned,
    Failed(AnalysisFailure),
}

/// Runs one user-initiated analysis, looping through the credential modal for as
/// long as the user keeps submitting keys the backend rejects.
///
/// Returns the outcome together with the credential that was last accepted by
/// the flow, so the caller can keep it for the rest of the session.
pub async fn analyze_with_recovery<I, P>(
    invoker: &I,
    prompt: &mut P,
    credential: Option<String>,
) -> (RecoveryOutcome<I::Output>, Option<String>)
where
    I: AnalysisInvoker + ?Sized,
    P: CredentialPrompt + Send,
{
    let mut flow = CredentialRecovery::new(credential);
    let mut command = flow.handle(FlowEvent::Start).ok().flatten();

    let outcome = loop {
        let Some(FlowCommand::Invoke { credential }) = command.take() else {
            break RecoveryOutcome::Abandoned;
        };

        let failure = match invoker.invoke(credential.as_deref()).await {
            Ok(output) => {
                let _ = flow.handle(FlowEvent::Succeeded);
                break RecoveryOutcome::Completed(output);
            }
            Err(failure) => failure,
        };

        let _ = flow.handle(FlowEvent::Failed(failure.kind));
        match flow.state() {
            FlowState::AwaitingCredential(ModalVariant::InvalidKey) => {
                info!("Analysis rejected the API key; asking for a new one");
                command = prompt_until_submitted(&mut flow, prompt, &failure.message);
                if command.is_none() {
                    break RecoveryOutcome::Abandoned;
                }
            }
            FlowState::AwaitingCredential(ModalVariant::ServiceUnavailable) => {
                prompt.acknowledge_unavailable(&failure.message);
                let _ = flow.handle(FlowEvent::Dismiss);
                break RecoveryOutcome::Failed(failure);
            }
            _ => break RecoveryOutcome::Failed(failure),
        }
    };

    (outcome, flow.credential().map(str::to_string))
}

/// Keeps the modal open until a non-empty key is submitted or it is dismissed.
fn prompt_until_submitted<P: CredentialPrompt>(
    flow: &mut CredentialRecovery,
    prompt: &mut P,
    reason: &str,
) -> Option<FlowCommand> {
    loop {
        let Some(key) = prompt.request_credential(reason) else {
            let _ = flow.handle(FlowEvent::Dismiss);
            return None;
        };
        match flow.handle(FlowEvent::SubmitCredential(key)) {
            Ok(command) => return command,
            Err(TransitionError::EmptyCredential) => continue,
            Err(e) => {
                debug!("Credential submission rejected: {e}");
                let _ = flow.handle(FlowEvent::Dismiss);
                return None;
            }
        }
    }
}
