use chrono::{DateTime, Utc};
use std::fmt;

use crate::consumer::ConsumeError;
use crate::history::{HistoryEntry, HistoryStore, KvStore};
use crate::types::GenerationRequest;

/// Lifecycle of one generation as seen by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    Requesting,
    Streaming,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationEvent {
    Submit,
    ResponseStarted,
    Finished,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot apply {event:?} while {state:?}")]
pub struct InvalidTransition {
    pub state: GenerationState,
    pub event: GenerationEvent,
}

impl GenerationState {
    pub fn transition(self, event: GenerationEvent) -> Result<Self, InvalidTransition> {
        use GenerationEvent as E;
        use GenerationState as S;

        match (self, event) {
            (S::Idle | S::Completed | S::Failed, E::Submit) => Ok(S::Requesting),
            (S::Requesting, E::ResponseStarted) => Ok(S::Streaming),
            (S::Streaming, E::Finished) => Ok(S::Completed),
            (S::Requesting | S::Streaming, E::Failed) => Ok(S::Failed),
            (state, event) => Err(InvalidTransition { state, event }),
        }
    }

    /// New submissions are only accepted when nothing is in flight.
    pub fn can_submit(&self) -> bool {
        !self.is_busy()
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, GenerationState::Requesting | GenerationState::Streaming)
    }
}

/// Where a streaming generation ended up and the text to leave on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled {
    pub state: GenerationState,
    pub text: String,
}

/// Ends a streaming generation once its body has been read. A complete read
/// is committed to the front of `history` and completes; a failed read keeps
/// its partial text for display, never reaches `history`, and fails.
pub fn settle<S, E>(
    state: GenerationState,
    result: Result<String, ConsumeError<E>>,
    request: &GenerationRequest,
    history: &mut HistoryStore<S>,
    now: DateTime<Utc>,
) -> Result<Settled, InvalidTransition>
where
    S: KvStore,
    E: fmt::Display,
{
    match result {
        Ok(text) => {
            let state = state.transition(GenerationEvent::Finished)?;
            let entry = HistoryEntry::new(
                text.clone(),
                request.content_type,
                request.prompt.clone(),
                now,
            );
            if let Err(e) = history.commit(entry) {
                log::warn!("Failed to persist history: {e}");
            }
            Ok(Settled { state, text })
        }
        Err(e) => {
            log::error!("{e}");
            let state = state.transition(GenerationEvent::Failed)?;
            Ok(Settled {
                state,
                text: e.partial,
            })
        }
    }
}
