use crate::task::TaskHandle;
use crate::{ErrorSet, FormField};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, info, warn};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("invalid value '{value}' for {field}")]
    InvalidValue { field: &'static str, value: String },
    #[error("'{value}' is not an allowed value for {field}")]
    NotAllowed { field: &'static str, value: String },
}

/// In-progress form state.
pub trait Draft: Clone {
    type Field: FormField;
    /// Read-only inputs the draft needs for edits and validation.
    type Context;

    /// Applies one edit. Dependent fields are reset here, in the same call.
    /// On error the draft is left untouched.
    fn apply(&mut self, field: Self::Field, value: &str, ctx: &Self::Context)
        -> Result<(), DraftError>;

    /// Every rule is evaluated; there is no early exit.
    fn validate(&self, ctx: &Self::Context) -> ErrorSet;
}

/// The collaborator a clean draft is handed to.
pub trait SubmitDelegate<D: Draft> {
    type Output;
    type Error: std::error::Error;

    fn submit(&self, draft: &D) -> impl Future<Output = Result<Self::Output, Self::Error>>;

    /// Message shown to the user when `submit` fails.
    fn failure_notice(&self, error: &Self::Error) -> String;

    /// Field errors implied by a rejection, if any.
    fn rejected_fields(&self, _error: &Self::Error) -> ErrorSet {
        ErrorSet::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Editing,
    Validating,
    Submitting,
    Submitted,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient user-facing message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome<T> {
    Submitted(T),
    /// Validation failed; nothing was sent.
    Invalid(ErrorSet),
    /// Submission was refused before or by the collaborator. The draft is kept.
    Failed(Notice),
    /// A previous submit is still pending.
    Busy,
}

impl<T> SubmitOutcome<T> {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }
}

pub struct DraftController<D: Draft, S> {
    draft: D,
    context: D::Context,
    delegate: S,
    errors: ErrorSet,
    phase: Phase,
    notice: Option<Notice>,
    task: TaskHandle,
}

impl<D, S> DraftController<D, S>
where
    D: Draft,
    S: SubmitDelegate<D>,
{
    pub fn new(draft: D, context: D::Context, delegate: S) -> Self {
        Self {
            draft,
            context,
            delegate,
            errors: ErrorSet::new(),
            phase: Phase::Editing,
            notice: None,
            task: TaskHandle::new(),
        }
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn context(&self) -> &D::Context {
        &self.context
    }

    pub fn delegate(&self) -> &S {
        &self.delegate
    }

    pub fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// A run abandoned mid-flight reads as `Editing`.
    pub fn phase(&self) -> Phase {
        match self.phase {
            Phase::Validating | Phase::Submitting if !self.task.is_pending() => Phase::Editing,
            phase => phase,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.task.is_pending()
    }

    /// Handle on the submit operation, for callers that need to watch it.
    pub fn submit_task(&self) -> TaskHandle {
        self.task.clone()
    }

    pub fn set_field(&mut self, field: D::Field, value: &str) -> Result<(), DraftError> {
        self.draft.apply(field, value, &self.context)?;
        self.errors.remove(field.key());
        self.phase = self.phase();
        if self.phase == Phase::Submitted {
            self.phase = Phase::Editing;
        }
        Ok(())
    }

    pub fn set_field_by_key(&mut self, key: &str, value: &str) -> Result<(), DraftError> {
        let field =
            D::Field::from_key(key).ok_or_else(|| DraftError::UnknownField(key.to_string()))?;
        self.set_field(field, value)
    }

    /// Edits the draft directly, for values that are not plain text.
    /// Errors recorded under `cleared` are dropped.
    pub fn update(&mut self, cleared: &[&str], edit: impl FnOnce(&mut D)) {
        edit(&mut self.draft);
        self.clear_errors(cleared);
    }

    pub fn clear_errors(&mut self, keys: &[&str]) {
        for key in keys {
            self.errors.remove(key);
        }
    }

    pub fn post_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Recomputes the error set without submitting.
    pub fn validate(&mut self) -> &ErrorSet {
        self.errors = self.draft.validate(&self.context);
        &self.errors
    }

    pub async fn submit(&mut self) -> SubmitOutcome<S::Output> {
        let Ok(in_flight) = self.task.begin() else {
            debug!("submit ignored, previous submit still pending");
            return SubmitOutcome::Busy;
        };

        self.phase = Phase::Validating;
        self.errors = self.draft.validate(&self.context);
        if !self.errors.is_empty() {
            debug!(fields = ?self.errors.keys().collect::<Vec<_>>(), "draft rejected by validation");
            self.phase = Phase::Editing;
            in_flight.reject();
            return SubmitOutcome::Invalid(self.errors.clone());
        }

        self.phase = Phase::Submitting;
        self.notice = None;
        match self.delegate.submit(&self.draft).await {
            Ok(output) => {
                info!("draft submitted");
                self.phase = Phase::Submitted;
                in_flight.resolve();
                SubmitOutcome::Submitted(output)
            }
            Err(err) => {
                warn!(error = %err, "draft submission failed");
                self.phase = Phase::Failed;
                let notice = Notice::error(self.delegate.failure_notice(&err));
                self.errors.merge(self.delegate.rejected_fields(&err));
                self.notice = Some(notice.clone());
                in_flight.reject();
                self.phase = Phase::Editing;
                SubmitOutcome::Failed(notice)
            }
        }
    }
}
