//! Feedback form.
//!
//! ## How to use
//! 1) `ctx.set(FeedbackInput { .. })`
//! 2) `submit_feedback(&mut ctx)?` validates and queues `SubmitFeedbackCommand`.
//! 3) Flush and sync; on success the input is cleared.

use estately_states::{
    CancellationToken, Command, CommandFuture, CommandSnapshot, LatestOnlyUpdater, State, StateCtx,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::BusinessConfig;
use crate::api::ApiClient;
use crate::form_store::FieldErrors;
use crate::notification::{Notification, Notifications};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackInput {
    pub name: String,
    pub email: String,
    /// `1..=5`; zero means no rating was chosen.
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

impl State for FeedbackInput {}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("feedback has {} invalid field(s)", .0.len())]
pub struct FeedbackError(pub FieldErrors);

impl FeedbackInput {
    pub fn validate(&self) -> Result<(), FeedbackError> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.insert("name", "Name is required".to_owned());
        }
        if self.email.trim().is_empty() {
            errors.insert("email", "Email is required".to_owned());
        } else if !is_valid_email(self.email.trim()) {
            errors.insert("email", "Email must be a valid email".to_owned());
        }
        match self.rating {
            0 => {
                errors.insert("rating", "Rating is required".to_owned());
            }
            1..=5 => {}
            _ => {
                errors.insert("rating", "Rating must be between 1 and 5".to_owned());
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(FeedbackError(errors))
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !domain.ends_with('.')
}

pub fn rating_label(rating: u8) -> Option<&'static str> {
    match rating {
        1 => Some("Poor"),
        2 => Some("Fair"),
        3 => Some("Good"),
        4 => Some("Very Good"),
        5 => Some("Excellent"),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FeedbackState {
    #[default]
    Idle,
    Submitting,
    Submitted,
    Failed(String),
}

impl State for FeedbackState {}

/// Validate the current input and queue it for sending.
pub fn submit_feedback(ctx: &mut StateCtx) -> Result<(), FeedbackError> {
    ctx.state::<FeedbackInput>().validate()?;
    ctx.set(FeedbackState::Submitting);
    ctx.enqueue_command::<SubmitFeedbackCommand>();
    Ok(())
}

#[derive(Default, Debug)]
pub struct SubmitFeedbackCommand;

impl Command for SubmitFeedbackCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> CommandFuture {
        let input = snap.state::<FeedbackInput>().clone();
        let config = snap.state::<BusinessConfig>().clone();

        Box::pin(async move {
            log::info!("SubmitFeedbackCommand: sending rating {}", input.rating);

            match ApiClient::new(config).submit_feedback(&input).await {
                Ok(()) => {
                    log::info!("SubmitFeedbackCommand: feedback accepted");
                    updater.set(FeedbackInput::default());
                    updater.set(FeedbackState::Submitted);
                    updater.update::<Notifications>(|n| {
                        n.push(Notification::success("Feedback submitted successfully!"));
                    });
                }
                Err(e) => {
                    log::error!("SubmitFeedbackCommand: {e}");
                    updater.set(FeedbackState::Failed(e.user_message()));
                    updater.update::<Notifications>(|n| {
                        n.push(Notification::error("Failed to submit feedback"));
                    });
                }
            }
        })
    }
}
