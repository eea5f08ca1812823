//! Submission gateway: sends the finished draft to `POST /property`.
//!
//! Queued by [`submit_property`](crate::submit_property). A `201` resets the form and
//! routes back to the listing page; anything else leaves the draft and the review step
//! untouched so the user can retry. Nothing is retried automatically.

use estately_states::{
    CancellationToken, Command, CommandFuture, CommandSnapshot, LatestOnlyUpdater, State,
};

use crate::BusinessConfig;
use crate::api::ApiClient;
use crate::form_store::PropertyFormState;
use crate::notification::{Notification, Notifications};
use crate::route::Route;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Created,
    Failed(String),
}

impl State for SubmissionState {}

impl SubmissionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

#[derive(Default, Debug)]
pub struct SubmitPropertyCommand;

impl Command for SubmitPropertyCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> CommandFuture {
        let draft = snap.state::<PropertyFormState>().draft.clone();
        let config = snap.state::<BusinessConfig>().clone();

        Box::pin(async move {
            log::info!(
                "SubmitPropertyCommand: creating '{}' with {} photo(s)",
                draft.name,
                draft.photos.len()
            );

            match ApiClient::new(config).create_property(&draft).await {
                Ok(()) => {
                    log::info!("SubmitPropertyCommand: property created");
                    updater.update::<PropertyFormState>(PropertyFormState::reset_form);
                    updater.set(Route::Listings);
                    updater.set(SubmissionState::Created);
                    updater.update::<Notifications>(|n| {
                        n.push(Notification::success("Property created successfully"));
                    });
                }
                Err(e) => {
                    log::error!("SubmitPropertyCommand: {e}");
                    let message = format!("Property creation failed: {}", e.user_message());
                    updater.set(SubmissionState::Failed(message.clone()));
                    updater.update::<Notifications>(move |n| n.push(Notification::error(message)));
                }
            }
        })
    }
}
