use estately_states::StateCtx;

use crate::{
    BusinessConfig, FeedbackInput, FeedbackState, GetPropertyCommand, ListPropertiesCommand,
    ListingsState, Notifications, PhotoUploadInput, PropertyDetailsInput, PropertyDetailsState,
    PropertyFormState, ResetUploadProgressCommand, Route, SubmissionState, SubmitFeedbackCommand,
    SubmitPropertyCommand, UploadPhotoCommand,
};

/// Build a context with every state and command of the app registered.
///
/// One context is one session: drop it (after `shutdown`) when the workflow ends.
pub fn build_state_ctx(config: BusinessConfig) -> StateCtx {
    let mut ctx = StateCtx::new();

    // Business config
    ctx.add_state(config);

    // Shell
    ctx.add_state(Route::default());
    ctx.add_state(Notifications::default());

    // Property creation wizard
    ctx.add_state(PropertyFormState::default());
    ctx.add_state(PhotoUploadInput::default());
    ctx.add_state(SubmissionState::default());

    // Listing and detail pages
    ctx.add_state(ListingsState::default());
    ctx.add_state(PropertyDetailsInput::default());
    ctx.add_state(PropertyDetailsState::default());

    // Feedback
    ctx.add_state(FeedbackInput::default());
    ctx.add_state(FeedbackState::default());

    // Commands
    ctx.record_command(UploadPhotoCommand);
    ctx.record_command(ResetUploadProgressCommand);
    ctx.record_command(SubmitPropertyCommand);
    ctx.record_command(ListPropertiesCommand);
    ctx.record_command(GetPropertyCommand);
    ctx.record_command(SubmitFeedbackCommand);

    ctx
}
