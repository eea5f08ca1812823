//! Business layer of the estately property client.
//!
//! Holds the domain model, the property creation wizard (form store, step machine,
//! photo upload, submission), the listing, detail and feedback workflows, and the
//! REST gateway they share. Everything runs on an explicitly owned
//! [`StateCtx`](estately_states::StateCtx) built by [`build_state_ctx`].

mod api;
mod config;
mod details;
mod draft;
mod error;
mod feedback;
mod form_store;
pub mod http;
mod listings;
mod notification;
mod route;
mod session;
mod submission;
mod upload;
mod wire;
mod wizard;

pub use api::{ApiClient, UPLOAD_FIELD};
pub use config::{BusinessConfig, ConfigError};
pub use details::{GetPropertyCommand, PropertyDetailsInput, PropertyDetailsState, PropertyRecord};
pub use draft::{
    DraftPatch, GeoPosition, MoreDetails, PropertyDraft, PropertyStatus, PropertyType,
    UnknownVariant, format_price,
};
pub use error::{ApiError, GENERIC_FAILURE};
pub use feedback::{
    FeedbackError, FeedbackInput, FeedbackState, SubmitFeedbackCommand, rating_label,
    submit_feedback,
};
pub use form_store::{FieldErrors, FormSession, PropertyFormState};
pub use listings::{
    ListPropertiesCommand, ListingCategory, ListingsState, ListingsStatus, PropertySummary,
    filter_listings, toggle_favourite,
};
pub use notification::{Notification, NotificationLevel, Notifications};
pub use route::Route;
pub use session::build_state_ctx;
pub use submission::{SubmissionState, SubmitPropertyCommand};
pub use upload::{
    ALLOWED_EXTENSIONS, MAX_FILE_SIZE, PROGRESS_RESET_DELAY, PhotoFile, PhotoUploadInput,
    ResetUploadProgressCommand, UploadPhotoCommand, UploadPolicy, UploadRejected, UploadStatus,
    UploadTask, remove_photo, schedule_progress_reset, select_photo, select_photo_with,
};
pub use wizard::{WizardError, WizardStep, submit_property};
