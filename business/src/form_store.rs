//! Central state of the property creation workflow.
//!
//! ## How to use
//! 1) Register once when the workflow starts (see [`build_state_ctx`](crate::build_state_ctx)):
//!    - `ctx.add_state(PropertyFormState::default());`
//!
//! 2) Step screens edit the draft through [`FormSession`]:
//!    - `ctx.update_form_data(DraftPatch::new().name("Lake House"));`
//!    - `ctx.advance()?;`
//!
//! Every edit goes through `StateCtx::update`, so a change is applied in one step and
//! subscribers only ever observe whole states.

use std::collections::BTreeMap;

use estately_states::{State, StateCtx};

use crate::draft::{DraftPatch, GeoPosition, MoreDetails, PropertyDraft};
use crate::upload::{UploadPhotoCommand, UploadStatus};
use crate::wizard::{WizardError, WizardStep};

/// Field name to validation message.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// The draft plus wizard bookkeeping. `Default` is the documented initial state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFormState {
    pub draft: PropertyDraft,
    pub current_step: WizardStep,
    pub upload: UploadStatus,
    pub errors: FieldErrors,
}

impl State for PropertyFormState {}

impl PropertyFormState {
    /// Overwrite only the fields named in `patch`.
    pub fn update_form_data(&mut self, patch: DraftPatch) {
        for key in patch.keys() {
            self.errors.remove(key);
        }
        patch.apply(&mut self.draft);
    }

    pub fn set_position(&mut self, position: GeoPosition) {
        self.draft.position = position;
    }

    pub fn set_more_details(&mut self, details: MoreDetails) {
        self.draft.more_details = details;
    }

    pub fn add_photo(&mut self, url: impl Into<String>) {
        self.draft.photos.push(url.into());
        self.errors.remove("photos");
    }

    /// Remove the photo at `index`; later photos shift down by one.
    pub fn remove_photo(&mut self, index: usize) -> Option<String> {
        if index < self.draft.photos.len() {
            Some(self.draft.photos.remove(index))
        } else {
            None
        }
    }

    pub fn set_errors(&mut self, errors: FieldErrors) {
        self.errors = errors;
    }

    pub fn reset_form(&mut self) {
        *self = Self::default();
    }
}

/// Form operations dispatched through a [`StateCtx`].
pub trait FormSession {
    fn form(&self) -> &PropertyFormState;
    fn update_form_data(&mut self, patch: DraftPatch);
    fn set_position(&mut self, position: GeoPosition);
    fn set_more_details(&mut self, details: MoreDetails);
    fn set_errors(&mut self, errors: FieldErrors);
    /// Restore the initial draft and wizard state, dropping any in-flight upload.
    fn reset_form(&mut self);
    fn advance(&mut self) -> Result<WizardStep, WizardError>;
    fn retreat(&mut self) -> Result<WizardStep, WizardError>;
    fn go_to(&mut self, step: WizardStep) -> Result<WizardStep, WizardError>;
}

impl FormSession for StateCtx {
    fn form(&self) -> &PropertyFormState {
        self.state::<PropertyFormState>()
    }

    fn update_form_data(&mut self, patch: DraftPatch) {
        self.update::<PropertyFormState>(|form| form.update_form_data(patch));
    }

    fn set_position(&mut self, position: GeoPosition) {
        self.update::<PropertyFormState>(|form| form.set_position(position));
    }

    fn set_more_details(&mut self, details: MoreDetails) {
        self.update::<PropertyFormState>(|form| form.set_more_details(details));
    }

    fn set_errors(&mut self, errors: FieldErrors) {
        self.update::<PropertyFormState>(|form| form.set_errors(errors));
    }

    fn reset_form(&mut self) {
        if self.cancel_command::<UploadPhotoCommand>() {
            log::info!("form reset, abandoning in-flight photo upload");
        }
        self.update::<PropertyFormState>(PropertyFormState::reset_form);
    }

    fn advance(&mut self) -> Result<WizardStep, WizardError> {
        let mut result = Err(WizardError::AtLastStep);
        self.update::<PropertyFormState>(|form| result = form.advance());
        result
    }

    fn retreat(&mut self) -> Result<WizardStep, WizardError> {
        let mut result = Err(WizardError::AtFirstStep);
        self.update::<PropertyFormState>(|form| result = form.retreat());
        result
    }

    fn go_to(&mut self, step: WizardStep) -> Result<WizardStep, WizardError> {
        let mut result = Ok(step);
        self.update::<PropertyFormState>(|form| result = form.go_to(step));
        result
    }
}
