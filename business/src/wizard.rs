//! Step machine of the property creation wizard.
//!
//! Steps are a closed enum iterated in [`WizardStep::ALL`] order. Each step owns its
//! validity predicate; advancing past a step requires the predicate to hold.

use std::fmt;

use estately_states::StateCtx;
use thiserror::Error;

use crate::draft::PropertyDraft;
use crate::form_store::{FieldErrors, PropertyFormState};
use crate::submission::{SubmissionState, SubmitPropertyCommand};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    #[default]
    BasicInfo,
    Photos,
    MapPosition,
    MoreDetails,
    Review,
}

impl WizardStep {
    pub const ALL: [Self; 5] = [
        Self::BasicInfo,
        Self::Photos,
        Self::MapPosition,
        Self::MoreDetails,
        Self::Review,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::BasicInfo => "Basic Information",
            Self::Photos => "Upload Photos",
            Self::MapPosition => "Add Maps",
            Self::MoreDetails => "More Details",
            Self::Review => "Review & Submit",
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn prev(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn is_last(self) -> bool {
        self == Self::Review
    }

    /// Field errors that block leaving this step. Empty means valid.
    pub fn validate(self, draft: &PropertyDraft) -> FieldErrors {
        let mut errors = FieldErrors::new();
        match self {
            Self::BasicInfo => {
                require(&mut errors, "name", &draft.name, "Name is required");
                require(
                    &mut errors,
                    "description",
                    &draft.description,
                    "Description is required",
                );
                if let Err(msg) = draft.parsed_price() {
                    errors.insert("price", msg.to_owned());
                }
                require(&mut errors, "location", &draft.location, "Location is required");
                match &draft.property_status {
                    None => {
                        errors.insert("propertyStatus", "Property status is required".to_owned());
                    }
                    Some(status) if !status.is_known() => {
                        errors.insert(
                            "propertyStatus",
                            "Property status must be one of: for-sale, open-house, price-reduced, sold"
                                .to_owned(),
                        );
                    }
                    Some(_) => {}
                }
            }
            Self::Photos => {
                if draft.photos.is_empty() {
                    errors.insert("photos", "At least one photo is required".to_owned());
                }
            }
            Self::MapPosition | Self::MoreDetails | Self::Review => {}
        }
        errors
    }

    pub fn is_valid(self, draft: &PropertyDraft) -> bool {
        self.validate(draft).is_empty()
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

fn require(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field, message.to_owned());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("{step} has missing or invalid fields")]
    StepInvalid {
        step: WizardStep,
        errors: FieldErrors,
    },
    #[error("already on the first step")]
    AtFirstStep,
    #[error("already on the last step")]
    AtLastStep,
    #[error("the property can only be submitted from the review step")]
    NotOnReview,
    #[error("the property is already being submitted")]
    AlreadySubmitting,
    #[error("wait for the photo upload to finish")]
    UploadInProgress,
}

impl PropertyFormState {
    pub fn is_step_valid(&self) -> bool {
        self.current_step.is_valid(&self.draft)
    }

    /// Move to the next step. An invalid step records its errors and stays put.
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        let step = self.current_step;
        let next = step.next().ok_or(WizardError::AtLastStep)?;
        let errors = step.validate(&self.draft);
        if !errors.is_empty() {
            log::info!("cannot leave {step}: {} invalid field(s)", errors.len());
            self.errors = errors.clone();
            return Err(WizardError::StepInvalid { step, errors });
        }
        self.errors.clear();
        self.current_step = next;
        Ok(next)
    }

    pub fn retreat(&mut self) -> Result<WizardStep, WizardError> {
        let prev = self.current_step.prev().ok_or(WizardError::AtFirstStep)?;
        self.errors.clear();
        self.current_step = prev;
        Ok(prev)
    }

    /// Jump to `step`. Going back is always allowed; going forward requires every
    /// step before the target to be valid.
    pub fn go_to(&mut self, step: WizardStep) -> Result<WizardStep, WizardError> {
        if step > self.current_step {
            self.first_invalid_before(step)?;
        }
        self.errors.clear();
        self.current_step = step;
        Ok(step)
    }

    pub fn reset(&mut self) {
        self.reset_form();
    }

    fn first_invalid_before(&mut self, target: WizardStep) -> Result<(), WizardError> {
        for step in WizardStep::ALL.into_iter().take_while(|s| *s < target) {
            let errors = step.validate(&self.draft);
            if !errors.is_empty() {
                self.errors = errors.clone();
                return Err(WizardError::StepInvalid { step, errors });
            }
        }
        Ok(())
    }
}

/// Send the draft to the backend. Only allowed from the review step with every
/// earlier step valid and no submission already in flight.
///
/// The result lands in [`SubmissionState`] once the command completes.
pub fn submit_property(ctx: &mut StateCtx) -> Result<(), WizardError> {
    if ctx.state::<SubmissionState>().is_submitting() {
        return Err(WizardError::AlreadySubmitting);
    }

    let mut checked = Ok(());
    ctx.update::<PropertyFormState>(|form| {
        checked = if form.upload.is_uploading {
            Err(WizardError::UploadInProgress)
        } else if form.current_step.is_last() {
            form.first_invalid_before(WizardStep::Review)
        } else {
            Err(WizardError::NotOnReview)
        };
    });
    checked?;

    ctx.set(SubmissionState::Submitting);
    ctx.enqueue_command::<SubmitPropertyCommand>();
    Ok(())
}
