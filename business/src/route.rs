//! Route state for page navigation.
//!
//! Commands write this after a workflow finishes (for example, back to the listing
//! page after a property is created); the front end reads it to decide what to show.

use estately_states::State;
use serde::{Deserialize, Serialize};

/// Represents the current page of the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    /// Property listing page
    #[default]
    Listings,
    /// The property creation wizard
    CreateProperty,
    /// The feedback form
    CreateFeedback,
    /// A single property's detail page
    PropertyDetails(String),
}

impl State for Route {}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Listings => "/".to_owned(),
            Self::CreateProperty => "/create-property".to_owned(),
            Self::CreateFeedback => "/create-feedback".to_owned(),
            Self::PropertyDetails(id) => format!("/property/{id}"),
        }
    }
}
