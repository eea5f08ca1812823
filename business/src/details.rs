//! Property detail page.
//!
//! Set [`PropertyDetailsInput::id`], enqueue [`GetPropertyCommand`], then read
//! [`PropertyDetailsState`].

use estately_states::{
    CancellationToken, Command, CommandFuture, CommandSnapshot, LatestOnlyUpdater, State,
};
use serde::{Deserialize, Serialize};

use crate::BusinessConfig;
use crate::api::ApiClient;
use crate::draft::{GeoPosition, MoreDetails, PropertyStatus, format_price};
use crate::error::ApiError;
use crate::notification::{Notification, Notifications};
use crate::wire;

/// A stored property as the backend returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyRecord {
    #[serde(alias = "_id", deserialize_with = "wire::id")]
    pub id: String,
    #[serde(alias = "propertyName")]
    pub name: String,
    pub description: String,
    #[serde(deserialize_with = "wire::price")]
    pub price: Option<f64>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub property_status: Option<PropertyStatus>,
    pub photos: Vec<String>,
    pub position: Option<GeoPosition>,
    pub more_details: MoreDetails,
}

impl PropertyRecord {
    pub fn display_price(&self) -> String {
        format_price(self.price)
    }

    pub fn display_location(&self) -> &str {
        [&self.location, &self.address]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("Location not specified")
    }

    pub fn status_label(&self) -> &str {
        self.property_status
            .as_ref()
            .map_or("Unknown", PropertyStatus::label)
    }

    /// Map marker, if one was placed.
    pub fn marker(&self) -> Option<GeoPosition> {
        self.position.filter(|p| !p.is_unset() && p.is_in_range())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PropertyDetailsInput {
    pub id: Option<String>,
}

impl State for PropertyDetailsInput {}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum PropertyDetailsState {
    #[default]
    Idle,
    Loading,
    Loaded(Box<PropertyRecord>),
    NotFound,
    Failed(String),
}

impl State for PropertyDetailsState {}

impl PropertyDetailsState {
    pub fn record(&self) -> Option<&PropertyRecord> {
        match self {
            Self::Loaded(record) => Some(record),
            _ => None,
        }
    }
}

/// Loads the record for `PropertyDetailsInput::id`.
#[derive(Default, Debug)]
pub struct GetPropertyCommand;

impl Command for GetPropertyCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> CommandFuture {
        let input = snap.state::<PropertyDetailsInput>().clone();
        let config = snap.state::<BusinessConfig>().clone();

        Box::pin(async move {
            let Some(id) = input.id.filter(|id| !id.trim().is_empty()) else {
                log::info!("GetPropertyCommand: no property id set, skipping");
                return;
            };

            updater.set(PropertyDetailsState::Loading);
            log::info!("GetPropertyCommand: loading property {id}");

            let (state, toast) = match ApiClient::new(config).get_property(&id).await {
                Ok(record) => (PropertyDetailsState::Loaded(Box::new(record)), None),
                Err(ApiError::Rejected { status: 404, .. }) => {
                    log::warn!("GetPropertyCommand: property {id} not found");
                    (PropertyDetailsState::NotFound, Some("Property not found".to_owned()))
                }
                Err(e @ ApiError::Transport(_)) => {
                    log::error!("GetPropertyCommand: {e}");
                    let msg = "Error loading property details".to_owned();
                    (PropertyDetailsState::Failed(msg.clone()), Some(msg))
                }
                Err(e) => {
                    log::error!("GetPropertyCommand: {e}");
                    let msg = e
                        .backend_message()
                        .unwrap_or("Failed to load property details")
                        .to_owned();
                    (PropertyDetailsState::Failed(msg.clone()), Some(msg))
                }
            };

            updater.set(state);
            if let Some(msg) = toast {
                updater.update::<Notifications>(move |n| n.push(Notification::error(msg)));
            }
        })
    }
}
