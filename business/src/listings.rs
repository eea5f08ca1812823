//! Property listing page: fetch, search, category tabs and favourites.
//!
//! ## How to use
//! - `ctx.enqueue_command::<ListPropertiesCommand>()`, then flush and sync.
//! - Read `ctx.state::<ListingsState>()` and call [`ListingsState::visible`] with the
//!   current search text and category.
//! - Favourites live for the session. Seed them with [`ListingsState::with_favourites`]
//!   and flip one with [`toggle_favourite`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use estately_states::{
    CancellationToken, Command, CommandFuture, CommandSnapshot, LatestOnlyUpdater, State,
    StateCtx,
};
use serde::{Deserialize, Serialize};

use crate::BusinessConfig;
use crate::api::ApiClient;
use crate::draft::{PropertyStatus, UnknownVariant, format_price};
use crate::wire;

/// One card on the listing page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertySummary {
    #[serde(alias = "_id", deserialize_with = "wire::id")]
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub address: Option<String>,
    #[serde(deserialize_with = "wire::price")]
    pub price: Option<f64>,
    pub photos: Vec<String>,
    pub property_status: Option<PropertyStatus>,
}

impl PropertySummary {
    pub fn display_location(&self) -> &str {
        [&self.location, &self.address]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("Location not specified")
    }

    pub fn cover_photo(&self) -> Option<&str> {
        self.photos.first().map(String::as_str)
    }

    pub fn display_price(&self) -> String {
        format_price(self.price)
    }

    pub fn status_label(&self) -> &str {
        self.property_status
            .as_ref()
            .map_or("Unknown", PropertyStatus::label)
    }

    /// Case-insensitive substring match over name, location and address.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        let hit = |field: &str| field.to_lowercase().contains(&query);
        hit(&self.name)
            || self.location.as_deref().is_some_and(hit)
            || self.address.as_deref().is_some_and(hit)
    }
}

/// Tabs above the listing grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ListingCategory {
    #[default]
    All,
    NewListings,
    PriceReduced,
    OpenHouses,
    RecentlySold,
}

impl ListingCategory {
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::NewListings,
        Self::PriceReduced,
        Self::OpenHouses,
        Self::RecentlySold,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All Properties",
            Self::NewListings => "New Listings",
            Self::PriceReduced => "Price Reduced",
            Self::OpenHouses => "Open Houses",
            Self::RecentlySold => "Recently Sold",
        }
    }

    pub fn includes(self, property: &PropertySummary) -> bool {
        let wanted = match self {
            Self::All => return true,
            Self::NewListings => PropertyStatus::ForSale,
            Self::PriceReduced => PropertyStatus::PriceReduced,
            Self::OpenHouses => PropertyStatus::OpenHouse,
            Self::RecentlySold => PropertyStatus::Sold,
        };
        property.property_status.as_ref() == Some(&wanted)
    }
}

impl fmt::Display for ListingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ListingCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let squashed: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        match squashed.as_str() {
            "all" | "allproperties" => Ok(Self::All),
            "new" | "newlistings" => Ok(Self::NewListings),
            "pricereduced" | "reduced" => Ok(Self::PriceReduced),
            "openhouse" | "openhouses" => Ok(Self::OpenHouses),
            "sold" | "recentlysold" => Ok(Self::RecentlySold),
            _ => Err(UnknownVariant {
                kind: "listing category",
                value: s.to_owned(),
                expected: "all, new, price-reduced, open-houses, sold",
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ListingsStatus {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<PropertySummary>),
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingsState {
    pub status: ListingsStatus,
    pub favourites: BTreeSet<String>,
}

impl State for ListingsState {}

impl ListingsState {
    pub fn with_favourites(ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            favourites: ids.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn properties(&self) -> &[PropertySummary] {
        match &self.status {
            ListingsStatus::Loaded(items) => items,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, ListingsStatus::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ListingsStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// Properties matching both the search text and the category tab.
    pub fn visible(&self, query: &str, category: ListingCategory) -> Vec<&PropertySummary> {
        filter_listings(self.properties(), query)
            .into_iter()
            .filter(|p| category.includes(p))
            .collect()
    }

    /// Returns whether `id` is a favourite after the toggle.
    pub fn toggle_favourite(&mut self, id: &str) -> bool {
        if self.favourites.remove(id) {
            false
        } else {
            self.favourites.insert(id.to_owned());
            true
        }
    }

    pub fn is_favourite(&self, id: &str) -> bool {
        self.favourites.contains(id)
    }
}

/// Flip `id` in the session's favourites. Returns whether it is a favourite now.
pub fn toggle_favourite(ctx: &mut StateCtx, id: &str) -> bool {
    let mut now = false;
    ctx.update::<ListingsState>(|listings| now = listings.toggle_favourite(id));
    log::debug!("favourite {id}: {now}");
    now
}

pub fn filter_listings<'a>(properties: &'a [PropertySummary], query: &str) -> Vec<&'a PropertySummary> {
    properties.iter().filter(|p| p.matches(query)).collect()
}

/// Fetches every property into [`ListingsState`]. Favourites are kept.
#[derive(Default, Debug)]
pub struct ListPropertiesCommand;

impl Command for ListPropertiesCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> CommandFuture {
        let config = snap.state::<BusinessConfig>().clone();

        Box::pin(async move {
            updater.update::<ListingsState>(|s| s.status = ListingsStatus::Loading);

            let status = match ApiClient::new(config).list_properties().await {
                Ok(items) => {
                    log::info!("ListPropertiesCommand: loaded {} properties", items.len());
                    ListingsStatus::Loaded(items)
                }
                Err(e) => {
                    log::error!("ListPropertiesCommand: {e}");
                    ListingsStatus::Failed("Failed to load properties".to_owned())
                }
            };
            updater.update::<ListingsState>(move |s| s.status = status);
        })
    }
}
