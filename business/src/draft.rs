//! The in-progress property record and its enumerations.
//!
//! Enumerations fail soft: values the backend sends that we do not know are kept
//! as `Unknown(raw)` and rendered with their raw text instead of erroring. Values
//! typed by the user go through `FromStr`, which is strict.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} {value:?}, expected one of: {expected}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

fn squash(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyStatus {
    ForSale,
    OpenHouse,
    PriceReduced,
    Sold,
    Unknown(String),
}

impl PropertyStatus {
    pub const ALL: [Self; 4] = [Self::ForSale, Self::OpenHouse, Self::PriceReduced, Self::Sold];

    pub fn as_str(&self) -> &str {
        match self {
            Self::ForSale => "for-sale",
            Self::OpenHouse => "open-house",
            Self::PriceReduced => "price-reduced",
            Self::Sold => "sold",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::ForSale => "For Sale",
            Self::OpenHouse => "Open House",
            Self::PriceReduced => "Price Reduced",
            Self::Sold => "Sold",
            Self::Unknown(raw) => match squash(raw).as_str() {
                "forrent" => "For Rent",
                "rented" => "Rented",
                "" => "Unknown",
                _ => raw,
            },
        }
    }

    /// Accepts `for-sale`, `forSale`, `for_sale` and friends; anything else is kept.
    pub fn parse_lenient(raw: &str) -> Self {
        match squash(raw).as_str() {
            "forsale" => Self::ForSale,
            "openhouse" => Self::OpenHouse,
            "pricereduced" => Self::PriceReduced,
            "sold" => Self::Sold,
            _ => Self::Unknown(raw.to_owned()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl FromStr for PropertyStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::parse_lenient(s) {
            Self::Unknown(value) => Err(UnknownVariant {
                kind: "property status",
                value,
                expected: "for-sale, open-house, price-reduced, sold",
            }),
            known => Ok(known),
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for PropertyStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PropertyStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyType {
    House,
    Apartment,
    Villa,
    Townhouse,
    Flat,
    Unknown(String),
}

impl PropertyType {
    pub const ALL: [Self; 5] = [
        Self::House,
        Self::Apartment,
        Self::Villa,
        Self::Townhouse,
        Self::Flat,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::House => "house",
            Self::Apartment => "apartment",
            Self::Villa => "villa",
            Self::Townhouse => "townhouse",
            Self::Flat => "flat",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::House => "House",
            Self::Apartment => "Apartment",
            Self::Villa => "Villa",
            Self::Townhouse => "Townhouse",
            Self::Flat => "Flat",
            Self::Unknown(raw) if raw.trim().is_empty() => "Unknown",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn parse_lenient(raw: &str) -> Self {
        match squash(raw).as_str() {
            "house" => Self::House,
            "apartment" => Self::Apartment,
            "villa" => Self::Villa,
            "townhouse" => Self::Townhouse,
            "flat" => Self::Flat,
            _ => Self::Unknown(raw.to_owned()),
        }
    }
}

impl FromStr for PropertyType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::parse_lenient(s) {
            Self::Unknown(value) => Err(UnknownVariant {
                kind: "property type",
                value,
                expected: "house, apartment, villa, townhouse, flat",
            }),
            known => Ok(known),
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for PropertyType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PropertyType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&raw))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPosition {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// `(0, 0)` means the marker was never placed.
    pub fn is_unset(&self) -> bool {
        self.lat == 0.0 && self.lng == 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MoreDetails {
    pub property_type: Option<PropertyType>,
    #[serde(deserialize_with = "crate::wire::count")]
    pub bedrooms: u32,
    #[serde(deserialize_with = "crate::wire::count")]
    pub bathrooms: u32,
    #[serde(deserialize_with = "crate::wire::count")]
    pub kitchens: u32,
    pub is_furnished: bool,
    pub is_parking: bool,
    pub is_pet_friendly: bool,
    pub is_swimming_pool: bool,
    pub is_gym: bool,
}

impl MoreDetails {
    /// Labels of the enabled amenities, in display order.
    pub fn amenities(&self) -> Vec<&'static str> {
        [
            (self.is_furnished, "Furnished"),
            (self.is_parking, "Parking"),
            (self.is_pet_friendly, "Pet Friendly"),
            (self.is_swimming_pool, "Swimming Pool"),
            (self.is_gym, "Gym"),
        ]
        .into_iter()
        .filter_map(|(on, label)| on.then_some(label))
        .collect()
    }
}

/// The property being created. Serialized as the `POST /property` body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDraft {
    pub name: String,
    pub description: String,
    /// Kept as typed; see [`parsed_price`](Self::parsed_price).
    pub price: String,
    pub location: String,
    pub property_status: Option<PropertyStatus>,
    /// Gallery order is insertion order.
    pub photos: Vec<String>,
    pub position: GeoPosition,
    pub more_details: MoreDetails,
}

impl PropertyDraft {
    pub fn parsed_price(&self) -> Result<f64, &'static str> {
        let raw = self.price.trim();
        if raw.is_empty() {
            return Err("Price is required");
        }
        let value: f64 = raw.parse().map_err(|_| "Price must be a number")?;
        if !value.is_finite() || value < 0.0 {
            return Err("Price must be a non-negative number");
        }
        Ok(value)
    }
}

/// A partial update to [`PropertyDraft`].
///
/// Only the fields that are `Some` are written. Nested values are replaced whole:
/// to change one amenity, copy the current `MoreDetails`, edit it, and patch it in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub location: Option<String>,
    pub property_status: Option<PropertyStatus>,
    pub photos: Option<Vec<String>>,
    pub position: Option<GeoPosition>,
    pub more_details: Option<MoreDetails>,
}

impl DraftPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn property_status(mut self, status: PropertyStatus) -> Self {
        self.property_status = Some(status);
        self
    }

    pub fn photos(mut self, photos: Vec<String>) -> Self {
        self.photos = Some(photos);
        self
    }

    pub fn position(mut self, position: GeoPosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn more_details(mut self, details: MoreDetails) -> Self {
        self.more_details = Some(details);
        self
    }

    /// Names of the fields this patch writes, as they appear on the wire.
    pub fn keys(&self) -> Vec<&'static str> {
        [
            (self.name.is_some(), "name"),
            (self.description.is_some(), "description"),
            (self.price.is_some(), "price"),
            (self.location.is_some(), "location"),
            (self.property_status.is_some(), "propertyStatus"),
            (self.photos.is_some(), "photos"),
            (self.position.is_some(), "position"),
            (self.more_details.is_some(), "moreDetails"),
        ]
        .into_iter()
        .filter_map(|(present, key)| present.then_some(key))
        .collect()
    }

    pub fn apply(self, draft: &mut PropertyDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(location) = self.location {
            draft.location = location;
        }
        if let Some(status) = self.property_status {
            draft.property_status = Some(status);
        }
        if let Some(photos) = self.photos {
            draft.photos = photos;
        }
        if let Some(position) = self.position {
            draft.position = position;
        }
        if let Some(details) = self.more_details {
            draft.more_details = details;
        }
    }
}

/// US-dollar display without cents; missing or zero reads "Price on request".
pub fn format_price(price: Option<f64>) -> String {
    let Some(price) = price.filter(|p| p.is_finite() && *p != 0.0) else {
        return "Price on request".to_owned();
    };
    let rounded = price.abs().round() as u64;
    let digits = rounded.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if price < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}")
}
