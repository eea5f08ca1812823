//! Typed gateway to the property backend.
//!
//! Every request carries `Authorization: <token>` when a token is configured. Status
//! handling follows the backend contract: creation endpoints succeed only on `201`,
//! reads on `200`, photo upload on `200` or `201`.

use serde::Deserialize;

use crate::BusinessConfig;
use crate::details::PropertyRecord;
use crate::draft::PropertyDraft;
use crate::error::ApiError;
use crate::feedback::FeedbackInput;
use crate::http::{Client, Response};
use crate::listings::PropertySummary;
use crate::upload::PhotoFile;

/// Multipart field name the upload endpoint reads.
pub const UPLOAD_FIELD: &str = "files";

#[derive(Deserialize)]
#[serde(untagged)]
enum ListingBody {
    Bare(Vec<PropertySummary>),
    Wrapped { data: Vec<PropertySummary> },
}

#[derive(Deserialize)]
struct DetailBody {
    data: Option<PropertyRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadBody {
    #[serde(default)]
    photo_urls: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    config: BusinessConfig,
}

impl ApiClient {
    pub fn new(config: BusinessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BusinessConfig {
        &self.config
    }

    /// `GET /property`. Accepts a bare array or `{ "data": [...] }`.
    pub async fn list_properties(&self) -> Result<Vec<PropertySummary>, ApiError> {
        let response = Client::get(self.config.properties_url())
            .authorization(self.config.auth_token())
            .send()
            .await?;
        expect_status(&response, &[200])?;

        match decode::<ListingBody>(&response)? {
            ListingBody::Bare(items) | ListingBody::Wrapped { data: items } => Ok(items),
        }
    }

    /// `GET /property/:id`, unwrapping the `{ status, data }` envelope.
    pub async fn get_property(&self, id: &str) -> Result<PropertyRecord, ApiError> {
        let response = Client::get(self.config.property_url(id))
            .authorization(self.config.auth_token())
            .send()
            .await?;
        expect_status(&response, &[200])?;

        decode::<DetailBody>(&response)?
            .data
            .ok_or_else(|| ApiError::Decode("property response has no data".to_owned()))
    }

    /// `POST /property` with the whole draft as the body.
    pub async fn create_property(&self, draft: &PropertyDraft) -> Result<(), ApiError> {
        let response = Client::post(self.config.properties_url())
            .authorization(self.config.auth_token())
            .json(draft)
            .map_err(|e| ApiError::Decode(e.to_string()))?
            .send()
            .await?;
        expect_status(&response, &[201])
    }

    /// `POST /feedback`.
    pub async fn submit_feedback(&self, feedback: &FeedbackInput) -> Result<(), ApiError> {
        let response = Client::post(self.config.feedback_url())
            .authorization(self.config.auth_token())
            .json(feedback)
            .map_err(|e| ApiError::Decode(e.to_string()))?
            .send()
            .await?;
        expect_status(&response, &[201])
    }

    /// Upload one photo and return the first URL the backend reports for it.
    pub async fn upload_photo(&self, file: &PhotoFile) -> Result<String, ApiError> {
        let response = Client::post(self.config.upload_url())
            .authorization(self.config.auth_token())
            .multipart_file(UPLOAD_FIELD, &file.name, &file.mime, file.bytes.clone())
            .send()
            .await?;
        expect_status(&response, &[200, 201])?;

        decode::<UploadBody>(&response)?
            .photo_urls
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Decode("upload response contained no photo URLs".to_owned()))
    }
}

fn expect_status(response: &Response, accepted: &[u16]) -> Result<(), ApiError> {
    if accepted.contains(&response.status) {
        Ok(())
    } else {
        Err(ApiError::rejected(response))
    }
}

fn decode<T: serde::de::DeserializeOwned>(response: &Response) -> Result<T, ApiError> {
    response.json().map_err(|e| ApiError::Decode(e.to_string()))
}
