//! CLI workflow tests against a mock backend.
//!
//! These don't spawn the binary. They drive the same state sequences the `list`,
//! `show`, `create` and `feedback` commands run, with photos read from real files.

use std::io::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use estately_business::{
    BusinessConfig, DraftPatch, FeedbackInput, FeedbackState, FormSession, GeoPosition,
    GetPropertyCommand, ListPropertiesCommand, ListingCategory, ListingsState, MoreDetails,
    NotificationLevel, Notifications, PhotoFile, PropertyDetailsInput, PropertyDetailsState,
    PropertyStatus, PropertyType, Route, SubmissionState, WizardStep, build_state_ctx,
    select_photo, submit_feedback, submit_property, toggle_favourite,
};
use estately_states::StateCtx;
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

const TOKEN: &str = "cli-token";

/// Test context for CLI workflow tests.
struct CliTestContext {
    mock_server: MockServer,
    ctx: StateCtx,
    photos: TempDir,
}

impl CliTestContext {
    async fn new() -> Self {
        let mock_server = MockServer::start().await;
        let config = BusinessConfig::new(mock_server.uri())
            .expect("mock server uri is valid")
            .with_auth_token(Some(TOKEN.to_owned()));
        let ctx = build_state_ctx(config);
        let photos = tempfile::tempdir().expect("temp dir for photos");

        Self {
            mock_server,
            ctx,
            photos,
        }
    }

    /// Flush all pending commands and wait for async tasks to complete.
    async fn flush_and_wait(&mut self) {
        self.ctx.sync_updates();
        self.ctx.flush_commands();

        let timeout = Duration::from_secs(5);
        let start = std::time::Instant::now();

        while self.ctx.task_count() > 0 {
            assert!(
                start.elapsed() <= timeout,
                "Timed out waiting for pending tasks ({} still in JoinSet)",
                self.ctx.task_count()
            );

            if self.ctx.task_set_mut().join_next().await.is_some() {
                self.ctx.sync_updates();
            }
        }

        self.ctx.sync_updates();
    }

    /// Write a photo file the way a user would have it on disk.
    fn photo_on_disk(&self, name: &str, size: usize) -> PathBuf {
        let path = self.photos.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create photo");
        file.write_all(&vec![b'x'; size]).expect("write photo");
        path
    }

    fn drained_messages(&mut self) -> Vec<(NotificationLevel, String)> {
        self.ctx
            .state_mut::<Notifications>()
            .drain()
            .into_iter()
            .map(|n| (n.level, n.message))
            .collect()
    }

    async fn shutdown(&mut self) {
        self.ctx.shutdown().await;
    }

    // =========================================================================
    // Mock helpers
    // =========================================================================

    async fn mock_listings(&self, items: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/property"))
            .and(header("authorization", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(items))
            .mount(&self.mock_server)
            .await;
    }

    async fn mock_upload(&self, url: &str) {
        Mock::given(method("POST"))
            .and(path("/upload-photos"))
            .and(header("authorization", TOKEN))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({ "photoUrls": [url] })),
            )
            .mount(&self.mock_server)
            .await;
    }
}

#[tokio::test]
async fn test_list_with_search_and_category() {
    let mut t = CliTestContext::new().await;
    t.mock_listings(serde_json::json!([
        { "id": "1", "name": "Lake House", "location": "Austin", "propertyStatus": "open-house" },
        { "id": "2", "name": "City Flat", "location": "Austin", "propertyStatus": "sold" },
        { "id": "3", "name": "Ranch", "location": "Houston", "propertyStatus": "open-house" }
    ]))
    .await;

    t.ctx.enqueue_command::<ListPropertiesCommand>();
    t.flush_and_wait().await;

    let category: ListingCategory = "open-houses".parse().expect("cli spelling");
    let listings = t.ctx.state::<ListingsState>();
    let names: Vec<&str> = listings
        .visible("austin", category)
        .into_iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["Lake House"]);

    t.shutdown().await;
}

#[tokio::test]
async fn test_list_favourites_from_saved_ids() {
    let mut t = CliTestContext::new().await;
    t.mock_listings(serde_json::json!([
        { "id": "1", "name": "Lake House", "propertyStatus": "for-sale" },
        { "id": "2", "name": "City Flat", "propertyStatus": "sold" },
        { "id": "3", "name": "Ranch", "propertyStatus": "for-sale" }
    ]))
    .await;

    // As loaded from the config file before the listing is fetched.
    t.ctx.set(ListingsState::with_favourites(["3".to_owned()]));
    assert!(toggle_favourite(&mut t.ctx, "2"));
    t.ctx.enqueue_command::<ListPropertiesCommand>();
    t.flush_and_wait().await;

    let listings = t.ctx.state::<ListingsState>();
    let favourite_names: Vec<&str> = listings
        .visible("", ListingCategory::All)
        .into_iter()
        .filter(|p| listings.is_favourite(&p.id))
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(favourite_names, vec!["City Flat", "Ranch"]);
    assert_eq!(
        listings.favourites.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["2", "3"]
    );

    assert!(!toggle_favourite(&mut t.ctx, "3"));
    assert!(!t.ctx.state::<ListingsState>().is_favourite("3"));

    t.shutdown().await;
}

#[tokio::test]
async fn test_show_missing_property() {
    let mut t = CliTestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/property/nope"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&t.mock_server)
        .await;

    t.ctx.set(Route::PropertyDetails("nope".to_owned()));
    t.ctx.set(PropertyDetailsInput {
        id: Some("nope".to_owned()),
    });
    t.ctx.enqueue_command::<GetPropertyCommand>();
    t.flush_and_wait().await;

    assert_eq!(
        t.ctx.state::<PropertyDetailsState>(),
        &PropertyDetailsState::NotFound
    );
    assert_eq!(t.ctx.state::<Route>().path(), "/property/nope");

    t.shutdown().await;
}

#[tokio::test]
async fn test_create_wizard_from_files_on_disk() {
    let mut t = CliTestContext::new().await;
    t.mock_upload("https://cdn.example.com/front.jpg").await;
    Mock::given(method("POST"))
        .and(path("/property"))
        .and(header("authorization", TOKEN))
        .and(body_partial_json(serde_json::json!({
            "name": "Lake House",
            "propertyStatus": "open-house",
            "photos": ["https://cdn.example.com/front.jpg"],
            "position": { "lat": 30.25, "lng": -97.75 },
            "moreDetails": { "propertyType": "villa", "bedrooms": 4, "isSwimmingPool": true }
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&t.mock_server)
        .await;

    t.ctx.set(Route::CreateProperty);
    t.ctx.update_form_data(
        DraftPatch::new()
            .name("Lake House")
            .description("Three storeys on the water")
            .price("480000")
            .location("Austin, TX")
            .property_status(PropertyStatus::OpenHouse),
    );
    assert_eq!(t.ctx.advance(), Ok(WizardStep::Photos));

    // Photos step refuses to advance until an upload lands.
    assert!(t.ctx.advance().is_err());
    let gif = t.photo_on_disk("anim.gif", 64);
    let rejected = select_photo(&mut t.ctx, PhotoFile::from_path(&gif).expect("read gif"));
    assert!(rejected.is_err());

    let jpg = t.photo_on_disk("front.jpg", 2048);
    let file = PhotoFile::from_path(&jpg).expect("read jpg");
    assert_eq!(file.mime, "image/jpeg");
    select_photo(&mut t.ctx, file).expect("jpg is accepted");
    t.flush_and_wait().await;
    assert_eq!(
        t.drained_messages(),
        vec![(
            NotificationLevel::Success,
            "Photos uploaded successfully".to_owned()
        )]
    );

    assert_eq!(t.ctx.advance(), Ok(WizardStep::MapPosition));
    t.ctx.set_position(GeoPosition::new(30.25, -97.75));
    assert_eq!(t.ctx.advance(), Ok(WizardStep::MoreDetails));
    t.ctx.set_more_details(MoreDetails {
        property_type: Some(PropertyType::Villa),
        bedrooms: 4,
        is_swimming_pool: true,
        ..MoreDetails::default()
    });
    assert_eq!(t.ctx.advance(), Ok(WizardStep::Review));

    submit_property(&mut t.ctx).expect("submit from review");
    t.flush_and_wait().await;

    assert_eq!(t.ctx.state::<SubmissionState>(), &SubmissionState::Created);
    assert_eq!(t.ctx.form().current_step, WizardStep::BasicInfo);
    assert_eq!(t.ctx.state::<Route>(), &Route::Listings);
    assert_eq!(
        t.drained_messages(),
        vec![(
            NotificationLevel::Success,
            "Property created successfully".to_owned()
        )]
    );

    t.shutdown().await;
}

#[tokio::test]
async fn test_feedback_from_flags() {
    let mut t = CliTestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/feedback"))
        .and(body_partial_json(serde_json::json!({ "rating": 4 })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&t.mock_server)
        .await;

    t.ctx.set(Route::CreateFeedback);
    t.ctx.set(FeedbackInput {
        name: "Grace".to_owned(),
        email: "grace@example.com".to_owned(),
        rating: 4,
        comment: String::new(),
    });
    submit_feedback(&mut t.ctx).expect("valid feedback");
    t.flush_and_wait().await;

    assert_eq!(t.ctx.state::<FeedbackState>(), &FeedbackState::Submitted);
    assert_eq!(
        t.drained_messages(),
        vec![(
            NotificationLevel::Success,
            "Feedback submitted successfully!".to_owned()
        )]
    );

    t.shutdown().await;
}
