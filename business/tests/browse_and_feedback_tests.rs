//! Listing, detail and feedback commands driven through the state context.

mod common;

use std::io::Write as _;

use common::TestContext;
use estately_business::{
    FeedbackInput, FeedbackState, GetPropertyCommand, ListPropertiesCommand, ListingCategory,
    ListingsState, ListingsStatus, NotificationLevel, Notifications, PhotoFile,
    PropertyDetailsInput, PropertyDetailsState, submit_feedback,
};
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{method, path},
};

#[tokio::test]
async fn test_list_properties_command_loads_and_filters() {
    let mut t = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/property"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                { "id": "1", "name": "Lake House", "location": "Austin", "price": 250000,
                  "photos": ["https://cdn.example.com/1.png"], "propertyStatus": "for-sale" },
                { "id": "2", "name": "Downtown Loft", "address": "5 Main St, Dallas",
                  "propertyStatus": "sold" }
            ]
        })))
        .mount(&t.mock_server)
        .await;

    t.ctx.enqueue_command::<ListPropertiesCommand>();
    t.flush_and_wait().await;

    let state = t.ctx.state::<ListingsState>();
    assert_eq!(state.properties().len(), 2);
    let dallas = state.visible("dallas", ListingCategory::All);
    assert_eq!(dallas.len(), 1);
    assert_eq!(dallas[0].display_location(), "5 Main St, Dallas");
    assert_eq!(state.visible("", ListingCategory::NewListings)[0].name, "Lake House");
    assert_eq!(state.properties()[0].display_price(), "$250,000");
}

#[tokio::test]
async fn test_list_properties_failure_is_reported() {
    let mut t = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/property"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&t.mock_server)
        .await;

    t.ctx.update::<ListingsState>(|s| {
        s.toggle_favourite("1");
    });
    t.ctx.enqueue_command::<ListPropertiesCommand>();
    t.flush_and_wait().await;

    let state = t.ctx.state::<ListingsState>();
    assert_eq!(
        state.status,
        ListingsStatus::Failed("Failed to load properties".to_owned())
    );
    assert!(state.is_favourite("1"));
}

#[tokio::test]
async fn test_get_property_command_loads_record() {
    let mut t = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/property/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200,
            "data": { "id": 42, "name": "Lake House", "propertyStatus": "forSale",
                      "moreDetails": { "bedrooms": "3", "isParking": true } }
        })))
        .mount(&t.mock_server)
        .await;

    t.ctx.set(PropertyDetailsInput {
        id: Some("42".to_owned()),
    });
    t.ctx.enqueue_command::<GetPropertyCommand>();
    t.flush_and_wait().await;

    let record = t
        .ctx
        .state::<PropertyDetailsState>()
        .record()
        .expect("record loaded");
    assert_eq!(record.id, "42");
    assert_eq!(record.status_label(), "For Sale");
    assert_eq!(record.more_details.bedrooms, 3);
    assert_eq!(record.more_details.amenities(), vec!["Parking"]);
}

#[tokio::test]
async fn test_get_property_404_is_not_found() {
    let mut t = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/property/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&t.mock_server)
        .await;

    t.ctx.set(PropertyDetailsInput {
        id: Some("missing".to_owned()),
    });
    t.ctx.enqueue_command::<GetPropertyCommand>();
    t.flush_and_wait().await;

    assert_eq!(
        t.ctx.state::<PropertyDetailsState>(),
        &PropertyDetailsState::NotFound
    );
    let last = t.ctx.state::<Notifications>().last().cloned().expect("a notification");
    assert_eq!(last.message, "Property not found");
}

#[tokio::test]
async fn test_get_property_failure_uses_backend_message() {
    let mut t = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/property/7"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({ "message": "db down" })),
        )
        .mount(&t.mock_server)
        .await;

    t.ctx.set(PropertyDetailsInput {
        id: Some("7".to_owned()),
    });
    t.ctx.enqueue_command::<GetPropertyCommand>();
    t.flush_and_wait().await;

    assert_eq!(
        t.ctx.state::<PropertyDetailsState>(),
        &PropertyDetailsState::Failed("db down".to_owned())
    );
}

#[tokio::test]
async fn test_feedback_success_resets_input() {
    let mut t = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/feedback"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&t.mock_server)
        .await;

    t.ctx.set(FeedbackInput {
        name: "Ada".to_owned(),
        email: "ada@example.com".to_owned(),
        rating: 5,
        comment: String::new(),
    });
    submit_feedback(&mut t.ctx).expect("valid feedback");
    t.flush_and_wait().await;

    assert_eq!(t.ctx.state::<FeedbackInput>(), &FeedbackInput::default());
    assert_eq!(t.ctx.state::<FeedbackState>(), &FeedbackState::Submitted);
    let last = t.ctx.state::<Notifications>().last().cloned().expect("a notification");
    assert_eq!(last.level, NotificationLevel::Success);
    assert_eq!(last.message, "Feedback submitted successfully!");
}

#[tokio::test]
async fn test_feedback_failure_keeps_input() {
    let mut t = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/feedback"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&t.mock_server)
        .await;

    let input = FeedbackInput {
        name: "Ada".to_owned(),
        email: "ada@example.com".to_owned(),
        rating: 2,
        comment: "Slow".to_owned(),
    };
    t.ctx.set(input.clone());
    submit_feedback(&mut t.ctx).expect("valid feedback");
    t.flush_and_wait().await;

    assert_eq!(t.ctx.state::<FeedbackInput>(), &input);
    let last = t.ctx.state::<Notifications>().last().cloned().expect("a notification");
    assert_eq!(last.level, NotificationLevel::Error);
    assert_eq!(last.message, "Failed to submit feedback");
}

#[tokio::test]
async fn test_invalid_feedback_never_hits_network() {
    let mut t = TestContext::new().await;
    t.ctx.set(FeedbackInput {
        email: "not-an-email".to_owned(),
        ..FeedbackInput::default()
    });

    let err = submit_feedback(&mut t.ctx).unwrap_err();
    assert!(err.0.contains_key("email"));
    t.flush_and_wait().await;
    assert_eq!(t.requests_to("/feedback").await, 0);
    assert_eq!(t.ctx.state::<FeedbackState>(), &FeedbackState::Idle);
}

#[test]
fn test_photo_file_from_path_guesses_mime() {
    let mut tmp = tempfile::Builder::new()
        .suffix(".jpg")
        .tempfile()
        .expect("create temp file");
    tmp.write_all(b"jpeg-bytes").expect("write temp file");

    let file = PhotoFile::from_path(tmp.path()).expect("read temp file");
    assert_eq!(file.mime, "image/jpeg");
    assert_eq!(file.size(), 10);
    assert_eq!(file.extension().as_deref(), Some("jpg"));
}
