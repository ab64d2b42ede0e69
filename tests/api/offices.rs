use chairside::models::Office;
use chairside::store::Store;
use rstest::rstest;

use crate::utils::spawn_app;

#[tokio::test]
async fn registering_an_office_returns_201() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let body = serde_json::json!({
        "name": "Pearl Dental",
        "address": "12 Elm St",
        "phone": "555-0100",
        "zipCode": "10001",
        "state": "NY",
        "latitude": 40.7506,
        "longitude": -73.9972,
    });
    let response = client
        .post(&format!("{}/offices", &app.address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(201, response.status().as_u16());
    let office = response.json::<Office>().await.unwrap();
    assert_eq!(office.name, "Pearl Dental");
    assert!(office.available_slots.is_empty());

    let stored = app.store.get_office(office.id).await.unwrap();
    assert!(stored.is_some());
}

#[rstest]
#[case(serde_json::json!({"name": "", "address": "12 Elm St", "zipCode": "10001", "latitude": 40.0, "longitude": -73.0}))]
#[case(serde_json::json!({"name": "Pearl", "address": "", "zipCode": "10001", "latitude": 40.0, "longitude": -73.0}))]
#[case(serde_json::json!({"name": "Pearl", "address": "12 Elm St", "zipCode": "10001", "latitude": 200.0, "longitude": -73.0}))]
#[tokio::test]
async fn registering_an_invalid_office_returns_400(#[case] body: serde_json::Value) {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/offices", &app.address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn listing_offices_excludes_fully_booked_ones() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    app.seed_office("Open Office", 40.75, -73.99, &[1737327600000]).await;
    app.seed_office("Closed Office", 40.75, -73.99, &[]).await;

    let response = client
        .get(&format!("{}/offices", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let offices = response.json::<Vec<Office>>().await.unwrap();
    assert_eq!(offices.len(), 1);
    assert_eq!(offices[0].name, "Open Office");
}

#[tokio::test]
async fn search_returns_only_open_offices_within_radius() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    // ~1 mile from the 10001 centroid.
    app.seed_office("Near", 40.7612, -73.9777, &[1737327600000]).await;
    // Philadelphia.
    app.seed_office("Far", 39.9526, -75.1652, &[1737327600000]).await;
    app.seed_office("Near Closed", 40.7612, -73.9777, &[]).await;

    let response = client
        .get(&format!("{}/offices/search?zip=10001&radius=25", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let offices = response.json::<Vec<Office>>().await.unwrap();
    assert_eq!(offices.len(), 1);
    assert_eq!(offices[0].name, "Near");
}

#[tokio::test]
async fn search_with_unknown_zip_returns_400() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/offices/search?zip=00000&radius=25", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn updating_an_office_profile_keeps_its_slots() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let office = app.seed_office("Pearl Dental", 40.75, -73.99, &[1737327600000]).await;

    let body = serde_json::json!({
        "name": "Pearl Dental & Ortho",
        "address": "14 Elm St",
        "zipCode": "10016",
        "state": "NY",
        "latitude": 40.7454,
        "longitude": -73.9785,
    });
    let response = client
        .put(&format!("{}/offices/{}", &app.address, office.id))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let updated = response.json::<Office>().await.unwrap();
    assert_eq!(updated.name, "Pearl Dental & Ortho");
    assert_eq!(updated.available_slots, office.available_slots);
}

#[tokio::test]
async fn fetching_a_missing_office_returns_404() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/offices/{}", &app.address, uuid::Uuid::new_v4()))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}
