use chairside::models::{Office, SlotTime};

use crate::utils::spawn_app;

const NINE_AM: i64 = 1737298800000;
const NINE_THIRTY: i64 = 1737300600000;
const TEN_AM: i64 = 1737302400000;

#[tokio::test]
async fn setting_availability_replaces_the_slot_set() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let office = app.seed_office("Pearl Dental", 40.75, -73.99, &[NINE_AM]).await;

    // Duplicates collapse.
    let body = serde_json::json!({ "availableSlots": [NINE_THIRTY, TEN_AM, TEN_AM] });
    let response = client
        .post(&format!("{}/offices/{}/availability", &app.address, office.id))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let updated = response.json::<Office>().await.unwrap();
    assert_eq!(
        updated.available_slots,
        [SlotTime(NINE_THIRTY), SlotTime(TEN_AM)].into_iter().collect()
    );
}

#[tokio::test]
async fn setting_availability_for_missing_office_returns_404() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!(
            "{}/offices/{}/availability",
            &app.address,
            uuid::Uuid::new_v4()
        ))
        .json(&serde_json::json!({ "availableSlots": [NINE_AM] }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn booked_slots_stay_closed_when_operator_rerequests_them() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let office = app
        .seed_office("Pearl Dental", 40.75, -73.99, &[NINE_AM, NINE_THIRTY])
        .await;

    let booking = serde_json::json!({
        "officeId": office.id,
        "slot": NINE_AM,
        "patientName": "Ada Lovelace",
    });
    let booked = client
        .post(&format!("{}/bookings", &app.address))
        .json(&booking)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, booked.status().as_u16());

    // Operator re-offers 9:00 AM; it must stay closed since it is booked.
    let body = serde_json::json!({ "availableSlots": [NINE_AM, NINE_THIRTY, TEN_AM] });
    let response = client
        .post(&format!("{}/offices/{}/availability", &app.address, office.id))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let updated = response.json::<Office>().await.unwrap();
    assert_eq!(
        updated.available_slots,
        [SlotTime(NINE_THIRTY), SlotTime(TEN_AM)].into_iter().collect()
    );
}

#[tokio::test]
async fn toggling_a_slot_twice_restores_the_set() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let office = app.seed_office("Pearl Dental", 40.75, -73.99, &[NINE_AM]).await;

    let toggle = |slot: i64| {
        client
            .post(format!(
                "{}/offices/{}/availability/toggle",
                &app.address, office.id
            ))
            .json(&serde_json::json!({ "slot": slot }))
            .send()
    };

    let on = toggle(NINE_THIRTY).await.expect("Failed to execute request.");
    assert_eq!(200, on.status().as_u16());
    let opened = on.json::<Office>().await.unwrap();
    assert!(opened.available_slots.contains(&SlotTime(NINE_THIRTY)));

    let off = toggle(NINE_THIRTY).await.expect("Failed to execute request.");
    assert_eq!(200, off.status().as_u16());
    let restored = off.json::<Office>().await.unwrap();
    assert_eq!(restored.available_slots, office.available_slots);
}

#[tokio::test]
async fn toggling_on_a_booked_slot_returns_409() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let office = app.seed_office("Pearl Dental", 40.75, -73.99, &[NINE_AM]).await;

    let booking = serde_json::json!({
        "officeId": office.id,
        "slot": NINE_AM,
        "patientName": "Ada Lovelace",
    });
    client
        .post(&format!("{}/bookings", &app.address))
        .json(&booking)
        .send()
        .await
        .expect("Failed to execute request.");

    let response = client
        .post(&format!(
            "{}/offices/{}/availability/toggle",
            &app.address, office.id
        ))
        .json(&serde_json::json!({ "slot": NINE_AM }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(409, response.status().as_u16());
}
