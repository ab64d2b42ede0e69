use std::collections::BTreeSet;

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{Office, OfficeProfile, SlotTime};
use crate::query::QueryService;
use crate::reconciler::{ReconcileError, Reconciler};
use crate::store::Store;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeForm {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub zip_code: String,
    pub state: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl TryFrom<OfficeForm> for OfficeProfile {
    type Error = String;

    fn try_from(form: OfficeForm) -> Result<Self, Self::Error> {
        if form.name.trim().is_empty() {
            return Err("office name is required".into());
        }
        if form.address.trim().is_empty() {
            return Err("office address is required".into());
        }
        if form.zip_code.trim().is_empty() {
            return Err("office ZIP code is required".into());
        }
        if !(-90.0..=90.0).contains(&form.latitude)
            || !(-180.0..=180.0).contains(&form.longitude)
        {
            return Err("office coordinates are out of range".into());
        }
        Ok(OfficeProfile {
            name: form.name.trim().to_string(),
            address: form.address.trim().to_string(),
            phone: form.phone,
            email: form.email,
            website: form.website,
            zip_code: form.zip_code.trim().to_string(),
            state: form.state,
            latitude: form.latitude,
            longitude: form.longitude,
        })
    }
}

#[tracing::instrument(name = "Registering a new office", skip(form, store), fields(office_name = %form.name))]
pub async fn create_office(
    form: web::Json<OfficeForm>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, ReconcileError> {
    let profile: OfficeProfile = form.0.try_into().map_err(ReconcileError::Validation)?;
    let office = Office::register(profile);
    store.insert_office(&office).await?;
    Ok(HttpResponse::Created().json(office))
}

#[tracing::instrument(name = "Listing open offices", skip(query))]
pub async fn list_offices(
    query: web::Data<QueryService>,
) -> Result<HttpResponse, ReconcileError> {
    let offices = query.list_open_offices().await?;
    Ok(HttpResponse::Ok().json(offices))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub zip: String,
    pub radius: f64,
}

#[tracing::instrument(name = "Searching offices", skip(query), fields(zip = %params.zip, radius = %params.radius))]
pub async fn search_offices(
    params: web::Query<SearchParams>,
    query: web::Data<QueryService>,
) -> Result<HttpResponse, ReconcileError> {
    let offices = query.search_offices(&params.zip, params.radius).await?;
    Ok(HttpResponse::Ok().json(offices))
}

#[tracing::instrument(name = "Fetching office", skip(store))]
pub async fn get_office(
    office_id: web::Path<Uuid>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, ReconcileError> {
    let office = store
        .get_office(*office_id)
        .await?
        .ok_or(ReconcileError::NotFound)?;
    Ok(HttpResponse::Ok().json(office))
}

#[tracing::instrument(name = "Updating office profile", skip(form, store))]
pub async fn update_office(
    office_id: web::Path<Uuid>,
    form: web::Json<OfficeForm>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, ReconcileError> {
    let profile: OfficeProfile = form.0.try_into().map_err(ReconcileError::Validation)?;
    let office = store
        .update_profile(*office_id, profile)
        .await?
        .ok_or(ReconcileError::NotFound)?;
    Ok(HttpResponse::Ok().json(office))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityForm {
    pub available_slots: Vec<SlotTime>,
}

#[tracing::instrument(name = "Operator sets availability", skip(form, reconciler))]
pub async fn set_availability(
    office_id: web::Path<Uuid>,
    form: web::Json<AvailabilityForm>,
    reconciler: web::Data<Reconciler>,
) -> Result<HttpResponse, ReconcileError> {
    // Duplicates collapse here; an empty set means fully booked/closed.
    let requested: BTreeSet<SlotTime> = form.0.available_slots.into_iter().collect();
    let office = reconciler.set_availability(*office_id, requested).await?;
    Ok(HttpResponse::Ok().json(office))
}

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub slot: SlotTime,
}

#[tracing::instrument(name = "Operator toggles slot", skip(form, reconciler))]
pub async fn toggle_slot(
    office_id: web::Path<Uuid>,
    form: web::Json<ToggleForm>,
    reconciler: web::Data<Reconciler>,
) -> Result<HttpResponse, ReconcileError> {
    let office = reconciler.toggle_slot(*office_id, form.slot).await?;
    Ok(HttpResponse::Ok().json(office))
}

#[tracing::instrument(name = "Operator views bookings", skip(store))]
pub async fn office_bookings(
    office_id: web::Path<Uuid>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, ReconcileError> {
    store
        .get_office(*office_id)
        .await?
        .ok_or(ReconcileError::NotFound)?;
    let bookings = store.bookings_for_office(*office_id).await?;
    Ok(HttpResponse::Ok().json(bookings))
}
