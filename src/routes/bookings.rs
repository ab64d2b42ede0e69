use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{BookingRequest, SlotTime};
use crate::reconciler::{ReconcileError, Reconciler};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    pub office_id: Uuid,
    pub slot: SlotTime,
    pub patient_name: String,
    pub patient_email: Option<String>,
    pub patient_phone: Option<String>,
    pub reason: Option<String>,
}

impl TryFrom<BookingForm> for BookingRequest {
    type Error = String;

    fn try_from(form: BookingForm) -> Result<Self, Self::Error> {
        if form.patient_name.trim().is_empty() {
            return Err("patient name is required".into());
        }
        if let Some(email) = &form.patient_email {
            if !email.contains('@') {
                return Err("patient email is malformed".into());
            }
        }
        Ok(BookingRequest {
            office_id: form.office_id,
            slot: form.slot,
            patient_name: form.patient_name.trim().to_string(),
            patient_email: form.patient_email,
            patient_phone: form.patient_phone,
            reason: form.reason,
        })
    }
}

#[tracing::instrument(
    name = "Patient books a slot",
    skip(form, reconciler),
    fields(office_id = %form.office_id, slot = %form.slot)
)]
pub async fn book_slot(
    form: web::Json<BookingForm>,
    reconciler: web::Data<Reconciler>,
) -> Result<HttpResponse, ReconcileError> {
    let request: BookingRequest = form.0.try_into().map_err(ReconcileError::Validation)?;
    let booking = reconciler.book_slot(request).await?;
    Ok(HttpResponse::Created().json(booking))
}
