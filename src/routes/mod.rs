use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::reconciler::ReconcileError;

mod bookings;
mod health_check;
mod offices;
mod ws;

pub use bookings::book_slot;
pub use health_check::health_check;
pub use offices::{
    create_office, get_office, list_offices, office_bookings, search_offices, set_availability,
    toggle_slot, update_office,
};
pub use ws::ws_subscribe;

impl ResponseError for ReconcileError {
    fn status_code(&self) -> StatusCode {
        match self {
            ReconcileError::NotFound => StatusCode::NOT_FOUND,
            // "never offered" and "just taken" deliberately collapse to 409.
            ReconcileError::SlotUnavailable | ReconcileError::Conflict => StatusCode::CONFLICT,
            ReconcileError::Validation(_) => StatusCode::BAD_REQUEST,
            ReconcileError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ReconcileError::StoreUnavailable(e) = self {
            tracing::error!("Store failure surfaced to client: {e:?}");
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "message": self.to_string(),
        }))
    }
}
