use std::sync::Arc;

use crate::geo::{haversine_miles, GeoPoint, Geocoder};
use crate::models::Office;
use crate::reconciler::ReconcileError;
use crate::store::Store;

/// Read-only projections over the slot store for public search.
///
/// Offices with an empty slot set are fully booked or closed and excluded from
/// public listings.
pub struct QueryService {
    store: Arc<dyn Store>,
    geocoder: Arc<dyn Geocoder>,
}

impl QueryService {
    pub fn new(store: Arc<dyn Store>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { store, geocoder }
    }

    #[tracing::instrument(name = "Listing open offices", skip(self))]
    pub async fn list_open_offices(&self) -> Result<Vec<Office>, ReconcileError> {
        let offices = self.store.list_offices().await?;
        Ok(offices
            .into_iter()
            .filter(|o| !o.available_slots.is_empty())
            .collect())
    }

    /// Open offices within `radius_miles` of the query ZIP's centroid.
    #[tracing::instrument(name = "Searching offices by ZIP", skip(self))]
    pub async fn search_offices(
        &self,
        zip: &str,
        radius_miles: f64,
    ) -> Result<Vec<Office>, ReconcileError> {
        if !(radius_miles > 0.0) {
            return Err(ReconcileError::Validation(
                "radius must be a positive number of miles".into(),
            ));
        }
        let origin = self.geocoder.locate(zip).ok_or_else(|| {
            ReconcileError::Validation(format!("unknown ZIP code: {zip}"))
        })?;

        let open = self.list_open_offices().await?;
        Ok(open
            .into_iter()
            .filter(|office| {
                let here = GeoPoint {
                    latitude: office.latitude,
                    longitude: office.longitude,
                };
                haversine_miles(origin, here) <= radius_miles
            })
            .collect())
    }
}
