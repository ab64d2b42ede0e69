use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slot::SlotTime;

/// A dental practice: profile attributes plus the current set of open slots.
///
/// Offices are created at signup and mutated by the operator (profile edits,
/// slot toggles) and by the reconciler (slot removal on booking, bulk clears).
/// They are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Office {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub zip_code: String,
    pub state: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub available_slots: BTreeSet<SlotTime>,
}

/// Operator-supplied profile fields, shared by registration and profile update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeProfile {
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

impl Office {
    /// A freshly registered office starts fully closed.
    pub fn register(profile: OfficeProfile) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: profile.name,
            address: profile.address,
            phone: profile.phone,
            email: profile.email,
            website: profile.website,
            zip_code: profile.zip_code,
            state: profile.state,
            latitude: profile.latitude,
            longitude: profile.longitude,
            available_slots: BTreeSet::new(),
        }
    }

    pub fn apply_profile(&mut self, profile: OfficeProfile) {
        self.name = profile.name;
        self.address = profile.address;
        self.phone = profile.phone;
        self.email = profile.email;
        self.website = profile.website;
        self.zip_code = profile.zip_code;
        self.state = profile.state;
        self.latitude = profile.latitude;
        self.longitude = profile.longitude;
    }
}
