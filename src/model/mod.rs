//! Domain records exchanged with the document store, plus the draft and
//! spatial-index logic that prepares them.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Report drafting and validation.
mod draft;
/// Fixed-precision spatial index codec.
pub mod geohash;

pub use draft::ReportDraft;

/// The kind of incident being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentCategory {
    /// An animal was seen, no interaction.
    #[default]
    Sighting,
    /// Property damage, livestock predation, or a close encounter.
    Conflict,
    /// A person or domestic animal was attacked.
    Attack,
}

impl IncidentCategory {
    /// Wire/display name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentCategory::Sighting => "sighting",
            IncidentCategory::Conflict => "conflict",
            IncidentCategory::Attack => "attack",
        }
    }
}

impl fmt::Display for IncidentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentCategory {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s {
            "sighting" => Ok(IncidentCategory::Sighting),
            "conflict" => Ok(IncidentCategory::Conflict),
            "attack" => Ok(IncidentCategory::Attack),
            other => Err(format!(
                "unknown incident category {other:?} (expected sighting, conflict or attack)"
            )),
        }
    }
}

/// Lifecycle status of a stored report. The app only ever writes `pending`;
/// later transitions happen server-side, so anything unrecognized maps to
/// [`IncidentStatus::Unknown`] instead of failing a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    /// Submitted, not yet reviewed.
    #[default]
    Pending,
    /// A status this client version does not know.
    #[serde(other)]
    Unknown,
}

/// A validated coordinate pair carrying its derived spatial index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Spatial index of the point at [`geohash::CELL_PRECISION`] characters.
    pub geohash: String,
}

impl GeoPoint {
    /// Validate the coordinate ranges and derive the spatial index.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::validation(
                "latitude",
                format!("latitude {latitude} is outside -90..=90"),
            ));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::validation(
                "longitude",
                format!("longitude {longitude} is outside -180..=180"),
            ));
        }

        Ok(Self {
            latitude,
            longitude,
            geohash: geohash::encode(latitude, longitude, geohash::CELL_PRECISION),
        })
    }
}

/// One field report, in the shape written to the `incidents` collection.
/// The identifier and the record-creation/update timestamps are assigned by
/// the store at write time and are therefore absent here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentReport {
    /// Identifier of the authenticated reporter.
    pub reporter_id: String,
    /// What kind of incident this is.
    pub incident_type: IncidentCategory,
    /// Free-text description, already trimmed and non-empty.
    pub description: String,
    /// Where the incident happened.
    pub location: GeoPoint,
    /// When the incident happened (capture time or user-supplied).
    pub incident_time: DateTime<Utc>,
    /// Always `pending` on creation.
    pub status: IncidentStatus,
}

/// Identity and contact attributes stored in the `users` collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// City.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State or province.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Postal code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
}

/// A managed educational content entry, read-only from the app's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    /// Headline.
    pub title: String,
    /// URL of the cover image.
    pub image: String,
    /// Teaser shown in the collapsed card.
    pub short_description: String,
    /// Full article body.
    pub full_description: String,
}

impl ResourceEntry {
    /// The content entries bundled with the app, shown when the managed
    /// `resources` collection has nothing newer.
    pub fn builtin() -> Vec<ResourceEntry> {
        vec![
            ResourceEntry {
                title: "Leopard Habitat Conservation".to_string(),
                image: "https://site-547756.mozfiles.com/files/547756/medium/leopard-515509-1.jpg"
                    .to_string(),
                short_description: "Efforts to protect the natural habitat of leopards..."
                    .to_string(),
                full_description: "Efforts to protect the natural habitat of leopards. Leopard \
                                   habitat conservation is crucial to maintaining biodiversity..."
                    .to_string(),
            },
            ResourceEntry {
                title: "Leopards in Culture".to_string(),
                image: "https://images.squarespace-cdn.com/content/v1/66ec3b49803ab81bf84f89e4/f8a0e784-afef-4eaa-a21f-b65b15ab3bdd/LeopardCheetaroDSC_6986.jpg"
                    .to_string(),
                short_description: "This piece explores the cultural significance of leopards \
                                    throughout history, examining their representation ..."
                    .to_string(),
                full_description: "This piece explores the cultural significance of leopards \
                                   throughout history, examining their representation in art, \
                                   mythology, and folklore across different societies. It \
                                   discusses how these cultural connections can play a role in \
                                   conservation efforts, fostering a sense of pride and \
                                   responsibility towards protecting leopards in the wild."
                    .to_string(),
            },
            ResourceEntry {
                title: "Leopard Population Monitoring".to_string(),
                image: "https://wildlifesos.org/wp-content/uploads/2023/05/230321_MLRC_Akash_Leopard_reunion_cub_female_TEJEWADI-VILLAGE_SOS00420-copy-scaled.jpg"
                    .to_string(),
                short_description: "Tracking leopard populations for better conservation..."
                    .to_string(),
                full_description: "Scientists use camera traps and GPS tracking...".to_string(),
            },
        ]
    }
}
