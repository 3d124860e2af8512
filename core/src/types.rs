//! Normalized domain entities returned to callers.
//!
//! # Design
//! These are flat, owned records with no trace of the wire wrappers. They are
//! produced only by the mapper and never mutated by the library afterwards.
//! Serde derives exist so callers (and the test vectors) can persist or
//! compare them as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Postal address and contact channels shared by pets and shelters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    pub fax: String,
}

/// One photo of a pet. `size` is the upstream's size class, kept opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Photo {
    pub size: String,
    pub url: String,
    pub id: String,
}

/// An adoptable animal listed by a shelter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pet {
    pub id: String,
    pub shelter_id: String,
    pub shelter_pet_id: String,
    pub name: String,
    pub animal: String,
    pub sex: String,
    pub size: String,
    pub age: String,
    pub breeds: Vec<String>,
    pub mix: bool,
    pub description: String,
    pub status: String,
    pub contact: Contact,
    pub photos: Vec<Photo>,
    pub options: Vec<String>,
    pub last_update: Option<DateTime<Utc>>,
}

/// An animal shelter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shelter {
    pub id: String,
    pub name: String,
    pub latitude: String,
    pub longitude: String,
    pub contact: Contact,
}
