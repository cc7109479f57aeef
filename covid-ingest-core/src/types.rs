//! Location and statistics types shared by the ingester and the read queries.
//!
//! Field names serialize in camelCase to match the JSON shape consumers of
//! the original feed API expect.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::slug::country_slug;
use crate::status::StatusKind;

// ── Location ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Country {
    #[serde(rename = "countryName")]
    pub name: String,
    #[serde(rename = "countrySlug")]
    pub slug: String,
}

impl Country {
    /// Build a country from its display name, deriving the slug.
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = country_slug(&name);
        Self { name, slug }
    }
}

/// A (province, country) pair as it appears in a source row.
///
/// `province` is empty for country-level rows. Coordinates are absent on
/// aggregated read results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(flatten)]
    pub country: Country,
    pub province: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Location {
    pub fn new(
        province: impl Into<String>,
        country_name: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            country: Country::from_name(country_name),
            province: province.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Province and country label for log messages.
    pub fn label(&self) -> String {
        if self.province.is_empty() {
            self.country.name.clone()
        } else {
            format!("{}, {}", self.province, self.country.name)
        }
    }
}

// ── Statistics ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CovidStats {
    pub confirmed: i64,
    pub new_confirmed: i64,
    #[serde(rename = "recovered")]
    pub recoveries: i64,
    #[serde(rename = "newRecovered")]
    pub new_recoveries: i64,
    pub deaths: i64,
    pub new_deaths: i64,
}

impl std::ops::AddAssign for CovidStats {
    fn add_assign(&mut self, rhs: Self) {
        self.confirmed += rhs.confirmed;
        self.new_confirmed += rhs.new_confirmed;
        self.recoveries += rhs.recoveries;
        self.new_recoveries += rhs.new_recoveries;
        self.deaths += rhs.deaths;
        self.new_deaths += rhs.new_deaths;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationStats {
    #[serde(flatten)]
    pub location: Location,
    #[serde(flatten)]
    pub stats: CovidStats,
}

/// World totals plus the per-country breakdown they were summed from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(flatten)]
    pub stats: CovidStats,
    pub countries: Vec<LocationStats>,
}

// ── Time series ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    #[serde(flatten)]
    pub location: Location,
    pub status: StatusKind,
    pub amount: i64,
    pub new: i64,
    pub date: NaiveDate,
}
