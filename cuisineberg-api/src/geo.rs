//! Country/state/city reference data for the registration flow.
//!
//! The datasets are phpMyAdmin JSON table exports hosted as static files:
//! each file is an array of entries (version headers, database markers) of
//! which exactly one is the payload table (`"type": "table"`), whose `data`
//! field holds the rows. Row ids and parent ids are strings, since the
//! export stringifies every column.

use serde::{Deserialize, de::DeserializeOwned};

use crate::error::{RestError, RestErrorKind};

/// Base URL the three dataset files are fetched from.
pub const GEO_DATA_URL: &str =
    "https://raw.githubusercontent.com/mustafasolak/country_state_city/refs/heads/main";

/// One row of `tbl_countries`.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct GeoCountry {
    pub id: String,
    pub name: String,
}

/// One row of `tbl_states`.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct GeoState {
    pub id: String,
    pub name: String,
    #[serde(rename = "countryId")]
    pub country_id: String,
}

/// One row of `tbl_cities`.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct GeoCity {
    pub id: String,
    pub name: String,
    #[serde(rename = "stateId")]
    pub state_id: String,
}

impl GeoCountry {
    /// The export table holding the country rows.
    pub const TABLE: &'static str = "tbl_countries";
}

impl GeoState {
    /// The export table holding the state rows.
    pub const TABLE: &'static str = "tbl_states";
}

impl GeoCity {
    /// The export table holding the city rows.
    pub const TABLE: &'static str = "tbl_cities";
}

/// A whole phpMyAdmin JSON export file, parsed far enough to locate the
/// payload table.
#[derive(Clone, Debug, Deserialize)]
pub struct GeoExport(pub Vec<GeoExportEntry>);

/// One entry of a [`GeoExport`]. Non-table entries (version headers etc.)
/// parse with empty fields.
#[derive(Clone, Debug, Deserialize)]
pub struct GeoExportEntry {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl GeoExport {
    /// Extract the rows of the named table, e.g. [`GeoCountry::TABLE`].
    pub fn table_rows<T: DeserializeOwned>(
        self,
        table: &str,
    ) -> Result<Vec<T>, RestError> {
        let entry = self
            .0
            .into_iter()
            .find(|entry| entry.kind == "table" && entry.name == table)
            .ok_or_else(|| {
                RestError::new(
                    RestErrorKind::Decode,
                    format!("Geo data export is missing table '{table}'"),
                )
            })?;
        serde_json::from_value(entry.data).map_err(RestError::from)
    }
}
