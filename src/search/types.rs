use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// De-duplicated keywords for one posting. Ordered so responses are stable.
pub type KeywordSet = BTreeSet<String>;

/// Latitude/longitude pair used to query the job board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// A listing exactly as the job board returned it, with every field
/// normalized to a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawPosting {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub location: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub company_logo: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub description: String,
}

/// Missing and `null` become `""`; numbers and booleans keep their JSON text.
fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Null) | Some(Value::Array(_)) | Some(Value::Object(_)) | None => String::new(),
    })
}

/// A normalized job listing returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Identifier assigned by the job board.
    #[serde(rename = "id")]
    pub item_id: String,
    pub name: String,
    pub address: String,
    pub url: String,
    pub image_url: String,
    pub keywords: KeywordSet,
    /// Whether the requesting user saved this listing.
    pub favorite: bool,
}
