//! Query parameters accepted by the search endpoints.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::search::GeoPoint;

/// Parameters of a job search request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, rocket::form::FromForm)]
pub struct SearchParams {
    /// User whose favorites are merged into the results. Blank means none.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Latitude of the search center.
    pub lat: f64,
    /// Longitude of the search center.
    pub lon: f64,
    /// Free-text job keyword; the feed default applies when omitted.
    #[serde(default)]
    pub keyword: Option<String>,
}

impl SearchParams {
    pub fn user_id(&self) -> &str {
        self.user_id.as_deref().map(str::trim).unwrap_or_default()
    }

    pub fn geo(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(user_id: Option<&str>, keyword: Option<&str>) -> SearchParams {
        SearchParams {
            user_id: user_id.map(str::to_string),
            lat: 47.6,
            lon: -122.3,
            keyword: keyword.map(str::to_string),
        }
    }

    #[test]
    fn absent_user_is_blank() {
        assert_eq!(params(None, None).user_id(), "");
        assert_eq!(params(Some(" bob "), None).user_id(), "bob");
    }

    #[test]
    fn blank_keyword_is_absent() {
        assert_eq!(params(None, Some("   ")).keyword(), None);
        assert_eq!(params(None, Some(" rust ")).keyword(), Some(" rust "));
    }

    #[test]
    fn geo_carries_coordinates() {
        assert_eq!(params(None, None).geo(), GeoPoint::new(47.6, -122.3));
    }
}
