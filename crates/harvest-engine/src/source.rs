//! Upstream map-data sources: request shaping and payload dispatch.
//!
//! Each source knows how to build its sector query and which extraction
//! strategy decodes its responses. Request headers and the choice between
//! equivalent query hosts are randomized per attempt as anti-detection
//! pacing.

use harvest_core::{PlaceRecord, SourceTag};
use harvest_grid::Sector;
use rand::seq::SliceRandom;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, RequestBuilder};

/// Equivalent hosts for the map-search endpoint; one is picked at random
/// per attempt.
const SEARCH_HOSTS: [&str; 2] = [
    "https://www.google.com/search",
    "https://www.google.es/search",
];

/// Overpass API endpoint.
const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Radius in meters for Overpass around-queries.
const OVERPASS_RADIUS_M: u32 = 2_000;

/// Small fixed pool of browser user agents.
const USER_AGENTS: [&str; 2] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36",
];

/// Small fixed pool of accept-language values.
const ACCEPT_LANGUAGES: [&str; 3] = ["es-ES", "en-US", "en-GB"];

/// One upstream map-data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapSource {
    /// Map search with listings embedded in script payloads
    MapSearch,
    /// OpenStreetMap data via the Overpass API
    Overpass,
}

impl MapSource {
    /// The provenance tag records from this source carry.
    #[must_use]
    pub fn tag(self) -> SourceTag {
        match self {
            Self::MapSearch => SourceTag::MapSearch,
            Self::Overpass => SourceTag::Overpass,
        }
    }

    /// Build the sector query request, with randomized headers.
    #[must_use]
    pub fn build_request(self, client: &Client, sector: &Sector, query: &str) -> RequestBuilder {
        let mut rng = rand::thread_rng();
        let user_agent = USER_AGENTS.choose(&mut rng).expect("non-empty pool");
        let language = ACCEPT_LANGUAGES.choose(&mut rng).expect("non-empty pool");

        let builder = match self {
            Self::MapSearch => {
                let host = SEARCH_HOSTS.choose(&mut rng).expect("non-empty pool");
                let encoded_query = query.replace(' ', "%20");
                let url = format!(
                    "{host}?tbm=map&tch=1&q={encoded_query}%20@{},{}&hl=es",
                    sector.lat, sector.lng
                );
                client.get(url)
            }
            Self::Overpass => client
                .post(OVERPASS_URL)
                .form(&[("data", overpass_query(sector))]),
        };

        builder
            .header(USER_AGENT, *user_agent)
            .header(ACCEPT, "text/html,*/*;q=0.8")
            .header(ACCEPT_LANGUAGE, *language)
    }

    /// Decode a response body into place records.
    ///
    /// `center` is the sector midpoint used for coordinate fallbacks.
    pub fn parse(
        self,
        body: &str,
        center: (f64, f64),
    ) -> harvest_extract::Result<Vec<PlaceRecord>> {
        match self {
            Self::MapSearch => harvest_extract::extract_embedded(body, center),
            Self::Overpass => harvest_extract::extract_overpass(body, center),
        }
    }
}

/// Overpass QL query for named amenities and shops around a sector center.
fn overpass_query(sector: &Sector) -> String {
    format!(
        r#"[out:json][timeout:25];
(
  node["name"]["amenity"](around:{radius},{lat},{lng});
  way["name"]["amenity"](around:{radius},{lat},{lng});
  node["name"]["shop"](around:{radius},{lat},{lng});
  way["name"]["shop"](around:{radius},{lat},{lng});
);
out body;"#,
        radius = OVERPASS_RADIUS_M,
        lat = sector.lat,
        lng = sector.lng
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_grid::Region;

    fn sector() -> Sector {
        Sector {
            id: "3_4".to_string(),
            lat: 40.5,
            lng: -3.25,
            bounds: Region {
                lat_min: 40.0,
                lat_max: 41.0,
                lng_min: -3.5,
                lng_max: -3.0,
            },
            is_land: true,
        }
    }

    #[test]
    fn test_map_search_request_url() {
        let client = Client::new();
        let request = MapSource::MapSearch
            .build_request(&client, &sector(), "tapas bar")
            .build()
            .expect("build request");

        let url = request.url().as_str();
        assert!(url.contains("tbm=map"));
        assert!(url.contains("tch=1"));
        assert!(url.contains("tapas%20bar%20@40.5,-3.25"));
        assert!(url.starts_with("https://www.google."));
        assert!(request.headers().contains_key(USER_AGENT));
        assert!(request.headers().contains_key(ACCEPT_LANGUAGE));
    }

    #[test]
    fn test_overpass_request_targets_interpreter() {
        let client = Client::new();
        let request = MapSource::Overpass
            .build_request(&client, &sector(), "ignored")
            .build()
            .expect("build request");

        assert_eq!(request.url().as_str(), OVERPASS_URL);
        assert_eq!(request.method(), &reqwest::Method::POST);
    }

    #[test]
    fn test_overpass_query_mentions_sector_center() {
        let query = overpass_query(&sector());
        assert!(query.contains("around:2000,40.5,-3.25"));
        assert!(query.contains(r#"node["name"]["amenity"]"#));
        assert!(query.contains(r#"way["name"]["shop"]"#));
    }

    #[test]
    fn test_source_tags() {
        assert_eq!(MapSource::MapSearch.tag(), SourceTag::MapSearch);
        assert_eq!(MapSource::Overpass.tag(), SourceTag::Overpass);
    }
}
