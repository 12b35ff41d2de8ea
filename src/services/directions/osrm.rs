use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::DirectionsProvider;
use crate::models::{Coordinates, Route};

/// Driving directions from an OSRM-compatible routing server.
pub struct OsrmProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OsrmProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn route_url(&self, origin: Coordinates, destination: Coordinates) -> String {
        format!(
            "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url,
            origin.longitude,
            origin.latitude,
            destination.longitude,
            destination.latitude
        )
    }
}

#[derive(Deserialize)]
struct OsrmResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: OsrmGeometry,
}

#[derive(Deserialize)]
struct OsrmGeometry {
    /// `[longitude, latitude]` pairs.
    coordinates: Vec<[f64; 2]>,
}

fn into_route(resp: OsrmResponse) -> anyhow::Result<Route> {
    if resp.code != "Ok" {
        anyhow::bail!(
            "routing failed ({}): {}",
            resp.code,
            resp.message.unwrap_or_default()
        );
    }

    let route = resp
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("no route in routing response"))?;

    Ok(Route {
        distance_meters: route.distance,
        duration_seconds: route.duration,
        geometry: route
            .geometry
            .coordinates
            .into_iter()
            .map(|[longitude, latitude]| Coordinates {
                latitude,
                longitude,
            })
            .collect(),
    })
}

/// OSRM answers routing failures with a 4xx and a JSON `code`, so a parsed
/// body wins over the status. Anything else non-success keeps its status.
fn parse_response(status: StatusCode, body: &str) -> anyhow::Result<Route> {
    let data: OsrmResponse = match serde_json::from_str(body) {
        Ok(data) => data,
        Err(_) if !status.is_success() => anyhow::bail!("routing API error ({status})"),
        Err(e) => return Err(e).context("failed to parse routing response"),
    };

    if !status.is_success() && data.code == "Ok" {
        anyhow::bail!("routing API error ({status})");
    }

    into_route(data)
}

#[async_trait]
impl DirectionsProvider for OsrmProvider {
    async fn route(&self, origin: Coordinates, destination: Coordinates) -> anyhow::Result<Route> {
        let url = self.route_url(origin, destination);
        tracing::debug!(%url, "requesting route");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("failed to call routing API")?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("failed to read routing response")?;

        parse_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_url() {
        let provider = OsrmProvider::new("https://router.example.com/".to_string());
        let url = provider.route_url(
            Coordinates {
                latitude: 14.5,
                longitude: 121.0,
            },
            Coordinates {
                latitude: 14.6,
                longitude: 121.1,
            },
        );
        assert_eq!(
            url,
            "https://router.example.com/route/v1/driving/121,14.5;121.1,14.6?overview=full&geometries=geojson"
        );
    }

    #[test]
    fn test_parse_route() {
        let json = r#"{"code":"Ok","routes":[{"distance":1520.4,"duration":300.2,"geometry":{"type":"LineString","coordinates":[[121.0,14.5],[121.1,14.6]]}}]}"#;
        let route = into_route(serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(route.distance_meters, 1520.4);
        assert_eq!(route.duration_seconds, 300.2);
        assert_eq!(route.geometry.len(), 2);
        assert_eq!(route.geometry[0].latitude, 14.5);
        assert_eq!(route.geometry[0].longitude, 121.0);
    }

    #[test]
    fn test_parse_error_code() {
        let json = r#"{"code":"NoRoute","message":"Impossible route between points"}"#;
        let err = into_route(serde_json::from_str(json).unwrap()).unwrap_err();
        assert!(err.to_string().contains("NoRoute"));
    }

    #[test]
    fn test_parse_empty_routes() {
        let json = r#"{"code":"Ok","routes":[]}"#;
        assert!(into_route(serde_json::from_str(json).unwrap()).is_err());
    }

    #[test]
    fn test_non_json_error_keeps_status() {
        let body = "<html><body>502 Bad Gateway</body></html>";
        let err = parse_response(StatusCode::BAD_GATEWAY, body).unwrap_err();
        assert_eq!(err.to_string(), "routing API error (502 Bad Gateway)");
    }

    #[test]
    fn test_error_status_with_routing_code() {
        let body = r#"{"code":"InvalidQuery","message":"Query string malformed"}"#;
        let err = parse_response(StatusCode::BAD_REQUEST, body).unwrap_err();
        assert!(err.to_string().contains("InvalidQuery"));

        let body = r#"{"code":"Ok","routes":[]}"#;
        let err = parse_response(StatusCode::SERVICE_UNAVAILABLE, body).unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_garbage_success_body() {
        let err = parse_response(StatusCode::OK, "not json").unwrap_err();
        assert!(err.to_string().contains("failed to parse routing response"));
    }
}
