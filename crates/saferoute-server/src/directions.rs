//! Route alternatives from an OSRM-compatible directions service.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use async_trait::async_trait;
use reqwest::Client;
use saferoute_core::{GeoPoint, RawRoute};
use serde::Deserialize;
use std::time::Duration;

use crate::error::{DirectionsError, FetchError};

/// Supplies driving alternatives between two points.
///
/// Geometry is returned already converted to [`GeoPoint`]s; consumers never
/// see the provider's coordinate order.
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    async fn alternatives(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        origin_name: Option<&str>,
        destination_name: Option<&str>,
    ) -> Result<Vec<RawRoute>, DirectionsError>;
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
    #[serde(default)]
    waypoints: Vec<OsrmWaypoint>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct OsrmWaypoint {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Clone)]
pub struct OsrmDirections {
    client: Client,
    base_url: String,
    timeout: Duration,
    alternatives: usize,
}

impl OsrmDirections {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        timeout: Duration,
        alternatives: usize,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            alternatives: alternatives.max(1),
        }
    }

    fn route_url(&self, origin: GeoPoint, destination: GeoPoint) -> String {
        format!(
            "{}/route/v1/driving/{:.6},{:.6};{:.6},{:.6}",
            self.base_url, origin.lng, origin.lat, destination.lng, destination.lat
        )
    }
}

#[async_trait]
impl DirectionsProvider for OsrmDirections {
    async fn alternatives(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        origin_name: Option<&str>,
        destination_name: Option<&str>,
    ) -> Result<Vec<RawRoute>, DirectionsError> {
        let url = self.route_url(origin, destination);
        let alternatives = if self.alternatives > 1 {
            self.alternatives.to_string()
        } else {
            "false".to_string()
        };

        let response = self
            .client
            .get(&url)
            .query(&[
                ("alternatives", alternatives.as_str()),
                ("overview", "full"),
                ("geometries", "geojson"),
                ("steps", "false"),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| FetchError::from_reqwest(&url, &err))?;

        // OSRM reports routing failures as 400 with a JSON body.
        let status = response.status();
        if !status.is_success() && status != reqwest::StatusCode::BAD_REQUEST {
            return Err(FetchError::from_status(&url, status).into());
        }

        let payload: RouteResponse = response
            .json()
            .await
            .map_err(|err| FetchError::Parse(err.to_string()))?;

        let start = address(origin_name, payload.waypoints.first(), origin);
        let end = address(destination_name, payload.waypoints.last(), destination);
        routes_from_response(payload, &start, &end)
    }
}

fn address(given: Option<&str>, waypoint: Option<&OsrmWaypoint>, point: GeoPoint) -> String {
    given
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or_else(|| waypoint.map(|w| w.name.trim()).filter(|name| !name.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("{:.4},{:.4}", point.lat, point.lng))
}

fn routes_from_response(
    payload: RouteResponse,
    start_address: &str,
    end_address: &str,
) -> Result<Vec<RawRoute>, DirectionsError> {
    match payload.code.as_str() {
        "Ok" => {}
        "NoRoute" | "NoSegment" => return Err(DirectionsError::NoRoute),
        other => {
            let message = payload.message.unwrap_or_else(|| other.to_string());
            return Err(DirectionsError::Rejected(message));
        }
    }

    let routes: Vec<RawRoute> = payload
        .routes
        .into_iter()
        .filter_map(|route| {
            let path = path_from_geojson(&route.geometry)?;
            Some(RawRoute {
                path,
                distance_m: route.distance,
                duration_s: route.duration,
                start_address: start_address.to_string(),
                end_address: end_address.to_string(),
                raw_geometry: route.geometry,
            })
        })
        .collect();

    if routes.is_empty() {
        return Err(DirectionsError::NoRoute);
    }
    Ok(routes)
}

/// GeoJSON LineString coordinates are `[lng, lat]`.
fn path_from_geojson(geometry: &serde_json::Value) -> Option<Vec<GeoPoint>> {
    let coordinates = geometry.get("coordinates")?.as_array()?;
    let path: Vec<GeoPoint> = coordinates
        .iter()
        .filter_map(|pair| {
            let pair = pair.as_array()?;
            let lng = pair.first()?.as_f64()?;
            let lat = pair.get(1)?.as_f64()?;
            Some(GeoPoint::new(lat, lng))
        })
        .filter(GeoPoint::is_finite)
        .collect();
    (path.len() >= 2).then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RouteResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn geometry_is_converted_from_lng_lat() {
        let payload = parse(
            r#"{"code":"Ok","routes":[{"distance":1200.0,"duration":300.0,
                "geometry":{"type":"LineString","coordinates":[[2.35,48.85],[2.36,48.86]]}}]}"#,
        );
        let routes = routes_from_response(payload, "A", "B").unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].path[0], GeoPoint::new(48.85, 2.35));
        assert_eq!(routes[0].duration_s, 300.0);
        assert_eq!(routes[0].start_address, "A");
    }

    #[test]
    fn routes_with_degenerate_geometry_are_dropped() {
        let payload = parse(
            r#"{"code":"Ok","routes":[{"distance":0.0,"duration":0.0,
                "geometry":{"type":"LineString","coordinates":[[2.35,48.85]]}}]}"#,
        );
        assert!(matches!(
            routes_from_response(payload, "A", "B"),
            Err(DirectionsError::NoRoute)
        ));
    }

    #[test]
    fn provider_codes_map_to_errors() {
        let no_route = parse(r#"{"code":"NoRoute"}"#);
        assert!(matches!(
            routes_from_response(no_route, "A", "B"),
            Err(DirectionsError::NoRoute)
        ));

        let invalid = parse(r#"{"code":"InvalidQuery","message":"Query string malformed"}"#);
        match routes_from_response(invalid, "A", "B") {
            Err(DirectionsError::Rejected(message)) => assert_eq!(message, "Query string malformed"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn address_prefers_caller_name_then_waypoint() {
        let point = GeoPoint::new(1.0, 2.0);
        let waypoint = OsrmWaypoint {
            name: "Rue de Rivoli".to_string(),
        };
        assert_eq!(address(Some("Home"), Some(&waypoint), point), "Home");
        assert_eq!(address(Some("  "), Some(&waypoint), point), "Rue de Rivoli");
        assert_eq!(address(None, None, point), "1.0000,2.0000");
    }

    #[test]
    fn route_url_uses_lng_lat_order() {
        let directions = OsrmDirections::new(
            Client::new(),
            "http://osrm.test/",
            Duration::from_secs(5),
            3,
        );
        let url = directions.route_url(GeoPoint::new(48.0, 2.0), GeoPoint::new(49.0, 3.0));
        assert_eq!(
            url,
            "http://osrm.test/route/v1/driving/2.000000,48.000000;3.000000,49.000000"
        );
    }
}
