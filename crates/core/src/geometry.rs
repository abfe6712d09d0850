//! Trajectory and location geometry.
//!
//! Both geometries serialize as GeoJSON. Coordinates are always stored in
//! geographic order (longitude first), while [`Sample`]s and the builder
//! functions take latitude first, as the relational source does.
//!
//! A trajectory vertex carries the pose channels of its sample alongside the
//! two geographic coordinates:
//!
//! ```text
//! [lng, lat, time_code, theta_x, theta_y, theta_z, r, alpha]
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::selection::has_distinct_positions;
use crate::types::Sample;

/// Number of components in one trajectory position.
pub const VERTEX_CHANNELS: usize = 8;

fn kind_of(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A single geographic point, serialized as a GeoJSON `Point`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "geojson::Geometry", try_from = "geojson::Geometry")]
pub struct Location {
    pub lng: f64,
    pub lat: f64,
}

impl From<Location> for geojson::Geometry {
    fn from(location: Location) -> Self {
        geojson::Geometry::new(geojson::Value::Point(vec![location.lng, location.lat]))
    }
}

impl TryFrom<geojson::Geometry> for Location {
    type Error = CoreError;

    fn try_from(geometry: geojson::Geometry) -> Result<Self, Self::Error> {
        match geometry.value {
            geojson::Value::Point(position) if position.len() >= 2 => Ok(Self {
                lng: position[0],
                lat: position[1],
            }),
            geojson::Value::Point(position) => Err(CoreError::InvalidGeometry(format!(
                "point has {} coordinate(s), expected 2",
                position.len()
            ))),
            other => Err(CoreError::InvalidGeometry(format!(
                "expected Point, got {}",
                kind_of(&other)
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Trajectory
// ---------------------------------------------------------------------------

/// One trajectory vertex: a position plus the pose channels of its sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub lng: f64,
    pub lat: f64,
    pub time_code: i64,
    pub theta_x: f64,
    pub theta_y: f64,
    pub theta_z: f64,
    pub r: f64,
    pub alpha: f64,
}

impl Vertex {
    fn from_sample(sample: &Sample) -> Self {
        Self {
            lng: sample.lng,
            lat: sample.lat,
            // Truncates toward zero, dropping any fractional part.
            time_code: sample.time_code.trunc() as i64,
            theta_x: sample.theta_x,
            theta_y: sample.theta_y,
            theta_z: sample.theta_z,
            r: sample.r,
            alpha: sample.alpha,
        }
    }

    fn to_position(self) -> Vec<f64> {
        vec![
            self.lng,
            self.lat,
            self.time_code as f64,
            self.theta_x,
            self.theta_y,
            self.theta_z,
            self.r,
            self.alpha,
        ]
    }

    fn from_position(position: &[f64]) -> Result<Self, CoreError> {
        if position.len() != VERTEX_CHANNELS {
            return Err(CoreError::InvalidGeometry(format!(
                "trajectory position has {} component(s), expected {VERTEX_CHANNELS}",
                position.len()
            )));
        }
        Ok(Self {
            lng: position[0],
            lat: position[1],
            time_code: position[2].trunc() as i64,
            theta_x: position[3],
            theta_y: position[4],
            theta_z: position[5],
            r: position[6],
            alpha: position[7],
        })
    }
}

/// An ordered camera path, serialized as a GeoJSON `LineString`.
///
/// Only [`build_trajectory`] and GeoJSON decoding construct one, so every
/// trajectory has at least two vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "geojson::Geometry", try_from = "geojson::Geometry")]
pub struct Trajectory {
    vertices: Vec<Vertex>,
}

impl Trajectory {
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The path as a two-dimensional GeoJSON `LineString` (`[lng, lat]`
    /// positions only), suitable for a spatial index column.
    pub fn planar_geometry(&self) -> geojson::Geometry {
        let positions = self
            .vertices
            .iter()
            .map(|v| vec![v.lng, v.lat])
            .collect();
        geojson::Geometry::new(geojson::Value::LineString(positions))
    }

    /// The path as a planar `geo` line string in `(lng, lat)` order.
    pub fn to_line_string(&self) -> geo::LineString<f64> {
        self.vertices
            .iter()
            .map(|v| (v.lng, v.lat))
            .collect::<Vec<_>>()
            .into()
    }
}

impl From<Trajectory> for geojson::Geometry {
    fn from(trajectory: Trajectory) -> Self {
        let positions = trajectory
            .vertices
            .into_iter()
            .map(Vertex::to_position)
            .collect();
        geojson::Geometry::new(geojson::Value::LineString(positions))
    }
}

impl TryFrom<geojson::Geometry> for Trajectory {
    type Error = CoreError;

    fn try_from(geometry: geojson::Geometry) -> Result<Self, Self::Error> {
        let positions = match geometry.value {
            geojson::Value::LineString(positions) => positions,
            other => {
                return Err(CoreError::InvalidGeometry(format!(
                    "expected LineString, got {}",
                    kind_of(&other)
                )))
            }
        };
        if positions.len() < 2 {
            return Err(CoreError::InvalidGeometry(format!(
                "line string has {} position(s), expected at least 2",
                positions.len()
            )));
        }
        let vertices = positions
            .iter()
            .map(|p| Vertex::from_position(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { vertices })
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Build the location point of a video from its first observed position.
pub fn build_location(lat: f64, lng: f64) -> Location {
    Location { lng, lat }
}

/// Build a trajectory from samples already sorted by ascending time code.
///
/// Vertices keep the input order. Fails with
/// [`CoreError::DegenerateGeometry`] when the samples do not cover at least
/// two distinct positions, since such a path has no valid line geometry.
pub fn build_trajectory(samples: &[Sample]) -> Result<Trajectory, CoreError> {
    if !has_distinct_positions(samples) {
        return Err(CoreError::DegenerateGeometry {
            samples: samples.len(),
        });
    }

    let vertices = samples.iter().map(Vertex::from_sample).collect();
    Ok(Trajectory { vertices })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn sample(lat: f64, lng: f64, time_code: f64) -> Sample {
        Sample {
            lat,
            lng,
            time_code,
            theta_x: 1.0,
            theta_y: 2.0,
            theta_z: 3.0,
            r: 0.1,
            alpha: 45.0,
        }
    }

    // -- build_location -------------------------------------------------------

    #[test]
    fn location_swaps_to_lng_lat() {
        let location = build_location(10.0, 20.0);
        assert_eq!(location.lng, 20.0);
        assert_eq!(location.lat, 10.0);

        let json = serde_json::to_value(location).unwrap();
        assert_eq!(json["type"], "Point");
        assert_eq!(json["coordinates"], serde_json::json!([20.0, 10.0]));
    }

    // -- build_trajectory -----------------------------------------------------

    #[test]
    fn first_vertex_is_transposed() {
        let samples = [
            sample(10.0, 20.0, 0.0),
            sample(10.0, 20.0, 5.0),
            sample(11.0, 21.0, 10.0),
        ];
        let trajectory = build_trajectory(&samples).unwrap();

        assert_eq!(trajectory.len(), 3);
        let first = trajectory.vertices()[0];
        assert_eq!((first.lng, first.lat, first.time_code), (20.0, 10.0, 0));
    }

    #[test]
    fn vertex_order_follows_sample_order() {
        let samples: Vec<Sample> = (0..20)
            .map(|i| sample(i as f64 * 0.5, -(i as f64), i as f64 * 3.0))
            .collect();
        let trajectory = build_trajectory(&samples).unwrap();

        assert_eq!(trajectory.len(), samples.len());
        for (vertex, sample) in trajectory.vertices().iter().zip(&samples) {
            assert_eq!(vertex.lng, sample.lng);
            assert_eq!(vertex.lat, sample.lat);
            assert_eq!(vertex.time_code, sample.time_code as i64);
        }
    }

    #[test]
    fn time_code_is_truncated() {
        let samples = [sample(1.0, 1.0, 4.9), sample(2.0, 2.0, 7.2)];
        let trajectory = build_trajectory(&samples).unwrap();
        let times: Vec<i64> = trajectory.vertices().iter().map(|v| v.time_code).collect();
        assert_eq!(times, vec![4, 7]);
    }

    #[test]
    fn identical_positions_are_degenerate() {
        let samples = [sample(5.0, 5.0, 0.0), sample(5.0, 5.0, 1.0), sample(5.0, 5.0, 2.0)];
        assert_matches!(
            build_trajectory(&samples),
            Err(CoreError::DegenerateGeometry { samples: 3 })
        );
    }

    #[test]
    fn empty_and_single_samples_are_degenerate() {
        assert_matches!(
            build_trajectory(&[]),
            Err(CoreError::DegenerateGeometry { samples: 0 })
        );
        assert_matches!(
            build_trajectory(&[sample(1.0, 2.0, 0.0)]),
            Err(CoreError::DegenerateGeometry { samples: 1 })
        );
    }

    // -- GeoJSON --------------------------------------------------------------

    #[test]
    fn trajectory_serializes_all_channels() {
        let samples = [sample(10.0, 20.0, 0.0), sample(11.0, 21.0, 10.0)];
        let json = serde_json::to_value(build_trajectory(&samples).unwrap()).unwrap();

        assert_eq!(json["type"], "LineString");
        assert_eq!(
            json["coordinates"][1],
            serde_json::json!([21.0, 11.0, 10.0, 1.0, 2.0, 3.0, 0.1, 45.0])
        );
    }

    #[test]
    fn trajectory_decodes_from_stored_document() {
        let json = serde_json::json!({
            "type": "LineString",
            "coordinates": [
                [20.0, 10.0, 0.0, 1.0, 2.0, 3.0, 0.1, 45.0],
                [21.0, 11.0, 10.0, 1.0, 2.0, 3.0, 0.1, 45.0]
            ]
        });
        let trajectory: Trajectory = serde_json::from_value(json).unwrap();
        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.vertices()[1].time_code, 10);
    }

    #[test]
    fn trajectory_rejects_short_positions() {
        let json = serde_json::json!({
            "type": "LineString",
            "coordinates": [[20.0, 10.0], [21.0, 11.0]]
        });
        assert!(serde_json::from_value::<Trajectory>(json).is_err());
    }

    #[test]
    fn trajectory_rejects_points() {
        let json = serde_json::json!({ "type": "Point", "coordinates": [20.0, 10.0] });
        assert!(serde_json::from_value::<Trajectory>(json).is_err());
    }

    #[test]
    fn planar_geometry_drops_pose_channels() {
        let samples = [sample(10.0, 20.0, 0.0), sample(11.0, 21.0, 10.0)];
        let planar = build_trajectory(&samples).unwrap().planar_geometry();
        assert_eq!(
            planar.value,
            geojson::Value::LineString(vec![vec![20.0, 10.0], vec![21.0, 11.0]])
        );
    }
}
