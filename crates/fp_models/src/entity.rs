use fp_core::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of an entity variant, as used in the `type` tag and in log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    Beacon,
    Venue,
    Measurement,
    Path,
    Polygon,
    Marker,
}

/// Wi-Fi beacon placed on the floor plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beacon {
    pub id: Uuid,
    pub position: Vec2,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,
    /// Calibrated transmit power at one meter, in dBm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_power: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: Uuid,
    pub position: Vec2,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub id: Uuid,
    pub start: Vec2,
    pub end: Vec2,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Measurement {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// Navigation path, an open polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavPath {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub points: Vec<Vec2>,
}

impl NavPath {
    pub const MIN_POINTS: usize = 2;
}

/// Closed area. The last point connects back to the first one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Polygon {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub points: Vec<Vec2>,
}

impl Polygon {
    pub const MIN_POINTS: usize = 3;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MarkerKind {
    Settings,
    Qr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: Uuid,
    pub kind: MarkerKind,
    pub position: Vec2,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Everything that can be placed on a floor plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MappingEntity {
    Beacon(Beacon),
    Venue(Venue),
    Measurement(Measurement),
    Path(NavPath),
    Polygon(Polygon),
    Marker(Marker),
}

impl MappingEntity {
    pub fn id(&self) -> Uuid {
        match self {
            MappingEntity::Beacon(e) => e.id,
            MappingEntity::Venue(e) => e.id,
            MappingEntity::Measurement(e) => e.id,
            MappingEntity::Path(e) => e.id,
            MappingEntity::Polygon(e) => e.id,
            MappingEntity::Marker(e) => e.id,
        }
    }

    pub fn set_id(&mut self, id: Uuid) {
        match self {
            MappingEntity::Beacon(e) => e.id = id,
            MappingEntity::Venue(e) => e.id = id,
            MappingEntity::Measurement(e) => e.id = id,
            MappingEntity::Path(e) => e.id = id,
            MappingEntity::Polygon(e) => e.id = id,
            MappingEntity::Marker(e) => e.id = id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            MappingEntity::Beacon(_) => EntityKind::Beacon,
            MappingEntity::Venue(_) => EntityKind::Venue,
            MappingEntity::Measurement(_) => EntityKind::Measurement,
            MappingEntity::Path(_) => EntityKind::Path,
            MappingEntity::Polygon(_) => EntityKind::Polygon,
            MappingEntity::Marker(_) => EntityKind::Marker,
        }
    }

    /// Every coordinate the entity carries.
    pub fn points(&self) -> Vec<Vec2> {
        match self {
            MappingEntity::Beacon(e) => vec![e.position],
            MappingEntity::Venue(e) => vec![e.position],
            MappingEntity::Measurement(e) => vec![e.start, e.end],
            MappingEntity::Path(e) => e.points.clone(),
            MappingEntity::Polygon(e) => e.points.clone(),
            MappingEntity::Marker(e) => vec![e.position],
        }
    }

    fn points_mut(&mut self) -> Vec<&mut Vec2> {
        match self {
            MappingEntity::Beacon(e) => vec![&mut e.position],
            MappingEntity::Venue(e) => vec![&mut e.position],
            MappingEntity::Measurement(e) => vec![&mut e.start, &mut e.end],
            MappingEntity::Path(e) => e.points.iter_mut().collect(),
            MappingEntity::Polygon(e) => e.points.iter_mut().collect(),
            MappingEntity::Marker(e) => vec![&mut e.position],
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        for point in self.points_mut() {
            *point = point.offset(dx, dy);
        }
    }

    /// Distance from `at` to the closest coordinate of the entity.
    pub fn distance_to(&self, at: Vec2) -> f32 {
        self.points()
            .into_iter()
            .map(|p| p.distance(at))
            .fold(f32::INFINITY, f32::min)
    }

    /// Free-text fields of the entity, keyed by their field name.
    pub fn texts(&self) -> Vec<(&'static str, &str)> {
        fn opt<'a>(
            field: &'static str,
            value: &'a Option<String>,
        ) -> Option<(&'static str, &'a str)> {
            value.as_deref().map(|v| (field, v))
        }
        match self {
            MappingEntity::Beacon(e) => [Some(("name", e.name.as_str())), opt("ssid", &e.ssid)]
                .into_iter()
                .flatten()
                .collect(),
            MappingEntity::Venue(e) => {
                [Some(("name", e.name.as_str())), opt("category", &e.category)]
                    .into_iter()
                    .flatten()
                    .collect()
            }
            MappingEntity::Measurement(e) => opt("label", &e.label).into_iter().collect(),
            MappingEntity::Path(e) => opt("name", &e.name).into_iter().collect(),
            MappingEntity::Polygon(e) => [opt("name", &e.name), opt("color", &e.color)]
                .into_iter()
                .flatten()
                .collect(),
            MappingEntity::Marker(e) => opt("label", &e.label).into_iter().collect(),
        }
    }

    /// Minimum number of points the shape needs to be meaningful, if any.
    pub fn min_points(&self) -> Option<usize> {
        match self {
            MappingEntity::Path(_) => Some(NavPath::MIN_POINTS),
            MappingEntity::Polygon(_) => Some(Polygon::MIN_POINTS),
            _ => None,
        }
    }
}
