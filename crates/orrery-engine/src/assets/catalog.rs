use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::types::BodyId;

/// Static catalog of every body in the scene plus the background panorama.
/// Loaded from JSON or built in Rust by the hosting scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Bodies in declaration order. A body's index is its [`BodyId`].
    pub bodies: Vec<BodyDescriptor>,
    /// Texture URL of the background panorama.
    pub background: String,
}

/// Describes a single body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDescriptor {
    /// Display name (e.g., "Earth"). Unique within the catalog.
    pub name: String,
    /// Texture URL (e.g., "/textures/8k_earth_daymap.jpg").
    pub texture: String,
    /// Sphere radius in world units.
    pub radius: f32,
    /// Radius of the circular orbit in world units. Zero for the central body.
    #[serde(default, alias = "distance")]
    pub orbit_radius: f32,
    /// Angular speed in radians per second. Zero for the central body.
    #[serde(default)]
    pub speed: f32,
    /// What the orbit is centered on.
    #[serde(default)]
    pub center: OrbitCenter,
    #[serde(default)]
    pub facts: Option<BodyFacts>,
    /// External reference link.
    #[serde(default)]
    pub wiki: Option<String>,
}

/// Orbit center of a body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbitCenter {
    /// Orbit the world origin.
    #[default]
    Origin,
    /// Orbit the live position of the named body.
    Parent(String),
}

/// Optional factual metadata for the selection panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyFacts {
    pub mass: String,
    pub orbit_period: String,
}

/// A texture the scene needs before it can mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRequest {
    pub url: String,
    /// Short tag derived from the file name, used in status messages.
    pub kind: String,
}

impl AssetRequest {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let kind = texture_kind(&url);
        Self { url, kind }
    }
}

/// File stem of a URL: "/textures/8k_sun.jpg" → "8k_sun".
fn texture_kind(url: &str) -> String {
    let file = url.rsplit('/').next().unwrap_or(url);
    let stem = match file.rfind('.') {
        Some(dot) if dot > 0 => &file[..dot],
        _ => file,
    };
    stem.to_string()
}

impl BodyDescriptor {
    pub fn new(name: impl Into<String>, texture: impl Into<String>, radius: f32) -> Self {
        Self {
            name: name.into(),
            texture: texture.into(),
            radius,
            orbit_radius: 0.0,
            speed: 0.0,
            center: OrbitCenter::Origin,
            facts: None,
            wiki: None,
        }
    }

    // -- Builder methods --

    pub fn with_orbit(mut self, orbit_radius: f32, speed: f32) -> Self {
        self.orbit_radius = orbit_radius;
        self.speed = speed;
        self
    }

    pub fn around(mut self, parent: impl Into<String>) -> Self {
        self.center = OrbitCenter::Parent(parent.into());
        self
    }

    pub fn with_facts(mut self, mass: impl Into<String>, orbit_period: impl Into<String>) -> Self {
        self.facts = Some(BodyFacts {
            mass: mass.into(),
            orbit_period: orbit_period.into(),
        });
        self
    }

    pub fn with_wiki(mut self, url: impl Into<String>) -> Self {
        self.wiki = Some(url.into());
        self
    }
}

impl Catalog {
    /// Parse and validate a catalog from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json).map_err(CatalogError::Parse)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check names, numbers, and orbit parents.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut names = HashSet::with_capacity(self.bodies.len());
        for body in &self.bodies {
            if !names.insert(body.name.as_str()) {
                return Err(CatalogError::DuplicateName(body.name.clone()));
            }
            let finite = body.radius.is_finite() && body.orbit_radius.is_finite() && body.speed.is_finite();
            if !finite {
                return Err(CatalogError::NonFinite(body.name.clone()));
            }
            if body.orbit_radius < 0.0 {
                return Err(CatalogError::NegativeOrbitRadius(body.name.clone()));
            }
        }
        let parents = self.parent_indices()?;
        for start in 0..parents.len() {
            let mut cursor = parents[start];
            let mut hops = 0;
            while let Some(p) = cursor {
                hops += 1;
                if p == start || hops > parents.len() {
                    return Err(CatalogError::ParentCycle(self.bodies[start].name.clone()));
                }
                cursor = parents[p];
            }
        }
        Ok(())
    }

    /// Orbit-center parent index for each body (`None` = origin).
    pub fn parent_indices(&self) -> Result<Vec<Option<usize>>, CatalogError> {
        let by_name: HashMap<&str, usize> = self
            .bodies
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.as_str(), i))
            .collect();
        self.bodies
            .iter()
            .map(|body| match &body.center {
                OrbitCenter::Origin => Ok(None),
                OrbitCenter::Parent(parent) => by_name
                    .get(parent.as_str())
                    .copied()
                    .map(Some)
                    .ok_or_else(|| CatalogError::UnknownParent {
                        body: body.name.clone(),
                        parent: parent.clone(),
                    }),
            })
            .collect()
    }

    /// Find a body by display name.
    pub fn find(&self, name: &str) -> Option<BodyId> {
        self.bodies
            .iter()
            .position(|b| b.name == name)
            .map(|i| BodyId(i as u32))
    }

    pub fn get(&self, id: BodyId) -> Option<&BodyDescriptor> {
        self.bodies.get(id.index())
    }

    /// Deduplicated texture requests: body textures in catalog order, then the background.
    /// The first occurrence of each URL decides its position.
    pub fn asset_requests(&self) -> Vec<AssetRequest> {
        let mut seen = HashSet::new();
        self.bodies
            .iter()
            .map(|b| b.texture.as_str())
            .chain(std::iter::once(self.background.as_str()))
            .filter(|url| seen.insert(*url))
            .map(AssetRequest::new)
            .collect()
    }
}

/// Errors produced while loading or validating a [`Catalog`].
#[derive(Debug)]
pub enum CatalogError {
    Parse(serde_json::Error),
    DuplicateName(String),
    NonFinite(String),
    NegativeOrbitRadius(String),
    UnknownParent { body: String, parent: String },
    ParentCycle(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "invalid catalog: {e}"),
            Self::DuplicateName(name) => write!(f, "body name {name:?} appears more than once"),
            Self::NonFinite(name) => write!(f, "body {name:?} has a non-finite size or speed"),
            Self::NegativeOrbitRadius(name) => write!(f, "body {name:?} has a negative orbit radius"),
            Self::UnknownParent { body, parent } => {
                write!(f, "body {body:?} orbits unknown body {parent:?}")
            }
            Self::ParentCycle(name) => write!(f, "orbit parents of {name:?} form a cycle"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten_bodies_one_shared_texture() -> Catalog {
        let mut bodies: Vec<BodyDescriptor> = (0..9)
            .map(|i| {
                BodyDescriptor::new(format!("B{i}"), format!("/t/body_{i}.jpg"), 1.0)
                    .with_orbit(10.0 + i as f32, 0.1)
            })
            .collect();
        bodies.push(BodyDescriptor::new("Twin", "/t/body_3.jpg", 1.0).with_orbit(30.0, 0.2));
        Catalog { bodies, background: "/t/stars.jpg".into() }
    }

    #[test]
    fn requests_are_deduplicated_in_first_seen_order() {
        let catalog = ten_bodies_one_shared_texture();
        let requests = catalog.asset_requests();
        assert_eq!(requests.len(), 9 + 1);
        assert_eq!(requests[0].url, "/t/body_0.jpg");
        assert_eq!(requests[9].url, "/t/stars.jpg");
        assert_eq!(requests.iter().filter(|r| r.url == "/t/body_3.jpg").count(), 1);
    }

    #[test]
    fn background_shared_with_body_is_requested_once() {
        let catalog = Catalog {
            bodies: vec![BodyDescriptor::new("Sun", "/t/stars.jpg", 3.0)],
            background: "/t/stars.jpg".into(),
        };
        assert_eq!(catalog.asset_requests().len(), 1);
    }

    #[test]
    fn kind_is_file_stem() {
        assert_eq!(AssetRequest::new("/textures/8k_sun.jpg").kind, "8k_sun");
        assert_eq!(AssetRequest::new("moon").kind, "moon");
    }

    #[test]
    fn parses_json_with_distance_alias() {
        let json = r#"{
            "background": "/textures/8k_stars_milky_way.jpg",
            "bodies": [
                { "name": "Sun", "texture": "/textures/8k_sun.jpg", "radius": 3 },
                { "name": "Earth", "texture": "/textures/8k_earth_daymap.jpg", "radius": 1,
                  "distance": 12, "speed": 0.45,
                  "facts": { "mass": "5.97 × 10²⁴ kg", "orbit_period": "365.25 days" } },
                { "name": "Moon", "texture": "/textures/8k_moon.jpg", "radius": 0.27,
                  "distance": 2, "speed": 0.6, "center": { "parent": "Earth" } }
            ]
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.bodies[1].orbit_radius, 12.0);
        assert_eq!(catalog.bodies[0].center, OrbitCenter::Origin);
        assert_eq!(catalog.bodies[2].center, OrbitCenter::Parent("Earth".into()));
        assert_eq!(catalog.parent_indices().unwrap(), vec![None, None, Some(1)]);
        assert_eq!(catalog.find("Moon"), Some(BodyId(2)));
    }

    #[test]
    fn rejects_duplicate_names() {
        let catalog = Catalog {
            bodies: vec![
                BodyDescriptor::new("Mars", "/a.jpg", 1.0),
                BodyDescriptor::new("Mars", "/b.jpg", 1.0),
            ],
            background: "/bg.jpg".into(),
        };
        assert!(matches!(catalog.validate(), Err(CatalogError::DuplicateName(_))));
    }

    #[test]
    fn rejects_unknown_parent_and_cycles() {
        let unknown = Catalog {
            bodies: vec![BodyDescriptor::new("Moon", "/m.jpg", 0.3).around("Earth")],
            background: "/bg.jpg".into(),
        };
        assert!(matches!(unknown.validate(), Err(CatalogError::UnknownParent { .. })));

        let cycle = Catalog {
            bodies: vec![
                BodyDescriptor::new("A", "/a.jpg", 1.0).around("B"),
                BodyDescriptor::new("B", "/b.jpg", 1.0).around("A"),
            ],
            background: "/bg.jpg".into(),
        };
        assert!(matches!(cycle.validate(), Err(CatalogError::ParentCycle(_))));
    }

    #[test]
    fn rejects_negative_orbit_radius() {
        let catalog = Catalog {
            bodies: vec![BodyDescriptor::new("X", "/x.jpg", 1.0).with_orbit(-1.0, 0.1)],
            background: "/bg.jpg".into(),
        };
        assert!(matches!(catalog.validate(), Err(CatalogError::NegativeOrbitRadius(_))));
    }
}
