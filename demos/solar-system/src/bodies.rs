//! Body catalog for the textured solar system.
//!
//! Sizes, distances and speeds are display units, not physical ones. The Moon
//! circles the origin on its own ring, just outside Earth's.

use orrery_engine::{BodyDescriptor, Catalog, EngineConfig, LabelTable, SceneDefinition};

pub const STAR_BACKGROUND: &str = "/textures/8k_stars_milky_way.jpg";

pub struct SolarSystem {
    catalog: Catalog,
}

impl SolarSystem {
    pub fn new() -> Self {
        Self { catalog: catalog() }
    }
}

impl Default for SolarSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneDefinition for SolarSystem {
    fn config(&self) -> EngineConfig {
        EngineConfig {
            far_field_threshold: 700.0,
            settle_delay: 0.3,
            ..EngineConfig::default()
        }
    }

    fn catalog(&self) -> Catalog {
        self.catalog.clone()
    }

    fn labels(&self, catalog: &Catalog) -> LabelTable {
        LabelTable::from_catalog(catalog)
            .with_initial_message("Preparing the solar system...")
            .with_ready_message("Initializing solar system...")
    }
}

pub fn catalog() -> Catalog {
    Catalog {
        bodies: vec![
            BodyDescriptor::new("Mars", "/textures/2k_mars.jpg", 1.0)
                .with_orbit(10.0, 0.5)
                .with_facts("6.42 × 10²³ kg", "687 days")
                .with_wiki("https://en.wikipedia.org/wiki/Mars"),
            BodyDescriptor::new("Mercury", "/textures/8k_mercury.jpg", 0.8)
                .with_orbit(14.0, 0.3)
                .with_facts("3.30 × 10²³ kg", "88 days")
                .with_wiki("https://en.wikipedia.org/wiki/Mercury_(planet)"),
            BodyDescriptor::new("Venus", "/textures/8k_venus_surface.jpg", 1.2)
                .with_orbit(18.0, 0.4)
                .with_facts("4.87 × 10²⁴ kg", "224.7 days")
                .with_wiki("https://en.wikipedia.org/wiki/Venus"),
            BodyDescriptor::new("Jupiter", "/textures/8k_jupiter.jpg", 2.0)
                .with_orbit(25.0, 0.2)
                .with_facts("1.90 × 10²⁷ kg", "11.86 years")
                .with_wiki("https://en.wikipedia.org/wiki/Jupiter"),
            BodyDescriptor::new("Saturn", "/textures/8k_saturn.jpg", 1.8)
                .with_orbit(30.0, 0.15)
                .with_facts("5.68 × 10²⁶ kg", "29.45 years")
                .with_wiki("https://en.wikipedia.org/wiki/Saturn"),
            BodyDescriptor::new("Uranus", "/textures/2k_uranus.jpg", 1.5)
                .with_orbit(35.0, 0.1)
                .with_facts("8.68 × 10²⁵ kg", "84.02 years")
                .with_wiki("https://en.wikipedia.org/wiki/Uranus"),
            BodyDescriptor::new("Neptune", "/textures/2k_neptune.jpg", 1.5)
                .with_orbit(40.0, 0.08)
                .with_facts("1.02 × 10²⁶ kg", "164.8 years")
                .with_wiki("https://en.wikipedia.org/wiki/Neptune"),
            BodyDescriptor::new("Earth", "/textures/8k_earth_daymap.jpg", 1.0)
                .with_orbit(12.0, 0.45)
                .with_facts("5.97 × 10²⁴ kg", "365.25 days")
                .with_wiki("https://en.wikipedia.org/wiki/Earth"),
            BodyDescriptor::new("Sun", "/textures/8k_sun.jpg", 3.0),
            BodyDescriptor::new("Moon", "/textures/8k_moon.jpg", 0.27)
                .with_orbit(13.0, 0.6)
                .with_facts("7.35 × 10²² kg", "27.3 days")
                .with_wiki("https://en.wikipedia.org/wiki/Moon"),
        ],
        background: STAR_BACKGROUND.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_engine::{BodyId, EnginePhase, SceneEngine};

    #[test]
    fn catalog_is_valid_and_requests_eleven_textures() {
        let catalog = catalog();
        catalog.validate().unwrap();
        let requests = catalog.asset_requests();
        assert_eq!(requests.len(), 11);
        assert_eq!(requests.last().unwrap().url, STAR_BACKGROUND);
    }

    #[test]
    fn labels_match_loading_screen() {
        let system = SolarSystem::new();
        let labels = system.labels(&system.catalog());
        assert_eq!(labels.label_for("/textures/2k_mars.jpg", 0, 11), "Loading Mars texture...");
        assert_eq!(labels.label_for(STAR_BACKGROUND, 0, 11), "Loading star background...");
        assert_eq!(labels.initial_message(), "Preparing the solar system...");
        assert_eq!(labels.ready_message(), "Initializing solar system...");
    }

    #[test]
    fn sun_is_stationary() {
        let engine = SceneEngine::from_definition(&SolarSystem::new()).unwrap();
        assert_eq!(engine.phase(), EnginePhase::Preloading);
        let sun = engine.catalog().find("Sun").unwrap();
        assert_eq!(sun, BodyId(8));
        assert!(engine.orbit(sun).unwrap().is_stationary());
    }
}
