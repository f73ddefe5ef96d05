use crate::api::config::EngineConfig;
use crate::assets::catalog::Catalog;
use crate::assets::preload::LabelTable;

/// The contract every hosted scene fulfills: what to show and how to tune the engine.
pub trait SceneDefinition {
    /// Return engine configuration. Called once before construction.
    fn config(&self) -> EngineConfig {
        EngineConfig::default()
    }

    /// The static body catalog.
    fn catalog(&self) -> Catalog;

    /// Status-message labels for the loading screen.
    fn labels(&self, catalog: &Catalog) -> LabelTable {
        LabelTable::from_catalog(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::engine::{EnginePhase, SceneEngine};
    use crate::assets::catalog::BodyDescriptor;

    struct TinySystem;

    impl SceneDefinition for TinySystem {
        fn catalog(&self) -> Catalog {
            Catalog {
                bodies: vec![
                    BodyDescriptor::new("Sun", "/t/sun.jpg", 3.0),
                    BodyDescriptor::new("Mars", "/t/mars.jpg", 1.0).with_orbit(10.0, 0.5),
                ],
                background: "/t/stars.jpg".into(),
            }
        }
    }

    #[test]
    fn default_labels_name_each_body() {
        let def = TinySystem;
        let labels = def.labels(&def.catalog());
        assert_eq!(labels.label_for("/t/mars.jpg", 0, 3), "Loading Mars texture...");
        assert_eq!(labels.label_for("/t/stars.jpg", 0, 3), "Loading star background...");
    }

    #[test]
    fn engine_builds_from_definition() {
        let engine = SceneEngine::from_definition(&TinySystem).unwrap();
        assert_eq!(engine.phase(), EnginePhase::Preloading);
        assert_eq!(engine.catalog().bodies.len(), 2);
        assert_eq!(engine.config().fixed_dt, EngineConfig::default().fixed_dt);
    }
}
