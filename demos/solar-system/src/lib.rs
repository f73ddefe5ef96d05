use wasm_bindgen::prelude::*;

mod bodies;
use bodies::SolarSystem;

orrery_web::export_scene!(SolarSystem, "solar-system");
