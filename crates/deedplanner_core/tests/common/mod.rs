#![allow(dead_code)]

use deedplanner_core::{Database, ModelHandle, ModelLoad, ModelSource, SceneBackend, SceneLayer};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub const DATABASE: &str = r#"{
    "grounds": [
        { "name": "Grass", "short_name": "gr", "tex3d": "grounds/grass.png" },
        { "name": "Dirt", "short_name": "di", "tex3d": "grounds/dirt.png" },
        { "name": "Stone road", "short_name": "sr", "tex3d": "grounds/road.png", "diagonal": true }
    ],
    "caves": [
        { "name": "Rock", "short_name": "rock", "wall": true },
        { "name": "Cave floor", "short_name": "cf" }
    ],
    "walls": [
        {
            "name": "Stone wall", "short_name": "sw",
            "bottom_model": "walls/stone_bottom.wom", "normal_model": "walls/stone.wom",
            "house_wall": true, "materials": { "Stone brick": 50, "Mortar": 50 }
        },
        {
            "name": "Stone arch", "short_name": "sa",
            "bottom_model": "walls/stone_arch_bottom.wom", "normal_model": "walls/stone_arch.wom",
            "house_wall": true, "arch": true, "materials": { "Stone brick": 40, "Mortar": 40 }
        },
        {
            "name": "Iron fence", "short_name": "if",
            "bottom_model": "fences/iron.wom", "normal_model": "fences/iron.wom",
            "arch_buildable": true, "materials": { "Iron ribbon": 4 }
        }
    ],
    "floors": [
        { "name": "Planks", "short_name": "pl", "model": "floors/planks.wom", "materials": { "Plank": 10, "Nails": 2 } },
        { "name": "Stone slabs", "short_name": "ss", "model": "floors/slabs.wom", "materials": { "Stone slab": 1 } }
    ],
    "roofs": [
        { "name": "Slate", "short_name": "sl", "texture": "roofs/slate.png", "materials": { "Slate shingle": 10 } }
    ],
    "decorations": [
        { "name": "Barrel", "short_name": "barrel", "model": "decorations/barrel.wom", "materials": { "Plank": 4 } },
        { "name": "Deed token", "short_name": "token", "model": "decorations/token.wom" }
    ]
}"#;

pub fn database() -> Database {
    Database::from_json_str(DATABASE).unwrap()
}

/// Counts of every model lifecycle call the map made
#[derive(Debug, Default)]
pub struct SceneLog {
    pub spawned: Vec<ModelHandle>,
    pub destroyed: Vec<ModelHandle>,
    pub visible: HashMap<ModelHandle, bool>,
    pub ground_refreshes: usize,
    pub roof_updates: usize,
}

impl SceneLog {
    pub fn destroy_count(&self, handle: ModelHandle) -> usize {
        self.destroyed.iter().filter(|h| **h == handle).count()
    }

    pub fn visible_models(&self) -> usize {
        self.visible.values().filter(|v| **v).count()
    }
}

/// Scene backend that records into a shared log
#[derive(Clone, Default)]
pub struct RecordingScene {
    pub log: Rc<RefCell<SceneLog>>,
}

impl SceneBackend for RecordingScene {
    fn spawn_model(&mut self, handle: ModelHandle, _source: ModelSource<'_>, _layer: SceneLayer) -> ModelLoad {
        self.log.borrow_mut().spawned.push(handle);
        ModelLoad::Ready
    }

    fn destroy_model(&mut self, handle: ModelHandle) {
        let mut log = self.log.borrow_mut();
        log.destroyed.push(handle);
        log.visible.remove(&handle);
    }

    fn set_model_visible(&mut self, handle: ModelHandle, visible: bool) {
        self.log.borrow_mut().visible.insert(handle, visible);
    }

    fn set_ground_textures(&mut self, _x: i32, _y: i32, _textures: &deedplanner_core::GroundTextures) {
        self.log.borrow_mut().ground_refreshes += 1;
    }

    fn update_roof_model(&mut self, _handle: ModelHandle, _shape: deedplanner_core::RoofShape, _rotation: f32, _level: i32) {
        self.log.borrow_mut().roof_updates += 1;
    }
}
