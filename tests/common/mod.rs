mod fixtures;
pub use fixtures::*;

pub use levisions::{
  BoundingBox, Catalog, DetectOutcome, Detection, Detector, FurnitureService, Vocabulary,
  model::{Capabilities, DetectItem, ModelFamily, ModelLoader, ModelSource},
};
