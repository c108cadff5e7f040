use std::sync::Arc;

use image::{DynamicImage, RgbImage};
use levisions::{
  Catalog, Detector, FurnitureService, Vocabulary,
  model::{
    Capabilities, DetectItem, DetectOutput, InferParams, Model, ModelError, ModelFamily,
    ModelLoader,
  },
};

/// 按脚本返回固定检测项的模型
pub struct ScriptedModel {
  pub family: ModelFamily,
  pub capabilities: Capabilities,
  pub items: Vec<DetectItem>,
}

impl Model for ScriptedModel {
  fn family(&self) -> ModelFamily {
    self.family
  }

  fn capabilities(&self) -> Capabilities {
    self.capabilities
  }

  fn infer(&self, _image: &RgbImage, params: &InferParams) -> Result<DetectOutput, ModelError> {
    let items: Vec<DetectItem> = self
      .items
      .iter()
      .filter(|item| item.score >= params.confidence)
      .cloned()
      .collect();
    Ok(DetectOutput::from(items))
  }
}

pub fn item(label: &str, score: f32, coords: [f32; 4]) -> DetectItem {
  DetectItem {
    label: label.to_string(),
    score,
    coords,
  }
}

/// 类似 YOLOv8 的原始输出：绝对坐标，未做 NMS，含非家具类别和越界框
pub fn living_room_items() -> Vec<DetectItem> {
  vec![
    item("couch", 0.91, [40.0, 120.0, 260.0, 230.0]),
    item("person", 0.97, [100.0, 20.0, 160.0, 200.0]),
    item("chair", 0.83, [270.0, 100.0, 330.0, 210.0]),
    item("chair", 0.64, [272.0, 104.0, 334.0, 214.0]),
    item("dining table", 0.58, [180.0, 150.0, 310.0, 235.0]),
    item("tv", 0.42, [-30.0, -10.0, 60.0, 50.0]),
    item("vase", 0.35, [300.0, 180.0, 400.0, 300.0]),
    item("dog", 0.77, [10.0, 200.0, 80.0, 240.0]),
    item("clock", 0.22, [150.0, 5.0, 170.0, 25.0]),
    item("bed", 0.71, [50.0, 50.0, 50.0, 90.0]),
    item("Laptop", 0.66, [f32::NAN, 10.0, 40.0, 40.0]),
  ]
}

pub fn scripted_detector(family: ModelFamily, items: Vec<DetectItem>) -> Detector {
  let model = ScriptedModel {
    family,
    capabilities: Capabilities {
      suppresses_overlaps: false,
    },
    items,
  };
  Detector::new(ModelLoader::preloaded(Arc::new(model)), Vocabulary::default())
}

pub fn scripted_service(items: Vec<DetectItem>) -> FurnitureService {
  FurnitureService::new(
    scripted_detector(ModelFamily::YoloV8, items),
    Catalog::default(),
  )
}

/// 320x240 的渐变 RGB 图
pub fn room_image() -> DynamicImage {
  DynamicImage::ImageRgb8(RgbImage::from_fn(320, 240, |x, y| {
    image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
  }))
}
