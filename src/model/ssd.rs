// 该文件是 LEVisions 项目的一部分。
// src/model/ssd.rs - SSD ONNX 模型（TensorFlow Object Detection API 导出）
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::PathBuf;

use image::RgbImage;
use ort::value::Tensor;
use tracing::{debug, info};

use super::{
  Capabilities, DetectItem, DetectOutput, InferParams, Model, ModelError, ModelFamily,
  ModelLoadError,
  labels::{coco_category_label, unknown_label},
  session::{OnnxSession, default_intra_threads, extract_f32, runtime_error},
};
use crate::frame::RgbNhwcFrame;

const SSD_BOXES: &str = "detection_boxes";
const SSD_CLASSES: &str = "detection_classes";
const SSD_SCORES: &str = "detection_scores";
const SSD_COUNT: &str = "num_detections";

pub struct Ssd {
  session: OnnxSession,
  boxes: String,
  classes: String,
  scores: String,
  count: String,
}

pub struct SsdBuilder {
  model_path: PathBuf,
}

impl SsdBuilder {
  pub fn new(model_path: impl Into<PathBuf>) -> Self {
    Self {
      model_path: model_path.into(),
    }
  }

  pub fn build(self) -> Result<Ssd, ModelLoadError> {
    info!("加载 SSD 模型文件: {}", self.model_path.display());
    let session = OnnxSession::open(&self.model_path, default_intra_threads())?;

    let find = |base: &str| {
      session
        .output_names()
        .iter()
        .find(|name| output_matches(name, base))
        .cloned()
        .ok_or_else(|| {
          ModelLoadError::Incompatible(format!(
            "SSD 模型缺少输出 '{}'，实际输出 {:?}",
            base,
            session.output_names()
          ))
        })
    };

    let boxes = find(SSD_BOXES)?;
    let classes = find(SSD_CLASSES)?;
    let scores = find(SSD_SCORES)?;
    let count = find(SSD_COUNT)?;

    Ok(Ssd {
      session,
      boxes,
      classes,
      scores,
      count,
    })
  }
}

/// TensorFlow 导出的输出名常带 `:0` 后缀
fn output_matches(name: &str, base: &str) -> bool {
  name == base || name.strip_suffix(":0") == Some(base)
}

impl Model for Ssd {
  fn family(&self) -> ModelFamily {
    ModelFamily::Ssd
  }

  fn capabilities(&self) -> Capabilities {
    // NMS 已经编进图里
    Capabilities {
      suppresses_overlaps: true,
    }
  }

  fn infer(&self, image: &RgbImage, _params: &InferParams) -> Result<DetectOutput, ModelError> {
    debug!("预处理输入图像 {}x{}", image.width(), image.height());
    let frame = RgbNhwcFrame::from(image);
    let shape = frame.shape();
    let tensor = Tensor::from_array((shape, frame.into_data())).map_err(runtime_error)?;

    debug!("执行模型推理");
    let (boxes, classes, scores, count) = {
      let mut session = self.session.lock()?;
      let outputs = session
        .run(ort::inputs![self.session.input_name() => tensor])
        .map_err(runtime_error)?;
      (
        extract_f32(outputs.get(self.boxes.as_str()), &self.boxes)?.1,
        extract_f32(outputs.get(self.classes.as_str()), &self.classes)?.1,
        extract_f32(outputs.get(self.scores.as_str()), &self.scores)?.1,
        extract_f32(outputs.get(self.count.as_str()), &self.count)?.1,
      )
    };

    let items = decode(&boxes, &classes, &scores, &count)?;
    debug!("检测到 {} 个物体", items.len());
    Ok(DetectOutput::from(items))
  }
}

/// 坐标保持模型输出的归一化 (y1, x1, y2, x2)，由检测器统一换算
fn decode(
  boxes: &[f32],
  classes: &[f32],
  scores: &[f32],
  count: &[f32],
) -> Result<Vec<DetectItem>, ModelError> {
  let capacity = scores.len().min(classes.len()).min(boxes.len() / 4);
  let n = match count.first() {
    Some(&n) if n >= 0.0 => (n as usize).min(capacity),
    _ => {
      return Err(ModelError::OutputShape(format!(
        "num_detections 无效: {:?}",
        count
      )));
    }
  };

  let items = (0..n)
    .map(|i| {
      let id = classes[i] as u32;
      let label = coco_category_label(id)
        .map(str::to_string)
        .unwrap_or_else(|| unknown_label(id));
      DetectItem {
        label,
        score: scores[i],
        coords: [
          boxes[i * 4],
          boxes[i * 4 + 1],
          boxes[i * 4 + 2],
          boxes[i * 4 + 3],
        ],
      }
    })
    .collect();

  Ok(items)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tensorflow_output_names_match() {
    assert!(output_matches("detection_boxes:0", SSD_BOXES));
    assert!(output_matches("detection_boxes", SSD_BOXES));
    assert!(!output_matches("detection_boxes:1", SSD_BOXES));
  }

  #[test]
  fn decodes_only_the_reported_count() {
    let boxes = [0.1, 0.2, 0.5, 0.6, 0.0, 0.0, 1.0, 1.0, 0.3, 0.3, 0.4, 0.4];
    let classes = [62.0, 65.0, 1.0];
    let scores = [0.9, 0.8, 0.7];
    let items = decode(&boxes, &classes, &scores, &[2.0]).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].label, "chair");
    assert_eq!(items[0].coords, [0.1, 0.2, 0.5, 0.6]);
    assert_eq!(items[1].label, "bed");
  }

  #[test]
  fn count_is_capped_by_the_tensors() {
    let items = decode(&[0.0, 0.0, 1.0, 1.0], &[12.0], &[0.5], &[100.0]).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].label, "class_12");
    assert!(decode(&[], &[], &[], &[]).is_err());
  }
}
