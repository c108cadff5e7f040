// 该文件是 LEVisions 项目的一部分。
// src/model/yolov8.rs - YOLOv8 ONNX 模型
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

use std::{path::PathBuf, sync::Once};

use image::RgbImage;
use ort::value::Tensor;
use tracing::{debug, info, warn};

use super::{
  Capabilities, DetectItem, DetectOutput, InferParams, Model, ModelError, ModelFamily,
  ModelLoadError,
  labels::{COCO_CLASSES, coco_label, unknown_label},
  session::{OnnxSession, default_intra_threads, extract_f32, runtime_error},
};
use crate::frame::RgbNchwFrame;

const YOLOV8_INPUT_SIZE: u32 = 640;
const YOLOV8_OUTPUT: &str = "output0";
/// 每个候选框前 4 个数是 cx, cy, w, h
const YOLOV8_BOX_DIMS: usize = 4;

pub struct YoloV8 {
  session: OnnxSession,
  output_name: String,
  /// 类别数不是 COCO-80 时只提醒一次
  label_warning: Once,
}

pub struct YoloV8Builder {
  model_path: PathBuf,
}

impl YoloV8Builder {
  pub fn new(model_path: impl Into<PathBuf>) -> Self {
    Self {
      model_path: model_path.into(),
    }
  }

  pub fn build(self) -> Result<YoloV8, ModelLoadError> {
    info!("加载 YOLOv8 模型文件: {}", self.model_path.display());
    let session = OnnxSession::open(&self.model_path, default_intra_threads())?;

    // 导出时改过输出名的模型只有一个输出，直接取第一个
    let output_name = if session.has_output(YOLOV8_OUTPUT) {
      YOLOV8_OUTPUT.to_string()
    } else {
      match session.output_names() {
        [single] => single.clone(),
        names => {
          return Err(ModelLoadError::Incompatible(format!(
            "预期 YOLOv8 模型只有一个输出，实际为 {:?}",
            names
          )));
        }
      }
    };

    Ok(YoloV8 {
      session,
      output_name,
      label_warning: Once::new(),
    })
  }
}

impl Model for YoloV8 {
  fn family(&self) -> ModelFamily {
    ModelFamily::YoloV8
  }

  fn capabilities(&self) -> Capabilities {
    // 原始导出不带 NMS，置信度在解码时过滤
    Capabilities {
      suppresses_overlaps: false,
    }
  }

  fn infer(&self, image: &RgbImage, params: &InferParams) -> Result<DetectOutput, ModelError> {
    debug!("预处理输入图像 {}x{}", image.width(), image.height());
    let frame = RgbNchwFrame::resized(image, YOLOV8_INPUT_SIZE, YOLOV8_INPUT_SIZE);
    let shape = frame.shape();
    let tensor = Tensor::from_array((shape, frame.into_data())).map_err(runtime_error)?;

    debug!("执行模型推理");
    let (shape, data) = {
      let mut session = self.session.lock()?;
      let outputs = session
        .run(ort::inputs![self.session.input_name() => tensor])
        .map_err(runtime_error)?;
      extract_f32(outputs.get(self.output_name.as_str()), &self.output_name)?
    };

    if let Some(classes) = class_count(&shape)
      && classes != COCO_CLASSES.len()
    {
      self.label_warning.call_once(|| {
        warn!(
          "模型输出 {} 个类别而非 COCO 的 {} 个，标签将显示为 class_<id>",
          classes,
          COCO_CLASSES.len()
        );
      });
    }

    let scale = (
      image.width() as f32 / YOLOV8_INPUT_SIZE as f32,
      image.height() as f32 / YOLOV8_INPUT_SIZE as f32,
    );
    let items = decode(&shape, &data, scale, params.confidence)?;
    debug!("检测到 {} 个候选框", items.len());
    Ok(DetectOutput::from(items))
  }
}

/// `[1, 4 + C, N]` 中的类别数 C
fn class_count(shape: &[i64]) -> Option<usize> {
  match shape {
    [1, rows, anchors] if *rows > YOLOV8_BOX_DIMS as i64 && *anchors >= 0 => {
      Some(*rows as usize - YOLOV8_BOX_DIMS)
    }
    _ => None,
  }
}

/// 解码 `[1, 4 + 类别数, 候选框数]` 输出，坐标换算回原图尺寸
fn decode(
  shape: &[i64],
  data: &[f32],
  (scale_x, scale_y): (f32, f32),
  confidence: f32,
) -> Result<Vec<DetectItem>, ModelError> {
  let (num_classes, anchors) = match (class_count(shape), shape) {
    (Some(classes), [_, _, anchors]) => (classes, *anchors as usize),
    _ => {
      return Err(ModelError::OutputShape(format!(
        "预期形状 [1, 4 + C, N]，实际为 {:?}",
        shape
      )));
    }
  };
  let rows = YOLOV8_BOX_DIMS + num_classes;
  if data.len() != rows * anchors {
    return Err(ModelError::OutputShape(format!(
      "输出长度 {} 与形状 {:?} 不符",
      data.len(),
      shape
    )));
  }

  let at = |row: usize, anchor: usize| data[row * anchors + anchor];
  let mut items = Vec::new();

  for anchor in 0..anchors {
    let (class_id, score) = (0..num_classes)
      .map(|c| (c, at(YOLOV8_BOX_DIMS + c, anchor)))
      .fold((0usize, f32::MIN), |best, cur| {
        if cur.1 > best.1 { cur } else { best }
      });

    if score.is_nan() || score < confidence {
      continue;
    }

    let cx = at(0, anchor);
    let cy = at(1, anchor);
    let w = at(2, anchor);
    let h = at(3, anchor);

    let label = match coco_label(class_id) {
      Some(label) if num_classes == COCO_CLASSES.len() => label.to_string(),
      _ => unknown_label(class_id),
    };

    items.push(DetectItem {
      label,
      score,
      coords: [
        (cx - w / 2.0) * scale_x,
        (cy - h / 2.0) * scale_y,
        (cx + w / 2.0) * scale_x,
        (cy + h / 2.0) * scale_y,
      ],
    });
  }

  Ok(items)
}

#[cfg(test)]
mod tests {
  use super::*;

  /// 构造 80 类的模型输出
  fn output(anchors: &[([f32; 4], usize, f32)]) -> (Vec<i64>, Vec<f32>) {
    output_with_classes(80, anchors)
  }

  fn output_with_classes(
    classes: usize,
    anchors: &[([f32; 4], usize, f32)],
  ) -> (Vec<i64>, Vec<f32>) {
    let rows = 4 + classes;
    let n = anchors.len();
    let mut data = vec![0f32; rows * n];
    for (i, (bbox, class_id, score)) in anchors.iter().enumerate() {
      for (k, v) in bbox.iter().enumerate() {
        data[k * n + i] = *v;
      }
      data[(4 + class_id) * n + i] = *score;
    }
    (vec![1, rows as i64, n as i64], data)
  }

  #[test]
  fn decodes_center_boxes_into_scaled_corners() {
    let (shape, data) = output(&[([320.0, 320.0, 100.0, 200.0], 56, 0.9)]);
    let items = decode(&shape, &data, (2.0, 0.5), 0.5).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].label, "chair");
    assert_eq!(items[0].coords, [540.0, 110.0, 740.0, 210.0]);
  }

  #[test]
  fn low_scores_are_skipped() {
    let (shape, data) = output(&[
      ([100.0, 100.0, 10.0, 10.0], 60, 0.3),
      ([200.0, 200.0, 10.0, 10.0], 59, 0.7),
    ]);
    let items = decode(&shape, &data, (1.0, 1.0), 0.5).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].label, "bed");
  }

  #[test]
  fn custom_class_counts_fall_back_to_class_ids() {
    let (shape, data) = output_with_classes(3, &[([50.0, 50.0, 20.0, 20.0], 2, 0.8)]);
    assert_eq!(class_count(&shape), Some(3));
    let items = decode(&shape, &data, (1.0, 1.0), 0.5).unwrap();
    assert_eq!(items.len(), 1);
    // 第 2 类在 COCO 里是 car，但这里不能借用 COCO 名称
    assert_eq!(items[0].label, "class_2");
    assert_eq!(class_count(&[1, 84, 8400]), Some(80));
    assert_eq!(class_count(&[1, 4, 10]), None);
  }

  #[test]
  fn bad_shapes_are_errors() {
    assert!(decode(&[1, 84], &[], (1.0, 1.0), 0.5).is_err());
    assert!(decode(&[1, 84, 2], &[0.0; 10], (1.0, 1.0), 0.5).is_err());
  }
}
