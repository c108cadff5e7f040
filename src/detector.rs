// 该文件是 LEVisions 项目的一部分。
// src/detector.rs - 家具检测器
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

use std::{
  fmt,
  panic::{AssertUnwindSafe, catch_unwind},
  sync::Arc,
};

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

use crate::{
  model::{BoxLayout, Capabilities, DetectItem, InferParams, Model, ModelError, ModelLoader},
  output::draw::Draw,
  vocabulary::Vocabulary,
};

mod nms;

/// 调用方未指定时的置信度阈值
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;
/// 重叠抑制的 IoU 阈值
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;

/// 原图上的绝对像素坐标，满足 `x1 < x2`、`y1 < y2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
  pub x1: u32,
  pub y1: u32,
  pub x2: u32,
  pub y2: u32,
}

impl BoundingBox {
  pub const fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
    Self { x1, y1, x2, y2 }
  }

  /// 裁剪到图像范围内（向外取整），退化的框返回 `None`
  pub fn clamped(x1: f32, y1: f32, x2: f32, y2: f32, width: u32, height: u32) -> Option<Self> {
    if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
      return None;
    }
    let (w, h) = (width as f32, height as f32);
    let bbox = Self {
      x1: x1.clamp(0.0, w).floor() as u32,
      y1: y1.clamp(0.0, h).floor() as u32,
      x2: x2.clamp(0.0, w).ceil() as u32,
      y2: y2.clamp(0.0, h).ceil() as u32,
    };
    (bbox.x1 < bbox.x2 && bbox.y1 < bbox.y2).then_some(bbox)
  }

  pub fn width(&self) -> u32 {
    self.x2.saturating_sub(self.x1)
  }

  pub fn height(&self) -> u32 {
    self.y2.saturating_sub(self.y1)
  }

  pub fn area(&self) -> f32 {
    self.width() as f32 * self.height() as f32
  }

  /// 计算两个边界框的 IoU
  pub fn iou(&self, other: &BoundingBox) -> f32 {
    let x1 = self.x1.max(other.x1);
    let y1 = self.y1.max(other.y1);
    let x2 = self.x2.min(other.x2);
    let y2 = self.y2.min(other.y2);

    let intersection = x2.saturating_sub(x1) as f32 * y2.saturating_sub(y1) as f32;
    let union = self.area() + other.area() - intersection;

    if union > 0.0 {
      intersection / union
    } else {
      0.0
    }
  }
}

impl fmt::Display for BoundingBox {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}, {}, {}, {}]", self.x1, self.y1, self.x2, self.y2)
  }
}

/// 检测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
  /// 类别名称，属于白名单
  pub class_name: String,
  /// 置信度 [0, 1]
  pub confidence: f32,
  /// 边界框
  pub bounding_box: BoundingBox,
}

impl Detection {
  /// 画在图上的标签文本
  pub fn label(&self) -> String {
    format!("{} {:.2}", self.class_name, self.confidence)
  }
}

/// 单次检测的输出，每次调用都重新构建
#[derive(Debug, Clone)]
pub struct DetectionResult {
  pub detections: Vec<Detection>,
  pub annotated_image: DynamicImage,
}

impl DetectionResult {
  /// 空结果，图像原样返回
  pub fn untouched(image: &DynamicImage) -> Self {
    Self {
      detections: Vec::new(),
      annotated_image: image.clone(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.detections.is_empty()
  }
}

#[derive(Error, Debug)]
pub enum InferenceError {
  #[error("模型推理错误: {0}")]
  Model(#[from] ModelError),
  #[error("推理过程崩溃: {0}")]
  Panicked(String),
}

/// 降级原因
#[derive(Error, Debug)]
pub enum DegradeCause {
  #[error("模型不可用: {0}")]
  ModelUnavailable(String),
  #[error("{0}")]
  Inference(#[from] InferenceError),
}

/// 检测调用的显式结果：有结果、合法的空结果、降级
#[derive(Debug)]
pub enum DetectOutcome {
  Detected(DetectionResult),
  Empty(DetectionResult),
  Degraded {
    result: DetectionResult,
    cause: DegradeCause,
  },
}

impl DetectOutcome {
  fn from_result(result: DetectionResult) -> Self {
    if result.is_empty() {
      DetectOutcome::Empty(result)
    } else {
      DetectOutcome::Detected(result)
    }
  }

  pub fn result(&self) -> &DetectionResult {
    match self {
      DetectOutcome::Detected(result)
      | DetectOutcome::Empty(result)
      | DetectOutcome::Degraded { result, .. } => result,
    }
  }

  pub fn into_result(self) -> DetectionResult {
    match self {
      DetectOutcome::Detected(result)
      | DetectOutcome::Empty(result)
      | DetectOutcome::Degraded { result, .. } => result,
    }
  }

  pub fn is_degraded(&self) -> bool {
    matches!(self, DetectOutcome::Degraded { .. })
  }

  pub fn cause(&self) -> Option<&DegradeCause> {
    match self {
      DetectOutcome::Degraded { cause, .. } => Some(cause),
      _ => None,
    }
  }

  /// 报告中使用的状态名
  pub fn status(&self) -> &'static str {
    match self {
      DetectOutcome::Detected(_) => "detected",
      DetectOutcome::Empty(_) => "empty",
      DetectOutcome::Degraded { .. } => "degraded",
    }
  }
}

/// 家具检测器：模型推理 + 白名单过滤 + 坐标换算 + 绘制
pub struct Detector {
  loader: ModelLoader,
  layout: &'static dyn BoxLayout,
  vocabulary: Vocabulary,
  iou_threshold: f32,
  draw: Draw,
}

impl fmt::Debug for Detector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Detector")
      .field("loader", &self.loader)
      .field("layout", &self.layout.name())
      .field("vocabulary", &self.vocabulary.len())
      .field("iou_threshold", &self.iou_threshold)
      .finish()
  }
}

impl Detector {
  pub fn new(loader: ModelLoader, vocabulary: Vocabulary) -> Self {
    Self::with_draw(loader, vocabulary, Draw::default())
  }

  /// 坐标适配器按模型族在构建时选定
  pub fn with_draw(loader: ModelLoader, vocabulary: Vocabulary, draw: Draw) -> Self {
    let layout = loader.family().layout();
    debug!("模型族 {} 使用坐标适配器 {}", loader.family(), layout.name());
    Self {
      loader,
      layout,
      vocabulary,
      iou_threshold: DEFAULT_IOU_THRESHOLD,
      draw,
    }
  }

  pub fn with_iou_threshold(mut self, iou_threshold: f32) -> Self {
    self.iou_threshold = if iou_threshold.is_nan() {
      DEFAULT_IOU_THRESHOLD
    } else {
      iou_threshold.clamp(0.0, 1.0)
    };
    self
  }

  pub fn vocabulary(&self) -> &Vocabulary {
    &self.vocabulary
  }

  pub fn loader(&self) -> &ModelLoader {
    &self.loader
  }

  /// 检测图像中的家具。任何内部错误都只会得到空结果和原图。
  pub fn detect(
    &self,
    image: &DynamicImage,
    confidence_threshold: impl Into<Option<f32>>,
  ) -> DetectionResult {
    self.detect_outcome(image, confidence_threshold).into_result()
  }

  pub fn detect_outcome(
    &self,
    image: &DynamicImage,
    confidence_threshold: impl Into<Option<f32>>,
  ) -> DetectOutcome {
    let confidence = normalize_threshold(confidence_threshold.into());

    let model = match self.loader.get() {
      Ok(model) => Arc::clone(model),
      Err(e) => {
        warn!("模型未加载，返回空结果: {}", e);
        return DetectOutcome::Degraded {
          result: DetectionResult::untouched(image),
          cause: DegradeCause::ModelUnavailable(e.to_string()),
        };
      }
    };

    let now = std::time::Instant::now();
    let run = catch_unwind(AssertUnwindSafe(|| self.run(model.as_ref(), image, confidence)));
    match run {
      Ok(Ok(result)) => {
        info!(
          "检测完成，{} 个家具，耗时: {:.2?}",
          result.detections.len(),
          now.elapsed()
        );
        DetectOutcome::from_result(result)
      }
      Ok(Err(e)) => {
        error!("检测失败: {}", e);
        DetectOutcome::Degraded {
          result: DetectionResult::untouched(image),
          cause: DegradeCause::Inference(e),
        }
      }
      Err(payload) => {
        let message = panic_message(payload.as_ref());
        error!("检测过程崩溃: {}", message);
        DetectOutcome::Degraded {
          result: DetectionResult::untouched(image),
          cause: DegradeCause::Inference(InferenceError::Panicked(message)),
        }
      }
    }
  }

  fn run(
    &self,
    model: &dyn Model,
    image: &DynamicImage,
    confidence: f32,
  ) -> Result<DetectionResult, InferenceError> {
    let rgb = image.to_rgb8();
    let params = InferParams {
      confidence,
      iou: self.iou_threshold,
    };

    let output = model.infer(&rgb, &params)?;
    debug!("模型返回 {} 个原始检测项", output.items.len());

    let detections = self.select(
      output.items.into_vec(),
      model.capabilities(),
      image.width(),
      image.height(),
      confidence,
    );
    let annotated_image = self.draw.annotate(image, &detections);

    Ok(DetectionResult {
      detections,
      annotated_image,
    })
  }

  /// 阈值、白名单、坐标换算，必要时补做重叠抑制；保持模型输出顺序
  fn select(
    &self,
    items: Vec<DetectItem>,
    capabilities: Capabilities,
    width: u32,
    height: u32,
    confidence: f32,
  ) -> Vec<Detection> {
    let mut detections = Vec::with_capacity(items.len());

    for DetectItem {
      label,
      score,
      coords,
    } in items
    {
      if !score.is_finite() || score < confidence {
        continue;
      }
      if !self.vocabulary.contains(&label) {
        trace!("丢弃非家具类别: {}", label);
        continue;
      }
      let Some(bounding_box) = self.layout.to_pixels(coords, width, height) else {
        trace!("丢弃退化的边界框: {} {:?}", label, coords);
        continue;
      };
      detections.push(Detection {
        class_name: label,
        confidence: score.clamp(0.0, 1.0),
        bounding_box,
      });
    }

    if !capabilities.suppresses_overlaps {
      detections = nms::suppress(detections, self.iou_threshold);
    }

    detections
  }
}

fn normalize_threshold(threshold: Option<f32>) -> f32 {
  match threshold {
    Some(t) if !t.is_nan() => t.clamp(0.0, 1.0),
    _ => DEFAULT_CONFIDENCE_THRESHOLD,
  }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    message.to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "未知错误".to_string()
  }
}
