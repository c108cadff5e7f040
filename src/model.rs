// 该文件是 LEVisions 项目的一部分。
// src/model.rs - 模型
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

use std::{fmt, path::PathBuf};

use image::RgbImage;
use thiserror::Error;

/// 支持的预训练模型族，不同模型族的原始输出格式不同
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFamily {
  /// Ultralytics YOLOv8 ONNX 导出，输出绝对像素坐标 (x1, y1, x2, y2)
  YoloV8,
  /// TensorFlow Object Detection API 风格的 SSD，输出归一化坐标 (y1, x1, y2, x2)
  Ssd,
}

impl ModelFamily {
  pub const fn scheme(&self) -> &'static str {
    match self {
      ModelFamily::YoloV8 => "yolov8",
      ModelFamily::Ssd => "ssd",
    }
  }

  pub fn from_scheme(scheme: &str) -> Option<Self> {
    match scheme {
      "yolov8" | "yolo" => Some(ModelFamily::YoloV8),
      "ssd" => Some(ModelFamily::Ssd),
      _ => None,
    }
  }

  /// 该模型族对应的边界框适配器
  pub fn layout(&self) -> &'static dyn BoxLayout {
    match self {
      ModelFamily::YoloV8 => &AbsoluteXyxy,
      ModelFamily::Ssd => &NormalizedYxyx,
    }
  }
}

impl fmt::Display for ModelFamily {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.scheme())
  }
}

/// 单次推理参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferParams {
  pub confidence: f32,
  pub iou: f32,
}

/// 模型自身具备的过滤能力，缺失的部分由检测器补做
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
  pub suppresses_overlaps: bool,
}

/// 模型原始检测项，坐标含义由模型族决定
#[derive(Debug, Clone, PartialEq)]
pub struct DetectItem {
  pub label: String,
  pub score: f32,
  pub coords: [f32; 4],
}

#[derive(Debug, Clone, Default)]
pub struct DetectOutput {
  pub items: Box<[DetectItem]>,
}

impl From<Vec<DetectItem>> for DetectOutput {
  fn from(items: Vec<DetectItem>) -> Self {
    Self {
      items: items.into_boxed_slice(),
    }
  }
}

pub trait Model: Send + Sync {
  fn family(&self) -> ModelFamily;
  fn capabilities(&self) -> Capabilities;
  fn infer(&self, image: &RgbImage, params: &InferParams) -> Result<DetectOutput, ModelError>;
}

#[derive(Error, Debug)]
pub enum ModelError {
  #[error("ONNX Runtime 错误: {0}")]
  Runtime(String),
  #[error("模型输出不符合预期: {0}")]
  OutputShape(String),
  #[error("推理会话锁已损坏")]
  SessionPoisoned,
}

#[derive(Error, Debug)]
pub enum ModelLoadError {
  #[error("模型来源无效: {0}")]
  InvalidSource(#[from] SourceError),
  #[error("模型文件不可访问: {path}: {source}")]
  Unreachable {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("找不到预训练模型 '{0}'")]
  NotFound(String),
  #[error("模型不兼容: {0}")]
  Incompatible(String),
  #[error("模型族 {0} 未编译进当前构建")]
  Unsupported(ModelFamily),
  #[error("ONNX Runtime 无法加载模型: {0}")]
  Runtime(String),
}

pub mod labels;

mod layout;
pub use self::layout::{AbsoluteXyxy, BoxLayout, NormalizedYxyx};

mod source;
pub use self::source::{DEFAULT_MODEL_ID, Location, MODEL_PATH_ENV, ModelSource, SourceError};

mod loader;
pub use self::loader::ModelLoader;

#[cfg(feature = "onnx")]
mod session;

#[cfg(feature = "onnx")]
mod yolov8;
#[cfg(feature = "onnx")]
pub use self::yolov8::{YoloV8, YoloV8Builder};

#[cfg(feature = "onnx")]
mod ssd;
#[cfg(feature = "onnx")]
pub use self::ssd::{Ssd, SsdBuilder};
