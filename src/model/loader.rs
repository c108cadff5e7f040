// 该文件是 LEVisions 项目的一部分。
// src/model/loader.rs - 模型加载（进程内只加载一次）
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
  sync::{Arc, OnceLock},
};

use tracing::{error, info};

use super::{Location, Model, ModelFamily, ModelLoadError, ModelSource, SourceError};
use crate::detector::panic_message;

type BuildFn = fn(&ModelSource) -> Result<Arc<dyn Model>, ModelLoadError>;

/// 懒加载的模型句柄。
///
/// 第一次调用 [`ModelLoader::get`] 时才真正加载；加载结果（包括失败和崩溃）
/// 被记住，之后不再重试。
pub struct ModelLoader {
  source: ModelSource,
  build: BuildFn,
  cell: OnceLock<Result<Arc<dyn Model>, ModelLoadError>>,
}

impl fmt::Debug for ModelLoader {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = match self.cell.get() {
      None => "pending",
      Some(Ok(_)) => "loaded",
      Some(Err(_)) => "failed",
    };
    f.debug_struct("ModelLoader")
      .field("source", &self.source)
      .field("state", &state)
      .finish()
  }
}

impl ModelLoader {
  pub fn new(source: ModelSource) -> Self {
    Self {
      source,
      build,
      cell: OnceLock::new(),
    }
  }

  /// 来源解析失败的加载器，一开始就处于失败状态
  fn invalid(error: SourceError) -> Self {
    error!("模型来源无效，检测器将以降级模式运行: {}", error);
    Self::settled(
      ModelSource::default(),
      Err(ModelLoadError::InvalidSource(error)),
    )
  }

  /// 配置中的来源，解析失败时得到降级的加载器
  pub fn from_source(source: Result<ModelSource, SourceError>) -> Self {
    match source {
      Ok(source) => Self::new(source),
      Err(error) => Self::invalid(error),
    }
  }

  /// 直接使用已经构建好的模型
  pub fn preloaded(model: Arc<dyn Model>) -> Self {
    let source = ModelSource {
      family: model.family(),
      location: Location::Named("preloaded".to_string()),
    };
    Self::settled(source, Ok(model))
  }

  fn settled(source: ModelSource, result: Result<Arc<dyn Model>, ModelLoadError>) -> Self {
    let cell = OnceLock::new();
    let _ = cell.set(result);
    Self {
      source,
      build,
      cell,
    }
  }

  pub fn family(&self) -> ModelFamily {
    self.source.family
  }

  pub fn get(&self) -> Result<&Arc<dyn Model>, &ModelLoadError> {
    self
      .cell
      .get_or_init(|| load(&self.source, self.build))
      .as_ref()
  }

  pub fn is_initialized(&self) -> bool {
    self.cell.get().is_some()
  }
}

/// 构建过程中的崩溃同样记为加载失败，不会带出 `get`
fn load(source: &ModelSource, build: BuildFn) -> Result<Arc<dyn Model>, ModelLoadError> {
  info!("加载模型: {}", source);
  let model = catch_unwind(AssertUnwindSafe(|| build(source))).unwrap_or_else(|payload| {
    Err(ModelLoadError::Runtime(format!(
      "加载过程崩溃: {}",
      panic_message(payload.as_ref())
    )))
  });
  match &model {
    Ok(_) => info!("模型加载完成"),
    Err(e) => error!("模型加载失败，检测器将以降级模式运行: {}", e),
  }
  model
}

#[cfg(feature = "onnx")]
fn build(source: &ModelSource) -> Result<Arc<dyn Model>, ModelLoadError> {
  use super::{SsdBuilder, YoloV8Builder};

  let path = source.resolve()?;
  let model: Arc<dyn Model> = match source.family {
    ModelFamily::YoloV8 => Arc::new(YoloV8Builder::new(path).build()?),
    ModelFamily::Ssd => Arc::new(SsdBuilder::new(path).build()?),
  };
  Ok(model)
}

#[cfg(not(feature = "onnx"))]
fn build(source: &ModelSource) -> Result<Arc<dyn Model>, ModelLoadError> {
  source.resolve()?;
  Err(ModelLoadError::Unsupported(source.family))
}

#[cfg(test)]
mod tests {
  use image::RgbImage;

  use super::*;
  use crate::model::{Capabilities, DetectOutput, InferParams, ModelError};

  struct Nothing;

  impl Model for Nothing {
    fn family(&self) -> ModelFamily {
      ModelFamily::Ssd
    }

    fn capabilities(&self) -> Capabilities {
      Capabilities::default()
    }

    fn infer(&self, _: &RgbImage, _: &InferParams) -> Result<DetectOutput, ModelError> {
      Ok(DetectOutput::default())
    }
  }

  #[test]
  fn failures_are_memoized() {
    let loader = ModelLoader::new(ModelSource::path(
      ModelFamily::YoloV8,
      "/definitely/not/here.onnx",
    ));
    assert!(!loader.is_initialized());
    assert!(loader.get().is_err());
    assert!(loader.is_initialized());

    let first = loader.get().err().map(|e| e as *const ModelLoadError);
    let second = loader.get().err().map(|e| e as *const ModelLoadError);
    assert_eq!(first, second);
  }

  #[test]
  fn invalid_sources_fail_without_loading() {
    let loader = ModelLoader::from_source("rknn:///models/x.rknn".parse());
    assert!(loader.is_initialized());
    assert!(matches!(
      loader.get(),
      Err(ModelLoadError::InvalidSource(SourceError::UnknownScheme(_)))
    ));
  }

  #[test]
  fn panics_while_building_are_load_failures() {
    fn exploding(_: &ModelSource) -> Result<Arc<dyn Model>, ModelLoadError> {
      panic!("ort environment went away")
    }

    let loader = ModelLoader {
      build: exploding,
      ..ModelLoader::new(ModelSource::default())
    };
    match loader.get() {
      Err(ModelLoadError::Runtime(message)) => assert!(message.contains("ort environment")),
      other => panic!("unexpected load result: {:?}", other.map(|_| ())),
    }
    // 失败被记住，不会再次构建
    assert!(loader.is_initialized());
    assert!(loader.get().is_err());
  }

  #[test]
  fn preloaded_models_take_their_family() {
    let loader = ModelLoader::preloaded(Arc::new(Nothing));
    assert!(loader.is_initialized());
    assert_eq!(loader.family(), ModelFamily::Ssd);
    assert!(loader.get().is_ok());
  }
}
