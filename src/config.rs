// 该文件是 LEVisions 项目的一部分。
// src/config.rs - 启动配置
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

use tracing::{debug, warn};

use crate::{
  detector::DEFAULT_IOU_THRESHOLD,
  model::{ModelSource, SourceError},
  vocabulary::Vocabulary,
};

/// 进程启动时读取一次的配置
#[derive(Debug, Clone)]
pub struct Config {
  /// 解析失败时保留错误，检测器以降级模式运行
  pub model_source: Result<ModelSource, SourceError>,
  pub vocabulary: Vocabulary,
  pub iou_threshold: f32,
  /// 标签字体，未设置时使用内置字体
  pub font_path: Option<PathBuf>,
  /// 零售商目录 JSON，未设置时用内置目录
  pub catalog_path: Option<PathBuf>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      model_source: Ok(ModelSource::default()),
      vocabulary: Vocabulary::default(),
      iou_threshold: DEFAULT_IOU_THRESHOLD,
      font_path: None,
      catalog_path: None,
    }
  }
}

impl Config {
  /// 默认配置，模型来源取自 `YOLO_MODEL_PATH`
  pub fn from_env() -> Self {
    Self::load(None)
  }

  /// 显式指定的模型来源优先，此时不读取环境变量
  pub fn load(model_override: Option<&str>) -> Self {
    let model_source = match model_override {
      Some(source) => source.parse(),
      None => ModelSource::from_env().map(Option::unwrap_or_default),
    };
    match &model_source {
      Ok(source) => debug!("模型来源: {}", source),
      Err(e) => warn!("模型来源无效: {}", e),
    }
    Self {
      model_source,
      ..Self::default()
    }
  }

  /// 用于日志的来源描述
  pub fn describe_model_source(&self) -> String {
    match &self.model_source {
      Ok(source) => source.to_string(),
      Err(e) => format!("无效 ({})", e),
    }
  }
}
