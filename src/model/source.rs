// 该文件是 LEVisions 项目的一部分。
// src/model/source.rs - 模型来源解析
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
  path::{Path, PathBuf},
  str::FromStr,
};

use thiserror::Error;
use tracing::debug;
use url::Url;

use super::{ModelFamily, ModelLoadError};
use crate::FromUrl;

/// 指定模型来源的环境变量
pub const MODEL_PATH_ENV: &str = "YOLO_MODEL_PATH";

/// 未配置时使用的内置预训练模型标识
pub const DEFAULT_MODEL_ID: &str = "yolov8n";

const MODEL_EXTENSION: &str = "onnx";
const MODEL_DIR: &str = "models";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
  #[error("模型来源为空")]
  Empty,
  #[error("未知的模型方案: {0}")]
  UnknownScheme(String),
  #[error("模型 URL 缺少路径: {0}")]
  MissingPath(String),
  #[error("URL 解析错误: {0}")]
  Url(#[from] url::ParseError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
  /// 本地模型文件
  Path(PathBuf),
  /// 预训练模型标识，按 `<id>.onnx`、`models/<id>.onnx` 顺序查找
  Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSource {
  pub family: ModelFamily,
  pub location: Location,
}

impl Default for ModelSource {
  fn default() -> Self {
    Self::named(DEFAULT_MODEL_ID)
  }
}

impl fmt::Display for ModelSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.location {
      Location::Path(path) => write!(f, "{}://{}", self.family, path.display()),
      Location::Named(id) => write!(f, "{}:{}", self.family, id),
    }
  }
}

impl FromUrl for ModelSource {
  type Error = SourceError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    let family = ModelFamily::from_scheme(url.scheme())
      .ok_or_else(|| SourceError::UnknownScheme(url.scheme().to_string()))?;

    // yolov8://yolov8n 这类写法把标识放在 host 位置
    if let Some(host) = url.host_str()
      && !host.is_empty()
      && url.path().trim_matches('/').is_empty()
    {
      return Ok(Self {
        family,
        location: Location::Named(host.to_string()),
      });
    }

    if url.path().is_empty() || url.path() == "/" {
      return Err(SourceError::MissingPath(url.to_string()));
    }

    Ok(Self {
      family,
      location: Location::Path(PathBuf::from(url.path())),
    })
  }
}

impl FromStr for ModelSource {
  type Err = SourceError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    if s.is_empty() {
      return Err(SourceError::Empty);
    }

    if s.contains("://") {
      let url = Url::parse(s)?;
      return Self::from_url(&url);
    }

    let looks_like_path = s.contains(std::path::MAIN_SEPARATOR)
      || s.contains('/')
      || Path::new(s)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(MODEL_EXTENSION));

    if looks_like_path {
      Ok(Self {
        family: ModelFamily::YoloV8,
        location: Location::Path(PathBuf::from(s)),
      })
    } else {
      Ok(Self::named(s))
    }
  }
}

impl ModelSource {
  /// 预训练标识，`ssd` 开头的标识归入 SSD 模型族
  pub fn named(id: &str) -> Self {
    let family = if id.to_lowercase().starts_with("ssd") {
      ModelFamily::Ssd
    } else {
      ModelFamily::YoloV8
    };
    Self {
      family,
      location: Location::Named(id.to_string()),
    }
  }

  pub fn path(family: ModelFamily, path: impl Into<PathBuf>) -> Self {
    Self {
      family,
      location: Location::Path(path.into()),
    }
  }

  /// 读取环境变量；未设置时为 `None`
  pub fn from_env() -> Result<Option<Self>, SourceError> {
    match std::env::var(MODEL_PATH_ENV) {
      Ok(value) if !value.trim().is_empty() => value.parse().map(Some),
      _ => Ok(None),
    }
  }

  /// 解析出实际要加载的文件
  pub fn resolve(&self) -> Result<PathBuf, ModelLoadError> {
    match &self.location {
      Location::Path(path) => {
        std::fs::metadata(path).map_err(|source| ModelLoadError::Unreachable {
          path: path.clone(),
          source,
        })?;
        Ok(path.clone())
      }
      Location::Named(id) => {
        let file = format!("{}.{}", id, MODEL_EXTENSION);
        let candidates = [PathBuf::from(&file), Path::new(MODEL_DIR).join(&file)];
        for candidate in candidates {
          debug!("查找预训练模型: {}", candidate.display());
          if candidate.is_file() {
            return Ok(candidate);
          }
        }
        Err(ModelLoadError::NotFound(id.clone()))
      }
    }
  }
}
