// 该文件是 LEVisions 项目的一部分。
// src/model/session.rs - ONNX Runtime 会话
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
  path::Path,
  sync::{Mutex, MutexGuard},
};

use ort::{
  session::{Session, builder::GraphOptimizationLevel},
  value::DynValue,
};
use tracing::debug;

use super::{ModelError, ModelLoadError};

pub(crate) fn runtime_load_error(e: impl std::fmt::Display) -> ModelLoadError {
  ModelLoadError::Runtime(e.to_string())
}

pub(crate) fn runtime_error(e: impl std::fmt::Display) -> ModelError {
  ModelError::Runtime(e.to_string())
}

/// 运行会话需要独占访问，推理请求在锁上串行
pub(crate) struct OnnxSession {
  session: Mutex<Session>,
  input_name: String,
  output_names: Vec<String>,
}

impl OnnxSession {
  pub(crate) fn open(path: &Path, intra_threads: usize) -> Result<Self, ModelLoadError> {
    let data = std::fs::read(path).map_err(|source| ModelLoadError::Unreachable {
      path: path.to_path_buf(),
      source,
    })?;
    debug!(
      "模型文件大小: {:.2} MB",
      data.len() as f64 / (1024.0 * 1024.0)
    );

    let session = Session::builder()
      .map_err(runtime_load_error)?
      .with_optimization_level(GraphOptimizationLevel::Level3)
      .map_err(runtime_load_error)?
      .with_intra_threads(intra_threads)
      .map_err(runtime_load_error)?
      .commit_from_memory(&data)
      .map_err(runtime_load_error)?;

    let input_name = session
      .inputs
      .first()
      .map(|input| input.name.clone())
      .ok_or_else(|| ModelLoadError::Incompatible("模型没有输入".to_string()))?;
    let output_names: Vec<String> = session
      .outputs
      .iter()
      .map(|output| output.name.clone())
      .collect();

    debug!("模型输入: {}", input_name);
    debug!("模型输出: {:?}", output_names);

    Ok(Self {
      session: Mutex::new(session),
      input_name,
      output_names,
    })
  }

  pub(crate) fn input_name(&self) -> &str {
    &self.input_name
  }

  pub(crate) fn output_names(&self) -> &[String] {
    &self.output_names
  }

  pub(crate) fn has_output(&self, name: &str) -> bool {
    self.output_names.iter().any(|output| output == name)
  }

  pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Session>, ModelError> {
    self.session.lock().map_err(|_| ModelError::SessionPoisoned)
  }
}

/// 取出浮点输出并复制，复制后即可释放会话
pub(crate) fn extract_f32(
  value: Option<&DynValue>,
  name: &str,
) -> Result<(Vec<i64>, Vec<f32>), ModelError> {
  let value = value.ok_or_else(|| ModelError::OutputShape(format!("缺少输出 '{}'", name)))?;
  let (shape, data) = value.try_extract_tensor::<f32>().map_err(runtime_error)?;
  Ok((shape.to_vec(), data.to_vec()))
}

pub(crate) fn default_intra_threads() -> usize {
  std::thread::available_parallelism()
    .map(|n| n.get())
    .unwrap_or(1)
}
