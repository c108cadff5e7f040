// 该文件是 LEVisions 项目的一部分。
// src/output/report.rs - JSON 检测报告
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

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::{catalog::RetailerLink, detector::Detection};

pub const STATUS_DEMO: &str = "demo";

/// 单个检测项及其零售商链接
#[derive(Debug, Clone, Serialize)]
pub struct ReportItem {
  /// `"{类别} {置信度:.2}"`
  pub label: String,
  #[serde(flatten)]
  pub detection: Detection,
  pub similar: Vec<RetailerLink>,
}

impl ReportItem {
  pub fn new(detection: Detection, similar: &[RetailerLink]) -> Self {
    Self {
      label: detection.label(),
      detection,
      similar: similar.to_vec(),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
  pub status: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  pub generated_at: DateTime<Local>,
  pub items: Vec<ReportItem>,
}

impl Report {
  pub fn new(status: impl Into<String>, items: Vec<ReportItem>) -> Self {
    Self {
      status: status.into(),
      message: None,
      generated_at: Local::now(),
      items,
    }
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = Some(message.into());
    self
  }

  pub fn to_json(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(self)
  }
}
