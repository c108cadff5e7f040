// 该文件是 LEVisions 项目的一部分。
// src/service.rs - 检测与推荐服务
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

use image::DynamicImage;
use thiserror::Error;
use tracing::info;

use crate::{
  catalog::{Catalog, CatalogError, RetailerLink},
  config::Config,
  detector::{DetectOutcome, Detection, DetectionResult, Detector},
  model::ModelLoader,
  output::{Draw, DrawError, Report, ReportItem},
};

pub const EMPTY_MESSAGE: &str = "未检测到家具";

#[derive(Error, Debug)]
pub enum ServiceError {
  #[error("零售商目录错误: {0}")]
  Catalog(#[from] CatalogError),
  #[error("标签字体错误: {0}")]
  Font(#[from] DrawError),
}

/// 检测器和零售商目录的组合，构建后只读，可在线程间共享
#[derive(Debug)]
pub struct FurnitureService {
  detector: Detector,
  catalog: Catalog,
}

impl FurnitureService {
  pub fn new(detector: Detector, catalog: Catalog) -> Self {
    Self { detector, catalog }
  }

  /// 按配置组装服务。模型在第一次检测时才加载；来源无效或加载失败都不会在这里报错。
  pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
    let draw = match &config.font_path {
      Some(path) => Draw::from_font_file(path)?,
      None => Draw::default(),
    };
    let catalog = match &config.catalog_path {
      Some(path) => Catalog::from_json_file(path)?,
      None => Catalog::default(),
    };

    let loader = ModelLoader::from_source(config.model_source.clone());
    let detector = Detector::with_draw(loader, config.vocabulary.clone(), draw)
      .with_iou_threshold(config.iou_threshold);

    info!(
      "服务已就绪: 模型 {}, {} 个类别, {} 个目录类别",
      config.describe_model_source(),
      config.vocabulary.len(),
      catalog.len()
    );
    Ok(Self::new(detector, catalog))
  }

  pub fn detector(&self) -> &Detector {
    &self.detector
  }

  pub fn catalog(&self) -> &Catalog {
    &self.catalog
  }

  pub fn detect(
    &self,
    image: &DynamicImage,
    confidence_threshold: impl Into<Option<f32>>,
  ) -> DetectionResult {
    self.detector.detect(image, confidence_threshold)
  }

  pub fn detect_outcome(
    &self,
    image: &DynamicImage,
    confidence_threshold: impl Into<Option<f32>>,
  ) -> DetectOutcome {
    self.detector.detect_outcome(image, confidence_threshold)
  }

  pub fn similar_products(&self, class_name: &str) -> &[RetailerLink] {
    self.catalog.similar_products(class_name)
  }

  /// 每个检测项配上对应的零售商链接
  pub fn recommend(&self, detections: &[Detection]) -> Vec<ReportItem> {
    detections
      .iter()
      .map(|detection| {
        ReportItem::new(
          detection.clone(),
          self.similar_products(&detection.class_name),
        )
      })
      .collect()
  }

  pub fn report(&self, outcome: &DetectOutcome) -> Report {
    let report = Report::new(outcome.status(), self.recommend(&outcome.result().detections));
    match outcome {
      DetectOutcome::Detected(_) => report,
      DetectOutcome::Empty(_) => report.with_message(EMPTY_MESSAGE),
      DetectOutcome::Degraded { cause, .. } => report.with_message(cause.to_string()),
    }
  }
}
