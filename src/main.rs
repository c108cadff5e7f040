// 该文件是 LEVisions 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use levisions::{
  Config, FurnitureService, demo::demo_report, input::ImageFileInput,
  output::SaveImageFileOutput,
};

fn main() -> Result<()> {
  // 日志写到 stderr，stdout 只留给 JSON 报告
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let args = args::Args::parse();

  if args.demo {
    info!("演示模式：显示示例结果");
    println!("{}", demo_report().to_json()?);
    return Ok(());
  }

  let input = args.input.as_deref().context("缺少输入图片")?;
  info!("输入来源: {}", input);
  let image = ImageFileInput::parse(input)?
    .read()
    .with_context(|| format!("无法读取图片 {}", input))?;

  // --model 优先于 YOLO_MODEL_PATH；来源无效时检测降级，不中止
  let mut config = Config::load(args.model.as_deref());
  config.iou_threshold = args.iou;
  config.font_path = args.font;
  config.catalog_path = args.catalog;
  info!("模型来源: {}", config.describe_model_source());
  info!("置信度阈值: {}", args.confidence);
  info!("NMS 阈值: {}", config.iou_threshold);

  let service = FurnitureService::from_config(&config)?;

  let outcome = service.detect_outcome(&image, args.confidence);
  if let Some(cause) = outcome.cause() {
    warn!("检测已降级: {}", cause);
  }

  if let Some(output) = args.output.as_deref() {
    SaveImageFileOutput::parse(output)?.save(&outcome.result().annotated_image)?;
  }

  println!("{}", service.report(&outcome).to_json()?);

  Ok(())
}
