// 该文件是 LEVisions 项目的一部分。
// src/args.rs - 命令行参数
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

use clap::Parser;

/// LEVisions 家具检测与推荐
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入图片（*.jpg, *.jpeg, *.png 或 image:///path）
  #[arg(long, value_name = "SOURCE", required_unless_present = "demo")]
  pub input: Option<String>,

  /// 标注图像保存路径（文件路径或 image:///path）
  #[arg(long, value_name = "OUTPUT")]
  pub output: Option<String>,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.5", value_name = "THRESHOLD")]
  pub confidence: f32,

  /// NMS IOU 阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.45", value_name = "THRESHOLD")]
  pub iou: f32,

  /// 模型来源，指定时不读取 YOLO_MODEL_PATH
  /// 支持格式:
  /// - 文件: /path/to/model.onnx
  /// - 模型族: yolov8:///path/to/model.onnx, ssd:///path/to/model.onnx
  /// - 预训练标识: yolov8n, ssd_mobilenet_v1
  #[arg(long, value_name = "MODEL")]
  pub model: Option<String>,

  /// 零售商目录 JSON 文件
  #[arg(long, value_name = "FILE")]
  pub catalog: Option<PathBuf>,

  /// 标签字体 (TrueType)
  #[arg(long, value_name = "FILE")]
  pub font: Option<PathBuf>,

  /// 演示模式：不运行检测，输出固定的示例结果
  #[arg(long)]
  pub demo: bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn input_is_required_outside_demo_mode() {
    assert!(Args::try_parse_from(["levisions"]).is_err());
    assert!(Args::try_parse_from(["levisions", "--demo"]).is_ok());
  }

  #[test]
  fn defaults_and_model_parsing() {
    let args = Args::try_parse_from([
      "levisions",
      "--input",
      "room.jpg",
      "--model",
      "ssd:///models/ssd.onnx",
    ])
    .unwrap();
    assert_eq!(args.confidence, 0.5);
    assert_eq!(args.iou, 0.45);
    assert_eq!(args.model.as_deref(), Some("ssd:///models/ssd.onnx"));
  }
}
