// 该文件是 LEVisions 项目的一部分。
// src/demo.rs - 演示模式的固定数据
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

//! 演示模式不经过检测器和目录，直接给出示例结果。

use crate::{
  catalog::RetailerLink,
  detector::{BoundingBox, Detection},
  output::{Report, ReportItem, STATUS_DEMO},
};

const DEMO_DETECTIONS: [(&str, f32, BoundingBox); 2] = [
  ("Chair", 0.95, BoundingBox::new(100, 200, 300, 400)),
  ("Table", 0.88, BoundingBox::new(150, 250, 350, 450)),
];

const DEMO_LINKS: [(&str, &str); 2] = [
  ("IKEA Portugal", "https://www.ikea.com/pt/pt/"),
  ("Leroy Merlin", "https://www.leroymerlin.pt/"),
];

pub const DEMO_MESSAGE: &str = "演示模式：显示示例结果";

pub fn demo_detections() -> Vec<Detection> {
  DEMO_DETECTIONS
    .iter()
    .map(|&(class_name, confidence, bounding_box)| Detection {
      class_name: class_name.to_string(),
      confidence,
      bounding_box,
    })
    .collect()
}

pub fn demo_links() -> Vec<RetailerLink> {
  DEMO_LINKS
    .iter()
    .map(|&(name, url)| RetailerLink::new(name, url))
    .collect()
}

pub fn demo_report() -> Report {
  let links = demo_links();
  let items = demo_detections()
    .into_iter()
    .map(|detection| ReportItem::new(detection, &links))
    .collect();
  Report::new(STATUS_DEMO, items).with_message(DEMO_MESSAGE)
}
