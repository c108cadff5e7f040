// 该文件是 LEVisions 项目的一部分。
// src/model/layout.rs - 边界框坐标适配
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

use std::fmt::Debug;

use crate::detector::BoundingBox;

/// 把模型原始坐标转换为原图上的绝对像素坐标。
/// 返回 `None` 表示裁剪后框已退化。
pub trait BoxLayout: Debug + Send + Sync {
  fn name(&self) -> &'static str;
  fn to_pixels(&self, coords: [f32; 4], width: u32, height: u32) -> Option<BoundingBox>;
}

/// 原图绝对坐标 (x1, y1, x2, y2)，只做裁剪
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteXyxy;

impl BoxLayout for AbsoluteXyxy {
  fn name(&self) -> &'static str {
    "absolute-xyxy"
  }

  fn to_pixels(&self, coords: [f32; 4], width: u32, height: u32) -> Option<BoundingBox> {
    let [x1, y1, x2, y2] = coords;
    BoundingBox::clamped(x1, y1, x2, y2, width, height)
  }
}

/// 归一化坐标 (y1, x1, y2, x2)，取值 [0, 1]
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedYxyx;

impl BoxLayout for NormalizedYxyx {
  fn name(&self) -> &'static str {
    "normalized-yxyx"
  }

  fn to_pixels(&self, coords: [f32; 4], width: u32, height: u32) -> Option<BoundingBox> {
    let [y1, x1, y2, x2] = coords;
    let (w, h) = (width as f32, height as f32);
    BoundingBox::clamped(x1 * w, y1 * h, x2 * w, y2 * h, width, height)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn absolute_boxes_pass_through() {
    let bbox = AbsoluteXyxy.to_pixels([10.0, 20.0, 110.0, 220.0], 640, 480);
    assert_eq!(bbox, Some(BoundingBox::new(10, 20, 110, 220)));
  }

  #[test]
  fn absolute_boxes_are_clamped_to_the_image() {
    let bbox = AbsoluteXyxy.to_pixels([-5.0, -3.5, 700.0, 500.0], 640, 480);
    assert_eq!(bbox, Some(BoundingBox::new(0, 0, 640, 480)));
  }

  #[test]
  fn normalized_yxyx_is_reordered_and_scaled() {
    let bbox = NormalizedYxyx.to_pixels([0.25, 0.1, 0.75, 0.5], 200, 100);
    assert_eq!(bbox, Some(BoundingBox::new(20, 25, 100, 75)));
  }

  #[test]
  fn degenerate_boxes_are_rejected() {
    assert_eq!(AbsoluteXyxy.to_pixels([50.0, 50.0, 50.0, 80.0], 100, 100), None);
    assert_eq!(AbsoluteXyxy.to_pixels([120.0, 10.0, 150.0, 20.0], 100, 100), None);
    assert_eq!(NormalizedYxyx.to_pixels([0.5, 0.5, 0.4, 0.9], 100, 100), None);
    assert_eq!(AbsoluteXyxy.to_pixels([f32::NAN, 0.0, 10.0, 10.0], 100, 100), None);
  }
}
