// 该文件是 LEVisions 项目的一部分。
// src/output/draw.rs - 检测结果可视化
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

use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, PxScale};
use image::{DynamicImage, Rgba};
use imageproc::{
  drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size},
  rect::Rect,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::detector::Detection;

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 16.0;
const LABEL_TEXT_HEIGHT: i32 = 18;
const LABEL_CHAR_WIDTH: f32 = 8.0; // 无字体时估算标签宽度
const LABEL_TEXT_HORIZONTAL_PADDING: i32 = 2;
const LABEL_TEXT_VERTICAL_PADDING: i32 = 1;
const BOX_COLOR: [u8; 3] = [0, 255, 0]; // 绿色
const TEXT_COLOR: [u8; 3] = [0, 0, 0];
const BOX_THICKNESS: u32 = 2;

/// 内置标签字体
const DEFAULT_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

#[derive(Error, Debug)]
pub enum DrawError {
  #[error("无法读取字体文件 {path}: {source}")]
  FontIo {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("字体文件无效: {0}")]
  InvalidFont(PathBuf),
}

pub struct Draw {
  font: Option<FontArc>,
  font_size: f32,
  label_text_height: i32,
  label_char_width: f32,
  box_color: [u8; 3],
  text_color: [u8; 3],
  thickness: u32,
}

impl Default for Draw {
  fn default() -> Self {
    let font = FontArc::try_from_slice(DEFAULT_FONT).ok();
    if font.is_none() {
      warn!("内置字体无法加载，标签只绘制背景条");
    }
    Self::with_font(font)
  }
}

impl Draw {
  fn with_font(font: Option<FontArc>) -> Self {
    Self {
      font,
      font_size: LABEL_FONT_SIZE,
      label_text_height: LABEL_TEXT_HEIGHT,
      label_char_width: LABEL_CHAR_WIDTH,
      box_color: BOX_COLOR,
      text_color: TEXT_COLOR,
      thickness: BOX_THICKNESS,
    }
  }

  pub fn from_font_file(path: &Path) -> Result<Self, DrawError> {
    Ok(Self::with_font(Some(load_font(path)?)))
  }

  pub fn without_font() -> Self {
    Self::with_font(None)
  }

  /// 在副本上绘制检测框和标签，尺寸与颜色模式保持不变
  pub fn annotate(&self, image: &DynamicImage, detections: &[Detection]) -> DynamicImage {
    let mut canvas = image.clone();
    for detection in detections {
      self.draw_bbox_with_label(&mut canvas, detection);
    }
    canvas
  }

  fn draw_bbox_with_label(&self, canvas: &mut DynamicImage, detection: &Detection) {
    let (w, h) = (canvas.width(), canvas.height());
    let bbox = &detection.bounding_box;
    let color = rgba(self.box_color);

    // 绘制边框（向内加粗）
    for t in 0..self.thickness {
      let width = bbox.width().saturating_sub(2 * t);
      let height = bbox.height().saturating_sub(2 * t);
      if width == 0 || height == 0 {
        break;
      }
      let rect = Rect::at((bbox.x1 + t) as i32, (bbox.y1 + t) as i32).of_size(width, height);
      draw_hollow_rect_mut(canvas, rect, color);
    }

    let label = detection.label();
    let scale = PxScale::from(self.font_size);

    let text_width = match &self.font {
      Some(font) => text_size(scale, font, &label).0 as i32,
      None => (label.len() as f32 * self.label_char_width) as i32,
    } + 2 * LABEL_TEXT_HORIZONTAL_PADDING;
    let text_height = self.label_text_height;

    // 标签放在边框左上角上方，贴近图像顶部时放进框内
    let label_x = bbox.x1 as i32;
    let label_y = if bbox.y1 as i32 >= text_height {
      bbox.y1 as i32 - text_height
    } else {
      bbox.y1 as i32
    };

    let max_width = (w as i32 - label_x).max(0);
    let max_height = (h as i32 - label_y).max(0);
    let label_width = text_width.min(max_width) as u32;
    let label_height = text_height.min(max_height) as u32;

    if label_width == 0 || label_height == 0 {
      return;
    }

    let rect = Rect::at(label_x, label_y).of_size(label_width, label_height);
    draw_filled_rect_mut(canvas, rect, color);

    if let Some(font) = &self.font {
      draw_text_mut(
        canvas,
        rgba(self.text_color),
        label_x + LABEL_TEXT_HORIZONTAL_PADDING,
        label_y + LABEL_TEXT_VERTICAL_PADDING,
        scale,
        font,
        &label,
      );
    }
  }
}

fn rgba([r, g, b]: [u8; 3]) -> Rgba<u8> {
  Rgba([r, g, b, u8::MAX])
}

fn load_font(path: &Path) -> Result<FontArc, DrawError> {
  let data = std::fs::read(path).map_err(|source| DrawError::FontIo {
    path: path.to_path_buf(),
    source,
  })?;
  let font = FontArc::try_from_vec(data).map_err(|_| DrawError::InvalidFont(path.to_path_buf()))?;
  debug!("加载标签字体: {}", path.display());
  Ok(font)
}

#[cfg(test)]
mod tests {
  use image::{GenericImageView, GrayImage, RgbImage};

  use super::*;
  use crate::detector::BoundingBox;

  fn chair() -> Detection {
    Detection {
      class_name: "chair".to_string(),
      confidence: 0.87,
      bounding_box: BoundingBox::new(20, 40, 80, 90),
    }
  }

  #[test]
  fn annotation_keeps_size_and_color_mode() {
    let image = DynamicImage::ImageLuma8(GrayImage::new(120, 100));
    let annotated = Draw::without_font().annotate(&image, &[chair()]);

    assert_eq!(annotated.dimensions(), image.dimensions());
    assert_eq!(annotated.color(), image.color());
    assert_ne!(annotated, image);
    // 原图不变
    assert!(image.as_luma8().unwrap().pixels().all(|p| p.0 == [0]));
  }

  #[test]
  fn box_outline_is_green() {
    let image = DynamicImage::ImageRgb8(RgbImage::new(120, 100));
    let annotated = Draw::without_font().annotate(&image, &[chair()]).to_rgb8();

    assert_eq!(annotated.get_pixel(20, 60).0, BOX_COLOR);
    assert_eq!(annotated.get_pixel(21, 60).0, BOX_COLOR);
    assert_eq!(annotated.get_pixel(79, 60).0, BOX_COLOR);
    // 框内部不画
    assert_eq!(annotated.get_pixel(50, 65).0, [0, 0, 0]);
    // 标签背景在框上方
    assert_eq!(annotated.get_pixel(22, 40 - 5).0, BOX_COLOR);
  }

  #[test]
  fn labels_near_the_top_stay_inside_the_image() {
    let detection = Detection {
      bounding_box: BoundingBox::new(0, 0, 30, 30),
      ..chair()
    };
    let image = DynamicImage::ImageRgb8(RgbImage::new(30, 30));
    let annotated = Draw::without_font().annotate(&image, &[detection]);
    assert_eq!(annotated.dimensions(), (30, 30));
  }

  fn text_pixels(annotated: &RgbImage) -> usize {
    // 标签条位于 (20, 22) 起，高 18
    (22..40)
      .flat_map(|y| (20..60).map(move |x| (x, y)))
      .filter(|&(x, y)| annotated.get_pixel(x, y).0 != BOX_COLOR)
      .count()
  }

  #[test]
  fn default_draw_renders_label_text() {
    let image = DynamicImage::ImageRgb8(RgbImage::new(120, 100));
    let with_text = Draw::default().annotate(&image, &[chair()]).to_rgb8();
    let bare = Draw::without_font().annotate(&image, &[chair()]).to_rgb8();

    assert_eq!(text_pixels(&bare), 0);
    assert!(text_pixels(&with_text) > 20);
  }

  #[test]
  fn missing_font_files_are_errors() {
    assert!(matches!(
      Draw::from_font_file(Path::new("/definitely/not/a/font.ttf")),
      Err(DrawError::FontIo { .. })
    ));
  }
}
