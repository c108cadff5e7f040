// 该文件是 LEVisions 项目的一部分。
// src/frame.rs - 模型输入张量布局
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

use image::{RgbImage, imageops::FilterType};

const RGB_CHANNELS: usize = 3;

/// NCHW 排列、归一化到 [0, 1] 的浮点帧
#[derive(Debug, Clone)]
pub struct RgbNchwFrame {
  data: Box<[f32]>,
  width: usize,
  height: usize,
}

impl RgbNchwFrame {
  /// 缩放到模型输入尺寸后转为 NCHW
  pub fn resized(image: &RgbImage, width: u32, height: u32) -> Self {
    let resized = image::imageops::resize(image, width, height, FilterType::Triangle);
    Self::from(&resized)
  }

  /// `[1, C, H, W]`
  pub fn shape(&self) -> [usize; 4] {
    [1, RGB_CHANNELS, self.height, self.width]
  }

  pub fn into_data(self) -> Box<[f32]> {
    self.data
  }
}

impl From<&RgbImage> for RgbNchwFrame {
  fn from(image: &RgbImage) -> Self {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let plane = width * height;
    let mut data = vec![0f32; plane * RGB_CHANNELS];

    for (x, y, pixel) in image.enumerate_pixels() {
      let idx = y as usize * width + x as usize;
      for c in 0..RGB_CHANNELS {
        data[c * plane + idx] = pixel[c] as f32 / 255.0;
      }
    }

    Self {
      data: data.into_boxed_slice(),
      width,
      height,
    }
  }
}

/// NHWC 排列的 8 位帧，保持原图尺寸
#[derive(Debug, Clone)]
pub struct RgbNhwcFrame {
  data: Box<[u8]>,
  width: usize,
  height: usize,
}

impl RgbNhwcFrame {
  /// `[1, H, W, C]`
  pub fn shape(&self) -> [usize; 4] {
    [1, self.height, self.width, RGB_CHANNELS]
  }

  pub fn into_data(self) -> Box<[u8]> {
    self.data
  }
}

impl From<&RgbImage> for RgbNhwcFrame {
  fn from(image: &RgbImage) -> Self {
    // RgbImage 本身就是交错排列的 HWC
    Self {
      data: image.as_raw().clone().into_boxed_slice(),
      width: image.width() as usize,
      height: image.height() as usize,
    }
  }
}

#[cfg(test)]
mod tests {
  use image::Rgb;

  use super::*;

  fn sample() -> RgbImage {
    let mut image = RgbImage::new(2, 1);
    image.put_pixel(0, 0, Rgb([255, 0, 51]));
    image.put_pixel(1, 0, Rgb([0, 102, 255]));
    image
  }

  #[test]
  fn nchw_splits_channels_into_planes() {
    let frame = RgbNchwFrame::from(&sample());
    assert_eq!(frame.shape(), [1, 3, 1, 2]);
    assert_eq!(&*frame.into_data(), &[1.0, 0.0, 0.0, 0.4, 0.2, 1.0]);
  }

  #[test]
  fn nhwc_keeps_pixels_interleaved() {
    let frame = RgbNhwcFrame::from(&sample());
    assert_eq!(frame.shape(), [1, 1, 2, 3]);
    assert_eq!(&*frame.into_data(), &[255, 0, 51, 0, 102, 255]);
  }

  #[test]
  fn resize_matches_the_requested_shape() {
    let frame = RgbNchwFrame::resized(&sample(), 8, 4);
    assert_eq!(frame.shape(), [1, 3, 4, 8]);
    assert_eq!(frame.into_data().len(), 3 * 4 * 8);
  }
}
