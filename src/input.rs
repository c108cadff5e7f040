// 该文件是 LEVisions 项目的一部分。
// src/input.rs - 图像输入
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
  io::Cursor,
  path::{Path, PathBuf},
};

use image::{DynamicImage, ImageReader};
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme};

#[derive(Error, Debug)]
pub enum DecodeError {
  #[error("图像数据为空")]
  Empty,
  #[error("无法读取图像文件 {path}: {source}")]
  Io {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("无法识别图像格式: {0}")]
  Format(std::io::Error),
  #[error("图像解码错误: {0}")]
  Image(#[from] image::ImageError),
  #[error("URI 方案不匹配: 期望 '{expected}', 实际 '{found}'")]
  SchemeMismatch {
    expected: &'static str,
    found: String,
  },
}

/// 从内存中的字节解码图像，格式按内容猜测
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
  if bytes.is_empty() {
    return Err(DecodeError::Empty);
  }
  let reader = ImageReader::new(Cursor::new(bytes))
    .with_guessed_format()
    .map_err(DecodeError::Format)?;
  let image = reader.decode()?;
  debug!(
    "解码图像 {}x{} {:?}",
    image.width(),
    image.height(),
    image.color()
  );
  Ok(image)
}

/// 读取并解码图像文件
pub fn open_image(path: &Path) -> Result<DynamicImage, DecodeError> {
  let bytes = std::fs::read(path).map_err(|source| DecodeError::Io {
    path: path.to_path_buf(),
    source,
  })?;
  decode_image(&bytes).inspect_err(|e| error!("无法解码 {}: {}", path.display(), e))
}

/// `image:///path/to/file.jpg` 形式的图像文件输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFileInput {
  path: PathBuf,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = DecodeError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(DecodeError::SchemeMismatch {
        expected: Self::SCHEME,
        found: url.scheme().to_string(),
      });
    }
    Ok(Self::new(url.path()))
  }
}

impl ImageFileInput {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// 接受 `image://` URL 或普通文件路径
  pub fn parse(s: &str) -> Result<Self, DecodeError> {
    match Url::parse(s) {
      Ok(url) if url.scheme() == Self::SCHEME => Self::from_url(&url),
      _ => Ok(Self::new(s)),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn read(&self) -> Result<DynamicImage, DecodeError> {
    open_image(&self.path)
  }
}

#[cfg(test)]
mod tests {
  use image::{ImageFormat, RgbImage};

  use super::*;

  fn png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(4, 3))
      .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
      .unwrap();
    bytes
  }

  #[test]
  fn decodes_png_bytes() {
    let image = decode_image(&png_bytes()).unwrap();
    assert_eq!((image.width(), image.height()), (4, 3));
  }

  #[test]
  fn garbage_is_a_decode_error() {
    assert!(matches!(decode_image(&[]), Err(DecodeError::Empty)));
    assert!(matches!(
      decode_image(b"definitely not an image"),
      Err(DecodeError::Image(_))
    ));
  }

  #[test]
  fn missing_files_are_io_errors() {
    assert!(matches!(
      open_image(Path::new("/definitely/not/here.png")),
      Err(DecodeError::Io { .. })
    ));
  }

  #[test]
  fn reads_from_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("room.png");
    std::fs::write(&path, png_bytes()).unwrap();

    let input = ImageFileInput::parse(path.to_str().unwrap()).unwrap();
    assert_eq!(input.read().unwrap().width(), 4);
  }

  #[test]
  fn accepts_image_urls() {
    let input = ImageFileInput::parse("image:///tmp/room.jpg").unwrap();
    assert_eq!(input.path(), Path::new("/tmp/room.jpg"));

    let url = Url::parse("video:///tmp/room.mp4").unwrap();
    assert!(matches!(
      ImageFileInput::from_url(&url),
      Err(DecodeError::SchemeMismatch { .. })
    ));
  }
}
