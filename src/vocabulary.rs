// 该文件是 LEVisions 项目的一部分。
// src/vocabulary.rs - 家具类别白名单
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

/// 默认的家具类别（COCO 类别名的子集）
pub const FURNITURE_CLASSES: [&str; 22] = [
  "chair",
  "couch",
  "bed",
  "dining table",
  "toilet",
  "tv",
  "laptop",
  "mouse",
  "remote",
  "keyboard",
  "cell phone",
  "microwave",
  "oven",
  "sink",
  "refrigerator",
  "book",
  "clock",
  "vase",
  "scissors",
  "teddy bear",
  "hair drier",
  "toothbrush",
];

/// 类别白名单，按小写形式存储，匹配时忽略大小写
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
  names: Box<[String]>,
}

impl Default for Vocabulary {
  fn default() -> Self {
    Self::new(FURNITURE_CLASSES)
  }
}

impl Vocabulary {
  pub fn new<I, S>(names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut list: Vec<String> = Vec::new();
    for name in names {
      let name = name.as_ref().trim().to_lowercase();
      if !name.is_empty() && !list.contains(&name) {
        list.push(name);
      }
    }
    Self {
      names: list.into_boxed_slice(),
    }
  }

  /// 完整匹配（忽略大小写），不做子串匹配
  pub fn contains(&self, class_name: &str) -> bool {
    let lower = class_name.trim().to_lowercase();
    self.names.iter().any(|name| *name == lower)
  }

  pub fn names(&self) -> &[String] {
    &self.names
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }
}
