// 该文件是 LEVisions 项目的一部分。
// src/model/labels.rs - COCO 类别表
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

/// COCO 数据集类别名称（连续 80 类，YOLO 系列使用）
pub const COCO_CLASSES: [&str; 80] = [
  "person",
  "bicycle",
  "car",
  "motorcycle",
  "airplane",
  "bus",
  "train",
  "truck",
  "boat",
  "traffic light",
  "fire hydrant",
  "stop sign",
  "parking meter",
  "bench",
  "bird",
  "cat",
  "dog",
  "horse",
  "sheep",
  "cow",
  "elephant",
  "bear",
  "zebra",
  "giraffe",
  "backpack",
  "umbrella",
  "handbag",
  "tie",
  "suitcase",
  "frisbee",
  "skis",
  "snowboard",
  "sports ball",
  "kite",
  "baseball bat",
  "baseball glove",
  "skateboard",
  "surfboard",
  "tennis racket",
  "bottle",
  "wine glass",
  "cup",
  "fork",
  "knife",
  "spoon",
  "bowl",
  "banana",
  "apple",
  "sandwich",
  "orange",
  "broccoli",
  "carrot",
  "hot dog",
  "pizza",
  "donut",
  "cake",
  "chair",
  "couch",
  "potted plant",
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
  "toaster",
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

/// COCO 原始类别 ID（1 起，含空缺），与 `COCO_CLASSES` 一一对应。
/// TensorFlow Object Detection API 导出的 SSD 模型使用这套编号。
const COCO_CATEGORY_IDS: [u32; 80] = [
  1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 27, 28,
  31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 46, 47, 48, 49, 50, 51, 52, 53, 54, 55,
  56, 57, 58, 59, 60, 61, 62, 63, 64, 65, 67, 70, 72, 73, 74, 75, 76, 77, 78, 79, 80, 81, 82, 84,
  85, 86, 87, 88, 89, 90,
];

/// 连续索引 -> 类别名
pub fn coco_label(index: usize) -> Option<&'static str> {
  COCO_CLASSES.get(index).copied()
}

/// COCO 类别 ID -> 类别名
pub fn coco_category_label(id: u32) -> Option<&'static str> {
  COCO_CATEGORY_IDS
    .iter()
    .position(|&category| category == id)
    .map(|index| COCO_CLASSES[index])
}

/// 未知类别的占位名称，不会出现在任何白名单中
pub fn unknown_label(id: impl std::fmt::Display) -> String {
  format!("class_{}", id)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn category_ids_follow_the_coco_gaps() {
    assert_eq!(coco_category_label(1), Some("person"));
    assert_eq!(coco_category_label(12), None);
    assert_eq!(coco_category_label(62), Some("chair"));
    assert_eq!(coco_category_label(67), Some("dining table"));
    assert_eq!(coco_category_label(90), Some("toothbrush"));
    assert_eq!(coco_category_label(91), None);
  }

  #[test]
  fn contiguous_indices() {
    assert_eq!(coco_label(56), Some("chair"));
    assert_eq!(coco_label(60), Some("dining table"));
    assert_eq!(coco_label(80), None);
  }
}
