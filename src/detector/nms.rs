// 该文件是 LEVisions 项目的一部分。
// src/detector/nms.rs - 非极大值抑制
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

use tracing::debug;

use super::Detection;

/// 同类别贪心 NMS，保留项按原输入顺序返回
pub(super) fn suppress(detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
  let n = detections.len();
  if n < 2 {
    return detections;
  }

  // 稳定排序：同分时保持模型顺序
  let mut order: Vec<usize> = (0..n).collect();
  order.sort_by(|&a, &b| {
    detections[b]
      .confidence
      .total_cmp(&detections[a].confidence)
  });

  let mut suppressed = vec![false; n];
  for (rank, &best) in order.iter().enumerate() {
    if suppressed[best] {
      continue;
    }
    for &other in &order[rank + 1..] {
      if suppressed[other] {
        continue;
      }
      let (a, b) = (&detections[best], &detections[other]);
      if a.class_name.eq_ignore_ascii_case(&b.class_name)
        && a.bounding_box.iou(&b.bounding_box) > iou_threshold
      {
        suppressed[other] = true;
      }
    }
  }

  let kept: Vec<Detection> = detections
    .into_iter()
    .zip(suppressed)
    .filter_map(|(detection, suppressed)| (!suppressed).then_some(detection))
    .collect();
  debug!("NMS: 保留 {}/{} 个检测", kept.len(), n);
  kept
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::detector::BoundingBox;

  fn det(class_name: &str, confidence: f32, bbox: [u32; 4]) -> Detection {
    Detection {
      class_name: class_name.to_string(),
      confidence,
      bounding_box: BoundingBox::new(bbox[0], bbox[1], bbox[2], bbox[3]),
    }
  }

  #[test]
  fn keeps_the_strongest_of_an_overlapping_pair() {
    let kept = suppress(
      vec![
        det("chair", 0.6, [0, 0, 100, 100]),
        det("chair", 0.9, [5, 5, 105, 105]),
        det("chair", 0.7, [300, 300, 400, 400]),
      ],
      0.45,
    );
    let scores: Vec<f32> = kept.iter().map(|d| d.confidence).collect();
    assert_eq!(scores, [0.9, 0.7]);
  }

  #[test]
  fn different_classes_never_suppress_each_other() {
    let kept = suppress(
      vec![
        det("chair", 0.9, [0, 0, 100, 100]),
        det("couch", 0.8, [0, 0, 100, 100]),
      ],
      0.45,
    );
    assert_eq!(kept.len(), 2);
  }

  #[test]
  fn suppressed_boxes_do_not_suppress_others() {
    // b 被 a 抑制，c 只和 b 重叠，应当保留
    let kept = suppress(
      vec![
        det("tv", 0.9, [0, 0, 100, 100]),
        det("tv", 0.8, [30, 0, 130, 100]),
        det("tv", 0.7, [80, 0, 180, 100]),
      ],
      0.45,
    );
    let scores: Vec<f32> = kept.iter().map(|d| d.confidence).collect();
    assert_eq!(scores, [0.9, 0.7]);
  }
}
