mod common;

use common::*;
use levisions::{
  demo::demo_report,
  input::{DecodeError, decode_image},
};
use serde_json::Value;

#[test]
fn test_similar_products_ignore_case() {
  let catalog = Catalog::default();
  let office = catalog.similar_products("Office Chair");
  assert!(!office.is_empty());
  assert_eq!(office, catalog.similar_products("office chair"));
  assert_eq!(office, catalog.similar_products("chair"));
}

#[test]
fn test_unmatched_class_has_no_links() {
  assert!(Catalog::default().similar_products("Teddy bear").is_empty());
}

#[test]
fn test_dining_table_gets_the_table_links() {
  let catalog = Catalog::default();
  let links = catalog.similar_products("Dining table");
  assert_eq!(links.len(), 4);
  assert_eq!(links, catalog.similar_products("table"));
}

#[test]
fn test_recommend_pairs_each_detection_with_links() {
  let service = scripted_service(living_room_items());
  let result = service.detect(&room_image(), 0.5);
  let items = service.recommend(&result.detections);

  assert_eq!(items.len(), 3);
  for item in &items {
    assert_eq!(
      item.similar,
      service.similar_products(&item.detection.class_name)
    );
  }
  assert_eq!(items[0].label, "couch 0.91");
  assert_eq!(items[2].similar.len(), 4);
}

#[test]
fn test_report_json() {
  let service = scripted_service(living_room_items());
  let outcome = service.detect_outcome(&room_image(), 0.5);
  let json: Value = serde_json::from_str(&service.report(&outcome).to_json().unwrap()).unwrap();

  assert_eq!(json["status"], "detected");
  assert_eq!(json["items"].as_array().map(Vec::len), Some(3));
  assert_eq!(json["items"][1]["class_name"], "chair");
  assert_eq!(json["items"][1]["bounding_box"]["x2"], 320);
  assert!(json["items"][1]["similar"][0]["url"].is_string());
}

#[test]
fn test_report_explains_empty_and_degraded_outcomes() {
  let service = scripted_service(Vec::new());
  let empty = service.report(&service.detect_outcome(&room_image(), 0.5));
  assert_eq!(empty.status, "empty");
  assert!(empty.message.is_some());

  let degraded = FurnitureService::new(
    Detector::new(
      ModelLoader::new(ModelSource::path(ModelFamily::Ssd, "/definitely/not/ssd.onnx")),
      Vocabulary::default(),
    ),
    Catalog::default(),
  );
  let report = degraded.report(&degraded.detect_outcome(&room_image(), 0.5));
  assert_eq!(report.status, "degraded");
  assert!(report.items.is_empty());
  assert!(report.message.is_some());
}

#[test]
fn test_demo_report() {
  let json: Value = serde_json::from_str(&demo_report().to_json().unwrap()).unwrap();
  assert_eq!(json["status"], "demo");
  assert_eq!(json["items"][0]["label"], "Chair 0.95");
  assert_eq!(json["items"][1]["label"], "Table 0.88");
  assert_eq!(json["items"][1]["bounding_box"]["y2"], 450);
}

#[test]
fn test_undecodable_upload_is_reported() {
  assert!(matches!(
    decode_image(b"GIF89a but not really"),
    Err(DecodeError::Image(_))
  ));
}
