// 该文件是 LEVisions 项目的一部分。
// src/catalog.rs - 家具零售商链接目录
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

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// 葡萄牙家居零售商，按类别排列，顺序决定匹配优先级
const PORTUGUESE_STORES: &[(&str, &[(&str, &str)])] = &[
  (
    "Chair",
    &[
      ("IKEA Portugal - Cadeiras", "https://www.ikea.com/pt/pt/cat/cadeiras-fu002/"),
      ("Leroy Merlin - Cadeiras", "https://www.leroymerlin.pt/produtos/mobiliario/cadeiras"),
      ("Conforama - Cadeiras", "https://www.conforama.pt/mobiliario/cadeiras"),
    ],
  ),
  (
    "Couch",
    &[
      ("IKEA Portugal - Sofás", "https://www.ikea.com/pt/pt/cat/sofas-fu003/"),
      ("Moviflor - Sofás", "https://www.moviflor.pt/sofas"),
      ("Conforama - Sofás", "https://www.conforama.pt/sofas"),
    ],
  ),
  (
    "Table",
    &[
      ("IKEA Portugal - Mesas", "https://www.ikea.com/pt/pt/cat/mesas-fu004/"),
      ("Leroy Merlin - Mesas", "https://www.leroymerlin.pt/produtos/mobiliario/mesas"),
      ("Conforama - Mesas", "https://www.conforama.pt/mobiliario/mesas"),
      ("Moviflor - Mesas", "https://www.moviflor.pt/mesas"),
    ],
  ),
  (
    "Bed",
    &[
      ("IKEA Portugal - Camas", "https://www.ikea.com/pt/pt/cat/camas-bm003/"),
      ("Moviflor - Camas", "https://www.moviflor.pt/camas"),
      ("Conforama - Camas", "https://www.conforama.pt/quarto/camas"),
    ],
  ),
  (
    "Tv",
    &[
      ("Worten - Televisores", "https://www.worten.pt/tv-video-e-som/televisores"),
      ("El Corte Inglés - Televisores", "https://www.elcorteingles.pt/electronica/televisores/"),
    ],
  ),
  (
    "Laptop",
    &[
      (
        "Worten - Portáteis",
        "https://www.worten.pt/informatica-e-acessorios/computadores/computadores-portateis",
      ),
      ("El Corte Inglés - Portáteis", "https://www.elcorteingles.pt/informatica/portateis/"),
    ],
  ),
  (
    "Refrigerator",
    &[
      ("Worten - Frigoríficos", "https://www.worten.pt/grandes-eletrodomesticos/frio/frigorificos"),
      ("El Corte Inglés - Frigoríficos", "https://www.elcorteingles.pt/electrodomesticos/frigorificos/"),
    ],
  ),
  (
    "Microwave",
    &[(
      "Worten - Micro-ondas",
      "https://www.worten.pt/pequenos-eletrodomesticos/cozinha/micro-ondas",
    )],
  ),
  (
    "Oven",
    &[
      ("Worten - Fornos", "https://www.worten.pt/grandes-eletrodomesticos/encastre/fornos"),
      ("Leroy Merlin - Fornos", "https://www.leroymerlin.pt/produtos/cozinhas/eletrodomesticos/fornos"),
    ],
  ),
  (
    "Sink",
    &[
      ("Leroy Merlin - Lava-loiças", "https://www.leroymerlin.pt/produtos/cozinhas/lava-loicas"),
      ("AKI - Lava-loiças", "https://www.aki.pt/cozinha/lava-loicas"),
    ],
  ),
  (
    "Toilet",
    &[
      ("Leroy Merlin - Sanitas", "https://www.leroymerlin.pt/produtos/casas-de-banho/sanitas"),
      ("AKI - Sanitas", "https://www.aki.pt/casa-de-banho/sanitas"),
    ],
  ),
  (
    "Clock",
    &[("IKEA Portugal - Relógios", "https://www.ikea.com/pt/pt/cat/relogios-10759/")],
  ),
  (
    "Vase",
    &[
      ("IKEA Portugal - Vasos", "https://www.ikea.com/pt/pt/cat/vasos-10776/"),
      ("Leroy Merlin - Vasos", "https://www.leroymerlin.pt/produtos/decoracao/vasos"),
    ],
  ),
];

#[derive(Error, Debug)]
pub enum CatalogError {
  #[error("无法读取目录文件 {path}: {source}")]
  Io {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("目录 JSON 格式错误: {0}")]
  Json(#[from] serde_json::Error),
  #[error("目录中存在空类别")]
  EmptyCategory,
  #[error("类别 '{category}' 的链接 '{url}' 无效: {source}")]
  InvalidUrl {
    category: String,
    url: String,
    source: url::ParseError,
  },
  #[error("类别 '{category}' 的链接 '{url}' 不是 http(s) 地址")]
  UnsupportedScheme { category: String, url: String },
}

/// 零售商链接
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerLink {
  #[serde(rename = "name", alias = "display_name")]
  pub display_name: String,
  pub url: String,
}

impl RetailerLink {
  pub fn new(display_name: impl Into<String>, url: impl Into<String>) -> Self {
    Self {
      display_name: display_name.into(),
      url: url.into(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
  pub category: String,
  pub links: Vec<RetailerLink>,
}

/// 只读的类别到链接映射，启动时加载一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
  entries: Box<[CatalogEntry]>,
}

impl Default for Catalog {
  fn default() -> Self {
    let entries = PORTUGUESE_STORES
      .iter()
      .map(|(category, links)| CatalogEntry {
        category: category.to_string(),
        links: links
          .iter()
          .map(|(name, url)| RetailerLink::new(*name, *url))
          .collect(),
      })
      .collect();
    Self { entries }
  }
}

impl Catalog {
  /// 校验类别和链接后构建目录，条目顺序保持不变
  pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
    for entry in &entries {
      if entry.category.trim().is_empty() {
        return Err(CatalogError::EmptyCategory);
      }
      for link in &entry.links {
        validate_url(&entry.category, &link.url)?;
      }
    }
    Ok(Self {
      entries: entries.into_boxed_slice(),
    })
  }

  /// 解析 `[{"category": ..., "links": [{"name": ..., "url": ...}]}]`
  pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
    let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
    Self::new(entries)
  }

  pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
    info!("加载零售商目录: {}", path.display());
    let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    let catalog = Self::from_json_str(&json)?;
    debug!("目录共 {} 个类别", catalog.len());
    Ok(catalog)
  }

  pub fn entries(&self) -> &[CatalogEntry] {
    &self.entries
  }

  pub fn categories(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|entry| entry.category.as_str())
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// 按目录顺序查找第一个（小写后）是类别名子串的键，没有匹配时为空
  pub fn similar_products(&self, class_name: &str) -> &[RetailerLink] {
    let needle = class_name.to_lowercase();
    match self
      .entries
      .iter()
      .find(|entry| needle.contains(&entry.category.to_lowercase()))
    {
      Some(entry) => {
        debug!("'{}' 匹配目录类别 '{}'", class_name, entry.category);
        entry.links.as_slice()
      }
      None => {
        debug!("'{}' 没有匹配的目录类别", class_name);
        &[]
      }
    }
  }
}

fn validate_url(category: &str, url: &str) -> Result<(), CatalogError> {
  let parsed = Url::parse(url).map_err(|source| CatalogError::InvalidUrl {
    category: category.to_string(),
    url: url.to_string(),
    source,
  })?;
  match parsed.scheme() {
    "http" | "https" => Ok(()),
    _ => Err(CatalogError::UnsupportedScheme {
      category: category.to_string(),
      url: url.to_string(),
    }),
  }
}
