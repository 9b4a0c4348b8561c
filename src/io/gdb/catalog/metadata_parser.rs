//! Extraction of structural facts from item definitions.
//!
//! Definitions are the XML documents stored in the `Definition` column of
//! `GDB_Items`. Parsing never fails: a missing or malformed definition
//! yields empty metadata plus a warning message for the caller to report.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_16LE, UTF_8};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::types::{Extent, FieldType, GeometryType, Kind};

use super::catalog_item::{ItemMetadata, MetadataField};

/// Metadata parsed from one definition, with any warnings raised.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedMetadata {
    pub metadata: ItemMetadata,
    pub warnings: Vec<String>,
}

impl ParsedMetadata {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            metadata: ItemMetadata::default(),
            warnings: vec![message.into()],
        }
    }
}

/// Parse the facts relevant to `kind` out of a raw definition.
pub fn parse_definition(definition: Option<&[u8]>, kind: Kind) -> ParsedMetadata {
    if kind == Kind::Unknown {
        return ParsedMetadata::default();
    }
    let bytes = match definition {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return ParsedMetadata::warning("item has no definition"),
    };

    let text = decode_xml(bytes);
    let scan = match DefinitionScan::run(&text) {
        Ok(scan) => scan,
        Err(message) => return ParsedMetadata::warning(format!("malformed definition: {}", message)),
    };

    let mut warnings = Vec::new();
    if let Some(declared) = scan.dataset_type.as_deref() {
        let declared_kind = Kind::from_dataset_type(declared);
        if declared_kind != Kind::Unknown && declared_kind != kind {
            warnings.push(format!(
                "definition declares {} but the item type is {}",
                declared, kind
            ));
        }
    }

    ParsedMetadata {
        metadata: scan.into_metadata(kind),
        warnings,
    }
}

/// Decode definition bytes, honouring a byte order mark or bare UTF-16LE.
fn decode_xml(bytes: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text;
    }
    let encoding = if bytes.len() >= 2 && bytes[0] != 0 && bytes[1] == 0 {
        UTF_16LE
    } else {
        UTF_8
    };
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    text
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

#[derive(Debug, Default)]
struct DefinitionScan {
    root: Option<String>,
    dataset_type: Option<String>,
    shape_type: Option<String>,
    root_wkid: Option<i32>,
    root_latest_wkid: Option<i32>,
    extent_wkid: Option<i32>,
    bounds: [Option<f64>; 4],
    fields: Option<Vec<MetadataField>>,
    pending_field: Option<(String, String)>,
    band_count: Option<u32>,
    raster_bands: u32,
    pixel_type: Option<String>,
}

impl DefinitionScan {
    fn run(xml: &str) -> Result<Self, String> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut scan = DefinitionScan::default();
        let mut path: Vec<String> = Vec::new();
        let mut text = String::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    path.push(local_name(e));
                    text.clear();
                    scan.open(&path);
                }
                Ok(Event::Empty(ref e)) => {
                    path.push(local_name(e));
                    scan.open(&path);
                    scan.close(&path, "");
                    path.pop();
                }
                Ok(Event::Text(e)) => {
                    let chunk = e.unescape().map_err(|e| e.to_string())?;
                    text.push_str(&chunk);
                }
                Ok(Event::CData(e)) => {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
                Ok(Event::End(_)) => {
                    scan.close(&path, text.trim());
                    text.clear();
                    path.pop();
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(format!("at byte {}: {}", reader.buffer_position(), e));
                }
            }
        }

        if !path.is_empty() {
            return Err(format!("unclosed element <{}>", path.join("/")));
        }
        if scan.root.is_none() {
            return Err("no root element".to_string());
        }
        Ok(scan)
    }

    fn open(&mut self, path: &[String]) {
        let names: Vec<&str> = path.iter().map(String::as_str).collect();
        match names.as_slice() {
            [root] => self.root = Some(root.to_string()),
            [_, "Fields"] => {
                self.fields.get_or_insert_with(Vec::new);
            }
            [_, "Fields", "FieldArray", "Field"] => {
                self.pending_field = Some((String::new(), String::new()));
            }
            [.., "DERasterBand"] => self.raster_bands += 1,
            _ => {}
        }
    }

    fn close(&mut self, path: &[String], text: &str) {
        let names: Vec<&str> = path.iter().map(String::as_str).collect();
        match names.as_slice() {
            [_, "DatasetType"] => self.dataset_type = non_empty(text),
            [_, "ShapeType"] => self.shape_type = non_empty(text),
            [_, "SpatialReference", "WKID"] => self.root_wkid = text.parse().ok(),
            [_, "SpatialReference", "LatestWKID"] => self.root_latest_wkid = text.parse().ok(),
            [_, "Extent", "SpatialReference", "WKID"] => self.extent_wkid = text.parse().ok(),
            [_, "Extent", bound] => {
                let slot = match *bound {
                    "XMin" => 0,
                    "YMin" => 1,
                    "XMax" => 2,
                    "YMax" => 3,
                    _ => return,
                };
                self.bounds[slot] = text.parse::<f64>().ok().filter(|v| v.is_finite());
            }
            [_, "Fields", "FieldArray", "Field", "Name"] => {
                if let Some(field) = self.pending_field.as_mut() {
                    field.0 = text.to_string();
                }
            }
            [_, "Fields", "FieldArray", "Field", "Type"] => {
                if let Some(field) = self.pending_field.as_mut() {
                    field.1 = text.to_string();
                }
            }
            [_, "Fields", "FieldArray", "Field"] => {
                if let Some((name, type_name)) = self.pending_field.take() {
                    if !name.is_empty() {
                        self.fields.get_or_insert_with(Vec::new).push(MetadataField {
                            field_type: FieldType::from_esri_name(&type_name),
                            name,
                            type_name,
                        });
                    }
                }
            }
            [_, "BandCount"] => self.band_count = text.parse().ok(),
            [.., "PixelType"] => {
                if self.pixel_type.is_none() {
                    self.pixel_type = non_empty(text);
                }
            }
            _ => {}
        }
    }

    fn spatial_reference(&self) -> Option<i32> {
        self.root_wkid
            .or(self.root_latest_wkid)
            .or(self.extent_wkid)
            .filter(|wkid| *wkid > 0)
    }

    fn extent(&self) -> Option<Extent> {
        match self.bounds {
            [Some(xmin), Some(ymin), Some(xmax), Some(ymax)] => Some(Extent::new(xmin, ymin, xmax, ymax)),
            _ => None,
        }
    }

    fn into_metadata(self, kind: Kind) -> ItemMetadata {
        let mut metadata = ItemMetadata {
            definition_root: self.root.clone(),
            dataset_type: self.dataset_type.clone(),
            ..ItemMetadata::default()
        };

        match kind {
            Kind::FeatureClass | Kind::Table => {
                metadata.geometry_type = self
                    .shape_type
                    .as_deref()
                    .and_then(GeometryType::from_esri_name);
                metadata.spatial_reference = self.spatial_reference();
                metadata.extent = self.extent();
                metadata.fields = self.fields;
            }
            Kind::RasterDataset => {
                metadata.band_count = self
                    .band_count
                    .or((self.raster_bands > 0).then_some(self.raster_bands));
                metadata.pixel_type = self.pixel_type;
            }
            Kind::FeatureDataset => {
                metadata.spatial_reference = self.spatial_reference();
            }
            Kind::Unknown => {}
        }
        metadata
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}
