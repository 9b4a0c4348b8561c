//! Writers for small synthetic geodatabases used by the integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use fgdb_tools_rs::FieldType;
use uuid::Uuid;

pub const FEATURE_DATASET: Uuid = Uuid::from_u128(0x74737149_DCB5_4257_8904_B9724E32A530);
pub const FEATURE_CLASS: Uuid = Uuid::from_u128(0x70737809_852C_4A03_9E22_2CECEA5B9BFA);
pub const TABLE: Uuid = Uuid::from_u128(0xCD06BC3B_789D_4C51_AAFA_A467912B8965);
pub const RASTER_DATASET: Uuid = Uuid::from_u128(0x5ED667A3_9CA9_44A2_8029_D95BF23704B9);
pub const WORKSPACE: Uuid = Uuid::from_u128(0xC673FE0F_7280_404F_8532_20755DD8FC06);

const HEADER_SIZE: u64 = 40;
const INDEX_OFFSET_WIDTH: usize = 5;

/// A stored cell value.
#[derive(Debug, Clone)]
pub enum Cell {
    Null,
    Int16(i16),
    Int32(i32),
    Float64(f64),
    Date(f64),
    Text(String),
    Guid(Uuid),
    Bytes(Vec<u8>),
}

impl Cell {
    pub fn text(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// Writes the LEB128 form of `value`.
pub fn varuint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

fn utf16_prefixed(s: &str, out: &mut Vec<u8>) {
    out.push(s.encode_utf16().count() as u8);
    for unit in s.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
}

enum Row {
    Live(Vec<Cell>),
    Deleted(usize),
    /// Live row with a hand-made payload
    Raw(Vec<u8>),
    /// Raw length prefix followed by no payload
    Bogus(i32),
}

/// Builds the bytes of one `.gdbtable` file and its index.
pub struct TableBuilder {
    magic: u32,
    version: u32,
    geometry_code: u8,
    fields: Vec<(String, FieldType)>,
    rows: Vec<Row>,
    record_count: Option<i32>,
    utf8_text: bool,
}

impl TableBuilder {
    pub fn new(fields: &[(&str, FieldType)]) -> Self {
        Self {
            magic: 3,
            version: 4,
            geometry_code: 0,
            fields: fields.iter().map(|(n, t)| (n.to_string(), *t)).collect(),
            rows: Vec::new(),
            record_count: None,
            utf8_text: false,
        }
    }

    pub fn magic(mut self, magic: u32) -> Self {
        self.magic = magic;
        self
    }

    /// Record format version code written to the descriptor block.
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Store text values as UTF-8 instead of UTF-16LE.
    pub fn utf8_text(mut self) -> Self {
        self.utf8_text = true;
        self
    }

    pub fn geometry_code(mut self, code: u8) -> Self {
        self.geometry_code = code;
        self
    }

    /// Override the header record count.
    pub fn record_count(mut self, count: i32) -> Self {
        self.record_count = Some(count);
        self
    }

    /// Append a live row; cells line up with the fields, ObjectID cells are ignored.
    pub fn row(mut self, cells: Vec<Cell>) -> Self {
        assert_eq!(cells.len(), self.fields.len());
        self.rows.push(Row::Live(cells));
        self
    }

    /// Append a deleted row occupying `span` bytes.
    pub fn deleted(mut self, span: usize) -> Self {
        self.rows.push(Row::Deleted(span));
        self
    }

    /// Append a live row with a hand-made payload.
    pub fn raw(mut self, payload: Vec<u8>) -> Self {
        self.rows.push(Row::Raw(payload));
        self
    }

    /// Append a record whose length prefix is `len` but whose payload is missing.
    pub fn bogus(mut self, len: i32) -> Self {
        self.rows.push(Row::Bogus(len));
        self
    }

    fn live_count(&self) -> i32 {
        self.rows
            .iter()
            .filter(|r| matches!(r, Row::Live(_) | Row::Raw(_)))
            .count() as i32
    }

    fn descriptor_block(&self) -> Vec<u8> {
        let mut block = Vec::new();
        block.write_u32::<LittleEndian>(self.version).unwrap();
        block.write_u32::<LittleEndian>(u32::from(self.geometry_code)).unwrap();
        block.write_u16::<LittleEndian>(self.fields.len() as u16).unwrap();

        for (name, field_type) in &self.fields {
            utf16_prefixed(name, &mut block);
            utf16_prefixed("", &mut block);
            block.push(field_type.code());
            let flags = if *field_type == FieldType::ObjectId { 0x04 } else { 0x01 | 0x08 };
            match field_type {
                FieldType::ShortInt
                | FieldType::LongInt
                | FieldType::Float32
                | FieldType::Float64
                | FieldType::Date => {
                    block.extend([field_type.fixed_width().unwrap_or(0) as u8, flags, 0]);
                }
                FieldType::Text => {
                    block.write_u32::<LittleEndian>(255).unwrap();
                    block.push(flags);
                    varuint(0, &mut block);
                }
                FieldType::ObjectId
                | FieldType::Guid
                | FieldType::GlobalId
                | FieldType::Blob
                | FieldType::Xml => {
                    block.extend([field_type.fixed_width().unwrap_or(0) as u8, flags]);
                }
                FieldType::Geometry => {
                    block.extend([0, flags]);
                    let wkt: Vec<u8> = "GEOGCS[\"GCS_WGS_1984\"]"
                        .encode_utf16()
                        .flat_map(|u| u.to_le_bytes())
                        .collect();
                    block.write_u16::<LittleEndian>(wkt.len() as u16).unwrap();
                    block.extend(wkt);
                    block.push(0);
                    for v in [-400.0, -400.0, 1e9, 8.98e-9, -180.0, -90.0, 180.0, 90.0] {
                        block.write_f64::<LittleEndian>(v).unwrap();
                    }
                    block.push(0);
                    block.write_u32::<LittleEndian>(1).unwrap();
                    block.write_f64::<LittleEndian>(0.5).unwrap();
                }
            }
        }
        block
    }

    fn payload(&self, cells: &[Cell]) -> Vec<u8> {
        let mut mask = vec![0u8; self.fields.len().div_ceil(8)];
        let mut data = Vec::new();

        for (i, ((_, field_type), cell)) in self.fields.iter().zip(cells).enumerate() {
            if *field_type == FieldType::ObjectId {
                continue;
            }
            match cell {
                Cell::Null => continue,
                Cell::Int16(v) => data.write_i16::<LittleEndian>(*v).unwrap(),
                Cell::Int32(v) => data.write_i32::<LittleEndian>(*v).unwrap(),
                Cell::Float64(v) | Cell::Date(v) => data.write_f64::<LittleEndian>(*v).unwrap(),
                Cell::Guid(id) => data.extend_from_slice(&id.to_bytes_le()),
                Cell::Text(s) => {
                    let bytes: Vec<u8> = if self.utf8_text {
                        s.as_bytes().to_vec()
                    } else {
                        s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
                    };
                    varuint(bytes.len() as u64, &mut data);
                    data.extend(bytes);
                }
                Cell::Bytes(bytes) => {
                    varuint(bytes.len() as u64, &mut data);
                    data.extend_from_slice(bytes);
                }
            }
            mask[i / 8] |= 1 << (i % 8);
        }

        mask.extend(data);
        mask
    }

    /// Table file bytes plus the offset of every row (0 for deleted rows).
    pub fn build(&self) -> (Vec<u8>, Vec<u64>) {
        let block = self.descriptor_block();
        let mut body = Vec::new();
        let mut offsets = Vec::new();
        let data_offset = HEADER_SIZE + 4 + block.len() as u64;
        let mut max_record = 0u32;

        for row in &self.rows {
            let offset = data_offset + body.len() as u64;
            match row {
                Row::Live(_) | Row::Raw(_) => {
                    let payload = match row {
                        Row::Live(cells) => self.payload(cells),
                        Row::Raw(bytes) => bytes.clone(),
                        _ => unreachable!(),
                    };
                    max_record = max_record.max(payload.len() as u32);
                    body.write_i32::<LittleEndian>(payload.len() as i32).unwrap();
                    body.extend(payload);
                    offsets.push(offset);
                }
                Row::Deleted(span) => {
                    body.write_i32::<LittleEndian>(-(*span as i32)).unwrap();
                    body.extend(vec![0xEE; *span]);
                    offsets.push(0);
                }
                Row::Bogus(len) => {
                    body.write_i32::<LittleEndian>(*len).unwrap();
                    offsets.push(offset);
                }
            }
        }

        let file_size = data_offset + body.len() as u64;
        let mut file = Vec::new();
        file.write_u32::<LittleEndian>(self.magic).unwrap();
        file.write_i32::<LittleEndian>(self.record_count.unwrap_or_else(|| self.live_count()))
            .unwrap();
        file.write_u32::<LittleEndian>(max_record).unwrap();
        file.write_u32::<LittleEndian>(5).unwrap();
        file.write_u64::<LittleEndian>(0).unwrap();
        file.write_u64::<LittleEndian>(file_size).unwrap();
        file.write_u64::<LittleEndian>(HEADER_SIZE).unwrap();
        file.write_u32::<LittleEndian>(block.len() as u32).unwrap();
        file.extend(block);
        file.extend(body);
        (file, offsets)
    }

    /// Write `a<number>.gdbtable`, and its index when `with_index` is set.
    pub fn write(&self, directory: &Path, number: u32, with_index: bool) {
        let (table, offsets) = self.build();
        let stem = format!("a{:08x}", number);
        fs::write(directory.join(format!("{}.gdbtable", stem)), table).unwrap();
        if with_index {
            fs::write(directory.join(format!("{}.gdbtablx", stem)), index_bytes(&offsets)).unwrap();
        }
    }
}

/// Dense `.gdbtablx` bytes for the given row offsets.
pub fn index_bytes(offsets: &[u64]) -> Vec<u8> {
    let blocks = offsets.len().div_ceil(1024);
    let mut out = Vec::new();
    out.write_u32::<LittleEndian>(3).unwrap();
    out.write_u32::<LittleEndian>(blocks as u32).unwrap();
    out.write_u32::<LittleEndian>(offsets.len() as u32).unwrap();
    out.write_u32::<LittleEndian>(INDEX_OFFSET_WIDTH as u32).unwrap();
    for row in 0..blocks * 1024 {
        let offset = offsets.get(row).copied().unwrap_or(0);
        out.extend_from_slice(&offset.to_le_bytes()[..INDEX_OFFSET_WIDTH]);
    }
    out
}

/// One row of `GDB_Items`.
#[derive(Debug, Clone)]
pub struct ItemRow {
    pub uuid: Uuid,
    pub type_id: Uuid,
    pub name: String,
    pub path: String,
    pub definition: Option<String>,
}

impl ItemRow {
    pub fn new(type_id: Uuid, name: &str, path: &str) -> Self {
        Self {
            uuid: Uuid::from_u128(fxhash(name, path)),
            type_id,
            name: name.to_string(),
            path: path.to_string(),
            definition: None,
        }
    }

    pub fn definition(mut self, xml: impl Into<String>) -> Self {
        self.definition = Some(xml.into());
        self
    }

    pub fn feature_dataset(name: &str) -> Self {
        Self::new(FEATURE_DATASET, name, &format!("\\{}", name))
            .definition(dataset_xml("DEFeatureDataset", "esriDTFeatureDataset", 4326))
    }

    pub fn feature_class(name: &str, path: &str) -> Self {
        Self::new(FEATURE_CLASS, name, path)
            .definition(feature_class_xml(path, "esriGeometryPolyline", 4326))
    }

    pub fn table(name: &str, path: &str) -> Self {
        Self::new(TABLE, name, path).definition(
            "<DETableInfo><DatasetType>esriDTTable</DatasetType>\
             <Fields><FieldArray><Field><Name>OBJECTID</Name><Type>esriFieldTypeOID</Type></Field>\
             </FieldArray></Fields></DETableInfo>",
        )
    }

    pub fn raster(name: &str, path: &str) -> Self {
        Self::new(RASTER_DATASET, name, path).definition(
            "<DERasterDataset><DatasetType>esriDTRasterDataset</DatasetType>\
             <StorageDef><PixelType>U8</PixelType></StorageDef>\
             <Children><DERasterBand/><DERasterBand/><DERasterBand/></Children></DERasterDataset>",
        )
    }

    pub fn workspace() -> Self {
        Self::new(WORKSPACE, "", "\\")
    }
}

fn fxhash(name: &str, path: &str) -> u128 {
    name.bytes()
        .chain(path.bytes())
        .fold(0x811c_9dc5u128, |h, b| (h ^ u128::from(b)).wrapping_mul(0x0100_0000_01b3))
}

pub fn dataset_xml(root: &str, dataset_type: &str, wkid: i32) -> String {
    format!(
        "<{root}><DatasetType>{dataset_type}</DatasetType>\
         <SpatialReference><WKID>{wkid}</WKID></SpatialReference></{root}>"
    )
}

pub fn feature_class_xml(path: &str, shape_type: &str, wkid: i32) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <DEFeatureClassInfo><CatalogPath>{path}</CatalogPath>\
         <DatasetType>esriDTFeatureClass</DatasetType>\
         <Fields><FieldArray>\
         <Field><Name>OBJECTID</Name><Type>esriFieldTypeOID</Type></Field>\
         <Field><Name>SHAPE</Name><Type>esriFieldTypeGeometry</Type></Field>\
         </FieldArray></Fields>\
         <ShapeType>{shape_type}</ShapeType>\
         <Extent><XMin>0</XMin><YMin>0</YMin><XMax>10</XMax><YMax>10</YMax></Extent>\
         <SpatialReference><WKID>{wkid}</WKID></SpatialReference></DEFeatureClassInfo>"
    )
}

/// Fields of the master catalog.
pub fn master_fields() -> Vec<(&'static str, FieldType)> {
    vec![
        ("ID", FieldType::ObjectId),
        ("Name", FieldType::Text),
        ("FileFormat", FieldType::LongInt),
    ]
}

/// Fields of the items table.
pub fn items_fields() -> Vec<(&'static str, FieldType)> {
    vec![
        ("ObjectID", FieldType::ObjectId),
        ("UUID", FieldType::GlobalId),
        ("Type", FieldType::Guid),
        ("Name", FieldType::Text),
        ("PhysicalName", FieldType::Text),
        ("Path", FieldType::Text),
        ("Url", FieldType::Text),
        ("Properties", FieldType::LongInt),
        ("Defaults", FieldType::Blob),
        ("DatasetSubtype1", FieldType::LongInt),
        ("Definition", FieldType::Xml),
        ("Documentation", FieldType::Xml),
        ("ItemInfo", FieldType::Xml),
        ("Shape", FieldType::Geometry),
    ]
}

/// Cells of one items table row.
pub fn item_cells(item: &ItemRow) -> Vec<Cell> {
    vec![
        Cell::Null,
        Cell::Guid(item.uuid),
        Cell::Guid(item.type_id),
        Cell::text(&item.name),
        Cell::text(&item.name.to_uppercase()),
        Cell::text(&item.path),
        Cell::Null,
        Cell::Int32(1),
        Cell::Null,
        Cell::Null,
        item.definition
            .as_ref()
            .map_or(Cell::Null, |xml| Cell::Bytes(xml.as_bytes().to_vec())),
        Cell::Null,
        Cell::Null,
        Cell::Null,
    ]
}

/// A whole geodatabase directory.
pub struct GdbBuilder {
    pub items: Vec<ItemRow>,
    /// Table number of `GDB_Items`
    pub items_number: u32,
    /// Name written in the first master catalog row
    pub self_name: String,
    pub with_index: bool,
    pub version: u32,
}

impl Default for GdbBuilder {
    fn default() -> Self {
        Self {
            items: vec![ItemRow::workspace()],
            items_number: 4,
            self_name: "GDB_SystemCatalog".to_string(),
            with_index: true,
            version: 4,
        }
    }
}

impl GdbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(mut self, item: ItemRow) -> Self {
        self.items.push(item);
        self
    }

    pub fn items_number(mut self, number: u32) -> Self {
        self.items_number = number;
        self
    }

    pub fn self_name(mut self, name: &str) -> Self {
        self.self_name = name.to_string();
        self
    }

    pub fn with_index(mut self, with_index: bool) -> Self {
        self.with_index = with_index;
        self
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn master_table(&self) -> TableBuilder {
        let filler = ["GDB_DBTune", "GDB_SpatialRefs", "GDB_ItemTypes", "GDB_ItemRelationships"];
        let mut table = TableBuilder::new(&master_fields()).version(self.version);
        for number in 1..=self.items_number.max(2) {
            let name = if number == 1 {
                self.self_name.clone()
            } else if number == self.items_number {
                "GDB_Items".to_string()
            } else {
                filler[(number as usize - 2) % filler.len()].to_string()
            };
            table = table.row(vec![Cell::Null, Cell::Text(name), Cell::Int32(0)]);
        }
        table
    }

    pub fn items_table(&self) -> TableBuilder {
        let mut table = TableBuilder::new(&items_fields())
            .version(self.version)
            .geometry_code(4);
        for item in &self.items {
            table = table.row(item_cells(item));
        }
        table
    }

    /// Write the master catalog and the items table into `directory`.
    pub fn write(&self, directory: &Path) {
        self.master_table().write(directory, 1, self.with_index);
        self.items_table()
            .write(directory, self.items_number, self.with_index);
    }
}

/// A fresh directory holding the geodatabase described by `builder`.
pub fn write_gdb(builder: &GdbBuilder) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    builder.write(dir.path());
    dir
}
