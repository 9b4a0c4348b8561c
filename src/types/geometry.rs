//! Geometry vocabulary shared by table headers and item definitions

/// Geometry type of a feature class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GeometryType {
    #[default]
    None,
    Point,
    Multipoint,
    Line,
    Polygon,
    Multipatch,
}

impl GeometryType {
    /// Map the geometry code stored in the low byte of a table's layer flags.
    pub fn from_layer_code(code: u8) -> Self {
        match code {
            1 => GeometryType::Point,
            2 => GeometryType::Multipoint,
            3 => GeometryType::Line,
            4 => GeometryType::Polygon,
            9 => GeometryType::Multipatch,
            _ => GeometryType::None,
        }
    }

    /// Map an `esriGeometry*` name as found in item definitions.
    pub fn from_esri_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix("esriGeometry").unwrap_or(name);
        match name {
            "Null" | "Any" => Some(GeometryType::None),
            "Point" => Some(GeometryType::Point),
            "Multipoint" => Some(GeometryType::Multipoint),
            "Polyline" | "Line" => Some(GeometryType::Line),
            "Polygon" => Some(GeometryType::Polygon),
            "MultiPatch" | "Multipatch" => Some(GeometryType::Multipatch),
            _ => None,
        }
    }
}

/// Axis-aligned bounds of a dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Extent {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self { xmin, ymin, xmax, ymax }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}
