//! Semantic kinds of catalog items

/// What a catalog item is, resolved once from its type GUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    FeatureDataset,
    FeatureClass,
    Table,
    RasterDataset,
    /// Any type this reader does not interpret (relationship classes, domains, ...)
    Unknown,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::FeatureDataset => "Feature Dataset",
            Kind::FeatureClass => "Feature Class",
            Kind::Table => "Table",
            Kind::RasterDataset => "Raster Dataset",
            Kind::Unknown => "Unknown",
        }
    }

    /// Map the `DatasetType` text of an item definition (e.g. `esriDTFeatureClass`).
    pub fn from_dataset_type(name: &str) -> Self {
        match name {
            "esriDTFeatureDataset" => Kind::FeatureDataset,
            "esriDTFeatureClass" => Kind::FeatureClass,
            "esriDTTable" => Kind::Table,
            "esriDTRasterDataset" => Kind::RasterDataset,
            _ => Kind::Unknown,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
