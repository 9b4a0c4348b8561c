//! Item type GUID registry.
//!
//! Type GUIDs are fixed by the file geodatabase format. The registry is a
//! read-only table built once; anything not listed classifies as
//! [`Kind::Unknown`].

use ahash::AHashMap;
use once_cell::sync::Lazy;
use uuid::Uuid;

use crate::types::Kind;

pub const FEATURE_DATASET_TYPE: Uuid = Uuid::from_u128(0x74737149_DCB5_4257_8904_B9724E32A530);
pub const FEATURE_CLASS_TYPE: Uuid = Uuid::from_u128(0x70737809_852C_4A03_9E22_2CECEA5B9BFA);
pub const TABLE_TYPE: Uuid = Uuid::from_u128(0xCD06BC3B_789D_4C51_AAFA_A467912B8965);
pub const RASTER_DATASET_TYPE: Uuid = Uuid::from_u128(0x5ED667A3_9CA9_44A2_8029_D95BF23704B9);
pub const WORKSPACE_TYPE: Uuid = Uuid::from_u128(0xC673FE0F_7280_404F_8532_20755DD8FC06);
pub const FOLDER_TYPE: Uuid = Uuid::from_u128(0xF3783E6F_65CA_4514_8315_CE3985DAD3B1);
pub const RELATIONSHIP_CLASS_TYPE: Uuid = Uuid::from_u128(0xB606A7E1_FA5B_439C_849C_6E9C2481537B);
pub const CODED_VALUE_DOMAIN_TYPE: Uuid = Uuid::from_u128(0x8C368B12_A12E_4C7E_9638_C9C64E69E98F);
pub const RANGE_DOMAIN_TYPE: Uuid = Uuid::from_u128(0xC29DA988_8C3E_45F7_8B5C_18E51EE7BEB4);

/// One registered item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemType {
    pub id: Uuid,
    pub label: &'static str,
    pub kind: Kind,
}

const ITEM_TYPES: &[ItemType] = &[
    ItemType { id: FEATURE_DATASET_TYPE, label: "Feature Dataset", kind: Kind::FeatureDataset },
    ItemType { id: FEATURE_CLASS_TYPE, label: "Feature Class", kind: Kind::FeatureClass },
    ItemType { id: TABLE_TYPE, label: "Table", kind: Kind::Table },
    ItemType { id: RASTER_DATASET_TYPE, label: "Raster Dataset", kind: Kind::RasterDataset },
    ItemType { id: WORKSPACE_TYPE, label: "Workspace", kind: Kind::Unknown },
    ItemType { id: FOLDER_TYPE, label: "Folder", kind: Kind::Unknown },
    ItemType { id: RELATIONSHIP_CLASS_TYPE, label: "Relationship Class", kind: Kind::Unknown },
    ItemType { id: CODED_VALUE_DOMAIN_TYPE, label: "Coded Value Domain", kind: Kind::Unknown },
    ItemType { id: RANGE_DOMAIN_TYPE, label: "Range Domain", kind: Kind::Unknown },
];

static REGISTRY: Lazy<AHashMap<Uuid, &'static ItemType>> =
    Lazy::new(|| ITEM_TYPES.iter().map(|t| (t.id, t)).collect());

/// Look up a registered item type.
pub fn item_type(type_id: &Uuid) -> Option<&'static ItemType> {
    REGISTRY.get(type_id).copied()
}

/// Map a type GUID to its kind; unregistered GUIDs are `Unknown`.
pub fn classify(type_id: &Uuid) -> Kind {
    item_type(type_id).map_or(Kind::Unknown, |t| t.kind)
}

/// Human-readable label of a registered type GUID.
pub fn type_label(type_id: &Uuid) -> Option<&'static str> {
    item_type(type_id).map(|t| t.label)
}

/// Returns `true` for the item describing the geodatabase itself.
pub fn is_workspace(type_id: &Uuid) -> bool {
    *type_id == WORKSPACE_TYPE
}
