//! The resolved catalog: an arena of items grouped into containers.
//!
//! Items live once in an arena and containers refer to them by
//! [`ItemId`]. The root container is keyed by `None`; every other
//! container is named after a feature dataset. Children keep the order
//! in which the items table listed them.

use std::ops::Index;

use ahash::RandomState;
use indexmap::IndexMap;

use crate::notification::{Notification, NotificationType};
use crate::types::Kind;

use super::catalog_item::{ClassifiedItem, ItemId};

/// Key of a container: `None` for the root, the folded dataset name otherwise.
pub(crate) type ContainerKey = Option<String>;

/// A named group of items.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Container {
    /// Display name, `None` for the root
    pub(crate) name: Option<String>,
    pub(crate) children: Vec<ItemId>,
}

/// Fold a name for case-insensitive comparison.
pub(crate) fn fold(name: &str) -> String {
    name.to_lowercase()
}

/// Catalog structure produced by one resolution pass.
#[derive(Debug, Clone)]
pub struct ItemTree {
    items: Vec<ClassifiedItem>,
    containers: IndexMap<ContainerKey, Container, RandomState>,
    names: IndexMap<String, Vec<ItemId>, RandomState>,
    notifications: Vec<Notification>,
}

impl ItemTree {
    pub(crate) fn from_parts(
        items: Vec<ClassifiedItem>,
        containers: IndexMap<ContainerKey, Container, RandomState>,
        names: IndexMap<String, Vec<ItemId>, RandomState>,
        notifications: Vec<Notification>,
    ) -> Self {
        Self {
            items,
            containers,
            names,
            notifications,
        }
    }

    /// Number of items in the tree
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: ItemId) -> Option<&ClassifiedItem> {
        self.items.get(id.0)
    }

    /// All items in scan order
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &ClassifiedItem)> {
        self.items.iter().enumerate().map(|(i, item)| (ItemId(i), item))
    }

    /// Direct children of the root container.
    pub fn root(&self) -> &[ItemId] {
        self.children(None).unwrap_or(&[])
    }

    /// Children of a container; `None` addresses the root.
    pub fn children(&self, container: Option<&str>) -> Option<&[ItemId]> {
        self.containers
            .get(&container.map(fold))
            .map(|c| c.children.as_slice())
    }

    /// Names of a container's children, in order.
    pub fn child_names(&self, container: Option<&str>) -> Vec<&str> {
        self.children(container)
            .unwrap_or(&[])
            .iter()
            .map(|id| self.items[id.0].name())
            .collect()
    }

    /// Every container with its children, root first.
    pub fn containers(&self) -> impl Iterator<Item = (Option<&str>, &[ItemId])> {
        self.containers
            .values()
            .map(|c| (c.name.as_deref(), c.children.as_slice()))
    }

    /// First item registered under `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&ClassifiedItem> {
        self.id_of(name).map(|id| &self.items[id.0])
    }

    pub fn id_of(&self, name: &str) -> Option<ItemId> {
        self.names.get(&fold(name)).and_then(|ids| ids.first().copied())
    }

    /// Every item registered under `name`, ambiguous duplicates included.
    pub fn get_all(&self, name: &str) -> Vec<&ClassifiedItem> {
        self.names
            .get(&fold(name))
            .map(|ids| ids.iter().map(|id| &self.items[id.0]).collect())
            .unwrap_or_default()
    }

    fn names_of_kind(&self, kind: Kind) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| item.kind == kind)
            .map(|item| item.name())
            .collect()
    }

    pub fn feature_dataset_names(&self) -> Vec<&str> {
        self.names_of_kind(Kind::FeatureDataset)
    }

    pub fn feature_class_names(&self) -> Vec<&str> {
        self.names_of_kind(Kind::FeatureClass)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.names_of_kind(Kind::Table)
    }

    pub fn raster_names(&self) -> Vec<&str> {
        self.names_of_kind(Kind::RasterDataset)
    }

    /// Feature classes per container, root keyed `None`.
    pub fn datasets(&self) -> IndexMap<Option<&str>, Vec<&str>, RandomState> {
        self.containers
            .values()
            .map(|c| {
                let classes = c
                    .children
                    .iter()
                    .map(|id| &self.items[id.0])
                    .filter(|item| item.kind == Kind::FeatureClass)
                    .map(|item| item.name())
                    .collect();
                (c.name.as_deref(), classes)
            })
            .collect()
    }

    /// Items grouped by the root element of their definition.
    pub fn by_definition_root(&self) -> IndexMap<&str, Vec<ItemId>, RandomState> {
        let mut groups: IndexMap<&str, Vec<ItemId>, RandomState> = IndexMap::default();
        for (id, item) in self.iter() {
            if let Some(root) = item.metadata.definition_root.as_deref() {
                groups.entry(root).or_default().push(id);
            }
        }
        groups
    }

    /// Recoverable conditions met while resolving the catalog.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn has_conflicts(&self) -> bool {
        self.notifications
            .iter()
            .any(|n| n.notification_type == NotificationType::StructuralConflict)
    }
}

impl Index<ItemId> for ItemTree {
    type Output = ClassifiedItem;

    fn index(&self, id: ItemId) -> &ClassifiedItem {
        &self.items[id.0]
    }
}
