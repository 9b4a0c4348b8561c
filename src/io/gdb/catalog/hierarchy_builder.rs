//! Assembles classified items into an [`ItemTree`].
//!
//! Nesting is recovered from catalog paths only: the segment before an
//! item's own name names its containing feature dataset. Feature datasets
//! always sit under the root.

use ahash::{AHashMap, RandomState};
use indexmap::IndexMap;

use crate::notification::{Notification, NotificationType};
use crate::types::Kind;

use super::catalog_item::{ClassifiedItem, ItemFlags, ItemId};
use super::item_tree::{fold, Container, ContainerKey, ItemTree};

/// Split a catalog path on either separator, dropping empty segments.
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split(['/', '\\']).filter(|s| !s.is_empty()).collect()
}

/// Incremental tree builder; items are placed in the order they are added.
pub struct HierarchyBuilder {
    items: Vec<ClassifiedItem>,
    containers: IndexMap<ContainerKey, Container, RandomState>,
    names: IndexMap<String, Vec<ItemId>, RandomState>,
    /// Kind of the first root item carrying each folded name
    root_kinds: AHashMap<String, Kind>,
    notifications: Vec<Notification>,
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        let mut containers = IndexMap::default();
        containers.insert(
            None,
            Container {
                name: None,
                children: Vec::new(),
            },
        );
        Self {
            items: Vec::new(),
            containers,
            names: IndexMap::default(),
            root_kinds: AHashMap::new(),
            notifications: Vec::new(),
        }
    }

    /// Start a builder whose tree will also carry earlier diagnostics.
    pub fn with_notifications(notifications: Vec<Notification>) -> Self {
        let mut builder = Self::new();
        builder.notifications = notifications;
        builder
    }

    fn conflict(&mut self, subject: &str, message: String) {
        self.notifications.push(
            Notification::new(NotificationType::StructuralConflict, message).with_subject(subject),
        );
    }

    fn container_mut(&mut self, name: Option<&str>) -> &mut Container {
        self.containers
            .entry(name.map(fold))
            .or_insert_with(|| Container {
                name: name.map(str::to_string),
                children: Vec::new(),
            })
    }

    /// Place one item and return its id.
    pub fn add(&mut self, mut item: ClassifiedItem) -> ItemId {
        let name = item.name().to_string();
        let path = item.catalog_path().to_string();
        let segments = path_segments(&path);

        if let Some(last) = segments.last() {
            if !last.eq_ignore_ascii_case(&name) {
                self.conflict(
                    &name,
                    format!("catalog path '{}' does not end with the item name", path),
                );
            }
        }

        let mut parent = segments
            .len()
            .checked_sub(2)
            .map(|i| segments[i].to_string());

        if item.kind == Kind::FeatureDataset {
            if let Some(implied) = parent.take() {
                item.flags |= ItemFlags::ANOMALOUS;
                self.conflict(
                    &name,
                    format!(
                        "feature dataset nested under '{}' in path '{}'; kept at the root",
                        implied, path
                    ),
                );
            }
        } else if segments.len() > 2 {
            item.flags |= ItemFlags::ANOMALOUS;
            self.conflict(
                &name,
                format!(
                    "path '{}' nests {} levels deep; kept under '{}'",
                    path,
                    segments.len() - 1,
                    parent.as_deref().unwrap_or_default()
                ),
            );
        }

        let id = ItemId(self.items.len());
        let folded = fold(&name);

        let key = parent.as_deref().map(fold);
        let container_name = self.container_mut(parent.as_deref()).name.clone();
        let collides = self.containers[&key]
            .children
            .iter()
            .any(|other| fold(self.items[other.0].name()) == folded);
        if collides {
            item.flags |= ItemFlags::AMBIGUOUS;
            let place = container_name.as_deref().unwrap_or("the root");
            let message = format!("name already used in {}; keeping both", place);
            self.conflict(&name, message);
        }

        self.containers[&key].children.push(id);

        if container_name.is_none() {
            self.root_kinds.entry(folded.clone()).or_insert(item.kind);
        }
        if item.kind == Kind::FeatureDataset {
            // an empty dataset still gets a container
            self.container_mut(Some(&name));
        }

        item.parent = container_name;
        self.names.entry(folded).or_default().push(id);
        self.items.push(item);
        id
    }

    /// Check every dataset container and produce the tree.
    pub fn build(mut self) -> ItemTree {
        let mut orphans = Vec::new();
        for (key, container) in self.containers.iter() {
            let Some(folded) = key else { continue };
            let display = container.name.clone().unwrap_or_default();
            match self.root_kinds.get(folded) {
                Some(Kind::FeatureDataset) => {}
                Some(kind) => orphans.push((
                    display.clone(),
                    format!("container '{}' is named by a {}, not a feature dataset", display, kind),
                    container.children.clone(),
                )),
                None => orphans.push((
                    display.clone(),
                    format!("container '{}' has no feature dataset item", display),
                    container.children.clone(),
                )),
            }
        }

        for (display, message, children) in orphans {
            for id in children {
                self.items[id.0].flags |= ItemFlags::ANOMALOUS;
            }
            self.conflict(&display, message);
        }

        ItemTree::from_parts(self.items, self.containers, self.names, self.notifications)
    }
}
