use std::collections::HashSet;

use crate::ir::{NodeSourceItem, SelectionId};

/// Produces the selection handle for a row of the snapshot.
pub trait IdentityBuilder {
    fn identity(&self, row: usize) -> SelectionId;
}

/// Identities keyed on a category column and a row index.
#[derive(Debug, Clone, Default)]
pub struct RowIdentityBuilder {
    pub category: String,
}

impl RowIdentityBuilder {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
        }
    }
}

impl IdentityBuilder for RowIdentityBuilder {
    fn identity(&self, row: usize) -> SelectionId {
        SelectionId {
            category: self.category.clone(),
            row,
        }
    }
}

/// Optional per-row node attributes, each index-aligned with the id column.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeAttributes<'a> {
    pub labels: Option<&'a [Option<String>]>,
    pub shapes: Option<&'a [Option<String>]>,
    pub sub_labels: Option<&'a [Option<String>]>,
    pub top_labels: Option<&'a [Option<String>]>,
}

/// Collapses repeated ids into one node each.
///
/// Nodes come out in first-occurrence order. Every attribute is read from the
/// first row carrying the id; later rows with the same id are not consulted.
/// A bound label column always yields a label, empty when the cell is missing.
pub fn project_nodes(
    ids: Option<&[Option<String>]>,
    attributes: NodeAttributes<'_>,
    identities: &dyn IdentityBuilder,
) -> Vec<NodeSourceItem> {
    let Some(ids) = ids else {
        return Vec::new();
    };

    let mut seen: HashSet<&str> = HashSet::new();
    let mut nodes = Vec::new();
    for (row, id) in ids.iter().enumerate() {
        let Some(id) = id.as_deref() else {
            continue;
        };
        if !seen.insert(id) {
            continue;
        }

        let mut item = NodeSourceItem::new(id);
        item.identity = Some(identities.identity(row));
        if let Some(labels) = attributes.labels {
            item.label = Some(cell_at(labels, row).unwrap_or_default());
        }
        item.shape = attributes.shapes.and_then(|shapes| cell_at(shapes, row));
        item.sub_label = attributes.sub_labels.and_then(|values| cell_at(values, row));
        item.top_label = attributes.top_labels.and_then(|values| cell_at(values, row));
        nodes.push(item);
    }
    tracing::debug!("projected {} unique nodes from {} rows", nodes.len(), ids.len());
    nodes
}

fn cell_at(values: &[Option<String>], row: usize) -> Option<String> {
    values.get(row).cloned().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    fn ids(nodes: &[NodeSourceItem]) -> Vec<&str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn dedups_in_first_occurrence_order() {
        let id_col = col(&[Some("b"), Some("a"), Some("b"), Some("c"), Some("a")]);
        let nodes = project_nodes(
            Some(&id_col),
            NodeAttributes::default(),
            &RowIdentityBuilder::new("Id"),
        );
        assert_eq!(ids(&nodes), vec!["b", "a", "c"]);
        let rows: Vec<usize> = nodes
            .iter()
            .map(|n| n.identity.as_ref().unwrap().row)
            .collect();
        assert_eq!(rows, vec![0, 1, 3]);
        assert!(nodes.iter().all(|n| n.label.is_none() && n.shape.is_none()));
    }

    #[test]
    fn attributes_come_from_first_row_of_each_id() {
        let id_col = col(&[Some("x"), Some("y"), Some("x")]);
        let labels = col(&[Some("X first"), Some("Y"), Some("X second")]);
        let shapes = col(&[Some("diamond"), None, Some("circle")]);
        let subs = col(&[None, Some("sub y"), Some("sub x")]);
        let tops = col(&[Some("top x"), None, None]);
        let nodes = project_nodes(
            Some(&id_col),
            NodeAttributes {
                labels: Some(&labels),
                shapes: Some(&shapes),
                sub_labels: Some(&subs),
                top_labels: Some(&tops),
            },
            &RowIdentityBuilder::new("Id"),
        );
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].label.as_deref(), Some("X first"));
        assert_eq!(nodes[0].shape.as_deref(), Some("diamond"));
        assert_eq!(nodes[0].sub_label, None);
        assert_eq!(nodes[0].top_label.as_deref(), Some("top x"));
        assert_eq!(nodes[1].label.as_deref(), Some("Y"));
        assert_eq!(nodes[1].shape, None);
        assert_eq!(nodes[1].sub_label.as_deref(), Some("sub y"));
    }

    #[test]
    fn bound_label_with_missing_cell_is_empty_text() {
        let id_col = col(&[Some("x"), Some("y")]);
        let labels = col(&[None]);
        let nodes = project_nodes(
            Some(&id_col),
            NodeAttributes {
                labels: Some(&labels),
                ..Default::default()
            },
            &RowIdentityBuilder::new("Id"),
        );
        assert_eq!(nodes[0].label.as_deref(), Some(""));
        assert_eq!(nodes[1].label.as_deref(), Some(""));
    }

    #[test]
    fn null_ids_and_absent_role_produce_nothing() {
        let id_col = col(&[None, Some("a"), None]);
        let nodes = project_nodes(
            Some(&id_col),
            NodeAttributes::default(),
            &RowIdentityBuilder::new("Id"),
        );
        assert_eq!(ids(&nodes), vec!["a"]);
        assert_eq!(nodes[0].identity.as_ref().unwrap().row, 1);

        let none = project_nodes(None, NodeAttributes::default(), &RowIdentityBuilder::new("Id"));
        assert!(none.is_empty());
        let empty = project_nodes(Some(&[]), NodeAttributes::default(), &RowIdentityBuilder::new("Id"));
        assert!(empty.is_empty());
    }
}
