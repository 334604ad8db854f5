use serde::{Deserialize, Serialize};

use crate::ir::EdgeSourceItem;

/// How an edge finds its label in the per-row edge-label column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeLabelAlignment {
    /// The n-th emitted edge takes the n-th label. Rows skipped during edge
    /// projection shift every later label onto the wrong edge.
    #[default]
    Positional,
    /// Each edge takes the label of the row it was read from.
    ByRow,
}

impl EdgeLabelAlignment {
    pub fn label_for<'a>(
        self,
        labels: &'a [Option<String>],
        position: usize,
        edge: &EdgeSourceItem,
    ) -> Option<&'a str> {
        let index = match self {
            Self::Positional => position,
            Self::ByRow => edge.row,
        };
        labels.get(index).and_then(|label| label.as_deref())
    }
}

/// Pairs each row's id with its target id.
///
/// A missing target column means no relationships at all. Rows whose target
/// (or id) cell is empty declare no edge and are skipped.
pub fn project_edges(
    source_ids: Option<&[Option<String>]>,
    target_ids: Option<&[Option<String>]>,
) -> Vec<EdgeSourceItem> {
    let Some(targets) = target_ids.filter(|t| !t.is_empty()) else {
        return Vec::new();
    };
    let Some(sources) = source_ids else {
        return Vec::new();
    };

    let edges: Vec<EdgeSourceItem> = sources
        .iter()
        .enumerate()
        .filter_map(|(row, source)| {
            let target = targets.get(row)?.as_ref()?;
            let source = source.as_ref()?;
            Some(EdgeSourceItem {
                source_id: source.clone(),
                target_id: target.clone(),
                row,
            })
        })
        .collect();
    tracing::debug!("projected {} edges from {} rows", edges.len(), sources.len());
    edges
}
