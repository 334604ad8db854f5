use std::collections::HashMap;

use crate::edges::EdgeLabelAlignment;
use crate::error::ProjectionError;
use crate::graph::{EdgeLabel, GraphModel, LabelPlacement, NodeLabel, Point, Rect, Size};
use crate::ir::{EdgeSourceItem, NodeSourceItem};
use crate::text_metrics::{Font, TextMeasurer};

#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Where freshly created nodes are placed before layout.
    pub origin: Point,
    pub default_node_size: Size,
    /// Added to the measured label extent when sizing a node.
    pub label_margin: f32,
    pub label_font: Font,
    pub edge_label_font: Font,
    pub edge_label_alignment: EdgeLabelAlignment,
    /// Master switch; labels also need a non-empty edge-label column.
    pub show_edge_labels: bool,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            origin: Point::default(),
            default_node_size: Size::new(50.0, 40.0),
            label_margin: 15.0,
            label_font: Font::new("sans-serif", 12.0),
            edge_label_font: Font::new("sans-serif", 10.0),
            edge_label_alignment: EdgeLabelAlignment::Positional,
            show_edge_labels: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblySummary {
    pub nodes: usize,
    pub edges: usize,
    pub dropped_edges: usize,
}

/// Writes projected nodes and edges into `graph`, which the caller has cleared.
///
/// Each node is a square sized to contain its main label. Edges whose
/// endpoints are not among the nodes are dropped without error.
pub fn assemble_graph<G: GraphModel>(
    graph: &mut G,
    nodes: &[NodeSourceItem],
    edges: &[EdgeSourceItem],
    edge_labels: Option<&[Option<String>]>,
    measurer: &dyn TextMeasurer,
    options: &AssembleOptions,
) -> Result<AssemblySummary, ProjectionError> {
    let mut summary = AssemblySummary::default();
    if nodes.is_empty() {
        return Ok(summary);
    }

    let mut lookup: HashMap<&str, G::NodeHandle> = HashMap::with_capacity(nodes.len());
    for item in nodes {
        let handle = place_node(graph, item, measurer, options)?;
        lookup.insert(item.id.as_str(), handle);
        summary.nodes += 1;
    }

    if edges.is_empty() {
        return Ok(summary);
    }

    let labels = edge_labels.unwrap_or(&[]);
    let labels_visible = options.show_edge_labels && !labels.is_empty();
    for (position, item) in edges.iter().enumerate() {
        let (Some(&source), Some(&target)) = (
            lookup.get(item.source_id.as_str()),
            lookup.get(item.target_id.as_str()),
        ) else {
            tracing::trace!("dropping dangling edge {} -> {}", item.source_id, item.target_id);
            summary.dropped_edges += 1;
            continue;
        };

        let edge = graph.create_edge(source, target)?;
        summary.edges += 1;

        let Some(text) = options.edge_label_alignment.label_for(labels, position, item) else {
            continue;
        };
        graph.set_edge_tag(edge, text.to_string())?;
        if labels_visible {
            let size = measurer.measure(text, &options.edge_label_font);
            graph.add_edge_label(
                edge,
                EdgeLabel {
                    text: text.to_string(),
                    ratio: 0.5,
                    size,
                },
            )?;
        }
    }

    tracing::debug!(
        "assembled {} nodes, {} edges ({} dangling)",
        summary.nodes,
        summary.edges,
        summary.dropped_edges
    );
    Ok(summary)
}

fn place_node<G: GraphModel>(
    graph: &mut G,
    item: &NodeSourceItem,
    measurer: &dyn TextMeasurer,
    options: &AssembleOptions,
) -> Result<G::NodeHandle, ProjectionError> {
    let main_label = item.main_label().to_string();
    let node = graph.create_node(
        Rect::new(options.origin, options.default_node_size),
        item.clone(),
    )?;

    let measured = measurer.measure(&main_label, &options.label_font);
    let side = (measured.width + options.label_margin).max(measured.height + options.label_margin);
    let origin = graph
        .node_layout(node)
        .map(|layout| layout.origin())
        .unwrap_or(options.origin);
    graph.set_node_layout(node, Rect::new(origin, Size::new(side, side)))?;

    graph.add_node_label(
        node,
        NodeLabel {
            text: main_label,
            placement: LabelPlacement::Center,
            size: measured,
        },
    )?;
    for (text, placement) in [
        (&item.top_label, LabelPlacement::Above),
        (&item.sub_label, LabelPlacement::Below),
    ] {
        if let Some(text) = text.as_deref().filter(|t| !t.is_empty()) {
            let size = measurer.measure(text, &options.edge_label_font);
            graph.add_node_label(
                node,
                NodeLabel {
                    text: text.to_string(),
                    placement,
                    size,
                },
            )?;
        }
    }
    Ok(node)
}
