use crate::graph::{DiagramGraph, LabelPlacement};
use crate::session::Projection;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct GraphDump {
    pub roles: Vec<RoleDump>,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct RoleDump {
    pub role: String,
    pub field: String,
    pub is_measure: bool,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub row: Option<usize>,
    pub shape: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label: String,
    pub top_label: Option<String>,
    pub sub_label: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub tag: Option<String>,
    pub label: Option<String>,
    pub points: Vec<[f32; 2]>,
}

impl GraphDump {
    pub fn from_graph(graph: &DiagramGraph, projection: Option<&Projection>) -> Self {
        let roles = projection
            .map(|p| {
                p.roles
                    .iter()
                    .map(|(role, binding)| RoleDump {
                        role: role.to_string(),
                        field: binding.field_name.clone(),
                        is_measure: binding.is_measure,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let label_text = |node: &crate::graph::DiagramNode, placement| {
            node.label(placement).map(|label| label.text.clone())
        };
        let nodes = graph
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.tag.id.clone(),
                row: node.tag.identity.as_ref().map(|identity| identity.row),
                shape: format!("{:?}", node.shape),
                x: node.layout.x,
                y: node.layout.y,
                width: node.layout.width,
                height: node.layout.height,
                label: label_text(node, LabelPlacement::Center).unwrap_or_default(),
                top_label: label_text(node, LabelPlacement::Above),
                sub_label: label_text(node, LabelPlacement::Below),
            })
            .collect();

        let edges = graph
            .edges
            .iter()
            .map(|edge| EdgeDump {
                from: graph.nodes[edge.source.0].tag.id.clone(),
                to: graph.nodes[edge.target.0].tag.id.clone(),
                tag: edge.tag.clone(),
                label: edge.label.as_ref().map(|label| label.text.clone()),
                points: edge.points.iter().map(|p| [p.x, p.y]).collect(),
            })
            .collect();

        GraphDump { roles, nodes, edges }
    }
}

pub fn write_graph_dump<W: Write>(
    writer: W,
    graph: &DiagramGraph,
    projection: Option<&Projection>,
) -> anyhow::Result<()> {
    let dump = GraphDump::from_graph(graph, projection);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphModel, NodeLabel, Rect, Size};
    use crate::ir::NodeSourceItem;

    #[test]
    fn dump_lists_nodes_and_edges_by_id() {
        let mut graph = DiagramGraph::new();
        let a = graph.create_node(Rect::default(), NodeSourceItem::new("a")).unwrap();
        let b = graph.create_node(Rect::default(), NodeSourceItem::new("b")).unwrap();
        graph
            .add_node_label(
                a,
                NodeLabel {
                    text: "Alpha".to_string(),
                    placement: LabelPlacement::Center,
                    size: Size::default(),
                },
            )
            .unwrap();
        let edge = graph.create_edge(a, b).unwrap();
        graph.set_edge_tag(edge, "t".to_string()).unwrap();

        let dump = GraphDump::from_graph(&graph, None);
        assert!(dump.roles.is_empty());
        assert_eq!(dump.nodes[0].label, "Alpha");
        assert_eq!(dump.nodes[1].label, "");
        assert_eq!(dump.edges[0].from, "a");
        assert_eq!(dump.edges[0].to, "b");
        assert_eq!(dump.edges[0].tag.as_deref(), Some("t"));

        let mut out = Vec::new();
        write_graph_dump(&mut out, &graph, None).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["nodes"].as_array().unwrap().len(), 2);
    }
}
