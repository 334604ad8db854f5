//! Live graph model the assembler writes into.
//!
//! [`GraphModel`] is the contract the projection needs from a diagramming
//! surface. [`DiagramGraph`] is the in-crate implementation that the layout
//! and SVG renderer work on.

use serde::Serialize;

use crate::error::ProjectionError;
use crate::ir::{NodeShape, NodeSourceItem};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned box; `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(origin: Point, size: Size) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn with_center(center: Point, size: Size) -> Self {
        Self {
            x: center.x - size.width / 2.0,
            y: center.y - size.height / 2.0,
            width: size.width,
            height: size.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LabelPlacement {
    Center,
    Above,
    Below,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeLabel {
    pub text: String,
    pub placement: LabelPlacement,
    pub size: Size,
}

/// Label riding on an edge; `ratio` is the fraction of the path from the
/// source end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeLabel {
    pub text: String,
    pub ratio: f32,
    pub size: Size,
}

/// Operations the assembler performs on a diagram surface.
pub trait GraphModel {
    type NodeHandle: Copy;
    type EdgeHandle: Copy;

    fn clear(&mut self);
    fn node_count(&self) -> usize;
    fn edge_count(&self) -> usize;

    fn create_node(
        &mut self,
        layout: Rect,
        tag: NodeSourceItem,
    ) -> Result<Self::NodeHandle, ProjectionError>;
    fn node_layout(&self, node: Self::NodeHandle) -> Option<Rect>;
    fn set_node_layout(&mut self, node: Self::NodeHandle, layout: Rect) -> Result<(), ProjectionError>;
    fn add_node_label(&mut self, node: Self::NodeHandle, label: NodeLabel) -> Result<(), ProjectionError>;

    fn create_edge(
        &mut self,
        source: Self::NodeHandle,
        target: Self::NodeHandle,
    ) -> Result<Self::EdgeHandle, ProjectionError>;
    fn set_edge_tag(&mut self, edge: Self::EdgeHandle, tag: String) -> Result<(), ProjectionError>;
    fn add_edge_label(&mut self, edge: Self::EdgeHandle, label: EdgeLabel) -> Result<(), ProjectionError>;

    fn is_empty(&self) -> bool {
        self.node_count() == 0 && self.edge_count() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeIndex(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EdgeIndex(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramNode {
    pub tag: NodeSourceItem,
    pub shape: NodeShape,
    pub layout: Rect,
    pub labels: Vec<NodeLabel>,
}

impl DiagramNode {
    pub fn label(&self, placement: LabelPlacement) -> Option<&NodeLabel> {
        self.labels.iter().find(|label| label.placement == placement)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramEdge {
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub tag: Option<String>,
    pub label: Option<EdgeLabel>,
    /// Routed path, empty until a layout has run.
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiagramGraph {
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
}

impl DiagramGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, index: NodeIndex) -> Option<&DiagramNode> {
        self.nodes.get(index.0)
    }

    pub fn find_node(&self, id: &str) -> Option<&DiagramNode> {
        self.nodes.iter().find(|node| node.tag.id == id)
    }

    /// Bounding box of every node and routed edge point.
    pub fn bounds(&self) -> Option<Rect> {
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for node in &self.nodes {
            min_x = min_x.min(node.layout.x);
            min_y = min_y.min(node.layout.y);
            max_x = max_x.max(node.layout.x + node.layout.width);
            max_y = max_y.max(node.layout.y + node.layout.height);
        }
        for point in self.edges.iter().flat_map(|edge| edge.points.iter()) {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        if !min_x.is_finite() {
            return None;
        }
        Some(Rect {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }

    fn node_mut(&mut self, index: NodeIndex) -> Result<&mut DiagramNode, ProjectionError> {
        self.nodes
            .get_mut(index.0)
            .ok_or_else(|| ProjectionError::Model(format!("no node at index {}", index.0)))
    }

    fn edge_mut(&mut self, index: EdgeIndex) -> Result<&mut DiagramEdge, ProjectionError> {
        self.edges
            .get_mut(index.0)
            .ok_or_else(|| ProjectionError::Model(format!("no edge at index {}", index.0)))
    }
}

impl GraphModel for DiagramGraph {
    type NodeHandle = NodeIndex;
    type EdgeHandle = EdgeIndex;

    fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn create_node(&mut self, layout: Rect, tag: NodeSourceItem) -> Result<NodeIndex, ProjectionError> {
        let shape = tag
            .shape
            .as_deref()
            .and_then(NodeShape::from_token)
            .unwrap_or_default();
        self.nodes.push(DiagramNode {
            tag,
            shape,
            layout,
            labels: Vec::new(),
        });
        Ok(NodeIndex(self.nodes.len() - 1))
    }

    fn node_layout(&self, node: NodeIndex) -> Option<Rect> {
        self.node(node).map(|n| n.layout)
    }

    fn set_node_layout(&mut self, node: NodeIndex, layout: Rect) -> Result<(), ProjectionError> {
        self.node_mut(node)?.layout = layout;
        Ok(())
    }

    fn add_node_label(&mut self, node: NodeIndex, label: NodeLabel) -> Result<(), ProjectionError> {
        self.node_mut(node)?.labels.push(label);
        Ok(())
    }

    fn create_edge(&mut self, source: NodeIndex, target: NodeIndex) -> Result<EdgeIndex, ProjectionError> {
        if source.0 >= self.nodes.len() || target.0 >= self.nodes.len() {
            return Err(ProjectionError::Model(format!(
                "edge endpoints {} -> {} out of range",
                source.0, target.0
            )));
        }
        self.edges.push(DiagramEdge {
            source,
            target,
            tag: None,
            label: None,
            points: Vec::new(),
        });
        Ok(EdgeIndex(self.edges.len() - 1))
    }

    fn set_edge_tag(&mut self, edge: EdgeIndex, tag: String) -> Result<(), ProjectionError> {
        self.edge_mut(edge)?.tag = Some(tag);
        Ok(())
    }

    fn add_edge_label(&mut self, edge: EdgeIndex, label: EdgeLabel) -> Result<(), ProjectionError> {
        self.edge_mut(edge)?.label = Some(label);
        Ok(())
    }
}
