use std::collections::HashMap;
use std::f32::consts::PI;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};

use crate::config::LayoutConfig;
use crate::error::ProjectionError;
use crate::graph::{DiagramGraph, Point, Rect, Size};

/// Rearranges an assembled graph in place.
pub trait LayoutExecutor<G> {
    fn arrange(&self, graph: &mut G) -> Result<(), ProjectionError>;
}

/// Force-directed placement followed by overlap removal and curved edge
/// routing.
#[derive(Debug, Clone, Default)]
pub struct OrganicLayout {
    pub config: LayoutConfig,
}

impl OrganicLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    fn simulate(&self, graph: &DiagramGraph) -> Vec<Point> {
        let config = &self.config;
        let count = graph.nodes.len();
        let Some(bounds) = graph.bounds() else {
            return Vec::new();
        };
        let center = bounds.center();

        let mut sim: ForceGraph<usize, ()> = ForceGraph::new(SimulationParameters {
            force_charge: config.force_charge,
            force_spring: config.force_spring,
            force_max: config.force_max,
            node_speed: config.node_speed,
            damping_factor: config.damping_factor,
        });

        // Spread the seeds on a circle; coincident starts have no repulsion direction.
        let radius = (count as f32 * config.minimum_node_distance / (2.0 * PI)).max(100.0);
        let mut handles = Vec::with_capacity(count);
        for idx in 0..count {
            let angle = idx as f32 * 2.0 * PI / count as f32;
            handles.push(sim.add_node(NodeData {
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin(),
                mass: 10.0,
                is_anchor: false,
                user_data: idx,
            }));
        }
        for edge in &graph.edges {
            if edge.source != edge.target {
                sim.add_edge(handles[edge.source.0], handles[edge.target.0], EdgeData::default());
            }
        }

        if count > 1 {
            for _ in 0..config.iterations {
                sim.update(config.time_step);
            }
        }

        let mut positions = vec![center; count];
        sim.visit_nodes(|node| {
            let idx = node.data.user_data;
            let (x, y) = (node.x(), node.y());
            if x.is_finite() && y.is_finite() {
                positions[idx] = Point::new(x, y);
            }
        });
        positions
    }
}

impl LayoutExecutor<DiagramGraph> for OrganicLayout {
    fn arrange(&self, graph: &mut DiagramGraph) -> Result<(), ProjectionError> {
        if graph.nodes.is_empty() {
            return Ok(());
        }
        let mut centers = self.simulate(graph);
        if centers.len() != graph.nodes.len() {
            return Err(ProjectionError::Layout(format!(
                "simulation returned {} positions for {} nodes",
                centers.len(),
                graph.nodes.len()
            )));
        }
        let extents: Vec<f32> = graph
            .nodes
            .iter()
            .map(|node| node.layout.width.max(node.layout.height) / 2.0)
            .collect();
        separate_nodes(
            &mut centers,
            &extents,
            self.config.minimum_node_distance,
            self.config.separation_passes,
        );

        for (node, center) in graph.nodes.iter_mut().zip(&centers) {
            let size = Size::new(node.layout.width, node.layout.height);
            node.layout = Rect::with_center(*center, size);
        }
        route_edges(graph, self.config.minimum_edge_distance);
        tracing::debug!(
            "organic layout placed {} nodes and routed {} edges",
            graph.nodes.len(),
            graph.edges.len()
        );
        Ok(())
    }
}

/// Pushes node pairs apart until their borders are at least `min_gap` apart.
fn separate_nodes(centers: &mut [Point], extents: &[f32], min_gap: f32, passes: usize) {
    let count = centers.len();
    for _ in 0..passes {
        let mut moved = false;
        for i in 0..count {
            for j in (i + 1)..count {
                let required = extents[i] + extents[j] + min_gap;
                let dx = centers[j].x - centers[i].x;
                let dy = centers[j].y - centers[i].y;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist >= required - 0.01 {
                    continue;
                }
                let (ux, uy) = if dist > f32::EPSILON {
                    (dx / dist, dy / dist)
                } else {
                    let angle = (i * count + j) as f32;
                    (angle.cos(), angle.sin())
                };
                let push = (required - dist) / 2.0;
                centers[i].x -= ux * push;
                centers[i].y -= uy * push;
                centers[j].x += ux * push;
                centers[j].y += uy * push;
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }
}

/// Routes every edge as a quadratic curve `[start, control, end]`; parallel
/// edges between the same pair fan out by `spacing`.
fn route_edges(graph: &mut DiagramGraph, spacing: f32) {
    let mut bundles: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
    for (idx, edge) in graph.edges.iter().enumerate() {
        let a = edge.source.0.min(edge.target.0);
        let b = edge.source.0.max(edge.target.0);
        bundles.entry((a, b)).or_default().push(idx);
    }

    for ((a, b), members) in bundles {
        let count = members.len();
        for (slot, edge_idx) in members.into_iter().enumerate() {
            let offset = (slot as f32 - (count as f32 - 1.0) / 2.0) * spacing;
            let edge = &graph.edges[edge_idx];
            let source = graph.nodes[edge.source.0].layout;
            let target = graph.nodes[edge.target.0].layout;
            let points = if a == b {
                self_loop(source, spacing + offset.abs())
            } else {
                // Normal from the canonical pair order, shared by both directions.
                let (lo, hi) = if edge.source.0 == a {
                    (source, target)
                } else {
                    (target, source)
                };
                let normal = unit_normal(lo.center(), hi.center());
                let mid = midpoint(source.center(), target.center());
                let control = Point::new(mid.x + normal.x * offset, mid.y + normal.y * offset);
                vec![
                    clip_to_border(source, control),
                    control,
                    clip_to_border(target, control),
                ]
            };
            graph.edges[edge_idx].points = points;
        }
    }
}

fn self_loop(node: Rect, height: f32) -> Vec<Point> {
    let c = node.center();
    let r = node.width.max(node.height) / 2.0;
    vec![
        Point::new(c.x - r * 0.5, c.y - r * 0.85),
        Point::new(c.x, c.y - r - height),
        Point::new(c.x + r * 0.5, c.y - r * 0.85),
    ]
}

fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

fn unit_normal(from: Point, to: Point) -> Point {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f32::EPSILON {
        return Point::new(0.0, -1.0);
    }
    Point::new(-dy / len, dx / len)
}

/// Point where the ray from the node centre towards `toward` leaves the
/// node's inscribed circle.
fn clip_to_border(node: Rect, toward: Point) -> Point {
    let c = node.center();
    let dx = toward.x - c.x;
    let dy = toward.y - c.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f32::EPSILON {
        return c;
    }
    let r = node.width.min(node.height) / 2.0;
    Point::new(c.x + dx / len * r, c.y + dy / len * r)
}

/// Position at `ratio` along a routed path; three points are read as a
/// quadratic curve, anything else as a polyline.
pub fn point_along(points: &[Point], ratio: f32) -> Option<Point> {
    let t = ratio.clamp(0.0, 1.0);
    match points {
        [] => None,
        [only] => Some(*only),
        [p0, p1, p2] => {
            let u = 1.0 - t;
            Some(Point::new(
                u * u * p0.x + 2.0 * u * t * p1.x + t * t * p2.x,
                u * u * p0.y + 2.0 * u * t * p1.y + t * t * p2.y,
            ))
        }
        _ => {
            let lengths: Vec<f32> = points
                .windows(2)
                .map(|w| ((w[1].x - w[0].x).powi(2) + (w[1].y - w[0].y).powi(2)).sqrt())
                .collect();
            let total: f32 = lengths.iter().sum();
            let mut remaining = total * t;
            for (segment, len) in points.windows(2).zip(&lengths) {
                if remaining <= *len && *len > 0.0 {
                    let f = remaining / len;
                    return Some(Point::new(
                        segment[0].x + (segment[1].x - segment[0].x) * f,
                        segment[0].y + (segment[1].y - segment[0].y) * f,
                    ));
                }
                remaining -= len;
            }
            points.last().copied()
        }
    }
}
