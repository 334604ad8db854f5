use crate::config::RenderConfig;
use crate::graph::{DiagramGraph, DiagramNode, LabelPlacement, Point, Rect};
use crate::ir::NodeShape;
use crate::layout::point_along;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

pub fn render_svg(graph: &DiagramGraph, theme: &Theme, config: &RenderConfig) -> String {
    let pad = config.padding;
    let bounds = graph.bounds().unwrap_or(Rect {
        x: 0.0,
        y: 0.0,
        width: config.width,
        height: config.height,
    });
    // Room for labels hanging above and below nodes.
    let label_room = theme.font_size * 2.0;
    let offset = Point::new(pad - bounds.x, pad + label_room - bounds.y);
    let width = (bounds.width + pad * 2.0).max(200.0);
    let height = (bounds.height + (pad + label_room) * 2.0).max(200.0);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&config.background)
    ));
    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        escape_xml(&theme.edge_color)
    ));
    svg.push_str("</defs>");
    svg.push_str(&format!("<g transform=\"translate({:.2} {:.2})\">", offset.x, offset.y));

    for edge in &graph.edges {
        let points = if edge.points.is_empty() {
            fallback_route(graph, edge.source.0, edge.target.0)
        } else {
            edge.points.clone()
        };
        let Some(d) = points_to_path(&points) else {
            continue;
        };
        svg.push_str(&format!(
            "<path class=\"edge\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.4\" marker-end=\"url(#arrow)\"/>",
            d,
            escape_xml(&theme.edge_color)
        ));
    }

    for edge in &graph.edges {
        let Some(label) = &edge.label else {
            continue;
        };
        let points = if edge.points.is_empty() {
            fallback_route(graph, edge.source.0, edge.target.0)
        } else {
            edge.points.clone()
        };
        let Some(anchor) = point_along(&points, label.ratio) else {
            continue;
        };
        let w = label.size.width + 6.0;
        let h = label.size.height + 2.0;
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"3\" fill=\"{}\" opacity=\"0.85\"/>",
            anchor.x - w / 2.0,
            anchor.y - h / 2.0,
            w,
            h,
            escape_xml(&theme.edge_label_background)
        ));
        svg.push_str(&text_element(
            anchor,
            &label.text,
            &theme.font_family,
            label_font_size(label.size.height, theme.font_size),
            &theme.edge_label_color,
        ));
    }

    for node in &graph.nodes {
        svg.push_str(&node_shape(node, theme));
        for label in &node.labels {
            let c = node.layout.center();
            let (anchor, color) = match label.placement {
                LabelPlacement::Center => (c, &theme.node_text_color),
                LabelPlacement::Above => (
                    Point::new(c.x, node.layout.y - label.size.height / 2.0 - 2.0),
                    &theme.secondary_text_color,
                ),
                LabelPlacement::Below => (
                    Point::new(
                        c.x,
                        node.layout.y + node.layout.height + label.size.height / 2.0 + 2.0,
                    ),
                    &theme.secondary_text_color,
                ),
            };
            let size = match label.placement {
                LabelPlacement::Center => theme.font_size,
                _ => label_font_size(label.size.height, theme.font_size),
            };
            svg.push_str(&text_element(anchor, &label.text, &theme.font_family, size, color));
        }
    }

    svg.push_str("</g></svg>");
    svg
}

fn node_shape(node: &DiagramNode, theme: &Theme) -> String {
    let r = node.layout;
    let c = r.center();
    let style = format!(
        "fill=\"{}\" stroke=\"{}\" stroke-width=\"1.5\"",
        escape_xml(&theme.node_fill),
        escape_xml(&theme.node_stroke)
    );
    match node.shape {
        NodeShape::Rectangle => format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" {style}/>",
            r.x, r.y, r.width, r.height
        ),
        NodeShape::RoundRect => format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" {style}/>",
            r.x, r.y, r.width, r.height
        ),
        NodeShape::Ellipse => format!(
            "<ellipse cx=\"{:.2}\" cy=\"{:.2}\" rx=\"{:.2}\" ry=\"{:.2}\" {style}/>",
            c.x,
            c.y,
            r.width / 2.0,
            r.height / 2.0
        ),
        NodeShape::Diamond => polygon(
            &[
                Point::new(c.x, r.y),
                Point::new(r.x + r.width, c.y),
                Point::new(c.x, r.y + r.height),
                Point::new(r.x, c.y),
            ],
            &style,
        ),
        NodeShape::Hexagon => {
            let inset = r.width / 4.0;
            polygon(
                &[
                    Point::new(r.x + inset, r.y),
                    Point::new(r.x + r.width - inset, r.y),
                    Point::new(r.x + r.width, c.y),
                    Point::new(r.x + r.width - inset, r.y + r.height),
                    Point::new(r.x + inset, r.y + r.height),
                    Point::new(r.x, c.y),
                ],
                &style,
            )
        }
    }
}

fn polygon(points: &[Point], style: &str) -> String {
    let coords: Vec<String> = points.iter().map(|p| format!("{:.2},{:.2}", p.x, p.y)).collect();
    format!("<polygon points=\"{}\" {style}/>", coords.join(" "))
}

fn text_element(anchor: Point, text: &str, family: &str, size: f32, color: &str) -> String {
    format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        anchor.x,
        anchor.y,
        escape_xml(family),
        size,
        escape_xml(color),
        escape_xml(text)
    )
}

/// Font size a measured single-line label was laid out with.
fn label_font_size(measured_height: f32, fallback: f32) -> f32 {
    if measured_height > 0.0 {
        (measured_height / 1.2).round()
    } else {
        fallback
    }
}

fn fallback_route(graph: &DiagramGraph, source: usize, target: usize) -> Vec<Point> {
    match (graph.nodes.get(source), graph.nodes.get(target)) {
        (Some(s), Some(t)) => vec![s.layout.center(), t.layout.center()],
        _ => Vec::new(),
    }
}

fn points_to_path(points: &[Point]) -> Option<String> {
    let (first, rest) = points.split_first()?;
    let mut d = format!("M {:.2} {:.2}", first.x, first.y);
    match rest {
        [control, end] => d.push_str(&format!(
            " Q {:.2} {:.2} {:.2} {:.2}",
            control.x, control.y, end.x, end.y
        )),
        _ => {
            for p in rest {
                d.push_str(&format!(" L {:.2} {:.2}", p.x, p.y));
            }
        }
    }
    Some(d)
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::{AssembleOptions, assemble_graph};
    use crate::config::LayoutConfig;
    use crate::ir::{EdgeSourceItem, NodeSourceItem};
    use crate::layout::{LayoutExecutor, OrganicLayout};
    use crate::text_metrics::FontMetrics;

    fn sample_graph() -> DiagramGraph {
        let mut a = NodeSourceItem::new("a");
        a.label = Some("Alpha & Co".to_string());
        a.shape = Some("diamond".to_string());
        a.sub_label = Some("subsidiary".to_string());
        let mut b = NodeSourceItem::new("b");
        b.label = Some("Beta".to_string());
        let edges = vec![EdgeSourceItem {
            source_id: "a".to_string(),
            target_id: "b".to_string(),
            row: 0,
        }];
        let labels = vec![Some("owns".to_string())];
        let mut graph = DiagramGraph::new();
        assemble_graph(
            &mut graph,
            &[a, b],
            &edges,
            Some(&labels),
            &FontMetrics::new(true),
            &AssembleOptions::default(),
        )
        .unwrap();
        graph
    }

    #[test]
    fn render_svg_basic() {
        let mut graph = sample_graph();
        let layout = OrganicLayout::new(LayoutConfig {
            iterations: 10,
            ..Default::default()
        });
        layout.arrange(&mut graph).unwrap();
        let svg = render_svg(&graph, &Theme::light(), &RenderConfig::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Alpha &amp; Co"));
        assert!(svg.contains("Beta"));
        assert!(svg.contains("owns"));
        assert!(svg.contains("subsidiary"));
        assert!(svg.contains("<polygon"));
        assert!(svg.contains("<ellipse"));
        assert!(svg.contains(" Q "));
    }

    #[test]
    fn unrouted_edges_render_straight() {
        let graph = sample_graph();
        let svg = render_svg(&graph, &Theme::dark(), &RenderConfig::default());
        assert!(svg.contains("class=\"edge\""));
        assert!(svg.contains(" L "));
    }

    #[test]
    fn empty_graph_renders_blank_canvas() {
        let svg = render_svg(&DiagramGraph::new(), &Theme::light(), &RenderConfig::default());
        assert!(svg.contains("<svg"));
        assert!(!svg.contains("<text"));
    }

    #[test]
    fn configured_colours_are_escaped() {
        let mut theme = Theme::light();
        theme.node_fill = "red\" onload=\"x".to_string();
        theme.edge_color = "<blue>".to_string();
        theme.node_text_color = "a&b".to_string();
        let config = RenderConfig {
            background: "\"/><script/>".to_string(),
            ..Default::default()
        };
        let svg = render_svg(&sample_graph(), &theme, &config);
        assert!(svg.contains("fill=\"red&quot; onload=&quot;x\""));
        assert!(svg.contains("stroke=\"&lt;blue&gt;\""));
        assert!(svg.contains("fill=\"a&amp;b\""));
        assert!(svg.contains("fill=\"&quot;/&gt;&lt;script/&gt;\""));
        assert!(!svg.contains("<script"));
        assert!(!svg.contains("<blue>"));
    }

    #[test]
    fn quadratic_paths() {
        let d = points_to_path(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 0.0)]).unwrap();
        assert_eq!(d, "M 0.00 0.00 Q 1.00 1.00 2.00 0.00");
        assert!(points_to_path(&[]).is_none());
    }
}
