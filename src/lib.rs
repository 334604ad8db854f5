pub mod accessor;
pub mod assemble;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod data;
pub mod edges;
pub mod error;
pub mod gate;
pub mod graph;
pub mod graph_dump;
pub mod ir;
pub mod layout;
pub mod nodes;
pub mod render;
pub mod roles;
pub mod session;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, ProjectionConfig, RenderConfig, load_config, parse_config};
pub use data::DataView;
pub use error::ProjectionError;
pub use graph::{DiagramGraph, GraphModel};
pub use ir::{EdgeSourceItem, NodeSourceItem, Role, RoleMap};
pub use render::render_svg;
pub use session::{Projection, Session, UpdateOutcome, project};
pub use theme::Theme;

/// Projects, lays out and renders one data snapshot to SVG.
pub fn render_data_view(input: &str, config: Config) -> anyhow::Result<String> {
    let view = DataView::from_json(input)?;
    let mut session = Session::with_config(config);
    session.rebuild(&view)?;
    let config = session.config();
    Ok(render_svg(session.graph(), &config.theme, &config.render))
}
