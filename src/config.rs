use crate::assemble::AssembleOptions;
use crate::edges::EdgeLabelAlignment;
use crate::graph::{Point, Size};
use crate::text_metrics::Font;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    pub debounce_ms: u64,
    pub label_margin: f32,
    pub default_node_width: f32,
    pub default_node_height: f32,
    pub edge_label_font_size: f32,
    pub edge_label_alignment: EdgeLabelAlignment,
    pub show_edge_labels: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1000,
            label_margin: 15.0,
            default_node_width: 50.0,
            default_node_height: 40.0,
            edge_label_font_size: 10.0,
            edge_label_alignment: EdgeLabelAlignment::Positional,
            show_edge_labels: true,
        }
    }
}

impl ProjectionConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub minimum_node_distance: f32,
    pub minimum_edge_distance: f32,
    pub iterations: usize,
    pub time_step: f32,
    pub separation_passes: usize,
    pub force_charge: f32,
    pub force_spring: f32,
    pub force_max: f32,
    pub node_speed: f32,
    pub damping_factor: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            minimum_node_distance: 150.0,
            minimum_edge_distance: 50.0,
            iterations: 300,
            time_step: 0.016,
            separation_passes: 50,
            force_charge: 150.0,
            force_spring: 0.05,
            force_max: 100.0,
            node_speed: 3000.0,
            damping_factor: 0.9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            padding: 24.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub projection: ProjectionConfig,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub fast_text_metrics: bool,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::light();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            projection: ProjectionConfig::default(),
            layout: LayoutConfig::default(),
            render,
            fast_text_metrics: false,
        }
    }
}

impl Config {
    /// Assembly settings: nodes start at the viewport centre.
    pub fn assemble_options(&self) -> AssembleOptions {
        AssembleOptions {
            origin: Point::new(self.render.width / 2.0, self.render.height / 2.0),
            default_node_size: Size::new(
                self.projection.default_node_width,
                self.projection.default_node_height,
            ),
            label_margin: self.projection.label_margin,
            label_font: Font::new(self.theme.font_family.clone(), self.theme.font_size),
            edge_label_font: Font::new(
                self.theme.font_family.clone(),
                self.projection.edge_label_font_size,
            ),
            edge_label_alignment: self.projection.edge_label_alignment,
            show_edge_labels: self.projection.show_edge_labels,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    projection: Option<ProjectionConfigFile>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
    fast_text_metrics: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    node_fill: Option<String>,
    node_stroke: Option<String>,
    node_text_color: Option<String>,
    secondary_text_color: Option<String>,
    edge_color: Option<String>,
    edge_label_color: Option<String>,
    edge_label_background: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionConfigFile {
    debounce_ms: Option<u64>,
    label_margin: Option<f32>,
    default_node_width: Option<f32>,
    default_node_height: Option<f32>,
    edge_label_font_size: Option<f32>,
    edge_label_alignment: Option<EdgeLabelAlignment>,
    show_edge_labels: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    minimum_node_distance: Option<f32>,
    minimum_edge_distance: Option<f32>,
    iterations: Option<usize>,
    time_step: Option<f32>,
    separation_passes: Option<usize>,
    force_charge: Option<f32>,
    force_spring: Option<f32>,
    force_max: Option<f32>,
    node_speed: Option<f32>,
    damping_factor: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    padding: Option<f32>,
    background: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Applies a JSON config document on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    let mut config = Config::default();

    if let Some(name) = parsed.theme.as_deref() {
        match Theme::from_name(name) {
            Some(theme) => {
                config.render.background = theme.background.clone();
                config.theme = theme;
            }
            None => tracing::warn!("unknown theme '{}', keeping default", name),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_stroke {
            config.theme.node_stroke = v;
        }
        if let Some(v) = vars.node_text_color {
            config.theme.node_text_color = v;
        }
        if let Some(v) = vars.secondary_text_color {
            config.theme.secondary_text_color = v;
        }
        if let Some(v) = vars.edge_color {
            config.theme.edge_color = v;
        }
        if let Some(v) = vars.edge_label_color {
            config.theme.edge_label_color = v;
        }
        if let Some(v) = vars.edge_label_background {
            config.theme.edge_label_background = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
    }

    if let Some(p) = parsed.projection {
        let target = &mut config.projection;
        if let Some(v) = p.debounce_ms {
            target.debounce_ms = v;
        }
        if let Some(v) = p.label_margin {
            target.label_margin = v;
        }
        if let Some(v) = p.default_node_width {
            target.default_node_width = v;
        }
        if let Some(v) = p.default_node_height {
            target.default_node_height = v;
        }
        if let Some(v) = p.edge_label_font_size {
            target.edge_label_font_size = v;
        }
        if let Some(v) = p.edge_label_alignment {
            target.edge_label_alignment = v;
        }
        if let Some(v) = p.show_edge_labels {
            target.show_edge_labels = v;
        }
    }

    if let Some(l) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = l.minimum_node_distance {
            target.minimum_node_distance = v;
        }
        if let Some(v) = l.minimum_edge_distance {
            target.minimum_edge_distance = v;
        }
        if let Some(v) = l.iterations {
            target.iterations = v;
        }
        if let Some(v) = l.time_step {
            target.time_step = v;
        }
        if let Some(v) = l.separation_passes {
            target.separation_passes = v;
        }
        if let Some(v) = l.force_charge {
            target.force_charge = v;
        }
        if let Some(v) = l.force_spring {
            target.force_spring = v;
        }
        if let Some(v) = l.force_max {
            target.force_max = v;
        }
        if let Some(v) = l.node_speed {
            target.node_speed = v;
        }
        if let Some(v) = l.damping_factor {
            target.damping_factor = v;
        }
    }

    if let Some(r) = parsed.render {
        if let Some(v) = r.width {
            config.render.width = v;
        }
        if let Some(v) = r.height {
            config.render.height = v;
        }
        if let Some(v) = r.padding {
            config.render.padding = v;
        }
        if let Some(v) = r.background {
            config.render.background = v;
        }
    }

    if let Some(v) = parsed.fast_text_metrics {
        config.fast_text_metrics = v;
    }

    Ok(config)
}
