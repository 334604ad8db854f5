use serde::Deserialize;
use tabular_graph::{Config, Theme, render_data_view};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
    show_edge_labels: Option<bool>,
}

fn build_config(options: GraphRenderOptions) -> Config {
    let mut config = Config::default();
    if let Some(theme) = options.theme.as_deref().and_then(Theme::from_name) {
        config.render.background = theme.background.clone();
        config.theme = theme;
    }
    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    if let Some(width) = options.width {
        config.render.width = width;
    }
    if let Some(height) = options.height {
        config.render.height = height;
    }
    if let Some(show) = options.show_edge_labels {
        config.projection.show_edge_labels = show;
    }
    // Browsers expose no system font database to wasm.
    config.fast_text_metrics = true;
    config
}

#[wasm_bindgen]
pub fn render_graph_svg(data_view_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<GraphRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        GraphRenderOptions::default()
    };

    render_data_view(data_view_json, build_config(options))
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

#[cfg(test)]
mod tests {
    use tabular_graph::render_data_view;

    use crate::{GraphRenderOptions, build_config};

    #[test]
    fn renders_hierarchy_with_edge_labels() {
        let data = r#"{
            "metadata": {"columns": [
                {"displayName": "Employee", "roles": {"NodeId": true, "NodeMainLabel": true}},
                {"displayName": "Manager", "roles": {"TargetId": true}},
                {"displayName": "Relation", "roles": {"EdgeLabel": true}}
            ]},
            "categorical": {"categories": [
                {"source": {"displayName": "Employee"}, "values": ["Ada", "Bob", "Cy"]},
                {"source": {"displayName": "Manager"}, "values": [null, "Ada", "Ada"]},
                {"source": {"displayName": "Relation"}, "values": [null, "reports to", "reports to"]}
            ]}
        }"#;

        let svg = render_data_view(data, build_config(GraphRenderOptions::default()))
            .expect("hierarchy should render");

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Ada"));
        assert!(svg.contains("reports to"));
    }
}
