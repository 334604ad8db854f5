use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub node_fill: String,
    pub node_stroke: String,
    pub node_text_color: String,
    pub secondary_text_color: String,
    pub edge_color: String,
    pub edge_label_color: String,
    pub edge_label_background: String,
    pub background: String,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            font_family: "\"Segoe UI\", wf_segoe-ui_normal, helvetica, arial, sans-serif".to_string(),
            font_size: 12.0,
            node_fill: "#E8F1FB".to_string(),
            node_stroke: "#336699".to_string(),
            node_text_color: "#1C2430".to_string(),
            secondary_text_color: "#5A6678".to_string(),
            edge_color: "#7A8AA6".to_string(),
            edge_label_color: "#333333".to_string(),
            edge_label_background: "#FFFFFF".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            font_family: "\"Segoe UI\", wf_segoe-ui_normal, helvetica, arial, sans-serif".to_string(),
            font_size: 12.0,
            node_fill: "#243447".to_string(),
            node_stroke: "#8AB4F8".to_string(),
            node_text_color: "#F1F3F4".to_string(),
            secondary_text_color: "#AEB6C2".to_string(),
            edge_color: "#9AA0A6".to_string(),
            edge_label_color: "#E8EAED".to_string(),
            edge_label_background: "#202124".to_string(),
            background: "#202124".to_string(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "light" | "default" => Some(Self::light()),
            "dark" => Some(Self::dark()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}
