use serde::{Deserialize, Serialize};

/// Semantic slot a tabular column can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    NodeId,
    TargetId,
    NodeMainLabel,
    NodeSecondLabel,
    NodeShape,
    EdgeLabel,
    NodeTopLabel,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::NodeId,
        Role::TargetId,
        Role::NodeMainLabel,
        Role::NodeSecondLabel,
        Role::NodeShape,
        Role::EdgeLabel,
        Role::NodeTopLabel,
    ];

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "NodeId" => Some(Self::NodeId),
            "TargetId" => Some(Self::TargetId),
            "NodeMainLabel" => Some(Self::NodeMainLabel),
            "NodeSecondLabel" => Some(Self::NodeSecondLabel),
            "NodeShape" => Some(Self::NodeShape),
            "EdgeLabel" => Some(Self::EdgeLabel),
            "NodeTopLabel" => Some(Self::NodeTopLabel),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NodeId => "NodeId",
            Self::TargetId => "TargetId",
            Self::NodeMainLabel => "NodeMainLabel",
            Self::NodeSecondLabel => "NodeSecondLabel",
            Self::NodeShape => "NodeShape",
            Self::EdgeLabel => "EdgeLabel",
            Self::NodeTopLabel => "NodeTopLabel",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which column fills a role, and whether it comes from the aggregate series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldBinding {
    pub field_name: String,
    pub is_measure: bool,
}

/// Role name to column binding, one slot per [`Role`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleMap {
    slots: [Option<FieldBinding>; Role::ALL.len()],
}

impl RoleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `role`, replacing any earlier binding.
    pub fn bind(&mut self, role: Role, binding: FieldBinding) {
        self.slots[role.slot()] = Some(binding);
    }

    pub fn get(&self, role: Role) -> Option<&FieldBinding> {
        self.slots[role.slot()].as_ref()
    }

    pub fn is_bound(&self, role: Role) -> bool {
        self.get(role).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &FieldBinding)> {
        Role::ALL
            .iter()
            .filter_map(|role| self.get(*role).map(|binding| (*role, binding)))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// Opaque handle tying a projected node back to the row that defined it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SelectionId {
    pub category: String,
    pub row: usize,
}

/// One unique entity, taken from the first row its id appears in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSourceItem {
    pub id: String,
    pub label: Option<String>,
    pub shape: Option<String>,
    pub sub_label: Option<String>,
    pub top_label: Option<String>,
    pub identity: Option<SelectionId>,
    pub layer_index: Option<u32>,
}

impl NodeSourceItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            shape: None,
            sub_label: None,
            top_label: None,
            identity: None,
            layer_index: None,
        }
    }

    pub fn main_label(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}

/// A relationship declared by one row: its id points at its target id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeSourceItem {
    pub source_id: String,
    pub target_id: String,
    /// Row of the snapshot the pair was read from.
    pub row: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeShape {
    Rectangle,
    RoundRect,
    #[default]
    Ellipse,
    Diamond,
    Hexagon,
}

impl NodeShape {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "rect" | "rectangle" | "box" => Some(Self::Rectangle),
            "roundrect" | "round" | "rounded" => Some(Self::RoundRect),
            "ellipse" | "circle" | "oval" => Some(Self::Ellipse),
            "diamond" | "rhombus" => Some(Self::Diamond),
            "hexagon" => Some(Self::Hexagon),
            _ => None,
        }
    }
}
