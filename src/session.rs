use std::time::Instant;

use crate::accessor::{ColumnAccessor, RoleValues};
use crate::assemble::{AssemblySummary, assemble_graph};
use crate::config::Config;
use crate::data::DataView;
use crate::edges::project_edges;
use crate::error::ProjectionError;
use crate::gate::UpdateGate;
use crate::graph::{DiagramGraph, GraphModel};
use crate::ir::{EdgeSourceItem, NodeSourceItem, Role, RoleMap};
use crate::layout::{LayoutExecutor, OrganicLayout};
use crate::nodes::{NodeAttributes, RowIdentityBuilder, project_nodes};
use crate::roles::resolve_roles;
use crate::text_metrics::{FontMetrics, TextMeasurer};

/// Everything one projection cycle derives from a snapshot.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub roles: RoleMap,
    pub nodes: Vec<NodeSourceItem>,
    pub edges: Vec<EdgeSourceItem>,
    pub edge_labels: Option<RoleValues>,
}

/// Resolves roles and projects nodes and edges out of `view`.
pub fn project(view: &DataView) -> Result<Projection, ProjectionError> {
    let roles = resolve_roles(&view.metadata.columns);
    let accessor = ColumnAccessor::new(view, &roles);

    let ids = accessor.role_values(Role::NodeId)?;
    let labels = accessor.role_values(Role::NodeMainLabel)?;
    let shapes = accessor.role_values(Role::NodeShape)?;
    let sub_labels = accessor.role_values(Role::NodeSecondLabel)?;
    let top_labels = accessor.role_values(Role::NodeTopLabel)?;
    let targets = accessor.role_values(Role::TargetId)?;
    let edge_labels = accessor.role_values(Role::EdgeLabel)?;

    let identities = RowIdentityBuilder::new(
        view.categories()
            .first()
            .map(|c| c.source.display_name.clone())
            .unwrap_or_default(),
    );
    let nodes = project_nodes(
        ids.as_deref(),
        NodeAttributes {
            labels: labels.as_deref(),
            shapes: shapes.as_deref(),
            sub_labels: sub_labels.as_deref(),
            top_labels: top_labels.as_deref(),
        },
        &identities,
    );
    let edges = project_edges(ids.as_deref(), targets.as_deref());
    tracing::debug!(
        "snapshot of {} rows projected to {} nodes and {} edges",
        view.row_count(),
        nodes.len(),
        edges.len()
    );

    Ok(Projection {
        roles,
        nodes,
        edges,
        edge_labels,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Suppressed by the update gate.
    Debounced,
    /// No category array to project; the graph is untouched.
    NoData,
    Rebuilt(AssemblySummary),
    /// The cycle failed and the previous graph was restored.
    Failed(ProjectionError),
}

/// One visual instance: owns the live graph, the update gate and settings.
///
/// Every admitted update rebuilds the graph from scratch. A failing cycle
/// leaves whatever was rendered before in place.
pub struct Session<G = DiagramGraph, L = OrganicLayout> {
    graph: G,
    layout: L,
    gate: UpdateGate,
    config: Config,
    measurer: Box<dyn TextMeasurer>,
    projection: Option<Projection>,
}

impl Session {
    pub fn with_config(config: Config) -> Self {
        let layout = OrganicLayout::new(config.layout.clone());
        Self::new(DiagramGraph::new(), layout, config)
    }
}

impl<G, L> Session<G, L>
where
    G: GraphModel + Clone,
    L: LayoutExecutor<G>,
{
    pub fn new(graph: G, layout: L, config: Config) -> Self {
        Self {
            graph,
            layout,
            gate: UpdateGate::new(config.projection.debounce()),
            measurer: Box::new(FontMetrics::new(config.fast_text_metrics)),
            config,
            projection: None,
        }
    }

    pub fn with_measurer(mut self, measurer: Box<dyn TextMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Projection behind the current graph.
    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    /// Host update notification entry point.
    pub fn update(&mut self, view: Option<&DataView>, now: Instant) -> UpdateOutcome {
        if !self.gate.admit(now) {
            tracing::debug!("update debounced");
            return UpdateOutcome::Debounced;
        }
        let Some(view) = view.filter(|v| v.has_categories()) else {
            return UpdateOutcome::NoData;
        };
        match self.rebuild(view) {
            Ok(summary) => UpdateOutcome::Rebuilt(summary),
            Err(err) => {
                tracing::warn!("update discarded, keeping previous graph: {}", err);
                UpdateOutcome::Failed(err)
            }
        }
    }

    /// Clears the graph and rebuilds it from `view`, bypassing the gate.
    pub fn rebuild(&mut self, view: &DataView) -> Result<AssemblySummary, ProjectionError> {
        let projection = project(view)?;
        let previous = self.graph.clone();
        self.graph.clear();

        let assembled = assemble_graph(
            &mut self.graph,
            &projection.nodes,
            &projection.edges,
            projection.edge_labels.as_deref(),
            self.measurer.as_ref(),
            &self.config.assemble_options(),
        );
        let result = match assembled {
            Ok(summary) => self.layout.arrange(&mut self.graph).map(|_| summary),
            Err(err) => Err(err),
        };

        match result {
            Ok(summary) => {
                self.projection = Some(projection);
                Ok(summary)
            }
            Err(err) => {
                self.graph = previous;
                Err(err)
            }
        }
    }

    /// Drops the graph, the cached projection and any open debounce window.
    pub fn reset(&mut self) {
        self.graph.clear();
        self.gate.reset();
        self.projection = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use std::time::Duration;

    const VIEW: &str = r#"{
        "metadata": {"columns": [
            {"displayName": "Id", "roles": {"NodeId": true, "NodeMainLabel": true}},
            {"displayName": "Target", "roles": {"TargetId": true}},
            {"displayName": "Relation", "roles": {"EdgeLabel": true}}
        ]},
        "categorical": {
            "categories": [
                {"source": {"displayName": "Id"}, "values": ["A", "A", "B"]},
                {"source": {"displayName": "Target"}, "values": ["B", "C", null]},
                {"source": {"displayName": "Relation"}, "values": ["knows", "owns", null]}
            ]
        }
    }"#;

    fn view() -> DataView {
        DataView::from_json(VIEW).unwrap()
    }

    fn session() -> Session {
        let mut config = Config::default();
        config.fast_text_metrics = true;
        config.layout = LayoutConfig {
            iterations: 20,
            ..Default::default()
        };
        Session::with_config(config)
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn project_dedups_nodes_and_keeps_all_edge_rows() {
        let projection = project(&view()).unwrap();
        let ids: Vec<&str> = projection.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(projection.edges.len(), 2);
        assert_eq!(projection.nodes[0].identity.as_ref().unwrap().category, "Id");
    }

    #[test]
    fn rebuild_drops_edges_to_unknown_ids() {
        let mut session = session();
        let summary = session.rebuild(&view()).unwrap();
        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.edges, 1);
        assert_eq!(summary.dropped_edges, 1);
        let graph = session.graph();
        assert_eq!(graph.edges[0].tag.as_deref(), Some("knows"));
        assert!(graph.edges[0].points.len() == 3);
    }

    #[test]
    fn update_is_debounced_then_rebuilds() {
        let mut session = session();
        let view = view();
        let t0 = Instant::now();
        assert_eq!(session.update(Some(&view), t0), UpdateOutcome::Debounced);
        assert_eq!(session.update(Some(&view), t0 + ms(500)), UpdateOutcome::Debounced);
        assert!(session.graph().is_empty());
        assert!(matches!(
            session.update(Some(&view), t0 + ms(1200)),
            UpdateOutcome::Rebuilt(_)
        ));
        assert_eq!(session.graph().nodes.len(), 2);
    }

    #[test]
    fn missing_categorical_is_no_data() {
        let mut session = session();
        let t0 = Instant::now();
        session.update(None, t0);
        assert_eq!(session.update(None, t0 + ms(1500)), UpdateOutcome::NoData);
        let bare = DataView::default();
        session.update(Some(&bare), t0 + ms(1600));
        assert_eq!(session.update(Some(&bare), t0 + ms(2700)), UpdateOutcome::NoData);
    }

    #[test]
    fn alignment_fault_keeps_previous_graph() {
        let mut session = session();
        session.rebuild(&view()).unwrap();
        let before = session.graph().clone();

        let broken = DataView::from_json(
            r#"{
                "metadata": {"columns": [
                    {"displayName": "Id", "roles": {"NodeId": true}},
                    {"displayName": "Weight", "roles": {"EdgeLabel": true}, "isMeasure": true}
                ]},
                "categorical": {
                    "categories": [{"source": {"displayName": "Id"}, "values": ["Z"]}],
                    "values": [{"source": {"displayName": "Other"}, "values": [1]}]
                }
            }"#,
        )
        .unwrap();
        let t0 = Instant::now();
        session.update(Some(&broken), t0);
        let outcome = session.update(Some(&broken), t0 + ms(1100));
        assert!(matches!(
            outcome,
            UpdateOutcome::Failed(ProjectionError::HighlightAlignment { .. })
        ));
        assert_eq!(session.graph(), &before);
    }

    #[test]
    fn snapshot_without_category_array_keeps_graph() {
        let mut session = session();
        session.rebuild(&view()).unwrap();
        let before = session.graph().clone();

        let measures_only =
            DataView::from_json(r#"{"metadata": {"columns": []}, "categorical": {}}"#).unwrap();
        let t0 = Instant::now();
        assert_eq!(session.update(Some(&measures_only), t0), UpdateOutcome::Debounced);
        assert_eq!(
            session.update(Some(&measures_only), t0 + ms(1100)),
            UpdateOutcome::NoData
        );
        assert_eq!(session.graph().nodes.len(), 2);
        assert_eq!(session.graph(), &before);
    }

    #[test]
    fn empty_category_array_still_rebuilds() {
        let mut session = session();
        session.rebuild(&view()).unwrap();
        let empty = DataView::from_json(r#"{"categorical": {"categories": []}}"#).unwrap();
        let t0 = Instant::now();
        session.update(Some(&empty), t0);
        assert!(matches!(
            session.update(Some(&empty), t0 + ms(1100)),
            UpdateOutcome::Rebuilt(AssemblySummary { nodes: 0, .. })
        ));
        assert!(session.graph().is_empty());
    }

    struct FixedMeasurer;

    impl TextMeasurer for FixedMeasurer {
        fn measure(&self, text: &str, _font: &crate::text_metrics::Font) -> crate::graph::Size {
            crate::graph::Size::new(text.chars().count() as f32 * 10.0, 20.0)
        }
    }

    #[test]
    fn custom_measurer_sizes_nodes() {
        let mut session = session().with_measurer(Box::new(FixedMeasurer));
        session.rebuild(&view()).unwrap();
        // "A" measures 10x20, plus the 15 margin on the larger side.
        let node = session.graph().find_node("A").unwrap();
        assert_eq!(node.layout.width, 35.0);
        assert_eq!(node.layout.height, 35.0);
    }

    struct FailingLayout;

    impl LayoutExecutor<DiagramGraph> for FailingLayout {
        fn arrange(&self, _graph: &mut DiagramGraph) -> Result<(), ProjectionError> {
            Err(ProjectionError::Layout("boom".to_string()))
        }
    }

    #[test]
    fn layout_failure_restores_previous_graph() {
        let mut config = Config::default();
        config.fast_text_metrics = true;
        let mut session = Session::new(DiagramGraph::new(), FailingLayout, config);
        let err = session.rebuild(&view()).unwrap_err();
        assert_eq!(err, ProjectionError::Layout("boom".to_string()));
        assert!(session.graph().is_empty());
        assert!(session.projection().is_none());
    }

    #[test]
    fn reset_clears_graph_and_gate() {
        let mut session = session();
        session.rebuild(&view()).unwrap();
        assert!(session.projection().is_some());
        session.reset();
        assert!(session.graph().is_empty());
        assert!(session.projection().is_none());
        let t0 = Instant::now();
        assert_eq!(session.update(Some(&view()), t0), UpdateOutcome::Debounced);
    }
}
