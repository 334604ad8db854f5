use crate::data::{DataView, cell_text};
use crate::error::ProjectionError;
use crate::ir::{Role, RoleMap};

/// Per-row values of one role, index-aligned with the snapshot rows.
pub type RoleValues = Vec<Option<String>>;

/// Reads role-bound columns out of a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ColumnAccessor<'a> {
    view: &'a DataView,
    roles: &'a RoleMap,
}

impl<'a> ColumnAccessor<'a> {
    pub fn new(view: &'a DataView, roles: &'a RoleMap) -> Self {
        Self { view, roles }
    }

    pub fn roles(&self) -> &'a RoleMap {
        self.roles
    }

    /// Values for a role given by name; names outside the role set yield `None`.
    pub fn role_values_by_name(&self, name: &str) -> Result<Option<RoleValues>, ProjectionError> {
        match Role::from_token(name) {
            Some(role) => self.role_values(role),
            None => Ok(None),
        }
    }

    /// Values for `role`, or `None` when nothing is bound to it.
    ///
    /// Measure roles read the first aggregate series, which must be the bound
    /// column; anything else is a [`ProjectionError::HighlightAlignment`].
    pub fn role_values(&self, role: Role) -> Result<Option<RoleValues>, ProjectionError> {
        let Some(binding) = self.roles.get(role) else {
            return Ok(None);
        };

        if binding.is_measure {
            let Some(series) = self.view.value_series().first() else {
                return Ok(None);
            };
            if series.source.display_name != binding.field_name {
                return Err(ProjectionError::HighlightAlignment {
                    expected: binding.field_name.clone(),
                    found: series.source.display_name.clone(),
                });
            }
            return Ok(Some(series.values.iter().map(cell_text).collect()));
        }

        Ok(self
            .category_index(&binding.field_name)
            .map(|idx| self.view.categories()[idx].values.iter().map(cell_text).collect()))
    }

    /// Position of the first category column with this display name.
    pub fn category_index(&self, name: &str) -> Option<usize> {
        self.view
            .categories()
            .iter()
            .position(|column| column.source.display_name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::resolve_roles;

    const VIEW: &str = r#"{
        "metadata": {"columns": [
            {"displayName": "Id", "roles": {"NodeId": true}},
            {"displayName": "Parent", "roles": {"TargetId": true}},
            {"displayName": "Score", "roles": {"EdgeLabel": true}, "isMeasure": true}
        ]},
        "categorical": {
            "categories": [
                {"source": {"displayName": "Id"}, "values": ["a", "b", 3]},
                {"source": {"displayName": "Parent"}, "values": [null, "a", "a"]},
                {"source": {"displayName": "Id"}, "values": ["shadow", "shadow", "shadow"]}
            ],
            "values": [{"source": {"displayName": "Score"}, "values": [10, null, "x"]}]
        }
    }"#;

    fn view() -> DataView {
        DataView::from_json(VIEW).unwrap()
    }

    #[test]
    fn categorical_values_are_stringified_in_row_order() {
        let view = view();
        let roles = resolve_roles(&view.metadata.columns);
        let accessor = ColumnAccessor::new(&view, &roles);
        let ids = accessor.role_values(Role::NodeId).unwrap().unwrap();
        assert_eq!(
            ids,
            vec![Some("a".to_string()), Some("b".to_string()), Some("3".to_string())]
        );
        let targets = accessor.role_values(Role::TargetId).unwrap().unwrap();
        assert_eq!(targets, vec![None, Some("a".to_string()), Some("a".to_string())]);
    }

    #[test]
    fn measure_reads_first_aggregate_series() {
        let view = view();
        let roles = resolve_roles(&view.metadata.columns);
        let accessor = ColumnAccessor::new(&view, &roles);
        let labels = accessor.role_values(Role::EdgeLabel).unwrap().unwrap();
        assert_eq!(labels, vec![Some("10".to_string()), None, Some("x".to_string())]);
    }

    #[test]
    fn unbound_and_unknown_roles_are_soft_empty() {
        let view = view();
        let roles = resolve_roles(&view.metadata.columns);
        let accessor = ColumnAccessor::new(&view, &roles);
        assert_eq!(accessor.role_values(Role::NodeShape).unwrap(), None);
        assert_eq!(accessor.role_values_by_name("Tooltip").unwrap(), None);
        assert!(accessor.role_values_by_name("NodeId").unwrap().is_some());
    }

    #[test]
    fn bound_column_missing_from_categories_is_soft_empty() {
        let mut view = view();
        view.metadata.columns[1].display_name = "Gone".to_string();
        let roles = resolve_roles(&view.metadata.columns);
        let accessor = ColumnAccessor::new(&view, &roles);
        assert_eq!(accessor.category_index("Gone"), None);
        assert_eq!(accessor.role_values(Role::TargetId).unwrap(), None);
    }

    #[test]
    fn mismatched_aggregate_series_is_an_alignment_fault() {
        let mut view = view();
        view.metadata.columns[2].display_name = "Other".to_string();
        let roles = resolve_roles(&view.metadata.columns);
        let accessor = ColumnAccessor::new(&view, &roles);
        let err = accessor.role_values(Role::EdgeLabel).unwrap_err();
        assert_eq!(
            err,
            ProjectionError::HighlightAlignment {
                expected: "Other".to_string(),
                found: "Score".to_string(),
            }
        );
    }

    #[test]
    fn measure_without_series_is_soft_empty() {
        let mut view = view();
        if let Some(categorical) = view.categorical.as_mut() {
            categorical.values.clear();
        }
        let roles = resolve_roles(&view.metadata.columns);
        let accessor = ColumnAccessor::new(&view, &roles);
        assert_eq!(accessor.role_values(Role::EdgeLabel).unwrap(), None);
    }
}
