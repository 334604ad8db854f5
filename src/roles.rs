use crate::data::ColumnMetadata;
use crate::ir::{FieldBinding, Role, RoleMap};

/// Builds the role table for one projection cycle.
///
/// Every role flagged `true` on a column binds that column; a later column
/// claiming the same role replaces the earlier one. Role names outside the
/// closed [`Role`] set are ignored.
pub fn resolve_roles(columns: &[ColumnMetadata]) -> RoleMap {
    let mut map = RoleMap::new();
    for column in columns {
        for (name, flagged) in &column.roles {
            if !*flagged {
                continue;
            }
            let Some(role) = Role::from_token(name) else {
                tracing::debug!("ignoring unknown role '{}' on column '{}'", name, column.display_name);
                continue;
            };
            if let Some(previous) = map.get(role) {
                tracing::debug!(
                    "role {} rebound from '{}' to '{}'",
                    role,
                    previous.field_name,
                    column.display_name
                );
            }
            map.bind(
                role,
                FieldBinding {
                    field_name: column.display_name.clone(),
                    is_measure: column.is_measure,
                },
            );
        }
    }
    map
}
