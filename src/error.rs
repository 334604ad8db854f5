use thiserror::Error;

/// Faults that abort a projection cycle.
///
/// Missing roles, empty data, null targets and dangling edges are not
/// represented here: they shrink the output instead of failing it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// The first aggregate series is not the column the measure role was bound to,
    /// so its values cannot be trusted to line up with the rows.
    #[error("highlight series '{found}' does not match measure field '{expected}'")]
    HighlightAlignment { expected: String, found: String },
    #[error("graph model rejected mutation: {0}")]
    Model(String),
    #[error("layout failed: {0}")]
    Layout(String),
}
