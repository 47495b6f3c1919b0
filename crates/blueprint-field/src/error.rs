#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    #[error("sortable_children requires {0}")]
    InvalidSortableChildren(&'static str),

    #[error("invalid column definition: {0}")]
    InvalidColumn(String),
}
