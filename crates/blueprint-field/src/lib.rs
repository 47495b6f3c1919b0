mod attributes;
mod column;
mod definition;
mod error;
mod kind;
pub mod markup;
mod migration;
mod registry;
pub mod rules;

pub use attributes::{FieldAttributes, FieldOption, RelationConfig, SortableChildrenConfig};
pub use column::{ColumnDefault, ColumnDefinition, ColumnType};
pub use definition::{FieldDefinition, humanize};
pub use error::FieldError;
pub use kind::FieldKind;
pub use migration::create_table_sql;
pub use registry::{FieldBehavior, FieldTypeRegistry, SortableChildrenBehavior, StandardBehavior};
pub use rules::{Format, RuleFailure, RuleKind, ValidationRules, ValueType};
