use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::definition::FieldDefinition;
use crate::error::FieldError;
use crate::kind::FieldKind;

const DEFAULT_VARCHAR: u32 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Varchar(u32),
    Text,
    Int,
    Decimal(u8, u8),
    TinyInt(u8),
    Date,
    DateTime,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Varchar(n) => write!(f, "VARCHAR({n})"),
            ColumnType::Text => f.write_str("TEXT"),
            ColumnType::Int => f.write_str("INT"),
            ColumnType::Decimal(p, s) => write!(f, "DECIMAL({p},{s})"),
            ColumnType::TinyInt(n) => write!(f, "TINYINT({n})"),
            ColumnType::Date => f.write_str("DATE"),
            ColumnType::DateTime => f.write_str("DATETIME"),
        }
    }
}

impl FromStr for ColumnType {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FieldError::InvalidColumn(format!("unknown column type {s:?}"));
        let (name, args) = match s.split_once('(') {
            Some((name, rest)) => (name, Some(rest.strip_suffix(')').ok_or_else(invalid)?)),
            None => (s, None),
        };
        let arg = |i: usize| -> Result<u32, FieldError> {
            args.and_then(|a| a.split(',').nth(i))
                .and_then(|n| n.trim().parse().ok())
                .ok_or_else(invalid)
        };
        let small = |i: usize| -> Result<u8, FieldError> {
            u8::try_from(arg(i)?).map_err(|_| {
                FieldError::InvalidColumn(format!("column size out of range in {s:?}"))
            })
        };
        match name {
            "VARCHAR" => Ok(ColumnType::Varchar(arg(0)?)),
            "TEXT" => Ok(ColumnType::Text),
            "INT" => Ok(ColumnType::Int),
            "DECIMAL" => Ok(ColumnType::Decimal(small(0)?, small(1)?)),
            "TINYINT" => Ok(ColumnType::TinyInt(small(0)?)),
            "DATE" => Ok(ColumnType::Date),
            "DATETIME" => Ok(ColumnType::DateTime),
            _ => Err(invalid()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDefault {
    /// Rendered quoted.
    Text(String),
    /// Rendered as a bare literal.
    Number(String),
}

impl ColumnDefault {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(ColumnDefault::Text(s.clone())),
            Value::Number(n) => Some(ColumnDefault::Number(n.to_string())),
            Value::Bool(b) => Some(ColumnDefault::Number(if *b { "1" } else { "0" }.into())),
            other => Some(ColumnDefault::Text(other.to_string())),
        }
    }
}

impl fmt::Display for ColumnDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnDefault::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            ColumnDefault::Number(n) => f.write_str(n),
        }
    }
}

/// One column of a generated `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub default: Option<ColumnDefault>,
}

impl ColumnDefinition {
    /// Storage column for a field, or `None` for virtual kinds.
    pub fn for_field(field: &FieldDefinition) -> Option<Self> {
        let attrs = field.attributes();
        let column_type = match field.kind() {
            FieldKind::SortableChildren => return None,
            FieldKind::Text | FieldKind::Email | FieldKind::Url => {
                let len = attrs
                    .max_length
                    .and_then(|n| u32::try_from(n).ok())
                    .unwrap_or(DEFAULT_VARCHAR);
                ColumnType::Varchar(len)
            }
            FieldKind::Textarea | FieldKind::Wysiwyg | FieldKind::Markdown => ColumnType::Text,
            FieldKind::Number | FieldKind::Integer => ColumnType::Int,
            FieldKind::Range => match attrs.step {
                Some(step) if step.fract() != 0.0 => ColumnType::Decimal(10, 2),
                _ => ColumnType::Int,
            },
            FieldKind::Decimal => ColumnType::Decimal(10, 2),
            FieldKind::Boolean | FieldKind::Checkbox => ColumnType::TinyInt(1),
            FieldKind::Date => ColumnType::Date,
            FieldKind::DateTime => ColumnType::DateTime,
            _ => ColumnType::Varchar(DEFAULT_VARCHAR),
        };

        Some(Self {
            name: field.key().to_string(),
            column_type,
            nullable: !field.is_required(),
            default: attrs.default.as_ref().and_then(ColumnDefault::from_value),
        })
    }
}

impl fmt::Display for ColumnDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nullability = if self.nullable { "NULL" } else { "NOT NULL" };
        write!(f, "`{}` {} {}", self.name, self.column_type, nullability)?;
        if let Some(default) = &self.default {
            write!(f, " DEFAULT {default}")?;
        }
        Ok(())
    }
}

impl FromStr for ColumnDefinition {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |why: &str| FieldError::InvalidColumn(format!("{why}: {s:?}"));

        let rest = s.trim().strip_prefix('`').ok_or_else(|| invalid("missing name"))?;
        let (name, rest) = rest.split_once('`').ok_or_else(|| invalid("unterminated name"))?;
        let rest = rest.trim_start();
        let (column_type, rest) = rest.split_once(' ').unwrap_or((rest, ""));
        let column_type = column_type.parse()?;

        let rest = rest.trim_start();
        let (nullable, rest) = if let Some(rest) = rest.strip_prefix("NOT NULL") {
            (false, rest)
        } else if let Some(rest) = rest.strip_prefix("NULL") {
            (true, rest)
        } else {
            return Err(invalid("missing nullability"));
        };

        let rest = rest.trim();
        let default = if rest.is_empty() {
            None
        } else {
            let literal = rest
                .strip_prefix("DEFAULT ")
                .ok_or_else(|| invalid("unexpected trailing text"))?
                .trim();
            match literal.strip_prefix('\'').and_then(|l| l.strip_suffix('\'')) {
                Some(text) => Some(ColumnDefault::Text(text.replace("''", "'"))),
                None => Some(ColumnDefault::Number(literal.to_string())),
            }
        };

        Ok(Self {
            name: name.to_string(),
            column_type,
            nullable,
            default,
        })
    }
}
