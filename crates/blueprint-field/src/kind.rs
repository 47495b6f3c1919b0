use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Every field kind the engine knows how to render, validate and store.
///
/// Type names arrive as free-form strings from schema declarations. Decoding
/// happens once, in [`FieldKind::from_name`], and anything unrecognized
/// becomes [`FieldKind::Text`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKind {
    #[default]
    Text,
    Textarea,
    Number,
    Integer,
    Decimal,
    Email,
    Url,
    Password,
    Range,
    Select,
    Radio,
    ButtonGroup,
    Checkbox,
    Boolean,
    Color,
    Date,
    DateTime,
    Time,
    Relation,
    User,
    PostObject,
    Image,
    File,
    Gallery,
    Link,
    OEmbed,
    Markdown,
    Wysiwyg,
    ReadOnly,
    Hidden,
    SortableChildren,
}

impl FieldKind {
    pub const ALL: [FieldKind; 31] = [
        FieldKind::Text,
        FieldKind::Textarea,
        FieldKind::Number,
        FieldKind::Integer,
        FieldKind::Decimal,
        FieldKind::Email,
        FieldKind::Url,
        FieldKind::Password,
        FieldKind::Range,
        FieldKind::Select,
        FieldKind::Radio,
        FieldKind::ButtonGroup,
        FieldKind::Checkbox,
        FieldKind::Boolean,
        FieldKind::Color,
        FieldKind::Date,
        FieldKind::DateTime,
        FieldKind::Time,
        FieldKind::Relation,
        FieldKind::User,
        FieldKind::PostObject,
        FieldKind::Image,
        FieldKind::File,
        FieldKind::Gallery,
        FieldKind::Link,
        FieldKind::OEmbed,
        FieldKind::Markdown,
        FieldKind::Wysiwyg,
        FieldKind::ReadOnly,
        FieldKind::Hidden,
        FieldKind::SortableChildren,
    ];

    /// Decode a type name, falling back to `Text` for unknown names.
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or(FieldKind::Text)
    }

    /// Strict decode: `None` for names outside the built-in set.
    pub fn parse(name: &str) -> Option<Self> {
        let kind = match name {
            "text" => FieldKind::Text,
            "textarea" => FieldKind::Textarea,
            "number" => FieldKind::Number,
            "integer" => FieldKind::Integer,
            "decimal" => FieldKind::Decimal,
            "email" => FieldKind::Email,
            "url" => FieldKind::Url,
            "password" => FieldKind::Password,
            "range" => FieldKind::Range,
            "select" => FieldKind::Select,
            "radio" => FieldKind::Radio,
            "button_group" => FieldKind::ButtonGroup,
            "checkbox" => FieldKind::Checkbox,
            "boolean" => FieldKind::Boolean,
            "color" => FieldKind::Color,
            "date" => FieldKind::Date,
            "datetime" => FieldKind::DateTime,
            "time" => FieldKind::Time,
            "relation" => FieldKind::Relation,
            "user" => FieldKind::User,
            "post_object" => FieldKind::PostObject,
            "image" => FieldKind::Image,
            "file" => FieldKind::File,
            "gallery" => FieldKind::Gallery,
            "link" => FieldKind::Link,
            "oembed" => FieldKind::OEmbed,
            "markdown" => FieldKind::Markdown,
            "wysiwyg" => FieldKind::Wysiwyg,
            "readonly" => FieldKind::ReadOnly,
            "hidden" => FieldKind::Hidden,
            "sortable_children" => FieldKind::SortableChildren,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Number => "number",
            FieldKind::Integer => "integer",
            FieldKind::Decimal => "decimal",
            FieldKind::Email => "email",
            FieldKind::Url => "url",
            FieldKind::Password => "password",
            FieldKind::Range => "range",
            FieldKind::Select => "select",
            FieldKind::Radio => "radio",
            FieldKind::ButtonGroup => "button_group",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Boolean => "boolean",
            FieldKind::Color => "color",
            FieldKind::Date => "date",
            FieldKind::DateTime => "datetime",
            FieldKind::Time => "time",
            FieldKind::Relation => "relation",
            FieldKind::User => "user",
            FieldKind::PostObject => "post_object",
            FieldKind::Image => "image",
            FieldKind::File => "file",
            FieldKind::Gallery => "gallery",
            FieldKind::Link => "link",
            FieldKind::OEmbed => "oembed",
            FieldKind::Markdown => "markdown",
            FieldKind::Wysiwyg => "wysiwyg",
            FieldKind::ReadOnly => "readonly",
            FieldKind::Hidden => "hidden",
            FieldKind::SortableChildren => "sortable_children",
        }
    }

    /// Virtual kinds have no storage column and are never submitted.
    pub fn is_virtual(self) -> bool {
        matches!(self, FieldKind::SortableChildren)
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            FieldKind::Number | FieldKind::Integer | FieldKind::Decimal | FieldKind::Range
        )
    }

    pub fn is_boolean(self) -> bool {
        matches!(self, FieldKind::Checkbox | FieldKind::Boolean)
    }

    /// Kinds whose value must be one of the declared `options`.
    pub fn has_choices(self) -> bool {
        matches!(
            self,
            FieldKind::Select | FieldKind::Radio | FieldKind::ButtonGroup
        )
    }

    /// Kinds that load their own data from an auxiliary endpoint.
    pub fn fetches_data(self) -> bool {
        matches!(
            self,
            FieldKind::Relation
                | FieldKind::User
                | FieldKind::PostObject
                | FieldKind::SortableChildren
        )
    }

    /// The `<input type>` used when the kind renders as a plain input.
    pub fn input_type(self) -> &'static str {
        match self {
            FieldKind::Number | FieldKind::Integer | FieldKind::Decimal => "number",
            FieldKind::Email => "email",
            FieldKind::Url | FieldKind::Link | FieldKind::OEmbed => "url",
            FieldKind::Password => "password",
            FieldKind::Range => "range",
            FieldKind::Checkbox | FieldKind::Boolean => "checkbox",
            FieldKind::Color => "color",
            FieldKind::Date => "date",
            FieldKind::DateTime => "datetime-local",
            FieldKind::Time => "time",
            FieldKind::Hidden => "hidden",
            _ => "text",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(FieldKind::from_name(&name))
    }
}
