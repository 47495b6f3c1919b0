use std::sync::Arc;

use blueprint_field::{
    ColumnDefinition, FieldAttributes, FieldBehavior, FieldDefinition, FieldTypeRegistry,
    SortableChildrenConfig, StandardBehavior, create_table_sql,
};
use serde_json::{Value, json};

/// Wraps the standard behavior and forbids the word "spam".
struct NoSpam;

impl FieldBehavior for NoSpam {
    fn render(&self, field: &FieldDefinition, value: Option<&Value>) -> String {
        StandardBehavior.render(field, value)
    }

    fn validate(&self, field: &FieldDefinition, value: &Value) -> Vec<String> {
        let mut errors = StandardBehavior.validate(field, value);
        if value.as_str().is_some_and(|s| s.contains("spam")) {
            errors.push(format!("{} must not contain spam", field.display_label()));
        }
        errors
    }

    fn column_definition(&self, field: &FieldDefinition) -> Option<ColumnDefinition> {
        StandardBehavior.column_definition(field)
    }
}

#[test]
fn specialized_type_extends_standard_rules() {
    let mut registry = FieldTypeRegistry::with_builtins();
    registry.register_type("clean_text", Arc::new(NoSpam));
    let registry = Arc::new(registry);

    let field = registry.create_with(
        "clean_text",
        "title",
        FieldAttributes {
            max_length: Some(8),
            ..Default::default()
        },
    );

    assert_eq!(
        field.validate(&json!("buy spam now")),
        vec![
            "Title must be no more than 8 characters".to_string(),
            "Title must not contain spam".to_string(),
        ]
    );
    assert!(field.render(None).contains(r#"type="text""#));
    assert_eq!(
        field.column_definition().unwrap().to_string(),
        "`title` VARCHAR(8) NULL"
    );
}

#[test]
fn overriding_a_builtin_changes_every_new_field_of_that_type() {
    let mut registry = FieldTypeRegistry::with_builtins();
    let previous = registry.register_type("text", Arc::new(NoSpam));
    assert!(previous.is_some());

    let field = registry.create("text", "subject");
    assert_eq!(field.validate(&json!("spam")).len(), 1);
}

#[test]
fn ticket_table_migration() {
    let fields = vec![
        FieldDefinition::new("text", "title").required(true),
        FieldDefinition::new("textarea", "description").required(true),
        FieldDefinition::new("select", "status")
            .options(["open", "in_progress", "pending", "closed"])
            .default_value("open"),
        FieldDefinition::new("email", "contact_email"),
        FieldDefinition::new("sortable_children", "replies").sortable_children(
            SortableChildrenConfig::new("/api/ticket_replies", "ticket_id").unwrap(),
        ),
    ];

    let sql = create_table_sql("tickets", &fields, "");
    assert!(sql.contains("`status` VARCHAR(255) NULL DEFAULT 'open'"));
    assert!(sql.contains("`contact_email` VARCHAR(255) NULL"));
    assert!(!sql.contains("replies"));
}

#[test]
fn attributes_declared_in_json_drive_validation() {
    let attrs: FieldAttributes = serde_json::from_value(json!({
        "label": "Reference",
        "required": true,
        "pattern": "^[A-Z]{3}-\\d+$",
        "patternMessage": "Use the form ABC-123"
    }))
    .unwrap();
    let field = FieldTypeRegistry::default().create_with("text", "reference", attrs);

    assert_eq!(field.validate(&json!("")), vec!["Reference is required".to_string()]);
    assert_eq!(
        field.validate(&json!("abc")),
        vec!["Use the form ABC-123".to_string()]
    );
    assert!(field.validate(&json!("ABC-123")).is_empty());
}
