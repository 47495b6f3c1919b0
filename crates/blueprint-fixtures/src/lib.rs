//! Help-desk tickets and their replies, wired up the way an application
//! would declare them. Used by tests and as the server's default content.

use std::collections::BTreeMap;
use std::sync::Arc;

use blueprint_field::{FieldOption, FieldTypeRegistry};
use blueprint_schema::{
    Catalog, Collection, FieldOverrides, FieldSpec, ModelMetadata, RegistryError, Resolver, Schema,
    SchemaRegistry,
};

pub const TICKET_KEY: &str = "ticket";
pub const TICKET_REPLY_KEY: &str = "ticket_reply";

pub const TICKET_SCHEMA: &str = "blueprint_fixtures::TicketSchema";
pub const TICKET_COLLECTION: &str = "blueprint_fixtures::TicketCollection";
pub const TICKET_REPLY_SCHEMA: &str = "blueprint_fixtures::TicketReplySchema";
pub const TICKET_REPLY_COLLECTION: &str = "blueprint_fixtures::TicketReplyCollection";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn timestamps() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("created_at".to_string(), "datetime".to_string()),
        ("updated_at".to_string(), "datetime".to_string()),
    ])
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TicketCollection;

impl Collection for TicketCollection {
    fn model(&self) -> Option<ModelMetadata> {
        Some(ModelMetadata {
            class: "blueprint_fixtures::Ticket".into(),
            table: "tickets".into(),
            fillable: strings(&[
                "title",
                "description",
                "status",
                "priority",
                "assigned_to",
                "contact_email",
            ]),
            casts: timestamps(),
        })
    }

    fn route(&self) -> &str {
        "tickets"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TicketReplyCollection;

impl Collection for TicketReplyCollection {
    fn model(&self) -> Option<ModelMetadata> {
        let mut casts = timestamps();
        casts.insert("ticket_id".into(), "integer".into());
        casts.insert("author_id".into(), "integer".into());
        Some(ModelMetadata {
            class: "blueprint_fixtures::TicketReply".into(),
            table: "ticket_replies".into(),
            fillable: strings(&["ticket_id", "message", "author_id", "position"]),
            casts,
        })
    }

    fn route(&self) -> &str {
        "ticket_replies"
    }
}

fn choices(values: &[&str]) -> Vec<FieldOption> {
    values.iter().map(|v| FieldOption::from(*v)).collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TicketSchema;

impl Schema for TicketSchema {
    fn collection_ref(&self) -> Option<&str> {
        Some(TICKET_COLLECTION)
    }

    fn field_overrides(&self) -> FieldOverrides {
        FieldOverrides::new()
            .field(
                "title",
                FieldSpec::default().with(|a| {
                    a.label = Some("Title".into());
                    a.required = Some(true);
                    a.max_length = Some(255);
                }),
            )
            .field(
                "description",
                FieldSpec::typed("textarea").with(|a| {
                    a.required = Some(true);
                    a.rows = Some(5);
                }),
            )
            .field(
                "priority",
                FieldSpec::typed("select").with(|a| {
                    a.options = Some(choices(&["low", "medium", "high", "urgent"]));
                    a.placeholder = Some("Select priority level".into());
                }),
            )
            .field(
                "status",
                FieldSpec::typed("select").with(|a| {
                    a.options = Some(choices(&["open", "in_progress", "pending", "closed"]));
                    a.placeholder = Some("Select status".into());
                    a.default = Some("open".into());
                }),
            )
            .field(
                "contact_email",
                FieldSpec::default().with(|a| {
                    a.help_text = Some("We reply to this address.".into());
                }),
            )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TicketReplySchema;

impl Schema for TicketReplySchema {
    fn collection_ref(&self) -> Option<&str> {
        Some(TICKET_REPLY_COLLECTION)
    }

    fn field_overrides(&self) -> FieldOverrides {
        FieldOverrides::new()
            .field(
                "ticket_id",
                FieldSpec::typed("hidden").with(|a| a.required = Some(true)),
            )
            .field(
                "message",
                FieldSpec::typed("textarea").with(|a| {
                    a.required = Some(true);
                    a.min_length = Some(2);
                }),
            )
            .field(
                "author_id",
                FieldSpec::typed("user").with(|a| a.roles = Some(strings(&["administrator", "editor"]))),
            )
            .field("position", FieldSpec::default().with(|a| a.hidden = Some(true)))
    }
}

/// Catalog entries for the four fixture classes.
pub fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.add_schema::<TicketSchema>(TICKET_SCHEMA);
    catalog.add_schema::<TicketReplySchema>(TICKET_REPLY_SCHEMA);
    catalog.add_collection(TICKET_COLLECTION, TicketCollection);
    catalog.add_collection(TICKET_REPLY_COLLECTION, TicketReplyCollection);
    catalog
}

pub fn register(registry: &SchemaRegistry) -> Result<(), RegistryError> {
    registry.register(TICKET_KEY, TICKET_SCHEMA)?;
    registry.register(TICKET_REPLY_KEY, TICKET_REPLY_SCHEMA)?;
    Ok(())
}

/// A resolver over the fixtures with a sealed registry and builtin field
/// types.
pub fn resolver(rest_base: &str) -> Result<Resolver, RegistryError> {
    let registry = SchemaRegistry::new();
    register(&registry)?;
    registry.seal();
    Ok(Resolver::new(
        Arc::new(registry),
        Arc::new(catalog()),
        Arc::new(FieldTypeRegistry::with_builtins()),
        rest_base,
    ))
}
