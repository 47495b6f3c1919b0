use std::collections::BTreeMap;
use std::sync::Arc;

use blueprint_field::{FieldKind, FieldTypeRegistry};
use blueprint_schema::{
    Catalog, Collection, CollectionDescriptor, DeclaredSchema, FieldOverrides, FieldSpec,
    ModelMetadata, ResolveError, Resolver, Schema, SchemaRegistry,
};

#[derive(Default)]
struct ArticleSchema;

impl Schema for ArticleSchema {
    fn collection_ref(&self) -> Option<&str> {
        Some("demo::Articles")
    }

    fn field_overrides(&self) -> FieldOverrides {
        FieldOverrides::new()
            .field(
                "body",
                FieldSpec::typed("markdown").with(|a| a.required = Some(true)),
            )
            .field(
                "author_email",
                FieldSpec::default().with(|a| a.label = Some("Author".into())),
            )
            .field("published", FieldSpec::typed("boolean"))
            .field("not_fillable", FieldSpec::typed("number"))
    }
}

struct Articles;

impl Collection for Articles {
    fn model(&self) -> Option<ModelMetadata> {
        Some(ModelMetadata {
            class: "demo::Article".into(),
            table: "articles".into(),
            fillable: ["title", "body", "author_email", "homepage_url", "views", "published", "published_at"]
                .map(String::from)
                .to_vec(),
            casts: BTreeMap::from([
                ("views".to_string(), "integer".to_string()),
                ("published".to_string(), "boolean".to_string()),
                ("published_at".to_string(), "datetime".to_string()),
            ]),
        })
    }

    fn rest_namespace(&self) -> &str {
        "demo/v2"
    }

    fn route(&self) -> &str {
        "articles"
    }
}

fn resolver(registry: SchemaRegistry, catalog: Catalog) -> Resolver {
    Resolver::new(
        Arc::new(registry),
        Arc::new(catalog),
        Arc::new(FieldTypeRegistry::with_builtins()),
        "https://example.test/wp-json/",
    )
}

fn article_resolver() -> Resolver {
    let mut catalog = Catalog::new();
    catalog.add_schema::<ArticleSchema>("demo::ArticleSchema");
    catalog.add_collection("demo::Articles", Articles);
    let registry = SchemaRegistry::new();
    registry.register("article", "demo::ArticleSchema").unwrap();
    registry.seal();
    resolver(registry, catalog)
}

#[test]
fn resolved_keys_are_exactly_the_fillable_keys_in_order() {
    let schema = article_resolver().resolve("article").unwrap();
    let fillable = schema.model().unwrap().fillable.clone();
    assert_eq!(schema.field_keys().collect::<Vec<_>>(), fillable);
    assert!(schema.field("not_fillable").is_none());
}

#[test]
fn inference_then_overrides() {
    let schema = article_resolver().resolve("article").unwrap();
    let kind = |key: &str| schema.field(key).unwrap().kind();

    assert_eq!(kind("title"), FieldKind::Text);
    assert_eq!(kind("body"), FieldKind::Markdown);
    assert_eq!(kind("author_email"), FieldKind::Email);
    assert_eq!(kind("homepage_url"), FieldKind::Url);
    assert_eq!(kind("views"), FieldKind::Number);
    assert_eq!(kind("published"), FieldKind::Boolean);
    assert_eq!(kind("published_at"), FieldKind::Date);

    let author = schema.field("author_email").unwrap();
    assert_eq!(author.display_label(), "Author");
    assert!(schema.field("body").unwrap().is_required());
    assert!(!schema.field("title").unwrap().is_required());
}

#[test]
fn endpoint_joins_base_namespace_and_route() {
    let schema = article_resolver().resolve("article").unwrap();
    let routes = &schema.collection.as_ref().unwrap().routes;
    assert_eq!(routes.endpoint, "https://example.test/wp-json/demo/v2/articles");
    assert_eq!(schema.endpoint(), Some(routes.endpoint.as_str()));
    assert_eq!(schema.name, "ArticleSchema");
    assert_eq!(schema.table(), Some("articles"));
}

#[test]
fn resolution_is_idempotent() {
    let resolver = article_resolver();
    let first = serde_json::to_value(resolver.resolve("article").unwrap()).unwrap();
    let second = serde_json::to_value(resolver.resolve("article").unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn unknown_key_and_missing_class() {
    let registry = SchemaRegistry::new();
    registry.register("ghost", "demo::GhostSchema").unwrap();
    let resolver = resolver(registry, Catalog::new());

    assert_eq!(
        resolver.resolve("bogus").unwrap_err(),
        ResolveError::SchemaNotFound("bogus".into())
    );
    assert!(matches!(
        resolver.resolve("ghost"),
        Err(ResolveError::SchemaClassMissing { .. })
    ));
    assert!(resolver.summaries().is_empty());
}

#[test]
fn missing_collection_degrades_to_raw_overrides() {
    let mut catalog = Catalog::new();
    catalog.add_schema::<ArticleSchema>("demo::ArticleSchema");
    let registry = SchemaRegistry::new();
    registry.register("article", "demo::ArticleSchema").unwrap();
    let schema = resolver(registry, catalog).resolve("article").unwrap();

    assert!(schema.is_degraded());
    assert!(schema.collection.is_none());
    assert_eq!(
        schema.field_keys().collect::<Vec<_>>(),
        ["body", "author_email", "published", "not_fillable"]
    );
}

#[test]
fn missing_model_keeps_routes_but_degrades_fields() {
    let mut catalog = Catalog::new();
    catalog.add_schema_with("demo::Bare", || {
        Box::new(DeclaredSchema {
            collection: Some("demo::Bare".into()),
            fields: FieldOverrides::new().field("title", FieldSpec::default()),
        }) as Box<dyn Schema>
    });
    catalog.add_collection("demo::Bare", CollectionDescriptor::new("demo::Bare", "bare"));
    let registry = SchemaRegistry::new();
    registry.register("bare", "demo::Bare").unwrap();
    let schema = resolver(registry, catalog).resolve("bare").unwrap();

    assert!(schema.is_degraded());
    assert_eq!(schema.endpoint(), Some("https://example.test/wp-json/blueprint/v1/bare"));
    assert_eq!(schema.field_keys().collect::<Vec<_>>(), ["title"]);
}

#[test]
fn summaries_list_loadable_schemas() {
    let mut catalog = Catalog::new();
    catalog.add_schema::<ArticleSchema>("demo::ArticleSchema");
    catalog.add_collection("demo::Articles", Articles);
    let registry = SchemaRegistry::new();
    registry.register("article", "demo::ArticleSchema").unwrap();
    registry.register("zombie", "demo::Missing").unwrap();

    let summaries = resolver(registry, catalog).summaries();
    assert_eq!(summaries.len(), 1);
    let value = serde_json::to_value(&summaries[0]).unwrap();
    assert_eq!(value["key"], "article");
    assert_eq!(value["name"], "ArticleSchema");
    assert_eq!(value["fieldCount"], 7);
    assert_eq!(value["collection"]["table"], "articles");
}

#[test]
fn serialized_shape() {
    let schema = article_resolver().resolve("article").unwrap();
    let value = serde_json::to_value(&schema).unwrap();
    assert_eq!(value["collection"]["model"]["fillable"][0], "title");
    assert_eq!(value["collection"]["routes"]["namespace"], "demo/v2");
    assert_eq!(value["fields"]["body"]["type"], "markdown");
    assert_eq!(value["resolvedFields"][1]["key"], "body");
    assert_eq!(value["resolvedFields"][1]["attributes"]["required"], true);
}
