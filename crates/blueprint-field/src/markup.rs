//! Server-side HTML for a single field.
//!
//! Every field renders inside a `div.bp-field` wrapper with its label, the
//! input, optional help text and an error slot
//! (`div.bp-field-error[data-field=key]`) the form controllers write into.

use std::fmt::Write;

use serde_json::Value;

use crate::attributes::FieldOption;
use crate::definition::FieldDefinition;
use crate::kind::FieldKind;
use crate::rules;

pub const JS_REQUIRED: &str = "This field requires JavaScript to function.";

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Plain text form of a value for an input's `value` attribute.
pub fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn render_field(field: &FieldDefinition, value: Option<&Value>) -> String {
    let value = value.or(field.attributes().default.as_ref());
    if field.kind() == FieldKind::Hidden {
        return format!(
            r#"<input type="hidden" id="{key}" name="{key}" value="{value}" />"#,
            key = escape_html(field.key()),
            value = escape_html(&value_text(value)),
        );
    }

    let mut html = format!(
        r#"<div class="bp-field bp-field-{}">"#,
        field.kind().as_str().replace('_', "-")
    );
    if !field.kind().is_boolean() {
        html.push_str(&label(field));
    }

    let control = match field.kind() {
        FieldKind::Textarea | FieldKind::Markdown | FieldKind::Wysiwyg => textarea(field, value),
        FieldKind::Select => select(field, value),
        FieldKind::Radio | FieldKind::ButtonGroup => radio_group(field, value),
        FieldKind::Checkbox | FieldKind::Boolean => checkbox(field, value),
        FieldKind::ReadOnly => format!(
            r#"<input type="text" id="{key}" value="{value}" disabled />"#,
            key = escape_html(field.key()),
            value = escape_html(&value_text(value)),
        ),
        FieldKind::Relation
        | FieldKind::User
        | FieldKind::PostObject
        | FieldKind::Image
        | FieldKind::File
        | FieldKind::Gallery => js_placeholder(field, value),
        _ => input(field, value),
    };

    match (&field.attributes().prepend, &field.attributes().append) {
        (None, None) => html.push_str(&control),
        (prepend, append) => {
            html.push_str(r#"<div class="bp-input-group">"#);
            if let Some(text) = prepend {
                let _ = write!(html, r#"<span class="bp-prepend">{}</span>"#, escape_html(text));
            }
            html.push_str(&control);
            if let Some(text) = append {
                let _ = write!(html, r#"<span class="bp-append">{}</span>"#, escape_html(text));
            }
            html.push_str("</div>");
        }
    }

    html.push_str(&trailer(field));
    html
}

/// Placeholder for the child list; the dynamic form replaces it.
pub fn render_sortable_children(field: &FieldDefinition) -> String {
    let config = field
        .attributes()
        .sortable_children
        .as_ref()
        .and_then(|c| serde_json::to_string(c).ok())
        .unwrap_or_else(|| "{}".to_string());
    format!(
        r#"<div class="bp-field bp-sortable-children-field"><label>{label}</label><div class="bp-sortable-children-placeholder" data-config="{config}"><p class="bp-help-text">{JS_REQUIRED}</p></div></div>"#,
        label = escape_html(&field.display_label()),
        config = escape_html(&config),
    )
}

fn label(field: &FieldDefinition) -> String {
    let star = if field.is_required() {
        r#" <span class="bp-required">*</span>"#
    } else {
        ""
    };
    format!(
        r#"<label for="{}">{}{}</label>"#,
        escape_html(field.key()),
        escape_html(&field.display_label()),
        star
    )
}

fn trailer(field: &FieldDefinition) -> String {
    let mut html = String::new();
    if let Some(help) = &field.attributes().help_text {
        let _ = write!(html, r#"<p class="bp-help-text">{}</p>"#, escape_html(help));
    }
    let _ = write!(
        html,
        r#"<div class="bp-field-error" data-field="{}"></div></div>"#,
        escape_html(field.key())
    );
    html
}

fn common_attrs(field: &FieldDefinition) -> String {
    let attrs = field.attributes();
    let mut out = format!(
        r#" id="{key}" name="{key}""#,
        key = escape_html(field.key())
    );
    if let Some(placeholder) = &attrs.placeholder {
        let _ = write!(out, r#" placeholder="{}""#, escape_html(placeholder));
    }
    if field.is_required() {
        out.push_str(" required");
    }
    out
}

fn input(field: &FieldDefinition, value: Option<&Value>) -> String {
    let attrs = field.attributes();
    let mut html = format!(
        r#"<input type="{}"{}"#,
        field.kind().input_type(),
        common_attrs(field)
    );
    let _ = write!(html, r#" value="{}""#, escape_html(&value_text(value)));
    if let Some(n) = attrs.max_length {
        let _ = write!(html, r#" maxlength="{n}""#);
    }
    if let Some(n) = attrs.min_length {
        let _ = write!(html, r#" minlength="{n}""#);
    }
    if field.kind().is_numeric() {
        for (name, bound) in [("min", attrs.min), ("max", attrs.max), ("step", attrs.step)] {
            if let Some(bound) = bound {
                let _ = write!(html, r#" {name}="{bound}""#);
            }
        }
    }
    if let Some(pattern) = &attrs.pattern {
        let _ = write!(html, r#" pattern="{}""#, escape_html(pattern));
    }
    html.push_str(" />");
    html
}

fn textarea(field: &FieldDefinition, value: Option<&Value>) -> String {
    let rows = field.attributes().rows.unwrap_or(4);
    let editor = match field.kind() {
        FieldKind::Markdown => r#" data-editor="markdown""#,
        FieldKind::Wysiwyg => r#" data-editor="wysiwyg""#,
        _ => "",
    };
    format!(
        r#"<textarea{} rows="{rows}"{editor}>{}</textarea>"#,
        common_attrs(field),
        escape_html(&value_text(value))
    )
}

fn is_chosen(option: &FieldOption, value: Option<&Value>) -> bool {
    let wanted = option.value();
    match value {
        Some(Value::Array(items)) => items.iter().any(|v| value_text(Some(v)) == wanted),
        other => value_text(other) == wanted,
    }
}

fn select(field: &FieldDefinition, value: Option<&Value>) -> String {
    let attrs = field.attributes();
    let multiple = if attrs.multiple.unwrap_or(false) {
        " multiple"
    } else {
        ""
    };
    let mut html = format!("<select{}{multiple}>", common_attrs(field));
    let prompt = attrs.placeholder.as_deref().unwrap_or("Select...");
    let _ = write!(html, r#"<option value="">{}</option>"#, escape_html(prompt));
    for option in attrs.options.iter().flatten() {
        let selected = if is_chosen(option, value) { " selected" } else { "" };
        let _ = write!(
            html,
            r#"<option value="{}"{selected}>{}</option>"#,
            escape_html(&option.value()),
            escape_html(option.label())
        );
    }
    html.push_str("</select>");
    html
}

fn radio_group(field: &FieldDefinition, value: Option<&Value>) -> String {
    let key = escape_html(field.key());
    let class = match field.kind() {
        FieldKind::ButtonGroup => "bp-button-group",
        _ => "bp-radio-group",
    };
    let mut html = format!(r#"<div class="{class}" id="{key}">"#);
    for option in field.attributes().options.iter().flatten() {
        let checked = if is_chosen(option, value) { " checked" } else { "" };
        let _ = write!(
            html,
            r#"<label><input type="radio" name="{key}" value="{}"{checked} /> {}</label>"#,
            escape_html(&option.value()),
            escape_html(option.label())
        );
    }
    html.push_str("</div>");
    html
}

fn checkbox(field: &FieldDefinition, value: Option<&Value>) -> String {
    let checked = match value {
        Some(Value::String(s)) => matches!(s.as_str(), "1" | "true" | "on" | "yes"),
        Some(other) => !rules::is_empty(other) && *other != Value::from(0),
        None => false,
    };
    format!(
        r#"<label><input type="checkbox"{} value="1"{} /> {}</label>"#,
        common_attrs(field),
        if checked { " checked" } else { "" },
        escape_html(&field.display_label())
    )
}

fn js_placeholder(field: &FieldDefinition, value: Option<&Value>) -> String {
    format!(
        r#"<div class="bp-js-field" data-type="{}" data-field="{}" data-value="{}"><p class="bp-help-text">{JS_REQUIRED}</p></div>"#,
        field.kind().as_str(),
        escape_html(field.key()),
        escape_html(&value_text(value))
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::attributes::{FieldOption, SortableChildrenConfig};

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn text_input_has_label_star_and_error_slot() {
        let field = FieldDefinition::new("text", "title")
            .label("Title")
            .required(true)
            .max_length(50);
        let html = render_field(&field, Some(&json!("Printer <jam>")));
        assert!(html.starts_with(r#"<div class="bp-field bp-field-text">"#));
        assert!(html.contains(r#"<label for="title">Title <span class="bp-required">*</span></label>"#));
        assert!(html.contains(r#"value="Printer &lt;jam&gt;""#));
        assert!(html.contains(r#"maxlength="50""#));
        assert!(html.contains(" required"));
        assert!(html.contains(r#"<div class="bp-field-error" data-field="title"></div>"#));
    }

    #[test]
    fn select_marks_current_option() {
        let field = FieldDefinition::new("select", "priority").options([
            FieldOption::from("low"),
            FieldOption::labeled("High", "high"),
        ]);
        let html = render_field(&field, Some(&json!("high")));
        assert!(html.contains(r#"<option value="">Select...</option>"#));
        assert!(html.contains(r#"<option value="low">low</option>"#));
        assert!(html.contains(r#"<option value="high" selected>High</option>"#));
    }

    #[test]
    fn default_fills_missing_value() {
        let field = FieldDefinition::new("select", "status")
            .options(["open", "closed"])
            .default_value("open");
        let html = render_field(&field, None);
        assert!(html.contains(r#"<option value="open" selected>open</option>"#));
    }

    #[test]
    fn checkbox_reflects_truthiness() {
        let field = FieldDefinition::new("checkbox", "urgent");
        assert!(render_field(&field, Some(&json!(true))).contains(" checked"));
        assert!(render_field(&field, Some(&json!("1"))).contains(" checked"));
        assert!(!render_field(&field, Some(&json!(false))).contains(" checked"));
        assert!(!render_field(&field, Some(&json!(0))).contains(" checked"));
    }

    #[test]
    fn hidden_renders_bare_input() {
        let field = FieldDefinition::new("hidden", "ticket_id");
        assert_eq!(
            render_field(&field, Some(&json!(7))),
            r#"<input type="hidden" id="ticket_id" name="ticket_id" value="7" />"#
        );
    }

    #[test]
    fn textarea_uses_rows_and_editor() {
        let mut attrs = crate::FieldAttributes::default();
        attrs.rows = Some(8);
        let field = FieldDefinition::new("markdown", "body").attributes_from(attrs);
        let html = render_field(&field, Some(&json!("# hi")));
        assert!(html.contains(r#"rows="8" data-editor="markdown">"#));
        assert!(html.contains("># hi</textarea>"));
    }

    #[test]
    fn input_group_wraps_prepend_and_append() {
        let field = FieldDefinition::new("number", "price").prepend("$").append("USD");
        let html = render_field(&field, None);
        assert!(html.contains(r#"<div class="bp-input-group"><span class="bp-prepend">$</span><input type="number""#));
        assert!(html.contains(r#"<span class="bp-append">USD</span></div>"#));
    }

    #[test]
    fn sortable_children_placeholder_carries_config() {
        let config = SortableChildrenConfig::new("/api/replies", "ticket_id").unwrap();
        let field = FieldDefinition::new("sortable_children", "replies").sortable_children(config);
        let html = field.render(None);
        assert!(html.contains("bp-sortable-children-placeholder"));
        assert!(html.contains("&quot;filterBy&quot;:&quot;ticket_id&quot;"));
        assert!(html.contains(JS_REQUIRED));
    }
}
