use crate::definition::FieldDefinition;

/// `CREATE TABLE` for a collection: an auto-increment id, one column per
/// stored field in the order given, and the two timestamp columns.
/// `charset_collate` is appended verbatim after the closing parenthesis.
pub fn create_table_sql(table: &str, fields: &[FieldDefinition], charset_collate: &str) -> String {
    let mut lines = vec!["id bigint(20) unsigned NOT NULL AUTO_INCREMENT".to_string()];
    lines.extend(
        fields
            .iter()
            .filter_map(FieldDefinition::column_definition)
            .map(|column| column.to_string()),
    );
    lines.push("created_at timestamp NULL DEFAULT NULL".into());
    lines.push("updated_at timestamp NULL DEFAULT NULL".into());
    lines.push("PRIMARY KEY (id)".into());

    let body = lines.join(",\n  ");
    let suffix = charset_collate.trim();
    if suffix.is_empty() {
        format!("CREATE TABLE {table} (\n  {body}\n);")
    } else {
        format!("CREATE TABLE {table} (\n  {body}\n) {suffix};")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::SortableChildrenConfig;

    #[test]
    fn fixed_shape_around_field_columns() {
        let fields = vec![
            FieldDefinition::new("text", "title").required(true),
            FieldDefinition::new("textarea", "description"),
            FieldDefinition::new("sortable_children", "replies").sortable_children(
                SortableChildrenConfig::new("/api/replies", "ticket_id").unwrap(),
            ),
        ];
        let sql = create_table_sql("wp_tickets", &fields, "DEFAULT CHARSET=utf8mb4");
        assert_eq!(
            sql,
            "CREATE TABLE wp_tickets (\n  \
             id bigint(20) unsigned NOT NULL AUTO_INCREMENT,\n  \
             `title` VARCHAR(255) NOT NULL,\n  \
             `description` TEXT NULL,\n  \
             created_at timestamp NULL DEFAULT NULL,\n  \
             updated_at timestamp NULL DEFAULT NULL,\n  \
             PRIMARY KEY (id)\n\
             ) DEFAULT CHARSET=utf8mb4;"
        );
    }

    #[test]
    fn empty_collation_is_omitted() {
        let sql = create_table_sql("t", &[], "");
        assert!(sql.ends_with("PRIMARY KEY (id)\n);"));
    }
}
