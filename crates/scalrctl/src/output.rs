use anyhow::Result;
use comfy_table::Table;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

pub fn print_output<T: Serialize>(data: T, format: OutputFormat) -> Result<()> {
    let json_value = serde_json::to_value(data)?;
    println!("{}", render(&json_value, format)?);
    Ok(())
}

/// Render a value in the given format, without a trailing newline
pub fn render(value: &Value, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?.trim_end().to_string(),
        OutputFormat::Table => render_table(value),
    };
    Ok(rendered)
}

/// Arrays of objects become one row per object, a single object becomes
/// key/value rows, anything else is printed as-is
pub fn render_table(value: &Value) -> String {
    match value {
        Value::Array(arr) if !arr.is_empty() => {
            let mut table = Table::new();

            if let Value::Object(first) = &arr[0] {
                let headers: Vec<String> = first.keys().cloned().collect();
                table.set_header(&headers);

                for item in arr {
                    if let Value::Object(obj) = item {
                        let row: Vec<String> = headers
                            .iter()
                            .map(|h| format_value(obj.get(h).unwrap_or(&Value::Null)))
                            .collect();
                        table.add_row(row);
                    }
                }
            } else {
                table.set_header(vec!["Value"]);
                for item in arr {
                    table.add_row(vec![format_value(item)]);
                }
            }

            table.to_string()
        }
        Value::Object(obj) => {
            let mut table = Table::new();
            table.set_header(vec!["Key", "Value"]);

            for (key, val) in obj {
                table.add_row(vec![key.clone(), format_value(val)]);
            }

            table.to_string()
        }
        _ => format_value(value),
    }
}

/// Cell text for a value
///
/// Related records collapse to their ID so that embedded resources stay
/// readable in a table.
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(arr) if arr.is_empty() => "-".to_string(),
        Value::Array(arr) if arr.iter().all(|v| related_id(v).is_some()) => arr
            .iter()
            .filter_map(related_id)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(_) => match related_id(value) {
            Some(id) => id.to_string(),
            None => format!("{{{} fields}}", value.as_object().map_or(0, |o| o.len())),
        },
    }
}

fn related_id(value: &Value) -> Option<&str> {
    value.get("id").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn related_records_collapse_to_ids() {
        assert_eq!(format_value(&json!({"id": "env-1"})), "env-1");
        assert_eq!(
            format_value(&json!([{"id": "user-1", "resource": {"email": "a@b"}}, {"id": "user-2"}])),
            "user-1, user-2"
        );
        assert_eq!(format_value(&json!([])), "-");
        assert_eq!(format_value(&json!(null)), "-");
        assert_eq!(format_value(&json!({"a": 1, "b": 2})), "{2 fields}");
        assert_eq!(format_value(&json!([1, 2, 3])), "[3 items]");
    }

    #[test]
    fn table_has_one_row_per_item() {
        let rendered = render_table(&json!([
            {"id": "ws-1", "name": "app", "auto_apply": true},
            {"id": "ws-2", "name": "db", "auto_apply": false}
        ]));
        assert!(rendered.contains("ws-1"));
        assert!(rendered.contains("db"));
        assert!(rendered.contains("auto_apply"));
    }

    #[test]
    fn object_renders_as_key_value_rows() {
        let rendered = render_table(&json!({"name": "work", "address": "https://example.scalr.io"}));
        assert!(rendered.contains("Key"));
        assert!(rendered.contains("https://example.scalr.io"));
    }

    #[test]
    fn yaml_has_no_trailing_newline() {
        let rendered = render(&json!({"name": "work"}), OutputFormat::Yaml).unwrap();
        assert_eq!(rendered, "name: work");
    }
}
