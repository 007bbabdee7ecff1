use std::{
    fmt::Display,
    sync::{LazyLock, RwLock},
};

use nu_ansi_term::Color;
use querist_db::Row;
use serde_json::Value;

pub static COLOR: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let color = COLOR.read().unwrap();
        if *color {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}

/// Renders a row as `column: value` pairs separated by ` | `.
///
/// Strings print without quotes; everything else prints as JSON.
pub fn format_row(row: &Row) -> String {
    row.iter()
        .map(|(column, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{}: {value}", Colored(Color::Cyan, column))
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_format_row() {
        *COLOR.write().unwrap() = false;
        let row = json!({"id": 1, "name": "soar", "size": null});
        let row = row.as_object().unwrap();
        assert_eq!(format_row(row), "id: 1 | name: soar | size: null");
    }

    #[test]
    fn test_format_empty_row() {
        assert_eq!(format_row(&Row::new()), "");
    }
}
