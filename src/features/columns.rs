use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The frozen, order-sensitive list of engineered columns captured at training time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ColumnList", into = "Vec<String>")]
pub struct ColumnSchema {
    columns: Vec<String>,
}

/// On-disk shapes: a bare array, or `columns = [...]` for formats without top-level arrays
#[derive(Deserialize)]
#[serde(untagged)]
enum ColumnList {
    Bare(Vec<String>),
    Table { columns: Vec<String> },
}

impl TryFrom<ColumnList> for ColumnSchema {
    type Error = String;

    fn try_from(list: ColumnList) -> Result<Self, Self::Error> {
        let columns = match list {
            ColumnList::Bare(columns) | ColumnList::Table { columns } => columns,
        };
        ColumnSchema::new(columns)
    }
}

impl From<ColumnSchema> for Vec<String> {
    fn from(schema: ColumnSchema) -> Self {
        schema.columns
    }
}

impl ColumnSchema {
    /// Rejects empty lists, blank names, and duplicates
    pub fn new(columns: Vec<String>) -> Result<Self, String> {
        if columns.is_empty() {
            return Err("column list is empty".to_string());
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if column.trim().is_empty() {
                return Err("column list contains a blank name".to_string());
            }
            if !seen.insert(column.as_str()) {
                return Err(format!("column '{}' appears more than once", column));
            }
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|name| name == column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigFormat, ConfigParser};

    #[test]
    fn test_bare_and_table_shapes() {
        let bare: ColumnSchema =
            ConfigParser::parse_str(r#"["Age", "TotalSF"]"#, ConfigFormat::Json).unwrap();
        let table: ColumnSchema =
            ConfigParser::parse_str("columns = [\"Age\", \"TotalSF\"]", ConfigFormat::Toml)
                .unwrap();

        assert_eq!(bare, table);
        assert_eq!(bare.columns(), &["Age".to_string(), "TotalSF".to_string()]);
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let parsed: anyhow::Result<ColumnSchema> =
            ConfigParser::parse_str(r#"["Age", "Age"]"#, ConfigFormat::Json);
        let message = format!("{:#}", parsed.unwrap_err());
        assert!(message.contains("more than once"), "{}", message);
    }

    #[test]
    fn test_empty_list_is_rejected() {
        assert!(ColumnSchema::new(Vec::new()).is_err());
        assert!(ColumnSchema::new(vec![" ".to_string()]).is_err());
    }
}
