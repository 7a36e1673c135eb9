// Table loader: reads summarized article rows from CSV or JSON files.
//
// The summarization stage writes a table with `Id`, `Summary` and `Link`
// columns. Column names are matched case-insensitively and extra columns
// are ignored, so the same loader reads both its CSV and JSON dumps.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use super::models::ArticleRow;
use crate::error::SchemaError;

const ID_COLUMN: &str = "id";
const SUMMARY_COLUMN: &str = "summary";
const LINK_COLUMN: &str = "link";

/// Load raw rows from a `.csv` or `.json` file.
///
/// `limit` keeps only the first N rows (handy for cheap trial runs).
pub fn load_rows(path: &Path, limit: Option<usize>) -> Result<Vec<ArticleRow>, SchemaError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let mut rows = match extension.as_deref() {
        Some("csv") => read_csv(File::open(path)?)?,
        Some("json") => read_json(File::open(path)?)?,
        _ => {
            return Err(SchemaError::Format(format!(
                "{} (expected .csv or .json)",
                path.display()
            )))
        }
    };

    if let Some(limit) = limit {
        rows.truncate(limit);
    }

    debug!(path = %path.display(), rows = rows.len(), "Loaded article rows");
    Ok(rows)
}

/// Parse CSV with a header row.
pub fn read_csv<R: std::io::Read>(reader: R) -> Result<Vec<ArticleRow>, SchemaError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| SchemaError::Decode(e.to_string()))?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
    let (id_col, summary_col, link_col) = (column(ID_COLUMN), column(SUMMARY_COLUMN), column(LINK_COLUMN));

    if summary_col.is_none() {
        return Err(SchemaError::Decode(format!(
            "no {SUMMARY_COLUMN:?} column in header"
        )));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SchemaError::Decode(e.to_string()))?;
        let field = |col: Option<usize>| col.and_then(|i| record.get(i)).map(str::to_string);
        rows.push(ArticleRow {
            id: field(id_col),
            summary: field(summary_col),
            link: field(link_col),
        });
    }
    Ok(rows)
}

/// Parse a JSON array of row objects.
pub fn read_json<R: std::io::Read>(reader: R) -> Result<Vec<ArticleRow>, SchemaError> {
    let objects: Vec<Map<String, Value>> = serde_json::from_reader(BufReader::new(reader))
        .map_err(|e| SchemaError::Decode(e.to_string()))?;

    Ok(objects
        .iter()
        .map(|obj| ArticleRow {
            id: lookup(obj, ID_COLUMN),
            summary: lookup(obj, SUMMARY_COLUMN),
            link: lookup(obj, LINK_COLUMN),
        })
        .collect())
}

/// Case-insensitive key lookup. Numbers are stringified so integer ids
/// from a dataframe dump join the same way as string ids.
fn lookup(obj: &Map<String, Value>, key: &str) -> Option<String> {
    let value = obj
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)?;
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_headers_match_case_insensitively() {
        let data = "Id,Title,Summary,Link\n0,t,Eye exams,https://x/0\n1,t,Fiber,\n";
        let rows = read_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id.as_deref(), Some("0"));
        assert_eq!(rows[0].summary.as_deref(), Some("Eye exams"));
        assert_eq!(rows[0].link.as_deref(), Some("https://x/0"));
        assert_eq!(rows[1].link.as_deref(), Some(""));
    }

    #[test]
    fn csv_without_link_column() {
        let rows = read_csv("id,summary\n5,Sunglasses\n".as_bytes()).unwrap();
        assert_eq!(rows[0].link, None);
    }

    #[test]
    fn csv_without_summary_column_is_rejected() {
        let err = read_csv("id,title\n5,x\n".as_bytes()).unwrap_err();
        assert!(matches!(err, SchemaError::Decode(_)));
    }

    #[test]
    fn json_numeric_ids_are_stringified() {
        let data = r#"[{"Id": 3, "Summary": "Vitamins", "Link": null}, {"id": "4", "summary": "Cardio"}]"#;
        let rows = read_json(data.as_bytes()).unwrap();
        assert_eq!(rows[0].id.as_deref(), Some("3"));
        assert_eq!(rows[0].link, None);
        assert_eq!(rows[1].id.as_deref(), Some("4"));
        assert_eq!(rows[1].summary.as_deref(), Some("Cardio"));
    }

    #[test]
    fn json_that_is_not_an_array_fails() {
        let err = read_json(r#"{"Id": 1}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, SchemaError::Decode(_)));
    }

    #[test]
    fn unknown_extension_is_a_format_error() {
        let err = load_rows(Path::new("articles.parquet"), None).unwrap_err();
        assert!(matches!(err, SchemaError::Format(_)));
    }
}
