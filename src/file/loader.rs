//! Document loading.
//!
//! Rows and schemas are read from JSON, JSON Lines or YAML files, optionally
//! gzip-compressed, or from stdin. The format comes from the file name
//! (ignoring a trailing `.gz`); stdin is sniffed.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::document::schema_tree::SchemaTree;
use crate::document::value_tree::ValueTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    JsonLines,
    Yaml,
}

/// Picks the format from the file name. Unknown extensions are read as JSON.
///
/// ```
/// use treeaccess::file::loader::{detect_format, Format};
///
/// assert_eq!(detect_format("rows.yaml.gz"), Format::Yaml);
/// assert_eq!(detect_format("rows.ndjson"), Format::JsonLines);
/// assert_eq!(detect_format("rows.json"), Format::Json);
/// ```
pub fn detect_format<P: AsRef<Path>>(path: P) -> Format {
    let path_str = path.as_ref().to_string_lossy();
    let base = path_str.strip_suffix(".gz").unwrap_or(&path_str);
    if base.ends_with(".jsonl") || base.ends_with(".ndjson") {
        Format::JsonLines
    } else if base.ends_with(".yaml") || base.ends_with(".yml") {
        Format::Yaml
    } else {
        Format::Json
    }
}

fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz")
        .unwrap_or(false)
}

/// Parses text in the given format into a JSON value. JSON Lines become an
/// array with one item per non-blank line.
pub fn parse_content(content: &str, format: Format) -> Result<Value> {
    match format {
        Format::Json => serde_json::from_str(content).context("Failed to parse JSON"),
        Format::Yaml => serde_yaml::from_str(content).context("Failed to parse YAML"),
        Format::JsonLines => {
            let mut lines = Vec::new();
            for (line_num, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let value: Value = serde_json::from_str(line)
                    .with_context(|| format!("Invalid JSON on line {}", line_num + 1))?;
                lines.push(value);
            }
            if lines.is_empty() {
                anyhow::bail!("No valid JSON found in JSONL content");
            }
            Ok(Value::Array(lines))
        }
    }
}

/// Reads a document from disk.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Value> {
    let path_ref = path.as_ref();
    let content = if is_gzipped(path_ref) {
        read_gzipped_file(path_ref)?
    } else {
        fs::read_to_string(path_ref)
            .with_context(|| format!("Failed to read {}", path_ref.display()))?
    };
    parse_content(&content, detect_format(path_ref))
}

/// Reads a document from stdin, trying JSON, then JSON Lines, then YAML.
pub fn load_document_from_stdin() -> Result<Value> {
    use std::io::{self, Read};

    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .context("Failed to read from stdin")?;
    let content = if buffer.starts_with(&[0x1f, 0x8b]) {
        decompress_gzip_bytes(&buffer)?
    } else {
        String::from_utf8(buffer).context("Invalid UTF-8 in stdin")?
    };
    sniff_content(&content)
}

/// Parses text of unknown format.
pub fn sniff_content(content: &str) -> Result<Value> {
    if let Ok(value) = parse_content(content, Format::Json) {
        return Ok(value);
    }
    if let Ok(value) = parse_content(content, Format::JsonLines) {
        return Ok(value);
    }
    parse_content(content, Format::Yaml)
        .context("Input is neither valid JSON, JSON Lines nor YAML")
}

/// Loads a row document.
pub fn load_rows<P: AsRef<Path>>(path: P) -> Result<ValueTree> {
    Ok(ValueTree::from_json(&load_document(path)?))
}

/// Loads a schema document. The table id is taken from the file name
/// (`orders.schema.json` and `orders.json` both give `orders`).
pub fn load_schema<P: AsRef<Path>>(path: P) -> Result<SchemaTree> {
    let path_ref = path.as_ref();
    let document = load_document(path_ref)?;
    schema_from_value(&table_id_from_path(path_ref), &document)
}

pub fn schema_from_value(table_id: &str, document: &Value) -> Result<SchemaTree> {
    SchemaTree::from_json_schema(table_id, document).context("Failed to build schema")
}

/// Table id implied by a file name.
pub fn table_id_from_path(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    name.split('.').next().unwrap_or_default().to_string()
}

fn read_gzipped_file(path: &Path) -> Result<String> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let file = fs::File::open(path).context("Failed to open gzipped file")?;
    let mut decoder = GzDecoder::new(file);
    let mut content = String::new();
    decoder
        .read_to_string(&mut content)
        .context("Failed to decompress gzipped file - file may be corrupted")?;
    Ok(content)
}

fn decompress_gzip_bytes(bytes: &[u8]) -> Result<String> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let mut decoder = GzDecoder::new(bytes);
    let mut content = String::new();
    decoder
        .read_to_string(&mut content)
        .context("Failed to decompress gzipped stdin")?;
    Ok(content)
}
