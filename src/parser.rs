use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::trace;

use crate::error::{FinderError, Result};
use crate::metadata::Metadata;

/// Regex pattern for one network list entry
/// Format: cidr [key=value ...]
static ENTRY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^([0-9A-Fa-f:./]+)((?:\s+[\w.\-]+=(?:"[^"]*"|\S+))*)$"#)
        .expect("ENTRY_PATTERN: hardcoded regex is invalid")
});

/// Regex pattern for one `key=value` attribute
static ATTR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([\w.\-]+)=("[^"]*"|\S+)"#).expect("ATTR_PATTERN: hardcoded regex is invalid")
});

/// Maximum nesting depth for `file:` include directives.
const MAX_INCLUDE_DEPTH: usize = 10;

/// One parsed network list entry, before address parsing.
#[derive(Debug, Clone)]
pub struct NetworkEntry {
    /// CIDR text, `address[/length]`
    pub cidr: String,
    /// Attributes given on the line
    pub metadata: Metadata,
    /// Line number in the original text (for error reporting)
    pub line_num: usize,
}

/// Parse a network list.
///
/// Each line holds a CIDR optionally followed by `key=value` attributes.
/// Values that parse as JSON (`42`, `true`, `"quoted text"`) keep their JSON
/// type, anything else is stored as a string. Double-quoted values may hold
/// whitespace. `#` starts a comment, even inside quotes.
///
/// Supports `file: /path/to/networks.txt` directive to include entries from an external file.
pub fn parse_networks(text: &str) -> Result<Vec<NetworkEntry>> {
    parse_networks_inner(text, 0)
}

fn parse_networks_inner(text: &str, depth: usize) -> Result<Vec<NetworkEntry>> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(FinderError::ParseError(format!(
            "file include depth exceeds maximum ({MAX_INCLUDE_DEPTH}), possible circular include"
        )));
    }

    let mut entries = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        let line_num = line_num + 1; // 1-based line numbers

        // Remove comments and trim whitespace
        let line = match line.find('#') {
            Some(comment_pos) => &line[..comment_pos],
            None => line,
        };
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(path) = line.strip_prefix("file:") {
            let path = path.trim();
            entries.extend(parse_networks_from_file_inner(path, depth + 1)?);
            continue;
        }

        entries.push(parse_single_entry(line, line_num)?);
    }

    Ok(entries)
}

/// Parse a network list from a file.
pub fn parse_networks_from_file(path: impl AsRef<Path>) -> Result<Vec<NetworkEntry>> {
    parse_networks_from_file_inner(path, 0)
}

fn parse_networks_from_file_inner(path: impl AsRef<Path>, depth: usize) -> Result<Vec<NetworkEntry>> {
    let path = path.as_ref();
    trace!(path = %path.display(), depth, "reading network list");
    let text = fs::read_to_string(path).map_err(FinderError::IoError)?;
    parse_networks_inner(&text, depth)
}

fn parse_single_entry(line: &str, line_num: usize) -> Result<NetworkEntry> {
    let captures = ENTRY_PATTERN
        .captures(line)
        .ok_or_else(|| FinderError::ParseErrorAtLine {
            line: line_num,
            message: format!("Invalid entry format: {}", line),
        })?;

    let cidr = captures[1].to_string();
    let metadata = match captures.get(2) {
        Some(attrs) => ATTR_PATTERN
            .captures_iter(attrs.as_str())
            .map(|attr| (attr[1].to_string(), parse_value(&attr[2])))
            .collect::<Metadata>(),
        None => Metadata::new(),
    };

    Ok(NetworkEntry {
        cidr,
        metadata,
        line_num,
    })
}

fn parse_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_patterns_compile() {
        assert!(ENTRY_PATTERN.is_match("10.0.0.0/8"));
        assert!(ATTR_PATTERN.is_match("site=ams"));
    }

    #[test]
    fn test_parse_bare_entries() {
        let entries = parse_networks("10.0.0.0/8\nfd00::/16\n192.0.2.1").unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].cidr, "10.0.0.0/8");
        assert_eq!(entries[1].cidr, "fd00::/16");
        assert_eq!(entries[2].cidr, "192.0.2.1");
        assert!(entries[0].metadata.is_empty());
        assert_eq!(entries[2].line_num, 3);
    }

    #[test]
    fn test_parse_attributes() {
        let entries =
            parse_networks(r#"10.0.0.0/8 site=ams weight=10 primary=true owner="noc""#).unwrap();
        let meta = &entries[0].metadata;
        assert_eq!(meta.get("site").unwrap(), &json!("ams"));
        assert_eq!(meta.get("weight").unwrap(), &json!(10));
        assert_eq!(meta.get("primary").unwrap(), &json!(true));
        assert_eq!(meta.get("owner").unwrap(), &json!("noc"));
    }

    #[test]
    fn test_parse_quoted_value_with_whitespace() {
        let entries =
            parse_networks(r#"10.0.0.0/8 owner="noc team"  note="two  spaces" site=ams"#).unwrap();
        let meta = &entries[0].metadata;
        assert_eq!(meta.len(), 3);
        assert_eq!(meta.get("owner").unwrap(), &json!("noc team"));
        assert_eq!(meta.get("note").unwrap(), &json!("two  spaces"));
        assert_eq!(meta.get("site").unwrap(), &json!("ams"));

        // an unterminated quote falls back to a bare token
        let entries = parse_networks(r#"10.0.0.0/8 owner="noc"#).unwrap();
        assert_eq!(entries[0].metadata.get("owner").unwrap(), &json!("\"noc"));

        let err = parse_networks(r#"10.0.0.0/8 owner="noc team"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_parse_comments_and_blank_lines() {
        let text = r#"
# Core networks
10.0.0.0/8      # backbone

172.16.0.0/12 site=lab   # lab
"#;
        let entries = parse_networks(text).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].cidr, "10.0.0.0/8");
        assert_eq!(entries[0].line_num, 3);
        assert_eq!(entries[1].metadata.len(), 1);
    }

    #[test]
    fn test_parse_invalid_entry() {
        let err = parse_networks("10.0.0.0/8\nnot a network\n").unwrap_err();
        match err {
            FinderError::ParseErrorAtLine { line, .. } => assert_eq!(line, 2),
            other => panic!("expected ParseErrorAtLine, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_file_directive() {
        use std::io::Write;
        let dir = std::env::temp_dir().join("network_finder_parser_test");
        let _ = fs::create_dir_all(&dir);
        let file_path = dir.join("included.txt");
        let mut f = fs::File::create(&file_path).unwrap();
        writeln!(f, "10.0.0.0/8 site=ams").unwrap();
        writeln!(f, "10.1.0.0/16").unwrap();
        drop(f);

        let text = format!(
            "192.168.0.0/16\nfile: {}\n172.16.0.0/12",
            file_path.display()
        );
        let entries = parse_networks(&text).unwrap();
        let cidrs: Vec<&str> = entries.iter().map(|e| e.cidr.as_str()).collect();
        assert_eq!(
            cidrs,
            ["192.168.0.0/16", "10.0.0.0/8", "10.1.0.0/16", "172.16.0.0/12"]
        );

        let _ = fs::remove_file(&file_path);
        let _ = fs::remove_dir(&dir);
    }

    #[test]
    fn test_parse_file_directive_not_found() {
        let err = parse_networks("file: /nonexistent/path/networks.txt").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(matches!(err, FinderError::IoError(_)));
    }

    #[test]
    fn test_parse_circular_include() {
        use std::io::Write;
        let dir = std::env::temp_dir().join("network_finder_circular_test");
        let _ = fs::create_dir_all(&dir);
        let file_path = dir.join("self.txt");
        let mut f = fs::File::create(&file_path).unwrap();
        writeln!(f, "file: {}", file_path.display()).unwrap();
        drop(f);

        let err = parse_networks_from_file(&file_path).unwrap_err();
        assert!(err.to_string().contains("depth"), "got: {}", err);

        let _ = fs::remove_file(&file_path);
        let _ = fs::remove_dir(&dir);
    }
}
