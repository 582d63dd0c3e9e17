//! Metadata header codec.
//!
//! Both the scanner and the generator go through this module, so the
//! persisted layout is defined exactly once:
//!
//! ```text
//! # apitestgen: generated test file. Metadata lines are rewritten on regeneration.
//! # endpoint_id: POST /users
//! # request_schema_hash: <64 hex | none>
//! # response_schema_hash[201]: <64 hex>
//! # last_generated: 2026-01-01T00:00:00Z
//! ```
//!
//! The header region is the longest prefix of lines that are either the
//! title line or a recognised metadata line. Everything after it belongs to
//! the body and is never touched by header replacement.

use crate::ir::{Endpoint, EndpointId, SchemaHash};
use crate::metadata::TestFileMetadata;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const TITLE_LINE: &str =
    "# apitestgen: generated test file. Metadata lines are rewritten on regeneration.";

const COMMENT_PREFIX: &str = "# ";
const TAG_ENDPOINT_ID: &str = "endpoint_id";
const TAG_REQUEST_HASH: &str = "request_schema_hash";
const TAG_RESPONSE_HASH: &str = "response_schema_hash";
const TAG_LAST_GENERATED: &str = "last_generated";
const NO_BODY: &str = "none";

/// Values carried by a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFields {
    pub endpoint_id: EndpointId,
    pub request_schema_hash: Option<SchemaHash>,
    pub response_schema_hashes: BTreeMap<String, SchemaHash>,
    /// Always whole seconds, so the rendered form round-trips
    pub last_generated: DateTime<Utc>,
}

impl HeaderFields {
    /// Header describing the current contract state of an endpoint.
    pub fn for_endpoint(endpoint: &Endpoint, generated_at: DateTime<Utc>) -> Self {
        Self {
            endpoint_id: endpoint.id.clone(),
            request_schema_hash: endpoint.request_hash(),
            response_schema_hashes: endpoint.response_hashes(),
            last_generated: generated_at.trunc_subsecs(0),
        }
    }

    pub fn into_metadata(self, file_path: impl Into<PathBuf>) -> TestFileMetadata {
        TestFileMetadata {
            endpoint_id: self.endpoint_id,
            request_schema_hash: self.request_schema_hash,
            response_schema_hashes: self.response_schema_hashes,
            last_generated: self.last_generated,
            file_path: file_path.into(),
        }
    }
}

/// Outcome of reading the top of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderParse {
    /// No `endpoint_id` line: a foreign file, never patched or deleted
    Unmanaged,
    /// Managed, but the header cannot be trusted
    Malformed(String),
    Parsed(HeaderFields),
}

/// Render the header block, terminated by a newline.
pub fn render_header(fields: &HeaderFields) -> String {
    let mut out = String::new();
    out.push_str(TITLE_LINE);
    out.push('\n');
    out.push_str(&format!("# {TAG_ENDPOINT_ID}: {}\n", fields.endpoint_id));
    out.push_str(&format!(
        "# {TAG_REQUEST_HASH}: {}\n",
        fields
            .request_schema_hash
            .as_ref()
            .map(SchemaHash::as_str)
            .unwrap_or(NO_BODY)
    ));
    for (status, hash) in &fields.response_schema_hashes {
        out.push_str(&format!("# {TAG_RESPONSE_HASH}[{status}]: {hash}\n"));
    }
    out.push_str(&format!(
        "# {TAG_LAST_GENERATED}: {}\n",
        fields
            .last_generated
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    out
}

/// A metadata line split into tag and value.
enum HeaderLine<'a> {
    Title,
    Tag { tag: &'a str, value: &'a str },
}

fn classify_line(line: &str) -> Option<HeaderLine<'_>> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line == TITLE_LINE {
        return Some(HeaderLine::Title);
    }
    let body = line.strip_prefix(COMMENT_PREFIX)?;
    let (tag, value) = body.split_once(':')?;
    let known = tag == TAG_ENDPOINT_ID
        || tag == TAG_REQUEST_HASH
        || tag == TAG_LAST_GENERATED
        || response_status(tag).is_some();
    known.then(|| HeaderLine::Tag {
        tag,
        value: value.trim(),
    })
}

/// `response_schema_hash[201]` -> `201`
fn response_status(tag: &str) -> Option<&str> {
    let status = tag
        .strip_prefix(TAG_RESPONSE_HASH)?
        .strip_prefix('[')?
        .strip_suffix(']')?;
    (!status.is_empty() && !status.contains(char::is_whitespace)).then_some(status)
}

/// Byte length of the header region at the start of `content`.
pub fn header_region_len(content: &str) -> usize {
    content
        .split_inclusive('\n')
        .take_while(|line| classify_line(line).is_some())
        .map(str::len)
        .sum()
}

/// Read the header of a file.
pub fn parse_header(content: &str) -> HeaderParse {
    let region = &content[..header_region_len(content)];

    let mut endpoint_id: Option<&str> = None;
    let mut request_hash: Option<&str> = None;
    let mut last_generated: Option<&str> = None;
    let mut responses: BTreeMap<String, &str> = BTreeMap::new();
    let mut duplicate: Option<String> = None;

    for line in region.split_inclusive('\n') {
        let Some(HeaderLine::Tag { tag, value }) = classify_line(line) else {
            continue;
        };
        let slot = match tag {
            TAG_ENDPOINT_ID => &mut endpoint_id,
            TAG_REQUEST_HASH => &mut request_hash,
            TAG_LAST_GENERATED => &mut last_generated,
            _ => {
                if let Some(status) = response_status(tag) {
                    if responses.insert(status.to_string(), value).is_some() {
                        duplicate.get_or_insert_with(|| tag.to_string());
                    }
                }
                continue;
            }
        };
        if slot.replace(value).is_some() {
            duplicate.get_or_insert_with(|| tag.to_string());
        }
    }

    let Some(endpoint_raw) = endpoint_id else {
        return HeaderParse::Unmanaged;
    };
    if let Some(tag) = duplicate {
        return HeaderParse::Malformed(format!("tag '{tag}' appears more than once"));
    }
    let Some(endpoint_id) = EndpointId::parse(endpoint_raw) else {
        return HeaderParse::Malformed(format!("unparseable endpoint_id '{endpoint_raw}'"));
    };

    let request_schema_hash = match request_hash {
        None => return HeaderParse::Malformed(format!("missing {TAG_REQUEST_HASH}")),
        Some(NO_BODY) => None,
        Some(raw) => match SchemaHash::parse(raw) {
            Some(hash) => Some(hash),
            None => {
                return HeaderParse::Malformed(format!("unparseable {TAG_REQUEST_HASH} '{raw}'"))
            }
        },
    };

    let mut response_schema_hashes = BTreeMap::new();
    for (status, raw) in responses {
        match SchemaHash::parse(raw) {
            Some(hash) => {
                response_schema_hashes.insert(status, hash);
            }
            None => {
                return HeaderParse::Malformed(format!(
                    "unparseable {TAG_RESPONSE_HASH}[{status}] '{raw}'"
                ))
            }
        }
    }

    let last_generated = match last_generated.map(DateTime::parse_from_rfc3339) {
        None => return HeaderParse::Malformed(format!("missing {TAG_LAST_GENERATED}")),
        Some(Err(e)) => {
            return HeaderParse::Malformed(format!("unparseable {TAG_LAST_GENERATED}: {e}"))
        }
        Some(Ok(ts)) => ts.with_timezone(&Utc),
    };

    HeaderParse::Parsed(HeaderFields {
        endpoint_id,
        request_schema_hash,
        response_schema_hashes,
        last_generated,
    })
}

/// Swap the header region of `content` for a freshly rendered header,
/// leaving every following byte as it was.
pub fn replace_header(content: &str, fields: &HeaderFields) -> String {
    let body = &content[header_region_len(content)..];
    let mut out = render_header(fields);
    out.push_str(body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{build_hash, ResponseBody, SchemaRef};
    use chrono::TimeZone;

    fn fields() -> HeaderFields {
        let endpoint = Endpoint::new("POST", "/users")
            .with_request(SchemaRef::object(
                vec![("name", SchemaRef::string())],
                vec!["name"],
            ))
            .with_response("201", ResponseBody::Json(SchemaRef::string()))
            .with_response("204", ResponseBody::Empty);
        HeaderFields::for_endpoint(
            &endpoint,
            Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        )
    }

    #[test]
    fn test_render_then_parse_round_trips() {
        let fields = fields();
        let rendered = render_header(&fields);
        assert_eq!(parse_header(&rendered), HeaderParse::Parsed(fields));
    }

    #[test]
    fn test_rendered_layout() {
        let rendered = render_header(&fields());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], TITLE_LINE);
        assert_eq!(lines[1], "# endpoint_id: POST /users");
        assert!(lines[2].starts_with("# request_schema_hash: "));
        assert!(lines[3].starts_with("# response_schema_hash[201]: "));
        assert!(lines[4].starts_with("# response_schema_hash[204]: "));
        assert_eq!(lines[5], "# last_generated: 2026-01-02T03:04:05Z");
    }

    #[test]
    fn test_no_request_body_is_none() {
        let endpoint = Endpoint::new("GET", "/users");
        let fields = HeaderFields::for_endpoint(&endpoint, Utc::now());
        let rendered = render_header(&fields);
        assert!(rendered.contains("# request_schema_hash: none\n"));
        match parse_header(&rendered) {
            HeaderParse::Parsed(parsed) => assert_eq!(parsed.request_schema_hash, None),
            other => panic!("expected parsed header, got {other:?}"),
        }
    }

    #[test]
    fn test_file_without_endpoint_id_is_unmanaged() {
        assert_eq!(
            parse_header("# conftest helpers\nimport pytest\n"),
            HeaderParse::Unmanaged
        );
        assert_eq!(parse_header(""), HeaderParse::Unmanaged);
    }

    #[test]
    fn test_endpoint_id_after_body_is_ignored() {
        let content = "import os\n# endpoint_id: GET /users\n";
        assert_eq!(parse_header(content), HeaderParse::Unmanaged);
    }

    #[test]
    fn test_missing_last_generated_is_malformed() {
        let content = "# endpoint_id: GET /users\n# request_schema_hash: none\n\nimport os\n";
        assert!(
            matches!(parse_header(content), HeaderParse::Malformed(m) if m.contains("last_generated"))
        );
    }

    #[test]
    fn test_bad_hash_is_malformed() {
        let content = "# endpoint_id: GET /users\n# request_schema_hash: xyz\n# last_generated: 2026-01-01T00:00:00Z\n";
        assert!(matches!(parse_header(content), HeaderParse::Malformed(_)));
    }

    #[test]
    fn test_duplicate_tag_is_malformed() {
        let hash = build_hash(&SchemaRef::string());
        let content = format!(
            "# endpoint_id: GET /a\n# endpoint_id: GET /b\n# request_schema_hash: {hash}\n# last_generated: 2026-01-01T00:00:00Z\n"
        );
        assert!(matches!(parse_header(&content), HeaderParse::Malformed(m) if m.contains("endpoint_id")));
    }

    #[test]
    fn test_replace_header_keeps_body_bytes() {
        let old = fields();
        let body = "\n# my own note\nimport os\r\n\ndef test_x():\n    assert True\n";
        let content = format!("{}{}", render_header(&old), body);

        let mut new = old.clone();
        new.last_generated = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();
        new.response_schema_hashes.remove("204");
        let replaced = replace_header(&content, &new);

        assert!(replaced.ends_with(body));
        assert_eq!(parse_header(&replaced), HeaderParse::Parsed(new));
    }

    #[test]
    fn test_user_comment_directly_after_header_is_body() {
        let header = render_header(&fields());
        let content = format!("{header}# reviewed by QA\n");
        assert_eq!(header_region_len(&content), header.len());
    }
}
