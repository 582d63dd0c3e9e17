//! Pytest test-file rendering.
//!
//! A generated file has three ownership zones: the metadata header, the
//! user-owned body (imports, helpers, happy path) and the machine-owned
//! negative region between the marker lines. Only the first and last are
//! ever regenerated.

use crate::header::{render_header, HeaderFields};
use crate::ir::{Endpoint, ResponseBody, SchemaKind, SchemaRef};
use crate::mutation::{synthesize, MutationCase, SecurityCase};
use crate::render::filename::test_stem;
use crate::render::markers::wrap_region;
use crate::render::python::{python_literal, quote};
use serde_json::Value;

pub const DEFAULT_BASE_URL_ENV: &str = "API_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const TOKEN_ENV: &str = "API_TOKEN";
const PATH_PARAM_PLACEHOLDER: &str = "1";

/// Settings that shape the rendered body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    /// Environment variable that overrides the base URL at test time
    pub base_url_env: String,
    pub default_base_url: String,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            base_url_env: DEFAULT_BASE_URL_ENV.to_string(),
            default_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Full content of a new test file.
pub fn render_test_file(
    endpoint: &Endpoint,
    negative: &[MutationCase],
    security: &[SecurityCase],
    header: &HeaderFields,
    ctx: &RenderContext,
) -> String {
    let mut out = render_header(header);
    out.push('\n');
    out.push_str(&render_preamble(endpoint, ctx));
    out.push_str("\n\n");
    out.push_str(&render_happy_path(endpoint));
    out.push_str("\n\n");
    out.push_str(&wrap_region(&render_negative_region(
        endpoint, negative, security,
    )));
    out
}

fn render_preamble(endpoint: &Endpoint, ctx: &RenderContext) -> String {
    let mut out = String::new();
    out.push_str("import os\n\nimport requests\n\n");
    out.push_str(&format!(
        "BASE_URL = os.environ.get({}, {}).rstrip(\"/\")\n",
        quote(&ctx.base_url_env),
        quote(&ctx.default_base_url)
    ));
    out.push_str(&format!(
        "AUTH_TOKEN = os.environ.get({}, \"\")\n",
        quote(TOKEN_ENV)
    ));
    out.push_str(&format!("METHOD = {}\n", quote(endpoint.id.method())));
    out.push_str(&format!("PATH = {}\n", quote(endpoint.id.path())));

    let params = path_params(endpoint.id.path());
    if params.is_empty() {
        out.push_str("PATH_PARAMS = {}\n");
    } else {
        out.push_str("PATH_PARAMS = {\n");
        for name in params {
            out.push_str(&format!(
                "    {}: {},\n",
                quote(name),
                quote(PATH_PARAM_PLACEHOLDER)
            ));
        }
        out.push_str("}\n");
    }

    out.push_str("\n\ndef _url():\n");
    out.push_str("    url = PATH\n");
    out.push_str("    for name, value in PATH_PARAMS.items():\n");
    out.push_str("        url = url.replace(\"{\" + name + \"}\", str(value))\n");
    out.push_str("    return BASE_URL + url\n");

    out.push_str("\n\ndef _headers(token=AUTH_TOKEN):\n");
    out.push_str("    return {\"Authorization\": f\"Bearer {token}\"} if token else {}\n");
    out
}

fn render_happy_path(endpoint: &Endpoint) -> String {
    let stem = test_stem(&endpoint.id);
    let mut out = format!("def {stem}_happy_path():\n");

    let payload = endpoint.request_schema.as_ref().map(synthesize);
    out.push_str(&request_lines(payload.as_ref(), "_headers()"));

    match endpoint.success_status() {
        Some(status) if status.len() == 3 && status.chars().all(|c| c.is_ascii_digit()) => {
            out.push_str(&format!("    assert response.status_code == {status}\n"));
        }
        _ => out.push_str("    assert 200 <= response.status_code < 300\n"),
    }

    if let Some(ResponseBody::Json(schema)) = endpoint
        .success_status()
        .and_then(|status| endpoint.responses.get(status))
    {
        out.push_str(&shape_assertions(schema));
    }
    out
}

fn request_lines(payload: Option<&Value>, headers: &str) -> String {
    match payload {
        Some(payload) => format!(
            "    payload = {}\n    response = requests.request(METHOD, _url(), json=payload, headers={headers}, timeout=10)\n",
            python_literal(payload)
        ),
        None => format!(
            "    response = requests.request(METHOD, _url(), headers={headers}, timeout=10)\n"
        ),
    }
}

fn shape_assertions(schema: &SchemaRef) -> String {
    let python_type = match &schema.kind {
        SchemaKind::Object { .. } => "dict",
        SchemaKind::Array { .. } => "list",
        SchemaKind::String => "str",
        SchemaKind::Integer => "int",
        SchemaKind::Number => "(int, float)",
        SchemaKind::Boolean => "bool",
        _ => return String::new(),
    };

    let mut out = String::from("    body = response.json()\n");
    if schema.nullable {
        out.push_str(&format!(
            "    assert body is None or isinstance(body, {python_type})\n"
        ));
        return out;
    }
    out.push_str(&format!("    assert isinstance(body, {python_type})\n"));
    if let SchemaKind::Object { required, .. } = &schema.kind {
        for name in required {
            out.push_str(&format!("    assert {} in body\n", quote(name)));
        }
    }
    out
}

/// Inside of the machine-owned region: one function per case.
pub fn render_negative_region(
    endpoint: &Endpoint,
    negative: &[MutationCase],
    security: &[SecurityCase],
) -> String {
    let stem = test_stem(&endpoint.id);
    let mut blocks: Vec<String> = Vec::new();

    for case in negative {
        let mut block = format!("def {stem}_{}():\n", case.id);
        block.push_str(&format!("    # {}\n", single_line(&case.expectation.reason)));
        block.push_str(&request_lines(Some(&case.payload), "_headers()"));
        block.push_str(&format!(
            "    assert response.status_code in {}\n",
            status_tuple(&case.expectation.statuses)
        ));
        if let Some(error_body) = &case.expectation.error_body {
            block.push_str("    body = response.json()\n");
            for field in &error_body.required_fields {
                block.push_str(&format!("    assert {} in body\n", quote(field)));
            }
        }
        blocks.push(block);
    }

    let payload = endpoint.request_schema.as_ref().map(synthesize);
    for case in security {
        let headers = match &case.token {
            None => "{}".to_string(),
            Some(token) => format!("_headers({})", quote(token)),
        };
        let mut block = format!("def {stem}_{}():\n", case.id);
        block.push_str(&format!("    # {}\n", single_line(&case.reason)));
        block.push_str(&request_lines(payload.as_ref(), &headers));
        block.push_str(&format!(
            "    assert response.status_code in {}\n",
            status_tuple(&case.statuses)
        ));
        blocks.push(block);
    }

    if blocks.is_empty() {
        return "# No negative cases for this endpoint.\n".to_string();
    }
    format!("\n{}\n", blocks.join("\n\n"))
}

fn status_tuple(statuses: &[u16]) -> String {
    let inner: Vec<String> = statuses.iter().map(u16::to_string).collect();
    format!("({})", inner.join(", "))
}

fn single_line(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

/// `{name}` segments of a path template, in order of appearance.
fn path_params(path: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        let name = &rest[open + 1..open + close];
        if !name.is_empty() && !params.contains(&name) {
            params.push(name);
        }
        rest = &rest[open + close + 1..];
    }
    params
}
