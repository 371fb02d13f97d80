//! Response interpretation for file endpoints.

use crate::error::ApiError;
use crate::http::HttpResponse;

/// A binary payload together with the name the server suggested for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDownload {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl FileDownload {
    pub fn filename_or(&self, fallback: impl Into<String>) -> String {
        self.filename.clone().unwrap_or_else(|| fallback.into())
    }

    /// Settle the file name, using `fallback` when the server sent none.
    pub fn into_report(self, fallback: impl Into<String>) -> Report {
        let filename = self.filename_or(fallback);
        Report {
            filename,
            bytes: self.bytes,
            content_type: self.content_type,
        }
    }
}

/// A downloaded report ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Classify a file-endpoint response.
///
/// A JSON body on success is reported as an error: file endpoints answer
/// JSON only when they could not produce the file.
pub fn parse_blob_response(response: HttpResponse) -> Result<FileDownload, ApiError> {
    if !response.is_success() {
        return Err(ApiError::Http {
            status: response.status,
            message: response.text(),
            errors: None,
        });
    }
    if response.is_json() {
        return Err(ApiError::UnexpectedJson {
            body: response.text(),
        });
    }

    let filename = response
        .header("content-disposition")
        .and_then(content_disposition_filename);
    let content_type = response.content_type().map(str::to_string);
    Ok(FileDownload {
        bytes: response.body,
        filename,
        content_type,
    })
}

/// Suggested file name from a `Content-Disposition` header value.
///
/// `filename*=UTF-8''…` (percent-encoded) wins over `filename=`, which may be
/// quoted or a bare token.
pub fn content_disposition_filename(header: &str) -> Option<String> {
    let params: Vec<(String, String)> = split_params(header)
        .into_iter()
        .skip(1)
        .filter_map(|p| p.split_once('='))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), unquote(v.trim())))
        .collect();

    let extended = params
        .iter()
        .find(|(k, _)| k == "filename*")
        .and_then(|(_, v)| strip_utf8_prefix(v))
        .and_then(|encoded| urlencoding::decode(encoded).ok().map(|s| s.into_owned()));
    if let Some(name) = extended.filter(|n| !n.is_empty()) {
        return Some(name);
    }

    params
        .into_iter()
        .find(|(k, _)| k == "filename")
        .map(|(_, v)| v)
        .filter(|n| !n.is_empty())
}

/// Split on `;` outside quoted strings.
fn split_params(header: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in header.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                parts.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&header[start..]);
    parts
}

/// Strip the quotes of a quoted-string and resolve its backslash escapes.
fn unquote(value: &str) -> String {
    let Some(inner) = value.strip_prefix('"') else {
        return value.to_string();
    };
    let inner = inner.strip_suffix('"').unwrap_or(inner);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

fn strip_utf8_prefix(value: &str) -> Option<&str> {
    let (charset, rest) = value.split_once('\'')?;
    if !charset.eq_ignore_ascii_case("utf-8") {
        return None;
    }
    // The language tag between the two quotes is ignored.
    let (_, encoded) = rest.split_once('\'')?;
    Some(encoded)
}
