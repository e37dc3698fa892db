//!
//! Raw multipart/form-data decoder
//! -------------------------------
//! Decodes file parts out of a fully buffered request body. This is
//! intentionally not an RFC-complete MIME parser: nested multipart,
//! transfer encodings and header folding are out of scope and degrade to
//! "part skipped", never to an error. Plain form fields (no filename
//! attribute) are ignored; only file parts are extracted.

/// One uploaded file recovered from a multipart body. Discarded as soon as
/// its content has been written to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPart {
    pub filename: String,
    pub content: Vec<u8>,
}

const DISPOSITION_MARKER: &[u8] = b"Content-Disposition: form-data";
const HEADER_BODY_SEP: &[u8] = b"\r\n\r\n";

/// Find `needle` in `haystack` starting at `from`.
fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() { return None; }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Extract the value of the `filename="..."` attribute from a header block,
/// decoded as plain text. Returns None when the attribute is absent or
/// unterminated.
fn extract_filename(headers: &[u8]) -> Option<String> {
    let marker = b"filename=\"";
    let start = find(headers, marker, 0)? + marker.len();
    let end = find(headers, b"\"", start)?;
    Some(String::from_utf8_lossy(&headers[start..end]).into_owned())
}

/// Decode all file parts from `body` using the boundary token taken from the
/// Content-Type header (quotes already stripped by the caller).
///
/// Parts come back in their order of appearance. Malformed input -- no
/// boundary occurrences, no valid Content-Disposition segment, a segment
/// with no blank-line separator -- yields an empty vector; "no files" is a
/// valid result, not an error.
pub fn decode(body: &[u8], boundary: &str) -> Vec<UploadedPart> {
    let delimiter = {
        let mut d = Vec::with_capacity(boundary.len() + 2);
        d.extend_from_slice(b"--");
        d.extend_from_slice(boundary.as_bytes());
        d
    };

    // Collect the spans between consecutive delimiter occurrences. The span
    // before the first delimiter is the preamble; the span after the last is
    // either the terminating "--" or trailing junk. Both get filtered out
    // below by the Content-Disposition check.
    let mut segments: Vec<&[u8]> = Vec::new();
    let mut cursor = 0usize;
    let mut prev_end: Option<usize> = None;
    while let Some(pos) = find(body, &delimiter, cursor) {
        if let Some(end) = prev_end {
            segments.push(&body[end..pos]);
        }
        prev_end = Some(pos + delimiter.len());
        cursor = pos + delimiter.len();
    }
    if let Some(end) = prev_end {
        segments.push(&body[end..]);
    }

    let mut parts = Vec::new();
    for segment in segments {
        if find(segment, DISPOSITION_MARKER, 0).is_none() {
            continue;
        }
        // Header block and body are separated by the first blank line.
        let Some(sep) = find(segment, HEADER_BODY_SEP, 0) else {
            continue; // malformed segment, not fatal
        };
        let headers = &segment[..sep];
        let Some(filename) = extract_filename(headers) else {
            continue; // not a file part
        };
        if filename.is_empty() {
            continue; // empty-filename file inputs produce no part
        }
        let mut content = &segment[sep + HEADER_BODY_SEP.len()..];
        // The CRLF immediately preceding the next boundary belongs to the
        // framing, not the payload.
        if content.ends_with(b"\r\n") {
            content = &content[..content.len() - 2];
        }
        parts.push(UploadedPart { filename, content: content.to_vec() });
    }
    parts
}
