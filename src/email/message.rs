//! E-mail envelope parsing
//!
//! Pragmatic RFC 822 / MIME handling: unfold headers, walk multipart
//! bodies recursively, undo transfer encodings. That is exactly as much
//! structure as the classifier needs, so heavyweight message dependencies
//! stay out on purpose. Malformed structure degrades to whatever text can
//! still be recovered; only an envelope with no header line at all is
//! rejected.

use base64::{engine::general_purpose, Engine as _};

use crate::error::{PipelineError, PipelineResult};

/// Multipart nesting depth past which parts are kept as opaque leaves
const MAX_NESTING_DEPTH: usize = 8;

/// One node of the parsed message tree
#[derive(Debug, Clone)]
pub struct MessagePart {
    /// Unfolded headers, names lowercased
    headers: Vec<(String, String)>,
    /// Raw body bytes before transfer decoding; cleared on containers
    body: Vec<u8>,
    children: Vec<MessagePart>,
}

/// Parse raw envelope bytes into a message tree.
///
/// Fails only when the input carries no header line before its first blank
/// line, i.e. it is not a message at all.
pub fn parse_message(raw: &[u8]) -> PipelineResult<MessagePart> {
    let root = parse_part(raw, 0);
    if root.headers.is_empty() {
        return Err(PipelineError::InvalidInput(
            "no message headers found".to_string(),
        ));
    }
    Ok(root)
}

impl MessagePart {
    /// First header with the given name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        let wanted = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(n, _)| *n == wanted)
            .map(|(_, v)| v.as_str())
    }

    /// Media type without parameters, lowercased; `text/plain` when absent
    pub fn content_type(&self) -> String {
        self.header("content-type")
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "text/plain".to_string())
    }

    /// Declared charset parameter, if any
    pub fn charset(&self) -> Option<String> {
        self.content_type_param("charset")
    }

    pub fn is_multipart(&self) -> bool {
        self.content_type().starts_with("multipart/")
    }

    /// True when the node has no child parts (containers that failed to
    /// split keep their raw body and count as leaves)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    /// Body bytes after undoing the Content-Transfer-Encoding
    pub fn decoded_body(&self) -> Vec<u8> {
        decode_transfer(self.header("content-transfer-encoding"), &self.body)
    }

    /// Depth-first walk over this part and every descendant
    pub fn walk(&self) -> Vec<&MessagePart> {
        let mut nodes = vec![self];
        for child in &self.children {
            nodes.extend(child.walk());
        }
        nodes
    }

    fn content_type_param(&self, key: &str) -> Option<String> {
        let value = self.header("content-type")?;
        for piece in value.split(';').skip(1) {
            if let Some((k, v)) = piece.split_once('=') {
                if k.trim().eq_ignore_ascii_case(key) {
                    return Some(v.trim().trim_matches('"').to_string());
                }
            }
        }
        None
    }
}

// ============================================================================
// PARSING
// ============================================================================

fn parse_part(raw: &[u8], depth: usize) -> MessagePart {
    let (header_block, body) = split_header_block(raw);
    let mut part = MessagePart {
        headers: parse_headers(header_block),
        body: body.to_vec(),
        children: Vec::new(),
    };

    if depth < MAX_NESTING_DEPTH && part.is_multipart() {
        if let Some(boundary) = part.content_type_param("boundary") {
            let chunks = split_multipart(&part.body, &boundary);
            if !chunks.is_empty() {
                part.children = chunks
                    .iter()
                    .map(|chunk| parse_part(chunk, depth + 1))
                    .collect();
                part.body = Vec::new();
            }
        }
    }

    part
}

/// Split the header block from the body at the first blank line
fn split_header_block(raw: &[u8]) -> (&[u8], &[u8]) {
    let mut pos = 0;
    while pos < raw.len() {
        let line_end = raw[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| pos + i)
            .unwrap_or(raw.len());
        let line = strip_cr(&raw[pos..line_end]);
        if line.is_empty() {
            let body_start = (line_end + 1).min(raw.len());
            return (&raw[..pos], &raw[body_start..]);
        }
        pos = line_end + 1;
    }
    (raw, &[])
}

/// Parse and unfold the header block; malformed lines are skipped
fn parse_headers(block: &[u8]) -> Vec<(String, String)> {
    let text = String::from_utf8_lossy(block);
    let mut headers: Vec<(String, String)> = Vec::new();

    for line in text.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            // continuation of the previous header value
            if let Some(last) = headers.last_mut() {
                last.1.push(' ');
                last.1.push_str(line.trim());
            }
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if !name.is_empty() && !name.contains(char::is_whitespace) {
                headers.push((name.to_ascii_lowercase(), value.trim().to_string()));
            }
        }
    }

    headers
}

/// Split a multipart body into its delimited chunks.
///
/// Preamble and epilogue lines outside the delimiters are dropped, as is
/// the line ending convention (parts are rejoined with `\n`).
fn split_multipart(body: &[u8], boundary: &str) -> Vec<Vec<u8>> {
    let open = format!("--{}", boundary);
    let close = format!("--{}--", boundary);

    let mut parts: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<Vec<u8>> = None;

    for raw_line in body.split(|&b| b == b'\n') {
        let line = strip_cr(raw_line);
        if line == close.as_bytes() {
            if let Some(done) = current.take() {
                parts.push(finish_chunk(done));
            }
            break;
        }
        if line == open.as_bytes() {
            if let Some(done) = current.take() {
                parts.push(finish_chunk(done));
            }
            current = Some(Vec::new());
            continue;
        }
        if let Some(buf) = current.as_mut() {
            buf.extend_from_slice(line);
            buf.push(b'\n');
        }
    }

    if let Some(done) = current.take() {
        parts.push(finish_chunk(done));
    }
    parts
}

/// Drop the newline the delimiter line owns
fn finish_chunk(mut chunk: Vec<u8>) -> Vec<u8> {
    if chunk.last() == Some(&b'\n') {
        chunk.pop();
    }
    chunk
}

fn strip_cr(line: &[u8]) -> &[u8] {
    match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    }
}

// ============================================================================
// TRANSFER ENCODINGS
// ============================================================================

fn decode_transfer(encoding: Option<&str>, body: &[u8]) -> Vec<u8> {
    match encoding.map(|e| e.trim().to_ascii_lowercase()).as_deref() {
        Some("base64") => decode_base64(body),
        Some("quoted-printable") => decode_quoted_printable(body),
        // 7bit, 8bit, binary or absent: bytes pass through untouched
        _ => body.to_vec(),
    }
}

fn decode_base64(body: &[u8]) -> Vec<u8> {
    let mut filtered: Vec<u8> = body
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    while filtered.len() % 4 != 0 {
        filtered.push(b'=');
    }
    match general_purpose::STANDARD.decode(&filtered) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::debug!("Base64 body did not decode ({}), keeping raw bytes", e);
            body.to_vec()
        }
    }
}

fn decode_quoted_printable(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len());
    let mut i = 0;
    while i < body.len() {
        if body[i] != b'=' {
            out.push(body[i]);
            i += 1;
            continue;
        }
        // soft line break
        if body.get(i + 1) == Some(&b'\n') {
            i += 2;
            continue;
        }
        if body.get(i + 1) == Some(&b'\r') && body.get(i + 2) == Some(&b'\n') {
            i += 3;
            continue;
        }
        match (
            body.get(i + 1).and_then(hex_value),
            body.get(i + 2).and_then(hex_value),
        ) {
            (Some(hi), Some(lo)) => {
                out.push(hi * 16 + lo);
                i += 3;
            }
            // malformed escape kept literally
            _ => {
                out.push(b'=');
                i += 1;
            }
        }
    }
    out
}

fn hex_value(b: &u8) -> Option<u8> {
    (*b as char).to_digit(16).map(|v| v as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &[u8] = b"From: alerts@example.com\r\n\
Subject: Action required\r\n\
\r\n\
Verify your account now\r\n";

    #[test]
    fn test_simple_message() {
        let msg = parse_message(SIMPLE).unwrap();
        assert_eq!(msg.header("subject"), Some("Action required"));
        assert_eq!(msg.content_type(), "text/plain");
        assert!(msg.is_leaf());
        assert_eq!(msg.decoded_body(), b"Verify your account now\r\n");
    }

    #[test]
    fn test_header_unfolding() {
        let raw = b"Subject: first\n second\nFrom: a@b.c\n\nbody";
        let msg = parse_message(raw).unwrap();
        assert_eq!(msg.header("subject"), Some("first second"));
    }

    #[test]
    fn test_headerless_input_is_rejected() {
        let err = parse_message(b"just some text without any header\n\nmore").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn test_multipart_walk() {
        let raw = b"From: a@b.c\n\
Content-Type: multipart/alternative; boundary=\"XYZ\"\n\
\n\
preamble is ignored\n\
--XYZ\n\
Content-Type: text/plain\n\
\n\
plain body\n\
--XYZ\n\
Content-Type: text/html\n\
\n\
<p>html body</p>\n\
--XYZ--\n";
        let msg = parse_message(raw).unwrap();
        assert!(msg.is_multipart());
        assert!(!msg.is_leaf());
        let nodes = msg.walk();
        assert_eq!(nodes.len(), 3);
        let plain: Vec<_> = nodes
            .iter()
            .filter(|p| p.content_type() == "text/plain")
            .collect();
        assert_eq!(plain.len(), 1);
        assert_eq!(plain[0].decoded_body(), b"plain body");
    }

    #[test]
    fn test_nested_multipart() {
        let raw = b"From: a@b.c\n\
Content-Type: multipart/mixed; boundary=outer\n\
\n\
--outer\n\
Content-Type: multipart/alternative; boundary=inner\n\
\n\
--inner\n\
Content-Type: text/plain\n\
\n\
inner text\n\
--inner--\n\
--outer--\n";
        let msg = parse_message(raw).unwrap();
        let texts: Vec<_> = msg
            .walk()
            .into_iter()
            .filter(|p| p.content_type() == "text/plain")
            .map(|p| p.decoded_body())
            .collect();
        assert_eq!(texts, vec![b"inner text".to_vec()]);
    }

    #[test]
    fn test_base64_body() {
        // "urgent wire transfer"
        let raw = b"From: a@b.c\n\
Content-Transfer-Encoding: base64\n\
\n\
dXJnZW50IHdpcmUg\ndHJhbnNmZXI=\n";
        let msg = parse_message(raw).unwrap();
        assert_eq!(msg.decoded_body(), b"urgent wire transfer");
    }

    #[test]
    fn test_broken_base64_keeps_raw_bytes() {
        let raw = b"From: a@b.c\nContent-Transfer-Encoding: base64\n\n!!!not base64!!!\n";
        let msg = parse_message(raw).unwrap();
        assert_eq!(msg.decoded_body(), b"!!!not base64!!!\n");
    }

    #[test]
    fn test_quoted_printable_body() {
        let raw = b"From: a@b.c\n\
Content-Transfer-Encoding: quoted-printable\n\
\n\
caf=C3=A9 menu=\non one line";
        let msg = parse_message(raw).unwrap();
        assert_eq!(msg.decoded_body(), "caf\u{e9} menuon one line".as_bytes());
    }

    #[test]
    fn test_charset_parameter() {
        let raw = b"Content-Type: text/plain; charset=\"ISO-8859-1\"\n\nhi";
        let msg = parse_message(raw).unwrap();
        assert_eq!(msg.charset().as_deref(), Some("ISO-8859-1"));
    }

    #[test]
    fn test_multipart_without_terminator_still_splits() {
        let raw = b"Content-Type: multipart/mixed; boundary=q\n\n--q\n\nonly part\n";
        let msg = parse_message(raw).unwrap();
        assert_eq!(msg.walk().len(), 2);
    }

    #[test]
    fn test_multipart_without_boundary_stays_leaf() {
        let raw = b"Content-Type: multipart/mixed\n\nopaque\n";
        let msg = parse_message(raw).unwrap();
        assert!(msg.is_leaf());
        assert!(msg.has_body());
    }
}
