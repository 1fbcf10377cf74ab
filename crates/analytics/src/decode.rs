//! Reading analytics strings back into construct usage.
//!
//! Inverse of the encoder: strips the `v2:<format>:` header, inflates
//! `deflate64` payloads, then expands the `{}`/`,` prefix grouping.
//!
//! A top-level entry whose text before its first `{` contains `!` opens a
//! new version group (version = text up to the first `!`); top-level entries
//! without one are further roots of the current group. The list carries no
//! escaping, so a root-level FQN with `!` anywhere before its first branching
//! point reads back as a version group of its own, and FQNs or versions
//! containing `{`, `}` or `,` do not read back at all.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::read::GzDecoder;
use std::io::Read;

use crate::config::DEFAULT_MAX_DECODED_BYTES;
use crate::error::{AnalyticsError, Result};
use crate::types::{ConstructInfo, EncodedAnalytics, PayloadFormat};

/// Decode a tagged analytics string with the default size limit
pub fn decode_analytics(analytics: &str) -> Result<Vec<ConstructInfo>> {
    let encoded: EncodedAnalytics = analytics.parse()?;
    decode_payload(&encoded, DEFAULT_MAX_DECODED_BYTES)
}

/// Decode an already-parsed payload, inflating at most `max_bytes`
pub fn decode_payload(
    encoded: &EncodedAnalytics,
    max_bytes: usize,
) -> Result<Vec<ConstructInfo>> {
    match encoded.format {
        PayloadFormat::Plaintext => parse_prefix_encoded_list(&encoded.payload),
        PayloadFormat::Deflate64 => {
            let compressed = STANDARD.decode(encoded.payload.as_bytes())?;
            let text = gunzip_with_limit(&compressed, max_bytes)?;
            parse_prefix_encoded_list(&text)
        }
    }
}

fn gunzip_with_limit(bytes: &[u8], max_len: usize) -> Result<String> {
    let decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .take(max_len.saturating_add(1) as u64)
        .read_to_end(&mut out)?;
    if out.len() > max_len {
        return Err(AnalyticsError::PayloadTooLarge { limit: max_len });
    }
    String::from_utf8(out).map_err(|_| AnalyticsError::InvalidUtf8)
}

/// Expand a prefix-encoded list into `(fqn, version)` pairs in encounter order
pub fn parse_prefix_encoded_list(input: &str) -> Result<Vec<ConstructInfo>> {
    let mut out = Vec::new();
    if input.is_empty() {
        return Ok(out);
    }

    let mut parser = Parser::new(input);
    let mut version: Option<&str> = None;
    loop {
        let start = parser.pos;
        let mut text = parser.take_text();
        if let Some((group_version, rest)) = text.split_once('!') {
            version = Some(group_version);
            text = rest;
        }
        let Some(group) = version else {
            return Err(AnalyticsError::malformed(
                start,
                "entry appears before any version group",
            ));
        };

        let mut prefix = text.to_string();
        let mut fqns = Vec::new();
        parser.parse_node(&mut prefix, &mut fqns)?;
        out.extend(fqns.into_iter().map(|fqn| ConstructInfo::new(fqn, group)));

        match parser.bump() {
            None => break,
            Some(b',') => {}
            Some(other) => {
                return Err(AnalyticsError::malformed(
                    parser.pos - 1,
                    format!("unexpected '{}' at top level", other as char),
                ));
            }
        }
    }
    Ok(out)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    /// Token text up to the next structural character
    fn take_text(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if matches!(byte, b'{' | b',' | b'}') {
                break;
            }
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// `prefix` already holds this entry's text; expand any `{...}` groups after it
    ///
    /// Each open group remembers the prefix length its children start from.
    fn parse_node(&mut self, prefix: &mut String, out: &mut Vec<String>) -> Result<()> {
        let mut marks: Vec<usize> = Vec::new();
        loop {
            if self.peek() == Some(b'{') {
                self.pos += 1;
                marks.push(prefix.len());
                prefix.push_str(self.take_text());
                continue;
            }
            out.push(prefix.clone());

            loop {
                let Some(&mark) = marks.last() else {
                    return Ok(());
                };
                match self.bump() {
                    Some(b',') => {
                        prefix.truncate(mark);
                        prefix.push_str(self.take_text());
                        break;
                    }
                    Some(b'}') => {
                        marks.pop();
                    }
                    Some(other) => {
                        return Err(AnalyticsError::malformed(
                            self.pos - 1,
                            format!("expected ',' or '}}', found '{}'", other as char),
                        ));
                    }
                    None => return Err(AnalyticsError::malformed(self.pos, "unclosed '{'")),
                }
            }
        }
    }
}
