//! Hand-written position-tracking parser for the text KeyValues grammar.

use std::collections::BTreeMap;

use crate::{VdfError, VdfNode};

/// Parses KeyValues text into a block node.
///
/// The top level is treated as an implicit block body, so a conventional
/// manifest with a single `"AppState" { ... }` root and a bare sequence of
/// pairs both parse. CRLF and LF inputs parse identically; trailing
/// whitespace is ignored. Duplicate keys keep the last occurrence.
pub fn parse(text: &str) -> Result<VdfNode, VdfError> {
    let mut parser = Parser {
        text,
        data: text.as_bytes(),
        pos: 0,
    };
    let map = parser.block_body(None)?;
    Ok(VdfNode::Block(map))
}

enum Token {
    /// Quoted string plus the offset of its opening quote.
    Str(String, usize),
    Open(usize),
    Close(usize),
    Eof,
}

struct Parser<'a> {
    text: &'a str,
    data: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    /// Parses a sequence of key/value pairs until the block closes.
    ///
    /// `opened_at` is the offset of the opening brace, or `None` for the
    /// implicit top-level block (which ends at EOF instead of `}`).
    fn block_body(&mut self, opened_at: Option<usize>) -> Result<BTreeMap<String, VdfNode>, VdfError> {
        let mut map = BTreeMap::new();

        loop {
            match self.next_token()? {
                Token::Eof => {
                    return match opened_at {
                        None => Ok(map),
                        Some(offset) => Err(VdfError::UnclosedBlock(offset)),
                    };
                }
                Token::Close(offset) => {
                    return match opened_at {
                        None => Err(VdfError::UnbalancedBrace(offset)),
                        Some(_) => Ok(map),
                    };
                }
                Token::Open(offset) => {
                    return Err(VdfError::UnexpectedToken {
                        offset,
                        found: '{',
                    });
                }
                Token::Str(key, key_offset) => {
                    let node = match self.next_token()? {
                        Token::Str(value, _) => VdfNode::Value(value),
                        Token::Open(open_offset) => {
                            VdfNode::Block(self.block_body(Some(open_offset))?)
                        }
                        Token::Close(_) | Token::Eof => {
                            return Err(VdfError::MissingValue {
                                key,
                                offset: key_offset,
                            });
                        }
                    };
                    // Last occurrence wins.
                    map.insert(key, node);
                }
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, VdfError> {
        while self.pos < self.data.len() && self.data[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        if self.pos >= self.data.len() {
            return Ok(Token::Eof);
        }

        let start = self.pos;
        match self.data[start] {
            b'"' => {
                let s = self.read_quoted(start)?;
                Ok(Token::Str(s, start))
            }
            b'{' => {
                self.pos += 1;
                Ok(Token::Open(start))
            }
            b'}' => {
                self.pos += 1;
                Ok(Token::Close(start))
            }
            _ => {
                // The offending byte may start a multi-byte character;
                // report the full character, not its first byte.
                let found = self.text[start..].chars().next().unwrap_or('\u{fffd}');
                Err(VdfError::UnexpectedToken {
                    offset: start,
                    found,
                })
            }
        }
    }

    /// Reads a double-quoted string starting at `start`, resolving `\"` and
    /// `\\` escapes. Any other backslash pair is kept verbatim.
    fn read_quoted(&mut self, start: usize) -> Result<String, VdfError> {
        debug_assert_eq!(self.data[start], b'"');
        let mut out: Vec<u8> = Vec::new();
        let mut i = start + 1;

        while i < self.data.len() {
            match self.data[i] {
                b'"' => {
                    self.pos = i + 1;
                    return Ok(String::from_utf8_lossy(&out).into_owned());
                }
                b'\\' if i + 1 < self.data.len() => {
                    let next = self.data[i + 1];
                    if next == b'"' || next == b'\\' {
                        out.push(next);
                    } else {
                        out.push(b'\\');
                        out.push(next);
                    }
                    i += 2;
                }
                b => {
                    out.push(b);
                    i += 1;
                }
            }
        }

        Err(VdfError::UnterminatedString(start))
    }
}
