use crate::encoded::{parse_param, Builder, Encoded, FeedResult};
use crate::labels::is_valid_label;
use crate::opcodes;

/// Splits one line of source into whitespace-separated tokens, pairing each
/// with the 1-based column its first character occupies. Byte offsets are
/// used directly as columns; source is assumed to be single-byte-per-glyph
/// assembly text, matching the rest of the tokenizer's column reporting.
pub fn split_line(line: &str) -> Vec<(&str, u32)> {
    let mut tokens = Vec::new();
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        tokens.push((&line[start..i], (start + 1) as u32));
    }
    tokens
}

/// What a [`Tokenizer::feed`] call produced.
pub enum FeedOutcome {
    /// Token consumed; nothing to emit yet.
    Nothing,
    /// An encoded label or instruction is ready.
    Emit(Encoded),
}

/// A lexeme that cannot be accepted at its current position. `column_offset`
/// is added to the triggering token's own starting column by the caller
/// (the parser knows the absolute line), so that arity violations can point
/// just past the last accepted token rather than at its start.
#[derive(Debug)]
pub struct TokenError {
    pub token: String,
    pub column_offset: u32,
}

impl TokenError {
    fn at(token: &str) -> TokenError {
        TokenError {
            token: token.to_string(),
            column_offset: 0,
        }
    }
}

/// Stateful whitespace-token consumer. Tracks whether a line comment is
/// active and accumulates parameters for whichever instruction is currently
/// being built.
pub struct Tokenizer {
    line_comment: bool,
    current: Option<Builder>,
}

impl Tokenizer {
    pub fn new() -> Tokenizer {
        Tokenizer {
            line_comment: false,
            current: None,
        }
    }

    /// Resets the line-comment flag; call once per source line fed.
    pub fn new_line(&mut self) {
        self.line_comment = false;
    }

    /// True if an instruction is still missing required parameters after
    /// all input has been fed — the EOF-mid-instruction case.
    pub fn incomplete(&self) -> bool {
        matches!(&self.current, Some(b) if !b.is_satisfied())
    }

    /// Takes whatever instruction is pending, if any. Call only after
    /// confirming [`Tokenizer::incomplete`] is false.
    pub fn take_remaining(&mut self) -> Option<Encoded> {
        self.current.take().map(|b| Encoded::Instr(b.finish()))
    }

    pub fn feed(&mut self, raw: &str) -> Result<FeedOutcome, TokenError> {
        if self.line_comment {
            return Ok(FeedOutcome::Nothing);
        }
        if self.current.is_none() && raw == "//" {
            self.line_comment = true;
            return Ok(FeedOutcome::Nothing);
        }
        let (body, final_token) = if let Some(rest) = raw.strip_suffix(';') {
            (rest, true)
        } else if let Some(rest) = raw.strip_suffix(',') {
            (rest, false)
        } else {
            (raw, false)
        };

        if body.is_empty() && !final_token {
            return Ok(FeedOutcome::Nothing);
        }

        if self.current.is_some() {
            self.feed_param(body, final_token)
        } else {
            self.feed_opcode_or_label(body, final_token)
        }
    }

    fn feed_opcode_or_label(&mut self, body: &str, final_token: bool) -> Result<FeedOutcome, TokenError> {
        if let Some((kind, min, max)) = opcodes::lookup(body) {
            let mut builder = Builder::new(kind, min, max);
            if final_token {
                return if builder.is_satisfied() {
                    Ok(FeedOutcome::Emit(Encoded::Instr(builder.finish())))
                } else {
                    Err(TokenError {
                        token: ";".to_string(),
                        column_offset: body.len() as u32,
                    })
                };
            }
            self.current = Some(builder);
            Ok(FeedOutcome::Nothing)
        } else {
            match body.strip_suffix(':') {
                Some(name) if !name.is_empty() && is_valid_label(name) => {
                    Ok(FeedOutcome::Emit(Encoded::Label(name.to_string())))
                }
                _ => Err(TokenError::at(body)),
            }
        }
    }

    fn feed_param(&mut self, body: &str, final_token: bool) -> Result<FeedOutcome, TokenError> {
        let builder = self.current.as_mut().expect("feed_param requires a builder");

        if body.is_empty() {
            // A bare `;` (no parameter attached this token): finalize now if
            // arity already allows it, otherwise this is the
            // too-few-parameters error. The offending `;` sits right where
            // this empty body starts, so the offset is zero.
            return if final_token {
                if builder.is_satisfied() {
                    let builder = self.current.take().unwrap();
                    Ok(FeedOutcome::Emit(Encoded::Instr(builder.finish())))
                } else {
                    Err(TokenError {
                        token: ";".to_string(),
                        column_offset: 0,
                    })
                }
            } else {
                Ok(FeedOutcome::Nothing)
            };
        }

        let param = parse_param(body).map_err(|_| TokenError::at(body))?;
        match builder.feed(param) {
            FeedResult::AcceptedFinished => {
                let builder = self.current.take().unwrap();
                Ok(FeedOutcome::Emit(Encoded::Instr(builder.finish())))
            }
            FeedResult::Accepted => {
                if final_token {
                    if builder.is_satisfied() {
                        let builder = self.current.take().unwrap();
                        Ok(FeedOutcome::Emit(Encoded::Instr(builder.finish())))
                    } else {
                        Err(TokenError {
                            token: ";".to_string(),
                            column_offset: body.len() as u32,
                        })
                    }
                } else {
                    Ok(FeedOutcome::Nothing)
                }
            }
            FeedResult::Full => unreachable!("builder is taken as soon as it reaches max arity"),
        }
    }
}

impl Default for Tokenizer {
    fn default() -> Tokenizer {
        Tokenizer::new()
    }
}
