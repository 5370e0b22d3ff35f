//! Tokenizer for `stack:` lines.
//!
//! The emulator prints stacks as whitespace-separated words in which tuple
//! brackets are glued to their neighbours (`[1`, `2]]`) and a slice spans
//! five words (`CS{Cell{..}`, `bits:`, `a..b;`, `refs:`, `c..d}`). The
//! lexer undoes both, so the parser only sees brackets and whole values.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `[`, or the `(` of a single-element tuple `(x)`.
    Open,
    /// `]`, or the `)` of `(x)`.
    Close,
    /// `()`
    Null,
    /// `C{...}` or `Cont{...}`; the payload is hex.
    Cell { raw: String, boc_hex: String },
    Builder { raw: String, canonical_hex: String },
    Slice {
        raw: String,
        canonical_hex: String,
        bits: (u32, u32),
        refs: (u8, u8),
    },
    /// Anything else: integers, or text the parser will keep as unparsed.
    Word(String),
    /// A malformed slice annotation.
    Malformed { raw: String, reason: String },
}

fn parse_range<T: std::str::FromStr>(text: &str) -> Option<(T, T)> {
    let (start, end) = text.split_once("..")?;
    Some((start.parse().ok()?, end.parse().ok()?))
}

/// Split leading `[` and trailing `]` off a word.
fn peel(word: &str) -> (usize, &str, usize) {
    let inner = word.trim_start_matches('[');
    let core = inner.trim_end_matches(']');
    (word.len() - inner.len(), core, inner.len() - core.len())
}

/// `CS{Cell{<hex>}` followed by the four annotation words.
fn lex_slice(head: &str, words: &mut VecDeque<&str>) -> (Token, usize) {
    let mut raw = head.to_string();
    let mut annotation = Vec::with_capacity(4);
    let mut trailing = 0;
    while annotation.len() < 4 {
        let Some(word) = words.pop_front() else {
            break;
        };
        raw.push(' ');
        raw.push_str(word);
        if annotation.len() == 3 {
            let (_, core, closes) = peel(word);
            trailing = closes;
            annotation.push(core);
        } else {
            annotation.push(word);
        }
    }

    let canonical_hex = head
        .strip_prefix("CS{Cell{")
        .and_then(|rest| rest.strip_suffix('}'))
        .unwrap_or_default();
    let parsed = match annotation.as_slice() {
        ["bits:", bits, "refs:", refs] => bits
            .strip_suffix(';')
            .and_then(parse_range::<u32>)
            .zip(refs.strip_suffix('}').and_then(parse_range::<u8>)),
        _ => None,
    };

    let token = match parsed {
        Some((bits, refs)) if !canonical_hex.is_empty() => Token::Slice {
            raw,
            canonical_hex: canonical_hex.to_string(),
            bits,
            refs,
        },
        _ => Token::Malformed {
            raw,
            reason: "malformed slice annotation".to_string(),
        },
    };
    (token, trailing)
}

fn lex_value(core: &str, tokens: &mut Vec<Token>) {
    if core == "()" {
        tokens.push(Token::Null);
        return;
    }
    if let Some(inner) = core.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        tokens.push(Token::Open);
        lex_value(inner, tokens);
        tokens.push(Token::Close);
        return;
    }
    let token = if let Some(hex) = core.strip_prefix("C{").and_then(|r| r.strip_suffix('}')) {
        Token::Cell {
            raw: core.to_string(),
            boc_hex: hex.to_string(),
        }
    } else if let Some(hex) = core.strip_prefix("Cont{").and_then(|r| r.strip_suffix('}')) {
        Token::Cell {
            raw: core.to_string(),
            boc_hex: hex.to_string(),
        }
    } else if let Some(hex) = core.strip_prefix("BC{").and_then(|r| r.strip_suffix('}')) {
        Token::Builder {
            raw: core.to_string(),
            canonical_hex: hex.to_string(),
        }
    } else {
        Token::Word(core.to_string())
    };
    tokens.push(token);
}

/// Tokenize one `stack:` line (with or without the prefix).
pub fn lex_stack_line(line: &str) -> Vec<Token> {
    let body = line.trim().strip_prefix("stack:").unwrap_or(line).trim();
    let mut words: VecDeque<&str> = body.split_whitespace().collect();
    let mut tokens = Vec::new();

    while let Some(word) = words.pop_front() {
        let (opens, core, closes) = peel(word);
        tokens.extend(std::iter::repeat(Token::Open).take(opens));

        let closes = if core.starts_with("CS{") {
            let (token, trailing) = lex_slice(core, &mut words);
            tokens.push(token);
            closes + trailing
        } else {
            if !core.is_empty() {
                lex_value(core, &mut tokens);
            }
            closes
        };

        tokens.extend(std::iter::repeat(Token::Close).take(closes));
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    #[test]
    fn test_fused_brackets() {
        let tokens = lex_stack_line("stack: [ 1 [[2 3] 4] ]");
        assert_eq!(
            tokens,
            vec![
                Token::Open,
                word("1"),
                Token::Open,
                Token::Open,
                word("2"),
                word("3"),
                Token::Close,
                word("4"),
                Token::Close,
                Token::Close,
            ]
        );
    }

    #[test]
    fn test_null_and_singleton() {
        let tokens = lex_stack_line("stack: [ () (5) [()] ]");
        assert_eq!(
            tokens,
            vec![
                Token::Open,
                Token::Null,
                Token::Open,
                word("5"),
                Token::Close,
                Token::Open,
                Token::Null,
                Token::Close,
                Token::Close,
            ]
        );
    }

    #[test]
    fn test_slice_annotations_consumed() {
        let tokens =
            lex_stack_line("stack: [ [CS{Cell{0004abcd} bits: 0..16; refs: 0..0}] 7 ]");
        assert_eq!(tokens.len(), 6);
        match &tokens[2] {
            Token::Slice {
                canonical_hex,
                bits,
                refs,
                ..
            } => {
                assert_eq!(canonical_hex, "0004abcd");
                assert_eq!(*bits, (0, 16));
                assert_eq!(*refs, (0, 0));
            }
            other => panic!("expected slice, got {:?}", other),
        }
        assert_eq!(tokens[3], Token::Close);
        assert_eq!(tokens[4], word("7"));
    }

    #[test]
    fn test_cells_and_builders() {
        let tokens = lex_stack_line("stack: [ C{B5EE} Cont{AB} BC{0004abcd} ]");
        assert!(matches!(&tokens[1], Token::Cell { boc_hex, .. } if boc_hex == "B5EE"));
        assert!(matches!(&tokens[2], Token::Cell { boc_hex, .. } if boc_hex == "AB"));
        assert!(matches!(&tokens[3], Token::Builder { canonical_hex, .. } if canonical_hex == "0004abcd"));
    }

    #[test]
    fn test_truncated_slice() {
        let tokens = lex_stack_line("stack: [ CS{Cell{0004abcd} bits: 0..16;");
        assert!(matches!(tokens[1], Token::Malformed { .. }));
    }
}
