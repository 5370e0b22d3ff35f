//! Recursive-descent parser over the lexer's tokens.

use std::iter::Peekable;
use std::vec::IntoIter;

use super::lexer::{lex_stack_line, Token};
use super::value::{StackValue, MAX_TUPLE_LEN};

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
}

impl Parser {
    fn value(&mut self, token: Token) -> StackValue {
        match token {
            Token::Open => self.tuple(),
            Token::Null => StackValue::Null,
            Token::Cell { raw, boc_hex } => StackValue::cell(&raw, &boc_hex),
            Token::Builder { raw, canonical_hex } => StackValue::builder(&raw, &canonical_hex),
            Token::Slice {
                raw,
                canonical_hex,
                bits,
                refs,
            } => StackValue::slice(&raw, &canonical_hex, bits, refs),
            Token::Word(word) => StackValue::integer(&word),
            Token::Malformed { raw, reason } => StackValue::unparsed(raw, reason),
            Token::Close => StackValue::unparsed("]", "unbalanced bracket"),
        }
    }

    /// Elements up to the matching `Close`, which is consumed. A line that
    /// ends early closes every open tuple.
    fn items(&mut self) -> Vec<StackValue> {
        let mut items = Vec::new();
        while let Some(token) = self.tokens.next() {
            if token == Token::Close {
                return items;
            }
            items.push(self.value(token));
        }
        tracing::warn!("stack line ended inside a tuple");
        items
    }

    fn tuple(&mut self) -> StackValue {
        let items = self.items();
        if items.len() > MAX_TUPLE_LEN {
            tracing::warn!(len = items.len(), "tuple longer than TVM allows");
        }
        StackValue::Tuple(items)
    }
}

/// Parse one `stack:` line into the stack it describes, bottom first.
///
/// The outermost brackets delimit the stack itself and do not produce a
/// tuple. Unrecognized tokens become [`StackValue::Unparsed`] and are logged.
pub fn parse_stack_line(line: &str) -> Vec<StackValue> {
    let tokens = lex_stack_line(line);
    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
    };

    let stack = if parser.tokens.peek() == Some(&Token::Open) {
        parser.tokens.next();
        let stack = parser.items();
        if parser.tokens.peek().is_some() {
            tracing::warn!("text after the closing bracket of a stack line");
        }
        stack
    } else {
        let mut stack = Vec::new();
        while let Some(token) = parser.tokens.next() {
            stack.push(parser.value(token));
        }
        stack
    };

    for value in &stack {
        warn_unparsed(value);
    }
    stack
}

fn warn_unparsed(value: &StackValue) {
    match value {
        StackValue::Unparsed { raw, reason } => {
            tracing::warn!(token = %raw, %reason, "unparsed stack element");
        }
        StackValue::Tuple(items) => items.iter().for_each(warn_unparsed),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn int(v: i64) -> StackValue {
        StackValue::Integer(BigInt::from(v))
    }

    #[test]
    fn test_flat_stack() {
        assert_eq!(parse_stack_line("stack: [ 1 -2 () ]"), vec![int(1), int(-2), StackValue::Null]);
        assert_eq!(parse_stack_line("stack: [ ]"), vec![]);
    }

    #[test]
    fn test_nesting_mirrors_brackets() {
        let stack = parse_stack_line("stack: [ [[[1] 2] 3] 4 ]");
        let expected = vec![
            StackValue::Tuple(vec![
                StackValue::Tuple(vec![StackValue::Tuple(vec![int(1)]), int(2)]),
                int(3),
            ]),
            int(4),
        ];
        assert_eq!(stack, expected);
    }

    #[test]
    fn test_singleton_tuple() {
        assert_eq!(
            parse_stack_line("stack: [ (7) ]"),
            vec![StackValue::Tuple(vec![int(7)])]
        );
    }

    #[test]
    fn test_unknown_word_is_kept() {
        let stack = parse_stack_line("stack: [ 1 what ]");
        assert_eq!(stack[0], int(1));
        assert!(matches!(&stack[1], StackValue::Unparsed { raw, .. } if raw == "what"));
    }

    #[test]
    fn test_unterminated_tuple_is_closed() {
        let stack = parse_stack_line("stack: [ 1 [2 3");
        assert_eq!(stack, vec![int(1), StackValue::Tuple(vec![int(2), int(3)])]);
    }
}
