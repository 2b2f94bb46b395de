#[cfg(test)]
mod scanner_tests {
    use treelox as lox;

    use lox::scanner::*;
    use lox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source.as_bytes());
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_two_char_operators() {
        assert_token_sequence(
            "! != = == < <= > >=",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_keywords_and_identifiers() {
        assert_token_sequence(
            "var foo = fun_ky; while break continue",
            &[
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "foo"),
                (TokenType::EQUAL, "="),
                (TokenType::IDENTIFIER, "fun_ky"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::WHILE, "while"),
                (TokenType::BREAK, "break"),
                (TokenType::CONTINUE, "continue"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_number_literals() {
        let (tokens, errors) = scan(b"12 3.14 0.5");
        assert!(errors.is_empty());

        let numbers: Vec<f64> = tokens
            .iter()
            .filter_map(|t| match t.token_type {
                TokenType::NUMBER(n) => Some(n),
                _ => None,
            })
            .collect();

        assert_eq!(numbers, vec![12.0, 3.14, 0.5]);
    }

    #[test]
    fn test_scanner_string_literal_spans_lines() {
        let (tokens, errors) = scan(b"\"one\ntwo\" x");
        assert!(errors.is_empty());

        match &tokens[0].token_type {
            TokenType::STRING(s) => assert_eq!(s, "one\ntwo"),
            other => panic!("expected string token, got {:?}", other),
        }

        // The identifier after the literal sits on line 2.
        assert_eq!(tokens[1].token_type, TokenType::IDENTIFIER);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_scanner_line_comment_skipped() {
        assert_token_sequence(
            "a // the rest is ignored ;;;\nb",
            &[
                (TokenType::IDENTIFIER, "a"),
                (TokenType::IDENTIFIER, "b"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_block_comment_skipped() {
        assert_token_sequence(
            "a /* ignored * / still ignored */ b",
            &[
                (TokenType::IDENTIFIER, "a"),
                (TokenType::IDENTIFIER, "b"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_block_comment_counts_lines() {
        let (tokens, errors) = scan(b"/* one\ntwo\nthree */ x");
        assert!(errors.is_empty());

        assert_eq!(tokens[0].token_type, TokenType::IDENTIFIER);
        assert_eq!(tokens[0].line, 3);
    }

    #[test]
    fn test_scanner_unterminated_block_comment() {
        let (tokens, errors) = scan(b"a /* never closed");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Unterminated block comment."));

        // Scanning still produced the leading token and the EOF.
        assert_eq!(tokens.first().map(|t| t.lexeme), Some("a"));
        assert_eq!(tokens.last().map(|t| t.lexeme), Some(""));
    }

    #[test]
    fn test_scanner_unterminated_string() {
        let (_, errors) = scan(b"\"oops");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Unterminated string."));
    }

    #[test]
    fn test_scanner_unexpected_character_reports_and_continues() {
        let (tokens, errors) = scan(b",.$(#");

        assert_eq!(errors.len(), 2);
        for err in &errors {
            assert!(err.to_string().contains("Unexpected character"));
        }

        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme).collect();
        assert_eq!(lexemes, vec![",", ".", "(", ""]);
    }

    #[test]
    fn test_scanner_single_eof() {
        let mut scanner = Scanner::new(b"");

        let first = scanner.next().expect("eof token");
        assert_eq!(first.unwrap().token_type, TokenType::EOF);

        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }

    #[test]
    fn test_scanner_lexeme_round_trip() {
        // Re-rendering the significant lexemes (whitespace and comments
        // dropped) and rescanning reproduces the same token sequence.
        let source = "var x = 1; // trailing\n/* gone */ print x + 2;";

        let (tokens, errors) = scan(source.as_bytes());
        assert!(errors.is_empty());

        let rendered: String = tokens
            .iter()
            .map(|t| t.lexeme)
            .collect::<Vec<_>>()
            .join(" ");

        let (rescanned, errors) = scan(rendered.as_bytes());
        assert!(errors.is_empty());

        let kinds: Vec<_> = tokens.iter().map(|t| t.token_type.name()).collect();
        let rescanned_kinds: Vec<_> = rescanned.iter().map(|t| t.token_type.name()).collect();
        assert_eq!(kinds, rescanned_kinds);
    }

    #[test]
    fn test_scanner_number_token_display() {
        let (tokens, _) = scan(b"3 2.5");

        assert_eq!(tokens[0].to_string(), "NUMBER 3 3.0");
        assert_eq!(tokens[1].to_string(), "NUMBER 2.5 2.5");
    }
}
