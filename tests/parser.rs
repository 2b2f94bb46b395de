#[cfg(test)]
mod parser_tests {
    use treelox as lox;

    use lox::ast_printer::AstPrinter;
    use lox::parser::Parser;
    use lox::scanner;

    /// Scan and parse `source`, returning the printed statement forms and
    /// the rendered parse errors.
    fn parse_source(source: &str) -> (Vec<String>, Vec<String>) {
        let (tokens, lex_errors) = scanner::scan(source.as_bytes());
        assert!(lex_errors.is_empty(), "lexical errors: {:?}", lex_errors);

        let mut parser = Parser::new(&tokens);
        let (statements, errors) = parser.parse();

        (
            statements.iter().map(AstPrinter::print_stmt).collect(),
            errors.iter().map(|e| e.to_string()).collect(),
        )
    }

    fn parse_ok(source: &str) -> Vec<String> {
        let (statements, errors) = parse_source(source);
        assert!(errors.is_empty(), "unexpected parse errors: {:?}", errors);
        statements
    }

    #[test]
    fn test_parser_operator_precedence() {
        let printed = parse_ok("1 + 2 * 3 == 7;");
        assert_eq!(printed, vec!["(; (== (+ 1.0 (* 2.0 3.0)) 7.0))"]);
    }

    #[test]
    fn test_parser_unary_binds_tighter_than_factor() {
        let printed = parse_ok("-a * b;");
        assert_eq!(printed, vec!["(; (* (- a) b))"]);
    }

    #[test]
    fn test_parser_assignment_is_right_associative() {
        let printed = parse_ok("a = b = 1;");
        assert_eq!(printed, vec!["(; (= a (= b 1.0)))"]);
    }

    #[test]
    fn test_parser_logical_operators() {
        let printed = parse_ok("a or b and c;");
        assert_eq!(printed, vec!["(; (or a (and b c)))"]);
    }

    #[test]
    fn test_parser_property_access_and_call() {
        let printed = parse_ok("obj.method(1).field;");
        assert_eq!(printed, vec!["(; (get (call (get obj method) 1.0) field))"]);
    }

    #[test]
    fn test_parser_for_desugars_to_while() {
        let printed = parse_ok("for (var i = 0; i < 3; i = i + 1) print i;");

        assert_eq!(
            printed,
            vec![
                "(block (var i 0.0) \
                 (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"
            ]
        );
    }

    #[test]
    fn test_parser_for_without_clauses() {
        let printed = parse_ok("for (;;) break;");
        assert_eq!(printed, vec!["(while true (break))"]);
    }

    #[test]
    fn test_parser_class_with_superclass_and_methods() {
        let printed = parse_ok(
            "class Cruller < Doughnut { \
               init() { this.glazed = true; } \
               finish() { super.finish(); } \
             }",
        );

        assert_eq!(
            printed,
            vec![
                "(class Cruller < Doughnut \
                 (fun init () (; (set this glazed true))) \
                 (fun finish () (; (call (super finish)))))"
            ]
        );
    }

    #[test]
    fn test_parser_lambda_expression() {
        let printed = parse_ok("var f = fun (x) { return x; };");
        assert_eq!(printed, vec!["(var f (fun lambda (x) (return x)))"]);
    }

    #[test]
    fn test_parser_named_fun_is_a_declaration() {
        let printed = parse_ok("fun twice(x) { return x + x; }");
        assert_eq!(printed, vec!["(fun twice (x) (return (+ x x)))"]);
    }

    #[test]
    fn test_parser_break_outside_loop_rejected() {
        let (_, errors) = parse_source("break;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Cannot use 'break' outside of a loop"));
    }

    #[test]
    fn test_parser_continue_outside_loop_rejected() {
        let (_, errors) = parse_source("if (true) continue;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Cannot use 'continue' outside of a loop"));
    }

    #[test]
    fn test_parser_continue_legal_inside_loop_body_function_boundary() {
        // Legal: directly in the loop.
        parse_ok("while (true) { continue; }");

        // Illegal: inside a function body, even one declared inside a loop.
        let (_, errors) = parse_source("while (true) { fun f() { break; } }");
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_parser_invalid_assignment_target() {
        let (statements, errors) = parse_source("a + b = c;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Invalid assignment target"));

        // The statement still parses so later errors can be found.
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_parser_recovers_and_reports_multiple_errors() {
        let (statements, errors) = parse_source(
            "var = 1;\n\
             print 2;\n\
             var y 3;\n\
             print 4;",
        );

        assert_eq!(errors.len(), 2, "errors: {:?}", errors);

        // Both well-formed statements survive recovery.
        assert!(statements.contains(&"(print 2.0)".to_string()));
        assert!(statements.contains(&"(print 4.0)".to_string()));
    }

    #[test]
    fn test_parser_error_location_at_end() {
        let (_, errors) = parse_source("print 1");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains(" at end"), "got: {}", errors[0]);
    }

    #[test]
    fn test_parser_node_ids_continue_across_sessions() {
        let (tokens_a, _) = scanner::scan(b"var a = 1;");
        let mut first = Parser::new(&tokens_a);
        first.parse();
        let base = first.next_id();

        let (tokens_b, _) = scanner::scan(b"print a;");
        let second = Parser::with_base_id(&tokens_b, base);

        assert!(second.next_id() >= base);
    }
}
