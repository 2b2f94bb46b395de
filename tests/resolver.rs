#[cfg(test)]
mod resolver_tests {
    use treelox as lox;

    use lox::interpreter::Interpreter;
    use lox::parser::Parser;
    use lox::resolver::Resolver;
    use lox::scanner;

    /// Scan, parse, and resolve `source`, returning the rendered resolution
    /// diagnostics.
    fn resolve_errors(source: &str) -> Vec<String> {
        let (tokens, lex_errors) = scanner::scan(source.as_bytes());
        assert!(lex_errors.is_empty(), "lexical errors: {:?}", lex_errors);

        let mut parser = Parser::new(&tokens);
        let (statements, parse_errors) = parser.parse();
        assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);

        let mut interpreter = Interpreter::new();
        Resolver::new(&mut interpreter)
            .resolve(&statements)
            .iter()
            .map(|e| e.to_string())
            .collect()
    }

    fn assert_clean(source: &str) {
        let errors = resolve_errors(source);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    fn assert_rejects(source: &str, fragment: &str) {
        let errors = resolve_errors(source);
        assert!(
            errors.iter().any(|e| e.contains(fragment)),
            "expected an error containing {:?}, got {:?}",
            fragment,
            errors
        );
    }

    #[test]
    fn test_resolver_accepts_well_formed_program() {
        assert_clean(
            "var a = 1; \
             { \
               var b = a; \
               fun f(x) { return x + b; } \
               print f(2); \
             }",
        );
    }

    #[test]
    fn test_duplicate_local_declaration_rejected() {
        assert_rejects(
            "{ var a = 1; var a = 2; }",
            "Already a variable with this name in this scope.",
        );
    }

    #[test]
    fn test_duplicate_global_declaration_allowed() {
        assert_clean("var a = 1; var a = 2;");
    }

    #[test]
    fn test_shadowing_in_nested_scope_allowed() {
        assert_clean("{ var a = 1; { var a = 2; print a; } }");
    }

    #[test]
    fn test_self_referential_initializer_rejected() {
        assert_rejects(
            "{ var a = a; }",
            "Can't read local variable in its own initializer.",
        );
    }

    #[test]
    fn test_global_self_reference_is_dynamic() {
        // Global declarations are not tracked statically; this fails at
        // runtime instead.
        assert_clean("var a = a;");
    }

    #[test]
    fn test_return_outside_function_rejected() {
        assert_rejects("return 1;", "Can't return from top-level code.");
    }

    #[test]
    fn test_return_inside_function_allowed() {
        assert_clean("fun f() { return 1; }");
    }

    #[test]
    fn test_return_value_from_initializer_rejected() {
        assert_rejects(
            "class Foo { init() { return 1; } }",
            "Can't return a value from an initializer.",
        );
    }

    #[test]
    fn test_bare_return_from_initializer_allowed() {
        assert_clean("class Foo { init() { if (true) return; this.x = 1; } }");
    }

    #[test]
    fn test_this_outside_class_rejected() {
        assert_rejects("print this;", "Can't use 'this' outside of a class.");
        assert_rejects(
            "fun notAMethod() { print this; }",
            "Can't use 'this' outside of a class.",
        );
    }

    #[test]
    fn test_this_in_nested_function_inside_method_allowed() {
        assert_clean(
            "class Foo { \
               method() { \
                 fun inner() { print this; } \
                 inner(); \
               } \
             }",
        );
    }

    #[test]
    fn test_super_outside_class_rejected() {
        assert_rejects("print super.x;", "Can't use 'super' outside of a class.");
    }

    #[test]
    fn test_super_without_superclass_rejected() {
        assert_rejects(
            "class Foo { method() { super.method(); } }",
            "Can't use 'super' in a class with no superclass.",
        );
    }

    #[test]
    fn test_super_with_superclass_allowed() {
        assert_clean(
            "class A { method() {} } \
             class B < A { method() { super.method(); } }",
        );
    }

    #[test]
    fn test_class_inheriting_from_itself_rejected() {
        assert_rejects("class Foo < Foo {}", "A class can't inherit from itself.");
    }

    #[test]
    fn test_errors_accumulate() {
        let errors = resolve_errors(
            "return 1; \
             print this; \
             { var a = 1; var a = 2; }",
        );

        assert_eq!(errors.len(), 3, "errors: {:?}", errors);
    }
}
