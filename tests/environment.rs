#[cfg(test)]
mod environment_tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use treelox as lox;

    use lox::environment::Environment;
    use lox::value::Value;

    fn frame<'a>() -> Rc<RefCell<Environment<'a>>> {
        Rc::new(RefCell::new(Environment::new()))
    }

    fn child<'a>(parent: &Rc<RefCell<Environment<'a>>>) -> Rc<RefCell<Environment<'a>>> {
        Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(parent))))
    }

    fn as_number(value: Value<'_>) -> f64 {
        match value {
            Value::Number(n) => n,
            other => panic!("expected number, got {:?}", other),
        }
    }

    #[test]
    fn test_get_at_reads_exact_frame() {
        let global = frame();
        global.borrow_mut().define("x", Value::Number(1.0));

        let inner = child(&global);
        inner.borrow_mut().define("x", Value::Number(2.0));

        assert_eq!(as_number(Environment::get_at(&inner, 0, "x")), 2.0);
        assert_eq!(as_number(Environment::get_at(&inner, 1, "x")), 1.0);
    }

    #[test]
    fn test_assign_at_updates_exact_frame_only() {
        let global = frame();
        global.borrow_mut().define("x", Value::Number(1.0));

        let inner = child(&global);
        inner.borrow_mut().define("x", Value::Number(2.0));

        Environment::assign_at(&inner, 1, "x", Value::Number(10.0));

        // The outer binding changed; the shadowing one did not.
        assert_eq!(as_number(Environment::get_at(&inner, 0, "x")), 2.0);
        assert_eq!(as_number(Environment::get_at(&inner, 1, "x")), 10.0);
    }

    #[test]
    #[should_panic(expected = "resolved local missing from its scope frame")]
    fn test_get_at_missing_binding_is_fatal() {
        let global = frame();

        Environment::get_at(&global, 0, "ghost");
    }

    #[test]
    #[should_panic(expected = "resolved local missing from its scope frame")]
    fn test_assign_at_missing_binding_is_fatal() {
        let global = frame();
        global.borrow_mut().define("x", Value::Number(1.0));

        // Distance and name disagree with what was defined; no fallback
        // insert may happen.
        Environment::assign_at(&global, 0, "ghost", Value::Nil);
    }

    #[test]
    fn test_dynamic_assign_reaches_enclosing_frame() {
        let global = frame();
        global.borrow_mut().define("x", Value::Number(1.0));

        let inner = child(&global);
        inner
            .borrow_mut()
            .assign("x", Value::Number(5.0), 1)
            .expect("binding exists in the chain");

        assert_eq!(as_number(global.borrow().get("x", 1).unwrap()), 5.0);
    }
}
