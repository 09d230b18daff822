//! Value layer tests: truthiness, comparisons, method tables, dispatch

use std::rc::Rc;

use pygmy::ast::{Expr, Stmt};
use pygmy::interp::{
    call_method, equal, greater, greater_or_equal, is_true, less, less_or_equal, not_equal,
    write_value, Class, DummyContext, Instance, Method, Value, ValueRef,
};
use pygmy::RuntimeError;

fn own(value: Value) -> ValueRef {
    ValueRef::own(value)
}

/// A method whose body just returns `expr`.
fn returning(name: &str, formal_params: Vec<String>, expr: Expr) -> Method {
    Method {
        name: name.to_string(),
        formal_params,
        body: Stmt::MethodBody(Box::new(Stmt::Return(Some(expr)))),
    }
}

#[test]
fn test_truthiness() {
    assert!(!is_true(&ValueRef::none()));
    assert!(!is_true(&own(Value::None)));
    assert!(!is_true(&own(Value::Number(0))));
    assert!(is_true(&own(Value::Number(-3))));
    assert!(!is_true(&own(Value::Bool(false))));
    assert!(is_true(&own(Value::Bool(true))));
    assert!(!is_true(&own(Value::String(Vec::new()))));
    assert!(is_true(&own(Value::String(b"x".to_vec()))));

    let class = Rc::new(Class::new("A".to_string(), vec![], None));
    assert!(!is_true(&own(Value::Class(class.clone()))));
    assert!(!is_true(&own(Value::Instance(Instance::new(class)))));
}

#[test]
fn test_equal_primitives() {
    let mut ctx = DummyContext::new();
    for (lhs, rhs, expected) in [
        (Value::Number(7), Value::Number(7), true),
        (Value::Number(7), Value::Number(8), false),
        (Value::Bool(true), Value::Bool(true), true),
        (Value::Bool(true), Value::Bool(false), false),
        (
            Value::String(b"a".to_vec()),
            Value::String(b"a".to_vec()),
            true,
        ),
        (
            Value::String(b"a".to_vec()),
            Value::String(b"b".to_vec()),
            false,
        ),
    ] {
        assert_eq!(equal(&own(lhs), &own(rhs), &mut ctx).unwrap(), expected);
    }
}

#[test]
fn test_equal_none_and_null() {
    let mut ctx = DummyContext::new();
    assert!(equal(&ValueRef::none(), &ValueRef::none(), &mut ctx).unwrap());
    assert!(equal(&own(Value::None), &own(Value::None), &mut ctx).unwrap());
    assert!(equal(&ValueRef::none(), &own(Value::None), &mut ctx).unwrap());
}

#[test]
fn test_equal_mismatched_variants() {
    let mut ctx = DummyContext::new();
    let err = equal(
        &own(Value::Number(1)),
        &own(Value::String(b"1".to_vec())),
        &mut ctx,
    )
    .unwrap_err();
    assert!(matches!(err, RuntimeError::Comparison));
}

#[test]
fn test_derived_comparators() {
    let mut ctx = DummyContext::new();
    let one = own(Value::Number(1));
    let two = own(Value::Number(2));

    assert!(less(&one, &two, &mut ctx).unwrap());
    assert!(!less(&two, &one, &mut ctx).unwrap());
    assert!(not_equal(&one, &two, &mut ctx).unwrap());
    assert!(less_or_equal(&one, &one, &mut ctx).unwrap());
    assert!(less_or_equal(&one, &two, &mut ctx).unwrap());
    assert!(greater(&two, &one, &mut ctx).unwrap());
    assert!(!greater(&one, &one, &mut ctx).unwrap());
    assert!(greater_or_equal(&one, &one, &mut ctx).unwrap());
    assert!(!greater_or_equal(&one, &two, &mut ctx).unwrap());
}

#[test]
fn test_string_ordering() {
    let mut ctx = DummyContext::new();
    let a = own(Value::String(b"abc".to_vec()));
    let b = own(Value::String(b"abd".to_vec()));
    assert!(less(&a, &b, &mut ctx).unwrap());
}

#[test]
fn test_first_declared_method_wins() {
    let class = Class::new(
        "A".to_string(),
        vec![
            returning("f", vec![], Expr::Number(1)),
            returning("f", vec![], Expr::Number(2)),
        ],
        None,
    );
    let method = class.method("f").unwrap();
    let Stmt::MethodBody(body) = &method.body else {
        panic!("Expected wrapped body");
    };
    assert!(matches!(**body, Stmt::Return(Some(Expr::Number(1)))));
}

#[test]
fn test_method_lookup_through_parent() {
    let parent = Rc::new(Class::new(
        "Base".to_string(),
        vec![returning("f", vec![], Expr::Number(1))],
        None,
    ));
    let child = Class::new(
        "Derived".to_string(),
        vec![returning("g", vec![], Expr::Number(2))],
        Some(parent),
    );
    assert!(child.method("f").is_some());
    assert!(child.method("g").is_some());
    assert!(child.method("h").is_none());
}

#[test]
fn test_child_method_shadows_parent() {
    let parent = Rc::new(Class::new(
        "Base".to_string(),
        vec![returning("f", vec![], Expr::Number(1))],
        None,
    ));
    let child = Rc::new(Class::new(
        "Derived".to_string(),
        vec![returning("f", vec![], Expr::Number(2))],
        Some(parent),
    ));

    let mut ctx = DummyContext::new();
    let object = own(Value::Instance(Instance::new(child)));
    let result = call_method(&object, "f", vec![], &mut ctx).unwrap();
    assert_eq!(result.as_number(), Some(2));
}

#[test]
fn test_has_method_checks_arity() {
    let class = Rc::new(Class::new(
        "A".to_string(),
        vec![returning("f", vec!["x".to_string()], Expr::Number(1))],
        None,
    ));
    let instance = Instance::new(class);
    assert!(instance.has_method("f", 1));
    assert!(!instance.has_method("f", 0));
    assert!(!instance.has_method("g", 0));
}

#[test]
fn test_call_binds_formals_and_self() {
    // f(x) returning x round-trips the argument through the frame.
    let class = Rc::new(Class::new(
        "A".to_string(),
        vec![returning(
            "f",
            vec!["x".to_string()],
            Expr::Variable(vec!["x".to_string()]),
        )],
        None,
    ));
    let mut ctx = DummyContext::new();
    let object = own(Value::Instance(Instance::new(class)));
    let result = call_method(&object, "f", vec![own(Value::Number(9))], &mut ctx).unwrap();
    assert_eq!(result.as_number(), Some(9));
}

#[test]
fn test_call_without_return_yields_null() {
    let class = Rc::new(Class::new(
        "A".to_string(),
        vec![Method {
            name: "f".to_string(),
            formal_params: vec![],
            body: Stmt::MethodBody(Box::new(Stmt::Compound(vec![]))),
        }],
        None,
    ));
    let mut ctx = DummyContext::new();
    let object = own(Value::Instance(Instance::new(class)));
    let result = call_method(&object, "f", vec![], &mut ctx).unwrap();
    assert!(result.is_null());
}

#[test]
fn test_call_unknown_method() {
    let class = Rc::new(Class::new("A".to_string(), vec![], None));
    let mut ctx = DummyContext::new();
    let object = own(Value::Instance(Instance::new(class)));
    let err = call_method(&object, "f", vec![], &mut ctx).unwrap_err();
    assert!(matches!(err, RuntimeError::MethodNotImplemented(name) if name == "f"));
}

#[test]
fn test_call_arity_mismatch() {
    let class = Rc::new(Class::new(
        "A".to_string(),
        vec![returning("f", vec!["x".to_string()], Expr::Number(1))],
        None,
    ));
    let mut ctx = DummyContext::new();
    let object = own(Value::Instance(Instance::new(class)));
    let err = call_method(&object, "f", vec![], &mut ctx).unwrap_err();
    assert!(matches!(err, RuntimeError::MethodNotImplemented(_)));
}

#[test]
fn test_call_on_non_object() {
    let mut ctx = DummyContext::new();
    let err = call_method(&own(Value::Number(1)), "f", vec![], &mut ctx).unwrap_err();
    assert!(matches!(err, RuntimeError::NotAnObject));
}

#[test]
fn test_instance_fields() {
    let class = Rc::new(Class::new("A".to_string(), vec![], None));
    let instance = Instance::new(class);
    assert!(instance.field("x").is_none());
    instance.set_field("x", own(Value::Number(1)));
    assert_eq!(instance.field("x").unwrap().as_number(), Some(1));
    instance.set_field("x", own(Value::Number(2)));
    assert_eq!(instance.field("x").unwrap().as_number(), Some(2));
}

#[test]
fn test_share_aliases_same_value() {
    let value = own(Value::Number(5));
    let alias = value.share();
    assert_eq!(alias.as_number(), Some(5));
    assert!(!alias.is_null());
    assert!(ValueRef::none().is_null());
}

#[test]
fn test_write_value_primitives() {
    let mut ctx = DummyContext::new();
    for (value, expected) in [
        (ValueRef::none(), "None"),
        (own(Value::None), "None"),
        (own(Value::Number(-5)), "-5"),
        (own(Value::Bool(true)), "True"),
        (own(Value::Bool(false)), "False"),
        (own(Value::String(b"raw text".to_vec())), "raw text"),
    ] {
        let mut out = Vec::new();
        write_value(&value, &mut out, &mut ctx).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }
}

#[test]
fn test_write_value_class_and_instance() {
    let mut ctx = DummyContext::new();
    let class = Rc::new(Class::new("Widget".to_string(), vec![], None));

    let mut out = Vec::new();
    write_value(&own(Value::Class(class.clone())), &mut out, &mut ctx).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "Class Widget");

    // No __str__: an identity string mentioning the class.
    let mut out = Vec::new();
    write_value(
        &own(Value::Instance(Instance::new(class))),
        &mut out,
        &mut ctx,
    )
    .unwrap();
    assert!(String::from_utf8(out).unwrap().starts_with("<Widget object"));
}

#[test]
fn test_write_value_uses_str_hook() {
    let class = Rc::new(Class::new(
        "Named".to_string(),
        vec![returning("__str__", vec![], Expr::Str(b"custom".to_vec()))],
        None,
    ));
    let mut ctx = DummyContext::new();
    let mut out = Vec::new();
    write_value(
        &own(Value::Instance(Instance::new(class))),
        &mut out,
        &mut ctx,
    )
    .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "custom");
}

#[test]
fn test_eq_hook_drives_equality() {
    // __eq__ that always answers True.
    let class = Rc::new(Class::new(
        "Always".to_string(),
        vec![returning(
            "__eq__",
            vec!["other".to_string()],
            Expr::Bool(true),
        )],
        None,
    ));
    let mut ctx = DummyContext::new();
    let object = own(Value::Instance(Instance::new(class)));
    assert!(equal(&object, &own(Value::Number(1)), &mut ctx).unwrap());
    // Derived: != is the negation of the hook's answer.
    assert!(!not_equal(&object, &own(Value::Number(1)), &mut ctx).unwrap());
}

#[test]
fn test_instance_without_hooks_fails_comparison() {
    let class = Rc::new(Class::new("Plain".to_string(), vec![], None));
    let mut ctx = DummyContext::new();
    let object = own(Value::Instance(Instance::new(class)));
    assert!(matches!(
        equal(&object, &own(Value::Number(1)), &mut ctx),
        Err(RuntimeError::Comparison)
    ));
    assert!(matches!(
        less(&object, &own(Value::Number(1)), &mut ctx),
        Err(RuntimeError::Comparison)
    ));
}
