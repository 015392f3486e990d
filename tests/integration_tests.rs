use serde_json::json;
use simple_lang::{
    EvaluationContext, EvaluationError, Message, MessageContext, SimpleLanguage, TypeHandle, Value,
    parse_expression, parse_predicate,
};
use std::collections::HashMap;
use std::env;
use std::thread;

fn eval_expr(text: &str, context: &MessageContext) -> Result<Value, String> {
    let expression = parse_expression(text).map_err(|e| e.to_string())?;
    expression.evaluate(context).map_err(|e| format!("{:?}", e))
}

fn context() -> MessageContext {
    MessageContext::new(
        Message::new("World")
            .with_header("foo", "abc")
            .with_header("bar", 123i64)
            .with_header("counter", "123")
            .with_header("file", "report.csv")
            .with_property("tenant", "acme")
            .with_variable("region", "eu")
            .with_history("route1")
            .with_history("log2"),
    )
    .with_bean("generator", "generateId", |_| Ok(Value::Integer(123)))
    .with_bean("generator", "generateFilename", |_| Ok(Value::from("abc")))
    .with_bean("greeter", "greet", |args| {
        let name = args.first().map(Value::as_string).unwrap_or_default();
        Ok(Value::String(format!("Hello {}", name)))
    })
    .with_bean("broken", "call", |_| Err("connection refused".into()))
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_interpolation() {
    let context = context();
    let test_cases = vec![
        ("Hello ${body}", "Hello World"),
        ("Hello $simple{body}!", "Hello World!"),
        ("${in.header.foo}-${header:foo}-${header[foo]}-${headers.foo}", "abc-abc-abc-abc"),
        ("${in.header.missing}", ""),
        ("[${in.header.missing}]", "[]"),
        ("+++++++++++++", "+++++++++++++"),
        ("Logging ++ start ++", "Logging ++ start ++"),
        ("it's ${body}", "it's World"),
    ];

    for (input, expected) in test_cases {
        let result = eval_expr(input, &context).unwrap();
        assert_eq!(result.as_string(), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_single_placeholder_keeps_type() {
    let context = context();
    assert_eq!(eval_expr("${in.header.bar}", &context).unwrap(), Value::Integer(123));
    assert_eq!(eval_expr("${in.header.missing}", &context).unwrap(), Value::Null);
    assert_eq!(eval_expr("x${in.header.bar}", &context).unwrap(), Value::from("x123"));
}

#[test]
fn test_increment_and_decrement() {
    let context = context();
    assert_eq!(eval_expr("${in.header.bar}++", &context).unwrap(), Value::Integer(124));
    assert_eq!(eval_expr("${in.header.bar}--", &context).unwrap(), Value::Integer(122));
    assert_eq!(eval_expr("${header.counter}++", &context).unwrap(), Value::from("124"));
    assert_eq!(eval_expr("n=${header.counter}--;", &context).unwrap(), Value::from("n=122;"));

    let err = eval_expr("${header.foo}++", &context).unwrap_err();
    assert!(err.contains("TypeMismatch"), "{}", err);
}

#[test]
fn test_nested_placeholder() {
    let context = MessageContext::new(Message::new("foo").with_header("foo", "abc"));
    assert_eq!(eval_expr("${header.${body}}", &context).unwrap(), Value::from("abc"));
}

#[test]
fn test_beans() {
    let context = context();
    assert_eq!(eval_expr("${bean:generator.generateId}", &context).unwrap(), Value::Integer(123));
    assert_eq!(
        eval_expr("${bean:generator.generateFilename}", &context).unwrap(),
        Value::from("abc")
    );
    assert_eq!(
        eval_expr("${bean:greeter.greet('${body}')}", &context).unwrap(),
        Value::from("Hello World")
    );
}

#[test]
fn test_bean_failure_is_wrapped() {
    let err = parse_expression("${bean:broken.call}")
        .unwrap()
        .evaluate(&context())
        .unwrap_err();
    match err {
        EvaluationError::Invocation { name, source } => {
            assert_eq!(name, "bean:broken.call");
            assert_eq!(source.to_string(), "connection refused");
        }
        other => panic!("expected an invocation error, got {:?}", other),
    }
}

#[test]
fn test_unknown_names() {
    let context = context();
    let err = parse_expression("${nosuch}").unwrap().evaluate(&context).unwrap_err();
    assert!(matches!(err, EvaluationError::PropertyNotFound(ref p) if p == "nosuch"));

    let err = parse_expression("${nosuch(1)}").unwrap().evaluate(&context).unwrap_err();
    assert!(matches!(err, EvaluationError::UnknownFunction(ref f) if f == "nosuch"));

    let err = parse_expression("${bean:nobody.call}").unwrap().evaluate(&context).unwrap_err();
    assert!(matches!(err, EvaluationError::UnknownFunction(_)));
}

#[test]
fn test_functions() {
    let context = context();
    let test_cases = vec![
        ("${bodyAs(String)}", Value::from("World")),
        ("${headerAs(counter, Integer)}", Value::Integer(123)),
        ("${headerAs('bar', String)}", Value::from("123")),
        ("${uppercase()}", Value::from("WORLD")),
        ("${uppercase(${header.foo})}", Value::from("ABC")),
        ("${lowercase(ABC)}", Value::from("abc")),
        ("${trim('  x  ')}", Value::from("x")),
        ("${length()}", Value::Integer(5)),
        ("${isEmpty(${header.missing})}", Value::Boolean(true)),
        ("${not(${header.foo})}", Value::Boolean(false)),
        ("${concat(${header.foo}, '-', ${header.bar})}", Value::from("abc-123")),
        ("${substringBefore(${header.file}, '.')}", Value::from("report")),
        ("${substringAfter(${header.file}, '.')}", Value::from("csv")),
        ("${substringAfter('o')}", Value::from("rld")),
        ("${replace('o', '0')}", Value::from("W0rld")),
        ("${replace('-', '_', 'a-b-c')}", Value::from("a_b_c")),
    ];

    for (input, expected) in test_cases {
        assert_eq!(eval_expr(input, &context).unwrap(), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_function_argument_errors() {
    let context = MessageContext::new(Message::new("abc"));

    let err = eval_expr("${bodyAs(Integer)}", &context).unwrap_err();
    assert!(err.contains("TypeMismatch"), "{}", err);

    let err = eval_expr("${bodyAs(com.acme.Unknown)}", &context).unwrap_err();
    assert!(err.contains("InvalidArguments"), "{}", err);

    let err = eval_expr("${trim(a, b)}", &context).unwrap_err();
    assert!(err.contains("InvalidArguments"), "{}", err);
}

#[test]
fn test_exchange_state() {
    let context = context();
    assert_eq!(eval_expr("${exchangeProperty.tenant}", &context).unwrap(), Value::from("acme"));
    assert_eq!(eval_expr("${variable.region}", &context).unwrap(), Value::from("eu"));
    assert_eq!(
        eval_expr("${messageHistory}", &context).unwrap(),
        Value::from(vec!["route1", "log2"])
    );

    match eval_expr("${headers}", &context).unwrap() {
        Value::Object(headers) => assert_eq!(headers.get("foo"), Some(&Value::from("abc"))),
        other => panic!("expected a map, got {:?}", other),
    }
}

#[test]
fn test_environment() {
    let expected = env::var("PATH").map(Value::String).unwrap_or(Value::Null);
    assert_eq!(eval_expr("${sysenv.PATH}", &context()).unwrap(), expected);
    assert_eq!(eval_expr("${env:PATH}", &context()).unwrap(), expected);
}

#[test]
fn test_structured_body() {
    let message = Message::from_json(json!({
        "body": {"order": {"id": 7, "items": ["apple", "pear"]}},
        "headers": {"priority": 5}
    }));
    let context = MessageContext::new(message);

    assert_eq!(eval_expr("${body.order.id}", &context).unwrap(), Value::Integer(7));
    assert_eq!(eval_expr("${body.order.items.1}", &context).unwrap(), Value::from("pear"));
    assert_eq!(eval_expr("${body.order.missing}", &context).unwrap(), Value::Null);
    assert!(eval_expr("${body.order.id.x}", &context).is_err());

    let predicate = parse_predicate("${body.order.items} contains 'apple' && ${header.priority} > 3").unwrap();
    assert!(predicate.matches(&context).unwrap());
}

#[test]
fn test_evaluate_as() {
    let expression = parse_expression("${header.counter}").unwrap();
    assert_eq!(
        expression.evaluate_as(&context(), &TypeHandle::Integer).unwrap(),
        Value::Integer(123)
    );
    assert!(expression.evaluate_as(&context(), &TypeHandle::Map).is_err());
}

// ============================================================================
// Custom Contexts
// ============================================================================

struct EchoContext;

impl EvaluationContext for EchoContext {
    fn resolve_property(&self, path: &str) -> Result<Value, EvaluationError> {
        Ok(Value::String(format!("property:{}", path)))
    }

    fn invoke_function(&self, name: &str, args: &[Value]) -> Result<Value, EvaluationError> {
        let args: Vec<String> = args.iter().map(Value::as_string).collect();
        Ok(Value::String(format!("function:{}({})", name, args.join("|"))))
    }
}

#[test]
fn test_dispatch_to_context() {
    let test_cases = vec![
        ("${header.foo}", "property:header.foo"),
        ("${bean:x.y}", "function:bean:x.y()"),
        ("${f(a, 'b,c')}", "function:f(a|b,c)"),
        ("${f()}", "function:f()"),
        ("${g(${h})}", "function:g(property:h)"),
    ];

    for (input, expected) in test_cases {
        let value = parse_expression(input).unwrap().evaluate(&EchoContext).unwrap();
        assert_eq!(value, Value::from(expected), "Failed for input: {}", input);
    }
}

#[test]
fn test_custom_type_registry() {
    let mut language = SimpleLanguage::new();
    language.register_type("com.example.Order", TypeHandle::Map);

    let predicate = language.parse_predicate("${body} is com.example.Order").unwrap();
    let order = MessageContext::new(Message::new(Value::Object(HashMap::new())));
    let text = MessageContext::new(Message::new("order"));

    assert!(predicate.matches(&order).unwrap());
    assert!(!predicate.matches(&text).unwrap());
    assert!(parse_predicate("${body} is com.example.Order").is_err());
}

#[test]
fn test_shared_type_registry() {
    let mut language = SimpleLanguage::new();
    language.register_type("com.example.Count", TypeHandle::Integer);

    let predicate = language.parse_predicate("${bodyAs(com.example.Count)} is com.example.Count").unwrap();
    let shared = MessageContext::new(Message::new("42")).with_types(language.types().clone());
    assert!(predicate.matches(&shared).unwrap());
    assert_eq!(eval_expr("${bodyAs(com.example.Count)}", &shared).unwrap(), Value::Integer(42));

    let separate = MessageContext::new(Message::new("42"));
    let err = eval_expr("${bodyAs(com.example.Count)}", &separate).unwrap_err();
    assert!(err.contains("InvalidArguments"), "{}", err);
}

// ============================================================================
// Reuse
// ============================================================================

#[test]
fn test_parse_once_evaluate_many() {
    let predicate = parse_predicate("${header.n} > 5").unwrap();
    let results: Vec<bool> = (0..10i64)
        .map(|n| {
            let context = MessageContext::new(Message::new("").with_header("n", n));
            predicate.matches(&context).unwrap()
        })
        .collect();
    assert_eq!(results.iter().filter(|m| **m).count(), 4);
}

#[test]
fn test_concurrent_evaluation() {
    let expression = parse_expression("${header.name}:${header.n}++").unwrap();
    let predicate = parse_predicate("${header.n} range 0..49 && ${header.name} regex 'worker-\\d+'").unwrap();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..8i64)
            .map(|i| {
                let expression = &expression;
                let predicate = &predicate;
                scope.spawn(move || {
                    let context = MessageContext::new(
                        Message::new("")
                            .with_header("name", format!("worker-{}", i))
                            .with_header("n", i * 10),
                    );
                    let value = expression.evaluate(&context).unwrap();
                    let matched = predicate.matches(&context).unwrap();
                    (i, value, matched)
                })
            })
            .collect();

        for handle in handles {
            let (i, value, matched) = handle.join().unwrap();
            assert_eq!(value, Value::String(format!("worker-{}:{}", i, i * 10 + 1)));
            assert_eq!(matched, i * 10 <= 49);
        }
    });
}

#[test]
fn test_syntax_error_display() {
    let err = parse_predicate("${header.high} == abc").unwrap_err();
    assert_eq!(err.offset, 19);
    assert!(err.to_string().contains("at location 19"), "{}", err);
    assert!(err.to_string().ends_with("\n                   ^"), "{}", err);
}
