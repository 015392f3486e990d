// tests/operator_tests.rs

use rstest::rstest;
use simple_lang::{EvaluationError, Message, MessageContext, Value, parse_predicate};

fn context() -> MessageContext {
    MessageContext::new(
        Message::new("<hello id='m123'>world!</hello>")
            .with_header("foo", "abc")
            .with_header("bar", 123i64)
            .with_header("num", "70")
            .with_header("letter", "b")
            .with_header("enabled", "true")
            .with_header("disabled", "false")
            .with_header("empty", ""),
    )
    .with_bean("bad", "fail", |_| Err("bean exploded".into()))
}

fn matches(text: &str, context: &MessageContext) -> bool {
    parse_predicate(text)
        .unwrap_or_else(|e| panic!("failed to parse {:?}: {}", text, e))
        .matches(context)
        .unwrap_or_else(|e| panic!("failed to evaluate {:?}: {}", text, e))
}

// ============================================================================
// Comparison Operators
// ============================================================================

#[rstest]
#[case("${in.header.foo} == 'abc'", true)]
#[case("${in.header.foo} == \"abc\"", true)]
#[case("${in.header.foo} == 'def'", false)]
#[case("${in.header.foo} != 'abc'", false)]
#[case("${in.header.foo} != 'def'", true)]
#[case("${in.header.foo} =~ 'ABC'", true)]
#[case("${in.header.foo} !=~ 'ABC'", false)]
#[case("${in.header.bar} =~ 123", true)]
#[case("${in.header.bar} == 123", true)]
#[case("${in.header.bar} == '123'", true)]
#[case("${in.header.bar} == 123.0", true)]
#[case("${in.header.bar} > 100", true)]
#[case("${in.header.bar} > 123", false)]
#[case("${in.header.bar} >= 123", true)]
#[case("${in.header.bar} < 200", true)]
#[case("${in.header.bar} <= 122", false)]
#[case("${in.header.num} > 8", true)]
#[case("${in.header.num} > '8'", true)]
#[case("${in.header.letter} > 'abc'", true)]
#[case("${in.header.foo} == ${in.header.foo}", true)]
fn test_comparison(#[case] predicate: &str, #[case] expected: bool) {
    assert_eq!(matches(predicate, &context()), expected, "{}", predicate);
}

#[rstest]
#[case("${in.header.foo} contains 'b'", true)]
#[case("${in.header.foo} contains 'B'", false)]
#[case("${in.header.foo} not contains 'b'", false)]
#[case("${in.header.foo} !contains 'x'", true)]
#[case("${in.header.foo} ~~ 'B'", true)]
#[case("${in.header.foo} !~~ 'B'", false)]
#[case("${body} contains 'world'", true)]
#[case("${in.header.foo} in 'foo,abc,def'", true)]
#[case("${in.header.foo} in 'foo, abc ,def'", true)]
#[case("${in.header.foo} in 'foo,ab'", false)]
#[case("${in.header.foo} not in 'foo,bar'", true)]
#[case("${in.header.foo} !in 'foo,abc'", false)]
#[case("${in.header.bar} in '100,123,200'", true)]
fn test_containment(#[case] predicate: &str, #[case] expected: bool) {
    assert_eq!(matches(predicate, &context()), expected, "{}", predicate);
}

#[rstest]
#[case("${in.header.bar} regex '\\d{3}'", true)]
#[case("${in.header.bar} regex '\\d{2}'", false)]
#[case("${in.header.bar} regex '^\\d{2}'", false)]
#[case("${in.header.bar} not regex '\\d{2}'", true)]
#[case("${in.header.foo} !regex 'a.c'", false)]
#[case("${in.header.foo} regex '${in.header.letter}'", false)]
#[case("${in.header.letter} regex '${in.header.letter}'", true)]
fn test_regex_is_a_full_match(#[case] predicate: &str, #[case] expected: bool) {
    assert_eq!(matches(predicate, &context()), expected, "{}", predicate);
}

#[rstest]
#[case("${in.header.foo} is String", true)]
#[case("${in.header.foo} is 'java.lang.String'", true)]
#[case("${in.header.foo} is Integer", false)]
#[case("${in.header.bar} is java.lang.Integer", true)]
#[case("${in.header.bar} is Number", true)]
#[case("${in.header.foo} not is String", false)]
#[case("${in.header.foo} !is Integer", true)]
#[case("${in.header.none} is Object", false)]
fn test_type_checks(#[case] predicate: &str, #[case] expected: bool) {
    assert_eq!(matches(predicate, &context()), expected, "{}", predicate);
}

#[rstest]
#[case("${in.header.bar} range 100..200", true)]
#[case("${in.header.bar} range 123..123", true)]
#[case("${in.header.bar} range '100..122'", false)]
#[case("${in.header.bar} not range 1..99", true)]
#[case("${in.header.bar} !range 100..200", false)]
#[case("${in.header.num} range 0..100", true)]
#[case("${in.header.foo} range 1..500", false)]
#[case("${in.header.bar} range '${in.header.num}..200'", true)]
fn test_range(#[case] predicate: &str, #[case] expected: bool) {
    assert_eq!(matches(predicate, &context()), expected, "{}", predicate);
}

#[rstest]
#[case("${in.header.foo} starts with 'ab'", true)]
#[case("${in.header.foo} startsWith 'b'", false)]
#[case("${in.header.foo} ends with 'bc'", true)]
#[case("${in.header.foo} endsWith 'ab'", false)]
#[case("${in.header.foo} not starts with 'ab'", false)]
#[case("${in.header.foo} not ends with 'x'", true)]
fn test_prefix_and_suffix(#[case] predicate: &str, #[case] expected: bool) {
    assert_eq!(matches(predicate, &context()), expected, "{}", predicate);
}

// ============================================================================
// Null Handling
// ============================================================================

#[rstest]
#[case("${in.header.none} == null", true)]
#[case("${in.header.none} != null", false)]
#[case("${in.header.foo} == null", false)]
#[case("${in.header.foo} != null", true)]
#[case("${in.header.empty} == null", false)]
#[case("${in.header.none} > 5", false)]
#[case("${in.header.none} <= 5", false)]
#[case("${in.header.none} contains 'a'", false)]
#[case("${in.header.none} in 'a,b'", false)]
#[case("${in.header.none} starts with 'a'", false)]
#[case("${in.header.none} regex '.*'", false)]
fn test_null(#[case] predicate: &str, #[case] expected: bool) {
    assert_eq!(matches(predicate, &context()), expected, "{}", predicate);
}

#[test]
fn test_numeric_text_body() {
    let context = MessageContext::new(Message::new("0.02"));
    assert!(matches("${body} == 0.02", &context));
    assert!(matches("${body} > 0.01", &context));
    assert!(matches("${body} < 1", &context));
}

#[test]
fn test_numbers_outside_decimal_range() {
    let context = MessageContext::new(
        Message::new("100000000000000000000000000000000")
            .with_header("big", 1e30f64)
            .with_header("scientific", "1.5E3"),
    );
    assert!(matches("${in.header.big} > 5", &context));
    assert!(matches("${in.header.big} == 1e30", &context));
    assert!(matches("${in.header.big} range 1..1e31", &context));
    assert!(matches("${body} > 5", &context));
    assert!(matches("${body} > ${in.header.big}", &context));
    assert!(matches("${in.header.scientific} == 1500", &context));
    assert!(matches("${in.header.scientific} > 200", &context));
    assert!(matches("${in.header.scientific} range 1000..2000", &context));
}

// ============================================================================
// Truthiness And Logic
// ============================================================================

#[rstest]
#[case("${in.header.foo}", true)]
#[case("${in.header.enabled}", true)]
#[case("${in.header.disabled}", false)]
#[case("${in.header.empty}", false)]
#[case("${in.header.none}", false)]
#[case("", false)]
#[case("true", true)]
#[case("false", false)]
fn test_truthiness(#[case] predicate: &str, #[case] expected: bool) {
    assert_eq!(matches(predicate, &context()), expected, "{}", predicate);
}

#[rstest]
#[case("${in.header.foo} == 'abc' && ${in.header.bar} == 123", true)]
#[case("${in.header.foo} == 'abc' and ${in.header.bar} == 444", false)]
#[case("${in.header.foo} == 'def' || ${in.header.bar} == 123", true)]
#[case("${in.header.foo} == 'def' or ${in.header.bar} == 444", false)]
#[case("${in.header.foo} == 'def' || ${in.header.bar} == 123 && ${in.header.foo} == 'abc'", true)]
#[case("${in.header.foo} == 'abc' || ${in.header.bar} == 444 && ${in.header.foo} == 'def'", true)]
#[case("${in.header.foo} == 'def' || ${in.header.bar} == 123 && ${in.header.foo} == 'def'", false)]
fn test_logical(#[case] predicate: &str, #[case] expected: bool) {
    assert_eq!(matches(predicate, &context()), expected, "{}", predicate);
}

#[test]
fn test_short_circuit() {
    let context = context();
    assert!(!matches("${in.header.foo} == 'def' && ${bean:bad.fail} == 1", &context));
    assert!(matches("${in.header.foo} == 'abc' || ${bean:bad.fail} == 1", &context));

    let err = parse_predicate("${in.header.foo} == 'abc' && ${bean:bad.fail} == 1")
        .unwrap()
        .matches(&context)
        .unwrap_err();
    assert!(matches!(err, EvaluationError::Invocation { .. }), "{:?}", err);
}

// ============================================================================
// Operands
// ============================================================================

#[test]
fn test_unary_operand() {
    assert!(matches("${in.header.bar}++ == 124", &context()));
    assert!(matches("${in.header.bar}-- == 122", &context()));
}

#[test]
fn test_concatenated_operand() {
    assert!(matches("${in.header.foo}${in.header.bar} == 'abc123'", &context()));
    assert!(matches("${in.header.foo} == 'a''bc'", &context()));
}

#[test]
fn test_list_operands() {
    let context = MessageContext::new(
        Message::new(Value::from(vec!["red", "green"])).with_header("color", "green"),
    );
    assert!(matches("${body} contains 'green'", &context));
    assert!(!matches("${body} contains 'blue'", &context));
    assert!(matches("${in.header.color} in ${body}", &context));
}

#[test]
fn test_dynamic_range_must_be_numeric() {
    let context = MessageContext::new(Message::new("5").with_header("r", "a..z"));
    let err = parse_predicate("${body} range ${in.header.r}")
        .unwrap()
        .matches(&context)
        .unwrap_err();
    assert!(matches!(err, EvaluationError::TypeMismatch(_)), "{:?}", err);
}

#[test]
fn test_negative_numbers() {
    let context = MessageContext::new(
        Message::new("").with_header("num", -123i64).with_header("text", "-123"),
    );
    assert!(matches("${in.header.num} == -123", &context));
    assert!(matches("${in.header.num} <= -123", &context));
    assert!(matches("${in.header.num} > -124", &context));
    assert!(matches("${in.header.text} == -123", &context));
    assert!(matches("${in.header.num} range -200..-100", &context));
}

#[rstest]
#[case("true", true)]
#[case("false", false)]
fn test_or_after_failed_and_group(#[case] header_c: &str, #[case] expected: bool) {
    let context = MessageContext::new(
        Message::new("")
            .with_header("a", "false")
            .with_header("b", "true")
            .with_header("c", header_c),
    );
    assert_eq!(
        matches("${in.header.a} == 'true' && ${in.header.b} == 'true' || ${in.header.c} == 'true'", &context),
        expected
    );
}
