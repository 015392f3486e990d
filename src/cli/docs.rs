//! Documentation content for the simple CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Properties,
    Functions,
    Types,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" => Some(Self::Syntax),
            "operators" | "ops" => Some(Self::Operators),
            "properties" | "property" | "props" => Some(Self::Properties),
            "functions" | "function" | "fns" => Some(Self::Functions),
            "types" | "type" | "classes" => Some(Self::Types),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"SIMPLE LANGUAGE DOCUMENTATION

Simple is a small expression and predicate language for message routing.
Expressions interpolate ${...} placeholders into text; predicates compare
values and combine the results with && and ||.

DOCUMENTATION CATEGORIES

  syntax            Placeholders, literal text, quoting, increment/decrement
  operators         Comparison and logical operators in predicates
  properties        Message properties a placeholder can read
  functions         Built-in functions and bean invocation
  types             Class names accepted by 'is' and bodyAs/headerAs

QUICK REFERENCE

  ${body}                         Message body
  ${header.foo}                   Header 'foo'
  ${bodyAs(Integer)}              Function call
  ${header.count}++               Increment
  ${header.foo} == 'abc'          Comparison
  ${body} contains 'x' && ${header.n} > 5
                                  Logical AND (binds tighter than ||)

Run 'simple docs <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Properties) => Ok(PROPERTIES_DOC),
        Some(DocCategory::Functions) => Ok(FUNCTIONS_DOC),
        Some(DocCategory::Types) => Ok(TYPES_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX

PLACEHOLDERS
  ${name}               Resolve a property path or zero-argument function
  $simple{name}         Same as ${name}
  ${name(a, b)}         Call a function; arguments are split on top-level commas
  ${name('a,b')}        Quoted arguments keep commas and spaces
  ${header.${body}}     Placeholders nest; the inner one is resolved first

LITERAL TEXT
  Everything outside a placeholder is literal text in an expression,
  quotes included:

    Hello ${body}!          => Hello World!
    +++++++++++++           => +++++++++++++

INCREMENT / DECREMENT
  ++ or -- written directly after a placeholder adds or subtracts one:

    ${header.count}++       (count = 123)  => 124
    Logging ++ start ++     => Logging ++ start ++  (unchanged)

QUOTING IN PREDICATES
  String operands are single or double quoted and may contain placeholders:

    ${header.name} == 'Hello ${body}'

  Bare words on the right of an operator must be numbers, true, false or
  null. Anything else is a syntax error located at the word.

ERRORS
  Syntax errors report the 0-based character offset of the token that
  caused the failure:

    ${body} == == 'foo'
                 ^
"#;

const OPERATORS_DOC: &str = r#"OPERATORS

COMPARISON
  ==   !=               Equality; numbers compare numerically
  =~   !=~              Case-insensitive equality
  >  >=  <  <=          Ordering; numeric when both sides are numbers
  contains  !contains   Substring, or membership for a list
  ~~   !~~              Case-insensitive substring
  in  not in  !in       Membership in a comma separated list: 'a,b,c'
  regex  not regex      The whole value matches the pattern
  is  not is  !is       Type check: ${body} is String
  range  not range      Inclusive numeric range: 100..199
  starts with           Prefix (also startsWith)
  ends with             Suffix (also endsWith)

  Any keyword operator can be negated with 'not ' or a '!' prefix.

NULL
  null is the absent value. Only null equals null, and every ordering
  comparison involving null is false:

    ${header.missing} == null     => true
    ${body} == null               (body '') => false

LOGICAL
  &&  and               Both sides must hold
  ||  or                Either side must hold

  && binds tighter than ||. There are no parentheses:

    a || b && c   is   a || (b && c)

  Evaluation short-circuits from left to right.

TRUTHINESS
  A placeholder alone is a condition. It holds when the value is present,
  and for text when it is non-empty and not 'false'. An empty predicate is
  always false.
"#;

const PROPERTIES_DOC: &str = r#"PROPERTIES

  body, in.body               The message body
  body.items.0                Navigate into map and list bodies
  header.foo                  Header 'foo' (also header:foo, header[foo],
                              headers.foo, in.header.foo)
  headers                     All headers as a map
  exchangeProperty.foo        Exchange property 'foo'
  variable.foo                Variable 'foo'
  sys.NAME  sysenv.NAME  env.NAME
                              Process environment variable
  messageHistory              Ids of the steps the message went through

  Missing headers, properties and variables resolve to null. Unknown
  property paths are an evaluation error.
"#;

const FUNCTIONS_DOC: &str = r#"FUNCTIONS

TYPED ACCESS
  bodyAs(Type)                Body converted to a type
  headerAs(name, Type)        Header converted to a type

TEXT
  uppercase([value])          Upper case; the body when no value is given
  lowercase([value])          Lower case
  trim([value])               Without surrounding whitespace
  length([value])             Characters of text, elements of a list
  isEmpty([value])            True for null, '' and empty collections
  not([value])                Negated truthiness
  concat(a, b, ...)           Arguments joined as text
  substringBefore([value,] separator)
  substringAfter([value,] separator)
  replace(from, to[, value])

BEANS
  ${bean:generator.generateId}         Invoke a registered bean method
  ${bean:generator.next('order')}      With arguments
"#;

const TYPES_DOC: &str = r#"TYPES

  String    java.lang.String, CharSequence
  Integer   int, Long, long, java.lang.Integer, java.lang.Long
  Double    double, Float, float, java.lang.Double, java.lang.Float
  Number    java.lang.Number (any numeric value)
  Boolean   boolean, java.lang.Boolean
  List      Collection, java.util.List, java.util.Collection
  Map       java.util.Map
  Object    java.lang.Object (any value that is not null)

  Class names are resolved when a predicate is parsed; an unknown name is a
  syntax error located at the name. Names may be quoted:

    ${body} is 'java.lang.String'
"#;
