//! Valid baseline payload synthesis.
//!
//! Every value sits inside the declared constraints, at the legal edge when
//! a bound exists, so a single-field mutation is the only reason a request
//! built from it can be rejected.

use crate::ir::{Constraints, SchemaKind, SchemaRef};
use crate::mutation::model::MAX_SYNTHESIZED_LEN;
use serde_json::{Map, Number, Value};

/// 2^63, the first integral value past `i64::MAX`.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Synthesize a minimal valid example for `schema`.
///
/// Objects carry every required, non-read-only property and nothing else.
pub fn synthesize(schema: &SchemaRef) -> Value {
    match &schema.kind {
        SchemaKind::Object {
            properties,
            required,
        } => {
            let mut map = Map::new();
            for (name, child) in properties {
                if required.contains(name) && !child.read_only {
                    map.insert(name.clone(), synthesize(child));
                }
            }
            Value::Object(map)
        }
        SchemaKind::Array { items } => {
            let count = capped_len(schema.constraints.min_items.unwrap_or(0));
            let item = items.as_deref().map(synthesize).unwrap_or(Value::Null);
            Value::Array((0..count).map(|_| item.clone()).collect())
        }
        SchemaKind::String => Value::String(synthesize_string(schema)),
        SchemaKind::Integer => synthesize_number(&schema.constraints, true),
        SchemaKind::Number => synthesize_number(&schema.constraints, false),
        SchemaKind::Boolean => Value::Bool(true),
        SchemaKind::Enum { values } => values.first().cloned().unwrap_or(Value::Null),
        SchemaKind::Union { variants } => variants.first().map(synthesize).unwrap_or(Value::Null),
        SchemaKind::Null => Value::Null,
        SchemaKind::Any => Value::String("any".to_string()),
        SchemaKind::Recursive { .. } => Value::Object(Map::new()),
    }
}

/// Valid literal for a known string format.
pub fn valid_format_literal(format: &str) -> Option<&'static str> {
    Some(match format {
        "email" => "user@example.com",
        "uuid" => "123e4567-e89b-12d3-a456-426614174000",
        "date-time" => "2024-01-01T00:00:00Z",
        "date" => "2024-01-01",
        "time" => "00:00:00",
        "uri" | "url" => "https://example.com/resource",
        "ipv4" => "192.0.2.1",
        "ipv6" => "2001:db8::1",
        "hostname" => "example.com",
        _ => return None,
    })
}

fn synthesize_string(schema: &SchemaRef) -> String {
    let c = &schema.constraints;
    let fits = |len: usize| {
        c.min_length.map_or(true, |min| len as u64 >= min)
            && c.max_length.map_or(true, |max| len as u64 <= max)
    };

    if let Some(literal) = schema.format.as_deref().and_then(valid_format_literal) {
        if fits(literal.len()) {
            return literal.to_string();
        }
    }

    let len = match c.min_length {
        Some(min) => min,
        None => c.max_length.unwrap_or(1).min(1),
    };
    "a".repeat(capped_len(len) as usize)
}

/// Clamp a declared length to what synthesis will materialize.
fn capped_len(len: u64) -> u64 {
    if len > MAX_SYNTHESIZED_LEN {
        tracing::debug!(len, cap = MAX_SYNTHESIZED_LEN, "declared length exceeds synthesis cap");
    }
    len.min(MAX_SYNTHESIZED_LEN)
}

fn synthesize_number(c: &Constraints, integer: bool) -> Value {
    if let Some(min) = c.minimum {
        let value = match (integer, c.exclusive_minimum) {
            (true, true) => min.floor() + 1.0,
            (true, false) => min.ceil(),
            (false, true) => next_above(min, c.maximum),
            (false, false) => min,
        };
        return number_value(value, integer);
    }

    if let Some(max) = c.maximum {
        let top = match (integer, c.exclusive_maximum) {
            (true, true) => max.ceil() - 1.0,
            (true, false) => max.floor(),
            (false, true) if max <= 0.0 => max - 1.0,
            (false, _) => max,
        };
        return number_value(top.min(0.0), integer);
    }

    number_value(0.0, integer)
}

/// Smallest "round" value strictly above an exclusive lower bound.
fn next_above(min: f64, max: Option<f64>) -> f64 {
    match max {
        Some(max) if min + 1.0 >= max => (min + max) / 2.0,
        _ => min + 1.0,
    }
}

/// JSON number for `value`; integral values inside the `i64` range stay integers.
pub(crate) fn number_value(value: f64, integer: bool) -> Value {
    let integral = value.fract() == 0.0 && (integer || value.abs() < 1e15);
    if integral && (-I64_LIMIT..I64_LIMIT).contains(&value) {
        Value::from(value as i64)
    } else {
        Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::from(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_has_only_required_writable_fields() {
        let schema = SchemaRef::object(
            vec![
                ("id", SchemaRef::integer().read_only()),
                ("name", SchemaRef::string()),
                ("nickname", SchemaRef::string()),
            ],
            vec!["id", "name"],
        );
        assert_eq!(synthesize(&schema), json!({"name": "a"}));
    }

    #[test]
    fn test_integer_sits_on_minimum() {
        assert_eq!(synthesize(&SchemaRef::integer().with_minimum(0.0)), json!(0));
        assert_eq!(synthesize(&SchemaRef::integer().with_minimum(1.0)), json!(1));

        let mut exclusive = SchemaRef::integer().with_minimum(5.0);
        exclusive.constraints.exclusive_minimum = true;
        assert_eq!(synthesize(&exclusive), json!(6));
    }

    #[test]
    fn test_maximum_only_picks_largest_legal_value_not_above_zero() {
        assert_eq!(synthesize(&SchemaRef::integer().with_maximum(10.0)), json!(0));
        assert_eq!(synthesize(&SchemaRef::integer().with_maximum(-3.0)), json!(-3));
    }

    #[test]
    fn test_string_respects_lengths_and_formats() {
        assert_eq!(
            synthesize(&SchemaRef::string().with_length(Some(3), None)),
            json!("aaa")
        );
        assert_eq!(
            synthesize(&SchemaRef::string().with_length(None, Some(0))),
            json!("")
        );
        assert_eq!(
            synthesize(&SchemaRef::string().with_format("email")),
            json!("user@example.com")
        );
        // Literal too long for the bound falls back to padding.
        assert_eq!(
            synthesize(
                &SchemaRef::string()
                    .with_format("email")
                    .with_length(Some(2), Some(4))
            ),
            json!("aa")
        );
    }

    #[test]
    fn test_array_uses_min_items() {
        let mut schema = SchemaRef::array(SchemaRef::boolean());
        schema.constraints.min_items = Some(2);
        assert_eq!(synthesize(&schema), json!([true, true]));
    }

    #[test]
    fn test_huge_lengths_are_capped() {
        let long = synthesize(&SchemaRef::string().with_length(Some(u64::MAX), None));
        assert_eq!(long.as_str().map(str::len), Some(MAX_SYNTHESIZED_LEN as usize));

        let mut schema = SchemaRef::array(SchemaRef::boolean());
        schema.constraints.min_items = Some(u64::MAX);
        let items = synthesize(&schema);
        assert_eq!(
            items.as_array().map(Vec::len),
            Some(MAX_SYNTHESIZED_LEN as usize)
        );
    }

    #[test]
    fn test_integer_past_i64_range_does_not_saturate() {
        // 2^63 cannot be held by i64; the value must still satisfy the minimum.
        let schema = SchemaRef::integer().with_minimum(I64_LIMIT);
        let value = synthesize(&schema);
        assert!(value.as_f64().is_some_and(|v| v >= I64_LIMIT));
        assert_eq!(number_value(-I64_LIMIT, true), json!(i64::MIN));
    }

    #[test]
    fn test_enum_uses_first_declared_value() {
        let schema = SchemaRef::enumeration(vec![json!("b"), json!("a")]);
        assert_eq!(synthesize(&schema), json!("b"));
    }
}
