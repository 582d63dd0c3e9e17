//! Constraint-violation enumeration.

use crate::ir::{Constraints, SchemaKind, SchemaRef};
use crate::mutation::baseline::{number_value, synthesize};
use crate::mutation::model::{
    ExpectedFailure, MutationCase, MutationCategory, MAX_SYNTHESIZED_LEN, ROOT_FIELD,
    VALIDATION_STATUSES,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const ENUM_SENTINEL: &str = "__invalid_enum__";

/// Enumerate the invalid-payload cases for a request body.
///
/// Deterministic and finite: calling it twice on equal schemas yields equal
/// sequences. For an object body the order is every `missing_required`
/// case (property order), then for each property in name order:
/// `wrong_type`, `null_injection`, `invalid_enum`, `below_minimum`,
/// `above_maximum`, `format_violation`. Any other body gets the value cases
/// applied to the body itself. Nested properties are not mutated.
pub fn mutate(schema: &SchemaRef) -> Vec<MutationCase> {
    let mut cases = Vec::new();

    match (&schema.kind, synthesize(schema)) {
        (
            SchemaKind::Object {
                properties,
                required,
            },
            Value::Object(baseline),
        ) => {
            for name in required {
                if !baseline.contains_key(name) {
                    continue;
                }
                let mut payload = baseline.clone();
                payload.remove(name);
                cases.push(case(
                    MutationCategory::MissingRequired,
                    name,
                    Value::Object(payload),
                    format!("required field '{name}' is missing"),
                ));
            }

            for (name, child) in properties {
                if child.read_only {
                    continue;
                }
                for violation in value_violations(child) {
                    let mut payload = baseline.clone();
                    payload.insert(name.clone(), violation.value);
                    cases.push(case(
                        violation.category,
                        name,
                        Value::Object(payload),
                        format!("'{name}' {}", violation.reason),
                    ));
                }
            }
        }
        _ => {
            for violation in value_violations(schema) {
                cases.push(case(
                    violation.category,
                    ROOT_FIELD,
                    violation.value,
                    format!("body {}", violation.reason),
                ));
            }
        }
    }

    assign_unique_ids(&mut cases);
    cases
}

struct Violation {
    category: MutationCategory,
    value: Value,
    reason: String,
}

impl Violation {
    fn new(category: MutationCategory, value: Value, reason: String) -> Self {
        Self {
            category,
            value,
            reason,
        }
    }
}

fn case(category: MutationCategory, field: &str, payload: Value, reason: String) -> MutationCase {
    MutationCase {
        id: String::new(),
        category,
        field: field.to_string(),
        payload,
        expectation: ExpectedFailure {
            statuses: VALIDATION_STATUSES.to_vec(),
            field: field.to_string(),
            reason,
            error_body: None,
        },
    }
}

/// Value-level cases for one schema node, in category order.
fn value_violations(schema: &SchemaRef) -> Vec<Violation> {
    let mut out = Vec::new();

    if let Some(value) = wrong_type_value(schema) {
        out.push(Violation::new(
            MutationCategory::WrongType,
            value,
            format!("has the wrong type (expected {})", schema.kind_name()),
        ));
    }

    if accepts_non_null(schema) && !accepts_null(schema) {
        out.push(Violation::new(
            MutationCategory::NullInjection,
            Value::Null,
            "is null but not nullable".to_string(),
        ));
    }

    if let SchemaKind::Enum { values } = &schema.kind {
        out.push(Violation::new(
            MutationCategory::InvalidEnum,
            invalid_enum_value(values),
            "is not one of the allowed values".to_string(),
        ));
    }

    out.extend(bound_violations(schema));

    if let Some((format, literal)) = schema
        .format
        .as_deref()
        .filter(|_| matches!(schema.kind, SchemaKind::String))
        .and_then(|f| invalid_format_literal(f).map(|l| (f, l)))
    {
        out.push(Violation::new(
            MutationCategory::FormatViolation,
            Value::String(literal.to_string()),
            format!("is not a valid {format}"),
        ));
    }

    out
}

fn bound_violations(schema: &SchemaRef) -> Vec<Violation> {
    let c: &Constraints = &schema.constraints;
    let mut out = Vec::new();

    match &schema.kind {
        SchemaKind::Integer | SchemaKind::Number => {
            let integer = matches!(schema.kind, SchemaKind::Integer);
            if let Some(min) = c.minimum {
                match past_bound(min, -1, integer) {
                    Some(value) => out.push(Violation::new(
                        MutationCategory::BelowMinimum,
                        value,
                        format!("is below the minimum {min}"),
                    )),
                    None => tracing::debug!(minimum = min, "no representable value below minimum"),
                }
            }
            if let Some(max) = c.maximum {
                match past_bound(max, 1, integer) {
                    Some(value) => out.push(Violation::new(
                        MutationCategory::AboveMaximum,
                        value,
                        format!("is above the maximum {max}"),
                    )),
                    None => tracing::debug!(maximum = max, "no representable value above maximum"),
                }
            }
        }
        SchemaKind::String => {
            if let Some(min) = c.min_length.filter(|m| *m > 0) {
                if let Some(len) = synthesizable_len(min - 1) {
                    out.push(Violation::new(
                        MutationCategory::BelowMinimum,
                        Value::String("a".repeat(len)),
                        format!("is shorter than {min} characters"),
                    ));
                }
            }
            if let Some(max) = c.max_length {
                if let Some(len) = max.checked_add(1).and_then(synthesizable_len) {
                    out.push(Violation::new(
                        MutationCategory::AboveMaximum,
                        Value::String("a".repeat(len)),
                        format!("is longer than {max} characters"),
                    ));
                }
            }
        }
        SchemaKind::Array { items } => {
            let item = items.as_deref().map(synthesize).unwrap_or(Value::Null);
            if let Some(min) = c.min_items.filter(|m| *m > 0) {
                if let Some(len) = synthesizable_len(min - 1) {
                    out.push(Violation::new(
                        MutationCategory::BelowMinimum,
                        Value::Array(vec![item.clone(); len]),
                        format!("has fewer than {min} items"),
                    ));
                }
            }
            if let Some(max) = c.max_items {
                if let Some(len) = max.checked_add(1).and_then(synthesizable_len) {
                    out.push(Violation::new(
                        MutationCategory::AboveMaximum,
                        Value::Array(vec![item; len]),
                        format!("has more than {max} items"),
                    ));
                }
            }
        }
        _ => {}
    }

    out
}

/// `len` as a usize when it is within the synthesis cap.
fn synthesizable_len(len: u64) -> Option<usize> {
    if len > MAX_SYNTHESIZED_LEN {
        tracing::debug!(len, cap = MAX_SYNTHESIZED_LEN, "boundary case skipped");
        return None;
    }
    usize::try_from(len).ok()
}

/// A number strictly on the `direction` side of `bound`.
///
/// Integral bounds of integer nodes move by exactly one in `i64`. When that
/// overflows, or the float step is absorbed by rounding, the bound is
/// doubled away from itself instead.
fn past_bound(bound: f64, direction: i8, integer: bool) -> Option<Value> {
    let integral = integer && bound.fract() == 0.0;
    if integral && bound >= i64::MIN as f64 && bound < -(i64::MIN as f64) {
        let stepped = if direction < 0 {
            (bound as i64).checked_sub(1)
        } else {
            (bound as i64).checked_add(1)
        };
        if let Some(value) = stepped {
            return Some(Value::from(value));
        }
    }

    let sign = f64::from(direction);
    let candidate = match bound + sign {
        near if near != bound => near,
        _ => bound + sign * bound.abs(),
    };
    let outside = if direction < 0 {
        candidate < bound
    } else {
        candidate > bound
    };
    (candidate.is_finite() && outside).then(|| number_value(candidate, integral))
}

/// A value of a different primitive kind, if the node has a definite kind.
fn wrong_type_value(schema: &SchemaRef) -> Option<Value> {
    Some(match &schema.kind {
        SchemaKind::String => Value::from(12345),
        SchemaKind::Integer | SchemaKind::Number => Value::from("not-a-number"),
        SchemaKind::Boolean => Value::from("not-a-boolean"),
        SchemaKind::Array { .. } => Value::from("not-an-array"),
        SchemaKind::Object { .. } | SchemaKind::Recursive { .. } => Value::from("not-an-object"),
        SchemaKind::Enum { values } => {
            if !values.iter().any(Value::is_number) {
                Value::from(12345)
            } else if !values.iter().any(Value::is_string) {
                Value::from("not-an-enum-member")
            } else if !values.iter().any(Value::is_boolean) {
                Value::Bool(true)
            } else {
                Value::Object(Map::new())
            }
        }
        SchemaKind::Null | SchemaKind::Union { .. } | SchemaKind::Any => return None,
    })
}

fn accepts_null(schema: &SchemaRef) -> bool {
    schema.nullable
        || match &schema.kind {
            SchemaKind::Null | SchemaKind::Any => true,
            SchemaKind::Enum { values } => values.iter().any(Value::is_null),
            SchemaKind::Union { variants } => variants.iter().any(accepts_null),
            _ => false,
        }
}

fn accepts_non_null(schema: &SchemaRef) -> bool {
    !matches!(schema.kind, SchemaKind::Null)
}

/// A literal guaranteed not to be a member of `values`.
fn invalid_enum_value(values: &[Value]) -> Value {
    let numbers: Vec<f64> = values.iter().filter_map(Value::as_f64).collect();
    let booleans: Vec<bool> = values.iter().filter_map(Value::as_bool).collect();

    if !numbers.is_empty() && numbers.len() + count_nulls(values) == values.len() {
        let max = numbers.iter().copied().fold(f64::MIN, f64::max);
        let integral = values.iter().all(|v| v.is_i64() || v.is_u64() || v.is_null());
        return number_value(max + 1.0, integral);
    }

    if !booleans.is_empty() && booleans.len() + count_nulls(values) == values.len() {
        for candidate in [true, false] {
            if !booleans.contains(&candidate) {
                return Value::Bool(candidate);
            }
        }
    }

    let mut sentinel = ENUM_SENTINEL.to_string();
    while values.iter().any(|v| v.as_str() == Some(sentinel.as_str())) {
        sentinel.push('_');
    }
    Value::String(sentinel)
}

fn count_nulls(values: &[Value]) -> usize {
    values.iter().filter(|v| v.is_null()).count()
}

/// Malformed literal for a known string format.
pub fn invalid_format_literal(format: &str) -> Option<&'static str> {
    Some(match format {
        "email" => "not-an-email",
        "uuid" => "not-a-uuid",
        "date-time" => "not-a-date-time",
        "date" => "2024-13-45",
        "time" => "25:61:61",
        "uri" | "url" => "not a uri",
        "ipv4" => "999.999.999.999",
        "ipv6" => "not:an:ipv6:::address",
        "hostname" => "-invalid-.hostname-",
        _ => return None,
    })
}

/// `<category>_<field>` with the field reduced to `[a-z0-9_]`; a numeric
/// suffix separates fields that reduce to the same text.
fn assign_unique_ids(cases: &mut [MutationCase]) {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    for case in cases.iter_mut() {
        let field = if case.field == ROOT_FIELD {
            "body".to_string()
        } else {
            identifier_slug(&case.field)
        };
        let base = format!("{}_{}", case.category.as_str(), field);
        let count = seen.entry(base.clone()).or_insert(0);
        *count += 1;
        case.id = if *count == 1 {
            base
        } else {
            format!("{base}_{count}")
        };
    }
}

pub(crate) fn identifier_slug(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "field".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(cases: &[MutationCase]) -> Vec<&str> {
        cases.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_object_case_order() {
        let schema = SchemaRef::object(
            vec![
                ("name", SchemaRef::string()),
                ("age", SchemaRef::integer().with_minimum(0.0)),
            ],
            vec!["name"],
        );
        assert_eq!(
            ids(&mutate(&schema)),
            vec![
                "missing_required_name",
                "wrong_type_age",
                "null_injection_age",
                "below_minimum_age",
                "wrong_type_name",
                "null_injection_name",
            ]
        );
    }

    #[test]
    fn test_unbounded_field_has_no_boundary_case() {
        let schema = SchemaRef::object(vec![("n", SchemaRef::integer())], vec!["n"]);
        assert!(mutate(&schema)
            .iter()
            .all(|c| c.category != MutationCategory::BelowMinimum
                && c.category != MutationCategory::AboveMaximum));
    }

    #[test]
    fn test_nullable_field_gets_no_null_injection() {
        let schema = SchemaRef::object(vec![("n", SchemaRef::string().nullable())], vec!["n"]);
        assert!(mutate(&schema)
            .iter()
            .all(|c| c.category != MutationCategory::NullInjection));
    }

    #[test]
    fn test_root_array_body() {
        let mut schema = SchemaRef::array(SchemaRef::string());
        schema.constraints.max_items = Some(1);
        let cases = mutate(&schema);
        assert_eq!(
            ids(&cases),
            vec!["wrong_type_body", "null_injection_body", "above_maximum_body"]
        );
        assert_eq!(cases[2].payload, json!(["a", "a"]));
        assert_eq!(cases[2].field, ROOT_FIELD);
    }

    #[test]
    fn test_invalid_enum_sentinels() {
        assert_eq!(
            invalid_enum_value(&[json!("a"), json!("__invalid_enum__")]),
            json!("__invalid_enum___")
        );
        assert_eq!(invalid_enum_value(&[json!(1), json!(7)]), json!(8));
        assert_eq!(invalid_enum_value(&[json!(true)]), json!(false));
        assert_eq!(
            invalid_enum_value(&[json!(true), json!(false)]),
            json!("__invalid_enum__")
        );
    }

    #[test]
    fn test_enum_wrong_type_uses_absent_kind() {
        let strings = SchemaRef::enumeration(vec![json!("x")]);
        assert_eq!(wrong_type_value(&strings), Some(json!(12345)));
        let numbers = SchemaRef::enumeration(vec![json!(1)]);
        assert_eq!(wrong_type_value(&numbers), Some(json!("not-an-enum-member")));
    }

    #[test]
    fn test_string_length_boundaries() {
        let schema = SchemaRef::string().with_length(Some(2), Some(4));
        let cases = mutate(&schema);
        let below = cases
            .iter()
            .find(|c| c.category == MutationCategory::BelowMinimum)
            .unwrap();
        let above = cases
            .iter()
            .find(|c| c.category == MutationCategory::AboveMaximum)
            .unwrap();
        assert_eq!(below.payload, json!("a"));
        assert_eq!(above.payload, json!("aaaaa"));
    }

    #[test]
    fn test_oversized_length_bounds_skip_unbuildable_cases() {
        let schema = SchemaRef::object(
            vec![
                ("huge", SchemaRef::string().with_length(None, Some(u64::MAX))),
                ("wide", SchemaRef::string().with_length(None, Some(2_147_483_647))),
            ],
            vec!["huge", "wide"],
        );
        let cases = mutate(&schema);
        assert!(cases
            .iter()
            .all(|c| c.category != MutationCategory::AboveMaximum));
        assert!(ids(&cases).contains(&"wrong_type_huge"));

        let mut items = SchemaRef::array(SchemaRef::boolean());
        items.constraints.max_items = Some(u64::MAX);
        items.constraints.min_items = Some(u64::MAX);
        assert!(mutate(&items)
            .iter()
            .all(|c| c.category != MutationCategory::AboveMaximum
                && c.category != MutationCategory::BelowMinimum));
    }

    #[test]
    fn test_length_bound_at_cap_still_produces_case() {
        let max = MAX_SYNTHESIZED_LEN - 1;
        let cases = mutate(&SchemaRef::string().with_length(None, Some(max)));
        let above = cases
            .iter()
            .find(|c| c.category == MutationCategory::AboveMaximum)
            .unwrap();
        assert_eq!(
            above.payload.as_str().map(str::len),
            Some(MAX_SYNTHESIZED_LEN as usize)
        );
    }

    #[test]
    fn test_integer_bounds_at_i64_limits_stay_outside() {
        // Given: the full i64 range
        let schema = SchemaRef::object(
            vec![(
                "n",
                SchemaRef::integer()
                    .with_minimum(i64::MIN as f64)
                    .with_maximum(i64::MAX as f64),
            )],
            vec!["n"],
        );

        // When
        let cases = mutate(&schema);

        // Then: both boundary payloads lie strictly outside the range
        let value = |category| {
            cases
                .iter()
                .find(|c| c.category == category)
                .and_then(|c| c.payload["n"].as_f64())
                .unwrap()
        };
        assert!(value(MutationCategory::BelowMinimum) < i64::MIN as f64);
        assert!(value(MutationCategory::AboveMaximum) > i64::MAX as f64);
    }

    #[test]
    fn test_integer_bounds_step_by_one_near_limits() {
        let schema = SchemaRef::integer()
            .with_minimum(-9_007_199_254_740_992.0)
            .with_maximum(9_007_199_254_740_992.0);
        let cases = mutate(&schema);
        let payloads: Vec<&Value> = cases
            .iter()
            .filter(|c| {
                matches!(
                    c.category,
                    MutationCategory::BelowMinimum | MutationCategory::AboveMaximum
                )
            })
            .map(|c| &c.payload)
            .collect();
        assert_eq!(
            payloads,
            vec![&json!(-9_007_199_254_740_993_i64), &json!(9_007_199_254_740_993_i64)]
        );
    }

    #[test]
    fn test_unrepresentable_float_bound_is_skipped() {
        let cases = mutate(&SchemaRef::number().with_maximum(f64::MAX));
        assert!(cases
            .iter()
            .all(|c| c.category != MutationCategory::AboveMaximum));
    }

    #[test]
    fn test_colliding_field_slugs_get_suffixes() {
        let schema = SchemaRef::object(
            vec![("a-b", SchemaRef::boolean()), ("a_b", SchemaRef::boolean())],
            Vec::<&str>::new(),
        );
        let cases = mutate(&schema);
        assert!(ids(&cases).contains(&"wrong_type_a_b"));
        assert!(ids(&cases).contains(&"wrong_type_a_b_2"));
    }

    #[test]
    fn test_identifier_slug() {
        assert_eq!(identifier_slug("userName"), "username");
        assert_eq!(identifier_slug("x-request.id"), "x_request_id");
        assert_eq!(identifier_slug("--"), "field");
    }
}
