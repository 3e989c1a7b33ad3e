//! Constant evaluator: literal tokens to typed constants.
//!
//! Rules are tried in a fixed order and the first that accepts the token
//! wins, so `123` is an `INT` rather than a `LONG` and `int` is a type
//! constant rather than an error.
//!
//! 1. `null` / `nan` (any case): untyped null
//! 2. Quoted text: `'x'` is a `CHAR`, `''` an empty string, anything else a
//!    string with `''` unescaped
//! 3. `E'...'`: a string with backslash escapes decoded
//! 4. `true` / `false`
//! 5. Numbers: `INT`, then `LONG` (optional `L` suffix), then `DOUBLE`, then
//!    `FLOAT` (with an `f` suffix)
//! 6. Castable type names, including `geohash(5c)`: type constants
//! 7. `#u33d`, `#u33d/18`, `##0101`: geohash values
//! 8. `0x` followed by up to 64 hex digits: `LONG256`

use sqlfn_core::{BoxedFunction, ColumnType, Constant, ResolveError, Span, TypeConstant};

use crate::geohash;

type Result<T> = std::result::Result<T, ResolveError>;

/// Parse a constant token into an evaluator.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn parse_constant(position: Span, token: &str) -> Result<BoxedFunction> {
    if token.eq_ignore_ascii_case("null") || token.eq_ignore_ascii_case("nan") {
        return Ok(Box::new(Constant::untyped_null()));
    }

    if let Some(inner) = unquote(token) {
        let mut chars = inner.chars();
        return Ok(Box::new(match (chars.next(), chars.next()) {
            (None, _) => Constant::str(""),
            (Some(c), None) => Constant::char(c),
            _ => Constant::str(inner.replace("''", "'")),
        }));
    }

    if let Some(inner) = token
        .strip_prefix("E'")
        .and_then(|rest| rest.strip_suffix('\''))
    {
        return Ok(Box::new(Constant::str(decode_escapes(inner))));
    }

    if token.eq_ignore_ascii_case("true") {
        return Ok(Box::new(Constant::boolean(true)));
    }
    if token.eq_ignore_ascii_case("false") {
        return Ok(Box::new(Constant::boolean(false)));
    }

    if let Some(constant) = parse_number(token) {
        return Ok(Box::new(constant));
    }

    if let Some(column_type) = ColumnType::parse(token) {
        if column_type.tag().is_castable() {
            return Ok(Box::new(TypeConstant::new(column_type)));
        }
    }

    if token.starts_with('#') {
        if let Some(constant) = geohash::parse_literal(token) {
            return Ok(Box::new(constant));
        }
    }

    if let Some(limbs) = parse_long256(token) {
        return Ok(Box::new(Constant::long256(limbs)));
    }

    Err(ResolveError::InvalidConstant {
        token: token.to_string(),
        span: position,
    })
}

/// Body of a token wrapped in matching single or double quotes.
fn unquote(token: &str) -> Option<&str> {
    let first = token.chars().next()?;
    if token.len() < 2 || (first != '\'' && first != '"') {
        return None;
    }
    token.strip_prefix(first)?.strip_suffix(first)
}

fn decode_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn parse_number(token: &str) -> Option<Constant> {
    if let Ok(v) = token.parse::<i32>() {
        return Some(Constant::int(v));
    }
    let long_text = token
        .strip_suffix('L')
        .or_else(|| token.strip_suffix('l'))
        .unwrap_or(token);
    if let Ok(v) = long_text.parse::<i64>() {
        return Some(Constant::long(v));
    }
    if looks_numeric(token) {
        if let Ok(v) = token.parse::<f64>() {
            return Some(Constant::double(v));
        }
    }
    let float_text = token
        .strip_suffix('f')
        .or_else(|| token.strip_suffix('F'))?;
    if looks_numeric(float_text) {
        if let Ok(v) = float_text.parse::<f32>() {
            return Some(Constant::float(v));
        }
    }
    None
}

/// Digits with an optional sign, point and exponent. Rejects the `inf` and
/// `nan` spellings the standard parser would accept.
fn looks_numeric(text: &str) -> bool {
    let body = text.strip_prefix(['-', '+']).unwrap_or(text);
    body.bytes().any(|b| b.is_ascii_digit())
        && body
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'-' | b'+'))
        && body.bytes().next().is_some_and(|b| b.is_ascii_digit() || b == b'.')
}

fn parse_long256(token: &str) -> Option<[u64; 4]> {
    let hex = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))?;
    if hex.is_empty() || hex.len() > 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let mut limbs = [0u64; 4];
    let mut end = hex.len();
    for limb in &mut limbs {
        if end == 0 {
            break;
        }
        let start = end.saturating_sub(16);
        *limb = u64::from_str_radix(&hex[start..end], 16).ok()?;
        end = start;
    }
    Some(limbs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlfn_core::{EmptyRecord, Function, FunctionTraits, TypeTag, Value};

    fn parse(token: &str) -> BoxedFunction {
        parse_constant(Span::point(0), token).unwrap()
    }

    fn value_of(token: &str) -> Value {
        parse(token).eval(&EmptyRecord)
    }

    #[test]
    fn null_keywords() {
        for token in ["null", "NULL", "NaN"] {
            let f = parse(token);
            assert_eq!(f.column_type(), ColumnType::NULL);
            assert!(f.as_constant().unwrap().is_null());
        }
    }

    #[test]
    fn quoted_text() {
        assert_eq!(parse("'x'").column_type(), ColumnType::CHAR);
        assert_eq!(value_of("'x'"), Value::Char('x'));
        assert_eq!(value_of("''"), Value::str(""));
        assert_eq!(parse("''").column_type(), ColumnType::STRING);
        assert_eq!(value_of("'it''s'"), Value::str("it's"));
        assert_eq!(value_of("\"ab\""), Value::str("ab"));
    }

    #[test]
    fn escaped_text() {
        assert_eq!(value_of(r"E'a\nb\\c\'d'"), Value::str("a\nb\\c'd"));
    }

    #[test]
    fn booleans() {
        assert_eq!(value_of("TRUE"), Value::Boolean(true));
        assert_eq!(value_of("false"), Value::Boolean(false));
    }

    #[test]
    fn int_literal_prefers_int() {
        assert_eq!(parse("123").column_type(), ColumnType::INT);
        assert_eq!(parse("-7").column_type(), ColumnType::INT);
        assert_eq!(parse("3000000000").column_type(), ColumnType::LONG);
        assert_eq!(value_of("5L"), Value::Long(5));
    }

    #[test]
    fn floating_literals() {
        assert_eq!(parse("1.5").column_type(), ColumnType::DOUBLE);
        assert_eq!(parse("1e3").column_type(), ColumnType::DOUBLE);
        assert_eq!(parse("1.5f").column_type(), ColumnType::FLOAT);
        assert!(parse_constant(Span::point(0), "inf").is_err());
    }

    #[test]
    fn type_names_become_type_constants() {
        let f = parse("int");
        assert!(f.traits().contains(FunctionTraits::TYPE_CONSTANT));
        assert_eq!(f.column_type(), ColumnType::INT);

        let f = parse("geohash(4c)");
        assert_eq!(f.column_type(), ColumnType::geohash(20));

        let f = parse("double[]");
        assert_eq!(f.column_type(), ColumnType::array(TypeTag::Double, 1));

        // Not castable.
        assert!(parse_constant(Span::point(0), "cursor").is_err());
    }

    #[test]
    fn geohash_values() {
        let f = parse("#sp05");
        assert_eq!(f.column_type(), ColumnType::geohash(20));
        assert!(f.is_constant());
        assert_eq!(parse("##11").column_type(), ColumnType::geohash(2));
    }

    #[test]
    fn long256_values() {
        assert_eq!(value_of("0xff"), Value::Long256([0xff, 0, 0, 0]));
        let wide = format!("0x1{}", "0".repeat(16));
        assert_eq!(value_of(&wide), Value::Long256([0, 1, 0, 0]));
        let too_wide = format!("0x{}", "f".repeat(65));
        assert!(parse_constant(Span::point(0), &too_wide).is_err());
    }

    #[test]
    fn unknown_tokens_fail_with_position() {
        let err = parse_constant(Span::new(9, 3), "abc").unwrap_err();
        assert_eq!(
            err,
            ResolveError::InvalidConstant {
                token: "abc".to_string(),
                span: Span::new(9, 3),
            }
        );
    }
}
