//! Signature descriptors parsed from textual signatures.
//!
//! # Grammar
//!
//! ```text
//! signature := name '(' [ arg { ',' arg } ] ')'
//! arg       := ( type { '[]' } | 'var' ) [ 'const' | 'constant' ]
//! ```
//!
//! `type` is any SQL type name accepted by [`ColumnType::parse`], including
//! `geohash` (any precision) and `geohash(5c)`. `var` marks a variadic tail
//! and must come last; `var const` requires every tail argument to be
//! constant. Names may be operators such as `+` or `<=`.
//!
//! ```
//! use sqlfn_registry::signature::parse_signature;
//!
//! let parsed = parse_signature("round(double, int const)").unwrap();
//! assert_eq!(parsed.name, "round");
//! assert_eq!(parsed.args.len(), 2);
//! assert!(parsed.args[1].is_constant());
//! ```

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use sqlfn_core::{ColumnType, RegistrationError, TypeTag};

use crate::factory::FunctionFactory;

bitflags! {
    /// Per-parameter requirements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ArgFlags: u8 {
        /// The argument must be a constant.
        const CONSTANT = 1 << 0;
        /// The argument must be an array.
        const ARRAY = 1 << 1;
    }
}

/// One declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArgSpec {
    column_type: ColumnType,
    flags: ArgFlags,
}

impl ArgSpec {
    pub fn new(column_type: ColumnType, constant: bool) -> Self {
        let mut flags = ArgFlags::empty();
        flags.set(ArgFlags::CONSTANT, constant);
        flags.set(ArgFlags::ARRAY, column_type.is_array());
        Self { column_type, flags }
    }

    /// The declared type; arrays include their element kind and dimensions.
    #[inline]
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// The tag compared during matching: the element kind for arrays.
    #[inline]
    pub fn tag(&self) -> TypeTag {
        if self.is_array() {
            self.column_type.element_tag()
        } else {
            self.column_type.tag()
        }
    }

    #[inline]
    pub fn flags(&self) -> ArgFlags {
        self.flags
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.flags.contains(ArgFlags::CONSTANT)
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.flags.contains(ArgFlags::ARRAY)
    }
}

impl fmt::Display for ArgSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_type)?;
        if self.is_constant() {
            f.write_str(" constant")?;
        }
        Ok(())
    }
}

/// Result of [`parse_signature`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSignature {
    /// Lower-cased function name.
    pub name: String,
    /// Fixed parameters.
    pub args: Vec<ArgSpec>,
    /// Flags of the variadic tail, when declared.
    pub variadic: Option<ArgFlags>,
}

/// Parse a textual signature.
pub fn parse_signature(signature: &str) -> Result<ParsedSignature, RegistrationError> {
    let invalid = |reason: &str| RegistrationError::InvalidSignature {
        signature: signature.to_string(),
        reason: reason.to_string(),
    };

    let open = signature.find('(').ok_or_else(|| invalid("missing '('"))?;
    let body = signature[open + 1..]
        .trim_end()
        .strip_suffix(')')
        .ok_or_else(|| invalid("missing ')'"))?;
    let name = signature[..open].trim();
    if name.is_empty() {
        return Err(invalid("missing function name"));
    }

    let mut args = Vec::new();
    let mut variadic = None;
    let body = body.trim();
    if !body.is_empty() {
        for raw in split_args(body) {
            if variadic.is_some() {
                return Err(invalid("'var' must be the last parameter"));
            }
            let mut text = raw.trim();
            let mut constant = false;
            for suffix in [" constant", " const"] {
                if let Some(stripped) = strip_suffix_ignore_case(text, suffix) {
                    text = stripped.trim_end();
                    constant = true;
                    break;
                }
            }
            if text.is_empty() {
                return Err(invalid("empty parameter"));
            }
            if text.eq_ignore_ascii_case("var") {
                variadic = Some(if constant {
                    ArgFlags::CONSTANT
                } else {
                    ArgFlags::empty()
                });
                continue;
            }
            let column_type =
                ColumnType::parse(text).ok_or_else(|| RegistrationError::UnknownType {
                    signature: signature.to_string(),
                    type_name: text.to_string(),
                })?;
            args.push(ArgSpec::new(column_type, constant));
        }
    }

    Ok(ParsedSignature {
        name: name.to_ascii_lowercase(),
        args,
        variadic,
    })
}

/// Split on commas outside parentheses, so `geohash(5c)` stays whole.
fn split_args(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in body.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let split = text.len().checked_sub(suffix.len())?;
    if !text.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = text.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

/// One overload candidate: a parsed signature bound to its factory.
#[derive(Clone)]
pub struct SignatureDescriptor {
    name: String,
    args: Vec<ArgSpec>,
    variadic: Option<ArgFlags>,
    window: bool,
    char_to_str: bool,
    factory: Arc<dyn FunctionFactory>,
}

impl SignatureDescriptor {
    /// Parse `factory.signature()` and capture the factory's flags.
    pub fn new(factory: Arc<dyn FunctionFactory>) -> Result<Self, RegistrationError> {
        let ParsedSignature {
            name,
            args,
            variadic,
        } = parse_signature(factory.signature())?;
        Ok(Self {
            name,
            args,
            variadic,
            window: factory.is_window(),
            char_to_str: factory.supports_implicit_char_to_str(),
            factory,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of fixed parameters, excluding the variadic tail.
    #[inline]
    pub fn fixed_arg_count(&self) -> usize {
        self.args.len()
    }

    /// Number of declared parameters, counting the variadic tail as one.
    pub fn declared_arg_count(&self) -> usize {
        self.args.len() + usize::from(self.variadic.is_some())
    }

    pub fn arg(&self, index: usize) -> Option<&ArgSpec> {
        self.args.get(index)
    }

    pub fn args(&self) -> &[ArgSpec] {
        &self.args
    }

    #[inline]
    pub fn is_variadic(&self) -> bool {
        self.variadic.is_some()
    }

    pub fn variadic_requires_constant(&self) -> bool {
        self.variadic
            .is_some_and(|flags| flags.contains(ArgFlags::CONSTANT))
    }

    /// Whether `count` arguments fit this signature's arity.
    pub fn accepts_arity(&self, count: usize) -> bool {
        if self.is_variadic() {
            count >= self.args.len()
        } else {
            count == self.args.len()
        }
    }

    #[inline]
    pub fn is_window(&self) -> bool {
        self.window
    }

    #[inline]
    pub fn supports_implicit_char_to_str(&self) -> bool {
        self.char_to_str
    }

    pub fn factory(&self) -> &Arc<dyn FunctionFactory> {
        &self.factory
    }

    /// The signature text as registered.
    pub fn signature(&self) -> &str {
        self.factory.signature()
    }
}

impl fmt::Display for SignatureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        if let Some(flags) = self.variadic {
            if !self.args.is_empty() {
                f.write_str(", ")?;
            }
            f.write_str("VARARG")?;
            if flags.contains(ArgFlags::CONSTANT) {
                f.write_str(" constant")?;
            }
        }
        f.write_str(")")
    }
}

impl fmt::Debug for SignatureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureDescriptor")
            .field("signature", &self.to_string())
            .field("window", &self.window)
            .field("char_to_str", &self.char_to_str)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fixed_args() {
        let parsed = parse_signature("Round(double, int const)").unwrap();
        assert_eq!(parsed.name, "round");
        assert_eq!(parsed.args[0], ArgSpec::new(ColumnType::DOUBLE, false));
        assert_eq!(parsed.args[1], ArgSpec::new(ColumnType::INT, true));
        assert!(parsed.variadic.is_none());
    }

    #[test]
    fn parse_no_args() {
        let parsed = parse_signature("now()").unwrap();
        assert!(parsed.args.is_empty());
        assert!(parsed.variadic.is_none());
    }

    #[test]
    fn parse_variadic_tail() {
        let parsed = parse_signature("in(string, var const)").unwrap();
        assert_eq!(parsed.args.len(), 1);
        assert_eq!(parsed.variadic, Some(ArgFlags::CONSTANT));

        let err = parse_signature("f(var, int)").unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidSignature { .. }));
    }

    #[test]
    fn parse_arrays_and_geohash() {
        let parsed = parse_signature("f(double[], geohash, geohash(2c))").unwrap();
        assert!(parsed.args[0].is_array());
        assert_eq!(parsed.args[0].tag(), TypeTag::Double);
        assert_eq!(parsed.args[1].tag(), TypeTag::GeoHash);
        assert_eq!(parsed.args[2].column_type(), ColumnType::geohash(10));
    }

    #[test]
    fn parse_operator_names() {
        assert_eq!(parse_signature("<=(int, int)").unwrap().name, "<=");
        assert_eq!(parse_signature("+(long, long)").unwrap().name, "+");
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            parse_signature("f(int"),
            Err(RegistrationError::InvalidSignature { .. })
        ));
        assert!(matches!(
            parse_signature("(int)"),
            Err(RegistrationError::InvalidSignature { .. })
        ));
        assert!(matches!(
            parse_signature("f(blob)"),
            Err(RegistrationError::UnknownType { .. })
        ));
    }

    #[test]
    fn arg_spec_display() {
        assert_eq!(ArgSpec::new(ColumnType::INT, true).to_string(), "INT constant");
        assert_eq!(
            ArgSpec::new(ColumnType::array(TypeTag::Double, 1), false).to_string(),
            "DOUBLE[]"
        );
    }
}
