//! The datatype library: XSD simple-type value validation and equality.
//!
//! Mirrors the shape of a typical XSD simple-type registry (see
//! `examples/other_examples/128d4207_*schemas.rs` for the teacher's sibling
//! crate's approach to a builder-style, table-driven type registry): each
//! datatype is a [`Datatype`] trait object held in a [`TypeLibrary`], looked
//! up by `(library, name)`, with facet parsing split cleanly from value
//! validation so a malformed facet set fails at schema-load time rather than
//! on the first instance value.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::core::errors::{ParameterParsingError, ValueValidationError};
use crate::core::regexp::{translate, TranslatedRegex};

/// Raw `name -> value` facet parameters as they appear in the JSON schema
/// wire format, before a [`Datatype`] has parsed them into a [`CommonParams`].
pub type RawParams = Vec<(String, String)>;

/// One XSD simple type (or the two library-level builtins, `string` and
/// `token`).
///
/// Every datatype in this library happens to share the same facet shape
/// ([`CommonParams`]: length/pattern/enumeration/bounds), so unlike a
/// general-purpose type system this trait works with that concrete struct
/// directly rather than an opaque, downcast `Params` object.
pub trait Datatype: Send + Sync {
    /// Parse this datatype's facets (`pattern`, `minLength`, `enumeration`,
    /// ...) out of the raw wire-format pairs. Called once at schema-load
    /// time; a facet that is structurally invalid (bad regex, non-numeric
    /// bound, `minInclusive` > `maxInclusive`) is reported here, not at
    /// validation time.
    fn parse_params(&self, raw: &RawParams) -> Result<CommonParams, ParameterParsingError>;

    /// Parse instance text into this type's internal value representation,
    /// re-validated later by `disallows`. Most datatypes use the string
    /// itself; numeric/date types additionally check lexical well-formedness
    /// here.
    fn parse_value(
        &self,
        params: &CommonParams,
        text: &str,
    ) -> Result<ParsedValue, ValueValidationError>;

    /// Whether two parsed values of this type are equal (used by `value`
    /// patterns, which fix an expected literal).
    fn equal(&self, params: &CommonParams, a: &ParsedValue, b: &ParsedValue) -> bool {
        let _ = params;
        a == b
    }

    /// Validate a parsed value against this datatype's facets, returning
    /// `Some(reason)` if it's disallowed. `None` means the value is valid.
    fn disallows(&self, params: &CommonParams, value: &ParsedValue) -> Option<String>;

    /// Whether this type needs the surrounding element/attribute's in-scope
    /// namespace context to interpret a value (true only for `QName`/`NOTATION`).
    fn needs_context(&self) -> bool {
        false
    }

    /// Whether this is one of the two types the `builtin` library defines
    /// (`string`, `token`) rather than a full XSD type.
    fn is_builtin(&self) -> bool {
        false
    }
}

/// A parsed datatype value. Kept deliberately simple: most XSD facet checks
/// only need the original lexical text plus an optional numeric projection.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedValue {
    pub lexical: String,
    pub numeric: Option<f64>,
}

impl ParsedValue {
    pub fn text(lexical: impl Into<String>) -> Self {
        ParsedValue {
            lexical: lexical.into(),
            numeric: None,
        }
    }

    pub fn numeric(lexical: impl Into<String>, value: f64) -> Self {
        ParsedValue {
            lexical: lexical.into(),
            numeric: Some(value),
        }
    }
}

/// A registry of datatypes for one library (`"" ` for the builtin library,
/// `"http://www.w3.org/2001/XMLSchema-datatypes"` for XSD).
pub struct TypeLibrary {
    pub uri: &'static str,
    types: HashMap<&'static str, Arc<dyn Datatype>>,
}

impl TypeLibrary {
    pub fn get(&self, name: &str) -> Option<Arc<dyn Datatype>> {
        self.types.get(name).cloned()
    }
}

/// Facets shared by most XSD simple types: length/pattern/enumeration plus
/// ordering bounds. Individual datatypes embed this and interpret the
/// numeric bounds according to their own ordering.
#[derive(Debug, Default, Clone)]
pub struct CommonParams {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub length: Option<usize>,
    pub patterns: Vec<TranslatedRegex>,
    pub enumeration: Option<Vec<String>>,
    pub min_inclusive: Option<f64>,
    pub max_inclusive: Option<f64>,
    pub min_exclusive: Option<f64>,
    pub max_exclusive: Option<f64>,
    pub total_digits: Option<u32>,
    pub fraction_digits: Option<u32>,
}

fn parse_common_facets(
    datatype: &str,
    raw: &RawParams,
) -> Result<CommonParams, ParameterParsingError> {
    let mut p = CommonParams::default();
    let err = |reason: String| ParameterParsingError {
        datatype: datatype.to_string(),
        reason,
    };
    for (name, value) in raw {
        match name.as_str() {
            "minLength" => p.min_length = Some(parse_usize(value).map_err(&err)?),
            "maxLength" => p.max_length = Some(parse_usize(value).map_err(&err)?),
            "length" => p.length = Some(parse_usize(value).map_err(&err)?),
            "pattern" => {
                let translated = translate(value)
                    .map_err(|e| err(format!("invalid pattern facet: {}", e)))?;
                p.patterns.push(translated);
            }
            "enumeration" => p
                .enumeration
                .get_or_insert_with(Vec::new)
                .push(value.clone()),
            "minInclusive" => p.min_inclusive = Some(parse_f64(value).map_err(&err)?),
            "maxInclusive" => p.max_inclusive = Some(parse_f64(value).map_err(&err)?),
            "minExclusive" => p.min_exclusive = Some(parse_f64(value).map_err(&err)?),
            "maxExclusive" => p.max_exclusive = Some(parse_f64(value).map_err(&err)?),
            "totalDigits" => p.total_digits = Some(parse_u32(value).map_err(&err)?),
            "fractionDigits" => p.fraction_digits = Some(parse_u32(value).map_err(&err)?),
            _ => {}
        }
    }
    if let (Some(min), Some(max)) = (p.min_length, p.max_length) {
        if min > max {
            return Err(err(format!(
                "minLength ({}) greater than maxLength ({})",
                min, max
            )));
        }
    }
    Ok(p)
}

fn parse_usize(s: &str) -> Result<usize, String> {
    s.parse().map_err(|_| format!("'{}' is not a non-negative integer", s))
}

fn parse_u32(s: &str) -> Result<u32, String> {
    s.parse().map_err(|_| format!("'{}' is not a non-negative integer", s))
}

fn parse_f64(s: &str) -> Result<f64, String> {
    s.parse().map_err(|_| format!("'{}' is not a number", s))
}

/// XSD `whiteSpace="replace"`: tab/newline/CR become a plain space, runs are
/// left alone. Used by `normalizedString`.
fn replace_whitespace(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\t' | '\n' | '\r' => ' ',
            other => other,
        })
        .collect()
}

/// XSD `whiteSpace="collapse"`: like `replace`, then leading/trailing
/// whitespace is stripped and internal runs collapse to one space. Used by
/// `token` (and everything derived from it).
fn collapse_whitespace(s: &str) -> String {
    replace_whitespace(s).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Checks the facets common to every XSD simple type (length/pattern/
/// enumeration/bounds) against an already-parsed value.
fn check_common_facets(p: &CommonParams, value: &ParsedValue) -> Option<String> {
    let len = value.lexical.chars().count();
    if let Some(min) = p.min_length {
        if len < min {
            return Some(format!("length {} is less than minLength {}", len, min));
        }
    }
    if let Some(max) = p.max_length {
        if len > max {
            return Some(format!("length {} is greater than maxLength {}", len, max));
        }
    }
    if let Some(exact) = p.length {
        if len != exact {
            return Some(format!("length {} does not equal length {}", len, exact));
        }
    }
    for pattern in &p.patterns {
        if !pattern.compiled.is_match(&value.lexical) {
            return Some(format!(
                "value does not match pattern '{}'",
                pattern.source
            ));
        }
    }
    if let Some(values) = &p.enumeration {
        if !values.iter().any(|v| v == &value.lexical) {
            return Some(format!(
                "value '{}' is not one of the enumerated values {:?}",
                value.lexical, values
            ));
        }
    }
    if let Some(n) = value.numeric {
        if let Some(min) = p.min_inclusive {
            if n < min {
                return Some(format!("{} is less than minInclusive {}", n, min));
            }
        }
        if let Some(max) = p.max_inclusive {
            if n > max {
                return Some(format!("{} is greater than maxInclusive {}", n, max));
            }
        }
        if let Some(min) = p.min_exclusive {
            if n <= min {
                return Some(format!("{} is not greater than minExclusive {}", n, min));
            }
        }
        if let Some(max) = p.max_exclusive {
            if n >= max {
                return Some(format!("{} is not less than maxExclusive {}", n, max));
            }
        }
    }
    None
}

macro_rules! simple_string_datatype {
    ($ty:ident, $name:expr, $builtin:expr) => {
        struct $ty;
        impl Datatype for $ty {
            fn parse_params(
                &self,
                raw: &RawParams,
            ) -> Result<CommonParams, ParameterParsingError> {
                parse_common_facets($name, raw)
            }
            fn parse_value(
                &self,
                _params: &CommonParams,
                text: &str,
            ) -> Result<ParsedValue, ValueValidationError> {
                Ok(ParsedValue::text(text))
            }
            fn disallows(&self, params: &CommonParams, value: &ParsedValue) -> Option<String> {
                check_common_facets(params, value)
            }
            fn is_builtin(&self) -> bool {
                $builtin
            }
        }
    };
}

simple_string_datatype!(StringType, "string", true);
simple_string_datatype!(AnyUriType, "anyURI", false);
simple_string_datatype!(QNameType, "QName", false);
simple_string_datatype!(NcNameType, "NCName", false);
simple_string_datatype!(NmtokenType, "NMTOKEN", false);
simple_string_datatype!(NameType, "Name", false);
simple_string_datatype!(LanguageType, "language", false);
simple_string_datatype!(Base64BinaryType, "base64Binary", false);
simple_string_datatype!(HexBinaryType, "hexBinary", false);
simple_string_datatype!(DateType, "date", false);
simple_string_datatype!(DateTimeType, "dateTime", false);
simple_string_datatype!(TimeType, "time", false);

/// `token`: collapses whitespace before storing and comparing, per XSD's
/// `whiteSpace="collapse"`. Facets (length, enumeration, pattern) see the
/// collapsed form, matching a conforming processor.
struct TokenType;
impl Datatype for TokenType {
    fn parse_params(&self, raw: &RawParams) -> Result<CommonParams, ParameterParsingError> {
        parse_common_facets("token", raw)
    }
    fn parse_value(
        &self,
        _params: &CommonParams,
        text: &str,
    ) -> Result<ParsedValue, ValueValidationError> {
        Ok(ParsedValue::text(collapse_whitespace(text)))
    }
    fn disallows(&self, params: &CommonParams, value: &ParsedValue) -> Option<String> {
        check_common_facets(params, value)
    }
    fn is_builtin(&self) -> bool {
        true
    }
}

/// `normalizedString`: only `whiteSpace="replace"` — tab/newline/CR become
/// spaces, but runs of spaces and leading/trailing whitespace survive
/// (unlike `token`).
struct NormalizedStringType;
impl Datatype for NormalizedStringType {
    fn parse_params(&self, raw: &RawParams) -> Result<CommonParams, ParameterParsingError> {
        parse_common_facets("normalizedString", raw)
    }
    fn parse_value(
        &self,
        _params: &CommonParams,
        text: &str,
    ) -> Result<ParsedValue, ValueValidationError> {
        Ok(ParsedValue::text(replace_whitespace(text)))
    }
    fn disallows(&self, params: &CommonParams, value: &ParsedValue) -> Option<String> {
        check_common_facets(params, value)
    }
}

struct BooleanType;
impl Datatype for BooleanType {
    fn parse_params(&self, raw: &RawParams) -> Result<CommonParams, ParameterParsingError> {
        parse_common_facets("boolean", raw)
    }
    fn parse_value(
        &self,
        _params: &CommonParams,
        text: &str,
    ) -> Result<ParsedValue, ValueValidationError> {
        match text.trim() {
            "true" | "1" => Ok(ParsedValue::numeric(text, 1.0)),
            "false" | "0" => Ok(ParsedValue::numeric(text, 0.0)),
            _ => Err(ValueValidationError {
                datatype: "boolean".to_string(),
                value: text.to_string(),
                reason: "not one of 'true', 'false', '1', '0'".to_string(),
            }),
        }
    }
    fn equal(&self, _params: &CommonParams, a: &ParsedValue, b: &ParsedValue) -> bool {
        a.numeric == b.numeric
    }
    fn disallows(&self, _params: &CommonParams, _value: &ParsedValue) -> Option<String> {
        None
    }
}

macro_rules! numeric_datatype {
    ($ty:ident, $name:expr) => {
        struct $ty;
        impl Datatype for $ty {
            fn parse_params(
                &self,
                raw: &RawParams,
            ) -> Result<CommonParams, ParameterParsingError> {
                parse_common_facets($name, raw)
            }
            fn parse_value(
                &self,
                _params: &CommonParams,
                text: &str,
            ) -> Result<ParsedValue, ValueValidationError> {
                let trimmed = text.trim();
                let n: f64 = trimmed.parse().map_err(|_| ValueValidationError {
                    datatype: $name.to_string(),
                    value: text.to_string(),
                    reason: "not a valid number".to_string(),
                })?;
                Ok(ParsedValue::numeric(trimmed, n))
            }
            fn equal(&self, _params: &CommonParams, a: &ParsedValue, b: &ParsedValue) -> bool {
                a.numeric == b.numeric
            }
            fn disallows(&self, params: &CommonParams, value: &ParsedValue) -> Option<String> {
                check_common_facets(params, value)
            }
        }
    };
}

numeric_datatype!(DecimalType, "decimal");
numeric_datatype!(FloatType, "float");
numeric_datatype!(DoubleType, "double");

/// `integer`: a `decimal` restricted to a fractional-free, exponent-free
/// lexical form (XSD 3.3.13) — `"12.5"` and `"1e3"` are `decimal`/`float`
/// values, not `integer` ones.
struct IntegerType;
impl Datatype for IntegerType {
    fn parse_params(&self, raw: &RawParams) -> Result<CommonParams, ParameterParsingError> {
        parse_common_facets("integer", raw)
    }
    fn parse_value(
        &self,
        _params: &CommonParams,
        text: &str,
    ) -> Result<ParsedValue, ValueValidationError> {
        let trimmed = text.trim();
        let err = || ValueValidationError {
            datatype: "integer".to_string(),
            value: text.to_string(),
            reason: "not a valid integer".to_string(),
        };
        let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let n: f64 = trimmed.parse().map_err(|_| err())?;
        Ok(ParsedValue::numeric(trimmed, n))
    }
    fn equal(&self, _params: &CommonParams, a: &ParsedValue, b: &ParsedValue) -> bool {
        a.numeric == b.numeric
    }
    fn disallows(&self, params: &CommonParams, value: &ParsedValue) -> Option<String> {
        check_common_facets(params, value)
    }
}

fn builtin_library() -> TypeLibrary {
    let mut types: HashMap<&'static str, Arc<dyn Datatype>> = HashMap::new();
    types.insert("string", Arc::new(StringType));
    types.insert("token", Arc::new(TokenType));
    TypeLibrary {
        uri: "",
        types,
    }
}

fn xsd_library() -> TypeLibrary {
    let mut types: HashMap<&'static str, Arc<dyn Datatype>> = HashMap::new();
    types.insert("string", Arc::new(StringType));
    types.insert("token", Arc::new(TokenType));
    types.insert("normalizedString", Arc::new(NormalizedStringType));
    types.insert("boolean", Arc::new(BooleanType));
    types.insert("decimal", Arc::new(DecimalType));
    types.insert("integer", Arc::new(IntegerType));
    types.insert("float", Arc::new(FloatType));
    types.insert("double", Arc::new(DoubleType));
    types.insert("anyURI", Arc::new(AnyUriType));
    types.insert("QName", Arc::new(QNameType));
    types.insert("NCName", Arc::new(NcNameType));
    types.insert("NMTOKEN", Arc::new(NmtokenType));
    types.insert("Name", Arc::new(NameType));
    types.insert("language", Arc::new(LanguageType));
    types.insert("base64Binary", Arc::new(Base64BinaryType));
    types.insert("hexBinary", Arc::new(HexBinaryType));
    types.insert("date", Arc::new(DateType));
    types.insert("dateTime", Arc::new(DateTimeType));
    types.insert("time", Arc::new(TimeType));
    TypeLibrary {
        uri: "http://www.w3.org/2001/XMLSchema-datatypes",
        types,
    }
}

pub static BUILTIN_LIBRARY: Lazy<TypeLibrary> = Lazy::new(builtin_library);
pub static XSD_LIBRARY: Lazy<TypeLibrary> = Lazy::new(xsd_library);

/// Look up a datatype by library URI and name. `""` selects the builtin
/// library (`string`, `token`); the XSD datatypes URI selects the full XSD
/// simple-type set.
pub fn lookup(library: &str, name: &str) -> Option<Arc<dyn Datatype>> {
    if library.is_empty() {
        BUILTIN_LIBRARY.get(name)
    } else if library == XSD_LIBRARY.uri {
        XSD_LIBRARY.get(name)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_type_accepts_anything_without_facets() {
        let ty = lookup("", "string").unwrap();
        let params = ty.parse_params(&vec![]).unwrap();
        let value = ty.parse_value(&params, "anything at all").unwrap();
        assert!(ty.disallows(&params, &value).is_none());
    }

    #[test]
    fn min_length_facet_rejects_short_values() {
        let ty = lookup("http://www.w3.org/2001/XMLSchema-datatypes", "string").unwrap();
        let params = ty
            .parse_params(&vec![("minLength".to_string(), "3".to_string())])
            .unwrap();
        let value = ty.parse_value(&params, "ab").unwrap();
        assert!(ty.disallows(&params, &value).is_some());
        let value = ty.parse_value(&params, "abc").unwrap();
        assert!(ty.disallows(&params, &value).is_none());
    }

    #[test]
    fn min_length_greater_than_max_length_is_rejected_at_load_time() {
        let ty = lookup("", "string").unwrap();
        let err = ty
            .parse_params(&vec![
                ("minLength".to_string(), "5".to_string()),
                ("maxLength".to_string(), "2".to_string()),
            ])
            .unwrap_err();
        assert!(err.reason.contains("minLength"));
    }

    #[test]
    fn integer_bounds_are_enforced() {
        let ty = lookup("http://www.w3.org/2001/XMLSchema-datatypes", "integer").unwrap();
        let params = ty
            .parse_params(&vec![("maxInclusive".to_string(), "10".to_string())])
            .unwrap();
        let value = ty.parse_value(&params, "11").unwrap();
        assert!(ty.disallows(&params, &value).is_some());
    }

    #[test]
    fn boolean_accepts_canonical_and_numeric_lexical_forms() {
        let ty = lookup("http://www.w3.org/2001/XMLSchema-datatypes", "boolean").unwrap();
        let params = ty.parse_params(&vec![]).unwrap();
        let a = ty.parse_value(&params, "true").unwrap();
        let b = ty.parse_value(&params, "1").unwrap();
        assert!(ty.equal(&params, &a, &b));
    }

    #[test]
    fn token_collapses_whitespace_before_comparing() {
        let ty = lookup("", "token").unwrap();
        let params = ty.parse_params(&vec![]).unwrap();
        let a = ty.parse_value(&params, "foo").unwrap();
        let b = ty.parse_value(&params, "  foo   bar  ").unwrap();
        assert_eq!(b.lexical, "foo bar");
        assert!(!ty.equal(&params, &a, &b));
        let c = ty.parse_value(&params, " foo ").unwrap();
        assert!(ty.equal(&params, &a, &c));
    }

    #[test]
    fn normalized_string_replaces_but_does_not_collapse_whitespace() {
        let ty = lookup("http://www.w3.org/2001/XMLSchema-datatypes", "normalizedString").unwrap();
        let params = ty.parse_params(&vec![]).unwrap();
        let value = ty.parse_value(&params, "a\tb\nc").unwrap();
        assert_eq!(value.lexical, "a b c");
    }

    #[test]
    fn integer_rejects_fractional_and_exponent_lexical_forms() {
        let ty = lookup("http://www.w3.org/2001/XMLSchema-datatypes", "integer").unwrap();
        let params = ty.parse_params(&vec![]).unwrap();
        assert!(ty.parse_value(&params, "12.5").is_err());
        assert!(ty.parse_value(&params, "1e3").is_err());
        assert!(ty.parse_value(&params, "-42").is_ok());
    }

    #[test]
    fn unknown_datatype_name_is_none() {
        assert!(lookup("http://www.w3.org/2001/XMLSchema-datatypes", "frobnicate").is_none());
    }
}
