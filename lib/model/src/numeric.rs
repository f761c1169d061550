use crate::vocab::owl;
use crate::{ThinError, ThinResult};
use oxrdf::vocab::xsd;
use oxrdf::{Literal, LiteralRef, NamedNodeRef};
use oxsdatatypes::{Decimal, Double, Float, Integer};
use std::cmp::Ordering;
use std::str::FromStr;

/// Checks if the datatype is derived from `xsd:integer`.
pub fn is_integer_datatype(datatype: NamedNodeRef<'_>) -> bool {
    static INTEGER_DATATYPES: &[NamedNodeRef<'_>; 13] = &[
        xsd::INTEGER,
        xsd::BYTE,
        xsd::SHORT,
        xsd::INT,
        xsd::LONG,
        xsd::UNSIGNED_BYTE,
        xsd::UNSIGNED_SHORT,
        xsd::UNSIGNED_INT,
        xsd::UNSIGNED_LONG,
        xsd::POSITIVE_INTEGER,
        xsd::NEGATIVE_INTEGER,
        xsd::NON_POSITIVE_INTEGER,
        xsd::NON_NEGATIVE_INTEGER,
    ];
    INTEGER_DATATYPES.contains(&datatype)
}

/// Checks if the datatype is a numeric datatype (including `owl:rational`).
pub fn is_numeric_datatype(datatype: NamedNodeRef<'_>) -> bool {
    is_integer_datatype(datatype)
        || datatype == xsd::DECIMAL
        || datatype == xsd::FLOAT
        || datatype == xsd::DOUBLE
        || datatype == owl::RATIONAL
}

/// A numeric value of a literal.
///
/// `owl:rational` literals (`"1/3"^^owl:rational`) are evaluated to a [Numeric::Decimal].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Numeric {
    Integer(Integer),
    Decimal(Decimal),
    Float(Float),
    Double(Double),
}

impl Numeric {
    /// Parses the numeric value of `literal`.
    ///
    /// Fails if the datatype is not numeric or the lexical form is invalid.
    pub fn from_literal(literal: LiteralRef<'_>) -> ThinResult<Self> {
        let datatype = literal.datatype();
        let value = literal.value();
        if is_integer_datatype(datatype) {
            Ok(Self::Integer(Integer::from_str(value)?))
        } else if datatype == xsd::DECIMAL {
            Ok(Self::Decimal(Decimal::from_str(value)?))
        } else if datatype == xsd::FLOAT {
            Ok(Self::Float(Float::from_str(value)?))
        } else if datatype == xsd::DOUBLE {
            Ok(Self::Double(Double::from_str(value)?))
        } else if datatype == owl::RATIONAL {
            parse_rational(value).map(Self::Decimal)
        } else {
            ThinError::expected()
        }
    }

    /// Coerces the value into a double.
    pub fn to_double(self) -> f64 {
        match self {
            Self::Integer(value) => f64::from(Double::from(value)),
            Self::Decimal(value) => f64::from(Double::from(value)),
            Self::Float(value) => f64::from(f32::from(value)),
            Self::Double(value) => f64::from(value),
        }
    }

    /// Converts the value into a typed literal with a canonical lexical form.
    pub fn into_literal(self) -> Literal {
        match self {
            Self::Integer(value) => Literal::new_typed_literal(value.to_string(), xsd::INTEGER),
            Self::Decimal(value) => Literal::new_typed_literal(value.to_string(), xsd::DECIMAL),
            Self::Float(value) => Literal::new_typed_literal(value.to_string(), xsd::FLOAT),
            Self::Double(value) => Literal::new_typed_literal(value.to_string(), xsd::DOUBLE),
        }
    }

    pub fn checked_add(self, rhs: Self) -> ThinResult<Self> {
        match NumericPair::promote(self, rhs) {
            NumericPair::Integer(a, b) => a.checked_add(b).map(Self::Integer).ok_or(ThinError {}),
            NumericPair::Decimal(a, b) => a.checked_add(b).map(Self::Decimal).ok_or(ThinError {}),
            NumericPair::Double(a, b) => Ok(Self::Double((f64::from(a) + f64::from(b)).into())),
        }
    }

    pub fn checked_sub(self, rhs: Self) -> ThinResult<Self> {
        match NumericPair::promote(self, rhs) {
            NumericPair::Integer(a, b) => a.checked_sub(b).map(Self::Integer).ok_or(ThinError {}),
            NumericPair::Decimal(a, b) => a.checked_sub(b).map(Self::Decimal).ok_or(ThinError {}),
            NumericPair::Double(a, b) => Ok(Self::Double((f64::from(a) - f64::from(b)).into())),
        }
    }

    pub fn checked_mul(self, rhs: Self) -> ThinResult<Self> {
        match NumericPair::promote(self, rhs) {
            NumericPair::Integer(a, b) => a.checked_mul(b).map(Self::Integer).ok_or(ThinError {}),
            NumericPair::Decimal(a, b) => a.checked_mul(b).map(Self::Decimal).ok_or(ThinError {}),
            NumericPair::Double(a, b) => Ok(Self::Double((f64::from(a) * f64::from(b)).into())),
        }
    }

    /// Divides `self` by `rhs`. Integer division yields a decimal.
    pub fn checked_div(self, rhs: Self) -> ThinResult<Self> {
        match NumericPair::promote(self, rhs) {
            NumericPair::Integer(a, b) => Decimal::from(a)
                .checked_div(Decimal::from(b))
                .map(Self::Decimal)
                .ok_or(ThinError {}),
            NumericPair::Decimal(a, b) => a.checked_div(b).map(Self::Decimal).ok_or(ThinError {}),
            NumericPair::Double(a, b) => Ok(Self::Double((f64::from(a) / f64::from(b)).into())),
        }
    }
}

impl PartialOrd for Numeric {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match NumericPair::promote(*self, *other) {
            NumericPair::Integer(a, b) => a.partial_cmp(&b),
            NumericPair::Decimal(a, b) => a.partial_cmp(&b),
            NumericPair::Double(a, b) => a.partial_cmp(&b),
        }
    }
}

/// Two numeric operands promoted to a common type.
enum NumericPair {
    Integer(Integer, Integer),
    Decimal(Decimal, Decimal),
    Double(Double, Double),
}

impl NumericPair {
    fn promote(lhs: Numeric, rhs: Numeric) -> Self {
        match (lhs, rhs) {
            (Numeric::Integer(a), Numeric::Integer(b)) => Self::Integer(a, b),
            (Numeric::Integer(a), Numeric::Decimal(b)) => Self::Decimal(a.into(), b),
            (Numeric::Decimal(a), Numeric::Integer(b)) => Self::Decimal(a, b.into()),
            (Numeric::Decimal(a), Numeric::Decimal(b)) => Self::Decimal(a, b),
            (a, b) => Self::Double(a.to_double().into(), b.to_double().into()),
        }
    }
}

/// Parses the lexical form `numerator/denominator` of an `owl:rational`.
fn parse_rational(value: &str) -> ThinResult<Decimal> {
    let (numerator, denominator) = value.split_once('/').ok_or(ThinError {})?;
    let numerator = Decimal::from(Integer::from_str(numerator.trim())?);
    let denominator = Decimal::from(Integer::from_str(denominator.trim())?);
    numerator.checked_div(denominator).ok_or(ThinError {})
}
