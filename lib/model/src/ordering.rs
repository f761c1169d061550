use crate::{is_numeric_datatype, Numeric, ThinError, ThinResult};
use oxrdf::vocab::{rdf, xsd};
use oxrdf::{Literal, LiteralRef, TermRef};
use oxsdatatypes::{Boolean, Date, DateTime, Time};
use std::cmp::Ordering;
use std::str::FromStr;

/// Compares two RDF terms.
///
/// - IRIs compare with IRIs and blank nodes with blank nodes by their string form.
/// - Numeric literals compare by their numeric value.
/// - Plain literals (simple, `xsd:string` and language-tagged) compare lexically.
/// - Literals of the same comparable datatype (boolean, date/time) compare by value; literals of
///   the same unknown datatype compare lexically.
///
/// Everything else is incomparable and yields a [ThinError].
pub fn compare_terms(lhs: TermRef<'_>, rhs: TermRef<'_>) -> ThinResult<Ordering> {
    match (lhs, rhs) {
        (TermRef::NamedNode(lhs), TermRef::NamedNode(rhs)) => Ok(lhs.as_str().cmp(rhs.as_str())),
        (TermRef::BlankNode(lhs), TermRef::BlankNode(rhs)) => Ok(lhs.as_str().cmp(rhs.as_str())),
        (TermRef::Literal(lhs), TermRef::Literal(rhs)) => compare_literals(lhs, rhs),
        _ => ThinError::expected(),
    }
}

/// Compares two literals. See [compare_terms].
pub fn compare_literals(lhs: LiteralRef<'_>, rhs: LiteralRef<'_>) -> ThinResult<Ordering> {
    if is_plain_literal(lhs) && is_plain_literal(rhs) {
        return Ok(lhs
            .value()
            .cmp(rhs.value())
            .then_with(|| lhs.language().cmp(&rhs.language())));
    }

    let lhs_datatype = lhs.datatype();
    let rhs_datatype = rhs.datatype();
    if is_numeric_datatype(lhs_datatype) && is_numeric_datatype(rhs_datatype) {
        let lhs = Numeric::from_literal(lhs)?;
        let rhs = Numeric::from_literal(rhs)?;
        return lhs.partial_cmp(&rhs).ok_or(ThinError {});
    }

    if lhs_datatype != rhs_datatype {
        return ThinError::expected();
    }

    let ordering = if lhs_datatype == xsd::BOOLEAN {
        Boolean::from_str(lhs.value())?.partial_cmp(&Boolean::from_str(rhs.value())?)
    } else if lhs_datatype == xsd::DATE_TIME {
        DateTime::from_str(lhs.value())?.partial_cmp(&DateTime::from_str(rhs.value())?)
    } else if lhs_datatype == xsd::DATE {
        Date::from_str(lhs.value())?.partial_cmp(&Date::from_str(rhs.value())?)
    } else if lhs_datatype == xsd::TIME {
        Time::from_str(lhs.value())?.partial_cmp(&Time::from_str(rhs.value())?)
    } else {
        Some(lhs.value().cmp(rhs.value()))
    };
    ordering.ok_or(ThinError {})
}

/// A total order on optional terms used for sorting solutions.
///
/// Unbound values come first, followed by blank nodes, IRIs, and literals. Literals are ranked by
/// category: numeric, boolean, `xsd:dateTime`, `xsd:date`, `xsd:time`, plain, and all other
/// datatypes. Values are only compared within a category. Ties and invalid lexical forms fall back
/// to the datatype IRI, the language tag, and the lexical form.
pub fn order_terms(lhs: Option<TermRef<'_>>, rhs: Option<TermRef<'_>>) -> Ordering {
    fn rank(term: Option<TermRef<'_>>) -> u8 {
        match term {
            None => 0,
            Some(TermRef::BlankNode(_)) => 1,
            Some(TermRef::NamedNode(_)) => 2,
            Some(TermRef::Literal(_)) => 3,
        }
    }

    match (lhs, rhs) {
        (Some(TermRef::NamedNode(lhs)), Some(TermRef::NamedNode(rhs))) => {
            lhs.as_str().cmp(rhs.as_str())
        }
        (Some(TermRef::BlankNode(lhs)), Some(TermRef::BlankNode(rhs))) => {
            lhs.as_str().cmp(rhs.as_str())
        }
        (Some(TermRef::Literal(lhs)), Some(TermRef::Literal(rhs))) => order_literals(lhs, rhs),
        _ => rank(lhs).cmp(&rank(rhs)),
    }
}

/// Literal categories in the order used by [order_terms].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum LiteralCategory {
    Numeric,
    Boolean,
    DateTime,
    Date,
    Time,
    Plain,
    Other,
}

impl LiteralCategory {
    fn of(literal: LiteralRef<'_>) -> Self {
        let datatype = literal.datatype();
        if is_numeric_datatype(datatype) {
            Self::Numeric
        } else if datatype == xsd::BOOLEAN {
            Self::Boolean
        } else if datatype == xsd::DATE_TIME {
            Self::DateTime
        } else if datatype == xsd::DATE {
            Self::Date
        } else if datatype == xsd::TIME {
            Self::Time
        } else if is_plain_literal(literal) {
            Self::Plain
        } else {
            Self::Other
        }
    }
}

fn order_literals(lhs: LiteralRef<'_>, rhs: LiteralRef<'_>) -> Ordering {
    let category = LiteralCategory::of(lhs);
    let rhs_category = LiteralCategory::of(rhs);
    if category != rhs_category {
        return category.cmp(&rhs_category);
    }

    let by_value = match category {
        LiteralCategory::Numeric => order_parsed(
            Numeric::from_literal(lhs).map(Numeric::to_double),
            Numeric::from_literal(rhs).map(Numeric::to_double),
            f64::total_cmp,
        ),
        LiteralCategory::Boolean => order_parsed(
            Boolean::from_str(lhs.value()).map(bool::from),
            Boolean::from_str(rhs.value()).map(bool::from),
            bool::cmp,
        ),
        LiteralCategory::DateTime => order_parsed(
            DateTime::from_str(lhs.value()),
            DateTime::from_str(rhs.value()),
            |lhs, rhs| {
                order_by_timezone(lhs.timezone_offset(), rhs.timezone_offset(), lhs, rhs)
            },
        ),
        LiteralCategory::Date => order_parsed(
            Date::from_str(lhs.value()),
            Date::from_str(rhs.value()),
            |lhs, rhs| {
                order_by_timezone(lhs.timezone_offset(), rhs.timezone_offset(), lhs, rhs)
            },
        ),
        LiteralCategory::Time => order_parsed(
            Time::from_str(lhs.value()),
            Time::from_str(rhs.value()),
            |lhs, rhs| {
                order_by_timezone(lhs.timezone_offset(), rhs.timezone_offset(), lhs, rhs)
            },
        ),
        LiteralCategory::Plain => lhs
            .value()
            .cmp(rhs.value())
            .then_with(|| lhs.language().cmp(&rhs.language())),
        LiteralCategory::Other => Ordering::Equal,
    };

    by_value
        .then_with(|| lhs.datatype().as_str().cmp(rhs.datatype().as_str()))
        .then_with(|| lhs.language().cmp(&rhs.language()))
        .then_with(|| lhs.value().cmp(rhs.value()))
}

/// Valid values come before invalid lexical forms, which are all equal here.
fn order_parsed<T, E>(
    lhs: Result<T, E>,
    rhs: Result<T, E>,
    compare: impl FnOnce(&T, &T) -> Ordering,
) -> Ordering {
    match (lhs, rhs) {
        (Ok(lhs), Ok(rhs)) => compare(&lhs, &rhs),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => Ordering::Equal,
    }
}

/// Values without a timezone come first. Values within each group are totally ordered.
fn order_by_timezone<Z, T: PartialOrd>(
    lhs_zone: Option<Z>,
    rhs_zone: Option<Z>,
    lhs: &T,
    rhs: &T,
) -> Ordering {
    lhs_zone
        .is_some()
        .cmp(&rhs_zone.is_some())
        .then_with(|| lhs.partial_cmp(rhs).unwrap_or(Ordering::Equal))
}

/// Returns whether the literal is a simple literal, an `xsd:string` or a language-tagged string.
pub fn is_plain_literal(literal: LiteralRef<'_>) -> bool {
    let datatype = literal.datatype();
    datatype == xsd::STRING || datatype == rdf::LANG_STRING
}

/// Returns whether the term is the literal `"true"^^xsd:boolean`.
pub fn is_true_literal(term: TermRef<'_>) -> bool {
    match term {
        TermRef::Literal(literal) => {
            literal.datatype() == xsd::BOOLEAN
                && Boolean::from_str(literal.value()).is_ok_and(bool::from)
        }
        _ => false,
    }
}

/// Computes the effective boolean value of a term.
pub fn effective_boolean_value(term: TermRef<'_>) -> ThinResult<bool> {
    let TermRef::Literal(literal) = term else {
        return ThinError::expected();
    };
    let datatype = literal.datatype();
    if datatype == xsd::BOOLEAN {
        Ok(bool::from(Boolean::from_str(literal.value())?))
    } else if is_plain_literal(literal) {
        Ok(!literal.value().is_empty())
    } else if is_numeric_datatype(datatype) {
        let value = Numeric::from_literal(literal)?.to_double();
        Ok(value != 0.0 && !value.is_nan())
    } else {
        ThinError::expected()
    }
}

/// Creates a `xsd:boolean` literal.
pub fn boolean_literal(value: bool) -> Literal {
    Literal::new_typed_literal(if value { "true" } else { "false" }, xsd::BOOLEAN)
}
