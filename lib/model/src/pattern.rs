use crate::{PatternError, PatternMember};
use oxrdf::Variable;
use std::fmt::{Display, Formatter};

/// A (context?, subject, predicate, object) pattern.
///
/// The positions are validated when the pattern is constructed. Subjects cannot be literals,
/// predicates must be IRIs, and contexts must be IRIs. Any position can be a variable.
///
/// A pattern carries two flags that control how its solutions compose with the solutions of
/// the preceding members of a pattern group:
/// - [Pattern::optional]: the solutions are left-joined.
/// - [Pattern::union_with_next]: the solutions are unioned with the next member.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pattern {
    context: Option<PatternMember>,
    subject: PatternMember,
    predicate: PatternMember,
    object: PatternMember,
    is_optional: bool,
    join_as_union: bool,
}

impl Pattern {
    /// Creates a new pattern that matches against all contexts.
    pub fn new(
        subject: impl Into<PatternMember>,
        predicate: impl Into<PatternMember>,
        object: impl Into<PatternMember>,
    ) -> Result<Self, PatternError> {
        let subject = subject.into();
        if matches!(subject, PatternMember::Literal(_)) {
            return Err(PatternError::InvalidSubject(subject));
        }
        let predicate = predicate.into();
        if !matches!(
            predicate,
            PatternMember::NamedNode(_) | PatternMember::Variable(_)
        ) {
            return Err(PatternError::InvalidPredicate(predicate));
        }
        Ok(Self {
            context: None,
            subject,
            predicate,
            object: object.into(),
            is_optional: false,
            join_as_union: false,
        })
    }

    /// Creates a new pattern that is restricted to the given `context`.
    pub fn new_in_context(
        context: impl Into<PatternMember>,
        subject: impl Into<PatternMember>,
        predicate: impl Into<PatternMember>,
        object: impl Into<PatternMember>,
    ) -> Result<Self, PatternError> {
        let context = context.into();
        if !matches!(
            context,
            PatternMember::NamedNode(_) | PatternMember::Variable(_)
        ) {
            return Err(PatternError::InvalidContext(context));
        }
        let mut pattern = Self::new(subject, predicate, object)?;
        pattern.context = Some(context);
        Ok(pattern)
    }

    /// Marks this pattern as optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    /// Marks this pattern to be unioned with the next member of its group.
    #[must_use]
    pub fn union_with_next(mut self) -> Self {
        self.join_as_union = true;
        self
    }

    pub fn context(&self) -> Option<&PatternMember> {
        self.context.as_ref()
    }

    pub fn subject(&self) -> &PatternMember {
        &self.subject
    }

    pub fn predicate(&self) -> &PatternMember {
        &self.predicate
    }

    pub fn object(&self) -> &PatternMember {
        &self.object
    }

    pub fn is_optional(&self) -> bool {
        self.is_optional
    }

    pub fn join_as_union(&self) -> bool {
        self.join_as_union
    }

    /// Returns the members in (context, subject, predicate, object) order.
    pub fn members(&self) -> impl Iterator<Item = &PatternMember> {
        self.context
            .iter()
            .chain([&self.subject, &self.predicate, &self.object])
    }

    /// Returns the distinct variables of this pattern in (context, subject, predicate, object)
    /// order.
    pub fn variables(&self) -> Vec<Variable> {
        let mut variables: Vec<Variable> = Vec::new();
        for variable in self.members().filter_map(PatternMember::as_variable) {
            if !variables.contains(variable) {
                variables.push(variable.clone());
            }
        }
        variables
    }

    /// Returns whether the pattern has no variables.
    pub fn is_ground(&self) -> bool {
        !self.members().any(PatternMember::is_variable)
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "GRAPH {context} {{ ")?;
        }
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if self.context.is_some() {
            f.write_str(" }")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{BlankNode, Literal, NamedNode};

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/{name}"))
    }

    #[test]
    fn rejects_literal_subject() {
        let result = Pattern::new(Literal::from("a"), ex("p"), ex("o"));
        assert!(matches!(result, Err(PatternError::InvalidSubject(_))));
    }

    #[test]
    fn rejects_blank_predicate() {
        let result = Pattern::new(ex("s"), BlankNode::default(), ex("o"));
        assert!(matches!(result, Err(PatternError::InvalidPredicate(_))));
    }

    #[test]
    fn rejects_literal_context() {
        let result = Pattern::new_in_context(Literal::from("g"), ex("s"), ex("p"), ex("o"));
        assert!(matches!(result, Err(PatternError::InvalidContext(_))));
    }

    #[test]
    fn variables_are_distinct_and_ordered() -> Result<(), PatternError> {
        let x = Variable::new_unchecked("x");
        let g = Variable::new_unchecked("g");
        let pattern = Pattern::new_in_context(g.clone(), x.clone(), ex("p"), x.clone())?;
        assert_eq!(pattern.variables(), vec![g, x]);
        assert!(!pattern.is_ground());
        Ok(())
    }

    #[test]
    fn flags_are_set_by_builders() -> Result<(), PatternError> {
        let pattern = Pattern::new(ex("s"), ex("p"), ex("o"))?.optional();
        assert!(pattern.is_optional());
        assert!(!pattern.join_as_union());
        assert!(pattern.is_ground());
        Ok(())
    }
}
