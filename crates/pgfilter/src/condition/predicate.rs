//! Conjunctive predicates.
//!
//! A [`Predicate`] is an AND of zero or more [`Term`]s. The empty conjunction is the
//! neutral predicate: it renders to nothing (no WHERE clause) and matches every row.
//!
//! Predicates can be rendered to PostgreSQL with `$n` placeholders via
//! [`Predicate::build`], or evaluated in memory against any [`Record`] via
//! [`Predicate::matches`].

use super::field::Field;
use super::subquery::Subquery;
use super::value::Value;
use crate::error::TermError;
use crate::qb::ParamList;
use std::cmp::Ordering;

/// Comparison operator of a single term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CmpOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Gt => ">",
            CmpOp::Gte => ">=",
            CmpOp::Lt => "<",
            CmpOp::Lte => "<=",
        }
    }

    fn holds(&self, ord: Ordering) -> bool {
        match self {
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Ne => ord != Ordering::Equal,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Gte => ord != Ordering::Less,
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Lte => ord != Ordering::Greater,
        }
    }
}

/// A row that predicates can be evaluated against in memory.
pub trait Record {
    /// Value of `field` in this row; `None` is SQL NULL or an unknown field.
    fn field_value(&self, field: &Field) -> Option<Value>;
}

/// Right-hand side of a [`Term`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A bound value: `field <op> $n`.
    Value(Value),
    /// A scalar subquery: `field <op> (SELECT ...)`.
    Subquery(Subquery),
    /// `field IN (SELECT ...)`.
    InSubquery(Subquery),
}

/// One comparison: `field <op> operand`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    field: Field,
    op: CmpOp,
    operand: Operand,
}

impl Term {
    /// Build a term, checking the field's identifiers and coercing `value` to its type.
    pub fn new(field: Field, op: CmpOp, value: impl Into<Value>) -> Result<Self, TermError> {
        field.validate()?;
        let value = value.into().coerce_to(field.kind(), &field.qualified())?;
        Ok(Self {
            field,
            op,
            operand: Operand::Value(value),
        })
    }

    /// `field <op> (query)`; `query` must yield at most one row and one column.
    pub fn subquery(
        field: Field,
        op: CmpOp,
        query: impl Into<Subquery>,
    ) -> Result<Self, TermError> {
        field.validate()?;
        Ok(Self {
            field,
            op,
            operand: Operand::Subquery(query.into()),
        })
    }

    /// `field IN (query)`; `query` must yield one column.
    pub fn in_subquery(field: Field, query: impl Into<Subquery>) -> Result<Self, TermError> {
        field.validate()?;
        Ok(Self {
            field,
            op: CmpOp::Eq,
            operand: Operand::InSubquery(query.into()),
        })
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// The comparison operator; `Eq` for `IN (subquery)` terms.
    pub fn op(&self) -> CmpOp {
        self.op
    }

    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    /// The bound value, if the operand is not a subquery.
    pub fn value(&self) -> Option<&Value> {
        match &self.operand {
            Operand::Value(value) => Some(value),
            Operand::Subquery(_) | Operand::InSubquery(_) => None,
        }
    }

    /// Evaluate with SQL semantics: a NULL column never satisfies a comparison.
    ///
    /// Subquery operands can only be answered by the database; in memory they are
    /// unknown and never match.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        let Operand::Value(expected) = &self.operand else {
            return false;
        };
        record
            .field_value(&self.field)
            .and_then(|actual| actual.compare(expected))
            .is_some_and(|ord| self.op.holds(ord))
    }

    fn build(&self, params: &mut ParamList) -> String {
        match &self.operand {
            Operand::Value(value) => {
                let idx = params.push_param(value.to_param());
                format!("{} {} ${}", self.field, self.op.as_sql(), idx)
            }
            Operand::Subquery(query) => {
                format!("{} {} ({})", self.field, self.op.as_sql(), query.build(params))
            }
            Operand::InSubquery(query) => format!("{} IN ({})", self.field, query.build(params)),
        }
    }
}

/// A conjunction of terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    terms: Vec<Term>,
}

impl Predicate {
    /// The neutral (always true) predicate.
    pub fn always() -> Self {
        Self::default()
    }

    pub fn from_term(term: Term) -> Self {
        Self { terms: vec![term] }
    }

    /// Conjoin two predicates. The neutral predicate is the identity.
    pub fn and(mut self, other: Predicate) -> Self {
        self.terms.extend(other.terms);
        self
    }

    pub fn and_term(&mut self, term: Term) {
        self.terms.push(term);
    }

    /// Whether no term was conjoined (matches every row).
    pub fn is_neutral(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        self.terms.iter().all(|t| t.matches(record))
    }

    /// Same set of terms, ignoring order and duplicates.
    ///
    /// AND is commutative and idempotent, so this implies logical equivalence.
    pub fn is_equivalent(&self, other: &Predicate) -> bool {
        self.terms.iter().all(|t| other.terms.contains(t))
            && other.terms.iter().all(|t| self.terms.contains(t))
    }

    /// Render the WHERE body (without the keyword), pushing values into `params`.
    ///
    /// Placeholders continue from the current length of `params`. The neutral
    /// predicate renders to an empty string.
    pub fn build(&self, params: &mut ParamList) -> String {
        self.terms
            .iter()
            .map(|t| t.build(params))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Debug helper: the rendered SQL fragment.
    pub fn to_sql(&self) -> String {
        self.build(&mut ParamList::new())
    }
}

impl From<Term> for Predicate {
    fn from(term: Term) -> Self {
        Predicate::from_term(term)
    }
}

impl FromIterator<Term> for Predicate {
    fn from_iter<I: IntoIterator<Item = Term>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

/// `field = value`, or `None` when `value` is absent or blank.
pub(crate) fn equals_term(field: Field, value: Option<&str>) -> Option<Result<Term, TermError>> {
    let value = value.filter(|v| has_text(v))?;
    Some(Term::new(field, CmpOp::Eq, value))
}

/// `field <op> value`, or `None` when `value` is absent.
pub(crate) fn compare_term(
    field: Field,
    op: CmpOp,
    value: Option<i32>,
) -> Option<Result<Term, TermError>> {
    value.map(|v| Term::new(field, op, v))
}

/// Whether `s` contains at least one non-whitespace character.
pub fn has_text(s: &str) -> bool {
    s.chars().any(|c| !c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::FieldKind;
    use crate::qb;

    const AGE: Field = Field::new("m", "age", FieldKind::Int);
    const NAME: Field = Field::new("m", "username", FieldKind::Text);

    struct Row {
        age: Option<i32>,
        name: &'static str,
    }

    impl Record for Row {
        fn field_value(&self, field: &Field) -> Option<Value> {
            match field.column() {
                "age" => self.age.map(Value::Int),
                "username" => Some(Value::from(self.name)),
                _ => None,
            }
        }
    }

    #[test]
    fn test_neutral_renders_empty() {
        let p = Predicate::always();
        assert!(p.is_neutral());
        assert_eq!(p.to_sql(), "");
        assert!(p.matches(&Row { age: None, name: "x" }));
    }

    #[test]
    fn test_build_numbers_placeholders() {
        let p = Predicate::from_term(Term::new(NAME, CmpOp::Eq, "member1").unwrap())
            .and(Term::new(AGE, CmpOp::Gte, 10).unwrap().into());

        let mut params = ParamList::new();
        params.push(99i64);
        let sql = p.build(&mut params);
        assert_eq!(sql, "m.username = $2 AND m.age >= $3");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_null_never_matches() {
        let t = Term::new(AGE, CmpOp::Lte, 40).unwrap();
        assert!(!t.matches(&Row { age: None, name: "x" }));
        assert!(t.matches(&Row { age: Some(40), name: "x" }));
        assert!(!t.matches(&Row { age: Some(41), name: "x" }));
    }

    #[test]
    fn test_ops_hold() {
        let row = Row { age: Some(30), name: "x" };
        let check = |op, v: i32| Term::new(AGE, op, v).unwrap().matches(&row);
        assert!(check(CmpOp::Eq, 30));
        assert!(check(CmpOp::Ne, 31));
        assert!(check(CmpOp::Gt, 29));
        assert!(!check(CmpOp::Gt, 30));
        assert!(check(CmpOp::Lt, 31));
        assert!(check(CmpOp::Gte, 30));
        assert!(!check(CmpOp::Lte, 29));
    }

    #[test]
    fn test_equivalence_ignores_order() {
        let a = Term::new(AGE, CmpOp::Gte, 35).unwrap();
        let b = Term::new(AGE, CmpOp::Lte, 40).unwrap();
        let p1: Predicate = [a.clone(), b.clone()].into_iter().collect();
        let p2: Predicate = [b, a].into_iter().collect();
        assert_ne!(p1, p2);
        assert!(p1.is_equivalent(&p2));
    }

    #[test]
    fn test_subquery_operands_render_inline() {
        let oldest = qb::select("member ms").select("MAX(ms.age)");
        let term = Term::subquery(AGE, CmpOp::Eq, oldest).unwrap();
        assert_eq!(term.value(), None);
        assert_eq!(
            Predicate::from_term(term).to_sql(),
            "m.age = (SELECT MAX(ms.age) FROM member ms)"
        );

        let older = qb::select("member ms")
            .select("ms.age")
            .filter(Term::new(AGE.with_table("ms"), CmpOp::Gt, 10).unwrap().into());
        let p = Predicate::from_term(Term::new(NAME, CmpOp::Eq, "member2").unwrap())
            .and(Term::in_subquery(AGE, older).unwrap().into());

        let mut params = ParamList::new();
        assert_eq!(
            p.build(&mut params),
            "m.username = $1 AND m.age IN (SELECT ms.age FROM member ms WHERE ms.age > $2)"
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_subquery_terms_compare_by_rendering() {
        let sub = |age: i32| {
            qb::select("member ms")
                .select("ms.age")
                .filter(Term::new(AGE.with_table("ms"), CmpOp::Gt, age).unwrap().into())
        };
        let a = Term::in_subquery(AGE, sub(10)).unwrap();
        assert_eq!(a, Term::in_subquery(AGE, sub(10)).unwrap());
        assert_ne!(a, Term::in_subquery(AGE, sub(20)).unwrap());
        assert_ne!(a, Term::subquery(AGE, CmpOp::Eq, sub(10)).unwrap());
    }

    #[test]
    fn test_subquery_terms_do_not_match_in_memory() {
        let any = Term::in_subquery(AGE, qb::select("member ms").select("ms.age")).unwrap();
        assert!(!any.matches(&Row { age: Some(30), name: "x" }));
        assert!(!Term::subquery(NAME, CmpOp::Eq, qb::select("team t").select("t.name"))
            .unwrap()
            .matches(&Row { age: None, name: "teamA" }));
    }

    #[test]
    fn test_subquery_rejects_bad_field() {
        const BROKEN: Field = Field::new("m", "age or 1=1", FieldKind::Int);
        let err = Term::in_subquery(BROKEN, qb::select("member ms")).unwrap_err();
        assert!(matches!(err, TermError::InvalidIdent(_)));
    }

    #[test]
    fn test_has_text() {
        assert!(has_text(" a "));
        assert!(!has_text(""));
        assert!(!has_text("  \t\n"));
    }

    #[test]
    fn test_helpers_skip_absent() {
        assert!(equals_term(NAME, None).is_none());
        assert!(equals_term(NAME, Some("   ")).is_none());
        assert!(equals_term(NAME, Some("member1")).unwrap().is_ok());
        assert!(compare_term(AGE, CmpOp::Gte, None).is_none());
        assert!(equals_term(AGE, Some("ten")).unwrap().is_err());
    }
}
