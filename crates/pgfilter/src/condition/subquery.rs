//! Nested SELECTs used as term operands.

use crate::qb::{ParamList, SelectQb};
use std::sync::Arc;

/// A SELECT embedded in a predicate, rendered inline with the outer statement's
/// placeholders.
///
/// ```ignore
/// use pgfilter::{CmpOp, Term, qb, schema::member};
///
/// let oldest = qb::select(member::SUB_FROM).select("MAX(ms.age)");
/// let term = Term::subquery(member::AGE, CmpOp::Eq, oldest)?;
/// // m.age = (SELECT MAX(ms.age) FROM member ms)
/// ```
#[derive(Debug, Clone)]
pub struct Subquery(Arc<SelectQb>);

impl Subquery {
    pub fn new(query: SelectQb) -> Self {
        Self(Arc::new(query))
    }

    pub fn query(&self) -> &SelectQb {
        &self.0
    }

    /// Render the SELECT (without parentheses), numbering placeholders after `params`.
    pub(crate) fn build(&self, params: &mut ParamList) -> String {
        self.0.build_into(params)
    }

    pub fn to_sql(&self) -> String {
        self.build(&mut ParamList::new())
    }
}

impl From<SelectQb> for Subquery {
    fn from(query: SelectQb) -> Self {
        Self::new(query)
    }
}

/// Same SQL and same bound values.
impl PartialEq for Subquery {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        let (mut ours, mut theirs) = (ParamList::new(), ParamList::new());
        self.build(&mut ours) == other.build(&mut theirs)
            && format!("{ours:?}") == format!("{theirs:?}")
    }
}

impl Eq for Subquery {}
