//! Ad-hoc record filtering for the review dashboards.

use chrono::NaiveDate;

use crate::field::FieldName;
use crate::record::Record;

/// One narrowing condition on a single field.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Exact match on the rendered value (department, status, room, ...).
    Equals { field: FieldName, value: String },
    /// Case-insensitive substring match (school search box).
    Contains { field: FieldName, value: String },
    /// Inclusive date range on a date or timestamp field. Open ends are
    /// unbounded.
    DateRange {
        field: FieldName,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl Predicate {
    fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Equals { field, value } => record.value(field).render() == *value,
            Self::Contains { field, value } => record
                .value(field)
                .render()
                .to_lowercase()
                .contains(&value.to_lowercase()),
            Self::DateRange { field, from, to } => match record.value(field).as_date() {
                Some(date) => {
                    from.is_none_or(|from| date >= from) && to.is_none_or(|to| date <= to)
                }
                None => false,
            },
        }
    }
}

/// A conjunction of predicates. The empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, predicate: Predicate) -> &mut Self {
        self.predicates.push(predicate);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }
}
