// Query filtering for records held in memory

use crate::record::{IndexValue, Record};
use eyre::{Result, eyre};
use std::cmp::Ordering;

/// Filter for querying records
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Field name to filter on
    pub field: String,
    /// Comparison operator
    pub op: FilterOp,
    /// Value to compare against
    pub value: IndexValue,
}

/// Comparison operators for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,       // =
    Ne,       // !=
    Gt,       // >
    Lt,       // <
    Gte,      // >=
    Lte,      // <=
    Contains, // ~ (case-insensitive substring)
}

// Two-character operators first so `>=` is not read as `>`
const OPERATORS: [(&str, FilterOp); 7] = [
    ("!=", FilterOp::Ne),
    (">=", FilterOp::Gte),
    ("<=", FilterOp::Lte),
    ("~", FilterOp::Contains),
    ("=", FilterOp::Eq),
    (">", FilterOp::Gt),
    ("<", FilterOp::Lt),
];

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: IndexValue) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Parse an expression such as `priority=High`, `id>=3` or `title~milk`
    pub fn parse(expr: &str) -> Result<Self> {
        let (pos, token, op) = OPERATORS
            .iter()
            .filter_map(|(token, op)| expr.find(*token).map(|pos| (pos, *token, *op)))
            .min_by_key(|(pos, token, _)| (*pos, std::cmp::Reverse(token.len())))
            .ok_or_else(|| eyre!("Invalid filter {:?} (expected <field><op><value>)", expr))?;

        let field = expr[..pos].trim();
        let raw = expr[pos + token.len()..].trim();
        if field.is_empty() {
            return Err(eyre!("Filter {:?} has no field name", expr));
        }
        if !field.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(eyre!("Invalid field name: {} (must be alphanumeric with _)", field));
        }

        Ok(Self::new(field, op, IndexValue::infer(raw)))
    }

    /// Evaluate this filter against a record's indexed fields
    ///
    /// A record without the field never matches.
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        let fields = record.indexed_fields();
        let Some(actual) = fields.get(&self.field) else {
            return false;
        };

        if self.op == FilterOp::Contains {
            return actual
                .to_string()
                .to_lowercase()
                .contains(&self.value.to_string().to_lowercase());
        }

        match compare(actual, &self.value) {
            Some(ordering) => self.op.accepts(ordering),
            // Mismatched types still support equality on their display form
            None => match self.op {
                FilterOp::Eq => actual.to_string() == self.value.to_string(),
                FilterOp::Ne => actual.to_string() != self.value.to_string(),
                _ => false,
            },
        }
    }
}

fn compare(actual: &IndexValue, expected: &IndexValue) -> Option<Ordering> {
    match (actual, expected) {
        (IndexValue::String(a), IndexValue::String(b)) => Some(a.cmp(b)),
        (IndexValue::Int(a), IndexValue::Int(b)) => Some(a.cmp(b)),
        (IndexValue::Bool(a), IndexValue::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

impl FilterOp {
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            FilterOp::Eq => ordering == Ordering::Equal,
            FilterOp::Ne => ordering != Ordering::Equal,
            FilterOp::Gt => ordering == Ordering::Greater,
            FilterOp::Lt => ordering == Ordering::Less,
            FilterOp::Gte => ordering != Ordering::Less,
            FilterOp::Lte => ordering != Ordering::Greater,
            FilterOp::Contains => ordering == Ordering::Equal,
        }
    }
}

impl std::fmt::Display for FilterOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterOp::Eq => write!(f, "="),
            FilterOp::Ne => write!(f, "!="),
            FilterOp::Gt => write!(f, ">"),
            FilterOp::Lt => write!(f, "<"),
            FilterOp::Gte => write!(f, ">="),
            FilterOp::Lte => write!(f, "<="),
            FilterOp::Contains => write!(f, "~"),
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.field, self.op, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, Task};

    fn task(id: u64, title: &str, completed: bool, priority: Priority) -> Task {
        Task {
            id,
            title: title.to_string(),
            completed,
            priority,
        }
    }

    #[test]
    fn test_filter_creation() {
        let filter = Filter::new("priority", FilterOp::Eq, IndexValue::String("High".to_string()));

        assert_eq!(filter.field, "priority");
        assert_eq!(filter.op, FilterOp::Eq);
    }

    #[test]
    fn test_filter_parse_operators() {
        let cases = [
            ("priority=High", "priority", FilterOp::Eq, IndexValue::String("High".to_string())),
            ("completed!=true", "completed", FilterOp::Ne, IndexValue::Bool(true)),
            ("id>=3", "id", FilterOp::Gte, IndexValue::Int(3)),
            ("id<=3", "id", FilterOp::Lte, IndexValue::Int(3)),
            ("id>1", "id", FilterOp::Gt, IndexValue::Int(1)),
            ("id<9", "id", FilterOp::Lt, IndexValue::Int(9)),
            ("title~milk", "title", FilterOp::Contains, IndexValue::String("milk".to_string())),
        ];

        for (expr, field, op, value) in cases {
            let filter = Filter::parse(expr).unwrap();
            assert_eq!(filter.field, field, "{}", expr);
            assert_eq!(filter.op, op, "{}", expr);
            assert_eq!(filter.value, value, "{}", expr);
        }
    }

    #[test]
    fn test_filter_parse_keeps_operator_chars_in_value() {
        let filter = Filter::parse("title=a=b").unwrap();
        assert_eq!(filter.value, IndexValue::String("a=b".to_string()));
    }

    #[test]
    fn test_filter_parse_rejects_bad_input() {
        assert!(Filter::parse("priority").is_err());
        assert!(Filter::parse("=High").is_err());
        assert!(Filter::parse("pri ority=High").is_err());
    }

    #[test]
    fn test_filter_matches_bool_and_string() {
        let done = task(1, "Buy milk", true, Priority::Medium);
        let open = task(2, "Call mom", false, Priority::High);

        let completed = Filter::parse("completed=true").unwrap();
        assert!(completed.matches(&done));
        assert!(!completed.matches(&open));

        let high = Filter::parse("priority=High").unwrap();
        assert!(!high.matches(&done));
        assert!(high.matches(&open));
    }

    #[test]
    fn test_filter_matches_int_comparisons() {
        let third = task(3, "Water plants", false, Priority::Low);

        assert!(Filter::parse("id>2").unwrap().matches(&third));
        assert!(Filter::parse("id>=3").unwrap().matches(&third));
        assert!(!Filter::parse("id<3").unwrap().matches(&third));
        assert!(Filter::parse("id<=3").unwrap().matches(&third));
        assert!(Filter::parse("id!=4").unwrap().matches(&third));
    }

    #[test]
    fn test_filter_contains_is_case_insensitive() {
        let t = task(1, "Buy MILK and eggs", false, Priority::Medium);
        assert!(Filter::parse("title~milk").unwrap().matches(&t));
        assert!(!Filter::parse("title~bread").unwrap().matches(&t));
    }

    #[test]
    fn test_filter_mismatched_types_compare_display_form() {
        let numeric = task(1, "42", false, Priority::Medium);
        assert!(Filter::parse("title=42").unwrap().matches(&numeric));
        assert!(!Filter::parse("title>41").unwrap().matches(&numeric));
    }

    #[test]
    fn test_filter_unknown_field_never_matches() {
        let t = task(1, "Buy milk", false, Priority::Medium);
        assert!(!Filter::parse("owner=me").unwrap().matches(&t));
        assert!(!Filter::parse("owner!=me").unwrap().matches(&t));
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(Filter::parse("id>=3").unwrap().to_string(), "id>=3");
        assert_eq!(FilterOp::Contains.to_string(), "~");
    }
}
