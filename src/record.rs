// Record trait for filterable items

use std::collections::HashMap;

/// Anything a `Filter` can be evaluated against
pub trait Record {
    /// Stable identifier for this record
    fn id(&self) -> u64;

    /// Fields exposed to filtering, keyed by field name
    fn indexed_fields(&self) -> HashMap<String, IndexValue> {
        HashMap::new()
    }
}

/// Value types that can be indexed for filtering
#[derive(Debug, Clone, PartialEq)]
pub enum IndexValue {
    String(String),
    Int(i64),
    Bool(bool),
}

impl IndexValue {
    /// Type a raw filter value: `true`/`false` become Bool, integers Int
    pub fn infer(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("true") {
            IndexValue::Bool(true)
        } else if raw.eq_ignore_ascii_case("false") {
            IndexValue::Bool(false)
        } else if let Ok(i) = raw.parse::<i64>() {
            IndexValue::Int(i)
        } else {
            IndexValue::String(raw.to_string())
        }
    }
}

impl std::fmt::Display for IndexValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexValue::String(s) => write!(f, "{}", s),
            IndexValue::Int(i) => write!(f, "{}", i),
            IndexValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare(u64);

    impl Record for Bare {
        fn id(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn test_record_default_has_no_indexed_fields() {
        let record = Bare(9);
        assert_eq!(record.id(), 9);
        assert!(record.indexed_fields().is_empty());
    }

    #[test]
    fn test_index_value_display() {
        assert_eq!(IndexValue::String("test".to_string()).to_string(), "test");
        assert_eq!(IndexValue::Int(42).to_string(), "42");
        assert_eq!(IndexValue::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_index_value_infer() {
        assert_eq!(IndexValue::infer("true"), IndexValue::Bool(true));
        assert_eq!(IndexValue::infer("False"), IndexValue::Bool(false));
        assert_eq!(IndexValue::infer("12"), IndexValue::Int(12));
        assert_eq!(IndexValue::infer("-3"), IndexValue::Int(-3));
        assert_eq!(IndexValue::infer("High"), IndexValue::String("High".to_string()));
    }
}
