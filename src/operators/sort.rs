use crate::models::{FieldMap, Sort};

/// Weights given to `+field`/`field` and `-field`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnaryWeights {
    pub plus: i64,
    pub minus: i64,
}

impl Default for UnaryWeights {
    fn default() -> Self {
        Self { plus: 1, minus: -1 }
    }
}

/// Parses `a,-b,+c` into `{a: plus, b: minus, c: plus}`
#[must_use]
pub fn parse_unaries(unaries: &str, weights: UnaryWeights) -> FieldMap {
    let mut fields = FieldMap::new();
    for unary in unaries.split(',') {
        let (weight, field) = match unary.strip_prefix('-') {
            Some(field) => (weights.minus, field),
            None => (weights.plus, unary.strip_prefix('+').unwrap_or(unary)),
        };
        let field = field.trim();
        if !field.is_empty() {
            fields.insert(field, weight);
        }
    }
    fields
}

/// `sort=-createdAt,name` → `{createdAt: -1, name: 1}`
#[must_use]
pub fn build_sort(sort: &str) -> Sort {
    parse_unaries(sort, UnaryWeights::default())
}
