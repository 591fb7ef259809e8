use serde_json::Value;

use super::sort::{UnaryWeights, parse_unaries};
use crate::literal::parse_object_literal;
use crate::models::{FieldMap, Projection};

const ID_FIELD: &str = "_id";

/// Builds a projection from `fields=name,-password` or `fields={"name":1}`.
///
/// Document stores reject projections mixing inclusions and exclusions, so
/// when both appear (ignoring `_id`) only the exclusions are kept.
#[must_use]
pub fn build_projection(projection: &str) -> Projection {
    let mut fields = literal_projection(projection).unwrap_or_else(|| {
        parse_unaries(projection, UnaryWeights { plus: 1, minus: 0 })
    });

    let mut including = false;
    let mut excluding = false;
    for (field, weight) in fields.iter() {
        if field != ID_FIELD {
            including |= weight == 1;
            excluding |= weight == 0;
        }
    }

    if including && excluding {
        fields.retain(|_, weight| weight != 1);
    }

    fields
}

/// A JSON object literal; entries that are not integer or boolean flags
/// (`{"comments": {"$slice": 5}}`) are skipped
fn literal_projection(projection: &str) -> Option<FieldMap> {
    let object = parse_object_literal(projection)?;
    let mut fields = FieldMap::new();
    for (field, flag) in object {
        let weight = match &flag {
            Value::Bool(flag) => Some(i64::from(*flag)),
            Value::Number(number) => number.as_i64(),
            _ => None,
        };
        match weight {
            Some(weight) => fields.insert(field, weight),
            None => tracing::debug!(field = %field, flag = %flag, "Projection entry is not a flag, skipping"),
        }
    }
    Some(fields)
}
