use crate::models::{FieldMap, PopulationNode, Projection};

/// Moves projection entries addressing a populated relation into that
/// relation's `select`.
///
/// With `populate=author.profile&fields=title,author.name,author.profile.bio`
/// the projection keeps `title`, `author` selects `name` and `profile`
/// selects `bio`. Keys nested deeper than a populated node stay where they are.
pub fn merge_projection(projection: &mut Projection, population: &mut [PopulationNode]) {
    for root in population {
        if projection.is_empty() {
            return;
        }

        let mut prefix = String::new();
        let mut node = Some(root);

        while let Some(current) = node {
            prefix.push_str(&current.path);
            prefix.push('.');

            let children = projection.take_children(&prefix);
            if !children.is_empty() {
                let select = current.select.get_or_insert_with(FieldMap::new);
                for (field, weight) in children {
                    select.insert(field, weight);
                }
            }

            node = current.populate.as_deref_mut();
        }
    }
}
