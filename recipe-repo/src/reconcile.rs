//! Get-or-create resolution of nested children.
//!
//! A recipe or ingredient write carries a list of child mappings (tag names, ingredient names,
//! nutrient name/grams pairs). Each mapping is matched by its natural key against the rows the
//! owner already has; unmatched keys become new rows. The result is the ordered list of child ids
//! to associate with the parent, without duplicates.
//!
//! Resolution is pure. Each backend looks up the owner's candidate rows, calls [resolve], inserts
//! [Resolution::new_rows] and then maps the plan to ids with [Resolution::into_ids].

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Resolved {
    Existing(i32),
    New(usize),
}

#[derive(Debug)]
pub struct Resolution<T> {
    new_rows: Vec<T>,
    attach: Vec<Resolved>,
}

impl<T> Resolution<T> {
    /// Rows that have to be inserted, in first-seen order.
    pub fn new_rows(&self) -> &[T] {
        &self.new_rows
    }

    /// Maps the plan to child ids. `created_ids[i]` must be the id given to `new_rows()[i]`.
    pub fn into_ids(self, created_ids: &[i32]) -> Vec<i32> {
        debug_assert_eq!(
            created_ids.len(),
            self.new_rows.len(),
            "an id is needed for every new row"
        );
        self.attach
            .into_iter()
            .map(|r| match r {
                Resolved::Existing(id) => id,
                Resolved::New(index) => created_ids[index],
            })
            .collect()
    }
}

/// Resolves `requested` against `existing` `(key, id)` pairs.
///
/// When several existing rows share a key the lowest id is reused. Requested children with the
/// same key resolve to the same row and are attached once.
pub fn resolve<T, K, F>(existing: Vec<(K, i32)>, requested: Vec<T>, key: F) -> Resolution<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut by_key: HashMap<K, Resolved> = HashMap::with_capacity(existing.len());
    for (k, id) in existing {
        by_key
            .entry(k)
            .and_modify(|r| {
                if let Resolved::Existing(current) = r {
                    if id < *current {
                        *current = id;
                    }
                }
            })
            .or_insert(Resolved::Existing(id));
    }

    let mut new_rows = Vec::new();
    let mut attach = Vec::with_capacity(requested.len());
    for child in requested {
        let resolved = *by_key.entry(key(&child)).or_insert_with(|| {
            new_rows.push(child);
            Resolved::New(new_rows.len() - 1)
        });
        if !attach.contains(&resolved) {
            attach.push(resolved);
        }
    }

    Resolution { new_rows, attach }
}
