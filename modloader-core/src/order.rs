//! Dependency ordering of discovered entries

use std::collections::{BTreeMap, BTreeSet};

use crate::entry::ModEntry;

/// Order entries so every entry comes after the entries it requires.
///
/// Kahn's algorithm over requirements on discovered ids; ties are broken by
/// id so the result does not depend on discovery order. Entries that cannot
/// be ordered (on a cycle, or requiring something on one) are rejected and
/// appended in id order.
pub fn sort_entries(entries: Vec<ModEntry>) -> Vec<ModEntry> {
    let mut by_id: BTreeMap<String, ModEntry> = entries
        .into_iter()
        .map(|entry| (entry.id().to_string(), entry))
        .collect();

    // id -> number of unmet dependencies, and dependency -> dependents
    let mut pending: BTreeMap<String, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (id, entry) in &by_id {
        let mut count = 0;
        for requirement in entry.requirements() {
            if by_id.contains_key(&requirement.id) {
                count += 1;
                dependents
                    .entry(requirement.id.clone())
                    .or_default()
                    .push(id.clone());
            }
        }
        pending.insert(id.clone(), count);
    }

    let mut ready: BTreeSet<String> = pending
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(id, _)| id.clone())
        .collect();

    let mut ordered = Vec::with_capacity(by_id.len());
    while let Some(id) = ready.pop_first() {
        pending.remove(&id);
        for dependent in dependents.remove(&id).unwrap_or_default() {
            if let Some(count) = pending.get_mut(&dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(dependent);
                }
            }
        }
        if let Some(entry) = by_id.remove(&id) {
            ordered.push(entry);
        }
    }

    // Leftovers either sit on a cycle or only require something that does.
    let leftover: BTreeMap<&str, Vec<&str>> = by_id
        .iter()
        .map(|(id, entry)| {
            let requires = entry
                .requirements()
                .iter()
                .map(|r| r.id.as_str())
                .filter(|dep| by_id.contains_key(*dep))
                .collect();
            (id.as_str(), requires)
        })
        .collect();
    let cyclic: BTreeSet<String> = leftover
        .keys()
        .filter(|id| on_cycle(id, &leftover))
        .map(|id| id.to_string())
        .collect();

    for (id, mut entry) in by_id {
        if cyclic.contains(&id) {
            entry.reject(&format!("Dependency cycle involving '{id}'."));
        } else {
            entry.reject("Requires mod on a dependency cycle.");
        }
        ordered.push(entry);
    }
    ordered
}

/// Whether `id` can reach itself through `requires`.
fn on_cycle(id: &str, requires: &BTreeMap<&str, Vec<&str>>) -> bool {
    let mut seen = BTreeSet::new();
    let mut stack: Vec<&str> = requires.get(id).cloned().unwrap_or_default();
    while let Some(next) = stack.pop() {
        if next == id {
            return true;
        }
        if seen.insert(next) {
            stack.extend(requires.get(next).into_iter().flatten().copied());
        }
    }
    false
}
