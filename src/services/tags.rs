//! Tag reconciliation.

/// Compute a mod's new tag list from add and delete requests.
///
/// Deletes run first and remove only the first occurrence of each tag.
/// Adds then append tags not already present, in request order. Untouched
/// tags keep their position. A tag both deleted and added survives only if
/// it was absent to begin with.
pub fn reconcile<A, D>(current: &[String], add: &[A], delete: &[D]) -> Vec<String>
where
    A: AsRef<str>,
    D: AsRef<str>,
{
    let mut tags = current.to_vec();

    for tag in delete {
        if let Some(idx) = tags.iter().position(|t| t == tag.as_ref()) {
            tags.remove(idx);
        }
    }

    for tag in add {
        let tag = tag.as_ref();
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }

    tags
}
