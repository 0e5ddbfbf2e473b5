use ulid::Ulid;

/// Generates a document id of the form `<prefix>_<ulid>`, e.g.
/// `prod_01J8ZQD4N2M3V5W6X7Y8Z9A0B1`. The type prefix makes ids globally
/// unique across resource tables; the ulid tail keeps ids of one resource
/// roughly time-ordered, which is what the default `(updated_at, id)` sort
/// relies on for tie-breaking.
pub fn object_id(prefix: &str) -> String {
    format!("{prefix}_{}", Ulid::new())
}

/// True when `value` carries the given resource prefix.
pub fn has_prefix(value: &str, prefix: &str) -> bool {
    value
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('_'))
}

/// The id without its resource prefix, or the whole value when no prefix is
/// present (a handle, for example).
pub fn id_suffix(value: &str) -> &str {
    match value.split_once('_') {
        Some((_, rest)) if !rest.is_empty() => rest,
        _ => value,
    }
}
