//! Label lookup with graceful degradation for unknown codes.

use std::collections::HashMap;

use dealboard_domain::{CrmUser, FieldOption};

/// Resolve a categorical code to its display label, degrading to
/// `"{prefix} {code}"` when the option list does not know the code.
pub fn label_for(labels: &HashMap<String, String>, code: &str, prefix: &str) -> String {
    labels.get(code).cloned().unwrap_or_else(|| format!("{prefix} {code}"))
}

/// Build a code → label map from a cached option list.
pub fn option_map(options: &[FieldOption]) -> HashMap<String, String> {
    options.iter().map(|o| (o.code.clone(), o.label.clone())).collect()
}

/// Resolve an upstream user id to a display name, degrading to `"User {id}"`.
pub fn user_label(users: &[CrmUser], user_id: i64) -> String {
    users
        .iter()
        .find(|u| u.id == user_id)
        .map_or_else(|| format!("User {user_id}"), |u| u.name.clone())
}
