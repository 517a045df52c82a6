use crate::schema::DictProps;

/// Key-name comparison only: every required key of `base` must be declared by
/// `sub`. Value schemas and the open marker are not looked at.
pub fn is_narrower(base: &DictProps, sub: &DictProps) -> bool {
    let Some(base_keys) = &base.keys else { return true };
    let Some(sub_keys) = &sub.keys else { return false };
    base_keys.fields.iter()
        .filter(|(_, field)| !field.optional)
        .all(|(name, _)| sub_keys.fields.contains_key(name))
}
