use indexmap::IndexMap;

use super::{visit, Clarification};
use crate::check::check;
use crate::error::SubstitutionError;
use crate::schema::{DictKeys, DictProps, Field, Schema};
use crate::value::{Value, WildcardMarker};

pub(super) fn clarify_dict(
    schema: &Schema,
    props: &DictProps,
    clarification: Clarification<'_>,
) -> Result<Schema, SubstitutionError> {
    check(schema, clarification)?;
    match clarification {
        Clarification::Value(Value::Dict(m)) => by_value(props, m),
        Clarification::Schema(Schema::Dict(other)) => by_schema(props, other),
        c => Err(SubstitutionError::Mismatch { schema: schema.kind(), clarification: c.to_string() }),
    }
}

/// Declared keys present in `m` are narrowed, absent ones stay as declared.
/// Once keys are declared, an undeclared raw key fails even under the open
/// marker; only a keyless dict adopts what it is given.
fn by_value(props: &DictProps, m: &IndexMap<String, Value>) -> Result<Schema, SubstitutionError> {
    if m.values().any(WildcardMarker::is_wildcard) {
        return Err(SubstitutionError::WildcardInValue);
    }
    let open = props.keys.as_ref().is_some_and(|keys| keys.open);
    let Some(keys) = props.keys.as_ref().filter(|_| !props.is_keyless()) else {
        let fields = m.iter()
            .map(|(k, v)| Ok((k.clone(), Field::required(Schema::from_value(v)?))))
            .collect::<Result<_, SubstitutionError>>()?;
        return Ok(Schema::Dict(DictProps { keys: Some(DictKeys { fields, open }) }));
    };

    if let Some(name) = m.keys().find(|k| !keys.fields.contains_key(*k)) {
        return Err(SubstitutionError::UnknownKey(name.clone()));
    }

    let mut fields = IndexMap::with_capacity(keys.fields.len());
    for (name, field) in &keys.fields {
        let narrowed = match m.get(name) {
            Some(v) => Field { schema: visit(&field.schema, Clarification::Value(v))?, optional: field.optional },
            None => field.clone(),
        };
        fields.insert(name.clone(), narrowed);
    }
    Ok(Schema::Dict(DictProps { keys: Some(DictKeys { fields, open }) }))
}

/// Required keys must be restated and stay required; the candidate decides
/// whether the result is open, which only an open base allows.
fn by_schema(props: &DictProps, other: &DictProps) -> Result<Schema, SubstitutionError> {
    let Some(keys) = props.keys.as_ref().filter(|_| !props.is_keyless()) else {
        return Ok(Schema::Dict(other.clone()));
    };
    let Some(other_keys) = &other.keys else {
        return Err(SubstitutionError::Widening(Schema::Dict(other.clone()).to_string()));
    };
    if other_keys.open && !keys.open {
        return Err(SubstitutionError::OpenKeys);
    }

    let mut fields = IndexMap::with_capacity(other_keys.fields.len());
    for (name, field) in &keys.fields {
        match other_keys.fields.get(name) {
            Some(theirs) if theirs.optional && !field.optional => {
                return Err(SubstitutionError::OptionalKey(name.clone()));
            }
            Some(theirs) => {
                let schema = visit(&field.schema, Clarification::Schema(&theirs.schema))?;
                fields.insert(name.clone(), Field { schema, optional: theirs.optional });
            }
            None if !field.optional => return Err(SubstitutionError::MissingKey(name.clone())),
            // an optional key left unmentioned survives only where unlisted keys do
            None if other_keys.open => {
                fields.insert(name.clone(), field.clone());
            }
            None => {}
        }
    }
    for (name, theirs) in other_keys.fields.iter().filter(|(k, _)| !keys.fields.contains_key(*k)) {
        if !keys.open {
            return Err(SubstitutionError::UnknownKey(name.clone()));
        }
        fields.insert(name.clone(), theirs.clone());
    }
    Ok(Schema::Dict(DictProps { keys: Some(DictKeys { fields, open: other_keys.open }) }))
}

// ------------------------------- Tests ------------------------------------ //
