use super::{
    Transformation, TransformationKind,
    params::{CASE_SENSITIVE, DEFAULT_VALUE, MAPPINGS, TransformParameters},
};

/// Maps raw values onto a fixed category vocabulary.
///
/// Lookup order: a matching key in `Mappings`, then a value that is already
/// one of the mapped categories (returned in its canonical spelling), then
/// `DefaultValue`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryMapping;

impl Transformation for CategoryMapping {
    fn kind(&self) -> TransformationKind {
        TransformationKind::CategoryMapping
    }

    fn transform(&self, input: &str, params: &TransformParameters) -> String {
        let default = params.text_or(DEFAULT_VALUE, "");
        let Some(mappings) = params.map(MAPPINGS) else {
            return default.to_string();
        };
        let case_sensitive = params.bool_or(CASE_SENSITIVE, false);
        let needle = input.trim();
        let same = |candidate: &str| {
            if case_sensitive {
                candidate == needle
            } else {
                candidate.to_lowercase() == needle.to_lowercase()
            }
        };

        if let Some(mapped) = mappings.get(needle) {
            return mapped.clone();
        }
        if let Some((_, mapped)) = mappings.iter().find(|(key, _)| same(key.as_str())) {
            return mapped.clone();
        }
        if let Some(category) = mappings.values().find(|value| same(value.as_str())) {
            return category.clone();
        }
        default.to_string()
    }

    fn describe(&self, params: &TransformParameters) -> String {
        let count = params.map(MAPPINGS).map_or(0, |mappings| mappings.len());
        let default = params.text_or(DEFAULT_VALUE, "");
        let mode = if params.bool_or(CASE_SENSITIVE, false) {
            ", case-sensitive"
        } else {
            ""
        };
        format!("Map {count} value(s) to categories (default '{default}'{mode})")
    }

    fn validate_parameters(&self, params: &TransformParameters) -> Result<(), String> {
        match params.get(MAPPINGS) {
            None => return Err(format!("{MAPPINGS} is required")),
            Some(value) => match value.as_map() {
                None => {
                    return Err(format!(
                        "{MAPPINGS} must be a dictionary, found {}",
                        value.type_name()
                    ));
                }
                Some(mappings) if mappings.is_empty() => {
                    return Err(format!("{MAPPINGS} must contain at least one entry"));
                }
                Some(_) => {}
            },
        }
        if let Some(value) = params.get(CASE_SENSITIVE)
            && value.as_bool().is_none()
        {
            return Err(format!("{CASE_SENSITIVE} must be true or false"));
        }
        if let Some(value) = params.get(DEFAULT_VALUE)
            && value.as_text().is_none()
        {
            return Err(format!(
                "{DEFAULT_VALUE} must be a string, found {}",
                value.type_name()
            ));
        }
        Ok(())
    }
}
