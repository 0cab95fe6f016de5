use std::collections::BTreeMap;

use validator::ValidationErrors;

/// Flatten `validator` output into a field -> messages map the templates can
/// iterate in stable order.
pub fn validation_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| match &e.message {
                    Some(m) => m.to_string(),
                    None => format!("The {field} field is invalid."),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}
