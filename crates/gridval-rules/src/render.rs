//! Human-readable reports for error collections.

use std::fmt::Write;

use crate::errors::{BatchErrors, IdLookup, ValidationError};

/// Render a list of errors for a dataset called `name`.
///
/// With `details`, every error is followed by its context lines.
pub fn errors_to_string(
    errors: &[ValidationError],
    name: &str,
    details: bool,
    id_lookup: Option<&IdLookup>,
) -> String {
    if errors.is_empty() {
        return format!("{name}: OK");
    }
    let mut msg = if errors.len() == 1 {
        format!("There is a validation error in {name}:")
    } else {
        format!("There are {} validation errors in {name}:", errors.len())
    };

    if errors.len() == 1 && !details {
        let _ = write!(msg, "\n\t{}", errors[0]);
        return msg;
    }

    for (i, error) in errors.iter().enumerate() {
        if details {
            let _ = write!(msg, "\n\n{}", error);
            for (key, value) in error.context(id_lookup) {
                let _ = write!(msg, "\n\t{key}: {value}");
            }
        } else {
            let _ = write!(msg, "\n{:>4}. {}", i + 1, error);
        }
    }
    msg
}

/// Render batch errors, one section per failing batch.
pub fn batch_errors_to_string(
    errors: &BatchErrors,
    name: &str,
    details: bool,
    id_lookup: Option<&IdLookup>,
) -> String {
    if errors.is_empty() {
        return format!("{name}: OK");
    }
    let sections: Vec<String> = errors
        .iter()
        .map(|(batch, batch_errors)| {
            errors_to_string(batch_errors, &format!("{name}, batch #{batch}"), details, id_lookup)
        })
        .collect();
    sections.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use gridval_core::ComponentType;

    fn missing(field: &str, ids: Vec<i32>) -> ValidationError {
        ValidationError::new(ErrorKind::MissingValue, ComponentType::Node, &[field], ids)
    }

    #[test]
    fn test_ok_and_single() {
        assert_eq!(errors_to_string(&[], "input_data", false, None), "input_data: OK");
        let text = errors_to_string(&[missing("u_rated", vec![1])], "input_data", false, None);
        assert_eq!(
            text,
            "There is a validation error in input_data:\n\tField 'u_rated' is missing for 1 node."
        );
    }

    #[test]
    fn test_numbered_list() {
        let errors = vec![missing("u_rated", vec![1]), missing("id", vec![])];
        let text = errors_to_string(&errors, "data", false, None);
        assert!(text.starts_with("There are 2 validation errors in data:"));
        assert!(text.contains("\n   1. Field 'u_rated'"));
        assert!(text.contains("\n   2. Field 'id' is missing for node."));
    }

    #[test]
    fn test_details_include_context() {
        let text = errors_to_string(&[missing("u_rated", vec![3])], "data", true, None);
        assert!(text.contains("\tcomponent: node"), "got: {text}");
        assert!(text.contains("\tids: [3]"), "got: {text}");
    }

    #[test]
    fn test_batch_sections() {
        let mut errors = BatchErrors::new();
        errors.insert(2, vec![missing("u_rated", vec![1])]);
        let text = batch_errors_to_string(&errors, "update_data", false, None);
        assert!(text.starts_with("There is a validation error in update_data, batch #2:"));
    }
}
