use validator::ValidationErrors;

/// Human-readable messages from a failed `validate()`, ordered by field name
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{Validate, ValidationError};

    fn non_empty(value: &str) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::new("required"));
        }
        Ok(())
    }

    #[derive(Validate)]
    struct Form {
        #[validate(custom(function = "non_empty", message = "name is required"))]
        name: String,
        #[validate(custom(function = "non_empty"))]
        alias: String,
    }

    #[test]
    fn test_messages_are_sorted_by_field() {
        let form = Form {
            name: String::new(),
            alias: String::new(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            validation_messages(&errors),
            vec!["alias is invalid".to_string(), "name is required".to_string()]
        );
    }

    #[test]
    fn test_valid_form_has_no_messages() {
        let form = Form {
            name: "a".to_string(),
            alias: "b".to_string(),
        };
        assert!(form.validate().is_ok());
    }
}
