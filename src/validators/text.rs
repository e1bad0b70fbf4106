use crate::CrmError;

/// Display names for customers, vendors, deals and the like.
pub fn validate_name(name: &str) -> Result<(), CrmError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CrmError::Validation("Name cannot be empty".to_owned()));
    }
    if trimmed.len() > 200 {
        return Err(CrmError::Validation(
            "Name is too long (max 200 characters)".to_owned(),
        ));
    }
    Ok(())
}

/// Subject lines for tickets and tasks.
pub fn validate_subject(subject: &str) -> Result<(), CrmError> {
    let trimmed = subject.trim();
    if trimmed.is_empty() {
        return Err(CrmError::Validation("Subject cannot be empty".to_owned()));
    }
    if trimmed.len() > 500 {
        return Err(CrmError::Validation(
            "Subject is too long (max 500 characters)".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_rejects_empty_and_whitespace() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("Acme Corp").is_ok());
    }

    #[test]
    fn test_name_length_limit() {
        assert!(validate_name(&"a".repeat(200)).is_ok());
        assert!(validate_name(&"a".repeat(201)).is_err());
    }

    #[test]
    fn test_subject_length_limit() {
        assert!(validate_subject("Printer on fire").is_ok());
        assert!(validate_subject(&"a".repeat(501)).is_err());
    }
}
