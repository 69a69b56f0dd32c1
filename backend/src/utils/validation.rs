use validator::ValidationError;

const SEARCH_QUERY_MAX_LENGTH: usize = 100;

/// Validate email format with the same rule the admin forms apply through
/// `#[validate(email)]`.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.len() > library_platform_shared::EMAIL_MAX_LENGTH as usize {
        return Err(ValidationError::new("email_too_long"));
    }

    if !validator::validate_email(email) {
        return Err(ValidationError::new("invalid_email_format"));
    }

    Ok(())
}

/// Lowercase the domain part of an email address, leaving the local part
/// alone. Input without an `@` comes back trimmed but otherwise unchanged.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Escape `LIKE` wildcards so a term matches literally under `ESCAPE '\'`.
pub fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Trim an admin search box value; blank input means "no search".
pub fn clean_search_query(query: &str) -> Result<Option<String>, ValidationError> {
    let trimmed = query.trim();

    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.chars().count() > SEARCH_QUERY_MAX_LENGTH {
        return Err(ValidationError::new("search_query_too_long"));
    }

    Ok(Some(trimmed.to_string()))
}

/// Escape text for inclusion in HTML attribute values and bodies.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name+tag@domain.co.uk").is_ok());

        assert!(validate_email("invalid-email").is_err());
        assert!(validate_email("@domain.com").is_err());
        assert!(validate_email("user@").is_err());
    }

    #[test]
    fn test_email_validation_agrees_with_form_rule() {
        for email in ["o'brien@example.com", "first.last@sub.example.org", "a@localhost"] {
            assert_eq!(
                validate_email(email).is_ok(),
                validator::validate_email(email),
                "{}",
                email
            );
        }
        assert!(validate_email("o'brien@example.com").is_ok());
        assert_eq!(
            validate_email(&format!("{}@example.com", "a".repeat(250))).unwrap_err().code,
            "email_too_long"
        );
    }

    #[test]
    fn test_normalize_email_lowercases_domain_only() {
        assert_eq!(normalize_email("A@B.COM"), "A@b.com");
        assert_eq!(normalize_email("  Jane.Doe@Example.ORG "), "Jane.Doe@example.org");
        assert_eq!(normalize_email("odd@name@HOST.io"), "odd@name@host.io");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
        assert_eq!(normalize_email("  no-at-sign \t"), "no-at-sign");
    }

    #[test]
    fn test_search_query_cleaning() {
        assert_eq!(clean_search_query("  smith ").unwrap(), Some("smith".to_string()));
        assert_eq!(clean_search_query("   ").unwrap(), None);
        assert!(clean_search_query(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_sure\\"), "100\\%\\_sure\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("a \"b\" & c"), "a &quot;b&quot; &amp; c");
    }
}
