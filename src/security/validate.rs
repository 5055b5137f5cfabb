// Query parameter screening. These are substring screens, not parsers:
// a flagged value is rejected outright, never sanitized.

/// Why a parameter failed validation. `details` names the parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
    pub details: String,
}

const MAX_PARAMETER_LENGTH: usize = 1000;

const SQL_PATTERNS: &[&str] = &[
    "union select",
    "drop table",
    "delete from",
    "insert into",
    "update set",
    "alter table",
    "create table",
    "exec(",
    "execute(",
    "sp_",
    "xp_",
    "/*",
    "*/",
    "--",
    "';",
    "or 1=1",
    "and 1=1",
    "' or '",
    "\" or \"",
    "union all",
    "information_schema",
    "sysobjects",
];

const XSS_PATTERNS: &[&str] = &[
    "<script",
    "</script>",
    "javascript:",
    "vbscript:",
    "onload=",
    "onerror=",
    "onclick=",
    "onmouseover=",
    "alert(",
    "confirm(",
    "prompt(",
    "document.cookie",
    "window.location",
    "eval(",
    "expression(",
    "<iframe",
    "<object",
    "<embed",
    "<applet",
];

const PATH_TRAVERSAL_PATTERNS: &[&str] = &[
    "../",
    "..\\",
    "..%2f",
    "..%5c",
    "%2e%2e%2f",
    "%2e%2e%5c",
    "....//",
    "....\\\\",
    "/etc/passwd",
    "/etc/shadow",
    "c:\\windows",
    "c:/windows",
];

const COMMAND_PATTERNS: &[&str] = &[
    ";", "|", "`", "$(", "&&", "||", ">>", "<<", "cat ", "ls ", "pwd", "whoami", "rm ", "del ",
    "format ", "shutdown",
];

/// Validates every key=value pair of a raw query string.
pub fn validate_query(query: &str) -> Result<(), ValidationError> {
    for pair in query.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            validate_parameter(key, value)?;
        }
    }
    Ok(())
}

/// Screens one parameter value for injection patterns and excessive length.
pub fn validate_parameter(name: &str, value: &str) -> Result<(), ValidationError> {
    let lower = value.to_ascii_lowercase();

    if contains_any(&lower, SQL_PATTERNS) {
        return Err(failure(name, "contains suspicious SQL patterns"));
    }
    if contains_any(&lower, XSS_PATTERNS) {
        return Err(failure(name, "contains suspicious script patterns"));
    }
    if contains_any(&lower, PATH_TRAVERSAL_PATTERNS) {
        return Err(failure(name, "contains path traversal patterns"));
    }
    // Command patterns are case-sensitive in the wild ("RM " is not rm).
    if contains_any(value, COMMAND_PATTERNS) {
        return Err(failure(name, "contains command injection patterns"));
    }
    if value.len() > MAX_PARAMETER_LENGTH {
        return Err(ValidationError {
            message: "Parameter too long".into(),
            details: format!(
                "Parameter '{}' exceeds maximum length of {} characters",
                name, MAX_PARAMETER_LENGTH
            ),
        });
    }
    Ok(())
}

fn contains_any(value: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| value.contains(p))
}

fn failure(name: &str, reason: &str) -> ValidationError {
    ValidationError {
        message: "Invalid parameter value".into(),
        details: format!("Parameter '{}' {}", name, reason),
    }
}
