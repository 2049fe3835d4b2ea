//! Namespace derivation from the current git branch

/// Namespace used when the branch cannot be turned into one
pub const DEFAULT_NAMESPACE: &str = "default";

fn is_suffix_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Returns the trailing run of `[A-Za-z0-9_-]` in a branch name
///
/// Everything up to and including the last other character is cut, so
/// `feature/foo-bar` becomes `foo-bar`.
pub fn branch_suffix(name: &str) -> &str {
    let name = name.trim();
    match name.rfind(|c: char| !is_suffix_char(c)) {
        Some(idx) => {
            // idx points at a char boundary; skip the offending char itself
            let cut = idx + name[idx..].chars().next().map_or(1, char::len_utf8);
            &name[cut..]
        }
        None => name,
    }
}

/// Turns an optional branch name into a namespace, falling back to `default`
pub fn namespace_from_branch(branch: Option<&str>) -> String {
    match branch.map(branch_suffix) {
        Some(suffix) if !suffix.is_empty() => suffix.to_string(),
        _ => DEFAULT_NAMESPACE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_suffix() {
        assert_eq!(branch_suffix("feature/foo-bar"), "foo-bar");
        assert_eq!(branch_suffix("main"), "main");
        assert_eq!(branch_suffix("release/v1.2"), "2");
        assert_eq!(branch_suffix("user/ümlaut_fix"), "mlaut_fix");
    }

    #[test]
    fn test_branch_suffix_empty() {
        assert_eq!(branch_suffix(""), "");
        assert_eq!(branch_suffix("feature/"), "");
        assert_eq!(branch_suffix("///"), "");
    }

    #[test]
    fn test_branch_suffix_trims_newline() {
        assert_eq!(branch_suffix("develop\n"), "develop");
    }

    #[test]
    fn test_namespace_from_branch() {
        assert_eq!(namespace_from_branch(Some("feature/login")), "login");
        assert_eq!(namespace_from_branch(Some("feature/")), DEFAULT_NAMESPACE);
        assert_eq!(namespace_from_branch(None), DEFAULT_NAMESPACE);
    }
}
