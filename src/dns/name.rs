//! Domain name helpers. Names are compared in canonical form: fully qualified and ASCII lowercase.

/// Returns `name` with exactly one trailing dot. The empty name becomes the root.
pub fn fqdn(name: &str) -> String {
    let trimmed = name.trim_end_matches('.');
    if trimmed.is_empty() {
        return ".".to_string();
    }
    format!("{trimmed}.")
}

/// Fully qualified, lowercase form of `name`.
pub fn canonical(name: &str) -> String {
    fqdn(name).to_ascii_lowercase()
}

/// Whether `child` is equal to `parent` or lies below it.
pub fn is_subdomain(parent: &str, child: &str) -> bool {
    let parent = canonical(parent);
    let child = canonical(child);

    if parent == "." || parent == child {
        return true;
    }
    child
        .strip_suffix(parent.as_str())
        .is_some_and(|prefix| prefix.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fqdn_adds_a_single_dot() {
        assert_eq!(fqdn("example.com"), "example.com.");
        assert_eq!(fqdn("example.com."), "example.com.");
        assert_eq!(fqdn("example.com.."), "example.com.");
        assert_eq!(fqdn(""), ".");
    }

    #[test]
    fn canonical_lowercases() {
        assert_eq!(canonical("Foo.Example.COM"), "foo.example.com.");
    }

    #[test]
    fn subdomain_checks_label_boundaries() {
        assert!(is_subdomain("example.com.", "example.com"));
        assert!(is_subdomain("example.com", "foo.EXAMPLE.com."));
        assert!(is_subdomain(".", "anything.org."));
        assert!(!is_subdomain("example.com.", "badexample.com."));
        assert!(!is_subdomain("foo.example.com.", "example.com."));
        assert!(!is_subdomain("bar.example.com.", "foo.example.com."));
    }
}
