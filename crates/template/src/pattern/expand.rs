use super::atom::field_name;
use std::collections::BTreeMap;

/// Substitutes named sub-templates into `template`, one textual pass.
///
/// Both `${name}` and `%name` refer to the sub-template `name`. Substituted
/// text is not rescanned, quoted literals are copied untouched, and references
/// to undeclared names are left as they are (a `%name` then compiles to a field
/// atom). An unterminated quote is copied through for the compiler to reject.
pub(crate) fn expand(template: &str, templates: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut i = 0;
    while let Some(found) = template[i..].find(['"', '$', '%']) {
        let at = i + found;
        out.push_str(&template[i..at]);
        let rest = &template[at..];
        i = match rest.as_bytes()[0] {
            b'"' => match rest[1..].find('"') {
                Some(close) => {
                    out.push_str(&rest[..close + 2]);
                    at + close + 2
                },
                None => {
                    out.push_str(rest);
                    template.len()
                },
            },
            b'$' => match rest.strip_prefix("${").and_then(|r| r.find('}').map(|close| &r[..close])) {
                Some(name) => {
                    out.push_str(templates.get(name).map_or(&rest[..name.len() + 3], String::as_str));
                    at + name.len() + 3
                },
                None => {
                    out.push('$');
                    at + 1
                },
            },
            // '%'
            _ => match field_name(&rest[1..]).and_then(|name| templates.get(name).map(|t| (name, t))) {
                Some((name, replacement)) => {
                    out.push_str(replacement);
                    at + name.len() + 1
                },
                // Keep `%%` together so the second percent sign isn't read as
                // the start of another reference.
                None if rest.starts_with("%%") => {
                    out.push_str("%%");
                    at + 2
                },
                None => {
                    out.push('%');
                    at + 1
                },
            },
        };
    }
    out.push_str(&template[i..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn templates() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("date".to_string(), "%Y-%m-%b".to_string()),
            ("location".to_string(), "%city|%county|%village".to_string()),
            ("year".to_string(), "%Y".to_string()),
            ("month".to_string(), "%B".to_string()),
            ("nested".to_string(), "%year".to_string()),
        ])
    }

    #[rstest]
    #[case("${year}/${month}", "%Y/%B")]
    #[case("${location}/${year}/${month}", "%city|%county|%village/%Y/%B")]
    #[case("%date/%album|%location", "%Y-%m-%b/%album|%city|%county|%village")]
    #[case("%year_taken", "%year_taken")]
    #[case("%dates", "%dates")]
    #[case("${undefined}/%Y", "${undefined}/%Y")]
    #[case(r#"%"%date"/%date"#, r#"%"%date"/%Y-%m-%b"#)]
    #[case("100%%date", "100%%date")]
    #[case("$5/%d", "$5/%d")]
    fn test_expand(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(expand(input, &templates()), expected);
    }

    #[test]
    fn test_expansion_is_single_pass() {
        assert_eq!(expand("%nested", &templates()), "%year");
    }

    #[test]
    fn test_unterminated_quote_is_copied() {
        assert_eq!(expand(r#"%date/"open"#, &templates()), r#"%Y-%m-%b/"open"#);
    }
}
