//! `Link` response header parsing (RFC 8288 subset)

/// Find the target of the `rel="next"` entry in a `Link` header value
///
/// GitLab sends entries like `<https://host/api/v4/groups?page=2>; rel="next"`
/// separated by commas. Relation names are matched case-insensitively and a
/// `rel` may list several space-separated relations.
pub fn next_link(header: &str) -> Option<String> {
    find_relation(header, "next")
}

/// Find the target of the entry carrying relation `rel`
pub fn find_relation(header: &str, rel: &str) -> Option<String> {
    split_entries(header).into_iter().find_map(|entry| {
        let (target, params) = parse_entry(entry)?;
        let has_rel = params.iter().any(|(name, value)| {
            name.eq_ignore_ascii_case("rel")
                && value
                    .split_whitespace()
                    .any(|r| r.eq_ignore_ascii_case(rel))
        });
        has_rel.then(|| target.to_string())
    })
}

// Commas may appear inside `<...>`, so split only outside angle brackets.
fn split_entries(header: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in header.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                entries.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(&header[start..]);
    entries
}

fn parse_entry(entry: &str) -> Option<(&str, Vec<(&str, &str)>)> {
    let entry = entry.trim();
    let open = entry.find('<')?;
    let close = entry[open..].find('>')? + open;
    let target = entry[open + 1..close].trim();
    if target.is_empty() {
        return None;
    }

    let params = entry[close + 1..]
        .split(';')
        .filter_map(|param| {
            let (name, value) = param.split_once('=')?;
            Some((name.trim(), value.trim().trim_matches('"')))
        })
        .collect();

    Some((target, params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_next_among_relations() {
        let header = r#"<https://gitlab.example.com/api/v4/groups?page=1&per_page=2>; rel="prev", <https://gitlab.example.com/api/v4/groups?page=3&per_page=2>; rel="next", <https://gitlab.example.com/api/v4/groups?page=1&per_page=2>; rel="first""#;
        assert_eq!(
            next_link(header).as_deref(),
            Some("https://gitlab.example.com/api/v4/groups?page=3&per_page=2")
        );
    }

    #[test]
    fn no_next_on_last_page() {
        let header = r#"<https://h/api/v4/groups?page=1>; rel="first", <https://h/api/v4/groups?page=1>; rel="last""#;
        assert_eq!(next_link(header), None);
    }

    #[test]
    fn tolerates_unquoted_and_multi_valued_rel() {
        assert_eq!(
            next_link("<https://h/x?page=2>; rel=next").as_deref(),
            Some("https://h/x?page=2")
        );
        assert_eq!(
            next_link(r#"<https://h/x?page=2>; rel="last NEXT""#).as_deref(),
            Some("https://h/x?page=2")
        );
    }

    #[test]
    fn comma_inside_target_is_not_a_separator() {
        let header = r#"<https://h/x?ids=1,2&page=2>; rel="next""#;
        assert_eq!(
            next_link(header).as_deref(),
            Some("https://h/x?ids=1,2&page=2")
        );
    }

    #[test]
    fn garbage_yields_none() {
        assert_eq!(next_link(""), None);
        assert_eq!(next_link("rel=next"), None);
        assert_eq!(next_link(r#"<>; rel="next""#), None);
    }
}
