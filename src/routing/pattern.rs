use indexmap::IndexMap;

/// Canonical form of a client-side path.
///
/// Drops any query string or fragment, collapses empty segments, guarantees a
/// leading slash and removes the trailing one (`/students/` becomes `/students`).
pub fn normalize_path(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let segments: Vec<&str> = path[..end].split('/').filter(|s| !s.is_empty()).collect();

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Match a normalized `path` against a pattern such as `/students/:id/edit`.
///
/// Returns the captured `:name` segments in pattern order, or `None` when the
/// segment counts differ or a literal segment does not match.
pub fn match_pattern(pattern: &str, path: &str) -> Option<IndexMap<String, String>> {
    let pattern_segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = IndexMap::new();
    for (expected, actual) in pattern_segments.iter().zip(&path_segments) {
        match expected.strip_prefix(':') {
            Some(name) => {
                params.insert(name.to_string(), (*actual).to_string());
            }
            None if expected == actual => {}
            None => return None,
        }
    }

    Some(params)
}
