//! Hierarchical path joining.
//!
//! # Design Decisions
//! - Lexical only: no filesystem or URL decoding involved
//! - Empty and `.` segments are dropped, `..` pops the previous segment
//! - A rooted base stays rooted; `..` never climbs above the root
//! - Trailing separators are removed (`/api/` → `/api`)

/// Join a base path and a sub path, then clean the result.
///
/// ```
/// use chain_router::routing::path::join;
///
/// assert_eq!(join("/api", "test"), "/api/test");
/// assert_eq!(join("/", "/users/"), "/users");
/// assert_eq!(join("/a//b", "./c"), "/a/b/c");
/// ```
pub fn join(base: &str, sub: &str) -> String {
    if sub.is_empty() {
        return clean(base);
    }
    if base.is_empty() {
        return clean(sub);
    }
    clean(&format!("{base}/{sub}"))
}

/// Collapse duplicate separators and resolve `.`/`..` segments.
pub fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            s => segments.push(s),
        }
    }

    let joined = segments.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
