//! Path helpers shared by the backends.

/// Parent directory of `path`, POSIX `dirname` style.
///
/// Trailing slashes are ignored and slash runs collapse at the split
/// point. The parent of a bare name is `.`, and the parent of the root
/// or of anything directly under it is `/`.
pub fn parent_of(path: &str) -> &str {
    if path.is_empty() {
        return "/";
    }
    let bytes = path.as_bytes();
    let mut end = bytes.len() - 1;
    while end > 0 && bytes[end] == b'/' {
        end -= 1;
    }
    while end > 0 && bytes[end] != b'/' {
        end -= 1;
    }
    if end == 0 {
        return if bytes[0] == b'/' { "/" } else { "." };
    }
    end -= 1;
    while end > 0 && bytes[end] == b'/' {
        end -= 1;
    }
    &path[..=end]
}

/// Join `name` onto `dir` with exactly one separating slash.
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_of_plain_paths() {
        assert_eq!(parent_of("/a/b"), "/a");
        assert_eq!(parent_of("a/b"), "a");
        assert_eq!(parent_of("/a"), "/");
        assert_eq!(parent_of("a"), ".");
    }

    #[test]
    fn test_parent_of_slash_runs() {
        assert_eq!(parent_of("/a//b"), "/a");
        assert_eq!(parent_of("a/b/"), "a");
        assert_eq!(parent_of("a//"), ".");
        assert_eq!(parent_of("///"), "/");
    }

    #[test]
    fn test_parent_of_degenerate() {
        assert_eq!(parent_of(""), "/");
        assert_eq!(parent_of("/"), "/");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/a", "b"), "/a/b");
        assert_eq!(join("/a/", "b"), "/a/b");
        assert_eq!(join("", "b"), "b");
        assert_eq!(join(".", "b"), "./b");
    }
}
