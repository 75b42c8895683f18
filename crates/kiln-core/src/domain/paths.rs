//! URL-like path joining.

/// Join parts with exactly one `/` between them.
///
/// Absent parts are skipped. Once the buffer is non-empty, a part starting
/// with `/` loses that separator when the buffer already ends with one, and a
/// `/` is inserted when neither side has one. Empty parts still take part in
/// the separator logic.
///
/// ```
/// use kiln_core::domain::paths::join;
///
/// assert_eq!(join(["https://host/", "/path"]), "https://host/path");
/// assert_eq!(join([Some("a"), None, Some("b")]), "a/b");
/// ```
pub fn join<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: Into<Option<&'static str>>,
{
    join_parts(parts.into_iter().map(Into::into))
}

/// Borrowing variant of [`join`] for parts that are not `'static`.
pub fn join_parts<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut buffer = String::new();
    for part in parts.into_iter().flatten() {
        let mut part = part;
        if !buffer.is_empty() {
            let buffer_ends = buffer.ends_with('/');
            let part_starts = part.starts_with('/');
            if buffer_ends {
                if part_starts {
                    part = &part[1..];
                }
            } else if !part_starts {
                buffer.push('/');
            }
        }
        buffer.push_str(part);
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_empty() {
        assert_eq!(join(Vec::<&'static str>::new()), "");
    }

    #[test]
    fn collapses_duplicate_separators() {
        assert_eq!(join(["/a/", "/b"]), "/a/b");
        assert_eq!(join(["https://host/", "/path"]), "https://host/path");
        assert_eq!(join(["a", "b", "c"]), "a/b/c");
    }

    #[test]
    fn empty_parts_still_separate() {
        assert_eq!(join(["a", "", "b"]), "a/b");
        assert_eq!(join(["", "x"]), "x");
    }

    #[test]
    fn absent_parts_are_skipped() {
        assert_eq!(join([None, Some("x")]), "x");

        let owned = String::from("dynamic");
        assert_eq!(join_parts([Some("base"), Some(owned.as_str())]), "base/dynamic");
    }
}
