// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

//! Canonical ordering for `proprietary-files.txt`-style manifests.
//!
//! A manifest is a list of paths grouped into sections separated by blank
//! lines. Sections keep their relative order, but the lines within each section
//! are sorted so that entries in a subdirectory are listed before the entries
//! of any parent directory.

use std::{borrow::Cow, cmp::Ordering, fmt};

/// Prefix that marks an entry as not being part of the build target.
pub const EXCLUDE_PREFIX: char = '-';

/// Return the directory portion of `entry`, including the trailing slash. An
/// entry without any slashes is treated as if it were a directory itself.
fn dir_prefix(entry: &str) -> Cow<'_, str> {
    match entry.rfind('/') {
        Some(i) => Cow::Borrowed(&entry[..=i]),
        None => Cow::Owned(format!("{entry}/")),
    }
}

/// Compare two manifest lines.
///
/// Lines are compared byte-wise, except that when one line's directory is an
/// ancestor of the other's, the line in the deeper directory sorts first. A
/// leading [`EXCLUDE_PREFIX`] is ignored.
///
/// This is not a total order for all inputs. Use [`sort_lines`] rather than
/// [`slice::sort_by`], which may panic when it detects an inconsistency.
pub fn compare(a: &str, b: &str) -> Ordering {
    if a.is_empty() || b.is_empty() {
        return a.cmp(b);
    }

    let a = a.strip_prefix(EXCLUDE_PREFIX).unwrap_or(a);
    let b = b.strip_prefix(EXCLUDE_PREFIX).unwrap_or(b);

    if !a.contains('/') && !b.contains('/') {
        return a.cmp(b);
    }

    let a_dir = dir_prefix(a);
    let b_dir = dir_prefix(b);

    if a_dir == b_dir {
        a.cmp(b)
    } else if a_dir.starts_with(b_dir.as_ref()) {
        Ordering::Less
    } else if b_dir.starts_with(a_dir.as_ref()) {
        Ordering::Greater
    } else {
        a.cmp(b)
    }
}

/// Find the length of the run at the start of `lines`. Strictly descending
/// runs are reversed in place so that the run is always ascending.
fn count_run(lines: &mut [&str]) -> usize {
    if lines.len() < 2 {
        return lines.len();
    }

    let mut n = 2;

    if compare(lines[1], lines[0]) == Ordering::Less {
        while n < lines.len() && compare(lines[n], lines[n - 1]) == Ordering::Less {
            n += 1;
        }
        lines[..n].reverse();
    } else {
        while n < lines.len() && compare(lines[n], lines[n - 1]) != Ordering::Less {
            n += 1;
        }
    }

    n
}

/// Stable sort of `lines` by [`compare`].
///
/// This is a binary insertion sort seeded with the natural run at the start of
/// the slice. Manifest sections are small, and unlike the standard library
/// sorts, this is guaranteed not to panic when the comparator is inconsistent.
pub fn sort_lines(lines: &mut [&str]) {
    let sorted = count_run(lines);

    for i in sorted.max(1)..lines.len() {
        let pivot = lines[i];
        let mut lo = 0;
        let mut hi = i;

        // Insert after any equal elements to keep the sort stable.
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if compare(pivot, lines[mid]) == Ordering::Less {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }

        lines[lo..=i].rotate_right(1);
    }
}

/// A blank-line-delimited block of manifest lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Section<'a> {
    pub lines: Vec<&'a str>,
}

impl Section<'_> {
    pub fn sort(&mut self) {
        sort_lines(&mut self.lines);
    }
}

/// A parsed manifest. Lines borrow from the original text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest<'a> {
    pub sections: Vec<Section<'a>>,
}

impl<'a> Manifest<'a> {
    /// Split `data` into sections. Only truly empty lines separate sections
    /// and any run of them acts as a single separator. Leading and trailing
    /// whitespace is removed from every line. Lines that contain nothing but
    /// whitespace stay part of their section and are dropped.
    pub fn parse(data: &'a str) -> Self {
        let mut sections = vec![];
        let mut current = Section::default();

        for raw_line in data.lines() {
            if raw_line.is_empty() {
                if !current.lines.is_empty() {
                    sections.push(std::mem::take(&mut current));
                }
                continue;
            }

            let line = raw_line.trim();
            if !line.is_empty() {
                current.lines.push(line);
            }
        }

        if !current.lines.is_empty() {
            sections.push(current);
        }

        Self { sections }
    }

    /// Sort each section independently. The order of the sections themselves
    /// is left untouched.
    pub fn sort(&mut self) {
        for section in &mut self.sections {
            section.sort();
        }
    }

    pub fn num_lines(&self) -> usize {
        self.sections.iter().map(|s| s.lines.len()).sum()
    }
}

/// Renders the manifest with a single blank line between sections and exactly
/// one trailing newline.
impl fmt::Display for Manifest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }

            for line in &section.lines {
                writeln!(f, "{line}")?;
            }
        }

        if self.sections.is_empty() {
            f.write_str("\n")?;
        }

        Ok(())
    }
}

/// Parse, sort, and re-render a manifest.
pub fn reorder(data: &str) -> String {
    let mut manifest = Manifest::parse(data);
    manifest.sort();
    manifest.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_without_directories() {
        assert_eq!(compare("libb.so", "liba.so"), Ordering::Greater);
        assert_eq!(compare("liba.so", "libb.so"), Ordering::Less);
        assert_eq!(compare("liba.so", "liba.so"), Ordering::Equal);
        // Byte order, not case-insensitive order.
        assert_eq!(compare("Z", "a"), Ordering::Less);
    }

    #[test]
    fn compare_empty() {
        assert_eq!(compare("", "vendor/a"), Ordering::Less);
        assert_eq!(compare("vendor/a", ""), Ordering::Greater);
        assert_eq!(compare("", ""), Ordering::Equal);
        // The empty check happens before the exclusion marker is stripped.
        assert_eq!(compare("", "-"), Ordering::Less);
    }

    #[test]
    fn compare_subdirectory_first() {
        assert_eq!(
            compare("vendor/foo/bar/b.so", "vendor/foo/a.so"),
            Ordering::Less,
        );
        assert_eq!(
            compare("vendor/foo/a.so", "vendor/foo/bar/b.so"),
            Ordering::Greater,
        );
        assert_eq!(
            compare("vendor/lib64/hw/a.so", "vendor/lib64/z.so"),
            Ordering::Less,
        );
    }

    #[test]
    fn compare_same_directory() {
        assert_eq!(compare("vendor/foo/b.so", "vendor/foo/a.so"), Ordering::Greater);
        assert_eq!(compare("vendor/foo/a.so", "vendor/foo/b.so"), Ordering::Less);
    }

    #[test]
    fn compare_unrelated_directories() {
        assert_eq!(compare("vendor/bin/x", "vendor/etc/y"), Ordering::Less);
        assert_eq!(compare("system/lib/x", "odm/lib/y"), Ordering::Greater);
        // `vendor/lib64/` does not start with `vendor/lib/`.
        assert_eq!(compare("vendor/lib64/a.so", "vendor/lib/a.so"), Ordering::Greater);
    }

    #[test]
    fn compare_ignores_exclude_prefix() {
        assert_eq!(compare("-vendor/a/x", "vendor/a/y"), Ordering::Less);
        assert_eq!(compare("vendor/a/x", "-vendor/a/y"), Ordering::Less);
        assert_eq!(compare("-vendor/a/b/x", "vendor/a/y"), Ordering::Less);
        assert_eq!(compare("-foo", "foo"), Ordering::Equal);
    }

    #[test]
    fn compare_entry_without_slash_against_its_directory() {
        // `vendor` is treated as the directory `vendor/`.
        assert_eq!(compare("vendor", "vendor/a"), Ordering::Less);
        assert_eq!(compare("vendor", "vendor/a/b"), Ordering::Greater);
    }

    #[test]
    fn sort_subdirectories_first() {
        let mut lines = vec![
            "vendor/lib/libc.so",
            "vendor/lib/hw/b.so",
            "vendor/lib/liba.so",
            "vendor/lib/hw/a.so",
            "vendor/bin/tool",
        ];
        sort_lines(&mut lines);

        assert_eq!(
            lines,
            [
                "vendor/bin/tool",
                "vendor/lib/hw/a.so",
                "vendor/lib/hw/b.so",
                "vendor/lib/liba.so",
                "vendor/lib/libc.so",
            ],
        );
    }

    #[test]
    fn sort_is_stable() {
        let mut lines = vec!["-foo", "bar", "foo"];
        sort_lines(&mut lines);
        assert_eq!(lines, ["bar", "-foo", "foo"]);

        let mut lines = vec!["foo", "bar", "-foo"];
        sort_lines(&mut lines);
        assert_eq!(lines, ["bar", "foo", "-foo"]);
    }

    #[test]
    fn sort_descending_input() {
        let mut lines = vec!["e", "d", "c", "b", "a"];
        sort_lines(&mut lines);
        assert_eq!(lines, ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn sort_inconsistent_order_does_not_panic() {
        // a < a- < a// < a
        let mut lines = vec!["a//", "a-", "a", "a//", "a-", "a", "b/c/d", "b"];
        sort_lines(&mut lines);

        let mut expected = vec!["a//", "a-", "a", "a//", "a-", "a", "b/c/d", "b"];
        expected.sort_unstable();
        let mut actual = lines.clone();
        actual.sort_unstable();
        assert_eq!(actual, expected);
    }

    #[test]
    fn parse_sections() {
        let manifest = Manifest::parse("  b \na\n\n\n\nd\r\nc\n\r\ne\n");

        assert_eq!(
            manifest.sections,
            [
                Section {
                    lines: vec!["b", "a"]
                },
                Section {
                    lines: vec!["d", "c"]
                },
                Section { lines: vec!["e"] },
            ],
        );
        assert_eq!(manifest.num_lines(), 5);
    }

    #[test]
    fn whitespace_only_line_does_not_split_section() {
        let manifest = Manifest::parse("x\n\nb\n  \na\n\t\n");

        assert_eq!(
            manifest.sections,
            [
                Section { lines: vec!["x"] },
                Section {
                    lines: vec!["b", "a"]
                },
            ],
        );
        assert_eq!(reorder("x\n\nb\n  \na\n"), "x\n\na\nb\n");
    }

    #[test]
    fn reorder_sections_independently() {
        let data = "# Audio\nvendor/lib/b.so\nvendor/lib/a.so\n\n\
            # Camera\nvendor/lib/hw/camera.so\n-vendor/app/Cam/Cam.apk\nvendor/lib/libcam.so   \n";

        assert_eq!(
            reorder(data),
            "# Audio\nvendor/lib/a.so\nvendor/lib/b.so\n\n\
            # Camera\n-vendor/app/Cam/Cam.apk\nvendor/lib/hw/camera.so\nvendor/lib/libcam.so\n",
        );
    }

    #[test]
    fn reorder_normalizes_separators() {
        assert_eq!(reorder("\n\nb\na\n\n\n\nc"), "a\nb\n\nc\n");
        assert_eq!(reorder(""), "\n");
        assert_eq!(reorder(" \n\n"), "\n");
        assert_eq!(reorder(" \n\t\nb\n"), "b\n");
    }

    #[test]
    fn reorder_is_idempotent() {
        let data = "vendor/foo/a.so\nvendor/foo/bar/b.so\n-vendor/a/y\nvendor/a/x\n\n\
            z\ny\nvendor/etc/c.xml\n";

        let first = reorder(data);
        let second = reorder(&first);
        assert_eq!(first, second);
    }

    #[test]
    fn reorder_preserves_lines() {
        let data = "c/d/e\nb\n-a/b\na\n\nx/y\nx\n";
        let result = reorder(data);

        let mut before = data.lines().filter(|l| !l.is_empty()).collect::<Vec<_>>();
        let mut after = result.lines().filter(|l| !l.is_empty()).collect::<Vec<_>>();
        before.sort_unstable();
        after.sort_unstable();

        assert_eq!(before, after);
    }
}
