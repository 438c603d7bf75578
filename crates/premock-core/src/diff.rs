//! Diff rendering for argument mismatches.

/// Render a diff block between expected and actual argument renderings.
///
/// Unequal values can share a rendering, for instance when neither side has
/// a textual form, so the identical case is reported explicitly instead of
/// printing an empty diff.
#[must_use]
pub fn render_diff(expected: &str, actual: &str) -> String {
    if expected == actual {
        return format!("[renderings identical, values differ] {expected}");
    }

    let mut out = String::new();
    out.push_str("--- expected\n");
    out.push_str("+++ actual\n");
    let expected_lines: Vec<&str> = expected.lines().collect();
    let actual_lines: Vec<&str> = actual.lines().collect();
    let rows = expected_lines.len().max(actual_lines.len());
    for i in 0..rows {
        let e = expected_lines.get(i).copied().unwrap_or_default();
        let a = actual_lines.get(i).copied().unwrap_or_default();
        if e != a {
            if rows > 1 {
                out.push_str(&format!("@@ line {} @@\n", i + 1));
            }
            out.push_str(&format!("-{e}\n"));
            out.push_str(&format!("+{a}\n"));
        }
    }
    out.truncate(out.trim_end().len());
    out
}
