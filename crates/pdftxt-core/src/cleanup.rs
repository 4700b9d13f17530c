use once_cell::sync::Lazy;
use regex::Regex;

/// Expand common typographic ligatures found in PDFs.
pub fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}

/// Convert CRLF and lone CR line endings to LF.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Hook for word-spacing correction of CJK text.
///
/// Currently the identity: no spacing model ships with the crate.
pub fn correct_spacing(text: &str) -> String {
    text.to_string()
}

/// Clean raw Tesseract output for one page.
///
/// Lines are trimmed; empty lines, single characters, and lines made only of
/// spaces, dots, underscores and dashes are dropped. Common misreads are
/// corrected: `|` becomes `I` and full-width digits become ASCII.
pub fn clean_ocr_page(text: &str) -> Vec<String> {
    text.trim()
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > 1 && !is_rule_line(line))
        .map(fix_ocr_misreads)
        .collect()
}

fn is_rule_line(line: &str) -> bool {
    line.chars().all(|c| matches!(c, ' ' | '.' | '_' | '-'))
}

fn fix_ocr_misreads(line: &str) -> String {
    line.chars()
        .map(|c| match c {
            '|' => 'I',
            '\u{FF10}'..='\u{FF19}' => {
                char::from_u32(c as u32 - 0xFF10 + '0' as u32).unwrap_or(c)
            }
            other => other,
        })
        .collect()
}

/// Collapse runs of three or more newlines into a single blank line.
pub fn collapse_blank_lines(text: &str) -> String {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").unwrap());
    RE.replace_all(text, "\n\n").into_owned()
}

/// Positioned run of text on a page, as reported by a layout-aware backend.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x0: f32,
    pub x1: f32,
    /// Baseline (or vertical centre) of the run, in page units, growing downwards.
    pub y: f32,
    pub text: String,
}

/// Rebuild reading-order rows from positioned runs.
///
/// Runs whose baselines lie within `tolerance` of the first run in a row are
/// placed on the same line, sorted left to right and joined with single
/// spaces. This keeps table cells that share a row together.
pub fn assemble_rows(mut runs: Vec<TextRun>, tolerance: f32) -> Vec<String> {
    runs.retain(|r| !r.text.trim().is_empty());
    runs.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x0.total_cmp(&b.x0)));

    let mut rows: Vec<(f32, Vec<TextRun>)> = Vec::new();
    for run in runs {
        match rows.last_mut() {
            Some((anchor, row)) if (run.y - *anchor).abs() <= tolerance => row.push(run),
            _ => rows.push((run.y, vec![run])),
        }
    }

    rows.into_iter()
        .map(|(_, mut row)| {
            row.sort_by(|a, b| a.x0.total_cmp(&b.x0));
            row.iter()
                .map(|r| r.text.trim())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ligatures_expand() {
        assert_eq!(expand_ligatures("\u{FB01}nal \u{FB02}ow"), "final flow");
    }

    #[test]
    fn newlines_normalize() {
        assert_eq!(normalize_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn ocr_cleanup_drops_noise_lines() {
        let raw = "  Hello world  \n\n x \n-----\n. . _ _\nSecond line\n";
        assert_eq!(clean_ocr_page(raw), vec!["Hello world", "Second line"]);
    }

    #[test]
    fn ocr_cleanup_fixes_misreads() {
        let raw = "|nvoice ０１２３４５６７８９";
        assert_eq!(clean_ocr_page(raw), vec!["Invoice 0123456789"]);
    }

    #[test]
    fn ocr_cleanup_keeps_korean() {
        assert_eq!(clean_ocr_page("안녕하세요\n가"), vec!["안녕하세요"]);
    }

    #[test]
    fn blank_runs_collapse() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb\n \n\t\nc"), "a\n\nb\n\nc");
    }

    fn run(x0: f32, y: f32, text: &str) -> TextRun {
        TextRun {
            x0,
            x1: x0 + 10.0,
            y,
            text: text.to_string(),
        }
    }

    #[test]
    fn rows_group_cells_on_a_baseline() {
        let runs = vec![
            run(200.0, 100.4, "42"),
            run(50.0, 100.0, "Apples"),
            run(50.0, 120.0, "Pears"),
            run(200.0, 119.0, "7"),
            run(50.0, 80.0, "Item Qty"),
        ];
        assert_eq!(
            assemble_rows(runs, 2.0),
            vec!["Item Qty", "Apples 42", "Pears 7"]
        );
    }

    #[test]
    fn whitespace_runs_are_ignored() {
        let runs = vec![run(0.0, 0.0, "  "), run(10.0, 0.0, "x")];
        assert_eq!(assemble_rows(runs, 1.0), vec!["x"]);
    }
}
