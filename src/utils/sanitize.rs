use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_ALNUM_RUN: Regex = Regex::new(r"[^A-Za-z0-9]+").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Collapse every run of non-alphanumeric characters to `_` and strip the edges.
pub fn sanitize_simple(raw: &str) -> String {
    NON_ALNUM_RUN
        .replace_all(raw, "_")
        .trim_matches('_')
        .to_string()
}

/// Normalize a material description for use in a filename.
///
/// A trailing `;` on the raw value is a flag and survives: it is removed
/// together with every other `;` and `:-`, then re-appended once.
pub fn sanitize_material(raw: &str) -> String {
    let flagged = raw.trim_end().ends_with(';');

    let stripped = raw.replace(';', "").replace(":-", "");
    let mut cleaned = WHITESPACE_RUN
        .replace_all(stripped.trim(), "_")
        .into_owned();

    if flagged {
        cleaned.push(';');
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_collapses_punctuation_runs() {
        assert_eq!(sanitize_simple("TIPPER (10 Wheel)"), "TIPPER_10_Wheel");
        assert_eq!(sanitize_simple("  --Gross--  "), "Gross");
        assert_eq!(sanitize_simple("12.5"), "12_5");
        assert_eq!(sanitize_simple("***"), "");
        assert_eq!(sanitize_simple(""), "");
    }

    #[test]
    fn test_simple_is_idempotent() {
        for raw in ["TIPPER (10 Wheel)", "a__b", "_x_", "Dumper,20mm down", "ÄÖÜ 1"] {
            let once = sanitize_simple(raw);
            assert_eq!(sanitize_simple(&once), once, "input {:?}", raw);
        }
    }

    #[test]
    fn test_material_keeps_trailing_semicolon() {
        assert_eq!(sanitize_material("SIZE :- 20 MM ;"), "SIZE_20_MM;");
        assert_eq!(sanitize_material("DUST;  "), "DUST;");
    }

    #[test]
    fn test_material_never_gains_semicolon() {
        assert_eq!(sanitize_material("SIZE :- 20 MM"), "SIZE_20_MM");
        assert_eq!(sanitize_material("A;B"), "AB");
        assert!(!sanitize_material("5MM; DOWN DUST").ends_with(';'));
    }

    #[test]
    fn test_material_collapses_whitespace() {
        assert_eq!(sanitize_material("  75 \t MM\nDOWN "), "75_MM_DOWN");
        assert_eq!(sanitize_material(""), "");
        assert_eq!(sanitize_material(" ; "), ";");
    }

    #[test]
    fn test_material_removes_colon_dash_in_one_pass() {
        // removal is a single pass, so ":-" can reassemble from its neighbours
        assert_eq!(sanitize_material("::--"), ":-");
        assert_eq!(sanitize_material(":-"), "");
        assert_eq!(sanitize_material("5MM :- : - DUST"), "5MM_:_-_DUST");
    }

    #[test]
    fn test_material_is_idempotent_on_recorded_values() {
        for raw in ["SIZE :- 20 MM ;", "EMPTY", "5MM DOWN DUST ;", "  x  y  "] {
            let once = sanitize_material(raw);
            assert_eq!(sanitize_material(&once), once, "input {:?}", raw);
        }
    }
}
