/// Fixed table of survey areas: short key prefix to display name.
///
/// Question keys look like `comercial_1` or `rrhh_mejoras`; the text before
/// the first underscore names the area. Iteration order of this table is the
/// tie-breaking order for the dashboard insights, so entries must not be
/// reordered casually.
pub const AREA_LABELS: [(&str, &str); 8] = [
    ("comercial", "Comercial"),
    ("marketing", "Marketing"),
    ("finanzas", "Finanzas / Contabilidad"),
    ("logistica", "Logística"),
    ("compras", "Compras"),
    ("rrhh", "Recursos Humanos"),
    ("sistemas", "Sistemas / IT"),
    ("otros", "Otros"),
];

/// Bucket for comments that carry no recognizable area.
pub const DEFAULT_AREA: &str = "otros";

pub fn area_label(key: &str) -> Option<&'static str> {
    AREA_LABELS
        .iter()
        .find(|(area, _)| *area == key)
        .map(|(_, label)| *label)
}

pub fn is_known_area(key: &str) -> bool {
    area_label(key).is_some()
}

/// Area prefix of a question key: the text before the first underscore, or
/// the whole key when there is none.
pub fn area_of(question_key: &str) -> &str {
    question_key
        .split_once('_')
        .map(|(prefix, _)| prefix)
        .unwrap_or(question_key)
}

/// Areas that get their own rated section on the survey form. `otros` only
/// collects free-text fallback, it is not a department anyone rates.
pub fn rated_areas() -> impl Iterator<Item = (&'static str, &'static str)> {
    AREA_LABELS
        .iter()
        .copied()
        .filter(|(key, _)| *key != DEFAULT_AREA)
}
