use crate::areas::{area_label, AREA_LABELS, DEFAULT_AREA};
use crate::models::{AreaCount, Comment, CommentCard, CommentsView};
use chrono::{NaiveDate, NaiveDateTime};

/// At most this many cards are rendered; the chip summary still counts the
/// whole filtered set.
pub const MAX_RENDERED: usize = 40;

/// Active comment filters. Both compose with logical AND; filtering is a
/// pure scan over the retained list and never touches the network.
#[derive(Debug, Clone, Default)]
pub struct CommentFilter {
    /// `None` means every area (the "all" sentinel of the filter control).
    pub area: Option<String>,
    pub search: String,
}

impl CommentFilter {
    pub fn new(area: Option<String>, search: Option<String>) -> Self {
        let area = area.filter(|a| !a.is_empty() && a != "all");
        Self {
            area,
            search: search.unwrap_or_default(),
        }
    }

    fn matches(&self, comment: &Comment) -> bool {
        if let Some(wanted) = &self.area {
            if effective_area(comment) != wanted {
                return false;
            }
        }
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        comment.text.to_lowercase().contains(&needle)
            || comment.field.to_lowercase().contains(&needle)
    }
}

/// Area a comment files under: its `area_key`, or the fallback bucket when
/// the backend sent none.
pub fn effective_area(comment: &Comment) -> &str {
    comment
        .area_key
        .as_deref()
        .filter(|key| !key.is_empty())
        .unwrap_or(DEFAULT_AREA)
}

/// Apply the filter and shape the result for rendering.
pub fn build_comments_view(all: &[Comment], filter: &CommentFilter) -> CommentsView {
    let filtered: Vec<&Comment> = all.iter().filter(|c| filter.matches(c)).collect();

    let areas = area_counts(&filtered);
    let comments: Vec<CommentCard> = filtered
        .iter()
        .take(MAX_RENDERED)
        .map(|comment| to_card(comment))
        .collect();

    CommentsView {
        total: filtered.len(),
        shown: comments.len(),
        areas,
        comments,
    }
}

/// Per-area counts over the full filtered set, table order first, then any
/// unrecognized keys in first-seen order.
fn area_counts(filtered: &[&Comment]) -> Vec<AreaCount> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for comment in filtered {
        let key = effective_area(comment);
        match counts.iter_mut().find(|(k, _)| k == key) {
            Some((_, n)) => *n += 1,
            None => counts.push((key.to_string(), 1)),
        }
    }

    let mut out = Vec::new();
    for (key, label) in AREA_LABELS {
        if let Some((_, n)) = counts.iter().find(|(k, _)| k == key) {
            out.push(AreaCount {
                key: key.to_string(),
                label: label.to_string(),
                count: *n,
            });
        }
    }
    for (key, n) in counts {
        if crate::areas::is_known_area(&key) {
            continue;
        }
        out.push(AreaCount {
            label: key.clone(),
            key,
            count: n,
        });
    }
    out
}

fn to_card(comment: &Comment) -> CommentCard {
    let area_key = effective_area(comment).to_string();
    let area_label = area_label(&area_key)
        .map(str::to_string)
        .unwrap_or_else(|| area_key.clone());
    CommentCard {
        area_key,
        area_label,
        text: comment.text.clone(),
        field: comment.field.clone(),
        registered: registered_label(comment.created_at.as_deref()),
    }
}

/// "Registrado el dd/mm/YYYY" for a parseable timestamp, otherwise the fixed
/// fallback. The backend stores naive ISO-8601 datetimes; bare dates are
/// accepted too.
pub fn registered_label(created_at: Option<&str>) -> String {
    match created_at.and_then(parse_date) {
        Some(date) => format!("Registrado el {}", date.format("%d/%m/%Y")),
        None => "fecha no disponible".to_string(),
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(datetime.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
