use crate::areas::{area_of, AREA_LABELS};
use crate::models::{
    AreaAverage, AreaScore, DashboardView, Insights, QuestionStat, StatsResponse,
};
use std::collections::BTreeMap;

/// The survey answer scale. Value 1 is worst, 4 is best; 1 and 2 count as
/// critical, 3 and 4 as positive.
pub const SCALE: [u8; 4] = [1, 2, 3, 4];

/// Derive everything the dashboard shows from one backend stats payload.
/// The view is rebuilt from scratch on every call; nothing is carried over
/// from a previous refresh.
pub fn build_dashboard(stats: &StatsResponse) -> DashboardView {
    let distribution = distribution(&stats.global.per_value);
    let (critical_pct, positive_pct) = answer_percentages(&distribution);
    let areas = area_averages(&stats.stats);
    let insights = build_insights(&areas);

    DashboardView {
        total_responses: stats.total_responses,
        global_avg: stats.global.avg,
        latest: stats.timeline.last().cloned(),
        distribution,
        critical_pct,
        positive_pct,
        satisfaction_index: satisfaction_index(stats.global.avg),
        areas,
        insights,
        timeline: stats.timeline.clone(),
    }
}

/// Fixed-order counts for values 1..=4, missing values as 0.
pub fn distribution(per_value: &BTreeMap<String, u64>) -> [u64; 4] {
    let mut counts = [0u64; 4];
    for (slot, value) in counts.iter_mut().zip(SCALE) {
        *slot = per_value.get(&value.to_string()).copied().unwrap_or(0);
    }
    counts
}

/// (critical, positive) shares of all answered values, as percentages.
/// `None` when nothing was answered.
pub fn answer_percentages(distribution: &[u64; 4]) -> (Option<f64>, Option<f64>) {
    let total: u64 = distribution.iter().sum();
    if total == 0 {
        return (None, None);
    }
    let critical = (distribution[0] + distribution[1]) as f64 / total as f64 * 100.0;
    let positive = (distribution[2] + distribution[3]) as f64 / total as f64 * 100.0;
    (Some(critical), Some(positive))
}

/// Global average rescaled from the 1..=4 scale to 0..=100.
pub fn satisfaction_index(avg: Option<f64>) -> Option<f64> {
    avg.map(|avg| avg / 4.0 * 100.0)
}

/// Fold per-question aggregates into per-area averages, one row per known
/// area in table order. Question keys with an unrecognized prefix contribute
/// nothing, as do entries with a zero count.
pub fn area_averages(questions: &BTreeMap<String, QuestionStat>) -> Vec<AreaAverage> {
    let mut folded: BTreeMap<&str, (f64, u64)> = BTreeMap::new();
    for (question_key, stat) in questions {
        if stat.count == 0 {
            continue;
        }
        let area = area_of(question_key);
        if !crate::areas::is_known_area(area) {
            continue;
        }
        let entry = folded.entry(area).or_insert((0.0, 0));
        entry.0 += stat.sum;
        entry.1 += stat.count;
    }

    AREA_LABELS
        .iter()
        .map(|(key, label)| {
            let (sum, count) = folded.get(key).copied().unwrap_or((0.0, 0));
            AreaAverage {
                key: (*key).to_string(),
                label: (*label).to_string(),
                answers: count,
                average: (count > 0).then(|| sum / count as f64),
            }
        })
        .collect()
}

/// Best average, worst average and most-answered area by linear scan over
/// the table-ordered rows. Strict comparisons, so ties keep the earlier
/// area. `None` when no area has any answers.
pub fn build_insights(areas: &[AreaAverage]) -> Option<Insights> {
    let mut best: Option<(&AreaAverage, f64)> = None;
    let mut worst: Option<(&AreaAverage, f64)> = None;
    let mut most_active: Option<&AreaAverage> = None;

    for area in areas {
        let Some(avg) = area.average else { continue };
        if best.is_none_or(|(_, top)| avg > top) {
            best = Some((area, avg));
        }
        if worst.is_none_or(|(_, bottom)| avg < bottom) {
            worst = Some((area, avg));
        }
        if most_active.is_none_or(|leader| area.answers > leader.answers) {
            most_active = Some(area);
        }
    }

    match (best, worst, most_active) {
        (Some((best, best_avg)), Some((worst, worst_avg)), Some(most_active)) => Some(Insights {
            best: score(best, best_avg),
            worst: score(worst, worst_avg),
            most_active: score(most_active, most_active.answers as f64),
        }),
        _ => None,
    }
}

fn score(area: &AreaAverage, value: f64) -> AreaScore {
    AreaScore {
        key: area.key.clone(),
        label: area.label.clone(),
        value,
    }
}
