use crate::areas::{rated_areas, AREA_LABELS};
use crate::comments::{build_comments_view, CommentFilter};
use crate::models::{CommentsView, DashboardView};
use crate::state::DashboardData;

const CHART_W: f64 = 600.0;
const CHART_H: f64 = 260.0;
const PAD_X: f64 = 44.0;
const PAD_Y: f64 = 34.0;
const TOP: f64 = 24.0;
const TICKS: u32 = 4;

const QUESTION_PROMPTS: [&str; 3] = [
    "Comunicación y coordinación con tu equipo",
    "Calidad y rapidez de la respuesta",
    "Disponibilidad y trato del personal",
];

/// Survey form page. `outcome` is `None` on a fresh visit, `Some(true)` after
/// a stored submission (form marked submitted, thanks banner) and
/// `Some(false)` after a failed one (error banner, form untouched).
pub fn render_form(outcome: Option<bool>) -> String {
    let mut sections = String::new();
    for (key, label) in rated_areas() {
        let mut questions = String::new();
        for (index, prompt) in QUESTION_PROMPTS.iter().enumerate() {
            let name = format!("{key}_{}", index + 1);
            let mut scale = String::new();
            for value in 1..=4 {
                scale.push_str(&format!(
                    "<label><input type=\"radio\" name=\"{name}\" value=\"{value}\" required /> {value}</label>\n",
                ));
            }
            questions.push_str(&format!(
                "<div class=\"question\"><span class=\"prompt\">{prompt}</span><div class=\"scale\">\n{scale}</div></div>\n",
            ));
        }
        sections.push_str(&format!(
            concat!(
                "<section class=\"card\">\n<h2>{label}</h2>\n{questions}",
                "<label class=\"open-label\" for=\"{key}_mejoras\">¿Qué podría mejorar {label}?</label>\n",
                "<textarea id=\"{key}_mejoras\" name=\"{key}_mejoras\" rows=\"2\"></textarea>\n</section>\n",
            ),
            label = label,
            questions = questions,
            key = key,
        ));
    }

    let (banner, form_class) = match outcome {
        None => (String::new(), ""),
        Some(true) => (
            "<div class=\"banner\" id=\"encuesta-success\">¡Gracias por completar la evaluación! Tus respuestas han sido registradas.</div>".to_string(),
            "is-submitted",
        ),
        Some(false) => (
            "<div class=\"banner banner-error\" id=\"encuesta-success\">Hubo un error guardando tus respuestas. Intenta de nuevo en unos minutos.</div>".to_string(),
            "",
        ),
    };

    FORM_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{SECTIONS}}", &sections)
        .replace("{{FORM_CLASS}}", form_class)
        .replace("{{BANNER}}", &banner)
}

/// Dashboard page, rendered from the cached view-model. A failed stats
/// refresh only swaps the latest-response field for the fixed error message;
/// every other figure keeps its previous value.
pub fn render_dashboard(data: &DashboardData, filter: &CommentFilter) -> String {
    let view = data.view.as_ref();

    let total = view
        .map(|v| v.total_responses.to_string())
        .unwrap_or_else(|| "-".to_string());
    let global_avg = fmt_avg(view.and_then(|v| v.global_avg));
    let latest = if data.stats_failed {
        "Error cargando datos".to_string()
    } else {
        match view.and_then(|v| v.latest.as_ref()) {
            Some(point) => format!(
                "{} · {} {}",
                point.date,
                point.count,
                respuesta_word(point.count)
            ),
            None => "Sin respuestas aún".to_string(),
        }
    };

    let critical = fmt_pct(view.and_then(|v| v.critical_pct));
    let positive = fmt_pct(view.and_then(|v| v.positive_pct));
    let satisfaction = fmt_pct(view.and_then(|v| v.satisfaction_index));

    let (best, worst, most_active) = insight_lines(view);

    let dist_chart = match view {
        Some(v) => {
            let bars: Vec<(String, f64)> = crate::stats::SCALE
                .iter()
                .zip(v.distribution)
                .map(|(value, count)| (value.to_string(), count as f64))
                .collect();
            svg_bar_chart(&bars, 0.0)
        }
        None => svg_empty(),
    };
    let area_chart = match view {
        Some(v) => {
            let bars: Vec<(String, f64)> = v
                .areas
                .iter()
                .map(|a| (a.key.clone(), a.average.unwrap_or(0.0)))
                .collect();
            svg_bar_chart(&bars, 4.0)
        }
        None => svg_empty(),
    };
    let timeline_chart = match view {
        Some(v) => {
            let points: Vec<(String, f64)> = v
                .timeline
                .iter()
                .map(|p| (short_date(&p.date), p.count as f64))
                .collect();
            svg_line_chart(&points)
        }
        None => svg_empty(),
    };

    let (chips, comment_cards) = if data.comments_failed {
        (
            String::new(),
            "<p class=\"placeholder\">Error cargando comentarios</p>".to_string(),
        )
    } else {
        let comments = build_comments_view(&data.comments, filter);
        (render_chips(&comments), render_cards(&comments))
    };

    DASHBOARD_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{TOTAL}}", &total)
        .replace("{{GLOBAL_AVG}}", &global_avg)
        .replace("{{LATEST}}", &latest)
        .replace("{{CRITICAL}}", &critical)
        .replace("{{POSITIVE}}", &positive)
        .replace("{{SATISFACTION}}", &satisfaction)
        .replace("{{INSIGHT_BEST}}", &best)
        .replace("{{INSIGHT_WORST}}", &worst)
        .replace("{{INSIGHT_ACTIVE}}", &most_active)
        .replace("{{DIST_CHART}}", &dist_chart)
        .replace("{{AREA_CHART}}", &area_chart)
        .replace("{{TIMELINE_CHART}}", &timeline_chart)
        .replace("{{AREA_OPTIONS}}", &render_area_options(filter))
        .replace("{{SEARCH_VALUE}}", &escape_html(&filter.search))
        .replace("{{CHIPS}}", &chips)
        .replace("{{COMMENTS}}", &comment_cards)
}

fn insight_lines(view: Option<&DashboardView>) -> (String, String, String) {
    const NO_DATA: &str = "Aún no hay datos suficientes";
    match view.and_then(|v| v.insights.as_ref()) {
        Some(insights) => (
            format!(
                "{} · {:.2}",
                escape_html(&insights.best.label),
                insights.best.value
            ),
            format!(
                "{} · {:.2}",
                escape_html(&insights.worst.label),
                insights.worst.value
            ),
            format!(
                "{} · {} {}",
                escape_html(&insights.most_active.label),
                insights.most_active.value as u64,
                respuesta_word(insights.most_active.value as u64)
            ),
        ),
        None => (
            NO_DATA.to_string(),
            NO_DATA.to_string(),
            NO_DATA.to_string(),
        ),
    }
}

fn render_area_options(filter: &CommentFilter) -> String {
    let mut options = format!(
        "<option value=\"all\"{}>Todas las áreas</option>\n",
        if filter.area.is_none() { " selected" } else { "" }
    );
    for (key, label) in AREA_LABELS {
        let selected = if filter.area.as_deref() == Some(key) {
            " selected"
        } else {
            ""
        };
        options.push_str(&format!(
            "<option value=\"{key}\"{selected}>{label}</option>\n"
        ));
    }
    options
}

fn render_chips(comments: &CommentsView) -> String {
    comments
        .areas
        .iter()
        .map(|area| {
            format!(
                "<span class=\"chip\">{} · {}</span>\n",
                escape_html(&area.label),
                area.count
            )
        })
        .collect()
}

fn render_cards(comments: &CommentsView) -> String {
    if comments.comments.is_empty() {
        return "<p class=\"placeholder\">No hay comentarios para mostrar.</p>".to_string();
    }
    comments
        .comments
        .iter()
        .map(|card| {
            format!(
                concat!(
                    "<article class=\"comment\">\n",
                    "<header><span class=\"chip\">{area}</span><span class=\"when\">{when}</span></header>\n",
                    "<p>{text}</p>\n",
                    "<footer class=\"field\">{field}</footer>\n",
                    "</article>\n",
                ),
                area = escape_html(&card.area_label),
                when = escape_html(&card.registered),
                text = escape_html(&card.text),
                field = escape_html(&card.field),
            )
        })
        .collect()
}

fn respuesta_word(count: u64) -> &'static str {
    if count == 1 {
        "respuesta"
    } else {
        "respuestas"
    }
}

fn fmt_avg(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "-".to_string())
}

fn fmt_pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.1}%"))
        .unwrap_or_else(|| "-".to_string())
}

/// Month-day part of an ISO date, enough for a chart tick.
fn short_date(date: &str) -> String {
    date.get(5..).unwrap_or(date).to_string()
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

// ===== SVG charts =====
//
// Fixed 600x260 viewBox with four horizontal grid ticks; values scale from
// zero so bars and counts read against a common baseline.

fn svg_empty() -> String {
    wrap_svg(&format!(
        "<text class=\"chart-label\" x=\"{:.0}\" y=\"{:.0}\" text-anchor=\"middle\">Sin datos</text>",
        CHART_W / 2.0,
        CHART_H / 2.0
    ))
}

fn svg_bar_chart(bars: &[(String, f64)], suggested_max: f64) -> String {
    if bars.is_empty() {
        return svg_empty();
    }
    let max = bars
        .iter()
        .map(|(_, value)| *value)
        .fold(suggested_max, f64::max)
        .max(1.0);
    let slot = (CHART_W - PAD_X * 2.0) / bars.len() as f64;
    let bar_w = slot * 0.6;
    let y = |value: f64| CHART_H - PAD_Y - value * (CHART_H - TOP - PAD_Y) / max;

    let mut body = grid_lines(max, y);
    for (index, (label, value)) in bars.iter().enumerate() {
        let x = PAD_X + index as f64 * slot + (slot - bar_w) / 2.0;
        let top = y(*value);
        let height = CHART_H - PAD_Y - top;
        body.push_str(&format!(
            "<rect class=\"chart-bar\" x=\"{x:.2}\" y=\"{top:.2}\" width=\"{bar_w:.2}\" height=\"{height:.2}\" rx=\"3\" />"
        ));
        body.push_str(&format!(
            "<text class=\"chart-label\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\">{}</text>",
            x + bar_w / 2.0,
            CHART_H - PAD_Y + 18.0,
            escape_html(label)
        ));
    }
    wrap_svg(&body)
}

fn svg_line_chart(points: &[(String, f64)]) -> String {
    if points.is_empty() {
        return svg_empty();
    }
    let max = points.iter().map(|(_, value)| *value).fold(1.0, f64::max);
    let x_step = if points.len() > 1 {
        (CHART_W - PAD_X * 2.0) / (points.len() - 1) as f64
    } else {
        0.0
    };
    let x = |index: usize| PAD_X + index as f64 * x_step;
    let y = |value: f64| CHART_H - PAD_Y - value * (CHART_H - TOP - PAD_Y) / max;

    let mut body = grid_lines(max, y);

    let path: String = points
        .iter()
        .enumerate()
        .map(|(index, (_, value))| {
            format!(
                "{} {:.2} {:.2}",
                if index == 0 { "M" } else { "L" },
                x(index),
                y(*value)
            )
        })
        .collect::<Vec<_>>()
        .join(" ");
    body.push_str(&format!("<path class=\"chart-line\" d=\"{path}\" />"));

    for (index, (_, value)) in points.iter().enumerate() {
        body.push_str(&format!(
            "<circle class=\"chart-point\" cx=\"{:.2}\" cy=\"{:.2}\" r=\"4\" />",
            x(index),
            y(*value)
        ));
    }

    let label_every = points.len().div_ceil(8).max(1);
    for (index, (label, _)) in points.iter().enumerate() {
        if index % label_every != 0 {
            continue;
        }
        body.push_str(&format!(
            "<text class=\"chart-label\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\">{}</text>",
            x(index),
            CHART_H - PAD_Y + 18.0,
            escape_html(label)
        ));
    }
    wrap_svg(&body)
}

fn grid_lines(max: f64, y: impl Fn(f64) -> f64) -> String {
    let mut out = String::new();
    for tick in 0..=TICKS {
        let value = max * f64::from(tick) / f64::from(TICKS);
        let y_pos = y(value);
        out.push_str(&format!(
            "<line class=\"chart-grid\" x1=\"{:.2}\" y1=\"{y_pos:.2}\" x2=\"{:.2}\" y2=\"{y_pos:.2}\" />",
            PAD_X,
            CHART_W - PAD_X
        ));
        out.push_str(&format!(
            "<text class=\"chart-label\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\">{}</text>",
            PAD_X - 10.0,
            y_pos + 4.0,
            fmt_axis(value)
        ));
    }
    out
}

fn fmt_axis(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

fn wrap_svg(body: &str) -> String {
    format!(
        "<svg class=\"chart\" viewBox=\"0 0 {CHART_W:.0} {CHART_H:.0}\" role=\"img\">{body}</svg>"
    )
}

// ===== Page shells =====

const FORM_HTML: &str = r##"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Encuesta de satisfacción interna</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Encuesta de satisfacción interna</h1>
      <p class="subtitle">Valora de 1 (deficiente) a 4 (excelente) el trabajo de cada área durante el último trimestre.</p>
    </header>

    <form id="encuesta-form" class="{{FORM_CLASS}}" method="post" action="/encuesta">
      {{SECTIONS}}
      <section class="card">
        <h2>Otros comentarios</h2>
        <label class="open-label" for="otros_mejoras">¿Algo más que debamos saber?</label>
        <textarea id="otros_mejoras" name="otros_mejoras" rows="3"></textarea>
      </section>
      <button class="btn-send" type="submit">Enviar respuestas</button>
    </form>

    {{BANNER}}
    <p class="hint">Las respuestas son anónimas y se agregan por área en el panel de resultados.</p>
  </main>
</body>
</html>
"##;

const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <meta http-equiv="refresh" content="60" />
  <title>Resultados de la encuesta</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <header class="row">
      <div>
        <h1>Resultados de la encuesta</h1>
        <p class="subtitle">Panel agregado por área. Los datos se actualizan cada minuto.</p>
      </div>
      <form method="post" action="/dashboard/reload">
        <button id="reload-btn" class="btn-send" type="submit">Actualizar datos</button>
      </form>
    </header>

    <section class="panel">
      <div class="stat"><span class="label">Respuestas totales</span><span id="total-responses" class="value">{{TOTAL}}</span></div>
      <div class="stat"><span class="label">Promedio global</span><span id="global-average" class="value">{{GLOBAL_AVG}}</span></div>
      <div class="stat"><span class="label">Última respuesta</span><span id="latest-response-date" class="value small">{{LATEST}}</span></div>
    </section>

    <section class="panel">
      <div class="stat"><span class="label">Respuestas críticas (1-2)</span><span id="critical-pct" class="value">{{CRITICAL}}</span></div>
      <div class="stat"><span class="label">Respuestas positivas (3-4)</span><span id="positive-pct" class="value">{{POSITIVE}}</span></div>
      <div class="stat"><span class="label">Índice de satisfacción</span><span id="satisfaction-index" class="value">{{SATISFACTION}}</span></div>
    </section>

    <section class="panel">
      <div class="stat"><span class="label">Mejor área</span><span id="insight-best" class="value small">{{INSIGHT_BEST}}</span></div>
      <div class="stat"><span class="label">Área a reforzar</span><span id="insight-worst" class="value small">{{INSIGHT_WORST}}</span></div>
      <div class="stat"><span class="label">Área con más respuestas</span><span id="insight-active" class="value small">{{INSIGHT_ACTIVE}}</span></div>
    </section>

    <section class="chart-card">
      <h2>Distribución global de valores</h2>
      {{DIST_CHART}}
    </section>
    <section class="chart-card">
      <h2>Promedio por área</h2>
      {{AREA_CHART}}
    </section>
    <section class="chart-card">
      <h2>Respuestas por día</h2>
      {{TIMELINE_CHART}}
    </section>

    <section class="chart-card">
      <h2>Comentarios</h2>
      <form class="filters" method="get" action="/dashboard">
        <select id="comment-area-filter" name="area">
          {{AREA_OPTIONS}}
        </select>
        <input id="comment-search" type="search" name="q" value="{{SEARCH_VALUE}}" placeholder="Buscar en los comentarios" />
        <button type="submit">Filtrar</button>
      </form>
      <div class="chips" id="comment-summary">{{CHIPS}}</div>
      <div class="comments" id="comment-list">{{COMMENTS}}</div>
    </section>
  </main>
</body>
</html>
"##;

const STYLE: &str = r##"
:root {
  --bg-1: #f6faf6;
  --bg-2: #dcfce7;
  --ink: #1f2a24;
  --accent: #16a34a;
  --accent-soft: rgba(34, 197, 94, 0.18);
  --danger: #f87171;
  --card: #ffffff;
  --muted: #5f6b64;
  --border: rgba(22, 101, 52, 0.14);
  --shadow: 0 18px 44px rgba(22, 101, 52, 0.12);
}

* {
  box-sizing: border-box;
}

body {
  margin: 0;
  min-height: 100vh;
  background: radial-gradient(circle at top, var(--bg-2), transparent 55%),
    linear-gradient(150deg, var(--bg-1), #eefbf2 70%, #f6faf6 100%);
  color: var(--ink);
  font-family: "Segoe UI", "Trebuchet MS", sans-serif;
  display: grid;
  place-items: start center;
  padding: 32px 18px 48px;
}

.app {
  width: min(960px, 100%);
  display: grid;
  gap: 20px;
}

header.row {
  display: flex;
  flex-wrap: wrap;
  align-items: center;
  justify-content: space-between;
  gap: 16px;
}

h1 {
  margin: 0;
  font-size: clamp(1.7rem, 3.5vw, 2.3rem);
}

h2 {
  margin: 0 0 12px;
  font-size: 1.15rem;
}

.subtitle {
  margin: 6px 0 0;
  color: var(--muted);
  font-size: 0.95rem;
}

.panel {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
  gap: 14px;
}

.stat {
  background: var(--card);
  border-radius: 16px;
  padding: 16px;
  border: 1px solid var(--border);
  box-shadow: var(--shadow);
  display: grid;
  gap: 6px;
}

.stat .label {
  font-size: 0.78rem;
  text-transform: uppercase;
  letter-spacing: 0.1em;
  color: var(--muted);
}

.stat .value {
  font-size: 1.6rem;
  font-weight: 600;
  color: var(--accent);
}

.stat .value.small {
  font-size: 1.02rem;
  color: var(--ink);
}

.card,
.chart-card {
  background: var(--card);
  border-radius: 16px;
  padding: 18px;
  border: 1px solid var(--border);
  box-shadow: var(--shadow);
}

.chart {
  width: 100%;
  height: auto;
  display: block;
}

.chart-grid {
  stroke: rgba(22, 101, 52, 0.12);
}

.chart-label {
  fill: var(--muted);
  font-size: 11px;
}

.chart-bar {
  fill: var(--accent-soft);
  stroke: var(--accent);
  stroke-width: 1.5;
}

.chart-line {
  fill: none;
  stroke: #38bdf8;
  stroke-width: 3;
}

.chart-point {
  fill: white;
  stroke: #38bdf8;
  stroke-width: 2;
}

.question {
  display: flex;
  flex-wrap: wrap;
  align-items: center;
  justify-content: space-between;
  gap: 10px;
  padding: 8px 0;
  border-bottom: 1px dashed var(--border);
}

.question .prompt {
  max-width: 62%;
}

.scale {
  display: flex;
  gap: 14px;
  color: var(--muted);
}

.open-label {
  display: block;
  margin: 12px 0 6px;
  color: var(--muted);
  font-size: 0.92rem;
}

textarea,
select,
input[type="search"] {
  width: 100%;
  border: 1px solid var(--border);
  border-radius: 10px;
  padding: 9px 12px;
  font: inherit;
  color: var(--ink);
  background: #fbfdfb;
}

form#encuesta-form {
  display: grid;
  gap: 16px;
}

form#encuesta-form.is-submitted {
  opacity: 0.55;
  pointer-events: none;
}

button {
  appearance: none;
  border: none;
  border-radius: 999px;
  padding: 11px 22px;
  font-size: 0.98rem;
  font-weight: 600;
  cursor: pointer;
  background: var(--accent);
  color: white;
  box-shadow: 0 10px 22px rgba(22, 163, 74, 0.28);
}

button:active {
  transform: scale(0.98);
}

.banner {
  border-radius: 12px;
  padding: 14px 18px;
  background: var(--accent-soft);
  border: 1px solid var(--accent);
}

.banner-error {
  background: rgba(248, 113, 113, 0.12);
  border-color: rgba(248, 113, 113, 0.7);
}

.filters {
  display: grid;
  grid-template-columns: minmax(170px, 240px) 1fr auto;
  gap: 10px;
  margin-bottom: 14px;
}

.chips {
  display: flex;
  flex-wrap: wrap;
  gap: 8px;
  margin-bottom: 14px;
}

.chip {
  background: var(--accent-soft);
  color: #166534;
  border-radius: 999px;
  padding: 4px 12px;
  font-size: 0.82rem;
}

.comments {
  display: grid;
  gap: 12px;
}

.comment {
  border: 1px solid var(--border);
  border-radius: 12px;
  padding: 12px 14px;
  display: grid;
  gap: 8px;
}

.comment header {
  display: flex;
  justify-content: space-between;
  align-items: center;
  gap: 10px;
}

.comment p {
  margin: 0;
}

.comment .when,
.comment .field {
  color: var(--muted);
  font-size: 0.82rem;
}

.placeholder {
  color: var(--muted);
  font-style: italic;
}

.hint {
  margin: 0;
  color: var(--muted);
  font-size: 0.88rem;
}

@media (max-width: 640px) {
  .filters {
    grid-template-columns: 1fr;
  }
  .question .prompt {
    max-width: 100%;
  }
}
"##;
