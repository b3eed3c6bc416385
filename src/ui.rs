use crate::models::{ActivityEvent, ActivityType, ChartPoint, Intensity, PainQuality, PainReading, Severity};
use crate::query::{RangePreset, RangeSelection};
use chrono::{DateTime, Local, Utc};
use std::fmt::Write;

const CHART_WIDTH: f64 = 720.0;
const CHART_HEIGHT: f64 = 260.0;
const CHART_PAD_LEFT: f64 = 36.0;
const CHART_PAD_RIGHT: f64 = 12.0;
const CHART_PAD_Y: f64 = 16.0;
const CHART_PAD_BOTTOM: f64 = 28.0;

pub fn render_dashboard(
    user_id: &str,
    now: DateTime<Local>,
    recent: &[PainReading],
    points: &[ChartPoint],
) -> String {
    let mut body = String::new();
    body.push_str(
        r#"<section class="intro">
  <h1>Pain dashboard</h1>
  <p class="subtitle">Quickly record how you feel, see recent entries, and view trends over time.</p>
</section>
<section class="grid">
"#,
    );
    body.push_str(&pain_form(now));
    body.push_str(r#"<div class="card"><h2>Recent pain entries</h2>"#);
    if recent.is_empty() {
        body.push_str(r#"<p class="muted">No entries yet. Use the form to record how you feel.</p>"#);
    } else {
        body.push_str(&pain_table(recent, "/"));
    }
    body.push_str("</div>\n</section>\n");

    body.push_str(r#"<section class="card"><h2>Pain over time</h2>"#);
    body.push_str(
        r#"<p class="muted">Each point shows the average pain for a day; green rings mark days with PT or activity.</p>"#,
    );
    body.push_str(&chart_svg(points));
    body.push_str("</section>\n");

    render_page("Pain dashboard", "/", user_id, &body)
}

pub fn render_pain_log(user_id: &str, selection: &RangeSelection, readings: &[PainReading]) -> String {
    let mut body = String::new();
    body.push_str(
        r#"<section class="intro">
  <h1>Pain log</h1>
  <p class="subtitle">Explore your pain entries over time and filter by date range.</p>
</section>
"#,
    );
    body.push_str(&range_picker(selection));

    body.push_str(r#"<section class="card">"#);
    if readings.is_empty() {
        body.push_str(r#"<p class="muted">No entries for this range yet.</p>"#);
    } else {
        body.push_str(&pain_table(readings, &pain_log_href(selection)));
    }
    body.push_str("</section>\n");

    render_page("Pain log", "/logs/pain", user_id, &body)
}

pub fn render_events_page(
    user_id: &str,
    now: DateTime<Local>,
    kind: Option<ActivityType>,
    events: &[ActivityEvent],
) -> String {
    let mut body = String::new();
    body.push_str(
        r#"<section class="intro">
  <h1>PT &amp; activity log</h1>
  <p class="subtitle">Track physical therapy sessions, runs, long drives, and other events that might affect your symptoms.</p>
</section>
<section class="grid">
"#,
    );
    body.push_str(&event_form(now));

    body.push_str(r#"<div class="card"><h2>Logged PT &amp; activity</h2>"#);
    body.push_str(&kind_filter(kind));
    if events.is_empty() {
        body.push_str(r#"<p class="muted">No events yet. Use the form to log PT or other activities.</p>"#);
    } else {
        let next = match kind {
            Some(kind) => format!("/logs/events?type={}", kind.as_str()),
            None => "/logs/events".to_string(),
        };
        body.push_str(&events_table(events, &next));
    }
    body.push_str("</div>\n</section>\n");

    render_page("PT & activity log", "/logs/events", user_id, &body)
}

fn render_page(title: &str, active: &str, user_id: &str, body: &str) -> String {
    PAGE_HTML
        .replace("{{TITLE}}", &escape(title))
        .replace("{{NAV}}", &nav(active))
        .replace("{{USER}}", &escape(user_id))
        .replace("{{BODY}}", body)
}

fn nav(active: &str) -> String {
    let links = [("/", "Dashboard"), ("/logs/pain", "Pain log"), ("/logs/events", "PT & activity")];
    let mut html = String::new();
    for (href, label) in links {
        let class = if href == active { " class=\"active\"" } else { "" };
        let _ = write!(html, r#"<a href="{href}"{class}>{}</a>"#, escape(label));
    }
    html
}

fn pain_form(now: DateTime<Local>) -> String {
    let mut qualities = String::from(r#"<option value="">Select</option>"#);
    for quality in PainQuality::ALL {
        let _ = write!(qualities, r#"<option value="{0}">{0}</option>"#, quality.as_str());
    }

    format!(
        r#"<form class="card" method="post" action="/pain">
  <h2>How is your pain right now?</h2>
  <p class="muted">0 = no pain, 10 = worst imaginable.</p>
  <label>Pain score <input type="number" name="score" min="0" max="10" value="3" required /></label>
  <div class="row">
    <label>Date <input type="date" name="date" value="{date}" required /></label>
    <label>Time <input type="time" name="time" value="{time}" /></label>
  </div>
  <label>Where is the pain? <input type="text" name="location" placeholder="e.g. right knee, lower back" /></label>
  <label>What does it feel like? <select name="quality">{qualities}</select></label>
  <label>Notes <textarea name="notes" rows="2"></textarea></label>
  <button type="submit">Save pain entry</button>
</form>
"#,
        date = now.format("%Y-%m-%d"),
        time = now.format("%H:%M"),
    )
}

fn event_form(now: DateTime<Local>) -> String {
    let mut kinds = String::new();
    for kind in ActivityType::ALL {
        let _ = write!(
            kinds,
            r#"<option value="{}">{}</option>"#,
            kind.as_str(),
            kind.display_name()
        );
    }
    let mut intensities = String::from(r#"<option value="">Select</option>"#);
    for intensity in Intensity::ALL {
        let _ = write!(intensities, r#"<option value="{0}">{0}</option>"#, intensity.as_str());
    }

    format!(
        r#"<form class="card" method="post" action="/events">
  <h2>Log PT or activity</h2>
  <label>Type <select name="type">{kinds}</select></label>
  <div class="row">
    <label>Date <input type="date" name="date" value="{date}" required /></label>
    <label>Time <input type="time" name="time" value="{time}" /></label>
  </div>
  <div class="row">
    <label>Duration (minutes) <input type="number" name="duration_minutes" min="0" /></label>
    <label>Intensity <select name="intensity">{intensities}</select></label>
  </div>
  <label>Notes <textarea name="notes" rows="2"></textarea></label>
  <button type="submit">Save activity</button>
</form>
"#,
        date = now.format("%Y-%m-%d"),
        time = now.format("%H:%M"),
    )
}

fn pain_table(readings: &[PainReading], next: &str) -> String {
    let mut html = String::from(
        "<table><thead><tr><th>Time</th><th>Pain</th><th>Location</th><th>Quality</th><th>Notes</th><th></th></tr></thead><tbody>",
    );
    for reading in readings {
        let severity = Severity::from_score(reading.score);
        let _ = write!(
            html,
            r#"<tr><td>{time}</td><td><span class="badge" style="border-color:{color};color:{color}" title="{label}">{score}</span></td><td>{location}</td><td>{quality}</td><td>{notes}</td><td>{delete}</td></tr>"#,
            time = display_time(&reading.timestamp),
            color = severity.color(),
            label = severity.label(),
            score = reading.score,
            location = optional_text(reading.location.as_deref()),
            quality = optional_text(reading.quality.as_ref().map(PainQuality::as_str)),
            notes = optional_text(reading.notes.as_deref()),
            delete = delete_button(&format!("/pain/{}/delete", reading.id), next, "pain entry"),
        );
    }
    html.push_str("</tbody></table>");
    html
}

fn events_table(events: &[ActivityEvent], next: &str) -> String {
    let mut html = String::from(
        "<table><thead><tr><th>Time</th><th>Type</th><th>Duration</th><th>Intensity</th><th>Notes</th><th></th></tr></thead><tbody>",
    );
    for event in events {
        let duration = event
            .duration_minutes
            .map(|minutes| format!("{minutes} min"));
        let _ = write!(
            html,
            "<tr><td>{time}</td><td>{kind}</td><td>{duration}</td><td>{intensity}</td><td>{notes}</td><td>{delete}</td></tr>",
            time = display_time(&event.timestamp),
            kind = escape(event.kind.display_name()),
            duration = optional_text(duration.as_deref()),
            intensity = optional_text(event.intensity.as_ref().map(Intensity::as_str)),
            notes = optional_text(event.notes.as_deref()),
            delete = delete_button(&format!("/events/{}/delete", event.id), next, "activity"),
        );
    }
    html.push_str("</tbody></table>");
    html
}

fn delete_button(action: &str, next: &str, what: &str) -> String {
    format!(
        r#"<form method="post" action="{action}" onsubmit="return confirm('Are you sure you want to delete this {what}?')"><input type="hidden" name="next" value="{next}" /><button class="link" type="submit">Delete</button></form>"#,
        action = escape(action),
        next = escape(next),
        what = escape(what),
    )
}

fn range_picker(selection: &RangeSelection) -> String {
    let mut html = String::from(r#"<section class="card range"><div class="presets">"#);
    for preset in RangePreset::ALL {
        let class = if preset == selection.preset && selection.from.is_none() && selection.to.is_none() {
            " class=\"active\""
        } else {
            ""
        };
        let _ = write!(
            html,
            r#"<a href="/logs/pain?preset={}"{class}>{}</a>"#,
            preset.as_str(),
            preset.label()
        );
    }
    let _ = write!(
        html,
        r#"</div><form method="get" action="/logs/pain" class="row"><input type="hidden" name="preset" value="{preset}" /><label>From <input type="date" name="from" value="{from}" /></label><label>To <input type="date" name="to" value="{to}" /></label><button type="submit">Apply</button></form></section>"#,
        preset = selection.preset.as_str(),
        from = selection.from.map(|day| day.to_string()).unwrap_or_default(),
        to = selection.to.map(|day| day.to_string()).unwrap_or_default(),
    );
    html
}

fn pain_log_href(selection: &RangeSelection) -> String {
    let mut href = format!("/logs/pain?preset={}", selection.preset.as_str());
    if let Some(from) = selection.from {
        let _ = write!(href, "&from={from}");
    }
    if let Some(to) = selection.to {
        let _ = write!(href, "&to={to}");
    }
    href
}

fn kind_filter(selected: Option<ActivityType>) -> String {
    let mut options = String::from(r#"<option value="all">All types</option>"#);
    for kind in ActivityType::ALL {
        let attr = if Some(kind) == selected { " selected" } else { "" };
        let _ = write!(
            options,
            r#"<option value="{}"{attr}>{}</option>"#,
            kind.as_str(),
            kind.display_name()
        );
    }
    format!(
        r#"<form method="get" action="/logs/events" class="row"><select name="type">{options}</select><button type="submit">Filter</button></form>"#
    )
}

/// Inline SVG line chart of daily averages on a fixed 0-10 axis.
pub fn chart_svg(points: &[ChartPoint]) -> String {
    if points.is_empty() {
        return r#"<p class="muted">No pain entries yet. Once you log a few, you'll see them here.</p>"#
            .to_string();
    }

    let plot_width = CHART_WIDTH - CHART_PAD_LEFT - CHART_PAD_RIGHT;
    let plot_height = CHART_HEIGHT - CHART_PAD_Y - CHART_PAD_BOTTOM;
    let first = points[0].date;
    let span = (points[points.len() - 1].date - first).num_days();

    let x_of = |point: &ChartPoint| {
        if span == 0 {
            CHART_PAD_LEFT + plot_width / 2.0
        } else {
            let offset = (point.date - first).num_days() as f64;
            CHART_PAD_LEFT + plot_width * offset / span as f64
        }
    };
    let y_of = |value: f64| CHART_PAD_Y + plot_height * (10.0 - value) / 10.0;

    let mut svg = format!(
        r#"<svg class="chart" viewBox="0 0 {CHART_WIDTH} {CHART_HEIGHT}" role="img" aria-label="Average pain per day">"#
    );

    for tick in (0..=10).step_by(2) {
        let y = y_of(f64::from(tick));
        let _ = write!(
            svg,
            r##"<line x1="{CHART_PAD_LEFT}" x2="{right}" y1="{y:.1}" y2="{y:.1}" stroke="#e5e7eb" stroke-dasharray="3 3"/><text x="{label_x}" y="{text_y:.1}" font-size="10" text-anchor="end">{tick}</text>"##,
            right = CHART_WIDTH - CHART_PAD_RIGHT,
            label_x = CHART_PAD_LEFT - 6.0,
            text_y = y + 3.0,
        );
    }

    let line: Vec<String> = points
        .iter()
        .map(|point| format!("{:.1},{:.1}", x_of(point), y_of(point.avg)))
        .collect();
    let _ = write!(
        svg,
        r##"<polyline fill="none" stroke="#2563eb" stroke-width="2" points="{}"/>"##,
        line.join(" ")
    );

    for point in points {
        let x = x_of(point);
        let y = y_of(point.avg);
        let mut tooltip = format!(
            "{}\nAverage: {:.1}\nRange: {} – {}",
            point.date.format("%b %-d, %Y"),
            point.avg,
            point.min,
            point.max
        );
        if let Some(summary) = &point.events_summary {
            let _ = write!(tooltip, "\nEvents: {summary}");
        }

        svg.push_str("<g>");
        let _ = write!(svg, "<title>{}</title>", escape(&tooltip));
        if point.has_event {
            let _ = write!(
                svg,
                r##"<circle cx="{x:.1}" cy="{y:.1}" r="7" fill="none" stroke="#22c55e" stroke-width="2"/>"##
            );
        }
        let _ = write!(
            svg,
            r#"<circle cx="{x:.1}" cy="{y:.1}" r="4" fill="{}" stroke="white" stroke-width="1"/>"#,
            Severity::from_average(point.avg).color()
        );
        svg.push_str("</g>");
    }

    let label_y = CHART_HEIGHT - 8.0;
    let _ = write!(
        svg,
        r#"<text x="{CHART_PAD_LEFT}" y="{label_y}" font-size="10">{}</text>"#,
        first.format("%b %-d")
    );
    if span > 0 {
        let _ = write!(
            svg,
            r#"<text x="{}" y="{label_y}" font-size="10" text-anchor="end">{}</text>"#,
            CHART_WIDTH - CHART_PAD_RIGHT,
            points[points.len() - 1].date.format("%b %-d")
        );
    }
    svg.push_str("</svg>");
    svg
}

fn display_time(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%b %-d, %Y %H:%M")
        .to_string()
}

fn optional_text(value: Option<&str>) -> String {
    match value {
        Some(value) => escape(value),
        None => "-".to_string(),
    }
}

pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --bg: #f8fafc;
      --ink: #0f172a;
      --muted: #64748b;
      --card: #ffffff;
      --line: #e2e8f0;
      --accent: #2563eb;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
    }

    header.top {
      display: flex;
      justify-content: space-between;
      align-items: center;
      padding: 14px 24px;
      background: var(--card);
      border-bottom: 1px solid var(--line);
    }

    header.top nav a {
      margin-right: 16px;
      color: var(--muted);
      text-decoration: none;
    }

    header.top nav a.active {
      color: var(--ink);
      font-weight: 600;
    }

    main {
      width: min(1040px, 100%);
      margin: 0 auto;
      padding: 24px 18px 48px;
      display: grid;
      gap: 20px;
    }

    h1 {
      margin: 0;
      font-size: 1.8rem;
    }

    h2 {
      margin: 0 0 8px;
      font-size: 1.1rem;
    }

    .subtitle,
    .muted {
      margin: 4px 0 0;
      color: var(--muted);
      font-size: 0.9rem;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
      gap: 20px;
    }

    .card {
      background: var(--card);
      border: 1px solid var(--line);
      border-radius: 12px;
      padding: 18px;
      overflow-x: auto;
    }

    form.card label {
      display: grid;
      gap: 4px;
      margin-top: 10px;
      font-size: 0.9rem;
    }

    .row {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      align-items: end;
    }

    .presets a {
      margin-right: 8px;
      padding: 4px 10px;
      border-radius: 999px;
      color: var(--ink);
      text-decoration: none;
    }

    .presets a.active {
      background: var(--ink);
      color: #fff;
    }

    button {
      margin-top: 12px;
      padding: 8px 14px;
      border: 0;
      border-radius: 8px;
      background: var(--accent);
      color: #fff;
      cursor: pointer;
    }

    button.link {
      margin: 0;
      padding: 0;
      background: none;
      color: #dc2626;
    }

    table {
      width: 100%;
      border-collapse: collapse;
      font-size: 0.85rem;
    }

    th,
    td {
      padding: 6px 8px;
      border-bottom: 1px solid var(--line);
      text-align: left;
    }

    td form {
      margin: 0;
    }

    .badge {
      display: inline-block;
      min-width: 28px;
      padding: 2px 6px;
      border: 1px solid;
      border-radius: 999px;
      text-align: center;
      font-weight: 600;
    }

    svg.chart {
      width: 100%;
      height: auto;
    }
  </style>
</head>
<body>
  <header class="top">
    <nav>{{NAV}}</nav>
    <span class="muted">Signed in as {{USER}}</span>
  </header>
  <main>
{{BODY}}
  </main>
</body>
</html>
"#;
