use crate::calendar::MonthView;
use crate::models::Suggestion;
use crate::panels::AnalysisView;
use crate::series::SeriesResponse;
use std::fmt::Write;

const NO_DATA: &str = "--";

pub fn render_index(
    month: &MonthView,
    series: &SeriesResponse,
    suggestions: &[Suggestion],
    analysis: &AnalysisView,
) -> String {
    fill(INDEX_HTML, |slot| match slot {
        "MONTH" => Some(escape(&month.label)),
        "CALENDAR" => Some(calendar_cells(month)),
        "REFERENCE" => Some(series.reference.to_string()),
        "SERIES" => Some(series_rows(series)),
        "ANALYSIS" => Some(analysis_stats(analysis)),
        "SUGGESTIONS" => Some(suggestion_items(suggestions)),
        _ => None,
    })
}

/// Replaces `{{NAME}}` slots in a single pass. Inserted text is never
/// scanned again, so slot markers inside backend text stay literal.
fn fill(template: &str, value: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let slot = after
            .find("}}")
            .and_then(|end| value(&after[..end]).map(|text| (end, text)));
        match slot {
            Some((end, text)) => {
                out.push_str(&text);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn calendar_cells(month: &MonthView) -> String {
    let mut html = String::new();
    for cell in &month.days {
        let selected = if cell.selected { " selected" } else { "" };
        let _ = write!(
            html,
            r#"<div class="day {color}{selected}" title="{date}">{day}</div>"#,
            color = cell.color,
            date = cell.date,
            day = cell.day,
        );
    }
    html
}

fn series_rows(series: &SeriesResponse) -> String {
    let mut html = String::new();
    for point in &series.points {
        if !point.has_data {
            let _ = write!(
                html,
                r#"<tr class="empty"><td>{label} {date}</td><td colspan="5">no data</td></tr>"#,
                label = point.label,
                date = point.date,
            );
            continue;
        }
        let _ = write!(
            html,
            "<tr><td>{label} {date}</td><td>{emotion}</td><td>{steps}</td><td>{deep}</td><td>{light}</td><td>{rem}</td></tr>",
            label = point.label,
            date = point.date,
            emotion = point.emotion.as_str(),
            steps = point.steps,
            deep = point.deep_sleep_minutes,
            light = point.light_sleep_minutes,
            rem = point.rem_sleep_minutes,
        );
    }
    html
}

fn analysis_stats(analysis: &AnalysisView) -> String {
    let show = |value: Option<String>| value.unwrap_or_else(|| NO_DATA.to_string());
    let sleep = analysis.sleep;
    let stats = [
        ("Emotion", show(analysis.emotion.map(|e| e.as_str().to_string()))),
        ("Heart rate", show(analysis.heart_rate.map(|bpm| format!("{bpm} bpm")))),
        ("Steps", show(analysis.steps.map(|steps| steps.to_string()))),
        ("Deep sleep", show(sleep.map(|s| format!("{} min", s.deep)))),
        ("Light sleep", show(sleep.map(|s| format!("{} min", s.light)))),
        ("REM", show(sleep.map(|s| format!("{} min", s.rem)))),
        ("Awake", show(sleep.map(|s| format!("{} min", s.awake)))),
    ];

    let mut html = String::new();
    for (label, value) in stats {
        let _ = write!(
            html,
            r#"<div class="stat"><span class="label">{label}</span><span class="value">{value}</span></div>"#,
        );
    }
    if let Some(summary) = &analysis.summary {
        let _ = write!(html, r#"<p class="summary">{}</p>"#, escape(summary));
    }
    html
}

fn suggestion_items(suggestions: &[Suggestion]) -> String {
    if suggestions.is_empty() {
        return r#"<li class="placeholder">Awaiting suggestion...</li>"#.to_string();
    }
    let mut html = String::new();
    for suggestion in suggestions {
        let _ = write!(
            html,
            "<li><h3>{}</h3><p>{}</p></li>",
            escape(&suggestion.title),
            escape(&suggestion.description),
        );
    }
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
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

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Emotional Wellbeing Diary</title>
  <style>
    :root {
      --bg: #1a1f2c;
      --card: rgba(255, 255, 255, 0.08);
      --ink: #ffffff;
      --muted: rgba(255, 255, 255, 0.7);
      --accent: #9b87f5;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 32px;
    }

    section {
      background: var(--card);
      border-radius: 12px;
      padding: 24px;
      margin-bottom: 24px;
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(120px, 1fr));
      gap: 12px;
    }

    .stat .label {
      display: block;
      color: var(--muted);
      font-size: 0.85rem;
    }

    .stat .value {
      font-size: 1.2rem;
      font-weight: 600;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 6px;
    }

    .day {
      padding: 8px;
      border-radius: 6px;
      text-align: center;
    }

    .day.green { background: rgba(34, 197, 94, 0.3); }
    .day.yellow { background: rgba(234, 179, 8, 0.3); }
    .day.red { background: rgba(239, 68, 68, 0.3); }
    .day.transparent { background: transparent; }
    .day.selected { outline: 2px solid var(--accent); }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    td, th {
      padding: 6px;
      text-align: left;
    }

    tr.empty td {
      color: var(--muted);
    }

    li.placeholder {
      color: var(--muted);
    }
  </style>
</head>
<body>
  <h1>Emotional Wellbeing Diary</h1>

  <section>
    <h2>Real-time Analysis</h2>
    <div class="stats">{{ANALYSIS}}</div>
  </section>

  <section>
    <h2>Last 7 days to {{REFERENCE}}</h2>
    <table>
      <thead>
        <tr><th>Day</th><th>Emotion</th><th>Steps</th><th>Deep (min)</th><th>Light (min)</th><th>REM (min)</th></tr>
      </thead>
      <tbody>{{SERIES}}</tbody>
    </table>
  </section>

  <section>
    <h2>Mood Calendar: {{MONTH}}</h2>
    <div class="grid">{{CALENDAR}}</div>
  </section>

  <section>
    <h2>Suggestions</h2>
    <ul>{{SUGGESTIONS}}</ul>
  </section>
</body>
</html>
"#;
