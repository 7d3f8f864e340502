//! Minimal server-rendered pages.

use shared_types::Event;

fn layout(title: &str, body: &str, with_nav: bool) -> String {
    let nav = if with_nav {
        r#"<nav><a href="/record-event">Record event</a> | <a href="/all-events">All events</a> | <a href="/plots">Plots</a> | <a href="/logout">Log out</a></nav>"#
    } else {
        ""
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>{nav}<main>{body}</main></body>\n</html>\n"
    )
}

pub fn login() -> String {
    layout(
        "Log in",
        r#"<h1>Log in</h1>
<form method="post" action="/login">
  <label>Email <input type="email" name="email" required autofocus></label>
  <button type="submit">Send me a login link</button>
</form>"#,
        false,
    )
}

pub fn check_your_email() -> String {
    layout(
        "Check your email",
        "<h1>Check your email</h1>\n<p>If your address is known, a login link is on its way. It is valid for 15 minutes.</p>",
        false,
    )
}

pub fn record_event(saved: bool) -> String {
    let banner = if saved { "<p role=\"status\">Event recorded.</p>\n" } else { "" };

    layout(
        "Record event",
        &format!(
            r#"<h1>Record event</h1>
{banner}<form method="post" action="/record-event">
  <label>Tag <input name="tag" required></label>
  <label>Value <input name="value"></label>
  <label>Comment <textarea name="comment"></textarea></label>
  <button type="submit">Record</button>
</form>"#
        ),
        true,
    )
}

pub fn all_events(events: &[Event]) -> String {
    let rows: String = events
        .iter()
        .map(|event| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                event.recorded_at.format("%Y-%m-%d %H:%M"),
                escape(&event.tag),
                escape(&event.value),
                escape(&event.comment),
                escape(&event.recorded_by),
            )
        })
        .collect();

    layout(
        "All events",
        &format!(
            "<h1>All events</h1>\n<table>\n<tr><th>When</th><th>Tag</th><th>Value</th><th>Comment</th><th>By</th></tr>\n{rows}</table>"
        ),
        true,
    )
}

/// Histogram of events over time, drawn client side from `/events.json`.
pub fn plots(event_count: usize) -> String {
    layout(
        "Plots",
        &format!(
            r#"<h1>Plots</h1>
<p>{event_count} events recorded.</p>
<div id="events-plot"></div>
<script type="module" src="/assets/plot.js"></script>"#
        ),
        true,
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}
