use chrono::NaiveDate;
use devmeet_db::models::Event;
use tracing::debug;

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%b %d, %Y", "%B %d, %Y", "%d %b %Y", "%d %B %Y"];

/// Parses an event's display date. Accepts the date-input form (`2024-01-15`),
/// the en-US display forms (`Jan 15, 2024`) and day-first forms (`30 Sept 2025`).
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    // chrono only knows "Sep".
    let raw = raw.trim().replace("Sept ", "Sep ");
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&raw, fmt).ok())
}

/// Renders a date the way event listings display it, e.g. `Jan 5, 2024`.
pub fn format_event_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Events dated on or after `today`, earliest first. Undated events are dropped.
pub fn upcoming(events: Vec<Event>, today: NaiveDate) -> Vec<Event> {
    let mut dated: Vec<(NaiveDate, Event)> = events
        .into_iter()
        .filter_map(|event| match parse_event_date(&event.date) {
            Some(date) => Some((date, event)),
            None => {
                debug!(event_id = ?event.id, date = %event.date, "Skipping event with unparseable date");
                None
            }
        })
        .filter(|(date, _)| *date >= today)
        .collect();

    // Stable: same-day events keep insertion order.
    dated.sort_by_key(|(date, _)| *date);
    dated.into_iter().map(|(_, event)| event).collect()
}
