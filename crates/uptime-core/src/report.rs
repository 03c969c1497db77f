use crate::monitor::event::TransitionEvent;

/// Render transition events as one message, one line per event.
///
/// Returns `None` when there is nothing to report.
pub fn format_report(events: &[TransitionEvent]) -> Option<String> {
    if events.is_empty() {
        return None;
    }
    let lines: Vec<String> = events.iter().map(format_line).collect();
    Some(lines.join("\n"))
}

pub fn format_line(event: &TransitionEvent) -> String {
    format!("{} change status to {}.", event.name, event.new_state)
}
