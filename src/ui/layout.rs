// src/ui/layout.rs

use ratatui::layout::{Constraint, Layout, Rect};

/// Below this width the summary panel moves under the results.
const NARROW_WIDTH: u16 = 100;

/// Screen areas of the application, computed once per frame.
pub struct AppLayout {
    pub input: Rect,
    pub report: Rect,
    pub summary: Rect,
    pub footer: Rect,
}

/// Input bar on top, footer at the bottom. Results and summary share the
/// middle, side by side on wide terminals and stacked on narrow ones.
pub fn create_layout(frame_size: Rect) -> AppLayout {
    let [input, content, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame_size);

    let [report, summary] = if frame_size.width < NARROW_WIDTH {
        Layout::vertical([Constraint::Min(8), Constraint::Length(12)]).areas(content)
    } else {
        Layout::horizontal([Constraint::Percentage(70), Constraint::Percentage(30)]).areas(content)
    };

    AppLayout { input, report, summary, footer }
}
