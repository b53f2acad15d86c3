// src/ui/mod.rs

use crate::app::App;
use ratatui::prelude::*;
use vanguard_recon::ScanConfig;

mod layout;
mod widgets;

pub fn render(app: &mut App, config: &ScanConfig, frame: &mut Frame) {
    let layout = layout::create_layout(frame.area());

    widgets::input::render_input(frame, app, layout.input);
    widgets::results::render_results(frame, app, layout.report);
    widgets::summary::render_summary(frame, app, layout.summary);
    widgets::footer::render_footer(frame, app, layout.footer);

    if app.show_disclaimer {
        widgets::disclaimer_popup::render_disclaimer_popup(frame, config, frame.area());
    }
}
