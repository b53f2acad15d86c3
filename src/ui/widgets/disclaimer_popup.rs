// src/ui/widgets/disclaimer_popup.rs

use ratatui::{
    layout::Flex,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use vanguard_recon::ScanConfig;

const TERMS: [&str; 3] = [
    "1. Only sweep networks and probe applications you own or are permitted to test.",
    "2. Injection probes can change data on the target. Prefer staging systems.",
    "3. The author assumes NO liability for misuse or damage caused by this program.",
];

/// Authorization modal shown at startup, over the rest of the UI, until
/// the user confirms with Enter. It also lists how hard the engine will hit
/// the target with the loaded configuration.
pub fn render_disclaimer_popup(frame: &mut Frame, config: &ScanConfig, area: Rect) {
    let mut lines = vec![
        Line::from("AUTHORIZED USE ONLY".bold().yellow()),
        Line::from(""),
        Line::from("Vanguard Recon sends ARP requests to every address of a subnet and injects SQL and XSS payloads into web applications."),
        Line::from(""),
    ];
    lines.extend(TERMS.iter().map(|term| Line::from(*term)));
    lines.extend([
        Line::from(""),
        Line::from(vec![
            "Workers: ".bold(),
            Span::raw(config.worker_count().to_string()),
            "   Delay per probe: ".bold(),
            Span::raw(format!("{} ms", config.request_delay_ms)),
            "   Timeout: ".bold(),
            Span::raw(format!("{} s", config.request_timeout_secs)),
        ]),
        Line::from(""),
        Line::from("Press ".bold() + "Enter".bold().yellow() + " to confirm you are authorized".bold()),
    ]);

    let [vertical] = Layout::vertical([Constraint::Percentage(70)]).flex(Flex::Center).areas(area);
    let [popup_area] = Layout::horizontal([Constraint::Percentage(70)]).flex(Flex::Center).areas(vertical);

    let popup = Paragraph::new(lines)
        .block(
            Block::default()
                .title("Disclaimer")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}
