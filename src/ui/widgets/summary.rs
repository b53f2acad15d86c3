// src/ui/widgets/summary.rs

use crate::app::App;
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};
use vanguard_recon::core::models::{FindingKind, ScanPhase};

/// Renders the summary panel: the polled scan status with a progress gauge,
/// then the totals of the finished scan.
///
/// # Arguments
/// * `frame` - The `Frame` used for rendering the UI.
/// * `app` - The application state, holding the latest status poll.
/// * `area` - The `Rect` defining the drawable area for this widget.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let summary_container = Block::default().borders(Borders::ALL).title("Summary");
    frame.render_widget(summary_container, area);

    let summary_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Status message
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Spacer
            Constraint::Length(3), // Network
            Constraint::Length(1), // Spacer
            Constraint::Min(0),    // Totals
        ])
        .split(area);

    // --- Status Section ---
    let status = &app.status;
    let message_style = match app.phase {
        ScanPhase::Error => Style::default().fg(Color::Red),
        ScanPhase::Done => Style::default().fg(Color::Green),
        _ => Style::default(),
    };
    let message = if status.message.is_empty() { "Idle" } else { status.message.as_str() };
    let status_text = Text::from(vec![
        Line::from("STATUS".bold()),
        Line::from(Span::styled(message.to_string(), message_style)),
    ]);
    frame.render_widget(Paragraph::new(status_text).wrap(Wrap { trim: true }), summary_chunks[0]);

    let gauge = Gauge::default()
        .percent(u16::from(status.progress.min(100)))
        .label(format!("{}%", status.progress))
        .gauge_style(Style::default().fg(if app.phase == ScanPhase::Error { Color::Red } else { Color::Cyan }));
    frame.render_widget(gauge, summary_chunks[1]);

    // --- Network Section ---
    let local_ip = status.local_ip.map(|ip| ip.to_string()).unwrap_or_else(|| "-".to_string());
    let subnet = status.subnet.clone().unwrap_or_else(|| "-".to_string());
    let network_text = Text::from(vec![
        Line::from("NETWORK".bold()),
        Line::from(format!("Local IP: {}", local_ip)),
        Line::from(format!("Subnet:   {}", subnet)),
    ]);
    frame.render_widget(Paragraph::new(network_text), summary_chunks[3]);

    // --- Totals Section ---
    if !status.has_results {
        return;
    }
    let mut lines = vec![Line::from("TOTALS".bold())];
    if let Some(stats) = app.host_statistics() {
        lines.push(Line::from(format!("Hosts:       {}", stats.total_hosts)));
        lines.push(Line::from(format!("SSH open:    {}", stats.ssh_open)));
        lines.push(Line::from(format!("HTTP open:   {}", stats.http_open)));
        lines.push(Line::from(format!("HTTPS open:  {}", stats.https_open)));
    } else {
        let findings = app.findings();
        let count = |kind: FindingKind| findings.iter().filter(|f| f.kind == kind).count();
        let total_style = if findings.is_empty() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Red)
        };
        lines.push(Line::from(vec![
            Span::raw("Vulnerabilities: "),
            Span::styled(findings.len().to_string(), total_style),
        ]));
        for kind in [FindingKind::SqlInjection, FindingKind::ReflectedXss, FindingKind::FormXss] {
            lines.push(Line::from(format!("  {}: {}", kind, count(kind))));
        }
    }
    frame.render_widget(Paragraph::new(lines), summary_chunks[5]);
}
