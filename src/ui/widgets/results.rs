// src/ui/widgets/results.rs

use crate::app::{App, AppState, SPINNER_CHARS};
use crate::ui::widgets::analysis_view::render_analysis_view;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Scrollbar, ScrollbarOrientation, Table, Wrap},
};
use vanguard_recon::core::models::{HOST_REPORT_FIELDS, PortState, ScanPhase, ScanOutcome};
use vanguard_recon::core::report::host_row;

/// Renders the main content area based on the application state.
pub fn render_results(frame: &mut Frame, app: &mut App, area: Rect) {
    let results_block = Block::default().borders(Borders::ALL).title("Scan Results (Navigate with ↑ ↓)");

    match app.state {
        AppState::Idle => {
            let mut lines = vec![
                Line::from("Type 'auto' (or leave empty) to sweep the local network,"),
                Line::from("a subnet such as 192.168.1.0/24, or an http(s) URL to probe."),
            ];
            if let Some(notice) = &app.notice {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(notice.clone(), Style::default().fg(Color::Red))));
            }
            let instructions = Paragraph::new(lines).block(results_block).wrap(Wrap { trim: true });
            frame.render_widget(instructions, area);
        }
        AppState::Scanning => {
            let spinner_char = SPINNER_CHARS[app.spinner_frame];
            let scanning_text = Paragraph::new(Line::from(vec![
                Span::styled(format!("{} ", spinner_char), Style::default().fg(Color::Cyan)),
                Span::raw(app.status.message.clone()),
            ]))
            .alignment(Alignment::Center)
            .block(results_block);
            frame.render_widget(scanning_text, area);
        }
        AppState::Finished => match app.outcome {
            Some(ScanOutcome::Hosts(_)) => render_host_table(frame, app, results_block, area),
            Some(ScanOutcome::Vulnerabilities(_)) => render_analysis_view(frame, app, results_block, area),
            None => {
                let style = if app.phase == ScanPhase::Error { Color::Red } else { Color::Yellow };
                let failed = Paragraph::new(app.status.message.clone())
                    .style(Style::default().fg(style))
                    .block(results_block)
                    .wrap(Wrap { trim: true });
                frame.render_widget(failed, area);
            }
        },
    }
}

fn render_host_table(frame: &mut Frame, app: &mut App, block: Block, area: Rect) {
    let hosts = app.hosts();
    if hosts.is_empty() {
        let empty = Paragraph::new("No devices found.").alignment(Alignment::Center).block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(HOST_REPORT_FIELDS.iter().map(|f| Cell::from(*f).bold()))
        .style(Style::default().fg(Color::Yellow));
    let rows: Vec<Row> = hosts
        .iter()
        .skip(app.scroll_offset)
        .map(|host| {
            let cells = host_row(host).into_iter().enumerate().map(|(i, value)| {
                let style = match (i >= 4, value == PortState::Open.to_string()) {
                    (true, true) => Style::default().fg(Color::Green),
                    (true, false) => Style::default().fg(Color::DarkGray),
                    _ => Style::default(),
                };
                Cell::from(value).style(style)
            });
            Row::new(cells)
        })
        .collect();

    let widths = [
        Constraint::Length(16),
        Constraint::Length(18),
        Constraint::Min(12),
        Constraint::Min(12),
        Constraint::Length(9),
        Constraint::Length(10),
        Constraint::Length(12),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);

    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight),
        area,
        &mut app.report_scroll_state,
    );
}
