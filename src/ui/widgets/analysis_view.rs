// src/ui/widgets/analysis_view.rs

use crate::app::App;
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use vanguard_recon::core::knowledge_base::{self, FindingCategory};

/// Finding list on top, knowledge-base detail of the selected finding below.
pub fn render_analysis_view(frame: &mut Frame, app: &mut App, main_block: Block, area: Rect) {
    let inner_area = main_block.inner(area);
    frame.render_widget(main_block, area);

    if app.findings().is_empty() {
        let clean = Text::from(vec![
            Line::from(""),
            Line::from("✓ NO VULNERABILITIES DETECTED".bold().fg(Color::Green)),
            Line::from(""),
            Line::from("No probe triggered a SQL error signature or reflected an XSS payload."),
        ]);
        frame.render_widget(Paragraph::new(clean).alignment(Alignment::Center), inner_area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Min(0)])
        .split(inner_area);

    let items: Vec<ListItem> = app
        .findings()
        .iter()
        .map(|finding| {
            let detail = knowledge_base::get_finding_detail(finding.kind);
            let category_prefix = match detail.map(|d| d.category) {
                Some(FindingCategory::CrossSiteScripting) => "[XSS] ",
                Some(FindingCategory::Injection) => "[SQLi] ",
                None => "",
            };
            ListItem::new(Line::from(vec![
                Span::styled(category_prefix, Style::default().fg(Color::DarkGray)),
                Span::styled(finding.kind.to_string(), Style::default().fg(Color::Red)),
                Span::raw(format!(" {} ", finding.method)),
                Span::styled(finding.url.clone(), Style::default().fg(Color::Cyan)),
            ]))
        })
        .collect();

    let findings_list = List::new(items)
        .highlight_style(Style::new().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
    frame.render_stateful_widget(findings_list, chunks[0], &mut app.analysis_list_state);

    let detail_block = Block::default().borders(Borders::TOP).title("Details");
    let selected = app
        .analysis_list_state
        .selected()
        .and_then(|index| app.findings().get(index));
    let Some(finding) = selected else {
        let hint = Paragraph::new("Select an item above to see details.")
            .alignment(Alignment::Center)
            .block(detail_block);
        frame.render_widget(hint, chunks[1]);
        return;
    };

    let mut text = vec![
        Line::from(vec!["Payload:  ".yellow().bold(), Span::raw(finding.payload.clone())]),
        Line::from(vec!["Evidence: ".yellow().bold(), Span::raw(finding.evidence.clone())]),
    ];
    if let Some(detail) = knowledge_base::get_finding_detail(finding.kind) {
        text.extend([
            Line::from(""),
            Line::from(format!("{} ({})", detail.title, detail.cwe).bold()),
            Line::from(""),
            Line::from("WHAT IT IS:".yellow().bold()),
            Line::from(detail.description),
            Line::from(""),
            Line::from("HOW TO FIX:".yellow().bold()),
            Line::from(detail.remediation),
        ]);
    }
    let p = Paragraph::new(text).wrap(Wrap { trim: true }).block(detail_block);
    frame.render_widget(p, chunks[1]);
}
