// src/app.rs

use ratatui::widgets::{ListState, ScrollbarState};
use vanguard_recon::core::error::ScanError;
use vanguard_recon::core::models::{
    Finding, HostRecord, HostStatistics, ScanOutcome, ScanPhase, ScanStatus, StatusReport,
};
use vanguard_recon::core::resolver::{parse_subnet, validate_target_url};
use ipnetwork::Ipv4Network;

pub const SPINNER_CHARS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub enum ExportStatus {
    Idle,
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Idle,
    Scanning,
    Finished,
}

/// What the target input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanRequest {
    Hosts(Option<Ipv4Network>),
    Web(String),
}

impl ScanRequest {
    /// `auto` (or nothing) sweeps the local network, a CIDR sweeps that
    /// subnet, an http(s) URL probes the web target.
    pub fn parse(input: &str) -> Result<Self, ScanError> {
        let input = input.trim();
        if input.is_empty() || input.eq_ignore_ascii_case("auto") {
            return Ok(ScanRequest::Hosts(None));
        }
        if input.contains("://") {
            return validate_target_url(input).map(|url| ScanRequest::Web(url.to_string()));
        }
        parse_subnet(input).map(|subnet| ScanRequest::Hosts(Some(subnet)))
    }
}

pub struct App {
    pub should_quit: bool,
    pub show_disclaimer: bool,
    pub state: AppState,
    pub input: String,
    /// Latest poll of the scan status.
    pub status: StatusReport,
    pub phase: ScanPhase,
    pub outcome: Option<ScanOutcome>,
    /// Rejection shown when a start request is refused.
    pub notice: Option<String>,
    pub spinner_frame: usize,
    pub scroll_offset: usize,
    pub report_scroll_state: ScrollbarState,
    pub analysis_list_state: ListState,
    pub export_status: ExportStatus,
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            show_disclaimer: true,
            state: AppState::Idle,
            input: String::new(),
            status: StatusReport::default(),
            phase: ScanPhase::Idle,
            outcome: None,
            notice: None,
            spinner_frame: 0,
            scroll_offset: 0,
            report_scroll_state: ScrollbarState::default(),
            analysis_list_state: ListState::default(),
            export_status: ExportStatus::Idle,
        }
    }

    pub fn on_tick(&mut self) {
        if self.state == AppState::Scanning {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len();
        }
    }

    /// Folds a status snapshot into the view. A terminal phase ends the
    /// scanning state.
    pub fn apply_snapshot(&mut self, snapshot: ScanStatus) {
        self.status = StatusReport::from(&snapshot);
        self.phase = snapshot.phase;
        if self.state != AppState::Scanning {
            return;
        }
        if matches!(snapshot.phase, ScanPhase::Done | ScanPhase::Error) {
            self.outcome = snapshot.results;
            self.state = AppState::Finished;
            self.scroll_offset = 0;
            let has_findings = !self.findings().is_empty();
            self.analysis_list_state.select(has_findings.then_some(0));
            self.report_scroll_state = ScrollbarState::new(self.row_count()).position(0);
        }
    }

    pub fn hosts(&self) -> &[HostRecord] {
        match &self.outcome {
            Some(ScanOutcome::Hosts(hosts)) => hosts,
            _ => &[],
        }
    }

    pub fn findings(&self) -> &[Finding] {
        match &self.outcome {
            Some(ScanOutcome::Vulnerabilities(report)) => &report.findings,
            _ => &[],
        }
    }

    pub fn host_statistics(&self) -> Option<HostStatistics> {
        match &self.outcome {
            Some(ScanOutcome::Hosts(hosts)) => Some(HostStatistics::from_hosts(hosts)),
            _ => None,
        }
    }

    fn row_count(&self) -> usize {
        self.hosts().len().max(self.findings().len())
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
        if !self.findings().is_empty() {
            self.analysis_list_state.select(Some(self.scroll_offset));
        }
        self.report_scroll_state = self.report_scroll_state.position(self.scroll_offset);
    }

    pub fn scroll_down(&mut self) {
        let last = self.row_count().saturating_sub(1);
        self.scroll_offset = self.scroll_offset.saturating_add(1).min(last);
        if !self.findings().is_empty() {
            self.analysis_list_state.select(Some(self.scroll_offset));
        }
        self.report_scroll_state = self.report_scroll_state.position(self.scroll_offset);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn reset(&mut self) {
        self.state = AppState::Idle;
        self.input = String::new();
        self.outcome = None;
        self.notice = None;
        self.spinner_frame = 0;
        self.scroll_offset = 0;
        self.report_scroll_state = ScrollbarState::default();
        self.analysis_list_state = ListState::default();
        self.export_status = ExportStatus::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vanguard_recon::core::models::ScanReport;

    #[test]
    fn input_selects_the_pipeline() {
        assert_eq!(ScanRequest::parse("").unwrap(), ScanRequest::Hosts(None));
        assert_eq!(ScanRequest::parse(" AUTO ").unwrap(), ScanRequest::Hosts(None));
        assert_eq!(
            ScanRequest::parse("10.1.2.3/24").unwrap(),
            ScanRequest::Hosts(Some("10.1.2.0/24".parse().unwrap()))
        );
        assert_eq!(
            ScanRequest::parse("http://testphp.vulnweb.com/listproducts.php?cat=1").unwrap(),
            ScanRequest::Web("http://testphp.vulnweb.com/listproducts.php?cat=1".to_string())
        );
        assert!(ScanRequest::parse("ftp://host").is_err());
        assert!(ScanRequest::parse("example.com").is_err());
    }

    #[test]
    fn terminal_snapshot_finishes_the_scan() {
        let mut app = App::new();
        app.state = AppState::Scanning;

        app.apply_snapshot(ScanStatus { phase: ScanPhase::Running, progress: 42, ..Default::default() });
        assert_eq!(app.state, AppState::Scanning);
        assert_eq!(app.status.progress, 42);

        app.apply_snapshot(ScanStatus {
            phase: ScanPhase::Done,
            progress: 100,
            results: Some(ScanOutcome::Vulnerabilities(ScanReport::new("http://t.test", Vec::new()))),
            ..Default::default()
        });
        assert_eq!(app.state, AppState::Finished);
        assert!(app.findings().is_empty());
        assert!(app.host_statistics().is_none());
        assert_eq!(app.analysis_list_state.selected(), None);
    }
}
