use crossterm::event::{Event, KeyCode, KeyEvent};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{event, execute};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::warn;

use crate::api::ApiClient;
use crate::cli::ExitError;
use crate::commands::{api_exit, owner, tenant};
use crate::domain::{ApplicationStatus, Decision, Role, User};
use crate::session::SessionStore;
use crate::stats;

/// Role-gated dashboard. The snapshot is fetched before the terminal is taken
/// over; the key loop only navigates and picks one action, which runs after
/// the terminal is restored.
pub async fn cmd_tui(api: &ApiClient, store: &SessionStore) -> Result<(), ExitError> {
    let Some(user) = store.user() else {
        return Err(ExitError::new(3, "not_logged_in: run `rently login` first"));
    };
    let token = store
        .token()
        .ok_or_else(|| ExitError::new(3, "not_logged_in: run `rently login` first"))?;

    match user.role {
        Role::Owner => owner_board(api, user, token).await,
        Role::Tenant => tenant_board(api, user, token).await,
    }
}

async fn owner_board(api: &ApiClient, user: &User, token: &str) -> Result<(), ExitError> {
    let properties = api.owner_properties(token).await.map_err(api_exit)?;

    struct Row {
        request_id: String,
        label: String,
    }
    let mut rows = Vec::new();
    for p in &properties {
        for req in p
            .requests
            .iter()
            .filter(|r| r.status == ApplicationStatus::Pending)
        {
            let (who, email) = req
                .tenant
                .as_ref()
                .map(|t| (t.name.as_str(), t.email.as_str()))
                .unwrap_or(("unknown", "-"));
            rows.push(Row {
                request_id: req.id.clone(),
                label: format!("{} · {who} <{email}>", p.title),
            });
        }
    }

    if rows.is_empty() {
        println!("no pending requests");
        return Ok(());
    }

    let title = format!(
        "{} · {} properties · {} pending · {} active tenants",
        user.name,
        properties.len(),
        stats::pending_request_count(&properties),
        stats::active_tenant_count(&properties),
    );
    let items: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();
    let outcome = run_picker(
        &title,
        &items,
        "j/k: move · Enter: accept · r: reject · q/Esc: quit",
    )?;

    match outcome {
        PickOutcome::Quit => Ok(()),
        PickOutcome::Primary(i) => {
            owner::submit_decision(api, token, &rows[i].request_id, Decision::Accepted).await
        }
        PickOutcome::Secondary(i) => {
            owner::submit_decision(api, token, &rows[i].request_id, Decision::Rejected).await
        }
    }
}

async fn tenant_board(api: &ApiClient, user: &User, token: &str) -> Result<(), ExitError> {
    let (properties, applications) = tokio::join!(api.explore(token), api.applications(token));
    let properties = properties.map_err(api_exit)?;
    let applications = match applications {
        Ok(a) => a,
        Err(e) => {
            warn!(error = %e, "fetch applications failed");
            Vec::new()
        }
    };

    if properties.is_empty() {
        println!("nothing to explore");
        return Ok(());
    }

    let derived = stats::tenant_stats(&properties, &applications);
    let title = format!(
        "{} · {} available · {} pending · {} approved",
        user.name, derived.total_properties, derived.pending, derived.approved,
    );
    let items: Vec<String> = properties
        .iter()
        .map(|p| {
            let marker = if stats::is_applied(&applications, &p.id) {
                "  [applied]"
            } else {
                ""
            };
            format!("{} · {}{marker}", p.title, p.address)
        })
        .collect();
    let outcome = run_picker(&title, &items, "j/k: move · Enter: apply · q/Esc: quit")?;

    match outcome {
        PickOutcome::Quit | PickOutcome::Secondary(_) => Ok(()),
        PickOutcome::Primary(i) => {
            let property = &properties[i];
            if stats::is_applied(&applications, &property.id) {
                eprintln!("already applied to {}", property.title);
                return Ok(());
            }
            tenant::submit_application(api, token, &property.id).await
        }
    }
}

enum PickOutcome {
    Quit,
    Primary(usize),
    Secondary(usize),
}

fn run_picker(title: &str, items: &[String], help: &str) -> Result<PickOutcome, ExitError> {
    let mut stdout = io::stdout();
    enable_raw_mode().map_err(|e| ExitError::new(2, format!("{e}")))?;
    execute!(stdout, EnterAlternateScreen).map_err(|e| ExitError::new(2, format!("{e}")))?;

    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| ExitError::new(2, format!("{e}")))?;

    let mut picker = Picker::new(title, items, help);
    let outcome = picker.run_loop(&mut terminal);

    // Restore terminal.
    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();

    Ok(outcome)
}

struct Picker {
    title: String,
    help: String,
    items: Vec<String>,
    list_state: ListState,
    focus: usize,
}

impl Picker {
    fn new(title: &str, items: &[String], help: &str) -> Self {
        let mut s = Self {
            title: title.to_string(),
            help: help.to_string(),
            items: items.to_vec(),
            list_state: ListState::default(),
            focus: 0,
        };
        s.list_state.select(Some(0));
        s
    }

    fn run_loop(
        &mut self,
        terminal: &mut Terminal<ratatui::backend::CrosstermBackend<Stdout>>,
    ) -> PickOutcome {
        loop {
            terminal.draw(|f| self.ui(f)).ok();

            if !event::poll(Duration::from_millis(200)).unwrap_or(false) {
                continue;
            }

            let Ok(Event::Key(key)) = event::read() else {
                continue;
            };
            if let Some(outcome) = self.handle_key(key) {
                return outcome;
            }
        }
    }

    fn ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(f.area());

        let title = Paragraph::new(self.title.clone())
            .block(Block::default().borders(Borders::ALL).title("rently"));
        f.render_widget(title, chunks[0]);

        let items: Vec<ListItem<'_>> = self
            .items
            .iter()
            .map(|label| ListItem::new(Line::from(Span::raw(label.clone()))))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
            .highlight_symbol(">");
        f.render_stateful_widget(list, chunks[1], &mut self.list_state);

        let help = Paragraph::new(self.help.clone())
            .block(Block::default().borders(Borders::ALL).title("Help"));
        f.render_widget(help, chunks[2]);
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<PickOutcome> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Some(PickOutcome::Quit),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => self.next(),
            KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => self.prev(),
            KeyCode::Enter => return Some(PickOutcome::Primary(self.focus)),
            KeyCode::Char('r') => return Some(PickOutcome::Secondary(self.focus)),
            _ => {}
        }
        self.list_state.select(Some(self.focus));
        None
    }

    fn next(&mut self) {
        self.focus = (self.focus + 1).min(self.items.len().saturating_sub(1));
    }

    fn prev(&mut self) {
        if self.focus == 0 {
            return;
        }
        self.focus -= 1;
    }
}
