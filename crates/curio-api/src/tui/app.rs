//! Application state and event loop.

use super::ui;
use super::worker::{spawn_lookup_worker, LookupOutcome, LookupRequest};
use crate::facets;
use crate::{Lookup, Record, ResultEnvelope};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, widgets::ListState, Terminal};
use std::io::{self, Stdout};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

/// Single-line text input with a byte-indexed cursor.
#[derive(Default, Clone)]
pub struct TextInput {
    pub text: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn delete_char_before(&mut self) {
        if self.cursor > 0 {
            let prev = self.text[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.text.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete_char_at(&mut self) {
        if self.cursor < self.text.len() {
            let next = self.text[self.cursor..]
                .chars()
                .next()
                .map(|c| self.cursor + c.len_utf8())
                .unwrap_or(self.cursor);
            self.text.drain(self.cursor..next);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.text[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.len() {
            self.cursor = self.text[self.cursor..]
                .chars()
                .next()
                .map(|c| self.cursor + c.len_utf8())
                .unwrap_or(self.text.len());
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Handle a key event; returns true if consumed.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let has_ctrl = modifiers.contains(KeyModifiers::CONTROL);
        match code {
            KeyCode::Char('u') if has_ctrl => self.clear(),
            KeyCode::Char('a') if has_ctrl => self.cursor = 0,
            KeyCode::Char('e') if has_ctrl => self.cursor = self.text.len(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.text.len(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Backspace => self.delete_char_before(),
            KeyCode::Delete => self.delete_char_at(),
            KeyCode::Char(c) if !has_ctrl && !modifiers.contains(KeyModifiers::ALT) => {
                self.insert_char(c)
            }
            _ => return false,
        }
        true
    }
}

/// Facet the search form submits against. Cycled with Ctrl+F.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryField {
    Title,
    Person,
    Culture,
    Technique,
    Medium,
}

impl QueryField {
    pub const ALL: &'static [QueryField] = &[
        QueryField::Title,
        QueryField::Person,
        QueryField::Culture,
        QueryField::Technique,
        QueryField::Medium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryField::Title => "Title",
            QueryField::Person => "Person",
            QueryField::Culture => "Culture",
            QueryField::Technique => "Technique",
            QueryField::Medium => "Medium",
        }
    }

    pub fn next(&self) -> QueryField {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Which pane Enter and the arrow keys act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Results,
    Feature,
}

/// The shared UI state: one instance, owned by [`App`], mutated only
/// through these methods. Mutations are whole-field replacements.
pub struct UiState {
    busy: bool,
    results: ResultEnvelope,
    featured: Option<Record>,
}

impl UiState {
    fn new() -> Self {
        Self {
            busy: false,
            results: ResultEnvelope::default(),
            featured: None,
        }
    }

    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn results(&self) -> &ResultEnvelope {
        &self.results
    }

    pub fn featured(&self) -> Option<&Record> {
        self.featured.as_ref()
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn set_results(&mut self, results: ResultEnvelope) {
        self.results = results;
    }

    pub fn set_featured(&mut self, featured: Option<Record>) {
        self.featured = featured;
    }
}

/// Root of the view tree: owns the state and the worker channels, wires
/// key events to the panes.
pub struct App {
    pub state: UiState,
    pub search_input: TextInput,
    pub field: QueryField,
    pub focus: Focus,
    pub list_state: ListState,
    /// Cursor into the featured record's search links.
    pub link_cursor: usize,
    pub should_quit: bool,
    /// Set when `busy` last flipped on; drives the spinner frame.
    pub busy_since: Instant,
    req_tx: Sender<LookupRequest>,
    outcome_rx: Receiver<LookupOutcome>,
}

impl App {
    pub fn new(client: Box<dyn Lookup + Send>) -> Self {
        let (req_tx, req_rx) = mpsc::channel();
        let (outcome_tx, outcome_rx) = mpsc::channel();
        spawn_lookup_worker(client, req_rx, outcome_tx);
        Self::from_channels(req_tx, outcome_rx)
    }

    pub(crate) fn from_channels(
        req_tx: Sender<LookupRequest>,
        outcome_rx: Receiver<LookupOutcome>,
    ) -> Self {
        Self {
            state: UiState::new(),
            search_input: TextInput::default(),
            field: QueryField::Title,
            focus: Focus::Search,
            list_state: ListState::default(),
            link_cursor: 0,
            should_quit: false,
            busy_since: Instant::now(),
            req_tx,
            outcome_rx,
        }
    }

    /// Initiate a lookup: busy goes true before the collaborator is
    /// invoked. If the worker is gone the flag is released immediately so
    /// the UI cannot wedge in the busy state.
    pub fn begin_lookup(&mut self, request: LookupRequest) {
        self.state.set_busy(true);
        self.busy_since = Instant::now();
        if self.req_tx.send(request).is_err() {
            log::error!("lookup worker is gone; dropping request");
            self.state.set_busy(false);
        }
    }

    /// Submit the search form.
    pub fn activate_search(&mut self) {
        let value = self.search_input.text.trim().to_string();
        if value.is_empty() {
            return;
        }
        self.begin_lookup(LookupRequest::Facet {
            field: self.field.as_str().to_string(),
            value,
        });
    }

    /// Activate the focused search link in the feature pane.
    pub fn activate_link(&mut self) {
        let Some(record) = self.state.featured() else {
            return;
        };
        let links = facets::search_links(record);
        let Some(link) = links.get(self.link_cursor) else {
            return;
        };
        let request = LookupRequest::Facet {
            field: link.field.clone(),
            value: link.value.clone(),
        };
        self.begin_lookup(request);
    }

    /// Feature the record currently selected in the preview list. No
    /// async involved; `results` and `busy` are untouched.
    pub fn feature_selected(&mut self) {
        let Some(idx) = self.list_state.selected() else {
            return;
        };
        if let Some(record) = self.state.results().records.get(idx).cloned() {
            self.state.set_featured(Some(record));
            self.link_cursor = 0;
        }
    }

    pub fn next_page(&mut self) {
        if let Some(url) = self.state.results().info.next.clone() {
            self.begin_lookup(LookupRequest::Page { url });
        }
    }

    pub fn prev_page(&mut self) {
        if let Some(url) = self.state.results().info.prev.clone() {
            self.begin_lookup(LookupRequest::Page { url });
        }
    }

    /// Apply settled lookups, in arrival order. On success the envelope
    /// replaces `results` wholesale; on failure the state is left alone and
    /// the error goes to the log. Either way the busy flag clears — with
    /// overlapping lookups the last settle wins, and busy can read false
    /// while an earlier lookup is still in flight (accepted limitation).
    pub fn poll_outcomes(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            match outcome.result {
                Ok(envelope) => {
                    self.state.set_results(envelope);
                    if self.state.results().records.is_empty() {
                        self.list_state.select(None);
                    } else {
                        self.list_state.select(Some(0));
                    }
                }
                Err(e) => log::error!("lookup failed: {e}"),
            }
            self.state.set_busy(false);
        }
    }

    fn scroll_results(&mut self, delta: isize) {
        let len = self.state.results().records.len();
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        let next = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            (current + delta as usize).min(len - 1)
        };
        self.list_state.select(Some(next));
    }

    fn scroll_links(&mut self, delta: isize) {
        let Some(record) = self.state.featured() else {
            return;
        };
        let len = facets::search_links(record).len();
        if len == 0 {
            return;
        }
        self.link_cursor = if delta < 0 {
            self.link_cursor.saturating_sub(delta.unsigned_abs())
        } else {
            (self.link_cursor + delta as usize).min(len - 1)
        };
    }

    fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Search => Focus::Results,
            Focus::Results => Focus::Feature,
            Focus::Feature => Focus::Search,
        };
    }

    pub fn handle_event(&mut self, event: Event) {
        let Event::Key(key) = event else { return };
        if key.kind != KeyEventKind::Press {
            return;
        }
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            (KeyCode::Tab, _) => self.cycle_focus(),
            (KeyCode::Char('f'), KeyModifiers::CONTROL) => self.field = self.field.next(),
            (KeyCode::PageDown, _) | (KeyCode::Char('n'), KeyModifiers::CONTROL) => {
                self.next_page()
            }
            (KeyCode::PageUp, _) | (KeyCode::Char('p'), KeyModifiers::CONTROL) => self.prev_page(),
            (KeyCode::Up, _) => match self.focus {
                Focus::Results => self.scroll_results(-1),
                Focus::Feature => self.scroll_links(-1),
                Focus::Search => {}
            },
            (KeyCode::Down, _) => match self.focus {
                Focus::Results => self.scroll_results(1),
                Focus::Feature => self.scroll_links(1),
                Focus::Search => {}
            },
            (KeyCode::Enter, _) => match self.focus {
                Focus::Search => self.activate_search(),
                Focus::Results => self.feature_selected(),
                Focus::Feature => self.activate_link(),
            },
            _ => {
                if self.focus == Focus::Search {
                    self.search_input.handle_key(key.code, key.modifiers);
                }
            }
        }
    }
}

/// Run the browse TUI. An optional initial lookup seeds the result list.
pub fn run(client: Box<dyn Lookup + Send>, initial: Option<(String, String)>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client);
    if let Some((field, value)) = initial {
        app.begin_lookup(LookupRequest::Facet { field, value });
    }

    let result = run_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    const TICK: Duration = Duration::from_millis(50);

    loop {
        while event::poll(Duration::from_millis(0))? {
            let ev = event::read()?;
            app.handle_event(ev);
            if app.should_quit {
                return Ok(());
            }
        }

        app.poll_outcomes();
        terminal.draw(|f| ui::render(f, app))?;

        // Keep the spinner ticking without pegging a core.
        std::thread::sleep(TICK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::worker::tests::ScriptedLookup;
    use crate::{LookupError, PageInfo, Person};
    use std::sync::mpsc;

    fn harness() -> (App, Receiver<LookupRequest>, Sender<LookupOutcome>) {
        let (req_tx, req_rx) = mpsc::channel();
        let (outcome_tx, outcome_rx) = mpsc::channel();
        (App::from_channels(req_tx, outcome_rx), req_rx, outcome_tx)
    }

    fn envelope(total: i64, titles: &[&str]) -> ResultEnvelope {
        ResultEnvelope {
            info: PageInfo {
                totalrecords: Some(total),
                ..Default::default()
            },
            records: titles
                .iter()
                .map(|t| Record {
                    title: Some(t.to_string()),
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn decode_error() -> LookupError {
        serde_json::from_str::<ResultEnvelope>("nope").unwrap_err().into()
    }

    #[test]
    fn search_sets_busy_before_the_lookup_settles() {
        let (mut app, req_rx, _outcome_tx) = harness();
        app.field = QueryField::Culture;
        app.search_input.text = "Dutch".to_string();

        assert!(!app.state.busy());
        app.activate_search();
        assert!(app.state.busy());

        let request = req_rx.try_recv().unwrap();
        assert_eq!(
            request,
            LookupRequest::Facet {
                field: "Culture".into(),
                value: "Dutch".into()
            }
        );
    }

    #[test]
    fn success_replaces_results_and_clears_busy() {
        let (mut app, _req_rx, outcome_tx) = harness();
        app.search_input.text = "vase".to_string();
        app.activate_search();

        outcome_tx
            .send(LookupOutcome {
                result: Ok(envelope(3, &["r1", "r2", "r3"])),
            })
            .unwrap();
        app.poll_outcomes();

        assert!(!app.state.busy());
        assert_eq!(app.state.results().info.totalrecords, Some(3));
        assert_eq!(app.state.results().records.len(), 3);
        // Selection lands on the first record of the new result set.
        assert_eq!(app.list_state.selected(), Some(0));
        assert!(app.state.featured().is_none());
    }

    #[test]
    fn failure_leaves_results_untouched_and_clears_busy() {
        let (mut app, _req_rx, outcome_tx) = harness();
        app.search_input.text = "vase".to_string();
        app.activate_search();
        outcome_tx
            .send(LookupOutcome {
                result: Ok(envelope(2, &["r1", "r2"])),
            })
            .unwrap();
        app.poll_outcomes();

        app.activate_search();
        assert!(app.state.busy());
        outcome_tx
            .send(LookupOutcome {
                result: Err(decode_error()),
            })
            .unwrap();
        app.poll_outcomes();

        assert!(!app.state.busy());
        assert_eq!(app.state.results().info.totalrecords, Some(2));
        assert_eq!(app.state.results().records.len(), 2);
    }

    #[test]
    fn empty_search_is_a_no_op() {
        let (mut app, req_rx, _outcome_tx) = harness();
        app.search_input.text = "   ".to_string();
        app.activate_search();
        assert!(!app.state.busy());
        assert!(req_rx.try_recv().is_err());
    }

    #[test]
    fn featuring_a_record_is_synchronous() {
        let (mut app, req_rx, outcome_tx) = harness();
        app.search_input.text = "vase".to_string();
        app.activate_search();
        outcome_tx
            .send(LookupOutcome {
                result: Ok(envelope(2, &["first", "second"])),
            })
            .unwrap();
        app.poll_outcomes();
        // Drain the search request so we can assert nothing else is sent.
        let _ = req_rx.try_recv();

        app.list_state.select(Some(1));
        app.feature_selected();

        assert_eq!(app.state.featured().unwrap().title.as_deref(), Some("second"));
        assert!(!app.state.busy());
        assert!(req_rx.try_recv().is_err());
    }

    #[test]
    fn pagination_follows_the_token_and_leaves_featured_alone() {
        let (mut app, req_rx, outcome_tx) = harness();
        let mut first = envelope(4, &["a", "b"]);
        first.info.next = Some("https://api.example.org/object?page=2".to_string());
        app.state.set_results(first);
        app.list_state.select(Some(0));
        app.feature_selected();

        app.next_page();
        assert!(app.state.busy());
        assert_eq!(
            req_rx.try_recv().unwrap(),
            LookupRequest::Page {
                url: "https://api.example.org/object?page=2".into()
            }
        );

        outcome_tx
            .send(LookupOutcome {
                result: Ok(envelope(4, &["c", "d"])),
            })
            .unwrap();
        app.poll_outcomes();

        assert!(!app.state.busy());
        assert_eq!(app.state.results().records[0].title.as_deref(), Some("c"));
        assert_eq!(app.state.featured().unwrap().title.as_deref(), Some("a"));
    }

    #[test]
    fn pagination_without_a_token_does_nothing() {
        let (mut app, req_rx, _outcome_tx) = harness();
        app.next_page();
        app.prev_page();
        assert!(!app.state.busy());
        assert!(req_rx.try_recv().is_err());
    }

    #[test]
    fn link_activation_uses_the_link_search_value() {
        let (mut app, req_rx, _outcome_tx) = harness();
        app.state.set_featured(Some(Record {
            medium: Some("OIL PAINT".to_string()),
            ..Default::default()
        }));
        app.link_cursor = 0;
        app.activate_link();

        assert!(app.state.busy());
        assert_eq!(
            req_rx.try_recv().unwrap(),
            LookupRequest::Facet {
                field: "Medium".into(),
                value: "oil paint".into()
            }
        );
    }

    #[test]
    fn person_links_target_the_displayname() {
        let (mut app, req_rx, _outcome_tx) = harness();
        app.state.set_featured(Some(Record {
            culture: Some("Dutch".to_string()),
            people: vec![Person {
                displayname: Some("Rembrandt van Rijn".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }));
        app.link_cursor = 1;
        app.activate_link();

        assert_eq!(
            req_rx.try_recv().unwrap(),
            LookupRequest::Facet {
                field: "Person".into(),
                value: "Rembrandt van Rijn".into()
            }
        );
    }

    #[test]
    fn end_to_end_search_through_the_worker() {
        let client = ScriptedLookup::new(vec![Ok(envelope(3, &["r1", "r2", "r3"]))]);
        let mut app = App::new(Box::new(client));
        app.field = QueryField::Culture;
        app.search_input.text = "Dutch".to_string();

        app.activate_search();
        assert!(app.state.busy());

        // Wait for the worker to settle, then apply outcomes as the event
        // loop would.
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.state.busy() {
            assert!(Instant::now() < deadline, "worker never settled");
            app.poll_outcomes();
            std::thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(app.state.results().info.totalrecords, Some(3));
        assert_eq!(app.state.results().records.len(), 3);
        assert!(app.state.featured().is_none());
    }

    #[test]
    fn field_cycling_wraps_around() {
        let mut field = QueryField::Title;
        for _ in 0..QueryField::ALL.len() {
            field = field.next();
        }
        assert_eq!(field, QueryField::Title);
    }

    #[test]
    fn text_input_edits_at_the_cursor() {
        let mut input = TextInput::default();
        for c in "vase".chars() {
            input.insert_char(c);
        }
        input.move_left();
        input.delete_char_before();
        assert_eq!(input.text, "vae");
        input.handle_key(KeyCode::Char('s'), KeyModifiers::NONE);
        assert_eq!(input.text, "vase");
        input.handle_key(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert_eq!(input.text, "");
    }
}
