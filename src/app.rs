use crate::config::Config;
use crate::db::Database;
use crate::event::{Event, EventHandler};
use crate::tracker::CachedTrackerClient;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::renderfns::{draw_footer, draw_header};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{DaysOffView, IterationListView, ReleaseListView, StandupView};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::{stdout, Stdout};
use std::time::Duration;
use tracing::{info, warn};

/// Main application state
///
/// Owns the view stack and the shared clients. Views are trait objects;
/// the App only routes keys, executes the actions they return, and hands
/// them the tick for query polling.
pub struct App {
  config: Config,

  /// Product whose releases and iterations are shown
  product: String,

  /// Tracker host shown in the header
  domain: String,

  tracker: CachedTrackerClient,
  db: Database,

  /// Navigation stack. `:` commands replace the root, Enter pushes
  /// detail views on top.
  views: Vec<Box<dyn View>>,

  /// Command palette overlay, opened with `:`
  command_input: CommandInput,

  should_quit: bool,
}

impl App {
  pub fn new(config: Config, product_override: Option<String>) -> Result<Self> {
    let product = product_override
      .or_else(|| config.default_product.clone())
      .ok_or_else(|| {
        eyre!("No product configured: set default_product in the config file or pass --product")
      })?;

    let tracker = CachedTrackerClient::new(&config)?;
    let db = Database::open()?;

    let domain = config
      .tracker_domain()
      .unwrap_or_else(|| config.tracker.url.clone());

    let root: Box<dyn View> = Box::new(ReleaseListView::new(product.clone(), tracker.clone()));

    Ok(Self {
      config,
      product,
      domain,
      tracker,
      db,
      views: vec![root],
      command_input: CommandInput::new(),
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Restore the terminal even if the loop errored
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
  }

  async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(250));

    while !self.should_quit {
      terminal.draw(|frame| self.draw(frame))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => {
          if let Some(view) = self.views.last_mut() {
            view.tick();
          }
        }
        None => break,
      }
    }

    Ok(())
  }

  fn handle_key(&mut self, key: KeyEvent) {
    // Ctrl-C quits regardless of what has focus
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    // The command palette sees keys first: it swallows everything while
    // open, and claims `:` to open itself
    match self.command_input.handle_key(key) {
      KeyResult::Handled => return,
      KeyResult::Event(CommandEvent::Submitted(cmd)) => {
        self.execute_command(&cmd);
        return;
      }
      KeyResult::Event(CommandEvent::Cancelled) => return,
      KeyResult::NotHandled => {}
    }

    let action = match self.views.last_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::None,
    };

    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.views.push(view),
      ViewAction::Pop => {
        // Popping the last view exits the app
        if self.views.len() > 1 {
          self.views.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  fn execute_command(&mut self, cmd: &str) {
    match cmd {
      "releases" => {
        let view = ReleaseListView::new(self.product.clone(), self.tracker.clone());
        self.switch_root(Box::new(view));
      }
      "iterations" => {
        let view =
          IterationListView::new(self.product.clone(), self.tracker.clone(), self.db.clone());
        self.switch_root(Box::new(view));
      }
      "standup" => self.switch_root(Box::new(StandupView::new(self.db.clone()))),
      "daysoff" => self.switch_root(Box::new(DaysOffView::new(self.db.clone()))),
      "refresh" => self.refresh_all(),
      "quit" => self.should_quit = true,
      "" => {}
      other => warn!(command = other, "Unknown command"),
    }
  }

  /// Replace the whole stack with a new root view
  fn switch_root(&mut self, view: Box<dyn View>) {
    self.views.clear();
    self.views.push(view);
  }

  /// Drop every cached tracker response and reload the current view
  fn refresh_all(&mut self) {
    self.tracker.clear_cache();
    info!("Response cache cleared, refetching current view");
    if let Some(view) = self.views.last_mut() {
      view.refresh();
    }
  }

  fn draw(&mut self, frame: &mut Frame) {
    let chunks = Layout::vertical([
      Constraint::Length(1),
      Constraint::Min(0),
      Constraint::Length(1),
    ])
    .split(frame.area());

    draw_header(
      frame,
      chunks[0],
      &self.domain,
      &self.product,
      self.config.title.as_deref(),
    );

    let breadcrumb: Vec<String> = self.views.iter().map(|v| v.breadcrumb_label()).collect();
    let shortcuts = match self.views.last() {
      Some(view) => view.shortcuts(),
      None => Vec::new(),
    };

    if let Some(view) = self.views.last_mut() {
      view.render(frame, chunks[1]);
    }

    draw_footer(frame, chunks[2], &breadcrumb, &shortcuts);

    // Drawn last so the palette sits above whatever the view rendered
    self.command_input.render_overlay(frame, chunks[1]);
  }
}
