use std::collections::VecDeque;
use std::io;

use crossterm::{
    event::{Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

use crate::error::Result;

use super::{
    dispatch::{Backend, Dispatcher},
    panels::{ConfigurationPanel, HistoryPanel, InstancePanel, Panel},
    Command, Message, Outcome, PanelId, PanelLayout, PanelMsg, TICK_INTERVAL,
};

/// Root coordinator: owns the panels, focus and filtering flags.
///
/// [`App::update`] is pure state transition; effects come back as
/// [`Command`]s for the [`Dispatcher`].
pub struct App {
    focus: PanelId,
    /// Mirrors the instance panel's text filter; suppresses global keys.
    filtering: bool,
    exited: bool,
    outcome: Option<Outcome>,
    selected_configuration: Option<String>,
    layout: PanelLayout,

    configurations: ConfigurationPanel,
    instances: InstancePanel,
    history: HistoryPanel,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        let mut app = Self {
            focus: PanelId::default(),
            filtering: false,
            exited: false,
            outcome: None,
            selected_configuration: None,
            layout: PanelLayout::default(),
            configurations: ConfigurationPanel::new(),
            instances: InstancePanel::new(),
            history: HistoryPanel::new(),
        };
        let focus = app.focus;
        app.set_focus(focus);
        app
    }

    pub fn focus(&self) -> PanelId {
        self.focus
    }

    pub fn is_filtering(&self) -> bool {
        self.filtering
    }

    pub fn exited(&self) -> bool {
        self.exited
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn selected_configuration(&self) -> Option<&str> {
        self.selected_configuration.as_deref()
    }

    pub fn layout(&self) -> &PanelLayout {
        &self.layout
    }

    pub fn configurations(&self) -> &ConfigurationPanel {
        &self.configurations
    }

    pub fn instances(&self) -> &InstancePanel {
        &self.instances
    }

    pub fn history(&self) -> &HistoryPanel {
        &self.history
    }

    /// Startup commands of every panel.
    pub fn init(&mut self) -> Vec<Command> {
        let commands = PanelId::ALL
            .into_iter()
            .flat_map(|id| self.panel_mut(id).init())
            .collect();
        self.settle(commands)
    }

    /// Apply `msg` and every follow-up message it enqueues; returns the
    /// commands that need the dispatcher.
    pub fn update(&mut self, msg: Message) -> Vec<Command> {
        self.settle(vec![Command::Send(msg)])
    }

    fn settle(&mut self, commands: Vec<Command>) -> Vec<Command> {
        let mut queue: VecDeque<Command> = commands.into();
        let mut effects = Vec::new();
        while let Some(command) = queue.pop_front() {
            match command {
                Command::Send(msg) => queue.extend(self.handle(msg)),
                other => effects.push(other),
            }
        }
        effects
    }

    fn handle(&mut self, msg: Message) -> Vec<Command> {
        match msg {
            Message::Key(key) => self.handle_key(key),
            Message::Resized { width, height } => vec![Command::ComputeLayout { width, height }],
            Message::LayoutComputed(layout) => {
                self.layout = layout;
                PanelId::ALL
                    .into_iter()
                    .flat_map(|id| self.route(id, PanelMsg::Resize(layout.panel(id))))
                    .collect()
            }
            Message::Tick => self.tick(),
            Message::ToPanel(id, msg) => self.route(id, msg),
            Message::FilteringChanged(filtering) => {
                self.filtering = filtering;
                Vec::new()
            }
            Message::ConfigurationSelected(configuration) => {
                tracing::debug!("Configuration selected: {}", configuration.name);
                self.selected_configuration = Some(configuration.name);
                Vec::new()
            }
            Message::InstanceSelected {
                configuration,
                instance,
            } => self.finish(Outcome::Connect {
                configuration,
                instance,
            }),
            Message::ConnectionSelected(conn) => self.finish(Outcome::Connect {
                configuration: conn.configuration,
                instance: conn.instance,
            }),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return self.quit();
        }

        // Filter text entry owns the keyboard.
        if self.filtering {
            return self.route(PanelId::Instances, PanelMsg::Key(key));
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.quit(),
            KeyCode::Tab => self.set_focus(self.focus.next()),
            KeyCode::BackTab => self.set_focus(self.focus.prev()),
            KeyCode::Char('/') => {
                let mut commands = self.set_focus(PanelId::Instances);
                self.filtering = true;
                commands.extend(self.route(PanelId::Instances, PanelMsg::BeginFilter));
                commands
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.reload(),
            KeyCode::Char('c') | KeyCode::Char('C') => self.route(PanelId::History, PanelMsg::Clear),
            KeyCode::Char(digit @ '0'..='9') => {
                let rank = usize::from(digit as u8 - b'0');
                self.route(PanelId::History, PanelMsg::SpeedDial(rank))
            }
            _ => self.route(self.focus, PanelMsg::Key(key)),
        }
    }

    /// Force-refresh the selected configuration's instances, and retry the
    /// configuration list when it failed or came back empty.
    fn reload(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.configurations.needs_reload() {
            tracing::info!("Reloading configurations");
            commands.extend(self.route(PanelId::Configurations, PanelMsg::Reload));
        }
        if let Some(configuration) = self.selected_configuration.clone() {
            tracing::info!("Reloading instances for [{}]", configuration);
            commands.extend(self.route(
                PanelId::Instances,
                PanelMsg::Refresh {
                    configuration,
                    force: true,
                },
            ));
        }
        commands
    }

    /// Background refresh of instances and history.
    fn tick(&mut self) -> Vec<Command> {
        if self.filtering {
            return Vec::new();
        }
        let mut commands = Vec::new();
        if let Some(configuration) = self.selected_configuration.clone() {
            commands.extend(self.route(
                PanelId::Instances,
                PanelMsg::Refresh {
                    configuration,
                    force: false,
                },
            ));
        }
        commands.extend(self.route(PanelId::History, PanelMsg::Reload));
        commands
    }

    fn set_focus(&mut self, focus: PanelId) -> Vec<Command> {
        self.focus = focus;
        PanelId::ALL
            .into_iter()
            .flat_map(|id| {
                let msg = if id == focus {
                    PanelMsg::Focus
                } else {
                    PanelMsg::Blur
                };
                self.route(id, msg)
            })
            .collect()
    }

    fn quit(&mut self) -> Vec<Command> {
        self.exited = true;
        self.finish(Outcome::Quit)
    }

    /// First terminal event wins; later ones are dropped.
    fn finish(&mut self, outcome: Outcome) -> Vec<Command> {
        if self.outcome.is_none() {
            self.outcome = Some(outcome);
        }
        Vec::new()
    }

    fn route(&mut self, id: PanelId, msg: PanelMsg) -> Vec<Command> {
        self.panel_mut(id).update(msg)
    }

    fn panel_mut(&mut self, id: PanelId) -> &mut dyn Panel {
        match id {
            PanelId::Configurations => &mut self.configurations,
            PanelId::Instances => &mut self.instances,
            PanelId::History => &mut self.history,
        }
    }

    /// Run the picker until something is selected or the user quits.
    pub async fn run(&mut self, backend: Backend) -> Result<Outcome> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal, backend).await;

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        backend: Backend,
    ) -> Result<Outcome> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(backend, tx);

        let (width, height) = crossterm::terminal::size()?;
        dispatcher.dispatch_all(self.update(Message::Resized { width, height }));
        dispatcher.dispatch_all(self.init());

        let mut events = EventStream::new();
        let mut ticker = interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick fires immediately; startup already loads everything.
        ticker.tick().await;

        loop {
            terminal.draw(|f| super::render::draw(f, self))?;

            if let Some(outcome) = self.outcome.take() {
                return Ok(outcome);
            }

            let msg = tokio::select! {
                event = events.next() => match event {
                    Some(Ok(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                        Message::Key(key)
                    }
                    Some(Ok(CrosstermEvent::Resize(width, height))) => {
                        Message::Resized { width, height }
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok(Outcome::Quit),
                },
                Some(msg) = rx.recv() => msg,
                _ = ticker.tick() => Message::Tick,
            };

            dispatcher.dispatch_all(self.update(msg));
        }
    }
}
