mod app;
mod dispatch;
mod input;
mod layout;
mod list;
mod panels;
mod render;
mod status_bar;

use std::time::Duration;

use crossterm::event::KeyEvent;
use ratatui::layout::Rect;

use crate::gcloud::{Configuration, Instance};
use crate::history::Connection;
use crate::inventory::Snapshot;

pub use app::App;
pub use dispatch::{Backend, Dispatcher};
pub use input::TextInput;
pub use layout::PanelLayout;
pub use list::{FilterState, ListEntry, SelectableList};
pub use panels::{ConfigurationPanel, HistoryPanel, InstancePanel, Panel, PanelState};
pub use status_bar::{shortcuts, Shortcut};

/// Delay between a speed-dial highlight and the connection it triggers.
pub const SPEED_DIAL_DELAY: Duration = Duration::from_millis(500);

/// Interval of the background instance/history refresh.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// The three focusable panels, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelId {
    #[default]
    Configurations,
    Instances,
    History,
}

impl PanelId {
    pub const ALL: [PanelId; 3] = [
        PanelId::Configurations,
        PanelId::Instances,
        PanelId::History,
    ];

    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            PanelId::Configurations => "Configurations",
            PanelId::Instances => "Instances",
            PanelId::History => "History",
        }
    }

    fn position(self) -> usize {
        match self {
            PanelId::Configurations => 0,
            PanelId::Instances => 1,
            PanelId::History => 2,
        }
    }
}

/// Messages handled by the root coordinator
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Key(KeyEvent),
    Resized { width: u16, height: u16 },
    /// Region sizes recomputed after a resize.
    LayoutComputed(PanelLayout),
    Tick,
    /// Deliver a message to one panel.
    ToPanel(PanelId, PanelMsg),
    FilteringChanged(bool),
    ConfigurationSelected(Configuration),
    InstanceSelected {
        configuration: String,
        instance: Instance,
    },
    ConnectionSelected(Connection),
}

/// Shared panel vocabulary; each panel matches it exhaustively
#[derive(Debug, Clone, PartialEq)]
pub enum PanelMsg {
    Focus,
    Blur,
    Resize(Rect),
    Key(KeyEvent),
    /// Enter filter-text mode (instances).
    BeginFilter,
    /// Re-list instances of a configuration.
    Refresh { configuration: String, force: bool },
    /// Re-list configurations or history.
    Reload,
    ConfigurationsLoaded(Vec<Configuration>),
    InstancesLoaded(Snapshot),
    HistoryLoaded(Vec<Connection>),
    Error(String),
    /// Truncate history.
    Clear,
    /// Select the n-th most recent connection.
    SpeedDial(usize),
}

/// Work requested by a state transition; executed by the [`Dispatcher`]
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Enqueue a follow-up message.
    Send(Message),
    SendAfter(Duration, Message),
    ComputeLayout { width: u16, height: u16 },
    LoadConfigurations,
    ActivateConfiguration(String),
    LoadInstances { configuration: String, force: bool },
    LoadHistory,
    ClearHistory,
}

/// How one run of the picker ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Quit,
    Connect {
        configuration: String,
        instance: Instance,
    },
}
