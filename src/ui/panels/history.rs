use crossterm::event::KeyCode;

use super::{Panel, PanelState};
use crate::history::Connection;
use crate::ui::list::{ListEntry, SelectableList};
use crate::ui::{Command, Message, PanelId, PanelMsg, SPEED_DIAL_DELAY};

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

impl ListEntry for Connection {
    fn title(&self) -> String {
        if self.has_speed_dial() {
            format!("[{}] {}", self.index, self.instance.name)
        } else {
            self.instance.name.clone()
        }
    }

    fn description(&self) -> String {
        format!(
            "{} - {} - {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.configuration,
            self.instance.zone_name()
        )
    }

    fn filter_key(&self) -> &str {
        &self.instance.name
    }
}

#[derive(Debug, Default)]
pub struct HistoryPanel {
    state: PanelState,
    list: SelectableList<Connection>,
}

impl HistoryPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> &SelectableList<Connection> {
        &self.list
    }

    /// Highlight rank `rank` and connect to it shortly after.
    fn speed_dial(&mut self, rank: usize) -> Vec<Command> {
        if rank >= self.list.visible_len() {
            return Vec::new();
        }
        self.list.select(rank);
        match self.list.selected_item() {
            Some(conn) => {
                tracing::debug!("Speed dial {} -> {}", rank, conn.instance.name);
                vec![Command::SendAfter(
                    SPEED_DIAL_DELAY,
                    Message::ConnectionSelected(conn.clone()),
                )]
            }
            None => Vec::new(),
        }
    }
}

impl Panel for HistoryPanel {
    fn id(&self) -> PanelId {
        PanelId::History
    }

    fn init(&mut self) -> Vec<Command> {
        vec![Command::LoadHistory]
    }

    fn update(&mut self, msg: PanelMsg) -> Vec<Command> {
        match msg {
            PanelMsg::Focus => self.state.focused = true,
            PanelMsg::Blur => self.state.focused = false,
            PanelMsg::Resize(area) => {
                self.state.area = area;
                self.list.set_viewport(self.state.list_area(0));
            }
            PanelMsg::Error(e) => self.state.fail(e),
            PanelMsg::Reload => return vec![Command::LoadHistory],
            PanelMsg::Clear => return vec![Command::ClearHistory],
            PanelMsg::HistoryLoaded(connections) => {
                self.state.error = None;
                self.list.set_items(connections);
            }
            PanelMsg::SpeedDial(rank) => return self.speed_dial(rank),
            PanelMsg::Key(key) => {
                if key.code == KeyCode::Enter {
                    return self
                        .list
                        .selected_item()
                        .map(|conn| vec![Command::Send(Message::ConnectionSelected(conn.clone()))])
                        .unwrap_or_default();
                }
                self.list.handle_key(key);
            }
            PanelMsg::BeginFilter
            | PanelMsg::Refresh { .. }
            | PanelMsg::ConfigurationsLoaded(_)
            | PanelMsg::InstancesLoaded(_) => {}
        }
        Vec::new()
    }

    fn state(&self) -> &PanelState {
        &self.state
    }
}
