use super::{Panel, PanelState};
use crate::gcloud::Configuration;
use crate::ui::list::{ListEntry, SelectableList};
use crate::ui::{Command, Message, PanelId, PanelMsg};

use crossterm::event::KeyCode;

impl ListEntry for Configuration {
    fn title(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        format!("Account: {}, Project: {}", self.account, self.project)
    }

    fn filter_key(&self) -> &str {
        &self.name
    }
}

/// Lists gcloud configurations; the highlighted one drives the instance panel.
#[derive(Debug, Default)]
pub struct ConfigurationPanel {
    state: PanelState,
    list: SelectableList<Configuration>,
    /// Name last announced through `ConfigurationSelected`.
    highlighted: Option<String>,
}

impl ConfigurationPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> &SelectableList<Configuration> {
        &self.list
    }

    pub fn selected(&self) -> Option<&Configuration> {
        self.list.selected_item()
    }

    /// The list failed to load, or loaded with nothing to show.
    pub fn needs_reload(&self) -> bool {
        self.state.error.is_some() || (!self.state.loading && self.list.items().is_empty())
    }

    /// Announce a new highlight and point the instance panel at it.
    fn selection_changed(&mut self) -> Vec<Command> {
        let Some(current) = self.list.selected_item().cloned() else {
            return Vec::new();
        };
        if self.highlighted.as_deref() == Some(current.name.as_str()) {
            return Vec::new();
        }

        self.highlighted = Some(current.name.clone());
        let configuration = current.name.clone();
        vec![
            Command::Send(Message::ConfigurationSelected(current)),
            Command::Send(Message::ToPanel(
                PanelId::Instances,
                PanelMsg::Refresh {
                    configuration,
                    force: false,
                },
            )),
        ]
    }

    fn loaded(&mut self, configurations: Vec<Configuration>) -> Vec<Command> {
        self.state.loading = false;
        self.state.error = None;

        let active = configurations.iter().position(|c| c.active);
        self.list.set_items(configurations);
        if let Some(index) = active {
            self.list.select(index);
        }

        self.selection_changed()
    }
}

impl Panel for ConfigurationPanel {
    fn id(&self) -> PanelId {
        PanelId::Configurations
    }

    fn init(&mut self) -> Vec<Command> {
        self.state.loading = true;
        vec![Command::LoadConfigurations]
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
            PanelMsg::Reload => {
                self.state.loading = true;
                self.state.error = None;
                return vec![Command::LoadConfigurations];
            }
            PanelMsg::ConfigurationsLoaded(configurations) => return self.loaded(configurations),
            PanelMsg::Key(key) => {
                if key.code == KeyCode::Enter {
                    if let Some(selected) = self.list.selected_item() {
                        tracing::info!("Activating configuration [{}]", selected.name);
                        self.state.loading = true;
                        return vec![Command::ActivateConfiguration(selected.name.clone())];
                    }
                    return Vec::new();
                }
                self.list.handle_key(key);
                return self.selection_changed();
            }
            PanelMsg::BeginFilter
            | PanelMsg::Refresh { .. }
            | PanelMsg::InstancesLoaded(_)
            | PanelMsg::HistoryLoaded(_)
            | PanelMsg::Clear
            | PanelMsg::SpeedDial(_) => {}
        }
        Vec::new()
    }

    fn state(&self) -> &PanelState {
        &self.state
    }
}
