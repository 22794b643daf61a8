use chrono::{DateTime, Local};
use crossterm::event::KeyCode;

use super::{Panel, PanelState};
use crate::gcloud::Instance;
use crate::inventory::Snapshot;
use crate::ui::list::{ListEntry, SelectableList};
use crate::ui::{Command, Message, PanelId, PanelMsg};

/// Rows under the list: filter line plus the last-update footer.
const RESERVED_ROWS: u16 = 3;

impl ListEntry for Instance {
    fn title(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        self.zone_name().to_string()
    }

    fn filter_key(&self) -> &str {
        &self.name
    }
}

/// Running instances of the highlighted configuration.
#[derive(Debug, Default)]
pub struct InstancePanel {
    state: PanelState,
    list: SelectableList<Instance>,
    /// Configuration last requested.
    configuration: Option<String>,
    /// Configuration the current items belong to.
    loaded_for: Option<String>,
    last_update: Option<DateTime<Local>>,
}

impl InstancePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> &SelectableList<Instance> {
        &self.list
    }

    pub fn configuration(&self) -> Option<&str> {
        self.configuration.as_deref()
    }

    pub fn loaded_for(&self) -> Option<&str> {
        self.loaded_for.as_deref()
    }

    pub fn last_update(&self) -> Option<DateTime<Local>> {
        self.last_update
    }

    /// Loading a configuration whose items are not on screen yet.
    pub fn awaiting_first_load(&self) -> bool {
        self.state.loading && self.loaded_for != self.configuration
    }

    /// Configuration named in the title: the one whose items are on
    /// screen, or the requested one while the list is hidden.
    pub fn displayed_configuration(&self) -> Option<&str> {
        if self.list_hidden() {
            self.configuration()
        } else {
            self.loaded_for().or(self.configuration())
        }
    }

    /// Placeholder or error view is shown instead of the items.
    fn list_hidden(&self) -> bool {
        self.awaiting_first_load() || self.state.error.is_some()
    }

    fn loaded(&mut self, snapshot: Snapshot) {
        tracing::debug!(
            "Loaded {} instances for [{}] (cached: {})",
            snapshot.instances.len(),
            snapshot.configuration,
            snapshot.from_cache
        );
        self.state.loading = false;
        self.state.error = None;
        self.last_update = Some(snapshot.last_update);
        self.loaded_for = Some(snapshot.configuration);
        self.list.set_items(
            snapshot
                .instances
                .into_iter()
                .filter(Instance::is_running)
                .collect(),
        );
    }

    fn handle_key(&mut self, key: crossterm::event::KeyEvent) -> Vec<Command> {
        match key.code {
            KeyCode::Enter | KeyCode::Esc if self.list.is_filtering() => {
                self.list.handle_key(key);
                vec![Command::Send(Message::FilteringChanged(false))]
            }
            KeyCode::Enter if self.list_hidden() => Vec::new(),
            KeyCode::Enter => {
                let (Some(configuration), Some(instance)) =
                    (self.loaded_for.clone(), self.list.selected_item().cloned())
                else {
                    return Vec::new();
                };
                vec![Command::Send(Message::InstanceSelected {
                    configuration,
                    instance,
                })]
            }
            _ => {
                self.list.handle_key(key);
                Vec::new()
            }
        }
    }
}

impl Panel for InstancePanel {
    fn id(&self) -> PanelId {
        PanelId::Instances
    }

    fn init(&mut self) -> Vec<Command> {
        Vec::new()
    }

    fn update(&mut self, msg: PanelMsg) -> Vec<Command> {
        match msg {
            PanelMsg::Focus => self.state.focused = true,
            PanelMsg::Blur => self.state.focused = false,
            PanelMsg::Resize(area) => {
                self.state.area = area;
                self.list.set_viewport(self.state.list_area(RESERVED_ROWS));
            }
            PanelMsg::Error(e) => self.state.fail(e),
            PanelMsg::Refresh {
                configuration,
                force,
            } => {
                self.state.loading = true;
                self.configuration = Some(configuration.clone());
                return vec![Command::LoadInstances {
                    configuration,
                    force,
                }];
            }
            PanelMsg::InstancesLoaded(snapshot) => self.loaded(snapshot),
            PanelMsg::BeginFilter => self.list.begin_filter(),
            PanelMsg::Key(key) => return self.handle_key(key),
            PanelMsg::Reload
            | PanelMsg::ConfigurationsLoaded(_)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcloud::InstanceStatus;
    use crate::ui::FilterState;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> PanelMsg {
        PanelMsg::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn snapshot(configuration: &str, instances: Vec<Instance>) -> Snapshot {
        Snapshot {
            configuration: configuration.to_string(),
            instances,
            last_update: Local::now(),
            from_cache: false,
        }
    }

    fn loaded_panel() -> InstancePanel {
        let mut panel = InstancePanel::new();
        panel.update(PanelMsg::Refresh {
            configuration: "dev".to_string(),
            force: false,
        });
        panel.update(PanelMsg::InstancesLoaded(snapshot(
            "dev",
            vec![
                Instance::new("web-1", "zones/europe-west1-b", InstanceStatus::Running),
                Instance::new("batch", "zones/europe-west1-b", InstanceStatus::Stopped),
                Instance::new("web-2", "zones/us-east1-c", InstanceStatus::Running),
                Instance::new("old", "zones/us-east1-c", InstanceStatus::Terminated),
            ],
        )));
        panel
    }

    #[test]
    fn test_refresh_requests_instances() {
        let mut panel = InstancePanel::new();
        let commands = panel.update(PanelMsg::Refresh {
            configuration: "dev".to_string(),
            force: true,
        });
        assert_eq!(
            commands,
            vec![Command::LoadInstances {
                configuration: "dev".to_string(),
                force: true,
            }]
        );
        assert!(panel.awaiting_first_load());
    }

    #[test]
    fn test_only_running_instances_are_listed() {
        let panel = loaded_panel();
        let names: Vec<_> = panel.list().items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["web-1", "web-2"]);
        assert_eq!(panel.loaded_for(), Some("dev"));
        assert!(panel.last_update().is_some());
        assert!(!panel.state().loading);
    }

    #[test]
    fn test_background_refresh_keeps_items_on_screen() {
        let mut panel = loaded_panel();
        panel.update(PanelMsg::Refresh {
            configuration: "dev".to_string(),
            force: false,
        });
        assert!(panel.state().loading);
        assert!(!panel.awaiting_first_load());
    }

    #[test]
    fn test_enter_selects_with_owning_configuration() {
        let mut panel = loaded_panel();
        panel.update(key(KeyCode::Down));
        let commands = panel.update(key(KeyCode::Enter));
        assert_eq!(
            commands,
            vec![Command::Send(Message::InstanceSelected {
                configuration: "dev".to_string(),
                instance: Instance::new("web-2", "zones/us-east1-c", InstanceStatus::Running),
            })]
        );
    }

    #[test]
    fn test_enter_ignored_while_fetching_other_configuration() {
        let mut panel = loaded_panel();
        panel.update(PanelMsg::Refresh {
            configuration: "prod".to_string(),
            force: false,
        });
        assert!(panel.awaiting_first_load());
        assert!(panel.update(key(KeyCode::Enter)).is_empty());
    }

    #[test]
    fn test_enter_ignored_behind_error_view() {
        let mut panel = loaded_panel();
        panel.update(PanelMsg::Error("permission denied".to_string()));
        assert!(panel.update(key(KeyCode::Enter)).is_empty());
    }

    #[test]
    fn test_late_result_names_its_own_configuration() {
        let mut panel = InstancePanel::new();
        panel.update(PanelMsg::Refresh {
            configuration: "dev".to_string(),
            force: false,
        });
        panel.update(PanelMsg::Refresh {
            configuration: "prod".to_string(),
            force: false,
        });
        assert_eq!(panel.displayed_configuration(), Some("prod"));

        panel.update(PanelMsg::InstancesLoaded(snapshot(
            "dev",
            vec![Instance::new("web-1", "zones/europe-west1-b", InstanceStatus::Running)],
        )));
        assert_eq!(panel.configuration(), Some("prod"));
        assert_eq!(panel.displayed_configuration(), Some("dev"));
    }

    #[test]
    fn test_enter_on_empty_list_does_nothing() {
        let mut panel = InstancePanel::new();
        assert!(panel.update(key(KeyCode::Enter)).is_empty());
    }

    #[test]
    fn test_filter_accept_reports_filtering_done() {
        let mut panel = loaded_panel();
        panel.update(PanelMsg::BeginFilter);
        panel.update(key(KeyCode::Char('2')));
        assert_eq!(panel.list().visible_len(), 1);

        let commands = panel.update(key(KeyCode::Enter));
        assert_eq!(
            commands,
            vec![Command::Send(Message::FilteringChanged(false))]
        );
        assert_eq!(panel.list().filter_state(), FilterState::Applied);
    }

    #[test]
    fn test_filter_cancel_restores_list() {
        let mut panel = loaded_panel();
        panel.update(PanelMsg::BeginFilter);
        panel.update(key(KeyCode::Char('1')));
        let commands = panel.update(key(KeyCode::Esc));
        assert_eq!(
            commands,
            vec![Command::Send(Message::FilteringChanged(false))]
        );
        assert_eq!(panel.list().visible_len(), 2);
    }

    #[test]
    fn test_error_is_shown_until_next_load() {
        let mut panel = loaded_panel();
        panel.update(PanelMsg::Error("Error fetching instances for [dev]".to_string()));
        assert!(panel.state().error.is_some());

        panel.update(PanelMsg::InstancesLoaded(snapshot("dev", Vec::new())));
        assert!(panel.state().error.is_none());
    }
}
