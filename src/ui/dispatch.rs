use std::sync::Arc;

use ratatui::layout::Rect;
use tokio::sync::{mpsc, Mutex};

use super::{Command, Message, PanelId, PanelLayout, PanelMsg};
use crate::gcloud::InventoryProvider;
use crate::history::HistoryLog;
use crate::inventory::InventoryCache;

/// Services the background tasks talk to
#[derive(Clone)]
pub struct Backend {
    pub provider: Arc<dyn InventoryProvider>,
    pub cache: Arc<InventoryCache>,
    pub history: Arc<Mutex<HistoryLog>>,
}

/// Runs [`Command`]s as detached tasks that report back through `tx`.
pub struct Dispatcher {
    backend: Backend,
    tx: mpsc::UnboundedSender<Message>,
}

impl Dispatcher {
    pub fn new(backend: Backend, tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { backend, tx }
    }

    pub fn dispatch_all(&self, commands: Vec<Command>) {
        for command in commands {
            self.dispatch(command);
        }
    }

    pub fn dispatch(&self, command: Command) {
        tracing::debug!("dispatch {:?}", command);
        let tx = self.tx.clone();

        match command {
            Command::Send(msg) => {
                let _ = tx.send(msg);
            }
            Command::SendAfter(delay, msg) => {
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(msg);
                });
            }
            Command::ComputeLayout { width, height } => {
                tokio::spawn(async move {
                    let layout = PanelLayout::compute(Rect::new(0, 0, width, height));
                    let _ = tx.send(Message::LayoutComputed(layout));
                });
            }
            Command::LoadConfigurations => {
                let provider = Arc::clone(&self.backend.provider);
                tokio::spawn(async move {
                    let msg = load_configurations(provider.as_ref()).await;
                    let _ = tx.send(Message::ToPanel(PanelId::Configurations, msg));
                });
            }
            Command::ActivateConfiguration(name) => {
                let provider = Arc::clone(&self.backend.provider);
                tokio::spawn(async move {
                    let msg = match provider.activate_configuration(&name).await {
                        Ok(()) => load_configurations(provider.as_ref()).await,
                        Err(e) => {
                            tracing::warn!("Failed to activate configuration [{}]: {}", name, e);
                            PanelMsg::Error(e.to_string())
                        }
                    };
                    let _ = tx.send(Message::ToPanel(PanelId::Configurations, msg));
                });
            }
            Command::LoadInstances {
                configuration,
                force,
            } => {
                let cache = Arc::clone(&self.backend.cache);
                tokio::spawn(async move {
                    let msg = match cache.refresh(&configuration, force).await {
                        Ok(snapshot) => PanelMsg::InstancesLoaded(snapshot),
                        Err(e) => {
                            tracing::warn!(
                                "Failed to list instances for [{}]: {}",
                                configuration,
                                e
                            );
                            PanelMsg::Error(e.to_string())
                        }
                    };
                    let _ = tx.send(Message::ToPanel(PanelId::Instances, msg));
                });
            }
            Command::LoadHistory => {
                let history = Arc::clone(&self.backend.history);
                tokio::spawn(async move {
                    let connections = history.lock().await.list().await;
                    let _ = tx.send(Message::ToPanel(
                        PanelId::History,
                        PanelMsg::HistoryLoaded(connections),
                    ));
                });
            }
            Command::ClearHistory => {
                let history = Arc::clone(&self.backend.history);
                tokio::spawn(async move {
                    let mut log = history.lock().await;
                    log.clear().await;
                    tracing::info!("History cleared");
                    let connections = log.list().await;
                    let _ = tx.send(Message::ToPanel(
                        PanelId::History,
                        PanelMsg::HistoryLoaded(connections),
                    ));
                });
            }
        }
    }
}

async fn load_configurations(provider: &dyn InventoryProvider) -> PanelMsg {
    match provider.list_configurations().await {
        Ok(configurations) => PanelMsg::ConfigurationsLoaded(configurations),
        Err(e) => {
            tracing::warn!("Failed to list configurations: {}", e);
            PanelMsg::Error(e.to_string())
        }
    }
}
