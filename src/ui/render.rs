use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap},
    Frame,
};

use super::app::App;
use super::input::TextInput;
use super::list::{FilterState, ListEntry, SelectableList, ITEM_HEIGHT};
use super::panels::{HistoryPanel, InstancePanel, Panel, PanelState};
use super::status_bar;

const FOCUS_BORDER: Color = Color::Rgb(0x5f, 0x5f, 0xd7);
const BLUR_BORDER: Color = Color::Indexed(240);
const FOCUS_TITLE_BG: Color = Color::Indexed(62);
const ERROR_FG: Color = Color::Indexed(202);
const SELECTED_TITLE: Color = Color::Rgb(0xee, 0x6f, 0xf8);
const SELECTED_DESC: Color = Color::Rgb(0xad, 0x58, 0xb4);
const NORMAL_TITLE: Color = Color::Rgb(0xdd, 0xdd, 0xdd);
const DIM: Color = Color::Rgb(0x77, 0x77, 0x77);

const DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Main render function
pub fn draw(f: &mut Frame, app: &App) {
    let layout = app.layout();
    // Nothing to draw until the first layout arrives.
    if layout.status.width == 0 {
        return;
    }

    render_configurations(f, app);
    render_instances(f, app.instances());
    render_history(f, app.history());
    status_bar::render(f, layout.status, app.focus());
}

fn panel_block(title: String, focused: bool) -> Block<'static> {
    let (border, title_style) = if focused {
        (
            Style::default().fg(FOCUS_BORDER),
            Style::default()
                .fg(Color::White)
                .bg(FOCUS_TITLE_BG)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (Style::default().fg(BLUR_BORDER), Style::default().fg(DIM))
    };

    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .title(Span::styled(format!(" {title} "), title_style))
        .padding(Padding::uniform(1))
}

fn render_configurations(f: &mut Frame, app: &App) {
    let panel = app.configurations();
    let state = panel.state();
    let block = panel_block("Select a GCP configuration".to_string(), state.focused);
    let inner = block.inner(state.area);
    f.render_widget(block, state.area);

    if let Some(error) = &state.error {
        render_error(f, inner, "Error fetching configurations", error);
    } else if state.loading && panel.list().items().is_empty() {
        render_placeholder(f, inner, "Fetching configurations...");
    } else {
        render_list(f, inner, panel.list(), state.focused);
    }
}

fn render_instances(f: &mut Frame, panel: &InstancePanel) {
    let state = panel.state();
    let configuration = panel.displayed_configuration().unwrap_or_default();

    let mut title = if configuration.is_empty() {
        "Select a GCP instance".to_string()
    } else {
        format!("Select a GCP instance in [{configuration}]")
    };
    let filter = panel.list().filter_value();
    if !filter.is_empty() {
        title.push_str(&format!(" 🔍 \"{filter}\""));
    }

    let block = panel_block(title, state.focused);
    let inner = block.inner(state.area);
    f.render_widget(block, state.area);

    if let Some(error) = &state.error {
        render_error(
            f,
            inner,
            &format!("Error fetching instances for [{configuration}]"),
            error,
        );
        return;
    }
    if panel.awaiting_first_load() {
        render_placeholder(f, inner, &format!("Fetching instances for {configuration}..."));
        return;
    }

    // list, blank row, filter prompt, footer
    let list_area = Rect {
        height: inner.height.saturating_sub(3),
        ..inner
    };
    render_list(f, list_area, panel.list(), state.focused);

    let prompt_y = list_area.y + list_area.height + 1;
    if inner.height >= 2 {
        let prompt = Rect::new(inner.x, prompt_y, inner.width, 1);
        render_filter_prompt(f, prompt, panel.list());
    }

    if let (Some(updated), true) = (panel.last_update(), inner.height >= 1) {
        let footer = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);
        let text = format!("Last update: {}", updated.format(DATE_FORMAT));
        f.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(DIM))
                .alignment(Alignment::Right),
            footer,
        );
    }
}

fn render_history(f: &mut Frame, panel: &HistoryPanel) {
    let state: &PanelState = panel.state();
    let block = panel_block("Connection history".to_string(), state.focused);
    let inner = block.inner(state.area);
    f.render_widget(block, state.area);

    match &state.error {
        Some(error) => render_error(f, inner, "Error getting history", error),
        None => render_list(f, inner, panel.list(), state.focused),
    }
}

/// Rows of `ITEM_HEIGHT` each; pages so the selection stays visible.
fn render_list<T: ListEntry>(f: &mut Frame, area: Rect, list: &SelectableList<T>, focused: bool) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    if list.visible_len() == 0 {
        let text = if list.filter_value().is_empty() {
            "No items."
        } else {
            "No matches."
        };
        f.render_widget(Paragraph::new(text).style(Style::default().fg(DIM)), area);
        return;
    }

    let per_page = usize::from((area.height / ITEM_HEIGHT).max(1));
    let offset = (list.selected_index() / per_page) * per_page;

    let mut lines = Vec::with_capacity(per_page * usize::from(ITEM_HEIGHT));
    for (i, item) in list.visible_items().enumerate().skip(offset).take(per_page) {
        let selected = i == list.selected_index();
        let (marker, title_style, desc_style) = if selected {
            let color = if focused { SELECTED_TITLE } else { NORMAL_TITLE };
            (
                Span::styled("│ ", Style::default().fg(SELECTED_DESC)),
                Style::default().fg(color),
                Style::default().fg(SELECTED_DESC),
            )
        } else {
            (
                Span::raw("  "),
                Style::default().fg(NORMAL_TITLE),
                Style::default().fg(DIM),
            )
        };

        lines.push(Line::from(vec![
            marker.clone(),
            Span::styled(item.title(), title_style),
        ]));
        lines.push(Line::from(vec![
            marker,
            Span::styled(item.description(), desc_style),
        ]));
        lines.push(Line::from(""));
    }

    f.render_widget(Paragraph::new(lines), area);
}

fn render_filter_prompt<T: ListEntry>(f: &mut Frame, area: Rect, list: &SelectableList<T>) {
    let line = match list.filter_state() {
        FilterState::Unfiltered => return,
        FilterState::Filtering => {
            let mut spans = vec![Span::styled("Filter: ", Style::default().fg(FOCUS_BORDER))];
            spans.extend(input_spans(list.filter_input()));
            Line::from(spans)
        }
        FilterState::Applied => Line::from(vec![
            Span::styled("Filter: ", Style::default().fg(DIM)),
            Span::raw(format!("\"{}\"", list.filter_value())),
            Span::styled("  esc to clear", Style::default().fg(DIM)),
        ]),
    };
    f.render_widget(Paragraph::new(line), area);
}

/// Text with the character under the cursor reversed.
fn input_spans(input: &TextInput) -> Vec<Span<'static>> {
    let (before, after) = input.split_at_cursor();
    let mut rest = after.chars();
    let under = rest.next().map(String::from).unwrap_or_else(|| " ".to_string());
    vec![
        Span::raw(before.to_string()),
        Span::styled(under, Style::default().add_modifier(Modifier::REVERSED)),
        Span::raw(rest.collect::<String>()),
    ]
}

fn render_placeholder(f: &mut Frame, area: Rect, text: &str) {
    f.render_widget(
        Paragraph::new(text.to_string()).style(Style::default().fg(DIM)),
        area,
    );
}

fn render_error(f: &mut Frame, area: Rect, heading: &str, error: &str) {
    let lines = vec![
        Line::from(Span::styled(
            heading.to_string(),
            Style::default().fg(ERROR_FG).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(error.to_string(), Style::default().fg(ERROR_FG))),
    ];
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcloud::{Instance, InstanceStatus};
    use crate::inventory::Snapshot;
    use crate::ui::{Message, PanelId, PanelLayout, PanelMsg};
    use chrono::Local;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn laid_out(width: u16, height: u16) -> App {
        let mut app = App::new();
        app.update(Message::LayoutComputed(PanelLayout::compute(Rect::new(
            0, 0, width, height,
        ))));
        app
    }

    #[test]
    fn test_panels_and_status_bar_are_drawn() {
        let app = laid_out(140, 40);
        let text = screen(&app, 140, 40);
        assert!(text.contains("Select a GCP configuration"));
        assert!(text.contains("Connection history"));
        assert!(text.contains("[Configurations]"));
    }

    #[test]
    fn test_instance_placeholder_then_items() {
        let mut app = laid_out(140, 40);
        app.update(Message::ToPanel(
            PanelId::Instances,
            PanelMsg::Refresh {
                configuration: "prod".to_string(),
                force: false,
            },
        ));
        assert!(screen(&app, 140, 40).contains("Fetching instances for prod..."));

        app.update(Message::ToPanel(
            PanelId::Instances,
            PanelMsg::InstancesLoaded(Snapshot {
                configuration: "prod".to_string(),
                instances: vec![Instance::new(
                    "web-1",
                    "zones/europe-west1-b",
                    InstanceStatus::Running,
                )],
                last_update: Local::now(),
                from_cache: true,
            }),
        ));
        let text = screen(&app, 140, 40);
        assert!(text.contains("Select a GCP instance in [prod]"));
        assert!(text.contains("web-1"));
        assert!(text.contains("europe-west1-b"));
        assert!(text.contains("Last update:"));
    }

    #[test]
    fn test_title_follows_listed_configuration() {
        let mut app = laid_out(140, 40);
        for configuration in ["dev", "prod"] {
            app.update(Message::ToPanel(
                PanelId::Instances,
                PanelMsg::Refresh {
                    configuration: configuration.to_string(),
                    force: false,
                },
            ));
        }
        app.update(Message::ToPanel(
            PanelId::Instances,
            PanelMsg::InstancesLoaded(Snapshot {
                configuration: "dev".to_string(),
                instances: vec![Instance::new(
                    "dev-box",
                    "zones/europe-west1-b",
                    InstanceStatus::Running,
                )],
                last_update: Local::now(),
                from_cache: false,
            }),
        ));

        let text = screen(&app, 140, 40);
        assert!(text.contains("Select a GCP instance in [dev]"));
        assert!(!text.contains("in [prod]"));
        assert!(text.contains("dev-box"));
    }

    #[test]
    fn test_instance_error_view() {
        let mut app = laid_out(140, 40);
        app.update(Message::ToPanel(
            PanelId::Instances,
            PanelMsg::Refresh {
                configuration: "prod".to_string(),
                force: true,
            },
        ));
        app.update(Message::ToPanel(
            PanelId::Instances,
            PanelMsg::Error("permission denied".to_string()),
        ));
        let text = screen(&app, 140, 40);
        assert!(text.contains("Error fetching instances for [prod]"));
        assert!(text.contains("permission denied"));
    }

    #[test]
    fn test_blank_before_layout() {
        let app = App::new();
        assert!(screen(&app, 80, 24).trim().is_empty());
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let app = laid_out(4, 3);
        let _ = screen(&app, 4, 3);
    }
}
