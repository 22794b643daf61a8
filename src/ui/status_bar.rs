use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::PanelId;

const BAR_BG: Color = Color::Indexed(62);
const KEY_BG: Color = Color::Indexed(5);
const LABEL_FG: Color = Color::Indexed(4);
const ACTION_FG: Color = Color::Rgb(0xbb, 0xbb, 0xbb);

/// One `key action` hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortcut {
    pub key: &'static str,
    pub action: &'static str,
}

impl Shortcut {
    const fn new(key: &'static str, action: &'static str) -> Self {
        Self { key, action }
    }

    /// Cells taken when rendered: `▌key▐action `.
    fn width(&self) -> usize {
        self.key.width() + self.action.width() + 3
    }
}

/// Hints for the focused panel, in display order.
pub fn shortcuts(focus: PanelId) -> Vec<Shortcut> {
    let (arrows, enter) = match focus {
        PanelId::Configurations => ("Browse configurations", "Activate configuration"),
        PanelId::Instances => ("Browse instances", "SSH to instance"),
        PanelId::History => ("Browse history", "SSH to instance"),
    };
    vec![
        Shortcut::new("↑↓", arrows),
        Shortcut::new("⇥", "Next panel"),
        Shortcut::new("/", "Filter instances"),
        Shortcut::new("↵", enter),
        Shortcut::new("R", "Reload instances"),
        Shortcut::new("C", "Clear history"),
        Shortcut::new("Q", "Quit"),
    ]
}

/// How many leading shortcuts fit next to the panel label.
fn fitting(label: &str, shortcuts: &[Shortcut], width: usize) -> usize {
    let mut used = label.width() + 2;
    let mut count = 0;
    for s in shortcuts {
        used += s.width();
        if used > width {
            break;
        }
        count += 1;
    }
    count
}

pub fn status_line(focus: PanelId, width: u16) -> Line<'static> {
    let label = format!("[{}]", focus.label());
    let all = shortcuts(focus);
    let shown = &all[..fitting(&label, &all, usize::from(width))];

    let hints_width: usize = shown.iter().map(Shortcut::width).sum();
    let gap = usize::from(width).saturating_sub(label.width() + 2 + hints_width);

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(label, Style::default().fg(LABEL_FG)),
        Span::raw(" ".repeat(gap + 1)),
    ];
    for s in shown {
        spans.push(Span::styled(
            format!("▌{}▐", s.key),
            Style::default().fg(BAR_BG).bg(KEY_BG),
        ));
        spans.push(Span::styled(s.action, Style::default().fg(ACTION_FG)));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

pub fn render(f: &mut Frame, area: Rect, focus: PanelId) {
    let bar = Paragraph::new(status_line(focus, area.width)).style(Style::default().bg(BAR_BG));
    f.render_widget(bar, area);
}
