use ratatui::layout::{Constraint, Direction, Layout, Rect};

use super::PanelId;

/// Screen partition: two panels side by side, history below at full
/// width, one-row status bar docked at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelLayout {
    pub configurations: Rect,
    pub instances: Rect,
    pub history: Rect,
    pub status: Rect,
}

impl PanelLayout {
    pub fn compute(area: Rect) -> Self {
        let status_height = area.height.min(1);
        let body = Rect {
            height: area.height - status_height,
            ..area
        };
        let status = Rect {
            y: area.y + body.height,
            height: status_height,
            ..area
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(body);

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(rows[0]);

        Self {
            configurations: top[0],
            instances: top[1],
            history: rows[1],
            status,
        }
    }

    pub fn panel(&self, id: PanelId) -> Rect {
        match id {
            PanelId::Configurations => self.configurations,
            PanelId::Instances => self.instances,
            PanelId::History => self.history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regions_tile_the_screen() {
        let area = Rect::new(0, 0, 120, 40);
        let layout = PanelLayout::compute(area);

        assert_eq!(layout.status.height, 1);
        assert_eq!(layout.status.y, 39);
        assert_eq!(layout.status.width, 120);
        assert_eq!(layout.history.width, 120);
        assert_eq!(
            layout.configurations.width + layout.instances.width,
            area.width
        );
        assert_eq!(layout.configurations.y, 0);
        assert_eq!(
            layout.configurations.height + layout.history.height + layout.status.height,
            area.height
        );
        assert_eq!(layout.panel(PanelId::History), layout.history);
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let layout = PanelLayout::compute(Rect::new(0, 0, 3, 1));
        assert_eq!(layout.status.height, 1);
    }
}
