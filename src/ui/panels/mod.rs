mod configurations;
mod history;
mod instances;

use ratatui::layout::Rect;

use super::{Command, PanelId, PanelMsg};

pub use configurations::ConfigurationPanel;
pub use history::HistoryPanel;
pub use instances::InstancePanel;

/// Rows/columns taken by the rounded border plus one cell of padding.
const FRAME: u16 = 2;

/// A focusable region driven by [`PanelMsg`]s
pub trait Panel {
    fn id(&self) -> PanelId;

    /// Commands to run when the picker starts.
    fn init(&mut self) -> Vec<Command>;

    fn update(&mut self, msg: PanelMsg) -> Vec<Command>;

    fn state(&self) -> &PanelState;
}

/// State every panel carries besides its list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelState {
    pub focused: bool,
    pub loading: bool,
    pub error: Option<String>,
    /// Outer region assigned by the layout.
    pub area: Rect,
}

impl PanelState {
    pub fn fail(&mut self, error: String) {
        self.loading = false;
        self.error = Some(error);
    }

    /// Region left for list rows after border, padding and `reserved_rows`.
    pub fn list_area(&self, reserved_rows: u16) -> Rect {
        list_area(self.area, reserved_rows)
    }
}

pub fn list_area(area: Rect, reserved_rows: u16) -> Rect {
    Rect {
        x: area.x.saturating_add(FRAME),
        y: area.y.saturating_add(FRAME),
        width: area.width.saturating_sub(FRAME * 2),
        height: area.height.saturating_sub(FRAME * 2 + reserved_rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_area_subtracts_frame() {
        let inner = list_area(Rect::new(10, 5, 40, 20), 3);
        assert_eq!(inner, Rect::new(12, 7, 36, 13));
    }

    #[test]
    fn test_list_area_saturates() {
        let inner = list_area(Rect::new(0, 0, 3, 3), 3);
        assert_eq!(inner.width, 0);
        assert_eq!(inner.height, 0);
    }
}
