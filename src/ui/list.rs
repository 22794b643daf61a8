use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use ratatui::layout::Rect;

use super::input::TextInput;

/// Rows one entry takes: title, description, spacer.
pub const ITEM_HEIGHT: u16 = 3;

/// What a row shows and what the filter matches against
pub trait ListEntry {
    fn title(&self) -> String;
    fn description(&self) -> String;
    fn filter_key(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterState {
    #[default]
    Unfiltered,
    /// Filter text is being typed.
    Filtering,
    /// Filter accepted; the narrowed list is browsable.
    Applied,
}

/// Selectable list with optional fuzzy text filtering
#[derive(Debug, Clone)]
pub struct SelectableList<T> {
    items: Vec<T>,
    /// Indices into `items` that pass the filter, best match first.
    visible: Vec<usize>,
    /// Position within `visible`.
    selected: usize,
    filter: TextInput,
    filter_state: FilterState,
    viewport: Rect,
}

impl<T> Default for SelectableList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            visible: Vec::new(),
            selected: 0,
            filter: TextInput::new(),
            filter_state: FilterState::Unfiltered,
            viewport: Rect::default(),
        }
    }
}

impl<T: ListEntry> SelectableList<T> {
    /// Create an empty, unfiltered list
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every item; the filter is kept and re-applied.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.refilter();
    }

    /// All items, ignoring the filter
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Items passing the filter, in display order
    pub fn visible_items(&self) -> impl Iterator<Item = &T> {
        self.visible.iter().filter_map(|&i| self.items.get(i))
    }

    /// Number of items passing the filter
    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Position of the highlight among the visible items
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Highlighted item, if any is visible
    pub fn selected_item(&self) -> Option<&T> {
        self.visible.get(self.selected).and_then(|&i| self.items.get(i))
    }

    /// Highlight the `index`-th visible row (clamped).
    pub fn select(&mut self, index: usize) {
        self.selected = index.min(self.visible.len().saturating_sub(1));
    }

    /// Current filter state
    pub fn filter_state(&self) -> FilterState {
        self.filter_state
    }

    /// Check if filter text is being typed
    pub fn is_filtering(&self) -> bool {
        self.filter_state == FilterState::Filtering
    }

    /// Filter text; empty when unfiltered
    pub fn filter_value(&self) -> &str {
        self.filter.text()
    }

    /// Filter prompt, for drawing the cursor
    pub fn filter_input(&self) -> &TextInput {
        &self.filter
    }

    /// Start typing a filter
    pub fn begin_filter(&mut self) {
        self.filter_state = FilterState::Filtering;
    }

    /// Drop the filter and show every item again
    pub fn reset_filter(&mut self) {
        self.filter.clear();
        self.filter_state = FilterState::Unfiltered;
        self.refilter();
    }

    /// Set the area the rows are drawn in
    pub fn set_viewport(&mut self, area: Rect) {
        self.viewport = area;
    }

    /// Area the rows are drawn in
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Entries that fit in the viewport (at least one).
    pub fn page_size(&self) -> usize {
        usize::from((self.viewport.height / ITEM_HEIGHT).max(1))
    }

    /// Navigation and filter editing.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.filter_state == FilterState::Filtering {
            match key.code {
                KeyCode::Esc => self.reset_filter(),
                KeyCode::Enter => {
                    self.filter_state = if self.filter.is_empty() {
                        FilterState::Unfiltered
                    } else {
                        FilterState::Applied
                    };
                }
                KeyCode::Up => self.move_up(1),
                KeyCode::Down => self.move_down(1),
                _ => {
                    if self.filter.handle_key(key) {
                        self.refilter();
                    }
                }
            }
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.move_down(1),
            KeyCode::PageUp => self.move_up(self.page_size()),
            KeyCode::PageDown => self.move_down(self.page_size()),
            KeyCode::Home | KeyCode::Char('g') => self.selected = 0,
            KeyCode::End | KeyCode::Char('G') => {
                self.selected = self.visible.len().saturating_sub(1)
            }
            KeyCode::Esc if self.filter_state == FilterState::Applied => self.reset_filter(),
            _ => {}
        }
    }

    fn move_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    fn move_down(&mut self, n: usize) {
        let last = self.visible.len().saturating_sub(1);
        self.selected = (self.selected + n).min(last);
    }

    fn refilter(&mut self) {
        let query = self.filter.text().trim();
        if query.is_empty() {
            self.visible = (0..self.items.len()).collect();
        } else {
            let matcher = SkimMatcherV2::default();
            let mut scored: Vec<(i64, usize)> = self
                .items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| {
                    matcher
                        .fuzzy_match(item.filter_key(), query)
                        .map(|score| (score, i))
                })
                .collect();
            scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
            self.visible = scored.into_iter().map(|(_, i)| i).collect();
        }
        self.select(self.selected);
    }
}
