// Generic containers for loaded data and list selection.
// Used by every store that renders a list or a paged listing.

use ratatui::widgets::ListState;

/// Loading state for async data.
#[derive(Debug, Clone, Default)]
pub enum LoadingState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Error(String),
}

impl<T> LoadingState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadingState::Loaded(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            LoadingState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            LoadingState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// Mark as loading unless data is already shown; a refresh keeps stale data visible.
    pub fn begin_refresh(&mut self) {
        if !self.is_loaded() {
            *self = LoadingState::Loading;
        }
    }

    /// Record a failure. Loaded data is kept so a failed refresh does not blank the view.
    pub fn fail(&mut self, message: impl Into<String>) {
        if !self.is_loaded() {
            *self = LoadingState::Error(message.into());
        }
    }
}

/// Move a list selection one step, clamped to `len`.
pub fn step_selection(state: &mut ListState, len: usize, forward: bool) {
    if len == 0 {
        state.select(None);
        return;
    }
    let i = match state.selected() {
        Some(i) if forward => (i + 1).min(len - 1),
        Some(i) => i.saturating_sub(1),
        None => 0,
    };
    state.select(Some(i));
}

/// Keep the current index when it is still in range, otherwise clamp it.
pub fn clamp_selection(state: &mut ListState, len: usize) {
    let selected = match (state.selected(), len) {
        (_, 0) => None,
        (Some(i), len) => Some(i.min(len - 1)),
        (None, _) => Some(0),
    };
    state.select(selected);
}

/// State for a selectable list with keyboard navigation.
#[derive(Debug, Clone)]
pub struct SelectableList<T> {
    pub data: LoadingState<Vec<T>>,
    pub list_state: ListState,
}

impl<T> Default for SelectableList<T> {
    fn default() -> Self {
        Self {
            data: LoadingState::Idle,
            list_state: ListState::default(),
        }
    }
}

impl<T> SelectableList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        self.data.data().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn select_next(&mut self) {
        let len = self.len();
        step_selection(&mut self.list_state, len, true);
    }

    pub fn select_prev(&mut self) {
        let len = self.len();
        step_selection(&mut self.list_state, len, false);
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.items().get(self.list_state.selected()?)
    }

    /// Replace the items, keeping the selection where possible.
    pub fn set_loaded(&mut self, items: Vec<T>) {
        let len = items.len();
        self.data = LoadingState::Loaded(items);
        clamp_selection(&mut self.list_state, len);
    }

    pub fn set_loading(&mut self) {
        self.data.begin_refresh();
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.data.fail(error);
    }
}

/// One page of a server-side paginated listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub list_state: ListState,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, size: u32) -> Self {
        let mut list_state = ListState::default();
        clamp_selection(&mut list_state, items.len());
        Self {
            items,
            total,
            page: page.max(1),
            size: size.max(1),
            list_state,
        }
    }

    pub fn total_pages(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.size));
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn next_page(&self) -> Option<u32> {
        self.has_next().then_some(self.page + 1)
    }

    pub fn prev_page(&self) -> Option<u32> {
        self.has_prev().then_some(self.page - 1)
    }

    pub fn select_next(&mut self) {
        step_selection(&mut self.list_state, self.items.len(), true);
    }

    pub fn select_prev(&mut self) {
        step_selection(&mut self.list_state, self.items.len(), false);
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.items.get(self.list_state.selected()?)
    }

    /// "page 2/5 (93 total)"
    pub fn summary(&self) -> String {
        format!("page {}/{} ({} total)", self.page, self.total_pages(), self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectable_list_navigation() {
        let mut list = SelectableList::new();
        list.select_next();
        assert_eq!(list.selected(), None);

        list.set_loaded(vec!["a", "b", "c"]);
        assert_eq!(list.selected(), Some(0));
        list.select_next();
        list.select_next();
        list.select_next();
        assert_eq!(list.selected_item(), Some(&"c"));
        list.select_prev();
        assert_eq!(list.selected_item(), Some(&"b"));
    }

    #[test]
    fn test_reload_keeps_selection_in_range() {
        let mut list = SelectableList::new();
        list.set_loaded(vec![1, 2, 3]);
        list.select_next();
        list.select_next();

        list.set_loaded(vec![1, 2]);
        assert_eq!(list.selected(), Some(1));
        list.set_loaded(Vec::new());
        assert_eq!(list.selected(), None);
    }

    #[test]
    fn test_refresh_failure_keeps_data() {
        let mut list = SelectableList::new();
        list.set_loading();
        assert!(list.data.is_loading());
        list.set_error("offline");
        assert!(matches!(list.data, LoadingState::Error(_)));

        list.set_loaded(vec![1]);
        list.set_loading();
        list.set_error("offline");
        assert_eq!(list.items(), &[1]);
    }

    #[test]
    fn test_page_math() {
        let page = Page::new(vec![(); 20], 93, 2, 20);
        assert_eq!(page.total_pages(), 5);
        assert_eq!(page.next_page(), Some(3));
        assert_eq!(page.prev_page(), Some(1));
        assert_eq!(page.summary(), "page 2/5 (93 total)");

        let empty: Page<()> = Page::new(Vec::new(), 0, 1, 20);
        assert_eq!(empty.total_pages(), 1);
        assert!(!empty.has_next());
        assert!(!empty.has_prev());
    }
}
