//! Paged message box state. The UI draws whatever page is current.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAdvance {
    /// Page `i` is now showing.
    Shown(usize),
    /// Ran past the last page; the box is hidden.
    Closed,
}

#[derive(Debug, Clone, Default)]
pub struct MessageBox {
    pages: Vec<String>,
    current: Option<usize>,
    visible: bool,
}

impl MessageBox {
    pub fn reset(&mut self) {
        self.pages.clear();
        self.current = None;
    }

    pub fn add_page(&mut self, text: impl Into<String>) {
        self.pages.push(text.into());
    }

    pub fn advance_page(&mut self) -> PageAdvance {
        let next = self.current.map_or(0, |i| i + 1);
        if next >= self.pages.len() {
            self.visible = false;
            return PageAdvance::Closed;
        }
        self.current = Some(next);
        self.visible = true;
        PageAdvance::Shown(next)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn current_text(&self) -> Option<&str> {
        self.current
            .and_then(|i| self.pages.get(i))
            .map(String::as_str)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_advance_then_close() {
        let mut msg = MessageBox::default();
        assert!(!msg.is_visible());
        msg.add_page("one");
        msg.add_page("two");

        assert_eq!(msg.advance_page(), PageAdvance::Shown(0));
        assert!(msg.is_visible());
        assert_eq!(msg.current_text(), Some("one"));
        assert_eq!(msg.advance_page(), PageAdvance::Shown(1));
        assert_eq!(msg.advance_page(), PageAdvance::Closed);
        assert!(!msg.is_visible());
        assert_eq!(msg.advance_page(), PageAdvance::Closed);
    }

    #[test]
    fn test_reset_starts_over() {
        let mut msg = MessageBox::default();
        msg.add_page("old");
        msg.advance_page();
        msg.reset();
        assert_eq!(msg.page_count(), 0);
        assert_eq!(msg.current_text(), None);

        msg.add_page("new");
        assert_eq!(msg.advance_page(), PageAdvance::Shown(0));
        assert_eq!(msg.current_text(), Some("new"));
    }

    #[test]
    fn test_empty_box_closes_at_once() {
        let mut msg = MessageBox::default();
        assert_eq!(msg.advance_page(), PageAdvance::Closed);
    }
}
