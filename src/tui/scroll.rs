use crate::constants::{DEFAULT_FOCUS_PADDING, UI_SCROLL_LINES};

/// Vertical scroll position of a panel that follows a focused row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    offset: usize,
    padding: usize,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new(DEFAULT_FOCUS_PADDING)
    }
}

/// Position and length of the scrollbar thumb, in rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollThumb {
    pub start: usize,
    pub size: usize,
}

impl ScrollState {
    pub fn new(padding: usize) -> Self {
        Self { offset: 0, padding }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Scroll so `focus` stays inside the viewport with padding rows around it
    pub fn follow(&mut self, focus: usize, content: usize, height: usize) {
        if height == 0 {
            self.offset = 0;
            return;
        }
        let padding = self.padding.min(height.saturating_sub(1) / 2);

        if focus < self.offset + padding {
            self.offset = focus.saturating_sub(padding);
        } else if focus + padding >= self.offset + height {
            self.offset = focus + padding + 1 - height;
        }
        self.clamp(content, height);
    }

    pub fn scroll_up(&mut self, content: usize, height: usize) {
        self.offset = self.offset.saturating_sub(UI_SCROLL_LINES);
        self.clamp(content, height);
    }

    pub fn scroll_down(&mut self, content: usize, height: usize) {
        self.offset += UI_SCROLL_LINES;
        self.clamp(content, height);
    }

    fn clamp(&mut self, content: usize, height: usize) {
        self.offset = self.offset.min(content.saturating_sub(height));
    }

    /// Thumb geometry, or `None` when everything fits
    pub fn thumb(&self, content: usize, height: usize) -> Option<ScrollThumb> {
        if height == 0 || content <= height {
            return None;
        }
        let h = height as f64;
        let size = ((h * h / content as f64).round() as usize).clamp(1, height);
        let max_scroll = content - height;
        let ratio = self.offset.min(max_scroll) as f64 / max_scroll as f64;
        let start = (ratio * (height - size) as f64).round() as usize;
        Some(ScrollThumb { start, size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_follow_keeps_padding() {
        let mut scroll = ScrollState::new(2);

        scroll.follow(7, 50, 10);
        assert_eq!(scroll.offset(), 0);

        scroll.follow(8, 50, 10);
        assert_eq!(scroll.offset(), 1);

        scroll.follow(30, 50, 10);
        assert_eq!(scroll.offset(), 23);

        scroll.follow(24, 50, 10);
        assert_eq!(scroll.offset(), 22);
    }

    #[test]
    fn test_follow_clamps_to_content() {
        let mut scroll = ScrollState::new(2);
        scroll.follow(49, 50, 10);
        assert_eq!(scroll.offset(), 40);

        scroll.follow(3, 5, 10);
        assert_eq!(scroll.offset(), 0);
    }

    #[test]
    fn test_padding_is_limited_by_height() {
        let mut scroll = ScrollState::new(2);
        // Height 3 allows a single padding row
        scroll.follow(2, 20, 3);
        assert_eq!(scroll.offset(), 1);
    }

    #[test]
    fn test_wheel_scrolling_is_clamped() {
        let mut scroll = ScrollState::new(2);
        scroll.scroll_up(50, 10);
        assert_eq!(scroll.offset(), 0);

        for _ in 0..100 {
            scroll.scroll_down(50, 10);
        }
        assert_eq!(scroll.offset(), 40);
    }

    #[test]
    fn test_thumb_geometry() {
        let mut scroll = ScrollState::new(2);
        assert_eq!(scroll.thumb(10, 10), None);

        assert_eq!(scroll.thumb(40, 10), Some(ScrollThumb { start: 0, size: 3 }));

        for _ in 0..30 {
            scroll.scroll_down(40, 10);
        }
        assert_eq!(scroll.thumb(40, 10), Some(ScrollThumb { start: 7, size: 3 }));

        assert_eq!(scroll.thumb(1000, 10).map(|t| t.size), Some(1));
    }
}
