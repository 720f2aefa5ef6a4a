//! Scroll policy for the message history.
//!
//! Units are whatever the surface measures in (rows for the terminal
//! dashboard). The decision after a history change is made against the
//! metrics as they were *before* the change.

/// Distance from the bottom, in viewport units, within which new messages
/// auto-scroll.
pub const DEFAULT_PROXIMITY_THRESHOLD: u32 = 40;

/// What happened to the scroll position after a history mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDecision {
    /// The viewport was near the bottom and now follows the newest message.
    FollowToBottom,
    /// The viewport was scrolled away; position is kept and the
    /// "new message" indicator is raised.
    ShowIndicator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    offset: u32,
    height: u32,
    content_height: u32,
    threshold: u32,
    follow: bool,
    new_message: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_PROXIMITY_THRESHOLD)
    }

    pub fn with_threshold(threshold: u32) -> Self {
        Self {
            offset: 0,
            height: 0,
            content_height: 0,
            threshold,
            follow: true,
            new_message: false,
        }
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Visible height, as last reported by the surface.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn has_new_message(&self) -> bool {
        self.new_message
    }

    fn max_offset(&self) -> u32 {
        self.content_height.saturating_sub(self.height)
    }

    pub fn distance_from_bottom(&self) -> u32 {
        self.content_height
            .saturating_sub(self.offset.saturating_add(self.height))
    }

    pub fn is_near_bottom(&self) -> bool {
        self.distance_from_bottom() < self.threshold
    }

    /// Apply the auto-scroll rule for a history mutation that is about to be
    /// rendered. Call before updating the content height.
    pub fn history_changed(&mut self) -> ScrollDecision {
        if self.follow || self.is_near_bottom() {
            self.follow = true;
            self.new_message = false;
            ScrollDecision::FollowToBottom
        } else {
            self.new_message = true;
            ScrollDecision::ShowIndicator
        }
    }

    /// Report the new total content height. A following viewport stays
    /// pinned to the bottom; otherwise the offset is only clamped.
    pub fn set_content_height(&mut self, content_height: u32) {
        self.content_height = content_height;
        self.settle();
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        self.height = height;
        self.settle();
    }

    fn settle(&mut self) {
        if self.follow {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    /// Manual scroll. Landing back within the threshold dismisses the
    /// indicator; landing exactly at the bottom resumes following.
    pub fn scroll_to(&mut self, offset: u32) {
        self.offset = offset.min(self.max_offset());
        self.follow = self.offset == self.max_offset();
        if self.is_near_bottom() {
            self.new_message = false;
        }
    }

    pub fn scroll_by(&mut self, delta: i64) {
        let target = (i64::from(self.offset) + delta).clamp(0, i64::from(u32::MAX));
        self.scroll_to(u32::try_from(target).unwrap_or(u32::MAX));
    }

    /// Invoke the indicator: scroll to the bottom and dismiss it.
    pub fn jump_to_bottom(&mut self) {
        self.follow = true;
        self.new_message = false;
        self.offset = self.max_offset();
    }
}
