use super::AppModel;

impl AppModel {
    pub fn set_viewport_height(&mut self, height: u16) {
        self.viewport_height = height.max(1);
        self.clamp_scrolls();
    }

    pub(super) fn select_next(&mut self) {
        if !self.rows.is_empty() {
            self.selected = (self.selected + 1).min(self.rows.len() - 1);
        }
    }

    pub(super) fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub(super) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(super) fn select_last(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
    }

    /// Every snapshot rendered one after another, each under a `== node:session ==` header.
    pub(super) fn snapshot_screen_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for row in self.rows.iter().filter(|row| !row.is_placeholder) {
            lines.push(format!("== {} ==", row.key));
            match self.snapshots.get(&row.key) {
                Some(captured) if !captured.is_empty() => lines.extend(captured.iter().cloned()),
                Some(_) => lines.push("(empty pane)".to_string()),
                None => lines.push("(no snapshot yet)".to_string()),
            }
            lines.push(String::new());
        }
        if lines.is_empty() {
            lines.push("No sessions captured yet.".to_string());
        }
        lines
    }

    pub(super) fn max_snapshot_scroll(&self) -> u16 {
        max_scroll(self.snapshot_screen_lines().len(), self.viewport_height)
    }

    pub(super) fn max_error_log_scroll(&self) -> u16 {
        max_scroll(self.error_entries.len().max(1), self.viewport_height)
    }

    pub(super) fn scroll_snapshot(&mut self, delta: i32) {
        self.snapshot_scroll = apply_delta(self.snapshot_scroll, delta, self.max_snapshot_scroll());
    }

    pub(super) fn scroll_error_log(&mut self, delta: i32) {
        self.error_log_scroll =
            apply_delta(self.error_log_scroll, delta, self.max_error_log_scroll());
    }

    pub(super) fn page(&self) -> i32 {
        i32::from(self.viewport_height.max(2) / 2)
    }

    pub(super) fn clamp_scrolls(&mut self) {
        self.snapshot_scroll = self.snapshot_scroll.min(self.max_snapshot_scroll());
        self.error_log_scroll = self.error_log_scroll.min(self.max_error_log_scroll());
    }
}

fn max_scroll(line_count: usize, viewport: u16) -> u16 {
    line_count
        .saturating_sub(usize::from(viewport.max(1)))
        .min(u16::MAX as usize) as u16
}

fn apply_delta(current: u16, delta: i32, max: u16) -> u16 {
    (i32::from(current) + delta).clamp(0, i32::from(max)) as u16
}
