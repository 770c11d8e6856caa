use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Paragraph, Widget},
};
use std::time::Duration;

#[derive(Default)]
pub struct DebugState {
    pub enabled: bool,
    pub num_events: usize,
    pub num_key_events: usize,
    pub num_frames: usize,
    pub last_key_event_name: String,
    /// Full reruns of the active page since startup.
    pub reruns: usize,
    pub last_build: Duration,
    pub focus: String,
}

impl DebugState {
    pub fn on_key(&mut self, event: &crossterm::event::KeyEvent) {
        self.num_key_events += 1;
        self.last_key_event_name = format!("{:?}", event.code);
    }

    pub fn on_rerun(&mut self, took: Duration) {
        self.reruns += 1;
        self.last_build = took;
    }
}

impl Widget for &DebugState {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(format!(
            "events={} keys={} last_key={} focus={} reruns={} build={:.1}ms frames={}",
            self.num_events,
            self.num_key_events,
            self.last_key_event_name,
            self.focus,
            self.reruns,
            self.last_build.as_secs_f64() * 1000.0,
            self.num_frames,
        ))
        .render(area, buf);
    }
}
