use std::io::{self, Write};

use chrono::Local;
use tokio::signal;
use tokio::time::{interval, MissedTickBehavior};

use super::playback::PlaybackClock;
use super::views::{Frame, LiveView};
use crate::error::Result;
use crate::log;

/// Console dashboard redrawing one [`LiveView`] per tick until Ctrl+C, or
/// until playback has shown everything.
pub struct LiveDashboard<V: LiveView> {
    view: V,
    clock: PlaybackClock,
}

impl<V: LiveView> LiveDashboard<V> {
    pub fn new(view: V, clock: PlaybackClock) -> Self {
        Self { view, clock }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut ticker = interval(self.clock.tick());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let ctrl_c = signal::ctrl_c();
        tokio::pin!(ctrl_c);

        log!("{} started, press Ctrl+C to stop", self.view.title());

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let frame = self.view.refresh(&self.clock)?;
                    self.draw(&frame)?;
                    if frame.finished {
                        log!("playback finished after {} ms", self.clock.elapsed_ms());
                        break;
                    }
                    self.clock.advance();
                }
                _ = &mut ctrl_c => {
                    log!("stop requested, leaving {}", self.view.title());
                    break;
                }
            }
        }
        Ok(())
    }

    fn draw(&self, frame: &Frame) -> io::Result<()> {
        let mut out = io::stdout().lock();
        // 화면 지우기 (ANSI 이스케이프 코드)
        write!(out, "\x1B[2J\x1B[H")?;

        writeln!(out, "=== {} ===", self.view.title())?;
        let mode = if self.clock.is_playback() {
            format!("playback {:.1} s", self.clock.elapsed_ms() as f64 / 1000.0)
        } else {
            "live".to_string()
        };
        writeln!(out, "{}  [{}]", Local::now().format("%H:%M:%S"), mode)?;
        writeln!(out)?;

        for line in &frame.lines {
            writeln!(out, "{line}")?;
        }

        writeln!(out)?;
        writeln!(out, "Ctrl+C to stop")?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingView {
        refreshes: usize,
        finish_after: usize,
    }

    impl LiveView for CountingView {
        fn title(&self) -> &str {
            "counting"
        }

        fn refresh(&mut self, _clock: &PlaybackClock) -> Result<Frame> {
            self.refreshes += 1;
            Ok(Frame {
                lines: vec![format!("refresh {}", self.refreshes)],
                finished: self.refreshes >= self.finish_after,
            })
        }
    }

    #[tokio::test]
    async fn test_stops_when_view_finishes() {
        let view = CountingView {
            refreshes: 0,
            finish_after: 3,
        };
        let mut dashboard = LiveDashboard::new(view, PlaybackClock::new(1, true));
        dashboard.run().await.unwrap();
        assert_eq!(dashboard.view.refreshes, 3);
        // the clock does not move past the finishing frame
        assert_eq!(dashboard.clock.elapsed_ms(), 2);
    }
}
