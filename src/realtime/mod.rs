pub mod dashboard;
pub mod playback;
pub mod views;

pub use dashboard::LiveDashboard;
pub use playback::PlaybackClock;
pub use views::{Frame, IntimeView, LiveView, ServerView, TunnelView};
