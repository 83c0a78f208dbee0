use iced::widget::{button, container, row, text};
use iced::{alignment, Alignment, Element, Length};

use crate::audio::types::PlaybackPosition;

#[derive(Debug, Clone)]
pub enum ControlMessage {
    Play,
    Pause,
}

/// Format seconds as `M:SS`, or `H:MM:SS` from one hour up. Truncates.
pub fn format_time(seconds: f64) -> String {
    let total_secs = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hrs = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hrs > 0 {
        format!("{hrs}:{mins:02}:{secs:02}")
    } else {
        format!("{mins}:{secs:02}")
    }
}

/// `elapsed / total`, once the duration is known.
pub fn view_time<'a, M: 'a>(position: Option<PlaybackPosition>) -> Element<'a, M> {
    let label = match position {
        Some(pos) => format!("{} / {}", format_time(pos.elapsed()), format_time(pos.duration())),
        None => String::new(),
    };
    container(text(label).size(14))
        .padding(6)
        .align_y(alignment::Vertical::Center)
        .into()
}

/// Play and pause buttons, disabled until playback is possible.
pub fn view_transport<'a>(enabled: bool) -> Element<'a, ControlMessage> {
    let play_btn = button(text("▶")).on_press_maybe(enabled.then_some(ControlMessage::Play));
    let pause_btn = button(text("⏸")).on_press_maybe(enabled.then_some(ControlMessage::Pause));

    container(row![play_btn, pause_btn].spacing(4).align_y(Alignment::Center))
        .width(Length::Fill)
        .align_x(alignment::Horizontal::Right)
        .into()
}
