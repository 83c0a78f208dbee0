use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use iced::keyboard;
use iced::task;
use iced::widget::{canvas, center, column, container, row, text};
use iced::{Background, Color, Element, Length, Subscription, Task, Theme};

use crate::audio::engine;
use crate::audio::types::*;
use crate::config::Config;
use crate::loader::{self, LoadedAudio};
use crate::ui::controls::{self, ControlMessage};
use crate::ui::waveform::WaveformView;

/// Progress of the fetch/decode/summarize sequence.
#[derive(Debug, Clone, PartialEq)]
enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

pub struct App {
    config: Config,

    // Audio engine channels
    cmd_tx: Option<Sender<AudioCommand>>,
    event_rx: Option<Receiver<AudioEvent>>,
    engine_error: Option<String>,

    // State
    status: PlaybackStatus,
    position: Option<PlaybackPosition>,
    load: LoadState,
    /// Bumped per load; results from older loads are dropped.
    generation: u64,
    load_handle: Option<task::Handle>,

    // Waveform
    waveform_view: WaveformView,
    audio: Option<Arc<AudioData>>,
}

#[derive(Debug, Clone)]
pub enum Message {
    EngineReady(Result<(Sender<AudioCommand>, Receiver<AudioEvent>), String>),
    Loaded(u64, Result<LoadedAudio, String>),
    Control(ControlMessage),
    Reload,
    Tick,
    KeyEvent(keyboard::Event),
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::from_rgb8(r, g, b)
}

impl App {
    fn new(config: Config) -> Self {
        let waveform_view = WaveformView::new(
            config.waveform.padding,
            rgb(config.waveform.stroke),
            rgb(config.waveform.background),
        );
        Self {
            config,
            cmd_tx: None,
            event_rx: None,
            engine_error: None,
            status: PlaybackStatus::Stopped,
            position: None,
            load: LoadState::Loading,
            generation: 0,
            load_handle: None,
            waveform_view,
            audio: None,
        }
    }

    /// Start a new load, aborting whatever load was still in flight.
    fn start_load(&mut self) -> Task<Message> {
        self.generation += 1;
        self.load = LoadState::Loading;
        let generation = self.generation;
        let location = self.config.source.location.clone();
        let samples = self.config.waveform.samples;
        let channel = self.config.waveform.channel;
        log::info!("Loading {location} (generation {generation})");

        let (task, handle) = Task::perform(
            async move {
                tokio::task::spawn_blocking(move || {
                    loader::load(&location, samples, channel).map_err(|e| e.to_string())
                })
                .await
                .unwrap_or_else(|e| Err(format!("Load task failed: {e}")))
            },
            move |result| Message::Loaded(generation, result),
        )
        .abortable();

        // Replacing the handle aborts the previous load.
        self.load_handle = Some(handle.abort_on_drop());
        task
    }

    fn send(&self, cmd: AudioCommand) -> bool {
        match &self.cmd_tx {
            Some(tx) => tx.send(cmd).is_ok(),
            None => false,
        }
    }

    fn can_play(&self) -> bool {
        self.cmd_tx.is_some() && self.audio.is_some() && self.load == LoadState::Ready
    }

    fn on_event(&mut self, event: AudioEvent) {
        match event {
            AudioEvent::PositionChanged(secs) => {
                if let Some(pos) = &mut self.position {
                    pos.set_elapsed(secs);
                }
            }
            AudioEvent::PlaybackFinished => {
                self.status = PlaybackStatus::Stopped;
                if let Some(pos) = &mut self.position {
                    pos.rewind();
                }
            }
            AudioEvent::Error(e) => {
                self.engine_error = Some(e);
            }
        }
    }
}

fn boot(config: Config) -> (App, Task<Message>) {
    let mut app = App::new(config);

    let engine = Task::perform(
        async {
            tokio::task::spawn_blocking(|| engine::spawn_engine().map_err(|e| e.to_string()))
                .await
                .unwrap_or_else(|e| Err(format!("Engine task failed: {e}")))
        },
        Message::EngineReady,
    );
    let load = app.start_load();

    (app, Task::batch([engine, load]))
}

fn title(app: &App) -> String {
    let name = app
        .config
        .source
        .location
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    if name.is_empty() {
        "waveplayer".to_string()
    } else {
        format!("waveplayer - {name}")
    }
}

fn update(app: &mut App, message: Message) -> Task<Message> {
    match message {
        Message::EngineReady(result) => {
            match result {
                Ok((tx, rx)) => {
                    app.cmd_tx = Some(tx);
                    app.event_rx = Some(rx);
                    if let Some(audio) = &app.audio {
                        app.send(AudioCommand::LoadAudio(audio.clone()));
                    }
                }
                Err(e) => {
                    log::error!("Audio engine unavailable: {e}");
                    app.engine_error = Some(e);
                }
            }
            Task::none()
        }
        Message::Loaded(generation, result) => {
            if generation != app.generation {
                log::debug!("Dropping stale load (generation {generation})");
                return Task::none();
            }
            app.load_handle = None;
            match result {
                Ok(loaded) => {
                    app.waveform_view.set_summary(loaded.summary);
                    app.position = Some(PlaybackPosition::new(loaded.audio.duration));
                    app.status = PlaybackStatus::Stopped;
                    app.send(AudioCommand::LoadAudio(loaded.audio.clone()));
                    app.audio = Some(loaded.audio);
                    app.load = LoadState::Ready;
                }
                Err(e) => {
                    log::error!("Load failed: {e}");
                    app.load = LoadState::Failed(e);
                }
            }
            Task::none()
        }
        Message::Control(ctrl) => {
            if !app.can_play() {
                return Task::none();
            }
            match ctrl {
                ControlMessage::Play => {
                    if app.send(AudioCommand::Play) {
                        app.status = PlaybackStatus::Playing;
                    }
                }
                ControlMessage::Pause => {
                    if app.send(AudioCommand::Pause) {
                        app.status = PlaybackStatus::Paused;
                    }
                }
            }
            Task::none()
        }
        Message::Reload => {
            app.send(AudioCommand::Stop);
            app.status = PlaybackStatus::Stopped;
            app.position = None;
            app.audio = None;
            app.waveform_view.clear();
            app.start_load()
        }
        Message::Tick => {
            let events: Vec<AudioEvent> = match &app.event_rx {
                Some(rx) => rx.try_iter().collect(),
                None => Vec::new(),
            };
            for event in events {
                app.on_event(event);
            }
            Task::none()
        }
        Message::KeyEvent(key_event) => match key_event {
            keyboard::Event::KeyPressed { key, .. } => match key.as_ref() {
                keyboard::Key::Named(keyboard::key::Named::Space) => {
                    let ctrl = match app.status {
                        PlaybackStatus::Playing => ControlMessage::Pause,
                        _ => ControlMessage::Play,
                    };
                    update(app, Message::Control(ctrl))
                }
                keyboard::Key::Character("r") => update(app, Message::Reload),
                _ => Task::none(),
            },
            _ => Task::none(),
        },
    }
}

fn view(app: &App) -> Element<'_, Message> {
    let wf = &app.config.waveform;
    let canvas_width = Length::Fixed(wf.width);
    let canvas_height = Length::Fixed(app.waveform_view.canvas_height(wf.height));

    let waveform: Element<Message> = match &app.load {
        LoadState::Ready if app.waveform_view.is_empty() => {
            center(text("No audio data").size(14))
                .width(canvas_width)
                .height(canvas_height)
                .into()
        }
        LoadState::Ready => canvas::Canvas::new(&app.waveform_view)
            .width(canvas_width)
            .height(canvas_height)
            .into(),
        LoadState::Loading => center(text("Loading…").size(14))
            .width(canvas_width)
            .height(canvas_height)
            .into(),
        LoadState::Failed(e) => center(
            text(e.as_str())
                .size(12)
                .color(Color::from_rgb(0.8, 0.1, 0.1)),
        )
        .width(canvas_width)
        .height(canvas_height)
        .into(),
    };

    let time = controls::view_time(app.position);
    let transport = controls::view_transport(app.can_play()).map(Message::Control);

    let background = rgb(wf.background);
    let player = container(
        row![waveform, time, transport]
            .spacing(8)
            .align_y(iced::Alignment::Center),
    )
    .padding(8)
    .width(Length::Fixed(wf.width + 300.0))
    .style(move |_theme| container::Style {
        background: Some(Background::Color(background)),
        ..container::Style::default()
    });

    let mut content = column![player].spacing(8).padding(10);

    if let Some(err) = &app.engine_error {
        content = content.push(
            text(format!("Playback unavailable: {err}")).color(Color::from_rgb(0.8, 0.1, 0.1)),
        );
    }

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn subscription(_app: &App) -> Subscription<Message> {
    let tick = iced::time::every(std::time::Duration::from_millis(100)).map(|_| Message::Tick);

    let keys = keyboard::listen().map(Message::KeyEvent);

    Subscription::batch([tick, keys])
}

fn theme(_app: &App) -> Theme {
    Theme::Light
}

pub fn run(config: Config) -> iced::Result {
    let window_size = (config.window.width, config.window.height);
    iced::application(move || boot(config.clone()), update, view)
        .title(title)
        .subscription(subscription)
        .theme(theme)
        .window_size(window_size)
        .run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(duration: f64) -> LoadedAudio {
        LoadedAudio {
            audio: Arc::new(AudioData {
                samples: vec![0.0; 8],
                sample_rate: 8,
                channels: 1,
                duration,
            }),
            summary: vec![0.5, 1.0],
        }
    }

    fn app() -> App {
        App::new(Config::default())
    }

    #[test]
    fn stale_load_is_ignored() {
        let mut app = app();
        app.generation = 2;
        let _ = update(&mut app, Message::Loaded(1, Ok(loaded(1.0))));
        assert_eq!(app.load, LoadState::Loading);
        assert!(app.audio.is_none());
        assert!(app.waveform_view.is_empty());
    }

    #[test]
    fn current_load_becomes_ready() {
        let mut app = app();
        app.generation = 1;
        let _ = update(&mut app, Message::Loaded(1, Ok(loaded(2.0))));
        assert_eq!(app.load, LoadState::Ready);
        assert_eq!(app.position.map(|p| p.duration()), Some(2.0));
        assert!(!app.waveform_view.is_empty());
    }

    #[test]
    fn failed_load_is_reported() {
        let mut app = app();
        app.generation = 1;
        let _ = update(&mut app, Message::Loaded(1, Err("Could not connect".into())));
        assert_eq!(app.load, LoadState::Failed("Could not connect".into()));
    }

    #[test]
    fn controls_are_ignored_before_playback_is_possible() {
        let mut app = app();
        let _ = update(&mut app, Message::Control(ControlMessage::Play));
        assert_eq!(app.status, PlaybackStatus::Stopped);
    }

    #[test]
    fn play_and_pause_reach_the_engine() {
        let mut app = app();
        let (tx, cmd_rx) = crossbeam_channel::unbounded();
        let (_event_tx, event_rx) = crossbeam_channel::unbounded();
        let _ = update(&mut app, Message::EngineReady(Ok((tx, event_rx))));
        app.generation = 1;
        let _ = update(&mut app, Message::Loaded(1, Ok(loaded(1.0))));

        let _ = update(&mut app, Message::Control(ControlMessage::Play));
        assert_eq!(app.status, PlaybackStatus::Playing);
        let _ = update(&mut app, Message::Control(ControlMessage::Pause));
        assert_eq!(app.status, PlaybackStatus::Paused);

        let cmds: Vec<_> = cmd_rx.try_iter().collect();
        assert!(matches!(cmds[0], AudioCommand::LoadAudio(_)));
        assert!(matches!(cmds[1], AudioCommand::Play));
        assert!(matches!(cmds[2], AudioCommand::Pause));
    }

    #[test]
    fn tick_applies_engine_events() {
        let mut app = app();
        let (tx, _cmd_rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let _ = update(&mut app, Message::EngineReady(Ok((tx, event_rx))));
        app.generation = 1;
        let _ = update(&mut app, Message::Loaded(1, Ok(loaded(10.0))));
        app.status = PlaybackStatus::Playing;

        event_tx.send(AudioEvent::PositionChanged(4.0)).unwrap();
        let _ = update(&mut app, Message::Tick);
        assert_eq!(app.position.map(|p| p.elapsed()), Some(4.0));

        event_tx.send(AudioEvent::PlaybackFinished).unwrap();
        let _ = update(&mut app, Message::Tick);
        assert_eq!(app.status, PlaybackStatus::Stopped);
        assert_eq!(app.position.map(|p| p.elapsed()), Some(0.0));
    }

    #[test]
    fn reload_stops_playback_and_supersedes_the_previous_load() {
        let mut app = app();
        let (tx, cmd_rx) = crossbeam_channel::unbounded();
        let (_event_tx, event_rx) = crossbeam_channel::unbounded();
        let _ = update(&mut app, Message::EngineReady(Ok((tx, event_rx))));

        let _ = app.start_load();
        let first = app.generation;
        let _ = update(&mut app, Message::Loaded(first, Ok(loaded(3.0))));
        assert_eq!(app.load, LoadState::Ready);

        let _ = update(&mut app, Message::Reload);
        assert!(app.generation > first);
        assert_eq!(app.load, LoadState::Loading);
        assert!(app.waveform_view.is_empty());
        assert!(app.position.is_none());
        assert!(app.audio.is_none());
        assert!(app.load_handle.is_some());

        let cmds: Vec<_> = cmd_rx.try_iter().collect();
        assert!(matches!(cmds.last(), Some(AudioCommand::Stop)));

        // A late result from the superseded load changes nothing.
        let _ = update(&mut app, Message::Loaded(first, Ok(loaded(3.0))));
        assert_eq!(app.load, LoadState::Loading);
        assert!(app.waveform_view.is_empty());
        assert!(app.audio.is_none());
    }

    #[test]
    fn title_uses_file_name() {
        let app = app();
        assert_eq!(title(&app), "waveplayer - d949281e5714b880c5ff32881f43ca3f.wav");
    }
}
