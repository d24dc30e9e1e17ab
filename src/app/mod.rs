use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Pos2, Rect, vec2};
use graph_spotlight::SyncEngine;
use graph_spotlight::backend::{ExternalLayoutBackend, InteractiveBackend, LiveBackend};

use self::render::CardTextures;
use self::scene::{Scene, load_scene};

mod fps;
mod interaction;
mod render;
mod scene;
mod view;

#[derive(Clone, Debug)]
pub struct LaunchOptions {
    pub graph_path: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub batch: bool,
}

pub struct SpotlightApp {
    options: LaunchOptions,
    state: AppState,
    reload_rx: Option<Receiver<Result<Scene, String>>>,
}

enum AppState {
    Loading { rx: Receiver<Result<Scene, String>> },
    Live(Box<ViewModel<LiveBackend>>),
    Batch(Box<ViewModel<ExternalLayoutBackend>>),
    Error(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Live,
    Batch,
}

impl Mode {
    fn label(self) -> &'static str {
        match self {
            Self::Live => "live layout",
            Self::Batch => "batch layout",
        }
    }
}

struct ViewModel<B> {
    engine: SyncEngine<B>,
    mode: Mode,
    source: String,
    cards: CardTextures,
    connecting: Option<String>,
    paused: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

impl<B: InteractiveBackend> ViewModel<B> {
    fn new(scene: Scene, backend: B, mode: Mode) -> Self {
        let Scene {
            graph,
            config,
            source,
        } = scene;
        Self {
            engine: SyncEngine::new(graph, backend, config),
            mode,
            source,
            cards: CardTextures::new(),
            connecting: None,
            paused: false,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        }
    }
}

/// Placeholder until the first frame reports the real canvas rect.
fn initial_viewport() -> Rect {
    Rect::from_min_size(Pos2::ZERO, vec2(1440.0, 920.0))
}

impl SpotlightApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, options: LaunchOptions) -> Self {
        let state = Self::start_load(&options);
        Self {
            options,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(options: &LaunchOptions) -> Receiver<Result<Scene, String>> {
        let (tx, rx) = mpsc::channel();
        let graph_path = options.graph_path.clone();
        let config_path = options.config_path.clone();

        thread::spawn(move || {
            let result = load_scene(graph_path.as_deref(), config_path.as_deref())
                .map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(options: &LaunchOptions) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(options),
        }
    }

    fn ready_state(&self, result: Result<Scene, String>) -> AppState {
        let scene = match result {
            Ok(scene) => scene,
            Err(error) => {
                log::error!("failed to load graph: {error}");
                return AppState::Error(error);
            }
        };

        let viewport = initial_viewport();
        if self.options.batch {
            let backend = ExternalLayoutBackend::new(scene.config.overlay, viewport);
            AppState::Batch(Box::new(ViewModel::new(scene, backend, Mode::Batch)))
        } else {
            let backend = LiveBackend::new(scene.config.layout, scene.config.overlay, viewport);
            AppState::Live(Box::new(ViewModel::new(scene, backend, Mode::Live)))
        }
    }
}

impl eframe::App for SpotlightApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut reload_requested = false;
        let is_reloading = self.reload_rx.is_some();

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        reload_requested = true;
                    }
                });
            }
            AppState::Live(model) => model.show(ctx, &mut reload_requested, is_reloading),
            AppState::Batch(model) => model.show(ctx, &mut reload_requested, is_reloading),
        }

        if reload_requested && self.reload_rx.is_none() {
            self.reload_rx = Some(Self::spawn_load(&self.options));
        }

        if let Some(rx) = self.reload_rx.take() {
            match rx.try_recv() {
                Ok(result) => transition = Some(result),
                Err(TryRecvError::Empty) => self.reload_rx = Some(rx),
                Err(TryRecvError::Disconnected) => {
                    transition = Some(Err("Background load worker disconnected".to_owned()));
                }
            }
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = self.ready_state(result);
        }
    }
}
