#![warn(clippy::unwrap_used, clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::too_many_lines,
    clippy::similar_names,
    clippy::doc_markdown,
    clippy::struct_field_names,
    clippy::struct_excessive_bools
)]
use std::sync::{
    mpsc::{self, Receiver, Sender},
    Arc,
};
use std::thread;

use backend::{handler_thread, HReq, HRes};
use color_eyre::eyre;
use egui_extras::{Column, TableBuilder};
use egui_notify::Toasts;
use num_enum::FromPrimitive;
use session::SystemSession;
use starchart::stellar;
use starchart::viewmode::ViewModeId;
use time::Duration;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use unic_langid::LanguageIdentifier;

mod backend;
mod config;
mod session;
mod viewer;

fluent_templates::static_loader! {
    static LOCALES = {
        locales: "src/locales",
        fallback_language: "en-US",
    };
}

const US_ENGLISH: LanguageIdentifier = unic_langid::langid!("en-US");

#[macro_export]
macro_rules! i18n {
    ($v:expr) => {{
        use ::fluent_templates::Loader;
        $crate::LOCALES.lookup(&$crate::US_ENGLISH, $v)
    }};
}

#[macro_export]
macro_rules! i18n_args {
    ($v:expr, $($arg:expr, $val:expr),*) => {{
	use ::fluent_templates::Loader;
	let mut args = ::std::collections::HashMap::new();
	$(
	    args.insert(::std::string::String::from($arg), ::fluent::FluentValue::from($val));
	)*
	$crate::LOCALES.lookup_with_args(&$crate::US_ENGLISH, $v, &args)
    }}
}

fn handle<T>(toasts: &mut Toasts, f: impl FnOnce(&mut Toasts) -> eyre::Result<T>) -> Option<T> {
    match f(toasts) {
        Ok(v) => Some(v),
        Err(e) => {
            toasts.error(format!("{e}"));
            error!("{:#}", e);
            None
        }
    }
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();
    let native_options = eframe::NativeOptions::default();
    let (main_tx, handler_rx) = mpsc::channel();
    let (handler_tx, main_rx) = mpsc::channel();

    let _ = thread::spawn(|| handler_thread(handler_rx, handler_tx));
    eframe::run_native(
        &i18n!("title"),
        native_options,
        Box::new(|cc| {
            Ok(Box::new(App::new(
                cc,
                Backend {
                    tx: main_tx,
                    rx: main_rx,
                    txc: 0,
                    ctx: cc.egui_ctx.clone(),
                },
            )))
        }),
    )
    .expect(&i18n!("error-start-failed"));
    std::process::exit(0)
}

pub struct Backend {
    tx: Sender<(usize, egui::Context, HReq)>,
    rx: Receiver<(usize, eyre::Result<HRes>)>,
    txc: usize,
    ctx: egui::Context,
}

impl Backend {
    pub fn tx(&mut self, req: HReq) -> eyre::Result<()> {
        self.txc += 1;
        self.tx.send((self.txc, self.ctx.clone(), req))?;
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive)]
#[repr(u16)]
pub enum DisplaySelect {
    SysInfo = 0,
    About = 1,
    #[default]
    Unknown = u16::MAX,
}

#[derive(Default)]
pub struct Displays {
    sysinfo: bool,
    about: bool,
}

#[derive(Default)]
struct State {
    dis: Displays,
    window_selector: String,
}

struct App {
    session: SystemSession,
    backend: Backend,
    toasts: Toasts,
    state: State,
}

impl App {
    fn new(cc: &eframe::CreationContext, backend: Backend) -> Self {
        cc.egui_ctx
            .style_mut(|style| style.explanation_tooltips = true);
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let mut session = SystemSession::default();
        match config::ViewerConfig::load() {
            Ok(config) => config.apply(&mut session),
            Err(e) => error!("{:#}", e),
        }

        Self {
            session,
            backend,
            toasts: Toasts::default(),
            state: State::default(),
        }
    }

    fn open_window(&mut self, selector: &str) {
        match selector.parse::<u16>().unwrap_or(u16::MAX).into() {
            DisplaySelect::SysInfo => self.state.dis.sysinfo = true,
            DisplaySelect::About => self.state.dis.about = true,
            DisplaySelect::Unknown => {}
        }
    }

    /// Kick off an async layout calculation for the current objects and
    /// mode. The slot tracks the generation so a stale result can never
    /// land over a newer one.
    fn request_layout(&mut self) {
        let Some(system) = self.session.system().cloned() else {
            return;
        };
        let Some(config) = self.session.mode_config() else {
            return;
        };
        let generation = self.session.begin_layout();
        let objects = Arc::new(system.objects.clone());
        let toasts = &mut self.toasts;
        let backend = &mut self.backend;
        handle(toasts, |_| {
            backend.tx(HReq::ComputeLayout {
                generation,
                objects,
                config,
            })
        });
    }

    fn set_mode(&mut self, mode: ViewModeId) {
        if mode == self.session.mode {
            return;
        }
        self.session.set_mode(mode);
        self.request_layout();
    }

    fn drain_backend(&mut self) {
        while let Ok((_, res)) = self.backend.rx.try_recv() {
            match res {
                Ok(HRes::LoadedSystem(system)) => {
                    self.session.install_system(system);
                    self.request_layout();
                    self.session.camera.request_birds_eye();
                }
                Ok(HRes::ComputedLayout {
                    generation,
                    layouts,
                }) => {
                    self.session.apply_layout(generation, layouts);
                }
                Err(e) => {
                    self.toasts.error(format!("{e}"));
                    error!("{:#}", e);
                }
            }
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button(i18n!("menu-file"), |ui| {
                if ui.button(i18n!("menu-file-open")).clicked() {
                    ui.close_menu();
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("system", &["json"])
                        .pick_file()
                    {
                        let toasts = &mut self.toasts;
                        let backend = &mut self.backend;
                        handle(toasts, |_| backend.tx(HReq::LoadSystem(path)));
                    }
                }
                if ui.button(i18n!("menu-file-quit")).clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
            ui.menu_button(i18n!("menu-view"), |ui| {
                let current = self.session.mode.clone();
                let mut chosen = None;
                for id in self.session.modes.ids() {
                    if ui
                        .radio(*id == current, id.as_str())
                        .clicked()
                    {
                        chosen = Some(id.clone());
                    }
                }
                if let Some(mode) = chosen {
                    ui.close_menu();
                    self.set_mode(mode);
                }
                ui.separator();
                if ui.button(i18n!("menu-view-birdseye")).clicked() {
                    ui.close_menu();
                    self.session.camera.request_birds_eye();
                }
                let profile_target = self
                    .session
                    .selected()
                    .cloned()
                    .or_else(|| self.session.tree().roots().first().cloned());
                if ui
                    .add_enabled(
                        profile_target.is_some(),
                        egui::Button::new(i18n!("menu-view-profile")),
                    )
                    .clicked()
                {
                    ui.close_menu();
                    if let Some(target) = profile_target {
                        self.session.camera.request_profile(target);
                    }
                }
            });
            ui.menu_button(i18n!("menu-time"), |ui| {
                let paused = self.session.clock.is_paused();
                let label = if paused {
                    i18n!("time-resume")
                } else {
                    i18n!("time-pause")
                };
                if ui.button(label).clicked() {
                    self.session.clock.toggle_paused();
                }
                let mut multiplier = self.session.clock.multiplier();
                ui.add(
                    egui::Slider::new(&mut multiplier, 0.0..=10_000.0)
                        .logarithmic(true)
                        .text(i18n!("time-multiplier")),
                );
                self.session.clock.set_multiplier(multiplier);
            });
            ui.menu_button(i18n!("menu-windows"), |ui| {
                ui.checkbox(&mut self.state.dis.sysinfo, i18n!("window-system"));
                ui.checkbox(&mut self.state.dis.about, i18n!("window-about"));
                ui.separator();
                let resp = ui.text_edit_singleline(&mut self.state.window_selector);
                if resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    let selector = std::mem::take(&mut self.state.window_selector);
                    self.open_window(&selector);
                }
            });
        });
    }

    fn system_window(&mut self, ctx: &egui::Context) {
        let mut clicked = None;
        egui::Window::new(i18n!("window-system"))
            .open(&mut self.state.dis.sysinfo)
            .default_width(360.0)
            .show(ctx, |ui| {
                let Some(system) = self.session.system().cloned() else {
                    ui.label(i18n!("status-no-system"));
                    return;
                };
                ui.label(i18n_args!(
                    "system-objects-loaded",
                    "objects",
                    system.objects.len()
                ));
                TableBuilder::new(ui)
                    .striped(true)
                    .column(Column::remainder())
                    .column(Column::auto())
                    .column(Column::auto())
                    .header(18.0, |mut header| {
                        header.col(|ui| {
                            ui.strong(i18n!("column-name"));
                        });
                        header.col(|ui| {
                            ui.strong(i18n!("column-class"));
                        });
                        header.col(|ui| {
                            ui.strong(i18n!("column-orbit"));
                        });
                    })
                    .body(|mut body| {
                        for object in &system.objects {
                            let selected =
                                self.session.selected().map(|s| &**s) == Some(&*object.id);
                            body.row(18.0, |mut row| {
                                row.col(|ui| {
                                    if ui.selectable_label(selected, &*object.name).clicked() {
                                        clicked = Some(object.id.clone());
                                    }
                                });
                                row.col(|ui| {
                                    if object.classification
                                        == starchart::bodies::Classification::Star
                                    {
                                        let zones = stellar::zones(stellar::luminosity(
                                            &object.properties,
                                        ));
                                        ui.label(i18n_args!(
                                            "star-zones",
                                            "class",
                                            stellar::spectral_class(
                                                object.properties.temperature
                                            )
                                            .to_string(),
                                            "snow",
                                            format!("{:.1}", zones.snow_line)
                                        ));
                                    } else {
                                        ui.label(format!("{:?}", object.classification));
                                    }
                                });
                                row.col(|ui| {
                                    match &object.orbit {
                                        Some(orbit) => ui.label(format!(
                                            "{:.2} AU",
                                            orbit.characteristic_distance()
                                        )),
                                        None => ui.label("—"),
                                    };
                                });
                            });
                        }
                    });
            });
        if let Some(id) = clicked {
            self.session.select(id);
        }
    }

    fn about_window(&mut self, ctx: &egui::Context) {
        egui::Window::new(i18n!("window-about"))
            .open(&mut self.state.dis.about)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(i18n!("about-text"));
            });
    }

    fn status_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(self.session.mode.as_str());
            ui.separator();
            match self.session.selected() {
                Some(id) => ui.label(i18n_args!("status-selected", "id", id.to_string())),
                None => ui.label(i18n!("status-nothing-selected")),
            };
            if self.session.slot.is_pending() {
                ui.separator();
                ui.spinner();
                ui.label(i18n!("status-computing"));
            }
            if let Some(error) = self.session.slot.error() {
                ui.separator();
                ui.colored_label(egui::Color32::LIGHT_RED, error);
            }
        });
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_backend();

        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            self.menu_bar(ctx, ui);
        });
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            self.status_bar(ui);
        });

        let mut clicked = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            clicked = viewer::show(ui, &mut self.session);
        });
        if let Some(id) = clicked {
            self.session.select(id);
        }

        self.system_window(ctx);
        self.about_window(ctx);

        let (now, dt) = ctx.input(|i| (i.time, i.stable_dt));
        self.session.tick(Duration::seconds_f64(dt as f64), now);

        self.toasts.show(ctx);
        // The scene animates even without input events.
        ctx.request_repaint();
    }
}
