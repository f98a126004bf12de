use crate::config::{self, Config, EffectConfig, EffectId, SatelliteId};
use crate::events::AppEvent;
use crate::gui::chrome::{Chrome, SLIDE_DISTANCE};
use crate::gui::menu::{MenuInit, MenuMsg, MenuOutput, RadialMenu};
use crate::gui::slider::{EffectSlider, SliderInit, SliderOutput};
use crate::gui::{theme, window};
use crate::sys::launch;
use gtk::prelude::*;
use gtk4 as gtk;
use lumen_platform::haptics::{self, HapticKind, HapticSink};
use lumen_platform::icon;
use lumen_platform::photo::{self, PathResolver, PhotoRef, ResolveError};
use relm4::prelude::*;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

const CHROME_MARGIN: f64 = 8.0;

pub struct AppInit {
    pub config: Config,
    /// Photo reference from the command line, resolved once the window exists.
    pub photo: Option<String>,
    /// Command line override; beats both the config file and the desktop setting.
    pub reduced_motion: Option<bool>,
    pub events: async_channel::Receiver<AppEvent>,
}

pub struct AppModel {
    config: Config,
    haptics: Box<dyn HapticSink>,
    photo: Option<PathBuf>,
    subtitle: String,
    reduced_motion_override: Option<bool>,
    system_reduced_motion: bool,
    menu: Controller<RadialMenu>,
    sliders: Vec<Controller<EffectSlider>>,
    effects_box: gtk::Box,
    effects_visible: bool,
    chrome: Rc<RefCell<Chrome>>,
    header_opacity: f64,
    header_offset: f64,
    footer_opacity: f64,
    footer_offset: f64,
    root: gtk::ApplicationWindow,
}

#[derive(Debug)]
pub enum AppMsg {
    CenterPressed,
    SatellitePressed(SatelliteId),
    EffectChanged(EffectId, f64),
    EffectCommitted(EffectId, f64),
    ChromeFrame,
    SystemReducedMotion(bool),
    ConfigReload,
    Close,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

impl From<MenuOutput> for AppMsg {
    fn from(output: MenuOutput) -> Self {
        match output {
            MenuOutput::CenterPressed => AppMsg::CenterPressed,
            MenuOutput::SatellitePressed(id) => AppMsg::SatellitePressed(id),
        }
    }
}

impl From<SliderOutput> for AppMsg {
    fn from(output: SliderOutput) -> Self {
        match output {
            SliderOutput::Changed { id, value } => AppMsg::EffectChanged(id, value),
            SliderOutput::Committed { id, value } => AppMsg::EffectCommitted(id, value),
        }
    }
}

fn resolve_photo(reference: &str) -> Result<PathBuf, ResolveError> {
    let reference: PhotoRef = reference.parse()?;
    Ok(photo::default_resolver().resolve(&reference)?.to_path())
}

fn subtitle_for(photo: Option<&PathBuf>) -> String {
    photo
        .and_then(|p| p.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "No photo selected".to_string())
}

impl AppModel {
    fn reduced_motion(&self) -> bool {
        self.reduced_motion_override
            .unwrap_or_else(|| self.config.reduced_motion(self.system_reduced_motion))
    }

    fn menu_init(&self) -> MenuInit {
        MenuInit {
            menu: self.config.menu.clone(),
            satellites: self.config.satellites.clone(),
            reduced_motion: self.reduced_motion(),
            photo: self.photo.clone(),
        }
    }

    fn pulse(&self, kind: HapticKind) {
        if let Err(e) = self.haptics.pulse(kind) {
            log::error!("Haptic {} failed: {}", kind, e);
        }
    }

    fn sync_chrome(&mut self) {
        let chrome = self.chrome.borrow();
        self.header_opacity = chrome.header_opacity();
        self.header_offset = chrome.header_offset();
        self.footer_opacity = chrome.footer_opacity();
        self.footer_offset = chrome.footer_offset();
    }

    /// Replaces every slider in the effects panel with one per configured effect. Effects
    /// with an unusable range are logged and left out.
    fn rebuild_sliders(&mut self, sender: &ComponentSender<Self>) {
        while let Some(child) = self.effects_box.first_child() {
            self.effects_box.remove(&child);
        }
        self.sliders = self
            .config
            .effects
            .iter()
            .filter_map(|effect: &EffectConfig| match SliderInit::try_from(effect) {
                Ok(init) => Some(init),
                Err(e) => {
                    log::error!("Skipping effect '{}': {}", effect.id, e);
                    None
                }
            })
            .map(|init| {
                EffectSlider::builder()
                    .launch(init)
                    .forward(sender.input_sender(), AppMsg::from)
            })
            .collect();
        for slider in &self.sliders {
            self.effects_box.append(slider.widget());
        }
    }

    fn run_satellite(&self, id: &SatelliteId) {
        self.pulse(HapticKind::Selection);

        let Some(satellite) = self.config.satellites.iter().find(|s| &s.id == id) else {
            log::error!("Pressed unknown satellite '{}'", id);
            return;
        };
        match &satellite.exec {
            Some(exec) => {
                log::debug!("Running '{}' for satellite '{}'", exec, id);
                if let Err(e) = launch::spawn(exec, id, self.photo.as_deref()) {
                    log::error!("Failed to run '{}': {}", exec, e);
                }
            }
            None => log::info!("Satellite '{}' pressed, no action configured", id),
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = AppInit;
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        gtk::ApplicationWindow {
            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gtk::gdk::Key::Escape {
                        sender.input(AppMsg::Close);
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            gtk::Box {
                set_orientation: gtk::Orientation::Vertical,

                gtk::Box {
                    set_orientation: gtk::Orientation::Vertical,
                    add_css_class: "lumen-header",
                    set_margin_start: 24,
                    set_margin_end: 24,
                    #[watch]
                    set_opacity: model.header_opacity,
                    #[watch]
                    set_margin_top: (CHROME_MARGIN + model.header_offset) as i32,
                    #[watch]
                    set_margin_bottom: (CHROME_MARGIN + SLIDE_DISTANCE - model.header_offset) as i32,

                    gtk::Label {
                        set_label: "Lumen",
                        add_css_class: "title",
                        set_xalign: 0.0,
                    },
                    gtk::Label {
                        #[watch]
                        set_label: &model.subtitle,
                        add_css_class: "subtitle",
                        set_xalign: 0.0,
                        set_ellipsize: gtk::pango::EllipsizeMode::Middle,
                    },
                },

                #[local_ref]
                menu_widget -> gtk::DrawingArea {},

                gtk::Revealer {
                    set_transition_type: gtk::RevealerTransitionType::SlideUp,
                    #[watch]
                    set_transition_duration: if model.reduced_motion() { 0 } else { 250 },
                    #[watch]
                    set_reveal_child: model.effects_visible,

                    #[name = "effects_box"]
                    gtk::Box {
                        set_orientation: gtk::Orientation::Vertical,
                        set_spacing: 12,
                        add_css_class: "lumen-effects",
                    },
                },

                gtk::Label {
                    set_label: "Tap the photo for effects, Esc to close",
                    add_css_class: "lumen-footer",
                    #[watch]
                    set_opacity: model.footer_opacity,
                    #[watch]
                    set_margin_top: (CHROME_MARGIN + model.footer_offset) as i32,
                    #[watch]
                    set_margin_bottom: (CHROME_MARGIN + SLIDE_DISTANCE - model.footer_offset) as i32,
                },
            },
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let AppInit {
            config,
            photo: photo_ref,
            reduced_motion: reduced_motion_override,
            events,
        } = init;

        theme::load_css();
        window::init_window(&root, "Lumen");

        let haptics = haptics::sink_for(config.haptics.command.as_ref());
        let photo = photo_ref.and_then(|reference| match resolve_photo(&reference) {
            Ok(path) => {
                log::info!("Editing {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::error!("Cannot open photo '{}': {}", reference, e);
                if let Err(e) = haptics.pulse(HapticKind::Error) {
                    log::error!("Haptic {} failed: {}", HapticKind::Error, e);
                }
                None
            }
        });

        let system_reduced_motion = window::system_reduced_motion();
        let reduced = reduced_motion_override
            .unwrap_or_else(|| config.reduced_motion(system_reduced_motion));

        let menu = RadialMenu::builder()
            .launch(MenuInit {
                menu: config.menu.clone(),
                satellites: config.satellites.clone(),
                reduced_motion: reduced,
                photo: photo.clone(),
            })
            .forward(sender.input_sender(), AppMsg::from);

        let chrome = Rc::new(RefCell::new(Chrome::new(reduced)));
        chrome.borrow_mut().start();

        let mut model = AppModel {
            subtitle: subtitle_for(photo.as_ref()),
            config,
            haptics,
            photo,
            reduced_motion_override,
            system_reduced_motion,
            menu,
            sliders: Vec::new(),
            effects_box: gtk::Box::default(),
            effects_visible: false,
            chrome: chrome.clone(),
            header_opacity: 0.0,
            header_offset: SLIDE_DISTANCE,
            footer_opacity: 0.0,
            footer_offset: SLIDE_DISTANCE,
            root: root.clone(),
        };
        model.sync_chrome();

        let menu_widget = model.menu.widget();
        let widgets = view_output!();

        model.effects_box = widgets.effects_box.clone();
        model.rebuild_sliders(&sender);

        if !reduced {
            let sender_tick = sender.clone();
            root.add_tick_callback(move |_, clock| {
                let now = Duration::from_micros(clock.frame_time().max(0) as u64);
                let more = chrome.borrow_mut().tick(now);
                sender_tick.input(AppMsg::ChromeFrame);
                if more {
                    glib::ControlFlow::Continue
                } else {
                    glib::ControlFlow::Break
                }
            });
        }

        let sender_motion = sender.clone();
        window::connect_reduced_motion(move |reduced| {
            sender_motion.input(AppMsg::SystemReducedMotion(reduced));
        });

        let sender_events = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = events.recv().await {
                sender_events.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            AppMsg::CenterPressed => {
                self.pulse(HapticKind::Light);
                self.effects_visible = !self.effects_visible;
            }
            AppMsg::SatellitePressed(id) => self.run_satellite(&id),
            AppMsg::EffectChanged(id, value) => {
                log::debug!("Previewing {} = {}", id, value);
            }
            AppMsg::EffectCommitted(id, value) => {
                self.pulse(HapticKind::Selection);
                log::info!("Committed {} = {}", id, value);
            }
            AppMsg::ChromeFrame => self.sync_chrome(),
            AppMsg::SystemReducedMotion(reduced) => {
                self.system_reduced_motion = reduced;
                let effective = self.reduced_motion();
                self.chrome.borrow_mut().set_reduced_motion(effective);
                self.sync_chrome();
                self.menu.emit(MenuMsg::SetReducedMotion(effective));
            }
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    self.config = new_config;
                    self.haptics = haptics::sink_for(self.config.haptics.command.as_ref());
                    icon::clear_cache();
                    self.menu.emit(MenuMsg::Reconfigure(self.menu_init()));
                    self.rebuild_sliders(&sender);
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
            AppMsg::Close => self.root.close(),
        }
    }
}
