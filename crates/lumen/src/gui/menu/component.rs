use super::model::{MenuOutput, State};
use super::view::{self, MenuArt};
use crate::anim::Spring;
use crate::config::{MenuConfig, SatelliteConfig};
use crate::geometry::Point;
use crate::gui::theme::ThemeColors;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MenuInit {
    pub menu: MenuConfig,
    pub satellites: Vec<SatelliteConfig>,
    pub reduced_motion: bool,
    pub photo: Option<PathBuf>,
}

#[derive(Debug)]
pub enum MenuMsg {
    Press(Point),
    Motion(Point),
    Leave,
    Reconfigure(MenuInit),
    SetReducedMotion(bool),
}

/// The radial menu widget. Owns the menu state; the draw function and frame clock only
/// borrow it.
pub struct RadialMenu {
    state: Rc<RefCell<State>>,
    art: Rc<RefCell<MenuArt>>,
    drawing_area: gtk::DrawingArea,
    ticker: Option<gtk::TickCallbackId>,
}

impl RadialMenu {
    fn build_state(init: &MenuInit) -> Option<State> {
        match State::new(&init.menu, &init.satellites, init.reduced_motion) {
            Ok(state) => Some(state),
            Err(e) => {
                log::error!("Invalid menu configuration: {}", e);
                None
            }
        }
    }

    fn replay(&mut self) {
        self.state.borrow_mut().start_entrance();
        self.ensure_ticking();
    }

    /// (Re)installs the frame callback that drives the entrance and the idle pulse.
    fn ensure_ticking(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.remove();
        }

        let state = self.state.clone();
        self.ticker = Some(self.drawing_area.add_tick_callback(move |area, clock| {
            let now = Duration::from_micros(clock.frame_time().max(0) as u64);
            let more = state.borrow_mut().tick(now);
            area.queue_draw();
            if more {
                glib::ControlFlow::Continue
            } else {
                glib::ControlFlow::Break
            }
        }));
        self.drawing_area.queue_draw();
    }
}

#[relm4::component(pub)]
impl SimpleComponent for RadialMenu {
    type Init = MenuInit;
    type Input = MenuMsg;
    type Output = MenuOutput;

    view! {
        #[root]
        #[name = "drawing_area"]
        gtk::DrawingArea {
            set_hexpand: true,
            set_vexpand: true,
            set_content_width: 360,
            set_content_height: 360,
            add_css_class: "lumen-menu",

            add_controller = gtk::EventControllerMotion {
                connect_motion[sender] => move |_, x, y| {
                    sender.input(MenuMsg::Motion(Point::new(x, y)));
                },
                connect_leave[sender] => move |_| {
                    sender.input(MenuMsg::Leave);
                }
            },

            add_controller = gtk::GestureClick {
                connect_released[sender] => move |_, _, x, y| {
                    sender.input(MenuMsg::Press(Point::new(x, y)));
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let state = Self::build_state(&init).unwrap_or_else(|| {
            State::with_spring(
                &init.menu,
                Spring::default(),
                &init.satellites,
                init.reduced_motion,
            )
        });
        let art = MenuArt::load(&state.satellites, init.photo.as_deref());

        let mut model = RadialMenu {
            state: Rc::new(RefCell::new(state)),
            art: Rc::new(RefCell::new(art)),
            drawing_area: root.clone(),
            ticker: None,
        };

        let widgets = view_output!();

        let state_resize = model.state.clone();
        widgets.drawing_area.connect_resize(move |_, width, height| {
            state_resize
                .borrow_mut()
                .set_bounds(width as f64, height as f64);
        });

        let (state_draw, art_draw) = (model.state.clone(), model.art.clone());
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, _, _| {
                let style_context = drawing_area.style_context();
                let colors = ThemeColors::from_context(&style_context);
                if let Err(e) = view::draw(cr, &state_draw.borrow(), &art_draw.borrow(), &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        model.replay();

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            MenuMsg::Press(point) => {
                let output = self.state.borrow().press(point);
                if let Some(output) = output {
                    log::debug!("Menu press: {:?}", output);
                    let _ = sender.output(output);
                }
            }
            MenuMsg::Motion(point) => {
                if self.state.borrow_mut().update_cursor(point) {
                    self.drawing_area.queue_draw();
                }
            }
            MenuMsg::Leave => {
                if self.state.borrow_mut().clear_hover() {
                    self.drawing_area.queue_draw();
                }
            }
            MenuMsg::Reconfigure(init) => {
                let Some(mut state) = Self::build_state(&init) else {
                    return;
                };
                {
                    let old = self.state.borrow();
                    state.center = old.center;
                    state.scale_factor = old.scale_factor;
                }
                *self.art.borrow_mut() = MenuArt::load(&state.satellites, init.photo.as_deref());
                *self.state.borrow_mut() = state;
                self.replay();
            }
            MenuMsg::SetReducedMotion(reduced) => {
                self.state.borrow_mut().set_reduced_motion(reduced);
                self.ensure_ticking();
            }
        }
    }
}
