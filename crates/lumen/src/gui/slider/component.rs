use super::model::SliderState;
use super::{SLIDER_HEIGHT, TRACK_INSET, view};
use crate::config::{EffectConfig, EffectId};
use crate::gui::slider::SliderError;
use crate::gui::theme::ThemeColors;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct SliderInit {
    pub id: EffectId,
    pub label: String,
    pub state: SliderState,
}

impl TryFrom<&EffectConfig> for SliderInit {
    type Error = SliderError;

    fn try_from(cfg: &EffectConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            id: cfg.id.clone(),
            label: cfg.label.clone(),
            state: SliderState::new(cfg.range()?, cfg.initial)?,
        })
    }
}

#[derive(Debug)]
pub enum SliderMsg {
    DragBegin(f64),
    DragUpdate(f64),
    DragEnd,
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SliderOutput {
    /// Live value while the thumb moves.
    Changed { id: EffectId, value: f64 },
    /// Final value once the finger lifts.
    Committed { id: EffectId, value: f64 },
}

/// Feeds one gesture message into the drag session of a slider drawn `width` pixels wide
/// and returns what to report upward: a `Changed` whenever the value follows the pointer,
/// exactly one `Committed` when the gesture ends, and nothing on cancel.
pub fn apply(
    id: &EffectId,
    state: &mut SliderState,
    msg: SliderMsg,
    width: f64,
) -> Option<SliderOutput> {
    let length = view::track_length(width);
    let changed = |value| SliderOutput::Changed {
        id: id.clone(),
        value,
    };

    match msg {
        SliderMsg::DragBegin(x) => {
            if view::grabs_thumb(state, width, x) {
                state.begin(length);
                None
            } else {
                Some(changed(state.begin_at(length, x - TRACK_INSET)))
            }
        }
        SliderMsg::DragUpdate(dx) => state.is_dragging().then(|| changed(state.update(dx))),
        SliderMsg::DragEnd => state.end().map(|value| SliderOutput::Committed {
            id: id.clone(),
            value,
        }),
        SliderMsg::Cancel => {
            if state.cancel() {
                log::debug!("Drag on '{}' cancelled", id);
            }
            None
        }
    }
}

pub struct EffectSlider {
    id: EffectId,
    label: String,
    value_text: String,
    state: Rc<RefCell<SliderState>>,
    drawing_area: gtk::DrawingArea,
}

impl EffectSlider {
    fn refresh(&mut self) {
        let state = self.state.borrow();
        self.value_text = state.range().format(state.value());
        drop(state);
        self.drawing_area.queue_draw();
    }
}

#[relm4::component(pub)]
impl SimpleComponent for EffectSlider {
    type Init = SliderInit;
    type Input = SliderMsg;
    type Output = SliderOutput;

    view! {
        #[root]
        gtk::Box {
            set_orientation: gtk::Orientation::Vertical,
            set_spacing: 2,
            add_css_class: "lumen-slider",

            gtk::Box {
                set_orientation: gtk::Orientation::Horizontal,

                gtk::Label {
                    set_label: &model.label,
                    set_hexpand: true,
                    set_xalign: 0.0,
                },
                gtk::Label {
                    #[watch]
                    set_label: &model.value_text,
                    add_css_class: "lumen-slider-value",
                },
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_content_height: SLIDER_HEIGHT,

                add_controller = gtk::GestureDrag {
                    connect_drag_begin[sender] => move |_, x, _| {
                        sender.input(SliderMsg::DragBegin(x));
                    },
                    connect_drag_update[sender] => move |_, dx, _| {
                        sender.input(SliderMsg::DragUpdate(dx));
                    },
                    connect_drag_end[sender] => move |_, _, _| {
                        sender.input(SliderMsg::DragEnd);
                    },
                    connect_cancel[sender] => move |_, _| {
                        sender.input(SliderMsg::Cancel);
                    },
                },
            },
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let value_text = init.state.range().format(init.state.value());
        let mut model = EffectSlider {
            id: init.id,
            label: init.label,
            value_text,
            state: Rc::new(RefCell::new(init.state)),
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();
        model.drawing_area = widgets.drawing_area.clone();

        let state_draw = model.state.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, width, height| {
                let style_context = drawing_area.style_context();
                let colors = ThemeColors::from_context(&style_context);
                let state = state_draw.borrow();
                if let Err(e) = view::draw(cr, &state, width as f64, height as f64, &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        let width = self.drawing_area.width() as f64;
        let output = apply(&self.id, &mut self.state.borrow_mut(), msg, width);

        self.refresh();
        if let Some(output) = output {
            let _ = sender.output(output);
        }
    }
}
