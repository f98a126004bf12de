use super::model::SliderState;
use super::{THUMB_RADIUS, TRACK_HEIGHT, TRACK_INSET};
use crate::gui::theme::{ThemeColors, set_source};
use cairo::Context;
use std::f64::consts::{PI, TAU};

/// Usable track length for a drawing area `width` pixels wide.
pub fn track_length(width: f64) -> f64 {
    (width - 2.0 * TRACK_INSET).max(0.0)
}

/// Horizontal centre of the thumb.
pub fn thumb_x(state: &SliderState, width: f64) -> f64 {
    TRACK_INSET + state.normalized() * track_length(width)
}

/// Whether a press at `x` grabs the thumb rather than jumping to a new position.
pub fn grabs_thumb(state: &SliderState, width: f64, x: f64) -> bool {
    (x - thumb_x(state, width)).abs() <= THUMB_RADIUS * 1.5
}

fn rounded_bar(cr: &Context, x: f64, y: f64, width: f64, height: f64) {
    let r = height / 2.0;
    cr.new_sub_path();
    cr.arc(x + width - r, y + r, r, -PI / 2.0, PI / 2.0);
    cr.arc(x + r, y + r, r, PI / 2.0, 3.0 * PI / 2.0);
    cr.close_path();
}

pub fn draw(
    cr: &Context,
    state: &SliderState,
    width: f64,
    height: f64,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let length = track_length(width);
    let y = height / 2.0;
    let thumb = thumb_x(state, width);

    set_source(cr, colors.track, 1.0);
    rounded_bar(cr, TRACK_INSET, y - TRACK_HEIGHT / 2.0, length, TRACK_HEIGHT);
    cr.fill()?;

    let filled = thumb - TRACK_INSET;
    if filled >= TRACK_HEIGHT {
        set_source(cr, colors.fill, 1.0);
        rounded_bar(cr, TRACK_INSET, y - TRACK_HEIGHT / 2.0, filled, TRACK_HEIGHT);
        cr.fill()?;
    }

    // a grabbed thumb swells slightly
    let radius = if state.is_dragging() {
        THUMB_RADIUS * 1.15
    } else {
        THUMB_RADIUS
    };
    set_source(cr, colors.thumb, 1.0);
    cr.arc(thumb, y, radius, 0.0, TAU);
    cr.fill_preserve()?;
    set_source(cr, colors.fill, 1.0);
    cr.set_line_width(2.0);
    cr.stroke()
}
