use super::model::{Hit, Satellite, SatelliteGeometry, State};
use super::{ICON_SIZE, LABEL_FONT_SIZE, LABEL_GAP};
use crate::gui::theme::{ThemeColors, set_source};
use cairo::Context;
use gdk_pixbuf::Pixbuf;
use gdk4::prelude::*;
use lumen_platform::icon;
use std::f64::consts::TAU;
use std::path::Path;

/// Images drawn by the menu, loaded once per configuration.
#[derive(Default)]
pub struct MenuArt {
    pub photo: Option<Pixbuf>,
    pub icons: Vec<Option<Pixbuf>>,
}

impl MenuArt {
    pub fn load(satellites: &[Satellite], photo: Option<&Path>) -> Self {
        Self {
            photo: photo.and_then(Self::load_photo),
            icons: satellites
                .iter()
                .map(|s| {
                    icon::find_icon_path(&s.icon).and_then(|path| {
                        Pixbuf::from_file_at_scale(&path, ICON_SIZE, ICON_SIZE, true).ok()
                    })
                })
                .collect(),
        }
    }

    fn load_photo(path: &Path) -> Option<Pixbuf> {
        match Pixbuf::from_file_at_scale(path, ICON_SIZE * 2, ICON_SIZE * 2, true) {
            Ok(pixbuf) => Some(pixbuf),
            Err(e) => {
                log::error!("Failed to load photo {}: {}", path.display(), e);
                None
            }
        }
    }
}

struct SatelliteRenderer<'a> {
    satellite: &'a Satellite,
    geometry: SatelliteGeometry,
    icon: Option<&'a Pixbuf>,
    hovered: bool,
    scale: f64,
}

impl SatelliteRenderer<'_> {
    fn draw(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        if self.geometry.opacity <= 0.0 {
            return Ok(());
        }
        self.draw_circle(cr, colors)?;
        if let Some(pixbuf) = self.icon {
            self.draw_icon(cr, pixbuf)?;
        } else {
            self.draw_glyph(cr, colors)?;
        }
        self.draw_label(cr, colors)
    }

    fn draw_circle(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        let color = if self.hovered {
            colors.hovered
        } else {
            colors.satellite
        };
        set_source(cr, color, self.geometry.opacity);
        cr.arc(
            self.geometry.center.x,
            self.geometry.center.y,
            self.geometry.radius,
            0.0,
            TAU,
        );
        cr.fill()
    }

    fn draw_icon(&self, cr: &Context, pixbuf: &Pixbuf) -> Result<(), cairo::Error> {
        let icon_scale = (self.geometry.radius * 2.0 * 0.55) / ICON_SIZE as f64;
        let (iw, ih) = (
            pixbuf.width() as f64 * icon_scale,
            pixbuf.height() as f64 * icon_scale,
        );

        cr.save()?;
        cr.translate(
            self.geometry.center.x - iw / 2.0,
            self.geometry.center.y - ih / 2.0,
        );
        cr.scale(icon_scale, icon_scale);
        cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
        cr.paint_with_alpha(self.geometry.opacity)?;
        cr.restore()
    }

    /// Icons that resolve to no image are drawn as text, which covers emoji and symbols.
    fn draw_glyph(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        let glyph = self.satellite.icon.as_str();
        set_source(cr, colors.label, self.geometry.opacity);
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
        cr.set_font_size(self.geometry.radius * 0.8);
        let ext = cr.text_extents(glyph)?;
        cr.move_to(
            self.geometry.center.x - ext.width() / 2.0 - ext.x_bearing(),
            self.geometry.center.y - ext.height() / 2.0 - ext.y_bearing(),
        );
        cr.show_text(glyph)
    }

    fn draw_label(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        // labels fade in over the last part of the entrance
        let opacity = ((self.geometry.progress - 0.6) / 0.4).clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return Ok(());
        }
        let text = self.satellite.label.as_str();
        set_source(cr, colors.label, opacity);
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Normal);
        cr.set_font_size(LABEL_FONT_SIZE * self.scale);
        let ext = cr.text_extents(text)?;
        cr.move_to(
            self.geometry.center.x - ext.width() / 2.0 - ext.x_bearing(),
            self.geometry.center.y + self.geometry.radius + LABEL_GAP * self.scale + ext.height(),
        );
        cr.show_text(text)
    }
}

/// The "liquid" neck between the centre and a satellite that has not fully detached yet.
fn draw_bridge(
    cr: &Context,
    state: &State,
    geometry: &SatelliteGeometry,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let detach = 1.0 - geometry.progress.clamp(0.0, 1.0);
    if detach <= 0.05 || geometry.progress <= 0.0 {
        return Ok(());
    }
    set_source(cr, colors.bridge, detach);
    cr.set_line_width(geometry.radius * detach * 1.2);
    cr.set_line_cap(cairo::LineCap::Round);
    cr.move_to(state.center.x, state.center.y);
    cr.line_to(geometry.center.x, geometry.center.y);
    cr.stroke()
}

fn draw_center(
    cr: &Context,
    state: &State,
    art: &MenuArt,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let opacity = state.center_opacity();
    if opacity <= 0.0 {
        return Ok(());
    }
    let radius = state.center_radius() * state.center_scale();
    let hovered = state.hover == Some(Hit::Center);

    cr.arc(state.center.x, state.center.y, radius, 0.0, TAU);
    match &art.photo {
        Some(photo) => {
            cr.save()?;
            cr.clip();
            let side = photo.width().min(photo.height()) as f64;
            let scale = radius * 2.0 / side;
            cr.translate(state.center.x, state.center.y);
            cr.scale(scale, scale);
            cr.set_source_pixbuf(
                photo,
                -photo.width() as f64 / 2.0,
                -photo.height() as f64 / 2.0,
            );
            cr.paint_with_alpha(opacity)?;
            cr.restore()?;
        }
        None => {
            set_source(cr, colors.center, opacity);
            cr.fill()?;
        }
    }

    if hovered {
        set_source(cr, colors.hovered, opacity);
        cr.set_line_width(3.0 * state.scale_factor);
        cr.arc(state.center.x, state.center.y, radius, 0.0, TAU);
        cr.stroke()?;
    }
    Ok(())
}

pub fn draw(
    cr: &Context,
    state: &State,
    art: &MenuArt,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let geometries = state.geometries();

    for geometry in &geometries {
        draw_bridge(cr, state, geometry, colors)?;
    }

    for (i, (satellite, geometry)) in state.satellites.iter().zip(geometries).enumerate() {
        SatelliteRenderer {
            satellite,
            geometry,
            icon: art.icons.get(i).and_then(Option::as_ref),
            hovered: state.hover == Some(Hit::Satellite(i)),
            scale: state.scale_factor,
        }
        .draw(cr, colors)?;
    }

    // drawn last so satellites still tucked under the centre stay hidden
    draw_center(cr, state, art, colors)
}
