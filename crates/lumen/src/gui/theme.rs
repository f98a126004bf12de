use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;

pub struct ThemeColors {
    pub center: Srgba<f64>,
    pub satellite: Srgba<f64>,
    pub hovered: Srgba<f64>,
    pub label: Srgba<f64>,
    pub bridge: Srgba<f64>,
    pub track: Srgba<f64>,
    pub fill: Srgba<f64>,
    pub thumb: Srgba<f64>,
}

impl ThemeColors {
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        let accent = Self::lookup_color(
            context,
            "accent_bg_color",
            Srgba::new(0.21, 0.52, 0.89, 1.0),
            None,
        );
        Self {
            center: accent,
            satellite: Self::lookup_color(
                context,
                "theme_fg_color",
                Srgba::new(0.2, 0.2, 0.2, 0.85),
                Some(0.12),
            ),
            hovered: Srgba::new(accent.red, accent.green, accent.blue, 0.55),
            label: Self::lookup_color(
                context,
                "theme_fg_color",
                Srgba::new(0.1, 0.1, 0.1, 1.0),
                Some(0.9),
            ),
            bridge: Srgba::new(accent.red, accent.green, accent.blue, 0.35),
            track: Self::lookup_color(
                context,
                "theme_fg_color",
                Srgba::new(0.5, 0.5, 0.5, 0.25),
                Some(0.2),
            ),
            fill: accent,
            thumb: Self::lookup_color(
                context,
                "theme_base_color",
                Srgba::new(1.0, 1.0, 1.0, 1.0),
                Some(1.0),
            ),
        }
    }

    fn lookup_color(
        context: &gtk::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                let (r, g, b, a) = (
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    c.alpha() as f64,
                );
                Srgba::new(r, g, b, alpha_override.unwrap_or(a))
            })
            .unwrap_or(fallback)
    }
}

/// Sets `color` as the cairo source, scaling its alpha by `opacity`.
pub fn set_source(cr: &cairo::Context, color: Srgba<f64>, opacity: f64) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a * opacity.clamp(0.0, 1.0));
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.lumen-header .title {
    font-size: 1.6em;
    font-weight: 800;
}
.lumen-header .subtitle, .lumen-footer {
    opacity: 0.7;
}
.lumen-effects {
    padding: 12px 24px;
}
.lumen-slider-value {
    font-feature-settings: \"tnum\";
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
