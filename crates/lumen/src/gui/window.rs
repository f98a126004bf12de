use gtk::prelude::*;
use gtk4 as gtk;

/// Whether the desktop asks for reduced motion (animations disabled in GTK settings).
pub fn system_reduced_motion() -> bool {
    gtk::Settings::default().is_some_and(|s| !s.is_gtk_enable_animations())
}

/// Calls `f` with the new reduced-motion preference whenever the desktop setting flips.
pub fn connect_reduced_motion<F: Fn(bool) + 'static>(f: F) {
    if let Some(settings) = gtk::Settings::default() {
        settings.connect_gtk_enable_animations_notify(move |s| {
            f(!s.is_gtk_enable_animations());
        });
    }
}

/// Points the window's default size at the menu's reference layout.
pub fn init_window(window: &gtk::ApplicationWindow, title: &str) {
    window.set_title(Some(title));
    window.set_default_size(480, 760);
    window.add_css_class("lumen-window");
}
