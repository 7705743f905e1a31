use std::{
    fmt::Display,
    sync::atomic::{AtomicBool, Ordering},
};

use nu_ansi_term::Color;

static COLOR: AtomicBool = AtomicBool::new(true);

pub fn disable_color() {
    COLOR.store(false, Ordering::Relaxed);
}

pub fn term_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if COLOR.load(Ordering::Relaxed) {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}
