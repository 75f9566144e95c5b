use yansi::Paint;

/// Color palette for the note list
pub struct ColorPalette {
    pub name: (u8, u8, u8),
    pub header: (u8, u8, u8),
    pub timestamp: (u8, u8, u8),
    pub placeholder: (u8, u8, u8),
}

impl ColorPalette {
    pub const CATPPUCCIN: Self = Self {
        name: (205, 214, 244),        // Text
        header: (148, 226, 213),      // Teal
        timestamp: (137, 180, 250),   // Blue
        placeholder: (108, 112, 134), // Gray
    };
}

pub struct FormatContext {
    pub use_color: bool,
    pub palette: ColorPalette,
}

impl FormatContext {
    pub fn new(use_color: bool) -> Self {
        Self { use_color, palette: ColorPalette::CATPPUCCIN }
    }

    pub fn format_header(&self, text: &str) -> String {
        self.paint(text, self.palette.header, true)
    }

    /// Auto-generated names are dimmed so real titles stand out.
    pub fn format_name(&self, name: &str) -> String {
        if crate::note::is_placeholder(name) {
            self.paint(name, self.palette.placeholder, false)
        } else {
            self.paint(name, self.palette.name, false)
        }
    }

    pub fn format_timestamp(&self, ts: &str) -> String {
        self.paint(ts, self.palette.timestamp, false)
    }

    fn paint(&self, text: &str, (r, g, b): (u8, u8, u8), bold: bool) -> String {
        if !self.use_color {
            return text.to_string();
        }
        let painted = Paint::rgb(text, r, g, b);
        if bold { painted.bold().to_string() } else { painted.to_string() }
    }
}
