//! Terminal colours for help output, the spinner and the session summary.
//!
//! ```
//! use scanpipe::core::styles::StyleRole;
//! assert_eq!(StyleRole::Success.paint("done", false), "done");
//! assert_eq!(StyleRole::Success.paint("done", true), "\x1b[92mdone\x1b[0m");
//! ```

use clap::builder::styling::{AnsiColor, Color as ClapColor, Style, Styles};

// Each role carries its clap colour; the SGR code is derived from it.
macro_rules! style {
    ( $( $variant:ident => $color:ident ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> AnsiColor {
                match self { $( StyleRole::$variant => AnsiColor::$color ),+ }
            }
        }
    }
}

style! {
    Header  => Yellow,
    Literal => Cyan,
    Invalid => Red,
    Error   => BrightRed,
    Success => BrightGreen,
    Dim     => BrightBlack,
}

impl StyleRole {
    /// Foreground SGR parameter for this role
    pub fn sgr(self) -> u8 {
        match self.color() {
            AnsiColor::Black => 30,
            AnsiColor::Red => 31,
            AnsiColor::Green => 32,
            AnsiColor::Yellow => 33,
            AnsiColor::Blue => 34,
            AnsiColor::Magenta => 35,
            AnsiColor::Cyan => 36,
            AnsiColor::White => 37,
            AnsiColor::BrightBlack => 90,
            AnsiColor::BrightRed => 91,
            AnsiColor::BrightGreen => 92,
            AnsiColor::BrightYellow => 93,
            AnsiColor::BrightBlue => 94,
            AnsiColor::BrightMagenta => 95,
            AnsiColor::BrightCyan => 96,
            AnsiColor::BrightWhite => 97,
        }
    }

    pub fn paint(self, text: &str, enabled: bool) -> String {
        if enabled {
            format!("\x1b[{}m{}\x1b[0m", self.sgr(), text)
        } else {
            text.to_string()
        }
    }

    fn clap_style(self) -> Style {
        Style::new().fg_color(Some(ClapColor::Ansi(self.color())))
    }
}

/// clap help styles; plain when colour is off
pub fn palette_to_clap(enabled: bool) -> Styles {
    if !enabled {
        return Styles::plain();
    }
    Styles::styled()
        .header(StyleRole::Header.clap_style().bold())
        .usage(StyleRole::Header.clap_style().bold())
        .literal(StyleRole::Literal.clap_style())
        .placeholder(StyleRole::Dim.clap_style())
        .invalid(StyleRole::Invalid.clap_style())
        .error(StyleRole::Error.clap_style().bold())
}
