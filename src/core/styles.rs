//! Style roles for terminal output
//!
//! Each logical role maps to an optional `colored::Color`. Colour is applied
//! only when the caller passes `enabled = true`; there is no global state.
//!
//! ```
//! use repodrift::core::styles::StyleRole;
//! assert_eq!(StyleRole::Header.paint("Tag", false), "Tag");
//! assert!(StyleRole::Header.paint("Tag", true).starts_with("\x1b[33m"));
//! ```

use clap::builder::styling::AnsiColor;
use colored::Color;

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }
        }
    }
}

style! {
    Header      => Some(Color::Yellow),
    Literal     => Some(Color::Cyan),
    Placeholder => Some(Color::Green),
    Valid       => Some(Color::Green),
    Invalid     => Some(Color::Red),
    Error       => Some(Color::BrightRed),
    FilePath    => Some(Color::BrightGreen),
    Flagged     => Some(Color::BrightRed),
    Missing     => Some(Color::BrightBlack),
    Value       => None,
}

impl StyleRole {
    pub fn ansi_code(self) -> Option<&'static str> {
        ansi_code(self.color()?)
    }

    pub fn paint(self, text: &str, enabled: bool) -> String {
        match self.ansi_code() {
            Some(code) if enabled => format!("\x1b[{}m{}\x1b[0m", code, text),
            _ => text.to_string(),
        }
    }

    /// Foreground spec for `prettytable` cells (`Fy`, `FR`, ...)
    pub fn table_spec(self, enabled: bool) -> &'static str {
        if !enabled {
            return "";
        }
        match self.color() {
            Some(Color::Yellow) => "Fy",
            Some(Color::Cyan) => "Fc",
            Some(Color::Green) => "Fg",
            Some(Color::Red) => "Fr",
            Some(Color::BrightRed) => "FR",
            Some(Color::BrightGreen) => "FG",
            Some(Color::BrightBlack) => "FK",
            _ => "",
        }
    }
}

fn ansi_code(color: Color) -> Option<&'static str> {
    use Color::*;
    Some(match color {
        Red => "31",
        Green => "32",
        Yellow => "33",
        Cyan => "36",
        BrightBlack => "90",
        BrightRed => "91",
        BrightGreen => "92",
        _ => return None,
    })
}

fn color_to_ansi(color: Color) -> Option<AnsiColor> {
    use clap::builder::styling::AnsiColor as A;
    use Color::*;
    Some(match color {
        Red => A::Red,
        Green => A::Green,
        Yellow => A::Yellow,
        Cyan => A::Cyan,
        BrightBlack => A::BrightBlack,
        BrightRed => A::BrightRed,
        BrightGreen => A::BrightGreen,
        _ => return None,
    })
}

/// clap help styles built from the same roles
pub fn palette_to_clap(enabled: bool) -> clap::builder::Styles {
    use clap::builder::styling::{Color as ClapColor, Style};
    if !enabled {
        return clap::builder::Styles::plain();
    }

    let style = |role: StyleRole, bold: bool| {
        let mut s = Style::new();
        if let Some(col) = role.color().and_then(color_to_ansi) {
            s = s.fg_color(Some(ClapColor::Ansi(col)));
        }
        if bold {
            s = s.bold();
        }
        s
    };

    clap::builder::Styles::styled()
        .header(style(StyleRole::Header, true))
        .usage(style(StyleRole::Header, true))
        .literal(style(StyleRole::Literal, false))
        .placeholder(style(StyleRole::Placeholder, false))
        .valid(style(StyleRole::Valid, false))
        .invalid(style(StyleRole::Invalid, false))
        .error(style(StyleRole::Error, false))
}
