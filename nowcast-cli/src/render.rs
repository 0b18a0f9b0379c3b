use std::{fmt::Write, io::IsTerminal};

use nowcast_core::{Color, Screen};

/// Colors only when stdout is a terminal and NO_COLOR is unset.
pub fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

fn paint(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        format!("\x1b[38;5;{}m{text}\x1b[0m", color.ansi256())
    } else {
        text.to_string()
    }
}

/// Text block for one screen: icon, location, condition, temperature, status.
pub fn screen_text(screen: &Screen, color: bool) -> String {
    let mut out = String::new();
    let icon = &screen.icon;

    let _ = writeln!(
        out,
        "  {}  {}",
        paint(icon.icon.glyph(), icon.primary, color),
        paint(icon.icon.symbol(), icon.secondary, color),
    );

    for line in [&screen.location, &screen.condition, &screen.temperature] {
        if !line.is_empty() {
            let _ = writeln!(out, "  {line}");
        }
    }

    if let Some(updated) = &screen.updated {
        let _ = writeln!(out, "  updated {updated}");
    }
    if let Some(status) = &screen.status {
        let _ = writeln!(out, "  ! {status}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nowcast_core::ConditionIcon;

    fn loaded() -> Screen {
        Screen {
            location: "London".into(),
            condition: "Sunny".into(),
            icon: ConditionIcon::for_code(1000),
            temperature: "15.0 °C".into(),
            updated: Some("09:41".into()),
            status: None,
        }
    }

    #[test]
    fn plain_screen_lists_labels_in_order() {
        let text = screen_text(&loaded(), false);

        assert_eq!(
            text,
            "  ☀  sun.max\n  London\n  Sunny\n  15.0 °C\n  updated 09:41\n"
        );
    }

    #[test]
    fn status_line_is_appended() {
        let mut screen = loaded();
        screen.status = Some("Network error. Check your connection.".into());

        assert!(screen_text(&screen, false).ends_with("  ! Network error. Check your connection.\n"));
    }

    #[test]
    fn empty_screen_shows_placeholder_only() {
        let text = screen_text(&Screen::default(), false);
        assert_eq!(text, "  🌦  cloud.sun.rain\n");
    }

    #[test]
    fn color_wraps_icon_in_ansi() {
        let text = screen_text(&loaded(), true);

        assert!(text.contains("\x1b[38;5;220m☀\x1b[0m"));
        assert!(text.contains("\x1b[38;5;208msun.max\x1b[0m"));
    }
}
