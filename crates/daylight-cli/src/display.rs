//! Terminal and JSON rendering of controller state.

use console::Style;
use daylight::{ColorMode, Page, Preference, ToggleControl};
use serde::Serialize;

/// Snapshot of everything `status` reports.
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub preference: Preference,
    pub theme: ColorMode,
    pub system: ColorMode,
    pub store: String,
    pub active_control: Option<String>,
}

impl Status {
    pub fn from_page(
        preference: Preference,
        theme: ColorMode,
        system: ColorMode,
        store: String,
        page: &Page,
    ) -> Self {
        let active_control = page
            .controls()
            .iter()
            .find(|c| c.is_active())
            .map(|c| c.mode().to_string());
        Self {
            preference,
            theme,
            system,
            store,
            active_control,
        }
    }
}

fn label() -> Style {
    Style::new().dim()
}

fn theme_style(theme: ColorMode) -> Style {
    match theme {
        ColorMode::Dark => Style::new().magenta().bold(),
        ColorMode::Light => Style::new().yellow().bold(),
    }
}

/// Renders a theme name, styled when the terminal supports it.
pub fn render_theme(theme: ColorMode) -> String {
    theme_style(theme).apply_to(theme).to_string()
}

/// Renders controls as a single row. The active control is bracketed.
pub fn render_controls(controls: &[ToggleControl]) -> String {
    let active = Style::new().reverse().bold();
    let inactive = Style::new().dim();
    controls
        .iter()
        .map(|control| {
            if control.is_active() {
                active.apply_to(format!("[{}]", control.mode())).to_string()
            } else {
                inactive.apply_to(format!(" {} ", control.mode())).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_status(status: &Status, page: &Page) -> String {
    let label = label();
    let mut lines = vec![
        format!("{} {}", label.apply_to("preference"), status.preference),
        format!("{}      {}", label.apply_to("theme"), render_theme(status.theme)),
        format!("{}     {}", label.apply_to("system"), status.system),
        format!("{}      {}", label.apply_to("store"), status.store),
    ];
    if !page.controls().is_empty() {
        lines.push(format!(
            "{}   {}",
            label.apply_to("controls"),
            render_controls(page.controls())
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use console::strip_ansi_codes;
    use daylight::Surface;

    fn page_with_active(mode: &str) -> Page {
        let mut page = Page::with_controls(["light", "dark", "auto"]);
        for control in page.controls_mut() {
            let is_active = control.mode() == mode;
            control.set_active(is_active);
        }
        page
    }

    #[test]
    fn test_render_controls_brackets_active() {
        let page = page_with_active("dark");
        let row = render_controls(page.controls());
        assert_eq!(strip_ansi_codes(&row), " light  [dark]  auto ");
    }

    #[test]
    fn test_render_controls_empty() {
        assert_eq!(render_controls(&[]), "");
    }

    #[test]
    fn test_status_picks_active_control() {
        let page = page_with_active("auto");
        let status = Status::from_page(
            Preference::Auto,
            ColorMode::Dark,
            ColorMode::Dark,
            "state.json".into(),
            &page,
        );
        assert_eq!(status.active_control.as_deref(), Some("auto"));

        let text = strip_ansi_codes(&render_status(&status, &page)).to_string();
        assert!(text.contains("preference auto"));
        assert!(text.contains("theme      dark"));
        assert!(text.contains("[auto]"));
    }

    #[test]
    fn test_status_json_shape() {
        let page = Page::new();
        let status = Status::from_page(
            Preference::Light,
            ColorMode::Light,
            ColorMode::Dark,
            "state.json".into(),
            &page,
        );
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["preference"], "light");
        assert_eq!(json["system"], "dark");
        assert!(json["active_control"].is_null());
    }
}
