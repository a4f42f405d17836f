//! Command execution.

use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use daylight::{
    ColorMode, ControllerConfig, DetectedSignal, FileStore, Page, Preference, Surface,
    SystemSignal, ThemeController,
};
use serde_json::json;
use tracing::{debug, info};

use crate::args::{Cli, Commands, STORE_ENV};
use crate::display::{render_status, render_theme, Status};

type Controller = ThemeController<FileStore, Page, DetectedSignal>;

/// Resolves where the preference store lives.
pub fn default_store_path() -> PathBuf {
    if let Some(path) = std::env::var_os(STORE_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    let config_home = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")));
    match config_home {
        Some(dir) => dir.join("daylight").join("state.json"),
        None => PathBuf::from("daylight-state.json"),
    }
}

fn build_controller(cli: &Cli) -> Result<Controller> {
    let config = match &cli.config {
        Some(path) => ControllerConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ControllerConfig::default(),
    };
    let store_path = cli.store.clone().unwrap_or_else(default_store_path);
    debug!(store = %store_path.display(), ?config, "building controller");

    let page = Page::with_controls(Preference::ALL.map(Preference::as_str));
    Ok(ThemeController::with_config(
        FileStore::open(store_path),
        page,
        DetectedSignal::new(),
        config,
    ))
}

/// Runs the parsed command, writing results to `out`.
pub fn execute<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let mut controller = build_controller(cli)?;

    match &cli.command {
        Commands::Get => {
            let theme = controller.current_theme();
            print_theme(cli, out, theme)?;
        }
        Commands::Set { mode } => {
            let theme = controller.set_preference(*mode)?;
            info!(%mode, %theme, "preference stored");
            print_theme(cli, out, theme)?;
        }
        Commands::Toggle => {
            let theme = controller.toggle()?;
            info!(%theme, "theme toggled");
            print_theme(cli, out, theme)?;
        }
        Commands::Status => {
            controller.init();
            let status = collect_status(&controller);
            if cli.json {
                serde_json::to_writer_pretty(&mut *out, &status)?;
                writeln!(out)?;
            } else {
                writeln!(out, "{}", render_status(&status, &controller.surface()))?;
            }
        }
        Commands::Watch { interval_ms, count } => {
            watch(cli, out, &mut controller, Duration::from_millis(*interval_ms), *count)?;
        }
    }
    Ok(())
}

fn collect_status(controller: &Controller) -> Status {
    let system = ColorMode::from_prefers_dark(controller.signal().prefers_dark());
    let store = controller.store().path().display().to_string();
    Status::from_page(
        controller.preference(),
        controller.current_theme(),
        system,
        store,
        &controller.surface(),
    )
}

fn shown_theme(controller: &Controller) -> ColorMode {
    let marker = controller.config().marker_class.clone();
    ColorMode::from_prefers_dark(controller.surface().has_class(&marker))
}

fn watch<W: Write>(
    cli: &Cli,
    out: &mut W,
    controller: &mut Controller,
    interval: Duration,
    count: Option<u64>,
) -> Result<()> {
    let mut shown = controller.init();
    print_theme(cli, out, shown)?;

    let mut polls = 0u64;
    while count.map_or(true, |limit| polls < limit) {
        thread::sleep(interval);
        polls += 1;
        if !controller.signal().poll() {
            continue;
        }
        let theme = shown_theme(controller);
        if theme != shown {
            shown = theme;
            print_theme(cli, out, shown)?;
        } else {
            debug!(preference = %controller.preference(), "system change ignored");
        }
    }
    Ok(())
}

fn print_theme<W: Write>(cli: &Cli, out: &mut W, theme: ColorMode) -> Result<()> {
    if cli.json {
        writeln!(out, "{}", json!({ "theme": theme }))?;
    } else {
        writeln!(out, "{}", render_theme(theme))?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn run(dir: &TempDir, args: &[&str]) -> String {
        // Every test pins the same system mode, so parallel runs agree
        daylight::set_theme_detector(|| ColorMode::Dark);

        let store = dir.path().join("state.json");
        let mut argv = vec!["daylight", "--store", store.to_str().unwrap()];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();

        let mut out = Vec::new();
        execute(&cli, &mut out).unwrap();
        console::strip_ansi_codes(&String::from_utf8(out).unwrap()).to_string()
    }

    #[test]
    fn test_get_follows_system_when_unset() {
        let dir = TempDir::new().unwrap();
        assert_eq!(run(&dir, &["get"]), "dark\n");
    }

    #[test]
    fn test_set_then_get() {
        let dir = TempDir::new().unwrap();
        assert_eq!(run(&dir, &["set", "light"]), "light\n");
        assert_eq!(run(&dir, &["get"]), "light\n");
    }

    #[test]
    fn test_toggle_twice() {
        let dir = TempDir::new().unwrap();
        assert_eq!(run(&dir, &["toggle"]), "light\n");
        assert_eq!(run(&dir, &["toggle"]), "dark\n");
        let stored = std::fs::read_to_string(dir.path().join("state.json")).unwrap();
        assert!(stored.contains("\"dark\""));
    }

    #[test]
    fn test_status_json() {
        let dir = TempDir::new().unwrap();
        run(&dir, &["set", "auto"]);
        let output = run(&dir, &["status", "--json"]);
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["preference"], "auto");
        assert_eq!(json["theme"], "dark");
        assert_eq!(json["active_control"], "auto");
    }

    #[test]
    fn test_status_text_shows_controls() {
        let dir = TempDir::new().unwrap();
        run(&dir, &["set", "light"]);
        let output = run(&dir, &["status"]);
        assert!(output.contains("[light]"));
        assert!(output.contains("preference light"));
    }

    #[test]
    fn test_watch_with_zero_checks_prints_initial_theme() {
        let dir = TempDir::new().unwrap();
        let output = run(&dir, &["watch", "--count", "0", "--json"]);
        assert_eq!(output, "{\"theme\":\"dark\"}\n");
    }

    #[test]
    fn test_missing_config_is_reported() {
        let cli = Cli::try_parse_from(["daylight", "--config", "/nonexistent/daylight.yaml", "get"])
            .unwrap();
        let err = execute(&cli, &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("daylight.yaml"));
    }
}
