mod api;
mod app;
mod application;
mod domain;
mod ui;
mod utils;

use std::process::ExitCode;

use iced::window;

use domain::CatalogItem;

/// Entry contract: the screen requires a catalog item payload — inline JSON
/// or a path to a JSON file. Without one it aborts immediately.
fn parse_item() -> Result<CatalogItem, String> {
    let arg = std::env::args()
        .nth(1)
        .ok_or_else(|| "usage: catalog-preview <item.json | '{\"id\":...}'>".to_string())?;

    let payload = if std::path::Path::new(&arg).is_file() {
        std::fs::read_to_string(&arg).map_err(|e| format!("cannot read {arg}: {e}"))?
    } else {
        arg
    };

    serde_json::from_str(&payload).map_err(|e| format!("invalid catalog item payload: {e}"))
}

fn main() -> ExitCode {
    let item = match parse_item() {
        Ok(item) => item,
        Err(reason) => {
            eprintln!("{reason}");
            return ExitCode::from(2);
        }
    };

    let boot = move || app::PreviewApp::new(item.clone());

    let result = iced::application(boot, app::update, app::view)
        .title("Catalog Preview")
        .subscription(app::subscription)
        .window(window::Settings {
            // Close requests go through the app so an in-flight download is
            // cancelled before the window goes away.
            exit_on_close_request: false,
            ..Default::default()
        })
        .run();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
