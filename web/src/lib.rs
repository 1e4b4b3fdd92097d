use clap::Parser;
use wasm_bindgen::prelude::*;

mod game;
mod leaderboard;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    #[command(flatten)]
    game: game::GameProps,
}

#[wasm_bindgen(start)]
pub fn run_app() -> Result<(), JsValue> {
    use gloo::utils::{document, window};

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let location_hash = window().location().hash().unwrap_or_default();

    // the hash is read like a command line: `#-vv&--tier=expert&--seed=42`
    let args = Args::try_parse_from(location_hash.split(['#', '&']))
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    if let Some(log_level) = args.verbose.log_level() {
        console_log::init_with_level(log_level).map_err(|err| JsValue::from_str(&err.to_string()))?;
    }
    log::debug!("args: {:?}", args);

    let root = document()
        .get_element_by_id("game")
        .ok_or_else(|| JsValue::from_str("Could not find id=\"game\" element"))?;

    log::debug!("App started");
    yew::Renderer::<game::GameView>::with_root_and_props(root, args.game).render();
    Ok(())
}
