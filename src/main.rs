use std::env;
use std::io;
use std::path::Path;

use log::info;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use sg_transit_map::app::App;
use sg_transit_map::config::load_user_config;
use sg_transit_map::datasets::{load_all, DirSource};
use sg_transit_map::errors::Result;
use sg_transit_map::render::PngMap;
use sg_transit_map::ui::ScriptedEvents;

const DEFAULT_CONFIG_PATH: &str = "config/singapore.json";

fn setup_logging() {
    Builder::with_level("info")
        .with_target_writer("*", new_writer(io::stdout()))
        .init();
}

fn main() -> Result<()> {
    setup_logging();

    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let user_config = load_user_config(Path::new(&config_path))?;
    info!(config = config_path.as_str(), data = user_config.data_path.as_str(); "Starting");

    let collections = load_all(&DirSource::new(&user_config.data_path), &user_config.files);
    let map = PngMap::new(&user_config)?;
    let mut app = App::new(map, collections, &user_config);

    let mut session = ScriptedEvents::new(user_config.session.clone());
    app.run(&mut session);

    app.map().write_png(Path::new(&user_config.dest_path))?;
    Ok(())
}
