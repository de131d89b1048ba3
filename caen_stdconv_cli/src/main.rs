//! # caen_stdconv_cli
//!
//! Command line helper for the caen_stdconv converter library.
//!
//! - `new` writes a template converter configuration (YAML) to the given path.
//! - `inspect` reads a YAML map of BORE tags, parses it the way the converter
//!   would, and prints the run settings together with the waveform position
//!   table (which channel feeds which DUT pixel and where its waveform begins
//!   in the raw block). Useful to check a channels_mapping before taking data.

use clap::{Arg, Command};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use libcaen_stdconv::channel_map::ChannelMap;
use libcaen_stdconv::config::ConverterConfig;
use libcaen_stdconv::raw_event::RawEvent;
use libcaen_stdconv::run_settings::RunSettings;

fn make_template_config(path: &Path) {
    let config = ConverterConfig::default();
    let yaml_str = serde_yaml::to_string(&config).unwrap();
    let mut file = File::create(path).expect("Could not create template config file!");
    file.write_all(yaml_str.as_bytes())
        .expect("Failed to write yaml data to file!");
}

/// Turn a YAML scalar back into the tag string the producer would have set
fn tag_value_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn inspect_tags(path: &Path) {
    let yaml_str = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Could not read tags file: {e}");
            return;
        }
    };
    let tags: BTreeMap<String, serde_yaml::Value> = match serde_yaml::from_str(&yaml_str) {
        Ok(t) => t,
        Err(e) => {
            log::error!("Tags file is not a YAML map: {e}");
            return;
        }
    };

    let mut bore = RawEvent::new(0);
    bore.set_bore();
    for (key, value) in tags.iter() {
        match tag_value_to_string(value) {
            Some(text) => bore.set_tag(key.clone(), text),
            None => {
                log::error!("Tag {key:?} is not a scalar value");
                return;
            }
        }
    }

    let settings = match RunSettings::from_bore(&bore) {
        Ok(s) => s,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    let map = match ChannelMap::from_settings(&settings) {
        Ok(m) => m,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };

    log::info!(
        "n_samples_per_waveform: {}",
        settings.n_samples_per_waveform
    );
    log::info!(
        "sampling_frequency_MHz: {}",
        settings.sampling_frequency_mhz
    );
    log::info!("number_of_DUTs: {}", settings.number_of_duts());
    log::info!(
        "channels_names_list: {}",
        settings.channels_names_list.join(", ")
    );
    log::info!(
        "expected raw block size: {} bytes",
        settings.expected_block_size()
    );
    for (n_dut, dut) in settings.duts.iter().enumerate() {
        log::info!(
            "DUT {} ({:?}): {} x {} pixels",
            n_dut,
            dut.name,
            dut.size_x(),
            dut.size_y()
        );
        for (x, row) in dut.channels.iter().enumerate() {
            for (y, channel) in row.iter().enumerate() {
                // The map was built from the same settings, offsets must exist
                let offset = map.channel_offset(channel).unwrap();
                log::info!("  pixel ({x}, {y}) <- {channel} at sample offset {offset}");
            }
        }
    }
}

fn main() {
    // Create a cli
    let matches = Command::new("caen_stdconv_cli")
        .arg_required_else_help(true)
        .subcommand(Command::new("new").about("Make a template converter configuration yaml file"))
        .subcommand(
            Command::new("inspect")
                .about("Parse a yaml file of BORE tags and print the decoded run settings"),
        )
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .help("Path to the file"),
        )
        .get_matches();

    // Initialize feedback
    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )
    .expect("Could not create logging!");

    // Parse the cli
    let path = PathBuf::from(matches.get_one::<String>("path").expect("We require args"));

    match matches.subcommand() {
        Some(("new", _)) => {
            log::info!("Making a template config at {}...", path.to_string_lossy());
            make_template_config(&path);
            log::info!("Done.");
        }
        Some(("inspect", _)) => {
            log::info!("Inspecting BORE tags from {}...", path.to_string_lossy());
            inspect_tags(&path);
            log::info!("Done.");
        }
        _ => (),
    }
}
