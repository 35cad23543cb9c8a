use std::{fs::File, io::Read, path::Path};

use json::{self, JsonValue};

use crate::{Error, Ground, Point, Scenario, Settings};

macro_rules! get_json {
    ($json:ident,$($key:literal),+, $func:ident) => {
            get_json!($json$([$key])+, concat!($("/",$key),+), $func)
    };

    ($value:expr, $key:expr, $func:ident) => {
        $value
            .$func()
            .ok_or_else(|| Error::Init(concat!("Couldn't find ", $key).to_owned()))?
    };
}

macro_rules! get_json_or {
    ($json:ident,$($key:literal),+, $func:ident, $default:expr) => {
        {
            let value = &$json$([$key])+;
            if value.is_null() {
                $default
            } else {
                get_json!(value, concat!($("/",$key),+), $func)
            }
        }
    };
}

macro_rules! json_value_or_err {
    ($json:ident,$($key:literal),+) => {
            {
                let value = &$json$([$key])+;
                if value.is_null() {
                    Err(Error::Init(concat!("Lacking", concat!($("/",$key),+), " key").to_owned()))
                } else {
                    Ok(value)
                }
            }
    };
}

pub fn parse_settings<P: AsRef<Path>>(settings_file_path: P) -> Result<Settings, Error> {
    settings_from_json(&read_json(settings_file_path)?)
}

pub fn parse_sim<P: AsRef<Path>>(sim_file_path: P) -> Result<Scenario, Error> {
    sim_from_json(&read_json(sim_file_path)?)
}

pub fn parse_settings_from_string(settings: &str) -> Result<Settings, Error> {
    settings_from_json(&parse_str(settings)?)
}

pub fn parse_sim_from_string(sim: &str) -> Result<Scenario, Error> {
    sim_from_json(&parse_str(sim)?)
}

fn settings_from_json(settings_json: &JsonValue) -> Result<Settings, Error> {
    let defaults = Settings::default();
    Ok(Settings {
        population_size: get_json!(settings_json, "PopulationSize", as_usize),
        chromosome_size: get_json!(settings_json, "ChromosomeSize", as_usize),
        mutation_prob: get_json!(settings_json, "MutationProb", as_f64),
        elitism: get_json_or!(settings_json, "Elitism", as_f64, defaults.elitism),
        seed: get_json_or!(settings_json, "Seed", as_u64, defaults.seed),
    })
}

fn sim_from_json(sim_json: &JsonValue) -> Result<Scenario, Error> {
    let initial_position = Point::new(
        get_json!(sim_json, "Lander", "X", as_f64),
        get_json!(sim_json, "Lander", "Y", as_f64),
    );
    let fuel = get_json!(sim_json, "Lander", "Fuel", as_i32);
    let ground = parse_terrain(json_value_or_err!(sim_json, "Terrain")?)?;
    Scenario::try_new(ground, initial_position, fuel)
}

fn read_json<P: AsRef<Path>>(file_path: P) -> Result<JsonValue, Error> {
    let file_path = file_path.as_ref();
    let mut file_content = String::new();
    let mut file = File::open(file_path).map_err(|e| {
        Error::Init(format!(
            "Error while opening file {}: {e}",
            file_path.display()
        ))
    })?;

    file.read_to_string(&mut file_content)
        .map_err(|e| Error::Init(format!("Failed to read file: {e}")))?;
    parse_str(&file_content)
}

fn parse_str(content: &str) -> Result<JsonValue, Error> {
    json::parse(content).map_err(|e| Error::Init(format!("Json error: {e}")))
}

fn parse_terrain(terrain_array: &JsonValue) -> Result<Ground, Error> {
    if !terrain_array.is_array() {
        return Err(Error::Init("Terrain has to be an array".to_owned()));
    }
    let points = terrain_array
        .members()
        .map(|point_json| {
            let err = || Error::Init("Terrain has to contain numeric landpoints".to_owned());
            let x = point_json[0].as_f64().ok_or_else(err)?;
            let y = point_json[1].as_f64().ok_or_else(err)?;
            Ok(Point::new(x, y))
        })
        .collect::<Result<Vec<_>, Error>>()?;
    Ground::try_new(points)
}
