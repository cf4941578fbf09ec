//! geonames-cli: command-line interface for geonames-core
//!
//! Usage examples
//! --------------
//!
//! - Show dataset stats
//!   $ geonames stats
//!
//! - Nearest city, and the best-known city near a point
//!   $ geonames nearest 37.77 -122.42
//!   $ geonames best-match 48.03 3.0
//!
//! - Pick a city for a timezone name, falling back by offset
//!   $ geonames --lat 32.7 --lon -117.16 timezone America/Ensenada
//!
//! - Name and address searches
//!   $ geonames search par
//!   $ geonames search --slot -8
//!   $ geonames address Paris --state Texas --code US
//!
//! - Pack a raw city list
//!   $ geonames build -i cities.json.gz --bundle-out geonames.bin.gz
//!
//! Data source
//! -----------
//!
//! The dataset directory comes from `--data-dir`, `GEONAMES_DATA_DIR`, or the
//! `data/eslocation` directory next to `geonames-core`. `--bundle` (or
//! `GEONAMES_BUNDLE`) reads a single packed file instead.
mod args;

use crate::args::{CliArgs, Commands};
use anyhow::Context;
use clap::Parser;
use geonames_core::diagnostics::{find_wacky_zones, validate_timezone_names};
use geonames_core::{Coordinates, Gazetteer, GazetteerConfig, GeoError, SearchSession};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file (or the environment) first, then command-line overrides.
fn load_config(args: &CliArgs) -> anyhow::Result<GazetteerConfig> {
    let mut config = match &args.config {
        #[cfg(feature = "json")]
        Some(path) => GazetteerConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        #[cfg(not(feature = "json"))]
        Some(_) => anyhow::bail!("--config needs the 'json' feature"),
        None => GazetteerConfig::from_env()?,
    };

    if let Some(dir) = &args.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(bundle) = &args.bundle {
        config = config.with_bundle(bundle);
    }
    let mut at = config.device_location;
    if let Some(lat) = args.latitude {
        at.latitude = lat;
    }
    if let Some(lon) = args.longitude {
        at.longitude = lon;
    }
    Ok(config.with_device_location(at))
}

fn print_candidates(session: &mut SearchSession, limit: usize) -> anyhow::Result<()> {
    let total = session.num_matches();
    for n in 0..total.min(limit) {
        let confidence = session.candidates()[n].confidence;
        let name = session.top_city_name_at(n)?;
        let region = session.selected_city_region_name()?;
        let tz = session.selected_city_tz_name()?;
        let index = session.selected_index().unwrap_or_default();
        if confidence > 0 {
            println!("{index:>7}  {name}, {region} [{tz}] (confidence {confidence})");
        } else {
            println!("{index:>7}  {name}, {region} [{tz}]");
        }
    }
    if total > limit {
        println!("... {} more", total - limit);
    }
    Ok(())
}

fn print_selected(session: &SearchSession) -> anyhow::Result<()> {
    let Some(info) = session.selected_city_info()? else {
        println!("No city found");
        return Ok(());
    };
    println!("{} ({})", info.name, info.index);
    println!("  Region: {}", info.region_name);
    println!("  Country: {}", info.country_code);
    println!("  Timezone: {}", info.tz_name);
    println!("  Location: {:.4}, {:.4}", info.latitude, info.longitude);
    println!("  Population: {}", info.population);
    match (info.primary_slot, info.secondary_slot) {
        (Some(primary), Some(secondary)) => println!("  Slots: {primary}, {secondary}"),
        (Some(primary), None) => println!("  Slot: {primary}"),
        _ => println!("  Slot: none"),
    }
    Ok(())
}

fn run(args: CliArgs) -> anyhow::Result<()> {
    #[cfg(feature = "builder")]
    if let Commands::Build {
        input,
        out_dir,
        bundle_out,
    } = &args.command
    {
        let cities = geonames_core::loader::builder::load_raw_json(input)
            .with_context(|| format!("reading raw cities from {}", input.display()))?;
        let set = geonames_core::DatasetBuilder::from_cities(cities).build()?;
        match (out_dir, bundle_out) {
            (_, Some(bundle)) => set.write_bundle(bundle)?,
            (Some(dir), None) => set.write_dir(dir)?,
            (None, None) => anyhow::bail!("either --out-dir or --bundle-out is required"),
        }
        println!("Packed {} columns", set.columns.len());
        return Ok(());
    }

    let config = load_config(&args)?;
    info!(dataset = %config.dataset_path().display(), "opening gazetteer");
    let gazetteer = Gazetteer::from_config(&config);
    let mut session = gazetteer.session()?;

    match args.command {
        Commands::Stats => {
            let stats = session.store().stats()?;
            println!("Dataset statistics:");
            println!("  Cities: {}", stats.cities);
            println!("  Regions: {}", stats.regions);
            println!("  Countries: {}", stats.countries);
            println!("  Admin1 areas: {}", stats.admin1);
            println!("  Timezones: {}", stats.timezones);
            println!("  Timezone checksum: {:08x}", stats.tz_names_checksum);
        }

        Commands::Nearest {
            latitude,
            longitude,
        } => {
            session.find_closest_city(Coordinates::new(latitude, longitude))?;
            print_selected(&session)?;
        }

        Commands::BestMatch {
            latitude,
            longitude,
        } => {
            session.find_best_match_city(Coordinates::new(latitude, longitude))?;
            print_selected(&session)?;
        }

        Commands::Timezone { name } => {
            let found = session.engine().resolve_timezone(&name)?;
            match found {
                Some(found) => {
                    session.select_city_with_index(found.city_index)?;
                    println!("Resolved via {:?}", found.tier);
                    print_selected(&session)?;
                }
                None => println!("No city for timezone: {name}"),
            }
        }

        Commands::Search {
            fragment,
            proximity,
            slot,
            limit,
        } => {
            let found = match slot {
                Some(hours) => session.search_by_name_fragment_for_tz_slot(&fragment, hours)?,
                None => session.search_by_name_fragment(&fragment, proximity)?,
            };
            if found == 0 {
                println!("No cities found matching: {fragment}");
            } else {
                print_candidates(&mut session, limit)?;
            }
        }

        Commands::Address {
            name,
            state,
            country,
            code,
            limit,
        } => match session.search_by_city(&name, &state, &country, &code)? {
            Some(best) => {
                println!(
                    "Best confidence {best}; per level: {} / {} / {}",
                    session.num_matches_at_level(0),
                    session.num_matches_at_level(1),
                    session.num_matches_at_level(2)
                );
                print_candidates(&mut session, limit)?;
            }
            None => println!("No cities named: {name}"),
        },

        Commands::Info { index, json } => {
            let info = session.city_info(index)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                session.select_city_with_index(index)?;
                print_selected(&session)?;
            }
        }

        Commands::Validate { threshold } => {
            let store = session.store();
            let reports = validate_timezone_names(store)?;
            let problems: Vec<_> = reports.iter().filter(|r| r.is_problem()).collect();
            for report in &problems {
                let reason = if report.resolved {
                    "no city"
                } else {
                    "unknown to tz database"
                };
                println!("{:>4}  {}: {reason}", report.tz_index, report.name);
            }
            println!("{} timezones, {} problems", reports.len(), problems.len());

            let wacky = find_wacky_zones(store, threshold)?;
            for city in &wacky {
                println!(
                    "{:>7}  {} [{}] longitude {:.1}, zone suggests {:.1} ({:.1}° off)",
                    city.city_index,
                    city.name,
                    city.tz_name,
                    city.longitude,
                    city.zone_longitude,
                    city.deviation
                );
            }
            println!("{} cities more than {threshold}° from their zone", wacky.len());
        }

        #[cfg(feature = "builder")]
        Commands::Build { .. } => {}
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    run(args).inspect_err(|e| {
        if e.downcast_ref::<GeoError>().is_some_and(GeoError::is_fatal) {
            error!("dataset is inconsistent; refusing to continue: {e}");
        }
    })
}
