use std::{error::Error, fs::File, io::{BufRead, BufReader}, sync::Arc};
use clap::{Parser, Subcommand, Args};
use simple_logger::SimpleLogger;
use log::{info, debug};

use zonefence::{
    distance_km, is_inside, parse_wkt, signed_distance_km, GeoPoint, PositionFix,
    ZoneAlert, ZoneHandle, ZoneMonitor, ZoneTransition,
};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Test a single position against a zone
    Check(Check),
    /// Replay NDJSON position fixes against a zone and print out-of-zone alerts
    Replay(Replay),
    /// Great-circle distance between two positions
    Distance(Distance),
}

#[derive(Args)]
struct Check {
    /// Zone polygon (WKT, lon/lat)
    #[clap(short, long)]
    polygon: String,

    #[clap(long, allow_hyphen_values = true)]
    lat: f64,

    #[clap(long, allow_hyphen_values = true)]
    lng: f64,
}

#[derive(Args)]
struct Replay {
    /// Zone polygon (WKT, lon/lat)
    #[clap(short, long)]
    polygon: String,

    /// Input path, one {"lat":..,"lng":..} object per line
    #[clap(short, long)]
    input: String,
}

#[derive(Args)]
struct Distance {
    /// Start (lat,lng)
    #[clap(long, value_parser = parse_point, allow_hyphen_values = true)]
    from: GeoPoint,

    /// End (lat,lng)
    #[clap(long, value_parser = parse_point, allow_hyphen_values = true)]
    to: GeoPoint,
}

fn parse_point(s: &str) -> Result<GeoPoint, String> {
    let e: Vec<&str> = s.split(',').map(str::trim).collect();
    if e.len() != 2 {
        return Err(format!("expected lat,lng but got {:?}", s));
    }
    let lat = e[0].parse::<f64>().map_err(|err| format!("latitude {:?}: {}", e[0], err))?;
    let lng = e[1].parse::<f64>().map_err(|err| format!("longitude {:?}: {}", e[1], err))?;
    Ok(GeoPoint::new(lat, lng))
}

fn check(args: &Check) -> Result<(), Box<dyn Error>> {
    let zone = parse_wkt(&args.polygon)?;
    let p = GeoPoint::new(args.lat, args.lng);
    let inside = is_inside(&p, &zone);
    println!("{} {:.3} km", if inside { "inside" } else { "outside" }, signed_distance_km(&p, &zone));
    Ok(())
}

fn replay(args: &Replay) -> Result<(), Box<dyn Error>> {
    let handle = Arc::new(ZoneHandle::default());
    handle.load_wkt(Some(args.polygon.as_str()));
    let mut monitor = ZoneMonitor::new(handle);

    info!("Reading {}", args.input);
    let reader = BufReader::new(File::open(&args.input)?);
    let mut fixes = 0;
    let mut alerts = 0;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fix: PositionFix = serde_json::from_str(&line)?;
        fixes += 1;
        let p = fix.point();
        match monitor.observe(&p) {
            Some(ZoneTransition::Exited) => {
                alerts += 1;
                println!("{}", serde_json::to_string(&ZoneAlert::out_of_zone(&p))?);
            }
            Some(ZoneTransition::Entered) => debug!("Re-entered zone at fix {}", fixes),
            None => {}
        }
    }
    info!("Replayed {} fixes", fixes);
    info!("Raised {} out-of-zone alerts", alerts);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    SimpleLogger::new().env().init()?;
    let cli = Cli::parse();
    match &cli.command {
        Commands::Check(args) => check(args)?,
        Commands::Replay(args) => replay(args)?,
        Commands::Distance(args) => println!("{:.3}", distance_km(&args.from, &args.to)),
    }
    Ok(())
}

#[test]
fn parse_point_test() {
    assert_eq!(parse_point("-12.05, -77.05").unwrap(), GeoPoint::new(-12.05, -77.05));
    assert!(parse_point("-12.05").is_err());
    assert!(parse_point("a,b").is_err());
}

#[test]
fn cli_definition() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
    let cli = Cli::try_parse_from(["zonefence", "distance", "--from", "-12.05,-77.05", "--to", "-12.04,-77.04"]).unwrap();
    match cli.command {
        Commands::Distance(d) => assert_eq!(d.from, GeoPoint::new(-12.05, -77.05)),
        _ => panic!("expected distance"),
    }
}
