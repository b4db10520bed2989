use anyhow::{Context, Result};
use clap::Parser;
use owhl::args::{BoundsArgs, Cli, Commands, DepthArgs, JoinArgs, ProcessArgs};
use owhl::bursts::{analyze, find_bounds};
use owhl::config::OwhlConfig;
use owhl::depth::{mbar_to_depth, sea_pressure_to_depth};
use owhl::{ingest, output};
use std::process;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = OwhlConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Process(args) => process_bursts(args, &config),
        Commands::Join(args) => join(args, &config),
        Commands::Bounds(args) => bounds(args, &config),
        Commands::Depth(args) => depth(args, &config),
    }
}

fn process_bursts(args: ProcessArgs, config: &OwhlConfig) -> Result<()> {
    let settings = args.resolve(config)?;
    let input = &settings.input;

    let joined = ingest::join_files(&input.inputs, input.timezone)
        .context("Failed to read logger files")?
        .trim(input.start, input.end);
    let pressure = joined.pressure;

    let depth = sea_pressure_to_depth(pressure.values(), settings.atmospheric_mbar, settings.latitude)?;
    let series = pressure.map_values(depth)?;

    let table = analyze(&series, &settings.bursts).context("Failed to compute burst statistics")?;
    output::save_table(&table, &settings.output)
        .with_context(|| format!("Failed to write {}", settings.output.display()))?;
    Ok(())
}

fn join(args: JoinArgs, config: &OwhlConfig) -> Result<()> {
    let input = args.input.resolve(config)?;
    let joined = ingest::join_files(&input.inputs, input.timezone)
        .context("Failed to read logger files")?
        .trim(input.start, input.end);
    output::save_joined(&joined, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    Ok(())
}

fn bounds(args: BoundsArgs, config: &OwhlConfig) -> Result<()> {
    let settings = args.resolve(config)?;
    let input = &settings.input;
    let joined = ingest::join_files(&input.inputs, input.timezone)
        .context("Failed to read logger files")?
        .trim(input.start, input.end);
    let times = joined.pressure.times();

    for index in find_bounds(times, settings.sampling_rate, settings.burst_length_minutes)? {
        println!("{}\t{}", index, times[index].to_rfc3339());
    }
    Ok(())
}

fn depth(args: DepthArgs, config: &OwhlConfig) -> Result<()> {
    let latitude = args.latitude.or(config.latitude());
    let depth = match args.atmospheric {
        Some(atmospheric) => sea_pressure_to_depth(&[args.mbar], atmospheric, latitude)?,
        None => mbar_to_depth(&[args.mbar], latitude)?,
    };
    println!("{:.4}", depth[0]);
    Ok(())
}
