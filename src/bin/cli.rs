use clap::{App, Arg, ArgMatches, SubCommand};
use sr_rxbuf::{
    limits, MessageNotifier, Payload, ReadOutcome, ReceiveRegistry, RecordingNotifier, RegistryConfig, Result,
    RxError, LogFatalSink,
};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let matches = App::new("rxbuf-cli")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Receive buffer tool for safe transport connections")
        .subcommand(
            SubCommand::with_name("simulate")
                .about("Drive an interleaved add/read workload and print the registry state")
                .arg(
                    Arg::with_name("config")
                        .short("f")
                        .long("config")
                        .value_name("FILE")
                        .help("TOML registry configuration (overrides --connections/--capacity)")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("connections")
                        .short("n")
                        .long("connections")
                        .value_name("COUNT")
                        .help("Number of connections")
                        .default_value("2")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("capacity")
                        .short("c")
                        .long("capacity")
                        .value_name("SLOTS")
                        .help("Slots per connection")
                        .default_value("20")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("messages")
                        .short("m")
                        .long("messages")
                        .value_name("COUNT")
                        .help("Messages added per connection")
                        .default_value("100")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("payload_size")
                        .short("s")
                        .long("payload-size")
                        .value_name("BYTES")
                        .help("Payload size in bytes")
                        .default_value("64")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("eventfd")
                        .long("eventfd")
                        .help("Deliver notifications through an eventfd (Linux only)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("check-config")
                .about("Validate a TOML registry configuration")
                .arg(
                    Arg::with_name("config")
                        .value_name("FILE")
                        .help("Configuration file")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            SubCommand::with_name("info")
                .about("Show version and compile-time limits"),
        )
        .get_matches();

    match matches.subcommand() {
        ("simulate", Some(sim_matches)) => handle_simulate(sim_matches),
        ("check-config", Some(check_matches)) => handle_check_config(check_matches),
        ("info", Some(_)) => show_info(),
        _ => {
            println!("Use --help for usage information");
            Ok(())
        }
    }
}

fn parse_usize(matches: &ArgMatches, name: &str) -> Result<usize> {
    matches
        .value_of(name)
        .ok_or_else(|| RxError::invalid_parameter(name, "missing value"))?
        .parse()
        .map_err(|_| RxError::invalid_parameter(name, "not a non-negative integer"))
}

fn handle_simulate(matches: &ArgMatches) -> Result<()> {
    let config = match matches.value_of("config") {
        Some(path) => RegistryConfig::from_toml_file(path)?,
        None => RegistryConfig::new(
            parse_usize(matches, "connections")?,
            parse_usize(matches, "capacity")?,
        ),
    };
    let messages = parse_usize(matches, "messages")?;
    let payload_size = parse_usize(matches, "payload_size")?;

    if matches.is_present("eventfd") {
        #[cfg(target_os = "linux")]
        {
            let notifier = sr_rxbuf::EventFdNotifier::new()?;
            let observer = notifier.clone();
            let mut registry = ReceiveRegistry::from_config(&config, notifier, LogFatalSink)?;
            simulate(&mut registry, messages, payload_size)?;
            println!("eventfd drained {} notification(s)", observer.try_drain()?);
            return Ok(());
        }
        #[cfg(not(target_os = "linux"))]
        {
            return Err(RxError::platform("eventfd not supported on this platform"));
        }
    }

    let mut registry = ReceiveRegistry::from_config(&config, RecordingNotifier::new(), LogFatalSink)?;
    simulate(&mut registry, messages, payload_size)?;
    println!("notifier saw {} notification(s)", registry.notifier().count());
    Ok(())
}

/// Round-robin adds over every connection, reading one message whenever a
/// connection is full and on every second round.
fn simulate<N: MessageNotifier>(
    registry: &mut ReceiveRegistry<N, LogFatalSink>,
    messages: usize,
    payload_size: usize,
) -> Result<()> {
    let connection_count = registry.connection_count()?;
    let mut delivered = 0usize;

    for round in 0..messages {
        for connection_id in 0..connection_count {
            if registry.free_count(connection_id)? == 0 {
                delivered += drain_one(registry, connection_id)?;
            }

            let fill = (round + connection_id) as u8;
            let payload = Payload::from_slice(&vec![fill; payload_size])?;
            registry.add(connection_id, &payload)?;

            if round % 2 == 1 {
                delivered += drain_one(registry, connection_id)?;
            }
        }
    }

    let snapshot = registry.snapshot()?;
    print!("{}", snapshot.render());
    println!("delivered {} message(s), {} still queued", delivered, snapshot.total_used());
    Ok(())
}

fn drain_one<N: MessageNotifier>(registry: &mut ReceiveRegistry<N, LogFatalSink>, connection_id: usize) -> Result<usize> {
    match registry.read(connection_id)? {
        ReadOutcome::Message(_) => Ok(1),
        ReadOutcome::NoMessageReceived => Ok(0),
    }
}

fn handle_check_config(matches: &ArgMatches) -> Result<()> {
    let path = matches
        .value_of("config")
        .ok_or_else(|| RxError::invalid_parameter("config", "missing path"))?;
    let config = RegistryConfig::from_toml_file(path)?;

    println!("{}: ok", path);
    println!("  connections: {}", config.connection_count);
    println!("  capacity:    {}", config.capacity);
    println!("  slots:       {}", config.total_slots());
    println!(
        "  limits:      max_connections={} capacity=[{}, {}]",
        config.limits.max_connections, config.limits.min_capacity, config.limits.max_capacity
    );
    Ok(())
}

fn show_info() -> Result<()> {
    println!("rxbuf-cli {}", sr_rxbuf::VERSION);
    println!("  connections: [{}, {}] (ceiling {})", limits::MIN_CONNECTIONS, limits::MAX_CONNECTIONS, limits::MAX_CONNECTIONS_CEILING);
    println!("  capacity:    [{}, {}]", limits::MIN_CAPACITY, limits::MAX_CAPACITY);
    println!("  payload:     [{}, {}] bytes", limits::MIN_PAYLOAD_LEN, limits::MAX_PAYLOAD_LEN);
    Ok(())
}
