use log::{LevelFilter, Log, Metadata, Record, info};
use schemangle::config::Config;
use schemangle::serializer;
use schemangle::sql::Dialect;
use std::env;
use std::fs;
use std::process;

struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: SimpleLogger = SimpleLogger;

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <schema.sql> [options]", args[0]);
        eprintln!();
        eprintln!("Options:");
        eprintln!("  -o, --output <file>       Output file (default: stdout)");
        eprintln!("  -d, --dialect <name>      postgres, mysql, sqlite, dqlite, generic (default: auto)");
        eprintln!("  -t, --tables <a,b>        Only describe these tables");
        eprintln!("  -x, --exclude <a,b>       Skip these tables");
        eprintln!("  -i, --initialism <word>   Add an initialism (repeatable)");
        eprintln!("      --verbose             Log derived facts");
        process::exit(1);
    }

    let input_path = &args[1];
    let mut output_path: Option<String> = None;
    let mut config = Config::default();
    let mut verbose = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(args[i].clone());
                }
            }
            "-d" | "--dialect" => {
                i += 1;
                if i < args.len() {
                    config.dialect = Dialect::from_str(&args[i]).unwrap_or_else(|| {
                        eprintln!("Invalid dialect: {}", args[i]);
                        process::exit(1);
                    });
                }
            }
            "-t" | "--tables" => {
                i += 1;
                if i < args.len() {
                    config.tables.extend(split_list(&args[i]));
                }
            }
            "-x" | "--exclude" => {
                i += 1;
                if i < args.len() {
                    config.exclude.extend(split_list(&args[i]));
                }
            }
            "-i" | "--initialism" => {
                i += 1;
                if i < args.len() {
                    config.initialisms.insert(&args[i]);
                }
            }
            "--verbose" => verbose = true,
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    if let Err(e) = log::set_logger(&LOGGER).map(|()| log::set_max_level(level)) {
        eprintln!("Failed to install logger: {}", e);
    }

    let input = match fs::read_to_string(input_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {}: {}", input_path, e);
            process::exit(1);
        }
    };

    let ir = match schemangle::generate(&input, &mut config) {
        Ok(ir) => ir,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };
    info!(
        "{}: {} table(s) as {:?}",
        input_path,
        ir.tables.len(),
        config.dialect
    );

    let report = serializer::serialize(&ir);
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &report) {
                eprintln!("Failed to write {}: {}", path, e);
                process::exit(1);
            }
            info!("wrote {}", path);
        }
        None => print!("{}", report),
    }
}
