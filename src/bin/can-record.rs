use std::env;
use std::process;

use log::LevelFilter;
use simple_logger::SimpleLogger;

use can_record::exit::{codes, exit_code};
use can_record::link::IpLink;
use can_record::session;

fn usage(program: &str) {
    eprintln!("Usage:");
    eprintln!(
        "    {} <interface> [bitrate] <seconds> <path-to-output-file>",
        program
    );
    eprintln!();
    eprintln!("Example:");
    eprintln!("    {} can0 30 /mnt/sdcard/recorded.csv", program);
    eprintln!("    {} can0 500000 30 /mnt/sdcard/recorded.csv", program);
}

/// Records CAN traffic from a given interface into a CSV file
/// # Examples
/// ```
/// // can-record can0 30 /mnt/sdcard/recorded.csv
/// ```
fn main() {
    SimpleLogger::new().with_level(LevelFilter::Info).init().unwrap();

    let args: Vec<String> = env::args().collect();
    let program: &str = match args.first() {
        Some(name) => name.as_str(),
        None => "can-record",
    };
    let session = match session::parse_args(args.get(1..).unwrap_or(&[])) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{}: {}", program, e);
            eprintln!();
            usage(program);
            process::exit(codes::INVALID);
        }
    };

    match can_record::run(&session, &IpLink) {
        Ok(summary) => {
            log::info!("done, {} frames recorded", summary.frames);
            process::exit(codes::SUCCESS);
        }
        Err(e) => {
            eprintln!("{}: {}", program, e);
            process::exit(exit_code(&e));
        }
    }
}
