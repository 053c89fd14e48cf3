use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use geocoin_engine::{GeoSession, GridAddress, SensorUpdate, TransferOutcome};
use tracing::{debug, error, info};

use super::bootstrap::AppWiring;
use super::commands::{parse_command, Command, HELP_TEXT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring { paths, mut session } = app;
    info!(save_dir = %paths.save_dir.display(), "command_loop_started");
    println!("type `help` for commands");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        if let Err(err) = io::stdout().flush() {
            debug!(error = %err, "prompt_flush_failed");
        }
        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(err)) => {
                error!(error = %err, "stdin_read_failed");
                return ExitCode::FAILURE;
            }
            None => break,
        };

        match parse_command(&line) {
            Ok(Some(command)) => {
                if dispatch(&mut session, command) == Flow::Quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(message) => println!("{message}"),
        }
    }

    info!(points = session.points(), "command_loop_finished");
    ExitCode::SUCCESS
}

fn dispatch(session: &mut GeoSession, command: Command) -> Flow {
    match command {
        Command::Step(direction) => {
            if !session.step(direction) {
                println!("cannot walk {} any further", direction.as_token());
            }
        }
        Command::Sensor(point) => match session.sensor_update(point) {
            SensorUpdate::Applied => {}
            SensorUpdate::Ignored => println!("position tracking is off; run `track on` first"),
            SensorUpdate::Rejected => {
                println!("position ({}, {}) is not on the grid", point.lat, point.lng)
            }
        },
        Command::Track(enabled) => {
            session.set_tracking(enabled);
            println!("position tracking {}", if enabled { "on" } else { "off" });
        }
        Command::Collect(target) => {
            let address = target.unwrap_or_else(|| session.player_address());
            report_transfer("collected", address, session.collect(address), session);
        }
        Command::Deposit(target) => {
            let address = target.unwrap_or_else(|| session.player_address());
            report_transfer("deposited", address, session.deposit(address), session);
        }
        Command::Look => print_nearby(session),
        Command::Inventory => {
            let coins = session
                .player_coins()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>();
            println!("{} points: [{}]", session.points(), coins.join(", "));
        }
        Command::Reset => session.reset(),
        Command::Help => println!("{HELP_TEXT}"),
        Command::Quit => return Flow::Quit,
    }
    Flow::Continue
}

fn report_transfer(
    verb: &str,
    address: GridAddress,
    result: Result<TransferOutcome, geocoin_engine::SessionError>,
    session: &GeoSession,
) {
    match result {
        Ok(TransferOutcome::Transferred(coin)) => {
            println!("{verb} coin {coin} at {address}; {} points", session.points());
        }
        Ok(TransferOutcome::SourceEmpty) => println!("nothing to move at {address}"),
        Err(error) => println!("{error}"),
    }
}

fn print_nearby(session: &GeoSession) {
    let here = session.player_address();
    let mut rows = session
        .visible_caches()
        .map(|cell| (cell.address.chebyshev_distance(here), cell.address, cell.value()))
        .collect::<Vec<_>>();
    rows.sort();
    if rows.is_empty() {
        println!("no caches nearby");
        return;
    }
    for (distance, address, value) in rows {
        let marker = if distance == 0 { " (here)" } else { "" };
        println!("cache {address}: {value} coins{marker}");
    }
}
