use geocoin_engine::{Direction, GeoPoint, GridAddress};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Command {
    Step(Direction),
    Sensor(GeoPoint),
    Track(bool),
    /// `None` targets the cache under the player.
    Collect(Option<GridAddress>),
    Deposit(Option<GridAddress>),
    Look,
    Inventory,
    Reset,
    Help,
    Quit,
}

pub(crate) const HELP_TEXT: &str = "\
commands:
  n | s | e | w            step one cell north/south/east/west
  goto <lat> <lng>         feed a position sample (needs `track on`)
  track on|off             start/stop following position samples
  collect [<i> <j>]        take the top coin from a cache
  deposit [<i> <j>]        put your top coin into a cache
  look                     list nearby caches
  inv                      list your coins
  reset                    forget all progress
  help | quit";

/// Parses one input line. Blank lines yield `Ok(None)`.
pub(crate) fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let words = line.split_whitespace().collect::<Vec<_>>();
    let Some((&head, args)) = words.split_first() else {
        return Ok(None);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "n" | "north" => step(Direction::North, args)?,
        "s" | "south" => step(Direction::South, args)?,
        "e" | "east" => step(Direction::East, args)?,
        "w" | "west" => step(Direction::West, args)?,
        "goto" => match args {
            [lat, lng] => Command::Sensor(GeoPoint::new(
                parse_number::<f64>("lat", lat)?,
                parse_number::<f64>("lng", lng)?,
            )),
            _ => return Err("goto takes <lat> <lng>".to_string()),
        },
        "track" => match args {
            ["on"] => Command::Track(true),
            ["off"] => Command::Track(false),
            _ => return Err("track takes on|off".to_string()),
        },
        "collect" | "c" => Command::Collect(optional_address("collect", args)?),
        "deposit" | "d" => Command::Deposit(optional_address("deposit", args)?),
        "look" | "l" => no_args(Command::Look, "look", args)?,
        "inv" | "inventory" => no_args(Command::Inventory, "inv", args)?,
        "reset" => no_args(Command::Reset, "reset", args)?,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{other}' (try `help`)")),
    };
    Ok(Some(command))
}

fn step(direction: Direction, args: &[&str]) -> Result<Command, String> {
    no_args(Command::Step(direction), direction.as_token(), args)
}

fn no_args(command: Command, name: &str, args: &[&str]) -> Result<Command, String> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(format!("{name} takes no arguments"))
    }
}

fn optional_address(name: &str, args: &[&str]) -> Result<Option<GridAddress>, String> {
    match args {
        [] => Ok(None),
        [i, j] => Ok(Some(GridAddress::new(
            parse_number::<i32>("i", i)?,
            parse_number::<i32>("j", j)?,
        ))),
        _ => Err(format!("{name} takes either nothing or <i> <j>")),
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, String> {
    raw.parse::<T>()
        .map_err(|_| format!("invalid {field} value '{raw}'"))
}
