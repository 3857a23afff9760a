use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use twitter_bind::{
    encode_parameters, DirectMessageEvent, DirectMessageEventList, Entities, GeoLocation, Paging,
    Query, ResultType, Status, TwitterError, Unit, User,
};

#[derive(Parser)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse statuses and print them as JSON lines
    Status {
        /// JSON file, stdin if omitted
        path: Option<PathBuf>,

        /// Input is an array of statuses
        #[arg(long)]
        list: bool,
    },

    /// Parse a user and print it as JSON
    User {
        /// JSON file, stdin if omitted
        path: Option<PathBuf>,
    },

    /// Parse direct message events and print them as JSON lines
    DirectMessages {
        /// JSON file, stdin if omitted
        path: Option<PathBuf>,

        /// Input is an `events/list` page
        #[arg(long)]
        list: bool,
    },

    /// Print the entities of a status or of a bare entities object
    Entities {
        /// JSON file, stdin if omitted
        path: Option<PathBuf>,
    },

    /// Print the request parameters of a search
    Query {
        query: String,

        #[arg(long)]
        lang: Option<String>,

        #[arg(long)]
        locale: Option<String>,

        #[arg(long)]
        max_id: Option<u64>,

        #[arg(long)]
        count: Option<u32>,

        /// YYYY-MM-DD
        #[arg(long)]
        since: Option<String>,

        #[arg(long)]
        since_id: Option<u64>,

        /// YYYY-MM-DD
        #[arg(long)]
        until: Option<String>,

        #[arg(long)]
        result_type: Option<ResultType>,

        /// Center of a geocode as LAT,LON
        #[arg(long, value_parser = parse_location, allow_hyphen_values = true, requires = "radius")]
        near: Option<GeoLocation>,

        #[arg(long)]
        radius: Option<f64>,

        /// mi or km
        #[arg(long, default_value = "km")]
        unit: Unit,
    },

    /// Decode a search continuation token
    NextPage { token: String },

    /// Print the request parameters of a paged request
    Paging {
        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        count: Option<u32>,

        #[arg(long)]
        since_id: Option<u64>,

        #[arg(long)]
        max_id: Option<u64>,

        /// Parameter codes the endpoint accepts (s, m, c, p)
        #[arg(long, default_value = "smcp")]
        supported: String,

        /// Name of the page size parameter
        #[arg(long, default_value = Paging::COUNT)]
        per_page_name: String,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Status { path, list } => {
            let input = read_input(path)?;
            let statuses = if list {
                Status::list_from_json_str(&input)?
            } else {
                vec![Status::from_json_str(&input)?]
            };
            for status in &statuses {
                if !print_json(status)? {
                    break;
                }
            }
        }
        Command::User { path } => {
            let user = User::from_json_str(&read_input(path)?)?;
            print_json(&user)?;
        }
        Command::DirectMessages { path, list } => {
            let input = read_input(path)?;
            if list {
                let page = DirectMessageEventList::from_json_str(&input)?;
                for event in &page.events {
                    if !print_json(event)? {
                        return Ok(());
                    }
                }
                if let Some(cursor) = &page.next_cursor {
                    tracing::info!(%cursor, "more events available");
                }
            } else {
                print_json(&DirectMessageEvent::from_json_str(&input)?)?;
            }
        }
        Command::Entities { path } => {
            let json: serde_json::Value = serde_json::from_str(&read_input(path)?)?;
            let obj = json
                .as_object()
                .ok_or_else(|| TwitterError::Json("expected an object".to_owned()))?;
            let entities = match obj.get("entities").and_then(|e| e.as_object()) {
                Some(e) => Entities::parse(e)?,
                None => Entities::parse(obj)?,
            };
            print_json(&entities)?;
        }
        Command::Query {
            query,
            lang,
            locale,
            max_id,
            count,
            since,
            since_id,
            until,
            result_type,
            near,
            radius,
            unit,
        } => {
            let mut q = Query::new(query);
            q.lang = lang;
            q.locale = locale;
            q.max_id = max_id;
            q.count = count;
            q.since = since;
            q.since_id = since_id;
            q.until = until;
            q.result_type = result_type;
            if let (Some(location), Some(radius)) = (near, radius) {
                q.set_geo_code(location, radius, unit)?;
            }
            print_line(&encode_parameters(&q.to_parameters()))?;
        }
        Command::NextPage { token } => {
            let q = Query::from_continuation_token(&token)?;
            print_line(&q.to_string())?;
            print_line(&encode_parameters(&q.to_parameters()))?;
        }
        Command::Paging {
            page,
            count,
            since_id,
            max_id,
            supported,
            per_page_name,
        } => {
            let mut paging = Paging::new();
            if let Some(page) = page {
                paging.set_page(page)?;
            }
            if let Some(count) = count {
                paging.set_count(count)?;
            }
            if let Some(since_id) = since_id {
                paging.set_since_id(since_id)?;
            }
            if let Some(max_id) = max_id {
                paging.set_max_id(max_id)?;
            }
            let supported: Vec<char> = supported.chars().collect();
            let params = paging.to_parameters_with(&supported, &per_page_name)?;
            print_line(&encode_parameters(&params))?;
        }
    }
    Ok(())
}

fn parse_location(s: &str) -> Result<GeoLocation, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got {}", s))?;
    let lat = lat.trim().parse().map_err(|_| format!("bad latitude: {}", lat))?;
    let lon = lon.trim().parse().map_err(|_| format!("bad longitude: {}", lon))?;
    Ok(GeoLocation::new(lat, lon))
}

fn read_input(path: Option<PathBuf>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<bool, Box<dyn std::error::Error>> {
    print_line(&serde_json::to_string(value)?)
}

/// Returns `false` once stdout is closed.
fn print_line(line: &str) -> Result<bool, Box<dyn std::error::Error>> {
    if let Err(e) = writeln!(std::io::stdout(), "{}", line) {
        match e.kind() {
            std::io::ErrorKind::BrokenPipe => return Ok(false),
            _ => return Err(e.into()),
        }
    }
    Ok(true)
}
