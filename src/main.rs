use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mixpanel::config::Settings;
use mixpanel::{
    DataClient, EngageQuery, ExportQuery, HttpTransport, ProfileOperation, ProfileUpdate,
    Properties, TrackEvent, TrackOptions, TrackingClient, Transport,
};

#[derive(Parser)]
#[command(name = "mixpanel")]
#[command(about = "Send events and profile updates, export raw data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track a single event
    Track {
        /// Distinct id of the user
        #[arg(long)]
        distinct_id: String,
        /// Event name
        #[arg(long)]
        event: String,
        /// Event property as key=value (value parsed as JSON when possible)
        #[arg(long = "property", value_name = "KEY=VALUE")]
        properties: Vec<String>,
        #[command(flatten)]
        modifiers: Modifiers,
        /// Print the tracking URL instead of sending it
        #[arg(long)]
        url_only: bool,
    },
    /// Apply one operation to a user profile
    Engage {
        #[arg(long)]
        distinct_id: String,
        #[arg(long, value_enum)]
        operation: Operation,
        /// key=value for set/set-once/add/append/union, a bare name for unset
        #[arg(long = "property", value_name = "KEY=VALUE")]
        properties: Vec<String>,
        #[arg(long)]
        ip: Option<String>,
        #[arg(long)]
        ignore_time: bool,
    },
    /// Download raw events for a date range
    Export {
        /// First day, yyyy-mm-dd
        #[arg(long)]
        from_date: String,
        /// Last day, yyyy-mm-dd
        #[arg(long)]
        to_date: String,
        /// Only export this event (repeatable)
        #[arg(long = "event")]
        events: Vec<String>,
        /// Filter expression
        #[arg(long = "where")]
        where_clause: Option<String>,
        /// Print the signed URL instead of sending it
        #[arg(long)]
        url_only: bool,
    },
    /// Query people profiles
    People {
        #[arg(long = "where")]
        where_clause: Option<String>,
        #[arg(long)]
        session_id: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
}

#[derive(Args)]
struct Modifiers {
    /// Geolocate with the request IP
    #[arg(long)]
    ip: bool,
    /// Redirect to this URL after tracking
    #[arg(long)]
    redirect: Option<String>,
    /// Respond with a tracking pixel
    #[arg(long)]
    img: bool,
    /// JS callback wrapping the response
    #[arg(long)]
    callback: Option<String>,
    /// Ask for a verbose status response
    #[arg(long)]
    verbose: bool,
}

impl From<Modifiers> for TrackOptions {
    fn from(m: Modifiers) -> Self {
        TrackOptions {
            ip: m.ip,
            redirect: m.redirect,
            img: m.img,
            callback: m.callback,
            verbose: m.verbose,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Operation {
    Set,
    SetOnce,
    Add,
    Append,
    Union,
    Unset,
    Delete,
}

fn parse_properties(raw: &[String]) -> Result<Properties> {
    let mut properties = Properties::new();
    for pair in raw {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("property '{pair}' must be KEY=VALUE"))?;
        let value =
            serde_json::from_str::<Value>(value).unwrap_or_else(|_| Value::from(value));
        properties.set(key, value);
    }
    Ok(properties)
}

fn build_operation(operation: Operation, raw: &[String]) -> Result<ProfileOperation> {
    Ok(match operation {
        Operation::Set => ProfileOperation::Set(parse_properties(raw)?),
        Operation::SetOnce => ProfileOperation::SetOnce(parse_properties(raw)?),
        Operation::Add => ProfileOperation::Add(parse_properties(raw)?),
        Operation::Append => ProfileOperation::Append(parse_properties(raw)?),
        Operation::Union => ProfileOperation::Union(parse_properties(raw)?),
        Operation::Unset => {
            if raw.is_empty() {
                bail!("unset needs at least one --property name");
            }
            ProfileOperation::Unset(raw.to_vec())
        }
        Operation::Delete => ProfileOperation::Delete,
    })
}

fn write_output(bytes: &[u8]) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(bytes)?;
    if !bytes.ends_with(b"\n") {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    let endpoints = settings.endpoints();
    let transport: Arc<dyn Transport> = Arc::new(
        HttpTransport::new(&settings.http()).context("failed to build HTTP client")?,
    );

    match cli.command {
        Commands::Track {
            distinct_id,
            event,
            properties,
            modifiers,
            url_only,
        } => {
            let client = TrackingClient::with_transport(settings.token()?, endpoints, transport);
            let event =
                TrackEvent::new(distinct_id, event).with_properties(parse_properties(&properties)?);
            let options = TrackOptions::from(modifiers);

            if url_only {
                println!("{}", client.track_url(&event, &options)?);
            } else {
                write_output(&client.track(&event, &options).await?)?;
            }
        }
        Commands::Engage {
            distinct_id,
            operation,
            properties,
            ip,
            ignore_time,
        } => {
            let client = TrackingClient::with_transport(settings.token()?, endpoints, transport);
            let mut update =
                ProfileUpdate::new(distinct_id, build_operation(operation, &properties)?);
            update.ip = ip;
            update.ignore_time = ignore_time;

            write_output(&client.engage(&update).await?)?;
        }
        Commands::Export {
            from_date,
            to_date,
            events,
            where_clause,
            url_only,
        } => {
            let (api_key, api_secret) = settings.api_credentials()?;
            let client = DataClient::with_transport(api_key, api_secret, endpoints, transport);
            let query = ExportQuery {
                from_date,
                to_date,
                events,
                where_clause,
            };

            if url_only {
                println!("{}", client.export_url(&query)?);
            } else {
                let body = client.export(&query).await?;
                info!(bytes = body.len(), "export finished");
                write_output(&body)?;
            }
        }
        Commands::People {
            where_clause,
            session_id,
            page,
        } => {
            let (api_key, api_secret) = settings.api_credentials()?;
            let client = DataClient::with_transport(api_key, api_secret, endpoints, transport);
            let query = EngageQuery {
                where_clause,
                session_id,
                page,
            };

            write_output(&client.engage_query(&query).await?)?;
        }
    }

    Ok(())
}
