use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use family_plus::catalog::{self, Venue};
use family_plus::config::{Config, ConfigArgs};
use family_plus::report::{Report, ReportClient, ReportSubject};
use family_plus::server::{self, AppState};
use family_plus::services::{
    AddressItem, AddressResolver, BuiltinGeocoder, FallbackGeocoder, Geocoder, NominatimGeocoder,
    ServicesModel,
};
use tracing_subscriber::EnvFilter;

/// Family+: family services around World Cup stadiums
///
/// Geocodes the pharmacies, clinics, supermarkets and parks near Estadio
/// Azteca and Estadio BBVA, and relays facility reports to the organizers.
///
/// Examples:
///   familyplus resolve
///   familyplus resolve --venue bbva --offline --show-skipped
///   familyplus resolve --addresses my-places.json
///   familyplus stadiums
///   familyplus report --title "Anillo Bajo Oriente" --number 1 --kind "Baños" --comment "Sin papel"
///   familyplus serve --port 3000
#[derive(Parser)]
#[command(name = "familyplus", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Geocode an address list and print the resolved services as JSON.
    Resolve {
        #[command(flatten)]
        input: InputArgs,

        /// Also list dropped addresses and why.
        #[arg(long)]
        show_skipped: bool,
    },

    /// Print the supported stadiums as JSON.
    Stadiums,

    /// Send a report about a stadium facility.
    Report {
        /// Place title, e.g. "Explanada Principal - Entrada Norte".
        #[arg(long)]
        title: String,

        /// Pin label on the stadium map.
        #[arg(long)]
        number: String,

        /// Facility kind, e.g. "Baños Familiares".
        #[arg(long)]
        kind: String,

        #[arg(long)]
        comment: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        user: Option<String>,

        /// Stadium id (azteca, bbva); stamps the report in local time.
        #[arg(long)]
        stadium: Option<String>,
    },

    /// Run the JSON HTTP API.
    Serve {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, short = 'p', default_value_t = 3000)]
        port: u16,
    },
}

#[derive(clap::Args)]
struct InputArgs {
    /// Which built-in address list to use: all, azteca or bbva.
    #[arg(long, default_value = "all")]
    venue: String,

    /// JSON file with [{name, address, category}] (overrides --venue).
    #[arg(long)]
    addresses: Option<PathBuf>,

    /// Offline mode: only use built-in coordinates.
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from(cli.config);

    match cli.command {
        Command::Resolve { input, show_skipped } => run_resolve(&config, &input, show_skipped).await,
        Command::Stadiums => print_json(&catalog::stadiums()),
        Command::Report {
            title,
            number,
            kind,
            comment,
            email,
            user,
            stadium,
        } => {
            let subject = ReportSubject { title, number, kind };
            run_report(&config, &subject, &comment, email, user, stadium).await
        }
        Command::Serve { input, host, port } => {
            let state = Arc::new(AppState {
                services: ServicesModel::new(build_resolver(&config, input.offline)),
                addresses: load_input(&input),
                reports: ReportClient::new(&config),
            });
            if let Err(e) = server::start(state, &host, port).await {
                eprintln!("Error: server stopped: {}", e);
                process::exit(1);
            }
        }
    }
}

async fn run_resolve(config: &Config, input: &InputArgs, show_skipped: bool) {
    let items = load_input(input);
    let resolver = build_resolver(config, input.offline);
    let outcome = resolver.resolve_detailed(&items).await;

    for service in &outcome.services {
        eprintln!("  {}", service.display_line());
    }
    eprintln!(
        "  Resolved {} of {} addresses.",
        outcome.services.len(),
        items.len()
    );
    if show_skipped {
        for skipped in &outcome.skipped {
            eprintln!("  \u{26A0}\u{FE0F}  Skipped {}: {}", skipped.name, skipped.reason);
        }
    }

    print_json(&outcome.services);
}

async fn run_report(
    config: &Config,
    subject: &ReportSubject,
    comment: &str,
    email: Option<String>,
    user: Option<String>,
    stadium: Option<String>,
) {
    let tz = match stadium.as_deref() {
        Some(id) => match catalog::stadium(id) {
            Some(s) => s.tz.parse::<chrono_tz::Tz>().ok(),
            None => {
                eprintln!("Error: Unknown stadium '{}'. Use 'azteca' or 'bbva'.", id);
                process::exit(1);
            }
        },
        None => None,
    };

    let client = ReportClient::new(config);
    let result = match Report::new(email.as_deref(), subject, user.as_deref(), comment, Utc::now(), tz) {
        Ok(report) => client.submit(&report).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => eprintln!("  \u{2705} Reporte enviado."),
        Err(e) => {
            tracing::error!(error = %e, endpoint = client.endpoint(), "report failed");
            eprintln!("Error: {}", e.user_message());
            process::exit(1);
        }
    }
}

fn build_resolver(config: &Config, offline: bool) -> AddressResolver {
    let geocoder: Arc<dyn Geocoder> = if offline {
        Arc::new(BuiltinGeocoder)
    } else {
        Arc::new(FallbackGeocoder::new(NominatimGeocoder::new(config), BuiltinGeocoder))
    };
    AddressResolver::new(geocoder).with_threshold(config.proximity_meters)
}

fn load_input(input: &InputArgs) -> Vec<AddressItem> {
    let loaded = match &input.addresses {
        Some(path) => catalog::load_addresses(path),
        None => Venue::parse(&input.venue).map(|v| v.addresses()),
    };
    loaded.unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    })
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: cannot serialize output: {}", e);
            process::exit(1);
        }
    }
}
