use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wildtrack::{
    config::BackendConfig,
    error::Error,
    flow::{
        auth::{AuthFlow, SignUpForm},
        fetch::{map_markers, FetchError, RetrievalFlow, DASHBOARD_RECENT_LIMIT},
        map::{MapViewport, DEFAULT_REGION},
        submit::SubmissionFlow,
    },
    location::{FixedLocation, Position},
    model::{IncidentCategory, ReportDraft, ResourceEntry},
    server::{DocumentClient, IdentityClient},
    session::{FileStore, SessionStore},
};

#[derive(Parser)]
struct CliParser {
    /// Base URL of the managed identity service.
    #[arg(long)]
    identity_url: Option<String>,

    /// Base URL of the managed document store.
    #[arg(long)]
    store_url: Option<String>,

    /// Project API key for the identity service.
    #[arg(long)]
    api_key: Option<String>,

    /// Command to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and sign in.
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long, default_value = "")]
        state: String,
        #[arg(long, default_value = "")]
        zipcode: String,
    },
    /// Sign in with an existing account.
    SignIn { email: String, password: String },
    /// Drop the cached session.
    SignOut,
    /// Submit an incident report at the given coordinates.
    Report {
        /// What was observed.
        description: String,
        #[arg(long, default_value = "sighting")]
        category: IncidentCategory,
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,
        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,
        /// Incident date (YYYY-MM-DD); omit to use the current time.
        #[arg(long)]
        date: Option<String>,
        /// Incident time (HH:MM, 24-hour); omit to use the current time.
        #[arg(long)]
        time: Option<String>,
    },
    /// List the most recent incidents.
    Recent {
        #[arg(long, default_value_t = DASHBOARD_RECENT_LIMIT)]
        limit: u32,
    },
    /// Show the incident map markers and the fitted viewport.
    Map,
    /// Show the educational resources.
    Resources,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli_args = CliParser::parse();

    let mut config = BackendConfig::from_env();
    if let Some(url) = cli_args.identity_url {
        config.identity_url = url;
    }
    if let Some(url) = cli_args.store_url {
        config.store_url = url;
    }
    if let Some(key) = cli_args.api_key {
        config.api_key = key;
    }

    let driver = WildTracker::new(config)?;

    match cli_args.command {
        Command::SignUp {
            email,
            password,
            confirm_password,
            name,
            phone,
            address,
            city,
            state,
            zipcode,
        } => {
            driver
                .sign_up(SignUpForm {
                    name,
                    email,
                    phone,
                    password,
                    confirm_password,
                    address,
                    city,
                    state,
                    zipcode,
                })
                .await
        }
        Command::SignIn { email, password } => driver.sign_in(&email, &password).await,
        Command::SignOut => driver.sign_out(),
        Command::Report {
            description,
            category,
            latitude,
            longitude,
            date,
            time,
        } => {
            driver
                .report(description, category, latitude, longitude, date, time)
                .await
        }
        Command::Recent { limit } => driver.recent(limit).await,
        Command::Map => driver.map().await,
        Command::Resources => driver.resources().await,
    }
}

struct WildTracker {
    config: BackendConfig,
    session: SessionStore<FileStore>,
}

impl WildTracker {
    fn new(config: BackendConfig) -> Result<Self> {
        let session = SessionStore::new(FileStore::open_default()?);
        Ok(Self { config, session })
    }

    fn identity_client(&self) -> IdentityClient {
        IdentityClient::new(self.config.identity_url.as_str(), self.config.api_key.as_str())
    }

    /// A document client carrying the signed-in user's token, when any.
    fn document_client(&self) -> DocumentClient {
        let client = DocumentClient::new(self.config.store_url.as_str());
        match self.session.load() {
            Some(snapshot) => client.with_token(snapshot.token),
            None => client,
        }
    }

    async fn sign_up(&self, form: SignUpForm) -> Result<()> {
        let identity = self.identity_client();
        let documents = self.document_client();
        let flow = AuthFlow::new(&identity, &documents, &self.session);

        match flow.sign_up(&form).await {
            Ok(snapshot) => {
                println!("Welcome {}!", snapshot.display_name());
                Ok(())
            }
            Err(err) => bail!("{}", err.user_message()),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        let identity = self.identity_client();
        let documents = self.document_client();
        let flow = AuthFlow::new(&identity, &documents, &self.session);

        match flow.sign_in(email, password).await {
            Ok(snapshot) => {
                println!("Welcome {}!", snapshot.display_name());
                println!("Logged in as {}", snapshot.email);
                Ok(())
            }
            Err(err) => bail!("{}", err.user_message()),
        }
    }

    fn sign_out(&self) -> Result<()> {
        self.session.clear();
        println!("Signed out.");
        Ok(())
    }

    async fn report(
        &self,
        description: String,
        category: IncidentCategory,
        latitude: f64,
        longitude: f64,
        date: Option<String>,
        time: Option<String>,
    ) -> Result<()> {
        let Some(snapshot) = self.session.load() else {
            bail!("Please sign in before reporting an incident.");
        };

        let documents = self.document_client();
        let location = FixedLocation(Position {
            latitude,
            longitude,
        });
        let flow = SubmissionFlow::new(&documents, &location, snapshot.uid.as_str());

        let mut draft = ReportDraft {
            description,
            category,
            use_current_time: date.is_none() && time.is_none(),
            custom_date: date.unwrap_or_default(),
            custom_time: time.unwrap_or_default(),
        };

        match flow.submit(&mut draft).await {
            Ok(reference) => {
                println!("Incident reported successfully! (id {})", reference.id);
                Ok(())
            }
            Err(Error::Store(_)) => bail!("Failed to submit report. Please try again."),
            Err(err) => bail!("{}", err.user_message()),
        }
    }

    async fn recent(&self, limit: u32) -> Result<()> {
        let documents = self.document_client();
        let flow = RetrievalFlow::new(&documents);

        let incidents = match flow.fetch_recent(Some(limit)).await {
            Ok(incidents) => incidents,
            Err(err) => return Self::fetch_failed(err),
        };

        if incidents.is_empty() {
            println!("No recent incidents");
            return Ok(());
        }
        for incident in &incidents {
            println!(
                "[{}] {} at {} ({})",
                incident.category,
                incident.preview(),
                incident.incident_time,
                incident.id
            );
        }
        Ok(())
    }

    async fn map(&self) -> Result<()> {
        let documents = self.document_client();
        let flow = RetrievalFlow::new(&documents);

        let incidents = match flow.fetch_recent(None).await {
            Ok(incidents) => incidents,
            Err(err) => return Self::fetch_failed(err),
        };

        let markers = map_markers(&incidents);
        let mut viewport = MapViewport::new();
        let region = viewport.fit(&markers).unwrap_or(DEFAULT_REGION);

        println!(
            "Viewport: center ({:.6}, {:.6}), span ({:.4}, {:.4})",
            region.latitude, region.longitude, region.latitude_delta, region.longitude_delta
        );
        println!(
            "{} of {} incidents have map coordinates",
            markers.len(),
            incidents.len()
        );
        for (incident, marker) in incidents
            .iter()
            .filter(|incident| incident.position.is_some())
            .zip(&markers)
        {
            println!(
                "  ({:.6}, {:.6}) {}: {}",
                marker.latitude,
                marker.longitude,
                incident.category,
                incident.preview()
            );
        }
        Ok(())
    }

    async fn resources(&self) -> Result<()> {
        let documents = self.document_client();
        let flow = RetrievalFlow::new(&documents);

        let entries = match flow.fetch_resources().await {
            Ok(entries) if entries.is_empty() => ResourceEntry::builtin(),
            Ok(entries) => entries,
            Err(FetchError(cause)) => {
                // Static fallback content, so the screen is never empty.
                tracing::warn!(error = %cause, "falling back to built-in resources");
                ResourceEntry::builtin()
            }
        };

        for entry in &entries {
            println!("{}", entry.title);
            println!("  {}", entry.short_description);
        }
        Ok(())
    }

    /// Print the classified error state with its retry affordance.
    fn fetch_failed(err: FetchError) -> Result<()> {
        bail!("{} Run the command again to retry.", err.user_message())
    }
}
