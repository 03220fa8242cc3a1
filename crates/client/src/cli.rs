use chrono::Utc;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use engine::{FilterCriteria, RenewalWindow};

use api_types::user::RegisterRequest;
use tally_client::{
    ApiClient, AppError, CredentialStore, Result, RouteDecision, SessionGuard, SessionState,
    config::{AppConfig, Overrides},
    guard,
};

const PASSWORD_ENV: &str = "TALLY_PASSWORD";

#[derive(Debug, Parser)]
#[command(name = "tally", disable_version_flag = true)]
pub struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    pub config: Option<String>,
    /// Override API base URL (e.g. http://127.0.0.1:8000/api).
    #[arg(long)]
    base_url: Option<String>,
    /// Override where the session credential is kept.
    #[arg(long)]
    session: Option<String>,
    /// Override display timezone (IANA name).
    #[arg(long)]
    timezone: Option<String>,
    /// Override log level (error, warn, info, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.base_url.clone(),
            session_path: self.session.clone(),
            timezone: self.timezone.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in; the password is read from TALLY_PASSWORD, never from argv.
    Login {
        /// Username or email.
        identifier: String,
        /// Page to continue at, as carried by a login redirect.
        #[arg(long)]
        return_to: Option<String>,
    },
    /// Create an account; the password is read from TALLY_PASSWORD.
    Register {
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    Logout,
    /// Show the session state, and optionally whether a route is reachable.
    Status {
        #[arg(long)]
        route: Option<String>,
    },
    Groups {
        #[command(flatten)]
        text: TextArgs,
        #[command(flatten)]
        range: RangeArgs,
    },
    Receipts {
        #[command(flatten)]
        text: TextArgs,
        #[command(flatten)]
        range: RangeArgs,
        /// Item category label, or All.
        #[arg(long, default_value = "All")]
        category: String,
    },
    Subscriptions {
        #[command(flatten)]
        text: TextArgs,
        /// Renewal window: All, This Month, Within 3 Months, Within 6 Months,
        /// This Year, or a month count.
        #[arg(long, default_value = "All")]
        renewal: String,
        /// Weekly, Monthly, Quarterly, Yearly or All.
        #[arg(long, default_value = "All")]
        billing_period: String,
    },
    /// Next subscription renewals, soonest first.
    Upcoming {
        #[arg(long, default_value_t = engine::UPCOMING_RENEWALS_SHOWN)]
        limit: usize,
    },
}

#[derive(Debug, clap::Args)]
pub struct TextArgs {
    /// Case-insensitive search term.
    #[arg(long, default_value = "")]
    search: String,
}

#[derive(Debug, clap::Args)]
pub struct RangeArgs {
    /// Earliest date, inclusive (YYYY-MM-DD or RFC 3339).
    #[arg(long)]
    from: Option<String>,
    /// Latest date, inclusive, compared at full precision.
    #[arg(long)]
    to: Option<String>,
}

impl RangeArgs {
    fn apply(&self, mut criteria: FilterCriteria) -> Result<FilterCriteria> {
        if let Some(from) = &self.from {
            criteria = criteria.with_start_date(engine::parse_date_bound(from)?);
        }
        if let Some(to) = &self.to {
            criteria = criteria.with_end_date(engine::parse_date_bound(to)?);
        }
        Ok(criteria)
    }
}

pub async fn run<S: CredentialStore>(
    command: Command,
    client: &ApiClient<S>,
    config: &AppConfig,
) -> Result<()> {
    let tz = config.timezone()?;
    match command {
        Command::Login {
            identifier,
            return_to,
        } => {
            let password = password_from_env()?;
            client.login(identifier.trim(), &password).await?;
            println!(
                "Logged in. Continue at {}",
                guard::return_path(return_to.as_deref())
            );
        }
        Command::Register {
            username,
            email,
            first_name,
            last_name,
        } => {
            let request = RegisterRequest {
                username: username.trim().to_string(),
                email: email.trim().to_string(),
                first_name: first_name.trim().to_string(),
                last_name: last_name.trim().to_string(),
                password: password_from_env()?,
            };
            let username = client.register(&request).await?;
            println!("Registered {username}. Log in with `tally login {username}`.");
        }
        Command::Logout => {
            client.logout().await?;
            println!("Logged out.");
        }
        Command::Status { route } => {
            let state = client.guard().state();
            println!("Session: {state:?}");
            if state == SessionState::Authenticated {
                let user = client.me().await?;
                println!("Logged in as {} <{}>", user.username, user.email);
            }
            if let Some(route) = route {
                match client.guard().guard_route(&route) {
                    RouteDecision::Allow => println!("{route}: allowed"),
                    RouteDecision::Redirect(location) => println!("{route}: redirect to {location}"),
                }
            }
        }
        Command::Groups { text, range } => {
            if !route_allowed(client.guard(), "/groups") {
                return Ok(());
            }
            let criteria = range.apply(FilterCriteria::new().with_search_term(text.search))?;

            let groups = client.groups().await?;

            let shown = engine::filter_groups(&groups, &criteria);
            for group in &shown {
                println!("{:>6}  {}  {}", group.id, local_date(&group.created_at, tz), group.name);
            }
            println!("{} of {} groups", shown.len(), groups.len());
        }
        Command::Receipts {
            text,
            range,
            category,
        } => {
            if !route_allowed(client.guard(), "/receipts") {
                return Ok(());
            }
            let criteria = range.apply(
                FilterCriteria::new()
                    .with_search_term(text.search)
                    .with_category(engine::parse_category(&category)?),
            )?;

            let receipts = client.receipts().await?;

            let shown = engine::filter_receipts(&receipts, &criteria);
            for receipt in &shown {
                let categories: Vec<&str> = receipt
                    .items
                    .iter()
                    .filter_map(|item| item.category.as_deref())
                    .collect();
                println!(
                    "{:>6}  {}  {:<24} {:>10.2}  {}",
                    receipt.id,
                    local_date(&receipt.date, tz),
                    receipt.merchant.as_deref().unwrap_or("-"),
                    receipt.total_amount,
                    categories.join(", ")
                );
            }
            println!("{} of {} receipts", shown.len(), receipts.len());
        }
        Command::Subscriptions {
            text,
            renewal,
            billing_period,
        } => {
            if !route_allowed(client.guard(), "/subscriptions") {
                return Ok(());
            }
            let criteria = FilterCriteria::new()
                .with_search_term(text.search)
                .with_renewal_window(renewal.parse::<RenewalWindow>()?)
                .with_billing_period(engine::parse_billing_period(&billing_period)?);

            let subscriptions = client.subscriptions().await?;

            let shown = engine::filter_subscriptions(&subscriptions, &criteria, Utc::now());
            for subscription in &shown {
                println!(
                    "{:>6}  {}  {:<24} {:<10} {:>10.2}",
                    subscription.id,
                    local_date(&subscription.renewal_date, tz),
                    subscription.merchant,
                    subscription.billing_period,
                    subscription.total_amount
                );
            }
            println!(
                "{} of {} subscriptions (renewing {})",
                shown.len(),
                subscriptions.len(),
                criteria.renewal_window
            );
        }
        Command::Upcoming { limit } => {
            if !route_allowed(client.guard(), "/subscriptions") {
                return Ok(());
            }
            let subscriptions = client.subscriptions().await?;
            let upcoming = engine::upcoming_renewals(&subscriptions, Utc::now(), limit);
            if upcoming.is_empty() {
                println!("No upcoming renewals.");
            }
            for subscription in &upcoming {
                println!(
                    "{}  {}",
                    local_date(&subscription.renewal_date, tz),
                    subscription.merchant
                );
            }
        }
    }
    Ok(())
}

fn password_from_env() -> Result<String> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|password| !password.is_empty())
        .ok_or_else(|| AppError::Invalid(format!("set {PASSWORD_ENV} to a non-empty password")))
}

fn route_allowed<S: CredentialStore>(guard: &SessionGuard<S>, route: &str) -> bool {
    match guard.guard_route(route) {
        RouteDecision::Allow => true,
        RouteDecision::Redirect(location) => {
            eprintln!("Not logged in. Run `tally login <identifier> --return-to {route}` ({location}).");
            false
        }
    }
}

fn local_date(raw: &str, tz: Tz) -> String {
    match engine::dates::parse_timestamp(raw) {
        Some(ts) => ts.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string(),
        None => raw.to_string(),
    }
}
