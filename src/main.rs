//! LifeQuest - Hero Progression Core
//!
//! Command-line front end for a LifeQuest account.

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use lifequest::api::ApiClient;
use lifequest::config::{self, AppConfig};
use lifequest::goals::GoalDraft;
use lifequest::progression::xp_ratio;
use lifequest::quests::Branch;
use lifequest::session::{OnboardingData, Session, UserRegistration};
use lifequest::store::SessionState;

#[derive(Parser)]
#[command(name = "lifequest", version, about = "Level up your real life")]
struct Cli {
    /// Telegram id to act as (defaults to session.tg_id from config)
    #[arg(long = "user", global = true)]
    user: Option<i64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show level, XP and headline goal
    Status,
    /// List today's quests
    Quests,
    /// Complete a quest
    Complete { quest_id: Uuid },
    /// List reward goals with progress and ETA
    Goals,
    /// Add a reward goal
    GoalAdd {
        level: u32,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Mark a goal as completed
    GoalDone { goal_id: Uuid },
    /// Activate the PRO tier
    Pro,
    /// Finish onboarding and pick the first branch
    Onboard {
        #[arg(long)]
        age: u32,
        #[arg(long)]
        gender: String,
        /// power, stability, longevity or global
        #[arg(long)]
        branch: Branch,
        /// Level of the first reward goal
        #[arg(long, requires = "goal")]
        goal_level: Option<u32>,
        /// First reward goal
        #[arg(long)]
        goal: Option<String>,
        #[arg(long)]
        selfie_url: Option<String>,
    },
    /// Add a development branch (PRO)
    BranchAdd { branch: Branch },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LifeQuest v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config = config::load_config().context("loading configuration")?;
    let session = connect(&config, cli.user).await?;
    let events = session.subscribe();

    let onboarding = matches!(cli.command, Command::Onboard { .. });
    if session.needs_onboarding() && !onboarding {
        bail!("Finish onboarding first: lifequest onboard --age <AGE> --gender <GENDER> --branch <BRANCH>");
    }

    match cli.command {
        Command::Status => print_status(&session.state(), &session),
        Command::Quests => print_quests(&session.state()),
        Command::Complete { quest_id } => {
            let report = session.complete_quest(quest_id).await?;
            println!("+{} XP", report.outcome.total_xp());
            print_status(&session.state(), &session);
        }
        Command::Goals => print_goals(&session),
        Command::GoalAdd { level, text } => {
            let goal = session
                .goals()
                .create(&GoalDraft::new(text.join(" "), level))
                .await?;
            println!("Added goal {} at level {}", goal.id, goal.goal_level);
            session.check_goals();
        }
        Command::GoalDone { goal_id } => {
            let goal = session.goals().complete(goal_id).await?;
            println!("Completed: {}", goal.display_text());
        }
        Command::Pro => {
            let user = session.activate_pro().await?;
            println!("PRO active for {}", user.display_name());
        }
        Command::Onboard {
            age,
            gender,
            branch,
            goal_level,
            goal,
            selfie_url,
        } => {
            let mut data = OnboardingData::new(age, gender, branch);
            if let Some(text) = goal {
                let level = goal_level.unwrap_or(data.goal_level);
                data = data.with_goal(text, level);
            }
            data.selfie_url = selfie_url;
            let user = session.complete_onboarding(&data).await?;
            println!("Welcome, {}! Your path starts on {}", user.display_name(), branch);
            print_status(&session.state(), &session);
        }
        Command::BranchAdd { branch } => {
            let branches = session.add_branch(branch).await?;
            let names: Vec<_> = branches.iter().map(|b| b.to_string()).collect();
            println!("Active branches: {}", names.join(", "));
            print_quests(&session.state());
        }
    }

    for event in events.try_iter() {
        println!("* {}", event.summary());
    }

    session.close();
    Ok(())
}

async fn connect(config: &AppConfig, user: Option<i64>) -> anyhow::Result<Session> {
    let settings = &config.session;
    let tg_id = user
        .or(settings.tg_id)
        .context("no user given: pass --user or set session.tg_id in config.toml")?;

    let api = ApiClient::from_settings(&config.api)?;
    let registration = UserRegistration {
        username: settings.username.clone(),
        first_name: settings.first_name.clone(),
        language_code: settings.language_code.clone(),
        ..UserRegistration::new(tg_id)
    };

    let session = Session::start(Arc::new(api), &registration, settings)
        .await
        .with_context(|| format!("connecting to {}", config.api.base_url))?;
    Ok(session)
}

fn print_status(state: &SessionState, session: &Session) {
    let progress = &state.progress;
    let name = state.user.as_ref().map(|u| u.display_name()).unwrap_or("Hero");
    println!(
        "{} - level {} ({} / {} XP, {:.0}%)",
        name,
        progress.current_level,
        progress.current_xp,
        progress.next_level_xp,
        xp_ratio(progress) * 100.0
    );

    if let (Some(text), Some(metrics)) = (&progress.goal_text, session.headline_metrics()) {
        print!("Goal: {} ({}%", text, metrics.whole_percent());
        match metrics.eta_days {
            Some(days) => println!(", ~{} days)", days),
            None => println!(")"),
        }
    }
}

fn print_quests(state: &SessionState) {
    if state.quests.is_empty() {
        println!("No quests for today");
    }
    for quest in &state.quests {
        let mark = if quest.is_completed { "x" } else { " " };
        println!(
            "[{}] {} {:<10} +{:>3} XP  {}",
            mark, quest.id, quest.branch, quest.xp_reward, quest.title
        );
    }
}

fn print_goals(session: &Session) {
    let overview = session.goal_overview();
    if overview.is_empty() {
        println!("No open goals");
    }
    for entry in overview {
        let eta = entry
            .metrics
            .eta_days
            .map(|d| format!("~{} days", d))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} L{:<3} {:>3}%  {:>6} XP left  {:<10} {}",
            entry.goal.id,
            entry.goal.goal_level,
            entry.metrics.whole_percent(),
            entry.metrics.remaining,
            eta,
            entry.goal.display_text()
        );
    }
}
