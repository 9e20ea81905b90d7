use crate::config::Config;
use crate::display::*;
use crate::loader::Loader;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use defense_planner::grading::GradeBoundaries;
use defense_planner::model::*;
use defense_planner::{checks, committee, export, grading, schedule};
use eyre::{Result, WrapErr, bail, ensure};
use std::path::PathBuf;
use tracing::{Level, info, warn};

mod config;
mod display;
mod loader;

#[derive(Parser)]
#[command(
    version,
    author,
    about = "Assign defense committees, schedule defenses and grade final-year projects"
)]
struct Opt {
    /// Use FILE instead of defense-planner.toml
    #[arg(short, long, value_name = "FILE", default_value = "defense-planner.toml")]
    config: PathBuf,
    /// Do not write back results to database
    #[arg(short = 'n', long)]
    dry_run: bool,
    /// Set verbosity level
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assign missing committee members, then schedule missing defenses
    Auto,
    /// Assign missing committee members
    AssignCommittees,
    /// Schedule missing defenses
    Schedule,
    /// List advisors and their eligibility for a committee seat
    Eligible {
        project: ProjectId,
        role: CommitteeRole,
    },
    /// List rooms still free at a given date and time
    Rooms {
        date: NaiveDate,
        time: String,
        /// Ignore the current booking of this project
        #[arg(long)]
        project: Option<ProjectId>,
    },
    /// Set or clear (without --advisor) a committee seat
    SetCommittee {
        project: ProjectId,
        role: CommitteeRole,
        #[arg(long)]
        advisor: Option<AdvisorId>,
        /// Accept an advisor which is not eligible
        #[arg(long)]
        force: bool,
    },
    /// Set the defense slot of a project, missing fields are cleared
    SetDefense {
        project: ProjectId,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        room: Option<String>,
        /// Accept a room which is already booked
        #[arg(long)]
        force: bool,
    },
    /// Clear the defense slot of a project, or every slot and committee
    Clear {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        project: Option<ProjectId>,
        #[arg(long)]
        all: bool,
        /// Confirm clearing every schedule and committee
        #[arg(long)]
        yes: bool,
    },
    /// Compute and store the grade of every scoreable project
    Grade {
        /// Grade only this project
        project: Option<ProjectId>,
    },
    /// Display committees, schedule and advisor load
    Report,
    /// Export the defense schedule as CSV
    Export { output: PathBuf },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn changed_committees<'a>(before: &Roster, after: &'a Roster) -> Vec<&'a Project> {
    after
        .projects
        .iter()
        .zip(&before.projects)
        .filter(|(a, b)| a.committee != b.committee)
        .map(|(a, _)| a)
        .collect()
}

fn changed_schedules(before: &Roster, after: &Roster) -> Vec<(ProjectId, DefenseSlot)> {
    after
        .projects
        .iter()
        .zip(&before.projects)
        .filter(|(a, b)| a.defense != b.defense)
        .map(|(a, _)| (a.id.clone(), a.defense.clone()))
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let opt = Opt::parse();
    init_logging(opt.verbose);
    let mut config = Config::load(&opt.config)?;
    if config.defense.start_defense_date.is_none() {
        let today = chrono::Local::now().date_naive();
        info!(%today, "no defense start date configured, starting today");
        config.defense.start_defense_date = Some(today);
    }
    let mut loader = Loader::new(&config.database.url).await?;
    let mut roster = loader.load().await?;
    let original = roster.clone();
    match opt.command {
        Command::Auto | Command::AssignCommittees | Command::Schedule => {
            let committees = (!matches!(opt.command, Command::Schedule))
                .then(|| committee::auto_assign(&mut roster));
            let defenses = (!matches!(opt.command, Command::AssignCommittees))
                .then(|| schedule::auto_schedule(&mut roster, &config.defense));
            if !opt.dry_run {
                loader
                    .bulk_update_committees(&changed_committees(&original, &roster))
                    .await?;
                loader
                    .bulk_update_schedules(&changed_schedules(&original, &roster))
                    .await?;
            }
            display_committees(&roster);
            display_schedule(&roster);
            display_incomplete(&roster);
            checks::check_consistency(&roster);
            if let Some(n) = committees {
                println!("{n} committees assigned");
            }
            if let Some(n) = defenses {
                println!("{n} defenses scheduled");
            }
        }
        Command::Eligible { project, role } => {
            let p = roster.require_project(&project)?;
            display_candidates(p, role, &committee::eligible_advisors(&roster, p, role));
        }
        Command::Rooms {
            date,
            time,
            project,
        } => {
            if let Some(project) = &project {
                roster.require_project(project)?;
            }
            let rooms =
                schedule::available_rooms(&roster, &config.defense, date, &time, project.as_ref());
            if rooms.is_empty() {
                println!("No room available on {date} at {time}");
            } else {
                println!("Rooms available on {date} at {time}: {}", rooms.join(", "));
            }
        }
        Command::SetCommittee {
            project,
            role,
            advisor,
            force,
        } => {
            if let Some(advisor) = &advisor {
                let p = roster.require_project(&project)?;
                let candidates = committee::eligible_advisors(&roster, p, role);
                let candidate = candidates
                    .iter()
                    .find(|c| &c.advisor.id == advisor)
                    .ok_or_else(|| defense_planner::Error::AdvisorNotFound(advisor.clone()))?;
                if !candidate.can_remain() {
                    let reasons = candidate
                        .reasons
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    if force {
                        warn!("assigning ineligible advisor {}: {reasons}", candidate.advisor);
                    } else {
                        bail!("{} is not eligible: {reasons}", candidate.advisor);
                    }
                }
            }
            let p = committee::assign_committee(&mut roster, &project, role, advisor.as_ref())?;
            println!(
                "{p}: {role} committee member is now {}",
                p.committee
                    .get(role)
                    .map_or_else(|| "unset".to_owned(), ToString::to_string)
            );
            if !opt.dry_run {
                loader
                    .update_project_committee(&project, role, advisor.as_ref())
                    .await?;
            }
        }
        Command::SetDefense {
            project,
            date,
            time,
            room,
            force,
        } => {
            let slot = DefenseSlot { date, time, room };
            if let Some((date, time, room)) = slot.booking() {
                let free = schedule::available_rooms(
                    &roster,
                    &config.defense,
                    date,
                    time,
                    Some(&project),
                );
                if !free.iter().any(|r| r == room) {
                    if force {
                        warn!("room {room} is not available on {date} at {time}");
                    } else {
                        bail!("room {room} is not available on {date} at {time}");
                    }
                }
            }
            let p = schedule::assign_defense(&mut roster, &project, slot.clone())?;
            println!("{p}: defense set to {} ({:?})", p.defense, p.defense.state());
            if !opt.dry_run {
                loader
                    .update_project_defense_schedule(&project, &slot)
                    .await?;
            }
        }
        Command::Clear { project, all, yes } => {
            if all {
                ensure!(
                    yes,
                    "clearing every schedule and committee must be confirmed with --yes"
                );
                schedule::clear_all(&mut roster);
                if !opt.dry_run {
                    loader.clear_all_schedules_and_committees().await?;
                }
                println!("All schedules and committees cleared");
            } else if let Some(project) = project {
                let p = schedule::clear_defense(&mut roster, &project)?;
                println!("{p}: defense cleared");
                if !opt.dry_run {
                    loader
                        .update_project_defense_schedule(&project, &DefenseSlot::default())
                        .await?;
                }
            }
        }
        Command::Grade { project: Some(project) } => {
            let boundaries = GradeBoundaries::from(&config.scoring);
            let p = roster.require_project(&project)?;
            ensure!(
                p.is_scoreable(),
                "{p} cannot be graded before its defense is dated and its committee complete"
            );
            let grade = grading::grade_project(p, &boundaries);
            println!(
                "{p}: {}",
                grade.clone().unwrap_or_else(|| grading::INCOMPLETE.to_owned())
            );
            if !opt.dry_run {
                loader
                    .update_project_grade(&project, grade.as_deref())
                    .await?;
            }
        }
        Command::Grade { project: None } => {
            let boundaries = GradeBoundaries::from(&config.scoring);
            let grades = grading::grade_all(&roster, &boundaries);
            for (id, grade) in &grades {
                if let Some(p) = roster.projects.iter_mut().find(|p| &p.id == id) {
                    p.final_grade.clone_from(grade);
                }
            }
            if !opt.dry_run {
                loader.update_project_grades(&grades).await?;
            }
            display_grades(&roster, &grades, &boundaries);
            println!("{} projects graded", grades.iter().filter(|(_, g)| g.is_some()).count());
        }
        Command::Report => {
            display_committees(&roster);
            display_schedule(&roster);
            display_load(&roster);
            display_incomplete(&roster);
            checks::check_consistency(&roster);
        }
        Command::Export { output } => {
            let file = std::fs::File::create(&output)
                .wrap_err_with(|| format!("cannot create {}", output.display()))?;
            export::write_schedule(&roster, file).wrap_err("cannot write schedule")?;
            println!("Schedule written to {}", output.display());
        }
    }
    Ok(())
}
