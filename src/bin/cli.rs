//! Binary entry point for the tastegraph CLI.
#![forbid(unsafe_code)]

#[path = "cli/config.rs"]
mod config;
#[path = "cli/ui.rs"]
mod ui;

use std::error::Error;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tastegraph::{
    admin::{stats, verify, StatsReport, VerifyOptions, VerifyReport},
    cli::import_export::{
        load_relations, write_recommendations, write_recommendations_to, write_relations,
        ExportOptions, ImportConfig, ImportSummary, RelationSource, DISLIKES_FILE, FRIENDS_FILE,
        LIKES_FILE,
    },
    data_generator::{DataGenerator, GeneratorOptions},
    pipeline::{explain, explain_person, Explanation},
    sqlite_adapter::{cross_check, CrossCheckReport},
    ArtistId, Pipeline, PipelineOptions, PipelineStats, PersonId, Recommendation, Relations,
};
use tracing_subscriber::EnvFilter;

use config::{parse_delimiter, CliConfig, Profile, ProfileUpdate};
use ui::{format_duration, Theme, Ui};

#[derive(Parser, Debug)]
#[command(
    name = "tastegraph",
    version,
    about = "Friends-of-friends music recommendations from likes, dislikes and friendships",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for structured responses"
    )]
    format: OutputFormat,

    #[arg(
        long,
        global = true,
        env = "TASTEGRAPH_CONFIG",
        value_name = "FILE",
        help = "CLI config file (defaults to the user config directory)"
    )]
    config: Option<PathBuf>,

    #[arg(long, global = true, value_name = "NAME", help = "Dataset profile to use")]
    profile: Option<String>,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = ThemeArg::Auto,
        help = "Color theme for text output"
    )]
    theme: ThemeArg,

    #[arg(long, global = true, help = "Suppress decorations and progress output")]
    quiet: bool,

    #[arg(
        short,
        long,
        global = true,
        action = ArgAction::Count,
        help = "Increase log verbosity (-v info, -vv debug)"
    )]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct InputArgs {
    #[arg(long, value_name = "DIR", help = "Directory holding likes.csv, dislikes.csv and friends.csv")]
    dir: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "CSV file of person,artist likes")]
    likes: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "CSV file of person,artist dislikes")]
    dislikes: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "CSV file of person1,person2 friendships")]
    friends: Option<PathBuf>,

    #[arg(long, help = "Input files have no header line")]
    no_headers: bool,

    #[arg(long, value_name = "CHAR", help = "Input field delimiter (default ',')")]
    delimiter: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Compute recommendations and write them as CSV")]
    Recommend(RecommendCmd),

    #[command(about = "Explain why artists are or are not recommended to a person")]
    Explain(ExplainCmd),

    #[command(about = "Show relation and pipeline statistics")]
    Stats(StatsCmd),

    #[command(about = "Check the input relations for suspicious data")]
    Verify(VerifyCmd),

    #[command(about = "Cross-check the pipeline against the SQLite reference query")]
    Check(CheckCmd),

    #[command(about = "Generate a seeded synthetic dataset")]
    Generate(GenerateCmd),

    #[command(about = "Manage saved dataset profiles")]
    Profile {
        #[command(subcommand)]
        action: ProfileCmd,
    },

    #[command(about = "Print shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug)]
struct RecommendCmd {
    #[command(flatten)]
    input: InputArgs,

    #[arg(long, value_name = "FILE", help = "Write recommendations here instead of stdout")]
    out: Option<PathBuf>,

    #[arg(long, help = "Propagation partitions (0 = one per thread)")]
    partitions: Option<usize>,

    #[arg(long, help = "Omit the person,artist header line")]
    no_header: bool,
}

#[derive(Args, Debug)]
struct ExplainCmd {
    #[command(flatten)]
    input: InputArgs,

    #[arg(long, allow_negative_numbers = true, help = "Person to explain")]
    person: i64,

    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Single artist (default: every artist a friend has an opinion on)"
    )]
    artist: Option<i64>,
}

#[derive(Args, Debug)]
struct StatsCmd {
    #[command(flatten)]
    input: InputArgs,

    #[arg(long, help = "Propagation partitions (0 = one per thread)")]
    partitions: Option<usize>,
}

#[derive(Args, Debug)]
struct VerifyCmd {
    #[command(flatten)]
    input: InputArgs,

    #[arg(long, default_value_t = 32, help = "Maximum findings to report")]
    max_findings: usize,

    #[arg(long, help = "Treat warnings as failures")]
    strict: bool,
}

#[derive(Args, Debug)]
struct CheckCmd {
    #[command(flatten)]
    input: InputArgs,

    #[arg(long, help = "Propagation partitions (0 = one per thread)")]
    partitions: Option<usize>,
}

#[derive(Args, Debug)]
struct GenerateCmd {
    #[arg(long, value_name = "DIR", help = "Directory to write the three CSV files into")]
    out_dir: PathBuf,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value_t = 1_000)]
    people: usize,

    #[arg(long, default_value_t = 200)]
    artists: usize,

    #[arg(long, default_value_t = 8)]
    avg_friends: usize,

    #[arg(long, default_value_t = 12)]
    avg_likes: usize,

    #[arg(long, default_value_t = 4)]
    avg_dislikes: usize,

    #[arg(long, default_value_t = 0.0, help = "Share of persons holding a like+dislike conflict")]
    conflict_rate: f64,
}

#[derive(Subcommand, Debug)]
enum ProfileCmd {
    #[command(about = "List saved profiles")]
    List,

    #[command(about = "Show one profile")]
    Show { name: String },

    #[command(about = "Create or update a profile")]
    Save(ProfileSaveCmd),

    #[command(about = "Delete a profile")]
    Delete { name: String },

    #[command(about = "Set or clear the default profile")]
    Default {
        name: Option<String>,

        #[arg(long, conflicts_with = "name")]
        clear: bool,
    },
}

#[derive(Args, Debug)]
struct ProfileSaveCmd {
    name: String,

    #[arg(long)]
    dir: Option<PathBuf>,

    #[arg(long)]
    likes: Option<PathBuf>,

    #[arg(long)]
    dislikes: Option<PathBuf>,

    #[arg(long)]
    friends: Option<PathBuf>,

    #[arg(long, help = "Input files have no header line")]
    no_headers: bool,

    #[arg(long, value_name = "CHAR")]
    delimiter: Option<char>,

    #[arg(long)]
    partitions: Option<usize>,

    #[arg(long, help = "Make this the default profile")]
    default: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ThemeArg {
    Auto,
    Light,
    Dark,
    Plain,
}

impl From<ThemeArg> for Theme {
    fn from(theme: ThemeArg) -> Self {
        match theme {
            ThemeArg::Auto => Theme::Auto,
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::Plain => Theme::Plain,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    let ui = Ui::new(cli.theme.into(), cli.quiet);

    if let Command::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "tastegraph", &mut io::stdout());
        return Ok(());
    }

    let mut config = CliConfig::load(cli.config.clone())?;
    if let Command::Profile { action } = cli.command {
        return run_profile(action, &mut config, &cli.format, &ui);
    }
    let profile = config.select(cli.profile.as_deref())?;

    match cli.command {
        Command::Recommend(cmd) => {
            let (relations, _) = load(&cmd.input, profile)?;
            let opts = pipeline_options(cmd.partitions, profile);
            let task = ui.task("Computing recommendations");
            let output = Pipeline::new(opts).run(&relations);
            let elapsed = task.finish();
            let export = ExportOptions {
                header: !cmd.no_header,
                ..ExportOptions::default()
            };

            match (&cmd.out, cli.format) {
                (Some(path), format) => {
                    let rows = write_recommendations(path, &output.recommendations, &export)?;
                    let summary = RecommendSummary {
                        path: path.display().to_string(),
                        rows,
                        stats: output.stats,
                    };
                    emit(&format, &summary, |_| {
                        ui.success(&format!(
                            "Wrote {} recommendations to {} in {}",
                            summary.rows,
                            summary.path,
                            format_duration(elapsed)
                        ));
                    })?;
                }
                (None, OutputFormat::Json) => {
                    let listing = RecommendListing {
                        recommendations: &output.recommendations,
                        stats: &output.stats,
                    };
                    emit(&OutputFormat::Json, &listing, |_| {})?;
                }
                (None, OutputFormat::Text) => {
                    let stdout = io::stdout();
                    write_recommendations_to(stdout.lock(), &output.recommendations, &export)?;
                }
            }
        }
        Command::Explain(cmd) => {
            let (relations, _) = load(&cmd.input, profile)?;
            let person = PersonId(cmd.person);
            let explanations = match cmd.artist {
                Some(artist) => vec![explain(&relations, person, ArtistId(artist))],
                None => explain_person(&relations, person),
            };
            emit(&cli.format, &explanations, |_| {
                print_explanations_text(&ui, person, &explanations)
            })?;
        }
        Command::Stats(cmd) => {
            let (relations, _) = load(&cmd.input, profile)?;
            let report = stats(&relations, &pipeline_options(cmd.partitions, profile));
            emit(&cli.format, &report, |_| print_stats_text(&ui, &report))?;
        }
        Command::Verify(cmd) => {
            let (relations, _) = load(&cmd.input, profile)?;
            let opts = VerifyOptions {
                max_findings: cmd.max_findings,
                strict: cmd.strict,
            };
            let report = verify(&relations, &opts);
            emit(&cli.format, &report, |_| print_verify_text(&ui, &report))?;
            if !report.success {
                std::process::exit(2);
            }
        }
        Command::Check(cmd) => {
            let (relations, _) = load(&cmd.input, profile)?;
            let task = ui.task("Cross-checking against SQLite");
            let report = cross_check(&relations, &pipeline_options(cmd.partitions, profile))?;
            task.finish();
            emit(&cli.format, &report, |_| print_check_text(&ui, &report))?;
            if !report.matches {
                std::process::exit(2);
            }
        }
        Command::Generate(cmd) => {
            let opts = GeneratorOptions {
                people: cmd.people,
                artists: cmd.artists,
                avg_friends: cmd.avg_friends,
                avg_likes: cmd.avg_likes,
                avg_dislikes: cmd.avg_dislikes,
                conflict_rate: cmd.conflict_rate,
            };
            let task = ui.task("Generating dataset");
            let relations = DataGenerator::new(cmd.seed).generate(&opts)?;
            write_relations(&cmd.out_dir, &relations)?;
            task.finish();
            let summary = GenerateSummary {
                dir: cmd.out_dir.display().to_string(),
                seed: cmd.seed,
                likes: relations.likes.len() as u64,
                dislikes: relations.dislikes.len() as u64,
                friends: relations.friends.len() as u64,
            };
            emit(&cli.format, &summary, |_| {
                ui.section(
                    "Generated",
                    [
                        ("dir", summary.dir.clone()),
                        ("seed", summary.seed.to_string()),
                        ("likes", summary.likes.to_string()),
                        ("dislikes", summary.dislikes.to_string()),
                        ("friends", summary.friends.to_string()),
                    ],
                );
            })?;
        }
        Command::Profile { .. } | Command::Completions { .. } => {}
    }

    Ok(())
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "tastegraph=error",
        (false, 0) => "tastegraph=warn",
        (false, 1) => "tastegraph=info",
        (false, _) => "tastegraph=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .try_init();
}

fn load(
    input: &InputArgs,
    profile: Option<&Profile>,
) -> Result<(Relations, ImportSummary), Box<dyn Error>> {
    let cfg = build_import_config(input, profile)?;
    Ok(load_relations(&cfg)?)
}

fn build_import_config(
    input: &InputArgs,
    profile: Option<&Profile>,
) -> Result<ImportConfig, Box<dyn Error>> {
    // explicit file, then --dir, then the profile's file, then the profile's dir
    let saved_dir = profile.and_then(|p| p.dir.as_deref());
    let locate = |flag: &Option<PathBuf>,
                  saved: Option<&PathBuf>,
                  file: &str,
                  relation: &str|
     -> Result<PathBuf, Box<dyn Error>> {
        flag.clone()
            .or_else(|| input.dir.as_deref().map(|d: &Path| d.join(file)))
            .or_else(|| saved.cloned())
            .or_else(|| saved_dir.map(|d| d.join(file)))
            .ok_or_else(|| {
                Box::<dyn Error>::from(format!(
                    "no {relation} file: pass --{relation}, --dir or --profile"
                ))
            })
    };

    let likes = locate(
        &input.likes,
        profile.and_then(|p| p.likes.as_ref()),
        LIKES_FILE,
        "likes",
    )?;
    let dislikes = locate(
        &input.dislikes,
        profile.and_then(|p| p.dislikes.as_ref()),
        DISLIKES_FILE,
        "dislikes",
    )?;
    let friends = locate(
        &input.friends,
        profile.and_then(|p| p.friends.as_ref()),
        FRIENDS_FILE,
        "friends",
    )?;

    let has_headers = !input.no_headers && profile.and_then(|p| p.has_headers).unwrap_or(true);
    let delimiter = match input.delimiter.as_deref() {
        Some(value) => parse_delimiter(value).ok_or_else(|| {
            Box::<dyn Error>::from(format!(
                "delimiter '{value}' must be a single ASCII character"
            ))
        })?,
        None => profile.and_then(Profile::delimiter).unwrap_or(b','),
    };

    let mut cfg = ImportConfig {
        likes: RelationSource::likes(likes),
        dislikes: RelationSource::dislikes(dislikes),
        friends: RelationSource::friends(friends),
    };
    if let Some((left, right)) = profile.and_then(Profile::preference_columns) {
        cfg.likes = cfg.likes.with_columns(left, right);
        cfg.dislikes = cfg.dislikes.with_columns(left, right);
    }
    if let Some((left, right)) = profile.and_then(Profile::friend_columns) {
        cfg.friends = cfg.friends.with_columns(left, right);
    }
    for src in [&mut cfg.likes, &mut cfg.dislikes, &mut cfg.friends] {
        src.has_headers = has_headers;
        src.delimiter = delimiter;
    }
    Ok(cfg)
}

fn pipeline_options(partitions: Option<usize>, profile: Option<&Profile>) -> PipelineOptions {
    let partitions = partitions
        .or_else(|| profile.and_then(|p| p.partitions))
        .unwrap_or(1);
    PipelineOptions::default().partitions(partitions)
}

fn run_profile(
    action: ProfileCmd,
    config: &mut CliConfig,
    format: &OutputFormat,
    ui: &Ui,
) -> Result<(), Box<dyn Error>> {
    match action {
        ProfileCmd::List => {
            let default = config.default_profile_name().map(str::to_string);
            let views: Vec<ProfileView> = config
                .profiles()
                .map(|p| ProfileView::new(p, default.as_deref()))
                .collect();
            emit(format, &views, |_| {
                if views.is_empty() {
                    ui.warn("no profiles saved");
                    return;
                }
                ui.list(
                    "Profiles",
                    views.iter().map(|v| {
                        if v.default {
                            format!("{} (default)", v.name)
                        } else {
                            v.name.clone()
                        }
                    }),
                );
            })?;
        }
        ProfileCmd::Show { name } => {
            let profile = config.profile(&name)?;
            let view = ProfileView::new(profile, config.default_profile_name());
            emit(format, &view, |_| print_profile_text(ui, &view))?;
        }
        ProfileCmd::Save(cmd) => {
            let update = ProfileUpdate {
                dir: cmd.dir,
                likes: cmd.likes,
                dislikes: cmd.dislikes,
                friends: cmd.friends,
                has_headers: cmd.no_headers.then_some(false),
                delimiter: cmd.delimiter,
                partitions: cmd.partitions,
            };
            config.save_profile(&cmd.name, update)?;
            if cmd.default {
                config.set_default(Some(cmd.name.as_str()))?;
            }
            let path = config.write()?;
            ui.success(&format!("Saved profile '{}' to {}", cmd.name, path.display()));
        }
        ProfileCmd::Delete { name } => {
            config.remove_profile(&name)?;
            let path = config.write()?;
            ui.success(&format!("Deleted profile '{name}' from {}", path.display()));
        }
        ProfileCmd::Default { name, clear } => {
            if clear {
                config.set_default(None)?;
                config.write()?;
                ui.success("Cleared default profile");
            } else if let Some(name) = name {
                config.set_default(Some(name.as_str()))?;
                config.write()?;
                ui.success(&format!("Default profile is now '{name}'"));
            } else {
                match config.default_profile_name() {
                    Some(current) => println!("{current}"),
                    None => ui.warn("no default profile"),
                }
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct RecommendSummary {
    path: String,
    rows: u64,
    stats: PipelineStats,
}

#[derive(Serialize)]
struct RecommendListing<'a> {
    recommendations: &'a [Recommendation],
    stats: &'a PipelineStats,
}

#[derive(Serialize)]
struct GenerateSummary {
    dir: String,
    seed: u64,
    likes: u64,
    dislikes: u64,
    friends: u64,
}

#[derive(Serialize)]
struct ProfileView {
    name: String,
    default: bool,
    dir: Option<String>,
    likes: Option<String>,
    dislikes: Option<String>,
    friends: Option<String>,
    has_headers: Option<bool>,
    delimiter: Option<String>,
    partitions: Option<usize>,
}

impl ProfileView {
    fn new(profile: &Profile, default: Option<&str>) -> Self {
        let show = |path: &Option<PathBuf>| path.as_ref().map(|p| p.display().to_string());
        Self {
            name: profile.name.clone(),
            default: default == Some(profile.name.as_str()),
            dir: show(&profile.dir),
            likes: show(&profile.likes),
            dislikes: show(&profile.dislikes),
            friends: show(&profile.friends),
            has_headers: profile.has_headers,
            delimiter: profile.delimiter().map(|d| (d as char).escape_default().to_string()),
            partitions: profile.partitions,
        }
    }
}

fn emit<T, F>(format: &OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: serde::Serialize,
    F: Fn(OutputFormat),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(OutputFormat::Text),
    }
    Ok(())
}

fn print_explanations_text(ui: &Ui, person: PersonId, explanations: &[Explanation]) {
    if explanations.is_empty() {
        ui.warn(&format!("no friend of person {person} holds an opinion on any artist"));
        return;
    }
    for exp in explanations {
        ui.explanation(exp);
    }
}

fn print_stats_text(ui: &Ui, report: &StatsReport) {
    for (title, section) in [
        ("Likes", &report.likes),
        ("Dislikes", &report.dislikes),
        ("Friends", &report.friends),
    ] {
        ui.section(
            title,
            [
                ("rows", section.rows),
                ("distinct", section.distinct),
                ("duplicates", section.duplicates),
            ],
        );
    }
    ui.section(
        "Universe",
        [
            ("persons", report.universe.persons),
            ("artists", report.universe.artists),
            ("with friends", report.universe.persons_with_friends),
            ("with recommendations", report.universe.persons_with_recommendations),
        ],
    );
    let p = &report.pipeline;
    ui.section(
        "Pipeline",
        [
            ("directed edges", p.symmetrize.directed_edges.to_string()),
            ("self loops dropped", p.symmetrize.self_loops_dropped.to_string()),
            ("propagated likes", p.propagated_likes.to_string()),
            ("propagated dislikes", p.propagated_dislikes.to_string()),
            ("should like", p.aggregated_likes.to_string()),
            ("should dislike", p.aggregated_dislikes.to_string()),
            ("suppressed", p.suppressed.to_string()),
            ("recommendations", p.recommendations.to_string()),
            ("partitions", p.partitions.to_string()),
            ("elapsed", format!("{:.2} ms", p.elapsed_ms)),
        ],
    );
}

fn print_verify_text(ui: &Ui, report: &VerifyReport) {
    let c = &report.counts;
    ui.section(
        "Verify",
        [
            ("conflicting pairs", c.conflicting_pairs),
            ("self friendships", c.self_friendships),
            ("duplicate likes", c.duplicate_likes),
            ("duplicate dislikes", c.duplicate_dislikes),
            ("duplicate friendships", c.duplicate_friendships),
            ("silent friendships", c.silent_friendships),
        ],
    );
    ui.findings(&report.findings);
    if report.truncated > 0 {
        ui.warn(&format!("{} more findings not shown", report.truncated));
    }
    if report.success {
        ui.success("input relations look usable");
    } else {
        ui.failure("verification failed");
    }
}

fn print_check_text(ui: &Ui, report: &CrossCheckReport) {
    ui.section(
        "Cross-check",
        [
            ("pipeline", report.pipeline_count),
            ("sqlite", report.sqlite_count),
        ],
    );
    ui.list(
        "Only in pipeline",
        report.only_in_pipeline.iter().map(pair),
    );
    ui.list("Only in sqlite", report.only_in_sqlite.iter().map(pair));
    if report.matches {
        ui.success("pipeline and SQLite agree");
    } else {
        ui.failure("pipeline and SQLite disagree");
    }
}

fn print_profile_text(ui: &Ui, view: &ProfileView) {
    let dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    ui.section(
        &view.name,
        [
            ("default", view.default.to_string()),
            ("dir", dash(&view.dir)),
            ("likes", dash(&view.likes)),
            ("dislikes", dash(&view.dislikes)),
            ("friends", dash(&view.friends)),
            (
                "headers",
                view.has_headers.map_or("-".to_string(), |h| h.to_string()),
            ),
            ("delimiter", dash(&view.delimiter)),
            (
                "partitions",
                view.partitions.map_or("-".to_string(), |p| p.to_string()),
            ),
        ],
    );
}

fn pair(rec: &Recommendation) -> String {
    format!("({}, {})", rec.person, rec.artist)
}
