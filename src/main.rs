//! Valhalla - Main entry point
//!
//! Each subcommand is one dashboard view. Filter state travels in a query
//! string that every listing prints back, so a view can be reproduced by
//! passing that string to `--query`.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use valhalla::aggregate::Aggregator;
use valhalla::archive::{self, ArchiveStore, ArchivedVideos, JsonFileStore};
use valhalla::attribution::{attach_titles, attribute, extract_video_id};
use valhalla::calendar::{CalendarDate, YearMonth};
use valhalla::display::{
    display_leads, display_sales, display_summary, display_video_stats, print_section,
    print_section_simple, render_month, sort_leads, sort_sales,
};
use valhalla::filter::filter;
use valhalla::picker::RangePicker;
use valhalla::query::{self, merge_range, FilterQuery, QueryMap, END_KEY, SORT_KEY, START_KEY};
use valhalla::records::{Lead, Sale, Video};
use valhalla::sheet::{fetch_or_empty, JsonExportSource};
use valhalla::utm::UtmLink;
use valhalla::{Config, Preset};

#[derive(Parser)]
#[command(name = "valhalla")]
#[command(author, version, about = "Sales, lead-flow and YouTube attribution dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true, env = "VALHALLA_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Filter flags shared by the listing views.
#[derive(Args, Debug, Clone, Default)]
struct FilterArgs {
    /// Query string with the view's filter state, e.g. "start=2024-01-01&platform=ig"
    #[arg(short, long, default_value = "")]
    query: String,

    /// Date preset (today, yesterday, last-7-days, last-N-days, all-time)
    #[arg(long, conflicts_with_all = ["start", "end"])]
    preset: Option<Preset>,

    /// Inclusive start date (YYYY-MM-DD)
    #[arg(long)]
    start: Option<CalendarDate>,

    /// Inclusive end date (YYYY-MM-DD)
    #[arg(long)]
    end: Option<CalendarDate>,

    /// Only rows with this platform
    #[arg(long)]
    platform: Option<String>,

    /// Only rows with this closer
    #[arg(long)]
    closer: Option<String>,

    /// Only rows with this setter
    #[arg(long)]
    setter: Option<String>,

    /// Sort order (newest, oldest, cash, name)
    #[arg(long)]
    sort: Option<String>,

    /// Number of rows to show
    #[arg(short, long)]
    limit: Option<usize>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sales calls with cash totals
    Sales(FilterArgs),

    /// Lead-flow submissions
    Leads(FilterArgs),

    /// Leads, calls and cash attributed to YouTube videos
    Youtube {
        #[command(flatten)]
        filter: FilterArgs,

        /// Include archived videos
        #[arg(long)]
        show_archived: bool,
    },

    /// Archive or unarchive a video in the attribution report
    Archive {
        /// Video id or URL to toggle
        video: Option<String>,

        /// List archived videos
        #[arg(long)]
        list: bool,
    },

    /// Generate a UTM-tagged landing link for a video
    Utm {
        /// Video id or URL
        video: String,

        /// Campaign tag (default from config)
        #[arg(long)]
        campaign: Option<String>,
    },

    /// Drive the date range picker and print the resulting query
    Calendar {
        /// Query whose range the picker opens on
        #[arg(short, long, default_value = "")]
        query: String,

        /// Month to show (YYYY-MM)
        #[arg(long)]
        month: Option<YearMonth>,

        /// Days clicked, in order (repeatable)
        #[arg(long = "click")]
        clicks: Vec<CalendarDate>,

        /// Apply a preset instead of the clicked selection
        #[arg(long)]
        preset: Option<Preset>,

        /// Override today's date
        #[arg(long)]
        today: Option<CalendarDate>,
    },

    /// List date presets and what they resolve to
    Presets {
        /// Override today's date
        #[arg(long)]
        today: Option<CalendarDate>,
    },

    /// Show or edit configuration
    Config {
        /// Print current configuration
        #[arg(long)]
        show: bool,

        /// Create default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = if let Some(ref path) = cli.config {
        Config::load_from(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?
    } else {
        Config::load().context("loading configuration")?
    };

    // Initialize logging
    let env_filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.general.log_level.to_lowercase()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    config.validate()?;

    let today = CalendarDate::from(Local::now().date_naive());

    match cli.command {
        Some(Commands::Sales(args)) => run_sales(&config, &args, today).await,
        Some(Commands::Leads(args)) => run_leads(&config, &args, today).await,
        Some(Commands::Youtube {
            filter,
            show_archived,
        }) => run_youtube(&config, &filter, show_archived, today).await,

        Some(Commands::Archive { video, list }) => run_archive(&config, video.as_deref(), list),

        Some(Commands::Utm { video, campaign }) => {
            let id = extract_video_id(&video).unwrap_or_else(|| video.trim().to_string());
            let mut link = UtmLink::for_video(&config.utm, &id)?;
            if let Some(campaign) = campaign {
                link = link.with_campaign(campaign);
            }
            println!("{}", link.build());
            Ok(())
        }

        Some(Commands::Calendar {
            query,
            month,
            clicks,
            preset,
            today: today_override,
        }) => {
            run_calendar(
                &QueryMap::parse(&query),
                month,
                &clicks,
                preset.as_ref(),
                today_override.unwrap_or(today),
            );
            Ok(())
        }

        Some(Commands::Presets {
            today: today_override,
        }) => {
            let today = today_override.unwrap_or(today);
            print_section_simple(&format!("PRESETS (today = {today})"));
            for preset in Preset::builtin() {
                println!(
                    "  {:<15} {:<14} {}",
                    preset.label,
                    preset.rule.slug(),
                    preset.resolve(today)
                );
            }
            Ok(())
        }

        Some(Commands::Config { show, init }) => {
            if init {
                let default_config = Config::default();
                default_config.save()?;
                println!(
                    "Created default configuration at {}",
                    Config::config_path()?.display()
                );
            } else if show {
                let contents = toml::to_string_pretty(&config)?;
                println!("{contents}");
            } else {
                println!("Configuration path: {}", Config::config_path()?.display());
            }
            Ok(())
        }

        None => {
            // Default: sales view
            run_sales(&config, &FilterArgs::default(), today).await
        }
    }
}

/// Combine `--query` with the individual flags into one query.
///
/// Flags win over keys already in the query. With no range anywhere the
/// configured default preset applies.
fn build_query(args: &FilterArgs, config: &Config, today: CalendarDate) -> Result<QueryMap> {
    let mut query = QueryMap::parse(&args.query);

    if let Some(ref preset) = args.preset {
        query = merge_range(&query, &preset.resolve(today));
    } else if args.start.is_some() || args.end.is_some() {
        if let Some(start) = args.start {
            query.insert(START_KEY, start.to_key());
        }
        if let Some(end) = args.end {
            query.insert(END_KEY, end.to_key());
        }
    } else if query.get(START_KEY).is_none() && query.get(END_KEY).is_none() {
        let preset = config.default_preset()?;
        query = merge_range(&query, &preset.resolve(today));
    }

    for (key, value) in [
        ("platform", &args.platform),
        ("closer", &args.closer),
        ("setter", &args.setter),
        (SORT_KEY, &args.sort),
    ] {
        match value.as_deref().map(str::trim) {
            Some("") => {
                query.remove(key);
            }
            Some(v) => query.insert(key, v),
            None => {}
        }
    }

    Ok(query)
}

fn print_query(query: &QueryMap) {
    println!("\nQuery: ?{query}");
}

async fn run_sales(config: &Config, args: &FilterArgs, today: CalendarDate) -> Result<()> {
    let query = build_query(args, config, today)?;
    let view = FilterQuery::from_query(&query);

    let source = JsonExportSource::new(config.export_dir()?);
    let sheet = fetch_or_empty(&source, &config.sheets.sales).await;
    let sales = Sale::from_sheet(&sheet, &config.columns.sales)?;

    let mut kept = filter(&sales, &view.range, &view.extras);
    sort_sales(&mut kept, view.sort);
    let summary = Aggregator::summarize(&kept, &["cash", "revenue"], "closer");

    if args.json {
        let out = serde_json::json!({
            "query": query.to_query_string(),
            "range": view.range,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_section(&format!("SALES CALLS - {}", view.range.to_string().to_uppercase()));
    if kept.is_empty() {
        println!("No sales calls found for this period.");
    } else {
        print_section_simple("SUMMARY");
        display_summary(&summary, "closer");
        print_section_simple("CALLS");
        display_sales(&kept, args.limit.unwrap_or(config.dashboard.row_limit));
    }
    print_query(&query);
    Ok(())
}

async fn run_leads(config: &Config, args: &FilterArgs, today: CalendarDate) -> Result<()> {
    let query = build_query(args, config, today)?;
    let view = FilterQuery::from_query(&query);

    let source = JsonExportSource::new(config.export_dir()?);
    let sheet = fetch_or_empty(&source, &config.sheets.leads).await;
    let leads = Lead::from_sheet(&sheet, &config.columns.leads)?;

    let mut kept = filter(&leads, &view.range, &view.extras);
    sort_leads(&mut kept, view.sort);
    let summary = Aggregator::summarize(&kept, &[], "platform");

    if args.json {
        let out = serde_json::json!({
            "query": query.to_query_string(),
            "range": view.range,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_section(&format!("LEAD FLOW - {}", view.range.to_string().to_uppercase()));
    if kept.is_empty() {
        println!("No leads found for this period.");
    } else {
        print_section_simple("SUMMARY");
        display_summary(&summary, "platform");
        print_section_simple("LEADS");
        display_leads(&kept, args.limit.unwrap_or(config.dashboard.row_limit));
    }
    print_query(&query);
    Ok(())
}

async fn run_youtube(
    config: &Config,
    args: &FilterArgs,
    show_archived: bool,
    today: CalendarDate,
) -> Result<()> {
    let query = build_query(args, config, today)?;
    let view = FilterQuery::from_query(&query);

    let source = JsonExportSource::new(config.export_dir()?);
    let (lead_sheet, sale_sheet, video_sheet) = futures::join!(
        fetch_or_empty(&source, &config.sheets.leads),
        fetch_or_empty(&source, &config.sheets.sales),
        fetch_or_empty(&source, &config.sheets.videos),
    );
    let leads = Lead::from_sheet(&lead_sheet, &config.columns.leads)?;
    let sales = Sale::from_sheet(&sale_sheet, &config.columns.sales)?;
    let videos = Video::from_sheet(&video_sheet, &config.columns.videos)?;

    let archived = if show_archived {
        ArchivedVideos::default()
    } else {
        JsonFileStore::new(config.archive_path()?).load()?
    };

    // Sales-only filters (closer, setter) must not drop leads.
    let lead_extras: query::ExtraFilters = view
        .extras
        .iter()
        .filter(|(k, _)| k.as_str() == "platform")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let kept_leads = filter(&leads, &view.range, &lead_extras);
    let kept_sales = filter(&sales, &view.range, &view.extras);

    let mut stats = attribute(kept_leads.iter().copied(), kept_sales.iter().copied(), &archived);
    attach_titles(&mut stats, &videos);

    if args.json {
        let out = serde_json::json!({
            "query": query.to_query_string(),
            "range": view.range,
            "videos": stats,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_section(&format!("YOUTUBE ATTRIBUTION - {}", view.range.to_string().to_uppercase()));
    if !archived.is_empty() {
        println!("  ({} archived videos hidden)", archived.len());
    }
    display_video_stats(&stats, args.limit.unwrap_or(config.dashboard.row_limit));
    print_query(&query);
    Ok(())
}

fn run_archive(config: &Config, video: Option<&str>, list: bool) -> Result<()> {
    let store = JsonFileStore::new(config.archive_path()?);

    if let Some(video) = video {
        let id = extract_video_id(video).unwrap_or_else(|| video.trim().to_string());
        let (_, archived) = archive::toggle_in(&store, &id)?;
        if archived {
            println!("Archived {id}");
        } else {
            println!("Unarchived {id}");
        }
    }

    if list || video.is_none() {
        let archived = store.load()?;
        print_section_simple(&format!("ARCHIVED VIDEOS ({})", archived.len()));
        for id in archived.iter() {
            println!("  {id}");
        }
    }
    Ok(())
}

fn run_calendar(
    query: &QueryMap,
    month: Option<YearMonth>,
    clicks: &[CalendarDate],
    preset: Option<&Preset>,
    today: CalendarDate,
) {
    let (current, _) = query::decode(query);

    let mut picker = RangePicker::new(today);
    picker.open(&current);
    if let Some(month) = month.or_else(|| clicks.first().copied().map(YearMonth::of)) {
        picker.show_month(month);
    }
    for &day in clicks {
        picker.click(day);
    }

    println!("{}", render_month(&picker));

    let applied = match preset {
        Some(preset) => Some(picker.apply_preset(preset)),
        None => picker.apply(),
    };

    match applied {
        Some(range) => {
            println!("Selected: {range}");
            print_query(&merge_range(query, &range));
        }
        None => {
            println!("No range selected; query unchanged.");
            print_query(query);
        }
    }
}
