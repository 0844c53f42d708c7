use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::debug;

use crate::client::FixtureFetcher;
use crate::encoder::{OutputFormat, encode};
use crate::models::ActivityKind;
use crate::tools::{
    CommentQuery, PageQuery, Paging, RecentActivityParams, SearchParams, TaskQuery, ToolError,
    ToolResult, Tools,
};
use crate::utils::{Config, read_to_string_bounded};

#[derive(Parser)]
#[command(name = "productive-digest")]
#[command(version = "0.1.0")]
#[command(about = "Compact, LLM-ready digests of Productive.io data", long_about = None)]
pub struct Cli {
    /// Directory of captured API payloads (overrides PRODUCTIVE_FIXTURES)
    #[arg(long, global = true)]
    pub fixtures: Option<PathBuf>,

    /// Output format: toon or json (overrides OUTPUT_FORMAT)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PagingArgs {
    /// Page number, starting at 1
    #[arg(long)]
    pub page: Option<u32>,

    /// Results per page (max 200)
    #[arg(long)]
    pub page_size: Option<u32>,
}

impl From<PagingArgs> for Paging {
    fn from(args: PagingArgs) -> Self {
        Paging { number: args.page, size: args.page_size }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List projects, most recently active first
    Projects,

    /// List tasks
    Tasks {
        #[arg(long)]
        project_id: Option<String>,
        /// Only tasks assigned to this person
        #[arg(long)]
        assignee_id: Option<String>,
        #[arg(long)]
        sort: Option<String>,
        /// Extra service filter, e.g. `--filter status=1`
        #[arg(long = "filter", value_parser = parse_key_value)]
        filters: Vec<(String, String)>,
        #[command(flatten)]
        paging: PagingArgs,
    },

    /// Show one task
    Task { task_id: String },

    /// List the tasks of a project
    ProjectTasks {
        project_id: String,
        /// 1 for open, 2 for closed
        #[arg(long)]
        status: Option<u32>,
    },

    /// Show a task by its number within a project
    ProjectTask { project_id: String, task_number: String },

    /// List comments
    Comments {
        #[arg(long)]
        project_id: Option<String>,
        #[arg(long)]
        task_id: Option<String>,
        #[command(flatten)]
        paging: PagingArgs,
    },

    /// Show one comment
    Comment { comment_id: String },

    /// List todos
    Todos {
        #[arg(long)]
        task_id: Option<String>,
        #[command(flatten)]
        paging: PagingArgs,
    },

    /// Show one todo
    Todo { todo_id: String },

    /// List pages (documents)
    Pages {
        #[arg(long)]
        project_id: Option<String>,
        #[arg(long)]
        creator_id: Option<String>,
        #[command(flatten)]
        paging: PagingArgs,
    },

    /// Show one page with its body
    Page { page_id: String },

    /// List attachments
    Attachments {
        #[command(flatten)]
        paging: PagingArgs,
    },

    /// Show one attachment
    Attachment { attachment_id: String },

    /// List people
    People {
        #[command(flatten)]
        paging: PagingArgs,
    },

    /// Show one person
    Person { person_id: String },

    /// Status, assignment and milestone timeline of a task
    TaskHistory {
        task_id: String,
        /// Look-back window in hours (default 720)
        #[arg(long)]
        hours: Option<u32>,
    },

    /// Activity feed over a recent window
    RecentActivity {
        #[arg(long, default_value_t = 24)]
        hours: u32,
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        project_id: Option<String>,
        /// comment, changeset or email (or 1, 2, 3)
        #[arg(long)]
        activity_type: Option<ActivityKind>,
        /// e.g. Task, Page, Comment
        #[arg(long)]
        item_type: Option<String>,
        /// e.g. create, edit, delete
        #[arg(long)]
        event_type: Option<String>,
        #[arg(long)]
        task_id: Option<String>,
        /// Entries to return (default 100, max 200)
        #[arg(long)]
        max_results: Option<usize>,
    },

    /// Quick search across projects, tasks, pages and actions
    Search {
        query: String,
        /// Comma-separated record types
        #[arg(long = "types", value_delimiter = ',')]
        search_types: Vec<String>,
        /// Search titles only
        #[arg(long)]
        shallow: bool,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 50)]
        per_page: u32,
    },

    /// Re-encode a JSON file in the selected output format
    Encode { path: PathBuf },
}

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use --help for usage information");
        return Ok(ExitCode::SUCCESS);
    };

    // Encoding needs no organization settings
    if let Commands::Encode { path } = &command {
        let format = match cli.format {
            Some(format) => format,
            None => output_format_from_env()?,
        };
        return encode_file(path, format);
    }

    let mut config = Config::from_env()?;
    if let Some(fixtures) = cli.fixtures {
        config.fixtures = Some(fixtures);
    }
    if let Some(format) = cli.format {
        config.output_format = format;
    }

    let root = config
        .fixtures
        .clone()
        .context("No payload source configured: pass --fixtures or set PRODUCTIVE_FIXTURES")?;
    if !root.is_dir() {
        bail!("Fixture directory does not exist: {}", root.display());
    }
    debug!(root = %root.display(), format = %config.output_format, "Serving captured payloads");

    let format = config.output_format;
    let tools = Tools::new(FixtureFetcher::new(root), config);
    render(dispatch(&tools, command), format)
}

fn dispatch(tools: &Tools<FixtureFetcher>, command: Commands) -> ToolResult {
    match command {
        Commands::Projects => tools.get_projects(),
        Commands::Tasks { project_id, assignee_id, sort, filters, paging } => {
            tools.get_tasks(&TaskQuery {
                project_id,
                assignee_id,
                sort,
                extra_filters: filters.into_iter().collect::<BTreeMap<_, _>>(),
                paging: paging.into(),
            })
        }
        Commands::Task { task_id } => tools.get_task(&task_id),
        Commands::ProjectTasks { project_id, status } => tools.get_project_tasks(&project_id, status),
        Commands::ProjectTask { project_id, task_number } => {
            tools.get_project_task(&project_id, &task_number)
        }
        Commands::Comments { project_id, task_id, paging } => {
            tools.get_comments(&CommentQuery { project_id, task_id, paging: paging.into() })
        }
        Commands::Comment { comment_id } => tools.get_comment(&comment_id),
        Commands::Todos { task_id, paging } => tools.get_todos(task_id.as_deref(), paging.into()),
        Commands::Todo { todo_id } => tools.get_todo(&todo_id),
        Commands::Pages { project_id, creator_id, paging } => {
            tools.get_pages(&PageQuery { project_id, creator_id, paging: paging.into() })
        }
        Commands::Page { page_id } => tools.get_page(&page_id),
        Commands::Attachments { paging } => tools.get_attachments(paging.into()),
        Commands::Attachment { attachment_id } => tools.get_attachment(&attachment_id),
        Commands::People { paging } => tools.get_people(paging.into()),
        Commands::Person { person_id } => tools.get_person(&person_id),
        Commands::TaskHistory { task_id, hours } => tools.get_task_history(&task_id, hours),
        Commands::RecentActivity {
            hours,
            user_id,
            project_id,
            activity_type,
            item_type,
            event_type,
            task_id,
            max_results,
        } => tools.get_recent_activity(&RecentActivityParams {
            hours,
            user_id,
            project_id,
            activity_type,
            item_type,
            event_type,
            task_id,
            max_results,
        }),
        Commands::Search { query, search_types, shallow, page, per_page } => {
            let mut params = SearchParams::new(&query);
            if !search_types.is_empty() {
                params.search_types = search_types;
            }
            params.deep_search = !shallow;
            params.page = page;
            params.per_page = per_page;
            tools.quick_search(&params)
        }
        // Handled in run() before any configuration is read
        Commands::Encode { .. } => {
            Err(ToolError::InvalidArgument("encode does not read from the API".to_string()))
        }
    }
}

/// Print the encoded result on stdout; a tool error is printed as an error result
/// and turns into a failing exit code
fn render(result: ToolResult, format: OutputFormat) -> Result<ExitCode> {
    match result {
        Ok(envelope) => {
            println!("{}", encode(&envelope, format).context("Failed to encode result")?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            println!("{}", encode(&err.to_result(), format).context("Failed to encode error")?);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn encode_file(path: &Path, format: OutputFormat) -> Result<ExitCode> {
    let text = read_to_string_bounded(path)?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse JSON: {}", path.display()))?;
    println!("{}", encode(&value, format).context("Failed to encode value")?);
    Ok(ExitCode::SUCCESS)
}

fn output_format_from_env() -> Result<OutputFormat> {
    match std::env::var("OUTPUT_FORMAT") {
        Ok(value) if !value.trim().is_empty() => {
            value.parse().map_err(anyhow::Error::msg).context("Invalid OUTPUT_FORMAT")
        }
        _ => Ok(OutputFormat::default()),
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.trim().is_empty() {
        return Err(format!("empty filter name in '{}'", s));
    }
    Ok((key.trim().to_string(), value.trim().to_string()))
}
