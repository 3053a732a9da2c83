use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

use helptool::api::types::{Appointment, Ticket};
use helptool::calendar;
use helptool::config::ConfigError;
use helptool::contacts::directory::{self, CONTACTS_PER_PAGE, SortDirection};
use helptool::contacts::sniff::{self, ContactField};
use helptool::network::store::NewDevice;
use helptool::network::{self, LocalStore, StoreError};
use helptool::{ApiError, HelpToolClient, HelpToolConfig};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("local store: {0}")]
    Store(#[from] StoreError),
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("--data must be a JSON object")]
    NotAnObject,
    #[error("unknown mapping field '{0}'")]
    InvalidMapping(String),
    #[error("no importable contacts found (each needs a name and a phone number)")]
    NothingToImport,
    #[error("{0} not found")]
    NotFound(String),
    #[error("backend unreachable at {0}")]
    Offline(String),
}

#[derive(Parser, Debug)]
#[command(name = "helptool", about = "HelpTool helpdesk API CLI")]
struct Cli {
    #[arg(long, env = "HELPTOOL_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "HELPTOOL_DATA_DIR", help = "Directory for locally added devices and links")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Backend version and connection status.
    Status,
    Tools(ToolsCommand),
    Worksets(WorksetsCommand),
    Tickets(TicketsCommand),
    Contacts(ContactsCommand),
    Calendar(CalendarCommand),
    Network(NetworkCommand),
    Links(LinksCommand),
}

#[derive(Args, Debug)]
struct ToolsCommand {
    #[command(subcommand)]
    command: ToolsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ToolsSubcommand {
    List,
    Start {
        tool_id: i64,
    },
    Autostart {
        tool_id: i64,
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    Admin {
        tool_id: i64,
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

#[derive(Args, Debug)]
struct WorksetsCommand {
    #[command(subcommand)]
    command: WorksetsSubcommand,
}

#[derive(Subcommand, Debug)]
enum WorksetsSubcommand {
    List,
    Tools { workset_id: i64 },
    AddTool { workset_id: i64, tool_id: i64 },
    RemoveTool { workset_id: i64, tool_id: i64 },
}

#[derive(Args, Debug)]
struct TicketsCommand {
    #[command(subcommand)]
    command: TicketsSubcommand,
}

#[derive(Subcommand, Debug)]
enum TicketsSubcommand {
    List,
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
    },
    Update {
        ticket_id: i64,
        #[arg(long, help = "JSON object with the fields to change")]
        data: String,
    },
    Delete {
        ticket_id: i64,
    },
}

#[derive(Args, Debug)]
struct ContactsCommand {
    #[command(subcommand)]
    command: ContactsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ContactsSubcommand {
    List {
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long)]
        department: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = false)]
        desc: bool,
    },
    Search {
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    Import(ImportArgs),
    Departments,
}

#[derive(Args, Debug)]
struct ImportArgs {
    #[arg(default_value = "-", help = "Input file path, or - for stdin")]
    input: String,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Field per column, e.g. last_name,first_name,-,phone"
    )]
    mapping: Option<Vec<String>>,

    #[arg(long, default_value_t = false, help = "With --mapping: skip the first row")]
    skip_header: bool,

    #[arg(long, default_value_t = false, help = "Print what would be imported")]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct CalendarCommand {
    #[command(subcommand)]
    command: CalendarSubcommand,
}

#[derive(Subcommand, Debug)]
enum CalendarSubcommand {
    List,
    Add {
        #[arg(long)]
        date: String,
        #[arg(long, required_unless_present = "contact_id")]
        title: Option<String>,
        #[arg(long, help = "Phonebook contact the appointment is with")]
        contact_id: Option<i64>,
    },
}

#[derive(Args, Debug)]
struct NetworkCommand {
    #[command(subcommand)]
    command: NetworkSubcommand,
}

#[derive(Subcommand, Debug)]
enum NetworkSubcommand {
    /// Backend and locally added devices, merged.
    Devices {
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long = "type")]
        kind: Option<String>,
    },
    Ping {
        target: String,
    },
    Settings,
    Printers,
    Shortcuts,
    Install {
        program: String,
    },
    OpenPath {
        path: String,
    },
    OpenTool {
        tool: String,
    },
    /// Open the dual-pane explorer on the backend host for a device.
    DualExplorer {
        device_id: String,
    },
    /// Start a remote desktop session to a device.
    RemoteSession {
        device_id: String,
    },
    Diagnostics,
    AddDevice {
        #[arg(long)]
        name: String,
        #[arg(long)]
        ip: String,
        #[arg(long = "type", default_value = "computer")]
        kind: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = false)]
        overwrite: bool,
    },
    RemoveDevice {
        device_id: String,
    },
}

#[derive(Args, Debug)]
struct LinksCommand {
    #[command(subcommand)]
    command: LinksSubcommand,
}

#[derive(Subcommand, Debug)]
enum LinksSubcommand {
    List,
    Add {
        name: String,
        url: String,
        #[arg(long, default_value = "default")]
        browser: String,
    },
    Remove {
        link_id: i64,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = HelpToolConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url)?;
    }
    if let Some(data_dir) = cli.data_dir {
        config = config.with_data_dir(data_dir);
    }

    let client = HelpToolClient::from_config(&config)?;
    let store = LocalStore::new(&config.data_dir);

    match cli.command {
        Command::Status => run_status(&client, &config).await,
        Command::Tools(tools) => run_tools(&client, tools).await,
        Command::Worksets(worksets) => run_worksets(&client, worksets).await,
        Command::Tickets(tickets) => run_tickets(&client, tickets).await,
        Command::Contacts(contacts) => run_contacts(&client, contacts).await,
        Command::Calendar(cal) => run_calendar(&client, cal).await,
        Command::Network(net) => run_network(&client, &store, net).await,
        Command::Links(links) => run_links(&store, links).await,
    }
}

async fn run_status(client: &HelpToolClient, config: &HelpToolConfig) -> Result<(), CliError> {
    let info = client.system_info().await.map_err(|e| {
        tracing::warn!(error = %e, "status check failed");
        CliError::Offline(config.base_url.clone())
    })?;
    print_json(&json!({ "online": true, "base_url": config.base_url, "system": info }))
}

async fn run_tools(client: &HelpToolClient, tools: ToolsCommand) -> Result<(), CliError> {
    match tools.command {
        ToolsSubcommand::List => print_json(&client.list_tools().await?),
        ToolsSubcommand::Start { tool_id } => print_json(&client.start_tool(tool_id).await?),
        ToolsSubcommand::Autostart { tool_id, enabled } => {
            print_json(&client.set_tool_autostart(tool_id, enabled).await?)
        }
        ToolsSubcommand::Admin { tool_id, enabled } => print_json(&client.set_tool_admin(tool_id, enabled).await?),
    }
}

async fn run_worksets(client: &HelpToolClient, worksets: WorksetsCommand) -> Result<(), CliError> {
    match worksets.command {
        WorksetsSubcommand::List => print_json(&client.list_worksets().await?),
        WorksetsSubcommand::Tools { workset_id } => print_json(&client.workset_tools(workset_id).await?),
        WorksetsSubcommand::AddTool { workset_id, tool_id } => {
            client.add_tool_to_workset(workset_id, tool_id).await?;
            println!("ok");
            Ok(())
        }
        WorksetsSubcommand::RemoveTool { workset_id, tool_id } => {
            client.remove_tool_from_workset(workset_id, tool_id).await?;
            println!("ok");
            Ok(())
        }
    }
}

async fn run_tickets(client: &HelpToolClient, tickets: TicketsCommand) -> Result<(), CliError> {
    match tickets.command {
        TicketsSubcommand::List => print_json(&client.list_tickets().await?),
        TicketsSubcommand::Create {
            title,
            description,
            status,
            priority,
        } => {
            let ticket = Ticket {
                title: Some(title),
                description,
                status,
                priority,
                ..Ticket::default()
            };
            print_json(&client.create_ticket(&ticket).await?)
        }
        TicketsSubcommand::Update { ticket_id, data } => {
            let changes = parse_object(&data)?;
            print_json(&client.update_ticket(ticket_id, changes).await?)
        }
        TicketsSubcommand::Delete { ticket_id } => print_json(&client.delete_ticket(ticket_id).await?),
    }
}

async fn run_contacts(client: &HelpToolClient, contacts: ContactsCommand) -> Result<(), CliError> {
    match contacts.command {
        ContactsSubcommand::List {
            query,
            department,
            page,
            desc,
        } => {
            let all = client.phonebook().await?;
            let mut hits = directory::filter(&all, &query, department.as_deref());
            let direction = if desc { SortDirection::Descending } else { SortDirection::Ascending };
            directory::sort_by_name(&mut hits, direction);
            let page = directory::paginate(&hits, page, CONTACTS_PER_PAGE);
            print_json(&json!({
                "page": page.page,
                "total_pages": page.total_pages,
                "total": hits.len(),
                "contacts": page.items,
            }))
        }
        ContactsSubcommand::Search { query, limit } => {
            let all = client.phonebook().await?;
            print_json(&directory::autocomplete(&all, &query, limit))
        }
        ContactsSubcommand::Import(args) => run_import(client, args).await,
        ContactsSubcommand::Departments => {
            let all = client.phonebook().await?;
            print_json(&directory::departments(&all))
        }
    }
}

async fn run_import(client: &HelpToolClient, args: ImportArgs) -> Result<(), CliError> {
    let text = read_input(&args.input).await?;

    let parsed = if let Some(names) = &args.mapping {
        let mapping = names
            .iter()
            .map(|name| ContactField::parse_mapping(name).map_err(CliError::InvalidMapping))
            .collect::<Result<Vec<_>, _>>()?;
        sniff::parse_with_mapping(&text, &mapping, args.skip_header)
    } else {
        let analysis = sniff::analyze(&text);
        eprintln!(
            "detected delimiter {:?}, {} columns, header row: {}",
            analysis.delimiter,
            analysis.column_count,
            if analysis.header.is_some() { "yes" } else { "no" }
        );
        analysis.contacts
    };

    let parsed_count = parsed.len();
    let ready = sniff::importable(parsed, &helptool::timestamp_iso());
    if ready.is_empty() {
        return Err(CliError::NothingToImport);
    }
    eprintln!("{} of {parsed_count} rows importable", ready.len());

    if args.dry_run {
        return print_json(&ready);
    }
    print_json(&client.import_contacts(&ready).await?)
}

async fn run_calendar(client: &HelpToolClient, cal: CalendarCommand) -> Result<(), CliError> {
    match cal.command {
        CalendarSubcommand::List => print_json(&client.calendar_events().await?),
        CalendarSubcommand::Add {
            date,
            title,
            contact_id,
        } => {
            let mut appointment = match contact_id {
                Some(id) => {
                    let contacts = client.phonebook().await?;
                    let contact = contacts
                        .iter()
                        .find(|c| c.id == Some(id))
                        .ok_or_else(|| CliError::NotFound(format!("contact {id}")))?;
                    calendar::appointment_for_contact(contact, &date)
                }
                None => Appointment {
                    date: Some(date),
                    ..Appointment::default()
                },
            };
            if title.is_some() {
                appointment.title = title;
            }
            print_json(&client.create_appointment(&appointment).await?)
        }
    }
}

async fn run_network(client: &HelpToolClient, store: &LocalStore, net: NetworkCommand) -> Result<(), CliError> {
    match net.command {
        NetworkSubcommand::Devices { query, kind } => {
            let local = store.devices().await?;
            let devices = match client.network_devices_checked().await {
                Ok(Some(backend)) => network::merge_devices(backend, local),
                Ok(None) => local,
                Err(e) => {
                    tracing::warn!(error = %e, "backend devices unusable, showing local devices only");
                    local
                }
            };
            print_json(&network::filter_devices(&devices, &query, kind.as_deref()))
        }
        NetworkSubcommand::Ping { target } => {
            let result = client.ping(&target).await?;
            eprintln!("{target}: {}", if result.reachable() { "online" } else { "offline" });
            print_json(&result)
        }
        NetworkSubcommand::Settings => print_json(&client.network_settings().await?),
        NetworkSubcommand::Printers => print_json(&client.printers().await?),
        NetworkSubcommand::Shortcuts => print_json(&client.network_shortcuts().await?),
        NetworkSubcommand::Install { program } => print_json(&client.install_program(&program).await?),
        NetworkSubcommand::OpenPath { path } => print_json(&client.open_network_path(&path).await?),
        NetworkSubcommand::OpenTool { tool } => print_json(&client.open_network_tool(&tool).await?),
        NetworkSubcommand::DualExplorer { device_id } => print_json(&client.open_dual_explorer(&device_id).await?),
        NetworkSubcommand::RemoteSession { device_id } => print_json(&client.remote_session(&device_id).await?),
        NetworkSubcommand::Diagnostics => print_json(&client.network_diagnostics().await?),
        NetworkSubcommand::AddDevice {
            name,
            ip,
            kind,
            description,
            overwrite,
        } => {
            let device = store
                .add_device(NewDevice { name, ip, kind, description }, overwrite)
                .await?;
            print_json(&device)
        }
        NetworkSubcommand::RemoveDevice { device_id } => {
            if !store.remove_device(&device_id).await? {
                return Err(CliError::NotFound(format!("device {device_id}")));
            }
            println!("ok");
            Ok(())
        }
    }
}

async fn run_links(store: &LocalStore, links: LinksCommand) -> Result<(), CliError> {
    match links.command {
        LinksSubcommand::List => print_json(&store.links().await?),
        LinksSubcommand::Add { name, url, browser } => print_json(&store.add_link(&name, &url, &browser).await?),
        LinksSubcommand::Remove { link_id } => {
            if !store.remove_link(link_id).await? {
                return Err(CliError::NotFound(format!("link {link_id}")));
            }
            println!("ok");
            Ok(())
        }
    }
}

async fn read_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        return Ok(text);
    }
    Ok(tokio::fs::read_to_string(input).await?)
}

fn parse_object(data: &str) -> Result<Value, CliError> {
    let value = serde_json::from_str::<Value>(data)?;
    if !value.is_object() {
        return Err(CliError::NotAnObject);
    }
    Ok(value)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
