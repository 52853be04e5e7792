//! Komreader - A terminal reader for LysKOM conferences
//!
//! This is the main entry point for the komreader application. It talks to
//! an httpkom server and reads unread texts in comment-thread order.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::{error, info, warn};

use kom::models::{ConfNo, Session, Text};
use kom::service::ConferenceService;
use kom::{AuthContext, HttpkomClient, QueueError, ReadQueue, ServerConfig, SessionFile};

/// Environment variable read when `--password` is not given
const PASSWORD_ENV: &str = "KOM_PASSWORD";

#[derive(Parser, Debug)]
#[command(name = "komreader", version, about = "Read LysKOM conferences through httpkom")]
struct Cli {
    /// httpkom base URL (overrides KOM_SERVER_URL and server.json)
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and remember the session for later commands.
    Login {
        /// Person name to log in as.
        name: String,
        /// Password (default: the KOM_PASSWORD environment variable).
        #[arg(long)]
        password: Option<String>,
    },
    /// End the remembered session.
    Logout,
    /// List conferences with unread texts.
    Unread,
    /// Read the unread texts of a conference, thread by thread.
    Read {
        /// Conference number.
        #[arg(long)]
        conf: u32,
        /// Stop after this many texts.
        #[arg(long)]
        limit: Option<usize>,
        /// Mark every text shown as read.
        #[arg(long, default_value_t = false)]
        mark_read: bool,
    },
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut server = ServerConfig::load()?;
    if let Some(base_url) = cli.server {
        server.base_url = base_url;
    }
    info!("Using httpkom server at {}", server.base_url);

    let stored_id = SessionFile::load()?;
    let mut client = HttpkomClient::new(&server, AuthContext::Anonymous)
        .context("Failed to create httpkom client")?;
    let session = Session::resume(&client, stored_id.as_deref());
    client.set_auth(session.auth_context());

    match cli.command {
        Command::Login { name, password } => login(&client, name, password),
        Command::Logout => logout(&client, &session),
        Command::Unread => list_unread(&client),
        Command::Read {
            conf,
            limit,
            mark_read,
        } => read(&client, ConfNo(conf), limit, mark_read),
    }
}

fn login(client: &HttpkomClient, name: String, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => std::env::var(PASSWORD_ENV)
            .with_context(|| format!("No --password given and {} is not set", PASSWORD_ENV))?,
    };

    let session = Session::new(name, password)
        .login(client)
        .context("Login failed")?;
    let Some(id) = session.id.as_deref() else {
        bail!("Server returned a session without id");
    };
    SessionFile::save(id)?;

    println!("Logged in as {}", session.pers_name);
    Ok(())
}

fn logout(client: &HttpkomClient, session: &Session) -> Result<()> {
    if session.is_new() {
        warn!("No active session");
    } else {
        session.logout(client).context("Logout failed")?;
    }
    SessionFile::clear()?;
    println!("Logged out");
    Ok(())
}

fn list_unread(client: &HttpkomClient) -> Result<()> {
    let unread = client
        .list_unread_conferences()
        .context("Failed to list unread conferences")?;

    if unread.is_empty() {
        println!("No unread texts");
        return Ok(());
    }

    for conf in &unread.confs {
        println!(
            "{:>6}  {:>5} unread  {}",
            conf.conf_no.get(),
            conf.no_of_unread,
            conf.name.as_deref().unwrap_or("")
        );
    }
    println!("{} unread texts in {} conferences", unread.total_unread(), unread.len());
    Ok(())
}

fn read(client: &HttpkomClient, conf_no: ConfNo, limit: Option<usize>, mark_read: bool) -> Result<()> {
    let mut queue = ReadQueue::for_conference(client, conf_no)
        .with_context(|| format!("Failed to load read-markings for conference {}", conf_no))?;
    let limit = limit.unwrap_or(usize::MAX);

    let mut shown = 0;
    while shown < limit {
        let text = match queue.advance(client) {
            Ok(Some(text)) => text,
            Ok(None) => break,
            Err(QueueError::Fetch { text_no, source }) => {
                warn!("Skipping text {}: {}", text_no, source);
                queue.drop_text(text_no);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        print_text(text);
        if mark_read {
            text.mark_as_read_global(client)
                .context("Failed to mark text as read")?;
        }
        shown += 1;
    }

    println!("{} texts read, {} left in conference {}", shown, queue.len(), conf_no);
    Ok(())
}

fn print_text(text: &Text) {
    let text_no = text.text_no().map(|no| no.to_string()).unwrap_or_default();
    let author = text
        .author()
        .map(|a| a.pers_name.clone().unwrap_or_else(|| a.pers_no.to_string()))
        .unwrap_or_default();

    println!("Text {} by {}", text_no, author);
    if let Some(time) = text.creation_time() {
        println!("Created {}", time);
    }
    for link in text.comment_to_list() {
        println!("Comment to text {}", link.text_no);
    }
    println!("Subject: {}", text.subject());
    println!("{}", "-".repeat(60));
    println!("{}", text.body());
    for link in text.comment_in_list() {
        println!("Comment in text {}", link.text_no);
    }
    println!();
}
