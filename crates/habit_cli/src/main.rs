//! `habit` command line entry point.
//!
//! `serve` runs the HTTP backend; every other subcommand is a client of it.

mod client;
mod render;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use client::ApiClient;
use habit_api::AppState;
use habit_core::db::{open_db, share};
use habit_core::{
    init_logging, CalendarView, HabitConfig, History, ItemId, NewItem, NewQuote, QuotePipeline,
    QuoteReveal, TaskBoard, YearMonth,
};
use log::warn;
use std::path::PathBuf;
use tokio::net::TcpListener;

const CLIENT_LOG_LEVEL: &str = "warn";

#[derive(Parser, Debug)]
#[command(name = "habit", version, about = "Daily habit tracker", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
    #[arg(long, help = "Config file. Defaults to $XDG_CONFIG_HOME/habit/config.toml")]
    config: Option<PathBuf>,
    #[arg(long, help = "Log level: trace|debug|info|warn|error")]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Run the HTTP backend")]
    Serve,
    #[command(about = "Show today's tasks")]
    Tasks,
    #[command(about = "Create a task")]
    Add {
        title: String,
        #[arg(long, help = "Show the task every day instead of today only")]
        persistent: bool,
    },
    #[command(about = "Record which tasks are done for a day")]
    Record {
        #[arg(long = "done", num_args = 1.., help = "Ids of completed tasks")]
        done: Vec<ItemId>,
        #[arg(long, help = "Day to record (YYYY-MM-DD). Defaults to today")]
        date: Option<NaiveDate>,
    },
    #[command(about = "Reveal a quote for a recorded day")]
    Quote {
        #[arg(long, help = "Recorded day (YYYY-MM-DD). Defaults to today")]
        date: Option<NaiveDate>,
        #[command(flatten)]
        own: OwnQuote,
    },
    #[command(about = "Show a month of achievements")]
    Calendar {
        #[arg(long, help = "Month (YYYY-MM). Defaults to the current month")]
        month: Option<YearMonth>,
        #[arg(long, help = "Day of the month to highlight and show history for")]
        select: Option<u32>,
        #[arg(long, conflicts_with = "next", help = "Show the month before")]
        prev: bool,
        #[arg(long, help = "Show the month after")]
        next: bool,
    },
    #[command(about = "Show what was done on a day")]
    History { date: NaiveDate },
}

/// A quote typed in by the user instead of fetched.
#[derive(Debug, clap::Args)]
struct OwnQuote {
    #[arg(long, requires_all = ["ja", "author"], help = "English text of your own quote")]
    en: Option<String>,
    #[arg(long, requires_all = ["en", "author"], help = "Japanese text of your own quote")]
    ja: Option<String>,
    #[arg(long, requires_all = ["en", "ja"], help = "Author of your own quote")]
    author: Option<String>,
}

impl OwnQuote {
    fn into_quote(self) -> Option<NewQuote> {
        Some(NewQuote {
            quote_en: self.en?,
            quote_ja: self.ja?,
            author: self.author?,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(HabitConfig::default_config_path);
    let config = HabitConfig::load(&config_path)?;
    let level = log_level(
        &args.command,
        args.log_level.as_deref(),
        &config.logging.level,
    );
    init_logging(level, config.logging.dir.as_deref())?;

    let client = ApiClient::new(&config.client.api_url)?;
    match args.command {
        Commands::Serve => serve(&config).await,
        Commands::Tasks => tasks(&client).await,
        Commands::Add { title, persistent } => add(&client, title, persistent).await,
        Commands::Record { done, date } => record(&client, &done, date.unwrap_or_else(today)).await,
        Commands::Quote { date, own } => {
            let date = date.unwrap_or_else(today);
            match own.into_quote() {
                Some(quote) => attach(&client, date, quote).await,
                None => reveal(&client, date).await,
            }
        }
        Commands::Calendar {
            month,
            select,
            prev,
            next,
        } => {
            let mut month = month.unwrap_or_else(YearMonth::current);
            if prev {
                month = month.prev();
            } else if next {
                month = month.next();
            }
            calendar(&client, month, select).await
        }
        Commands::History { date } => history(&client, date).await,
    }
}

/// `--log-level` wins; otherwise only `serve` uses the configured level.
fn log_level<'a>(command: &Commands, flag: Option<&'a str>, configured: &'a str) -> &'a str {
    match (flag, command) {
        (Some(level), _) => level,
        (None, Commands::Serve) => configured,
        (None, _) => CLIENT_LOG_LEVEL,
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn serve(config: &HabitConfig) -> Result<()> {
    let conn = open_db(&config.storage.db_path).with_context(|| {
        format!(
            "failed to open database `{}`",
            config.storage.db_path.display()
        )
    })?;
    let pipeline = QuotePipeline::from_config(&config.quotes)?;
    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind `{}`", config.server.bind))?;

    habit_api::serve(
        listener,
        AppState::new(share(conn), pipeline),
        config.server.allowed_origins.clone(),
    )
    .await?;
    Ok(())
}

/// Loads the board, falling back to the offline task list when the API is unreachable.
async fn load_board(client: &ApiClient) -> TaskBoard {
    match client.list_items().await {
        Ok(items) => TaskBoard::from_items(&items),
        Err(err) => {
            warn!("event=board_load module=cli status=degraded reason=fallback error={err}");
            eprintln!("タスクを取得できませんでした。オフラインの一覧を表示します: {err}");
            TaskBoard::fallback()
        }
    }
}

async fn tasks(client: &ApiClient) -> Result<()> {
    let board = load_board(client).await;
    print!("{}", render::tasks(&board));
    Ok(())
}

async fn add(client: &ApiClient, title: String, persistent: bool) -> Result<()> {
    // Loaded before the create so the new item is not listed twice.
    let mut board = TaskBoard::from_items(&client.list_items().await?);
    let item = client.create_item(&NewItem::new(title, persistent)).await?;
    board.push(&item);
    print!("{}", render::tasks(&board));
    println!("追加しました: #{} {}", item.id, item.title);
    Ok(())
}

async fn record(client: &ApiClient, done: &[ItemId], date: NaiveDate) -> Result<()> {
    let mut board = load_board(client).await;
    let unknown = board.check_all(done);
    if !unknown.is_empty() {
        bail!("unknown task ids: {unknown:?}");
    }

    let achievement = client.record(&board.record_for(date)).await?;
    let chances = board.remaining_chances(&achievement);
    print!("{}", render::tasks(&board));
    println!("{date}: {}件達成", achievement.completed_count);
    println!("名言チャンス: 残り{chances}回");
    Ok(())
}

async fn reveal(client: &ApiClient, date: NaiveDate) -> Result<()> {
    let Some(achievement) = client.achievement(date).await? else {
        bail!("{date} has no record yet; run `habit record` first");
    };

    // The board mirrors what was recorded so chances match the record response.
    let mut board = load_board(client).await;
    let done: Vec<ItemId> = achievement
        .items
        .iter()
        .filter(|entry| entry.status)
        .map(|entry| entry.item_id)
        .collect();
    board.check_all(&done);

    let mut reveal = QuoteReveal::after_record(&achievement, board.remaining_chances(&achievement));
    if reveal.can_reveal() {
        if let Some(id) = reveal.achievement_id() {
            let quote = client.reveal_quote(id).await?;
            reveal.accept(quote);
        }
    } else {
        println!("名言チャンスは残っていません");
    }

    print!("{}", render::quote(reveal.current()));
    println!("名言チャンス: 残り{}回", reveal.chances());
    Ok(())
}

async fn attach(client: &ApiClient, date: NaiveDate, quote: NewQuote) -> Result<()> {
    let Some(achievement) = client.achievement(date).await? else {
        bail!("{date} has no record yet; run `habit record` first");
    };
    let stored = client.attach_quote(achievement.id, &quote).await?;
    print!("{}", render::quote(Some(&stored)));
    Ok(())
}

async fn calendar(client: &ApiClient, month: YearMonth, select: Option<u32>) -> Result<()> {
    let entries = client.month(month).await?;
    print!(
        "{}",
        render::calendar(&CalendarView::build(month, &entries, select))
    );

    if let Some(day) = select {
        println!();
        history(client, month.date(day)?).await?;
    }
    Ok(())
}

async fn history(client: &ApiClient, date: NaiveDate) -> Result<()> {
    let day = client.achievement(date).await?;
    let history = day.as_ref().map(History::from_achievement);
    print!("{}", render::history(date, history.as_ref()));
    Ok(())
}
