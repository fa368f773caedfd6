use std::{
    error::Error,
    io::Write,
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, NewUser, Role};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "foodgram_admin")]
#[command(about = "Admin utilities for Foodgram (bootstrap users and catalogs)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./foodgram.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Tag(Tag),
    Ingredient(Ingredient),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    /// Give the account the admin role.
    #[arg(long)]
    admin: bool,
}

#[derive(Args, Debug)]
struct Tag {
    #[command(subcommand)]
    command: TagCommand,
}

#[derive(Subcommand, Debug)]
enum TagCommand {
    Create(TagCreateArgs),
}

#[derive(Args, Debug)]
struct TagCreateArgs {
    #[arg(long)]
    name: String,
    /// `#RRGGBB`.
    #[arg(long)]
    color: String,
    #[arg(long)]
    slug: String,
}

#[derive(Args, Debug)]
struct Ingredient {
    #[command(subcommand)]
    command: IngredientCommand,
}

#[derive(Subcommand, Debug)]
enum IngredientCommand {
    Add(IngredientAddArgs),
    Import(IngredientImportArgs),
}

#[derive(Args, Debug)]
struct IngredientAddArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    unit: String,
}

#[derive(Args, Debug)]
struct IngredientImportArgs {
    /// CSV file without header, one `name,measurement_unit` per line.
    #[arg(long)]
    csv: PathBuf,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn read_ingredients(path: &Path) -> Result<Vec<(String, String)>, Box<dyn Error + Send + Sync>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        match (record.get(0), record.get(1)) {
            (Some(name), Some(unit)) => rows.push((name.to_string(), unit.to_string())),
            _ => {
                let line = record.position().map_or(0, |pos| pos.line());
                return Err(format!("line {line}: expected `name,measurement_unit`").into());
            }
        }
    }
    Ok(rows)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;
            let role = if args.admin { Role::Admin } else { Role::User };

            let user = engine
                .register_user(NewUser {
                    username: args.username,
                    email: args.email,
                    first_name: args.first_name,
                    last_name: args.last_name,
                    password,
                    role,
                })
                .await?;

            println!("created user: {} ({})", user.username, user.id);
        }
        Command::Tag(Tag {
            command: TagCommand::Create(args),
        }) => {
            let tag = engine
                .create_tag(&args.name, &args.color, &args.slug)
                .await?;
            println!("created tag: {} ({})", tag.slug, tag.id);
        }
        Command::Ingredient(Ingredient {
            command: IngredientCommand::Add(args),
        }) => {
            let ingredient = engine.create_ingredient(&args.name, &args.unit).await?;
            println!(
                "created ingredient: {} ({}) ({})",
                ingredient.name, ingredient.measurement_unit, ingredient.id
            );
        }
        Command::Ingredient(Ingredient {
            command: IngredientCommand::Import(args),
        }) => {
            let rows = read_ingredients(&args.csv)?;
            let total = rows.len();
            let inserted = engine.import_ingredients(rows).await?;
            println!(
                "imported {inserted} ingredients ({} already present)",
                total - inserted
            );
        }
    }

    Ok(())
}
