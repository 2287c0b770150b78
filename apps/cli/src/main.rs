//! Pantry CLI - Command-line client for the Pantry API.

mod commands;
mod output;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use commands::Client;
use pantry_api::{DishFilter, IngredientFilter, PageRequest};
use pantry_config_and_utils::{init_logging, Config, Paths};
use std::path::PathBuf;

/// Pantry CLI - Talk to the Pantry API with transparent session renewal.
#[derive(Parser)]
#[command(name = "pantry")]
#[command(about = "Pantry CLI for authentication and API requests")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error); defaults to the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Sign in as this user before running the command
    #[arg(long, env = "PANTRY_EMAIL", global = true)]
    email: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Login with email and password
    Login,

    /// Logout and clear the session
    Logout,

    /// Show the signed-in user
    Me,

    /// Renew the session now
    Refresh,

    /// Create an account
    Register {
        /// Email address of the new account
        account_email: String,
        /// First name
        #[arg(long)]
        first_name: String,
        /// Last name
        #[arg(long)]
        last_name: String,
    },

    /// Password reset and change
    Password {
        #[command(subcommand)]
        command: PasswordCommands,
    },

    /// Browse and manage dishes
    Dishes {
        #[command(subcommand)]
        command: DishCommands,
    },

    /// Search ingredients
    Ingredients {
        /// Name contains
        #[arg(short, long)]
        search: Option<String>,
        /// Category (repeatable), e.g. VEGETABLE
        #[arg(long = "category")]
        categories: Vec<String>,
        #[command(flatten)]
        page: PageArgs,
    },

    /// The weekly cart
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },

    /// Saved grocery lists
    Lists {
        #[command(subcommand)]
        command: ListCommands,
    },

    /// Data of the signed-in account
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },

    /// Perform one API request through the gateway
    Request {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE)
        method: String,
        /// Path under the API prefix (e.g. /dishes)
        path: String,
        /// JSON request body
        #[arg(short, long)]
        data: Option<String>,
    },

    /// Fire concurrent GETs and report how many renewals they caused
    Probe {
        /// Path under the API prefix
        path: String,
        /// Number of concurrent requests
        #[arg(short, long, default_value_t = 5)]
        concurrency: usize,
    },
}

#[derive(Subcommand)]
enum PasswordCommands {
    /// Email a reset link
    Forgot {
        /// Account email
        account_email: String,
    },
    /// Check a reset token
    CheckToken {
        /// Token from the reset email
        token: String,
    },
    /// Set a new password with a reset token
    Confirm {
        /// Token from the reset email
        token: String,
    },
    /// Change the password of the signed-in user
    Change,
}

#[derive(Args)]
struct PageArgs {
    /// Page number, from 0
    #[arg(long, default_value_t = 0)]
    page: u32,
    /// Page size
    #[arg(long, default_value_t = 10)]
    size: u32,
}

impl From<PageArgs> for PageRequest {
    fn from(args: PageArgs) -> Self {
        PageRequest::new(args.page, args.size)
    }
}

#[derive(Subcommand)]
enum DishCommands {
    /// List dishes
    List {
        /// Name contains
        #[arg(short, long)]
        search: Option<String>,
        /// Cuisine (repeatable), e.g. ITALIAN
        #[arg(long = "cuisine")]
        cuisines: Vec<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show one dish with its ingredients
    Show { id: i64 },
    /// Delete a dish
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum CartCommands {
    /// Show the cart
    Show,
    /// Plan a dish for a day
    Add {
        dish_id: i64,
        /// MONDAY through SUNDAY
        day: String,
        /// Servings
        #[arg(short, long, default_value_t = 2)]
        people: u32,
    },
    /// Remove one entry
    Remove { id: i32 },
    /// Empty the cart
    Clear,
    /// Save the cart as the grocery list of the week starting on a date
    Save {
        /// First day of the week (YYYY-MM-DD)
        start: NaiveDate,
    },
}

#[derive(Subcommand)]
enum ListCommands {
    /// Show saved grocery lists
    Show,
    /// Ingredients of one list
    Items {
        id: i64,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Set quantities as INGREDIENT_ID=QUANTITY pairs
    Set {
        id: i64,
        #[arg(required = true)]
        quantities: Vec<String>,
    },
    /// Delete a list
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Download everything stored about the account
    Export {
        /// Target file; defaults to the name the backend suggests
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete the signed-in account
    Delete,
}

impl Commands {
    /// Commands that work without a session.
    fn is_anonymous(&self) -> bool {
        matches!(
            self,
            Commands::Login
                | Commands::Register { .. }
                | Commands::Password {
                    command: PasswordCommands::Forgot { .. }
                        | PasswordCommands::CheckToken { .. }
                        | PasswordCommands::Confirm { .. }
                }
        )
    }
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let format = cli.format;
    let client = Client::connect(config)?;

    if !matches!(cli.command, Commands::Login) {
        let sign_in = match cli.email.as_deref() {
            Some(email) if !cli.command.is_anonymous() => {
                Some((email, commands::sign_in_password()?))
            }
            _ => None,
        };
        client
            .start_session(sign_in, client.session_loss_notice(format))
            .await?;
    }

    match cli.command {
        Commands::Login => commands::login(&client, cli.email.as_deref(), format).await,
        Commands::Logout => commands::logout(&client, format).await,
        Commands::Me => commands::me(&client, format).await,
        Commands::Refresh => commands::refresh(&client, format).await,
        Commands::Register {
            account_email,
            first_name,
            last_name,
        } => commands::register(&client, &account_email, &first_name, &last_name, format).await,
        Commands::Password { command } => match command {
            PasswordCommands::Forgot { account_email } => {
                commands::password_forgot(&client, &account_email, format).await
            }
            PasswordCommands::CheckToken { token } => {
                commands::password_check_token(&client, &token, format).await
            }
            PasswordCommands::Confirm { token } => {
                commands::password_confirm(&client, &token, format).await
            }
            PasswordCommands::Change => commands::password_change(&client, format).await,
        },
        Commands::Dishes { command } => match command {
            DishCommands::List {
                search,
                cuisines,
                page,
            } => {
                let filter = DishFilter {
                    search,
                    countries: cuisines,
                    page: page.into(),
                };
                commands::dishes_list(&client, filter, format).await
            }
            DishCommands::Show { id } => commands::dish_show(&client, id, format).await,
            DishCommands::Delete { id } => commands::dish_delete(&client, id, format).await,
        },
        Commands::Ingredients {
            search,
            categories,
            page,
        } => {
            let filter = IngredientFilter {
                search,
                categories,
                page: page.into(),
            };
            commands::ingredients_list(&client, filter, format).await
        }
        Commands::Cart { command } => match command {
            CartCommands::Show => commands::cart_show(&client, format).await,
            CartCommands::Add {
                dish_id,
                day,
                people,
            } => commands::cart_add(&client, dish_id, &day, people, format).await,
            CartCommands::Remove { id } => commands::cart_remove(&client, id, format).await,
            CartCommands::Clear => commands::cart_clear(&client, format).await,
            CartCommands::Save { start } => commands::cart_save(&client, start, format).await,
        },
        Commands::Lists { command } => match command {
            ListCommands::Show => commands::lists_show(&client, format).await,
            ListCommands::Items { id, page } => {
                commands::list_items(&client, id, page.into(), format).await
            }
            ListCommands::Set { id, quantities } => {
                commands::list_set(&client, id, &quantities, format).await
            }
            ListCommands::Delete { id } => commands::list_delete(&client, id, format).await,
        },
        Commands::Account { command } => match command {
            AccountCommands::Export { output } => {
                commands::account_export(&client, output.as_deref(), format).await
            }
            AccountCommands::Delete => commands::account_delete(&client, format).await,
        },
        Commands::Request { method, path, data } => {
            commands::request(&client, &method, &path, data.as_deref(), format).await
        }
        Commands::Probe { path, concurrency } => {
            commands::probe(&client, &path, concurrency, format).await
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    let config = match Paths::new().and_then(|paths| Config::load(&paths)) {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&format!("Could not load configuration: {}", e), format);
            std::process::exit(1);
        }
    };

    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    init_logging("pantry-cli", &level);

    if let Err(e) = run(cli, config).await {
        output::print_error(&e.to_string(), format);
        std::process::exit(1);
    }
}
