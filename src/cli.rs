use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::data::shop::Shop;
use crate::data::store::{LoadError, SaveError, ShopStore};
use crate::data::validate::Candidate;
use crate::server;

/// Command-line editor for the shop list.
#[derive(Debug, Parser)]
#[command(name = "foodmap", version, about = "Browse and edit the food map shop list")]
pub struct CliArgs {
    /// Path to the JSON data file (default: $FOODMAP_DATA or database/data-shops.json)
    #[arg(short = 'd', long = "data", global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List shops, optionally filtered by name, cuisine or dishes
    List {
        /// Case-insensitive search term
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show every field of one shop
    Show {
        /// Position in the full list
        index: usize,
    },

    /// Add a shop from the given fields
    Add(FormArgs),

    /// Edit a shop; fields not given keep their current value
    Edit {
        index: usize,
        #[command(flatten)]
        form: FormArgs,
    },

    /// Delete a shop after confirmation
    Delete {
        index: usize,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Normalize the data file to the current shape and report what changed
    Migrate,

    /// Serve the local browser console
    Serve {
        /// Address to bind (default: $FOODMAP_BIND or 127.0.0.1:3000)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct FormArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    /// Comma-separated dish names
    #[arg(long)]
    pub dishes: Option<String>,
    #[arg(long)]
    pub cuisine: Option<String>,
    /// At most 100 characters
    #[arg(long)]
    pub recommendation: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<String>,
}

impl FormArgs {
    /// Overlays the given fields on `base`.
    pub fn fill(self, base: Candidate) -> Candidate {
        Candidate {
            name: self.name.unwrap_or(base.name),
            address: self.address.unwrap_or(base.address),
            dishes: self.dishes.unwrap_or(base.dishes),
            cuisine: self.cuisine.unwrap_or(base.cuisine),
            recommendation: self.recommendation.unwrap_or(base.recommendation),
            latitude: self.latitude.unwrap_or(base.latitude),
            longitude: self.longitude.unwrap_or(base.longitude),
        }
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let cli = match CliArgs::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return err.exit_code();
        }
    };
    let config = AppConfig::resolve(cli.data);

    match cli.command {
        Command::List { search } => with_store(&config, |store| handle_list(store, search)),
        Command::Show { index } => with_store(&config, |store| handle_show(store, index)),
        Command::Add(form) => with_store(&config, |store| handle_add(store, form)),
        Command::Edit { index, form } => {
            with_store(&config, |store| handle_edit(store, index, form))
        }
        Command::Delete { index, yes } => with_store(&config, |store| {
            let stdin = io::stdin();
            handle_delete(store, index, yes, &mut stdin.lock())
        }),
        Command::Migrate => handle_migrate(&config),
        Command::Serve { bind } => handle_serve(&config, bind),
    }
}

fn with_store(config: &AppConfig, run: impl FnOnce(&mut ShopStore) -> i32) -> i32 {
    let mut store = ShopStore::new(&config.data_path);
    match store.load() {
        Ok(_) => {}
        Err(LoadError::Persist(err)) => report_save_error(&err),
        Err(err) => {
            eprintln!("load failed: {err}");
            return 1;
        }
    }
    run(&mut store)
}

fn handle_list(store: &ShopStore, search: Option<String>) -> i32 {
    let term = search.unwrap_or_default();
    let rows = store.filter(&term);
    if rows.is_empty() {
        if term.is_empty() {
            println!("no shops yet");
        } else {
            println!("no shops match '{term}'");
        }
        return 0;
    }

    println!("#\tname\tcuisine\tdishes\tupdated");
    for (index, shop) in rows {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            index, shop.name, shop.cuisine, shop.dishes, shop.updated
        );
    }
    0
}

fn handle_show(store: &ShopStore, index: usize) -> i32 {
    let Some(shop) = store.get(index) else {
        eprintln!("no shop at index {index}");
        return 1;
    };
    print!("{}", render_details(shop));
    0
}

const PREVIEW_NAME_CHARS: usize = 20;
const PREVIEW_CUISINE_CHARS: usize = 15;
const PREVIEW_UPDATED_CHARS: usize = 19;

/// Detail view: dishes one per line, coordinates to four decimals. Name,
/// cuisine and timestamp are cut to fixed preview widths.
pub fn render_details(shop: &Shop) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "name:           {}\n",
        clip(&shop.name, PREVIEW_NAME_CHARS)
    ));
    out.push_str(&format!(
        "cuisine:        {}\n",
        clip(&shop.cuisine, PREVIEW_CUISINE_CHARS)
    ));
    out.push_str(&format!("address:        {}\n", shop.address));
    out.push_str("dishes:\n");
    for dish in shop.dish_list() {
        out.push_str(&format!("  {dish}\n"));
    }
    out.push_str(&format!("recommendation: {}\n", shop.recommendation));
    out.push_str(&format!(
        "coordinates:    {:.4}, {:.4}\n",
        shop.latitude, shop.longitude
    ));
    out.push_str(&format!(
        "updated:        {}\n",
        clip(&shop.updated, PREVIEW_UPDATED_CHARS)
    ));
    out
}

fn clip(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

fn handle_add(store: &mut ShopStore, form: FormArgs) -> i32 {
    let shop = match form.fill(Candidate::default()).validate() {
        Ok(shop) => shop,
        Err(err) => {
            eprintln!("invalid shop: {err}");
            return 1;
        }
    };
    let name = shop.name.clone();
    match store.append(shop) {
        Ok(index) => {
            println!("added shop #{index}: {name}");
            0
        }
        Err(err) => {
            report_save_error(&err);
            1
        }
    }
}

fn handle_edit(store: &mut ShopStore, index: usize, form: FormArgs) -> i32 {
    let Some(current) = store.get(index) else {
        eprintln!("no shop at index {index}");
        return 1;
    };
    let shop = match form.fill(Candidate::from_shop(current)).validate() {
        Ok(shop) => shop,
        Err(err) => {
            eprintln!("invalid shop: {err}");
            return 1;
        }
    };
    let name = shop.name.clone();
    match store.replace(index, shop) {
        Ok(()) => {
            println!("updated shop #{index}: {name}");
            0
        }
        Err(err) => {
            report_save_error(&err);
            1
        }
    }
}

fn handle_delete(store: &mut ShopStore, index: usize, yes: bool, input: &mut impl BufRead) -> i32 {
    let Some(shop) = store.get(index) else {
        eprintln!("no shop at index {index}");
        return 1;
    };
    if !yes && !confirm(&format!("Delete '{}' permanently? [y/N] ", shop.name), input) {
        println!("delete cancelled");
        return 0;
    }
    match store.remove(index) {
        Ok(removed) => {
            println!("deleted shop #{index}: {}", removed.name);
            0
        }
        Err(err) => {
            report_save_error(&err);
            1
        }
    }
}

fn handle_migrate(config: &AppConfig) -> i32 {
    let mut store = ShopStore::new(&config.data_path);
    match store.load() {
        Ok(report) => {
            println!(
                "migration complete: records={}, migrated={}, created={}, path='{}'",
                report.records,
                report.migrated,
                report.created,
                config.data_path.display()
            );
            0
        }
        Err(LoadError::Persist(err)) => {
            report_save_error(&err);
            1
        }
        Err(err) => {
            eprintln!("migration failed: {err}");
            1
        }
    }
}

fn handle_serve(config: &AppConfig, bind: Option<String>) -> i32 {
    let bind_addr = bind.unwrap_or_else(|| config.bind_addr.clone());
    let mut store = ShopStore::new(&config.data_path);
    match store.load() {
        Ok(_) => {}
        Err(LoadError::Persist(err)) => report_save_error(&err),
        Err(err) => eprintln!("load failed: {err}; starting with an empty list"),
    }
    match server::run_server(&mut store, &bind_addr) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn report_save_error(err: &SaveError) {
    eprintln!("save failed: {err}");
    eprintln!("{}", err.hint());
}

/// Asks a yes/no question on stderr; only `y`/`yes` confirm.
fn confirm(prompt: &str, input: &mut impl BufRead) -> bool {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut answer = String::new();
    if input.read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
