//! macrolog CLI
//!
//! Command-line client for a running macrolog server:
//! - Show a day with its totals
//! - Log and remove foods
//! - Read and set goals
//! - Search foods and list recent ones
//! - Generate a config file

use anyhow::{bail, Context, Result};
use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use reqwest::{Client, Response};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "macrolog-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Food diary from the command line")]
#[command(long_about = "macrolog keeps a daily food diary.\nLog what you eat per meal and track calories and macros against your goals.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Server URL
    #[arg(long, default_value = "http://localhost:8085", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a day's meals and totals
    Day {
        /// Date: "today", "yesterday", "tomorrow" or YYYY-MM-DD
        #[arg(default_value = "today")]
        date: String,
    },

    /// Log a food from the catalog
    Add {
        /// Meal: breakfast, lunch, dinner, snacks
        meal: String,
        /// Food id (see `foods`)
        food: String,
        /// Quantity
        #[arg(short, long, default_value = "1")]
        qty: f64,
        /// Unit label (default: the food's default unit)
        #[arg(short, long)]
        unit: Option<String>,
        /// Date
        #[arg(short, long, default_value = "today")]
        date: String,
    },

    /// Remove an entry
    Remove {
        /// Meal: breakfast, lunch, dinner, snacks
        meal: String,
        /// Entry id (shown by `day`)
        id: String,
        /// Date
        #[arg(short, long, default_value = "today")]
        date: String,
    },

    /// Show goals, or update the ones given
    Goals {
        #[arg(long)]
        calories: Option<u32>,
        #[arg(long)]
        protein: Option<u32>,
        #[arg(long)]
        carbs: Option<u32>,
        #[arg(long)]
        fat: Option<u32>,
    },

    /// Search foods
    Foods {
        /// Name filter (empty = all)
        #[arg(default_value = "")]
        query: String,
    },

    /// List recently logged foods
    Recent {
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let json_output = cli.format == "json";

    match cli.command {
        Commands::Day { date } => {
            let date = parse_date(&date)?;
            let response = client
                .get(format!("{}/api/v1/days/{}", cli.api_url, date))
                .send()
                .await
                .with_context(|| connect_hint(&cli.api_url))?;
            let day = expect_json(response).await?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&day)?);
            } else {
                print_day(&day);
            }
        }

        Commands::Add {
            meal,
            food,
            qty,
            unit,
            date,
        } => {
            let date = parse_date(&date)?;
            let body = serde_json::json!({ "foodId": food, "qty": qty, "unit": unit });

            let response = client
                .post(format!(
                    "{}/api/v1/days/{}/meals/{}/entries",
                    cli.api_url, date, meal
                ))
                .json(&body)
                .send()
                .await
                .with_context(|| connect_hint(&cli.api_url))?;
            let entry = expect_json(response).await?;

            println!(
                "Logged {} ({}) to {} on {}: {} Cal",
                entry["name"].as_str().unwrap_or("-"),
                portion(&entry),
                meal,
                date,
                entry["calories"].as_f64().unwrap_or(0.0).round()
            );
            println!("Entry id: {}", entry["id"].as_str().unwrap_or("-"));
        }

        Commands::Remove { meal, id, date } => {
            let date = parse_date(&date)?;
            let response = client
                .delete(format!(
                    "{}/api/v1/days/{}/meals/{}/entries/{}",
                    cli.api_url, date, meal, id
                ))
                .send()
                .await
                .with_context(|| connect_hint(&cli.api_url))?;

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                bail!("Remove failed ({}): {}", status, text);
            }
            println!("Removed entry {} from {} on {}", id, meal, date);
        }

        Commands::Goals {
            calories,
            protein,
            carbs,
            fat,
        } => {
            let url = format!("{}/api/v1/goals", cli.api_url);
            let current = expect_json(
                client
                    .get(&url)
                    .send()
                    .await
                    .with_context(|| connect_hint(&cli.api_url))?,
            )
            .await?;

            let goals = if calories.is_some() || protein.is_some() || carbs.is_some() || fat.is_some() {
                let mut updated = current.clone();
                for (key, value) in [
                    ("calories", calories),
                    ("protein", protein),
                    ("carbs", carbs),
                    ("fat", fat),
                ] {
                    if let Some(value) = value {
                        updated[key] = value.into();
                    }
                }
                expect_json(client.put(&url).json(&updated).send().await?).await?
            } else {
                current
            };

            if json_output {
                println!("{}", serde_json::to_string_pretty(&goals)?);
            } else {
                println!("Calories: {}", goals["calories"]);
                println!("Protein:  {}g", goals["protein"]);
                println!("Carbs:    {}g", goals["carbs"]);
                println!("Fat:      {}g", goals["fat"]);
            }
        }

        Commands::Foods { query } => {
            let response = client
                .get(format!("{}/api/v1/foods", cli.api_url))
                .query(&[("q", query.as_str())])
                .send()
                .await
                .with_context(|| connect_hint(&cli.api_url))?;
            let list = expect_json(response).await?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                print_food_list(&list, "No foods found");
            }
        }

        Commands::Recent { limit } => {
            let mut request = client.get(format!("{}/api/v1/recent", cli.api_url));
            if let Some(limit) = limit {
                request = request.query(&[("limit", limit)]);
            }
            let response = request
                .send()
                .await
                .with_context(|| connect_hint(&cli.api_url))?;
            let list = expect_json(response).await?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                print_food_list(&list, "Nothing logged yet");
            }
        }

        Commands::Status => {
            let response = client
                .get(format!("{}/health", cli.api_url))
                .send()
                .await
                .with_context(|| connect_hint(&cli.api_url))?;
            let health = expect_json(response).await?;

            println!("macrolog v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Status:  {}", health["status"].as_str().unwrap_or("unknown"));
            println!("Storage: {}", health["storage"].as_str().unwrap_or("unknown"));
            println!("Catalog: {}", health["catalog"].as_str().unwrap_or("unknown"));
            if let Some(uptime) = health["uptime_seconds"].as_u64() {
                println!("Uptime:  {}", format_duration(uptime));
            }
        }

        Commands::Config { output } => {
            let config = macrolog::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn connect_hint(api_url: &str) -> String {
    format!(
        "Cannot connect to macrolog at {} (start it with: cargo run --bin macrolog)",
        api_url
    )
}

/// Body of a successful response, or an error carrying the server's message
async fn expect_json(response: Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or(text);
        bail!("Request failed ({}): {}", status, message);
    }
    response.json().await.context("Invalid JSON from server")
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    let today = Local::now().date_naive();
    match s.trim().to_lowercase().as_str() {
        "today" => Ok(today),
        "yesterday" => Ok(today - Duration::days(1)),
        "tomorrow" => Ok(today + Duration::days(1)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d").with_context(|| {
            format!("Invalid date: {}. Use today, yesterday, tomorrow or YYYY-MM-DD", s)
        }),
    }
}

fn portion(entry: &Value) -> String {
    let qty = entry["servingQty"].as_f64().unwrap_or(1.0);
    let label = entry["servingLabel"].as_str().unwrap_or("");
    if qty > 1.0 {
        format!("{} x {}", macrolog::storage::format_qty(qty), label)
    } else {
        label.to_string()
    }
}

fn print_day(day: &Value) {
    println!("{}", day["date"].as_str().unwrap_or("-"));
    println!();

    for meal in ["breakfast", "lunch", "dinner", "snacks"] {
        let entries = day["day"]["meals"][meal]["entries"]
            .as_array()
            .cloned()
            .unwrap_or_default();
        let meal_cal = day["mealTotals"][meal]["calories"].as_f64().unwrap_or(0.0);

        println!("{:<10} {:>6} Cal", capitalize(meal), meal_cal.round());
        if entries.is_empty() {
            println!("  No foods logged yet");
        }
        for entry in &entries {
            println!(
                "  {:<30} {:<16} {:>5} Cal  P {:>4}  C {:>4}  F {:>4}  [{}]",
                entry["name"].as_str().unwrap_or("-"),
                portion(entry),
                entry["calories"].as_f64().unwrap_or(0.0).round(),
                entry["protein"].as_f64().unwrap_or(0.0).round(),
                entry["carbs"].as_f64().unwrap_or(0.0).round(),
                entry["fat"].as_f64().unwrap_or(0.0).round(),
                entry["id"].as_str().unwrap_or("-"),
            );
        }
    }

    println!("{}", "-".repeat(60));
    for (label, key, unit) in [
        ("Calories", "calories", ""),
        ("Protein", "protein", "g"),
        ("Carbs", "carbs", "g"),
        ("Fat", "fat", "g"),
    ] {
        let total = day["totals"][key].as_f64().unwrap_or(0.0).round();
        let goal = day["goals"][key].as_u64().unwrap_or(0);
        println!("{:<10} {:>6}{} / {}{}", label, total, unit, goal, unit);
    }

    let remaining = day["goals"]["calories"].as_i64().unwrap_or(0)
        - day["totals"]["calories"].as_f64().unwrap_or(0.0).round() as i64;
    println!("Remaining  {:>6}", remaining);
}

fn print_food_list(list: &Value, empty: &str) {
    let foods = list["foods"].as_array().cloned().unwrap_or_default();
    if foods.is_empty() {
        println!("{}", empty);
        return;
    }

    println!("{:<24} {:<32} {:<14} {}", "ID", "Name", "Serving", "Cal");
    println!("{}", "-".repeat(76));
    for food in foods {
        println!(
            "{:<24} {:<32} {:<14} {}",
            food["id"].as_str().unwrap_or("-"),
            food["name"].as_str().unwrap_or("-"),
            food["displayServing"].as_str().unwrap_or("-"),
            food["displayCalories"].as_i64().unwrap_or(0)
        );
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
