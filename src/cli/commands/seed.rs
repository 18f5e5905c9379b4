//! `seed`: load generated demo data into the configured store.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use comfy_table::Cell;
use serde::Serialize;

use crate::adapters::http::dto::{DEFAULT_GENERATE_COUNT, MAX_GENERATE_COUNT};
use crate::cli::output::{list_table, output, CommandOutput};
use crate::domain::context::RequestContext;
use crate::domain::models::Config;
use crate::infrastructure::setup::build_app_repository;
use crate::services::seed::{generate, seed_repository, SeedSummary};

#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Records to generate per entity kind (1-1000)
    #[arg(short = 'n', long, default_value_t = DEFAULT_GENERATE_COUNT)]
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct SeedOutput {
    pub meals: usize,
    pub workouts: usize,
    pub progress: usize,
}

impl From<SeedSummary> for SeedOutput {
    fn from(summary: SeedSummary) -> Self {
        Self {
            meals: summary.meals,
            workouts: summary.workouts,
            progress: summary.progress,
        }
    }
}

impl CommandOutput for SeedOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["kind", "stored"]);
        for (kind, stored) in [
            ("meals", self.meals),
            ("workouts", self.workouts),
            ("progress", self.progress),
        ] {
            table.add_row(vec![Cell::new(kind), Cell::new(stored)]);
        }
        format!("Seeded demo data:\n{table}")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: SeedArgs, config: Config, json_mode: bool) -> Result<()> {
    let count = args.count.clamp(1, MAX_GENERATE_COUNT);
    let repository = build_app_repository(&config).await?;

    let data = generate(count, Local::now().date_naive());
    let summary = seed_repository(repository.as_ref(), &RequestContext::background(), &data)
        .await
        .context("Failed to store demo data")?;

    output(&SeedOutput::from(summary), json_mode);
    Ok(())
}
