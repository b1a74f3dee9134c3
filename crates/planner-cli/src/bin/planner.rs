//! Recursive planner
//!
//! Usage: `planner [objective words...]` (defaults to "plan a wedding").

use planner_core::Planner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    planner_cli::init();

    let provider = planner_cli::provider()?;
    let planner = Planner::new(provider, planner_cli::generation_options());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let objective = if args.is_empty() {
        "plan a wedding".to_string()
    } else {
        args.join(" ")
    };

    tracing::info!(%objective, "planning");
    let steps = planner.make_plan(&[], &objective).await?;

    for (i, step) in steps.iter().enumerate() {
        println!("{:>3}. {step}", i + 1);
    }

    Ok(())
}
