//! Interactive Thought / Action / Observation session

use planner_cli::console::Console;
use planner_core::{
    ToolLoopBuilder,
    tool::{DateTimeTool, GoogleTool},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    planner_cli::init();

    let tool_loop = ToolLoopBuilder::new()
        .provider(planner_cli::provider()?)
        .generation(planner_cli::generation_options())
        .tool(GoogleTool::default())
        .tool(DateTimeTool)
        .build()?;

    let mut console = Console::stdio();
    let session = tool_loop.run(&mut console).await?;

    tracing::info!(
        session = %session.id,
        messages = session.message_count(),
        elapsed_ms = session.duration().num_milliseconds(),
        "done"
    );

    Ok(())
}
