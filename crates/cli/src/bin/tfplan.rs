use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    tfplan_cli::main_entry().await
}
