use clap::Parser;
use okx_dca::Env;
use okx_dca::env::setup_tracing;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env = Env::try_parse()?;
    setup_tracing(&env.log_level);

    okx_dca::run(env).await
}
