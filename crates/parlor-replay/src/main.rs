use clap::Parser;
use parlor_composer::RoomContext;
use parlor_logging::{ParlorSubscriberBuilder, RoomContextGuard};
use parlor_replay::{Cli, ReplaySession, SessionOptions, parse_script};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _log_guard = ParlorSubscriberBuilder::new()
        .with_config(cli.log_config())
        .try_init()?;
    let _room_guard = RoomContextGuard::new(cli.rid.clone(), cli.tmid.clone());

    let steps = parse_script(&cli.read_script()?)?;

    let mut room = RoomContext::new(cli.rid.clone());
    room.tmid = cli.tmid.clone();

    let session = ReplaySession::new(SessionOptions {
        room,
        config: cli.composer_config()?,
        policy: cli.upload_policy()?,
        shortcodes: cli.shortcode_table()?,
    })?;

    info!(steps = steps.len(), "replaying session");
    let report = session.run(steps).await;

    let output = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);

    Ok(())
}
