use std::sync::Arc;
use std::time::Duration;

use alarmvisor::{AlarmRuntime, Config, LogWriter, Subscribe, pump, wait_for_shutdown_signal};
use anyhow::Context;
use tokio::io::BufReader;

const PROMPT: &str = "Alarm> ";

fn main() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let result = runtime.block_on(run());
    // The stdin reader may still be parked in a blocking read.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn run() -> anyhow::Result<()> {
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let rt = AlarmRuntime::builder(Config::default())
        .with_subscribers(subs)
        .build();
    let token = rt.cancellation_token();

    let stop = async {
        let stdin = BufReader::new(tokio::io::stdin());
        tokio::select! {
            res = pump(&rt, stdin, &token, Some(PROMPT)) => match res {
                Ok(stats) => eprintln!(
                    "intake closed: accepted={} rejected={}",
                    stats.accepted, stats.rejected
                ),
                Err(err) => eprintln!("intake failed: {err}"),
            },
            res = wait_for_shutdown_signal() => {
                if let Err(err) = res {
                    eprintln!("signal handler failed: {err}");
                }
            }
        }
    };

    rt.run_until(stop)
        .await
        .context("alarm runtime stopped with an error")?;
    Ok(())
}
