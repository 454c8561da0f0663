use std::process;
use tickwatch::{Configuration, Error, Executor, Logger, PartialLogger, Stopwatch, TokioTimer};
use tokio::time::{sleep, Duration};

async fn run(configuration: Configuration, logger: Logger) -> Result<(), Error> {
    let stopwatch = Stopwatch::new(TokioTimer::new());
    if let Some(start_time) = configuration.start_time() {
        stopwatch.set_start_time(start_time)?;
    }

    let mut ticks = PartialLogger::new(configuration.log_interval(), logger);
    let weak = stopwatch.downgrade();
    stopwatch.subscribe(
        move || {
            if let Some(stopwatch) = weak.upgrade() {
                ticks.log(|index| format!("tick #{} at {}", index + 1, stopwatch));
            }
        },
        configuration.resolution(),
        configuration.fire_immediately(),
    )?;

    stopwatch.start();
    logger.log(format!("started at {}", stopwatch));
    match configuration.pause_window() {
        Some((pause_at, pause_for)) => {
            sleep(Duration::from_millis(pause_at)).await;
            stopwatch.pause();
            logger.log(format!("paused at {}", stopwatch));
            sleep(Duration::from_millis(pause_for)).await;
            stopwatch.start();
            logger.log(format!("resumed at {}", stopwatch));
            sleep(Duration::from_millis(configuration.run_for() - pause_at)).await;
        }
        None => sleep(Duration::from_millis(configuration.run_for())).await,
    }
    stopwatch.pause();
    logger.log(format!("finished at {}", stopwatch));

    match serde_json::to_string(&stopwatch.snapshot()) {
        Ok(snapshot) => println!("{}", snapshot),
        Err(err) => log::error!("failed to serialize snapshot: {}", err),
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let configuration = match Configuration::new() {
        Ok(configuration) => configuration,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(1);
        }
    };
    log::debug!("{:?}", configuration);

    let executor = match Executor::new() {
        Ok(executor) => executor,
        Err(err) => {
            eprintln!("failed to start runtime: {}", err);
            process::exit(1);
        }
    };

    let logger = Logger::new();
    if let Err(err) = executor.run(run(configuration, logger)) {
        eprintln!("{}", err);
        process::exit(1);
    }
}
