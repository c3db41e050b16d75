//! Run journal receiver maintenance

use anyhow::Result;
use cli_lib::config::Settings;
use cli_lib::output::{ConsoleSink, MessageQueueSink};
use cli_lib::store::FsJournalSystem;
use journal::{ExitStatus, Maintenance, ObjectName, OutputMode};
use owo_colors::OwoColorize;

pub fn run(settings: &Settings, library: ObjectName, output: OutputMode, delete: bool) -> Result<ExitStatus> {
    let system = FsJournalSystem::new(&settings.root);
    let config = settings.run_config(library, output, delete);
    let maintenance = Maintenance::new(&system, config);

    let summary = match maintenance.config().output {
        OutputMode::Print => maintenance.run(&mut ConsoleSink::stdout()),
        OutputMode::MessageQueue => {
            let queue = system.message_queue_path(&settings.message_queue, &library);
            maintenance.run(&mut MessageQueueSink::new(queue))
        }
    };

    // Message queue output is not visible to whoever started the job
    if maintenance.config().output == OutputMode::MessageQueue {
        if let Some(err) = &summary.error {
            eprintln!("{} {}", "ERROR:".red().bold(), err);
        }
    }

    Ok(summary.exit_status())
}
