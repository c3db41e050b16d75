//! Show the receiver chain and what maintenance would do with it

use anyhow::Result;
use cli_lib::config::Settings;
use cli_lib::store::FsJournalSystem;
use journal::{
    classify, load_chain, resolve_cutoff, CanonicalTimestamp, ExitStatus, JournalId, JournalSystem,
    MaintError, MemorySink, ObjectName, Receiver, Reporter, RetentionPlan, Verdict,
};
use owo_colors::OwoColorize;

struct ChainView {
    cutoff: CanonicalTimestamp,
    chain: Vec<Receiver>,
    plan: RetentionPlan,
    notes: MemorySink,
}

fn inspect(system: &FsJournalSystem, settings: &Settings, journal: &JournalId) -> Result<ChainView, MaintError> {
    if !system.library_exists(&journal.library) {
        return Err(MaintError::JournalContainerNotFound(journal.library));
    }
    let cutoff = resolve_cutoff(system, &settings.info_space, &journal.library)?;

    let mut notes = MemorySink::new();
    let chain = load_chain(system, journal, &mut Reporter::new(&mut notes))?;
    let plan = classify(&chain, &cutoff, false);

    Ok(ChainView {
        cutoff,
        chain,
        plan,
        notes,
    })
}

pub fn run(settings: &Settings, library: ObjectName) -> Result<ExitStatus> {
    let system = FsJournalSystem::new(&settings.root);
    let journal = JournalId::new(settings.journal_name, library);

    let view = match inspect(&system, settings, &journal) {
        Ok(view) => view,
        Err(e) => {
            eprintln!("{} {}", "ERROR:".red().bold(), e);
            return Ok(e.exit_status());
        }
    };

    println!("{}", format!("Receiver chain for {}", journal).bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Oldest entry needed: {}", view.cutoff.to_string().cyan());
    for note in view.notes.lines.iter().filter(|l| l.starts_with("WARNING")) {
        println!("{}", note.yellow());
    }
    println!();

    if view.chain.is_empty() {
        println!("{}", "No receivers in chain".dimmed());
        return Ok(ExitStatus::Success);
    }

    for index in view.plan.scan_order() {
        let receiver = &view.chain[index];
        let verdict = view.plan.verdicts[index];
        let label = match verdict {
            Verdict::KeepAfterCutoff => verdict.label().green().to_string(),
            Verdict::KeepBoundary => verdict.label().cyan().bold().to_string(),
            Verdict::KeepStale | Verdict::Delete => verdict.label().yellow().to_string(),
        };
        println!("{:<10}  {}  {}", receiver.name, receiver.attached_at, label);
    }

    println!();
    let deletable = view.plan.deletable_count();
    if deletable == 0 {
        println!("{}", "Nothing to delete".dimmed());
    } else {
        println!(
            "{} receiver(s) can be deleted with {}",
            deletable.to_string().yellow(),
            format!("jrnmaint run {} *PRINT *YES", library).bold()
        );
    }

    Ok(ExitStatus::Success)
}
