//! Printing plans and apply reports

use colored::Colorize;
use fwt_core::{ApplyReport, FileEntity, PathReference, Plan};

/// Shortest meaningful spelling of a path for output.
fn display(reference: &PathReference) -> String {
    reference
        .project_relative()
        .or(reference.data_relative())
        .unwrap_or(reference.absolute())
        .to_string()
}

fn print_member(member: &FileEntity, preferred: bool) {
    if preferred {
        match member.new_path() {
            Some(new) => println!(
                "   {} {} -> {}",
                "keep".green(),
                display(member.path()),
                display(new).cyan()
            ),
            None => println!("   {} {}", "keep".green(), display(member.path())),
        }
    } else {
        println!("   {} {}", "trash".red(), display(member.path()));
    }
}

/// Print what `plan` is going to do.
pub fn print_plan(plan: &Plan) {
    let project = plan.project().identity();
    println!(
        "{} {} {}",
        "=>".blue().bold(),
        project.kind,
        project.name.bold()
    );

    if let Some(scan) = plan.scan_report() {
        let types: Vec<String> = scan
            .types
            .iter()
            .map(|(ext, n)| {
                let ext = if ext.is_empty() { "(none)" } else { ext.as_str() };
                format!("{} {}", n, ext)
            })
            .collect();
        println!(
            "   scanned {} files ({}), {} skipped",
            scan.files,
            types.join(", "),
            scan.skipped
        );
    }

    for set in plan.sets() {
        println!();
        println!("{} {} ({} files)", "Set".bold(), set.key().to_string().cyan(), set.len());
        let preferred = set.preferred_index();
        for (i, member) in set.members().iter().enumerate() {
            print_member(member, Some(i) == preferred);
        }
    }

    if !plan.entities().is_empty() {
        println!();
        println!("{}", "Moves".bold());
        for entity in plan.entities() {
            if let Some(new) = entity.new_path() {
                let verb = if entity.keep_source() { "copy" } else { "move" };
                println!(
                    "   {} {} -> {}",
                    verb.green(),
                    display(entity.path()),
                    display(new).cyan()
                );
            }
        }
    }

    if !plan.queue().is_empty() {
        println!();
        println!("{}", "Reference rewrites".bold());
        for entry in plan.queue() {
            println!("   {} -> {}", entry.old, entry.new.as_str().cyan());
        }
    }
}

/// Print the outcome of `Plan::apply`.
pub fn print_report(report: &ApplyReport) {
    println!();
    for (store, lines) in &report.rewrite.rewritten {
        println!("   {} {} ({} lines)", "+".green(), store, lines);
    }
    for failure in &report.failures {
        println!("   {} {}: {}", "!".red(), failure.path, failure.error);
    }

    let status = if report.is_success() {
        "OK".green().bold()
    } else {
        "PARTIAL".yellow().bold()
    };
    println!(
        "{} {} stores rewritten ({} lines), {} moved, {} trashed, {} failed",
        status,
        report.rewrite.rewritten.len(),
        report.rewrite.lines_changed(),
        report.moved.len(),
        report.trashed.len(),
        report.failures.len()
    );
}
