use share_composer::ChooserSnapshot;
use share_protocol::{Section, ShareTarget};
use std::fmt::Write as _;

pub fn render_snapshot(snapshot: &ChooserSnapshot) -> String {
    let counts = &snapshot.counts;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "service loading: {}",
        if snapshot.service_loading_complete {
            "complete"
        } else {
            "pending"
        }
    );
    let _ = writeln!(out, "shortcut results: {}", snapshot.shortcut_results);
    let _ = writeln!(
        out,
        "sections: service={} caller={} ranked={} alphabetical={} (total {})",
        counts.service,
        counts.caller,
        counts.ranked,
        counts.alphabetical,
        counts.total()
    );
    out.push('\n');

    let _ = writeln!(out, "{:>3}  {:<13} {:>8}  target", "#", "section", "score");
    for entry in &snapshot.entries {
        let _ = writeln!(
            out,
            "{:>3}  {:<13} {:>8}  {}",
            entry.position,
            entry.section.as_str(),
            score_cell(entry.section, &entry.target),
            describe(&entry.target)
        );
    }
    out
}

fn score_cell(section: Section, target: &ShareTarget) -> String {
    match (section, target) {
        (_, ShareTarget::Placeholder | ShareTarget::Empty) => "-".to_string(),
        (Section::Service, target) => format!("{:.3}", target.modified_score()),
        (_, ShareTarget::RankedApp(app) | ShareTarget::AlphaApp(app)) => {
            format!("{:.3}", app.score)
        }
        _ => "-".to_string(),
    }
}

fn describe(target: &ShareTarget) -> String {
    match target {
        ShareTarget::Placeholder => "<loading>".to_string(),
        ShareTarget::Empty => "<no direct share targets>".to_string(),
        ShareTarget::RankedApp(app) | ShareTarget::AlphaApp(app) => {
            format!("{} ({})", app.label, app.component)
        }
        other => match (other.label(), other.destination()) {
            (Some(label), Some(destination)) => format!("{label} ({})", destination.component),
            (Some(label), None) => label.to_string(),
            _ => String::new(),
        },
    }
}
