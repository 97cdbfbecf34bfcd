//! Classification of build tool output into progress markers
//!
//! [`classify`] re-scans the full accumulated output on every call, so it is
//! safe to feed it a growing buffer: a field detected once stays detected.
//! The snapshot is used for display only and never decides whether a stage
//! failed.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Progress of one phase of the framework or package manager output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseStatus {
    Running,
    Success,
    Error,
}

/// Static page generation, with the `(N/M)` counter when one was printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticPagesProgress {
    pub status: PhaseStatus,
    pub current: Option<u32>,
    pub total: Option<u32>,
}

/// Everything recognised in a block of output. Unset fields were not seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStatusSnapshot {
    pub compilation_status: Option<PhaseStatus>,
    /// Seconds, as printed (e.g. `"4.2"`)
    pub compilation_time: Option<String>,
    pub linting_status: Option<PhaseStatus>,
    pub page_data_status: Option<PhaseStatus>,
    pub static_pages_status: Option<StaticPagesProgress>,
    pub build_traces_status: Option<PhaseStatus>,
    pub optimization_status: Option<PhaseStatus>,
    /// Milliseconds, as printed
    pub extracted_time: Option<String>,
    pub install_status: Option<PhaseStatus>,
    pub added_packages: Option<u32>,
}

const LINTING: &str = "Linting and checking validity of types";
const PAGE_DATA: &str = "Collecting page data";
const STATIC_PAGES: &str = "Generating static pages";
const BUILD_TRACES: &str = "Collecting build traces";
const OPTIMIZATION: &str = "Finalizing page optimization";

struct Patterns {
    compile_time: Regex,
    extracted: Regex,
    static_counter: Regex,
    added_packages: Regex,
    linting_done: Regex,
    page_data_done: Regex,
    static_pages_done: Regex,
    build_traces_done: Regex,
    optimization_done: Regex,
}

fn done_pattern(marker: &str) -> Regex {
    // A checkmark earlier on the same line marks the phase as finished
    Regex::new(&format!(r"✓[^\n]*{}", regex::escape(marker))).expect("static regex")
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        compile_time: Regex::new(r"Compiled successfully in ([0-9.]+)s").expect("static regex"),
        extracted: Regex::new(r"Extracted in \(([0-9.]+)ms\)").expect("static regex"),
        static_counter: Regex::new(r"Generating static pages \((\d+)/(\d+)\)")
            .expect("static regex"),
        added_packages: Regex::new(r"added (\d+) packages?").expect("static regex"),
        linting_done: done_pattern(LINTING),
        page_data_done: done_pattern(PAGE_DATA),
        static_pages_done: done_pattern(STATIC_PAGES),
        build_traces_done: done_pattern(BUILD_TRACES),
        optimization_done: done_pattern(OPTIMIZATION),
    })
}

fn phase(output: &str, marker: &str, done: &Regex) -> Option<PhaseStatus> {
    if done.is_match(output) {
        Some(PhaseStatus::Success)
    } else if output.contains(marker) {
        Some(PhaseStatus::Running)
    } else {
        None
    }
}

/// Scan `output` for known progress markers
pub fn classify(output: &str) -> BuildStatusSnapshot {
    let p = patterns();
    let mut snapshot = BuildStatusSnapshot::default();

    if let Some(caps) = p.extracted.captures(output) {
        snapshot.extracted_time = Some(caps[1].to_string());
    }

    if output.contains("Compiled successfully") {
        snapshot.compilation_status = Some(PhaseStatus::Success);
        snapshot.compilation_time = p
            .compile_time
            .captures(output)
            .map(|caps| caps[1].to_string());
    } else if output.contains("Failed to compile") {
        snapshot.compilation_status = Some(PhaseStatus::Error);
    }

    snapshot.linting_status = phase(output, LINTING, &p.linting_done);
    snapshot.page_data_status = phase(output, PAGE_DATA, &p.page_data_done);
    snapshot.build_traces_status = phase(output, BUILD_TRACES, &p.build_traces_done);
    snapshot.optimization_status = phase(output, OPTIMIZATION, &p.optimization_done);

    if let Some(status) = phase(output, STATIC_PAGES, &p.static_pages_done) {
        // Latest counter wins on growing output
        let counter = p.static_counter.captures_iter(output).last();
        snapshot.static_pages_status = Some(StaticPagesProgress {
            status,
            current: counter.as_ref().and_then(|c| c[1].parse().ok()),
            total: counter.as_ref().and_then(|c| c[2].parse().ok()),
        });
    }

    if let Some(caps) = p.added_packages.captures(output) {
        snapshot.install_status = Some(PhaseStatus::Success);
        snapshot.added_packages = caps[1].parse().ok();
    } else if output.contains("up to date") {
        snapshot.install_status = Some(PhaseStatus::Success);
    }

    snapshot
}

fn status_word(status: PhaseStatus) -> &'static str {
    match status {
        PhaseStatus::Running => "running",
        PhaseStatus::Success => "done",
        PhaseStatus::Error => "failed",
    }
}

impl BuildStatusSnapshot {
    /// True when nothing was recognised
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// One human-readable entry per detected field
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(status) = self.install_status {
            lines.push(match (status, self.added_packages) {
                (_, Some(count)) => format!("added {} packages", count),
                _ => "dependencies up to date".to_string(),
            });
        }
        if let Some(status) = self.compilation_status {
            lines.push(match (status, &self.compilation_time) {
                (PhaseStatus::Success, Some(time)) => format!("compiled in {}s", time),
                (PhaseStatus::Error, _) => "failed to compile".to_string(),
                _ => "compiled".to_string(),
            });
        }
        for (label, status) in [
            ("linting", self.linting_status),
            ("collecting page data", self.page_data_status),
            ("collecting build traces", self.build_traces_status),
            ("finalizing optimization", self.optimization_status),
        ] {
            if let Some(status) = status {
                lines.push(format!("{} {}", label, status_word(status)));
            }
        }
        if let Some(pages) = &self.static_pages_status {
            lines.push(match (pages.current, pages.total) {
                (Some(current), Some(total)) => format!(
                    "generating static pages {} ({}/{})",
                    status_word(pages.status),
                    current,
                    total
                ),
                _ => format!("generating static pages {}", status_word(pages.status)),
            });
        }
        if let Some(time) = &self.extracted_time {
            lines.push(format!("extracted in {}ms", time));
        }

        lines
    }

    /// Entries of `self` that were not already reported by `previous`
    pub fn changes_since(&self, previous: &BuildStatusSnapshot) -> Vec<String> {
        let seen = previous.describe();
        self.describe()
            .into_iter()
            .filter(|line| !seen.contains(line))
            .collect()
    }

    /// Compact summary for a step message, `None` when nothing was recognised
    pub fn summary(&self) -> Option<String> {
        let lines = self.describe();
        if lines.is_empty() {
            None
        } else {
            Some(lines.join(", "))
        }
    }
}
