//! Human-readable report lines.

use std::io::{self, Write};

use gradex_recon::model::{CohortTally, GradexReport, MatricReport, RenameReport, TallyReport};

const MISSING: &str = "<missing>";

pub fn render_report(out: &mut impl Write, report: &GradexReport, show_recovered: bool) -> io::Result<()> {
    let mut first = true;

    if let Some(ref m) = report.matric {
        separate(out, &mut first)?;
        render_matric(out, m, show_recovered)?;
    }
    if let Some(ref r) = report.rename {
        separate(out, &mut first)?;
        render_rename(out, r)?;
    }
    if let Some(ref t) = report.tally {
        separate(out, &mut first)?;
        render_tally(out, t)?;
    }
    Ok(())
}

/// Blank line between sections, none before the first.
fn separate(out: &mut impl Write, first: &mut bool) -> io::Result<()> {
    if !*first {
        writeln!(out)?;
    }
    *first = false;
    Ok(())
}

pub fn render_matric(out: &mut impl Write, report: &MatricReport, show_recovered: bool) -> io::Result<()> {
    for miss in &report.misses {
        writeln!(
            out,
            "Didn't find files for {}, tried\n{}\n{}\n",
            miss.matriculation.as_deref().unwrap_or(MISSING),
            miss.original_stem.as_deref().unwrap_or(MISSING),
            miss.filename_stem.as_deref().unwrap_or(MISSING),
        )?;
    }

    if show_recovered {
        for rec in &report.recovered {
            writeln!(
                out,
                "Matched {} by file name {}",
                rec.matriculation.as_deref().unwrap_or(MISSING),
                rec.stem,
            )?;
        }
    }

    let s = &report.summary;
    writeln!(
        out,
        "matric: {} submission(s) vs {} checked: {} by matriculation, {} by file name, {} not found",
        s.inputs, s.references, s.matched_by_key, s.recovered_by_stem, s.unmatched,
    )
}

pub fn render_rename(out: &mut impl Write, report: &RenameReport) -> io::Result<()> {
    for miss in &report.misses {
        writeln!(out, "Didn't find {} as {}\n", miss.before, miss.expected)?;
    }
    writeln!(out, "N(before)={}\nN(after)={}", report.before_count, report.after_count)
}

pub fn render_tally(out: &mut impl Write, report: &TallyReport) -> io::Result<()> {
    render_cohort(out, &report.overall)?;
    for cohort in &report.cohorts {
        writeln!(out)?;
        render_cohort(out, cohort)?;
    }
    Ok(())
}

fn render_cohort(out: &mut impl Write, cohort: &CohortTally) -> io::Result<()> {
    writeln!(out, "{} N={}", cohort.name, cohort.n)?;
    for col in &cohort.columns {
        match col.percent {
            Some(pct) => writeln!(out, "{} {}%", col.label, pct)?,
            None => writeln!(out, "{} n/a", col.label)?,
        }
    }
    Ok(())
}

/// One-line summary for stderr when stdout carries JSON.
pub fn summary_line(report: &GradexReport) -> String {
    let mut parts = Vec::new();
    if let Some(ref m) = report.matric {
        parts.push(format!("matric: {} not found", m.summary.unmatched));
    }
    if let Some(ref r) = report.rename {
        parts.push(format!("rename: {} not found", r.misses.len()));
    }
    if let Some(ref t) = report.tally {
        parts.push(format!("tally: {} cohort(s)", t.cohorts.len()));
    }
    format!("{}: {}", report.meta.config_name, parts.join(", "))
}
