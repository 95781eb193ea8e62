//! Dashboard summary printed to the terminal.
//!
//! Fetches the survey once, lets the user narrow it down by technology
//! and usage state, and prints the same distributions the dashboard
//! shows.

use std::fmt::{self, Write as _};

use dialoguer::Select;
use mesa_agua_analytics::{apply_filter, covering_spec, dashboard_stats, filter_options};
use mesa_agua_analytics_models::{
    CategoryCount, DashboardStats, FilterSpec, TechnologySelector, UsageSelector,
};
use mesa_agua_cli_utils::{MultiProgress, spinner};
use mesa_agua_source::fetcher::DataFetcher;
use mesa_agua_source::form_def::FormDefinition;
use mesa_agua_source_models::DATE_FORMAT;

/// Runs the interactive summary.
///
/// # Errors
///
/// Returns an error if the form definition is invalid, the HTTP client
/// cannot be built, or a prompt fails.
pub async fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let form = FormDefinition::mesa_agua()?;
    let fetcher = DataFetcher::for_form(&form)?;

    let bar = spinner(multi, &format!("Fetching {}", form.name));
    let fetched = fetcher.fetch_dataset().await;
    bar.finish_and_clear();

    if let Some(warning) = &fetched.warning {
        println!("{warning}");
    }

    let Some(mut spec) = covering_spec(&fetched.dataset) else {
        println!("No dated survey records to summarize.");
        return Ok(());
    };

    let options = filter_options(&fetched.dataset);

    let idx = Select::new()
        .with_prompt("Technology")
        .items(&options.technologies)
        .default(0)
        .interact()?;
    spec.technology = TechnologySelector::from_choice(&options.technologies[idx]);

    let idx = Select::new()
        .with_prompt("Usage state")
        .items(&options.usage_states)
        .default(0)
        .interact()?;
    spec.usage = UsageSelector::from_choice(&options.usage_states[idx]);

    let filtered = apply_filter(&fetched.dataset, &spec);
    log::debug!("{} of {} records selected", filtered.len(), fetched.dataset.len());

    println!();
    print!("{}", render_summary(&spec, &dashboard_stats(&filtered)));

    Ok(())
}

/// Formats the distributions as plain text.
fn render_summary(spec: &FilterSpec, stats: &DashboardStats) -> String {
    let mut out = String::new();
    // Writing into a `String` cannot fail.
    write_summary(&mut out, spec, stats).ok();
    out
}

fn write_summary(out: &mut String, spec: &FilterSpec, stats: &DashboardStats) -> fmt::Result {
    writeln!(
        out,
        "{} water points surveyed between {} and {}",
        stats.total,
        spec.from.format(DATE_FORMAT),
        spec.to.format(DATE_FORMAT),
    )?;

    let sections = [
        ("Technology", &stats.technologies),
        ("Condition", &stats.conditions),
        ("Water quality", &stats.qualities),
        ("Technical assistance", &stats.assistance),
        ("Users", &stats.users),
    ];
    for (title, counts) in sections {
        write_section(out, title, counts)?;
    }

    if stats.all_in_use {
        writeln!(out, "\nEvery water point is in use.")
    } else {
        write_section(out, "Problems (not in use)", &stats.problems)
    }
}

fn write_section(out: &mut String, title: &str, counts: &[CategoryCount]) -> fmt::Result {
    writeln!(out, "\n{title}")?;
    if counts.is_empty() {
        writeln!(out, "  (no answers)")?;
    }
    for count in counts {
        writeln!(out, "  {:>5}  {}", count.count, count.label)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn count(label: &str, count: u64) -> CategoryCount {
        CategoryCount {
            label: label.to_string(),
            count,
        }
    }

    fn spec() -> FilterSpec {
        FilterSpec::date_range(
            NaiveDate::from_ymd_opt(2023, 3, 15).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        )
    }

    fn stats(all_in_use: bool) -> DashboardStats {
        DashboardStats {
            total: 3,
            technologies: vec![count("Represa", 2), count("Otros", 1)],
            conditions: vec![count("Bueno", 1)],
            qualities: Vec::new(),
            assistance: Vec::new(),
            users: Vec::new(),
            problems: if all_in_use {
                Vec::new()
            } else {
                vec![count("Otras", 1)]
            },
            all_in_use,
        }
    }

    #[test]
    fn renders_header_and_sections() {
        let text = render_summary(&spec(), &stats(false));
        assert!(text.starts_with("3 water points surveyed between 15/03/2023 and 01/05/2024\n"));
        assert!(text.contains("\nTechnology\n      2  Represa\n      1  Otros\n"));
        assert!(text.contains("\nWater quality\n  (no answers)\n"));
        assert!(text.contains("\nProblems (not in use)\n      1  Otras\n"));
    }

    #[test]
    fn all_in_use_replaces_problem_section() {
        let text = render_summary(&spec(), &stats(true));
        assert!(text.contains("Every water point is in use."));
        assert!(!text.contains("Problems"));
    }
}
