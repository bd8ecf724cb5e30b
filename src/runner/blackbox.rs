//! Black-box grading
//!
//! Runs the candidate as an isolated process per test case, feeding the
//! fixture input on stdin and comparing decoded stdout lines against the
//! expected output. Mismatches render as an aligned table with interior
//! spaces made visible; `in` and `err` channels are diagnostic only.

use tracing::info;

use crate::error::{HarnessError, Result};
use crate::fixtures::{FixtureStore, TestCase};
use crate::invoke;

const MIN_COLUMN_WIDTH: usize = 10;
const SPACE_MARKER: char = '•';

/// Drives process-isolated I/O testing.
pub struct BlackBoxRunner<'a> {
    store: &'a FixtureStore,
    program: String,
    args: Vec<String>,
}

impl<'a> BlackBoxRunner<'a> {
    pub fn new(store: &'a FixtureStore, program: impl Into<String>, args: &[String]) -> Self {
        Self {
            store,
            program: program.into(),
            args: args.to_vec(),
        }
    }

    /// Grade one exercise: every test identifier in configuration order,
    /// aborting on the first fault.
    pub async fn run(&self, exercise_id: &str) -> Result<()> {
        let conf = self.store.fetch_configuration(exercise_id).await?;

        for test_id in &conf.tests {
            info!("running black-box test {test_id}");
            let case = self.store.fetch_test_case(exercise_id, test_id).await?;
            self.run_case(test_id, &case, conf.timeout_cmd).await?;
        }

        Ok(())
    }

    /// Run one fetched case under the command-level timeout and classify
    /// the outcome.
    pub async fn run_case(&self, test_id: &str, case: &TestCase, timeout_cmd: f64) -> Result<()> {
        let outcome =
            invoke::run_process(&self.program, &self.args, &case.input, timeout_cmd).await?;

        // A subprocess timeout is a command-level failure, not a per-case one.
        if outcome.timed_out {
            return Err(HarnessError::Process(format!(
                "\n\nThe following error occurred:\n\n\
                 candidate command exceeded the {timeout_cmd} second limit on test {test_id}\n"
            )));
        }

        let channels = Channels::decode(case, &outcome.stdout, &outcome.stderr);

        if !outcome.exited_zero() {
            return Err(HarnessError::Process(render_error_report(
                test_id, &channels,
            )));
        }

        if channels.act != channels.out {
            return Err(HarnessError::OutputMismatch(render_mismatch_table(
                test_id, &channels,
            )));
        }

        Ok(())
    }
}

/// The four named line sequences of one black-box run.
#[derive(Clone, Debug)]
pub struct Channels {
    pub input: Vec<String>,
    pub out: Vec<String>,
    pub act: Vec<String>,
    pub err: Vec<String>,
}

impl Channels {
    fn decode(case: &TestCase, stdout: &str, stderr: &str) -> Self {
        Self {
            input: split_lines(&case.input),
            out: split_lines(&case.expected),
            act: split_lines(stdout),
            err: split_lines(stderr),
        }
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

fn render_error_report(test_id: &str, channels: &Channels) -> String {
    let mut report = String::from("\n\nThe following error occurred:\n\n");
    report.push_str(&run_banner(test_id));
    report.push('\n');
    for line in &channels.err {
        report.push('\t');
        report.push_str(line);
        report.push('\n');
    }
    report
}

fn render_mismatch_table(test_id: &str, channels: &Channels) -> String {
    let column_names = ["INPUT", "EXPECTED", "ACTUAL"];
    let columns = [&channels.input, &channels.out, &channels.act];

    let widths: Vec<usize> = columns
        .iter()
        .map(|lines| {
            lines
                .iter()
                .map(|line| line.chars().count())
                .max()
                .unwrap_or(0)
                .max(MIN_COLUMN_WIDTH)
        })
        .collect();
    let rows = columns.iter().map(|lines| lines.len()).max().unwrap_or(0);

    let mut table = String::from("\n\nThe expected and actual outputs differ!\n");
    table.push_str(&run_banner(test_id));
    table.push('\n');

    // Header and rule rows.
    table.push_str("    ");
    for (name, width) in column_names.iter().zip(&widths) {
        table.push_str(" | ");
        table.push_str(&center(name, *width));
    }
    table.push_str(" |\n");

    table.push_str("    ");
    for width in &widths {
        table.push_str(" | ");
        table.push_str(&"-".repeat(*width));
    }
    table.push_str(" |\n");

    for row in 0..rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|lines| {
                lines
                    .get(row)
                    .map(|line| line.replace(' ', &SPACE_MARKER.to_string()))
                    .unwrap_or_default()
            })
            .collect();

        table.push_str(&format!("{row:4}"));
        for (cell, width) in cells.iter().zip(&widths) {
            table.push_str(" | ");
            table.push_str(&pad_right(cell, *width));
        }
        // Row-level flag: expected vs actual cell, after marker substitution.
        if cells[1] == cells[2] {
            table.push_str(" |  \n");
        } else {
            table.push_str(" | << !!!\n");
        }
    }

    table
}

fn run_banner(test_id: &str) -> String {
    let rule = "=".repeat(30);
    format!("{rule} RUN {test_id} {rule}\n")
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{text}{}", " ".repeat(left), " ".repeat(right))
}

fn pad_right(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{text}{}", " ".repeat(width - len))
    }
}
