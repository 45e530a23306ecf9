// Interactive, line-driven walk through the three workflow steps.
//
// Every line is one user action. Failures print a message and leave the session as
// it was; only `reset` clears it.

use cogni::config::CalculatorConfig;
use cogni::report::{BandTable, Report};
use cogni::workflow::{StepStatus, WorkflowController, WorkflowError};
use cogni::{LrKind, list_tests};
use std::io::{self, BufRead, Write};

const HELP: &str = "\
Commands:
  age <years>                  step 1: enter the patient's age
  probability <percent>        step 2: adjust the clinical probability (0-100)
  next                         move on to the next step
  tests                        list available biomarker tests
  test <name>                  step 3: choose a test and calculate
  edit <positive|negative> <lr>  replace a likelihood ratio
  reset-lr                     restore the published likelihood ratios
  show                         print progress and the current result
  bands                        print the population risk table
  reset                        start again
  help                         print this message
  quit                         leave the session";

enum Outcome {
    Continue(String),
    Quit,
}

pub fn run<R: BufRead, W: Write>(
    input: R,
    mut output: W,
    config: &CalculatorConfig,
) -> io::Result<()> {
    let mut controller = WorkflowController::new();
    writeln!(output, "{HELP}")?;
    prompt(&controller, &mut output)?;

    for line in input.lines() {
        let line = line?;
        match dispatch(&mut controller, line.trim(), config) {
            Outcome::Continue(message) => {
                if !message.is_empty() {
                    writeln!(output, "{message}")?;
                }
            }
            Outcome::Quit => return Ok(()),
        }
        prompt(&controller, &mut output)?;
    }
    Ok(())
}

fn prompt<W: Write>(controller: &WorkflowController, output: &mut W) -> io::Result<()> {
    write!(output, "[{}] > ", controller.step())?;
    output.flush()
}

fn dispatch(controller: &mut WorkflowController, line: &str, config: &CalculatorConfig) -> Outcome {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let message = match command.to_ascii_lowercase().as_str() {
        "" => Ok(String::new()),
        "quit" | "exit" => return Outcome::Quit,
        "help" => Ok(HELP.to_string()),
        "age" => controller.submit_age_text(rest).map(|baseline| {
            format!(
                "Population risk for this age: {baseline:.1}%. Clinical probability set to {baseline:.1}%."
            )
        }),
        "probability" | "prob" => match rest.parse::<f64>() {
            Ok(percent) => controller
                .adjust_probability(percent)
                .map(|()| format!("Clinical probability set to {percent}%.")),
            Err(_) => Ok(format!("Invalid probability '{rest}'. Expected a number from 0 to 100.")),
        },
        "next" => controller.advance().map(|step| format!("Now at {step}.")),
        "tests" => Ok(list_tests()
            .iter()
            .map(|test| format!("  {}", test.name))
            .collect::<Vec<_>>()
            .join("\n")),
        "test" => match controller.calculate(rest) {
            Ok(Some(result)) => Ok(Report::new(result, config).to_string()),
            Ok(None) => Ok(format!("Unknown test '{rest}'. Type `tests` to list them.")),
            Err(e) => Err(e),
        },
        "edit" => edit(controller, rest, config),
        "reset-lr" => controller
            .reset_likelihood_ratios()
            .map(|result| Report::new(result, config).to_string()),
        "show" => Ok(show(controller, config)),
        "bands" => Ok(BandTable.to_string()),
        "reset" => {
            controller.reset_session();
            Ok("Session cleared.".to_string())
        }
        other => Ok(format!("Unknown command '{other}'. Type `help` for the list.")),
    };

    Outcome::Continue(message.unwrap_or_else(|e| format!("Error: {e}")))
}

fn edit(
    controller: &mut WorkflowController,
    rest: &str,
    config: &CalculatorConfig,
) -> Result<String, WorkflowError> {
    let (kind, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let kind = match kind.to_ascii_lowercase().as_str() {
        "positive" | "pos" | "+" => LrKind::Positive,
        "negative" | "neg" | "-" => LrKind::Negative,
        other => {
            return Ok(format!(
                "Unknown likelihood ratio '{other}'. Use `positive` or `negative`."
            ));
        }
    };
    controller
        .edit_likelihood_ratio(kind, value)
        .map(|result| Report::new(result, config).to_string())
}

fn show(controller: &WorkflowController, config: &CalculatorConfig) -> String {
    let mut lines: Vec<String> = controller
        .step_progress()
        .iter()
        .map(|(step, status)| {
            let mark = match status {
                StepStatus::Complete => "x",
                StepStatus::Current => ">",
                StepStatus::Upcoming => " ",
            };
            format!("[{mark}] {step}")
        })
        .collect();

    if let Some(age) = controller.age() {
        lines.push(format!("Age: {age}"));
        lines.push(format!(
            "Clinical probability: {}%",
            controller.clinical_probability_percent()
        ));
    }
    match controller.result() {
        Some(result) => lines.push(Report::new(result, config).to_string()),
        None => lines.push("No result yet.".to_string()),
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(script: &str) -> String {
        let mut output = Vec::new();
        run(script.as_bytes(), &mut output, &CalculatorConfig::default()).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn full_walkthrough_reports_both_branches() {
        let out = transcript("age 70\nprobability 30\nnext\ntest Plasma pTau217\nquit\n");
        assert!(out.contains("Population risk for this age: 3.3%"));
        assert!(out.contains("Now at Step 3: Choose test."));
        assert!(out.contains("If the test is positive: 75.3%"));
        assert!(out.contains("If the test is negative: 4.1%"));
    }

    #[test]
    fn edit_and_reset_round_trip() {
        let out = transcript(
            "age 70\nprob 30\nnext\ntest Plasma pTau217\nedit positive 10\nreset-lr\nquit\n",
        );
        assert!(out.contains("If the test is positive: 81.1%"));
        assert!(out.contains("Likelihood ratios (edited)"));
        assert_eq!(out.matches("If the test is positive: 75.3%").count(), 2);
    }

    #[test]
    fn errors_are_reported_without_ending_the_session() {
        let out = transcript("next\nage -4\nage 66\nedit positive 3\nbogus\nshow\n");
        assert!(out.contains("Error: 'advance' is not available during Step 1: Input age."));
        assert!(out.contains("Error: Age cannot be negative (got -4)."));
        assert!(out.contains("Error: No calculation has been run yet."));
        assert!(out.contains("Unknown command 'bogus'"));
        assert!(out.contains("[x] Step 1: Input age"));
        assert!(out.contains("[>] Step 2: Adjust risk"));
    }

    #[test]
    fn unknown_test_keeps_the_session_going() {
        let out = transcript("age 80\nnext\ntest Amyloid PET\nshow\n");
        assert!(out.contains("Unknown test 'Amyloid PET'"));
        assert!(out.contains("No result yet."));
    }

    #[test]
    fn reset_returns_to_the_first_step() {
        let out = transcript("age 70\nnext\ntest Plasma pTau217\nreset\nshow\n");
        assert!(out.contains("Session cleared."));
        assert!(out.ends_with("[Step 1: Input age] > "));
    }
}
