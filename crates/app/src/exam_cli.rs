//! Interactive exam on stdin/stdout.

use nihongo_core::model::{ChoiceId, QuestionId, SectionType, TestId};
use services::exam::{ExamSessionController, ExamTicker, SubmitPrompt, TickOutcome};
use services::ExamPhase;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use url::Url;

use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Answer { number: u32, choice: usize },
    Next,
    Prev,
    Tab(SectionType),
    Show,
    Submit,
    Quit,
    Help,
    Yes,
    No,
}

fn parse_input(line: &str) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    let first = words.next().unwrap_or_default();
    let input = match first.to_ascii_lowercase().as_str() {
        "next" | "n" => Input::Next,
        "prev" | "p" => Input::Prev,
        "show" | "" => Input::Show,
        "submit" => Input::Submit,
        "quit" | "q" => Input::Quit,
        "help" | "?" => Input::Help,
        "y" | "yes" => Input::Yes,
        "no" => Input::No,
        "tab" => {
            let raw = words.next().ok_or("usage: tab <vocabulary|grammar|reading|listening>")?;
            Input::Tab(raw.parse().map_err(|_| format!("unknown section: {raw}"))?)
        }
        number => {
            let number = number
                .parse()
                .map_err(|_| format!("unknown command: {line}"))?;
            let choice = words
                .next()
                .and_then(|c| c.parse().ok())
                .filter(|c| *c > 0)
                .ok_or("usage: <question-number> <choice-number>")?;
            Input::Answer { number, choice }
        }
    };
    if words.next().is_some() {
        return Err(format!("unexpected input: {line}"));
    }
    Ok(input)
}

fn print_help() {
    println!("  <q> <c>    answer question q with choice c (numbers as shown)");
    println!("  next/prev  move between sections");
    println!("  tab <s>    jump to a section (vocabulary, grammar, reading, listening)");
    println!("  show       redraw the current section");
    println!("  submit     hand in your answers");
    println!("  quit       leave without saving");
}

/// Map the numbers the learner sees onto question and choice ids in the
/// focused section.
fn resolve_answer(
    controller: &ExamSessionController,
    number: u32,
    choice: usize,
) -> Option<(QuestionId, ChoiceId)> {
    let question = controller
        .focused_section()?
        .questions
        .iter()
        .find(|q| q.number() == number)?;
    let choice = question.choices().get(choice.checked_sub(1)?)?;
    Some((question.id(), choice.id))
}

fn flush_notices(controller: &mut ExamSessionController) {
    for notice in controller.take_notices() {
        render::print_notice(notice);
    }
}

/// Run one attempt until it is submitted or the learner quits.
///
/// # Errors
///
/// Returns an error if the test cannot be loaded or stdin fails.
pub async fn run_exam(
    mut controller: ExamSessionController,
    test_id: TestId,
    media_base: &Url,
) -> Result<(), Box<dyn std::error::Error>> {
    controller.start(test_id).await?;
    if let Some(test) = controller.test() {
        println!(
            "{} ({}, {} min, {} questions). Type `help` for commands.",
            test.title(),
            test.level(),
            test.duration_minutes(),
            test.question_count()
        );
    }
    render::print_exam_view(&controller, media_base);

    let mut ticker = ExamTicker::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut confirming: Option<SubmitPrompt> = None;

    loop {
        tokio::select! {
            () = ticker.tick() => {
                let outcome = controller.tick();
                flush_notices(&mut controller);
                match outcome {
                    TickOutcome::Expired => {
                        confirming = None;
                        match controller.auto_submit().await {
                            Ok(()) => break,
                            Err(err) => eprintln!("{err}"),
                        }
                        flush_notices(&mut controller);
                    }
                    TickOutcome::Counting { remaining_secs } if remaining_secs % 60 == 0 => {
                        println!("({} left)", controller.countdown().display());
                    }
                    TickOutcome::Counting { .. } | TickOutcome::Ignored => {}
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed, leaving exam");
                    break;
                };
                let input = match parse_input(line.trim()) {
                    Ok(input) => input,
                    Err(message) => {
                        println!("{message}");
                        continue;
                    }
                };

                if confirming.take().is_some() {
                    if input == Input::Yes {
                        match controller.submit(true).await {
                            Ok(()) => break,
                            Err(err) => eprintln!("{err}"),
                        }
                        flush_notices(&mut controller);
                    } else {
                        println!("Submission cancelled.");
                    }
                    continue;
                }

                match input {
                    Input::Answer { number, choice } => {
                        match resolve_answer(&controller, number, choice) {
                            Some((question, choice)) => {
                                if let Err(err) = controller.select_answer(question, choice) {
                                    println!("{err}");
                                }
                            }
                            None => println!("No such question or choice in this section."),
                        }
                    }
                    Input::Next => {
                        if controller.focus_next() {
                            render::print_exam_view(&controller, media_base);
                        } else {
                            println!("This is the last section; type `submit` when ready.");
                        }
                    }
                    Input::Prev => {
                        if controller.focus_previous() {
                            render::print_exam_view(&controller, media_base);
                        } else {
                            println!("This is the first section.");
                        }
                    }
                    Input::Tab(section_type) => match controller.focus_section(section_type).map(|_| ()) {
                        Ok(()) => render::print_exam_view(&controller, media_base),
                        Err(err) => println!("{err}"),
                    },
                    Input::Show => render::print_exam_view(&controller, media_base),
                    Input::Submit => {
                        let prompt = controller.confirmation_prompt();
                        render::print_confirmation(prompt);
                        confirming = Some(prompt);
                    }
                    Input::Quit => break,
                    Input::Help => print_help(),
                    Input::Yes | Input::No => println!("Nothing to confirm."),
                }
            }
        }
    }

    if controller.phase() == ExamPhase::Submitted {
        if let Some(result) = controller.result() {
            render::print_result(result);
        }
    } else {
        println!("Exam abandoned; answers were not saved.");
    }
    controller.abandon();
    Ok(())
}
