//! Plain-text rendering of tests, results and progress.

use nihongo_core::model::{
    AttemptResult, AttemptReview, LessonProgressRecord, MediaRef, Question, Section, TestSummary,
};
use services::exam::{ExamNotice, ExamSessionController, ForwardAction, SubmitPrompt};
use url::Url;

pub fn print_test_list(summaries: &[TestSummary]) {
    if summaries.is_empty() {
        println!("No tests published for this level yet.");
        return;
    }
    for summary in summaries {
        let best = summary
            .best_score
            .map_or_else(|| "-".to_string(), |s| format!("{s}/{}", summary.total_score));
        let last = summary
            .last_attempt_id
            .map_or_else(String::new, |id| format!("  (last attempt {id})"));
        println!(
            "#{:<4} {:<3} {:>4} min  best {:<9} {}{}",
            summary.id.value(),
            summary.level.as_str(),
            summary.duration_minutes,
            best,
            summary.title,
            last
        );
    }
}

fn media_line(label: &str, media: &MediaRef, base: &Url) -> String {
    let location = media
        .resolve(base)
        .map_or_else(|| media.as_str().to_string(), |url| url.to_string());
    format!("     [{label}] {location}")
}

fn prompt_text(question: &Question) -> String {
    let prompt = question.prompt();
    let sentence = prompt.sentence.clone().unwrap_or_default();
    match &prompt.underlined_word {
        Some(word) if sentence.contains(word.as_str()) => {
            sentence.replacen(word.as_str(), &format!("[{word}]"), 1)
        }
        Some(word) => format!("{sentence} [{word}]"),
        None => sentence,
    }
}

fn print_question(question: &Question, base: &Url, marker: impl Fn(usize) -> &'static str) {
    println!("  {}. {}", question.number(), prompt_text(question));
    let prompt = question.prompt();
    if let Some(image) = &prompt.image {
        println!("{}", media_line("image", image, base));
    }
    if let Some(audio) = &prompt.audio {
        let line = media_line("audio", audio.source(), base);
        match audio.duration_secs() {
            Some(secs) => println!("{line} ({secs}s)"),
            None => println!("{line}"),
        }
    }
    for (index, choice) in question.choices().iter().enumerate() {
        println!("   {} {}) {}", marker(index), index + 1, choice.text);
    }
}

fn section_heading(section: &Section) -> String {
    match &section.title_vi {
        Some(vi) => format!("{} / {}", section.title_jp, vi),
        None => section.title_jp.clone(),
    }
}

/// Focused section of a live exam with the learner's current picks.
pub fn print_exam_view(controller: &ExamSessionController, base: &Url) {
    let Some(section) = controller.focused_section() else {
        println!("This test has no questions. Type `submit` to finish.");
        return;
    };
    println!();
    println!(
        "── {} ({}) ── {} left",
        section_heading(section),
        section.section_type,
        controller.countdown().display()
    );
    for question in &section.questions {
        let picked = controller.answers().get(question.id());
        print_question(question, base, |index| {
            if question.choices().get(index).map(|c| c.id) == picked {
                "*"
            } else {
                " "
            }
        });
    }
    if let Some(nav) = controller.section_navigation() {
        let back = if nav.has_previous { "prev | " } else { "" };
        let forward = match nav.forward {
            ForwardAction::Next => "next",
            ForwardAction::Submit => "submit",
        };
        println!("[{}/{}] {back}{forward}", nav.index + 1, nav.count);
    }
}

pub fn print_notice(notice: ExamNotice) {
    match notice {
        ExamNotice::LowTime { remaining_secs } => println!(
            "! Less than five minutes left ({}).",
            nihongo_core::time::format_countdown(remaining_secs)
        ),
        ExamNotice::TimeExpired => println!("! Time is up. Submitting your answers."),
        ExamNotice::SubmissionFailed => {
            println!("! Submission failed. Your answers are kept; type `submit` to retry.");
        }
    }
}

pub fn print_confirmation(prompt: SubmitPrompt) {
    match prompt {
        SubmitPrompt::Unanswered { count } => {
            println!("{count} question(s) are unanswered. Submit anyway? [y/n]");
        }
        SubmitPrompt::FinalCheck => println!("Submit your answers? [y/n]"),
    }
}

pub fn print_result(result: &AttemptResult) {
    println!();
    match result.total_score() {
        Some(total) => println!("Score: {}/{}", result.score(), total),
        None => println!("Score: {}", result.score()),
    }
    println!(
        "Correct: {}/{} ({}%)",
        result.correct_count(),
        result.question_count(),
        result.overall_percentage()
    );
    for section in result.sections() {
        println!(
            "  {:<24} {:>3}/{:<3} {:>3}%",
            section.title(),
            section.correct(),
            section.total(),
            section.percentage()
        );
        for topic in section.topics() {
            println!(
                "    - {:<20} {}/{}",
                topic.name(),
                topic.correct(),
                topic.total()
            );
        }
    }
    println!("Attempt id: {}", result.attempt_id());
}

pub fn print_review(review: &AttemptReview, base: &Url) {
    let test = review.test();
    println!("{} ({})", test.title(), test.level());
    for section in test.sections() {
        println!();
        println!("── {}", section_heading(section));
        for question in &section.questions {
            let correct = question.correct_choice();
            let picked = review.selected().get(question.id());
            print_question(question, base, |index| {
                let id = question.choices().get(index).map(|c| c.id);
                match (id == correct, id == picked) {
                    (true, _) => "✓",
                    (false, true) => "✗",
                    (false, false) => " ",
                }
            });
        }
    }
    println!();
    println!(
        "{}/{} correct",
        review.correct_count(),
        test.question_count()
    );
}

pub fn print_progress(record: &LessonProgressRecord) {
    println!(
        "lesson {}: {} ({}/{}, {}%)",
        record.lesson_id(),
        record.status(),
        record.current_index(),
        record.total_items(),
        record.percentage()
    );
    if let Some(at) = record.updated_at() {
        println!("updated {}", at.to_rfc3339());
    }
    println!("resume at item {}", record.seek_index());
}
