//! Line-oriented front end. It only renders payloads and forwards input to
//! the loop service; every decision lives in `services`.

use std::error::Error;
use std::io::Write;

use rand::rngs::StdRng;
use services::{
    Advance, ChoiceState, PickOutcome, PickRejection, QuestionView, QuizLoopService, QuizSession,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use trainer_core::model::{Advice, letter_index};
use trainer_core::scoring::Scorecard;

type DriverResult<T> = Result<T, Box<dyn Error>>;

/// Where the user wants to go after a session screen.
enum Flow {
    Home,
    Quit,
}

pub struct Terminal<R, W> {
    service: QuizLoopService,
    rng: StdRng,
    input: Lines<R>,
    out: W,
}

impl<R, W> Terminal<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(service: QuizLoopService, rng: StdRng, input: R, out: W) -> Self {
        Self {
            service,
            rng,
            input: input.lines(),
            out,
        }
    }

    /// Run the home menu until the user quits or input ends.
    pub async fn run(&mut self) -> DriverResult<()> {
        loop {
            let has_resume = self.service.has_resume().await;
            writeln!(self.out)?;
            writeln!(self.out, "== Trainer ==")?;
            write!(self.out, "[p] practice  [e] exam  ")?;
            if has_resume {
                write!(self.out, "[r] resume  ")?;
            }
            writeln!(self.out, "[h] history  [x] reset history  [q] quit")?;

            let Some(choice) = self.prompt("> ").await? else {
                return Ok(());
            };
            let flow = match choice.as_str() {
                "p" => self.practice().await?,
                "e" => {
                    let started = self.service.start_exam(&mut self.rng).await;
                    self.start(started).await?
                }
                "r" if has_resume => match self.service.resume().await {
                    Ok(Some(session)) => self.play(session).await?,
                    Ok(None) => {
                        writeln!(self.out, "Nothing to resume.")?;
                        Flow::Home
                    }
                    Err(err) => {
                        writeln!(self.out, "{err}")?;
                        Flow::Home
                    }
                },
                "h" => {
                    self.history().await?;
                    Flow::Home
                }
                "x" => {
                    self.service.reset_history().await;
                    writeln!(self.out, "History cleared.")?;
                    Flow::Home
                }
                "q" => Flow::Quit,
                _ => Flow::Home,
            };
            if matches!(flow, Flow::Quit) {
                return Ok(());
            }
        }
    }

    async fn practice(&mut self) -> DriverResult<Flow> {
        let topics = self.service.topics().await?;
        for (number, topic) in topics.iter().enumerate() {
            writeln!(self.out, "{:>3}. {topic}", number + 1)?;
        }
        let Some(raw) = self.prompt("topics (e.g. 1,3 or all): ").await? else {
            return Ok(Flow::Quit);
        };
        let Some(selected) = select_topics(&topics, &raw) else {
            writeln!(self.out, "Select at least one topic by number.")?;
            return Ok(Flow::Home);
        };

        let available = self.service.availability(&selected).await?;
        writeln!(self.out, "{available} questions available")?;
        if available == 0 {
            return Ok(Flow::Home);
        }

        let default = self.service.default_practice_count().await;
        let Some(raw) = self.prompt(&format!("how many? [{default}] ")).await? else {
            return Ok(Flow::Quit);
        };
        let count = raw.parse().unwrap_or(default);

        let started = self
            .service
            .start_practice(&selected, count, &mut self.rng)
            .await;
        self.start(started).await
    }

    async fn start(
        &mut self,
        started: Result<QuizSession, services::SessionError>,
    ) -> DriverResult<Flow> {
        match started {
            Ok(session) => self.play(session).await,
            Err(err) => {
                writeln!(self.out, "{err}")?;
                Ok(Flow::Home)
            }
        }
    }

    /// Drive a session, then offer to retry the same selection.
    async fn play(&mut self, mut session: QuizSession) -> DriverResult<Flow> {
        loop {
            let Some(view) = session.view() else {
                return Ok(Flow::Home);
            };
            render_question(&mut self.out, &view, &session.progress().status_line())?;

            let Some(input) = self.prompt("> ").await? else {
                return Ok(Flow::Quit);
            };
            match input.as_str() {
                "n" | "" => match self.service.next(&mut session).await {
                    Advance::Moved(_) => {}
                    Advance::Finished(scorecard) => {
                        render_results(&mut self.out, &scorecard)?;
                        let Some(again) = self.prompt("[r] retry same  [enter] home ").await?
                        else {
                            return Ok(Flow::Quit);
                        };
                        if again != "r" {
                            return Ok(Flow::Home);
                        }
                        match self.service.retry_same(&mut self.rng).await {
                            Ok(Some(next)) => session = next,
                            Ok(None) => return Ok(Flow::Home),
                            Err(err) => {
                                writeln!(self.out, "{err}")?;
                                return Ok(Flow::Home);
                            }
                        }
                    }
                    Advance::Idle => writeln!(self.out, "Pick an answer first.")?,
                },
                "p" => {
                    if matches!(self.service.prev(&mut session).await, Advance::Idle) {
                        writeln!(self.out, "Already at the first question.")?;
                    }
                }
                "h" => {
                    self.service.go_home(session).await;
                    return Ok(Flow::Home);
                }
                "q" => return Ok(Flow::Quit),
                other => {
                    let Some(choice) = letter_index(other) else {
                        writeln!(self.out, "Answer with a-d, or n/p/h/q.")?;
                        continue;
                    };
                    if let PickOutcome::Rejected(reason) = self.service.pick(&mut session, choice).await
                    {
                        writeln!(self.out, "{}", rejection_text(reason))?;
                    }
                }
            }
        }
    }

    async fn history(&mut self) -> DriverResult<()> {
        let items = self.service.history().await;
        if items.is_empty() {
            writeln!(self.out, "No sessions yet.")?;
        }
        for item in items {
            writeln!(
                self.out,
                "{}  {:<8}  {:>3} / {:<3}  {}%",
                item.completed_at.format("%Y-%m-%d %H:%M"),
                item.mode,
                item.correct,
                item.total,
                item.percent
            )?;
        }
        Ok(())
    }

    async fn prompt(&mut self, text: &str) -> DriverResult<Option<String>> {
        write!(self.out, "{text}")?;
        self.out.flush()?;
        let line = self.input.next_line().await?;
        Ok(line.map(|line| line.trim().to_owned()))
    }
}

/// Parse "1,3" or "all" against the numbered topic list.
fn select_topics(topics: &[String], raw: &str) -> Option<Vec<String>> {
    if raw.eq_ignore_ascii_case("all") {
        return (!topics.is_empty()).then(|| topics.to_vec());
    }
    let mut selected = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let number: usize = part.parse().ok()?;
        let topic = topics.get(number.checked_sub(1)?)?;
        if !selected.contains(topic) {
            selected.push(topic.clone());
        }
    }
    (!selected.is_empty()).then_some(selected)
}

fn rejection_text(reason: PickRejection) -> &'static str {
    match reason {
        PickRejection::Locked => "This answer is locked.",
        PickRejection::NoSuchChoice => "That choice does not exist.",
        PickRejection::NoSuchQuestion | PickRejection::Finished => "No question to answer.",
    }
}

fn render_question(out: &mut impl Write, view: &QuestionView, status: &str) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "[{status}]  {}", view.topic)?;
    writeln!(out, "{}", view.text)?;
    for choice in &view.choices {
        let marker = if choice.selected { '*' } else { ' ' };
        let verdict = match choice.state {
            ChoiceState::Neutral => "",
            ChoiceState::Correct => "  (correct)",
            ChoiceState::Wrong => "  (wrong)",
        };
        writeln!(out, " {marker} {}) {}{verdict}", choice.letter, choice.text)?;
    }
    if let Some(explanation) = &view.explanation {
        writeln!(out, "  {explanation}")?;
    }
    let forward = if view.is_last { "finish" } else { "next" };
    writeln!(out, "[a-d] answer  [n] {forward}  [p] back  [h] home  [q] quit")
}

fn render_results(out: &mut impl Write, scorecard: &Scorecard) -> std::io::Result<()> {
    let score = scorecard.report.score();
    writeln!(out)?;
    writeln!(
        out,
        "Result: {} / {}  {}",
        score.correct,
        score.total,
        score.percent_label()
    )?;
    for topic in &scorecard.per_topic {
        writeln!(
            out,
            "  {}: {} / {} ({}%)",
            topic.topic, topic.good, topic.total, topic.percent
        )?;
    }
    match &scorecard.advice {
        Advice::PracticeMore(topics) => writeln!(out, "Practice more: {}", topics.join(", "))?,
        Advice::KeepItUp => writeln!(out, "Keep it up!")?,
    }
    if let Some(review) = &scorecard.review {
        for group in review {
            writeln!(out, "-- {}", group.topic)?;
            for missed in &group.questions {
                writeln!(out, "  {}. {}", missed.position + 1, missed.text)?;
                writeln!(
                    out,
                    "     yours: {}  correct: {}",
                    missed.your_answer.as_deref().unwrap_or("-"),
                    missed.correct_answer.as_deref().unwrap_or("-")
                )?;
            }
        }
    }
    Ok(())
}
