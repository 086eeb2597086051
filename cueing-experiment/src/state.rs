use super::config::ExperimentConfig;
use super::error::ExperimentError;
use super::trial::Trial;
use cueing_core::{
    BlockProgress, Layout, LayoutId, Phase, ResponseDirection, ResultRecord, SessionPhase,
    Subject, TEST_TYPE, TrialOutcome, TrialState, score,
};
use cueing_layout::{Catalog, DebugSnapshot, LayoutGenerator, LayoutSetBuilder, TrialSequence};
use cueing_timing::{Deadline, Timer};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// A left/right answer, optionally stamped by the input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseEvent {
    pub direction: ResponseDirection,
    /// Timer timestamp of the key press; the session clock is read when absent.
    pub timestamp: Option<u64>,
}

impl ResponseEvent {
    pub fn new(direction: ResponseDirection) -> Self {
        Self {
            direction,
            timestamp: None,
        }
    }

    pub fn at(direction: ResponseDirection, timestamp: u64) -> Self {
        Self {
            direction,
            timestamp: Some(timestamp),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    BeginPractice,
    BeginMain,
    Response(ResponseEvent),
    /// The inter-trial gap is over; produced by [`SessionStateMachine::update`].
    SettleElapsed,
}

/// What a scored response looked like, for feedback display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialFeedback {
    pub practice: bool,
    /// 1-based position within the phase.
    pub trial_number: usize,
    pub layout_id: LayoutId,
    pub outcome: TrialOutcome,
    pub reaction_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    /// Event arrived outside its window and changed nothing.
    Ignored,
    /// The session entered a new phase.
    Transitioned(SessionPhase),
    /// A response was scored; the trial is now settling.
    Scored(TrialFeedback),
    /// The next trial's layout is on screen.
    Advanced,
}

/// Drives one subject through practice, the main blocks and the end screen.
pub struct SessionStateMachine<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub timer: T,
    pub rng: R,
    pub config: ExperimentConfig,
    phase: SessionPhase,
    subject: Option<Subject>,
    catalog: Catalog,
    practice: Vec<Arc<Layout>>,
    sequence: TrialSequence,
    current: Option<Trial<u64>>,
    results: Vec<ResultRecord>,
    practice_started: Option<u64>,
    main_started: Option<u64>,
}

impl<T, R> SessionStateMachine<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    /// Builds the whole stimulus corpus up front.
    pub fn new(config: ExperimentConfig, timer: T, mut rng: R) -> Result<Self, ExperimentError> {
        let generator = LayoutGenerator::new(config.geometry.clone())?;
        let mut builder = LayoutSetBuilder::new(generator);
        let catalog = builder.build_catalog(&mut rng);
        let sequence = builder.build_trial_sequence(
            &mut rng,
            &catalog,
            config.block_count,
            config.layouts_per_block,
        )?;
        let practice = builder.build_practice(&mut rng, config.practice_trials);

        info!(
            practice = practice.len(),
            main = sequence.len(),
            fallbacks = builder.generator().fallback_count(),
            "session corpus ready"
        );

        Ok(Self {
            timer,
            rng,
            config,
            phase: SessionPhase::default(),
            subject: None,
            catalog,
            practice,
            sequence,
            current: None,
            results: Vec::new(),
            practice_started: None,
            main_started: None,
        })
    }

    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> Handled {
        match (self.phase, event) {
            (SessionPhase::Idle, SessionEvent::BeginPractice) => {
                self.phase = SessionPhase::Practice;
                self.results.clear();
                self.practice_started = Some(self.timer.now());
                info!("practice started");
                match self.enter_trial(0) {
                    Handled::Advanced => Handled::Transitioned(SessionPhase::Practice),
                    other => other,
                }
            }

            (SessionPhase::MainPending, SessionEvent::BeginMain) => {
                self.phase = SessionPhase::Main;
                self.results.clear();
                self.main_started = Some(self.timer.now());
                info!(trials = self.sequence.len(), "main section started");
                match self.enter_trial(0) {
                    Handled::Advanced => Handled::Transitioned(SessionPhase::Main),
                    other => other,
                }
            }

            (phase, SessionEvent::Response(response)) if phase.allows_response() => {
                self.record_response(response)
            }

            (phase, SessionEvent::SettleElapsed) if phase.allows_response() => {
                let next = match &self.current {
                    Some(trial)
                        if trial.state == TrialState::Settling
                            && trial.settle.is_some_and(|d| d.is_due(&self.timer)) =>
                    {
                        trial.index + 1
                    }
                    _ => return Handled::Ignored,
                };
                self.enter_trial(next)
            }

            _ => Handled::Ignored,
        }
    }

    /// Polls the clock and returns the events that are now due.
    pub fn update(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if let Some(Trial {
            settle: Some(deadline),
            ..
        }) = &self.current
        {
            if deadline.is_due(&self.timer) {
                events.push(SessionEvent::SettleElapsed);
            }
        }
        events
    }

    /// Time left before the next trial may start, while settling.
    pub fn pending_delay(&self) -> Option<Duration> {
        self.current
            .as_ref()
            .and_then(|t| t.settle)
            .map(|d| d.remaining(&self.timer))
    }

    fn record_response(&mut self, response: ResponseEvent) -> Handled {
        let now = response.timestamp.unwrap_or_else(|| self.timer.now());
        let settle = Deadline::after(&self.timer, self.config.inter_trial_interval());
        let practice = self.phase.is_practice();

        let Some(trial) = self.current.as_mut() else {
            return Handled::Ignored;
        };
        if !trial.is_presenting() {
            return Handled::Ignored;
        }

        let target = trial.layout.target();
        let outcome = score(target.rotation, response.direction);
        let reaction_time_ms = now.saturating_sub(trial.started) / 1_000_000;
        let trial_number = trial.index + 1;

        trial.state = TrialState::Settling;
        trial.settle = Some(settle);

        debug!(
            practice,
            trial = trial_number,
            layout = %target.layout_id,
            rotation = %target.rotation,
            response = ?response.direction,
            correct = outcome.is_correct(),
            rt_ms = reaction_time_ms,
            "response scored"
        );

        let feedback = TrialFeedback {
            practice,
            trial_number,
            layout_id: target.layout_id.clone(),
            outcome,
            reaction_time_ms,
        };

        if !practice {
            let (participant, condition) = match &self.subject {
                Some(s) => (s.participant().to_string(), s.condition().to_string()),
                None => (String::new(), String::new()),
            };
            self.results.push(ResultRecord {
                participant,
                condition,
                test_type: TEST_TYPE.to_string(),
                trial_number,
                layout_id: target.layout_id.clone(),
                layout_type: target.layout_type,
                result: outcome,
                response_time_ms: reaction_time_ms,
            });
        }

        Handled::Scored(feedback)
    }

    /// Shows trial `index` of the active phase, or closes the phase when the
    /// sequence is exhausted.
    fn enter_trial(&mut self, index: usize) -> Handled {
        let layout = match self.phase {
            SessionPhase::Practice => self.practice.get(index).cloned(),
            SessionPhase::Main => self.sequence.get(index).cloned(),
            _ => None,
        };

        match layout {
            Some(layout) => {
                let now = self.timer.now();
                debug!(trial = index + 1, layout = %layout.layout_id(), "trial presented");
                self.current = Some(Trial::new(index, layout, now));
                Handled::Advanced
            }
            None => {
                self.current = None;
                let Some(next) = self.phase.next() else {
                    return Handled::Ignored;
                };
                self.phase = next;
                let started = if next.is_ended() {
                    self.main_started
                } else {
                    self.practice_started
                };
                let elapsed_ms = started.map(|t| self.timer.elapsed(t).as_millis() as u64);
                if next.is_ended() {
                    info!(
                        trials = self.results.len(),
                        correct = self.total_correct(),
                        elapsed_ms,
                        "session ended"
                    );
                } else {
                    info!(phase = ?next, elapsed_ms, "phase complete");
                }
                Handled::Transitioned(next)
            }
        }
    }

    /// Returns current phase
    pub fn current_phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// Layout to draw: present only while a trial awaits its response.
    pub fn visible_layout(&self) -> Option<&Layout> {
        self.current
            .as_ref()
            .filter(|t| t.is_presenting())
            .map(|t| t.layout.as_ref())
    }

    /// `(current, total)` for the running phase, 1-based.
    pub fn trial_progress(&self) -> Option<(usize, usize)> {
        let total = match self.phase {
            SessionPhase::Practice => self.practice.len(),
            SessionPhase::Main => self.sequence.len(),
            _ => return None,
        };
        self.current.as_ref().map(|t| (t.index + 1, total))
    }

    /// Block and position within it during the main section.
    pub fn block_progress(&self) -> Option<BlockProgress> {
        if !self.phase.is_main() {
            return None;
        }
        let trial = self.current.as_ref()?;
        let block = self.sequence.block_of(trial.index)?;
        let layouts = self.sequence.layouts_per_block();
        Some(BlockProgress {
            block,
            blocks: self.sequence.blocks().len(),
            layout: trial.index % layouts + 1,
            layouts,
        })
    }

    /// Experiment results
    pub fn results(&self) -> &[ResultRecord] {
        &self.results
    }

    /// The completed log, available once the session has ended.
    pub fn finished_results(&self) -> Result<&[ResultRecord], ExperimentError> {
        if self.phase.is_ended() {
            Ok(&self.results)
        } else {
            Err(ExperimentError::NotEnded(self.phase))
        }
    }

    pub fn total_correct(&self) -> usize {
        self.results.iter().filter(|r| r.result.is_correct()).count()
    }

    pub fn mean_reaction_ms(&self) -> Option<f64> {
        if self.results.is_empty() {
            return None;
        }
        let sum: u64 = self.results.iter().map(|r| r.response_time_ms).sum();
        Some(sum as f64 / self.results.len() as f64)
    }

    pub fn main_trial_count(&self) -> usize {
        self.sequence.len()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn practice_layouts(&self) -> &[Arc<Layout>] {
        &self.practice
    }

    pub fn sequence(&self) -> &TrialSequence {
        &self.sequence
    }

    pub fn debug_snapshot(&self) -> DebugSnapshot<'_> {
        DebugSnapshot::new(&self.catalog, &self.practice, &self.sequence)
    }
}
