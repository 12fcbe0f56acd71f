//! Command execution against an optional session.

use coinbayes_core::{Session, UpdatePolicy};
use coinbayes_error::BayesError;
use coinbayes_present::{render_session, render_update, trajectories, trajectory};
use coinbayes_present::{RenderSink, history_table};
use thiserror::Error;
use tracing::info;

use crate::command::{COMMAND_HELP, Command};
use crate::render::TextSink;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Bayes(#[from] BayesError),
    #[error("no hypotheses configured; use `init <COUNT>` first")]
    NotConfigured,
    #[error("priors sum to {sum:.4}; adjust them or run `normalize` before `start`")]
    PriorsNotReady { sum: f64 },
    #[error("no hypothesis {number}")]
    UnknownHypothesis { number: usize },
    #[error("history export failed: {0}")]
    Export(#[from] serde_json::Error),
}

/// Whether the read loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    policy: UpdatePolicy,
    session: Option<Session>,
    sink: TextSink,
}

impl Shell {
    #[must_use]
    pub fn new(policy: UpdatePolicy) -> Self {
        Self {
            policy,
            session: None,
            sink: TextSink::new(),
        }
    }

    /// Start with `count` hypotheses already configured.
    pub fn with_session(policy: UpdatePolicy, count: usize) -> Result<Self, ShellError> {
        let mut shell = Self::new(policy);
        shell.session = Some(Session::new(count, policy)?);
        Ok(shell)
    }

    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Text produced since the last call.
    pub fn take_output(&mut self) -> String {
        self.sink.take()
    }

    fn session_mut(&mut self) -> Result<&mut Session, ShellError> {
        self.session.as_mut().ok_or(ShellError::NotConfigured)
    }

    pub fn execute(&mut self, command: Command) -> Result<Flow, ShellError> {
        match command {
            Command::Init(count) => {
                // Replace wholesale; a rejected count keeps the old session.
                let session = Session::new(count, self.policy)?;
                self.session = Some(session);
                self.sink
                    .line(format!("configured {count} hypotheses with uniform priors"));
                self.show()?;
            }
            Command::PValue { index, value } => {
                self.session_mut()?.set_p_value(index, value)?;
                self.sink
                    .line(format!("hypothesis {} p-value set to {value}", index + 1));
            }
            Command::Prior { index, value } => {
                let session = self.session_mut()?;
                session.set_prior(index, value)?;
                let sum = session.prior_sum();
                self.sink.line(format!(
                    "hypothesis {} prior set to {value} (sum {sum:.4})",
                    index + 1
                ));
            }
            Command::Uniform => {
                self.session_mut()?.set_uniform_priors();
                self.sink.line("priors reset to uniform");
            }
            Command::Sum => {
                let session = self.session_mut()?;
                let sum = session.prior_sum();
                let status = if session.ready_to_start() {
                    "ok"
                } else {
                    "needs normalizing"
                };
                self.sink.line(format!("prior sum {sum:.6} ({status})"));
            }
            Command::Normalize => {
                self.session_mut()?.normalize_priors()?;
                self.sink.line("priors normalized");
            }
            Command::Start => {
                let session = self.session_mut()?;
                if !session.ready_to_start() {
                    return Err(ShellError::PriorsNotReady {
                        sum: session.prior_sum(),
                    });
                }
                session.start_session();
                self.sink.line("session started; trial counter reset");
            }
            Command::Update { flips, heads } => {
                let session = self.session_mut()?;
                let result = session.update(flips, heads)?;
                let trial = session.trial_count();
                let p_values = session.hypotheses().p_values();
                let map = session.hypotheses().map_hypothesis();
                let mean = session.hypotheses().posterior_mean_bias();
                self.sink.line(format!(
                    "trial {trial}: {heads} heads in {flips} flips (P(data) = {:e})",
                    result.total_probability
                ));
                render_update(&result, &p_values, &mut self.sink);
                self.sink.line(format!(
                    "most likely p={} ; posterior mean bias {mean:.4}",
                    p_values[map]
                ));
            }
            Command::Advance => {
                self.session_mut()?.advance();
                self.sink.line("posteriors copied into priors");
            }
            Command::Show => self.show()?,
            Command::History { json } => {
                let session = self.session_mut()?;
                if json {
                    let text = session.trial_history().to_json()?;
                    self.sink.line(text);
                } else if session.history().is_empty() {
                    self.sink.line("no trials yet");
                } else {
                    let table = history_table(session.history());
                    self.sink.table("History", &table);
                }
            }
            Command::Series(index) => {
                let session = self.session_mut()?;
                if index >= session.hypotheses().len() {
                    return Err(ShellError::UnknownHypothesis { number: index + 1 });
                }
                match trajectory(session.trial_history(), index) {
                    Some(line) => {
                        let title = format!("Hypothesis {}", index + 1);
                        self.sink.line_chart(&title, std::slice::from_ref(&line));
                        for (trial, posterior) in &line.points {
                            self.sink.line(format!("  trial {trial}: {posterior:.6}"));
                        }
                    }
                    None => self.sink.line("no trials yet"),
                }
            }
            Command::Chart => {
                let session = self.session_mut()?;
                let lines = trajectories(session.trial_history());
                if lines.is_empty() {
                    self.sink.line("no trials yet");
                } else {
                    self.sink.line_chart("Posterior by trial", &lines);
                }
            }
            Command::Help => self.sink.line(COMMAND_HELP),
            Command::Quit => {
                info!("shell exiting");
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    fn show(&mut self) -> Result<(), ShellError> {
        let session = self.session.as_ref().ok_or(ShellError::NotConfigured)?;
        render_session(session, &mut self.sink);
        Ok(())
    }
}
